//! Card lists from CSV
//!
//! One card per record with the columns `face, back, repeat`. `back` may be
//! empty and `repeat` may be empty or missing (defaults to 1). The first
//! record is a header row.

use std::path::Path;

use crate::types::*;

/// Load a card list from a CSV file
pub async fn load_cards_csv(path: impl AsRef<Path>) -> Result<Vec<Card>> {
    let path = path.as_ref().to_owned();

    let contents = tokio::fs::read_to_string(&path).await?;

    let cards = tokio::task::spawn_blocking(move || parse_cards_csv(&contents)).await??;
    log::debug!("Loaded {} cards from {}", cards.len(), path.display());

    Ok(cards)
}

/// Parse a card list from CSV text
pub fn parse_cards_csv(contents: &str) -> Result<Vec<Card>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(contents.as_bytes());

    let mut cards = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result?;

        let face = record.get(0).unwrap_or_default();
        if face.is_empty() {
            return Err(SheetError::config(
                format!("cards[{}].face", index),
                "face image is required",
            ));
        }

        let mut card = Card::new(format!("card-{}", index + 1), ImageRef::new(face));

        if let Some(back) = record.get(1).filter(|back| !back.is_empty()) {
            card = card.with_back(ImageRef::new(back));
        }

        if let Some(repeat) = record.get(2).filter(|repeat| !repeat.is_empty()) {
            let repeat = repeat.parse::<u32>().map_err(|e| {
                SheetError::config(format!("cards[{}].repeat", index), e.to_string())
            })?;
            card = card.with_repeat(repeat);
        }

        cards.push(card);
    }

    Ok(cards)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_optional_columns() {
        let csv = "face,back,repeat\n\
                   a.png,b.png,3\n\
                   ./c.png,,\n\
                   d.png\n";
        let cards = parse_cards_csv(csv).unwrap();

        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].back, Some(ImageRef::new("b.png")));
        assert_eq!(cards[0].repeat, 3);
        assert_eq!(cards[1].face.key, "c.png");
        assert_eq!(cards[1].back, None);
        assert_eq!(cards[1].repeat, 1);
        assert_eq!(cards[2].id, "card-3");
    }

    #[test]
    fn test_bad_repeat_names_record() {
        let err = parse_cards_csv("face,back,repeat\na.png,,many\n").unwrap_err();
        match err {
            SheetError::Config { field, .. } => assert_eq!(field, "cards[0].repeat"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
