use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sheet configuration, snapshotted for one export
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SheetConfig {
    // Paper
    pub paper_size: PaperSize,
    pub landscape: bool,

    // Duplex
    pub sides: SidesMode,
    pub flip: FlipWay,
    pub auto_config_flip: bool,

    // Card geometry (millimeters, scale in percent)
    pub card_width_mm: f32,
    pub card_height_mm: f32,
    pub margin_x_mm: f32,
    pub margin_y_mm: f32,
    pub bleed_x_mm: f32,
    pub bleed_y_mm: f32,
    pub scale_percent: f32,
    pub offset_x_mm: f32,
    pub offset_y_mm: f32,

    // Grid
    pub columns: usize,
    pub rows: usize,
    pub auto_columns_rows: bool,

    // Cut marks
    pub face_cut_line: CutLineMode,
    pub back_cut_line: CutLineMode,
    pub line_weight_pt: f32,
    pub cutline_color: Rgb,

    // Extras
    pub margin_filling: bool,
    pub avoid_dislocation: bool,
    pub brochure_repeat_per_page: bool,
    pub page_number: bool,

    /// Back image for cards without their own back
    pub global_background: Option<ImageRef>,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            landscape: false,
            sides: SidesMode::OneSide,
            flip: FlipWay::LongEdgeBinding,
            auto_config_flip: true,
            card_width_mm: 63.0,
            card_height_mm: 88.0,
            margin_x_mm: 0.0,
            margin_y_mm: 0.0,
            bleed_x_mm: 0.0,
            bleed_y_mm: 0.0,
            scale_percent: 100.0,
            offset_x_mm: 0.0,
            offset_y_mm: 0.0,
            columns: 3,
            rows: 3,
            auto_columns_rows: true,
            face_cut_line: CutLineMode::Normal,
            back_cut_line: CutLineMode::None,
            line_weight_pt: 0.5,
            cutline_color: Rgb::BLACK,
            margin_filling: false,
            avoid_dislocation: false,
            brochure_repeat_per_page: false,
            page_number: false,
            global_background: None,
        }
    }
}

impl SheetConfig {
    /// Load config from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Self::from_json(&bytes)
    }

    /// Save config to JSON file, replacing any existing file only once
    /// the new contents are fully written
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SheetError::config("config", format!("Failed to serialize: {}", e)))?;
        crate::export::write_atomically(path.as_ref(), json.as_bytes()).await
    }

    #[cfg(feature = "serde")]
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| SheetError::config("config", format!("Failed to parse: {}", e)))
    }

    /// Scale factor (1.0 = 100%)
    pub fn scale(&self) -> f32 {
        self.scale_percent / 100.0
    }

    /// Sheet size in millimeters with orientation applied
    pub fn sheet_dimensions_mm(&self) -> (f32, f32) {
        self.paper_size.dimensions_with_orientation(self.landscape)
    }

    /// Resolve the grid as `(columns, rows)`, deriving it from the sheet and
    /// card size when `auto_columns_rows` is set
    pub fn grid_dimensions(&self) -> Result<(usize, usize)> {
        let (columns, rows) = if self.auto_columns_rows {
            let (sheet_w, sheet_h) = self.sheet_dimensions_mm();
            let s = self.scale();
            (
                fit_count(sheet_w, self.card_width_mm * s, self.margin_x_mm * s),
                fit_count(sheet_h, self.card_height_mm * s, self.margin_y_mm * s),
            )
        } else {
            (self.columns, self.rows)
        };

        if columns == 0 {
            return Err(SheetError::config(
                "columns",
                "Grid must have at least one column",
            ));
        }
        if rows == 0 {
            return Err(SheetError::config("rows", "Grid must have at least one row"));
        }
        Ok((columns, rows))
    }

    /// Binding edge actually used for back pages
    pub fn effective_flip(&self) -> FlipWay {
        match self.sides {
            SidesMode::Brochure => {
                if self.landscape {
                    FlipWay::ShortEdgeBinding
                } else {
                    FlipWay::LongEdgeBinding
                }
            }
            _ if self.auto_config_flip => {
                if self.landscape {
                    FlipWay::ShortEdgeBinding
                } else {
                    FlipWay::LongEdgeBinding
                }
            }
            _ => self.flip,
        }
    }

    /// Cut-mark mode for the given page type
    pub fn cut_line_for(&self, page_type: PageType) -> CutLineMode {
        match page_type {
            PageType::Face => self.face_cut_line,
            PageType::Back => self.back_cut_line,
        }
    }

    /// Validate the config
    pub fn validate(&self) -> Result<()> {
        let (sheet_w, sheet_h) = self.paper_size.dimensions_mm();
        if !(sheet_w > 0.0 && sheet_h > 0.0) {
            return Err(SheetError::config(
                "paper_size",
                "Paper dimensions must be positive",
            ));
        }

        if !(self.scale_percent > 0.0) {
            return Err(SheetError::config(
                "scale_percent",
                format!("Scale must be positive, got {}", self.scale_percent),
            ));
        }

        if !(self.card_width_mm > 0.0) {
            return Err(SheetError::config(
                "card_width_mm",
                "Card width must be positive",
            ));
        }
        if !(self.card_height_mm > 0.0) {
            return Err(SheetError::config(
                "card_height_mm",
                "Card height must be positive",
            ));
        }

        for (field, value) in [
            ("margin_x_mm", self.margin_x_mm),
            ("margin_y_mm", self.margin_y_mm),
            ("bleed_x_mm", self.bleed_x_mm),
            ("bleed_y_mm", self.bleed_y_mm),
            ("line_weight_pt", self.line_weight_pt),
        ] {
            if !(value >= 0.0) {
                return Err(SheetError::config(field, "Must not be negative"));
            }
        }

        self.grid_dimensions()?;

        // Enforced upstream; geometry still works but tiles will overlap
        if self.bleed_x_mm > self.margin_x_mm / 2.0 || self.bleed_y_mm > self.margin_y_mm / 2.0 {
            log::warn!(
                "Bleed ({} x {} mm) exceeds half the margin ({} x {} mm); adjacent tiles overlap",
                self.bleed_x_mm,
                self.bleed_y_mm,
                self.margin_x_mm,
                self.margin_y_mm
            );
        }

        Ok(())
    }
}

/// Number of cards of size `card` separated by `margin` that fit in `available`
fn fit_count(available: f32, card: f32, margin: f32) -> usize {
    let pitch = card + margin;
    if pitch <= 0.0 {
        return 0;
    }
    ((available + margin) / pitch).floor().max(0.0) as usize
}

/// Validate a card list against the invariants the planner relies on
pub fn validate_cards(cards: &[Card]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for (idx, card) in cards.iter().enumerate() {
        if card.repeat == 0 {
            return Err(SheetError::config(
                format!("cards[{}].repeat", idx),
                "Repeat count must be at least 1",
            ));
        }
        if !seen.insert(card.id.as_str()) {
            return Err(SheetError::config(
                format!("cards[{}].id", idx),
                format!("Duplicate card id '{}'", card.id),
            ));
        }
    }
    Ok(())
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::*;
    use serde::{Deserialize, Serialize};

    impl Serialize for PaperSize {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            use serde::ser::SerializeStruct;
            match self {
                PaperSize::A3 => serializer.serialize_str("A3"),
                PaperSize::A4 => serializer.serialize_str("A4"),
                PaperSize::A5 => serializer.serialize_str("A5"),
                PaperSize::Letter => serializer.serialize_str("Letter"),
                PaperSize::Legal => serializer.serialize_str("Legal"),
                PaperSize::Tabloid => serializer.serialize_str("Tabloid"),
                PaperSize::Custom {
                    width_mm,
                    height_mm,
                } => {
                    let mut s = serializer.serialize_struct("Custom", 2)?;
                    s.serialize_field("width_mm", width_mm)?;
                    s.serialize_field("height_mm", height_mm)?;
                    s.end()
                }
            }
        }
    }

    impl<'de> Deserialize<'de> for PaperSize {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            use serde::de::{self, MapAccess, Visitor};
            use std::fmt;

            struct PaperSizeVisitor;

            impl<'de> Visitor<'de> for PaperSizeVisitor {
                type Value = PaperSize;

                fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                    formatter.write_str("a paper size name or { width_mm, height_mm }")
                }

                fn visit_str<E>(self, value: &str) -> std::result::Result<PaperSize, E>
                where
                    E: de::Error,
                {
                    match value {
                        "A3" => Ok(PaperSize::A3),
                        "A4" => Ok(PaperSize::A4),
                        "A5" => Ok(PaperSize::A5),
                        "Letter" => Ok(PaperSize::Letter),
                        "Legal" => Ok(PaperSize::Legal),
                        "Tabloid" => Ok(PaperSize::Tabloid),
                        _ => Err(de::Error::unknown_variant(
                            value,
                            &["A3", "A4", "A5", "Letter", "Legal", "Tabloid", "Custom"],
                        )),
                    }
                }

                fn visit_map<M>(self, mut map: M) -> std::result::Result<PaperSize, M::Error>
                where
                    M: MapAccess<'de>,
                {
                    let mut width_mm = None;
                    let mut height_mm = None;

                    while let Some(key) = map.next_key::<String>()? {
                        match key.as_str() {
                            "width_mm" => width_mm = Some(map.next_value()?),
                            "height_mm" => height_mm = Some(map.next_value()?),
                            _ => {
                                let _: serde::de::IgnoredAny = map.next_value()?;
                            }
                        }
                    }

                    match (width_mm, height_mm) {
                        (Some(w), Some(h)) => Ok(PaperSize::Custom {
                            width_mm: w,
                            height_mm: h,
                        }),
                        _ => Err(de::Error::missing_field("width_mm or height_mm")),
                    }
                }
            }

            deserializer.deserialize_any(PaperSizeVisitor)
        }
    }
}
