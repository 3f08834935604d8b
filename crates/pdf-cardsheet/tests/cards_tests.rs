use pdf_cardsheet::*;

#[tokio::test]
async fn test_load_cards_from_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deck.csv");
    tokio::fs::write(
        &path,
        "face,back,repeat\nfronts/hero.png,backs/red.png,2\nfronts/villain.png,,\n",
    )
    .await
    .unwrap();

    let cards = load_cards_csv(&path).await.unwrap();

    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].face, ImageRef::new("fronts/hero.png"));
    assert_eq!(cards[0].repeat, 2);
    assert_eq!(cards[1].back, None);

    let stats = calculate_statistics(&cards, &SheetConfig::default()).unwrap();
    assert_eq!(stats.expanded_cards, 3);
}

#[tokio::test]
async fn test_missing_csv_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_cards_csv(dir.path().join("nope.csv")).await;
    assert!(matches!(result, Err(SheetError::Io(_))));
}

#[test]
fn test_empty_face_is_rejected() {
    let result = parse_cards_csv("face,back\n,back.png\n");
    assert!(matches!(result, Err(SheetError::Config { .. })));
}
