use pdf_cardsheet::*;

fn manual_grid(columns: usize, rows: usize) -> SheetConfig {
    SheetConfig {
        columns,
        rows,
        auto_columns_rows: false,
        ..Default::default()
    }
}

fn config_field(err: SheetError) -> String {
    match err {
        SheetError::Config { field, .. } => field,
        other => panic!("expected a config error, got {other}"),
    }
}

#[test]
fn test_default_config_is_valid() {
    let config = SheetConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.grid_dimensions().unwrap(), (3, 3));
}

#[test]
fn test_auto_grid_counts_cards_that_fit() {
    let config = SheetConfig {
        margin_x_mm: 5.0,
        margin_y_mm: 5.0,
        ..Default::default()
    };
    // (210 + 5) / (63 + 5) = 3.16, (297 + 5) / (88 + 5) = 3.24
    assert_eq!(config.grid_dimensions().unwrap(), (3, 3));

    let landscape = SheetConfig {
        landscape: true,
        ..Default::default()
    };
    // 297 / 63 = 4.7, 210 / 88 = 2.4
    assert_eq!(landscape.grid_dimensions().unwrap(), (4, 2));
}

#[test]
fn test_auto_grid_with_oversized_card_is_rejected() {
    let config = SheetConfig {
        card_width_mm: 250.0,
        ..Default::default()
    };
    assert_eq!(config_field(config.validate().unwrap_err()), "columns");
}

#[test]
fn test_empty_grid_is_rejected() {
    assert_eq!(config_field(manual_grid(0, 3).validate().unwrap_err()), "columns");
    assert_eq!(config_field(manual_grid(3, 0).validate().unwrap_err()), "rows");
}

#[test]
fn test_non_positive_scale_is_rejected() {
    let config = SheetConfig {
        scale_percent: 0.0,
        ..Default::default()
    };
    assert_eq!(config_field(config.validate().unwrap_err()), "scale_percent");

    let config = SheetConfig {
        scale_percent: f32::NAN,
        ..Default::default()
    };
    assert_eq!(config_field(config.validate().unwrap_err()), "scale_percent");
}

#[test]
fn test_negative_bleed_is_rejected() {
    let config = SheetConfig {
        bleed_y_mm: -1.0,
        ..Default::default()
    };
    assert_eq!(config_field(config.validate().unwrap_err()), "bleed_y_mm");
}

#[test]
fn test_effective_flip() {
    let mut config = SheetConfig {
        flip: FlipWay::None,
        auto_config_flip: false,
        sides: SidesMode::DoubleSides,
        ..Default::default()
    };
    assert_eq!(config.effective_flip(), FlipWay::None);

    config.auto_config_flip = true;
    assert_eq!(config.effective_flip(), FlipWay::LongEdgeBinding);
    config.landscape = true;
    assert_eq!(config.effective_flip(), FlipWay::ShortEdgeBinding);

    // Brochure always derives the binding from orientation
    config.auto_config_flip = false;
    config.sides = SidesMode::Brochure;
    assert_eq!(config.effective_flip(), FlipWay::ShortEdgeBinding);
}

#[test]
fn test_validate_cards() {
    let ok = vec![
        Card::new("a", ImageRef::new("a.png")),
        Card::new("b", ImageRef::new("b.png")).with_repeat(4),
    ];
    assert!(validate_cards(&ok).is_ok());

    let zero = vec![Card::new("a", ImageRef::new("a.png")).with_repeat(0)];
    assert_eq!(config_field(validate_cards(&zero).unwrap_err()), "cards[0].repeat");

    let duplicate = vec![
        Card::new("a", ImageRef::new("a.png")),
        Card::new("a", ImageRef::new("b.png")),
    ];
    assert_eq!(config_field(validate_cards(&duplicate).unwrap_err()), "cards[1].id");
}

#[test]
fn test_image_ref_normalization() {
    let image = ImageRef::new(".\\cards\\Front.PNG");
    assert_eq!(image.key, "cards/Front.PNG");
    assert_eq!(image.format, "png");

    assert_eq!(ImageRef::new("./a.jpg"), ImageRef::new("a.jpg"));
    assert_eq!(ImageRef::new("dir.d/noext").format, "");
}

#[test]
fn test_paper_orientation() {
    assert_eq!(PaperSize::A4.dimensions_with_orientation(false), (210.0, 297.0));
    assert_eq!(PaperSize::A4.dimensions_with_orientation(true), (297.0, 210.0));
}

#[test]
fn test_partial_json_uses_defaults() {
    let json = br#"{
        "paper_size": { "width_mm": 100.0, "height_mm": 150.0 },
        "sides": "DoubleSides",
        "face_cut_line": "Complete",
        "cutline_color": { "r": 255, "g": 0, "b": 0 }
    }"#;
    let config = SheetConfig::from_json(json).unwrap();

    assert_eq!(
        config.paper_size,
        PaperSize::Custom {
            width_mm: 100.0,
            height_mm: 150.0
        }
    );
    assert_eq!(config.sides, SidesMode::DoubleSides);
    assert_eq!(config.face_cut_line, CutLineMode::Complete);
    assert_eq!(config.cutline_color, Rgb::new(255, 0, 0));
    assert_eq!(config.card_width_mm, 63.0);
}

#[test]
fn test_malformed_json_is_a_config_error() {
    let err = SheetConfig::from_json(b"{ not json").unwrap_err();
    assert_eq!(config_field(err), "config");
}

#[tokio::test]
async fn test_save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sheet.json");

    let config = SheetConfig {
        paper_size: PaperSize::Letter,
        landscape: true,
        sides: SidesMode::Brochure,
        global_background: Some(ImageRef::new("backs/default.png")),
        page_number: true,
        ..Default::default()
    };
    config.save(&path).await.unwrap();

    let loaded = SheetConfig::load(&path).await.unwrap();
    assert_eq!(loaded, config);
}

#[tokio::test]
async fn test_save_replaces_file_without_leftovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sheet.json");
    std::fs::write(&path, "stale").unwrap();

    let config = SheetConfig {
        scale_percent: 90.0,
        ..Default::default()
    };
    config.save(&path).await.unwrap();

    assert_eq!(SheetConfig::load(&path).await.unwrap(), config);
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_failed_save_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("sheet.json");

    assert!(matches!(
        SheetConfig::default().save(&path).await,
        Err(SheetError::Io(_))
    ));
    assert!(!path.exists());
}
