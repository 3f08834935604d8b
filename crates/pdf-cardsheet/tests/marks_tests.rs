use pdf_cardsheet::layout::{FlipTransform, SheetGeometry, TilePlacement};
use pdf_cardsheet::marks::{CutMarks, MarkPoint, MarkStyle, generate_cut_marks};
use pdf_cardsheet::*;

/// Two 60x80 cards side by side on a 200x100 sheet
fn strip_config(margin: f32, bleed: f32) -> SheetConfig {
    SheetConfig {
        paper_size: PaperSize::Custom {
            width_mm: 200.0,
            height_mm: 100.0,
        },
        card_width_mm: 60.0,
        card_height_mm: 80.0,
        margin_x_mm: margin,
        margin_y_mm: margin,
        bleed_x_mm: bleed,
        bleed_y_mm: bleed,
        columns: 2,
        rows: 1,
        auto_columns_rows: false,
        ..Default::default()
    }
}

fn face_marks(config: &SheetConfig, mode: CutLineMode) -> CutMarks {
    let geometry = SheetGeometry::new(config, PageType::Face).unwrap();
    let (columns, rows) = config.grid_dimensions().unwrap();
    let placements: Vec<TilePlacement> = (0..columns * rows)
        .map(|index| geometry.place(index, FlipTransform::Identity))
        .collect();
    generate_cut_marks(&placements, &geometry, mode)
}

#[test]
fn test_crosses_on_every_trim_corner_with_margin() {
    let marks = face_marks(&strip_config(10.0, 2.0), CutLineMode::Cross);

    assert_eq!(marks.crosses().len(), 8);
    assert!(marks.lines().is_empty());
    assert!(marks.crosses().contains(&MarkPoint::new(35.0, 10.0)));
    assert!(marks.crosses().contains(&MarkPoint::new(165.0, 90.0)));
}

#[test]
fn test_shared_corners_are_deduplicated_without_margin() {
    let marks = face_marks(&strip_config(0.0, 0.0), CutLineMode::Cross);

    // (rows + 1) * (columns + 1)
    assert_eq!(marks.crosses().len(), 6);
    assert!(marks.crosses().contains(&MarkPoint::new(100.0, 10.0)));
}

#[test]
fn test_normal_lines_run_to_sheet_edges() {
    let marks = face_marks(&strip_config(10.0, 0.0), CutLineMode::Normal);

    assert!(marks.crosses().is_empty());
    // Left and right edges: 2 each; top and bottom: 2 per tile
    assert_eq!(marks.lines().len(), 12);

    let left_top = marks
        .lines()
        .iter()
        .find(|line| line.from == MarkPoint::new(0.0, 10.0))
        .unwrap();
    assert_eq!(left_top.to, MarkPoint::new(35.0, 10.0));
}

#[test]
fn test_coincident_edge_lines_are_deduplicated() {
    let marks = face_marks(&strip_config(0.0, 0.0), CutLineMode::Normal);

    // The shared trim line at x = 100 is drawn once at the top and bottom
    assert_eq!(marks.lines().len(), 10);
}

#[test]
fn test_complete_draws_both_kinds() {
    let marks = face_marks(&strip_config(10.0, 2.0), CutLineMode::Complete);
    assert_eq!(marks.crosses().len(), 8);
    assert_eq!(marks.lines().len(), 12);
}

#[test]
fn test_none_draws_nothing() {
    let marks = face_marks(&strip_config(10.0, 2.0), CutLineMode::None);
    assert!(marks.is_empty());

    let style = MarkStyle {
        line_weight_pt: 0.5,
        color: Rgb::BLACK,
    };
    assert_eq!(marks.to_pdf_ops(&style, 100.0), "");
}

#[test]
fn test_pdf_ops_stroke_every_segment() {
    let marks = face_marks(&strip_config(10.0, 2.0), CutLineMode::Complete);
    let style = MarkStyle {
        line_weight_pt: 0.25,
        color: Rgb::new(255, 0, 0),
    };
    let ops = marks.to_pdf_ops(&style, 100.0);

    assert!(ops.starts_with("q\n"));
    assert!(ops.ends_with("Q\n"));
    assert!(ops.contains("1 0 0 RG"));
    assert!(ops.contains("0.25 w"));

    let strokes = ops.lines().filter(|line| line.ends_with(" l S")).count();
    assert_eq!(strokes, marks.lines().len() + 2 * marks.crosses().len());
}

#[test]
fn test_mark_point_snaps_float_noise() {
    assert_eq!(MarkPoint::new(35.000_002, 10.0), MarkPoint::new(35.0, 10.0));
    assert_ne!(MarkPoint::new(35.01, 10.0), MarkPoint::new(35.0, 10.0));
}

#[test]
fn test_interior_corners_collapse_across_scales() {
    for scale in 50..=124 {
        let config = SheetConfig {
            paper_size: PaperSize::A3,
            columns: 3,
            rows: 3,
            auto_columns_rows: false,
            scale_percent: scale as f32,
            ..Default::default()
        };

        let crosses = face_marks(&config, CutLineMode::Cross);
        assert_eq!(crosses.crosses().len(), 16, "scale {}%", scale);

        // Four shared trim lines run to each sheet edge
        let lines = face_marks(&config, CutLineMode::Normal);
        assert_eq!(lines.lines().len(), 16, "scale {}%", scale);
    }
}

#[test]
fn test_near_coincident_corners_share_one_cross() {
    let config = strip_config(0.0, 0.0);
    let geometry = SheetGeometry::new(&config, PageType::Face).unwrap();
    let left = geometry.place(0, FlipTransform::Identity);
    let mut right = geometry.place(1, FlipTransform::Identity);
    // Right tile starts at 99.994, one key below the left tile's edge
    right.tile.x -= 0.006;

    let marks = generate_cut_marks(&[left, right], &geometry, CutLineMode::Cross);
    assert_eq!(marks.crosses().len(), 6);
}
