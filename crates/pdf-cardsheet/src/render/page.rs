//! Card sheet page rendering
//!
//! Each page's content stream is built in three layers: margin fill
//! rectangles, cut marks, then the tile images. Page numbers go last.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::config::SheetConfig;
use crate::constants::{
    HELVETICA_CHAR_WIDTH_RATIO, PAGE_NUMBER_FONT_SIZE, PAGE_NUMBER_OFFSET, mm_to_pt,
};
use crate::fill::ColorCache;
use crate::layout::{FlipTransform, PageJob, Rect, SheetGeometry, TilePlacement, TileSource};
use crate::marks::{MarkStyle, generate_cut_marks};
use crate::store::ImageStore;
use crate::types::{PageType, Result};

use super::image::{ImageEmbedder, PreviewQuality};

/// Renders page jobs of one export into an output document.
///
/// Geometry for face and back pages is computed once up front; embedded
/// images and the page number font are shared between pages.
pub struct SheetRenderer<'a> {
    config: &'a SheetConfig,
    store: &'a dyn ImageStore,
    colors: &'a ColorCache,
    face: SheetGeometry,
    back: SheetGeometry,
    images: ImageEmbedder,
    font_id: Option<ObjectId>,
}

impl<'a> SheetRenderer<'a> {
    pub fn new(
        config: &'a SheetConfig,
        store: &'a dyn ImageStore,
        colors: &'a ColorCache,
        quality: PreviewQuality,
    ) -> Result<Self> {
        Ok(Self {
            config,
            store,
            colors,
            face: SheetGeometry::new(config, PageType::Face)?,
            back: SheetGeometry::new(config, PageType::Back)?,
            images: ImageEmbedder::new(quality),
            font_id: None,
        })
    }

    pub fn geometry(&self, page_type: PageType) -> &SheetGeometry {
        match page_type {
            PageType::Face => &self.face,
            PageType::Back => &self.back,
        }
    }

    /// Placements of the filled slots of a job, in slot order
    pub fn placements<'j>(&self, job: &'j PageJob) -> Vec<(TilePlacement, &'j TileSource)> {
        let geometry = self.geometry(job.page_type);
        let transform = FlipTransform::resolve(
            job.page_type,
            self.config.effective_flip(),
            self.config.landscape,
        );

        job.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                slot.as_ref()
                    .map(|tile| (geometry.place(index, transform), tile))
            })
            .collect()
    }

    /// Render one page and return its object id.
    ///
    /// `page_number` is 1-based and only drawn when page numbers are enabled.
    pub fn render_page(
        &mut self,
        output: &mut Document,
        parent_pages_id: ObjectId,
        job: &PageJob,
        page_number: usize,
    ) -> Result<ObjectId> {
        let geometry = self.geometry(job.page_type).clone();
        let sheet_width_pt = mm_to_pt(geometry.sheet_width);
        let sheet_height_pt = mm_to_pt(geometry.sheet_height);
        let placements = self.placements(job);

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(parent_pages_id));
        page_dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(sheet_width_pt),
                Object::Real(sheet_height_pt),
            ]),
        );

        let mut content_ops = Vec::new();

        if self.config.margin_filling {
            for (placement, tile) in &placements {
                if let Some(color) = self.colors.color_of(&tile.image.key) {
                    let (x, y, w, h) = to_pdf_rect(&placement.fill_area(), geometry.sheet_height);
                    content_ops.push(format!(
                        "q {} rg {} {} {} {} re f Q\n",
                        color.to_pdf_operands(),
                        x,
                        y,
                        w,
                        h
                    ));
                }
            }
        }

        let just_placements: Vec<TilePlacement> =
            placements.iter().map(|(placement, _)| placement.clone()).collect();
        let marks = generate_cut_marks(
            &just_placements,
            &geometry,
            self.config.cut_line_for(job.page_type),
        );
        let style = MarkStyle {
            line_weight_pt: self.config.line_weight_pt,
            color: self.config.cutline_color,
        };
        content_ops.push(marks.to_pdf_ops(&style, geometry.sheet_height));

        let mut xobjects = Dictionary::new();
        let mut names: HashMap<ObjectId, String> = HashMap::new();
        for (placement, tile) in &placements {
            let Some(xobject_id) =
                self.images
                    .xobject_for(output, self.store, &tile.image.key)
            else {
                continue;
            };

            let next_index = names.len();
            let name = names
                .entry(xobject_id)
                .or_insert_with(|| format!("Im{}", next_index))
                .clone();
            xobjects.set(name.as_bytes(), Object::Reference(xobject_id));

            let artwork = geometry.artwork_rect(placement, tile.bleed);
            let clip = tile.bleed.map(|_| placement.tile);
            content_ops.push(generate_image_command(
                &name,
                &artwork,
                clip.as_ref(),
                placement.rotated,
                geometry.sheet_height,
            ));
        }

        let mut fonts = Dictionary::new();
        if self.config.page_number {
            let font_id = self.page_number_font(output);
            fonts.set("F1", Object::Reference(font_id));
            content_ops.push(page_number_ops(page_number, sheet_width_pt));
        }

        let mut resources = Dictionary::new();
        if !xobjects.is_empty() {
            resources.set("XObject", Object::Dictionary(xobjects));
        }
        if !fonts.is_empty() {
            resources.set("Font", Object::Dictionary(fonts));
        }

        let content = content_ops.join("");
        let content_id = output.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        page_dict.set("Contents", Object::Reference(content_id));
        page_dict.set("Resources", Object::Dictionary(resources));

        Ok(output.add_object(page_dict))
    }

    fn page_number_font(&mut self, output: &mut Document) -> ObjectId {
        *self.font_id.get_or_insert_with(|| {
            let mut font_dict = Dictionary::new();
            font_dict.set("Type", Object::Name(b"Font".to_vec()));
            font_dict.set("Subtype", Object::Name(b"Type1".to_vec()));
            font_dict.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
            output.add_object(font_dict)
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Convert a page-space rectangle (mm, top-left origin) to PDF space
/// `(x, y, width, height)` in points with a bottom-left origin
fn to_pdf_rect(rect: &Rect, sheet_height_mm: f32) -> (f32, f32, f32, f32) {
    (
        mm_to_pt(rect.x),
        mm_to_pt(sheet_height_mm - rect.bottom()),
        mm_to_pt(rect.width),
        mm_to_pt(rect.height),
    )
}

/// Content stream command that paints an image XObject into `rect`.
///
/// The image is stretched over the rectangle. A 180° rotation keeps the
/// rectangle and flips the image inside it.
fn generate_image_command(
    name: &str,
    rect: &Rect,
    clip: Option<&Rect>,
    rotated: bool,
    sheet_height_mm: f32,
) -> String {
    let (x, y, w, h) = to_pdf_rect(rect, sheet_height_mm);

    let mut ops = String::from("q\n");
    if let Some(clip) = clip {
        let (cx, cy, cw, ch) = to_pdf_rect(clip, sheet_height_mm);
        ops.push_str(&format!("{} {} {} {} re W n\n", cx, cy, cw, ch));
    }

    if rotated {
        ops.push_str(&format!(
            "{} 0 0 {} {} {} cm /{} Do\n",
            -w,
            -h,
            x + w,
            y + h,
            name
        ));
    } else {
        ops.push_str(&format!("{} 0 0 {} {} {} cm /{} Do\n", w, h, x, y, name));
    }

    ops.push_str("Q\n");
    ops
}

/// Page number centered in the bottom margin
fn page_number_ops(page_number: usize, sheet_width_pt: f32) -> String {
    let text = page_number.to_string();
    let text_width = text.len() as f32 * PAGE_NUMBER_FONT_SIZE * HELVETICA_CHAR_WIDTH_RATIO;
    let text_x = sheet_width_pt / 2.0 - text_width / 2.0;

    format!(
        "BT /F1 {} Tf {} {} Td ({}) Tj ET\n",
        PAGE_NUMBER_FONT_SIZE, text_x, PAGE_NUMBER_OFFSET, text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_flips_to_bottom_left_origin() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        let (x, y, w, h) = to_pdf_rect(&rect, 100.0);

        assert!((x - mm_to_pt(10.0)).abs() < 1e-3);
        assert!((y - mm_to_pt(40.0)).abs() < 1e-3);
        assert!((w - mm_to_pt(30.0)).abs() < 1e-3);
        assert!((h - mm_to_pt(40.0)).abs() < 1e-3);
    }

    #[test]
    fn test_rotated_image_uses_negative_scale() {
        let rect = Rect::new(0.0, 0.0, 25.4, 25.4);
        let ops = generate_image_command("Im0", &rect, None, true, 25.4);

        let cm = ops.lines().find(|line| line.ends_with("cm /Im0 Do")).unwrap();
        let operands: Vec<f32> = cm
            .split_whitespace()
            .take(6)
            .map(|v| v.parse().unwrap())
            .collect();
        assert!(operands[0] < 0.0 && operands[3] < 0.0);
        assert!((operands[4] - 72.0).abs() < 1e-3);
        assert!((operands[5] - 72.0).abs() < 1e-3);
        assert!(!ops.contains(" W n"));
    }

    #[test]
    fn test_clip_precedes_image() {
        let rect = Rect::new(0.0, 0.0, 25.4, 25.4);
        let ops = generate_image_command("Im0", &rect, Some(&rect), false, 25.4);

        let clip_at = ops.find("re W n").unwrap();
        let draw_at = ops.find("Do").unwrap();
        assert!(clip_at < draw_at);
    }

    #[test]
    fn test_page_number_centered() {
        let ops = page_number_ops(12, 200.0);
        // Two digits at 8pt, 0.5 width ratio
        assert!(ops.contains("96 10 Td (12) Tj"));
    }
}
