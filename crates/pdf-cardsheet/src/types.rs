use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Unusable image: {0}")]
    UnusableImage(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid configuration: {field}: {message}")]
    Config { field: String, message: String },
    #[error("Preset error: {0}")]
    Preset(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("No page at index {0}")]
    NoPage(usize),
    #[error("Export cancelled")]
    Cancelled,
}

impl SheetError {
    pub(crate) fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        SheetError::Config {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;

/// Standard paper sizes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaperSize {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PaperSize {
    /// Get base dimensions (always portrait: width < height for standard sizes)
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::Tabloid => (279.4, 431.8),
            PaperSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    /// Get dimensions with the landscape flag applied
    pub fn dimensions_with_orientation(self, landscape: bool) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        if landscape { (h, w) } else { (w, h) }
    }
}

/// How cards are distributed over the two sides of the sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SidesMode {
    /// Faces only
    #[default]
    OneSide,
    /// Face page followed by its back page
    DoubleSides,
    /// Face and back printed for folding the sheet in half
    FoldInHalf,
    /// Saddle-stitch booklet order
    Brochure,
}

/// Duplex binding edge used to align back pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlipWay {
    #[default]
    None,
    LongEdgeBinding,
    ShortEdgeBinding,
}

/// Cut-mark style for one page type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CutLineMode {
    #[default]
    None,
    /// Lines from the sheet edge to the outer tiles
    Normal,
    /// Crosses on every trim corner
    Cross,
    /// Both of the above
    Complete,
}

impl CutLineMode {
    pub fn draws_normal(self) -> bool {
        matches!(self, CutLineMode::Normal | CutLineMode::Complete)
    }

    pub fn draws_cross(self) -> bool {
        matches!(self, CutLineMode::Cross | CutLineMode::Complete)
    }
}

/// Which side of the physical sheet a page prints on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    Face,
    Back,
}

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// PDF color operands in the 0..1 range
    pub fn to_pdf_operands(self) -> String {
        format!(
            "{} {} {}",
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0
        )
    }
}

/// Reference to an image held by an [`ImageStore`](crate::ImageStore)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageRef {
    /// Normalized lookup key (forward slashes, no leading `./`)
    pub key: String,
    /// Lowercase file extension, empty when unknown
    pub format: String,
}

impl ImageRef {
    pub fn new(path: impl AsRef<str>) -> Self {
        let key = normalize_key(path.as_ref());
        let format = key
            .rsplit_once('.')
            .filter(|(_, ext)| !ext.contains('/'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        Self { key, format }
    }
}

fn normalize_key(path: &str) -> String {
    let mut key = path.trim().replace('\\', "/");
    while let Some(rest) = key.strip_prefix("./") {
        key = rest.to_string();
    }
    key
}

/// Per-card bleed, used when the card's artwork carries a different bleed
/// than the sheet configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BleedOverride {
    pub x_mm: f32,
    pub y_mm: f32,
}

/// One logical card in the card list
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Card {
    pub id: String,
    pub face: ImageRef,
    #[cfg_attr(feature = "serde", serde(default))]
    pub back: Option<ImageRef>,
    #[cfg_attr(feature = "serde", serde(default = "default_repeat"))]
    pub repeat: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bleed: Option<BleedOverride>,
}

#[cfg(feature = "serde")]
fn default_repeat() -> u32 {
    1
}

impl Card {
    pub fn new(id: impl Into<String>, face: ImageRef) -> Self {
        Self {
            id: id.into(),
            face,
            back: None,
            repeat: 1,
            bleed: None,
        }
    }

    pub fn with_back(mut self, back: ImageRef) -> Self {
        self.back = Some(back);
        self
    }

    pub fn with_repeat(mut self, repeat: u32) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn with_bleed(mut self, x_mm: f32, y_mm: f32) -> Self {
        self.bleed = Some(BleedOverride { x_mm, y_mm });
        self
    }
}

/// Statistics about a planned export
#[derive(Debug, Clone, PartialEq)]
pub struct SheetStatistics {
    /// Cards after repeat expansion
    pub expanded_cards: usize,
    /// Tiles per page (`rows * columns`)
    pub tiles_per_page: usize,
    /// Face pages in the output
    pub face_pages: usize,
    /// Back pages in the output
    pub back_pages: usize,
    /// Total output pages
    pub output_pages: usize,
    /// Physical sheets to print
    pub output_sheets: usize,
    /// Empty slots: grid padding on face pages, or every blank booklet page
    /// in brochure mode
    pub blank_slots: usize,
}
