use crate::constants::mm_to_pt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImposeError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("No pages to impose")]
    NoPages,
    #[error(
        "Source page ({:.1}x{:.1} pt) does not fit on destination ({:.1}x{:.1} pt)",
        .page.0, .page.1, .sheet.0, .sheet.1
    )]
    Oversize { page: (f64, f64), sheet: (f64, f64) },
    #[error("Fold sequence '{folds}' cannot be used: {reason}")]
    IncompatibleFolds { folds: String, reason: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("{}: {reason}", .path.display())]
    Source { path: std::path::PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, ImposeError>;

/// Rotation of a source page on the output sheet, counter-clockwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
    #[default]
    None,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Build a rotation from any multiple of 90 degrees (negative values allowed)
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::None),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    /// True for 90 and 270: the page footprint has width and height swapped
    pub fn is_sideways(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

impl std::ops::Add for Rotation {
    type Output = Rotation;

    fn add(self, other: Rotation) -> Rotation {
        match (self.degrees() + other.degrees()) % 360 {
            90 => Rotation::Deg90,
            180 => Rotation::Deg180,
            270 => Rotation::Deg270,
            _ => Rotation::None,
        }
    }
}

impl std::ops::AddAssign for Rotation {
    fn add_assign(&mut self, other: Rotation) {
        *self = *self + other;
    }
}

/// Binding edge of the finished booklet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Bind {
    #[default]
    Left,
    Top,
    Right,
    Bottom,
}

impl Bind {
    /// Angle applied to a whole sheet so that its spine ends up on this edge
    pub fn angle(self) -> Rotation {
        match self {
            Bind::Left => Rotation::None,
            Bind::Top => Rotation::Deg90,
            Bind::Right => Rotation::Deg180,
            Bind::Bottom => Rotation::Deg270,
        }
    }

    /// Top and bottom bindings lay source pages sideways
    pub fn is_horizontal(self) -> bool {
        matches!(self, Bind::Top | Bind::Bottom)
    }
}

impl std::str::FromStr for Bind {
    type Err = ImposeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Bind::Left),
            "top" => Ok(Bind::Top),
            "right" => Ok(Bind::Right),
            "bottom" => Ok(Bind::Bottom),
            other => Err(ImposeError::Parse(format!("Unknown binding edge '{other}'"))),
        }
    }
}

/// Four margins, in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Margins {
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Create uniform margins on all sides
    pub fn uniform(margin: f64) -> Self {
        Self::new(margin, margin, margin, margin)
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Printer's marks requested on the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Marks {
    /// Short lines in the output margins showing where to cut
    pub crop: bool,
    /// Small filled rectangles on the spine showing the collation order
    pub bind: bool,
}

impl Marks {
    pub fn any(&self) -> bool {
        self.crop || self.bind
    }
}

/// Standard paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaperSize {
    A0,
    A1,
    A2,
    A3,
    #[default]
    A4,
    A5,
    A6,
    B4,
    B5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: f64, height_mm: f64 },
}

impl PaperSize {
    /// Get base dimensions (always portrait for standard sizes)
    pub fn dimensions_mm(self) -> (f64, f64) {
        match self {
            PaperSize::A0 => (841.0, 1189.0),
            PaperSize::A1 => (594.0, 841.0),
            PaperSize::A2 => (420.0, 594.0),
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::A6 => (105.0, 148.0),
            PaperSize::B4 => (250.0, 353.0),
            PaperSize::B5 => (176.0, 250.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::Tabloid => (279.4, 431.8),
            PaperSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    /// Dimensions in points
    pub fn dimensions_pt(self) -> (f64, f64) {
        let (w, h) = self.dimensions_mm();
        (mm_to_pt(w), mm_to_pt(h))
    }
}

/// Statistics about the imposition
#[derive(Debug, Clone, PartialEq)]
pub struct ImpositionStatistics {
    /// Total number of source pages
    pub source_pages: usize,
    /// Number of blank pages added for padding
    pub blank_pages_added: usize,
    /// Source pages after padding
    pub padded_pages: usize,
    /// Output page count (one per imposition matrix)
    pub output_pages: usize,
    /// Total number of physical sheets
    pub output_sheets: usize,
}
