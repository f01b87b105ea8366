use crate::impose::{
    Binding, CardsImpositor, CopyCutFoldImpositor, CutStackFoldImpositor, Impositor,
    OnePageZineImpositor, PerfectImpositor, Settings, WireImpositor,
};
use crate::constants::SIZE_TOLERANCE;
use crate::layout::{Size, fit_with_gap, largest_power_of_two, signature_to_folds, validate_folds};
use crate::types::*;
use crate::units::Creep;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Imposition schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Schema {
    /// Cut into cards printed on both sides
    #[default]
    Cards,
    /// Cut into leaves, stacked and wire bound
    Wire,
    /// Cut, stacked, then folded once into one booklet
    CutStackFold,
    /// Identical booklets, one per piece of the sheet
    CopyCutFold,
    /// Eight pages on one side of a sheet
    OnePageZine,
    /// Folded signatures, glued one after the other
    Perfect,
    /// Folded sheets, all nested and stitched on the fold
    Saddle,
    /// Folded signatures, sewn into a hard cover
    Hardcover,
}

impl Schema {
    pub const ALL: [Schema; 8] = [
        Schema::Cards,
        Schema::Wire,
        Schema::CutStackFold,
        Schema::CopyCutFold,
        Schema::OnePageZine,
        Schema::Perfect,
        Schema::Saddle,
        Schema::Hardcover,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Schema::Cards => "cards",
            Schema::Wire => "wire",
            Schema::CutStackFold => "cutstackfold",
            Schema::CopyCutFold => "copycutfold",
            Schema::OnePageZine => "onepagezine",
            Schema::Perfect => "perfect",
            Schema::Saddle => "saddle",
            Schema::Hardcover => "hardcover",
        }
    }

    /// Sheets are folded along a fold sequence
    pub fn is_folded(self) -> bool {
        matches!(self, Schema::Perfect | Schema::Saddle | Schema::Hardcover)
    }

    /// Each signature cell is a pair of facing pages
    fn is_paired(self) -> bool {
        matches!(self, Schema::CutStackFold | Schema::CopyCutFold)
    }

    pub fn has_bind(self) -> bool {
        !matches!(self, Schema::Cards | Schema::Wire)
    }

    pub fn has_creep(self) -> bool {
        matches!(
            self,
            Schema::CutStackFold | Schema::CopyCutFold | Schema::Saddle | Schema::Hardcover
        )
    }

    pub fn has_group(self) -> bool {
        matches!(
            self,
            Schema::CutStackFold | Schema::CopyCutFold | Schema::Perfect | Schema::Hardcover
        )
    }

    fn binding(self) -> Binding {
        match self {
            Schema::Saddle => Binding::Saddle,
            Schema::Hardcover => Binding::Hardcover,
            _ => Binding::Perfect,
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Schema {
    type Err = ImposeError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Schema::ALL
            .into_iter()
            .find(|schema| schema.name() == wanted)
            .ok_or_else(|| ImposeError::Parse(format!("Unknown schema '{s}'")))
    }
}

/// How source pages are laid out on an output sheet
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Layout {
    /// Explicit grid of pages (or piece pairs) per sheet side
    Signature { width: usize, height: usize },
    /// As many pages as fit on this paper, centered
    Format(PaperSize),
    /// Explicit fold sequence (folded schemas only)
    Folds(String),
}

/// Comprehensive imposition configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ImpositionOptions {
    // Input
    pub input_files: Vec<PathBuf>,

    // Output, `<first input>-impose.pdf` when unset
    pub output_file: Option<PathBuf>,

    pub schema: Schema,

    // None means an A4 sheet, except for the one-page zine whose sheet is
    // just large enough
    pub layout: Option<Layout>,

    // Margins, in points
    pub imargin: f64,
    pub omargin: Margins,

    // Source pages kept at the end
    pub last: usize,

    pub marks: Marks,
    pub bind: Bind,
    pub creep: Creep,

    // Sheets per signature; None for the schema default
    pub group: Option<usize>,
}

impl Default for ImpositionOptions {
    fn default() -> Self {
        Self {
            input_files: Vec::new(),
            output_file: None,
            schema: Schema::Cards,
            layout: None,
            imargin: 0.0,
            omargin: Margins::default(),
            last: 0,
            marks: Marks::default(),
            bind: Bind::Left,
            creep: Creep::None,
            group: None,
        }
    }
}

/// Arrangement a layout resolves to, for a given schema
#[derive(Debug, Clone, PartialEq)]
enum Arrangement {
    Grid((usize, usize)),
    Folds(String),
    Fixed,
}

impl ImpositionOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| ImposeError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ImposeError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.input_files.is_empty() {
            return Err(ImposeError::Config("No input files specified".to_string()));
        }

        let margins = [
            self.imargin,
            self.omargin.left,
            self.omargin.right,
            self.omargin.top,
            self.omargin.bottom,
        ];
        if margins.iter().any(|m| !m.is_finite() || *m < 0.0) {
            return Err(ImposeError::Config(
                "Margins must be non-negative lengths".to_string(),
            ));
        }

        match &self.layout {
            Some(Layout::Signature { width, height }) => {
                if *width == 0 || *height == 0 {
                    return Err(ImposeError::Config(
                        "Signature dimensions must be non-zero".to_string(),
                    ));
                }
                if self.schema == Schema::OnePageZine {
                    return Err(ImposeError::Config(
                        "The onepagezine schema has a fixed 4x2 signature".to_string(),
                    ));
                }
                if self.schema.is_folded() {
                    signature_to_folds(*width, *height)?;
                }
            }
            Some(Layout::Folds(folds)) => {
                if !self.schema.is_folded() {
                    return Err(ImposeError::Config(format!(
                        "The {} schema does not use fold sequences",
                        self.schema
                    )));
                }
                validate_folds(folds)?;
            }
            Some(Layout::Format(_)) | None => {}
        }

        if !self.schema.has_bind() && self.bind != Bind::Left {
            return Err(ImposeError::Config(format!(
                "The {} schema has no binding edge",
                self.schema
            )));
        }
        if !self.schema.has_creep() && !self.creep.is_none() {
            return Err(ImposeError::Config(format!(
                "The {} schema does not use creep",
                self.schema
            )));
        }
        if !self.schema.has_group() && self.group.is_some() {
            return Err(ImposeError::Config(format!(
                "The {} schema does not group sheets",
                self.schema
            )));
        }

        Ok(())
    }

    /// Where the imposed document is written
    pub fn output_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.output_file {
            return Ok(path.clone());
        }
        let first = self
            .input_files
            .first()
            .ok_or_else(|| ImposeError::Config("No input files specified".to_string()))?;
        Ok(default_output_path(first))
    }

    fn settings(&self) -> Settings {
        Settings {
            last: self.last,
            omargin: self.omargin,
            marks: self.marks,
        }
    }

    /// Build the impositor for `source_pages` pages of size `source`.
    ///
    /// With a paper format, the page block is centered on the paper and the
    /// output margins grow to fill it.
    pub fn build(&self, source: Size, source_pages: usize) -> Result<Box<dyn Impositor>> {
        let layout = match (&self.layout, self.schema) {
            (Some(layout), _) => Some(layout.clone()),
            (None, Schema::OnePageZine) => None,
            (None, _) => Some(Layout::Format(PaperSize::default())),
        };

        let (arrangement, paper) = match layout {
            None => (Arrangement::Fixed, None),
            Some(Layout::Signature { width, height }) => {
                let arrangement = if self.schema.is_folded() {
                    Arrangement::Folds(signature_to_folds(width, height)?)
                } else {
                    Arrangement::Grid((width, height))
                };
                (arrangement, None)
            }
            Some(Layout::Folds(folds)) => (Arrangement::Folds(folds), None),
            Some(Layout::Format(paper)) => {
                let paper = Size::from(paper.dimensions_pt());
                let (arrangement, oriented) = self.fit_paper(source, paper)?;
                (arrangement, Some(oriented))
            }
        };
        log::debug!("Layout resolved to {arrangement:?}");

        let Some(paper) = paper else {
            return self.make(self.settings(), &arrangement);
        };

        let plain = self.make(
            Settings {
                omargin: Margins::default(),
                ..self.settings()
            },
            &arrangement,
        )?;
        let block = block_size(plain.as_ref(), source, source_pages);
        let paper = [paper, paper.swapped()]
            .into_iter()
            .find(|paper| {
                block.width <= paper.width + SIZE_TOLERANCE
                    && block.height <= paper.height + SIZE_TOLERANCE
            })
            .ok_or(ImposeError::Oversize {
                page: block.as_tuple(),
                sheet: paper.as_tuple(),
            })?;

        let horizontal = ((paper.width - block.width) / 2.0).max(0.0);
        let vertical = ((paper.height - block.height) / 2.0).max(0.0);
        log::debug!(
            "Centering a {:.1}x{:.1} pt block on {:.1}x{:.1} pt paper",
            block.width,
            block.height,
            paper.width,
            paper.height
        );
        self.make(
            Settings {
                omargin: Margins::new(horizontal, horizontal, vertical, vertical),
                ..self.settings()
            },
            &arrangement,
        )
    }

    /// Largest arrangement fitting on `paper`, and the paper orientation it uses
    fn fit_paper(&self, source: Size, paper: Size) -> Result<(Arrangement, Size)> {
        if self.schema == Schema::OnePageZine {
            return Ok((Arrangement::Fixed, paper));
        }

        let available = Size::new(
            paper.width - self.omargin.horizontal(),
            paper.height - self.omargin.vertical(),
        );
        let footprint = if self.schema.has_bind() && self.bind.is_horizontal() {
            source.swapped()
        } else {
            source
        };

        if !self.schema.is_folded() && !self.schema.is_paired() {
            let fit = fit_with_gap(footprint, self.imargin, available)?;
            return Ok((Arrangement::Grid(fit.signature), fit.oriented(paper)));
        }

        let pair = Size::new(2.0 * footprint.width, footprint.height);
        let fit = fit_with_gap(pair, self.imargin, available)?;
        if self.schema.is_paired() {
            return Ok((Arrangement::Grid(fit.signature), fit.oriented(paper)));
        }

        let (pairs, rows) = fit.signature;
        let width = largest_power_of_two(2 * pairs);
        let height = largest_power_of_two(rows);
        let folds = signature_to_folds(width, height)?;
        Ok((Arrangement::Folds(folds), fit.oriented(paper)))
    }

    fn make(&self, settings: Settings, arrangement: &Arrangement) -> Result<Box<dyn Impositor>> {
        let group = self.group;
        let impositor: Box<dyn Impositor> = match (self.schema, arrangement) {
            (Schema::Cards, Arrangement::Grid(signature)) => {
                Box::new(CardsImpositor::new(settings, *signature, self.imargin))
            }
            (Schema::Wire, Arrangement::Grid(signature)) => {
                Box::new(WireImpositor::new(settings, *signature, self.imargin))
            }
            (Schema::CutStackFold, Arrangement::Grid(signature)) => Box::new(
                CutStackFoldImpositor::new(settings, *signature, self.imargin)
                    .with_bind(self.bind)
                    .with_creep(self.creep)
                    .with_group(group.unwrap_or(0)),
            ),
            (Schema::CopyCutFold, Arrangement::Grid(signature)) => Box::new(
                CopyCutFoldImpositor::new(settings, *signature, self.imargin)
                    .with_bind(self.bind)
                    .with_creep(self.creep)
                    .with_group(group.unwrap_or(0)),
            ),
            (Schema::OnePageZine, Arrangement::Fixed) => {
                Box::new(OnePageZineImpositor::new(settings, self.imargin).with_bind(self.bind))
            }
            (schema, Arrangement::Folds(folds)) if schema.is_folded() => {
                let mut impositor =
                    PerfectImpositor::new(settings, schema.binding(), folds, self.imargin)?
                        .with_bind(self.bind)
                        .with_creep(self.creep);
                if let Some(group) = group {
                    impositor = impositor.with_group(group);
                }
                Box::new(impositor)
            }
            (schema, arrangement) => {
                return Err(ImposeError::Config(format!(
                    "The {schema} schema cannot use {arrangement:?}"
                )));
            }
        };
        Ok(impositor)
    }
}

/// Size of the first output page for `source_pages` pages
fn block_size(impositor: &dyn Impositor, source: Size, source_pages: usize) -> Size {
    let pages = source_pages.max(1);
    let padded = pages + impositor.blank_page_number(pages);
    impositor
        .matrixes(padded)
        .next()
        .map(|matrix| matrix.pagesize(source))
        .unwrap_or_default()
}

/// `"-impose"` appended to the stem of `input`, in the same directory
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{stem}-impose.{}", ext.to_string_lossy()),
        None => format!("{stem}-impose"),
    };
    input.with_file_name(name)
}
