//! Parsing of user-facing values: lengths, paper sizes, signatures and creep
//!
//! All lengths are converted to PDF points.

use crate::constants::{POINTS_PER_INCH, POINTS_PER_PICA, mm_to_pt, pt_to_mm};
use crate::types::*;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

static LENGTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<value>[+-]?(?:\d+(?:\.\d*)?|\.\d+))\s*(?P<unit>[a-zA-Z]*)\s*$")
        .expect("length pattern is valid")
});

static CREEP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?P<slope>-?\d+(?:\.\d+)?)x(?P<intercept>[+-]\d+(?:\.\d+)?)?\s*(?P<unit>[a-zA-Z]+)?\s*$",
    )
    .expect("creep pattern is valid")
});

static SIGNATURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<width>\d+)\s*[xX]\s*(?P<height>\d+)\s*$")
        .expect("signature pattern is valid")
});

/// Size of one unit, in points
fn unit_to_pt(unit: &str) -> Result<f64> {
    match unit.to_ascii_lowercase().as_str() {
        "" | "pt" => Ok(1.0),
        "mm" => Ok(mm_to_pt(1.0)),
        "cm" => Ok(mm_to_pt(10.0)),
        "dm" => Ok(mm_to_pt(100.0)),
        "m" => Ok(mm_to_pt(1000.0)),
        "in" => Ok(POINTS_PER_INCH),
        "pc" => Ok(POINTS_PER_PICA),
        other => Err(ImposeError::Parse(format!("Unknown unit '{other}'"))),
    }
}

/// Parse a length with an optional unit (`12`, `1.5cm`, `2in`) into points
pub fn parse_length(text: &str) -> Result<f64> {
    let caps = LENGTH_RE
        .captures(text)
        .ok_or_else(|| ImposeError::Parse(format!("Invalid length '{text}'")))?;
    let value: f64 = caps["value"]
        .parse()
        .map_err(|_| ImposeError::Parse(format!("Invalid length '{text}'")))?;
    Ok(value * unit_to_pt(&caps["unit"])?)
}

/// Parse a signature such as `4x2` into (columns, rows)
pub fn parse_signature(text: &str) -> Result<(usize, usize)> {
    let caps = SIGNATURE_RE
        .captures(text)
        .ok_or_else(|| ImposeError::Parse(format!("Invalid signature '{text}' (expected WxH)")))?;
    let width: usize = caps["width"]
        .parse()
        .map_err(|_| ImposeError::Parse(format!("Invalid signature '{text}'")))?;
    let height: usize = caps["height"]
        .parse()
        .map_err(|_| ImposeError::Parse(format!("Invalid signature '{text}'")))?;
    if width == 0 || height == 0 {
        return Err(ImposeError::Parse(format!(
            "Signature '{text}' must have non-zero dimensions"
        )));
    }
    Ok((width, height))
}

impl FromStr for PaperSize {
    type Err = ImposeError;

    /// Accepts a paper name (`A4`, `letter`) or explicit lengths (`21cmx29.7cm`)
    fn from_str(s: &str) -> Result<Self> {
        let named = match s.trim().to_ascii_lowercase().as_str() {
            "a0" => Some(PaperSize::A0),
            "a1" => Some(PaperSize::A1),
            "a2" => Some(PaperSize::A2),
            "a3" => Some(PaperSize::A3),
            "a4" => Some(PaperSize::A4),
            "a5" => Some(PaperSize::A5),
            "a6" => Some(PaperSize::A6),
            "b4" => Some(PaperSize::B4),
            "b5" => Some(PaperSize::B5),
            "letter" => Some(PaperSize::Letter),
            "legal" => Some(PaperSize::Legal),
            "tabloid" => Some(PaperSize::Tabloid),
            _ => None,
        };
        if let Some(paper) = named {
            return Ok(paper);
        }

        let (width, height) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| ImposeError::Parse(format!("Unknown paper size '{s}'")))?;
        let width = parse_length(width)?;
        let height = parse_length(height)?;
        if width <= 0.0 || height <= 0.0 {
            return Err(ImposeError::Parse(format!(
                "Paper size '{s}' must have positive dimensions"
            )));
        }
        Ok(PaperSize::Custom {
            width_mm: pt_to_mm(width),
            height_mm: pt_to_mm(height),
        })
    }
}

/// Extra space left at a fold, as a function of the number of sheets
/// nested inside it
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Creep {
    #[default]
    None,
    /// Same space at every depth (points)
    Constant(f64),
    /// `slope * depth + intercept` (points)
    Linear { slope: f64, intercept: f64 },
}

impl Creep {
    pub fn eval(&self, depth: usize) -> f64 {
        match *self {
            Creep::None => 0.0,
            Creep::Constant(value) => value,
            Creep::Linear { slope, intercept } => slope * depth as f64 + intercept,
        }
    }

    /// Largest creep over depths `0..count`
    pub fn max_over(&self, count: usize) -> f64 {
        (0..count.max(1))
            .map(|depth| self.eval(depth))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Creep::None)
    }
}

impl FromStr for Creep {
    type Err = ImposeError;

    /// Accepts a linear function of `x` with an optional unit (`.1x+2mm`,
    /// `-2x+3`), or a plain length (`3mm`)
    fn from_str(s: &str) -> Result<Self> {
        if !s.contains('x') {
            let value = parse_length(s)?;
            return Ok(if value == 0.0 {
                Creep::None
            } else {
                Creep::Constant(value)
            });
        }

        let invalid = || {
            ImposeError::Parse(format!(
                "Invalid creep function '{s}' (must be a linear function, with an optional unit, e.g. '2.3x-1mm')"
            ))
        };
        let caps = CREEP_RE.captures(s).ok_or_else(invalid)?;
        let slope: f64 = caps["slope"].parse().map_err(|_| invalid())?;
        let intercept: f64 = match caps.name("intercept") {
            Some(m) => m.as_str().parse().map_err(|_| invalid())?,
            None => 0.0,
        };
        let unit = unit_to_pt(caps.name("unit").map_or("", |m| m.as_str()))?;
        Ok(Creep::Linear {
            slope: slope * unit,
            intercept: intercept * unit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_parse_length_units() {
        assert!(close(parse_length("12").unwrap(), 12.0));
        assert!(close(parse_length("12pt").unwrap(), 12.0));
        assert!(close(parse_length("1in").unwrap(), 72.0));
        assert!(close(parse_length("2pc").unwrap(), 24.0));
        assert!(close(parse_length("25.4mm").unwrap(), 72.0));
        assert!(close(parse_length("2.54cm").unwrap(), 72.0));
        assert!(close(parse_length(" .5in ").unwrap(), 36.0));
    }

    #[test]
    fn test_parse_length_rejects_garbage() {
        assert!(parse_length("").is_err());
        assert!(parse_length("abc").is_err());
        assert!(parse_length("3furlongs").is_err());
    }

    #[test]
    fn test_parse_signature() {
        assert_eq!(parse_signature("4x2").unwrap(), (4, 2));
        assert_eq!(parse_signature("1X3").unwrap(), (1, 3));
        assert!(parse_signature("0x2").is_err());
        assert!(parse_signature("4").is_err());
    }

    #[test]
    fn test_parse_paper_size() {
        assert_eq!("a4".parse::<PaperSize>().unwrap(), PaperSize::A4);
        assert_eq!("Letter".parse::<PaperSize>().unwrap(), PaperSize::Letter);

        let custom: PaperSize = "21cmx29.7cm".parse().unwrap();
        let (w, h) = custom.dimensions_mm();
        assert!((w - 210.0).abs() < 1e-6);
        assert!((h - 297.0).abs() < 1e-6);

        assert!("A99".parse::<PaperSize>().is_err());
    }

    #[test]
    fn test_parse_creep() {
        assert_eq!("0".parse::<Creep>().unwrap(), Creep::None);
        assert_eq!("7".parse::<Creep>().unwrap(), Creep::Constant(7.0));

        let creep: Creep = "-2x+3".parse().unwrap();
        assert!(close(creep.eval(5), -7.0));

        let creep: Creep = "2.5x".parse().unwrap();
        assert!(close(creep.eval(2), 5.0));

        let creep: Creep = "2x-5pc".parse().unwrap();
        assert!(close(creep.eval(3), 12.0));

        assert!("2y+1".parse::<Creep>().is_err());
    }

    #[test]
    fn test_creep_max_over() {
        let creep = Creep::Linear {
            slope: -1.0,
            intercept: 4.0,
        };
        assert!(close(creep.max_over(3), 4.0));
        assert!(close(Creep::None.max_over(0), 0.0));
    }
}
