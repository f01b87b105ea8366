//! Signature and fold resolution
//!
//! This module turns what the user asked for (a paper format, a signature,
//! or a fold sequence) into a concrete grid of pages per sheet side.
//!
//! ## Fold sequences
//!
//! A fold sequence is a string of `h` and `v`:
//! - `h` halves the sheet width (the fold line is vertical)
//! - `v` halves the sheet height (the fold line is horizontal)
//!
//! The signature of a fold sequence is `(2^count(h), 2^count(v))`, and one
//! sheet holds twice that many pages (recto and verso). The last fold is the
//! spine of the folded signature, so it has to be an `h`.
//!
//! **Quarto (`vh`):**
//! - Recto: Top [4↓, 3↓], Bottom [7, 0]
//! - Verso: Top [2↓, 5↓], Bottom [1, 6]

use super::Size;
use crate::constants::RATIO_DIGITS;
use crate::types::*;

// =============================================================================
// Fitting pages on a sheet
// =============================================================================

/// A grid of source pages fitting on a destination sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fit {
    /// (columns, rows)
    pub signature: (usize, usize),
    /// The destination is used turned by 90 degrees (landscape for a
    /// portrait paper)
    pub rotated: bool,
}

impl Fit {
    pub fn cells(&self) -> usize {
        self.signature.0 * self.signature.1
    }

    /// Destination size in the orientation this fit uses
    pub fn oriented(&self, dest: Size) -> Size {
        if self.rotated { dest.swapped() } else { dest }
    }
}

/// Floor of `numerator / denominator`, after rounding away float noise
fn fitting_count(numerator: f64, denominator: f64) -> usize {
    let scale = 10f64.powi(RATIO_DIGITS);
    let ratio = ((numerator / denominator) * scale).round() / scale;
    if ratio.is_finite() && ratio > 0.0 {
        ratio.floor() as usize
    } else {
        0
    }
}

/// Largest grid of `source` pages fitting on `dest`.
///
/// Both orientations of the destination are tried; the turned one wins only
/// if it holds strictly more pages.
pub fn compute_signature(source: Size, dest: Size) -> Result<Fit> {
    let straight = Fit {
        signature: (
            fitting_count(dest.width, source.width),
            fitting_count(dest.height, source.height),
        ),
        rotated: false,
    };
    let turned = Fit {
        signature: (
            fitting_count(dest.height, source.width),
            fitting_count(dest.width, source.height),
        ),
        rotated: true,
    };

    let best = if turned.cells() > straight.cells() {
        turned
    } else {
        straight
    };
    if best.cells() == 0 {
        return Err(ImposeError::Oversize {
            page: source.as_tuple(),
            sheet: dest.as_tuple(),
        });
    }
    Ok(best)
}

/// Grid of `cell`s separated by `gap` fitting on `dest`.
///
/// Each cell is given half the gap on each side, so `n` cells need
/// `n * (cell + gap) - gap`.
pub fn fit_with_gap(cell: Size, gap: f64, dest: Size) -> Result<Fit> {
    compute_signature(
        Size::new(cell.width + gap, cell.height + gap),
        Size::new(dest.width + gap, dest.height + gap),
    )
    .map_err(|_| ImposeError::Oversize {
        page: cell.as_tuple(),
        sheet: dest.as_tuple(),
    })
}

/// Largest power of two not above `n` (`n >= 1`)
pub fn largest_power_of_two(n: usize) -> usize {
    debug_assert!(n > 0);
    1 << (usize::BITS - 1 - n.leading_zeros())
}

// =============================================================================
// Fold sequences
// =============================================================================

/// Signature `(2^count(h), 2^count(v))` of a fold sequence
pub fn folds_signature(folds: &str) -> (usize, usize) {
    let horizontal = folds.chars().filter(|&c| c == 'h').count();
    let vertical = folds.chars().filter(|&c| c == 'v').count();
    (1 << horizontal, 1 << vertical)
}

/// Check that a fold sequence can be bound on its last fold
pub fn validate_folds(folds: &str) -> Result<()> {
    let incompatible = |reason: &str| ImposeError::IncompatibleFolds {
        folds: folds.to_string(),
        reason: reason.to_string(),
    };
    if folds.is_empty() {
        return Err(incompatible("at least one fold is needed"));
    }
    if let Some(c) = folds.chars().find(|c| !matches!(c, 'h' | 'v')) {
        return Err(incompatible(&format!("unknown fold '{c}' (use 'h' or 'v')")));
    }
    if !folds.ends_with('h') {
        return Err(incompatible(
            "the last fold makes the spine and must be vertical ('h')",
        ));
    }
    Ok(())
}

/// Fold sequence producing a `width` x `height` signature.
///
/// The sequence is built from its end: the spine fold `h` comes last, and
/// going backwards folds alternate until one dimension is used up. For
/// instance `(2, 2)` gives `vh`, `(4, 2)` gives `hvh` and `(2, 4)` gives
/// `vvh`.
pub fn signature_to_folds(width: usize, height: usize) -> Result<String> {
    let incompatible = |reason: &str| ImposeError::IncompatibleFolds {
        folds: format!("{width}x{height}"),
        reason: reason.to_string(),
    };
    if !width.is_power_of_two() || !height.is_power_of_two() {
        return Err(incompatible(
            "both numbers of the signature must be powers of two",
        ));
    }
    if width < 2 {
        return Err(incompatible("a bound signature is at least two pages wide"));
    }

    let (mut width, mut height) = (width, height);
    let mut reversed = Vec::new();
    let mut horizontal = true;
    while width * height > 1 {
        if width == 1 {
            horizontal = false;
        } else if height == 1 {
            horizontal = true;
        }
        if horizontal {
            reversed.push('h');
            width /= 2;
        } else {
            reversed.push('v');
            height /= 2;
        }
        horizontal = !horizontal;
    }

    Ok(reversed.into_iter().rev().collect())
}

/// Convert an even number to the next odd one and an odd one to the
/// previous even one: the other side of the same leaf.
pub fn evenodd(n: usize) -> usize {
    if n % 2 == 0 { n + 1 } else { n - 1 }
}

/// Slot across the nearest fold line from slot `i`, where `start..start + len`
/// is the band just unfolded in a line of `len * 2` slots.
fn unfolded_partner(i: usize, start: usize, len: usize) -> usize {
    if i < start + len / 2 {
        2 * start - 1 - i
    } else {
        2 * (start + len) - 1 - i
    }
}

/// Page numbers on the recto of a sheet folded along `folds`, as `[x][y]`.
///
/// Starting from page 0, each fold is undone in turn: the sheet doubles
/// along one axis, and every new slot gets `total - partner - 1`, where
/// `partner` is the slot facing it across the fold.
pub fn fold_recto(folds: &str) -> Vec<Vec<usize>> {
    let mut recto: Vec<Vec<Option<usize>>> = vec![vec![Some(0)]];
    let mut total = 2;

    for fold in folds.chars() {
        total *= 2;
        match fold {
            'h' => {
                let width = recto.len();
                let height = recto[0].len();
                let half = width / 2;
                let mut grown = recto[..half].to_vec();
                grown.extend(std::iter::repeat_n(vec![None; height], width));
                grown.extend_from_slice(&recto[half..]);
                recto = grown;

                for x in half..half + width {
                    let partner = unfolded_partner(x, half, width);
                    for y in 0..height {
                        let facing = recto[partner][y].expect("partner slot is filled");
                        recto[x][y] = Some(total - facing - 1);
                    }
                }
            }
            'v' => {
                let height = recto[0].len();
                let half = height / 2;
                for column in recto.iter_mut() {
                    let mut grown = column[..half].to_vec();
                    grown.extend(std::iter::repeat_n(None, height));
                    grown.extend_from_slice(&column[half..]);
                    *column = grown;
                }

                for column in recto.iter_mut() {
                    for y in half..half + height {
                        let partner = unfolded_partner(y, half, height);
                        let facing = column[partner].expect("partner slot is filled");
                        column[y] = Some(total - facing - 1);
                    }
                }
            }
            other => panic!("unknown fold '{other}'"),
        }
    }

    recto
        .into_iter()
        .map(|column| {
            column
                .into_iter()
                .map(|n| n.expect("every slot is filled after unfolding"))
                .collect()
        })
        .collect()
}
