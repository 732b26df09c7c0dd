//! Exact half-integer spin arithmetic.
//!
//! Spins and helicity projections are stored as twice their value so that
//! half-integers stay exact integers. All angular-momentum indices across the
//! engine use this doubled representation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{AmpError, ErrorInfo};

fn spin_error(code: &str, message: impl Into<String>, value: &str) -> AmpError {
    AmpError::Document(ErrorInfo::new(code, message).with_context("value", value))
}

/// Parses a signed half-integer encoded as `"1/2"`, `"-3/2"`, `"1"` or `"0"`,
/// returning twice its value.
pub fn parse_half_integer(text: &str) -> Result<i32, AmpError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(spin_error("spin-empty", "empty spin value", text));
    }
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let doubled = match body.split_once('/') {
        Some((numerator, denominator)) => {
            if denominator.trim() != "2" {
                return Err(spin_error(
                    "spin-denominator",
                    "spin fractions must have denominator 2",
                    trimmed,
                ));
            }
            numerator.trim().parse::<i32>().map_err(|_| {
                spin_error(
                    "spin-numerator",
                    "spin numerator is not an integer",
                    trimmed,
                )
            })?
        }
        None => {
            let whole = body.trim().parse::<i32>().map_err(|_| {
                spin_error(
                    "spin-integer",
                    "spin value is not an integer or fraction",
                    trimmed,
                )
            })?;
            whole
                .checked_mul(2)
                .ok_or_else(|| spin_error("spin-overflow", "spin value out of range", trimmed))?
        }
    };
    Ok(if negative { -doubled } else { doubled })
}

/// Non-negative spin magnitude stored as twice its value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Spin(i32);

impl Spin {
    /// Spin zero.
    pub const ZERO: Spin = Spin(0);

    /// Builds a spin from twice its value, rejecting negatives.
    pub fn from_doubled(two_j: i32) -> Result<Self, AmpError> {
        if two_j < 0 {
            return Err(spin_error(
                "spin-negative",
                "spin magnitude must be non-negative",
                &format!("{two_j}/2"),
            ));
        }
        Ok(Spin(two_j))
    }

    /// Parses the boundary encoding of a spin magnitude (`"1/2"`, `"1"`, ...).
    pub fn parse(text: &str) -> Result<Self, AmpError> {
        Spin::from_doubled(parse_half_integer(text)?)
    }

    /// Twice the spin value.
    pub fn doubled(self) -> i32 {
        self.0
    }

    /// Number of helicity projections, `2j + 1`.
    pub fn multiplicity(self) -> usize {
        self.0 as usize + 1
    }

    /// True when the spin is half-integer.
    pub fn is_half_integer(self) -> bool {
        self.0 % 2 != 0
    }

    /// Iterates the doubled projection values `-2j, -2j+2, ..., +2j`.
    pub fn projections(self) -> impl Iterator<Item = i32> {
        let two_j = self.0;
        (0..=two_j).map(move |step| -two_j + 2 * step)
    }
}

impl fmt::Display for Spin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 2 == 0 {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{}/2", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projections_cover_full_range() {
        let spin = Spin::parse("3/2").expect("spin");
        let projections: Vec<i32> = spin.projections().collect();
        assert_eq!(projections, vec![-3, -1, 1, 3]);
        assert_eq!(spin.multiplicity(), 4);
    }

    #[test]
    fn signed_projection_parses() {
        assert_eq!(parse_half_integer("-1/2").expect("parse"), -1);
        assert_eq!(parse_half_integer("2").expect("parse"), 4);
    }
}
