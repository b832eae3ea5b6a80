//! Numeric classification of individual cells.
//!
//! A cell is numeric when, after trimming and turning the first decimal comma
//! into a point, it is a plain optionally-negative decimal literal. The
//! pattern check runs before float conversion so that exponents, `NaN`,
//! `inf` and similar parseable forms are rejected.

use std::sync::OnceLock;

use regex::Regex;

static DECIMAL_PATTERN: OnceLock<Regex> = OnceLock::new();

fn decimal_pattern() -> &'static Regex {
    DECIMAL_PATTERN.get_or_init(|| {
        Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("decimal pattern is a valid regex")
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Numeric(f64),
    NonNumeric,
}

pub fn parse_cell(raw: &str) -> Cell {
    let normalized = raw.trim().replacen(',', ".", 1);
    if !decimal_pattern().is_match(&normalized) {
        return Cell::NonNumeric;
    }
    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => Cell::Numeric(value),
        _ => Cell::NonNumeric,
    }
}
