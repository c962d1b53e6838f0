use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors raised while constructing a [`Decimal`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecimalError {
    /// Input string is not a valid decimal literal
    #[error("invalid decimal literal: {input:?}")]
    InvalidLiteral { input: String },

    /// Value is too large for the i128 mantissa
    #[error("decimal value out of range: {input:?}")]
    OutOfRange { input: String },

    /// Float input is NaN or infinite and has no decimal rendering
    #[error("float value {value} is not finite")]
    NotFinite { value: f64 },
}

/// Exact fixed-point decimal value
///
/// Stored as an integer mantissa plus a scale (number of decimal places).
/// `Decimal` exists so that audited decimal fields survive the float-typed
/// storage layer without binary rounding artifacts: conversion *from* a float
/// is only possible through [`Decimal::from_f64_fixed`], which renders the
/// float at the field's declared width and scale and parses the result back.
///
/// Equality ignores trailing zeros, so `1.10 == 1.1`.
#[derive(Debug, Clone, Copy)]
pub struct Decimal {
    units: i128,
    scale: u32,
}

impl Decimal {
    /// Create a decimal from a raw mantissa and scale
    ///
    /// `Decimal::new(7110, 2)` is `71.10`.
    pub fn new(units: i128, scale: u32) -> Self {
        Self { units, scale }
    }

    /// Create a whole-number decimal
    pub fn from_int(value: i64) -> Self {
        Self {
            units: value as i128,
            scale: 0,
        }
    }

    /// The raw mantissa
    pub fn units(&self) -> i128 {
        self.units
    }

    /// The number of decimal places
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Lossy conversion to a float for the storage layer
    pub fn to_f64(&self) -> f64 {
        self.units as f64 / 10f64.powi(self.scale as i32)
    }

    /// Convert a float back to an exact decimal via a fixed-point rendering
    ///
    /// The float is formatted at the declared field width (`max_digits`) and
    /// scale (`decimal_places`) and the resulting literal is parsed. This is
    /// the only float entry point; a direct mantissa extraction would leak
    /// binary rounding into the reconstructed value.
    ///
    /// # Errors
    ///
    /// `NotFinite` for NaN or infinite input, or a parse error if the
    /// rendering overflows the mantissa.
    pub fn from_f64_fixed(
        value: f64,
        max_digits: u32,
        decimal_places: u32,
    ) -> Result<Self, DecimalError> {
        if !value.is_finite() {
            return Err(DecimalError::NotFinite { value });
        }

        let rendered = format!(
            "{:width$.prec$}",
            value,
            width = max_digits as usize,
            prec = decimal_places as usize
        );

        rendered.trim_start().parse()
    }

    /// Drop trailing zeros from the fractional part
    fn normalized(&self) -> (i128, u32) {
        let mut units = self.units;
        let mut scale = self.scale;
        while scale > 0 && units % 10 == 0 {
            units /= 10;
            scale -= 1;
        }
        (units, scale)
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for Decimal {}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.units);
        }

        let divisor = 10i128.pow(self.scale);
        let sign = if self.units < 0 { "-" } else { "" };
        let magnitude = self.units.unsigned_abs();
        let whole = magnitude / divisor.unsigned_abs();
        let frac = magnitude % divisor.unsigned_abs();

        write!(
            f,
            "{}{}.{:0width$}",
            sign,
            whole,
            frac,
            width = self.scale as usize
        )
    }
}

impl FromStr for Decimal {
    type Err = DecimalError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || DecimalError::InvalidLiteral {
            input: input.to_string(),
        };
        let out_of_range = || DecimalError::OutOfRange {
            input: input.to_string(),
        };

        let (negative, body) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input.strip_prefix('+').unwrap_or(input)),
        };

        let (whole, frac) = match body.split_once('.') {
            Some((w, f)) => (w, f),
            None => (body, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac.len() > u32::MAX as usize {
            return Err(out_of_range());
        }

        let mut units: i128 = 0;
        for digit in whole.chars().chain(frac.chars()) {
            units = units
                .checked_mul(10)
                .and_then(|u| u.checked_add((digit as u8 - b'0') as i128))
                .ok_or_else(out_of_range)?;
        }
        if negative {
            units = -units;
        }

        Ok(Self {
            units,
            scale: frac.len() as u32,
        })
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let literal = String::deserialize(deserializer)?;
        literal.parse().map_err(D::Error::custom)
    }
}
