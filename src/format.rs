//! Meso amounts and display formatting.

use crate::error::FormatError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MILLION: f64 = 1_000_000.0;
pub const BILLION: f64 = 1_000_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MesoUnit {
    #[default]
    M,
    B,
}

impl MesoUnit {
    pub fn multiplier(&self) -> f64 {
        match self {
            MesoUnit::M => MILLION,
            MesoUnit::B => BILLION,
        }
    }
}

/// User-entered meso value such as "250M" or "1.5B".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MesoAmount {
    pub value: f64,
    pub unit: MesoUnit,
}

impl MesoAmount {
    pub fn new(value: f64, unit: MesoUnit) -> Self {
        Self { value, unit }
    }

    pub fn millions(value: f64) -> Self {
        Self::new(value, MesoUnit::M)
    }

    pub fn billions(value: f64) -> Self {
        Self::new(value, MesoUnit::B)
    }

    /// Raw meso count. Negative and non-finite values count as zero.
    pub fn to_raw(&self) -> u64 {
        let raw = self.value * self.unit.multiplier();
        if raw.is_finite() && raw > 0.0 {
            raw.round() as u64
        } else {
            0
        }
    }

    pub fn is_zero(&self) -> bool {
        self.to_raw() == 0
    }
}

impl fmt::Display for MesoAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            MesoUnit::M => "M",
            MesoUnit::B => "B",
        };
        write!(f, "{}{}", trim_decimals(self.value, 2), unit)
    }
}

impl FromStr for MesoAmount {
    type Err = FormatError;

    /// Accepts "1.5b", "250M", "250 m", or a bare raw meso count.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s
            .trim()
            .chars()
            .filter(|c| *c != ',' && *c != '_' && !c.is_whitespace())
            .collect();
        if cleaned.is_empty() {
            return Err(FormatError::InvalidAmount(s.to_string()));
        }

        let (number, unit) = match cleaned.chars().last() {
            Some('b') | Some('B') => (&cleaned[..cleaned.len() - 1], Some(MesoUnit::B)),
            Some('m') | Some('M') => (&cleaned[..cleaned.len() - 1], Some(MesoUnit::M)),
            _ => (cleaned.as_str(), None),
        };

        let value: f64 = number
            .parse()
            .map_err(|_| FormatError::InvalidAmount(s.to_string()))?;
        if !value.is_finite() || value < 0.0 {
            return Err(FormatError::InvalidAmount(s.to_string()));
        }

        Ok(match unit {
            Some(unit) => MesoAmount::new(value, unit),
            None => MesoAmount::millions(value / MILLION),
        })
    }
}

fn trim_decimals(value: f64, places: usize) -> String {
    let s = format!("{:.*}", places, value);
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Compact meso display: "1.23B", "456.7M", "12.3K", "950". The unit is
/// picked after rounding, so 999,999,999 shows as "1B".
pub fn format_mesos(mesos: f64) -> String {
    let sign = if mesos < 0.0 { "-" } else { "" };
    let abs = mesos.abs();
    if round_to(abs / MILLION, 1) >= 1_000.0 {
        format!("{}{}B", sign, trim_decimals(abs / BILLION, 2))
    } else if round_to(abs / 1_000.0, 1) >= 1_000.0 {
        format!("{}{}M", sign, trim_decimals(abs / MILLION, 1))
    } else if abs.round() >= 1_000.0 {
        format!("{}{}K", sign, trim_decimals(abs / 1_000.0, 1))
    } else {
        format!("{}{}", sign, abs.round())
    }
}

/// Boom counts are fractional averages; show one decimal unless whole.
pub fn format_booms(booms: f64) -> String {
    trim_decimals(booms, 1)
}
