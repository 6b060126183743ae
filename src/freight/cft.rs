//! Volumetric (CFT) weight from box dimensions

use bigdecimal::BigDecimal;

use crate::config::FreightConfig;
use crate::types::*;
use crate::utils::numeric::{positive, round2};

/// CFT calculator bound to volumetric divisors
#[derive(Debug, Clone)]
pub struct CftCalculator {
    cm_divisor: BigDecimal,
    cubic_inch_divisor: BigDecimal,
}

impl Default for CftCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl CftCalculator {
    /// Calculator with the standard divisors (5000 cm³/kg, 1728 in³/ft³)
    pub fn new() -> Self {
        Self::with_config(&FreightConfig::default())
    }

    pub fn with_config(config: &FreightConfig) -> Self {
        Self {
            cm_divisor: config.cm_volumetric_divisor.clone(),
            cubic_inch_divisor: config.cubic_inch_divisor.clone(),
        }
    }

    /// Charged weight of one entry in kg, rounded to 2 decimals.
    ///
    /// Returns 0 until length, width, height and pieces are all positive.
    pub fn cft_weight(&self, entry: &CftEntry) -> BigDecimal {
        let (Some(length), Some(width), Some(height)) = (
            positive(&entry.length),
            positive(&entry.width),
            positive(&entry.height),
        ) else {
            return BigDecimal::from(0);
        };
        if entry.pieces == 0 {
            return BigDecimal::from(0);
        }

        let volume = length * width * height;
        let pieces = BigDecimal::from(entry.pieces);
        let weight = match entry.unit {
            DimensionUnit::Cm => volume / &self.cm_divisor * pieces,
            DimensionUnit::Inches => {
                let density = BigDecimal::from(entry.density_factor.kg_per_cft());
                volume / &self.cubic_inch_divisor * density * pieces
            }
        };
        round2(&weight)
    }

    /// Sum of all entries' CFT weight
    pub fn total_cft(&self, entries: &[CftEntry]) -> BigDecimal {
        entries.iter().map(|entry| self.cft_weight(entry)).sum()
    }

    /// Total CFT, provided the entries account for exactly `declared_pieces`
    pub fn apply(&self, entries: &[CftEntry], declared_pieces: u32) -> Result<BigDecimal, CftError> {
        validate_pieces(entries, declared_pieces)?;
        Ok(self.total_cft(entries))
    }
}

/// Check the entries' pieces sum to the shipment's piece count
pub fn validate_pieces(entries: &[CftEntry], declared_pieces: u32) -> Result<(), CftError> {
    let declared_pieces = u64::from(declared_pieces);
    let entered: u64 = entries.iter().map(|entry| u64::from(entry.pieces)).sum();
    if entered < declared_pieces {
        Err(CftError::MissingPieces {
            declared: declared_pieces,
            entered,
            missing: declared_pieces - entered,
        })
    } else if entered > declared_pieces {
        Err(CftError::ExtraPieces {
            declared: declared_pieces,
            entered,
            extra: entered - declared_pieces,
        })
    } else {
        Ok(())
    }
}

/// Stable textual form of the entries, used for change detection
pub fn dimensions_signature(entries: &[CftEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            let dim = |value: &Option<BigDecimal>| {
                value
                    .as_ref()
                    .map(|v| v.normalized().to_string())
                    .unwrap_or_default()
            };
            let unit = match entry.unit {
                DimensionUnit::Cm => "cm".to_string(),
                DimensionUnit::Inches => format!("in@{}", entry.density_factor.kg_per_cft()),
            };
            format!(
                "{}x{}x{}{}*{}",
                dim(&entry.length),
                dim(&entry.width),
                dim(&entry.height),
                unit,
                entry.pieces
            )
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// CFT weight of one entry with the standard divisors
pub fn cft_weight(entry: &CftEntry) -> BigDecimal {
    CftCalculator::new().cft_weight(entry)
}

/// Total CFT weight with the standard divisors
pub fn total_cft(entries: &[CftEntry]) -> BigDecimal {
    CftCalculator::new().total_cft(entries)
}
