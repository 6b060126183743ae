//! Last-seen inputs of the freight auto-calculation
//!
//! A trace is owned by one booking form. It is passed into every
//! recalculation and a refreshed copy comes back out, so the manual
//! override state never lives in hidden mutable globals.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::freight::cft::dimensions_signature;
use crate::types::*;
use crate::utils::numeric::or_zero;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationTrace {
    pub last_pieces: u32,
    pub last_weight: BigDecimal,
    pub last_cft: BigDecimal,
    pub last_dimensions: String,
    pub last_rate: BigDecimal,
    pub last_calculation_method: Option<CalculationMethod>,
    pub last_calculated_freight: BigDecimal,
    pub is_freight_manual: bool,
}

impl Default for CalculationTrace {
    fn default() -> Self {
        Self::new()
    }
}

impl CalculationTrace {
    /// Fresh trace for a new booking form
    pub fn new() -> Self {
        Self {
            last_pieces: 0,
            last_weight: BigDecimal::from(0),
            last_cft: BigDecimal::from(0),
            last_dimensions: String::new(),
            last_rate: BigDecimal::from(0),
            last_calculation_method: None,
            last_calculated_freight: BigDecimal::from(0),
            is_freight_manual: false,
        }
    }

    /// Trace for a saved LR opened for modification.
    ///
    /// Seeded with the persisted values so that opening the form does not
    /// count as a change and the stored freight is kept.
    pub fn from_saved(charges: &ChargeSet, metrics: &ShipmentMetrics) -> Self {
        let mut trace = Self::new();
        trace.observe(charges, metrics);
        trace.last_calculated_freight = or_zero(&charges.freight_rate);
        trace
    }

    /// Snapshot current inputs as last seen
    pub(crate) fn observe(&mut self, charges: &ChargeSet, metrics: &ShipmentMetrics) {
        self.last_pieces = metrics.pieces;
        self.last_weight = or_zero(&metrics.actual_weight);
        self.last_cft = or_zero(&metrics.cft_weight);
        self.last_dimensions = dimensions_signature(&metrics.cft_entries);
        self.last_rate = or_zero(&charges.rate);
        self.last_calculation_method = charges.calculation_method;
    }

    /// Which inputs changed since the last auto-calculation
    pub fn changes(&self, charges: &ChargeSet, metrics: &ShipmentMetrics) -> InputChanges {
        InputChanges {
            pieces: metrics.pieces != self.last_pieces,
            weight: or_zero(&metrics.actual_weight) != self.last_weight
                || or_zero(&metrics.cft_weight) != self.last_cft
                || dimensions_signature(&metrics.cft_entries) != self.last_dimensions,
            rate: or_zero(&charges.rate) != self.last_rate,
            method: charges.calculation_method != self.last_calculation_method,
        }
    }

    /// Record a direct edit of the freight field
    pub fn with_manual_freight(&self, freight: &BigDecimal) -> Self {
        Self {
            is_freight_manual: true,
            last_calculated_freight: freight.clone(),
            ..self.clone()
        }
    }
}

/// Dirty flags for freight inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputChanges {
    pub pieces: bool,
    /// Actual weight, committed CFT or the dimension rows
    pub weight: bool,
    pub rate: bool,
    pub method: bool,
}

impl InputChanges {
    pub fn any(&self) -> bool {
        self.pieces || self.weight || self.rate || self.method
    }
}

/// A human typed a freight value: store it and mark the trace manual
pub fn record_manual_freight(
    charges: &ChargeSet,
    trace: &CalculationTrace,
    freight: BigDecimal,
) -> (ChargeSet, CalculationTrace) {
    let trace = trace.with_manual_freight(&freight);
    let charges = ChargeSet {
        freight_rate: Some(freight),
        ..charges.clone()
    };
    (charges, trace)
}
