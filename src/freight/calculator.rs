//! Freight auto-calculation with manual override tracking

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::config::FreightConfig;
use crate::freight::trace::{CalculationTrace, InputChanges};
use crate::types::*;
use crate::utils::numeric::{or_zero, positive, round2};

/// Booking-level settings that gate auto-calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreightContext {
    pub booking_mode: BookingMode,
    pub payment_mode: PaymentMode,
}

impl FreightContext {
    pub fn new(booking_mode: BookingMode, payment_mode: PaymentMode) -> Self {
        Self {
            booking_mode,
            payment_mode,
        }
    }
}

/// Why freight was left as it was
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// FTL freight is entered directly
    FullTruckLoad,
    /// Payment mode outside the auto-calculated set
    PaymentModeNotAuto(PaymentMode),
    /// No positive rate
    NoRate,
    /// User edited freight and no quantity changed since
    ManualOverride,
    /// Stored freight differs from the last auto value and nothing changed
    StoredValueKept,
}

/// Result of one recalculation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FreightOutcome {
    Recalculated { freight: BigDecimal },
    Unchanged(SkipReason),
}

/// Charges and trace after a recalculation pass
#[derive(Debug, Clone, PartialEq)]
pub struct Recalculation {
    pub charges: ChargeSet,
    pub trace: CalculationTrace,
    pub outcome: FreightOutcome,
}

impl Recalculation {
    fn unchanged(charges: &ChargeSet, trace: &CalculationTrace, reason: SkipReason) -> Self {
        tracing::debug!(?reason, "Freight left unchanged");
        Self {
            charges: charges.clone(),
            trace: trace.clone(),
            outcome: FreightOutcome::Unchanged(reason),
        }
    }

    pub fn is_recalculated(&self) -> bool {
        matches!(self.outcome, FreightOutcome::Recalculated { .. })
    }
}

/// Freight calculation engine
#[derive(Debug, Clone, Default)]
pub struct FreightCalculator {
    config: FreightConfig,
}

impl FreightCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FreightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FreightConfig {
        &self.config
    }

    /// Freight for the given rate and quantities, before any write-back decision
    pub fn compute_freight(&self, charges: &ChargeSet, metrics: &ShipmentMetrics) -> BigDecimal {
        let rate = or_zero(&charges.rate);
        let method = charges
            .calculation_method
            .unwrap_or(CalculationMethod::PerPiece);

        let freight = match method {
            CalculationMethod::PerPiece => {
                let freight = &rate * BigDecimal::from(metrics.pieces);
                clamp_to_minimum(freight, &charges.minimum_freight)
            }
            CalculationMethod::ByWeight => {
                let freight = &rate * charged_weight(metrics);
                if self.config.minimum_freight_for_weight {
                    clamp_to_minimum(freight, &charges.minimum_freight)
                } else {
                    freight
                }
            }
        };
        round2(&freight)
    }

    /// Recompute freight after an input change.
    ///
    /// Freight is only overwritten when it is empty or zero, when a driving
    /// input changed, or when it still equals the last auto-computed value.
    /// A manual edit survives refreshes that change nothing.
    pub fn recalculate_freight(
        &self,
        context: FreightContext,
        charges: &ChargeSet,
        metrics: &ShipmentMetrics,
        trace: &CalculationTrace,
    ) -> Recalculation {
        if context.booking_mode == BookingMode::Ftl {
            return Recalculation::unchanged(charges, trace, SkipReason::FullTruckLoad);
        }
        if !self.config.is_auto_calculated(context.payment_mode) {
            return Recalculation::unchanged(
                charges,
                trace,
                SkipReason::PaymentModeNotAuto(context.payment_mode),
            );
        }
        if positive(&charges.rate).is_none() {
            return Recalculation::unchanged(charges, trace, SkipReason::NoRate);
        }

        let changes = trace.changes(charges, metrics);
        if trace.is_freight_manual && !changes.any() {
            return Recalculation::unchanged(charges, trace, SkipReason::ManualOverride);
        }

        let freight = self.compute_freight(charges, metrics);
        if !self.should_write(charges, trace, &changes) {
            return Recalculation::unchanged(charges, trace, SkipReason::StoredValueKept);
        }

        tracing::debug!(
            %freight,
            pieces_changed = changes.pieces,
            weight_changed = changes.weight,
            rate_changed = changes.rate,
            method_changed = changes.method,
            "Freight recalculated"
        );

        let mut updated_trace = trace.clone();
        updated_trace.observe(charges, metrics);
        updated_trace.last_calculated_freight = freight.clone();
        updated_trace.is_freight_manual = false;

        Recalculation {
            charges: ChargeSet {
                freight_rate: Some(freight.clone()),
                ..charges.clone()
            },
            trace: updated_trace,
            outcome: FreightOutcome::Recalculated { freight },
        }
    }

    fn should_write(
        &self,
        charges: &ChargeSet,
        trace: &CalculationTrace,
        changes: &InputChanges,
    ) -> bool {
        let current = or_zero(&charges.freight_rate);
        if current == BigDecimal::from(0) || changes.any() {
            return true;
        }
        (&current - &trace.last_calculated_freight).abs() <= self.config.manual_override_tolerance
    }
}

/// Higher of actual weight and committed CFT weight
pub fn charged_weight(metrics: &ShipmentMetrics) -> BigDecimal {
    let actual = or_zero(&metrics.actual_weight);
    let cft = or_zero(&metrics.cft_weight);
    if cft > actual {
        cft
    } else {
        actual
    }
}

fn clamp_to_minimum(freight: BigDecimal, minimum: &Option<BigDecimal>) -> BigDecimal {
    match positive(minimum) {
        Some(minimum) if freight < minimum => minimum,
        _ => freight,
    }
}
