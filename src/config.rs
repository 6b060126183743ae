//! Engine configuration

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::{FreightError, FreightResult, PaymentMode};

/// Tunables for CFT and freight calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FreightConfig {
    /// cm³ per kg of volumetric weight
    pub cm_volumetric_divisor: BigDecimal,
    /// in³ per cubic foot
    pub cubic_inch_divisor: BigDecimal,
    /// A stored freight this close to the last auto value is not a manual edit
    pub manual_override_tolerance: BigDecimal,
    /// Payment modes whose freight is auto-calculated
    pub auto_payment_modes: Vec<PaymentMode>,
    /// Also clamp by-weight freight to the minimum freight
    pub minimum_freight_for_weight: bool,
}

impl Default for FreightConfig {
    fn default() -> Self {
        Self {
            cm_volumetric_divisor: BigDecimal::from(5000),
            cubic_inch_divisor: BigDecimal::from(1728),
            manual_override_tolerance: BigDecimal::from(1) / BigDecimal::from(100),
            auto_payment_modes: vec![PaymentMode::Paid, PaymentMode::ToPay, PaymentMode::Tbb],
            minimum_freight_for_weight: false,
        }
    }
}

impl FreightConfig {
    /// Load from JSON; missing keys keep their defaults
    pub fn from_json_str(json: &str) -> FreightResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| FreightError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FreightResult<()> {
        if self.cm_volumetric_divisor <= BigDecimal::from(0) {
            return Err(FreightError::Config(
                "cmVolumetricDivisor must be positive".to_string(),
            ));
        }
        if self.cubic_inch_divisor <= BigDecimal::from(0) {
            return Err(FreightError::Config(
                "cubicInchDivisor must be positive".to_string(),
            ));
        }
        if self.manual_override_tolerance < BigDecimal::from(0) {
            return Err(FreightError::Config(
                "manualOverrideTolerance cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_auto_calculated(&self, payment_mode: PaymentMode) -> bool {
        self.auto_payment_modes.contains(&payment_mode)
    }
}
