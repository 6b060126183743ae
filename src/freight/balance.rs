//! FTL balance freight

use bigdecimal::BigDecimal;

use crate::types::ChargeSet;
use crate::utils::numeric::{format_amount, or_zero, round2};

/// Freight less advance, agent commission and TDS, never below zero
pub fn balance_freight(charges: &ChargeSet) -> BigDecimal {
    let raw = or_zero(&charges.freight_rate)
        - or_zero(&charges.advance_freight)
        - or_zero(&charges.agent_commission)
        - or_zero(&charges.tds_deducted);
    if raw < BigDecimal::from(0) {
        round2(&BigDecimal::from(0))
    } else {
        round2(&raw)
    }
}

/// Balance freight as shown on the FTL form ("0.00" when advances exceed freight)
pub fn balance_freight_display(charges: &ChargeSet) -> String {
    format_amount(&balance_freight(charges))
}

/// Charge set with its derived balance freight refreshed
pub fn refresh_balance_freight(charges: &ChargeSet) -> ChargeSet {
    ChargeSet {
        balance_freight: Some(balance_freight(charges)),
        ..charges.clone()
    }
}
