//! GST policy, totals and CGST/SGST/IGST split for freight charges

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{ChargeSet, Totals};
use crate::utils::numeric::{or_zero, parse_amount, round2};

/// GST percentage policy selected on a booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GstPolicy {
    /// No GST charged
    Exempted,
    /// 5% payable by the recipient under reverse charge
    ReverseCharge,
    /// Plain percentage charged by the carrier
    Percent(BigDecimal),
}

impl GstPolicy {
    /// Reverse charge rate
    pub const RCM_RATE: u32 = 5;

    /// Parse the form value; unparsable percentages become 0%
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "exempted" | "exempt" => GstPolicy::Exempted,
            "5-rcm" | "rcm" => GstPolicy::ReverseCharge,
            other => GstPolicy::Percent(parse_amount(other.trim_end_matches('%'))),
        }
    }

    /// Effective GST percentage
    pub fn rate(&self) -> BigDecimal {
        match self {
            GstPolicy::Exempted => BigDecimal::from(0),
            GstPolicy::ReverseCharge => BigDecimal::from(Self::RCM_RATE),
            GstPolicy::Percent(rate) => rate.clone(),
        }
    }

    pub fn is_reverse_charge(&self) -> bool {
        matches!(self, GstPolicy::ReverseCharge)
    }
}

impl From<String> for GstPolicy {
    fn from(label: String) -> Self {
        GstPolicy::parse(&label)
    }
}

impl From<GstPolicy> for String {
    fn from(policy: GstPolicy) -> Self {
        policy.to_string()
    }
}

impl fmt::Display for GstPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GstPolicy::Exempted => f.write_str("exempted"),
            GstPolicy::ReverseCharge => f.write_str("5-rcm"),
            GstPolicy::Percent(rate) => write!(f, "{}", rate.normalized()),
        }
    }
}

/// GST rate structure for Indian taxation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GstRate {
    /// Total GST rate percentage (e.g., 18.0 for 18%)
    pub total_rate: BigDecimal,
    /// CGST rate percentage (Central GST)
    pub cgst_rate: BigDecimal,
    /// SGST rate percentage (State GST)
    pub sgst_rate: BigDecimal,
    /// IGST rate percentage (Integrated GST)
    pub igst_rate: BigDecimal,
}

impl GstRate {
    /// Intra-state rates (CGST + SGST)
    pub fn intra_state(total_rate: BigDecimal) -> Self {
        let half_rate = &total_rate / BigDecimal::from(2);
        Self {
            total_rate,
            cgst_rate: half_rate.clone(),
            sgst_rate: half_rate,
            igst_rate: BigDecimal::from(0),
        }
    }

    /// Inter-state rates (IGST)
    pub fn inter_state(total_rate: BigDecimal) -> Self {
        Self {
            total_rate: total_rate.clone(),
            cgst_rate: BigDecimal::from(0),
            sgst_rate: BigDecimal::from(0),
            igst_rate: total_rate,
        }
    }

    /// Pick the structure from origin and destination states.
    ///
    /// States are compared case-insensitively. A missing state on either
    /// side is treated as intra-state.
    pub fn for_route(
        total_rate: BigDecimal,
        origin_state: Option<&str>,
        destination_state: Option<&str>,
    ) -> Self {
        if is_inter_state(origin_state, destination_state) {
            Self::inter_state(total_rate)
        } else {
            Self::intra_state(total_rate)
        }
    }
}

/// Whether a route crosses a state border
pub fn is_inter_state(origin_state: Option<&str>, destination_state: Option<&str>) -> bool {
    match (origin_state, destination_state) {
        (Some(origin), Some(destination)) => {
            !origin.trim().eq_ignore_ascii_case(destination.trim())
        }
        _ => false,
    }
}

/// Detailed GST calculation breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GstCalculation {
    /// Base amount (before GST)
    pub base_amount: BigDecimal,
    /// GST rate used for calculation
    pub gst_rate: GstRate,
    pub cgst_amount: BigDecimal,
    pub sgst_amount: BigDecimal,
    pub igst_amount: BigDecimal,
    /// Total GST amount (CGST + SGST + IGST)
    pub total_gst_amount: BigDecimal,
    /// Total amount including GST
    pub total_amount: BigDecimal,
}

impl GstCalculation {
    /// Calculate GST amounts from base amount and GST rate, rounded to paise
    pub fn calculate(base_amount: BigDecimal, gst_rate: GstRate) -> Self {
        let hundred = BigDecimal::from(100);
        let total_gst_amount = round2(&(&base_amount * &gst_rate.total_rate / &hundred));

        // IGST takes the whole amount; otherwise SGST absorbs any odd paisa
        let (cgst_amount, sgst_amount, igst_amount) =
            if gst_rate.igst_rate > BigDecimal::from(0) {
                (
                    BigDecimal::from(0),
                    BigDecimal::from(0),
                    total_gst_amount.clone(),
                )
            } else {
                let cgst = round2(&(&base_amount * &gst_rate.cgst_rate / &hundred));
                let sgst = &total_gst_amount - &cgst;
                (cgst, sgst, BigDecimal::from(0))
            };

        let total_amount = &base_amount + &total_gst_amount;

        Self {
            base_amount,
            gst_rate,
            cgst_amount,
            sgst_amount,
            igst_amount,
            total_gst_amount,
            total_amount,
        }
    }
}

/// Freight + LR + hamali + pickup/delivery + ODA + other + warai/union.
///
/// The bare per-unit `rate` is never part of the subtotal.
pub fn subtotal(charges: &ChargeSet) -> BigDecimal {
    let pickup_delivery_total = if charges.uses_split_pickup_delivery() {
        or_zero(&charges.pickup_charges) + or_zero(&charges.delivery_charges)
    } else {
        or_zero(&charges.pickup_delivery)
    };

    or_zero(&charges.freight_rate)
        + or_zero(&charges.lr_charges)
        + or_zero(&charges.hamali)
        + pickup_delivery_total
        + or_zero(&charges.oda_charges)
        + or_zero(&charges.other)
        + or_zero(&charges.warai_union)
}

/// Subtotal, GST and grand total for a charge set
pub fn compute_totals(charges: &ChargeSet) -> Totals {
    let subtotal = round2(&subtotal(charges));
    let policy = charges
        .gst_percent
        .clone()
        .unwrap_or(GstPolicy::Percent(BigDecimal::from(0)));
    let gst_rate = policy.rate();
    let gst_amount = round2(&(&subtotal * &gst_rate / BigDecimal::from(100)));
    let total_amount = &subtotal + &gst_amount;

    Totals {
        subtotal,
        gst_amount,
        total_amount,
        gst_rate,
        reverse_charge: policy.is_reverse_charge(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn charges_with_freight(freight: u32, gst: &str) -> ChargeSet {
        ChargeSet {
            freight_rate: Some(BigDecimal::from(freight)),
            gst_percent: Some(GstPolicy::parse(gst)),
            ..ChargeSet::default()
        }
    }

    #[test]
    fn test_gst_policy_parse() {
        assert_eq!(GstPolicy::parse("exempted"), GstPolicy::Exempted);
        assert_eq!(GstPolicy::parse("5-rcm"), GstPolicy::ReverseCharge);
        assert_eq!(
            GstPolicy::parse("12"),
            GstPolicy::Percent(BigDecimal::from(12))
        );
        assert_eq!(
            GstPolicy::parse("garbage"),
            GstPolicy::Percent(BigDecimal::from(0))
        );
        assert_eq!(GstPolicy::parse("18").to_string(), "18");
    }

    #[test]
    fn test_reverse_charge_totals() {
        let totals = compute_totals(&charges_with_freight(1000, "5-rcm"));
        assert_eq!(totals.subtotal, BigDecimal::from(1000));
        assert_eq!(totals.gst_amount, BigDecimal::from(50));
        assert_eq!(totals.total_amount, BigDecimal::from(1050));
        assert!(totals.reverse_charge);
        assert_eq!(totals.collectible_amount(), BigDecimal::from(1000));
    }

    #[test]
    fn test_exempted_totals() {
        let totals = compute_totals(&charges_with_freight(1000, "exempted"));
        assert_eq!(totals.gst_amount, BigDecimal::from(0));
        assert_eq!(totals.total_amount, BigDecimal::from(1000));
        assert!(!totals.reverse_charge);
    }

    #[test]
    fn test_subtotal_excludes_bare_rate() {
        let charges = ChargeSet {
            rate: Some(BigDecimal::from(50)),
            freight_rate: Some(BigDecimal::from(500)),
            lr_charges: Some(BigDecimal::from(60)),
            hamali: Some(BigDecimal::from(20)),
            pickup_charges: Some(BigDecimal::from(100)),
            delivery_charges: Some(BigDecimal::from(80)),
            pickup_delivery: Some(BigDecimal::from(999)),
            oda_charges: Some(BigDecimal::from(40)),
            other: Some(BigDecimal::from(10)),
            warai_union: Some(BigDecimal::from(30)),
            gst_percent: Some(GstPolicy::parse("12")),
            ..ChargeSet::default()
        };
        let totals = compute_totals(&charges);
        assert_eq!(totals.subtotal, BigDecimal::from(840));
        assert_eq!(totals.gst_amount, BigDecimal::from_str("100.80").unwrap());
        assert_eq!(totals.total_amount, BigDecimal::from_str("940.80").unwrap());
    }

    #[test]
    fn test_legacy_combined_pickup_delivery() {
        let charges = ChargeSet {
            freight_rate: Some(BigDecimal::from(500)),
            pickup_delivery: Some(BigDecimal::from(150)),
            ..ChargeSet::default()
        };
        assert_eq!(compute_totals(&charges).subtotal, BigDecimal::from(650));
    }

    #[test]
    fn test_gst_split_by_route() {
        let inter = GstCalculation::calculate(
            BigDecimal::from(1000),
            GstRate::for_route(BigDecimal::from(12), Some("Maharashtra"), Some("Gujarat")),
        );
        assert_eq!(inter.igst_amount, BigDecimal::from(120));
        assert_eq!(inter.cgst_amount, BigDecimal::from(0));

        let intra = GstCalculation::calculate(
            BigDecimal::from(1000),
            GstRate::for_route(BigDecimal::from(12), Some("Gujarat"), Some("gujarat")),
        );
        assert_eq!(intra.cgst_amount, BigDecimal::from(60));
        assert_eq!(intra.sgst_amount, BigDecimal::from(60));
        assert_eq!(intra.total_amount, BigDecimal::from(1120));
    }

    #[test]
    fn test_odd_paisa_goes_to_sgst() {
        let calc = GstCalculation::calculate(
            BigDecimal::from_str("100.10").unwrap(),
            GstRate::intra_state(BigDecimal::from(5)),
        );
        assert_eq!(calc.total_gst_amount, BigDecimal::from_str("5.01").unwrap());
        assert_eq!(calc.cgst_amount, BigDecimal::from_str("2.50").unwrap());
        assert_eq!(calc.sgst_amount, BigDecimal::from_str("2.51").unwrap());
    }
}
