//! Figures printed on the consignment note
//!
//! The print view recomputes everything from the persisted charge set and
//! the city master rather than trusting stored totals.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::booking::lr::Booking;
use crate::masters::RateBook;
use crate::tax::gst::{compute_totals, is_inter_state, GstCalculation, GstRate};
use crate::types::Totals;
use crate::utils::numeric::format_amount;

/// Derived figures for one LR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsignmentFigures {
    pub totals: Totals,
    /// CGST/SGST or IGST split of the GST amount
    pub gst: GstCalculation,
    pub inter_state: bool,
    /// Print the "GST payable by recipient under RCM" notice
    pub reverse_charge: bool,
    pub payable_to_carrier: BigDecimal,
    pub amount_in_words: String,
}

/// Recompute the printable figures for a booking
pub fn consignment_figures(booking: &Booking, book: &RateBook) -> ConsignmentFigures {
    let state_of = |reference: &Option<String>| {
        reference
            .as_deref()
            .and_then(|r| book.city(r))
            .and_then(|city| city.state.clone())
    };
    let origin_state = state_of(&booking.origin);
    let destination_state = state_of(&booking.destination);

    let totals = compute_totals(&booking.charges);
    let gst_rate = GstRate::for_route(
        totals.gst_rate.clone(),
        origin_state.as_deref(),
        destination_state.as_deref(),
    );
    let gst = GstCalculation::calculate(totals.subtotal.clone(), gst_rate);
    let payable_to_carrier = totals.collectible_amount();

    ConsignmentFigures {
        inter_state: is_inter_state(origin_state.as_deref(), destination_state.as_deref()),
        reverse_charge: totals.reverse_charge,
        amount_in_words: amount_in_words(&payable_to_carrier),
        payable_to_carrier,
        gst,
        totals,
    }
}

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];
const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

fn below_hundred(n: u64) -> String {
    if n < 20 {
        ONES[n as usize].to_string()
    } else if n % 10 == 0 {
        TENS[(n / 10) as usize].to_string()
    } else {
        format!("{} {}", TENS[(n / 10) as usize], ONES[(n % 10) as usize])
    }
}

/// Words for a whole number using lakh and crore grouping
pub fn number_in_words(n: u64) -> String {
    if n == 0 {
        return "Zero".to_string();
    }

    let mut parts = Vec::new();
    let crore = n / 10_000_000;
    let lakh = (n / 100_000) % 100;
    let thousand = (n / 1_000) % 100;
    let hundred = (n / 100) % 10;
    let rest = n % 100;

    if crore > 0 {
        parts.push(format!("{} Crore", number_in_words(crore)));
    }
    if lakh > 0 {
        parts.push(format!("{} Lakh", below_hundred(lakh)));
    }
    if thousand > 0 {
        parts.push(format!("{} Thousand", below_hundred(thousand)));
    }
    if hundred > 0 {
        parts.push(format!("{} Hundred", ONES[hundred as usize]));
    }
    if rest > 0 {
        parts.push(below_hundred(rest));
    }
    parts.join(" ")
}

/// "Rupees ... [and Paise ...] Only"
pub fn amount_in_words(amount: &BigDecimal) -> String {
    let formatted = format_amount(amount);
    let unsigned = formatted.trim_start_matches('-');
    let (rupees, paise) = unsigned.split_once('.').unwrap_or((unsigned, "0"));
    let rupees: u64 = rupees.parse().unwrap_or(0);
    let paise: u64 = paise.parse().unwrap_or(0);

    if paise > 0 {
        format!(
            "Rupees {} and Paise {} Only",
            number_in_words(rupees),
            below_hundred(paise)
        )
    } else {
        format!("Rupees {} Only", number_in_words(rupees))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::masters::{City, Client};
    use crate::tax::gst::GstPolicy;
    use crate::types::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn book() -> RateBook {
        RateBook::load(
            vec![Client::new("1", "ACME", "Acme")],
            vec![
                City::new("10", "MUM", "Mumbai", "Maharashtra"),
                City::new("11", "PUN", "Pune", "Maharashtra"),
                City::new("12", "AMD", "Ahmedabad", "Gujarat"),
            ],
            Vec::new(),
        )
    }

    fn booking(destination: &str, gst: &str) -> Booking {
        let mut booking = Booking::new(
            "LR-9".to_string(),
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            BookingMode::Ptl,
            PaymentMode::Paid,
        )
        .with_route("ACME", "MUM", destination);
        booking.charges.freight_rate = Some(BigDecimal::from(1000));
        booking.charges.gst_percent = Some(GstPolicy::parse(gst));
        booking
    }

    #[test]
    fn test_inter_state_is_igst() {
        let figures = consignment_figures(&booking("AMD", "12"), &book());
        assert!(figures.inter_state);
        assert_eq!(figures.gst.igst_amount, BigDecimal::from(120));
        assert_eq!(figures.gst.cgst_amount, BigDecimal::from(0));
        assert_eq!(figures.payable_to_carrier, BigDecimal::from(1120));
        assert_eq!(
            figures.amount_in_words,
            "Rupees One Thousand One Hundred Twenty Only"
        );
    }

    #[test]
    fn test_intra_state_splits_evenly() {
        let figures = consignment_figures(&booking("PUN", "12"), &book());
        assert!(!figures.inter_state);
        assert_eq!(figures.gst.cgst_amount, BigDecimal::from(60));
        assert_eq!(figures.gst.sgst_amount, BigDecimal::from(60));
    }

    #[test]
    fn test_reverse_charge_not_collected() {
        let figures = consignment_figures(&booking("PUN", "5-rcm"), &book());
        assert!(figures.reverse_charge);
        assert_eq!(figures.totals.gst_amount, BigDecimal::from(50));
        assert_eq!(figures.payable_to_carrier, BigDecimal::from(1000));
        assert_eq!(figures.amount_in_words, "Rupees One Thousand Only");
    }

    #[test]
    fn test_indian_number_words() {
        assert_eq!(number_in_words(0), "Zero");
        assert_eq!(number_in_words(1050), "One Thousand Fifty");
        assert_eq!(number_in_words(215_000), "Two Lakh Fifteen Thousand");
        assert_eq!(
            number_in_words(12_34_56_789),
            "Twelve Crore Thirty Four Lakh Fifty Six Thousand Seven Hundred Eighty Nine"
        );
        assert_eq!(
            amount_in_words(&BigDecimal::from_str("940.80").unwrap()),
            "Rupees Nine Hundred Forty and Paise Eighty Only"
        );
    }
}
