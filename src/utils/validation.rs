//! Validation utilities

use bigdecimal::BigDecimal;

use crate::booking::lr::Booking;
use crate::freight::cft::validate_pieces;
use crate::types::*;
use crate::utils::numeric::or_zero;

/// Validate that an LR number is usable
pub fn validate_lr_number(lr_number: &str) -> FreightResult<()> {
    if lr_number.trim().is_empty() {
        return Err(FreightError::Validation(
            "LR number cannot be empty".to_string(),
        ));
    }

    if lr_number.len() > 30 {
        return Err(FreightError::Validation(
            "LR number cannot exceed 30 characters".to_string(),
        ));
    }

    if !lr_number
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '/')
    {
        return Err(FreightError::Validation(
            "LR number can only contain letters, digits, dashes and slashes".to_string(),
        ));
    }

    Ok(())
}

fn require(value: &Option<String>, label: &str) -> FreightResult<()> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(FreightError::Validation(format!("{} is required", label))),
    }
}

/// Validate a booking before it is saved
pub fn validate_booking(booking: &Booking) -> FreightResult<()> {
    validate_lr_number(&booking.lr_number)?;
    require(&booking.client, "Client")?;
    require(&booking.origin, "Origin city")?;
    require(&booking.destination, "Destination city")?;

    if !booking.is_ftl() && booking.metrics.pieces == 0 {
        return Err(FreightError::Validation(
            "Number of pieces must be greater than zero".to_string(),
        ));
    }

    if booking.payment_mode.is_chargeable()
        && or_zero(&booking.charges.freight_rate) <= BigDecimal::from(0)
    {
        return Err(FreightError::Validation(format!(
            "Freight is required for {} bookings",
            booking.payment_mode
        )));
    }

    if booking.metrics.cft_weight.is_some() && !booking.metrics.cft_entries.is_empty() {
        validate_pieces(&booking.metrics.cft_entries, booking.metrics.pieces)?;
    }

    Ok(())
}
