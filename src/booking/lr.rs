//! Lorry receipt booking record

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::booking::lifecycle::LifecycleFlags;
use crate::freight::ftl::StopPoint;
use crate::types::*;

/// A lorry receipt as edited on the booking and modification forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub lr_number: String,
    pub lr_date: NaiveDate,
    pub booking_mode: BookingMode,
    pub payment_mode: PaymentMode,
    /// Client id or code
    pub client: Option<String>,
    /// Origin city id or code
    pub origin: Option<String>,
    /// Destination city id or code
    pub destination: Option<String>,
    pub delivery_type: Option<DeliveryType>,
    #[serde(default)]
    pub metrics: ShipmentMetrics,
    #[serde(default)]
    pub charges: ChargeSet,
    /// FTL pickup and delivery stops
    #[serde(default)]
    pub points: Vec<StopPoint>,
    #[serde(default)]
    pub lifecycle: LifecycleFlags,
}

impl Booking {
    /// Create a new, empty booking
    pub fn new(
        lr_number: String,
        lr_date: NaiveDate,
        booking_mode: BookingMode,
        payment_mode: PaymentMode,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            lr_number,
            lr_date,
            booking_mode,
            payment_mode,
            client: None,
            origin: None,
            destination: None,
            delivery_type: None,
            metrics: ShipmentMetrics::default(),
            charges: ChargeSet::default(),
            points: Vec::new(),
            lifecycle: LifecycleFlags::default(),
        }
    }

    /// Set client and route in one go
    pub fn with_route(mut self, client: &str, origin: &str, destination: &str) -> Self {
        self.client = Some(client.to_string());
        self.origin = Some(origin.to_string());
        self.destination = Some(destination.to_string());
        self
    }

    pub fn is_ftl(&self) -> bool {
        self.booking_mode == BookingMode::Ftl
    }
}
