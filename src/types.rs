//! Core types and data structures for freight calculation

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::tax::gst::GstPolicy;
use crate::utils::numeric::lenient;

/// Booking modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingMode {
    /// Full Truck Load - flat freight, multi-stop pickup and delivery points
    #[serde(rename = "FTL")]
    Ftl,
    /// Partial Truck Load - freight rated per piece or per weight
    #[serde(rename = "PTL")]
    Ptl,
}

/// How freight is paid for an LR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMode {
    /// Consignor pays at booking
    Paid,
    /// Consignee pays on delivery
    #[serde(rename = "To Pay", alias = "ToPay")]
    ToPay,
    /// To Be Billed against the client's rate master
    #[serde(rename = "TBB")]
    Tbb,
    /// Free of cost, never rated
    #[serde(rename = "FOC")]
    Foc,
}

impl PaymentMode {
    /// Whether freight is charged at all; FOC bookings are never rated
    pub fn is_chargeable(&self) -> bool {
        !matches!(self, PaymentMode::Foc)
    }
}

impl FromStr for PaymentMode {
    type Err = FreightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "paid" => Ok(PaymentMode::Paid),
            "topay" => Ok(PaymentMode::ToPay),
            "tbb" => Ok(PaymentMode::Tbb),
            "foc" => Ok(PaymentMode::Foc),
            _ => Err(FreightError::Validation(format!(
                "Unknown payment mode: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentMode::Paid => "Paid",
            PaymentMode::ToPay => "To Pay",
            PaymentMode::Tbb => "TBB",
            PaymentMode::Foc => "FOC",
        };
        f.write_str(label)
    }
}

/// Freight calculation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalculationMethod {
    /// rate x pieces
    PerPiece,
    /// rate x charged weight
    ByWeight,
}

/// Delivery type carried on a rate master
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryType {
    Godown,
    Door,
}

impl DeliveryType {
    /// Only the exact labels are recognised; anything else is ignored
    pub fn from_exact(label: &str) -> Option<Self> {
        match label {
            "Godown" => Some(DeliveryType::Godown),
            "Door" => Some(DeliveryType::Door),
            _ => None,
        }
    }
}

/// Unit of box dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DimensionUnit {
    #[default]
    Cm,
    #[serde(alias = "inch", alias = "in")]
    Inches,
}

/// Kg per cubic foot applied to inch measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u32", into = "u32")]
pub enum DensityFactor {
    #[default]
    Six,
    Eight,
    Ten,
}

impl DensityFactor {
    /// Kilograms per CFT
    pub fn kg_per_cft(&self) -> u32 {
        match self {
            DensityFactor::Six => 6,
            DensityFactor::Eight => 8,
            DensityFactor::Ten => 10,
        }
    }
}

impl TryFrom<u32> for DensityFactor {
    type Error = FreightError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            6 => Ok(DensityFactor::Six),
            8 => Ok(DensityFactor::Eight),
            10 => Ok(DensityFactor::Ten),
            other => Err(FreightError::Validation(format!(
                "Density factor must be 6, 8 or 10 kg/CFT, got {}",
                other
            ))),
        }
    }
}

impl From<DensityFactor> for u32 {
    fn from(factor: DensityFactor) -> Self {
        factor.kg_per_cft()
    }
}

/// One row of box dimensions entered for CFT calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CftEntry {
    #[serde(default, deserialize_with = "lenient::amount")]
    pub length: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub width: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub height: Option<BigDecimal>,
    #[serde(default)]
    pub unit: DimensionUnit,
    #[serde(default, deserialize_with = "lenient::count")]
    pub pieces: u32,
    /// Only meaningful for inch measurements
    #[serde(default)]
    pub density_factor: DensityFactor,
}

impl CftEntry {
    /// Create an entry measured in centimetres
    pub fn cm(length: BigDecimal, width: BigDecimal, height: BigDecimal, pieces: u32) -> Self {
        Self {
            length: Some(length),
            width: Some(width),
            height: Some(height),
            unit: DimensionUnit::Cm,
            pieces,
            density_factor: DensityFactor::default(),
        }
    }

    /// Create an entry measured in inches with a density factor
    pub fn inches(
        length: BigDecimal,
        width: BigDecimal,
        height: BigDecimal,
        pieces: u32,
        density_factor: DensityFactor,
    ) -> Self {
        Self {
            length: Some(length),
            width: Some(width),
            height: Some(height),
            unit: DimensionUnit::Inches,
            pieces,
            density_factor,
        }
    }
}

/// Shipment quantities that drive freight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentMetrics {
    #[serde(default, deserialize_with = "lenient::count")]
    pub pieces: u32,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub actual_weight: Option<BigDecimal>,
    #[serde(default)]
    pub cft_entries: Vec<CftEntry>,
    /// CFT weight committed to the shipment with an "apply"
    #[serde(default, deserialize_with = "lenient::amount")]
    pub cft_weight: Option<BigDecimal>,
}

impl ShipmentMetrics {
    /// Create metrics with pieces and actual weight only
    pub fn new(pieces: u32, actual_weight: BigDecimal) -> Self {
        Self {
            pieces,
            actual_weight: Some(actual_weight),
            cft_entries: Vec::new(),
            cft_weight: None,
        }
    }
}

/// Charges entered on or derived for an LR
///
/// `None` means the form field is empty. Fill-if-empty defaults from a
/// rate match only ever touch `None` fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChargeSet {
    /// Price per unit (per piece or per kg); never part of the subtotal
    #[serde(default, deserialize_with = "lenient::amount")]
    pub rate: Option<BigDecimal>,
    /// Freight amount
    #[serde(default, deserialize_with = "lenient::amount")]
    pub freight_rate: Option<BigDecimal>,
    #[serde(default)]
    pub calculation_method: Option<CalculationMethod>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub minimum_freight: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub lr_charges: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub hamali: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub pickup_charges: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub delivery_charges: Option<BigDecimal>,
    /// Legacy combined pickup + delivery field
    #[serde(default, deserialize_with = "lenient::amount")]
    pub pickup_delivery: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub oda_charges: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub other: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub warai_union: Option<BigDecimal>,
    #[serde(default)]
    pub gst_percent: Option<GstPolicy>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub advance_freight: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub agent_commission: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub tds_deducted: Option<BigDecimal>,
    /// Derived, read-only on the FTL form
    #[serde(default, deserialize_with = "lenient::amount")]
    pub balance_freight: Option<BigDecimal>,
}

impl ChargeSet {
    /// Create an empty charge set
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to separate pickup/delivery fields, zeroing the legacy combined one
    pub fn adopt_split_pickup_delivery(&mut self) {
        if self.pickup_charges.is_none() && self.delivery_charges.is_none() {
            if let Some(combined) = self.pickup_delivery.take() {
                self.pickup_charges = Some(combined);
            }
        }
        self.pickup_delivery = Some(BigDecimal::from(0));
    }

    /// Whether separate pickup/delivery fields are in use
    pub fn uses_split_pickup_delivery(&self) -> bool {
        self.pickup_charges.is_some() || self.delivery_charges.is_some()
    }
}

/// Subtotal, GST and grand total derived from a charge set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal: BigDecimal,
    pub gst_amount: BigDecimal,
    pub total_amount: BigDecimal,
    /// GST percentage applied
    pub gst_rate: BigDecimal,
    /// GST is payable by the recipient under reverse charge
    pub reverse_charge: bool,
}

impl Totals {
    /// Amount the carrier collects; reverse-charge GST is paid by the recipient
    pub fn collectible_amount(&self) -> BigDecimal {
        if self.reverse_charge {
            self.subtotal.clone()
        } else {
            self.total_amount.clone()
        }
    }
}

/// CFT piece-count validation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CftError {
    #[error("Add {missing} more pieces: {entered} of {declared} entered")]
    MissingPieces {
        declared: u64,
        entered: u64,
        missing: u64,
    },
    #[error("Remove {extra} extra pieces: {entered} entered for {declared}")]
    ExtraPieces {
        declared: u64,
        entered: u64,
        extra: u64,
    },
}

impl CftError {
    /// Signed difference: positive when more pieces are needed
    pub fn difference(&self) -> i64 {
        match self {
            CftError::MissingPieces { missing, .. } => i64::try_from(*missing).unwrap_or(i64::MAX),
            CftError::ExtraPieces { extra, .. } => -i64::try_from(*extra).unwrap_or(i64::MAX),
        }
    }
}

/// Errors that can occur around freight booking
#[derive(Debug, thiserror::Error)]
pub enum FreightError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Master data error: {0}")]
    MasterData(String),
    #[error("LR {lr_number} is locked: {reason}")]
    LrLocked { lr_number: String, reason: String },
    #[error("CFT pieces do not match: {0}")]
    PieceMismatch(#[from] CftError),
}

/// Result type for freight operations
pub type FreightResult<T> = Result<T, FreightError>;
