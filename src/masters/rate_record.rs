//! Rate master records: persisted JSON image and normalized tagged union

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::masters::city::{same_key, CityIndex, Client};
use crate::tax::gst::GstPolicy;
use crate::types::DeliveryType;
use crate::utils::numeric::{lenient, positive};

/// Route row as persisted inside `cityWiseRates` / `weightSlabRates`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawCityRate {
    #[serde(default, deserialize_with = "lenient::text")]
    pub origin_city: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub destination_city: Option<String>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub rate_per_kg: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub rate_per_box: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub pickup_charges: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub delivery_charges: Option<BigDecimal>,
}

/// Row as persisted inside `perBoxRates`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawPerBoxRate {
    #[serde(default, deserialize_with = "lenient::text")]
    pub apply_to_state: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub origin_city: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub destination_city: Option<String>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub rate_per_box: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub minimum_freight: Option<BigDecimal>,
}

/// Rate master record exactly as the application persists it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawRateRecord {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub client_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub client_code: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub rate_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub origin: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub destination: Option<String>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub rate_per_kg: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub rate_per_box: Option<BigDecimal>,
    #[serde(default)]
    pub city_wise_rates: Vec<RawCityRate>,
    #[serde(default)]
    pub weight_slab_rates: Vec<RawCityRate>,
    #[serde(default)]
    pub per_box_rates: Vec<RawPerBoxRate>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub gst_percent: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub delivery_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub lr_charges: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub oda_charges: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub pickup_charges: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub delivery_charges: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub warai_charges: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub other_charges: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub minimum_freight: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub freight: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub ftl_freight: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub freight_rate: Option<BigDecimal>,
}

/// Which of the four record shapes a rate record has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RateShapeKind {
    Simple,
    CityWise,
    WeightSlab,
    PerBox,
}

impl RateShapeKind {
    /// Matching priority, first to last
    pub const PRIORITY: [RateShapeKind; 4] = [
        RateShapeKind::Simple,
        RateShapeKind::CityWise,
        RateShapeKind::WeightSlab,
        RateShapeKind::PerBox,
    ];
}

/// Origin/destination pair with optional per-kg and per-box rates.
///
/// City fields hold canonical city ids; `None` never matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RouteRate {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub rate_per_kg: Option<BigDecimal>,
    pub rate_per_box: Option<BigDecimal>,
    pub pickup_charges: Option<BigDecimal>,
    pub delivery_charges: Option<BigDecimal>,
}

impl RouteRate {
    pub fn serves(&self, origin: &str, destination: &str) -> bool {
        self.origin.as_deref() == Some(origin) && self.destination.as_deref() == Some(destination)
    }
}

/// Per-box row: a state-wide wildcard or an explicit route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerBoxRate {
    pub apply_to_state: Option<String>,
    pub route: RouteRate,
    pub minimum_freight: Option<BigDecimal>,
}

impl PerBoxRate {
    pub fn rate_per_box(&self) -> Option<&BigDecimal> {
        self.route.rate_per_box.as_ref()
    }
}

/// The structural part of a rate record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RateShape {
    Simple(RouteRate),
    CityWise(Vec<RouteRate>),
    WeightSlab(Vec<RouteRate>),
    PerBox(Vec<PerBoxRate>),
}

impl RateShape {
    pub fn kind(&self) -> RateShapeKind {
        match self {
            RateShape::Simple(_) => RateShapeKind::Simple,
            RateShape::CityWise(_) => RateShapeKind::CityWise,
            RateShape::WeightSlab(_) => RateShapeKind::WeightSlab,
            RateShape::PerBox(_) => RateShapeKind::PerBox,
        }
    }
}

/// Ancillary charges a rate record proposes as defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChargeDefaults {
    pub lr_charges: Option<BigDecimal>,
    pub oda_charges: Option<BigDecimal>,
    pub pickup_charges: Option<BigDecimal>,
    pub delivery_charges: Option<BigDecimal>,
    pub warai_charges: Option<BigDecimal>,
    pub other_charges: Option<BigDecimal>,
    pub gst_percent: Option<GstPolicy>,
}

/// Normalized rate master record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRecord {
    pub id: Option<String>,
    pub client_id: Option<String>,
    pub client_code: Option<String>,
    /// Status was exactly "Active"
    pub active: bool,
    /// Free-form tag such as "city-wise" or "weight-slab"
    pub rate_type: Option<String>,
    pub shape: RateShape,
    pub delivery_type: Option<DeliveryType>,
    pub defaults: ChargeDefaults,
    pub minimum_freight: Option<BigDecimal>,
    /// Flat FTL freight from `freight`, `ftlFreight` or `freightRate`
    pub ftl_freight: Option<BigDecimal>,
}

impl RateRecord {
    /// Normalize a persisted record, resolving every city reference.
    ///
    /// The shape is chosen by discriminant: non-empty `cityWiseRates`,
    /// then `weightSlabRates`, then `perBoxRates`, else flat fields.
    pub fn from_raw(raw: RawRateRecord, cities: &CityIndex) -> Self {
        let record_label = raw.id.clone().unwrap_or_else(|| "<unnamed>".to_string());
        let resolve = |reference: &Option<String>| -> Option<String> {
            let reference = reference.as_deref()?;
            let canonical = cities.canonical(reference);
            if canonical.is_none() {
                tracing::warn!(
                    rate_id = %record_label,
                    city = %reference,
                    "Rate record references unknown city"
                );
            }
            canonical
        };
        let route_row = |row: &RawCityRate| RouteRate {
            origin: resolve(&row.origin_city),
            destination: resolve(&row.destination_city),
            rate_per_kg: row.rate_per_kg.clone(),
            rate_per_box: row.rate_per_box.clone(),
            pickup_charges: row.pickup_charges.clone(),
            delivery_charges: row.delivery_charges.clone(),
        };

        let shape = if !raw.city_wise_rates.is_empty() {
            RateShape::CityWise(raw.city_wise_rates.iter().map(route_row).collect())
        } else if !raw.weight_slab_rates.is_empty() {
            RateShape::WeightSlab(raw.weight_slab_rates.iter().map(route_row).collect())
        } else if !raw.per_box_rates.is_empty() {
            RateShape::PerBox(
                raw.per_box_rates
                    .iter()
                    .map(|row| PerBoxRate {
                        apply_to_state: row.apply_to_state.clone(),
                        route: RouteRate {
                            origin: resolve(&row.origin_city),
                            destination: resolve(&row.destination_city),
                            rate_per_box: row.rate_per_box.clone(),
                            ..RouteRate::default()
                        },
                        minimum_freight: row.minimum_freight.clone(),
                    })
                    .collect(),
            )
        } else {
            RateShape::Simple(RouteRate {
                origin: resolve(&raw.origin),
                destination: resolve(&raw.destination),
                rate_per_kg: raw.rate_per_kg.clone(),
                rate_per_box: raw.rate_per_box.clone(),
                pickup_charges: raw.pickup_charges.clone(),
                delivery_charges: raw.delivery_charges.clone(),
            })
        };

        let ftl_freight = positive(&raw.freight)
            .or_else(|| positive(&raw.ftl_freight))
            .or_else(|| positive(&raw.freight_rate));

        Self {
            id: raw.id,
            client_id: raw.client_id,
            client_code: raw.client_code,
            active: raw.status.as_deref() == Some("Active"),
            rate_type: raw.rate_type,
            shape,
            delivery_type: raw.delivery_type.as_deref().and_then(DeliveryType::from_exact),
            defaults: ChargeDefaults {
                lr_charges: raw.lr_charges,
                oda_charges: raw.oda_charges,
                pickup_charges: raw.pickup_charges,
                delivery_charges: raw.delivery_charges,
                warai_charges: raw.warai_charges,
                other_charges: raw.other_charges,
                gst_percent: raw.gst_percent.as_deref().map(GstPolicy::parse),
            },
            minimum_freight: raw.minimum_freight,
            ftl_freight,
        }
    }

    /// Client id and code are interchangeable on both sides
    pub fn belongs_to(&self, client: &Client) -> bool {
        [self.client_id.as_deref(), self.client_code.as_deref()]
            .into_iter()
            .flatten()
            .any(|reference| {
                same_key(&client.id, reference)
                    || client
                        .code
                        .as_deref()
                        .is_some_and(|code| same_key(code, reference))
            })
    }

    /// Whether the `rateType` tag marks a weight-oriented rate
    pub fn is_weight_oriented(&self) -> bool {
        self.rate_type.as_deref().is_some_and(|tag| {
            let tag = tag.to_ascii_lowercase().replace(['-', '_', ' '], "");
            tag.contains("citywise") || tag.contains("weightslab") || tag.contains("weight")
        })
    }

    pub fn kind(&self) -> RateShapeKind {
        self.shape.kind()
    }
}
