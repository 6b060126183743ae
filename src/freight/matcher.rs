//! Rate resolution against the client's rate master

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::masters::*;
use crate::types::*;
use crate::utils::numeric::positive;

/// Inputs to a rate lookup. Client and cities may be ids or codes.
#[derive(Debug, Clone, PartialEq)]
pub struct RateQuery<'a> {
    pub client: &'a str,
    pub origin: &'a str,
    pub destination: &'a str,
    pub payment_mode: PaymentMode,
    /// Preferred method when a route carries both per-kg and per-box rates
    pub method_hint: Option<CalculationMethod>,
}

impl<'a> RateQuery<'a> {
    pub fn new(client: &'a str, origin: &'a str, destination: &'a str) -> Self {
        Self {
            client,
            origin,
            destination,
            payment_mode: PaymentMode::Tbb,
            method_hint: None,
        }
    }

    pub fn payment_mode(mut self, payment_mode: PaymentMode) -> Self {
        self.payment_mode = payment_mode;
        self
    }

    pub fn method_hint(mut self, method: CalculationMethod) -> Self {
        self.method_hint = Some(method);
        self
    }
}

/// A usable rate resolved from the rate master
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateMatch {
    pub record_id: Option<String>,
    pub shape: RateShapeKind,
    /// Always strictly positive
    pub rate: BigDecimal,
    pub method: CalculationMethod,
    pub minimum_freight: Option<BigDecimal>,
    pub delivery_type: Option<DeliveryType>,
    pub defaults: ChargeDefaults,
}

impl RateMatch {
    /// Write the rate into a charge set.
    ///
    /// Rate, method and minimum freight are derived and always replaced.
    /// Ancillary charges and GST only fill fields that are still empty.
    pub fn apply_to(&self, charges: &ChargeSet) -> ChargeSet {
        let mut updated = charges.clone();
        updated.rate = Some(self.rate.clone());
        updated.calculation_method = Some(self.method);
        updated.minimum_freight = self.minimum_freight.clone();

        fill_if_empty(&mut updated.lr_charges, &self.defaults.lr_charges);
        fill_if_empty(&mut updated.oda_charges, &self.defaults.oda_charges);
        fill_if_empty(&mut updated.pickup_charges, &self.defaults.pickup_charges);
        fill_if_empty(&mut updated.delivery_charges, &self.defaults.delivery_charges);
        fill_if_empty(&mut updated.warai_union, &self.defaults.warai_charges);
        fill_if_empty(&mut updated.other, &self.defaults.other_charges);
        fill_if_empty(&mut updated.gst_percent, &self.defaults.gst_percent);
        updated
    }

    /// Delivery type to show: the rate's when recognised, else the current one
    pub fn delivery_type_or(&self, current: Option<DeliveryType>) -> Option<DeliveryType> {
        self.delivery_type.or(current)
    }
}

/// Copy `default` into `field` only when the field is empty
pub fn fill_if_empty<T: Clone>(field: &mut Option<T>, default: &Option<T>) {
    if field.is_none() {
        if let Some(value) = default {
            *field = Some(value.clone());
        }
    }
}

/// Why no rate could be shown
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateNotFound {
    #[error("Payment mode {0} is not rated")]
    NotRated(PaymentMode),
    #[error("Unknown client: {0}")]
    UnknownClient(String),
    #[error("Unknown origin city: {0}")]
    UnknownOrigin(String),
    #[error("Unknown destination city: {0}")]
    UnknownDestination(String),
    #[error("No rate master entry for this route")]
    NoRoute,
    #[error("Rate master entry has no usable rate")]
    ZeroRate,
}

/// Resolved route endpoints
struct Route<'a> {
    origin: &'a City,
    destination: &'a City,
}

/// Resolve the contracted rate for a client and route.
///
/// Shapes are tried in priority order Simple, CityWise, WeightSlab,
/// PerBox across all of the client's active records. The first record
/// that structurally serves the route decides the outcome.
pub fn resolve_rate(book: &RateBook, query: &RateQuery<'_>) -> Result<RateMatch, RateNotFound> {
    let outcome = find_rate(book, query);
    match &outcome {
        Ok(found) => tracing::debug!(
            client = query.client,
            origin = query.origin,
            destination = query.destination,
            shape = ?found.shape,
            method = ?found.method,
            rate = %found.rate,
            "Rate resolved"
        ),
        Err(reason) => tracing::debug!(
            client = query.client,
            origin = query.origin,
            destination = query.destination,
            %reason,
            "No rate"
        ),
    }
    outcome
}

fn find_rate(book: &RateBook, query: &RateQuery<'_>) -> Result<RateMatch, RateNotFound> {
    if !query.payment_mode.is_chargeable() {
        return Err(RateNotFound::NotRated(query.payment_mode));
    }
    let client = book
        .client(query.client)
        .ok_or_else(|| RateNotFound::UnknownClient(query.client.to_string()))?;
    let route = Route {
        origin: book
            .city(query.origin)
            .ok_or_else(|| RateNotFound::UnknownOrigin(query.origin.to_string()))?,
        destination: book
            .city(query.destination)
            .ok_or_else(|| RateNotFound::UnknownDestination(query.destination.to_string()))?,
    };

    let candidates: Vec<&RateRecord> = book.client_rates(client).collect();
    for kind in RateShapeKind::PRIORITY {
        for record in candidates.iter().filter(|record| record.kind() == kind) {
            if let Some(derived) = match_record(record, &route, query.method_hint) {
                return derived.map(|(rate, method, minimum_freight)| RateMatch {
                    record_id: record.id.clone(),
                    shape: kind,
                    rate,
                    method,
                    minimum_freight: minimum_freight.or_else(|| record.minimum_freight.clone()),
                    delivery_type: record.delivery_type,
                    defaults: record.defaults.clone(),
                });
            }
        }
    }
    Err(RateNotFound::NoRoute)
}

type Derived = (BigDecimal, CalculationMethod, Option<BigDecimal>);

/// `None` when the record does not serve the route, `Some(Err)` when it
/// does but carries no usable rate.
fn match_record(
    record: &RateRecord,
    route: &Route<'_>,
    hint: Option<CalculationMethod>,
) -> Option<Result<Derived, RateNotFound>> {
    let origin = route.origin.id.as_str();
    let destination = route.destination.id.as_str();

    match &record.shape {
        RateShape::Simple(row) => {
            if !row.serves(origin, destination) {
                return None;
            }
            let fallback = if record.is_weight_oriented() {
                CalculationMethod::ByWeight
            } else {
                CalculationMethod::PerPiece
            };
            Some(pick_rate(row, hint.unwrap_or(fallback)).map(|(rate, method)| (rate, method, None)))
        }
        RateShape::CityWise(rows) => {
            let row = rows.iter().find(|row| row.serves(origin, destination))?;
            Some(
                pick_rate(row, hint.unwrap_or(CalculationMethod::ByWeight))
                    .map(|(rate, method)| (rate, method, None)),
            )
        }
        RateShape::WeightSlab(rows) => {
            let row = rows.iter().find(|row| row.serves(origin, destination))?;
            Some(
                positive(&row.rate_per_kg)
                    .map(|rate| (rate, CalculationMethod::ByWeight, None))
                    .ok_or(RateNotFound::ZeroRate),
            )
        }
        RateShape::PerBox(rows) => {
            let destination_state = route.destination.state.as_deref();
            let row = rows
                .iter()
                .find(|row| {
                    row.apply_to_state.as_deref().is_some_and(|state| {
                        destination_state.is_some_and(|d| d.trim().eq_ignore_ascii_case(state.trim()))
                    })
                })
                .or_else(|| {
                    rows.iter().find(|row| {
                        row.apply_to_state.is_none() && row.route.serves(origin, destination)
                    })
                })?;
            Some(
                positive(&row.route.rate_per_box)
                    .map(|rate| (rate, CalculationMethod::PerPiece, row.minimum_freight.clone()))
                    .ok_or(RateNotFound::ZeroRate),
            )
        }
    }
}

/// Rate and method from a route row; `preferred` breaks the tie when
/// both per-kg and per-box rates are present.
fn pick_rate(
    row: &RouteRate,
    preferred: CalculationMethod,
) -> Result<(BigDecimal, CalculationMethod), RateNotFound> {
    match (positive(&row.rate_per_kg), positive(&row.rate_per_box)) {
        (Some(per_kg), None) => Ok((per_kg, CalculationMethod::ByWeight)),
        (None, Some(per_box)) => Ok((per_box, CalculationMethod::PerPiece)),
        (Some(per_kg), Some(per_box)) => Ok(match preferred {
            CalculationMethod::ByWeight => (per_kg, CalculationMethod::ByWeight),
            CalculationMethod::PerPiece => (per_box, CalculationMethod::PerPiece),
        }),
        (None, None) => Err(RateNotFound::ZeroRate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::gst::GstPolicy;

    fn book(rates_json: &str) -> RateBook {
        RateBook::load(
            vec![
                Client::new("1", "ACME", "Acme Traders"),
                Client::new("2", "BETA", "Beta Foods"),
            ],
            vec![
                City::new("10", "MUM", "Mumbai", "Maharashtra"),
                City::new("11", "PUN", "Pune", "Maharashtra"),
                City::new("12", "AMD", "Ahmedabad", "Gujarat"),
                City::new("13", "SUR", "Surat", "Gujarat"),
            ],
            serde_json::from_str(rates_json).unwrap(),
        )
    }

    #[test]
    fn test_simple_shape_wins_over_city_wise() {
        let book = book(
            r#"[
                {"id": "cw", "clientId": "1", "status": "Active",
                 "cityWiseRates": [{"originCity": "MUM", "destinationCity": "PUN", "ratePerKg": 12}]},
                {"id": "simple", "clientCode": "ACME", "status": "Active",
                 "origin": "MUM", "destination": "PUN", "ratePerKg": 8}
            ]"#,
        );
        let found = resolve_rate(&book, &RateQuery::new("1", "MUM", "PUN")).unwrap();
        assert_eq!(found.record_id.as_deref(), Some("simple"));
        assert_eq!(found.shape, RateShapeKind::Simple);
        assert_eq!(found.rate, BigDecimal::from(8));
        assert_eq!(found.method, CalculationMethod::ByWeight);
    }

    #[test]
    fn test_inactive_and_other_clients_are_ignored() {
        let book = book(
            r#"[
                {"clientId": "1", "status": "active", "origin": "MUM", "destination": "PUN", "ratePerKg": 8},
                {"clientId": "2", "status": "Active", "origin": "MUM", "destination": "PUN", "ratePerKg": 9}
            ]"#,
        );
        assert_eq!(
            resolve_rate(&book, &RateQuery::new("ACME", "MUM", "PUN")),
            Err(RateNotFound::NoRoute)
        );
    }

    #[test]
    fn test_simple_tie_break() {
        let book = book(
            r#"[
                {"clientId": "1", "status": "Active", "origin": "MUM", "destination": "PUN",
                 "ratePerKg": 8, "ratePerBox": 60},
                {"clientId": "2", "status": "Active", "rateType": "weight-slab",
                 "origin": "MUM", "destination": "PUN", "ratePerKg": 9, "ratePerBox": 70}
            ]"#,
        );
        let per_piece = resolve_rate(&book, &RateQuery::new("1", "MUM", "PUN")).unwrap();
        assert_eq!(per_piece.method, CalculationMethod::PerPiece);
        assert_eq!(per_piece.rate, BigDecimal::from(60));

        let by_weight = resolve_rate(&book, &RateQuery::new("2", "MUM", "PUN")).unwrap();
        assert_eq!(by_weight.method, CalculationMethod::ByWeight);
        assert_eq!(by_weight.rate, BigDecimal::from(9));

        let hinted = resolve_rate(
            &book,
            &RateQuery::new("1", "MUM", "PUN").method_hint(CalculationMethod::ByWeight),
        )
        .unwrap();
        assert_eq!(hinted.rate, BigDecimal::from(8));
    }

    #[test]
    fn test_city_wise_defaults_to_weight() {
        let book = book(
            r#"[{"clientId": "1", "status": "Active", "cityWiseRates": [
                {"originCity": "10", "destinationCity": "12", "ratePerBox": 90},
                {"originCity": "MUM", "destinationCity": "PUN", "ratePerKg": 7, "ratePerBox": 55}
            ]}]"#,
        );
        let found = resolve_rate(&book, &RateQuery::new("1", "10", "PUN")).unwrap();
        assert_eq!(found.shape, RateShapeKind::CityWise);
        assert_eq!(found.method, CalculationMethod::ByWeight);
        assert_eq!(found.rate, BigDecimal::from(7));

        let per_box = resolve_rate(&book, &RateQuery::new("1", "MUM", "AMD")).unwrap();
        assert_eq!(per_box.method, CalculationMethod::PerPiece);
        assert_eq!(per_box.rate, BigDecimal::from(90));
    }

    #[test]
    fn test_weight_slab_is_always_by_weight() {
        let book = book(
            r#"[{"clientId": "1", "status": "Active", "weightSlabRates": [
                {"originCity": "MUM", "destinationCity": "SUR", "ratePerKg": 6, "ratePerBox": 80}
            ]}]"#,
        );
        let found = resolve_rate(
            &book,
            &RateQuery::new("1", "MUM", "SUR").method_hint(CalculationMethod::PerPiece),
        )
        .unwrap();
        assert_eq!(found.shape, RateShapeKind::WeightSlab);
        assert_eq!(found.method, CalculationMethod::ByWeight);
        assert_eq!(found.rate, BigDecimal::from(6));
    }

    #[test]
    fn test_per_box_state_wildcard_before_city_row() {
        let book = book(
            r#"[{"clientId": "1", "status": "Active", "perBoxRates": [
                {"originCity": "MUM", "destinationCity": "AMD", "ratePerBox": 50, "minimumFreight": 200},
                {"applyToState": "gujarat", "ratePerBox": 45, "minimumFreight": 300}
            ]}]"#,
        );
        let found = resolve_rate(&book, &RateQuery::new("1", "MUM", "AMD")).unwrap();
        assert_eq!(found.shape, RateShapeKind::PerBox);
        assert_eq!(found.method, CalculationMethod::PerPiece);
        assert_eq!(found.rate, BigDecimal::from(45));
        assert_eq!(found.minimum_freight, Some(BigDecimal::from(300)));

        assert_eq!(
            resolve_rate(&book, &RateQuery::new("1", "MUM", "PUN")),
            Err(RateNotFound::NoRoute)
        );
    }

    #[test]
    fn test_zero_rate_is_not_a_match() {
        let book = book(
            r#"[{"clientId": "1", "status": "Active", "origin": "MUM", "destination": "PUN",
                 "ratePerKg": 0, "ratePerBox": ""}]"#,
        );
        assert_eq!(
            resolve_rate(&book, &RateQuery::new("1", "MUM", "PUN")),
            Err(RateNotFound::ZeroRate)
        );
    }

    #[test]
    fn test_unresolvable_inputs() {
        let book = book(r#"[]"#);
        assert_eq!(
            resolve_rate(&book, &RateQuery::new("9", "MUM", "PUN")),
            Err(RateNotFound::UnknownClient("9".to_string()))
        );
        assert_eq!(
            resolve_rate(&book, &RateQuery::new("1", "DEL", "PUN")),
            Err(RateNotFound::UnknownOrigin("DEL".to_string()))
        );
        assert_eq!(
            resolve_rate(&book, &RateQuery::new("1", "MUM", "")),
            Err(RateNotFound::UnknownDestination(String::new()))
        );
        assert_eq!(
            resolve_rate(
                &book,
                &RateQuery::new("1", "MUM", "PUN").payment_mode(PaymentMode::Foc)
            ),
            Err(RateNotFound::NotRated(PaymentMode::Foc))
        );
    }

    #[test]
    fn test_fill_if_empty_defaults() {
        let book = book(
            r#"[{"clientId": "1", "status": "Active", "origin": "MUM", "destination": "PUN",
                 "ratePerBox": 50, "lrCharges": 75, "odaCharges": 120, "waraiCharges": 15,
                 "gstPercent": "12", "deliveryType": "Door"}]"#,
        );
        let found = resolve_rate(&book, &RateQuery::new("1", "MUM", "PUN")).unwrap();

        let populated = ChargeSet {
            lr_charges: Some(BigDecimal::from(60)),
            ..ChargeSet::default()
        };
        let updated = found.apply_to(&populated);
        assert_eq!(updated.lr_charges, Some(BigDecimal::from(60)));
        assert_eq!(updated.oda_charges, Some(BigDecimal::from(120)));
        assert_eq!(updated.warai_union, Some(BigDecimal::from(15)));
        assert_eq!(updated.gst_percent, Some(GstPolicy::Percent(BigDecimal::from(12))));
        assert_eq!(updated.rate, Some(BigDecimal::from(50)));
        assert_eq!(updated.calculation_method, Some(CalculationMethod::PerPiece));

        let empty = found.apply_to(&ChargeSet::default());
        assert_eq!(empty.lr_charges, Some(BigDecimal::from(75)));

        assert_eq!(
            found.delivery_type_or(Some(DeliveryType::Godown)),
            Some(DeliveryType::Door)
        );
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let book = book(
            r#"[{"clientId": "1", "status": "Active", "origin": "MUM", "destination": "PUN", "ratePerKg": 8}]"#,
        );
        let query = RateQuery::new("1", "MUM", "PUN");
        assert_eq!(resolve_rate(&book, &query), resolve_rate(&book, &query));
    }
}
