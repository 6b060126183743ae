//! FTL flat freight and multi-stop pickup/delivery point charges

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::freight::matcher::fill_if_empty;
use crate::masters::*;
use crate::types::ChargeSet;
use crate::utils::numeric::{lenient, or_zero, positive};

/// Flat FTL freight for a client and route.
///
/// Only Simple and CityWise records are considered, Simple first.
/// Returns `None` when the client or either city is unknown or no
/// matching record carries a positive flat freight.
pub fn resolve_ftl_freight(
    book: &RateBook,
    client: &str,
    origin: &str,
    destination: &str,
) -> Option<BigDecimal> {
    let client = book.client(client)?;
    let origin = book.cities().canonical(origin)?;
    let destination = book.cities().canonical(destination)?;

    let serves = |record: &RateRecord, kind: RateShapeKind| match (&record.shape, kind) {
        (RateShape::Simple(row), RateShapeKind::Simple) => row.serves(&origin, &destination),
        (RateShape::CityWise(rows), RateShapeKind::CityWise) => {
            rows.iter().any(|row| row.serves(&origin, &destination))
        }
        _ => false,
    };

    let found = [RateShapeKind::Simple, RateShapeKind::CityWise]
        .into_iter()
        .find_map(|kind| {
            book.client_rates(client)
                .filter(|record| serves(*record, kind))
                .find_map(|record| record.ftl_freight.clone())
        });

    tracing::debug!(
        client = %client.id,
        %origin,
        %destination,
        freight = ?found,
        "FTL freight lookup"
    );
    found
}

/// Fill the FTL freight only when the field is still empty
pub fn apply_ftl_freight(charges: &ChargeSet, freight: Option<BigDecimal>) -> ChargeSet {
    let mut updated = charges.clone();
    fill_if_empty(&mut updated.freight_rate, &freight);
    updated
}

/// Pickup or delivery stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    Pickup,
    Delivery,
}

/// One stop of a multi-stop FTL booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopPoint {
    pub kind: PointKind,
    #[serde(default, deserialize_with = "lenient::text")]
    pub city: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub charges: Option<BigDecimal>,
}

impl StopPoint {
    pub fn new(kind: PointKind, city: &str) -> Self {
        Self {
            kind,
            city: Some(city.to_string()),
            address: None,
            charges: None,
        }
    }
}

/// Fill empty stop charges from the client's rate master.
///
/// Each stop is resolved on its own. A record-level `pickupCharges` /
/// `deliveryCharges` on a record whose route touches the stop city is
/// preferred; otherwise the charge on the matching `cityWiseRates` row is
/// used. Stops with no city or an existing charge are left alone.
pub fn resolve_point_charges(book: &RateBook, client: &str, points: &[StopPoint]) -> Vec<StopPoint> {
    let Some(client) = book.client(client) else {
        return points.to_vec();
    };

    points
        .iter()
        .map(|point| {
            let mut point = point.clone();
            if point.charges.is_some() {
                return point;
            }
            let Some(city) = point
                .city
                .as_deref()
                .and_then(|reference| book.cities().canonical(reference))
            else {
                return point;
            };
            point.charges = point_charge(book, client, point.kind, &city);
            point
        })
        .collect()
}

fn point_charge(
    book: &RateBook,
    client: &Client,
    kind: PointKind,
    city: &str,
) -> Option<BigDecimal> {
    let touches = |row: &RouteRate| match kind {
        PointKind::Pickup => row.origin.as_deref() == Some(city),
        PointKind::Delivery => row.destination.as_deref() == Some(city),
    };
    let row_charge = |row: &RouteRate| match kind {
        PointKind::Pickup => positive(&row.pickup_charges),
        PointKind::Delivery => positive(&row.delivery_charges),
    };

    let direct = book.client_rates(client).find_map(|record| {
        let touches_city = match &record.shape {
            RateShape::Simple(row) => touches(row),
            RateShape::CityWise(rows) | RateShape::WeightSlab(rows) => rows.iter().any(touches),
            RateShape::PerBox(rows) => rows.iter().any(|row| touches(&row.route)),
        };
        if !touches_city {
            return None;
        }
        match kind {
            PointKind::Pickup => positive(&record.defaults.pickup_charges),
            PointKind::Delivery => positive(&record.defaults.delivery_charges),
        }
    });

    direct.or_else(|| {
        book.client_rates(client).find_map(|record| match &record.shape {
            RateShape::CityWise(rows) => rows
                .iter()
                .find_map(|row| if touches(row) { row_charge(row) } else { None }),
            _ => None,
        })
    })
}

/// Sum of stop charges per kind
pub fn point_charge_totals(points: &[StopPoint]) -> (BigDecimal, BigDecimal) {
    points.iter().fold(
        (BigDecimal::from(0), BigDecimal::from(0)),
        |(pickup, delivery), point| match point.kind {
            PointKind::Pickup => (pickup + or_zero(&point.charges), delivery),
            PointKind::Delivery => (pickup, delivery + or_zero(&point.charges)),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> RateBook {
        RateBook::load(
            vec![Client::new("1", "ACME", "Acme Traders")],
            vec![
                City::new("10", "MUM", "Mumbai", "Maharashtra"),
                City::new("11", "PUN", "Pune", "Maharashtra"),
                City::new("12", "NSK", "Nashik", "Maharashtra"),
                City::new("13", "AMD", "Ahmedabad", "Gujarat"),
            ],
            serde_json::from_str(
                r#"[
                    {"clientId": "1", "status": "Active", "origin": "MUM", "destination": "PUN",
                     "ftlFreight": 18000, "pickupCharges": 500},
                    {"clientId": "ACME", "status": "Active", "cityWiseRates": [
                        {"originCity": "NSK", "destinationCity": "AMD", "ratePerKg": 4,
                         "pickupCharges": 350, "deliveryCharges": 650}
                    ], "freightRate": "32000"},
                    {"clientId": "1", "status": "Active", "weightSlabRates": [
                        {"originCity": "PUN", "destinationCity": "AMD", "ratePerKg": 4}
                    ], "freight": 99999}
                ]"#,
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_ftl_freight_from_simple_and_city_wise() {
        let book = book();
        assert_eq!(
            resolve_ftl_freight(&book, "1", "MUM", "PUN"),
            Some(BigDecimal::from(18000))
        );
        assert_eq!(
            resolve_ftl_freight(&book, "ACME", "12", "AMD"),
            Some(BigDecimal::from(32000))
        );
        assert_eq!(resolve_ftl_freight(&book, "1", "PUN", "AMD"), None);
        assert_eq!(resolve_ftl_freight(&book, "1", "MUM", "DEL"), None);
    }

    #[test]
    fn test_ftl_freight_fills_only_empty_field() {
        let manual = ChargeSet {
            freight_rate: Some(BigDecimal::from(20000)),
            ..ChargeSet::default()
        };
        let kept = apply_ftl_freight(&manual, Some(BigDecimal::from(18000)));
        assert_eq!(kept.freight_rate, Some(BigDecimal::from(20000)));

        let filled = apply_ftl_freight(&ChargeSet::default(), Some(BigDecimal::from(18000)));
        assert_eq!(filled.freight_rate, Some(BigDecimal::from(18000)));
    }

    #[test]
    fn test_point_charges() {
        let book = book();
        let mut preset = StopPoint::new(PointKind::Delivery, "AMD");
        preset.charges = Some(BigDecimal::from(100));
        let points = vec![
            StopPoint::new(PointKind::Pickup, "MUM"),
            StopPoint::new(PointKind::Pickup, "NSK"),
            StopPoint::new(PointKind::Delivery, "AMD"),
            preset,
            StopPoint {
                kind: PointKind::Delivery,
                city: None,
                address: Some("Unknown".to_string()),
                charges: None,
            },
        ];

        let resolved = resolve_point_charges(&book, "1", &points);
        assert_eq!(resolved[0].charges, Some(BigDecimal::from(500)));
        assert_eq!(resolved[1].charges, Some(BigDecimal::from(350)));
        assert_eq!(resolved[2].charges, Some(BigDecimal::from(650)));
        assert_eq!(resolved[3].charges, Some(BigDecimal::from(100)));
        assert_eq!(resolved[4].charges, None);

        let (pickup, delivery) = point_charge_totals(&resolved);
        assert_eq!(pickup, BigDecimal::from(850));
        assert_eq!(delivery, BigDecimal::from(750));
    }
}
