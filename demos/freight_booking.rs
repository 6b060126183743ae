//! Booking an LR end to end: rate lookup, CFT, freight, GST and print figures

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use lr_freight_core::{
    print::consignment_figures, utils::MemoryMasterData, Booking, BookingMode, BookingSession,
    CftEntry, PaymentMode, PointKind, RateBook, StopPoint,
};
use tracing_subscriber::EnvFilter;

const CLIENTS: &str = r#"[{"id": 1, "code": "ACME", "name": "Acme Traders"}]"#;

const CITIES: &str = r#"[
    {"id": 10, "code": "MUM", "name": "Mumbai", "state": "Maharashtra"},
    {"id": 11, "code": "PUN", "name": "Pune", "state": "Maharashtra"},
    {"id": 12, "code": "AMD", "name": "Ahmedabad", "state": "Gujarat"}
]"#;

const RATES: &str = r#"[
    {"id": "acme-pune", "clientId": 1, "status": "Active",
     "origin": "MUM", "destination": "PUN", "ratePerBox": 50, "minimumFreight": 200,
     "lrCharges": 75, "gstPercent": "5-rcm", "ftlFreight": 18000, "pickupCharges": 400},
    {"id": "acme-gujarat", "clientId": 1, "status": "Active",
     "weightSlabRates": [{"originCity": "MUM", "destinationCity": "AMD", "ratePerKg": 10}],
     "gstPercent": "12"}
]"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("🚚 LR Freight Core - Booking Example\n");

    let store = MemoryMasterData::from_json(CLIENTS, CITIES, RATES)?;
    let book = RateBook::from_source(&store).await?;
    println!(
        "📚 Loaded {} cities and {} rate records\n",
        book.cities().len(),
        book.rates().len()
    );

    // 1. PTL booking charged by weight
    println!("📦 PTL booking Mumbai → Ahmedabad:");
    let booking = Booking::new(
        "MUM/24-25/0042".to_string(),
        NaiveDate::from_ymd_opt(2024, 6, 1).ok_or("invalid date")?,
        BookingMode::Ptl,
        PaymentMode::ToPay,
    )
    .with_route("ACME", "MUM", "AMD");
    let mut session = BookingSession::new(&book, booking);

    session.set_pieces(4)?;
    session.set_actual_weight(BigDecimal::from(80))?;
    if let Some(found) = session.rate_match() {
        println!("  Rate:     ₹{} ({:?}, {:?})", found.rate, found.method, found.shape);
    }
    println!("  Freight:  ₹{:?}", session.charges().freight_rate);

    session.set_cft_entries(vec![
        CftEntry::cm(BigDecimal::from(100), BigDecimal::from(50), BigDecimal::from(40), 2),
        CftEntry::cm(BigDecimal::from(50), BigDecimal::from(40), BigDecimal::from(50), 1),
    ])?;
    match session.apply_cft() {
        Ok(total) => println!("  CFT:      {} kg", total),
        Err(err) => println!("  CFT not applied: {}", err),
    }

    session.set_cft_entries(vec![
        CftEntry::cm(BigDecimal::from(100), BigDecimal::from(50), BigDecimal::from(40), 2),
        CftEntry::cm(BigDecimal::from(50), BigDecimal::from(40), BigDecimal::from(50), 2),
    ])?;
    println!("  CFT:      {} kg", session.apply_cft()?);
    println!("  Freight:  ₹{:?}", session.charges().freight_rate);

    let saved = session.finish()?;
    let figures = consignment_figures(&saved, &book);
    println!("  Subtotal: ₹{}", figures.totals.subtotal);
    println!("  IGST:     ₹{}", figures.gst.igst_amount);
    println!("  Payable:  ₹{}", figures.payable_to_carrier);
    println!("  In words: {}\n", figures.amount_in_words);

    // 2. Manual override on a per-piece route
    println!("✍️  Manual freight on Mumbai → Pune:");
    let booking = Booking::new(
        "MUM/24-25/0043".to_string(),
        NaiveDate::from_ymd_opt(2024, 6, 1).ok_or("invalid date")?,
        BookingMode::Ptl,
        PaymentMode::Paid,
    )
    .with_route("ACME", "MUM", "PUN");
    let mut session = BookingSession::new(&book, booking);
    session.set_pieces(10)?;
    println!("  Auto:     ₹{:?}", session.charges().freight_rate);
    session.set_freight_manually(BigDecimal::from(450))?;
    session.set_destination("PUN")?;
    println!("  Kept:     ₹{:?}", session.charges().freight_rate);
    session.set_pieces(12)?;
    println!("  Recalc:   ₹{:?}", session.charges().freight_rate);
    println!(
        "  Totals:   ₹{} (GST ₹{} payable by recipient)\n",
        session.totals().subtotal,
        session.totals().gst_amount
    );

    // 3. FTL booking with pickup points
    println!("🚛 FTL booking Mumbai → Pune:");
    let mut booking = Booking::new(
        "FTL-0007".to_string(),
        NaiveDate::from_ymd_opt(2024, 6, 3).ok_or("invalid date")?,
        BookingMode::Ftl,
        PaymentMode::Paid,
    )
    .with_route("ACME", "MUM", "PUN");
    booking.points = vec![StopPoint::new(PointKind::Pickup, "MUM")];

    let mut session = BookingSession::new(&book, booking);
    session.edit_charges(|charges| {
        charges.advance_freight = Some(BigDecimal::from(10000));
        charges.agent_commission = Some(BigDecimal::from(500));
    })?;
    println!("  Freight:  ₹{:?}", session.charges().freight_rate);
    println!("  Pickup:   ₹{:?}", session.charges().pickup_charges);
    println!("  Balance:  ₹{:?}", session.charges().balance_freight);

    Ok(())
}
