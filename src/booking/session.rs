//! Booking session that drives rate lookup and charge calculation

use bigdecimal::BigDecimal;

use crate::booking::lr::Booking;
use crate::config::FreightConfig;
use crate::freight::*;
use crate::masters::RateBook;
use crate::tax::gst::compute_totals;
use crate::types::*;
use crate::utils::numeric::round2;
use crate::utils::validation::validate_booking;

/// One open booking or modification form.
///
/// Every input mutation reruns the chain rate lookup, fill-if-empty
/// defaults, freight, balance freight (FTL) and totals. The session owns
/// its booking and calculation trace; the rate book is shared read-only.
pub struct BookingSession<'a> {
    book: &'a RateBook,
    booking: Booking,
    trace: CalculationTrace,
    calculator: FreightCalculator,
    cft: CftCalculator,
    method_preference: Option<CalculationMethod>,
    rate_match: Option<RateMatch>,
    last_outcome: Option<FreightOutcome>,
    totals: Totals,
}

impl<'a> BookingSession<'a> {
    /// Open a form for a new booking
    pub fn new(book: &'a RateBook, booking: Booking) -> Self {
        Self::with_config(book, booking, FreightConfig::default())
    }

    /// Open a form for a new booking with custom calculation settings
    pub fn with_config(book: &'a RateBook, booking: Booking, config: FreightConfig) -> Self {
        let mut session = Self::assemble(book, booking, config, CalculationTrace::new());
        session.refresh();
        session
    }

    /// Open a saved LR for modification.
    ///
    /// The stored freight is kept until an input that drives it changes.
    pub fn open_saved(book: &'a RateBook, booking: Booking) -> FreightResult<Self> {
        booking.lifecycle.ensure_modifiable(&booking.lr_number)?;
        let trace = CalculationTrace::from_saved(&booking.charges, &booking.metrics);
        let mut session = Self::assemble(book, booking, FreightConfig::default(), trace);

        if !session.booking.is_ftl() {
            // the last auto value is what the rate master yields today
            session.refresh_rate();
            session.trace.last_calculated_freight = session
                .calculator
                .compute_freight(&session.booking.charges, &session.booking.metrics);
        }
        session.refresh();
        Ok(session)
    }

    fn assemble(
        book: &'a RateBook,
        booking: Booking,
        config: FreightConfig,
        trace: CalculationTrace,
    ) -> Self {
        Self {
            book,
            trace,
            cft: CftCalculator::with_config(&config),
            calculator: FreightCalculator::with_config(config),
            // keep the method already chosen on the form
            method_preference: booking.charges.calculation_method,
            rate_match: None,
            last_outcome: None,
            totals: compute_totals(&booking.charges),
            booking,
        }
    }

    pub fn booking(&self) -> &Booking {
        &self.booking
    }

    pub fn charges(&self) -> &ChargeSet {
        &self.booking.charges
    }

    pub fn trace(&self) -> &CalculationTrace {
        &self.trace
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Rate shown next to the form; `None` when nothing was found
    pub fn rate_match(&self) -> Option<&RateMatch> {
        self.rate_match.as_ref()
    }

    pub fn last_outcome(&self) -> Option<&FreightOutcome> {
        self.last_outcome.as_ref()
    }

    fn edit(&mut self, change: impl FnOnce(&mut Booking)) -> FreightResult<()> {
        self.booking
            .lifecycle
            .ensure_modifiable(&self.booking.lr_number)?;
        change(&mut self.booking);
        self.refresh();
        Ok(())
    }

    pub fn set_client(&mut self, client: &str) -> FreightResult<()> {
        self.edit(|booking| booking.client = Some(client.to_string()))
    }

    pub fn set_origin(&mut self, origin: &str) -> FreightResult<()> {
        self.edit(|booking| booking.origin = Some(origin.to_string()))
    }

    pub fn set_destination(&mut self, destination: &str) -> FreightResult<()> {
        self.edit(|booking| booking.destination = Some(destination.to_string()))
    }

    pub fn set_payment_mode(&mut self, payment_mode: PaymentMode) -> FreightResult<()> {
        self.edit(|booking| booking.payment_mode = payment_mode)
    }

    pub fn set_delivery_type(&mut self, delivery_type: DeliveryType) -> FreightResult<()> {
        self.edit(|booking| booking.delivery_type = Some(delivery_type))
    }

    /// Method to use when a route offers both per-kg and per-box rates
    pub fn set_method_preference(&mut self, method: CalculationMethod) -> FreightResult<()> {
        self.method_preference = Some(method);
        self.edit(|_| {})
    }

    pub fn set_pieces(&mut self, pieces: u32) -> FreightResult<()> {
        self.edit(|booking| booking.metrics.pieces = pieces)
    }

    pub fn set_actual_weight(&mut self, weight: BigDecimal) -> FreightResult<()> {
        self.edit(|booking| booking.metrics.actual_weight = Some(weight))
    }

    pub fn set_cft_entries(&mut self, entries: Vec<CftEntry>) -> FreightResult<()> {
        self.edit(|booking| booking.metrics.cft_entries = entries)
    }

    /// Running CFT total of the entered rows, before it is applied
    pub fn preview_cft(&self) -> BigDecimal {
        self.cft.total_cft(&self.booking.metrics.cft_entries)
    }

    /// Commit the CFT total to the shipment.
    ///
    /// Blocked with the signed piece difference when the rows do not add
    /// up to the declared piece count.
    pub fn apply_cft(&mut self) -> FreightResult<BigDecimal> {
        let total = self.cft.apply(
            &self.booking.metrics.cft_entries,
            self.booking.metrics.pieces,
        )?;
        let committed = total.clone();
        self.edit(|booking| booking.metrics.cft_weight = Some(committed))?;
        Ok(total)
    }

    /// Edit any non-freight charge field
    pub fn edit_charges(&mut self, change: impl FnOnce(&mut ChargeSet)) -> FreightResult<()> {
        self.edit(|booking| change(&mut booking.charges))
    }

    /// The user typed a freight amount directly
    pub fn set_freight_manually(&mut self, freight: BigDecimal) -> FreightResult<()> {
        self.booking
            .lifecycle
            .ensure_modifiable(&self.booking.lr_number)?;
        let (charges, trace) = record_manual_freight(&self.booking.charges, &self.trace, freight);
        self.booking.charges = charges;
        self.trace = trace;
        self.refresh();
        Ok(())
    }

    pub fn set_points(&mut self, points: Vec<StopPoint>) -> FreightResult<()> {
        self.edit(|booking| booking.points = points)
    }

    /// Rerun the whole calculation chain for the current inputs
    pub fn refresh(&mut self) {
        match self.booking.booking_mode {
            BookingMode::Ptl => self.refresh_rate(),
            BookingMode::Ftl => self.refresh_ftl(),
        }

        let context = FreightContext::new(self.booking.booking_mode, self.booking.payment_mode);
        let recalculation = self.calculator.recalculate_freight(
            context,
            &self.booking.charges,
            &self.booking.metrics,
            &self.trace,
        );
        self.booking.charges = recalculation.charges;
        self.trace = recalculation.trace;
        self.last_outcome = Some(recalculation.outcome);

        if self.booking.is_ftl() {
            self.booking.charges = refresh_balance_freight(&self.booking.charges);
        }
        self.totals = compute_totals(&self.booking.charges);
    }

    fn route(&self) -> Option<(&str, &str, &str)> {
        Some((
            self.booking.client.as_deref()?,
            self.booking.origin.as_deref()?,
            self.booking.destination.as_deref()?,
        ))
    }

    fn refresh_rate(&mut self) {
        let Some((client, origin, destination)) = self.route() else {
            self.rate_match = None;
            return;
        };
        let mut query = RateQuery::new(client, origin, destination)
            .payment_mode(self.booking.payment_mode);
        query.method_hint = self.method_preference;

        match resolve_rate(self.book, &query) {
            Ok(found) => {
                self.booking.charges = found.apply_to(&self.booking.charges);
                self.booking.delivery_type = found.delivery_type_or(self.booking.delivery_type);
                self.rate_match = Some(found);
            }
            // charge fields from the previous match stay as entered
            Err(_) => self.rate_match = None,
        }
    }

    fn refresh_ftl(&mut self) {
        self.rate_match = None;
        let Some((client, origin, destination)) = self.route() else {
            return;
        };
        let client = client.to_string();

        let freight = resolve_ftl_freight(self.book, &client, origin, destination);
        self.booking.charges = apply_ftl_freight(&self.booking.charges, freight);

        if !self.booking.points.is_empty() {
            self.booking.points = resolve_point_charges(self.book, &client, &self.booking.points);
            let (pickup, delivery) = point_charge_totals(&self.booking.points);
            let charges = &mut self.booking.charges;
            fill_if_empty(&mut charges.pickup_charges, &Some(round2(&pickup)));
            fill_if_empty(&mut charges.delivery_charges, &Some(round2(&delivery)));
        }
    }

    /// Validate and hand back the booking for saving
    pub fn finish(mut self) -> FreightResult<Booking> {
        self.refresh();
        validate_booking(&self.booking)?;
        Ok(self.booking)
    }

    /// Check the LR may be deleted
    pub fn ensure_deletable(&self) -> FreightResult<()> {
        self.booking
            .lifecycle
            .ensure_deletable(&self.booking.lr_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::lifecycle::LifecycleFlags;
    use crate::masters::{City, Client};
    use chrono::NaiveDate;

    fn book() -> RateBook {
        RateBook::load(
            vec![Client::new("1", "ACME", "Acme Traders")],
            vec![
                City::new("10", "MUM", "Mumbai", "Maharashtra"),
                City::new("11", "PUN", "Pune", "Maharashtra"),
            ],
            serde_json::from_str(
                r#"[{"clientId": "1", "status": "Active", "origin": "MUM", "destination": "PUN",
                     "ratePerKg": 8, "ratePerBox": 60}]"#,
            )
            .unwrap(),
        )
    }

    fn booking() -> Booking {
        let mut booking = Booking::new(
            "LR-1".to_string(),
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            BookingMode::Ptl,
            PaymentMode::Paid,
        )
        .with_route("ACME", "MUM", "PUN");
        booking.metrics = ShipmentMetrics::new(5, BigDecimal::from(30));
        booking
    }

    #[test]
    fn test_method_preference_switches_rate() {
        let book = book();
        let mut session = BookingSession::new(&book, booking());
        assert_eq!(session.charges().freight_rate, Some(BigDecimal::from(300)));

        session
            .set_method_preference(CalculationMethod::ByWeight)
            .unwrap();
        assert_eq!(session.charges().rate, Some(BigDecimal::from(8)));
        assert_eq!(session.charges().freight_rate, Some(BigDecimal::from(240)));
    }

    #[test]
    fn test_route_change_clears_match() {
        let book = book();
        let mut session = BookingSession::new(&book, booking());
        assert!(session.rate_match().is_some());

        session.set_destination("MUM").unwrap();
        assert!(session.rate_match().is_none());
        // stale rate stays on the form
        assert_eq!(session.charges().rate, Some(BigDecimal::from(60)));
        assert_eq!(
            session.charges().calculation_method,
            Some(CalculationMethod::PerPiece)
        );

        session.set_pieces(6).unwrap();
        assert!(session.rate_match().is_none());
        assert_eq!(session.charges().freight_rate, Some(BigDecimal::from(360)));
    }

    #[test]
    fn test_locked_lr_rejects_edits() {
        let book = book();
        let mut session = BookingSession::new(&book, booking());
        session.booking.lifecycle = LifecycleFlags {
            cancelled: true,
            ..LifecycleFlags::default()
        };
        assert!(matches!(
            session.set_pieces(7),
            Err(FreightError::LrLocked { .. })
        ));
        assert!(session.set_freight_manually(BigDecimal::from(1)).is_err());
        assert_eq!(session.booking().metrics.pieces, 5);
    }

    #[test]
    fn test_saved_weight_booking_keeps_method_on_dual_rate_route() {
        let book = book();
        let mut saved = booking();
        saved.charges.rate = Some(BigDecimal::from(8));
        saved.charges.calculation_method = Some(CalculationMethod::ByWeight);
        saved.charges.freight_rate = Some(BigDecimal::from(260));

        let mut session = BookingSession::open_saved(&book, saved).unwrap();
        assert_eq!(session.charges().calculation_method, Some(CalculationMethod::ByWeight));
        assert_eq!(session.charges().rate, Some(BigDecimal::from(8)));
        assert_eq!(session.charges().freight_rate, Some(BigDecimal::from(260)));
        assert_eq!(
            session.last_outcome(),
            Some(&FreightOutcome::Unchanged(SkipReason::StoredValueKept))
        );

        session.set_actual_weight(BigDecimal::from(35)).unwrap();
        assert_eq!(session.charges().freight_rate, Some(BigDecimal::from(280)));
        assert_eq!(session.charges().calculation_method, Some(CalculationMethod::ByWeight));
    }

    #[test]
    fn test_new_booking_with_method_uses_it() {
        let book = book();
        let mut draft = booking();
        draft.charges.calculation_method = Some(CalculationMethod::ByWeight);
        let session = BookingSession::new(&book, draft);
        assert_eq!(session.charges().rate, Some(BigDecimal::from(8)));
        assert_eq!(session.charges().freight_rate, Some(BigDecimal::from(240)));
    }

    #[test]
    fn test_cft_mismatch_leaves_weight_uncommitted() {
        let book = book();
        let mut session = BookingSession::new(&book, booking());
        session
            .set_cft_entries(vec![CftEntry::cm(
                BigDecimal::from(50),
                BigDecimal::from(40),
                BigDecimal::from(30),
                6,
            )])
            .unwrap();
        assert!(matches!(
            session.apply_cft(),
            Err(FreightError::PieceMismatch(CftError::ExtraPieces { extra: 1, .. }))
        ));
        assert_eq!(session.booking().metrics.cft_weight, None);
    }
}
