//! Booking availability widget.
//!
//! Drives the two-step booking dialog: pick a variant, staff member, day and
//! time slot, then confirm. Reactive re-fetches are explicit method calls;
//! every selection that changes what is available refreshes the affected
//! lookups and clears the now-stale time slot.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, TimeZone};
use gymshop_client::StorefrontClient;
use gymshop_core::booking::{day_bounds, month_bounds, resolve_booking_type};
use gymshop_core::{
    AvailabilityQuery, BookingRequest, Service, TimeSlot, ValidationError, Variant,
};

use crate::error::StorefrontError;
use crate::notify::{report, Notice, Notifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStep {
    Select,
    Confirm,
}

/// Where the caller should go after a confirmed booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Checkout,
}

pub struct BookingWidget<Tz: TimeZone> {
    client: Arc<StorefrontClient>,
    notifier: Arc<dyn Notifier>,
    tz: Tz,
    open: bool,
    step: BookingStep,
    service: Option<Service>,
    variant_id: Option<i64>,
    size_id: Option<i64>,
    staff_id: Option<i64>,
    quantity: u32,
    month: (i32, u32),
    available_days: BTreeSet<NaiveDate>,
    date: Option<NaiveDate>,
    slots: Vec<TimeSlot>,
    slot: Option<TimeSlot>,
}

impl<Tz> BookingWidget<Tz>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    /// A closed widget showing the month containing `today`.
    pub fn new(
        client: Arc<StorefrontClient>,
        notifier: Arc<dyn Notifier>,
        tz: Tz,
        today: NaiveDate,
    ) -> Self {
        Self {
            client,
            notifier,
            tz,
            open: false,
            step: BookingStep::Select,
            service: None,
            variant_id: None,
            size_id: None,
            staff_id: None,
            quantity: 1,
            month: (today.year(), today.month()),
            available_days: BTreeSet::new(),
            date: None,
            slots: Vec::new(),
            slot: None,
        }
    }

    /// Opening always starts from the selection step.
    pub fn open(&mut self) {
        self.open = true;
        self.step = BookingStep::Select;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.step = BookingStep::Select;
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub fn step(&self) -> BookingStep {
        self.step
    }

    #[must_use]
    pub fn service(&self) -> Option<&Service> {
        self.service.as_ref()
    }

    #[must_use]
    pub fn variant(&self) -> Option<&Variant> {
        let id = self.variant_id?;
        self.service.as_ref()?.variant(id)
    }

    #[must_use]
    pub fn variant_id(&self) -> Option<i64> {
        self.variant_id
    }

    #[must_use]
    pub fn size_id(&self) -> Option<i64> {
        self.size_id
    }

    #[must_use]
    pub fn staff_id(&self) -> Option<i64> {
        self.staff_id
    }

    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    #[must_use]
    pub fn month(&self) -> (i32, u32) {
        self.month
    }

    #[must_use]
    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.date
    }

    #[must_use]
    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    #[must_use]
    pub fn selected_slot(&self) -> Option<TimeSlot> {
        self.slot
    }

    /// Loads service detail and defaults to its first variant and staff.
    ///
    /// # Errors
    ///
    /// [`StorefrontError::Api`] when the detail or the day lookup fails.
    pub async fn load_service(&mut self, service_id: i64) -> Result<(), StorefrontError> {
        let service = match self.client.get_service(service_id).await {
            Ok(s) => s,
            Err(e) => return Err(report(self.notifier.as_ref(), e)),
        };
        self.variant_id = service.variants.first().map(|v| v.id);
        self.staff_id = service.staffs.first().map(|s| s.id);
        self.service = Some(service);
        self.reset_size();
        self.date = None;
        self.slots.clear();
        self.slot = None;
        self.refresh_days().await
    }

    /// Switches the calendar and reloads its open days.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidMonth`] for an impossible month, otherwise
    /// [`StorefrontError::Api`] when the day lookup fails.
    pub async fn set_month(&mut self, year: i32, month: u32) -> Result<(), StorefrontError> {
        if let Err(e) = month_bounds(&self.tz, year, month) {
            return Err(report(self.notifier.as_ref(), e));
        }
        self.month = (year, month);
        self.slot = None;
        if self
            .date
            .is_some_and(|d| (d.year(), d.month()) != self.month)
        {
            self.date = None;
            self.slots.clear();
        }
        self.refresh_days().await
    }

    #[must_use]
    pub fn is_day_enabled(&self, date: NaiveDate) -> bool {
        self.available_days.contains(&date)
    }

    /// Open days of the displayed month.
    #[must_use]
    pub fn enabled_days(&self) -> Vec<NaiveDate> {
        self.available_days.iter().copied().collect()
    }

    /// # Errors
    ///
    /// [`ValidationError::DayUnavailable`] for a day without capacity,
    /// otherwise [`StorefrontError::Api`] when the slot lookup fails.
    pub async fn select_date(&mut self, date: NaiveDate) -> Result<(), StorefrontError> {
        if !self.is_day_enabled(date) {
            return Err(report(
                self.notifier.as_ref(),
                ValidationError::DayUnavailable(date),
            ));
        }
        self.date = Some(date);
        self.slot = None;
        self.slots.clear();
        self.refresh_slots().await
    }

    /// Makes slot `index` the sole schedule entry.
    ///
    /// # Errors
    ///
    /// [`StorefrontError::NotFound`] when `index` is not a listed slot.
    pub fn select_slot(&mut self, index: usize) -> Result<TimeSlot, StorefrontError> {
        let Some(slot) = self.slots.get(index).copied() else {
            return Err(report(
                self.notifier.as_ref(),
                StorefrontError::NotFound(format!("time slot #{index}")),
            ));
        };
        self.slot = Some(slot);
        Ok(slot)
    }

    /// # Errors
    ///
    /// [`StorefrontError::NotFound`] for a variant the service does not
    /// have, otherwise [`StorefrontError::Api`] when a lookup fails.
    pub async fn select_variant(&mut self, variant_id: i64) -> Result<(), StorefrontError> {
        if self.service.as_ref().and_then(|s| s.variant(variant_id)).is_none() {
            return Err(report(
                self.notifier.as_ref(),
                StorefrontError::NotFound(format!("variant {variant_id}")),
            ));
        }
        self.variant_id = Some(variant_id);
        self.reset_size();
        self.slot = None;
        if let Err(e) = self.refresh_days().await {
            self.date = None;
            self.slots.clear();
            return Err(e);
        }
        match self.date {
            Some(d) if self.is_day_enabled(d) => self.refresh_slots().await,
            Some(_) => {
                self.date = None;
                self.slots.clear();
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// # Errors
    ///
    /// [`StorefrontError::NotFound`] for unknown staff, otherwise
    /// [`StorefrontError::Api`] when the slot lookup fails.
    pub async fn select_staff(&mut self, staff_id: i64) -> Result<(), StorefrontError> {
        if self.service.as_ref().and_then(|s| s.staff(staff_id)).is_none() {
            return Err(report(
                self.notifier.as_ref(),
                StorefrontError::NotFound(format!("staff {staff_id}")),
            ));
        }
        self.staff_id = Some(staff_id);
        self.slot = None;
        if self.date.is_some() {
            self.refresh_slots().await?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// [`StorefrontError::NotFound`] for a size the current variant lacks.
    pub fn select_size(&mut self, size_id: i64) -> Result<(), StorefrontError> {
        if !self
            .variant()
            .is_some_and(|v| v.sizes.iter().any(|s| s.id == size_id))
        {
            return Err(report(
                self.notifier.as_ref(),
                StorefrontError::NotFound(format!("size {size_id}")),
            ));
        }
        self.size_id = Some(size_id);
        Ok(())
    }

    /// # Errors
    ///
    /// [`ValidationError::QuantityBelowOne`] for anything under 1.
    pub fn set_quantity(&mut self, quantity: i64) -> Result<(), StorefrontError> {
        match u32::try_from(quantity) {
            Ok(q) if q >= 1 => {
                self.quantity = q;
                Ok(())
            }
            _ => Err(report(
                self.notifier.as_ref(),
                ValidationError::QuantityBelowOne { quantity },
            )),
        }
    }

    #[must_use]
    pub fn slot_label(&self, slot: &TimeSlot) -> String {
        slot.label(&self.tz)
    }

    /// Moves to the confirmation step once a slot is chosen.
    ///
    /// # Errors
    ///
    /// [`ValidationError::MissingSelection`] naming the first missing choice.
    pub fn book_now(&mut self) -> Result<(), StorefrontError> {
        if let Err(e) = self.check_selection() {
            return Err(report(self.notifier.as_ref(), e));
        }
        self.step = BookingStep::Confirm;
        Ok(())
    }

    pub fn back(&mut self) {
        self.step = BookingStep::Select;
    }

    /// The booking body for the current selection.
    ///
    /// # Errors
    ///
    /// [`ValidationError::MissingSelection`] naming the first missing choice.
    pub fn build_request(&self, customer_id: i64) -> Result<BookingRequest, StorefrontError> {
        self.check_selection()?;
        let service = self
            .service
            .as_ref()
            .ok_or(ValidationError::MissingSelection("service"))?;
        let variant_type = self.variant().and_then(|v| v.booking_type_id);
        Ok(BookingRequest {
            service_id: service.id,
            variant_id: self.variant_id,
            staff_id: self.staff_id,
            quantity: self.quantity,
            booking_type_id: resolve_booking_type(service.booking_type_id, variant_type),
            customer_id,
            is_paid: false,
            schedules: self.slot.into_iter().collect(),
        })
    }

    /// Submits the booking from the confirmation step.
    ///
    /// On failure the dialog stays exactly as it was.
    ///
    /// # Errors
    ///
    /// [`StorefrontError::InvalidState`] outside the confirmation step,
    /// [`StorefrontError::Validation`] for an incomplete selection, or
    /// [`StorefrontError::Api`] when the booking is refused.
    pub async fn confirm(&mut self, customer_id: i64) -> Result<Navigation, StorefrontError> {
        if self.step != BookingStep::Confirm {
            return Err(report(
                self.notifier.as_ref(),
                StorefrontError::InvalidState("confirm requires the confirmation step"),
            ));
        }
        let request = match self.build_request(customer_id) {
            Ok(r) => r,
            Err(e) => return Err(report(self.notifier.as_ref(), e)),
        };
        if let Err(e) = self.client.create_booking(&request).await {
            tracing::warn!(error = %e, service_id = request.service_id, "booking failed");
            return Err(report(self.notifier.as_ref(), e));
        }
        self.notifier.notify(Notice::success("Booking confirmed"));
        self.close();
        Ok(Navigation::Checkout)
    }

    fn check_selection(&self) -> Result<(), ValidationError> {
        let Some(service) = &self.service else {
            return Err(ValidationError::MissingSelection("service"));
        };
        if !service.variants.is_empty() && self.variant_id.is_none() {
            return Err(ValidationError::MissingSelection("variant"));
        }
        if self.variant().is_some_and(|v| !v.sizes.is_empty()) && self.size_id.is_none() {
            return Err(ValidationError::MissingSelection("size"));
        }
        if self.slot.is_none() {
            return Err(ValidationError::MissingSelection("time slot"));
        }
        Ok(())
    }

    /// First size of the current variant, or none when it has no sizes.
    fn reset_size(&mut self) {
        self.size_id = self
            .variant()
            .and_then(|v| v.sizes.first())
            .map(|s| s.id);
    }

    fn query(&self, from_time: i64, to_time: i64) -> Option<AvailabilityQuery> {
        Some(AvailabilityQuery {
            service_id: self.service.as_ref()?.id,
            variant_id: self.variant_id,
            staff_id: self.staff_id,
            from_time,
            to_time,
        })
    }

    /// Reloads open days for the displayed month. A failed lookup leaves no
    /// day enabled.
    async fn refresh_days(&mut self) -> Result<(), StorefrontError> {
        let (year, month) = self.month;
        let (from, to) = match month_bounds(&self.tz, year, month) {
            Ok(bounds) => bounds,
            Err(e) => return Err(report(self.notifier.as_ref(), e)),
        };
        let Some(query) = self.query(from, to) else {
            return Ok(());
        };
        match self.client.available_days(&query).await {
            Ok(days) => {
                self.available_days = days
                    .into_iter()
                    .filter_map(|ts| self.tz.timestamp_opt(ts, 0).single())
                    .map(|dt| dt.date_naive())
                    .filter(|d| (d.year(), d.month()) == self.month)
                    .collect();
                tracing::debug!(
                    service_id = query.service_id,
                    year,
                    month,
                    open = self.available_days.len(),
                    "available days loaded"
                );
                Ok(())
            }
            Err(e) => {
                self.available_days.clear();
                Err(report(self.notifier.as_ref(), e))
            }
        }
    }

    async fn refresh_slots(&mut self) -> Result<(), StorefrontError> {
        let Some(date) = self.date else {
            return Ok(());
        };
        let Some((from, to)) = day_bounds(&self.tz, date) else {
            return Err(report(
                self.notifier.as_ref(),
                ValidationError::DayUnavailable(date),
            ));
        };
        let Some(query) = self.query(from, to) else {
            return Ok(());
        };
        match self.client.available_slots(&query).await {
            Ok(slots) => {
                self.slots = slots;
                Ok(())
            }
            Err(e) => Err(report(self.notifier.as_ref(), e)),
        }
    }
}

#[cfg(test)]
#[path = "booking_test.rs"]
mod tests;
