//! Booking windows, availability queries and calendar arithmetic.
//!
//! All instants on the wire are Unix seconds. Calendar boundaries (a day's
//! `00:00:00`–`23:59:59`, a month's first and last second) are computed in the
//! caller's time zone so the storefront asks for the days the customer sees.

use chrono::{Datelike, NaiveDate, TimeDelta, TimeZone};
use serde::{Deserialize, Serialize};

use crate::catalog::BookingTypeId;
use crate::filter::Filter;
use crate::ValidationError;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// A contiguous reservation window, `from_time < to_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawTimeSlot")]
pub struct TimeSlot {
    from_time: i64,
    to_time: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTimeSlot {
    from_time: i64,
    to_time: i64,
}

impl TryFrom<RawTimeSlot> for TimeSlot {
    type Error = ValidationError;

    fn try_from(raw: RawTimeSlot) -> Result<Self, Self::Error> {
        TimeSlot::new(raw.from_time, raw.to_time)
    }
}

impl TimeSlot {
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTimeSlot`] unless `from_time < to_time`.
    pub fn new(from_time: i64, to_time: i64) -> Result<Self, ValidationError> {
        if from_time >= to_time {
            return Err(ValidationError::InvalidTimeSlot { from_time, to_time });
        }
        Ok(Self { from_time, to_time })
    }

    #[must_use]
    pub fn from_time(&self) -> i64 {
        self.from_time
    }

    #[must_use]
    pub fn to_time(&self) -> i64 {
        self.to_time
    }

    /// `HH:mm–HH:mm` in `tz`, 24-hour clock.
    #[must_use]
    pub fn label<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let fmt = |secs: i64| {
            tz.timestamp_opt(secs, 0)
                .single()
                .map_or_else(|| "--:--".to_owned(), |dt| dt.format("%H:%M").to_string())
        };
        format!("{}–{}", fmt(self.from_time), fmt(self.to_time))
    }
}

/// First and last second of `date` in `tz`: `00:00:00` and `23:59:59`.
///
/// When either wall-clock time falls in a DST gap, the bound moves inward to
/// the nearest minute that exists. Returns `None` only when no time of that
/// day exists in `tz`.
#[must_use]
pub fn day_bounds<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<(i64, i64)> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    let last = date.and_hms_opt(23, 59, 59)?;
    let start = (0..MINUTES_PER_DAY)
        .map(|m| midnight + TimeDelta::minutes(m))
        .find_map(|local| tz.from_local_datetime(&local).earliest())?;
    let end = (0..MINUTES_PER_DAY)
        .map(|m| last - TimeDelta::minutes(m))
        .find_map(|local| tz.from_local_datetime(&local).latest())?;
    Some((start.timestamp(), end.timestamp()))
}

/// First and last second of the calendar month in `tz`.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidMonth`] for a month outside `1..=12` or
/// a date `chrono` cannot represent.
pub fn month_bounds<Tz: TimeZone>(
    tz: &Tz,
    year: i32,
    month: u32,
) -> Result<(i64, i64), ValidationError> {
    let invalid = || ValidationError::InvalidMonth { year, month };
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let last = last_day_of_month(first).ok_or_else(invalid)?;
    let (start, _) = day_bounds(tz, first).ok_or_else(invalid)?;
    let (_, end) = day_bounds(tz, last).ok_or_else(invalid)?;
    Ok((start, end))
}

fn last_day_of_month(first: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
}

/// The booking type sent with a booking.
///
/// A variant override wins only when it is the bundle type; every other
/// override falls back to the service's own type.
#[must_use]
pub fn resolve_booking_type(
    service_type: BookingTypeId,
    variant_override: Option<BookingTypeId>,
) -> BookingTypeId {
    match variant_override {
        Some(t) if t.is_bundle() => t,
        _ => service_type,
    }
}

/// Parameters for the available-days and available-slots endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityQuery {
    pub service_id: i64,
    pub variant_id: Option<i64>,
    pub staff_id: Option<i64>,
    pub from_time: i64,
    pub to_time: i64,
}

impl AvailabilityQuery {
    #[must_use]
    pub fn to_filter(&self) -> Filter {
        Filter::new()
            .with("serviceId", self.service_id)
            .with("variantId", self.variant_id)
            .with("staffId", self.staff_id)
            .with("fromTime", self.from_time)
            .with("toTime", self.to_time)
    }
}

/// Body of `POST api/booking/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub service_id: i64,
    pub variant_id: Option<i64>,
    pub staff_id: Option<i64>,
    pub quantity: u32,
    pub booking_type_id: BookingTypeId,
    pub customer_id: i64,
    #[serde(with = "crate::flag")]
    pub is_paid: bool,
    pub schedules: Vec<TimeSlot>,
}

/// A booking as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub service_id: i64,
    pub customer_id: i64,
    #[serde(default)]
    pub variant_id: Option<i64>,
    #[serde(default)]
    pub staff_id: Option<i64>,
    pub booking_type_id: BookingTypeId,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, with = "crate::flag")]
    pub is_paid: bool,
    #[serde(default)]
    pub schedules: Vec<TimeSlot>,
}
