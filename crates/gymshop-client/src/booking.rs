//! Booking availability and creation.

use gymshop_core::{AvailabilityQuery, Booking, BookingRequest, Envelope, TimeSlot};
use reqwest::Method;

use crate::client::StorefrontClient;
use crate::error::ApiError;

const AVAILABLE_DAYS_PATH: &str = "api/booking/available-days";
const AVAILABLE_SLOTS_PATH: &str = "api/booking/available-slots";
const CREATE_BOOKING_PATH: &str = "api/booking/create";

impl StorefrontClient {
    /// Start-of-day Unix timestamps of days with open capacity in the window.
    ///
    /// # Errors
    ///
    /// [`ApiError`] on transport, status or decoding failure.
    pub async fn available_days(&self, query: &AvailabilityQuery) -> Result<Vec<i64>, ApiError> {
        let envelope: Envelope<Vec<i64>> = self
            .get_json(AVAILABLE_DAYS_PATH, &query.to_filter().to_query_pairs())
            .await?;
        Ok(envelope.body)
    }

    /// Concrete open windows inside the query range.
    ///
    /// # Errors
    ///
    /// [`ApiError`] on transport, status or decoding failure, including a
    /// slot whose start is not before its end.
    pub async fn available_slots(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<Vec<TimeSlot>, ApiError> {
        let envelope: Envelope<Vec<TimeSlot>> = self
            .get_json(AVAILABLE_SLOTS_PATH, &query.to_filter().to_query_pairs())
            .await?;
        Ok(envelope.body)
    }

    /// # Errors
    ///
    /// [`ApiError::Status`] when the API refuses the booking (e.g. the slot
    /// was taken in the meantime).
    pub async fn create_booking(&self, request: &BookingRequest) -> Result<Booking, ApiError> {
        let booking: Booking = self
            .send_body(Method::POST, CREATE_BOOKING_PATH, request)
            .await?;
        tracing::info!(
            booking_id = booking.id,
            service_id = request.service_id,
            booking_type = %request.booking_type_id,
            "booking created"
        );
        Ok(booking)
    }
}
