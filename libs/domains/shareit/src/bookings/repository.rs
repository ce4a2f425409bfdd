use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use super::models::{Booking, BookingFilter, BookingStatus, NewBooking};
use crate::error::ShareItResult;

/// Repository trait for Booking persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Stores a new booking in `Waiting` status
    async fn create(&self, input: NewBooking) -> ShareItResult<Booking>;

    async fn get_by_id(&self, id: i64) -> ShareItResult<Option<Booking>>;

    /// Moves a `Waiting` booking to `status`.
    ///
    /// Returns `None` when the booking is missing or already decided.
    async fn decide(&self, id: i64, status: BookingStatus) -> ShareItResult<Option<Booking>>;

    /// Bookings matching the filter, newest start first
    async fn list(&self, filter: BookingFilter) -> ShareItResult<Vec<Booking>>;

    /// Latest booking of the item that started at or before `now`
    async fn last_started(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> ShareItResult<Option<Booking>>;

    /// Earliest booking of the item starting after `now`
    async fn next_starting(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> ShareItResult<Option<Booking>>;

    /// Whether the user holds an approved booking of the item that ended before `now`
    async fn has_finished_approved(
        &self,
        booker_id: i64,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> ShareItResult<bool>;

    /// Removes the bookings of the given items, returning how many were removed
    async fn delete_by_items(&self, item_ids: Vec<i64>) -> ShareItResult<u64>;

    /// Removes the bookings the user made
    async fn delete_by_booker(&self, booker_id: i64) -> ShareItResult<u64>;
}

fn newest_start_first(a: &Booking, b: &Booking) -> std::cmp::Ordering {
    b.start.cmp(&a.start).then(b.id.cmp(&a.id))
}

/// In-memory implementation of BookingRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryBookingRepository {
    bookings: Arc<RwLock<BTreeMap<i64, Booking>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn create(&self, input: NewBooking) -> ShareItResult<Booking> {
        let mut bookings = self.bookings.write().await;

        let booking = Booking {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            start: input.start,
            end: input.end,
            item_id: input.item_id,
            booker_id: input.booker_id,
            status: BookingStatus::Waiting,
        };
        bookings.insert(booking.id, booking.clone());

        tracing::info!(
            booking_id = booking.id,
            item_id = booking.item_id,
            booker_id = booking.booker_id,
            "Created booking"
        );
        Ok(booking)
    }

    async fn get_by_id(&self, id: i64) -> ShareItResult<Option<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings.get(&id).cloned())
    }

    async fn decide(&self, id: i64, status: BookingStatus) -> ShareItResult<Option<Booking>> {
        let mut bookings = self.bookings.write().await;

        match bookings.get_mut(&id) {
            Some(booking) if booking.status == BookingStatus::Waiting => {
                booking.status = status;
                tracing::info!(booking_id = id, %status, "Booking decided");
                Ok(Some(booking.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list(&self, filter: BookingFilter) -> ShareItResult<Vec<Booking>> {
        let bookings = self.bookings.read().await;

        let mut result: Vec<Booking> = bookings
            .values()
            .filter(|b| filter.booker_id.is_none_or(|id| b.booker_id == id))
            .filter(|b| {
                filter
                    .item_ids
                    .as_ref()
                    .is_none_or(|ids| ids.contains(&b.item_id))
            })
            .filter(|b| filter.state.matches(b, filter.now))
            .cloned()
            .collect();

        result.sort_by(newest_start_first);

        Ok(result
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn last_started(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> ShareItResult<Option<Booking>> {
        let bookings = self.bookings.read().await;

        Ok(bookings
            .values()
            .filter(|b| b.item_id == item_id && b.start <= now)
            .min_by(|a, b| newest_start_first(a, b))
            .cloned())
    }

    async fn next_starting(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> ShareItResult<Option<Booking>> {
        let bookings = self.bookings.read().await;

        Ok(bookings
            .values()
            .filter(|b| b.item_id == item_id && b.start > now)
            .min_by(|a, b| a.start.cmp(&b.start).then(a.id.cmp(&b.id)))
            .cloned())
    }

    async fn has_finished_approved(
        &self,
        booker_id: i64,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> ShareItResult<bool> {
        let bookings = self.bookings.read().await;

        Ok(bookings.values().any(|b| {
            b.booker_id == booker_id
                && b.item_id == item_id
                && b.status == BookingStatus::Approved
                && b.end < now
        }))
    }

    async fn delete_by_items(&self, item_ids: Vec<i64>) -> ShareItResult<u64> {
        let mut bookings = self.bookings.write().await;

        let before = bookings.len();
        bookings.retain(|_, b| !item_ids.contains(&b.item_id));
        Ok((before - bookings.len()) as u64)
    }

    async fn delete_by_booker(&self, booker_id: i64) -> ShareItResult<u64> {
        let mut bookings = self.bookings.write().await;

        let before = bookings.len();
        bookings.retain(|_, b| b.booker_id != booker_id);
        Ok((before - bookings.len()) as u64)
    }
}
