use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use super::models::{
    Booking, BookingFilter, BookingResponse, BookingState, BookingStatus, CreateBooking,
    NewBooking,
};
use super::repository::BookingRepository;
use crate::access;
use crate::error::{ShareItError, ShareItResult};
use crate::items::{Item, ItemRepository};
use crate::pagination::PageParams;
use crate::users::{User, UserRepository};

/// Service layer for the booking ledger
#[derive(Clone)]
pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    items: Arc<dyn ItemRepository>,
    users: Arc<dyn UserRepository>,
}

impl BookingService {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        items: Arc<dyn ItemRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            bookings,
            items,
            users,
        }
    }

    async fn user(&self, id: i64) -> ShareItResult<User> {
        self.users
            .get_by_id(id)
            .await?
            .ok_or_else(|| ShareItError::user_not_found(id))
    }

    async fn item(&self, id: i64) -> ShareItResult<Item> {
        self.items
            .get_by_id(id)
            .await?
            .ok_or_else(|| ShareItError::item_not_found(id))
    }

    async fn booking(&self, id: i64) -> ShareItResult<Booking> {
        self.bookings
            .get_by_id(id)
            .await?
            .ok_or_else(|| ShareItError::booking_not_found(id))
    }

    /// Book an item for `[start, end)`.
    ///
    /// Overlapping bookings of the same item are accepted; the owner
    /// resolves them by approving or rejecting.
    #[instrument(skip(self, input), fields(item_id = input.item_id))]
    pub async fn create_booking(
        &self,
        booker_id: i64,
        input: CreateBooking,
    ) -> ShareItResult<BookingResponse> {
        input.validate()?;

        let booker = self.user(booker_id).await?;
        let item = self.item(input.item_id).await?;
        access::ensure_not_item_owner(&item, booker_id)?;

        if !item.available {
            return Err(ShareItError::Validation(format!(
                "Item {} is not available for booking",
                item.id
            )));
        }

        if input.end <= input.start {
            return Err(ShareItError::Validation(
                "Booking end must be after its start".to_string(),
            ));
        }

        let booking = self
            .bookings
            .create(NewBooking {
                start: input.start,
                end: input.end,
                item_id: item.id,
                booker_id,
            })
            .await?;

        Ok(BookingResponse::new(booking, booker, item))
    }

    /// Owner approves or rejects a waiting booking
    #[instrument(skip(self))]
    pub async fn respond(
        &self,
        owner_id: i64,
        booking_id: i64,
        approved: bool,
    ) -> ShareItResult<BookingResponse> {
        let booking = self.booking(booking_id).await?;
        let item = self.item(booking.item_id).await?;
        access::ensure_booking_item_owner(&booking, &item, owner_id)?;

        let already_decided = |status: BookingStatus| {
            ShareItError::Validation(format!(
                "Booking {} has already been {}",
                booking_id,
                status.to_string().to_lowercase()
            ))
        };

        if booking.status != BookingStatus::Waiting {
            return Err(already_decided(booking.status));
        }

        let status = if approved {
            BookingStatus::Approved
        } else {
            BookingStatus::Rejected
        };

        // A concurrent decision may have landed since the read above
        let decided = match self.bookings.decide(booking_id, status).await? {
            Some(decided) => decided,
            None => {
                let current = self.booking(booking_id).await?;
                return Err(already_decided(current.status));
            }
        };

        let booker = self.user(decided.booker_id).await?;
        Ok(BookingResponse::new(decided, booker, item))
    }

    /// A booking as seen by its booker or the item owner
    #[instrument(skip(self))]
    pub async fn get_booking(&self, user_id: i64, booking_id: i64) -> ShareItResult<BookingResponse> {
        let booking = self.booking(booking_id).await?;
        let item = self.item(booking.item_id).await?;
        access::ensure_booking_party(&booking, &item, user_id)?;

        let booker = self.user(booking.booker_id).await?;
        Ok(BookingResponse::new(booking, booker, item))
    }

    /// Bookings the user made
    #[instrument(skip(self))]
    pub async fn list_for_booker(
        &self,
        booker_id: i64,
        state: BookingState,
        page: PageParams,
    ) -> ShareItResult<Vec<BookingResponse>> {
        self.user(booker_id).await?;

        let bookings = self
            .bookings
            .list(BookingFilter {
                booker_id: Some(booker_id),
                item_ids: None,
                state,
                now: Utc::now(),
                offset: page.offset(),
                limit: page.limit(),
            })
            .await?;

        self.expand(bookings).await
    }

    /// Bookings of the user's items
    #[instrument(skip(self))]
    pub async fn list_for_owner(
        &self,
        owner_id: i64,
        state: BookingState,
        page: PageParams,
    ) -> ShareItResult<Vec<BookingResponse>> {
        self.user(owner_id).await?;

        let item_ids = self.items.ids_by_owner(owner_id).await?;
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }

        let bookings = self
            .bookings
            .list(BookingFilter {
                booker_id: None,
                item_ids: Some(item_ids),
                state,
                now: Utc::now(),
                offset: page.offset(),
                limit: page.limit(),
            })
            .await?;

        self.expand(bookings).await
    }

    async fn expand(&self, bookings: Vec<Booking>) -> ShareItResult<Vec<BookingResponse>> {
        let mut users: HashMap<i64, User> = HashMap::new();
        let mut items: HashMap<i64, Item> = HashMap::new();
        let mut responses = Vec::with_capacity(bookings.len());

        for booking in bookings {
            let booker = match users.get(&booking.booker_id) {
                Some(user) => user.clone(),
                None => {
                    let user = self.user(booking.booker_id).await?;
                    users.insert(user.id, user.clone());
                    user
                }
            };
            let item = match items.get(&booking.item_id) {
                Some(item) => item.clone(),
                None => {
                    let item = self.item(booking.item_id).await?;
                    items.insert(item.id, item.clone());
                    item
                }
            };
            responses.push(BookingResponse::new(booking, booker, item));
        }

        Ok(responses)
    }
}
