use chrono::{DateTime, Utc};
use sea_orm::sea_query::StringLen;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{ShareItError, ShareItResult};
use crate::items::Item;
use crate::users::User;
use crate::validation::in_future;

/// Message returned for a `state` value outside [`BookingState`].
pub const UNKNOWN_STATE_MESSAGE: &str = "Unknown state: UNSUPPORTED_STATUS";

/// Owner decision on a booking. `Waiting` moves to one of the others exactly once.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    #[default]
    #[sea_orm(string_value = "WAITING")]
    Waiting,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

/// Partition applied when listing a user's bookings.
///
/// `Current`, `Past` and `Future` split bookings by time; `Waiting`,
/// `Approved` and `Rejected` split them by status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, strum::EnumIter, ToSchema,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum BookingState {
    #[default]
    All,
    Current,
    Past,
    Future,
    Waiting,
    Approved,
    Rejected,
}

impl BookingState {
    /// Parses the `state` query value in any letter case; absent or empty means `All`.
    pub fn from_query(raw: Option<&str>) -> ShareItResult<Self> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::All),
            Some(value) => value
                .parse()
                .map_err(|_| ShareItError::Validation(UNKNOWN_STATE_MESSAGE.to_string())),
        }
    }

    pub fn matches(&self, booking: &Booking, now: DateTime<Utc>) -> bool {
        match self {
            Self::All => true,
            Self::Current => booking.start <= now && now < booking.end,
            Self::Past => booking.end <= now,
            Self::Future => booking.start > now,
            Self::Waiting => booking.status == BookingStatus::Waiting,
            Self::Approved => booking.status == BookingStatus::Approved,
            Self::Rejected => booking.status == BookingStatus::Rejected,
        }
    }
}

/// A reservation of an item by a user other than its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub item_id: i64,
    pub booker_id: i64,
    pub status: BookingStatus,
}

/// Row to insert; status always starts as `Waiting`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub item_id: i64,
    pub booker_id: i64,
}

/// DTO for booking an item
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBooking {
    #[validate(range(min = 1, message = "must be a positive id"))]
    pub item_id: i64,

    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    #[validate(custom(function = "in_future"))]
    #[schema(example = "2100-01-01T00:00:00")]
    pub start: DateTime<Utc>,

    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    #[validate(custom(function = "in_future"))]
    #[schema(example = "2100-01-02T00:00:00")]
    pub end: DateTime<Utc>,
}

/// Booking with its booker and item expanded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookingResponse {
    pub id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatus,
    pub booker: User,
    pub item: Item,
}

impl BookingResponse {
    pub fn new(booking: Booking, booker: User, item: Item) -> Self {
        Self {
            id: booking.id,
            start: booking.start,
            end: booking.end,
            status: booking.status,
            booker,
            item,
        }
    }
}

/// Compact booking shown on an item to its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingShort {
    pub id: i64,
    pub booker_id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl From<Booking> for BookingShort {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            booker_id: booking.booker_id,
            start: booking.start,
            end: booking.end,
        }
    }
}

/// Selection for a booking listing.
///
/// `booker_id` and `item_ids` narrow independently; the owner view passes
/// the ids of the owner's items.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingFilter {
    pub booker_id: Option<i64>,
    pub item_ids: Option<Vec<i64>>,
    pub state: BookingState,
    pub now: DateTime<Utc>,
    pub offset: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StateParams {
    /// ALL, CURRENT, PAST, FUTURE, WAITING, APPROVED or REJECTED, any case
    #[param(default = "ALL")]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ApprovalParams {
    /// true approves, false rejects
    pub approved: bool,
}
