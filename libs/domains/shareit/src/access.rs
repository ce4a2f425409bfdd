//! Who may see or change what.
//!
//! Callers without access get the same `NotFound` a missing resource
//! would produce, so existence is never leaked.

use crate::bookings::Booking;
use crate::error::{ShareItError, ShareItResult};
use crate::items::Item;

pub fn ensure_item_owner(item: &Item, user_id: i64) -> ShareItResult<()> {
    if item.owner_id != user_id {
        return Err(ShareItError::item_not_found(item.id));
    }
    Ok(())
}

/// Owners cannot book their own items.
pub fn ensure_not_item_owner(item: &Item, user_id: i64) -> ShareItResult<()> {
    if item.owner_id == user_id {
        return Err(ShareItError::NotFound(format!(
            "Item {} cannot be booked by its owner",
            item.id
        )));
    }
    Ok(())
}

/// Booker or owner of the booked item.
pub fn ensure_booking_party(booking: &Booking, item: &Item, user_id: i64) -> ShareItResult<()> {
    if booking.booker_id != user_id && item.owner_id != user_id {
        return Err(ShareItError::booking_not_found(booking.id));
    }
    Ok(())
}

pub fn ensure_booking_item_owner(booking: &Booking, item: &Item, user_id: i64) -> ShareItResult<()> {
    if item.owner_id != user_id {
        return Err(ShareItError::booking_not_found(booking.id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookings::BookingStatus;
    use chrono::{Duration, Utc};

    const OWNER: i64 = 1;
    const BOOKER: i64 = 2;
    const STRANGER: i64 = 3;

    fn item() -> Item {
        Item {
            id: 10,
            name: "Drill".into(),
            description: "Cordless".into(),
            available: true,
            owner_id: OWNER,
            request_id: None,
        }
    }

    fn booking() -> Booking {
        Booking {
            id: 20,
            start: Utc::now() + Duration::days(1),
            end: Utc::now() + Duration::days(2),
            item_id: 10,
            booker_id: BOOKER,
            status: BookingStatus::Waiting,
        }
    }

    #[test]
    fn test_item_owner() {
        assert!(ensure_item_owner(&item(), OWNER).is_ok());
        let err = ensure_item_owner(&item(), STRANGER).unwrap_err();
        assert_eq!(err.to_string(), "Item 10 not found");
    }

    #[test]
    fn test_owner_cannot_book() {
        assert!(ensure_not_item_owner(&item(), BOOKER).is_ok());
        assert!(matches!(
            ensure_not_item_owner(&item(), OWNER),
            Err(ShareItError::NotFound(_))
        ));
    }

    #[test]
    fn test_booking_visible_to_parties_only() {
        assert!(ensure_booking_party(&booking(), &item(), OWNER).is_ok());
        assert!(ensure_booking_party(&booking(), &item(), BOOKER).is_ok());
        let err = ensure_booking_party(&booking(), &item(), STRANGER).unwrap_err();
        assert_eq!(err.to_string(), "Booking 20 not found");
    }

    #[test]
    fn test_only_owner_decides() {
        assert!(ensure_booking_item_owner(&booking(), &item(), OWNER).is_ok());
        assert!(ensure_booking_item_owner(&booking(), &item(), BOOKER).is_err());
        assert!(ensure_booking_item_owner(&booking(), &item(), STRANGER).is_err());
    }
}
