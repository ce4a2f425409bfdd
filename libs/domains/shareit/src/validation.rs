//! Field validators shared by the request DTOs.

use chrono::{DateTime, Utc};
use std::borrow::Cow;
use validator::ValidationError;

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("must not be blank")));
    }
    Ok(())
}

/// Rejects timestamps at or before the current instant.
pub fn in_future(value: &DateTime<Utc>) -> Result<(), ValidationError> {
    if *value <= Utc::now() {
        return Err(ValidationError::new("future")
            .with_message(Cow::Borrowed("must be in the future")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_not_blank() {
        assert!(not_blank("Drill").is_ok());
        assert!(not_blank("").is_err());
        assert!(not_blank(" \t ").is_err());
    }

    #[test]
    fn test_in_future() {
        assert!(in_future(&(Utc::now() + Duration::hours(1))).is_ok());
        let err = in_future(&(Utc::now() - Duration::seconds(1))).unwrap_err();
        assert_eq!(err.code, "future");
    }
}
