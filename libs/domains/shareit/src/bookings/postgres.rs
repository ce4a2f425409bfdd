use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

use super::entity::{self, Column};
use super::models::{Booking, BookingFilter, BookingState, BookingStatus, NewBooking};
use super::repository::BookingRepository;
use crate::error::ShareItResult;

pub struct PgBookingRepository {
    db: DatabaseConnection,
}

impl PgBookingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Relational form of [`BookingState::matches`].
pub fn state_condition(state: BookingState, now: DateTime<Utc>) -> Condition {
    let now: DateTimeWithTimeZone = now.into();

    match state {
        BookingState::All => Condition::all(),
        BookingState::Current => Condition::all()
            .add(Column::StartDate.lte(now))
            .add(Column::EndDate.gt(now)),
        BookingState::Past => Condition::all().add(Column::EndDate.lte(now)),
        BookingState::Future => Condition::all().add(Column::StartDate.gt(now)),
        BookingState::Waiting => {
            Condition::all().add(Column::Status.eq(BookingStatus::Waiting.to_string()))
        }
        BookingState::Approved => {
            Condition::all().add(Column::Status.eq(BookingStatus::Approved.to_string()))
        }
        BookingState::Rejected => {
            Condition::all().add(Column::Status.eq(BookingStatus::Rejected.to_string()))
        }
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn create(&self, input: NewBooking) -> ShareItResult<Booking> {
        let model = entity::ActiveModel {
            id: NotSet,
            start_date: Set(input.start.into()),
            end_date: Set(input.end.into()),
            item_id: Set(input.item_id),
            booker_id: Set(input.booker_id),
            status: Set(BookingStatus::Waiting),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(
            booking_id = model.id,
            item_id = model.item_id,
            booker_id = model.booker_id,
            "Created booking"
        );
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i64) -> ShareItResult<Option<Booking>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn decide(&self, id: i64, status: BookingStatus) -> ShareItResult<Option<Booking>> {
        // Conditional on WAITING so concurrent decisions cannot both win
        let result = entity::Entity::update_many()
            .set(entity::ActiveModel {
                status: Set(status),
                ..Default::default()
            })
            .filter(Column::Id.eq(id))
            .filter(Column::Status.eq(BookingStatus::Waiting.to_string()))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        tracing::info!(booking_id = id, %status, "Booking decided");
        self.get_by_id(id).await
    }

    async fn list(&self, filter: BookingFilter) -> ShareItResult<Vec<Booking>> {
        let mut query = entity::Entity::find().filter(state_condition(filter.state, filter.now));

        if let Some(booker_id) = filter.booker_id {
            query = query.filter(Column::BookerId.eq(booker_id));
        }

        if let Some(item_ids) = filter.item_ids {
            if item_ids.is_empty() {
                return Ok(Vec::new());
            }
            query = query.filter(Column::ItemId.is_in(item_ids));
        }

        let models = query
            .order_by_desc(Column::StartDate)
            .order_by_desc(Column::Id)
            .limit(filter.limit)
            .offset(filter.offset)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn last_started(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> ShareItResult<Option<Booking>> {
        let now: DateTimeWithTimeZone = now.into();
        let model = entity::Entity::find()
            .filter(Column::ItemId.eq(item_id))
            .filter(Column::StartDate.lte(now))
            .order_by_desc(Column::StartDate)
            .order_by_desc(Column::Id)
            .one(&self.db)
            .await?;

        Ok(model.map(Into::into))
    }

    async fn next_starting(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> ShareItResult<Option<Booking>> {
        let now: DateTimeWithTimeZone = now.into();
        let model = entity::Entity::find()
            .filter(Column::ItemId.eq(item_id))
            .filter(Column::StartDate.gt(now))
            .order_by_asc(Column::StartDate)
            .order_by_asc(Column::Id)
            .one(&self.db)
            .await?;

        Ok(model.map(Into::into))
    }

    async fn has_finished_approved(
        &self,
        booker_id: i64,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> ShareItResult<bool> {
        let now: DateTimeWithTimeZone = now.into();
        let count = entity::Entity::find()
            .filter(Column::BookerId.eq(booker_id))
            .filter(Column::ItemId.eq(item_id))
            .filter(Column::Status.eq(BookingStatus::Approved.to_string()))
            .filter(Column::EndDate.lt(now))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    async fn delete_by_items(&self, item_ids: Vec<i64>) -> ShareItResult<u64> {
        if item_ids.is_empty() {
            return Ok(0);
        }

        let result = entity::Entity::delete_many()
            .filter(Column::ItemId.is_in(item_ids))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn delete_by_booker(&self, booker_id: i64) -> ShareItResult<u64> {
        let result = entity::Entity::delete_many()
            .filter(Column::BookerId.eq(booker_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    fn sql(state: BookingState) -> String {
        entity::Entity::find()
            .filter(state_condition(state, Utc::now()))
            .build(DbBackend::Postgres)
            .to_string()
    }

    #[test]
    fn test_time_states_compare_dates() {
        let current = sql(BookingState::Current);
        assert!(current.contains(r#""start_date" <="#));
        assert!(current.contains(r#""end_date" >"#));
        assert!(sql(BookingState::Past).contains(r#""end_date" <="#));
        assert!(sql(BookingState::Future).contains(r#""start_date" >"#));
    }

    #[test]
    fn test_status_states_compare_status() {
        assert!(sql(BookingState::Waiting).contains("'WAITING'"));
        assert!(sql(BookingState::Approved).contains("'APPROVED'"));
        assert!(sql(BookingState::Rejected).contains("'REJECTED'"));
    }
}
