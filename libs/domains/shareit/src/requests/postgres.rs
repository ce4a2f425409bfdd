use async_trait::async_trait;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use super::entity::{self, Column};
use super::models::{ItemRequest, NewItemRequest};
use super::repository::ItemRequestRepository;
use crate::error::ShareItResult;
use crate::pagination::PageParams;

pub struct PgItemRequestRepository {
    db: DatabaseConnection,
}

impl PgItemRequestRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ItemRequestRepository for PgItemRequestRepository {
    async fn create(&self, input: NewItemRequest) -> ShareItResult<ItemRequest> {
        let model = entity::ActiveModel {
            id: NotSet,
            description: Set(input.description),
            requestor_id: Set(input.requestor_id),
            created: Set(input.created.into()),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(
            request_id = model.id,
            requestor_id = model.requestor_id,
            "Created item request"
        );
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i64) -> ShareItResult<Option<ItemRequest>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn list_by_requestor(&self, requestor_id: i64) -> ShareItResult<Vec<ItemRequest>> {
        let models = entity::Entity::find()
            .filter(Column::RequestorId.eq(requestor_id))
            .order_by_asc(Column::Created)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list_others(
        &self,
        requestor_id: i64,
        page: PageParams,
    ) -> ShareItResult<Vec<ItemRequest>> {
        let models = entity::Entity::find()
            .filter(Column::RequestorId.ne(requestor_id))
            .order_by_asc(Column::Created)
            .order_by_asc(Column::Id)
            .limit(page.limit())
            .offset(page.offset())
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn delete_by_requestor(&self, requestor_id: i64) -> ShareItResult<Vec<i64>> {
        let ids = entity::Entity::find()
            .select_only()
            .column(Column::Id)
            .filter(Column::RequestorId.eq(requestor_id))
            .into_tuple::<i64>()
            .all(&self.db)
            .await?;

        if !ids.is_empty() {
            entity::Entity::delete_many()
                .filter(Column::Id.is_in(ids.clone()))
                .exec(&self.db)
                .await?;
        }
        Ok(ids)
    }
}
