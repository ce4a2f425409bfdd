use sea_orm::entity::prelude::*;

use super::models::ItemRequest;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub description: String,
    pub requestor_id: i64,
    pub created: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ItemRequest {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            description: model.description,
            requestor_id: model.requestor_id,
            created: model.created.into(),
        }
    }
}
