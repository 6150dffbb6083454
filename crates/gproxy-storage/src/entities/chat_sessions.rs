use sea_orm::entity::prelude::*;
use time::OffsetDateTime;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "chat_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique_key = "chat_session_public_id")]
    pub public_id: String,
    pub owner_user_id: i64,
    pub title: Option<String>,
    pub model: Option<String>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    #[sea_orm(belongs_to, from = "owner_user_id", to = "id", on_delete = "Cascade")]
    pub owner: HasOne<super::users::Entity>,
    #[sea_orm(has_many)]
    pub messages: HasMany<super::chat_messages::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
