use sea_orm::entity::prelude::*;
use time::OffsetDateTime;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "chat_messages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub session_id: i64,
    pub role: String,
    pub content_json: Json,
    pub token_count: Option<i64>,
    /// The gateway request id that produced this turn; used to make
    /// `append_messages` idempotent under retry/replay.
    pub request_id: Option<String>,
    pub created_at: OffsetDateTime,
    #[sea_orm(belongs_to, from = "session_id", to = "id", on_delete = "Cascade")]
    pub session: HasOne<super::chat_sessions::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
