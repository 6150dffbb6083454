use sea_orm::entity::prelude::*;

/// Admission-relevant limits for a single credential (one row per `user_keys` row).
/// Kept separate from `user_keys` so the hot lookup path (hash -> key -> user)
/// stays on a narrow table; this one is only read once admission needs it.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "credential_limits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub user_key_id: i64,
    pub ip_allowlist_json: Option<Json>,
    pub referrer_allowlist_json: Option<Json>,
    pub expires_at: Option<time::OffsetDateTime>,
    pub max_requests: Option<i64>,
    pub requests_used: i64,
    pub is_primary: bool,
    pub rate_limits_json: Option<Json>,
    #[sea_orm(belongs_to, from = "user_key_id", to = "id", on_delete = "Cascade")]
    pub user_key: HasOne<super::user_keys::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
