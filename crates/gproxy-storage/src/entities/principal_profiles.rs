use sea_orm::entity::prelude::*;
use time::OffsetDateTime;

/// One row per principal (user). Balance is tracked in micro-dollars (1e-6 USD)
/// so the conditional-debit primitive can use integer arithmetic throughout.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "principal_profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub user_id: i64,
    pub balance_micros: i64,
    pub plan_id: Option<i64>,
    pub trial_state: String,
    pub trial_deadline: Option<OffsetDateTime>,
    pub trial_token_cap: Option<i64>,
    pub trial_tokens_used: i64,
    pub has_made_first_purchase: bool,
    pub updated_at: OffsetDateTime,
    #[sea_orm(belongs_to, from = "user_id", to = "id", on_delete = "Cascade")]
    pub user: HasOne<super::users::Entity>,
    #[sea_orm(belongs_to, from = "plan_id", to = "id", on_delete = "SetNull")]
    pub plan: HasOne<super::plans::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
