use sea_orm::entity::prelude::*;
use time::OffsetDateTime;

/// Append-only ledger entry. `amount_micros` is signed: negative for `usage`,
/// positive for `purchase`/`refund`/`bonus`/`promo`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "credit_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub amount_micros: i64,
    pub kind: String,
    pub reference: Option<String>,
    pub request_id: Option<String>,
    pub post_debt: bool,
    pub metadata_json: Option<Json>,
    pub created_at: OffsetDateTime,
    #[sea_orm(belongs_to, from = "user_id", to = "id", on_delete = "Cascade")]
    pub user: HasOne<super::users::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
