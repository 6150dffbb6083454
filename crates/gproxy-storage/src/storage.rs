use async_trait::async_trait;
use time::OffsetDateTime;

use gproxy_common::GlobalConfig;
use gproxy_provider_core::Event;

use crate::snapshot::{
    ChatMessageRow, ChatSessionRow, ConditionalDebitOutcome, CredentialLimitsRow,
    CreditTransactionRow, GlobalConfigRow, PlanRow, PrincipalProfileRow, StorageSnapshot,
};

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("db error: {0}")]
    Db(#[from] sea_orm::DbErr),
    #[error("serde json error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct UsageAggregateFilter {
    pub from: OffsetDateTime,
    pub to: OffsetDateTime,
    pub provider: Option<String>,
    pub credential_id: Option<i64>,
    pub model: Option<String>,
    pub model_contains: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UsageAggregate {
    pub matched_rows: i64,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub cache_read_input_tokens: i64,
    pub cache_creation_input_tokens: i64,
    pub total_tokens: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRecordKind {
    Upstream,
    Downstream,
}

/// A ledger entry to append. `amount_micros` is signed (negative for `usage`).
#[derive(Debug, Clone)]
pub struct NewCreditTransaction {
    pub user_id: i64,
    pub amount_micros: i64,
    pub kind: CreditTransactionKind,
    pub reference: Option<String>,
    pub request_id: Option<String>,
    pub post_debt: bool,
    pub metadata_json: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditTransactionKind {
    Usage,
    Purchase,
    Refund,
    Bonus,
    Promo,
}

impl CreditTransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CreditTransactionKind::Usage => "usage",
            CreditTransactionKind::Purchase => "purchase",
            CreditTransactionKind::Refund => "refund",
            CreditTransactionKind::Bonus => "bonus",
            CreditTransactionKind::Promo => "promo",
        }
    }
}

/// The structured record appended to the activity sink by Metering (§4.7).
#[derive(Debug, Clone)]
pub struct ActivityRecord {
    pub request_id: Option<String>,
    pub principal_id: i64,
    pub provider: String,
    pub model: Option<String>,
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub reasoning_tokens: i64,
    pub cost_micros: i64,
    pub latency_first_ms: Option<i64>,
    pub latency_total_ms: Option<i64>,
    pub outcome: String,
}

#[derive(Debug, Clone)]
pub struct NewChatMessage {
    pub role: String,
    pub content_json: serde_json::Value,
    pub token_count: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct LogQueryFilter {
    pub from: OffsetDateTime,
    pub to: OffsetDateTime,
    pub kind: Option<LogRecordKind>,
    pub provider: Option<String>,
    pub credential_id: Option<i64>,
    pub user_id: Option<i64>,
    pub user_key_id: Option<i64>,
    pub trace_id: Option<String>,
    pub operation: Option<String>,
    pub request_path_contains: Option<String>,
    pub status_min: Option<i32>,
    pub status_max: Option<i32>,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Clone)]
pub struct LogRecord {
    pub id: i64,
    pub kind: LogRecordKind,
    pub at: OffsetDateTime,
    pub trace_id: Option<String>,
    pub provider: Option<String>,
    pub credential_id: Option<i64>,
    pub user_id: Option<i64>,
    pub user_key_id: Option<i64>,
    pub attempt_no: Option<i32>,
    pub operation: Option<String>,
    pub request_method: String,
    pub request_path: String,
    pub response_status: Option<i32>,
    pub error_kind: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LogQueryResult {
    pub rows: Vec<LogRecord>,
    pub has_more: bool,
    pub next_cursor: Option<LogCursor>,
}

#[derive(Debug, Clone, Copy)]
pub struct LogCursor {
    pub at: OffsetDateTime,
    pub id: i64,
}

/// Storage is used for:
/// - bootstrap (load_snapshot)
/// - admin mutations (writes only)
/// - event persistence (append_event)
///
/// Runtime reads must NOT hit DB; they read from in-memory snapshots.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Entity-first schema sync (SeaORM 2.0). Enabled by default at bootstrap.
    async fn sync(&self) -> StorageResult<()>;

    async fn load_global_config(&self) -> StorageResult<Option<GlobalConfigRow>>;
    async fn upsert_global_config(&self, config: &GlobalConfig) -> StorageResult<()>;

    async fn load_snapshot(&self) -> StorageResult<StorageSnapshot>;

    // Providers
    async fn upsert_provider(
        &self,
        name: &str,
        config_json: &serde_json::Value,
        enabled: bool,
    ) -> StorageResult<i64>;
    async fn delete_provider(&self, name: &str) -> StorageResult<()>;

    // Credentials
    async fn insert_credential(
        &self,
        provider_name: &str,
        name: Option<&str>,
        settings_json: &serde_json::Value,
        secret_json: &serde_json::Value,
        enabled: bool,
    ) -> StorageResult<i64>;
    async fn update_credential(
        &self,
        credential_id: i64,
        name: Option<&str>,
        settings_json: &serde_json::Value,
        secret_json: &serde_json::Value,
    ) -> StorageResult<()>;
    async fn set_credential_enabled(&self, credential_id: i64, enabled: bool) -> StorageResult<()>;
    async fn delete_credential(&self, credential_id: i64) -> StorageResult<()>;

    // Users / keys (auth)
    async fn upsert_user_by_id(&self, user_id: i64, name: &str, enabled: bool)
    -> StorageResult<()>;
    async fn set_user_enabled(&self, user_id: i64, enabled: bool) -> StorageResult<()>;
    async fn delete_user(&self, user_id: i64) -> StorageResult<()>;
    async fn insert_user_key(
        &self,
        user_id: i64,
        api_key: &str,
        label: Option<&str>,
        enabled: bool,
    ) -> StorageResult<i64>;
    async fn set_user_key_enabled(&self, user_key_id: i64, enabled: bool) -> StorageResult<()>;
    async fn update_user_key_label(
        &self,
        user_key_id: i64,
        label: Option<&str>,
    ) -> StorageResult<()>;
    async fn delete_user_key(&self, user_key_id: i64) -> StorageResult<()>;

    async fn append_event(&self, event: &Event) -> StorageResult<()>;

    async fn aggregate_usage_tokens(
        &self,
        filter: UsageAggregateFilter,
    ) -> StorageResult<UsageAggregate>;

    async fn query_logs(&self, filter: LogQueryFilter) -> StorageResult<LogQueryResult>;

    // --- Admission (§4.2) ---

    /// Creates a default (zero-balance, no-trial) profile the first time a
    /// principal is seen if one does not already exist, then returns it.
    async fn ensure_principal_profile(&self, user_id: i64) -> StorageResult<PrincipalProfileRow>;
    async fn load_plan(&self, plan_id: i64) -> StorageResult<Option<PlanRow>>;
    async fn load_credential_limits(
        &self,
        user_key_id: i64,
    ) -> StorageResult<Option<CredentialLimitsRow>>;
    async fn record_credential_request_used(&self, user_key_id: i64) -> StorageResult<()>;
    async fn record_trial_tokens_used(&self, user_id: i64, tokens: i64) -> StorageResult<()>;

    // --- Metering (§4.7) ---

    /// Conditional decrement: debits up to `amount_micros`, clamping at zero.
    /// The only legal mutator of `principal_profiles.balance_micros`.
    async fn conditional_debit(
        &self,
        user_id: i64,
        amount_micros: i64,
    ) -> StorageResult<ConditionalDebitOutcome>;
    async fn append_credit_transaction(&self, tx: NewCreditTransaction) -> StorageResult<i64>;
    async fn append_activity(&self, record: ActivityRecord) -> StorageResult<()>;

    // --- Session Appender (§4.8) ---

    /// Returns the session's internal row id, creating it if it does not
    /// exist yet. Ownership is checked: a session owned by another principal
    /// is treated as not found.
    async fn ensure_chat_session(
        &self,
        public_id: &str,
        owner_user_id: i64,
        model: Option<&str>,
    ) -> StorageResult<Option<i64>>;
    async fn chat_history(
        &self,
        public_id: &str,
        owner_user_id: i64,
        limit: usize,
    ) -> StorageResult<Vec<ChatMessageRow>>;
    /// Appends `messages` atomically, tagged with `request_id` for idempotency:
    /// replaying the same `(session, request_id)` pair is a no-op.
    async fn append_chat_messages(
        &self,
        public_id: &str,
        owner_user_id: i64,
        request_id: &str,
        messages: Vec<NewChatMessage>,
    ) -> StorageResult<()>;
}
