use gproxy_common::GlobalConfig;
use serde_json::Value as JsonValue;
use time::OffsetDateTime;

#[derive(Debug, Clone)]
pub struct GlobalConfigRow {
    pub id: i64,
    pub config: GlobalConfig,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct ProviderRow {
    pub id: i64,
    pub name: String,
    pub config_json: JsonValue,
    pub enabled: bool,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct CredentialRow {
    pub id: i64,
    pub provider_id: i64,
    pub name: Option<String>,
    pub settings_json: JsonValue,
    pub secret_json: JsonValue,
    pub enabled: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub enabled: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct UserKeyRow {
    pub id: i64,
    pub user_id: i64,
    /// Salted hash of the bearer token (see `gproxy_common::hash_secret`); the
    /// plaintext is never stored.
    pub api_key: String,
    pub label: Option<String>,
    pub enabled: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct PlanRow {
    pub id: i64,
    pub name: String,
    pub monthly_request_cap: Option<i64>,
    pub monthly_token_cap: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct PrincipalProfileRow {
    pub user_id: i64,
    pub balance_micros: i64,
    pub plan_id: Option<i64>,
    pub trial_state: String,
    pub trial_deadline: Option<OffsetDateTime>,
    pub trial_token_cap: Option<i64>,
    pub trial_tokens_used: i64,
    pub has_made_first_purchase: bool,
}

#[derive(Debug, Clone)]
pub struct CredentialLimitsRow {
    pub user_key_id: i64,
    pub ip_allowlist: Option<JsonValue>,
    pub referrer_allowlist: Option<JsonValue>,
    pub expires_at: Option<OffsetDateTime>,
    pub max_requests: Option<i64>,
    pub requests_used: i64,
    pub is_primary: bool,
    pub rate_limits: Option<JsonValue>,
}

#[derive(Debug, Clone)]
pub struct CreditTransactionRow {
    pub id: i64,
    pub user_id: i64,
    pub amount_micros: i64,
    pub kind: String,
    pub reference: Option<String>,
    pub request_id: Option<String>,
    pub post_debt: bool,
    pub metadata_json: Option<JsonValue>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct ChatSessionRow {
    pub id: i64,
    pub public_id: String,
    pub owner_user_id: i64,
    pub title: Option<String>,
    pub model: Option<String>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct ChatMessageRow {
    pub id: i64,
    pub session_id: i64,
    pub role: String,
    pub content_json: JsonValue,
    pub token_count: Option<i64>,
    pub request_id: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Outcome of the conditional-decrement primitive (§4.7): the balance is never
/// allowed to go negative. If the requested amount would cross zero, the
/// balance is clamped to 0 and `post_debt` records the shortfall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionalDebitOutcome {
    pub new_balance_micros: i64,
    pub post_debt: bool,
    pub shortfall_micros: i64,
}

#[derive(Debug, Clone)]
pub struct StorageSnapshot {
    pub global_config: Option<GlobalConfigRow>,
    pub providers: Vec<ProviderRow>,
    pub credentials: Vec<CredentialRow>,
    pub users: Vec<UserRow>,
    pub user_keys: Vec<UserKeyRow>,
    pub plans: Vec<PlanRow>,
    pub principal_profiles: Vec<PrincipalProfileRow>,
    pub credential_limits: Vec<CredentialLimitsRow>,
}
