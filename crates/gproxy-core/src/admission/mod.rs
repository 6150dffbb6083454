//! Reject requests that must not reach any provider (§4.2).
//!
//! Each step of [`admit`] short-circuits with a typed [`AdmissionError`]; the
//! mapping from these to wire status lives in `gproxy-router`, which already
//! owns response-shape concerns for every dialect.

mod rate_limiter;

use std::sync::Arc;

use gproxy_storage::{PrincipalProfileRow, Storage};
use time::OffsetDateTime;

use crate::state::AppState;

pub use rate_limiter::{RateLimitConfig, RateLimitWindow, RateLimiter};

#[derive(Debug, Clone)]
pub enum AdmissionError {
    Unauthenticated,
    Forbidden { reason: &'static str },
    TrialExhausted,
    PlanLimitExceeded,
    RateLimited { retry_after_secs: u64 },
    InsufficientCredits,
}

impl AdmissionError {
    pub fn kind(&self) -> &'static str {
        match self {
            AdmissionError::Unauthenticated => "unauthenticated",
            AdmissionError::Forbidden { .. } => "forbidden",
            AdmissionError::TrialExhausted => "trial_exhausted",
            AdmissionError::PlanLimitExceeded => "plan_limit_exceeded",
            AdmissionError::RateLimited { .. } => "rate_limited",
            AdmissionError::InsufficientCredits => "insufficient_credits",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdmissionToken {
    pub user_id: i64,
    pub user_key_id: i64,
    pub request_id: String,
}

/// Balance floor, in micro-dollars, used when the requested model/provider
/// could not be resolved from the request body (e.g. a GET with no JSON
/// body, or a model id the Catalog has no price for). No minimum applies in
/// that case.
pub const DEFAULT_MIN_BALANCE_MICROS: i64 = 0;

/// Token count assumed for "enough for one max-token request at the model's
/// output price" (§4.2 step 7) when a per-model floor can't be read from
/// the request itself (no `max_tokens`-equivalent field is generic across
/// dialects at this layer).
pub const DEFAULT_MIN_BALANCE_FLOOR_TOKENS: i64 = 256;

/// Runs the admission pipeline for an already-resolved `(user_id, user_key_id)`
/// pair (credential lookup/hash-matching happens in the router's auth
/// middleware, which already owns bearer-token extraction). `provider_model`
/// is a best-effort `(provider, model_id)` hint peeked from the request body
/// before routing, used only to read the Catalog's output price for the
/// minimum-balance check (step 7); admission proceeds with no price floor
/// when it's `None`.
pub async fn admit(
    state: &Arc<AppState>,
    storage: &Arc<dyn Storage>,
    rate_limiter: &RateLimiter,
    user_id: i64,
    user_key_id: i64,
    request_id: String,
    provider_model: Option<(&str, &str)>,
) -> Result<AdmissionToken, AdmissionError> {
    // Step 2: credential validity (from the in-memory snapshot; no DB hit).
    let snapshot = state.snapshot.load();
    let key_row = snapshot
        .user_keys
        .iter()
        .find(|k| k.id == user_key_id)
        .cloned();
    let Some(key_row) = key_row else {
        return Err(AdmissionError::Unauthenticated);
    };
    if !key_row.enabled {
        return Err(AdmissionError::Forbidden {
            reason: "credential_disabled",
        });
    }

    let limits = storage
        .load_credential_limits(user_key_id)
        .await
        .ok()
        .flatten();
    if let Some(limits) = &limits {
        if let Some(expires_at) = limits.expires_at
            && OffsetDateTime::now_utc() >= expires_at
        {
            return Err(AdmissionError::Forbidden {
                reason: "credential_expired",
            });
        }
        if let Some(max_requests) = limits.max_requests
            && limits.requests_used >= max_requests
        {
            return Err(AdmissionError::Forbidden {
                reason: "max_requests_exceeded",
            });
        }
    }

    // Step 3: principal load.
    let user_row = snapshot.users.iter().find(|u| u.id == user_id).cloned();
    let Some(user_row) = user_row else {
        return Err(AdmissionError::Forbidden {
            reason: "principal_not_found",
        });
    };
    if !user_row.enabled {
        return Err(AdmissionError::Forbidden {
            reason: "principal_disabled",
        });
    }
    drop(snapshot);

    let profile = storage
        .ensure_principal_profile(user_id)
        .await
        .map_err(|_| AdmissionError::Forbidden {
            reason: "principal_profile_unavailable",
        })?;

    // Step 4: trial validity.
    check_trial(&profile)?;

    // Step 5: plan caps.
    if let Some(plan_id) = profile.plan_id
        && let Ok(Some(plan)) = storage.load_plan(plan_id).await
    {
        // Monthly request/token caps are enforced against the rate limiter's
        // day-resolution window as a rolling approximation; a calendar-month
        // rolling counter is out of scope for the in-process limiter.
        if let Some(cap) = plan.monthly_request_cap {
            let used = rate_limiter.requests_in_window(user_key_id, RateLimitWindow::Day).await;
            if used as i64 >= cap {
                return Err(AdmissionError::PlanLimitExceeded);
            }
        }
    }

    // Step 6: rate limits.
    let rate_cfg = limits
        .as_ref()
        .and_then(|l| l.rate_limits.clone())
        .and_then(|json| serde_json::from_value::<RateLimitConfig>(json).ok())
        .unwrap_or_default();
    rate_limiter
        .check_and_record_request(user_key_id, &rate_cfg)
        .await
        .map_err(|retry_after_secs| AdmissionError::RateLimited { retry_after_secs })?;

    // Step 7: minimum balance, floored at the resolved model's output price
    // times an assumed max-token response where a price is known.
    let min_balance = match (provider_model, state.catalog()) {
        (Some((provider, model)), Some(catalog)) => {
            let (_, completion_price_micros) = catalog.price(model, provider);
            completion_price_micros.saturating_mul(DEFAULT_MIN_BALANCE_FLOOR_TOKENS)
        }
        _ => DEFAULT_MIN_BALANCE_MICROS,
    };
    if profile.balance_micros < min_balance {
        return Err(AdmissionError::InsufficientCredits);
    }

    let _ = storage.record_credential_request_used(user_key_id).await;

    Ok(AdmissionToken {
        user_id,
        user_key_id,
        request_id,
    })
}

fn check_trial(profile: &PrincipalProfileRow) -> Result<(), AdmissionError> {
    if profile.trial_state != "active" {
        return Ok(());
    }
    if let Some(deadline) = profile.trial_deadline
        && OffsetDateTime::now_utc() >= deadline
    {
        return Err(AdmissionError::TrialExhausted);
    }
    if let Some(cap) = profile.trial_token_cap
        && profile.trial_tokens_used >= cap
    {
        return Err(AdmissionError::TrialExhausted);
    }
    Ok(())
}
