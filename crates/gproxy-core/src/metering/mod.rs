//! Prices and debits completed upstream calls on a background task (§4.7).
//!
//! Wired in as an [`EventSink`] alongside `DbEventSink`: every `Event`
//! broadcast by the proxy engine reaches this sink too, and like
//! `DbEventSink` a metering failure must never surface to the client, so
//! every fallible step here is logged and swallowed.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use gproxy_provider_core::{Event, EventSink, UpstreamEvent};
use gproxy_storage::{
    ActivityRecord, CreditTransactionKind, NewCreditTransaction, Storage,
};

use crate::state::AppState;

pub struct MeteringEventSink<S: Storage> {
    storage: Arc<S>,
    state: Arc<AppState>,
}

impl<S: Storage> MeteringEventSink<S> {
    pub fn new(storage: Arc<S>, state: Arc<AppState>) -> Self {
        Self { storage, state }
    }

    async fn meter(&self, event: &UpstreamEvent) {
        // Internal calls (provider auth refresh, model-list probes, ...) are
        // never billed; only user-initiated generate calls carry usage.
        if event.internal {
            return;
        }
        // Every successful generate call must produce exactly one UsageRecord
        // + CreditTransaction (§3); when the adapter couldn't parse a
        // structured usage object out of the response, fall back to a
        // whitespace-token estimate off the raw bodies rather than silently
        // billing nothing.
        let is_generate = event.operation.contains("GenerateContent");
        let (prompt_tokens, completion_tokens, reasoning_tokens, estimated) = match &event.usage {
            Some(usage) => (
                i64::from(usage.input_tokens.unwrap_or(0)),
                i64::from(usage.output_tokens.unwrap_or(0)),
                // UsageSummary carries no separate reasoning-token field
                // today; the provider layer folds reasoning tokens into
                // `output_tokens`.
                0,
                false,
            ),
            None if is_generate => {
                let prompt = event
                    .request_body
                    .as_deref()
                    .map(estimate_tokens)
                    .unwrap_or(0);
                let completion = event
                    .response_body
                    .as_deref()
                    .map(estimate_tokens)
                    .unwrap_or(0);
                (prompt, completion, 0, true)
            }
            None => return,
        };
        let Some(user_id) = event.user_id else { return };

        let model = extract_model(event);

        let (prompt_price, completion_price) = match (&model, self.state.catalog()) {
            (Some(model), Some(catalog)) => catalog.price(model, &event.provider),
            _ => (0, 0),
        };

        let cost_micros = prompt_tokens
            .saturating_mul(prompt_price)
            .saturating_add((completion_tokens + reasoning_tokens).saturating_mul(completion_price));

        let outcome = match self.storage.conditional_debit(user_id, cost_micros).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(error = %err, user_id, "conditional debit failed");
                return;
            }
        };

        let request_id = event.trace_id.clone();
        let tx = NewCreditTransaction {
            user_id,
            amount_micros: -(cost_micros - outcome.shortfall_micros),
            kind: CreditTransactionKind::Usage,
            reference: Some(event.provider.clone()),
            request_id: request_id.clone(),
            post_debt: outcome.post_debt,
            metadata_json: Some(serde_json::json!({
                "model": model,
                "estimated_usage": estimated,
            })),
        };
        if let Err(err) = self.storage.append_credit_transaction(tx).await {
            tracing::warn!(error = %err, user_id, "append credit transaction failed");
        }

        if completion_tokens > 0 {
            let _ = self
                .storage
                .record_trial_tokens_used(user_id, prompt_tokens + completion_tokens)
                .await;
        }

        // Token-window rate limits (§4.2 step 6) can only be checked
        // post-hoc: counts aren't known until the upstream response lands.
        if let Some(user_key_id) = event.user_key_id {
            let total_tokens = (prompt_tokens + completion_tokens + reasoning_tokens).max(0) as u64;
            self.state
                .rate_limiter
                .record_tokens(user_key_id, total_tokens)
                .await;
        }

        let record = ActivityRecord {
            request_id,
            principal_id: user_id,
            provider: event.provider.clone(),
            model,
            prompt_tokens,
            completion_tokens,
            reasoning_tokens,
            cost_micros: cost_micros - outcome.shortfall_micros,
            latency_first_ms: None,
            latency_total_ms: None,
            outcome: activity_outcome(event),
        };
        if let Err(err) = self.storage.append_activity(record).await {
            tracing::warn!(error = %err, user_id, "append activity record failed");
        }
    }
}

fn activity_outcome(event: &UpstreamEvent) -> String {
    match event.response_status {
        Some(status) if (200..300).contains(&status) => "success".to_string(),
        Some(status) => format!("upstream_error_{status}"),
        None => "transport_error".to_string(),
    }
}

/// Best-effort: the native request body is opaque bytes by the time it
/// reaches the event bus, so this parses just enough JSON to pull `model`
/// out of the OpenAI/Claude/Gemini wire shapes, all of which carry it at the
/// top level.
fn extract_model(event: &UpstreamEvent) -> Option<String> {
    let body = event.request_body.as_ref()?;
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value.get("model")?.as_str().map(|s| s.to_string())
}

/// Whitespace-token count, used when no adapter-specific usage parser
/// recognized the response body. Approximate by design: good enough to
/// avoid a zero-cost ledger entry for a generate call that did consume
/// upstream tokens.
fn estimate_tokens(body: &[u8]) -> i64 {
    std::str::from_utf8(body)
        .map(|s| s.split_whitespace().count() as i64)
        .unwrap_or(0)
}

impl<S: Storage> EventSink for MeteringEventSink<S> {
    fn write<'a>(&'a self, event: &'a Event) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            if let Event::Upstream(upstream) = event {
                self.meter(upstream).await;
            }
        })
    }
}
