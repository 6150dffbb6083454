//! Bounded conversation memory for clients that pass a session id (§4.8).
//!
//! Two halves, both best-effort: a pre-flight [`load_history`] that never
//! fails the request (an empty history is indistinguishable from "brand new
//! session" to the caller), and a post-flight [`append_turn`] that persists
//! the exchange under `(session_id, request_id)` so a client retry can't
//! duplicate it.

use std::sync::Arc;

use gproxy_storage::{ChatMessageRow, NewChatMessage, Storage};

/// Turns prepended to an outgoing request when a session is resumed.
pub const DEFAULT_HISTORY_TURNS: usize = 20;

/// Loads up to `limit` of the most recent messages for `public_id`, or an
/// empty history if the session doesn't exist yet, isn't owned by
/// `owner_user_id`, or storage is unavailable.
pub async fn load_history(
    storage: &Arc<dyn Storage>,
    public_id: &str,
    owner_user_id: i64,
    limit: usize,
) -> Vec<ChatMessageRow> {
    match storage.chat_history(public_id, owner_user_id, limit).await {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!(error = %err, public_id, "chat history load failed");
            Vec::new()
        }
    }
}

/// Creates the session on first use, then appends the user turn and (if
/// present) the assistant turn in one atomic write. Never returns an error:
/// a persistence failure is logged and otherwise invisible to the caller, so
/// it cannot turn into a failed client response. `prompt_tokens`/
/// `completion_tokens` are those Metering computed for the same request
/// (§4.8 ties session token counts to Metering's), so the session messages
/// table and the credit ledger agree on how many tokens each turn cost.
pub async fn append_turn(
    storage: &Arc<dyn Storage>,
    public_id: &str,
    owner_user_id: i64,
    model: Option<&str>,
    request_id: &str,
    user_message: serde_json::Value,
    prompt_tokens: Option<i64>,
    assistant_message: Option<serde_json::Value>,
    completion_tokens: Option<i64>,
) {
    match storage
        .ensure_chat_session(public_id, owner_user_id, model)
        .await
    {
        Ok(None) => {
            tracing::warn!(public_id, owner_user_id, "chat session owned by another principal");
            return;
        }
        Err(err) => {
            tracing::warn!(error = %err, public_id, "ensure chat session failed");
            return;
        }
        Ok(Some(_)) => {}
    }

    let mut messages = vec![NewChatMessage {
        role: "user".to_string(),
        content_json: user_message,
        token_count: prompt_tokens,
    }];
    if let Some(assistant_message) = assistant_message {
        messages.push(NewChatMessage {
            role: "assistant".to_string(),
            content_json: assistant_message,
            token_count: completion_tokens,
        });
    }

    if let Err(err) = storage
        .append_chat_messages(public_id, owner_user_id, request_id, messages)
        .await
    {
        tracing::warn!(error = %err, public_id, "append chat messages failed");
    }
}

#[cfg(test)]
mod tests {
    use super::DEFAULT_HISTORY_TURNS;

    #[test]
    fn default_history_window_is_bounded() {
        assert!(DEFAULT_HISTORY_TURNS > 0);
        assert!(DEFAULT_HISTORY_TURNS <= 100);
    }
}
