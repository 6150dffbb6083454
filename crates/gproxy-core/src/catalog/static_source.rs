use std::sync::Arc;

use async_trait::async_trait;
use gproxy_provider_core::ProviderConfig;

use crate::catalog::{CatalogSource, ModelDescriptor};
use crate::state::AppState;

/// Default context length applied when a model record omits one (§4.1).
const DEFAULT_CONTEXT_LENGTH: u64 = 4096;

/// Hardcoded `(id, context_length, prompt_price_micros, completion_price_micros)`
/// rows for built-in provider kinds, since those adapters carry no
/// `model_table` of their own (their request/response shapes are hand-written
/// per provider in `gproxy-provider-impl`). These are the only prices this
/// gateway ships without an operator-supplied `Custom` `model_table`; see
/// spec.md §8 scenario 1, which this table's `gpt-4` row reproduces exactly
/// (0.003/0.006 USD per 1k tokens == 3/6 micro-dollars per token).
fn builtin_model_rows(cfg: &ProviderConfig) -> &'static [(&'static str, u64, i64, i64)] {
    match cfg {
        ProviderConfig::OpenAI(_) | ProviderConfig::Codex(_) => &[
            ("gpt-4", 8192, 3, 6),
            ("gpt-4o", 128_000, 25, 100),
            ("gpt-4o-mini", 128_000, 1, 6),
            ("o1", 200_000, 150, 600),
        ],
        ProviderConfig::Claude(_) | ProviderConfig::ClaudeCode(_) => &[
            ("claude-opus-4", 200_000, 150, 750),
            ("claude-sonnet-4", 200_000, 30, 150),
            ("claude-haiku-3.5", 200_000, 8, 40),
        ],
        ProviderConfig::AIStudio(_)
        | ProviderConfig::Vertex(_)
        | ProviderConfig::VertexExpress(_)
        | ProviderConfig::GeminiCli(_)
        | ProviderConfig::Antigravity(_) => &[
            ("gemini-1.5-pro", 2_000_000, 1, 5),
            ("gemini-1.5-flash", 1_000_000, 0, 1),
        ],
        ProviderConfig::Nvidia(_) => &[],
        ProviderConfig::DeepSeek(_) => &[("deepseek-chat", 64_000, 0, 1)],
        ProviderConfig::Custom(_) => &[],
    }
}

/// Reads each provider's already-loaded `config_json` for its model table
/// rather than making a live upstream call. `Custom` providers serve their
/// own `model_table`; built-in provider kinds fall back to the hardcoded
/// price list in [`builtin_model_rows`].
pub struct ConfigCatalogSource {
    state: Arc<AppState>,
}

impl ConfigCatalogSource {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl CatalogSource for ConfigCatalogSource {
    async fn fetch_models(&self, provider: &str) -> anyhow::Result<Vec<ModelDescriptor>> {
        let Some(runtime) = self.state.providers.load().get(provider).cloned() else {
            return Ok(Vec::new());
        };
        let cfg_value = runtime.config_json.load_full();
        let cfg: ProviderConfig = serde_json::from_value((*cfg_value).clone())?;

        if let ProviderConfig::Custom(custom) = &cfg {
            let Some(table) = &custom.model_table else {
                return Ok(Vec::new());
            };
            return Ok(table
                .models
                .iter()
                .cloned()
                .map(|m| ModelDescriptor {
                    id: m.id,
                    provider: provider.to_string(),
                    display_name: m.display_name,
                    context_length: m.context_length.unwrap_or(DEFAULT_CONTEXT_LENGTH),
                    prompt_price_micros: m.prompt_price_micros.unwrap_or(0),
                    completion_price_micros: m.completion_price_micros.unwrap_or(0),
                    modality: m.modality,
                    is_private: m.is_private,
                })
                .collect());
        }

        Ok(builtin_model_rows(&cfg)
            .iter()
            .map(
                |(id, context_length, prompt_price_micros, completion_price_micros)| ModelDescriptor {
                    id: id.to_string(),
                    provider: provider.to_string(),
                    display_name: None,
                    context_length: *context_length,
                    prompt_price_micros: *prompt_price_micros,
                    completion_price_micros: *completion_price_micros,
                    modality: vec!["text".to_string()],
                    is_private: false,
                },
            )
            .collect())
    }
}
