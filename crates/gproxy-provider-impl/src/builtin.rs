//! Default provider rows seeded into storage on first boot.
//!
//! Seeding is idempotent: bootstrap only inserts a seed when no row with that
//! provider name exists yet, so operators are free to disable, rename, or
//! delete any of these afterwards via the admin surface.

use gproxy_provider_core::config::{
    AIStudioConfig, AntigravityConfig, ClaudeCodeConfig, ClaudeConfig, CodexConfig, DeepSeekConfig,
    GeminiCliConfig, NvidiaConfig, OpenAIConfig, ProviderConfig, VertexConfig, VertexExpressConfig,
};

pub struct BuiltinProviderSeed {
    pub name: &'static str,
    pub config_json: serde_json::Value,
    pub enabled: bool,
}

fn seed(name: &'static str, config: ProviderConfig, enabled: bool) -> BuiltinProviderSeed {
    BuiltinProviderSeed {
        name,
        config_json: serde_json::to_value(config).expect("provider config is serializable"),
        enabled,
    }
}

/// Builtin channels seeded at bootstrap. `custom` providers are created
/// through the admin API and are never seeded here.
pub fn builtin_provider_seeds() -> Vec<BuiltinProviderSeed> {
    vec![
        seed("openai", ProviderConfig::OpenAI(OpenAIConfig::default()), true),
        seed("claude", ProviderConfig::Claude(ClaudeConfig::default()), true),
        seed("aistudio", ProviderConfig::AIStudio(AIStudioConfig::default()), true),
        seed(
            "vertexexpress",
            ProviderConfig::VertexExpress(VertexExpressConfig::default()),
            false,
        ),
        seed("vertex", ProviderConfig::Vertex(VertexConfig::default()), false),
        seed("geminicli", ProviderConfig::GeminiCli(GeminiCliConfig::default()), false),
        seed(
            "claudecode",
            ProviderConfig::ClaudeCode(ClaudeCodeConfig::default()),
            false,
        ),
        seed("codex", ProviderConfig::Codex(CodexConfig::default()), false),
        seed(
            "antigravity",
            ProviderConfig::Antigravity(AntigravityConfig::default()),
            false,
        ),
        seed("nvidia", ProviderConfig::Nvidia(NvidiaConfig::default()), false),
        seed("deepseek", ProviderConfig::DeepSeek(DeepSeekConfig::default()), true),
    ]
}
