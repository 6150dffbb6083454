use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub context_length: Option<u64>,
    /// Micro-dollars (1e-6 USD) per prompt token.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub prompt_price_micros: Option<i64>,
    /// Micro-dollars (1e-6 USD) per completion token.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub completion_price_micros: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub modality: Vec<String>,
    #[serde(default)]
    pub is_private: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelTable {
    pub models: Vec<ModelRecord>,
}
