//! analyzer/types.rs
//!
//! Result shapes shared by every analyzer backend.

use serde::{Deserialize, Serialize};

/* ---------- parameters ---------- */

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    #[default]
    Positional,
    Varargs,
    Kwargs,
    KeywordOnly,
}

/// External backends do not all report every field; anything missing
/// falls back to its default during normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub kind: ParamKind,
}

/* ---------- per-function metrics ---------- */

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionInfo {
    pub name: String,
    pub inputs: Vec<ParamInfo>,
    pub outputs: Vec<String>,
    pub line_start: usize,
    pub line_end: usize,
    pub branches: u32,
    pub local_complexity: u32,
}

/* ---------- aggregated result ---------- */

/// Normalized analysis contract. Every backend (local or remote) is folded
/// into this shape before anything downstream sees it.
///
/// `error` and the metric fields are mutually exclusive: a result either
/// carries metrics from a successful parse or a single error string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub functions: Vec<FunctionInfo>,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub complexity: u32,
    #[serde(default)]
    pub branches: u32,
    #[serde(default)]
    pub side_effects: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }
}

/* ---------- helpers ---------- */

/// Insertion-ordered dedup push.
pub fn push_unique(items: &mut Vec<String>, value: impl Into<String>) {
    let value = value.into();
    if !items.contains(&value) {
        items.push(value);
    }
}
