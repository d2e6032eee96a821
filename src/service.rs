//! service.rs
//!
//! Tool surface: the five operations plus the read-only query side.
//!
//! Responsibilities:
//! - Validate inputs before anything is dispatched
//! - Collapse every failure into structured `{error}` payloads
//! - Record recent analyses and prompts in the bounded histories
//!
//! Non-responsibilities:
//! - Transport (CLI/RPC hosting lives above this layer)
//! - Analysis itself (delegated to the dispatcher and its backends)

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::analyzer::AnalysisResult;
use crate::backend::{self, Dispatcher};
use crate::cache::{BoundedHistory, CacheEntry};
use crate::config::Config;
use crate::flow::{self, FlowSummary};
use crate::pipeline::{Pipeline, PipelineResult};
use crate::probe;
use crate::prompt::{self, PromptArtifact};
use crate::validate;

/* ============================================================
   Cached records
   ============================================================ */

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRecord {
    pub language: String,
    pub result: AnalysisResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptRecord {
    pub tokens_est: u32,
    pub test_framework: String,
    pub prompt_preview: String,
}

/* ============================================================
   Query payloads
   ============================================================ */

#[derive(Debug, Serialize)]
pub struct RuntimeStatus {
    pub available: Vec<String>,
    pub unavailable: Vec<String>,
    pub details: BTreeMap<String, bool>,
    pub total_available: usize,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisHistory {
    pub count: usize,
    pub success_rate: f64,
    pub analyses: Vec<CacheEntry<AnalysisRecord>>,
}

#[derive(Debug, Serialize)]
pub struct PromptHistory {
    pub count: usize,
    pub avg_tokens_est: f64,
    pub prompts: Vec<CacheEntry<PromptRecord>>,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub runtime: RuntimeStatus,
    pub cached_analyses: usize,
    pub cached_prompts: usize,
    pub alive: bool,
}

/* ============================================================
   Service
   ============================================================ */

pub struct ToolService {
    config: Config,
    dispatcher: Dispatcher,
    analyses: BoundedHistory<AnalysisRecord>,
    prompts: BoundedHistory<PromptRecord>,
}

impl ToolService {
    pub fn new(config: Config) -> Self {
        let dispatcher = Dispatcher::new(&config);
        Self {
            config,
            dispatcher,
            analyses: BoundedHistory::new(),
            prompts: BoundedHistory::new(),
        }
    }

    /* ---------- tools ---------- */

    /// Analyze one function. Never raises: every failure class lands in
    /// the result's `error` field.
    pub fn analyze_function(&self, language: &str, code: &str) -> AnalysisResult {
        let normalized = backend::normalize_language(language);

        let result = match validate::validate_code(code) {
            Err(e) => {
                let mut failed = AnalysisResult::failed(e);
                failed.language = normalized;
                failed
            }
            Ok(()) => match self.dispatcher.dispatch(language, code) {
                Ok(result) => result,
                Err(e) => {
                    let mut failed = AnalysisResult::failed(e.to_string());
                    failed.language = normalized;
                    failed
                }
            },
        };

        self.analyses.push(AnalysisRecord {
            language: result.language.clone(),
            result: result.clone(),
        });

        log::info!(
            "analysis completed: functions={}, branches={}, error={}",
            result.functions.len(),
            result.branches,
            result.error.is_some()
        );

        result
    }

    /// Summarize a previously produced analysis, delivered as JSON.
    pub fn summarize_flow(&self, analysis: &Value) -> Result<FlowSummary, String> {
        let analysis = decode_analysis(analysis)?;
        flow::summarize(&analysis)
    }

    /// Build the test-generation prompt from a flow summary, delivered as
    /// JSON.
    pub fn build_prompt(&self, flow_value: &Value, framework: &str) -> Result<PromptArtifact, String> {
        let summary = decode_flow(flow_value)?;
        let artifact = prompt::build(&summary, framework)?;

        self.prompts.push(PromptRecord {
            tokens_est: artifact.tokens_est,
            test_framework: artifact.test_framework.clone(),
            prompt_preview: prompt::preview(&artifact.prompt),
        });

        Ok(artifact)
    }

    pub fn run_full_pipeline(
        &self,
        language: &str,
        code: &str,
        framework: &str,
    ) -> PipelineResult {
        let result = Pipeline::new(&self.dispatcher, &self.config).run(language, code, framework);

        self.analyses.push(AnalysisRecord {
            language: result.meta.language.clone(),
            result: result.analysis.clone(),
        });

        if let Some(artifact) = &result.prompt {
            self.prompts.push(PromptRecord {
                tokens_est: artifact.tokens_est,
                test_framework: artifact.test_framework.clone(),
                prompt_preview: prompt::preview(&artifact.prompt),
            });
        }

        result
    }

    pub fn check_runtime_status(&self) -> RuntimeStatus {
        let availability = probe::probe_all(&self.config);
        let available = availability.available();
        let unavailable = availability.unavailable();

        let recommendations = unavailable
            .iter()
            .map(|b| probe::remediation_hint(b, &self.config))
            .collect();

        RuntimeStatus {
            total_available: available.len(),
            available,
            unavailable,
            details: availability.backends.clone(),
            recommendations,
        }
    }

    /* ---------- read-only queries ---------- */

    pub fn last_analyses(&self) -> AnalysisHistory {
        let analyses = self.analyses.snapshot();
        let count = analyses.len();
        let ok = analyses
            .iter()
            .filter(|e| e.payload.result.error.is_none())
            .count();

        AnalysisHistory {
            count,
            success_rate: ok as f64 / count.max(1) as f64,
            analyses,
        }
    }

    pub fn last_prompts(&self) -> PromptHistory {
        let prompts = self.prompts.snapshot();
        let count = prompts.len();
        let total: u64 = prompts.iter().map(|e| e.payload.tokens_est as u64).sum();

        PromptHistory {
            count,
            avg_tokens_est: total as f64 / count.max(1) as f64,
            prompts,
        }
    }

    pub fn system_status(&self) -> SystemStatus {
        SystemStatus {
            runtime: self.check_runtime_status(),
            cached_analyses: self.analyses.len(),
            cached_prompts: self.prompts.len(),
            alive: true,
        }
    }
}

/* ============================================================
   Payload decoding
   ============================================================ */

fn decode_analysis(value: &Value) -> Result<AnalysisResult, String> {
    let map = value
        .as_object()
        .ok_or("Expected an analysis object, got a non-object value")?;

    if let Some(err) = map.get("error").and_then(Value::as_str) {
        return Err(format!("Cannot summarize a failed analysis: {}", err));
    }

    serde_json::from_value(value.clone()).map_err(|e| format!("Invalid analysis payload: {}", e))
}

fn decode_flow(value: &Value) -> Result<FlowSummary, String> {
    let map = value
        .as_object()
        .ok_or("Expected a flow summary object, got a non-object value")?;

    if let Some(err) = map.get("error").and_then(Value::as_str) {
        return Err(format!("Cannot build a prompt from a failed summary: {}", err));
    }

    serde_json::from_value(value.clone()).map_err(|e| format!("Invalid flow payload: {}", e))
}

/* ============================================================
   Tests
   ============================================================ */
