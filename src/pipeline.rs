//! pipeline.rs
//!
//! Full analysis pipeline: dispatch+analyze, summarize, build prompt.
//!
//! Three ordered stages. A stage 1 failure is terminal; later stages fail
//! soft: their error is recorded, dependent stages are skipped, and
//! whatever was produced so far is returned. No stage fault ever
//! propagates to the caller.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;

use crate::analyzer::AnalysisResult;
use crate::backend::{self, Dispatcher};
use crate::config::Config;
use crate::flow::{self, FlowSummary};
use crate::probe::{self, RuntimeAvailability};
use crate::prompt::{self, PromptArtifact};
use crate::validate;

#[derive(Debug, Clone, Serialize)]
pub struct PipelineMeta {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub language: String,
    pub steps_completed: u8,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub analysis: AnalysisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<FlowSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<PromptArtifact>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub runtime: RuntimeAvailability,
    pub meta: PipelineMeta,
}

pub struct Pipeline<'a> {
    dispatcher: &'a Dispatcher,
    config: &'a Config,
}

impl<'a> Pipeline<'a> {
    pub fn new(dispatcher: &'a Dispatcher, config: &'a Config) -> Self {
        Self { dispatcher, config }
    }

    pub fn run(&self, language: &str, code: &str, framework: &str) -> PipelineResult {
        let started_at = Utc::now();
        let clock = Instant::now();
        let normalized = backend::normalize_language(language);

        let mut errors: Vec<String> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();

        let runtime = probe::probe_all(self.config);
        if probe::BACKENDS.contains(&normalized.as_str()) && !runtime.is_available(&normalized) {
            warnings.push(format!(
                "{} backend appears unavailable; attempting dispatch anyway",
                normalized
            ));
        }

        log::info!("step 1/3: static analysis ({})", normalized);
        let analysis = self.analyze_stage(language, code, &mut errors);

        let mut steps_completed: u8 = 0;
        let mut flow_summary: Option<FlowSummary> = None;
        let mut artifact: Option<PromptArtifact> = None;

        if !analysis.is_err() {
            steps_completed = 1;

            log::info!("step 2/3: flow summarization");
            match flow::summarize(&analysis) {
                Ok(f) => {
                    steps_completed += 1;
                    flow_summary = Some(f);
                }
                Err(e) => errors.push(format!("Flow: {}", e)),
            }

            log::info!("step 3/3: prompt generation");
            match &flow_summary {
                Some(f) => match prompt::build(f, framework) {
                    Ok(p) => {
                        steps_completed += 1;
                        artifact = Some(p);
                    }
                    Err(e) => errors.push(format!("Prompt: {}", e)),
                },
                None => errors.push("Prompt: skipped because flow summarization failed".into()),
            }
        }

        let success = steps_completed == 3 && errors.is_empty();
        let finished_at = Utc::now();

        log::info!(
            "pipeline finished in {}ms, steps={}, errors={}",
            clock.elapsed().as_millis(),
            steps_completed,
            errors.len()
        );

        PipelineResult {
            analysis,
            flow: flow_summary,
            prompt: artifact,
            errors,
            warnings,
            runtime,
            meta: PipelineMeta {
                started_at,
                finished_at,
                duration_ms: clock.elapsed().as_millis() as u64,
                language: normalized,
                steps_completed,
                success,
            },
        }
    }

    /// Stage 1: validation, dispatch, normalization. Every failure mode
    /// collapses to an error-bearing `AnalysisResult`.
    fn analyze_stage(
        &self,
        language: &str,
        code: &str,
        errors: &mut Vec<String>,
    ) -> AnalysisResult {
        if let Err(e) = validate::validate_code(code) {
            errors.push(format!("Analysis: {}", e));
            return AnalysisResult::failed(e);
        }

        match self.dispatcher.dispatch(language, code) {
            Ok(result) => {
                if let Some(err) = &result.error {
                    errors.push(format!("Analysis: {}", err));
                }
                result
            }
            Err(e) => {
                let msg = e.to_string();
                errors.push(format!("Analysis: {}", msg));
                AnalysisResult::failed(msg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline_env() -> (Dispatcher, Config) {
        let config = Config {
            // nothing listens on the loopback port; probes fail fast
            java_url: "http://127.0.0.1:1".into(),
            probe_timeout_secs: 1,
            timeout_secs: 1,
            ..Config::default()
        };
        (Dispatcher::new(&config), config)
    }

    #[test]
    fn full_python_run_succeeds() {
        let (dispatcher, config) = pipeline_env();
        let result = Pipeline::new(&dispatcher, &config).run(
            "python",
            "def f(x: int) -> int:\n    if x > 0:\n        return x\n    return -x\n",
            "auto",
        );

        assert!(result.meta.success);
        assert_eq!(result.meta.steps_completed, 3);
        assert!(result.errors.is_empty());
        assert_eq!(result.prompt.as_ref().unwrap().test_framework, "pytest");
        assert_eq!(result.meta.language, "python");
    }

    #[test]
    fn syntax_error_is_terminal() {
        let (dispatcher, config) = pipeline_env();
        let result =
            Pipeline::new(&dispatcher, &config).run("python", "def broken(:\n    pass\n", "auto");

        assert!(!result.meta.success);
        assert_eq!(result.meta.steps_completed, 0);
        assert!(result.flow.is_none());
        assert!(result.prompt.is_none());
        assert!(result.errors[0].contains("Syntax error"));
    }

    #[test]
    fn empty_code_fails_before_dispatch() {
        let (dispatcher, config) = pipeline_env();
        let result = Pipeline::new(&dispatcher, &config).run("python", "   ", "auto");

        assert_eq!(result.meta.steps_completed, 0);
        assert!(result.errors[0].contains("No code provided"));
    }

    #[test]
    fn unsupported_language_is_terminal() {
        let (dispatcher, config) = pipeline_env();
        let result = Pipeline::new(&dispatcher, &config).run("cobol", "x", "auto");

        assert_eq!(result.meta.steps_completed, 0);
        assert!(result.errors[0].contains("Unsupported language"));
    }

    #[test]
    fn unavailable_backend_is_warned_not_fatal() {
        let (dispatcher, config) = pipeline_env();
        let result = Pipeline::new(&dispatcher, &config).run("java", "class A {}", "auto");

        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("java backend appears unavailable")));
        // dispatch was still attempted and failed with a classified error
        assert!(result.errors[0].contains("java"));
    }

    #[test]
    fn success_iff_three_steps_and_no_errors() {
        let (dispatcher, config) = pipeline_env();
        let ok = Pipeline::new(&dispatcher, &config).run("python", "def f():\n    pass\n", "auto");
        assert_eq!(
            ok.meta.success,
            ok.meta.steps_completed == 3 && ok.errors.is_empty()
        );

        let bad = Pipeline::new(&dispatcher, &config).run("python", "", "auto");
        assert_eq!(
            bad.meta.success,
            bad.meta.steps_completed == 3 && bad.errors.is_empty()
        );
    }
}
