//! flow.rs
//!
//! Semantic interpretation layer: converts raw analysis metrics into the
//! qualitative artifacts a test plan is built from: execution paths, edge
//! cases, an IO matrix, risks and recommendations.
//!
//! Pure function of its input; summarizing the same analysis twice yields
//! the same summary.

use serde::{Deserialize, Serialize};

use crate::analyzer::AnalysisResult;

/* ============================================================
   Shapes
   ============================================================ */

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IoScenario {
    pub inputs: Vec<String>,
    pub expected_outputs: Vec<String>,
    pub description: String,
}

/// Numeric snapshot of the analysis that produced this summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowMetrics {
    pub complexity: u32,
    pub branches: u32,
    pub functions: usize,
    pub inputs: usize,
    pub outputs: usize,
    pub side_effects: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowSummary {
    pub language: String,
    pub overview: String,
    pub key_paths: Vec<String>,
    pub edge_cases: Vec<String>,
    pub io_matrix: Vec<IoScenario>,
    pub risks: Vec<String>,
    pub recommendations: Vec<String>,
    pub metrics: FlowMetrics,
}

/* ============================================================
   Summarization
   ============================================================ */

pub fn summarize(result: &AnalysisResult) -> Result<FlowSummary, String> {
    if let Some(err) = &result.error {
        return Err(format!("Cannot summarize a failed analysis: {}", err));
    }

    let (risks, recommendations) = assess(result);

    Ok(FlowSummary {
        language: result.language.clone(),
        overview: render_overview(result),
        key_paths: synthesize_paths(result.branches),
        edge_cases: collect_edge_cases(result),
        io_matrix: build_io_matrix(result),
        risks,
        recommendations,
        metrics: FlowMetrics {
            complexity: result.complexity,
            branches: result.branches,
            functions: result.functions.len(),
            inputs: result.inputs.len(),
            outputs: result.outputs.len(),
            side_effects: result.side_effects.len(),
        },
    })
}

/// Path labels by branch-count tier. Above three branches the output is
/// bounded to a fixed bucket set instead of one label per branch.
fn synthesize_paths(branches: u32) -> Vec<String> {
    match branches {
        0 => vec!["linear_path".into()],
        1..=3 => (1..=branches).map(|i| format!("branch_path_{}", i)).collect(),
        _ => vec![
            "happy_path".into(),
            "edge_case_paths".into(),
            "error_handling_paths".into(),
            format!("remaining_paths ({} branches total)", branches),
        ],
    }
}

const BASE_EDGE_CASES: &[&str] = &[
    "null/None inputs",
    "empty collections",
    "boundary numbers (0, -1, max)",
];

fn language_exception_cases(language: &str) -> &'static [&'static str] {
    match language {
        "python" => &["raised exceptions (ValueError, TypeError)"],
        "java" => &["thrown exceptions (IllegalArgumentException, NullPointerException)"],
        "typescript" => &["thrown errors (TypeError, RangeError)"],
        _ => &["error/exception paths"],
    }
}

fn side_effect_case(tag: &str) -> Option<&'static str> {
    match tag {
        "io_operations" => Some("I/O failures (missing files, closed streams)"),
        "network_operations" => Some("network timeouts and unreachable hosts"),
        "database_operations" => Some("database unavailability and failed transactions"),
        "async_operations" => Some("await ordering and cancelled tasks"),
        _ => None,
    }
}

fn collect_edge_cases(result: &AnalysisResult) -> Vec<String> {
    let mut cases: Vec<String> = BASE_EDGE_CASES.iter().map(|c| c.to_string()).collect();

    for case in language_exception_cases(&result.language) {
        cases.push(case.to_string());
    }

    for tag in &result.side_effects {
        if let Some(case) = side_effect_case(tag) {
            cases.push(case.to_string());
        }
    }

    if result.complexity > 5 {
        cases.push("high complexity paths".into());
    }

    cases
}

/// One scenario per input parameter, capped at the first three.
const IO_MATRIX_CAP: usize = 3;

fn build_io_matrix(result: &AnalysisResult) -> Vec<IoScenario> {
    let expected = if result.outputs.is_empty() {
        vec!["<define from business logic>".to_string()]
    } else {
        result.outputs.clone()
    };

    if result.inputs.is_empty() {
        return vec![IoScenario {
            inputs: vec!["<no parameters>".into()],
            expected_outputs: expected,
            description: "invoke with no arguments".into(),
        }];
    }

    result
        .inputs
        .iter()
        .take(IO_MATRIX_CAP)
        .map(|input| IoScenario {
            inputs: vec![input.clone()],
            expected_outputs: expected.clone(),
            description: format!("vary {}", input),
        })
        .collect()
}

fn is_void_like(output: &str) -> bool {
    matches!(output, "None" | "void" | "()" | "Unit" | "undefined")
}

/// Independent checks, fixed order. Every triggered check contributes; a
/// single fallback risk is emitted when none fire.
fn assess(result: &AnalysisResult) -> (Vec<String>, Vec<String>) {
    let mut risks = Vec::new();
    let mut recommendations = Vec::new();

    if result.branches == 0 {
        risks.push("no conditional branches detected".into());
        recommendations.push("exercise boundary values even without branching".into());
    }

    if result.branches > result.complexity.saturating_mul(2) {
        risks.push("branch count disproportionate to complexity".into());
        recommendations.push("decompose the function before testing".into());
    }

    if result.outputs.is_empty() || result.outputs.iter().all(|o| is_void_like(o)) {
        risks.push("return contract not detected".into());
        recommendations.push("verify observable side effects instead of return values".into());
    }

    if !result.side_effects.is_empty() {
        risks.push(format!(
            "side effects detected: {}",
            result.side_effects.join(", ")
        ));
        recommendations.push("mock or stub the detected side effects".into());
    }

    if result.complexity > 10 {
        risks.push("high cyclomatic complexity".into());
        recommendations.push("refactor into smaller units before exhaustive testing".into());
    }

    if result.functions.len() > 1 {
        recommendations.push("test each function individually, then in integration".into());
    }

    if risks.is_empty() {
        risks.push("low risk - straightforward function".into());
    }

    (risks, recommendations)
}

fn render_overview(result: &AnalysisResult) -> String {
    let names: Vec<&str> = result.functions.iter().map(|f| f.name.as_str()).collect();
    let names = if names.is_empty() {
        "<unnamed>".to_string()
    } else {
        names.join(", ")
    };

    let preview: Vec<&str> = result.inputs.iter().take(3).map(String::as_str).collect();
    let params = if result.inputs.is_empty() {
        "none".to_string()
    } else {
        format!("{} ({})", result.inputs.len(), preview.join(", "))
    };

    let outputs = if result.outputs.is_empty() {
        "undefined".to_string()
    } else {
        result.outputs.join(", ")
    };

    format!(
        "Language: {}. Functions: [{}]. Parameters: {}. Outputs: [{}]. \
         Complexity={}, Branches={}, Side effects={}.",
        result.language,
        names,
        params,
        outputs,
        result.complexity,
        result.branches,
        result.side_effects.len()
    )
}

/* ============================================================
   Tests
   ============================================================ */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::python;

    fn analysis(code: &str) -> AnalysisResult {
        let result = python::analyze(code);
        assert!(result.error.is_none(), "fixture must parse: {:?}", result.error);
        result
    }

    #[test]
    fn fails_fast_on_error_input() {
        let failed = AnalysisResult::failed("Syntax error: invalid syntax at line 1");
        let err = summarize(&failed).unwrap_err();
        assert!(err.contains("Syntax error"));
    }

    #[test]
    fn zero_branches_yield_linear_path() {
        let summary = summarize(&analysis("def f():\n    return 1\n")).unwrap();
        assert_eq!(summary.key_paths, vec!["linear_path"]);
        assert!(summary.risks.iter().any(|r| r.contains("no conditional branches")));
    }

    #[test]
    fn small_branch_counts_get_one_path_each() {
        let code = "def f(x):\n    if x:\n        pass\n    if x > 1:\n        pass\n";
        let summary = summarize(&analysis(code)).unwrap();
        assert_eq!(summary.key_paths, vec!["branch_path_1", "branch_path_2"]);
    }

    #[test]
    fn many_branches_collapse_to_bucket_set() {
        let code = r#"
def f(x):
    if x == 1:
        pass
    if x == 2:
        pass
    if x == 3:
        pass
    if x == 4:
        pass
    if x == 5:
        pass
"#;
        let summary = summarize(&analysis(code)).unwrap();
        assert_eq!(summary.key_paths.len(), 4);
        assert_eq!(summary.key_paths[0], "happy_path");
        assert!(summary.key_paths[3].contains("5 branches"));
    }

    #[test]
    fn io_matrix_is_capped_at_three() {
        let code = "def f(a, b, c, d, e):\n    return a\n";
        let summary = summarize(&analysis(code)).unwrap();
        assert_eq!(summary.io_matrix.len(), 3);
        assert_eq!(summary.io_matrix[0].inputs, vec!["a: Any"]);
    }

    #[test]
    fn no_parameters_yield_single_placeholder_entry() {
        let summary = summarize(&analysis("def f():\n    return True\n")).unwrap();
        assert_eq!(summary.io_matrix.len(), 1);
        assert_eq!(summary.io_matrix[0].inputs, vec!["<no parameters>"]);
        assert_eq!(summary.io_matrix[0].expected_outputs, vec!["bool"]);
    }

    #[test]
    fn side_effects_produce_edge_cases_and_risks() {
        let summary = summarize(&analysis("def f():\n    print(\"x\")\n")).unwrap();
        assert!(summary
            .edge_cases
            .iter()
            .any(|c| c.contains("I/O failures")));
        assert!(summary.risks.iter().any(|r| r.contains("io_operations")));
        assert!(summary
            .recommendations
            .iter()
            .any(|r| r.contains("mock or stub")));
    }

    #[test]
    fn python_exception_catalog_is_included() {
        let summary = summarize(&analysis("def f():\n    pass\n")).unwrap();
        assert!(summary
            .edge_cases
            .iter()
            .any(|c| c.contains("ValueError")));
    }

    #[test]
    fn summarize_is_idempotent() {
        let result = analysis("def f(x: int) -> int:\n    if x > 0:\n        return x\n    return -x\n");
        let a = summarize(&result).unwrap();
        let b = summarize(&result).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn metrics_snapshot_matches_analysis() {
        let result = analysis("def f(x, y):\n    if x:\n        return 1\n    return 0\n");
        let summary = summarize(&result).unwrap();
        assert_eq!(summary.metrics.complexity, result.complexity);
        assert_eq!(summary.metrics.branches, result.branches);
        assert_eq!(summary.metrics.functions, 1);
        assert_eq!(summary.metrics.inputs, 2);
    }
}
