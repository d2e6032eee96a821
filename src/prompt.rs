//! prompt.rs
//!
//! Renders the test-generation prompt handed to the downstream LLM
//! consumer. Fully derived from a `FlowSummary` plus a framework selector;
//! the same summary and selector always render the same artifact.

use serde::{Deserialize, Serialize};

use crate::flow::FlowSummary;

/* ============================================================
   Frameworks
   ============================================================ */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestFramework {
    Pytest,
    Junit5,
    Jest,
    Generic,
}

impl TestFramework {
    pub fn name(self) -> &'static str {
        match self {
            TestFramework::Pytest => "pytest",
            TestFramework::Junit5 => "junit5",
            TestFramework::Jest => "jest",
            TestFramework::Generic => "generic",
        }
    }
}

/// `auto` consults the language table; explicit selectors are honored and
/// unknown ones fall back to the generic framework. The resolved value is
/// always concrete.
pub fn resolve_framework(selector: &str, language: &str) -> TestFramework {
    match selector.trim().to_lowercase().as_str() {
        "auto" | "" => match language {
            "python" => TestFramework::Pytest,
            "java" => TestFramework::Junit5,
            "typescript" => TestFramework::Jest,
            _ => TestFramework::Generic,
        },
        "pytest" => TestFramework::Pytest,
        "junit" | "junit5" => TestFramework::Junit5,
        "jest" => TestFramework::Jest,
        _ => TestFramework::Generic,
    }
}

/* ============================================================
   Artifact
   ============================================================ */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMetadata {
    pub paths: usize,
    pub edge_cases: usize,
    pub io_scenarios: usize,
    pub complexity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptArtifact {
    pub prompt: String,
    pub tokens_est: u32,
    pub test_framework: String,
    pub guardrails: Vec<String>,
    pub metadata: PromptMetadata,
}

/* ============================================================
   Guardrails
   ============================================================ */

const BASE_GUARDRAILS: &[&str] = &[
    "Cover every execution path listed under EXECUTION PATHS.",
    "Include a test for every listed edge case.",
    "Use the original function and class names; do not rename anything.",
    "Include every import the test file needs.",
    "Write one test per scenario; do not combine scenarios.",
    "Output only test code, no explanations or surrounding prose.",
];

fn framework_guardrails(framework: TestFramework) -> &'static [&'static str] {
    match framework {
        TestFramework::Pytest => &[
            "Use pytest fixtures for shared setup.",
            "Use @pytest.mark.parametrize for input matrices.",
            "Assert exceptions with pytest.raises.",
        ],
        TestFramework::Junit5 => &[
            "Annotate every test method with @Test.",
            "Use @BeforeEach and @AfterEach only when setup is shared.",
            "Assert exceptions with assertThrows.",
        ],
        TestFramework::Jest => &[
            "Group related cases in a describe block.",
            "Mock collaborators with jest.mock or jest.fn.",
            "Assert rejected promises with expect(...).rejects.",
        ],
        TestFramework::Generic => &[
            "Follow the project's existing test runner conventions.",
            "Keep each test independent and deterministic.",
        ],
    }
}

fn skeleton(framework: TestFramework) -> &'static str {
    match framework {
        TestFramework::Pytest => {
            "import pytest\n\n\
             class TestTargetFunction:\n    \
             def test_scenario(self):\n        \
             # arrange\n        \
             # act\n        \
             # assert\n        \
             ...\n"
        }
        TestFramework::Junit5 => {
            "import org.junit.jupiter.api.Test;\n\
             import static org.junit.jupiter.api.Assertions.*;\n\n\
             class TargetFunctionTest {\n    \
             @Test\n    \
             void scenario() {\n        \
             // arrange, act, assert\n    \
             }\n\
             }\n"
        }
        TestFramework::Jest => {
            "describe(\"targetFunction\", () => {\n  \
             it(\"scenario\", () => {\n    \
             // arrange, act, assert\n  \
             });\n\
             });\n"
        }
        TestFramework::Generic => {
            "suite \"target function\":\n    \
             test \"scenario\":\n        \
             # arrange, act, assert\n"
        }
    }
}

/* ============================================================
   Rendering
   ============================================================ */

pub fn build(flow: &FlowSummary, framework_selector: &str) -> Result<PromptArtifact, String> {
    if flow.overview.trim().is_empty() {
        return Err("Flow summary carries no overview; refusing to build a prompt".into());
    }

    let framework = resolve_framework(framework_selector, &flow.language);
    let guardrails: Vec<String> = BASE_GUARDRAILS
        .iter()
        .chain(framework_guardrails(framework))
        .map(|g| g.to_string())
        .collect();

    let prompt = render_prompt(flow, framework, &guardrails);
    let tokens_est = estimate_tokens(&prompt);

    Ok(PromptArtifact {
        metadata: PromptMetadata {
            paths: flow.key_paths.len(),
            edge_cases: flow.edge_cases.len(),
            io_scenarios: flow.io_matrix.len(),
            complexity: flow.metrics.complexity,
        },
        prompt,
        tokens_est,
        test_framework: framework.name().to_string(),
        guardrails,
    })
}

fn render_prompt(flow: &FlowSummary, framework: TestFramework, guardrails: &[String]) -> String {
    let mut out = String::new();

    out.push_str(
        "You are an expert software engineer writing a complete unit test suite \
         for one analyzed function.\n\n",
    );

    out.push_str("ANALYSIS OVERVIEW\n");
    out.push_str(&flow.overview);
    out.push_str("\n\n");

    out.push_str("EXECUTION PATHS\n");
    bullets(&mut out, flow.key_paths.iter());

    out.push_str("\nEDGE CASES\n");
    bullets(&mut out, flow.edge_cases.iter());

    out.push_str("\nINPUT/OUTPUT MATRIX\n");
    for io in &flow.io_matrix {
        out.push_str(&format!(
            "- {}: inputs [{}] -> expected [{}]\n",
            io.description,
            io.inputs.join(", "),
            io.expected_outputs.join(", ")
        ));
    }

    out.push_str("\nRISKS\n");
    bullets(&mut out, flow.risks.iter());

    out.push_str("\nRECOMMENDATIONS\n");
    bullets(&mut out, flow.recommendations.iter());

    out.push_str("\nGENERATION RULES\n");
    bullets(&mut out, guardrails.iter());

    out.push_str(&format!(
        "\nEXAMPLE STRUCTURE ({})\n```\n{}```\n",
        framework.name(),
        skeleton(framework)
    ));

    out.push_str(&format!(
        "\nGenerate the full suite now: {} paths, {} edge cases, {} branches, {} side effects.",
        flow.key_paths.len(),
        flow.edge_cases.len(),
        flow.metrics.branches,
        flow.metrics.side_effects
    ));

    out.trim().to_string()
}

fn bullets<'a>(out: &mut String, lines: impl Iterator<Item = &'a String>) {
    for line in lines {
        out.push_str("- ");
        out.push_str(line);
        out.push('\n');
    }
}

/// Rough size approximation: word count scaled by a fixed factor. Not a
/// real tokenizer and never treated as authoritative.
const TOKENS_PER_WORD: f32 = 1.33;

fn estimate_tokens(prompt: &str) -> u32 {
    (prompt.split_whitespace().count() as f32 * TOKENS_PER_WORD) as u32
}

/// Short preview used by the prompt history cache.
pub fn preview(prompt: &str) -> String {
    const LIMIT: usize = 200;
    if prompt.chars().count() <= LIMIT {
        prompt.to_string()
    } else {
        let head: String = prompt.chars().take(LIMIT).collect();
        format!("{}...", head)
    }
}

/* ============================================================
   Tests
   ============================================================ */
