//! analyzer/side_effects.rs
//!
//! Name-based side-effect classification.
//!
//! Heuristic by contract: matching a call or attribute name against fixed
//! lists, no data-flow analysis. New categories are added as rules here,
//! never as branches in the traversal.

/// Where a matched name appeared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallSite {
    /// Bare call target: `print(...)`.
    Function,
    /// Attribute call target: `conn.commit(...)`.
    Attribute,
}

struct Rule {
    tag: &'static str,
    site: CallSite,
    names: &'static [&'static str],
}

const RULES: &[Rule] = &[
    Rule {
        tag: "io_operations",
        site: CallSite::Function,
        names: &["print", "open", "input", "exec", "eval"],
    },
    Rule {
        tag: "state_modification",
        site: CallSite::Function,
        names: &["setattr", "delattr", "globals", "locals"],
    },
    Rule {
        tag: "io_operations",
        site: CallSite::Attribute,
        names: &["write", "read", "append", "close", "flush"],
    },
    Rule {
        tag: "network_operations",
        site: CallSite::Attribute,
        names: &["send", "get", "post", "put", "delete"],
    },
    Rule {
        tag: "database_operations",
        site: CallSite::Attribute,
        names: &["commit", "rollback", "execute"],
    },
];

/// Classify one call target name. Returns the category tag on a match.
pub fn classify_call(name: &str, site: CallSite) -> Option<&'static str> {
    RULES
        .iter()
        .find(|r| r.site == site && r.names.contains(&name))
        .map(|r| r.tag)
}

/// Tags attached to statement kinds rather than call names.
pub fn classify_statement(kind: &str) -> Option<&'static str> {
    match kind {
        "with_statement" => Some("context_managers"),
        "global_statement" => Some("global_state"),
        "nonlocal_statement" => Some("nonlocal_state"),
        _ => None,
    }
}

pub const ASYNC_TAG: &str = "async_operations";
