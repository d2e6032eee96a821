//! testsmith
//!
//! Static function analysis plus test-generation prompt orchestration.
//! Python is analyzed in-process with tree-sitter; Java and TypeScript are
//! delegated to external analyzer backends behind one dispatch contract.

pub mod analyzer;
pub mod backend;
pub mod cache;
pub mod config;
pub mod flow;
pub mod pipeline;
pub mod probe;
pub mod prompt;
pub mod service;
pub mod validate;
