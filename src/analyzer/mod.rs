pub mod python;
pub mod side_effects;
pub mod types;

pub use types::{AnalysisResult, FunctionInfo, ParamInfo, ParamKind};
