//! Translate legacy pattern-based admission rules into guarded boolean
//! expressions for expression-based validating policies.
//!
//! - [`compile`]: pattern → expression (the core; pure)
//! - [`convert`]: whole-policy structural conversion around the core
//! - [`path_de`]: document decoding/encoding
pub mod cli;
pub mod compile;
pub mod convert;
pub mod expr;
pub mod path;
pub mod path_de;
pub mod pattern;
pub mod policy;

pub use compile::{RuleShape, TranslateError, compile, compile_rule};
pub use convert::{ConvertError, convert_policy};
pub use expr::Expression;
pub use path::FieldPath;
pub use pattern::PatternNode;
