//! Tag-style rule engine for request records.
//!
//! This crate evaluates declarative rule expressions against records:
//! - [`Record`] describes a value as named fields with declared rules
//! - [`RuleEngine`] compiles and caches rules per type and reports violations
//! - [`RuleSet`] declares rules for a type outside its definition
//!
//! Rule vocabulary: `required`, `omitempty`, `len`, `min`, `max`, `eq`, `ne`,
//! `gt`, `gte`, `lt`, `lte`, `oneof`, `email`, `url`, `uuid`, `alpha`,
//! `alphanum`, `numeric`, `contains`, `startswith`, `endswith`, plus custom
//! rules registered with [`RuleEngine::register_rule`].

mod engine;
mod error;
mod record;
mod rule;

pub use engine::{RuleEngine, RuleSet};
pub use error::{CompileError, Error, FieldError, FieldErrors};
pub use record::{Field, FieldValue, Record};
pub use rule::RuleFn;
