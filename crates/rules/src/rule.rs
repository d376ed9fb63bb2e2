//! Rule expressions: parsing, compilation and evaluation.
//!
//! An expression is a comma-separated list of rules, each either `name` or
//! `name=param`, e.g. `"required,min=3,max=64"`. Rules on a field are checked
//! in order and evaluation stops at the first failure.

use std::sync::Arc;

use uuid::Uuid;
use validator::{ValidateEmail, ValidateUrl};

use crate::error::CompileError;
use crate::record::FieldValue;

/// Custom rule function: receives the field value and the optional parameter.
pub type RuleFn = Arc<dyn Fn(&FieldValue<'_>, Option<&str>) -> bool + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cmp {
    Len,
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

#[derive(Clone)]
enum Check {
    Required,
    OmitEmpty,
    Compare { op: Cmp, bound: f64 },
    OneOf(Vec<String>),
    Email,
    Url,
    Uuid,
    Alpha,
    Alphanum,
    Numeric,
    Contains,
    StartsWith,
    EndsWith,
    Custom(RuleFn),
}

/// A rule ready for evaluation.
#[derive(Clone)]
pub(crate) struct CompiledRule {
    name: String,
    param: Option<String>,
    check: Check,
}

/// Where a rule expression was declared, for error reporting.
pub(crate) struct Origin<'a> {
    pub record: &'a str,
    pub field: &'a str,
}

impl CompiledRule {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn param(&self) -> Option<&str> {
        self.param.as_deref()
    }

    pub(crate) const fn is_omit_empty(&self) -> bool {
        matches!(self.check, Check::OmitEmpty)
    }

    /// Evaluate the rule against a non-nil value.
    pub(crate) fn check(&self, value: &FieldValue<'_>) -> bool {
        let param = self.param.as_deref().unwrap_or_default();
        match &self.check {
            Check::Required => !value.is_zero(),
            Check::OmitEmpty => true,
            Check::Compare { op, bound } => compare(*op, value, param, *bound),
            Check::OneOf(options) => one_of(value, options),
            Check::Email => value.as_str().is_some_and(|s| s.validate_email()),
            Check::Url => value.as_str().is_some_and(|s| s.validate_url()),
            Check::Uuid => value.as_str().is_some_and(|s| Uuid::parse_str(s).is_ok()),
            Check::Alpha => str_all(value, char::is_alphabetic),
            Check::Alphanum => str_all(value, char::is_alphanumeric),
            Check::Numeric => value.as_str().is_some_and(is_numeric),
            Check::Contains => value.as_str().is_some_and(|s| s.contains(param)),
            Check::StartsWith => value.as_str().is_some_and(|s| s.starts_with(param)),
            Check::EndsWith => value.as_str().is_some_and(|s| s.ends_with(param)),
            Check::Custom(f) => f(value, self.param.as_deref()),
        }
    }
}

/// Compile an expression, resolving custom rule names through `custom`.
pub(crate) fn compile(
    expression: &str,
    origin: &Origin<'_>,
    custom: impl Fn(&str) -> Option<RuleFn>,
) -> Result<Vec<CompiledRule>, CompileError> {
    expression
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (name, param) = match part.split_once('=') {
                Some((name, param)) => (name.trim(), Some(param.trim())),
                None => (part, None),
            };
            let check = match custom(name) {
                Some(f) => Check::Custom(f),
                None => builtin(name, param, origin)?,
            };
            Ok(CompiledRule {
                name: name.to_string(),
                param: param.map(str::to_string),
                check,
            })
        })
        .collect()
}

fn builtin(name: &str, param: Option<&str>, origin: &Origin<'_>) -> Result<Check, CompileError> {
    let cmp = match name {
        "required" => return Ok(Check::Required),
        "omitempty" => return Ok(Check::OmitEmpty),
        "email" => return Ok(Check::Email),
        "url" => return Ok(Check::Url),
        "uuid" => return Ok(Check::Uuid),
        "alpha" => return Ok(Check::Alpha),
        "alphanum" => return Ok(Check::Alphanum),
        "numeric" => return Ok(Check::Numeric),
        "oneof" => {
            let options = require_param(name, param, origin)?
                .split_whitespace()
                .map(str::to_string)
                .collect();
            return Ok(Check::OneOf(options));
        }
        "contains" | "startswith" | "endswith" => {
            require_param(name, param, origin)?;
            return Ok(match name {
                "contains" => Check::Contains,
                "startswith" => Check::StartsWith,
                _ => Check::EndsWith,
            });
        }
        "len" => Cmp::Len,
        "eq" => Cmp::Eq,
        "ne" => Cmp::Ne,
        "gt" => Cmp::Gt,
        "gte" | "min" => Cmp::Gte,
        "lt" => Cmp::Lt,
        "lte" | "max" => Cmp::Lte,
        _ => {
            return Err(CompileError::UnknownRule {
                record: origin.record.to_string(),
                field: origin.field.to_string(),
                rule: name.to_string(),
            });
        }
    };

    let raw = require_param(name, param, origin)?;
    // eq/ne may compare strings by content, so a non-numeric bound is fine there
    let bound = match raw.parse::<f64>() {
        Ok(bound) => bound,
        Err(_) if matches!(cmp, Cmp::Eq | Cmp::Ne) => f64::NAN,
        Err(_) => {
            return Err(CompileError::InvalidParam {
                record: origin.record.to_string(),
                field: origin.field.to_string(),
                rule: name.to_string(),
                param: raw.to_string(),
            });
        }
    };
    Ok(Check::Compare { op: cmp, bound })
}

fn require_param<'p>(
    name: &str,
    param: Option<&'p str>,
    origin: &Origin<'_>,
) -> Result<&'p str, CompileError> {
    param.filter(|p| !p.is_empty()).ok_or_else(|| CompileError::MissingParam {
        record: origin.record.to_string(),
        field: origin.field.to_string(),
        rule: name.to_string(),
    })
}

#[allow(clippy::float_cmp)]
fn compare(op: Cmp, value: &FieldValue<'_>, raw: &str, bound: f64) -> bool {
    if let FieldValue::Str(s) = value {
        match op {
            Cmp::Eq => return *s == raw,
            Cmp::Ne => return *s != raw,
            _ => {}
        }
    }
    if let FieldValue::Bool(b) = value {
        return match op {
            Cmp::Eq => raw.parse::<bool>().is_ok_and(|p| p == *b),
            Cmp::Ne => raw.parse::<bool>().is_ok_and(|p| p != *b),
            _ => false,
        };
    }

    let Some(measure) = value.measure() else {
        return false;
    };
    match op {
        Cmp::Len | Cmp::Eq => measure == bound,
        Cmp::Ne => measure != bound,
        Cmp::Gt => measure > bound,
        Cmp::Gte => measure >= bound,
        Cmp::Lt => measure < bound,
        Cmp::Lte => measure <= bound,
    }
}

fn one_of(value: &FieldValue<'_>, options: &[String]) -> bool {
    match *value {
        FieldValue::Str(s) => options.iter().any(|o| o == s),
        FieldValue::Int(n) => options.iter().any(|o| o.parse::<i64>() == Ok(n)),
        FieldValue::Uint(n) => options.iter().any(|o| o.parse::<u64>() == Ok(n)),
        _ => false,
    }
}

fn str_all(value: &FieldValue<'_>, pred: fn(char) -> bool) -> bool {
    value
        .as_str()
        .is_some_and(|s| !s.is_empty() && s.chars().all(pred))
}

/// Optional sign, digits, then optionally `.` and more digits.
fn is_numeric(s: &str) -> bool {
    let unsigned = s.strip_prefix(['-', '+']).unwrap_or(s);
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    match unsigned.split_once('.') {
        Some((whole, fraction)) => all_digits(whole) && all_digits(fraction),
        None => all_digits(unsigned),
    }
}
