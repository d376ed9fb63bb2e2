//! Field-level view of a record.
//!
//! Rust has no struct tags, so a record describes itself: each field carries
//! its name, a borrowed [`FieldValue`] and the rule expression declared for it.
//!
//! ```
//! use validate_rules::{Field, Record};
//!
//! #[derive(Default)]
//! struct SignUpRequest {
//!     email: String,
//!     password: String,
//! }
//!
//! impl Record for SignUpRequest {
//!     fn fields(&self) -> Vec<Field<'_>> {
//!         vec![
//!             Field::new("Email", &self.email).rules("required,email"),
//!             Field::new("Password", &self.password).rules("required,min=8"),
//!         ]
//!     }
//! }
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// A value whose fields can be checked by the [`RuleEngine`](crate::RuleEngine).
pub trait Record {
    /// Fully-qualified type name, the key for registered rule maps.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Fields in declaration order.
    fn fields(&self) -> Vec<Field<'_>>;
}

/// One field of a record together with its declared rules.
pub struct Field<'a> {
    name: &'static str,
    value: FieldValue<'a>,
    rules: &'static str,
}

impl<'a> Field<'a> {
    pub fn new(name: &'static str, value: impl Into<FieldValue<'a>>) -> Self {
        Self {
            name,
            value: value.into(),
            rules: "",
        }
    }

    /// A nested record, validated recursively.
    pub fn record<R: Record>(name: &'static str, value: &'a R) -> Self {
        Self::new(name, FieldValue::Record(value))
    }

    /// An optional nested record; `None` is a nil value.
    pub fn optional_record<R: Record>(name: &'static str, value: Option<&'a R>) -> Self {
        let value = value.map_or(FieldValue::Nil, |r| FieldValue::Record(r));
        Self::new(name, value)
    }

    /// Attach a rule expression such as `"required,min=3"`.
    #[must_use]
    pub const fn rules(mut self, rules: &'static str) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn value(&self) -> FieldValue<'a> {
        self.value
    }

    #[must_use]
    pub const fn declared_rules(&self) -> &'static str {
        self.rules
    }
}

/// Borrowed value of a field, reduced to what rules can inspect.
#[derive(Clone, Copy)]
pub enum FieldValue<'a> {
    Nil,
    Str(&'a str),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    /// Length of a collection or byte buffer.
    Len(usize),
    Record(&'a dyn Record),
}

impl FieldValue<'_> {
    /// Zero value semantics: empty, zero, false or nil.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match *self {
            Self::Nil => true,
            Self::Str(s) => s.is_empty(),
            Self::Int(n) => n == 0,
            Self::Uint(n) => n == 0,
            Self::Float(n) => n == 0.0,
            Self::Bool(b) => !b,
            Self::Len(n) => n == 0,
            Self::Record(_) => false,
        }
    }

    /// Numeric measure used by size rules: character count for strings,
    /// length for collections, the value itself for numbers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn measure(&self) -> Option<f64> {
        match *self {
            Self::Str(s) => Some(s.chars().count() as f64),
            Self::Int(n) => Some(n as f64),
            Self::Uint(n) => Some(n as f64),
            Self::Float(n) => Some(n),
            Self::Len(n) => Some(n as f64),
            Self::Nil | Self::Bool(_) | Self::Record(_) => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> Option<&str> {
        match *self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("Nil"),
            Self::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Self::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Self::Uint(n) => f.debug_tuple("Uint").field(n).finish(),
            Self::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Len(n) => f.debug_tuple("Len").field(n).finish(),
            Self::Record(r) => f.debug_tuple("Record").field(&r.type_name()).finish(),
        }
    }
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(value: &'a str) -> Self {
        Self::Str(value)
    }
}

impl<'a> From<&'a String> for FieldValue<'a> {
    fn from(value: &'a String) -> Self {
        Self::Str(value)
    }
}

impl From<&bool> for FieldValue<'_> {
    fn from(value: &bool) -> Self {
        Self::Bool(*value)
    }
}

macro_rules! from_number {
    ($variant:ident as $target:ty: $($ty:ty),+) => {
        $(
            impl From<&$ty> for FieldValue<'_> {
                fn from(value: &$ty) -> Self {
                    Self::$variant(<$target>::from(*value))
                }
            }
        )+
    };
}

from_number!(Int as i64: i8, i16, i32, i64);
from_number!(Uint as u64: u8, u16, u32, u64);
from_number!(Float as f64: f32, f64);

impl From<&usize> for FieldValue<'_> {
    fn from(value: &usize) -> Self {
        Self::Uint(*value as u64)
    }
}

impl From<&isize> for FieldValue<'_> {
    fn from(value: &isize) -> Self {
        Self::Int(*value as i64)
    }
}

impl<'a, T> From<&'a Option<T>> for FieldValue<'a>
where
    &'a T: Into<FieldValue<'a>>,
{
    fn from(value: &'a Option<T>) -> Self {
        value.as_ref().map_or(Self::Nil, Into::into)
    }
}

impl<T> From<&Vec<T>> for FieldValue<'_> {
    fn from(value: &Vec<T>) -> Self {
        Self::Len(value.len())
    }
}

impl<T> From<&[T]> for FieldValue<'_> {
    fn from(value: &[T]) -> Self {
        Self::Len(value.len())
    }
}

impl<K, V, S> From<&HashMap<K, V, S>> for FieldValue<'_> {
    fn from(value: &HashMap<K, V, S>) -> Self {
        Self::Len(value.len())
    }
}

impl<K, V> From<&BTreeMap<K, V>> for FieldValue<'_> {
    fn from(value: &BTreeMap<K, V>) -> Self {
        Self::Len(value.len())
    }
}

impl<T, S> From<&HashSet<T, S>> for FieldValue<'_> {
    fn from(value: &HashSet<T, S>) -> Self {
        Self::Len(value.len())
    }
}

/// Short type name used as the root of a namespace: `a::b::User<T>` → `User`.
pub(crate) fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
