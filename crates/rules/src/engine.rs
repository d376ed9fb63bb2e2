//! Rule engine: evaluates declared rules over a [`Record`].
//!
//! Compiled rules are cached per record type on first evaluation. Rule maps
//! registered for a type override the declared rule of the same field and
//! must be registered before the type is first evaluated.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CompileError, Error, FieldError, FieldErrors};
use crate::record::{Field, FieldValue, Record, short_type_name};
use crate::rule::{self, CompiledRule, Origin, RuleFn};

/// Field name → rule expression, declared outside the type definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet(HashMap<String, String>);

impl RuleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, expression: impl Into<String>) -> Self {
        self.insert(field, expression);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, expression: impl Into<String>) {
        self.0.insert(field.into(), expression.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RuleSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

type CompiledRecord = HashMap<&'static str, Vec<CompiledRule>>;

/// Evaluates rule expressions on records.
#[derive(Default)]
pub struct RuleEngine {
    struct_rules: RwLock<HashMap<String, RuleSet>>,
    compiled: RwLock<HashMap<&'static str, Arc<CompiledRecord>>>,
    custom: RwLock<HashMap<String, RuleFn>>,
}

impl RuleEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule map for the type named `type_name`.
    pub fn register_struct_rules(&self, type_name: &str, rules: RuleSet) {
        if read(&self.compiled).contains_key(type_name) {
            warn!(
                type_name,
                "Rules registered after first validation of type, they will not take effect"
            );
        }
        debug!(type_name, fields = rules.len(), "Registering struct rules");
        write(&self.struct_rules).insert(type_name.to_string(), rules);
    }

    /// Register a custom rule usable by name in rule expressions.
    ///
    /// A custom rule shadows a built-in rule with the same name.
    pub fn register_rule<F>(&self, name: &str, rule: F)
    where
        F: Fn(&FieldValue<'_>, Option<&str>) -> bool + Send + Sync + 'static,
    {
        debug!(rule = name, "Registering custom rule");
        write(&self.custom).insert(name.to_string(), Arc::new(rule));
    }

    /// Whether rules for the type have already been compiled and cached.
    #[must_use]
    pub fn is_compiled(&self, type_name: &str) -> bool {
        read(&self.compiled).contains_key(type_name)
    }

    /// Validate every field of `record`.
    ///
    /// # Errors
    /// [`Error::Invalid`] with one entry per failing field, or
    /// [`Error::Compile`] if a rule expression cannot be compiled.
    pub fn validate_record(&self, record: &dyn Record) -> Result<(), Error> {
        self.validate_record_except(record, &[])
    }

    /// Validate `record`, skipping the named fields.
    ///
    /// Names are relative to `record`: `"Name"` for a direct field,
    /// `"Address.City"` for a field of a nested record.
    ///
    /// # Errors
    /// Same as [`RuleEngine::validate_record`].
    pub fn validate_record_except(&self, record: &dyn Record, excluded: &[&str]) -> Result<(), Error> {
        let mut errors = FieldErrors::default();
        let root = short_type_name(record.type_name());
        self.walk(record, root, "", excluded, &mut errors)?;
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Invalid(errors))
        }
    }

    fn walk(
        &self,
        record: &dyn Record,
        namespace: &str,
        path: &str,
        excluded: &[&str],
        errors: &mut FieldErrors,
    ) -> Result<(), CompileError> {
        let fields = record.fields();
        let compiled = self.compiled_rules(record, &fields)?;

        for field in &fields {
            let relative = if path.is_empty() {
                field.name().to_string()
            } else {
                format!("{path}.{}", field.name())
            };
            if excluded.contains(&relative.as_str()) {
                continue;
            }

            let field_namespace = format!("{namespace}.{}", field.name());
            let value = field.value();
            let rules = compiled
                .get(field.name())
                .map(Vec::as_slice)
                .unwrap_or_default();

            if let Some(failed) = first_failure(rules, &value) {
                errors.push(FieldError::new(
                    field_namespace,
                    field.name(),
                    failed.name(),
                    failed.param(),
                ));
                continue;
            }

            if let FieldValue::Record(nested) = value {
                self.walk(nested, &field_namespace, &relative, excluded, errors)?;
            }
        }
        Ok(())
    }

    fn compiled_rules(
        &self,
        record: &dyn Record,
        fields: &[Field<'_>],
    ) -> Result<Arc<CompiledRecord>, CompileError> {
        let type_name = record.type_name();
        if let Some(cached) = read(&self.compiled).get(type_name) {
            return Ok(Arc::clone(cached));
        }

        let overrides = read(&self.struct_rules).get(type_name).cloned();
        let custom = read(&self.custom);
        let mut compiled = CompiledRecord::with_capacity(fields.len());
        for field in fields {
            let expression = overrides
                .as_ref()
                .and_then(|rules| rules.get(field.name()))
                .unwrap_or_else(|| field.declared_rules());
            let origin = Origin {
                record: short_type_name(type_name),
                field: field.name(),
            };
            let rules = rule::compile(expression, &origin, |name| custom.get(name).cloned())?;
            compiled.insert(field.name(), rules);
        }
        drop(custom);

        let compiled = Arc::new(compiled);
        write(&self.compiled)
            .entry(type_name)
            .or_insert_with(|| Arc::clone(&compiled));
        debug!(type_name, "Compiled rules cached");
        Ok(compiled)
    }
}

/// First rule that rejects `value`; `omitempty` stops evaluation on zero values.
fn first_failure<'r>(rules: &'r [CompiledRule], value: &FieldValue<'_>) -> Option<&'r CompiledRule> {
    for rule in rules {
        if rule.is_omit_empty() {
            if value.is_zero() {
                return None;
            }
            continue;
        }
        if matches!(value, FieldValue::Nil) || !rule.check(value) {
            return Some(rule);
        }
    }
    None
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
