//! Validation façade over the rule engine.
//!
//! A [`Validator`] owns one [`RuleEngine`], built on first use. Inputs of any
//! [`Shape`] are normalized into a single validation path:
//!
//! | Shape | Outcome |
//! |-------|---------|
//! | `Nil` | valid |
//! | `Record` | rule engine, honoring excluded fields |
//! | `Pointer` | pointee validated, exclusions dropped |
//! | `NullPointer` | zero value of the pointee validated |
//! | `Sequence` | each element validated, failures aggregated by index |
//! | `Other` | valid |

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::debug;
use validate_rules::{Record, RuleEngine, RuleSet};

use crate::config::{ConfigError, ValidationConfig};
use crate::error::{ElementErrors, ValidationError};
use crate::shape::{Shape, Validatable};

/// Process-wide default validator.
static DEFAULT: LazyLock<Arc<Validator>> = LazyLock::new(|| Arc::new(Validator::new()));

/// Fully-qualified type name → rules for that type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRuleSet(HashMap<String, RuleSet>);

impl TypeRuleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert keyed by the Rust type.
    #[must_use]
    pub fn with_type<T: ?Sized>(mut self, rules: RuleSet) -> Self {
        self.insert(std::any::type_name::<T>(), rules);
        self
    }

    pub fn insert(&mut self, type_name: impl Into<String>, rules: RuleSet) {
        self.0.insert(type_name.into(), rules);
    }

    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&RuleSet> {
        self.0.get(type_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleSet)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
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

impl<K: Into<String>> FromIterator<(K, RuleSet)> for TypeRuleSet {
    fn from_iter<I: IntoIterator<Item = (K, RuleSet)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Validates request values with a lazily built [`RuleEngine`].
pub struct Validator {
    engine: OnceLock<RuleEngine>,
    log_violations: bool,
}

impl Validator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            engine: OnceLock::new(),
            log_violations: true,
        }
    }

    /// Create a validator honoring `config`.
    #[must_use]
    pub const fn with_config(config: &ValidationConfig) -> Self {
        Self {
            engine: OnceLock::new(),
            log_violations: config.log_violations,
        }
    }

    /// Create a validator honoring `config`, with its rules file registered.
    ///
    /// Every type listed in the file receives its rules, keyed by the full
    /// type name.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the rules file cannot be loaded.
    pub fn from_config(config: &ValidationConfig) -> Result<Self, ConfigError> {
        let validator = Self::with_config(config);
        if let Some(rules) = config.load_rules()? {
            let engine = validator.engine();
            for (type_name, set) in rules.iter() {
                engine.register_struct_rules(type_name, set.clone());
            }
        }
        Ok(validator)
    }

    /// Shared default validator.
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(&DEFAULT)
    }

    /// Underlying rule engine, built on first access.
    pub fn engine(&self) -> &RuleEngine {
        self.engine.get_or_init(|| {
            debug!("Initializing rule engine");
            RuleEngine::new()
        })
    }

    /// Whether rejected requests are logged by the interceptors.
    #[must_use]
    pub const fn logs_violations(&self) -> bool {
        self.log_violations
    }

    /// Register rules for the types of `instances` found in `rules`.
    ///
    /// Instances whose type has no entry are skipped. Call at startup,
    /// before the types are first validated.
    pub fn register_rules(&self, rules: &TypeRuleSet, instances: &[&dyn Record]) {
        let engine = self.engine();
        for instance in instances {
            let type_name = instance.type_name();
            if let Some(set) = rules.get(type_name) {
                engine.register_struct_rules(type_name, set.clone());
            }
        }
    }

    /// Validate `value` whatever its shape.
    ///
    /// # Errors
    /// Returns the violations found; see [`ValidationError`].
    pub fn validate<V: Validatable + ?Sized>(&self, value: &V) -> Result<(), ValidationError> {
        self.validate_shape(value.shape(), &[])
    }

    /// Same as [`Validator::validate`]; only records, pointers to records and
    /// collections of them produce errors.
    ///
    /// # Errors
    /// Returns the violations found; see [`ValidationError`].
    pub fn validate_struct<V: Validatable + ?Sized>(
        &self,
        value: &V,
    ) -> Result<(), ValidationError> {
        self.validate(value)
    }

    /// Validate `value`, skipping `fields` when `value` is itself a record.
    ///
    /// # Errors
    /// Returns the violations found; see [`ValidationError`].
    pub fn validate_except<V: Validatable + ?Sized>(
        &self,
        value: &V,
        fields: &[&str],
    ) -> Result<(), ValidationError> {
        self.validate_shape(value.shape(), fields)
    }

    pub(crate) fn validate_shape(
        &self,
        shape: Shape<'_>,
        fields: &[&str],
    ) -> Result<(), ValidationError> {
        match shape {
            Shape::Nil | Shape::Other => Ok(()),
            Shape::Record(record) => self.validate_record(record, fields),
            Shape::Pointer(pointee) => self.validate(pointee),
            Shape::NullPointer(zero) => self.validate(zero.as_ref()),
            Shape::Sequence(elements) => {
                let outcomes = elements.map(|e| self.validate(e).err()).collect();
                ElementErrors::collect(outcomes).map_or(Ok(()), |errors| {
                    Err(ValidationError::Elements(errors))
                })
            }
        }
    }

    fn validate_record(&self, record: &dyn Record, fields: &[&str]) -> Result<(), ValidationError> {
        let engine = self.engine();
        if fields.is_empty() {
            engine.validate_record(record)?;
        } else {
            engine.validate_record_except(record, fields)?;
        }
        Ok(())
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use validate_rules::{Field, FieldError};

    use super::*;

    #[derive(Debug, Default, Clone)]
    struct Account {
        name: String,
        email: String,
    }

    impl Record for Account {
        fn fields(&self) -> Vec<Field<'_>> {
            vec![
                Field::new("Name", &self.name).rules("required"),
                Field::new("Email", &self.email).rules("omitempty,email"),
            ]
        }
    }

    #[derive(Debug, Default)]
    struct Invoice {
        number: String,
        memo: String,
    }

    impl Record for Invoice {
        fn fields(&self) -> Vec<Field<'_>> {
            vec![
                Field::new("Number", &self.number).rules("required"),
                Field::new("Memo", &self.memo),
            ]
        }
    }

    crate::validatable!(Account, Invoice);

    fn account(name: &str) -> Account {
        Account {
            name: name.into(),
            email: String::new(),
        }
    }

    fn failing_fields(err: &ValidationError) -> Vec<&str> {
        match err {
            ValidationError::Fields(errors) => errors.iter().map(FieldError::field).collect(),
            other => panic!("expected field errors, got {other:?}"),
        }
    }

    #[test]
    fn nil_input_is_valid() {
        let validator = Validator::new();
        assert!(validator.validate(&None::<Account>).is_ok());
    }

    #[test]
    fn valid_record_passes() {
        let validator = Validator::new();
        assert!(validator.validate(&account("ok")).is_ok());
    }

    #[test]
    fn single_violation_names_the_field() {
        let validator = Validator::new();
        let err = validator.validate(&account("")).unwrap_err();
        assert_eq!(failing_fields(&err), ["Name"]);
    }

    #[test]
    fn pointers_validate_their_pointee() {
        let validator = Validator::new();
        assert!(validator.validate(&Box::new(account("ok"))).is_ok());
        assert!(validator.validate(&Arc::new(account(""))).is_err());
    }

    #[test]
    fn null_pointer_validates_zero_record() {
        let validator = Validator::new();
        let err = validator.validate(&None::<Box<Account>>).unwrap_err();
        assert_eq!(failing_fields(&err), ["Name"]);
    }

    #[test]
    fn shared_null_pointers_validate_zero_record() {
        let validator = Validator::new();
        let err = validator.validate(&None::<Arc<Account>>).unwrap_err();
        assert_eq!(failing_fields(&err), ["Name"]);
        let err = validator
            .validate(&None::<std::rc::Rc<Account>>)
            .unwrap_err();
        assert_eq!(failing_fields(&err), ["Name"]);
    }

    #[test]
    fn collection_errors_keep_element_index() {
        let validator = Validator::new();
        let accounts = vec![account("a"), account(""), account("c")];

        let err = validator.validate(&accounts).unwrap_err();
        let b_message = validator.validate(&accounts[1]).unwrap_err().to_string();
        assert_eq!(err.to_string(), format!("[1]: {b_message}"));
        let ValidationError::Elements(elements) = err else {
            panic!("expected element errors");
        };
        assert_eq!(elements.len(), 3);
        assert!(elements.get(1).is_some());
    }

    #[test]
    fn passing_collection_is_valid() {
        let validator = Validator::new();
        assert!(validator.validate(&[account("a"), account("b")]).is_ok());
        assert!(validator.validate(&Vec::<Account>::new()).is_ok());
    }

    #[test]
    fn nested_collections_aggregate_uniformly() {
        let validator = Validator::new();
        let batches = vec![vec![account("a")], vec![account("b"), account("")]];

        let err = validator.validate(&batches).unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.starts_with("[1]: [1]: "));
    }

    #[test]
    fn other_shapes_are_valid() {
        let validator = Validator::new();
        assert!(validator.validate(&42_u8).is_ok());
        assert!(validator.validate("").is_ok());
        assert!(validator.validate(&HashMap::<String, Account>::new()).is_ok());
    }

    #[test]
    fn excluded_fields_are_never_reported() {
        let validator = Validator::new();
        let bad = Account {
            name: String::new(),
            email: "not-an-email".into(),
        };

        let err = validator.validate_except(&bad, &["Name"]).unwrap_err();
        assert_eq!(failing_fields(&err), ["Email"]);
        assert!(validator.validate_except(&account(""), &["Name"]).is_ok());
    }

    #[test]
    fn exclusions_do_not_follow_pointers() {
        let validator = Validator::new();
        let err = validator
            .validate_except(&Box::new(account("")), &["Name"])
            .unwrap_err();
        assert_eq!(failing_fields(&err), ["Name"]);
    }

    #[test]
    fn registered_rules_apply_only_to_matching_types() {
        let validator = Validator::new();
        let rules = TypeRuleSet::new().with_type::<Invoice>(RuleSet::new().with("Memo", "required"));
        let invoice = Invoice {
            number: "INV-1".into(),
            memo: String::new(),
        };

        validator.register_rules(&rules, &[&invoice, &account("x")]);

        let err = validator.validate(&invoice).unwrap_err();
        assert_eq!(failing_fields(&err), ["Memo"]);
        assert!(validator.validate(&account("x")).is_ok());
        let err = validator.validate(&account("")).unwrap_err();
        assert_eq!(failing_fields(&err), ["Name"]);
    }

    #[test]
    fn config_rules_are_registered_by_type_name() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let rules = format!(
            r#"{{"{}": {{"Memo": "required"}}}}"#,
            std::any::type_name::<Invoice>()
        );
        std::io::Write::write_all(&mut file, rules.as_bytes()).unwrap();
        let config = ValidationConfig {
            rules_file: Some(file.path().to_path_buf()),
            log_violations: false,
        };

        let validator = Validator::from_config(&config).unwrap();
        let invoice = Invoice {
            number: "INV-2".into(),
            memo: String::new(),
        };
        assert!(!validator.logs_violations());
        assert_eq!(failing_fields(&validator.validate(&invoice).unwrap_err()), ["Memo"]);
    }

    #[test]
    fn struct_alias_matches_validate() {
        let validator = Validator::new();
        assert!(validator.validate_struct(&account("")).is_err());
        assert!(validator.validate_struct(&account("ok")).is_ok());
    }

    #[test]
    fn engine_is_initialized_once_under_concurrent_use() {
        let validator = Arc::new(Validator::new());
        let engines: Vec<usize> = (0..8)
            .map(|_| {
                let validator = Arc::clone(&validator);
                thread::spawn(move || {
                    validator.validate(&account("")).unwrap_err();
                    std::ptr::from_ref(validator.engine()) as usize
                })
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        assert!(engines.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn global_validator_is_shared() {
        assert!(Arc::ptr_eq(&Validator::global(), &Validator::global()));
    }
}
