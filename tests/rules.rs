mod common;

use common::{HelloRequest, hello, violation_fields};
use grpc_validate::{
    Field, FieldValue, Record, RuleSet, TypeRuleSet, ValidateRequestExt, ValidationError,
    Validator, validatable,
};
use tonic::Status;

#[derive(Debug, Default)]
struct Profile {
    nickname: String,
    age: u32,
}

impl Record for Profile {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::new("Nickname", &self.nickname),
            Field::new("Age", &self.age).rules("lte=150"),
        ]
    }
}

validatable!(Profile);

#[test]
fn registered_rules_apply_to_the_named_type_only() {
    let validator = Validator::new();
    let rules = TypeRuleSet::new()
        .with_type::<Profile>(RuleSet::new().with("Nickname", "required"));
    let profile = Profile::default();

    validator.register_rules(&rules, &[&profile, &hello("x")]);

    let status = Status::from(validator.validate(&profile).unwrap_err());
    assert_eq!(violation_fields(&status), ["Nickname"]);

    let status = Status::from(validator.validate(&hello("")).unwrap_err());
    assert_eq!(violation_fields(&status), ["Name"]);
}

#[test]
fn registration_with_unrelated_instance_is_a_no_op() {
    let validator = Validator::new();
    let rules = TypeRuleSet::new()
        .with_type::<Profile>(RuleSet::new().with("Nickname", "required"));

    validator.register_rules(&rules, &[&hello("x")]);

    assert!(validator.validate(&Profile::default()).is_ok());
    assert!(validator.validate(&hello("")).is_err());
}

#[test]
fn custom_rules_are_available_through_the_engine() {
    let validator = Validator::new();
    validator
        .engine()
        .register_rule("lowercase", |value: &FieldValue<'_>, _: Option<&str>| {
            value
                .as_str()
                .is_none_or(|s| s.chars().all(|c| !c.is_uppercase()))
        });
    validator.register_rules(
        &TypeRuleSet::new().with_type::<Profile>(RuleSet::new().with("Nickname", "lowercase")),
        &[&Profile::default()],
    );

    let shouting = Profile {
        nickname: "LOUD".into(),
        age: 30,
    };
    let err = validator.validate(&shouting).unwrap_err();
    assert!(err.to_string().contains("failed on the 'lowercase' tag"));
}

#[test]
fn collection_errors_render_with_indices() {
    let validator = Validator::new();
    let batch = vec![hello("a"), hello(""), hello("c")];

    let err = validator.validate(&batch).unwrap_err();
    let expected = validator.validate(&batch[1]).unwrap_err().to_string();
    assert_eq!(err.to_string(), format!("[1]: {expected}"));
    assert!(matches!(err, ValidationError::Elements(_)));
}

#[test]
fn exclusions_skip_only_the_named_fields() {
    let too_old = Profile {
        nickname: String::new(),
        age: 200,
    };

    let status = too_old.validate_except_or_status(&["Nickname"]).unwrap_err();
    assert_eq!(violation_fields(&status), ["Age"]);
    assert!(too_old.validate_except_or_status(&["Age"]).is_ok());
}

#[test]
fn global_validator_backs_the_handler_helpers() {
    assert!(hello("ok").validate_or_status().is_ok());
    assert!(HelloRequest::default().validate_or_status().is_err());
}
