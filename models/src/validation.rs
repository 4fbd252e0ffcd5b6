// models/src/validation.rs
//
// Schema boundary for registration input. The raw JSON object is pulled
// apart field by field into `RegistrationPayload` (every field optional, so
// a partial or wrongly-typed object still yields a payload) and one
// `validate()` pass collects every violation before anything downstream
// runs. A type mismatch on one field is reported against that field and
// never suppresses violations on the others.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::account::{RegistrationRequest, DEFAULT_ROLE};

/// Declaration order of the schema fields; violation reports follow it.
const FIELD_ORDER: [&str; 9] = [
    "username",
    "password",
    "email",
    "first_name",
    "last_name",
    "role",
    "profile_picture",
    "phone",
    "preferred_contact_method",
];

/// Untrusted registration input. Only `validate_registration` is allowed to
/// touch the raw JSON value; the constraint set lives here as data, driving
/// both validation and the per-field messages.
#[derive(Debug, Clone, Validate)]
pub struct RegistrationPayload {
    #[validate(
        required(message = "username is required"),
        length(min = 3, message = "username must be at least 3 characters")
    )]
    pub username: Option<String>,
    #[validate(
        required(message = "password is required"),
        length(min = 6, message = "password must be at least 6 characters")
    )]
    pub password: Option<String>,
    #[validate(
        required(message = "email is required"),
        email(message = "email must be a valid email address")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "firstName is required"),
        length(min = 1, message = "firstName must not be empty")
    )]
    pub first_name: Option<String>,
    #[validate(
        required(message = "lastName is required"),
        length(min = 1, message = "lastName must not be empty")
    )]
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub profile_picture: Option<String>,
    pub phone: Option<String>,
    pub preferred_contact_method: Option<String>,
}

/// A single schema violation, reported with the wire-format field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldViolation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validates an arbitrary JSON value against the registration schema.
///
/// All-or-nothing: either every constraint holds and a fully typed
/// `RegistrationRequest` comes back (with `role` defaulted), or the full
/// list of violations does. No side effects.
pub fn validate_registration(input: Value) -> Result<RegistrationRequest, Vec<FieldViolation>> {
    let Value::Object(map) = input else {
        return Err(vec![FieldViolation::new(
            "payload",
            "registration input must be a JSON object",
        )]);
    };

    // Pull each schema field out individually so a mismatch on one field
    // stays scoped to it while the rest keep collecting.
    let mut type_violations = Vec::new();
    let payload = RegistrationPayload {
        username: string_field(&map, "username", &mut type_violations),
        password: string_field(&map, "password", &mut type_violations),
        email: string_field(&map, "email", &mut type_violations),
        first_name: string_field(&map, "firstName", &mut type_violations),
        last_name: string_field(&map, "lastName", &mut type_violations),
        role: string_field(&map, "role", &mut type_violations),
        profile_picture: string_field(&map, "profilePicture", &mut type_violations),
        phone: string_field(&map, "phone", &mut type_violations),
        preferred_contact_method: string_field(&map, "preferredContactMethod", &mut type_violations),
    };

    let schema_errors = payload.validate().err();
    let field_errors = schema_errors
        .as_ref()
        .map(|errors| errors.field_errors())
        .unwrap_or_default();

    let mut violations = Vec::new();
    for field in FIELD_ORDER {
        let wire = wire_name(field);
        // A wrongly-typed field extracts as absent; its type violation
        // stands in for the `required` one that absence would add.
        if let Some(violation) = type_violations.iter().find(|v| v.field == wire) {
            violations.push(violation.clone());
            continue;
        }
        if let Some(errs) = field_errors.get(field) {
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                violations.push(FieldViolation::new(wire.clone(), message));
            }
        }
    }
    if !violations.is_empty() {
        return Err(violations);
    }

    // `required` above guarantees the unwraps below never fire.
    Ok(RegistrationRequest {
        username: payload.username.unwrap_or_default(),
        password: payload.password.unwrap_or_default(),
        email: payload.email.unwrap_or_default(),
        first_name: payload.first_name.unwrap_or_default(),
        last_name: payload.last_name.unwrap_or_default(),
        role: payload.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        profile_picture: payload.profile_picture,
        phone: payload.phone,
        preferred_contact_method: payload.preferred_contact_method,
    })
}

/// Extracts an optional string field, recording a field-scoped violation
/// when the value is present with the wrong type.
fn string_field(
    map: &Map<String, Value>,
    wire: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    match map.get(wire) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            violations.push(FieldViolation::new(
                wire,
                format!("{} must be a string, received {}", wire, json_type_name(other)),
            ));
            None
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// snake_case schema field name to its camelCase wire name.
fn wire_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for ch in field.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{validate_registration, wire_name};
    use serde_json::json;

    #[test]
    fn should_accept_valid_payload_and_default_role() {
        let request = validate_registration(json!({
            "username": "alice",
            "password": "secret1",
            "email": "alice@example.com",
            "firstName": "Alice",
            "lastName": "Smith"
        }))
        .unwrap();

        assert_eq!(request.username, "alice");
        assert_eq!(request.role, "patient");
        assert_eq!(request.profile_picture, None);
    }

    #[test]
    fn should_keep_explicit_role() {
        let request = validate_registration(json!({
            "username": "bob",
            "password": "secret1",
            "email": "bob@example.com",
            "firstName": "Bob",
            "lastName": "Stone",
            "role": "doctor",
            "phone": "555-0100"
        }))
        .unwrap();

        assert_eq!(request.role, "doctor");
        assert_eq!(request.phone.as_deref(), Some("555-0100"));
    }

    #[test]
    fn should_reject_short_username() {
        let violations = validate_registration(json!({
            "username": "ab",
            "password": "secret1",
            "email": "a@b.com",
            "firstName": "A",
            "lastName": "B"
        }))
        .unwrap_err();

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "username");
        assert_eq!(violations[0].message, "username must be at least 3 characters");
    }

    #[test]
    fn should_collect_all_violations_in_one_pass() {
        let violations = validate_registration(json!({
            "username": "ab",
            "password": "short",
            "email": "not-an-email",
            "lastName": ""
        }))
        .unwrap_err();

        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["username", "password", "email", "firstName", "lastName"]
        );
    }

    #[test]
    fn should_reject_missing_required_fields() {
        let violations = validate_registration(json!({})).unwrap_err();
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["username", "password", "email", "firstName", "lastName"]
        );
        assert!(violations.iter().any(|v| v.message == "username is required"));
    }

    #[test]
    fn should_reject_non_object_payload() {
        let violations = validate_registration(json!("not an object")).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "payload");
    }

    #[test]
    fn should_scope_type_mismatch_to_its_field() {
        let violations = validate_registration(json!({
            "username": 42,
            "password": "secret1",
            "email": "a@b.com",
            "firstName": "A",
            "lastName": "B"
        }))
        .unwrap_err();

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "username");
        assert_eq!(violations[0].message, "username must be a string, received number");
    }

    #[test]
    fn should_keep_collecting_past_a_type_mismatch() {
        let violations = validate_registration(json!({
            "username": 42,
            "password": "short",
            "email": "not-an-email",
            "firstName": "A",
            "lastName": "B"
        }))
        .unwrap_err();

        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["username", "password", "email"]);
        assert_eq!(violations[0].message, "username must be a string, received number");
        assert_eq!(violations[1].message, "password must be at least 6 characters");
        assert_eq!(violations[2].message, "email must be a valid email address");
    }

    #[test]
    fn should_type_check_optional_fields_too() {
        let violations = validate_registration(json!({
            "username": "alice",
            "password": "secret1",
            "email": "alice@example.com",
            "firstName": "Alice",
            "lastName": "Smith",
            "role": ["patient"]
        }))
        .unwrap_err();

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "role");
        assert_eq!(violations[0].message, "role must be a string, received array");
    }

    #[test]
    fn should_camel_case_wire_names() {
        assert_eq!(wire_name("first_name"), "firstName");
        assert_eq!(wire_name("preferred_contact_method"), "preferredContactMethod");
        assert_eq!(wire_name("username"), "username");
    }
}
