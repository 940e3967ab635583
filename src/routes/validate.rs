//! Pre-flight body validation for auth endpoints.
//!
//! Runs before any upstream call so an obviously incomplete payload is
//! answered with 400 immediately instead of wasting a round-trip.
//! Validators return the names of missing required fields; an empty list
//! means the payload may proceed.

use serde_json::Value;

/// Required fields for `/api/auth/register`.
const REGISTRATION_FIELDS: &[&str] = &["email", "password", "firstName", "lastName"];

pub fn registration(body: &Value) -> Vec<String> {
    REGISTRATION_FIELDS
        .iter()
        .filter(|field| !has_field(body, field))
        .map(|field| field.to_string())
        .collect()
}

/// `/api/auth/login` accepts either `email` or `usernameOrEmail` as the
/// identifier, plus `password`.
pub fn login(body: &Value) -> Vec<String> {
    let mut missing = Vec::new();
    if !has_field(body, "email") && !has_field(body, "usernameOrEmail") {
        missing.push("email".to_string());
    }
    if !has_field(body, "password") {
        missing.push("password".to_string());
    }
    missing
}

/// A field counts as present when it exists, is not null, and is not a
/// blank string.
fn has_field(body: &Value, field: &str) -> bool {
    match body.get(field) {
        Some(Value::Null) | None => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registration_reports_missing_email() {
        let body = json!({"password": "pw", "firstName": "A", "lastName": "B"});
        assert_eq!(registration(&body), vec!["email".to_string()]);
    }

    #[test]
    fn test_registration_complete_payload_passes() {
        let body = json!({
            "email": "a@b.edu",
            "password": "pw",
            "firstName": "A",
            "lastName": "B",
            "role": "student"
        });
        assert!(registration(&body).is_empty());
    }

    #[test]
    fn test_blank_string_counts_as_missing() {
        let body = json!({"email": "  ", "password": "pw", "firstName": "A", "lastName": "B"});
        assert_eq!(registration(&body), vec!["email".to_string()]);
    }

    #[test]
    fn test_login_accepts_username_or_email() {
        let body = json!({"usernameOrEmail": "student1", "password": "pw"});
        assert!(login(&body).is_empty());

        let body = json!({"password": "pw"});
        assert_eq!(login(&body), vec!["email".to_string()]);
    }
}
