/* 📖 # Why explicit validation functions?

Every value that comes off the wire (JSON bodies, path segments, query parameters) is
checked here and turned into a typed value or a list of field errors. The registry never
sees malformed input and never has to know what a valid email looks like.

Errors are collected per field instead of stopping at the first one, and are rendered in
the `{"detail": [{"loc": [...], "msg": ..., "type": ...}]}` shape that API clients of the
tutorial endpoints already expect.
*/

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::catalog::ItemCategory;
use crate::user::NewUser;

pub const NAME_MAX_CHARS: usize = 80;
pub const AGE_MAX: i64 = 120;
pub const EMAIL_MAX_CHARS: usize = 254;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$",
    )
    .expect("email pattern is a valid regex")
});

/// A single failed check, located by path (`["body", "email"]`, `["query", "x"]`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn new(loc: &[&str], msg: impl Into<String>, kind: &str) -> Self {
        Self {
            loc: loc.iter().map(|s| s.to_string()).collect(),
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }

    fn missing(loc: &[&str]) -> Self {
        Self::new(loc, "Field required", "missing")
    }
}

/// All field errors found in one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    detail: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.detail.push(error);
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.detail
    }

    pub fn is_empty(&self) -> bool {
        self.detail.is_empty()
    }

    /// `Ok(value)` if nothing was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self {
            detail: vec![error],
        }
    }
}

/// Turns a raw JSON body into a user candidate.
///
/// `name` (1-80 characters) and `email` are required; `age` is optional, must lie in
/// 0..=120 and falls back to `default_age` when absent or null.
pub fn validate_new_user(body: &[u8], default_age: u8) -> Result<NewUser, ValidationErrors> {
    let object = parse_object(body)?;
    let mut errors = ValidationErrors::new();

    let name = required_string(&object, "name", &mut errors).and_then(|name| {
        record(
            &mut errors,
            check_str_len(&["body", "name"], &name, 1, NAME_MAX_CHARS).map(|_| name),
        )
    });

    let email = required_string(&object, "email", &mut errors)
        .and_then(|email| record(&mut errors, check_email(&["body", "email"], &email).map(|_| email)));

    let age = match object.get("age") {
        None | Some(Value::Null) => Some(default_age),
        Some(value) => record(
            &mut errors,
            json_integer(&["body", "age"], value)
                .and_then(|age| check_range(&["body", "age"], age, 0, AGE_MAX))
                .map(|age| age as u8),
        ),
    };

    match (name, email, age) {
        (Some(name), Some(email), Some(age)) if errors.is_empty() => {
            Ok(NewUser::new(name, email, age))
        }
        _ => Err(errors),
    }
}

/// Extracts the required `text` field of an echo payload.
pub fn validate_echo(body: &[u8]) -> Result<String, ValidationErrors> {
    let object = parse_object(body)?;
    let mut errors = ValidationErrors::new();
    match required_string(&object, "text", &mut errors) {
        Some(text) => Ok(text),
        None => Err(errors),
    }
}

/// Parses an integer parameter and checks it lies in `min..=max`.
pub fn parse_int_param(loc: &[&str], raw: Option<&str>, min: i64, max: i64) -> Result<i64, FieldError> {
    let raw = raw.ok_or_else(|| FieldError::missing(loc))?;
    let value = raw.trim().parse::<i64>().map_err(|_| {
        FieldError::new(
            loc,
            "Input should be a valid integer, unable to parse string as an integer",
            "int_parsing",
        )
    })?;
    check_range(loc, value, min, max)
}

/// Checks a string's length in characters lies in `min..=max`.
pub fn check_str_len(loc: &[&str], raw: &str, min: usize, max: usize) -> Result<(), FieldError> {
    let len = raw.chars().count();
    if len < min {
        let unit = if min == 1 { "character" } else { "characters" };
        return Err(FieldError::new(
            loc,
            format!("String should have at least {} {}", min, unit),
            "string_too_short",
        ));
    }
    if len > max {
        let unit = if max == 1 { "character" } else { "characters" };
        return Err(FieldError::new(
            loc,
            format!("String should have at most {} {}", max, unit),
            "string_too_long",
        ));
    }
    Ok(())
}

/// Parses a boolean parameter; accepts true/false, 1/0, yes/no, on/off, t/f and y/n.
pub fn parse_bool_param(loc: &[&str], raw: &str) -> Result<bool, FieldError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "t" | "y" => Ok(true),
        "false" | "0" | "no" | "off" | "f" | "n" => Ok(false),
        _ => Err(FieldError::new(
            loc,
            "Input should be a valid boolean, unable to interpret input",
            "bool_parsing",
        )),
    }
}

/// Parses a category path segment.
pub fn parse_category(loc: &[&str], raw: &str) -> Result<ItemCategory, FieldError> {
    ItemCategory::from_str(raw).map_err(|_| {
        FieldError::new(
            loc,
            format!("Input should be {}", ItemCategory::expected_values()),
            "enum",
        )
    })
}

pub fn check_email(loc: &[&str], email: &str) -> Result<(), FieldError> {
    if email.chars().count() <= EMAIL_MAX_CHARS && EMAIL_RE.is_match(email) {
        return Ok(());
    }
    let reason = match email.split_once('@') {
        None => "An email address must have an @-sign.",
        Some(("", _)) => "There must be something before the @-sign.",
        Some((_, "")) => "There must be something after the @-sign.",
        Some(_) => "The email address is not valid.",
    };
    Err(FieldError::new(
        loc,
        format!("value is not a valid email address: {}", reason),
        "value_error",
    ))
}

fn check_range(loc: &[&str], value: i64, min: i64, max: i64) -> Result<i64, FieldError> {
    if value < min {
        return Err(FieldError::new(
            loc,
            format!("Input should be greater than or equal to {}", min),
            "greater_than_equal",
        ));
    }
    if value > max {
        return Err(FieldError::new(
            loc,
            format!("Input should be less than or equal to {}", max),
            "less_than_equal",
        ));
    }
    Ok(value)
}

fn parse_object(body: &[u8]) -> Result<Map<String, Value>, ValidationErrors> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        FieldError::new(&["body"], format!("JSON decode error: {}", e), "json_invalid")
    })?;
    match value {
        Value::Object(object) => Ok(object),
        _ => Err(FieldError::new(
            &["body"],
            "Input should be a valid dictionary or object to extract fields from",
            "model_attributes_type",
        )
        .into()),
    }
}

fn required_string(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match object.get(field) {
        Some(Value::String(s)) => Some(s.clone()),
        None => {
            errors.push(FieldError::missing(&["body", field]));
            None
        }
        Some(_) => {
            errors.push(FieldError::new(
                &["body", field],
                "Input should be a valid string",
                "string_type",
            ));
            None
        }
    }
}

/// Lax integer coercion: whole numbers (also `30.0`), numeric strings and booleans.
fn json_integer(loc: &[&str], value: &Value) -> Result<i64, FieldError> {
    let not_integer = || FieldError::new(loc, "Input should be a valid integer", "int_type");
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(i),
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => Ok(f as i64),
                _ => Err(not_integer()),
            },
        },
        Value::String(s) => parse_int_param(loc, Some(s.as_str()), i64::MIN, i64::MAX),
        Value::Bool(b) => Ok(i64::from(*b)),
        _ => Err(not_integer()),
    }
}

fn record<T>(errors: &mut ValidationErrors, result: Result<T, FieldError>) -> Option<T> {
    result.map_err(|e| errors.push(e)).ok()
}
