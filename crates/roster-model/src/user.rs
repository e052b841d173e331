// SPDX-License-Identifier: Apache-2.0

use crate::error::ValidationError;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

pub const NAME_MAX_LEN: usize = 128;
pub const EMAIL_MAX_LEN: usize = 254;
pub const PHONE_MAX_LEN: usize = 32;
/// Upper bound on a stored salary; keeps roster sums finite.
pub const SALARY_MAX: f64 = 1_000_000_000.0;
pub const HIRE_DATE_FORMAT: &str = "%Y-%m-%d";

pub type UserId = i64;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_re() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles")
    })
}

/// A stored employee row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub position: String,
    pub salary: f64,
    pub hire_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Raw body of `POST /api/users`, before validation.
///
/// Every field is optional so a missing value is reported as a field error
/// instead of a deserialization failure. `salary` accepts either a JSON number
/// or a numeric string, since HTML forms submit strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub salary: Option<Value>,
    #[serde(alias = "hireDate")]
    pub hire_date: Option<String>,
}

/// Validated fields for a user insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub position: String,
    pub salary: f64,
    pub hire_date: NaiveDate,
}

impl NewUser {
    /// Validates every field and reports all failures at once.
    pub fn validate(input: CreateUserInput) -> Result<Self, ValidationError> {
        let mut errors = ValidationError::default();

        let name = required_text(&mut errors, "name", input.name, NAME_MAX_LEN);
        let department = required_text(&mut errors, "department", input.department, NAME_MAX_LEN);
        let position = required_text(&mut errors, "position", input.position, NAME_MAX_LEN);
        let email = parse_email(&mut errors, input.email);
        let salary = parse_salary(&mut errors, input.salary);
        let hire_date = parse_hire_date(&mut errors, input.hire_date);

        let phone = input
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        if phone
            .as_ref()
            .is_some_and(|p| p.chars().count() > PHONE_MAX_LEN)
        {
            errors.push("phone", format!("must be at most {PHONE_MAX_LEN} characters"));
        }

        match (name, email, department, position, salary, hire_date) {
            (
                Some(name),
                Some(email),
                Some(department),
                Some(position),
                Some(salary),
                Some(hire_date),
            ) if errors.is_empty() => {
                Ok(Self {
                    name,
                    email,
                    phone,
                    department,
                    position,
                    salary,
                    hire_date,
                })
            }
            _ => Err(errors),
        }
    }
}

fn required_text(
    errors: &mut ValidationError,
    field: &'static str,
    raw: Option<String>,
    max_len: usize,
) -> Option<String> {
    let Some(value) = raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
        errors.push(field, "is required");
        return None;
    };
    if value.chars().count() > max_len {
        errors.push(field, format!("must be at most {max_len} characters"));
        return None;
    }
    Some(value)
}

// Emails compare case-insensitively, so they are stored lowercased.
fn parse_email(errors: &mut ValidationError, raw: Option<String>) -> Option<String> {
    let value = required_text(errors, "email", raw, EMAIL_MAX_LEN)?;
    let value = value.to_ascii_lowercase();
    if !email_re().is_match(&value) {
        errors.push("email", "must be a valid email address");
        return None;
    }
    Some(value)
}

fn parse_salary(errors: &mut ValidationError, raw: Option<Value>) -> Option<f64> {
    let parsed = match raw {
        None | Some(Value::Null) => {
            errors.push("salary", "is required");
            return None;
        }
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => {
            errors.push("salary", "is required");
            return None;
        }
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match parsed {
        Some(v) if v.is_finite() && (0.0..=SALARY_MAX).contains(&v) => Some(v),
        Some(v) if v > SALARY_MAX => {
            errors.push("salary", format!("must be at most {SALARY_MAX:.0}"));
            None
        }
        Some(_) => {
            errors.push("salary", "must be a non-negative number");
            None
        }
        None => {
            errors.push("salary", "must be a number");
            None
        }
    }
}

fn parse_hire_date(errors: &mut ValidationError, raw: Option<String>) -> Option<NaiveDate> {
    let value = required_text(errors, "hire_date", raw, 10)?;
    match NaiveDate::parse_from_str(&value, HIRE_DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push("hire_date", "must be a date formatted YYYY-MM-DD");
            None
        }
    }
}
