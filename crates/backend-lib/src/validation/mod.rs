// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Field validation for registration and login payloads.
//!
//! Every rule runs independently and all failures are collected, so the
//! client can highlight every bad field at once.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::AppError;

// Common validation constants
pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 100;
pub const MIN_MATRIC_LENGTH: usize = 4;
pub const MAX_MATRIC_LENGTH: usize = 20;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Symbols that satisfy the special-character requirement
pub const PASSWORD_SYMBOLS: &str = "@$!%*?&";

// Regex patterns for validation
static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z\s'-]+$").unwrap());
static MATRIC_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());
static IC_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{12}$").unwrap());

/// Outcome of validating a payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Field name -> human readable message
    pub errors: BTreeMap<String, String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record a failure. A later failure for the same field replaces the
    /// earlier message.
    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.insert(field.to_string(), message.into());
    }

    /// Convert into `Ok(())` or an [`AppError::Validation`].
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

/// Raw fields submitted with a registration form
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationFields<'a> {
    pub name: Option<&'a str>,
    pub matric: Option<&'a str>,
    pub ic: Option<&'a str>,
    pub password: Option<&'a str>,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn check_name(report: &mut ValidationReport, name: &str) {
    let len = name.chars().count();
    if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&len) {
        report.fail(
            "name",
            format!("Name must be between {MIN_NAME_LENGTH} and {MAX_NAME_LENGTH} characters"),
        );
    }
    if !NAME_REGEX.is_match(name) {
        report.fail("name", "Name contains invalid characters");
    }
}

fn check_matric(report: &mut ValidationReport, matric: &str) {
    let len = matric.chars().count();
    if !(MIN_MATRIC_LENGTH..=MAX_MATRIC_LENGTH).contains(&len) {
        report.fail(
            "matric",
            format!(
                "Matric ID must be between {MIN_MATRIC_LENGTH} and {MAX_MATRIC_LENGTH} characters"
            ),
        );
    }
    if !MATRIC_REGEX.is_match(matric) {
        report.fail("matric", "Matric ID must be alphanumeric");
    }
}

fn check_ic(report: &mut ValidationReport, ic: &str) {
    if !IC_REGEX.is_match(ic) {
        report.fail("ic", "IC must be 12 digits");
    }
}

fn check_password(report: &mut ValidationReport, password: &str) {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        report.fail(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
        );
    } else if len > MAX_PASSWORD_LENGTH {
        report.fail(
            "password",
            format!("Password cannot exceed {MAX_PASSWORD_LENGTH} characters"),
        );
    }

    let has_lowercase = password.chars().any(|c| c.is_ascii_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));

    let allowed_start = password
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(c));

    if !(has_lowercase && has_uppercase && has_digit && has_symbol && allowed_start) {
        report.fail(
            "password",
            "Password must contain uppercase, lowercase, number, and special character",
        );
    }
}

/// Validate the identity fields shared by account and student registration.
fn check_identity(report: &mut ValidationReport, name: Option<&str>, matric: Option<&str>, ic: Option<&str>) {
    match present(name) {
        // Stored trimmed, so checked trimmed
        Some(name) => check_name(report, name.trim()),
        None => report.fail("name", "Name is required"),
    }
    match present(matric) {
        Some(matric) => check_matric(report, matric),
        None => report.fail("matric", "Matric ID is required"),
    }
    match present(ic) {
        Some(ic) => check_ic(report, ic),
        None => report.fail("ic", "IC is required"),
    }
}

/// Validate an account registration form
pub fn validate_registration(fields: RegistrationFields<'_>) -> ValidationReport {
    let mut report = ValidationReport::default();
    check_identity(&mut report, fields.name, fields.matric, fields.ic);
    match present(fields.password) {
        Some(password) => check_password(&mut report, password),
        None => report.fail("password", "Password is required"),
    }
    report
}

/// Validate a student registration (no password involved)
pub fn validate_student(name: Option<&str>, matric: Option<&str>, ic: Option<&str>) -> ValidationReport {
    let mut report = ValidationReport::default();
    check_identity(&mut report, name, matric, ic);
    report
}

/// Validate a login form.
///
/// Only presence is checked; applying the registration rules here would
/// tell an attacker which identifiers can't possibly exist.
pub fn validate_login(matric: Option<&str>, password: Option<&str>) -> ValidationReport {
    let mut report = ValidationReport::default();
    if present(matric).is_none() {
        report.fail("matric", "Matric ID is required");
    }
    if password.map_or(true, str::is_empty) {
        report.fail("password", "Password is required");
    }
    report
}

/// Sanitize free text before storage: trim and escape HTML-like characters
pub fn sanitize_string(input: &str) -> String {
    input
        .trim()
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
        .replace('/', "&#x2F;")
}
