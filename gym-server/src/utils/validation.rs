//! Input validation helpers
//!
//! Text length limits and normalizers shared by the client, coach, promotion
//! and payment handlers. Every helper returns the cleaned value or a
//! validation error naming the field.

use super::{AppError, AppResult};

// ── Text length limits ──────────────────────────────────────────────

/// Client / coach full name
pub const MAX_FULL_NAME_LEN: usize = 80;

/// First / last name
pub const MAX_NAME_PART_LEN: usize = 60;

pub const MAX_EMAIL_LEN: usize = 120;

/// Phone numbers are cut to this many characters after filtering
pub const MAX_PHONE_LEN: usize = 12;

pub const MAX_NATIONAL_ID_LEN: usize = 30;

/// Notes on clients, payments and promotions
pub const MAX_NOTE_LEN: usize = 75;

pub const MAX_COACH_NOTE_LEN: usize = 120;

pub const MAX_SPECIALTY_LEN: usize = 80;

pub const MAX_PROMOTION_NAME_LEN: usize = 120;

/// Youngest age accepted for a client
pub const MIN_CLIENT_AGE: i32 = 13;

// ── Normalizers ─────────────────────────────────────────────────────

/// Strip `<`/`>` and surrounding whitespace; blank becomes `None`.
pub fn sanitize(input: Option<&str>) -> Option<String> {
    let cleaned: String = input?.chars().filter(|c| !matches!(c, '<' | '>')).collect();
    let trimmed = cleaned.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Letters (Latin-1 accents included), apostrophe, hyphen and whitespace
pub fn is_person_name(value: &str) -> bool {
    value.chars().all(|c| {
        c.is_ascii_alphabetic()
            || matches!(c, 'À'..='Ö' | 'Ø'..='ö' | 'ø'..='ÿ')
            || c == '\''
            || c == '-'
            || c.is_whitespace()
    })
}

fn check_len(field: &str, value: &str, max_len: usize) -> AppResult<()> {
    let len = value.chars().count();
    if len > max_len {
        return Err(AppError::invalid_field(
            field,
            format!("{field} is too long ({len} chars, max {max_len})"),
        ));
    }
    Ok(())
}

/// Optional free text within `max_len` characters
pub fn optional_text(field: &str, input: Option<&str>, max_len: usize) -> AppResult<Option<String>> {
    let Some(value) = sanitize(input) else {
        return Ok(None);
    };
    check_len(field, &value, max_len)?;
    Ok(Some(value))
}

/// Required free text within `max_len` characters
pub fn required_text(field: &str, input: Option<&str>, max_len: usize) -> AppResult<String> {
    optional_text(field, input, max_len)?
        .ok_or_else(|| AppError::invalid_field(field, format!("{field} is required")))
}

/// Optional person name (first / last / full)
pub fn optional_person_name(
    field: &str,
    input: Option<&str>,
    max_len: usize,
) -> AppResult<Option<String>> {
    let Some(value) = optional_text(field, input, max_len)? else {
        return Ok(None);
    };
    if !is_person_name(&value) {
        return Err(AppError::invalid_field(
            field,
            format!("{field} may only contain letters, apostrophes, hyphens and spaces"),
        ));
    }
    Ok(Some(value))
}

/// Required person name
pub fn required_person_name(field: &str, input: Option<&str>, max_len: usize) -> AppResult<String> {
    optional_person_name(field, input, max_len)?
        .ok_or_else(|| AppError::invalid_field(field, format!("{field} is required")))
}

/// Lowercased email; must contain `@`
pub fn email(input: Option<&str>) -> AppResult<Option<String>> {
    let Some(value) = optional_text("email", input, MAX_EMAIL_LEN)? else {
        return Ok(None);
    };
    if !value.contains('@') {
        return Err(AppError::invalid_field("email", "email must contain '@'"));
    }
    Ok(Some(value.to_lowercase()))
}

/// Keep digits only, cut to [`MAX_PHONE_LEN`]
pub fn client_phone(input: Option<&str>) -> Option<String> {
    let digits: String = input?
        .chars()
        .filter(char::is_ascii_digit)
        .take(MAX_PHONE_LEN)
        .collect();
    (!digits.is_empty()).then_some(digits)
}

/// Keep digits and `+`, cut to [`MAX_PHONE_LEN`]
pub fn coach_phone(input: Option<&str>) -> Option<String> {
    let kept: String = input?
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .take(MAX_PHONE_LEN)
        .collect();
    (!kept.is_empty()).then_some(kept)
}

/// Alphanumeric national id, uppercased
pub fn national_id(input: Option<&str>) -> AppResult<Option<String>> {
    let Some(value) = optional_text("national_id", input, MAX_NATIONAL_ID_LEN)? else {
        return Ok(None);
    };
    if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::invalid_field(
            "national_id",
            "national_id may only contain letters and digits",
        ));
    }
    Ok(Some(value.to_uppercase()))
}
