//! Deterministic identifier derivation.
//!
//! Pure functions over seed fields. The store is the single source of
//! truth for uniqueness — nothing here queries storage. Callers resolve
//! collisions: corporate codes are re-derived with a fresh random
//! suffix, login identifiers fall back to a numeric sequence suffix.

use chrono::{Datelike, NaiveDate};
use fleetgate_core::error::{FleetError, FleetResult};

/// Max letters taken from a company or employee name.
const NAME_FRAGMENT_LEN: usize = 6;
/// Max letters of the first name inside a login identifier.
const LOGIN_NAME_FRAGMENT_LEN: usize = 5;
/// Max chars of the corporate-code mnemonic inside derived identifiers.
const CODE_FRAGMENT_LEN: usize = 6;

const CORPORATE_PREFIX: &str = "CORP-";
const EMPLOYEE_PREFIX: &str = "EMP-";

fn letters_fragment(input: &str, max: usize) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(max)
        .collect::<String>()
        .to_uppercase()
}

/// Leading alphanumeric run of a corporate code, without the `CORP-`
/// prefix: `CORP-ACMELO-3F2A` → `ACMELO`, `ACM` → `ACM`.
fn code_fragment(code: &str) -> String {
    let trimmed = code.strip_prefix(CORPORATE_PREFIX).unwrap_or(code);
    trimmed
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .take(CODE_FRAGMENT_LEN)
        .collect::<String>()
        .to_uppercase()
}

fn validated_code_fragment(code: &str) -> FleetResult<String> {
    let fragment = code_fragment(code);
    if fragment.is_empty() {
        return Err(FleetError::Validation {
            message: "corporate code is empty or malformed".into(),
        });
    }
    Ok(fragment)
}

/// Random 4-hex-char suffix for non-guessable identifier derivation.
pub fn random_suffix() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 2] = rand::Rng::random(&mut rng);
    hex::encode(bytes).to_uppercase()
}

/// Derive a corporate code from the company name and a caller-supplied
/// random suffix: `CORP-{NAME≤6}-{SUFFIX}`.
///
/// Deterministic given identical inputs; the caller retries with a
/// fresh suffix when the store reports a uniqueness conflict.
pub fn derive_corporate_code(name: &str, suffix: &str) -> FleetResult<String> {
    let fragment = letters_fragment(name, NAME_FRAGMENT_LEN);
    if fragment.is_empty() {
        return Err(FleetError::Validation {
            message: "company name has no usable characters".into(),
        });
    }
    if suffix.is_empty() {
        return Err(FleetError::Validation {
            message: "corporate code suffix must not be empty".into(),
        });
    }
    Ok(format!("{CORPORATE_PREFIX}{fragment}-{suffix}"))
}

/// Derive a login identifier: corporate-code fragment (≤6) +
/// first-name fragment (≤5) + two-digit birth year, all uppercase:
/// `("ACM", "Asha", 1998-04-02)` → `ACMASHA98`.
///
/// Deterministic by design — two principals sharing name and birth
/// year in one tenant collide, and the caller must fall back to a
/// distinguishing sequence suffix before persisting.
pub fn derive_login_id(
    corporate_code: &str,
    first_name: &str,
    date_of_birth: NaiveDate,
) -> FleetResult<String> {
    let code = validated_code_fragment(corporate_code)?;
    let name = letters_fragment(first_name, LOGIN_NAME_FRAGMENT_LEN);
    if name.is_empty() {
        return Err(FleetError::Validation {
            message: "first name has no usable characters".into(),
        });
    }
    let year = date_of_birth.year().rem_euclid(100);
    Ok(format!("{code}{name}{year:02}"))
}

/// Derive a display employee code: `EMP-{CODE}-{NAME≤6}-{SUFFIX}`.
///
/// The random suffix makes collisions astronomically unlikely, so
/// unlike login identifiers this is not retried — it is a display
/// code, not a login key.
pub fn derive_employee_code(
    corporate_code: &str,
    first_name: &str,
    last_name: Option<&str>,
    suffix: &str,
) -> FleetResult<String> {
    let code = validated_code_fragment(corporate_code)?;
    let full_name = format!("{first_name}{}", last_name.unwrap_or(""));
    let name = letters_fragment(&full_name, NAME_FRAGMENT_LEN);
    if name.is_empty() {
        return Err(FleetError::Validation {
            message: "employee name has no usable characters".into(),
        });
    }
    if suffix.is_empty() {
        return Err(FleetError::Validation {
            message: "employee code suffix must not be empty".into(),
        });
    }
    Ok(format!("{EMPLOYEE_PREFIX}{code}-{name}-{suffix}"))
}
