//! Temporary-secret generation and the secret strength policy.
//!
//! Entropy policy: the bootstrap secret is intentionally derivable from
//! seed fields (name fragment + birth day/month) so it can be
//! communicated out-of-band by an administrator. It is never a
//! dictionary word alone — the fixed `@A1` suffix adds the uppercase,
//! digit, and symbol classes required by the strength policy. Every
//! principal starts with `must_rotate_secret = true`, so the window in
//! which this low-entropy secret is valid ends at first login.

use chrono::{Datelike, NaiveDate};
use fleetgate_core::error::{FleetError, FleetResult};

/// Fixed suffix guaranteeing upper/digit/symbol character classes.
const TEMP_SUFFIX: &str = "@A1";
/// Max letters of the first name inside a temporary secret.
const TEMP_NAME_LEN: usize = 4;

/// Generate a one-time bootstrap secret:
/// `{name ≤4, lowercase}{dd}{mm}@A1`, e.g. `asha0204@A1` for
/// ("Asha", 1998-04-02).
///
/// The returned value is handed to the caller exactly once; only the
/// hashing path may receive it afterwards. It must never be logged or
/// persisted in plaintext.
pub fn temp_secret(first_name: &str, date_of_birth: NaiveDate) -> FleetResult<String> {
    let name: String = first_name
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(TEMP_NAME_LEN)
        .collect::<String>()
        .to_lowercase();

    if name.is_empty() {
        return Err(FleetError::Validation {
            message: "first name has no usable characters".into(),
        });
    }

    let dd = date_of_birth.day();
    let mm = date_of_birth.month();
    Ok(format!("{name}{dd:02}{mm:02}{TEMP_SUFFIX}"))
}

/// Minimum strength policy for voluntary secrets: at least
/// `min_length` characters and one of each of lowercase, uppercase,
/// digit, and symbol.
pub fn check_strength(secret: &str, min_length: usize) -> FleetResult<()> {
    if secret.chars().count() < min_length {
        return Err(FleetError::Validation {
            message: format!("secret must be at least {min_length} characters"),
        });
    }
    let has_lower = secret.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = secret.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = secret.chars().any(|c| c.is_ascii_digit());
    let has_symbol = secret.chars().any(|c| !c.is_ascii_alphanumeric());

    if !(has_lower && has_upper && has_digit && has_symbol) {
        return Err(FleetError::Validation {
            message: "secret must contain lowercase, uppercase, digit, and symbol".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dob(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn temp_secret_matches_expected_shape() {
        let secret = temp_secret("Asha", dob(1998, 4, 2)).unwrap();
        assert_eq!(secret, "asha0204@A1");
    }

    #[test]
    fn temp_secret_truncates_and_lowercases() {
        let secret = temp_secret("Maximiliana", dob(2001, 12, 31)).unwrap();
        assert_eq!(secret, "maxi3112@A1");
    }

    #[test]
    fn temp_secret_rejects_unusable_name() {
        let err = temp_secret("42", dob(1998, 4, 2)).unwrap_err();
        assert!(matches!(err, FleetError::Validation { .. }));
    }

    #[test]
    fn temp_secret_passes_strength_policy() {
        let secret = temp_secret("Asha", dob(1998, 4, 2)).unwrap();
        assert!(check_strength(&secret, 10).is_ok());
    }

    #[test]
    fn strength_rejects_short_secret() {
        let err = check_strength("aB1@", 10).unwrap_err();
        assert!(matches!(err, FleetError::Validation { .. }));
    }

    #[test]
    fn strength_rejects_missing_classes() {
        assert!(check_strength("alllowercase1@", 10).is_err());
        assert!(check_strength("NoSymbolsHere12", 10).is_err());
        assert!(check_strength("NoDigits@Here!", 10).is_err());
    }

    #[test]
    fn strength_accepts_compliant_secret() {
        assert!(check_strength("Str0ng&Secret", 10).is_ok());
    }
}
