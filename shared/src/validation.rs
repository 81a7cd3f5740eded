//! Pure domain-invariant checks. None of these perform I/O; handlers fetch
//! whatever state they need first and pass it in, which is what keeps the
//! rules unit-testable.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::error::AppError;

/// Waivers are good for one year from submission.
pub const WAIVER_VALIDITY_DAYS: i64 = 365;

/// Dashboard renewal warnings start this many days before expiration.
pub const WAIVER_RENEWAL_WINDOW_DAYS: i64 = 30;

/// Adulthood threshold for minor eligibility and waiver branching.
pub const ADULT_AGE: i32 = 18;

/// Parses a `YYYY-MM-DD` birth date, rejecting anything else.
pub fn parse_birth_date(input: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        AppError::validation(
            "Invalid date of birth format. Please use YYYY-MM-DD format.".to_string(),
        )
    })
}

/// Age in full elapsed years on `today`, accounting for whether the birthday
/// has occurred yet this year. Calendar-year subtraction alone is off by one
/// for anyone whose birthday is later in the year.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    use chrono::Datelike;

    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

/// Checks that a date of birth is usable for a Minor record: not in the
/// future, and yielding an age strictly under 18. Returns the computed age.
pub fn check_minor_eligibility(date_of_birth: NaiveDate, today: NaiveDate) -> Result<u32, AppError> {
    if date_of_birth > today {
        return Err(AppError::validation(
            "Date of birth cannot be in the future.".to_string(),
        ));
    }

    let age = age_on(date_of_birth, today);
    if age >= ADULT_AGE {
        return Err(AppError::validation(
            "Only minors (under 18 years old) can be added to your account.".to_string(),
        ));
    }

    Ok(age as u32)
}

/// Collects missing/blank required fields into the single message the
/// handlers all use, so every endpoint reports them the same way.
pub fn require_fields(fields: &[(&str, Option<&str>)]) -> Result<(), AppError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| !matches!(value, Some(v) if !v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

/// Minimal shape check for an email address. No DNS, no RFC pedantry; just
/// enough to catch obviously broken input before it becomes a partition key.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2 && !domain.contains("..") ,
        None => false,
    }
}

/// Expiration instant for a waiver submitted at `submission`.
pub fn waiver_expiration(submission: DateTime<Utc>) -> DateTime<Utc> {
    submission + Duration::days(WAIVER_VALIDITY_DAYS)
}

/// A waiver is valid through its expiration instant, inclusive.
pub fn waiver_is_valid(submission: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now <= waiver_expiration(submission)
}

/// Whether a still-valid waiver is inside the renewal-warning window.
pub fn waiver_expiring_soon(submission: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let remaining = waiver_expiration(submission) - now;
    remaining >= Duration::zero() && remaining <= Duration::days(WAIVER_RENEWAL_WINDOW_DAYS)
}
