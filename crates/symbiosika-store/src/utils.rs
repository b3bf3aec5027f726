//! Utility helpers: data paths and lifetime conversion.

use std::path::PathBuf;

use chrono::TimeDelta;

use crate::error::StoreError;

/// Lifetime used when a caller passes zero or a negative number of minutes.
pub const DEFAULT_LIFETIME_MINUTES: f64 = 60.0;

/// Get the Symbiosika data directory (e.g. `~/.symbiosika/`).
pub fn get_data_path() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".symbiosika")
}

/// Turn a caller-supplied duration in minutes into a `TimeDelta`, as is.
///
/// Zero and negative durations are kept, so nothing is fresh under them.
/// NaN and infinite values are rejected. Durations beyond what `TimeDelta`
/// can hold saturate.
pub fn duration(minutes: f64) -> Result<TimeDelta, StoreError> {
    if !minutes.is_finite() {
        return Err(StoreError::InvalidDuration(minutes));
    }
    let millis = (minutes * 60_000.0).round() as i64;
    Ok(TimeDelta::try_milliseconds(millis).unwrap_or(if minutes > 0.0 {
        TimeDelta::MAX
    } else {
        TimeDelta::MIN
    }))
}

/// Like [`duration`], but zero or negative minutes fall back to
/// `default_minutes`.
pub fn lifetime(minutes: f64, default_minutes: f64) -> Result<TimeDelta, StoreError> {
    if !minutes.is_finite() {
        return Err(StoreError::InvalidDuration(minutes));
    }
    duration(if minutes > 0.0 { minutes } else { default_minutes })
}

/// Reject empty identifiers with a message naming the field.
pub(crate) fn require_identifier(value: &str, field: &'static str) -> Result<(), StoreError> {
    if value.is_empty() {
        Err(StoreError::MissingIdentifier { field })
    } else {
        Ok(())
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("USERPROFILE").ok().map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetime_minutes() {
        assert_eq!(lifetime(5.0, 60.0).unwrap(), TimeDelta::minutes(5));
        assert_eq!(lifetime(0.5, 60.0).unwrap(), TimeDelta::seconds(30));
    }

    #[test]
    fn test_lifetime_non_positive_uses_default() {
        assert_eq!(lifetime(0.0, 60.0).unwrap(), TimeDelta::minutes(60));
        assert_eq!(lifetime(-3.0, 15.0).unwrap(), TimeDelta::minutes(15));
    }

    #[test]
    fn test_lifetime_rejects_non_finite() {
        assert!(matches!(lifetime(f64::NAN, 60.0), Err(StoreError::InvalidDuration(_))));
        assert!(matches!(
            lifetime(f64::INFINITY, 60.0),
            Err(StoreError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_duration_keeps_non_positive() {
        assert_eq!(duration(0.0).unwrap(), TimeDelta::zero());
        assert_eq!(duration(-2.0).unwrap(), TimeDelta::minutes(-2));
        assert_eq!(duration(1.5).unwrap(), TimeDelta::seconds(90));
        assert_eq!(duration(-1e300).unwrap(), TimeDelta::MIN);
        assert!(matches!(duration(f64::NAN), Err(StoreError::InvalidDuration(_))));
    }

    #[test]
    fn test_lifetime_saturates() {
        assert_eq!(lifetime(1e300, 60.0).unwrap(), TimeDelta::MAX);
    }

    #[test]
    fn test_require_identifier() {
        assert!(require_identifier("abc", "key").is_ok());
        assert_eq!(
            require_identifier("", "key"),
            Err(StoreError::MissingIdentifier { field: "key" })
        );
    }

    #[test]
    fn test_data_path_ends_with_symbiosika() {
        assert!(get_data_path().ends_with(".symbiosika"));
    }
}
