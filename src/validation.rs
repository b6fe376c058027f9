//! Validation of the typed city name

use crate::TempGraphError;

/// Shortest accepted city name, in characters, after trimming
pub const MIN_CITY_NAME_CHARS: usize = 3;

/// Trim the raw input and reject names shorter than three characters.
///
/// Length counts Unicode scalar values, not bytes.
pub fn validate_city_name(raw: &str) -> crate::Result<String> {
    let trimmed = raw.trim();
    if trimmed.chars().count() < MIN_CITY_NAME_CHARS {
        return Err(TempGraphError::validation(format!(
            "city name '{trimmed}' is shorter than {MIN_CITY_NAME_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("NY")]
    #[case("  NY  ")]
    #[case("Áv")]
    #[case("\tA\n")]
    fn test_rejects_short_names(#[case] input: &str) {
        let err = validate_city_name(input).unwrap_err();
        assert!(matches!(err, TempGraphError::Validation { .. }));
    }

    #[rstest]
    #[case("Rom", "Rom")]
    #[case("  Madrid ", "Madrid")]
    #[case("Ávila", "Ávila")]
    #[case("New York", "New York")]
    fn test_accepts_and_trims(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate_city_name(input).unwrap(), expected);
    }
}
