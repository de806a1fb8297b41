//! Derivation of the CUIL/CUIT taxpayer identifier from a DNI and sex.
//!
//! A CUIL is `prefix(2) + DNI(8) + check digit(1)`. The prefix encodes sex
//! (20 male, 27 female, 23 otherwise) and the check digit is a weighted
//! mod-11 checksum over the first ten digits. When the checksum lands on the
//! impossible digit 10 for a 20/27 prefix, the registry convention is to
//! reissue the identifier under prefix 23; we apply that fallback once.
//! The fallback is a widely used heuristic, not a published standard, so a
//! divergence against a government-issued identifier should be reported
//! rather than papered over.

const CHECKSUM_WEIGHTS: [u32; 10] = [5, 4, 3, 2, 7, 6, 5, 4, 3, 2];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeriveError {
    #[error("DNI is required")]
    MissingDni,
    #[error("sexo is required to derive a CUIL from a DNI")]
    MissingSex,
    #[error("DNI must contain only digits: got '{0}'")]
    NotNumeric(String),
    #[error("DNI must be 7 or 8 digits, or an 11-digit CUIT: got {0} digits")]
    BadLength(usize),
}

/// Derives the 11-digit CUIL for `dni` and `sex`.
///
/// An 11-digit `dni` is treated as an already-computed CUIT and returned
/// unchanged without consulting `sex`. Shorter DNIs are zero-padded on the
/// left to 8 digits before the checksum runs.
///
/// Pure and deterministic; malformed input is the only error path.
pub fn derive_cuil(dni: &str, sex: &str) -> Result<String, DeriveError> {
    let dni = dni.trim();
    if dni.is_empty() {
        return Err(DeriveError::MissingDni);
    }
    if !dni.chars().all(|c| c.is_ascii_digit()) {
        return Err(DeriveError::NotNumeric(dni.to_string()));
    }
    if dni.len() == 11 {
        return Ok(dni.to_string());
    }

    let sex = sex.trim();
    if sex.is_empty() {
        return Err(DeriveError::MissingSex);
    }
    if !(7..=8).contains(&dni.len()) {
        return Err(DeriveError::BadLength(dni.len()));
    }

    let padded = format!("{dni:0>8}");
    let prefix = match sex.to_ascii_uppercase().as_str() {
        "M" => "20",
        "F" => "27",
        _ => "23",
    };

    let (prefix, check) = match check_digit(prefix, &padded) {
        // Collision: 10 is not a valid check digit. Reissue under 23 once;
        // if even that lands on 10 the raw value is returned as-is.
        10 if prefix != "23" => ("23", check_digit("23", &padded)),
        digit => (prefix, digit),
    };

    Ok(format!("{prefix}{padded}{check}"))
}

fn check_digit(prefix: &str, padded_dni: &str) -> u32 {
    let total: u32 = prefix
        .chars()
        .chain(padded_dni.chars())
        .filter_map(|c| c.to_digit(10))
        .zip(CHECKSUM_WEIGHTS)
        .map(|(digit, weight)| digit * weight)
        .sum();

    match 11 - total % 11 {
        11 => 0,
        digit => digit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn male_dni_gets_prefix_20() {
        let cuil = derive_cuil("12345678", "M").expect("derives");
        assert_eq!(cuil.len(), 11);
        assert!(cuil.starts_with("20"));
        assert_eq!(cuil, "20123456786");
    }

    #[test]
    fn derivation_is_deterministic() {
        let first = derive_cuil("12345678", "M").expect("derives");
        let second = derive_cuil("12345678", "M").expect("derives");
        assert_eq!(first, second);
    }

    #[test]
    fn short_dni_is_zero_padded() {
        let cuil = derive_cuil("5551234", "F").expect("derives");
        assert!(cuil.starts_with("2705551234"));
        // This particular DNI also exercises the 11 -> 0 normalization.
        assert_eq!(cuil, "27055512340");
    }

    #[test]
    fn eleven_digit_input_passes_through_for_any_sex() {
        for sex in ["M", "F", "X", ""] {
            assert_eq!(
                derive_cuil("20289107364", sex).expect("passthrough"),
                "20289107364"
            );
        }
    }

    #[test]
    fn rejects_out_of_range_lengths() {
        for dni in ["123456", "123456789", "1234567890"] {
            assert_eq!(
                derive_cuil(dni, "M").expect_err("invalid length"),
                DeriveError::BadLength(dni.len())
            );
        }
    }

    #[test]
    fn rejects_empty_dni_and_empty_sex() {
        assert_eq!(
            derive_cuil("", "M").expect_err("missing dni"),
            DeriveError::MissingDni
        );
        assert_eq!(
            derive_cuil("12345678", "").expect_err("missing sex"),
            DeriveError::MissingSex
        );
    }

    #[test]
    fn rejects_non_numeric_dni() {
        assert!(matches!(
            derive_cuil("1234567a", "M"),
            Err(DeriveError::NotNumeric(_))
        ));
    }

    #[test]
    fn check_digit_collision_retries_with_prefix_23() {
        // "0000001" pads to 00000001; under prefix 20 the weighted sum is 12,
        // remainder 1, check digit 10 -> reissued under 23 where it comes out 9.
        let cuil = derive_cuil("0000001", "M").expect("derives");
        assert_eq!(cuil, "23000000019");
    }

    #[test]
    fn female_collision_also_falls_back_to_23() {
        // Prefix 27 over 00000009 sums to 56, remainder 1, check digit 10.
        let cuil = derive_cuil("0000009", "F").expect("derives");
        assert!(cuil.starts_with("2300000009"));
    }

    #[test]
    fn other_sex_keeps_a_raw_collision() {
        // Prefix 23 is already the fallback, so a 10 stays in the output.
        // Documented edge case; such identifiers do not occur in the registry.
        let cuil = derive_cuil("0000006", "X").expect("derives");
        assert_eq!(cuil, "230000000610");
    }
}
