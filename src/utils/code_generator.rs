//! Short code generation and prefix validation.
//!
//! Codes are drawn uniformly from a 62-symbol alphanumeric alphabet using an
//! injected random source. Uniqueness is not guaranteed here; collisions are
//! detected by the allocation loop in
//! [`crate::application::services::LinkService`].

use crate::error::AppError;
use rand::Rng;
use serde_json::json;

/// Symbols a short code is drawn from.
pub const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Default length of a freshly generated code.
pub const DEFAULT_CODE_LENGTH: usize = 7;

/// Maximum number of characters in an owner-supplied prefix.
pub const MAX_PREFIX_LENGTH: usize = 11;

/// Number of leading candidate characters replaced by the prefix marker.
pub const PREFIX_SACRIFICE: usize = 2;

/// Shortest base code length; a prefixed code keeps at least one random char.
pub const MIN_CODE_LENGTH: usize = PREFIX_SACRIFICE + 1;

/// Every this many failed attempts the random part grows by one character.
pub const ESCALATION_STEP: u32 = 3;

/// Character separating a prefix from the random part.
pub const PREFIX_SEPARATOR: char = '-';

/// Fixed-length random code generator.
#[derive(Debug, Clone, Copy)]
pub struct CodeGenerator {
    length: usize,
}

impl CodeGenerator {
    /// Creates a generator producing codes of `length` characters.
    ///
    /// Lengths of two or less would leave nothing after a prefix replaces the
    /// first two characters, so they are raised to three.
    pub fn new(length: usize) -> Self {
        Self {
            length: length.max(MIN_CODE_LENGTH),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Generates a base candidate of the configured length.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        random_chars(rng, self.length)
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH)
    }
}

/// Draws `n` characters from [`ALPHABET`].
pub fn random_chars<R: Rng + ?Sized>(rng: &mut R, n: usize) -> String {
    (0..n)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Number of extra characters appended after `retries` failed attempts.
///
/// Zero for the first three attempts, then one more for every three failures.
pub fn escalation_chars(retries: u32) -> usize {
    if retries < ESCALATION_STEP {
        0
    } else {
        (retries / ESCALATION_STEP) as usize
    }
}

/// Builds the candidate for attempt number `retries`.
///
/// The base candidate is extended by [`escalation_chars`], then, if a prefix
/// is set, its first two characters are replaced by `prefix-`.
pub fn build_candidate<R: Rng + ?Sized>(
    generator: &CodeGenerator,
    rng: &mut R,
    prefix: &str,
    retries: u32,
) -> String {
    let mut candidate = generator.generate(rng);
    candidate.push_str(&random_chars(rng, escalation_chars(retries)));

    if prefix.is_empty() {
        return candidate;
    }

    // Candidate is ASCII, slicing on a byte index is safe.
    format!(
        "{prefix}{PREFIX_SEPARATOR}{}",
        &candidate[PREFIX_SACRIFICE..]
    )
}

/// Validates an owner-supplied prefix.
///
/// # Rules
///
/// - Must not contain `/`
/// - At most 11 characters
/// - Empty means "no prefix"
///
/// # Errors
///
/// Returns [`AppError::InvalidPrefix`] if any rule is violated.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_prefix("promo").is_ok());
/// assert!(validate_prefix("").is_ok());
///
/// assert!(validate_prefix("a/b").is_err());
/// assert!(validate_prefix("waytoolongprefix").is_err());
/// ```
pub fn validate_prefix(prefix: &str) -> Result<&str, AppError> {
    if prefix.contains('/') {
        return Err(AppError::invalid_prefix(
            "Prefix must not contain '/'",
            json!({ "prefix": prefix }),
        ));
    }

    let length = prefix.chars().count();
    if length > MAX_PREFIX_LENGTH {
        return Err(AppError::invalid_prefix(
            format!("Prefix must be at most {MAX_PREFIX_LENGTH} characters"),
            json!({ "prefix": prefix, "provided_length": length }),
        ));
    }

    Ok(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_alphabet_has_62_unique_symbols() {
        let unique: HashSet<_> = ALPHABET.iter().collect();
        assert_eq!(unique.len(), 62);
        assert!(ALPHABET.iter().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_code_has_configured_length() {
        let generator = CodeGenerator::new(9);
        assert_eq!(generator.generate(&mut rng()).len(), 9);
    }

    #[test]
    fn test_default_length() {
        let generator = CodeGenerator::default();
        assert_eq!(generator.length(), DEFAULT_CODE_LENGTH);
        assert_eq!(generator.generate(&mut rng()).len(), DEFAULT_CODE_LENGTH);
    }

    #[test]
    fn test_too_short_length_is_raised() {
        assert_eq!(CodeGenerator::new(0).length(), 3);
        assert_eq!(CodeGenerator::new(2).length(), 3);
    }

    #[test]
    fn test_generate_code_alphanumeric_only() {
        let generator = CodeGenerator::default();
        let mut rng = rng();
        for _ in 0..100 {
            let code = generator.generate(&mut rng);
            assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_generate_code_is_deterministic_for_seed() {
        let generator = CodeGenerator::default();
        let a = generator.generate(&mut StdRng::seed_from_u64(5));
        let b = generator.generate(&mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_code_produces_distinct_codes() {
        let generator = CodeGenerator::default();
        let mut rng = rng();
        let codes: HashSet<_> = (0..1000).map(|_| generator.generate(&mut rng)).collect();

        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn test_escalation_chars() {
        assert_eq!(escalation_chars(0), 0);
        assert_eq!(escalation_chars(2), 0);
        assert_eq!(escalation_chars(3), 1);
        assert_eq!(escalation_chars(5), 1);
        assert_eq!(escalation_chars(6), 2);
        assert_eq!(escalation_chars(9), 3);
        assert_eq!(escalation_chars(30), 10);
    }

    #[test]
    fn test_build_candidate_without_prefix_grows() {
        let generator = CodeGenerator::new(7);
        let mut rng = rng();

        assert_eq!(build_candidate(&generator, &mut rng, "", 0).len(), 7);
        assert_eq!(build_candidate(&generator, &mut rng, "", 2).len(), 7);
        assert_eq!(build_candidate(&generator, &mut rng, "", 3).len(), 8);
        assert_eq!(build_candidate(&generator, &mut rng, "", 6).len(), 9);
    }

    #[test]
    fn test_build_candidate_with_prefix() {
        let generator = CodeGenerator::new(7);
        let candidate = build_candidate(&generator, &mut rng(), "promo", 0);

        assert!(candidate.starts_with("promo-"));
        assert_eq!(candidate.len(), "promo-".len() + 5);
    }

    #[test]
    fn test_build_candidate_with_prefix_drops_first_two_chars() {
        let generator = CodeGenerator::new(7);
        let base = generator.generate(&mut StdRng::seed_from_u64(9));
        let candidate = build_candidate(&generator, &mut StdRng::seed_from_u64(9), "x", 0);

        assert_eq!(candidate, format!("x-{}", &base[2..]));
    }

    #[test]
    fn test_build_candidate_with_prefix_and_escalation() {
        let generator = CodeGenerator::new(7);
        let candidate = build_candidate(&generator, &mut rng(), "ab", 6);

        assert_eq!(candidate.len(), "ab-".len() + 5 + 2);
    }

    #[test]
    fn test_validate_empty_prefix() {
        assert_eq!(validate_prefix("").unwrap(), "");
    }

    #[test]
    fn test_validate_max_length_prefix() {
        assert!(validate_prefix("abcdefghijk").is_ok());
    }

    #[test]
    fn test_validate_too_long_prefix() {
        let result = validate_prefix("abcdefghijkl");
        assert!(matches!(result, Err(AppError::InvalidPrefix { .. })));
        assert!(result.unwrap_err().to_string().contains("at most 11"));
    }

    #[test]
    fn test_validate_prefix_with_separator() {
        let result = validate_prefix("a/b");
        assert!(matches!(result, Err(AppError::InvalidPrefix { .. })));
    }

    #[test]
    fn test_validate_prefix_counts_characters_not_bytes() {
        assert!(validate_prefix("привет").is_ok());
        assert!(validate_prefix("日本語日本語日本語日本").is_ok());
    }

    #[test]
    fn test_validate_prefix_allows_hyphen_and_spaces() {
        assert!(validate_prefix("my-link").is_ok());
        assert!(validate_prefix("a b").is_ok());
    }
}
