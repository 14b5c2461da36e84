//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Rating steps accepted by the journal, matching the store constraint
const RATING_STEPS: [f32; 9] = [1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0];

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.len() < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }

    if username.len() > 100 {
        return Err("Username must be at most 100 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err("Username can only contain letters, numbers, and underscores".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate an optional rating against the allowed half-star steps
pub fn validate_rating(rating: Option<f32>) -> Result<(), String> {
    match rating {
        None => Ok(()),
        Some(r) if RATING_STEPS.iter().any(|step| *step == r) => Ok(()),
        Some(r) => Err(format!(
            "Invalid rating: {r}. Rating must be between 1 and 5 in 0.5 steps"
        )),
    }
}

/// True when a path segment is all digits, i.e. a user id rather than a username
pub fn is_numeric_id(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("bob_smith").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("bob smith").is_err());
        assert!(validate_username("bob!").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("bob.smith@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
    }

    #[test]
    fn test_validate_rating_steps() {
        assert!(validate_rating(None).is_ok());
        assert!(validate_rating(Some(1.0)).is_ok());
        assert!(validate_rating(Some(3.5)).is_ok());
        assert!(validate_rating(Some(5.0)).is_ok());
        assert!(validate_rating(Some(0.5)).is_err());
        assert!(validate_rating(Some(5.5)).is_err());
        assert!(validate_rating(Some(3.2)).is_err());
    }

    #[test]
    fn test_is_numeric_id() {
        assert!(is_numeric_id("42"));
        assert!(!is_numeric_id("bob_smith"));
        assert!(!is_numeric_id("4bob"));
        assert!(!is_numeric_id(""));
    }
}
