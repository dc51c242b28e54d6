use crate::utils::error::{FieldError, Result, SiteError};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Same shape as Django's `EmailValidator`: a local part and a dotted domain.
fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(
            r"(?i)^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@([a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z0-9-]{2,63}$",
        )
        .expect("email pattern is valid")
    })
}

pub fn is_valid_email(value: &str) -> bool {
    value.len() <= 254 && email_regex().is_match(value)
}

/// Parse an absolute http(s) URL.
pub fn parse_http_url(value: &str) -> std::result::Result<Url, String> {
    match Url::parse(value) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(format!("Unsupported URL scheme: {}", scheme)),
        },
        Err(e) => Err(format!("Invalid URL format: {}", e)),
    }
}

/// Split a comma-separated address list, dropping blank entries.
pub fn split_addresses(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn char_count(value: &str) -> usize {
    value.chars().count()
}

// --- Schema checks: push into a collector instead of failing fast ---

/// Check a `CharField`-like value: optional required-ness and a maximum
/// length in characters.
pub fn check_char_field(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: &str,
    max_length: Option<usize>,
    required: bool,
) {
    if required && value.trim().is_empty() {
        errors.push(FieldError::required(field));
        return;
    }
    if let Some(max) = max_length {
        let len = char_count(value);
        if len > max {
            errors.push(FieldError::too_long(field, max, len));
        }
    }
}

pub fn check_email_field(errors: &mut Vec<FieldError>, field: &str, value: &str, required: bool) {
    check_char_field(errors, field, value, Some(254), required);
    let value = value.trim();
    if !value.is_empty() && !is_valid_email(value) {
        errors.push(FieldError::new(field, "Enter a valid email address."));
    }
}

/// A comma-separated list of recipient addresses, each of which must be valid.
pub fn check_address_list(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: &str,
    max_length: usize,
    required: bool,
) {
    let before = errors.len();
    check_char_field(errors, field, value, Some(max_length), required);
    if errors.len() > before {
        return;
    }
    for address in split_addresses(value) {
        if !is_valid_email(&address) {
            errors.push(FieldError::new(
                field,
                format!("{} is not a valid email address.", address),
            ));
        }
    }
}

// --- Configuration checks: fail fast with a typed error ---

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(SiteError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(SiteError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SiteError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(SiteError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("contact@exemple.com"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(!is_valid_email("contact@"));
        assert!(!is_valid_email("no-at-sign.example.com"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_parse_http_url() {
        assert!(parse_http_url("https://example.com").is_ok());
        assert!(parse_http_url("http://example.com/path?q=1").is_ok());
        assert!(parse_http_url("ftp://example.com").is_err());
        assert!(parse_http_url("not a url").is_err());
    }

    #[test]
    fn test_check_char_field_counts_characters() {
        let mut errors = Vec::new();
        // 150 accented characters are more than 150 bytes but still valid.
        let value = "é".repeat(150);
        check_char_field(&mut errors, "hero_kicker", &value, Some(150), false);
        assert!(errors.is_empty());

        check_char_field(&mut errors, "hero_kicker", &"é".repeat(151), Some(150), false);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "hero_kicker");
    }

    #[test]
    fn test_check_char_field_required() {
        let mut errors = Vec::new();
        check_char_field(&mut errors, "hero_title", "   ", Some(200), true);
        assert_eq!(errors, vec![FieldError::required("hero_title")]);
    }

    #[test]
    fn test_check_address_list() {
        let mut errors = Vec::new();
        check_address_list(&mut errors, "to_address", "a@example.com, b@example.com", 255, true);
        assert!(errors.is_empty());

        check_address_list(&mut errors, "to_address", "a@example.com, nope", 255, true);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("nope"));
    }

    #[test]
    fn test_split_addresses() {
        assert_eq!(
            split_addresses(" a@example.com,, b@example.com ,"),
            vec!["a@example.com".to_string(), "b@example.com".to_string()]
        );
        assert!(split_addresses("").is_empty());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("email.port", 587, 1, u16::MAX).is_ok());
        assert!(validate_range("email.port", 0, 1, u16::MAX).is_err());
    }
}
