use crate::{DomainError, DomainResult};
use once_cell::sync::Lazy;
use regex::Regex;

static SCHEME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://").expect("scheme pattern is valid"));

static DOMAIN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z0-9-]+\.)+[a-zA-Z]{2,}$").expect("domain pattern is valid")
});

/// Normalizes user input into a bare domain name
///
/// Every `http://` or `https://` occurrence is removed and trailing slashes are
/// stripped. The result must be one or more dot-terminated labels followed by an
/// alphabetic label of at least two characters. Case is preserved.
///
/// # Arguments
///
/// * `input` - Domain or URL as typed by the user
///
/// # Returns
///
/// * `Ok(String)` - The cleaned domain
/// * `Err(DomainError)` - If the cleaned value does not look like a domain
///
/// # Examples
///
/// ```
/// use wayback_robots::url::normalize_domain;
///
/// assert_eq!(normalize_domain("https://example.com/").unwrap(), "example.com");
/// assert_eq!(normalize_domain("sub.example.org").unwrap(), "sub.example.org");
/// assert!(normalize_domain("localhost").is_err());
/// ```
pub fn normalize_domain(input: &str) -> DomainResult<String> {
    let without_scheme = SCHEME_PATTERN.replace_all(input, "");
    let cleaned = without_scheme.trim_end_matches('/');

    if cleaned.is_empty() {
        return Err(DomainError::Empty);
    }

    if !is_valid_domain(cleaned) {
        return Err(DomainError::InvalidFormat(cleaned.to_string()));
    }

    Ok(cleaned.to_string())
}

/// Returns true if `domain` already has the accepted domain shape
pub fn is_valid_domain(domain: &str) -> bool {
    DOMAIN_PATTERN.is_match(domain)
}
