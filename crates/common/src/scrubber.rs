use once_cell::sync::Lazy;
use regex::Regex;

/// PII scrubber for audit records and log messages.
///
/// ### WARNING
/// This utility uses regex-based patterns which is a **best-effort**
/// approach. It is intended for defense-in-depth and does not guarantee
/// complete sanitization of all PII, especially in complex SQL dialects
/// or concatenated strings.
///
/// For high-compliance environments, consider disabling query previews
/// entirely via the audit settings.
static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}").unwrap());

static SSN_REGEX: Lazy<Regex> = Lazy::new(|| {
    // Basic US SSN pattern: XXX-XX-XXXX
    Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap()
});

static CREDIT_CARD_REGEX: Lazy<Regex> = Lazy::new(|| {
    // Basic 13-16 digit pattern, often grouped by hyphens or spaces
    Regex::new(r"\b(?:\d[ -]*?){13,16}\b").unwrap()
});

static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    // Matches common phone formats like (XXX) XXX-XXXX or XXX-XXX-XXXX
    Regex::new(r"(?:\+?1[-. ]?)?\(?\d{3}\)?[-. ]?\d{3}[-. ]?\d{4}").unwrap()
});

/// Audit records carry at most this many characters of query text.
pub const PREVIEW_MAX_CHARS: usize = 100;

pub fn scrub(input: &str) -> String {
    let mut scrubbed = input.to_string();

    scrubbed = EMAIL_REGEX.replace_all(&scrubbed, "[EMAIL]").to_string();
    scrubbed = SSN_REGEX.replace_all(&scrubbed, "[SSN]").to_string();
    scrubbed = CREDIT_CARD_REGEX
        .replace_all(&scrubbed, "[CREDIT_CARD]")
        .to_string();
    scrubbed = PHONE_REGEX.replace_all(&scrubbed, "[PHONE]").to_string();

    scrubbed
}

/// Scrub a query text and truncate it to [`PREVIEW_MAX_CHARS`] characters
/// (on a char boundary). The full text never reaches the audit trail.
pub fn preview(sql: &str) -> String {
    let scrubbed = scrub(sql);
    match scrubbed.char_indices().nth(PREVIEW_MAX_CHARS) {
        Some((idx, _)) => scrubbed[..idx].to_string(),
        None => scrubbed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrub_email() {
        let input = "SELECT * FROM users WHERE email = 'test@example.com'";
        assert_eq!(scrub(input), "SELECT * FROM users WHERE email = '[EMAIL]'");
    }

    #[test]
    fn test_scrub_ssn() {
        let input = "INSERT INTO sensitive (ssn) VALUES ('123-45-6789')";
        assert_eq!(scrub(input), "INSERT INTO sensitive (ssn) VALUES ('[SSN]')");
    }

    #[test]
    fn test_scrub_credit_card() {
        let input = "The card number is 1234-5678-9012-3456.";
        assert_eq!(scrub(input), "The card number is [CREDIT_CARD].");
    }

    #[test]
    fn test_scrub_phone() {
        let input = "Call me at 123-456-7890 or (555) 123-4567";
        assert_eq!(scrub(input), "Call me at [PHONE] or [PHONE]");
    }

    #[test]
    fn test_preview_bounds_length() {
        let long = format!("SELECT '{}' FROM t", "x".repeat(500));
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_MAX_CHARS);
        assert!(long.starts_with(&p));
    }

    #[test]
    fn test_preview_short_queries_pass_through() {
        assert_eq!(preview("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn test_preview_scrubs_before_truncating() {
        let input = format!(
            "SELECT * FROM users WHERE email = 'alice@example.com' -- {}",
            "pad ".repeat(50)
        );
        let p = preview(&input);
        assert!(p.contains("[EMAIL]"));
        assert!(!p.contains("alice@example.com"));
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let input = "é".repeat(200);
        let p = preview(&input);
        assert_eq!(p.chars().count(), PREVIEW_MAX_CHARS);
    }
}
