//! Contact-detail extraction and contact-question detection

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+").expect("Invalid email regex")
});

static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+\d{1,3}[\s-]?)?(?:\(\d{2,4}\)[\s-]?|\d{2,4}[\s-]?)?\d{3,4}[\s-]?\d{3,4}")
        .expect("Invalid phone regex")
});

static ADDRESS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:address|addr)[^\n\r:]*[:\-]?\s*(.*)").expect("Invalid address regex")
});

/// Keyword patterns that mark a question as asking for contact information
static CONTACT_QUESTION_KEYWORDS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"contact (details|information|info|email|phone|number|address|support)",
        r"how can i (contact|reach|get in touch|talk to|email|call|phone|find|connect with) ?(support|someone|person)?",
        r"who do i (contact|reach out to|email|call|phone|find|connect with) ?(support|someone|person)?",
        r"email address",
        r"phone number",
        r"contact person",
        r"support (email|number|contact|team|person|details|info|information)",
        r"reach (support|someone|person|team)",
        r"get in touch (with)? (support|someone|person|team)?",
        r"how do i (contact|reach|get in touch with|email|call|phone|find|connect with) ?(support|someone|person)?",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){}", p)).expect("Invalid contact keyword regex"))
    .collect()
});

/// Contact details extracted from a document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactDetails {
    /// Email addresses
    pub emails: Vec<String>,
    /// Phone numbers
    pub phones: Vec<String>,
    /// Address lines
    pub addresses: Vec<String>,
}

impl ContactDetails {
    /// True when nothing was extracted
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty() && self.phones.is_empty() && self.addresses.is_empty()
    }

    /// Render the details as a short answer sentence
    pub fn summarize(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let mut parts = Vec::new();
        if !self.emails.is_empty() {
            parts.push(format!("Email: {}", self.emails.join(", ")));
        }
        if !self.phones.is_empty() {
            parts.push(format!("Phone: {}", self.phones.join(", ")));
        }
        if !self.addresses.is_empty() {
            parts.push(format!("Address: {}", self.addresses.join("; ")));
        }

        Some(parts.join(". "))
    }
}

/// Check if a question is likely asking for contact details
pub fn is_contact_question(question: &str) -> bool {
    CONTACT_QUESTION_KEYWORDS
        .iter()
        .any(|pattern| pattern.is_match(question))
}

/// Extract email addresses, phone numbers and address lines from text
///
/// Results are deduplicated preserving first occurrence. The address
/// heuristic captures the remainder of lines mentioning "address".
pub fn extract_contact_details(text: &str) -> ContactDetails {
    let emails = dedup(EMAIL_PATTERN.find_iter(text).map(|m| m.as_str().to_string()));

    let phones = dedup(
        PHONE_PATTERN
            .find_iter(text)
            .map(|m| m.as_str().trim().to_string())
            // Drop bare short digit runs the permissive pattern lets through
            .filter(|p| p.chars().filter(|c| c.is_ascii_digit()).count() >= 7),
    );

    let addresses = dedup(
        ADDRESS_PATTERN
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|a| a.len() > 5),
    );

    ContactDetails {
        emails,
        phones,
        addresses,
    }
}

/// Deduplicate preserving first-seen order
fn dedup(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items.filter(|item| seen.insert(item.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_contact_question() {
        assert!(is_contact_question("How can I contact support?"));
        assert!(is_contact_question("What is the support email address?"));
        assert!(is_contact_question("Who do I call about my claim phone number"));
        assert!(!is_contact_question("What is the grace period for premium payment?"));
    }

    #[test]
    fn test_extract_emails_and_phones() {
        let text = "Write to claims@insurer.example.com or call +91 98765 43210. \
                    Duplicate: claims@insurer.example.com";
        let details = extract_contact_details(text);
        assert_eq!(details.emails, vec!["claims@insurer.example.com"]);
        assert_eq!(details.emails.len(), 1);
        assert!(details.phones.iter().any(|p| p.contains("98765")));
    }

    #[test]
    fn test_extract_address_lines() {
        let text = "Registered Address: 42 Marine Drive, Mumbai 400001\nOther line";
        let details = extract_contact_details(text);
        assert_eq!(details.addresses, vec!["42 Marine Drive, Mumbai 400001"]);
    }

    #[test]
    fn test_short_digit_runs_are_not_phones() {
        let details = extract_contact_details("Section 12 34 applies.");
        assert!(details.phones.is_empty());
    }

    #[test]
    fn test_summarize_formats_answer() {
        let details = ContactDetails {
            emails: vec!["a@b.com".to_string()],
            phones: vec!["+1 555 123 4567".to_string()],
            addresses: vec![],
        };
        let summary = details.summarize().unwrap();
        assert!(summary.contains("Email: a@b.com"));
        assert!(summary.contains("Phone: +1 555 123 4567"));
        assert!(ContactDetails::default().summarize().is_none());
    }
}
