//! Contact-information and page-section extraction from fetched site text.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email regex")
});

static PHONE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // International with country code
        r"\+\d{1,3}[\s-]?\d{6,14}",
        // US style with parentheses
        r"\(\d{3}\)\s?\d{3}[-.\s]?\d{4}",
        // Generic ddd-ddd-dddd
        r"\b\d{3}[-.\s]\d{3}[-.\s]\d{4}\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid phone regex"))
    .collect()
});

static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:address|registered\s+office|head\s+office|our\s+office|location)[:\s]+([^\n]{20,200})",
    )
    .expect("valid address regex")
});

static SOCIAL_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:instagram\.com|twitter\.com|x\.com|facebook\.com|fb\.com|linkedin\.com|youtube\.com|youtu\.be)/[\w./-]+",
    )
    .expect("valid social link regex")
});

const ABOUT_KEYWORDS: &[&str] = &[
    "about us",
    "our story",
    "who we are",
    "our mission",
    "founded",
    "company profile",
    "brand story",
];

const PRIVACY_KEYWORDS: &[&str] = &[
    "privacy policy",
    "data protection",
    "cookie policy",
    "privacy notice",
    "personal information",
];

const TERMS_KEYWORDS: &[&str] = &[
    "terms and conditions",
    "terms of service",
    "terms of use",
    "user agreement",
    "disclaimer",
];

const SUPPORT_KEYWORDS: &[&str] = &[
    "customer service",
    "customer care",
    "customer support",
    "help center",
    "support center",
    "contact us",
    "faq",
    "live chat",
];

/// First phone, email, and address found on the page, if any.
#[derive(Debug, Clone, Default)]
pub struct ContactInfo {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl ContactInfo {
    /// Number of distinct contact channels present (0-3).
    #[must_use]
    pub fn channel_count(&self) -> u32 {
        u32::from(self.phone.is_some())
            + u32::from(self.email.is_some())
            + u32::from(self.address.is_some())
    }
}

/// Extract contact information from page text.
#[must_use]
pub fn extract_contact_info(text: &str) -> ContactInfo {
    let phone = PHONE_RES.iter().find_map(|re| {
        re.find_iter(text)
            .map(|m| m.as_str().trim().to_string())
            // Require at least 10 digits once formatting is stripped.
            .find(|candidate| candidate.chars().filter(char::is_ascii_digit).count() >= 10)
    });

    let email = EMAIL_RE
        .find(text)
        .map(|m| m.as_str().to_lowercase());

    let address = ADDRESS_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|a| a.len() > 15);

    ContactInfo {
        phone,
        email,
        address,
    }
}

/// Trust-relevant page sections detected via keyword scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageSections {
    pub about: bool,
    pub privacy: bool,
    pub terms: bool,
    pub support: bool,
    pub social: bool,
}

impl PageSections {
    #[must_use]
    pub fn found_count(&self) -> u32 {
        u32::from(self.about)
            + u32::from(self.privacy)
            + u32::from(self.terms)
            + u32::from(self.support)
            + u32::from(self.social)
    }
}

/// Scan page text for about/privacy/terms/support sections and social links.
#[must_use]
pub fn detect_page_sections(text: &str) -> PageSections {
    let lower = text.to_lowercase();
    let contains_any = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

    PageSections {
        about: contains_any(ABOUT_KEYWORDS),
        privacy: contains_any(PRIVACY_KEYWORDS),
        terms: contains_any(TERMS_KEYWORDS),
        support: contains_any(SUPPORT_KEYWORDS),
        social: SOCIAL_LINK_RE.is_match(text),
    }
}
