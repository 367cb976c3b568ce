//! Fixed website trust-point table (0-100).

use super::extract::{ContactInfo, PageSections};

/// Score website trust indicators on the fixed 0-100 point scale.
///
/// TLS: valid certificate 25, HTTPS attempted but broken 10.
/// Contact: phone 15, address 15, email 5.
/// Sections: about 12, privacy 8, terms 5, support 3, social 2.
/// Content volume bonus: >5000 chars 10, >2000 chars 5, >500 chars 2.
#[must_use]
pub fn site_trust_points(
    certificate_valid: bool,
    https_enabled: bool,
    contact: &ContactInfo,
    sections: &PageSections,
    content_length: usize,
) -> u32 {
    let mut points = 0u32;

    if certificate_valid {
        points += 25;
    } else if https_enabled {
        points += 10;
    }

    if contact.phone.is_some() {
        points += 15;
    }
    if contact.address.is_some() {
        points += 15;
    }
    if contact.email.is_some() {
        points += 5;
    }

    if sections.about {
        points += 12;
    }
    if sections.privacy {
        points += 8;
    }
    if sections.terms {
        points += 5;
    }
    if sections.support {
        points += 3;
    }
    if sections.social {
        points += 2;
    }

    if content_length > 5000 {
        points += 10;
    } else if content_length > 2000 {
        points += 5;
    } else if content_length > 500 {
        points += 2;
    }

    points.min(100)
}
