use crate::id::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of a typed identifier attached to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentifierKind {
    /// US Social Security Number.
    Ssn,
    /// US Employer Identification Number.
    Ein,
    /// Passport number.
    Passport,
    /// Email address.
    Email,
    /// Phone number.
    Phone,
}

impl IdentifierKind {
    /// Strong identifiers participate in the exact-match step and the
    /// no-two-entities-share-a-strong-identifier invariant. Email/phone are
    /// useful signals but not strong enough to canonicalize on alone.
    pub fn is_strong(self) -> bool {
        matches!(self, Self::Ssn | Self::Ein | Self::Passport)
    }
}

/// A single observed identifier for an entity, with its provenance.
///
/// `normalized` is what matching compares; `original` is retained verbatim
/// for display and audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifierRecord {
    /// The entity this identifier belongs to.
    pub entity_id: Id,
    /// The kind of identifier.
    pub kind: IdentifierKind,
    /// The normalized value, used for matching.
    pub normalized: String,
    /// The original, as-observed value.
    pub original: String,
    /// Confidence in this observation, in `[0, 1]`.
    pub confidence: f64,
    /// The provider or source that supplied this identifier.
    pub source: String,
    /// When this identifier was first observed.
    pub first_seen: DateTime<Utc>,
}

impl IdentifierRecord {
    /// Normalize a raw value per its kind's rules (§4.E step 1):
    /// SSN/EIN strip to digits, phone to E.164-ish digits, email
    /// lowercased.
    pub fn normalize(kind: IdentifierKind, raw: &str) -> String {
        match kind {
            IdentifierKind::Ssn | IdentifierKind::Ein => {
                raw.chars().filter(char::is_ascii_digit).collect()
            }
            IdentifierKind::Phone => {
                let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
                if digits.len() == 10 {
                    format!("1{digits}")
                } else {
                    digits
                }
            }
            IdentifierKind::Email => raw.trim().to_ascii_lowercase(),
            IdentifierKind::Passport => raw
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_uppercase(),
        }
    }

    /// Build a record, normalizing the raw value according to its kind.
    pub fn new(
        entity_id: Id,
        kind: IdentifierKind,
        raw: impl Into<String>,
        confidence: f64,
        source: impl Into<String>,
    ) -> Self {
        let original = raw.into();
        let normalized = Self::normalize(kind, &original);
        Self {
            entity_id,
            kind,
            normalized,
            original,
            confidence,
            source: source.into(),
            first_seen: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ssn_normalizes_to_digits_only() {
        assert_eq!(
            IdentifierRecord::normalize(IdentifierKind::Ssn, "123-45-6789"),
            "123456789"
        );
    }

    #[test]
    fn email_normalizes_to_lowercase() {
        assert_eq!(
            IdentifierRecord::normalize(IdentifierKind::Email, "Jane.DOE@Example.com "),
            "jane.doe@example.com"
        );
    }

    #[test]
    fn phone_normalizes_to_e164_like_digits() {
        assert_eq!(
            IdentifierRecord::normalize(IdentifierKind::Phone, "(415) 555-0100"),
            "14155550100"
        );
    }
}
