//! Inbound HRIS webhook events: the ingress side of the integration
//! named in §6 "External interfaces", mirrored against the outbound
//! [`crate::events::DomainEvent`] enum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A parsed HRIS webhook payload. The field set per variant is
/// deliberately narrow: only what the pipeline needs to decide whether
/// to submit, refresh, or retire an investigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum HrisWebhookEvent {
    /// A hiring workflow reached the background-check step.
    HireInitiated {
        /// The HRIS system's own identifier for the candidate.
        candidate_id: String,
        /// The tenant this candidate belongs to.
        tenant_id: String,
        /// The role category being screened for.
        role_category: String,
        /// When the HRIS raised this event.
        occurred_at: DateTime<Utc>,
    },
    /// The subject granted consent for the background check.
    ConsentGranted {
        /// The HRIS system's own identifier for the candidate.
        candidate_id: String,
        /// Opaque consent token reference.
        consent_token: String,
        /// Scopes the subject consented to.
        consent_scope: Vec<String>,
        /// When consent expires.
        consent_expiry: DateTime<Utc>,
    },
    /// An employee moved into a role with a different compliance
    /// profile (e.g. promoted into a role requiring Enhanced tier),
    /// triggering a re-screen at the new tier.
    PositionChanged {
        /// The HRIS system's own identifier for the employee.
        employee_id: String,
        /// The role category being moved into.
        new_role_category: String,
    },
    /// An employee left, ending ongoing monitoring for them.
    EmployeeTerminated {
        /// The HRIS system's own identifier for the employee.
        employee_id: String,
        /// When the termination took effect.
        occurred_at: DateTime<Utc>,
    },
    /// A former employee is being rehired, requiring a fresh
    /// investigation rather than resuming monitoring on the old one.
    RehireInitiated {
        /// The HRIS system's own identifier for the candidate.
        candidate_id: String,
        /// The tenant this candidate belongs to.
        tenant_id: String,
        /// The role category being screened for.
        role_category: String,
    },
}

impl HrisWebhookEvent {
    /// Whether this event should cause a brand-new investigation to be
    /// submitted, as opposed to updating an existing one.
    pub fn starts_new_investigation(&self) -> bool {
        matches!(self, Self::HireInitiated { .. } | Self::RehireInitiated { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hire_and_rehire_start_new_investigations() {
        let hire = HrisWebhookEvent::HireInitiated {
            candidate_id: "c1".to_string(),
            tenant_id: "t1".to_string(),
            role_category: "finance".to_string(),
            occurred_at: Utc::now(),
        };
        assert!(hire.starts_new_investigation());

        let position_change = HrisWebhookEvent::PositionChanged { employee_id: "e1".to_string(), new_role_category: "executive".to_string() };
        assert!(!position_change.starts_new_investigation());
    }

    #[test]
    fn webhook_events_round_trip_through_json() {
        let event = HrisWebhookEvent::ConsentGranted {
            candidate_id: "c2".to_string(),
            consent_token: "tok-1".to_string(),
            consent_scope: vec!["criminal".to_string()],
            consent_expiry: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let parsed: HrisWebhookEvent = serde_json::from_str(&json).unwrap();
        assert!(matches!(parsed, HrisWebhookEvent::ConsentGranted { .. }));
    }
}
