//! Append-only, HMAC-chained audit ledger (§6).

use crate::id::Id;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::collections::VecDeque;

type HmacSha256 = Hmac<Sha256>;

/// One immutable entry in an investigation's audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Monotone sequence number within this ledger, starting at 0.
    pub sequence: u64,
    /// Audit id this event belongs to (ties back to a `RequestContext`).
    pub audit_id: Id,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Short event kind, e.g. `"check.started"`, `"finding.recorded"`,
    /// `"compliance.blocked"`, `"budget.charged"`.
    pub kind: String,
    /// Freeform, serializable detail specific to `kind`.
    pub detail: serde_json::Value,
    /// HMAC of this event chained over the previous event's hash, hex
    /// encoded. The first event chains over the ledger's genesis value.
    pub hmac_chain: String,
}

/// Builder for an [`AuditEvent`] prior to appending, mirroring the ledger's
/// own builder-style construction so call sites read as a flat list of
/// `with_*` calls.
pub struct AuditEventInit {
    audit_id: Id,
    kind: String,
    detail: serde_json::Value,
}

impl AuditEventInit {
    /// Start building an event of the given kind for the given audit id.
    pub fn new(audit_id: Id, kind: impl Into<String>) -> Self {
        Self {
            audit_id,
            kind: kind.into(),
            detail: serde_json::Value::Null,
        }
    }

    /// Attach a detail payload.
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = detail;
        self
    }
}

/// Append-only audit ledger for one investigation.
///
/// Every event is HMAC-chained to the one before it, so a record cannot be
/// removed or reordered without invalidating every chain value after it.
/// The key is per-process; it is not a substitute for signing events for
/// external verification, only for detecting in-process tampering or
/// accidental truncation.
pub struct AuditLedger {
    key: Vec<u8>,
    events: RwLock<VecDeque<AuditEvent>>,
    genesis: String,
}

impl AuditLedger {
    /// Start a new ledger keyed with `hmac_key` (typically derived from a
    /// tenant- or deployment-level secret).
    pub fn new(hmac_key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: hmac_key.into(),
            events: RwLock::new(VecDeque::new()),
            genesis: "genesis".to_string(),
        }
    }

    fn chain_value(&self, previous_chain: &str, sequence: u64, audit_id: Id, kind: &str, detail: &serde_json::Value) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(previous_chain.as_bytes());
        mac.update(&sequence.to_be_bytes());
        mac.update(audit_id.as_uuid().as_bytes());
        mac.update(kind.as_bytes());
        mac.update(detail.to_string().as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Append an event, computing and attaching its chain value.
    pub fn append(&self, init: AuditEventInit) -> AuditEvent {
        let mut events = self.events.write();
        let sequence = events.len() as u64;
        let previous_chain = events.back().map(|e| e.hmac_chain.as_str()).unwrap_or(&self.genesis);
        let hmac_chain = self.chain_value(previous_chain, sequence, init.audit_id, &init.kind, &init.detail);

        let event = AuditEvent {
            sequence,
            audit_id: init.audit_id,
            timestamp: Utc::now(),
            kind: init.kind,
            detail: init.detail,
            hmac_chain,
        };
        events.push_back(event.clone());
        event
    }

    /// All events recorded so far, oldest first.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.read().iter().cloned().collect()
    }

    /// Verify that every event's chain value is consistent with the one
    /// before it. A `false` result means the ledger has been tampered with
    /// or corrupted.
    pub fn verify_chain(&self) -> bool {
        let events = self.events.read();
        let mut previous_chain = self.genesis.clone();
        for (expected_sequence, event) in events.iter().enumerate() {
            if event.sequence != expected_sequence as u64 {
                return false;
            }
            let expected = self.chain_value(&previous_chain, event.sequence, event.audit_id, &event.kind, &event.detail);
            if expected != event.hmac_chain {
                return false;
            }
            previous_chain = event.hmac_chain.clone();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chain_is_verified_over_an_honest_append_sequence() {
        let ledger = AuditLedger::new(b"test-key".to_vec());
        let audit_id = Id::new();
        ledger.append(AuditEventInit::new(audit_id, "check.started").with_detail(json!({"check": "identity"})));
        ledger.append(AuditEventInit::new(audit_id, "check.completed").with_detail(json!({"check": "identity"})));
        assert!(ledger.verify_chain());
        assert_eq!(ledger.events().len(), 2);
    }

    #[test]
    fn tampering_with_a_past_event_breaks_the_chain() {
        let ledger = AuditLedger::new(b"test-key".to_vec());
        let audit_id = Id::new();
        ledger.append(AuditEventInit::new(audit_id, "check.started"));
        ledger.append(AuditEventInit::new(audit_id, "check.completed"));

        {
            let mut events = ledger.events.write();
            events[0].detail = json!({"tampered": true});
        }
        assert!(!ledger.verify_chain());
    }

    #[test]
    fn sequence_numbers_are_dense_and_start_at_zero() {
        let ledger = AuditLedger::new(b"test-key".to_vec());
        let audit_id = Id::new();
        for _ in 0..5 {
            ledger.append(AuditEventInit::new(audit_id, "note"));
        }
        let events = ledger.events();
        for (i, event) in events.iter().enumerate() {
            assert_eq!(event.sequence, i as u64);
        }
    }
}
