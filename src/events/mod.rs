/// OCS wire event contract - typed decoding of inbound frames
///
/// Inbound frames are UTF-8 JSON objects with a required `type`
/// discriminator. Decoding fails closed: unknown discriminators and
/// malformed payloads are rejected with a FrameDecode error that the
/// channel logs and discards, so a single bad frame never terminates
/// event delivery for everything else.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::FRAME_SAMPLE_LEN;
use crate::errors::{NotifyError, NotifyResult};

/// A server-originated OCS event
///
/// Events are transient: decoded once per frame, fanned out to every
/// consumer, never persisted. `ocs_pk` is the stable numeric identity of
/// the affected order; `ocs_id` is its display identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OcsEvent {
    /// An order moved between workflow statuses
    #[serde(rename = "OCS_STATUS_CHANGED", rename_all = "camelCase")]
    StatusChanged {
        ocs_id: String,
        ocs_pk: i64,
        from_status: String,
        to_status: String,
        job_role: String,
        patient_name: String,
        actor_name: String,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// A new order was registered
    #[serde(rename = "OCS_CREATED", rename_all = "camelCase")]
    Created {
        ocs_id: String,
        ocs_pk: i64,
        job_role: String,
        job_type: String,
        priority: String,
        patient_name: String,
        doctor_name: String,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// An order was cancelled
    #[serde(rename = "OCS_CANCELLED", rename_all = "camelCase")]
    Cancelled {
        ocs_id: String,
        ocs_pk: i64,
        reason: String,
        actor_name: String,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl OcsEvent {
    /// Display identifier of the affected order
    pub fn ocs_id(&self) -> &str {
        match self {
            OcsEvent::StatusChanged { ocs_id, .. } => ocs_id,
            OcsEvent::Created { ocs_id, .. } => ocs_id,
            OcsEvent::Cancelled { ocs_id, .. } => ocs_id,
        }
    }

    /// Stable numeric identity of the affected order
    pub fn ocs_pk(&self) -> i64 {
        match self {
            OcsEvent::StatusChanged { ocs_pk, .. } => *ocs_pk,
            OcsEvent::Created { ocs_pk, .. } => *ocs_pk,
            OcsEvent::Cancelled { ocs_pk, .. } => *ocs_pk,
        }
    }

    /// Human-readable summary carried by every variant
    pub fn message(&self) -> &str {
        match self {
            OcsEvent::StatusChanged { message, .. } => message,
            OcsEvent::Created { message, .. } => message,
            OcsEvent::Cancelled { message, .. } => message,
        }
    }

    /// Server-clock timestamp carried by every variant
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            OcsEvent::StatusChanged { timestamp, .. } => *timestamp,
            OcsEvent::Created { timestamp, .. } => *timestamp,
            OcsEvent::Cancelled { timestamp, .. } => *timestamp,
        }
    }
}

/// Decode a raw inbound frame into a typed event
///
/// Fails closed: any payload that is not one of the three known event
/// shapes yields a FrameDecode error with a truncated sample for
/// diagnosis.
pub fn decode_frame(raw: &str) -> NotifyResult<OcsEvent> {
    serde_json::from_str::<OcsEvent>(raw).map_err(|e| NotifyError::FrameDecode {
        reason: format!("{} (payload: {})", e, truncate_sample(raw)),
    })
}

fn truncate_sample(raw: &str) -> String {
    if raw.len() <= FRAME_SAMPLE_LEN {
        raw.to_string()
    } else {
        let mut end = FRAME_SAMPLE_LEN;
        while !raw.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &raw[..end])
    }
}
