//! Realtime events pushed to connected clients.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Scope;

/// An event broadcast to clients as a `{"type": ..., "payload": ...}`
/// envelope. Events are ephemeral: constructed, serialized, delivered,
/// discarded, never persisted.
///
/// Clients treat each event as an independent "something changed, refetch
/// if relevant" hint; no ordering is guaranteed. New variants must keep
/// the same two-field envelope shape so client-side discriminated-union
/// parsing stays forward compatible.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum RealtimeEvent {
    /// The clinic-wide visit queue for a day changed.
    #[serde(rename_all = "camelCase")]
    ClinicQueueUpdated { visit_date: NaiveDate },
    /// A single doctor's queue for a day changed.
    #[serde(rename_all = "camelCase")]
    DoctorQueueUpdated {
        doctor_id: String,
        visit_date: NaiveDate,
    },
}

impl RealtimeEvent {
    /// The routing scope this event targets. `None` means every open
    /// connection receives it.
    pub fn target_scope(&self) -> Option<Scope> {
        match self {
            RealtimeEvent::ClinicQueueUpdated { .. } => None,
            RealtimeEvent::DoctorQueueUpdated { doctor_id, .. } => {
                Some(Scope::doctor(doctor_id))
            }
        }
    }

    /// Discriminator string, as it appears on the wire.
    pub fn type_name(&self) -> &'static str {
        match self {
            RealtimeEvent::ClinicQueueUpdated { .. } => "ClinicQueueUpdated",
            RealtimeEvent::DoctorQueueUpdated { .. } => "DoctorQueueUpdated",
        }
    }
}
