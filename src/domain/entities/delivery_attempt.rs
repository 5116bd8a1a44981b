use crate::domain::value_objects::delivery_mode::DeliveryMode;
use crate::domain::value_objects::ids::{DeliveryId, EndpointId, EventId};
use crate::domain::value_objects::timestamps::Timestamp;

/// Status recorded when the forward never produced an HTTP response.
pub const TRANSPORT_FAILURE_STATUS: &str = "0";

/// One forwarding try, real or simulated. Immutable once recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryAttempt {
    pub id: DeliveryId,
    pub event_id: EventId,
    pub attempt_number: i32,
    pub status: String,
    pub error_message: Option<String>,
    pub mode_used: Option<DeliveryMode>,
    pub latency_ms: Option<i64>,
    pub endpoint_id: Option<EndpointId>,
    pub endpoint_url_snapshot: Option<String>,
    pub received_at: Timestamp,
}

impl DeliveryAttempt {
    /// Numeric HTTP status, or `None` for transport failures and legacy text.
    pub fn status_code(&self) -> Option<u16> {
        self.status.parse::<u16>().ok().filter(|code| *code != 0)
    }

    pub fn is_success(&self) -> bool {
        self.error_message.is_none() && self.status_code().is_some_and(|code| code < 400)
    }
}

/// Attempt contents before an attempt number has been assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAttempt {
    pub event_id: EventId,
    pub status: String,
    pub error_message: Option<String>,
    pub mode_used: DeliveryMode,
    pub latency_ms: i64,
    pub endpoint_id: Option<EndpointId>,
    pub endpoint_url_snapshot: Option<String>,
}

impl PendingAttempt {
    pub fn into_attempt(self, attempt_number: i32, received_at: Timestamp) -> DeliveryAttempt {
        DeliveryAttempt {
            id: DeliveryId::new(),
            event_id: self.event_id,
            attempt_number,
            status: self.status,
            error_message: self.error_message,
            mode_used: Some(self.mode_used),
            latency_ms: Some(self.latency_ms),
            endpoint_id: self.endpoint_id,
            endpoint_url_snapshot: self.endpoint_url_snapshot,
            received_at,
        }
    }
}
