use crate::domain::entities::delivery_attempt::DeliveryAttempt;
use crate::domain::value_objects::delivery_mode::DeliveryMode;
use crate::domain::value_objects::ids::{DeliveryId, EndpointId, EventId};
use crate::domain::value_objects::timestamps::Timestamp;
use time::OffsetDateTime;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DeliveryAttemptRow {
    pub id: uuid::Uuid,
    pub event_id: String,
    pub attempt_number: i32,
    pub status: String,
    pub error_message: Option<String>,
    pub mode_used: Option<String>,
    pub latency_ms: Option<i64>,
    pub endpoint_id: Option<i64>,
    pub endpoint_url_snapshot: Option<String>,
    pub received_at: OffsetDateTime,
}

impl DeliveryAttemptRow {
    pub fn from_attempt(attempt: &DeliveryAttempt) -> Self {
        Self {
            id: attempt.id.0,
            event_id: attempt.event_id.as_str().to_string(),
            attempt_number: attempt.attempt_number,
            status: attempt.status.clone(),
            error_message: attempt.error_message.clone(),
            mode_used: attempt.mode_used.map(|m| m.as_str().to_string()),
            latency_ms: attempt.latency_ms,
            endpoint_id: attempt.endpoint_id.map(|id| id.0),
            endpoint_url_snapshot: attempt.endpoint_url_snapshot.clone(),
            received_at: attempt.received_at.as_inner(),
        }
    }

    /// Legacy rows may carry no mode or one this build does not know; both map to `None`.
    pub fn into_attempt(self) -> DeliveryAttempt {
        DeliveryAttempt {
            id: DeliveryId(self.id),
            event_id: EventId(self.event_id),
            attempt_number: self.attempt_number,
            status: self.status,
            error_message: self.error_message,
            mode_used: self
                .mode_used
                .as_deref()
                .and_then(|m| DeliveryMode::parse(m).ok()),
            latency_ms: self.latency_ms,
            endpoint_id: self.endpoint_id.map(EndpointId),
            endpoint_url_snapshot: self.endpoint_url_snapshot,
            received_at: Timestamp::from(self.received_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_legacy_row_without_mode_when_into_attempt_should_keep_none() {
        let row = DeliveryAttemptRow {
            id: uuid::Uuid::new_v4(),
            event_id: "evt_1".to_string(),
            attempt_number: 3,
            status: "200".to_string(),
            error_message: None,
            mode_used: None,
            latency_ms: None,
            endpoint_id: None,
            endpoint_url_snapshot: None,
            received_at: OffsetDateTime::now_utc(),
        };

        let attempt = row.into_attempt();

        assert_eq!(attempt.attempt_number, 3);
        assert_eq!(attempt.mode_used, None);
        assert_eq!(attempt.endpoint_id, None);
    }

    #[test]
    fn given_attempt_when_from_attempt_should_render_mode_text() {
        let row = DeliveryAttemptRow {
            id: uuid::Uuid::new_v4(),
            event_id: "evt_1".to_string(),
            attempt_number: 1,
            status: "503".to_string(),
            error_message: Some("simulated_offline".to_string()),
            mode_used: Some("offline".to_string()),
            latency_ms: Some(1),
            endpoint_id: Some(4),
            endpoint_url_snapshot: Some("http://x".to_string()),
            received_at: OffsetDateTime::now_utc(),
        };
        let attempt = row.clone().into_attempt();

        let back = DeliveryAttemptRow::from_attempt(&attempt);

        assert_eq!(back.mode_used.as_deref(), Some("offline"));
        assert_eq!(back.endpoint_id, Some(4));
        assert_eq!(back.id, row.id);
    }
}
