/// Progress of one inbound webhook call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngestionState {
    Received,
    Parsed,
    SignatureChecked,
    Stored,
    OrderProjected,
    Delivered,
    Responded,
}

impl IngestionState {
    pub const ALL: [IngestionState; 7] = [
        IngestionState::Received,
        IngestionState::Parsed,
        IngestionState::SignatureChecked,
        IngestionState::Stored,
        IngestionState::OrderProjected,
        IngestionState::Delivered,
        IngestionState::Responded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IngestionState::Received => "received",
            IngestionState::Parsed => "parsed",
            IngestionState::SignatureChecked => "signature_checked",
            IngestionState::Stored => "stored",
            IngestionState::OrderProjected => "order_projected",
            IngestionState::Delivered => "delivered",
            IngestionState::Responded => "responded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    Forbidden,
}

pub struct IngestionStateMachine;

impl IngestionStateMachine {
    /// Projection and delivery may be skipped; any state after parsing may respond early.
    pub fn can_transition(from: IngestionState, to: IngestionState) -> bool {
        use IngestionState::*;
        matches!(
            (from, to),
            (Received, Parsed)
                | (Received, Responded)
                | (Parsed, SignatureChecked)
                | (SignatureChecked, Stored)
                | (SignatureChecked, Responded)
                | (Stored, OrderProjected)
                | (Stored, Delivered)
                | (Stored, Responded)
                | (OrderProjected, Delivered)
                | (OrderProjected, Responded)
                | (Delivered, Responded)
        )
    }

    pub fn transition(
        from: IngestionState,
        to: IngestionState,
    ) -> Result<IngestionState, TransitionError> {
        if Self::can_transition(from, to) {
            return Ok(to);
        }

        Err(TransitionError::Forbidden)
    }
}
