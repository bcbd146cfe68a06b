use shared::errors::{ErrorCategory, ServiceError};
use shared::{PlayerId, ValidationError};

use crate::phase::GamePhase;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bets rejected: {}", .0.join("; "))]
    ValidationFailure(Vec<String>),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Illegal phase transition from {from} to {to}")]
    IllegalTransition { from: GamePhase, to: GamePhase },

    #[error("Cannot {action} during {phase}")]
    WrongPhase { action: &'static str, phase: GamePhase },

    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),
}

impl EngineError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EngineError::InvalidInput(_) => ErrorCategory::InvalidInput,
            EngineError::ValidationFailure(_) => ErrorCategory::Validation,
            EngineError::Generation(_) => ErrorCategory::Generation,
            EngineError::InvariantViolation(_) => ErrorCategory::Invariant,
            EngineError::IllegalTransition { .. } | EngineError::WrongPhase { .. } => {
                ErrorCategory::Phase
            }
            EngineError::PlayerNotFound(_) => ErrorCategory::NotFound,
        }
    }

    /// Convert to the service envelope, logged at the level its category calls for
    pub fn report(self) -> ServiceError {
        let service = ServiceError::from(self);
        match service.category.log_level() {
            "error" => tracing::error!(code = %service.code, error = %service, "Engine error"),
            "warn" => tracing::warn!(code = %service.code, error = %service, "Engine error"),
            _ => tracing::info!(code = %service.code, error = %service, "Engine error"),
        }
        service
    }

    pub(crate) fn invariant(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        tracing::error!(detail = %detail, "Invariant violated");
        EngineError::InvariantViolation(detail)
    }
}

/// Money arithmetic overflow inside the engine can only come from a broken invariant
impl From<ValidationError> for EngineError {
    fn from(error: ValidationError) -> Self {
        EngineError::invariant(error.to_string())
    }
}

impl From<EngineError> for ServiceError {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::InvalidInput(ref msg) => ServiceError::invalid_input(msg.clone()),
            EngineError::ValidationFailure(ref errors) => ServiceError::bets_rejected(errors),
            EngineError::Generation(ref msg) => ServiceError::generation_failed(msg),
            EngineError::InvariantViolation(ref msg) => ServiceError::invariant_violated(msg.clone()),
            EngineError::IllegalTransition { from, to } => ServiceError::illegal_transition(from, to),
            EngineError::WrongPhase { action, phase } => ServiceError::wrong_phase(action, phase),
            EngineError::PlayerNotFound(id) => ServiceError::player_not_found(id),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
