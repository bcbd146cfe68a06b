/// Shared error types for the betting game
///
/// Design Philosophy:
/// - Standardized error codes for consistent error handling across crates
/// - Categorized by error domain (InvalidInput, Validation, Generation, Invariant, ...)
/// - Implements both Display and std::error::Error for compatibility
/// - Includes context fields for debugging (error_code, message, context)
///
/// Usage:
/// - The engine converts its own errors into ServiceError at the presentation boundary
/// - Error codes follow pattern: <CATEGORY>_<SPECIFIC>
/// - Only Validation errors are meant to be shown to players
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error categories that map to log severity and user visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// Malformed construction arguments (empty name, negative balance)
    /// Rejected at the boundary, never enters the ledger
    InvalidInput,

    /// One or more bets violate constraints
    /// Soft and recoverable: players correct their bets and retry
    Validation,

    /// External match/narrative generator failed or returned bad data
    /// Recovered transparently by the local fallback
    Generation,

    /// Programming error: a state the validation layer should have prevented
    Invariant,

    /// Referenced player does not exist
    NotFound,

    /// Operation not legal in the current game phase
    Phase,
}

impl ErrorCategory {
    /// Map error category to log level
    pub fn log_level(&self) -> &'static str {
        match self {
            ErrorCategory::InvalidInput => "warn",
            ErrorCategory::Validation => "info",
            ErrorCategory::Generation => "warn",
            ErrorCategory::Invariant => "error",
            ErrorCategory::NotFound => "warn",
            ErrorCategory::Phase => "warn",
        }
    }

    /// Whether the message is meant for players rather than developers
    pub fn is_user_facing(&self) -> bool {
        matches!(self, ErrorCategory::Validation)
    }
}

/// Standard error codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    // Input errors
    pub const INVALID_INPUT: ErrorCode = ErrorCode("INVALID_INPUT");

    // Validation errors
    pub const VALIDATION_BETS_REJECTED: ErrorCode = ErrorCode("VALIDATION_BETS_REJECTED");

    // Generation errors
    pub const GENERATION_FAILED: ErrorCode = ErrorCode("GENERATION_FAILED");

    // Invariant errors
    pub const INVARIANT_VIOLATED: ErrorCode = ErrorCode("INVARIANT_VIOLATED");

    // Resource errors
    pub const NOT_FOUND_PLAYER: ErrorCode = ErrorCode("NOT_FOUND_PLAYER");

    // Phase errors
    pub const PHASE_ILLEGAL_TRANSITION: ErrorCode = ErrorCode("PHASE_ILLEGAL_TRANSITION");
    pub const PHASE_WRONG_PHASE: ErrorCode = ErrorCode("PHASE_WRONG_PHASE");

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Standardized error structure handed to the presentation layer
///
/// This provides consistent error reporting with:
/// - Structured error codes for programmatic handling
/// - Human-readable messages
/// - Optional context for debugging
/// - Category-based classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceError {
    /// Error category (determines log level and visibility)
    pub category: ErrorCategory,

    /// Structured error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context (e.g. per-player complaints, IDs)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ServiceError {
    /// Create a new ServiceError
    pub fn new(category: ErrorCategory, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            category,
            code: code.as_str().to_string(),
            message: message.into(),
            context: None,
        }
    }

    /// Add context to an error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCategory::InvalidInput,
            ErrorCode::INVALID_INPUT,
            "Invalid input",
        )
        .with_context(reason)
    }

    /// Bets rejected at lock-in; each complaint becomes one line of context
    pub fn bets_rejected(errors: &[String]) -> Self {
        Self::new(
            ErrorCategory::Validation,
            ErrorCode::VALIDATION_BETS_REJECTED,
            format!("{} bet(s) need attention", errors.len()),
        )
        .with_context(errors.join("\n"))
    }

    pub fn generation_failed(error: impl fmt::Display) -> Self {
        Self::new(
            ErrorCategory::Generation,
            ErrorCode::GENERATION_FAILED,
            "Match generation failed",
        )
        .with_context(error.to_string())
    }

    pub fn invariant_violated(detail: impl Into<String>) -> Self {
        Self::new(
            ErrorCategory::Invariant,
            ErrorCode::INVARIANT_VIOLATED,
            "Internal invariant violated",
        )
        .with_context(detail)
    }

    pub fn player_not_found(player_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCategory::NotFound,
            ErrorCode::NOT_FOUND_PLAYER,
            format!("Player not found: {}", player_id),
        )
    }

    pub fn illegal_transition(from: impl fmt::Display, to: impl fmt::Display) -> Self {
        Self::new(
            ErrorCategory::Phase,
            ErrorCode::PHASE_ILLEGAL_TRANSITION,
            format!("Cannot move from {} to {}", from, to),
        )
    }

    pub fn wrong_phase(action: impl fmt::Display, phase: impl fmt::Display) -> Self {
        Self::new(
            ErrorCategory::Phase,
            ErrorCode::PHASE_WRONG_PHASE,
            format!("Cannot {} during {}", action, phase),
        )
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "[{}] {}: {}", self.code, self.message, context)
        } else {
            write!(f, "[{}] {}", self.code, self.message)
        }
    }
}

impl std::error::Error for ServiceError {}

// Convenience type alias
pub type Result<T> = std::result::Result<T, ServiceError>;
