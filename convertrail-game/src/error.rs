use thiserror::Error;

/// Which resource blocked an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortfall {
    /// The action costs more than the remaining budget.
    Budget { cost: i64, budget: i64 },
    /// The test would run past the final day.
    Time {
        day: u32,
        days: u32,
        total_days: u32,
    },
}

impl std::fmt::Display for Shortfall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Budget { cost, budget } => {
                write!(f, "cost {cost} exceeds remaining budget {budget}")
            }
            Self::Time {
                day,
                days,
                total_days,
            } => write!(
                f,
                "{days} day(s) from day {day} runs past day {total_days}"
            ),
        }
    }
}

/// Errors surfaced by the game session controller.
///
/// None of these are fatal: every variant leaves the session state exactly as
/// it was before the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    #[error("no game has been started for this session")]
    SessionNotStarted,
    #[error("insufficient resources: {shortfall}")]
    InsufficientResources { shortfall: Shortfall },
    #[error("test {test_id} not found")]
    NotFound { test_id: usize },
    #[error("unknown element {element}")]
    UnknownElement { element: String },
    #[error("unknown variant {variant} for element {element}")]
    UnknownVariant { element: String, variant: String },
    #[error("a test must run for at least one day")]
    InvalidDuration,
    #[error("traffic simulation failed: {0}")]
    Sampling(String),
}

impl GameError {
    /// Whether the error stems from bad player input rather than game state.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnknownElement { .. } | Self::UnknownVariant { .. } | Self::InvalidDuration
        )
    }
}
