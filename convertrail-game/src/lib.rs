//! Convertrail Game Engine
//!
//! Platform-agnostic core of the Convertrail A/B-testing game: the economy,
//! the element catalog, traffic simulation, significance testing and the
//! per-player session controller. No HTTP or rendering concerns live here.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod numbers;
pub mod rules;
pub mod sampling;
pub mod session;
pub mod state;
pub mod stats;
pub mod view;

// Re-export commonly used types
pub use catalog::{CatalogError, ElementCatalog, VariantTable};
pub use config::{ConfigError, GameConfig};
pub use error::{GameError, Shortfall};
pub use rules::{Rules, RulesError};
pub use sampling::{ArmSample, TrafficSample, simulate_arm, simulate_test};
pub use session::{ChangeReceipt, GameSession, TestOutcome, TestRequest};
pub use state::{GameState, TestRecord};
pub use stats::{ChiSquareOutcome, ContingencyTable, chi_square_test};
pub use view::{Bar, ChartSpec, GameView, TestResultView, TestSummary};
