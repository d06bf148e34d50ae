pub mod policy;
pub mod reports;
pub mod simulation;

pub use policy::Strategy;
pub use simulation::{GameRun, StrategySummary, play_game, summarize};
