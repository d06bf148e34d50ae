pub mod bar_chart;
pub mod layout;
pub mod stats_bar;

pub use bar_chart::BarChart;
pub use layout::Shell;
pub use stats_bar::StatsBar;
