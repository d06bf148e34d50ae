pub mod error;
pub mod game;
pub mod home;
pub mod results;

pub use error::ErrorPage;
pub use game::GamePage;
pub use home::HomePage;
pub use results::ResultsPage;
pub use run_test::RunTestPage;
