pub mod error;
pub mod logging;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{ServerConfig, app, run_server};
pub use state::AppState;
