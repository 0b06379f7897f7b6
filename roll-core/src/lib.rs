pub mod db;
pub mod models;

pub use db::repository::{RepositoryError, RollRepository};
pub use models::*;
