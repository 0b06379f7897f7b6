pub mod health;
pub mod municipalities;
pub mod properties;
