use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Municipality, MunicipalityPatch, Property, PropertyPatch};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Duplicate primary key: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Row-level storage for the assessment roll.
///
/// Every method is a single independent commit; there are no transactions
/// spanning multiple calls.  The `insert_*` batch methods are the one
/// exception: each runs in its own transaction so a seed file loads
/// all-or-nothing.
#[async_trait]
pub trait RollRepository: Send + Sync {
    // Municipalities
    async fn list_municipalities(&self) -> Result<Vec<Municipality>, RepositoryError>;
    async fn get_municipality(&self, municipal_id: i64) -> Result<Municipality, RepositoryError>;

    /// Insert a new municipality.  Fails with [`RepositoryError::Conflict`]
    /// if the id is already taken.
    async fn create_municipality(
        &self,
        municipality: &Municipality,
    ) -> Result<Municipality, RepositoryError>;

    /// Overlay `patch` onto the stored record and return the result.
    async fn update_municipality(
        &self,
        municipal_id: i64,
        patch: MunicipalityPatch,
    ) -> Result<Municipality, RepositoryError>;

    /// Delete by id.  Properties referencing the municipality are left
    /// untouched; their references dangle.
    async fn delete_municipality(&self, municipal_id: i64) -> Result<(), RepositoryError>;

    /// Insert a batch in one transaction.  Any failure rolls the whole
    /// batch back.  Returns the number of rows inserted.
    async fn insert_municipalities(
        &self,
        municipalities: &[Municipality],
    ) -> Result<usize, RepositoryError>;

    // Properties
    async fn list_properties(&self) -> Result<Vec<Property>, RepositoryError>;
    async fn get_property(
        &self,
        assessment_roll_number: i64,
    ) -> Result<Property, RepositoryError>;

    async fn create_property(&self, property: &Property) -> Result<Property, RepositoryError>;

    async fn update_property(
        &self,
        assessment_roll_number: i64,
        patch: PropertyPatch,
    ) -> Result<Property, RepositoryError>;

    async fn delete_property(&self, assessment_roll_number: i64) -> Result<(), RepositoryError>;

    async fn insert_properties(&self, properties: &[Property]) -> Result<usize, RepositoryError>;
}
