use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use roll_core::{Municipality, Property, RepositoryError, RollRepository};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Expected file name for the municipality seed data within a seed directory.
pub const MUNICIPALITIES_FILE: &str = "municipalities.csv";
/// Expected file name for the property seed data within a seed directory.
pub const PROPERTIES_FILE: &str = "properties.csv";

/// Errors that can occur when loading seed data.
#[derive(Debug, Error)]
pub enum SeedLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Failed to read seed file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for SeedLoaderError {
    fn from(err: csv::Error) -> Self {
        SeedLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the municipalities CSV file.
///
/// Columns (matched by header name, not position):
/// - `munid`: externally assigned municipal id
/// - `name_municipal_w_type`: municipality name including its type suffix
/// - `municipal_rate`: municipal tax rate as a decimal (e.g. 0.01)
/// - `education_rate`: education tax rate as a decimal
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MunicipalityRecord {
    pub munid: i64,
    pub name_municipal_w_type: String,
    pub municipal_rate: Decimal,
    pub education_rate: Decimal,
}

impl From<MunicipalityRecord> for Municipality {
    fn from(record: MunicipalityRecord) -> Self {
        Municipality {
            municipal_id: record.munid,
            municipal_name: record.name_municipal_w_type,
            municipal_rate: record.municipal_rate,
            education_rate: record.education_rate,
        }
    }
}

/// A single record from the properties CSV file.
///
/// Columns (matched by header name, not position):
/// - `assessment_roll_number`: externally assigned roll number
/// - `assessment_value`: assessed value as a decimal
/// - `municipal_id`: the municipality the property belongs to
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PropertyRecord {
    pub assessment_roll_number: i64,
    pub assessment_value: Decimal,
    pub municipal_id: i64,
}

impl From<PropertyRecord> for Property {
    fn from(record: PropertyRecord) -> Self {
        Property {
            assessment_roll_number: record.assessment_roll_number,
            assessment_value: record.assessment_value,
            municipal_id: record.municipal_id,
        }
    }
}

/// Loader for the startup seed data.
///
/// Parses CSV data and inserts it through the [`RollRepository`] trait, so
/// it works against any registered database backend.  Each file loads in a
/// single batch: a malformed field or a duplicate primary key aborts the
/// whole file with nothing inserted.  There is no deduplication — loading
/// into a non-empty table fails on the first colliding row.
pub struct SeedLoader;

impl SeedLoader {
    /// Parse municipality records from a CSV reader.
    pub fn parse_municipalities<R: Read>(
        reader: R,
    ) -> Result<Vec<MunicipalityRecord>, SeedLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: MunicipalityRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Parse property records from a CSV reader.
    pub fn parse_properties<R: Read>(reader: R) -> Result<Vec<PropertyRecord>, SeedLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: PropertyRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Insert parsed municipality records in one transaction.
    /// Returns the number of rows inserted.
    pub async fn load_municipalities(
        repo: &dyn RollRepository,
        records: Vec<MunicipalityRecord>,
    ) -> Result<usize, SeedLoaderError> {
        let municipalities: Vec<Municipality> =
            records.into_iter().map(Municipality::from).collect();
        Ok(repo.insert_municipalities(&municipalities).await?)
    }

    /// Insert parsed property records in one transaction.
    /// Returns the number of rows inserted.
    pub async fn load_properties(
        repo: &dyn RollRepository,
        records: Vec<PropertyRecord>,
    ) -> Result<usize, SeedLoaderError> {
        let properties: Vec<Property> = records.into_iter().map(Property::from).collect();
        Ok(repo.insert_properties(&properties).await?)
    }

    /// Import both seed files from `dir`, municipalities first.
    ///
    /// Returns `(municipalities_inserted, properties_inserted)`.  The
    /// municipality batch commits before the property file is read, so a
    /// failure in the property file leaves the municipalities in place.
    pub async fn import_dir(
        repo: &dyn RollRepository,
        dir: &Path,
    ) -> Result<(usize, usize), SeedLoaderError> {
        let municipalities = Self::parse_municipalities(open(&dir.join(MUNICIPALITIES_FILE))?)?;
        let municipalities_inserted = Self::load_municipalities(repo, municipalities).await?;

        let properties = Self::parse_properties(open(&dir.join(PROPERTIES_FILE))?)?;
        let properties_inserted = Self::load_properties(repo, properties).await?;

        Ok((municipalities_inserted, properties_inserted))
    }
}

fn open(path: &Path) -> Result<File, SeedLoaderError> {
    File::open(path).map_err(|source| SeedLoaderError::Io {
        path: path.to_path_buf(),
        source,
    })
}
