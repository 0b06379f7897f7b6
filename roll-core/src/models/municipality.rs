use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A taxing jurisdiction with a municipal and an education tax rate.
///
/// `municipal_id` comes from the source data; it is never generated here and
/// is immutable once the record exists.  Rate fields serialize as JSON
/// numbers, not strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Municipality {
    pub municipal_id: i64,
    pub municipal_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub municipal_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub education_rate: Decimal,
}

/// Partial update for a [`Municipality`].  Fields absent from the request
/// body keep their stored value; `municipal_id` cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MunicipalityPatch {
    pub municipal_name: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub municipal_rate: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub education_rate: Option<Decimal>,
}

impl MunicipalityPatch {
    /// Overlay the present fields onto an existing record.
    pub fn apply(self, municipality: &mut Municipality) {
        if let Some(name) = self.municipal_name {
            municipality.municipal_name = name;
        }
        if let Some(rate) = self.municipal_rate {
            municipality.municipal_rate = rate;
        }
        if let Some(rate) = self.education_rate {
            municipality.education_rate = rate;
        }
    }
}
