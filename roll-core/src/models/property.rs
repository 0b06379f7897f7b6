use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An assessed real-estate record, keyed by its assessment roll number.
///
/// `municipal_id` points at a [`crate::Municipality`] but is not validated
/// against one: the reference may dangle if the municipality is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub assessment_roll_number: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub assessment_value: Decimal,
    pub municipal_id: i64,
}

/// Partial update for a [`Property`].  The roll number itself cannot be
/// patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PropertyPatch {
    #[serde(with = "rust_decimal::serde::float_option")]
    pub assessment_value: Option<Decimal>,
    pub municipal_id: Option<i64>,
}

impl PropertyPatch {
    pub fn apply(self, property: &mut Property) {
        if let Some(value) = self.assessment_value {
            property.assessment_value = value;
        }
        if let Some(id) = self.municipal_id {
            property.municipal_id = id;
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn sample() -> Property {
        Property {
            assessment_roll_number: 100,
            assessment_value: dec!(40000),
            municipal_id: 1,
        }
    }

    #[test]
    fn apply_patch_keeps_absent_fields() {
        let mut p = sample();
        let patch = PropertyPatch {
            assessment_value: Some(dec!(50000)),
            municipal_id: None,
        };
        patch.apply(&mut p);

        assert_eq!(p.assessment_roll_number, 100);
        assert_eq!(p.assessment_value, dec!(50000));
        assert_eq!(p.municipal_id, 1);
    }

    #[test]
    fn value_serializes_as_json_number() {
        let value = serde_json::to_value(sample()).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "assessment_roll_number": 100,
                "assessment_value": 40000.0,
                "municipal_id": 1,
            })
        );
    }
}
