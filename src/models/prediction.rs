use serde::{Deserialize, Serialize};

use crate::artifacts::{FeatureRecord, FeatureValue};

/// Smallest built-up area the estimate form accepts, in sq.ft
pub const MIN_BUILT_UP_AREA: f64 = 200.0;
/// Largest built-up area the estimate form accepts, in sq.ft
pub const MAX_BUILT_UP_AREA: f64 = 10_000.0;

/// Values chosen in the price estimation form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureSelection {
    pub property_type: String,
    pub sector: String,
    pub bedrooms: f64,
    pub bathrooms: f64,
    /// Balcony count bucket as it appears in the dataset (e.g. "3+")
    pub balconies: String,
    pub age_possession: String,
    pub built_up_area: f64,
    pub servant_room: u8,
    pub store_room: u8,
    pub furnishing_type: String,
    pub luxury_category: String,
    pub floor_category: String,
}

impl FeatureSelection {
    /// Single-row record using the column names the pipeline was trained on
    pub fn to_record(&self) -> FeatureRecord {
        FeatureRecord::new()
            .with("property_type", FeatureValue::Text(self.property_type.clone()))
            .with("sector", FeatureValue::Text(self.sector.clone()))
            .with("bedRoom", FeatureValue::Number(self.bedrooms))
            .with("bathroom", FeatureValue::Number(self.bathrooms))
            .with("balcony", FeatureValue::Text(self.balconies.clone()))
            .with("agePossession", FeatureValue::Text(self.age_possession.clone()))
            .with("built_up_area", FeatureValue::Number(self.built_up_area))
            .with("servant room", FeatureValue::Number(f64::from(self.servant_room)))
            .with("store room", FeatureValue::Number(f64::from(self.store_room)))
            .with("furnishing_type", FeatureValue::Text(self.furnishing_type.clone()))
            .with("luxury_category", FeatureValue::Text(self.luxury_category.clone()))
            .with("floor_category", FeatureValue::Text(self.floor_category.clone()))
    }
}

/// Estimated price band, in crore
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct PriceEstimate {
    pub estimate: f64,
    pub low: f64,
    pub high: f64,
}

/// Bounds of the built-up area input
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct AreaBounds {
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
}

impl Default for AreaBounds {
    fn default() -> Self {
        Self {
            min: MIN_BUILT_UP_AREA,
            max: MAX_BUILT_UP_AREA,
            default: 1000.0,
            step: 10.0,
        }
    }
}

/// Choices offered by each field of the estimation form
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FormOptions {
    pub property_types: Vec<String>,
    pub sectors: Vec<String>,
    pub bedrooms: Vec<f64>,
    pub bathrooms: Vec<f64>,
    pub balconies: Vec<String>,
    pub age_possession: Vec<String>,
    pub built_up_area: AreaBounds,
    pub servant_room: Vec<u8>,
    pub store_room: Vec<u8>,
    pub furnishing_types: Vec<String>,
    pub luxury_categories: Vec<String>,
    pub floor_categories: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection() -> FeatureSelection {
        FeatureSelection {
            property_type: "flat".into(),
            sector: "sector 45".into(),
            bedrooms: 3.0,
            bathrooms: 2.0,
            balconies: "2".into(),
            age_possession: "New Property".into(),
            built_up_area: 1500.0,
            servant_room: 1,
            store_room: 0,
            furnishing_type: "semifurnished".into(),
            luxury_category: "Medium".into(),
            floor_category: "Mid Floor".into(),
        }
    }

    #[test]
    fn test_record_uses_training_column_names() {
        let record = selection().to_record();
        assert_eq!(record.len(), 12);
        assert_eq!(record.get("bedRoom"), Some(&FeatureValue::Number(3.0)));
        assert_eq!(record.get("servant room"), Some(&FeatureValue::Number(1.0)));
        assert_eq!(
            record.get("agePossession"),
            Some(&FeatureValue::Text("New Property".into()))
        );
        assert_eq!(record.column_names()[0], "property_type");
    }

    #[test]
    fn test_selection_deserializes_from_form_json() {
        let json = r#"{
            "property_type": "house", "sector": "sector 1", "bedrooms": 4, "bathrooms": 3,
            "balconies": "3+", "age_possession": "Relatively New", "built_up_area": 2400,
            "servant_room": 0, "store_room": 1, "furnishing_type": "furnished",
            "luxury_category": "High", "floor_category": "Low Floor"
        }"#;
        let parsed: FeatureSelection = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.bedrooms, 4.0);
        assert_eq!(parsed.store_room, 1);
    }
}
