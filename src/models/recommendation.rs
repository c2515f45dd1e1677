use serde::Serialize;

use crate::artifacts::Apartment;

/// A property ranked by composite similarity to the queried one
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    /// 1 is the most similar
    pub rank: usize,
    pub property_name: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Apartment>,
}

/// A property within the search radius of a location
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NearbyProperty {
    pub property_name: String,
    /// Kilometres, rounded to two decimals
    pub distance_km: f64,
}

/// Result of a radius search
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NearbySearch {
    pub location: String,
    pub radius_km: f64,
    pub properties: Vec<NearbyProperty>,
}
