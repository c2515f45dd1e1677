use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;

/// Row of the predictor reference dataset
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyRecord {
    pub property_type: Option<String>,
    pub sector: Option<String>,
    #[serde(rename = "bedRoom", default, deserialize_with = "csv::invalid_option")]
    pub bedrooms: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub bathroom: Option<f64>,
    pub balcony: Option<String>,
    #[serde(rename = "agePossession")]
    pub age_possession: Option<String>,
    pub furnishing_type: Option<String>,
    pub luxury_category: Option<String>,
    pub floor_category: Option<String>,
}

/// Row of the analysis dataset
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectorListing {
    pub sector: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub price_per_sqft: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub built_up_area: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub features: Option<String>,
}

/// Free-text columns a listing may carry, in the order they are preferred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextField {
    Description,
    Features,
}

impl TextField {
    pub const PRIORITY: [TextField; 2] = [TextField::Description, TextField::Features];

    pub fn column(self) -> &'static str {
        match self {
            TextField::Description => "description",
            TextField::Features => "features",
        }
    }

    pub fn read(self, listing: &SectorListing) -> Option<&str> {
        match self {
            TextField::Description => listing.description.as_deref(),
            TextField::Features => listing.features.as_deref(),
        }
    }
}

/// Analysis dataset plus the free-text columns its header declared
#[derive(Debug, Clone, Default)]
pub struct Listings {
    pub rows: Vec<SectorListing>,
    pub text_fields: Vec<TextField>,
}

impl Listings {
    pub fn from_csv<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let text_fields = TextField::PRIORITY
            .into_iter()
            .filter(|field| headers.iter().any(|h| h == field.column()))
            .collect();
        let rows = csv_reader
            .deserialize()
            .collect::<Result<Vec<SectorListing>, _>>()?;
        Ok(Self { rows, text_fields })
    }

    /// First declared text column in priority order
    pub fn preferred_text_field(&self) -> Option<TextField> {
        TextField::PRIORITY
            .into_iter()
            .find(|field| self.text_fields.contains(field))
    }
}

/// Catalogue entry shown next to a recommended property
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Apartment {
    #[serde(rename(deserialize = "PropertyName"))]
    pub property_name: String,
    #[serde(rename(deserialize = "PropertySubName"), default)]
    pub sub_name: Option<String>,
    #[serde(rename(deserialize = "Link"), default)]
    pub link: Option<String>,
    #[serde(rename(deserialize = "PriceDetails"), default)]
    pub price_details: Option<String>,
    #[serde(rename(deserialize = "TopFacilities"), default)]
    pub top_facilities: Option<String>,
    #[serde(rename(deserialize = "NearbyLocations"), default)]
    pub nearby_locations: Option<String>,
    #[serde(rename(deserialize = "LocationAdvantages"), default)]
    pub location_advantages: Option<String>,
}

/// Apartment catalogue keyed by trimmed property name
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    entries: HashMap<String, Apartment>,
}

impl Catalogue {
    pub fn from_csv<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let apartments: Vec<Apartment> = read_csv(reader)?;
        Ok(Self::from_apartments(apartments))
    }

    /// Later duplicates of a name are ignored
    pub fn from_apartments(apartments: Vec<Apartment>) -> Self {
        let mut entries = HashMap::with_capacity(apartments.len());
        for mut apartment in apartments {
            apartment.property_name = apartment.property_name.trim().to_string();
            if entries.contains_key(&apartment.property_name) {
                tracing::debug!(property = %apartment.property_name, "Duplicate catalogue entry skipped");
                continue;
            }
            entries.insert(apartment.property_name.clone(), apartment);
        }
        Self { entries }
    }

    pub fn get(&self, property: &str) -> Option<&Apartment> {
        self.entries.get(property.trim())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Deserializes every row of a headed CSV
pub fn read_csv<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>, csv::Error> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .deserialize()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_records_tolerate_blanks_and_extra_columns() {
        let csv = "property_type,sector,price,bedRoom,bathroom,balcony,agePossession,furnishing_type,luxury_category,floor_category\n\
                   flat,sector 45,1.2,3,2,1,New Property,0.0,Low,Mid Floor\n\
                   house,,3.4,,3,3+,Old Property,1.0,High,Low Floor\n";
        let records: Vec<PropertyRecord> = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].bedrooms, Some(3.0));
        assert_eq!(records[1].sector, None);
        assert_eq!(records[1].bedrooms, None);
        assert_eq!(records[1].balcony.as_deref(), Some("3+"));
    }

    #[test]
    fn test_listings_detect_text_columns() {
        let csv = "sector,price,price_per_sqft,built_up_area,latitude,longitude,features\n\
                   sector 1,1.0,9000,abc,28.4,77.0,\"pool, gym\"\n";
        let listings = Listings::from_csv(csv.as_bytes()).unwrap();
        assert_eq!(listings.text_fields, vec![TextField::Features]);
        assert_eq!(listings.preferred_text_field(), Some(TextField::Features));
        assert_eq!(listings.rows[0].built_up_area, None);
        assert_eq!(TextField::Features.read(&listings.rows[0]), Some("pool, gym"));
    }

    #[test]
    fn test_catalogue_trims_names_and_keeps_first_entry() {
        let csv = "PropertyName,PropertySubName,Link\n\
                   Oak Towers ,Tower A,https://example.com/a\n\
                   Oak Towers,Tower B,https://example.com/b\n";
        let catalogue = Catalogue::from_csv(csv.as_bytes()).unwrap();
        assert_eq!(catalogue.len(), 1);
        let entry = catalogue.get("Oak Towers").unwrap();
        assert_eq!(entry.sub_name.as_deref(), Some("Tower A"));
    }
}
