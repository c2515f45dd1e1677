use serde::Serialize;

use crate::artifacts::TextField;

/// Sector choice meaning "no sector filter"
pub const ALL_SECTORS: &str = "All Sectors";

/// Per-sector averages used by the map view
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SectorSummary {
    pub sector: String,
    pub listings: usize,
    pub price: Option<f64>,
    pub price_per_sqft: Option<f64>,
    pub built_up_area: f64,
    pub latitude: f64,
    pub longitude: f64,
}

/// Where word-cloud text came from
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    Listing(TextField),
    FeatureText,
    None,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Word frequencies for one sector, or every sector when `sector` is `None`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WordCloud {
    pub sector: Option<String>,
    pub source: TextSource,
    pub words: Vec<WordCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_source_serialization() {
        assert_eq!(
            serde_json::to_string(&TextSource::FeatureText).unwrap(),
            "\"feature_text\""
        );
        assert_eq!(
            serde_json::to_string(&TextSource::Listing(TextField::Description)).unwrap(),
            r#"{"listing":"description"}"#
        );
    }
}
