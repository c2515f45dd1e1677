use serde::Deserialize;
use std::path::PathBuf;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding every artifact file below
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Predictor reference dataset (CSV)
    #[serde(default = "default_dataset_file")]
    pub dataset_file: String,

    /// Trained price pipeline (JSON)
    #[serde(default = "default_pipeline_file")]
    pub pipeline_file: String,

    /// Per-listing analysis dataset with coordinates (CSV)
    #[serde(default = "default_listings_file")]
    pub listings_file: String,

    /// Fallback word-cloud text, optional on disk
    #[serde(default = "default_feature_text_file")]
    pub feature_text_file: String,

    /// Apartment catalogue used to decorate recommendations (CSV)
    #[serde(default = "default_apartments_file")]
    pub apartments_file: String,

    /// Property x location distance table in meters (CSV)
    #[serde(default = "default_location_distance_file")]
    pub location_distance_file: String,

    /// Facilities similarity matrix (JSON), weight 0.5
    #[serde(default = "default_facilities_similarity_file")]
    pub facilities_similarity_file: String,

    /// Price similarity matrix (JSON), weight 0.8
    #[serde(default = "default_price_similarity_file")]
    pub price_similarity_file: String,

    /// Location-advantage similarity matrix (JSON), weight 1.0
    #[serde(default = "default_location_similarity_file")]
    pub location_similarity_file: String,

    /// Number of recommendations when the request does not say
    #[serde(default = "default_recommendation_count")]
    pub default_recommendation_count: usize,

    /// Number of words returned for a word cloud when the request does not say
    #[serde(default = "default_word_limit")]
    pub default_word_limit: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_dataset_file() -> String {
    "properties.csv".to_string()
}

fn default_pipeline_file() -> String {
    "pipeline.json".to_string()
}

fn default_listings_file() -> String {
    "sector_listings.csv".to_string()
}

fn default_feature_text_file() -> String {
    "feature_text.txt".to_string()
}

fn default_apartments_file() -> String {
    "apartments.csv".to_string()
}

fn default_location_distance_file() -> String {
    "location_distance.csv".to_string()
}

fn default_facilities_similarity_file() -> String {
    "cosine_sim1.json".to_string()
}

fn default_price_similarity_file() -> String {
    "cosine_sim2.json".to_string()
}

fn default_location_similarity_file() -> String {
    "cosine_sim3.json".to_string()
}

fn default_recommendation_count() -> usize {
    5
}

fn default_word_limit() -> usize {
    100
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Resolves an artifact file name against the data directory
    pub fn artifact_path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    /// Address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            dataset_file: default_dataset_file(),
            pipeline_file: default_pipeline_file(),
            listings_file: default_listings_file(),
            feature_text_file: default_feature_text_file(),
            apartments_file: default_apartments_file(),
            location_distance_file: default_location_distance_file(),
            facilities_similarity_file: default_facilities_similarity_file(),
            price_similarity_file: default_price_similarity_file(),
            location_similarity_file: default_location_similarity_file(),
            default_recommendation_count: default_recommendation_count(),
            default_word_limit: default_word_limit(),
        }
    }
}
