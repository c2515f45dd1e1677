//! Static artifacts produced outside this service.
//!
//! Everything here is loaded once at startup, validated for mutual
//! alignment, and then shared read-only.

use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;

pub mod dataset;
pub mod distance;
pub mod matrix;
pub mod pipeline;

pub use dataset::{Apartment, Catalogue, Listings, PropertyRecord, SectorListing, TextField};
pub use distance::DistanceTable;
pub use matrix::{SimilarityMatrix, SIMILARITY_WEIGHTS};
pub use pipeline::{
    FeatureRecord, FeatureValue, LinearPipeline, PipelineError, PricePipeline, UnknownCategory,
};

/// Errors raised while loading or validating artifacts
#[derive(thiserror::Error, Debug)]
pub enum ArtifactError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact {name}: {reason}")]
    Invalid { name: String, reason: String },

    #[error("artifact {name} is not aligned with the property index: {reason}")]
    Misaligned { name: String, reason: String },
}

impl ArtifactError {
    fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ArtifactError::Invalid {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// The three input similarity matrices, in weight order
pub struct SimilarityInputs {
    pub facilities: SimilarityMatrix,
    pub price: SimilarityMatrix,
    pub location: SimilarityMatrix,
}

/// Every artifact the service needs, validated and ready for lookups
pub struct Artifacts {
    pub properties: Vec<PropertyRecord>,
    pub pipeline: Arc<dyn PricePipeline>,
    pub listings: Listings,
    pub feature_text: Option<String>,
    pub catalogue: Catalogue,
    pub distances: DistanceTable,
    pub similarity: SimilarityMatrix,
    pub loaded_at: DateTime<Utc>,
}

impl Artifacts {
    /// Assembles artifacts, checking that every similarity matrix lines up
    /// with the distance table's property index before combining them
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        properties: Vec<PropertyRecord>,
        pipeline: Arc<dyn PricePipeline>,
        listings: Listings,
        feature_text: Option<String>,
        catalogue: Catalogue,
        distances: DistanceTable,
        inputs: SimilarityInputs,
    ) -> Result<Self, ArtifactError> {
        let named = [
            ("facilities similarity", &inputs.facilities),
            ("price similarity", &inputs.price),
            ("location similarity", &inputs.location),
        ];
        for (name, matrix) in named {
            check_alignment(name, matrix, distances.properties())?;
        }

        let similarity = SimilarityMatrix::weighted_sum(&[
            (SIMILARITY_WEIGHTS[0], &inputs.facilities),
            (SIMILARITY_WEIGHTS[1], &inputs.price),
            (SIMILARITY_WEIGHTS[2], &inputs.location),
        ])
        .map_err(|reason| ArtifactError::invalid("composite similarity", reason))?;

        Ok(Self {
            properties,
            pipeline,
            listings,
            feature_text,
            catalogue,
            distances,
            similarity,
            loaded_at: Utc::now(),
        })
    }

    /// Loads every artifact named in the configuration
    pub fn load(config: &Config) -> Result<Self, ArtifactError> {
        let path = |file: &str| config.artifact_path(file);

        let properties =
            read_csv_file(&path(&config.dataset_file), dataset::read_csv::<PropertyRecord, _>)?;
        tracing::info!(rows = properties.len(), "Loaded property dataset");

        let pipeline_path = path(&config.pipeline_file);
        let pipeline: LinearPipeline = read_json_file(&pipeline_path)?;
        pipeline
            .validate()
            .map_err(|reason| ArtifactError::invalid(pipeline_path.display().to_string(), reason))?;
        tracing::info!(
            expected_columns = pipeline.feature_names_in.as_ref().map(Vec::len),
            "Loaded price pipeline"
        );

        let listings = read_csv_file(&path(&config.listings_file), Listings::from_csv)?;
        tracing::info!(
            rows = listings.rows.len(),
            text_fields = ?listings.text_fields,
            "Loaded sector listings"
        );

        let feature_text = read_optional_text(&path(&config.feature_text_file))?;

        let catalogue = read_csv_file(&path(&config.apartments_file), Catalogue::from_csv)?;
        tracing::info!(entries = catalogue.len(), "Loaded apartment catalogue");

        let distance_path = path(&config.location_distance_file);
        let distances = DistanceTable::from_csv(open(&distance_path)?).map_err(|reason| {
            ArtifactError::invalid(distance_path.display().to_string(), reason)
        })?;
        tracing::info!(
            properties = distances.properties().len(),
            locations = distances.locations().len(),
            "Loaded location distances"
        );

        let inputs = SimilarityInputs {
            facilities: read_matrix_file(&path(&config.facilities_similarity_file))?,
            price: read_matrix_file(&path(&config.price_similarity_file))?,
            location: read_matrix_file(&path(&config.location_similarity_file))?,
        };

        let artifacts = Self::new(
            properties,
            Arc::new(pipeline),
            listings,
            feature_text,
            catalogue,
            distances,
            inputs,
        )?;
        tracing::info!(
            size = artifacts.similarity.size(),
            "Built composite similarity matrix"
        );

        Ok(artifacts)
    }
}

fn check_alignment(
    name: &str,
    matrix: &SimilarityMatrix,
    properties: &[String],
) -> Result<(), ArtifactError> {
    let misaligned = |reason: String| ArtifactError::Misaligned {
        name: name.to_string(),
        reason,
    };

    if matrix.size() != properties.len() {
        return Err(misaligned(format!(
            "{}x{} matrix for {} properties",
            matrix.size(),
            matrix.size(),
            properties.len()
        )));
    }

    if let Some(index) = matrix.index() {
        if let Some(i) = index.iter().zip(properties).position(|(a, b)| a != b) {
            return Err(misaligned(format!(
                "position {} is '{}' but the property index has '{}'",
                i, index[i], properties[i]
            )));
        }
    }

    Ok(())
}

fn open(path: &Path) -> Result<BufReader<File>, ArtifactError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn read_csv_file<T>(
    path: &Path,
    parse: impl FnOnce(BufReader<File>) -> Result<T, csv::Error>,
) -> Result<T, ArtifactError> {
    parse(open(path)?).map_err(|source| ArtifactError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    serde_json::from_reader(open(path)?).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn read_matrix_file(path: &Path) -> Result<SimilarityMatrix, ArtifactError> {
    let json = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let matrix = SimilarityMatrix::from_json(&json)
        .map_err(|reason| ArtifactError::invalid(path.display().to_string(), reason))?;
    tracing::debug!(path = %path.display(), size = matrix.size(), "Loaded similarity matrix");
    Ok(matrix)
}

fn read_optional_text(path: &Path) -> Result<Option<String>, ArtifactError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Feature text not found, word clouds rely on listings only");
            Ok(None)
        }
        Err(source) => Err(ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
