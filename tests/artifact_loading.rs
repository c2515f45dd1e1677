use std::fs;
use std::path::Path;

use tempfile::TempDir;

use estate_api::artifacts::{ArtifactError, Artifacts, TextField};
use estate_api::config::Config;

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

/// Writes a complete, aligned artifact set using the default file names
fn artifact_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path();

    write(
        path,
        "properties.csv",
        "property_type,sector,bedRoom,bathroom,balcony,agePossession,furnishing_type,luxury_category,floor_category\n\
         flat,sector 45,3,2,2,New Property,semifurnished,Medium,Mid Floor\n",
    );
    write(
        path,
        "pipeline.json",
        r#"{"feature_names_in": ["sector"], "intercept": 1.0, "categorical": {"sector": {"sector 45": 0.1}}}"#,
    );
    write(
        path,
        "sector_listings.csv",
        "sector,price,price_per_sqft,built_up_area,latitude,longitude,features\n\
         sector 45,1.5,10000,1500,28.43,77.05,lift\n",
    );
    write(
        path,
        "apartments.csv",
        "PropertyName,PropertySubName,Link\n Oak Towers ,Tower A,https://example.com/oak\n",
    );
    write(
        path,
        "location_distance.csv",
        "PropertyName,Sector 14\nOak Towers,500\nElm Court,\n",
    );
    write(path, "cosine_sim1.json", "[[1.0, 0.5], [0.5, 1.0]]");
    write(path, "cosine_sim2.json", "[[1.0, 0.2], [0.2, 1.0]]");
    write(
        path,
        "cosine_sim3.json",
        r#"{"index": ["Oak Towers", "Elm Court"], "scores": [[1.0, 0.1], [0.1, 1.0]]}"#,
    );

    dir
}

fn config_for(dir: &TempDir) -> Config {
    Config {
        data_dir: dir.path().to_path_buf(),
        ..Config::default()
    }
}

#[test]
fn test_loads_complete_artifact_set() {
    let dir = artifact_dir();
    let artifacts = Artifacts::load(&config_for(&dir)).unwrap();

    assert_eq!(artifacts.properties.len(), 1);
    assert_eq!(artifacts.distances.properties(), &["Oak Towers", "Elm Court"]);
    assert_eq!(artifacts.listings.text_fields, vec![TextField::Features]);
    assert!(artifacts.feature_text.is_none());
    assert!(artifacts.catalogue.get("Oak Towers").is_some());

    let composite = artifacts.similarity.row(0)[1];
    assert!((composite - (0.25 + 0.16 + 0.1)).abs() < 1e-12);
}

#[test]
fn test_reads_feature_text_when_present() {
    let dir = artifact_dir();
    write(dir.path(), "feature_text.txt", "pool gym");
    let artifacts = Artifacts::load(&config_for(&dir)).unwrap();
    assert_eq!(artifacts.feature_text.as_deref(), Some("pool gym"));
}

#[test]
fn test_misaligned_matrix_index_fails_startup() {
    let dir = artifact_dir();
    write(
        dir.path(),
        "cosine_sim3.json",
        r#"{"index": ["Elm Court", "Oak Towers"], "scores": [[1.0, 0.1], [0.1, 1.0]]}"#,
    );

    let err = Artifacts::load(&config_for(&dir)).err().unwrap();
    assert!(matches!(err, ArtifactError::Misaligned { .. }));
}

#[test]
fn test_matrix_of_wrong_size_fails_startup() {
    let dir = artifact_dir();
    write(dir.path(), "cosine_sim1.json", "[[1.0]]");

    let err = Artifacts::load(&config_for(&dir)).err().unwrap();
    assert!(matches!(err, ArtifactError::Misaligned { .. }));
}

#[test]
fn test_missing_file_names_the_path() {
    let dir = artifact_dir();
    fs::remove_file(dir.path().join("pipeline.json")).unwrap();

    let err = Artifacts::load(&config_for(&dir)).err().unwrap();
    assert!(matches!(err, ArtifactError::Io { .. }));
    assert!(err.to_string().contains("pipeline.json"));
}

#[test]
fn test_invalid_pipeline_fails_startup() {
    let dir = artifact_dir();
    write(
        dir.path(),
        "pipeline.json",
        r#"{"feature_names_in": ["sector"], "intercept": 1.0, "numeric": {"balcony": 0.3}}"#,
    );

    let err = Artifacts::load(&config_for(&dir)).err().unwrap();
    assert!(matches!(err, ArtifactError::Invalid { .. }));
}
