use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::middleware::request_id::RequestId;
use crate::models::{
    FeatureSelection, FormOptions, NearbySearch, PriceEstimate, Recommendation, SectorSummary,
    WordCloud,
};
use crate::services::{analysis, nearby, predictor, recommendations};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub location: String,
    pub radius_km: f64,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub top_n: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct WordCloudQuery {
    pub sector: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub loaded_at: DateTime<Utc>,
    pub properties: usize,
    pub locations: usize,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub property_name: String,
    pub recommendations: Vec<Recommendation>,
}

// Handlers

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let artifacts = &state.artifacts;
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy",
            loaded_at: artifacts.loaded_at,
            properties: artifacts.distances.properties().len(),
            locations: artifacts.distances.locations().len(),
        }),
    )
}

/// Choices for every field of the estimation form
pub async fn get_form_options(State(state): State<AppState>) -> Json<FormOptions> {
    Json(predictor::form_options(&state.artifacts.properties))
}

/// Estimate a price range for the submitted form
pub async fn estimate(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<FeatureSelection>, JsonRejection>,
) -> AppResult<Json<PriceEstimate>> {
    let Json(selection) = payload?;
    tracing::info!(
        request_id = %request_id,
        sector = %selection.sector,
        "Processing price estimate"
    );

    let estimate = predictor::estimate_price(state.artifacts.pipeline.as_ref(), &selection)?;
    Ok(Json(estimate))
}

/// Per-sector averages for the map view
pub async fn get_sector_summaries(State(state): State<AppState>) -> Json<Vec<SectorSummary>> {
    Json(analysis::sector_summaries(&state.artifacts.listings))
}

/// Sector names for the word cloud selector, "All Sectors" first
pub async fn get_sectors(State(state): State<AppState>) -> Json<Value> {
    let sectors = analysis::sector_names(&state.artifacts.listings);
    Json(json!({
        "all": crate::models::ALL_SECTORS,
        "sectors": sectors,
    }))
}

/// Word frequencies for the word cloud
pub async fn get_word_cloud(
    State(state): State<AppState>,
    query: Result<Query<WordCloudQuery>, QueryRejection>,
) -> AppResult<Json<WordCloud>> {
    let Query(query) = query?;
    let artifacts = &state.artifacts;
    let cloud = analysis::word_frequencies(
        &artifacts.listings,
        artifacts.feature_text.as_deref(),
        query.sector.as_deref(),
        query.limit.unwrap_or(state.default_word_limit),
    )?;
    Ok(Json(cloud))
}

/// Reference locations, sorted
pub async fn get_locations(State(state): State<AppState>) -> Json<Vec<String>> {
    let mut locations = state.artifacts.distances.locations().to_vec();
    locations.sort();
    Json(locations)
}

/// Property names in index order
pub async fn get_properties(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.artifacts.distances.properties().to_vec())
}

/// Properties within a radius of a location
pub async fn get_nearby(
    State(state): State<AppState>,
    query: Result<Query<NearbyQuery>, QueryRejection>,
) -> AppResult<Json<NearbySearch>> {
    let Query(query) = query?;
    let search =
        nearby::nearby_within_radius(&state.artifacts.distances, &query.location, query.radius_km)?;
    Ok(Json(search))
}

/// Properties most similar to the named one
pub async fn get_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    property_name: Result<Path<String>, PathRejection>,
    query: Result<Query<RecommendationQuery>, QueryRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let Path(property_name) = property_name?;
    let Query(query) = query?;
    let top_n = query.top_n.unwrap_or(state.default_recommendation_count);
    tracing::info!(
        request_id = %request_id,
        property = %property_name,
        top_n,
        "Processing recommendation request"
    );

    let recommendations = recommendations::recommend(&state.artifacts, &property_name, top_n)?;
    Ok(Json(RecommendationResponse {
        property_name: property_name.trim().to_string(),
        recommendations,
    }))
}
