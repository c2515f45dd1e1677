use crate::{
    artifacts::{Artifacts, DistanceTable, SimilarityMatrix},
    error::{AppError, AppResult},
    models::Recommendation,
};

/// Ranks the properties most similar to `property` by composite similarity.
///
/// `index` supplies the shared property order the matrix is aligned with.
/// Scores are sorted descending with ties kept in index order; the queried
/// property itself is never part of the result.
pub fn rank_neighbours(
    index: &DistanceTable,
    similarity: &SimilarityMatrix,
    property: &str,
    top_n: usize,
) -> AppResult<Vec<Recommendation>> {
    if top_n == 0 {
        return Err(AppError::InvalidInput("top_n must be at least 1".to_string()));
    }

    let position = index
        .position(property)
        .ok_or_else(|| AppError::NotFound(format!("Property '{}' not found", property.trim())))?;

    let mut scores: Vec<(usize, f64)> =
        similarity.row(position).iter().copied().enumerate().collect();
    // stable: equal scores keep index order
    scores.sort_by(|a, b| b.1.total_cmp(&a.1));

    let names = index.properties();
    Ok(scores
        .into_iter()
        .filter(|(i, _)| *i != position)
        .take(top_n)
        .enumerate()
        .map(|(rank, (i, score))| Recommendation {
            rank: rank + 1,
            property_name: names[i].clone(),
            score,
            details: None,
        })
        .collect())
}

/// Recommends properties similar to `property`, with catalogue details
pub fn recommend(
    artifacts: &Artifacts,
    property: &str,
    top_n: usize,
) -> AppResult<Vec<Recommendation>> {
    let mut recommendations =
        rank_neighbours(&artifacts.distances, &artifacts.similarity, property, top_n)
            .inspect_err(|e| {
                if let AppError::NotFound(_) = e {
                    tracing::info!(property = %property, "Recommendation requested for unknown property");
                }
            })?;

    for recommendation in &mut recommendations {
        recommendation.details = artifacts.catalogue.get(&recommendation.property_name).cloned();
    }

    tracing::debug!(
        property = %property,
        top_n,
        returned = recommendations.len(),
        "Recommendations ranked"
    );

    Ok(recommendations)
}
