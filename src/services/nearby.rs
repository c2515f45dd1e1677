use crate::{
    artifacts::DistanceTable,
    error::{AppError, AppResult},
    models::{NearbyProperty, NearbySearch},
};

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Properties whose distance to `location` is strictly below `radius_km`,
/// nearest first. Unknown distances never match.
pub fn nearby_within_radius(
    table: &DistanceTable,
    location: &str,
    radius_km: f64,
) -> AppResult<NearbySearch> {
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(AppError::InvalidInput(format!(
            "radius_km must be a non-negative number, got {}",
            radius_km
        )));
    }

    let location = location.trim();
    let column = table
        .column(location)
        .ok_or_else(|| AppError::NotFound(format!("Location '{}' not found", location)))?;

    let limit_m = radius_km * 1000.0;
    let mut within: Vec<(usize, f64)> = column
        .iter()
        .enumerate()
        .filter_map(|(i, meters)| meters.map(|m| (i, m)))
        .filter(|(_, meters)| *meters < limit_m)
        .collect();
    within.sort_by(|a, b| a.1.total_cmp(&b.1));

    let names = table.properties();
    let properties: Vec<NearbyProperty> = within
        .into_iter()
        .map(|(i, meters)| NearbyProperty {
            property_name: names[i].clone(),
            distance_km: round_to_hundredths(meters / 1000.0),
        })
        .collect();

    if properties.is_empty() {
        tracing::info!(location = %location, radius_km, "No properties found in radius");
    } else {
        tracing::debug!(location = %location, radius_km, found = properties.len(), "Radius search");
    }

    Ok(NearbySearch {
        location: location.to_string(),
        radius_km,
        properties,
    })
}
