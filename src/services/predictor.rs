use std::collections::BTreeSet;

use crate::{
    artifacts::{FeatureRecord, PricePipeline, PropertyRecord},
    error::{AppError, AppResult},
    models::{
        AreaBounds, FeatureSelection, FormOptions, PriceEstimate, MAX_BUILT_UP_AREA,
        MIN_BUILT_UP_AREA,
    },
};

/// Lower edge of the displayed band, as a fraction of the estimate
pub const BAND_LOW: f64 = 0.78;
/// Upper edge of the displayed band, as a fraction of the estimate
pub const BAND_HIGH: f64 = 1.22;

/// Rejects selections the estimation form would never produce
pub fn validate_selection(selection: &FeatureSelection) -> AppResult<()> {
    let area = selection.built_up_area;
    if !area.is_finite() || !(MIN_BUILT_UP_AREA..=MAX_BUILT_UP_AREA).contains(&area) {
        return Err(AppError::InvalidInput(format!(
            "built_up_area must be between {} and {} sq.ft, got {}",
            MIN_BUILT_UP_AREA, MAX_BUILT_UP_AREA, area
        )));
    }

    for (field, flag) in [
        ("servant_room", selection.servant_room),
        ("store_room", selection.store_room),
    ] {
        if flag > 1 {
            return Err(AppError::InvalidInput(format!("{} must be 0 or 1", field)));
        }
    }

    for (field, count) in [
        ("bedrooms", selection.bedrooms),
        ("bathrooms", selection.bathrooms),
    ] {
        if !count.is_finite() || count < 0.0 {
            return Err(AppError::InvalidInput(format!(
                "{} must be a non-negative number",
                field
            )));
        }
    }

    Ok(())
}

/// Builds the single-row record handed to the pipeline.
///
/// When the pipeline declares its input columns the record is conformed to
/// them: absent columns become 0 and the order matches exactly.
pub fn assemble_features(
    selection: &FeatureSelection,
    expected: Option<&[String]>,
) -> FeatureRecord {
    let record = selection.to_record();
    match expected {
        Some(columns) => {
            let filled: Vec<&str> = columns
                .iter()
                .map(String::as_str)
                .filter(|c| record.get(c).is_none())
                .collect();
            if !filled.is_empty() {
                tracing::debug!(columns = ?filled, "Filling columns missing from the form with 0");
            }
            record.conform_to(columns)
        }
        None => record,
    }
}

/// Predicts a price and widens it into the display band
pub fn estimate_price(
    pipeline: &dyn PricePipeline,
    selection: &FeatureSelection,
) -> AppResult<PriceEstimate> {
    validate_selection(selection)?;

    let expected = pipeline.expected_columns();
    let record = assemble_features(selection, expected.as_deref());

    let log_price = pipeline.predict(&record).map_err(|e| {
        tracing::warn!(error = %e, sector = %selection.sector, "Pipeline rejected feature record");
        AppError::Prediction(e)
    })?;

    let estimate = log_price.exp_m1();
    if !estimate.is_finite() || estimate < 0.0 {
        return Err(AppError::Estimation(format!(
            "model produced an unusable price ({})",
            estimate
        )));
    }

    tracing::info!(
        sector = %selection.sector,
        property_type = %selection.property_type,
        estimate,
        "Price estimated"
    );

    Ok(PriceEstimate {
        estimate,
        low: estimate * BAND_LOW,
        high: estimate * BAND_HIGH,
    })
}

fn distinct_text<'a>(values: impl Iterator<Item = Option<&'a String>>) -> Vec<String> {
    values
        .flatten()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn distinct_numbers(values: impl Iterator<Item = Option<f64>>) -> Vec<f64> {
    let mut numbers: Vec<f64> = values.flatten().filter(|v| v.is_finite()).collect();
    numbers.sort_by(f64::total_cmp);
    numbers.dedup();
    numbers
}

/// Sorted distinct values of every form field seen in the reference dataset
pub fn form_options(properties: &[PropertyRecord]) -> FormOptions {
    FormOptions {
        property_types: distinct_text(properties.iter().map(|p| p.property_type.as_ref())),
        sectors: distinct_text(properties.iter().map(|p| p.sector.as_ref())),
        bedrooms: distinct_numbers(properties.iter().map(|p| p.bedrooms)),
        bathrooms: distinct_numbers(properties.iter().map(|p| p.bathroom)),
        balconies: distinct_text(properties.iter().map(|p| p.balcony.as_ref())),
        age_possession: distinct_text(properties.iter().map(|p| p.age_possession.as_ref())),
        built_up_area: AreaBounds::default(),
        servant_room: vec![0, 1],
        store_room: vec![0, 1],
        furnishing_types: distinct_text(properties.iter().map(|p| p.furnishing_type.as_ref())),
        luxury_categories: distinct_text(properties.iter().map(|p| p.luxury_category.as_ref())),
        floor_categories: distinct_text(properties.iter().map(|p| p.floor_category.as_ref())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::pipeline::MockPricePipeline;
    use crate::artifacts::{FeatureValue, PipelineError};

    fn selection() -> FeatureSelection {
        FeatureSelection {
            property_type: "flat".into(),
            sector: "sector 45".into(),
            bedrooms: 3.0,
            bathrooms: 3.0,
            balconies: "3+".into(),
            age_possession: "New Property".into(),
            built_up_area: 1800.0,
            servant_room: 0,
            store_room: 1,
            furnishing_type: "unfurnished".into(),
            luxury_category: "Low".into(),
            floor_category: "High Floor".into(),
        }
    }

    #[test]
    fn test_assemble_without_expected_columns_keeps_form_order() {
        let record = assemble_features(&selection(), None);
        assert_eq!(record.len(), 12);
        assert_eq!(record.column_names()[2], "bedRoom");
    }

    #[test]
    fn test_assemble_fills_and_reorders_expected_columns() {
        let expected = vec![
            "sector".to_string(),
            "pooja room".to_string(),
            "built_up_area".to_string(),
        ];
        let record = assemble_features(&selection(), Some(&expected));
        assert_eq!(record.column_names(), vec!["sector", "pooja room", "built_up_area"]);
        assert_eq!(record.get("pooja room"), Some(&FeatureValue::Number(0.0)));
    }

    #[test]
    fn test_estimate_applies_band() {
        let mut pipeline = MockPricePipeline::new();
        pipeline.expect_expected_columns().returning(|| None);
        pipeline
            .expect_predict()
            .withf(|record| record.get("sector") == Some(&FeatureValue::Text("sector 45".into())))
            .returning(|_| Ok(3.0_f64.ln()));

        let estimate = estimate_price(&pipeline, &selection()).unwrap();
        assert!((estimate.estimate - 2.0).abs() < 1e-9);
        assert!((estimate.low - 1.56).abs() < 1e-9);
        assert!((estimate.high - 2.44).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_passes_conformed_record_to_pipeline() {
        let mut pipeline = MockPricePipeline::new();
        pipeline
            .expect_expected_columns()
            .returning(|| Some(vec!["built_up_area".into(), "sector".into()]));
        pipeline
            .expect_predict()
            .withf(|record| record.column_names() == vec!["built_up_area", "sector"])
            .times(1)
            .returning(|_| Ok(1.0));

        assert!(estimate_price(&pipeline, &selection()).is_ok());
    }

    #[test]
    fn test_estimate_is_repeatable() {
        let mut pipeline = MockPricePipeline::new();
        pipeline.expect_expected_columns().returning(|| None);
        pipeline.expect_predict().returning(|_| Ok(0.7));

        let first = estimate_price(&pipeline, &selection()).unwrap();
        let second = estimate_price(&pipeline, &selection()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_pipeline_failure_is_reported() {
        let mut pipeline = MockPricePipeline::new();
        pipeline.expect_expected_columns().returning(|| None);
        pipeline.expect_predict().returning(|_| {
            Err(PipelineError::UnknownCategory {
                column: "sector".into(),
                value: "sector 45".into(),
            })
        });

        let err = estimate_price(&pipeline, &selection()).unwrap_err();
        assert!(matches!(err, AppError::Prediction(_)));
    }

    #[test]
    fn test_degenerate_estimates_are_rejected() {
        for log_price in [f64::INFINITY, f64::NAN, -0.5] {
            let mut pipeline = MockPricePipeline::new();
            pipeline.expect_expected_columns().returning(|| None);
            pipeline.expect_predict().returning(move |_| Ok(log_price));

            let err = estimate_price(&pipeline, &selection()).unwrap_err();
            assert!(matches!(err, AppError::Estimation(_)), "log price {}", log_price);
        }
    }

    #[test]
    fn test_out_of_range_input_never_reaches_pipeline() {
        let mut pipeline = MockPricePipeline::new();
        pipeline.expect_expected_columns().never();
        pipeline.expect_predict().never();

        let mut small = selection();
        small.built_up_area = 150.0;
        assert!(matches!(
            estimate_price(&pipeline, &small),
            Err(AppError::InvalidInput(_))
        ));

        let mut flag = selection();
        flag.servant_room = 2;
        assert!(matches!(
            estimate_price(&pipeline, &flag),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_form_options_are_sorted_and_distinct() {
        let properties = vec![
            PropertyRecord {
                sector: Some("sector 9".into()),
                bedrooms: Some(3.0),
                ..Default::default()
            },
            PropertyRecord {
                sector: Some("sector 10".into()),
                bedrooms: Some(2.0),
                ..Default::default()
            },
            PropertyRecord {
                sector: Some("sector 9".into()),
                bedrooms: None,
                ..Default::default()
            },
        ];

        let options = form_options(&properties);
        assert_eq!(options.sectors, vec!["sector 10", "sector 9"]);
        assert_eq!(options.bedrooms, vec![2.0, 3.0]);
        assert_eq!(options.servant_room, vec![0, 1]);
        assert!(options.property_types.is_empty());
    }
}
