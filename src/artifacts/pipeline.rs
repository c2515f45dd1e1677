use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Errors raised by a price pipeline while scoring a record
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("column '{column}' expects {expected}")]
    TypeMismatch { column: String, expected: &'static str },

    #[error("unknown category '{value}' in column '{column}'")]
    UnknownCategory { column: String, value: String },
}

/// A single cell of a feature record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

impl FeatureValue {
    /// Category label used for one-hot lookups
    fn category_label(&self) -> String {
        match self {
            FeatureValue::Text(text) => text.clone(),
            FeatureValue::Number(n) if n.fract() == 0.0 && n.is_finite() => format!("{}", *n as i64),
            FeatureValue::Number(n) => n.to_string(),
        }
    }
}

/// Single-row table handed to a pipeline, columns in order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureRecord {
    columns: Vec<(String, FeatureValue)>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column, replacing the value if the column already exists
    pub fn insert(&mut self, name: impl Into<String>, value: FeatureValue) {
        let name = name.into();
        match self.columns.iter_mut().find(|(column, _)| *column == name) {
            Some((_, existing)) => *existing = value,
            None => self.columns.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: FeatureValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Rebuilds the record with exactly `expected` columns in that order.
    /// Columns absent from the record are filled with numeric zero, columns
    /// not listed are dropped.
    pub fn conform_to(&self, expected: &[String]) -> FeatureRecord {
        let columns = expected
            .iter()
            .map(|name| {
                let value = self
                    .get(name)
                    .cloned()
                    .unwrap_or(FeatureValue::Number(0.0));
                (name.clone(), value)
            })
            .collect();
        FeatureRecord { columns }
    }
}

/// Opaque regression pipeline producing a log-space price
#[cfg_attr(test, mockall::automock)]
pub trait PricePipeline: Send + Sync {
    /// Ordered input columns, when the pipeline knows them
    fn expected_columns(&self) -> Option<Vec<String>>;

    /// Scores a single-row record
    fn predict(&self, record: &FeatureRecord) -> Result<f64, PipelineError>;
}

/// What to do with a category the pipeline was not trained on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownCategory {
    #[default]
    Error,
    Ignore,
}

/// Linear model over numeric columns and one-hot encoded categorical columns.
///
/// Serialized as JSON:
/// ```json
/// {
///   "feature_names_in": ["sector", "built_up_area"],
///   "intercept": 0.42,
///   "numeric": { "built_up_area": 0.0004 },
///   "categorical": { "sector": { "sector 45": 0.3 } },
///   "handle_unknown": "error"
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct LinearPipeline {
    #[serde(default)]
    pub feature_names_in: Option<Vec<String>>,
    pub intercept: f64,
    #[serde(default)]
    pub numeric: HashMap<String, f64>,
    #[serde(default)]
    pub categorical: HashMap<String, HashMap<String, f64>>,
    #[serde(default)]
    pub handle_unknown: UnknownCategory,
}

impl LinearPipeline {
    /// Checks that every coefficient is finite and that declared features
    /// cover every column the model scores
    pub fn validate(&self) -> Result<(), String> {
        if !self.intercept.is_finite() {
            return Err("intercept is not finite".to_string());
        }
        if let Some((column, _)) = self.numeric.iter().find(|(_, c)| !c.is_finite()) {
            return Err(format!("coefficient for '{}' is not finite", column));
        }
        for (column, categories) in &self.categorical {
            if categories.values().any(|c| !c.is_finite()) {
                return Err(format!("a category coefficient for '{}' is not finite", column));
            }
            if self.numeric.contains_key(column) {
                return Err(format!("column '{}' is both numeric and categorical", column));
            }
        }
        if let Some(names) = &self.feature_names_in {
            let scored = self.numeric.keys().chain(self.categorical.keys());
            for column in scored {
                if !names.contains(column) {
                    return Err(format!("scored column '{}' is not in feature_names_in", column));
                }
            }
        }
        Ok(())
    }
}

impl PricePipeline for LinearPipeline {
    fn expected_columns(&self) -> Option<Vec<String>> {
        self.feature_names_in.clone()
    }

    fn predict(&self, record: &FeatureRecord) -> Result<f64, PipelineError> {
        if let Some(names) = &self.feature_names_in {
            if let Some(missing) = names.iter().find(|name| record.get(name).is_none()) {
                return Err(PipelineError::MissingColumn(missing.clone()));
            }
        }

        let mut total = self.intercept;

        for (column, coefficient) in &self.numeric {
            match record.get(column) {
                Some(FeatureValue::Number(value)) => total += coefficient * value,
                Some(FeatureValue::Text(_)) => {
                    return Err(PipelineError::TypeMismatch {
                        column: column.clone(),
                        expected: "a number",
                    })
                }
                None => return Err(PipelineError::MissingColumn(column.clone())),
            }
        }

        for (column, categories) in &self.categorical {
            let label = record
                .get(column)
                .ok_or_else(|| PipelineError::MissingColumn(column.clone()))?
                .category_label();
            match (categories.get(&label), self.handle_unknown) {
                (Some(weight), _) => total += weight,
                (None, UnknownCategory::Ignore) => {}
                (None, UnknownCategory::Error) => {
                    return Err(PipelineError::UnknownCategory {
                        column: column.clone(),
                        value: label,
                    })
                }
            }
        }

        Ok(total)
    }
}
