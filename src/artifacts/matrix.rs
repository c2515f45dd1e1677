use serde::Deserialize;

/// Weights applied to the facilities, price and location-advantage matrices
pub const SIMILARITY_WEIGHTS: [f64; 3] = [0.5, 0.8, 1.0];

/// On-disk shapes accepted for a similarity matrix
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MatrixFile {
    Labelled {
        index: Vec<String>,
        scores: Vec<Vec<f64>>,
    },
    Bare(Vec<Vec<f64>>),
}

/// Square pairwise-similarity matrix stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    scores: Vec<f64>,
    index: Option<Vec<String>>,
}

impl SimilarityMatrix {
    /// Builds a matrix from rows, rejecting ragged rows and non-finite cells
    pub fn from_rows(rows: Vec<Vec<f64>>, index: Option<Vec<String>>) -> Result<Self, String> {
        let size = rows.len();
        let mut scores = Vec::with_capacity(size * size);

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(format!(
                    "row {} has {} cells, expected {}",
                    i,
                    row.len(),
                    size
                ));
            }
            if let Some(j) = row.iter().position(|score| !score.is_finite()) {
                return Err(format!("cell ({}, {}) is not finite", i, j));
            }
            scores.extend(row);
        }

        if let Some(labels) = &index {
            if labels.len() != size {
                return Err(format!(
                    "index has {} labels for a {}x{} matrix",
                    labels.len(),
                    size,
                    size
                ));
            }
        }

        Ok(Self {
            size,
            scores,
            index: index.map(|labels| labels.into_iter().map(|l| l.trim().to_string()).collect()),
        })
    }

    /// Parses either a bare square array or `{ "index": [...], "scores": [[...]] }`
    pub fn from_json(json: &str) -> Result<Self, String> {
        let file: MatrixFile = serde_json::from_str(json).map_err(|e| e.to_string())?;
        match file {
            MatrixFile::Labelled { index, scores } => Self::from_rows(scores, Some(index)),
            MatrixFile::Bare(scores) => Self::from_rows(scores, None),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Property labels carried by the artifact itself, if any
    pub fn index(&self) -> Option<&[String]> {
        self.index.as_deref()
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.scores[i * self.size..(i + 1) * self.size]
    }

    /// Weighted element-wise sum of equally sized matrices.
    /// The result carries no index of its own.
    pub fn weighted_sum(parts: &[(f64, &SimilarityMatrix)]) -> Result<Self, String> {
        let size = parts.first().map(|(_, m)| m.size).unwrap_or(0);
        if let Some((_, odd)) = parts.iter().find(|(_, m)| m.size != size) {
            return Err(format!(
                "cannot combine a {}x{} matrix with a {}x{} matrix",
                odd.size, odd.size, size, size
            ));
        }

        let mut scores = vec![0.0; size * size];
        for (weight, matrix) in parts {
            for (acc, score) in scores.iter_mut().zip(&matrix.scores) {
                *acc += weight * score;
            }
        }

        Ok(Self {
            size,
            scores,
            index: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_bare_and_labelled_json() {
        let bare = SimilarityMatrix::from_json("[[1.0, 0.2], [0.2, 1.0]]").unwrap();
        assert_eq!(bare.size(), 2);
        assert!(bare.index().is_none());

        let labelled = SimilarityMatrix::from_json(
            r#"{"index": [" Oak Towers ", "Elm Court"], "scores": [[1.0, 0.3], [0.3, 1.0]]}"#,
        )
        .unwrap();
        assert_eq!(
            labelled.index().unwrap(),
            &["Oak Towers".to_string(), "Elm Court".to_string()]
        );
        assert_eq!(labelled.row(1), &[0.3, 1.0]);
    }

    #[test]
    fn test_rejects_ragged_and_mislabelled_matrices() {
        assert!(SimilarityMatrix::from_json("[[1.0, 0.2], [0.2]]").is_err());
        assert!(SimilarityMatrix::from_rows(vec![vec![1.0]], Some(vec!["a".into(), "b".into()])).is_err());
        assert!(SimilarityMatrix::from_rows(vec![vec![f64::NAN]], None).is_err());
    }

    #[test]
    fn test_weighted_sum_applies_weights() {
        let a = SimilarityMatrix::from_rows(vec![vec![1.0, 1.0], vec![1.0, 1.0]], None).unwrap();
        let b = SimilarityMatrix::from_rows(vec![vec![0.0, 0.5], vec![0.5, 0.0]], None).unwrap();
        let c = SimilarityMatrix::from_rows(vec![vec![0.0, 0.25], vec![1.0, 0.0]], None).unwrap();

        let combined = SimilarityMatrix::weighted_sum(&[
            (SIMILARITY_WEIGHTS[0], &a),
            (SIMILARITY_WEIGHTS[1], &b),
            (SIMILARITY_WEIGHTS[2], &c),
        ])
        .unwrap();

        assert_eq!(combined.row(0), &[0.5, 0.5 + 0.4 + 0.25]);
        assert_eq!(combined.row(1), &[0.5 + 0.4 + 1.0, 0.5]);
    }

    #[test]
    fn test_weighted_sum_rejects_size_mismatch() {
        let a = SimilarityMatrix::from_rows(vec![vec![1.0]], None).unwrap();
        let b = SimilarityMatrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]], None).unwrap();
        assert!(SimilarityMatrix::weighted_sum(&[(1.0, &a), (1.0, &b)]).is_err());
    }
}
