use crate::types::schema::{Predictor, PREDICTOR_COUNT};

/// One row of the selected input table: identifier plus the eight predictor
/// scores, each possibly missing.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantRecord {
    pub variant: String,
    pub scores: [Option<f64>; PREDICTOR_COUNT],
}

impl VariantRecord {
    pub fn new(variant: impl Into<String>) -> Self {
        VariantRecord {
            variant: variant.into(),
            scores: [None; PREDICTOR_COUNT],
        }
    }

    pub fn score(&self, predictor: Predictor) -> Option<f64> {
        self.scores[predictor.index()]
    }

    pub fn set_score(&mut self, predictor: Predictor, value: Option<f64>) {
        self.scores[predictor.index()] = value;
    }

    pub fn has_anchors(&self) -> bool {
        Predictor::ANCHORS
            .into_iter()
            .all(|anchor| self.score(anchor).is_some())
    }
}

/// A ranked row: normalized scores plus the composite mean of whatever was
/// available. `composite` is `None` when all eight scores are missing; such
/// rows sort after every scored row.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredVariant {
    pub variant: String,
    pub normalized: [Option<f64>; PREDICTOR_COUNT],
    pub composite: Option<f64>,
}

impl ScoredVariant {
    pub fn normalized_score(&self, predictor: Predictor) -> Option<f64> {
        self.normalized[predictor.index()]
    }
}
