pub mod normalize;
pub mod select;

use crate::types::summary::RunSummary;
use crate::types::variant::{ScoredVariant, VariantRecord};
use std::cmp::Ordering;
use tracing::{debug, info};

/// Drop rows missing either anchor predictor. The remaining six predictors
/// may be freely missing; they are simply excluded from that row's mean.
pub fn drop_missing_anchors(records: Vec<VariantRecord>) -> (Vec<VariantRecord>, usize) {
    let before = records.len();
    let kept: Vec<VariantRecord> = records
        .into_iter()
        .filter(VariantRecord::has_anchors)
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// Mean of the available scores; `None` when all eight are missing.
pub fn composite(record: &VariantRecord) -> Option<f64> {
    let available: Vec<f64> = record.scores.iter().flatten().copied().collect();
    if available.is_empty() {
        return None;
    }
    Some(available.iter().sum::<f64>() / available.len() as f64)
}

/// Stable sort by composite, descending, with missing composites last.
pub fn rank(records: Vec<VariantRecord>) -> Vec<ScoredVariant> {
    let mut scored: Vec<ScoredVariant> = records
        .into_iter()
        .map(|record| {
            let composite = composite(&record);
            ScoredVariant {
                variant: record.variant,
                normalized: record.scores,
                composite,
            }
        })
        .collect();

    scored.sort_by(|a, b| match (a.composite, b.composite) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    scored
}

/// Full scoring pass over selected records: anchor filter, per-column
/// normalization, composite mean, descending rank.
pub fn score_records(records: Vec<VariantRecord>, summary: &mut RunSummary) -> Vec<ScoredVariant> {
    summary.input_rows = records.len();

    let (mut kept, dropped) = drop_missing_anchors(records);
    summary.rows_dropped_missing_anchor = dropped;
    if dropped > 0 {
        info!("dropped {dropped} rows with a missing anchor score");
    }

    let outcome = normalize::normalize_columns(&mut kept);
    summary.columns_normalized = outcome
        .normalized
        .iter()
        .map(|predictor| predictor.alias().to_string())
        .collect();
    summary.columns_skipped = outcome
        .skipped
        .iter()
        .map(|predictor| predictor.alias().to_string())
        .collect();
    for predictor in &outcome.skipped {
        summary.warn(format!(
            "column {} left unnormalized (empty or zero maximum)",
            predictor.alias()
        ));
    }

    let ranked = rank(kept);
    summary.rows_scored = ranked.len();
    debug!("scored {} rows", ranked.len());
    ranked
}
