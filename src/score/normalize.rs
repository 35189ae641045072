use crate::types::schema::Predictor;
use crate::types::variant::VariantRecord;

#[derive(Debug, Clone, Default)]
pub struct NormalizationOutcome {
    pub normalized: Vec<Predictor>,
    pub skipped: Vec<Predictor>,
}

/// Divide every value in each predictor column by that column's maximum over
/// the surviving rows. Columns with no values, or whose maximum is exactly
/// zero, pass through unchanged rather than dividing by zero.
pub fn normalize_columns(records: &mut [VariantRecord]) -> NormalizationOutcome {
    let mut outcome = NormalizationOutcome::default();

    for predictor in Predictor::ALL {
        let maximum = records
            .iter()
            .filter_map(|record| record.score(predictor))
            .fold(None, |acc: Option<f64>, value| {
                Some(acc.map_or(value, |current| current.max(value)))
            });

        match maximum {
            Some(max) if max != 0.0 => {
                for record in records.iter_mut() {
                    if let Some(value) = record.score(predictor) {
                        record.set_score(predictor, Some(value / max));
                    }
                }
                outcome.normalized.push(predictor);
            }
            _ => outcome.skipped.push(predictor),
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sift: Option<f64>, cadd: Option<f64>) -> VariantRecord {
        let mut record = VariantRecord::new("v");
        record.set_score(Predictor::Sift, sift);
        record.set_score(Predictor::Cadd, cadd);
        record
    }

    #[test]
    fn column_maximum_becomes_exactly_one() {
        let mut records = vec![
            record(Some(10.0), Some(4.0)),
            record(Some(5.0), None),
            record(Some(2.5), Some(2.0)),
        ];
        let outcome = normalize_columns(&mut records);

        assert!(outcome.normalized.contains(&Predictor::Sift));
        assert_eq!(records[0].score(Predictor::Sift), Some(1.0));
        assert_eq!(records[1].score(Predictor::Sift), Some(0.5));
        assert_eq!(records[2].score(Predictor::Sift), Some(0.25));
        assert_eq!(records[0].score(Predictor::Cadd), Some(1.0));
        assert_eq!(records[2].score(Predictor::Cadd), Some(0.5));
    }

    #[test]
    fn all_missing_column_is_left_unchanged() {
        let mut records = vec![record(None, Some(3.0)), record(None, Some(1.0))];
        let outcome = normalize_columns(&mut records);

        assert!(outcome.skipped.contains(&Predictor::Sift));
        assert_eq!(records[0].score(Predictor::Sift), None);
        assert_eq!(records[1].score(Predictor::Sift), None);
    }

    #[test]
    fn zero_maximum_column_is_left_unchanged() {
        let mut records = vec![record(Some(0.0), None), record(Some(-2.0), None)];
        let outcome = normalize_columns(&mut records);

        assert!(outcome.skipped.contains(&Predictor::Sift));
        assert_eq!(records[0].score(Predictor::Sift), Some(0.0));
        assert_eq!(records[1].score(Predictor::Sift), Some(-2.0));
    }

    #[test]
    fn missing_entries_are_excluded_from_the_maximum() {
        let mut records = vec![record(Some(2.0), None), record(None, None)];
        normalize_columns(&mut records);
        assert_eq!(records[0].score(Predictor::Sift), Some(1.0));
        assert_eq!(records[1].score(Predictor::Sift), None);
    }
}
