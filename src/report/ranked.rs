use crate::error::Result;
use crate::types::schema::{Predictor, ID_ALIAS};
use crate::types::variant::ScoredVariant;
use std::path::Path;

pub const COMPOSITE_COLUMN: &str = "composite";
pub const MISSING_CELL: &str = ".";

/// Persist the ranked table: identifier, the eight normalized predictor
/// columns under their aliases, and the composite score. Floats use Rust's
/// shortest round-trip formatting so a re-read reproduces them exactly.
pub fn write_ranked(path: &Path, ranked: &[ScoredVariant]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec![ID_ALIAS.to_string()];
    header.extend(
        Predictor::ALL
            .iter()
            .map(|predictor| predictor.alias().to_string()),
    );
    header.push(COMPOSITE_COLUMN.to_string());
    writer.write_record(&header)?;

    for row in ranked {
        let mut record = vec![row.variant.clone()];
        record.extend(row.normalized.iter().map(|value| cell(*value)));
        record.push(cell(row.composite));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

fn cell(value: Option<f64>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => MISSING_CELL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load;
    use crate::types::schema::{MissingValue, PREDICTOR_COUNT};
    use tempfile::TempDir;

    fn scored(variant: &str, composite: Option<f64>) -> ScoredVariant {
        let mut normalized = [None; PREDICTOR_COUNT];
        normalized[0] = composite;
        normalized[1] = composite.map(|value| value / 3.0);
        ScoredVariant {
            variant: variant.to_string(),
            normalized,
            composite,
        }
    }

    #[test]
    fn round_trip_preserves_rows_identifiers_and_composites() {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = dir.path().join("ranked.csv");
        let ranked = vec![
            scored("V1", Some(1.0)),
            scored("V2", Some(0.123456789123)),
            scored("V3", Some(1.0 / 3.0)),
            scored("V4", None),
        ];

        write_ranked(&path, &ranked).expect("write should succeed");
        let table = load::load_table(&path).expect("re-read should succeed");

        assert_eq!(table.rows.len(), ranked.len());
        assert_eq!(table.headers[0], ID_ALIAS);
        assert_eq!(table.headers[9], COMPOSITE_COLUMN);

        for (row, expected) in table.rows.iter().zip(&ranked) {
            assert_eq!(row[0], expected.variant);
            match expected.composite {
                Some(value) => {
                    let read: f64 = row[9].parse().expect("composite should parse");
                    assert!((read - value).abs() < 1e-9);
                }
                None => assert!(MissingValue::is_missing(&row[9])),
            }
        }
    }

    #[test]
    fn missing_scores_serialize_as_the_sentinel() {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = dir.path().join("ranked.csv");
        write_ranked(&path, &[scored("V1", None)]).expect("write should succeed");

        let table = load::load_table(&path).expect("re-read should succeed");
        assert_eq!(table.cell(0, 3), MISSING_CELL);
        assert_eq!(table.cell(0, 9), MISSING_CELL);
    }
}
