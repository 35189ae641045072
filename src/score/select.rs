use crate::error::{MisrankError, Result};
use crate::load::Table;
use crate::types::schema::{MissingValue, Predictor, ID_COLUMN, PREDICTOR_COUNT};
use crate::types::variant::VariantRecord;

/// Result of pulling the nine known columns out of a raw table.
#[derive(Debug, Clone)]
pub struct Selection {
    pub records: Vec<VariantRecord>,
    /// Predictor columns absent from the table (lenient mode only; strict
    /// selection fails instead).
    pub absent_predictors: Vec<Predictor>,
}

/// Strict selection for caller-provided tables: all nine source columns must
/// be present, matched exactly and case-sensitively.
pub fn select_variants(table: &Table) -> Result<Vec<VariantRecord>> {
    let selection = select(table, false)?;
    Ok(selection.records)
}

/// Lenient selection for annotator output: predictor columns may be absent
/// (they load as all-missing and are reported); the identifier column is
/// still required.
pub fn select_variants_lenient(table: &Table) -> Result<Selection> {
    select(table, true)
}

fn select(table: &Table, lenient: bool) -> Result<Selection> {
    let id_index = table
        .column_index(ID_COLUMN)
        .ok_or_else(|| MisrankError::MissingColumn(ID_COLUMN.to_string()))?;

    let mut predictor_indices = [None; PREDICTOR_COUNT];
    let mut absent_predictors = Vec::new();
    for predictor in Predictor::ALL {
        match table.column_index(predictor.source_column()) {
            Some(index) => predictor_indices[predictor.index()] = Some(index),
            None if lenient => absent_predictors.push(predictor),
            None => {
                return Err(MisrankError::MissingColumn(
                    predictor.source_column().to_string(),
                ))
            }
        }
    }

    let mut records = Vec::with_capacity(table.rows.len());
    let mut invalid_cells = Vec::new();
    for row_number in 0..table.rows.len() {
        let mut record = VariantRecord::new(table.cell(row_number, id_index).trim());
        for predictor in Predictor::ALL {
            let Some(column) = predictor_indices[predictor.index()] else {
                continue;
            };
            let cell = table.cell(row_number, column);
            match coerce_cell(cell) {
                Ok(value) => record.set_score(predictor, value),
                Err(()) => invalid_cells.push(format!(
                    "row {}, column {}: {:?}",
                    row_number + 1,
                    predictor.source_column(),
                    cell
                )),
            }
        }
        records.push(record);
    }

    if !invalid_cells.is_empty() {
        return Err(MisrankError::ColumnValidation(invalid_cells.join("\n")));
    }

    Ok(Selection {
        records,
        absent_predictors,
    })
}

fn coerce_cell(cell: &str) -> std::result::Result<Option<f64>, ()> {
    if MissingValue::is_missing(cell) {
        return Ok(None);
    }
    cell.trim().parse::<f64>().map(Some).map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    fn full_headers() -> Vec<&'static str> {
        let mut headers = vec![ID_COLUMN];
        headers.extend(Predictor::ALL.iter().map(|p| p.source_column()));
        headers
    }

    #[test]
    fn selects_and_coerces_all_columns() {
        let headers = full_headers();
        let rows: Vec<Vec<String>> = vec![{
            let mut row = vec!["p.A123T".to_string()];
            row.extend(["0.1", "0.9", ".", "NA", "", "0.5", "-1.2", "23.4"].map(String::from));
            row
        }];
        let table = Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        };

        let records = select_variants(&table).expect("selection should succeed");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].variant, "p.A123T");
        assert_eq!(records[0].score(Predictor::Sift), Some(0.1));
        assert_eq!(records[0].score(Predictor::Pp2Hvar), None);
        assert_eq!(records[0].score(Predictor::Lrt), None);
        assert_eq!(records[0].score(Predictor::MutationTaster), None);
        assert_eq!(records[0].score(Predictor::Fathmm), Some(-1.2));
        assert_eq!(records[0].score(Predictor::Cadd), Some(23.4));
    }

    #[test]
    fn strict_selection_names_the_missing_column() {
        let table = table(&[ID_COLUMN, "SIFT_score"], &[]);
        let err = select_variants(&table).unwrap_err();
        match err {
            MisrankError::MissingColumn(column) => {
                assert_eq!(column, "Polyphen2_HDIV_score")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn column_match_is_case_sensitive() {
        let mut headers = full_headers();
        headers[1] = "sift_score";
        let table = Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        };
        assert!(matches!(
            select_variants(&table),
            Err(MisrankError::MissingColumn(_))
        ));
    }

    #[test]
    fn unparseable_cells_are_collected_into_one_error() {
        let headers = full_headers();
        let mut row = vec!["p.A1B".to_string()];
        row.extend(["bogus", "0.9", ".", ".", ".", ".", ".", "also-bad"].map(String::from));
        let table = Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: vec![row],
        };

        let err = select_variants(&table).unwrap_err();
        match err {
            MisrankError::ColumnValidation(details) => {
                assert!(details.contains("SIFT_score"));
                assert!(details.contains("CADD_phred"));
                assert!(details.contains("row 1"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn lenient_selection_reports_absent_predictors() {
        let table = table(&[ID_COLUMN, "SIFT_score"], &[&["p.X1Y", "0.3"]]);
        let selection = select_variants_lenient(&table).expect("lenient selection should succeed");
        assert_eq!(selection.absent_predictors.len(), 7);
        assert_eq!(selection.records[0].score(Predictor::Sift), Some(0.3));
        assert_eq!(selection.records[0].score(Predictor::Pp2Hdiv), None);
    }
}
