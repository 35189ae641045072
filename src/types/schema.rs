//! Column vocabulary for the scoring pipeline.
//!
//! Source column names are the exact, case-sensitive headers produced by
//! ANNOVAR's dbNSFP annotation; aliases are the short names used everywhere
//! downstream (ranked CSV, charts, summaries).

pub const ID_COLUMN: &str = "AAChange.refGene";
pub const ID_ALIAS: &str = "variant";

pub const PREDICTOR_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predictor {
    Sift = 0,
    Pp2Hdiv = 1,
    Pp2Hvar = 2,
    Lrt = 3,
    MutationTaster = 4,
    MutationAssessor = 5,
    Fathmm = 6,
    Cadd = 7,
}

impl Predictor {
    pub const ALL: [Predictor; PREDICTOR_COUNT] = [
        Predictor::Sift,
        Predictor::Pp2Hdiv,
        Predictor::Pp2Hvar,
        Predictor::Lrt,
        Predictor::MutationTaster,
        Predictor::MutationAssessor,
        Predictor::Fathmm,
        Predictor::Cadd,
    ];

    /// Rows missing either anchor are dropped before normalization.
    pub const ANCHORS: [Predictor; 2] = [Predictor::Sift, Predictor::Pp2Hdiv];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn source_column(self) -> &'static str {
        match self {
            Predictor::Sift => "SIFT_score",
            Predictor::Pp2Hdiv => "Polyphen2_HDIV_score",
            Predictor::Pp2Hvar => "Polyphen2_HVAR_score",
            Predictor::Lrt => "LRT_score",
            Predictor::MutationTaster => "MutationTaster_score",
            Predictor::MutationAssessor => "MutationAssessor_score",
            Predictor::Fathmm => "FATHMM_score",
            Predictor::Cadd => "CADD_phred",
        }
    }

    pub fn alias(self) -> &'static str {
        match self {
            Predictor::Sift => "sift",
            Predictor::Pp2Hdiv => "pp2_hdiv",
            Predictor::Pp2Hvar => "pp2_hvar",
            Predictor::Lrt => "lrt",
            Predictor::MutationTaster => "mutation_taster",
            Predictor::MutationAssessor => "mutation_assessor",
            Predictor::Fathmm => "fathmm",
            Predictor::Cadd => "cadd",
        }
    }

    pub fn from_alias(alias: &str) -> Option<Predictor> {
        Predictor::ALL
            .into_iter()
            .find(|predictor| predictor.alias() == alias)
    }
}

/// Tokens treated as "no value" during numeric coercion.
///
/// `.` is ANNOVAR's `-nastring`; empty cells and `NA` show up in tables that
/// passed through spreadsheet editors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingValue {
    Dot,
    Empty,
    NotAvailable,
}

impl MissingValue {
    pub fn recognize(cell: &str) -> Option<MissingValue> {
        match cell.trim() {
            "." => Some(MissingValue::Dot),
            "" => Some(MissingValue::Empty),
            "NA" => Some(MissingValue::NotAvailable),
            _ => None,
        }
    }

    pub fn is_missing(cell: &str) -> bool {
        MissingValue::recognize(cell).is_some()
    }
}
