use crate::annovar::AnnovarPaths;

pub const REQUIRED_SCRIPTS: [&str; 3] = [
    "table_annovar.pl",
    "convert2annovar.pl",
    "annotate_variation.pl",
];

pub fn required_databases(build: &str) -> [String; 3] {
    [
        format!("{build}_refGene.txt"),
        format!("{build}_refGeneMrna.fa"),
        format!("{build}_dbnsfp30a.txt"),
    ]
}

/// Filesystem-existence probe over an ANNOVAR installation. No version or
/// checksum validation.
#[derive(Debug, Clone, Default)]
pub struct SetupReport {
    pub missing_scripts: Vec<String>,
    pub missing_databases: Vec<String>,
}

impl SetupReport {
    pub fn is_ready(&self) -> bool {
        self.missing_scripts.is_empty() && self.missing_databases.is_empty()
    }
}

pub fn check_setup(paths: &AnnovarPaths, build: &str) -> SetupReport {
    let missing_scripts = REQUIRED_SCRIPTS
        .iter()
        .filter(|script| !paths.install_dir.join(script).is_file())
        .map(|script| script.to_string())
        .collect();

    let missing_databases = required_databases(build)
        .iter()
        .filter(|database| !paths.database_dir.join(database).is_file())
        .cloned()
        .collect();

    SetupReport {
        missing_scripts,
        missing_databases,
    }
}
