//! Glue around the ANNOVAR command-line tools: input conversion, the
//! `table_annovar.pl` invocation, and the missense filter applied to its
//! CSV output. Everything here is sequential; failures surface as typed
//! errors and intermediate files are only removed after a fully successful
//! run.

pub mod setup;

use crate::error::{MisrankError, Result};
use crate::load::{self, Table};
use crate::types::schema::MissingValue;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub const CONVERT_SCRIPT: &str = "convert2annovar.pl";
pub const TABLE_SCRIPT: &str = "table_annovar.pl";

pub const FUNC_COLUMN: &str = "Func.refGene";
pub const EXONIC_FUNC_COLUMN: &str = "ExonicFunc.refGene";
pub const AACHANGE_COLUMN: &str = "AAChange.refGene";
pub const CHROM_COLUMN: &str = "Chr";
pub const START_COLUMN: &str = "Start";
pub const QUALITY_COLUMN: &str = "QUAL";

#[derive(Debug, Clone)]
pub struct AnnovarPaths {
    pub install_dir: PathBuf,
    pub database_dir: PathBuf,
}

impl AnnovarPaths {
    pub fn new(install_dir: impl Into<PathBuf>, database_dir: impl Into<PathBuf>) -> Self {
        AnnovarPaths {
            install_dir: install_dir.into(),
            database_dir: database_dir.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.install_dir.is_dir() {
            return Err(MisrankError::AnnovarDirMissing(
                self.install_dir.display().to_string(),
            ));
        }
        if !self.database_dir.is_dir() {
            return Err(MisrankError::DatabaseDirMissing(
                self.database_dir.display().to_string(),
            ));
        }
        Ok(())
    }

    pub fn script(&self, name: &str) -> PathBuf {
        self.install_dir.join(name)
    }
}

#[derive(Debug, Clone)]
pub struct AnnotateOptions {
    pub build: String,
    pub protocols: Vec<String>,
    pub operations: Vec<String>,
    pub min_quality: Option<f64>,
    pub timeout: Option<Duration>,
    pub keep_intermediates: bool,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        AnnotateOptions {
            build: "hg19".to_string(),
            protocols: vec!["refGene".to_string(), "dbnsfp30a".to_string()],
            operations: vec!["g".to_string(), "f".to_string()],
            min_quality: None,
            timeout: None,
            keep_intermediates: false,
        }
    }
}

/// Captured outcome of the `table_annovar.pl` invocation. A non-zero exit
/// and a missing output table are reported as distinct errors: the first
/// means the tool failed, the second that it "succeeded" with an
/// unexpected layout.
#[derive(Debug)]
pub struct ToolRun {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
    pub output: PathBuf,
}

/// A `.vcf.gz` double suffix, case-insensitive, marks compressed input.
pub fn is_compressed_vcf(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_ascii_lowercase().ends_with(".vcf.gz"))
        .unwrap_or(false)
}

/// Run the annotation pipeline end to end: convert the raw VCF, invoke the
/// annotator, parse its CSV table, and apply the missense filter.
///
/// `Ok(None)` is the soft no-data outcome: the annotator ran but no row
/// survived filtering. Callers must check it before scoring.
pub fn annotate(
    vcf: &Path,
    paths: &AnnovarPaths,
    options: &AnnotateOptions,
    prefix: &Path,
) -> Result<Option<Table>> {
    paths.validate()?;
    if !vcf.exists() {
        return Err(MisrankError::FileNotFound(vcf.display().to_string()));
    }
    if let Some(parent) = prefix.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut intermediates = Vec::new();
    let avinput = convert_input(vcf, paths, prefix, &mut intermediates)?;
    let run = run_table_annovar(&avinput, paths, options, prefix, &mut intermediates)?;
    info!("annotated table written to {}", run.output.display());
    debug!(
        "table_annovar exited {} ({} bytes stdout, {} bytes stderr)",
        run.status,
        run.stdout.len(),
        run.stderr.len()
    );

    let annotated = load::load_table(&run.output)?;
    let filtered = missense_filter(&annotated, options.min_quality)?;

    if !options.keep_intermediates {
        remove_intermediates(&intermediates);
    }

    Ok(filtered)
}

/// Produce the annotator's plain-text input from a raw VCF, decompressing
/// first when the input carries the `.vcf.gz` suffix.
pub fn convert_input(
    vcf: &Path,
    paths: &AnnovarPaths,
    prefix: &Path,
    intermediates: &mut Vec<PathBuf>,
) -> Result<PathBuf> {
    let plain = if is_compressed_vcf(vcf) {
        let decompressed = suffixed(prefix, ".decompressed.vcf");
        let mut decoder = GzDecoder::new(File::open(vcf)?);
        let mut writer = File::create(&decompressed)?;
        io::copy(&mut decoder, &mut writer)?;
        debug!("decompressed {} -> {}", vcf.display(), decompressed.display());
        intermediates.push(decompressed.clone());
        decompressed
    } else {
        vcf.to_path_buf()
    };

    let avinput = suffixed(prefix, ".avinput");
    let stdout_log = suffixed(prefix, ".convert2annovar.stdout");
    let stderr_log = suffixed(prefix, ".convert2annovar.stderr");
    intermediates.push(stdout_log.clone());
    intermediates.push(stderr_log.clone());

    let mut command = Command::new(paths.script(CONVERT_SCRIPT));
    command
        .arg("-format")
        .arg("vcf4")
        .arg(&plain)
        .arg("-outfile")
        .arg(&avinput);

    let (status, _, stderr) = run_captured(command, None, &stdout_log, &stderr_log)?;
    if status != 0 {
        return Err(MisrankError::ConversionFailed { status, stderr });
    }
    if !avinput.exists() {
        return Err(MisrankError::ConversionOutputMissing(
            avinput.display().to_string(),
        ));
    }

    intermediates.push(avinput.clone());
    Ok(avinput)
}

/// Invoke `table_annovar.pl` with the fixed protocol plan and wait for the
/// `<prefix>.<build>_multianno.csv` table to appear.
pub fn run_table_annovar(
    avinput: &Path,
    paths: &AnnovarPaths,
    options: &AnnotateOptions,
    prefix: &Path,
    intermediates: &mut Vec<PathBuf>,
) -> Result<ToolRun> {
    let expected = suffixed(prefix, &format!(".{}_multianno.csv", options.build));
    let stdout_log = suffixed(prefix, ".table_annovar.stdout");
    let stderr_log = suffixed(prefix, ".table_annovar.stderr");
    intermediates.push(stdout_log.clone());
    intermediates.push(stderr_log.clone());

    let mut command = Command::new(paths.script(TABLE_SCRIPT));
    command
        .arg(avinput)
        .arg(&paths.database_dir)
        .arg("-buildver")
        .arg(&options.build)
        .arg("-out")
        .arg(prefix)
        .arg("-remove")
        .arg("-protocol")
        .arg(options.protocols.join(","))
        .arg("-operation")
        .arg(options.operations.join(","))
        .arg("-nastring")
        .arg(".")
        .arg("-csvout");

    let (status, stdout, stderr) =
        run_captured(command, options.timeout, &stdout_log, &stderr_log)?;
    if status != 0 {
        return Err(MisrankError::AnnotationFailed { status, stderr });
    }
    if !expected.exists() {
        return Err(MisrankError::AnnotationOutputMissing(
            expected.display().to_string(),
        ));
    }

    Ok(ToolRun {
        status,
        stdout,
        stderr,
        output: expected,
    })
}

/// Keep rows that are exonic, carry a missense consequence, and have a
/// usable identifier and coordinates; optionally enforce a quality floor.
/// Returns `Ok(None)` (with a warning) when nothing survives.
pub fn missense_filter(table: &Table, min_quality: Option<f64>) -> Result<Option<Table>> {
    let func = require_column(table, FUNC_COLUMN)?;
    let exonic_func = require_column(table, EXONIC_FUNC_COLUMN)?;
    let aachange = require_column(table, AACHANGE_COLUMN)?;
    let chrom = require_column(table, CHROM_COLUMN)?;
    let start = require_column(table, START_COLUMN)?;

    let quality = table.column_index(QUALITY_COLUMN);
    if min_quality.is_some() && quality.is_none() {
        warn!("quality threshold requested but the {QUALITY_COLUMN} column is absent; keeping all rows");
    }

    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .filter(|row| {
            if row[func].trim() != "exonic" {
                return false;
            }
            if !row[exonic_func].to_ascii_lowercase().contains("missense") {
                return false;
            }
            if MissingValue::is_missing(&row[aachange])
                || MissingValue::is_missing(&row[chrom])
                || MissingValue::is_missing(&row[start])
            {
                return false;
            }
            if let (Some(threshold), Some(quality)) = (min_quality, quality) {
                match row[quality].trim().parse::<f64>() {
                    Ok(value) if value >= threshold => {}
                    _ => return false,
                }
            }
            true
        })
        .cloned()
        .collect();

    if rows.is_empty() {
        warn!("no missense rows survived filtering");
        return Ok(None);
    }

    Ok(Some(Table {
        headers: table.headers.clone(),
        rows,
    }))
}

fn require_column(table: &Table, name: &str) -> Result<usize> {
    table
        .column_index(name)
        .ok_or_else(|| MisrankError::MissingColumn(name.to_string()))
}

/// Run a subprocess with stdout/stderr redirected to log files, polling so
/// an optional timeout can kill it. The captured text is read back after
/// exit; log files stay on disk as intermediates.
fn run_captured(
    mut command: Command,
    timeout: Option<Duration>,
    stdout_log: &Path,
    stderr_log: &Path,
) -> Result<(i32, String, String)> {
    let started = Instant::now();
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::from(File::create(stdout_log)?))
        .stderr(Stdio::from(File::create(stderr_log)?))
        .spawn()?;

    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if let Some(limit) = timeout {
            if started.elapsed() >= limit {
                child.kill().ok();
                child.wait().ok();
                return Err(MisrankError::AnnotationTimedOut(limit.as_secs()));
            }
        }
        std::thread::sleep(Duration::from_millis(50));
    };

    let stdout = fs::read_to_string(stdout_log).unwrap_or_default();
    let stderr = fs::read_to_string(stderr_log).unwrap_or_default();
    Ok((status.code().unwrap_or(-1), stdout, stderr))
}

fn remove_intermediates(paths: &[PathBuf]) {
    for path in paths {
        if path.exists() {
            if let Err(e) = fs::remove_file(path) {
                debug!("could not remove intermediate {}: {}", path.display(), e);
            }
        }
    }
}

fn suffixed(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = prefix.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
