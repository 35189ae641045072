mod annovar;
mod chart;
mod cli;
mod config;
mod error;
mod load;
mod report;
mod score;
mod types;

use crate::error::{MisrankError, Result};
use crate::types::schema::{Predictor, PREDICTOR_COUNT};
use crate::types::summary::RunSummary;
use crate::types::variant::ScoredVariant;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const NO_DATA: i32 = 1;
    pub const NOT_READY: i32 = 2;
    pub const RUNTIME_FAILURE: i32 = 3;
}

fn run() -> Result<i32> {
    let cli = cli::Cli::parse();
    init_tracing(&cli);

    match cli.command {
        cli::Commands::Score(cmd) => run_score(cmd),
        cli::Commands::Annotate(cmd) => run_annotate(cmd),
        cli::Commands::CheckSetup(cmd) => run_check_setup(cmd),
    }
}

fn run_score(cmd: cli::ScoreCommand) -> Result<i32> {
    let table = load::load_table(&cmd.table)?;
    let records = score::select::select_variants(&table)?;

    let mut summary = RunSummary::new();
    let ranked = score::score_records(records, &mut summary);

    report::ranked::write_ranked(&cmd.output, &ranked)?;
    info!("ranked table written to {}", cmd.output.display());

    let charts = render_charts(
        &cmd.charts,
        cmd.chart_prefix.as_deref(),
        &ranked,
        &cmd.scatter_predictor,
    )?;
    if cmd.show {
        chart::display(&charts);
    }

    println!(
        "{}",
        report::render_summary(&summary, output_format(cmd.summary_format))?
    );

    if ranked.is_empty() {
        warn!("no rows survived scoring");
        return Ok(exit_code::NO_DATA);
    }
    Ok(exit_code::SUCCESS)
}

fn run_annotate(cmd: cli::AnnotateCommand) -> Result<i32> {
    let resolved = resolve_annovar(
        cmd.annovar_dir.clone(),
        cmd.database_dir.clone(),
        cmd.build.clone(),
    )?;
    let options = annovar::AnnotateOptions {
        build: resolved.build,
        min_quality: cmd.min_quality,
        timeout: cmd.timeout_secs.map(Duration::from_secs),
        keep_intermediates: cmd.keep_intermediates,
        ..annovar::AnnotateOptions::default()
    };

    let Some(filtered) = annovar::annotate(&cmd.vcf, &resolved.paths, &options, &cmd.out_prefix)?
    else {
        return Ok(exit_code::NO_DATA);
    };

    let selection = score::select::select_variants_lenient(&filtered)?;
    let mut summary = RunSummary::new();

    let available = PREDICTOR_COUNT - selection.absent_predictors.len();
    if !selection.absent_predictors.is_empty() {
        let names: Vec<&str> = selection
            .absent_predictors
            .iter()
            .map(|predictor| predictor.source_column())
            .collect();
        warn!("predictor columns absent from annotation: {}", names.join(", "));
        summary.warn(format!(
            "predictor columns absent from annotation: {}",
            names.join(", ")
        ));
    }
    if available < 3 {
        warn!("only {available} of {PREDICTOR_COUNT} predictor columns available");
        summary.warn(format!(
            "only {available} of {PREDICTOR_COUNT} predictor columns available"
        ));
        if cmd.conditional {
            info!("conditional analysis requested, skipping scoring");
            println!(
                "{}",
                report::render_summary(&summary, output_format(cmd.summary_format))?
            );
            return Ok(exit_code::NO_DATA);
        }
    }

    let ranked = score::score_records(selection.records, &mut summary);
    let output = suffixed(&cmd.out_prefix, "_ranked.csv");
    report::ranked::write_ranked(&output, &ranked)?;
    info!("ranked table written to {}", output.display());

    let charts = render_charts(
        &cmd.charts,
        Some(cmd.out_prefix.as_path()),
        &ranked,
        &cmd.scatter_predictor,
    )?;
    if cmd.show {
        chart::display(&charts);
    }

    println!(
        "{}",
        report::render_summary(&summary, output_format(cmd.summary_format))?
    );

    if ranked.is_empty() {
        warn!("no rows survived scoring");
        return Ok(exit_code::NO_DATA);
    }
    Ok(exit_code::SUCCESS)
}

fn run_check_setup(cmd: cli::CheckSetupCommand) -> Result<i32> {
    let resolved = resolve_annovar(cmd.annovar_dir, cmd.database_dir, cmd.build)?;
    let report = annovar::setup::check_setup(&resolved.paths, &resolved.build);

    for script in &report.missing_scripts {
        println!(
            "missing script: {}",
            resolved.paths.install_dir.join(script).display()
        );
    }
    for database in &report.missing_databases {
        println!(
            "missing database: {}",
            resolved.paths.database_dir.join(database).display()
        );
    }

    if report.is_ready() {
        println!("annovar setup ready");
        Ok(exit_code::SUCCESS)
    } else {
        println!("annovar setup incomplete");
        Ok(exit_code::NOT_READY)
    }
}

struct ResolvedAnnovar {
    paths: annovar::AnnovarPaths,
    build: String,
}

fn resolve_annovar(
    annovar_dir: Option<PathBuf>,
    database_dir: Option<PathBuf>,
    build: Option<String>,
) -> Result<ResolvedAnnovar> {
    let section = config::load_config(Path::new("."))?.and_then(|config| config.annovar);

    let install_dir = annovar_dir
        .or_else(|| section.as_ref().and_then(|annovar| annovar.install_dir.clone()))
        .ok_or_else(|| {
            MisrankError::MissingSetting(
                "annovar installation directory (--annovar-dir or [annovar].install_dir)"
                    .to_string(),
            )
        })?;
    let database_dir = database_dir
        .or_else(|| section.as_ref().and_then(|annovar| annovar.database_dir.clone()))
        .ok_or_else(|| {
            MisrankError::MissingSetting(
                "annovar database directory (--database-dir or [annovar].database_dir)".to_string(),
            )
        })?;
    let build = build
        .or_else(|| section.as_ref().and_then(|annovar| annovar.build.clone()))
        .unwrap_or_else(|| "hg19".to_string());

    Ok(ResolvedAnnovar {
        paths: annovar::AnnovarPaths::new(install_dir, database_dir),
        build,
    })
}

fn render_charts(
    kinds: &[cli::ChartKind],
    stem: Option<&Path>,
    ranked: &[ScoredVariant],
    scatter_alias: &str,
) -> Result<Vec<chart::ChartFiles>> {
    let Some(stem) = stem else {
        return Ok(Vec::new());
    };

    let mut files = Vec::new();
    for kind in kinds {
        let rendered = match kind {
            cli::ChartKind::Bar => chart::render_bar(&suffixed(stem, "_bar"), ranked)?,
            cli::ChartKind::Heatmap => chart::render_heatmap(&suffixed(stem, "_heatmap"), ranked)?,
            cli::ChartKind::Scatter => {
                let predictor = Predictor::from_alias(scatter_alias)
                    .ok_or_else(|| MisrankError::UnknownPredictor(scatter_alias.to_string()))?;
                chart::render_scatter(&suffixed(stem, "_scatter"), ranked, predictor)?
            }
            cli::ChartKind::Histogram => {
                chart::render_histogram(&suffixed(stem, "_histogram"), ranked)?
            }
        };
        info!("chart written to {}", rendered.vector.display());
        files.push(rendered);
    }
    Ok(files)
}

fn output_format(format: cli::SummaryFormat) -> report::OutputFormat {
    match format {
        cli::SummaryFormat::Md => report::OutputFormat::Md,
        cli::SummaryFormat::Json => report::OutputFormat::Json,
    }
}

fn suffixed(stem: &Path, suffix: &str) -> PathBuf {
    let mut name = stem.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn init_tracing(cli: &cli::Cli) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    match run() {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(exit_code::RUNTIME_FAILURE);
        }
    }
}
