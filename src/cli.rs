use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "misrank",
    version,
    about = "Missense variant ranking from composite predictor scores"
)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank the variants of an already-annotated table
    Score(ScoreCommand),
    /// Run ANNOVAR on raw variant calls, then rank the missense rows
    Annotate(AnnotateCommand),
    /// Probe an ANNOVAR installation for the required scripts and databases
    CheckSetup(CheckSetupCommand),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ChartKind {
    Bar,
    Heatmap,
    Scatter,
    Histogram,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SummaryFormat {
    Md,
    Json,
}

#[derive(Args)]
pub struct ScoreCommand {
    /// Input table (.csv, .tsv, .xlsx or .xls)
    pub table: PathBuf,

    /// Where to write the ranked CSV
    #[arg(short, long)]
    pub output: PathBuf,

    /// Stem for chart files; each chart appends its own suffix
    #[arg(long)]
    pub chart_prefix: Option<PathBuf>,

    /// Charts to render when --chart-prefix is given
    #[arg(long, value_enum, value_delimiter = ',', default_value = "bar")]
    pub charts: Vec<ChartKind>,

    /// Predictor alias on the scatter chart's x axis
    #[arg(long, default_value = "cadd")]
    pub scatter_predictor: String,

    /// Open rendered charts in the desktop viewer
    #[arg(long)]
    pub show: bool,

    #[arg(long, value_enum, default_value = "md")]
    pub summary_format: SummaryFormat,
}

#[derive(Args)]
pub struct AnnotateCommand {
    /// Raw variant calls (.vcf or .vcf.gz)
    pub vcf: PathBuf,

    /// Prefix for every produced artifact
    #[arg(short, long)]
    pub out_prefix: PathBuf,

    /// ANNOVAR installation directory (falls back to misrank.toml)
    #[arg(long)]
    pub annovar_dir: Option<PathBuf>,

    /// ANNOVAR database directory (falls back to misrank.toml)
    #[arg(long)]
    pub database_dir: Option<PathBuf>,

    /// Genome build passed to -buildver
    #[arg(long)]
    pub build: Option<String>,

    /// Drop annotated rows with QUAL below this value
    #[arg(long)]
    pub min_quality: Option<f64>,

    /// Kill the annotator after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Keep conversion artifacts and subprocess logs
    #[arg(long)]
    pub keep_intermediates: bool,

    /// Skip scoring when fewer than three predictor columns are available
    #[arg(long)]
    pub conditional: bool,

    /// Charts to render next to the ranked CSV
    #[arg(long, value_enum, value_delimiter = ',', default_value = "bar")]
    pub charts: Vec<ChartKind>,

    /// Predictor alias on the scatter chart's x axis
    #[arg(long, default_value = "cadd")]
    pub scatter_predictor: String,

    /// Open rendered charts in the desktop viewer
    #[arg(long)]
    pub show: bool,

    #[arg(long, value_enum, default_value = "md")]
    pub summary_format: SummaryFormat,
}

#[derive(Args)]
pub struct CheckSetupCommand {
    /// ANNOVAR installation directory (falls back to misrank.toml)
    #[arg(long)]
    pub annovar_dir: Option<PathBuf>,

    /// ANNOVAR database directory (falls back to misrank.toml)
    #[arg(long)]
    pub database_dir: Option<PathBuf>,

    /// Genome build whose database files are expected
    #[arg(long)]
    pub build: Option<String>,
}
