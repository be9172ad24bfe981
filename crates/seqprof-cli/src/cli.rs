//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use seqprof_model::{CostMethod, Linkage, StateSpace};

#[derive(Parser)]
#[command(
    name = "seqprof",
    version,
    about = "Cluster survey respondents by their answer profiles",
    long_about = "Encode survey answers as state sequences, compare subjects with \
                  Optimal Matching and group them with Ward hierarchical clustering.\n\n\
                  Writes the coded table, transition rates, substitution costs, \
                  dissimilarities, dendrogram and cluster assignment as CSV files."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow raw survey answers in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full pipeline and write all artifacts.
    Run(RunArgs),

    /// Show the resolved schema and which features would be encoded.
    Schema(InputArgs),

    /// Derive and print the substitution cost matrix.
    Costs(CostsArgs),
}

#[derive(Args, Clone)]
pub struct InputArgs {
    /// Survey export (CSV, one row per subject).
    #[arg(value_name = "SURVEY_CSV")]
    pub input: PathBuf,

    /// Study config (TOML) with schema, analysis options and profile variables.
    #[arg(long = "config", short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Allow-listed feature; repeat to list several. Replaces the config's
    /// categorical features.
    #[arg(long = "feature", short = 'f', value_name = "COLUMN")]
    pub features: Vec<String>,

    /// Column holding subject identifiers.
    #[arg(long = "subject-id", value_name = "COLUMN")]
    pub subject_id: Option<String>,

    /// Field separator of the survey export.
    #[arg(long = "separator", default_value_t = ',')]
    pub separator: char,
}

#[derive(Args, Clone, Default)]
pub struct AnalysisArgs {
    /// Cost of one insertion or deletion.
    #[arg(long = "indel", value_name = "COST")]
    pub indel: Option<f64>,

    /// How substitution costs are derived.
    #[arg(long = "cost-method", value_enum)]
    pub cost_method: Option<CostMethodArg>,

    /// Whether answer codes are shared across features.
    #[arg(long = "state-space", value_enum)]
    pub state_space: Option<StateSpaceArg>,
}

#[derive(Parser)]
pub struct RunArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub analysis: AnalysisArgs,

    /// Number of clusters to cut the dendrogram into.
    #[arg(long = "clusters", short = 'k', value_name = "K")]
    pub clusters: Option<usize>,

    /// Ward variant.
    #[arg(long = "linkage", value_enum)]
    pub linkage: Option<LinkageArg>,

    /// Worker threads for the distance stage (0 = all cores).
    #[arg(long = "threads", value_name = "N")]
    pub threads: Option<usize>,

    /// Study variable to profile clusters against; repeatable.
    #[arg(long = "profile", value_name = "COLUMN")]
    pub profile: Vec<String>,

    /// Output directory (default: <SURVEY_CSV stem>-profiles next to the input).
    #[arg(long = "output-dir", short = 'o', value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Hide the distance progress bar.
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

#[derive(Parser)]
pub struct CostsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LinkageArg {
    WardD,
    WardD2,
}

impl From<LinkageArg> for Linkage {
    fn from(value: LinkageArg) -> Self {
        match value {
            LinkageArg::WardD => Linkage::WardD,
            LinkageArg::WardD2 => Linkage::WardD2,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CostMethodArg {
    TransitionRate,
    Constant,
}

impl From<CostMethodArg> for CostMethod {
    fn from(value: CostMethodArg) -> Self {
        match value {
            CostMethodArg::TransitionRate => CostMethod::TransitionRate,
            CostMethodArg::Constant => CostMethod::Constant,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StateSpaceArg {
    Shared,
    FeatureScoped,
}

impl From<StateSpaceArg> for StateSpace {
    fn from(value: StateSpaceArg) -> Self {
        match value {
            StateSpaceArg::Shared => StateSpace::Shared,
            StateSpaceArg::FeatureScoped => StateSpace::FeatureScoped,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
