use std::path::PathBuf;

use clap::builder::TypedValueParser;
use clap::{Args, Parser, Subcommand};

use crate::input::tissue_table::DEFAULT_UNIT_MARKER;

pub const DEFAULT_GENE_MAP: &str = "/mnt/metadata/attrs.tsv";
pub const DEFAULT_GENCODE: &str = "/mnt/gencode.v23.annotation.gtf";
pub const DEFAULT_CORES: usize = 8;

#[derive(Debug, Parser)]
#[command(
    name = "kira-pairwisede",
    version,
    about = "Pairwise tumor-vs-normal differential expression: run, mask and rank"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Prepare the cohort, run one DE computation per sample, then aggregate.
    Run(RunArgs),
    /// Classify, mask and rank an already populated pairwise_results directory.
    Aggregate(AggregateArgs),
    /// Print the first rows of a ranked table.
    Top(TopArgs),
}

#[derive(Debug, Args)]
pub struct CohortArgs {
    #[arg(
        long,
        help = "Tissue dataframe: genes by samples, baseline columns first, then tumor columns"
    )]
    pub tissue_df: PathBuf,

    #[arg(
        long,
        default_value = DEFAULT_GENE_MAP,
        help = "TSV with at least the columns geneId and geneName"
    )]
    pub gene_map: PathBuf,

    #[arg(
        long,
        default_value_t = false,
        help = "Drop genes seen in fewer than 90% of a result set's files before ranking"
    )]
    pub drop_underrepresented: bool,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub cohort: CohortArgs,

    #[arg(
        long,
        default_value = DEFAULT_GENCODE,
        help = "Gencode annotation used to keep protein coding genes"
    )]
    pub gencode: PathBuf,

    #[arg(
        long,
        default_value_t = DEFAULT_CORES,
        value_parser = clap::value_parser!(u32).range(1..).map(|v| v as usize),
        help = "Number of DE computations run concurrently"
    )]
    pub cores: usize,

    #[arg(long, default_value = "Rscript", help = "Program launching the DE script")]
    pub rscript: PathBuf,

    #[arg(long, help = "DE script [default: <tissue dir>/edgeR-pairwise-DE.R]")]
    pub de_script: Option<PathBuf>,

    #[arg(
        long,
        default_value = DEFAULT_UNIT_MARKER,
        help = "Substring selecting the per-sample columns of the tissue dataframe"
    )]
    pub unit_marker: String,
}

#[derive(Debug, Args)]
pub struct AggregateArgs {
    #[command(flatten)]
    pub cohort: CohortArgs,
}

#[derive(Debug, Args)]
pub struct TopArgs {
    #[arg(long, help = "Ranked table written by run or aggregate")]
    pub ranked: PathBuf,

    #[arg(long, short = 'n', default_value_t = 20)]
    pub n: usize,
}
