mod cli;
mod error;
mod input;
mod logging;
mod model;
mod pipeline;
mod report;

use std::path::PathBuf;

use clap::Parser;

use crate::cli::{AggregateArgs, Cli, CohortArgs, Commands, RunArgs, TopArgs};
use crate::error::Result;
use crate::input::CohortLayout;
use crate::model::thresholds::ThresholdProfile;
use crate::pipeline::stage2_jobs::JobCommand;
use crate::pipeline::stage7_report::{read_ranked_table, render_top};
use crate::pipeline::{AggregateParams, RunParams, run_aggregation, run_pipeline};

fn main() {
    logging::init_logging();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        if let Some(unit) = err.failed_unit() {
            crate::error!("pipeline aborted at unit {unit}; no ranked tables were written");
        }
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run_command(args),
        Commands::Aggregate(args) => aggregate_command(args),
        Commands::Top(args) => top_command(args),
    }
}

fn run_command(args: RunArgs) -> Result<()> {
    let layout = CohortLayout::from_tissue_df(&args.cohort.tissue_df);
    let executor = job_command(&layout, &args)?;
    let params = RunParams {
        aggregate: aggregate_params(&layout, &args.cohort),
        gencode: &args.gencode,
        unit_marker: &args.unit_marker,
        cores: args.cores,
    };
    let summary = run_pipeline(&params, &executor)?;
    crate::info!(
        "done: {} units, {} matched subjects",
        summary.n_units_run,
        summary.n_matched_subjects
    );
    Ok(())
}

fn aggregate_command(args: AggregateArgs) -> Result<()> {
    let layout = CohortLayout::from_tissue_df(&args.cohort.tissue_df);
    let summary = run_aggregation(&aggregate_params(&layout, &args.cohort), 0)?;
    crate::info!(
        "done: {} result files, {} matched subjects",
        summary.n_result_files,
        summary.n_matched_subjects
    );
    Ok(())
}

fn top_command(args: TopArgs) -> Result<()> {
    let ranked = read_ranked_table(&args.ranked)?;
    print!("{}", render_top(&ranked, args.n));
    Ok(())
}

fn aggregate_params<'a>(
    layout: &'a CohortLayout,
    cohort: &'a CohortArgs,
) -> AggregateParams<'a> {
    AggregateParams {
        layout,
        gene_map: &cohort.gene_map,
        thresholds: ThresholdProfile::default_v1(),
        drop_underrepresented: cohort.drop_underrepresented,
    }
}

fn job_command(layout: &CohortLayout, args: &RunArgs) -> Result<JobCommand> {
    let script: PathBuf = args
        .de_script
        .clone()
        .unwrap_or_else(|| layout.default_de_script());
    Ok(JobCommand {
        program: args.rscript.clone(),
        args: vec![std::path::absolute(&script)?.display().to_string()],
        work_dir: layout.tissue_dir.clone(),
        output_dir: std::path::absolute(&layout.pairwise_dir)?,
    })
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
