mod error;
mod input;
mod logging;
mod model;
mod pipeline;
mod report;
mod source;

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

use crate::error::{AppError, Result};
use crate::input::load_data_dir;
use crate::input::matrix::{read_labeled_matrix, read_null_samples};
use crate::model::gene::{Experiment, GeneNameKind};
use crate::model::params::AnalysisParams;
use crate::pipeline::stage1_pairs::{PairSource, build_catalog};
use crate::pipeline::stage3_aggregate::{calculate_catalog_matrices, collect_results};
use crate::pipeline::stage4_background::{build_cohort, make_rng};
use crate::pipeline::stage5_significance::{p_value_matrix, sample_kth_largest};
use crate::pipeline::stage6_report::{
    CorrelateReport, SUMMARY_FILE, write_correlate_reports, write_matrix_file,
    write_null_samples_file, write_summary,
};
use crate::report::ValueFormatter;
use crate::report::json::{InputSummary, RunSummary};
use crate::source::memory::InMemoryStore;
use crate::source::{ExperimentCatalog, GeneLookup};

const TOOL_NAME: &str = "kira-coexpr";

#[derive(Debug, Parser)]
#[command(name = TOOL_NAME, version, about = "Coexpression matrices, null sampling and empirical p-values across expression experiments")]
struct Cli {
    /// Debug-level logging (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Correlate gene pairs in every experiment of a taxon.
    Correlate(CorrelateArgs),
    /// Sample the null distribution of the k-th largest correlation.
    SampleNull(SampleNullArgs),
    /// Turn an observed matrix into empirical p-values.
    Pvalues(PvaluesArgs),
}

#[derive(Debug, Args)]
struct DataArgs {
    /// Data directory holding genes.tsv, experiments.tsv and matrices.
    #[arg(long = "data")]
    data_dir: PathBuf,
    #[arg(long)]
    taxon: String,
    /// JSON file with analysis parameters; flags below override it.
    #[arg(long)]
    params: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    /// Ignore probes whose expression rank is at or below this value.
    #[arg(long)]
    min_rank: Option<f64>,
    #[arg(long)]
    include_nonspecific: bool,
}

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("pairs")
        .required(true)
        .args(["genes", "gene_list", "query", "pair_file", "go_term", "random_pairs"])
))]
struct CorrelateArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Comma-separated official symbols, paired all against all.
    #[arg(long, value_delimiter = ',')]
    genes: Vec<String>,
    #[arg(long)]
    gene_list: Option<PathBuf>,
    #[arg(long, requires = "target")]
    query: Option<PathBuf>,
    #[arg(long, requires = "query")]
    target: Option<PathBuf>,
    #[arg(long)]
    pair_file: Option<PathBuf>,
    #[arg(long)]
    go_term: Option<String>,
    /// Draw this many random pairs from the taxon as a control.
    #[arg(long)]
    random_pairs: Option<usize>,

    /// How names in list and pair files are resolved.
    #[arg(long, value_enum, default_value_t = GeneNameKind::OfficialSymbol)]
    name_kind: GeneNameKind,
    /// Minimum link count for pair-file lines that carry one.
    #[arg(long, default_value_t = 0)]
    stringency: u32,
    #[arg(long)]
    min_samples: Option<usize>,
    /// Start from the effect-size defaults (low-expressed probes dropped).
    #[arg(long)]
    effect_size: bool,
    /// Keep experiments without data for any pair in the per-pair reports.
    #[arg(long)]
    keep_empty_experiments: bool,
    #[arg(long)]
    nan_placeholder: Option<String>,
}

#[derive(Debug, Args)]
struct SampleNullArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Output file for the sampled values.
    #[arg(long)]
    out: PathBuf,
    /// Rank of the statistic, 0 being the maximum.
    #[arg(long, default_value_t = 0)]
    k_max: usize,
    #[arg(long, default_value_t = 1000)]
    num_samples: usize,
    /// Restrict the cohort to these experiment short names.
    #[arg(long, value_delimiter = ',')]
    experiments: Vec<String>,
    #[arg(long)]
    max_background_pairs: Option<usize>,
    #[arg(long)]
    bins: Option<usize>,
}

#[derive(Debug, Args)]
struct PvaluesArgs {
    /// Observed matrix, e.g. max_correlations.tsv.
    #[arg(long)]
    matrix: PathBuf,
    /// Null sample file written by sample-null.
    #[arg(long)]
    null: PathBuf,
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    nan_placeholder: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Err(err) = run(cli) {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Correlate(args) => run_correlate(args),
        Command::SampleNull(args) => run_sample_null(args),
        Command::Pvalues(args) => run_pvalues(args),
    }
}

fn run_correlate(args: CorrelateArgs) -> Result<()> {
    let base = if args.effect_size {
        AnalysisParams::effect_size_v1()
    } else {
        AnalysisParams::default_v1()
    };
    let mut params = resolve_params(&args.data, base)?;
    if let Some(min) = args.min_samples {
        params.min_paired_samples = min;
    }
    if let Some(placeholder) = &args.nan_placeholder {
        params.nan_placeholder = placeholder.clone();
    }
    params
        .validate()
        .map_err(|e| AppError::Configuration(e.to_string()))?;

    let pair_source = pair_source(&args)?;
    let (store, experiments) = open_store(&args.data, &params)?;
    let (mut rng, seed) = make_rng(params.seed);
    tracing::info!(seed, "random seed");

    let catalog = build_catalog(&store, &args.data.taxon, &pair_source, &mut rng)?;
    if catalog.pairs.is_empty() {
        tracing::warn!("no gene pairs to analyse; reports will be empty");
    }

    let matrices = calculate_catalog_matrices(&store, &experiments, &catalog, &params);
    let results = collect_results(&matrices, &catalog, &params);
    let formatter = ValueFormatter::with_nan_placeholder(&params.nan_placeholder);

    let mut outputs = write_correlate_reports(
        &args.out,
        &CorrelateReport {
            matrices: &matrices,
            catalog: &catalog,
            results: &results,
            formatter: &formatter,
            drop_empty: !args.keep_empty_experiments,
        },
    )?;
    outputs.push(SUMMARY_FILE.to_string());

    let summary = RunSummary {
        tool: TOOL_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        taxon: args.data.taxon.clone(),
        input: InputSummary {
            data_dir: args.data.data_dir.display().to_string(),
            pair_source: pair_source.describe(),
            n_pairs: catalog.pairs.len(),
            n_query: catalog.query.len(),
            n_target: catalog.target.len(),
            n_experiments: experiments.len(),
            n_pairs_with_data: results.iter().filter(|r| r.n_experiments > 0).count(),
            missing_genes: catalog.missing.clone(),
        },
        seed,
        params,
        outputs,
    };
    write_summary(&args.out, &summary)?;
    Ok(())
}

fn run_sample_null(args: SampleNullArgs) -> Result<()> {
    let mut params = resolve_params(&args.data, AnalysisParams::default_v1())?;
    if let Some(max) = args.max_background_pairs {
        params.max_background_pairs = max;
    }
    if let Some(bins) = args.bins {
        params.histogram_bins = bins;
    }
    params
        .validate()
        .map_err(|e| AppError::Configuration(e.to_string()))?;
    if args.num_samples == 0 {
        return Err(AppError::Configuration(
            "--num-samples must be positive".to_string(),
        ));
    }

    let (store, mut experiments) = open_store(&args.data, &params)?;
    if !args.experiments.is_empty() {
        for name in &args.experiments {
            if !experiments.iter().any(|e| &e.short_name == name) {
                tracing::warn!(experiment = %name, "experiment not found in taxon; skipping");
            }
        }
        experiments.retain(|e| args.experiments.contains(&e.short_name));
    }

    let (mut rng, seed) = make_rng(params.seed);
    tracing::info!(seed, "random seed");

    let cohort = build_cohort(&store, &experiments, &params, &mut rng);
    if cohort.is_empty() {
        tracing::warn!("no experiment has a background distribution");
    } else if !cohort.excluded.is_empty() {
        tracing::warn!(
            excluded = cohort.excluded.len(),
            cohort = cohort.len(),
            "cohort reduced"
        );
    }
    let stat = sample_kth_largest(&cohort, args.k_max, args.num_samples, &mut rng)?;
    write_null_samples_file(&args.out, &stat)?;
    tracing::info!(out = %args.out.display(), samples = stat.values.len(), "null samples written");
    Ok(())
}

fn run_pvalues(args: PvaluesArgs) -> Result<()> {
    let observed = read_labeled_matrix(&args.matrix)?;
    let null = read_null_samples(&args.null)?;
    tracing::info!(
        rows = observed.matrix.n_rows(),
        cols = observed.matrix.n_cols(),
        null_samples = null.values.len(),
        cohort = null.experiments.len(),
        "computing empirical p-values"
    );
    let p_values = p_value_matrix(&observed.matrix, &null.values);
    let formatter = ValueFormatter::with_nan_placeholder(args.nan_placeholder.as_deref().unwrap_or(""));
    write_matrix_file(&args.out, &p_values, &observed.corner, &formatter)?;
    Ok(())
}

fn resolve_params(data: &DataArgs, base: AnalysisParams) -> Result<AnalysisParams> {
    let mut params = match &data.params {
        Some(path) => AnalysisParams::from_json_file(path, &base)
            .map_err(|e| AppError::Configuration(e.to_string()))?,
        None => base,
    };
    if let Some(seed) = data.seed {
        params.seed = Some(seed);
    }
    if let Some(min_rank) = data.min_rank {
        params.min_rank = min_rank;
    }
    if data.include_nonspecific {
        params.include_nonspecific = true;
    }
    Ok(params)
}

fn pair_source(args: &CorrelateArgs) -> Result<PairSource> {
    let kind = args.name_kind;
    if !args.genes.is_empty() {
        return Ok(PairSource::Symbols(args.genes.clone()));
    }
    if let Some(path) = &args.gene_list {
        return Ok(PairSource::GeneList {
            path: path.clone(),
            kind,
        });
    }
    if let (Some(query), Some(target)) = (&args.query, &args.target) {
        return Ok(PairSource::QueryTarget {
            query: query.clone(),
            target: target.clone(),
            kind,
        });
    }
    if let Some(path) = &args.pair_file {
        return Ok(PairSource::PairFile {
            path: path.clone(),
            kind,
            stringency: args.stringency,
        });
    }
    if let Some(term) = &args.go_term {
        return Ok(PairSource::GoTerm(term.clone()));
    }
    if let Some(count) = args.random_pairs {
        return Ok(PairSource::Random { count });
    }
    Err(AppError::Configuration("no gene pair source given".to_string()))
}

fn open_store(data: &DataArgs, params: &AnalysisParams) -> Result<(InMemoryStore, Vec<Experiment>)> {
    let bundle = load_data_dir(&data.data_dir, Some(&data.taxon), params.include_nonspecific)?;
    let store = InMemoryStore::from_bundle(bundle);
    if !store.has_taxon(&data.taxon) {
        return Err(AppError::Configuration(format!(
            "unknown taxon '{}'",
            data.taxon
        )));
    }
    let experiments = store.experiments(&data.taxon);
    if experiments.is_empty() {
        return Err(AppError::Configuration(format!(
            "no experiments for taxon '{}'",
            data.taxon
        )));
    }
    tracing::info!(taxon = %data.taxon, experiments = experiments.len(), "reference data loaded");
    Ok((store, experiments))
}

#[cfg(test)]
#[path = "../tests/src_inline/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
