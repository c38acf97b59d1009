//! Stage orchestration.
//!
//! load → reconcile → merge → type → dedup → ages → impute → export.
//! Each stage consumes the previous stage's frame and must succeed before
//! the next one starts.

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;

use crate::{
    audit,
    classifier::{Classifier, GaussianNaiveBayes},
    clean::{self, AgeReport, DedupReport},
    cli::RunArgs,
    config::PipelineConfig,
    export,
    frame::Frame,
    impute::{self, ImputationReport, theme::ThemeOverrides},
    io_utils, loader, merge, reconcile,
};

#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub descriptions_loaded: usize,
    pub locale_prices_loaded: usize,
    pub merged_rows: usize,
    pub dedup: DedupReport,
    pub ages: AgeReport,
    pub imputation: Option<ImputationReport>,
    pub seed: Option<u64>,
    pub overrides_version: Option<String>,
    pub overrides_digest: Option<String>,
    pub output: Option<PathBuf>,
}

/// Runs every stage up to, but not including, imputation.
pub fn prepare(
    config: &PipelineConfig,
    descriptions_dir: &Path,
    locale_prices_dir: &Path,
) -> Result<(Frame, PipelineReport)> {
    let mut report = PipelineReport::default();

    let descriptions = loader::load_descriptions(descriptions_dir)
        .with_context(|| format!("Loading set descriptions from {descriptions_dir:?}"))?;
    let locale_prices = loader::load_locale_prices(
        locale_prices_dir,
        config.filename_delimiter,
        &config.product_id_field,
        &config.country_field,
    )
    .with_context(|| format!("Loading locale prices from {locale_prices_dir:?}"))?;
    report.descriptions_loaded = descriptions.len();
    report.locale_prices_loaded = locale_prices.len();

    let (descriptions, locale_prices) = reconcile::reconcile(
        descriptions,
        locale_prices,
        &config.description_renames,
        &config.locale_price_renames,
    )?;
    let merged = merge::merge(descriptions, locale_prices)?;
    report.merged_rows = merged.len();
    debug!("Null audit after merge:\n{}", audit::render(&merged));

    let typed =
        clean::coerce_numeric_columns(merged, &config.float_columns, &config.integer_columns)?;
    let (deduplicated, dedup) = clean::deduplicate(typed);
    report.dedup = dedup;
    let (frame, ages) = clean::normalize_ages(deduplicated)?;
    report.ages = ages;
    Ok((frame, report))
}

/// Runs the whole pipeline in memory and returns the imputed frame.
pub fn run_pipeline<C, R>(
    config: &PipelineConfig,
    descriptions_dir: &Path,
    locale_prices_dir: &Path,
    overrides: &ThemeOverrides,
    classifier: &mut C,
    rng: &mut R,
) -> Result<(Frame, PipelineReport)>
where
    C: Classifier + ?Sized,
    R: Rng,
{
    let (frame, mut report) = prepare(config, descriptions_dir, locale_prices_dir)?;
    let (frame, imputation) = impute::impute_all(frame, classifier, overrides, rng)?;
    report.imputation = Some(imputation);
    report.overrides_version = (!overrides.version.is_empty()).then(|| overrides.version.clone());
    report.overrides_digest = overrides.digest.clone();
    Ok((frame, report))
}

pub fn execute(args: &RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Loading pipeline config from {path:?}"))?,
        None => PipelineConfig::default(),
    };
    if args.overrides.is_some() {
        config.overrides = args.overrides.clone();
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let overrides = match &config.overrides {
        Some(path) => ThemeOverrides::load(path)?,
        None => {
            debug!("No theme override table configured");
            ThemeOverrides::default()
        }
    };
    let seed = config.seed.unwrap_or_else(rand::random);
    info!("Hot-deck sampling seed: {seed}");
    let mut rng = StdRng::seed_from_u64(seed);

    info!(
        "Running pipeline: descriptions {:?}, locale prices {:?} -> {:?}",
        args.descriptions, args.locale_prices, args.output
    );
    let (frame, mut report) = run_pipeline(
        &config,
        &args.descriptions,
        &args.locale_prices,
        &overrides,
        &mut GaussianNaiveBayes::new(),
        &mut rng,
    )?;
    report.seed = Some(seed);

    let delimiter = io_utils::resolve_delimiter(&args.output, args.delimiter);
    export::write_table(&frame, &args.output, delimiter)?;
    report.output = Some(args.output.clone());

    if let Some(imputation) = &report.imputation
        && !imputation.unresolved.is_empty()
    {
        warn!(
            "{} column(s) still contain nulls; see the run report for row ids",
            imputation.unresolved.len()
        );
    }

    if let Some(path) = &args.report {
        write_report(&report, path)?;
    }
    Ok(())
}

fn write_report(report: &PipelineReport, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Creating report file {path:?}"))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .with_context(|| format!("Writing run report to {path:?}"))?;
    info!("Run report written to {:?}", path);
    Ok(())
}
