use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cauda_core::community::proportional::ProportionalBuilder;
use cauda_core::community::{Medium, MetabolicTable, TaxonRecord};
use cauda_core::flux::interpolate_flux_columns;
use cauda_core::io::csv::{
    read_flux_table, read_metabolic_table, write_flux_series, write_knockout_table,
};
use cauda_core::io::json::write_knockout_json;
use cauda_core::knockout::{calculate_knockouts_for, sample_id, select_taxa};

/// Run single member knockouts of a community, optionally in a medium interpolated between two
/// chemical environments.
#[derive(Parser, Debug)]
#[command(name = "cauda", version, about, long_about = None)]
struct Cli {
    /// Flux table (csv) of the base medium
    #[arg(long = "medium-1", visible_alias = "m1")]
    medium_1: PathBuf,

    /// Flux table (csv) of a second medium to interpolate towards
    #[arg(long = "medium-2", visible_alias = "m2", requires = "interp_factor")]
    medium_2: Option<PathBuf>,

    /// Interpolation factor between the two media, 0 is medium 1 and 1 is medium 2
    #[arg(long, visible_alias = "if", requires = "medium_2")]
    interp_factor: Option<f64>,

    /// Metabolic metadata table (csv) with one row per taxon
    #[arg(long)]
    metadata: PathBuf,

    /// Rows of the metadata table making up the community
    #[arg(short, long, num_args = 1.., required = true)]
    indices: Vec<usize>,

    /// Relative abundances of the selected taxa, in the same order as the indices
    #[arg(long, visible_alias = "ra", num_args = 1..)]
    rel_abund: Option<Vec<f64>>,

    /// Flux column of medium 1
    #[arg(long, default_value = "flux")]
    flux_col_1: String,

    /// Flux column of medium 2
    #[arg(long, default_value = "flux")]
    flux_col_2: String,

    /// Where to write the knockout table, stdout if omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Format of the knockout table
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Also write the medium used for the simulation to this csv file
    #[arg(long)]
    save_medium: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cauda=info,cauda_core=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let medium = load_medium(cli)?;
    info!("Simulating in a medium with {} components", medium.len());
    if let Some(path) = &cli.save_medium {
        let file = create(path)?;
        write_flux_series(file, &medium, "flux")
            .with_context(|| format!("Unable to write medium to {}", path.display()))?;
    }

    let table = read_metabolic_table(&cli.metadata)
        .with_context(|| format!("Unable to read metadata from {}", cli.metadata.display()))?;
    let taxa = community_members(&table, &cli.indices, cli.rel_abund.as_deref())?;
    let ids: Vec<String> = taxa.iter().map(|t| t.id.clone()).collect();
    info!("Running knockouts for community {}", sample_id(&ids));

    let knockouts = calculate_knockouts_for(&ProportionalBuilder, &medium, &taxa);
    if knockouts.is_failure() {
        info!("Knockout sweep failed, writing placeholder rows");
    }

    let writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(create(path)?),
        None => Box::new(io::stdout().lock()),
    };
    match cli.format {
        OutputFormat::Csv => write_knockout_table(writer, &knockouts)?,
        OutputFormat::Json => write_knockout_json(writer, &knockouts)?,
    }
    Ok(())
}

/// Medium 1, or the interpolation between medium 1 and medium 2 if a second medium was given
fn load_medium(cli: &Cli) -> Result<Medium> {
    let medium_1 = read_flux_table(&cli.medium_1)
        .with_context(|| format!("Unable to read medium from {}", cli.medium_1.display()))?;
    match (&cli.medium_2, cli.interp_factor) {
        (Some(path), Some(factor)) => {
            let medium_2 = read_flux_table(path)
                .with_context(|| format!("Unable to read medium from {}", path.display()))?;
            let medium = interpolate_flux_columns(
                &medium_1,
                &medium_2,
                factor,
                &cli.flux_col_1,
                &cli.flux_col_2,
            )?;
            Ok(medium)
        }
        _ => Ok(medium_1.column_as_medium(&cli.flux_col_1)?),
    }
}

/// Select the community members, overriding their abundances if given
fn community_members(
    table: &MetabolicTable,
    indices: &[usize],
    abundances: Option<&[f64]>,
) -> Result<Vec<TaxonRecord>> {
    let mut taxa = select_taxa(table, indices)?;
    if let Some(abundances) = abundances {
        if abundances.len() != taxa.len() {
            bail!(
                "Got {} relative abundances for {} taxa",
                abundances.len(),
                taxa.len()
            );
        }
        for (taxon, abundance) in taxa.iter_mut().zip(abundances) {
            taxon.abundance = Some(*abundance);
        }
    }
    Ok(taxa)
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file =
        File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}
