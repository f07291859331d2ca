use anyhow::{bail, Context, Result};
use bin_comparator::config::{Category, ComparatorConfig, SourceSpec};
use bin_comparator::display::format_tree;
use bin_comparator::Comparator;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Compare identically binned result sources and render grid-of-grids plots.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// A source in the form TITLE=PATH. The first one is the reference.
    #[arg(long = "source", value_name = "TITLE=PATH")]
    sources: Vec<SourceSpec>,

    /// Destination of the artifact collection
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Variable on the horizontal grid axis
    #[arg(long)]
    gx: Option<String>,

    /// Variable on the vertical grid axis
    #[arg(long)]
    gy: Option<String>,

    /// coverage or resolution; inferred from the output name when absent
    #[arg(long)]
    category: Option<Category>,

    /// JSON run configuration; command line flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scale every overlay to unit integral
    #[arg(long)]
    normalize: bool,

    /// Print each source's bin hierarchy before comparing
    #[arg(long)]
    print_dag: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn into_config(self) -> Result<ComparatorConfig> {
        let mut config = match &self.config {
            Some(path) => ComparatorConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
            None => {
                let Some(output) = self.output.clone() else {
                    bail!("--output is required without --config");
                };
                ComparatorConfig::new(Vec::new(), output)
            }
        };
        if !self.sources.is_empty() {
            config.sources = self.sources;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(gx) = self.gx {
            config.grid.x = gx;
        }
        if let Some(gy) = self.gy {
            config.grid.y = gy;
        }
        if self.category.is_some() {
            config.category = self.category;
        }
        config.render.normalize |= self.normalize;
        Ok(config)
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let print_dag = args.print_dag;
    let comparator = Comparator::new(args.into_config()?)?;

    let sources = comparator.load_sources()?;
    if print_dag {
        for source in &sources {
            println!("{}", format_tree(source));
        }
    }

    let (report, path) = comparator.run_on(&sources)?;
    info!(
        leaves = report.leaves_visited,
        subgroups = report.subgroups_completed,
        artifacts = report.artifacts,
        missing = report.missing_cells.len(),
        path = %path.display(),
        "Comparison finished"
    );
    Ok(())
}
