//! Generates the default lattice, builds its Voronoi diagram and writes the four tables.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use voronoi_lattice::pipeline::{PipelineConfig, run_and_export};

/// Near-hexagonal lattice Voronoi tessellation exporter
#[derive(Parser, Debug)]
#[command(name = "voronoi-lattice", version, about)]
struct Cli {
    /// JSON config file; flags below override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory the tables are written into (must exist)
    #[arg(long, value_name = "DIR", default_value = ".")]
    output: PathBuf,

    /// Columns on each side of the y axis (negative values are rejected)
    #[arg(long)]
    point_num_x: Option<usize>,

    /// Rows per even column on each side of the x axis (negative values are rejected)
    #[arg(long)]
    point_num_y: Option<usize>,

    /// Horizontal column spacing
    #[arg(long)]
    width: Option<f64>,

    /// Vertical row spacing
    #[arg(long)]
    height: Option<f64>,

    /// Half-width of the square that retained points must lie in
    #[arg(long)]
    region_radius: Option<f64>,

    /// Prefix prepended to every table file name
    #[arg(long)]
    prefix: Option<String>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };
        let lattice = &mut config.lattice;
        if let Some(n) = self.point_num_x {
            lattice.point_num_x = n;
        }
        if let Some(n) = self.point_num_y {
            lattice.point_num_y = n;
        }
        if let Some(w) = self.width {
            lattice.width = w;
        }
        if let Some(h) = self.height {
            lattice.height = h;
        }
        if let Some(r) = self.region_radius {
            lattice.region_radius = r;
        }
        if let Some(prefix) = &self.prefix {
            config.export.file_prefix.clone_from(prefix);
        }
        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.pipeline_config()?;
    let (diagram, paths) = run_and_export(&config, &cli.output)
        .with_context(|| format!("exporting into {}", cli.output.display()))?;

    let finite = diagram.ridges().iter().filter(|r| r.is_finite()).count();
    tracing::info!(
        points = diagram.points().len(),
        vertices = diagram.vertices().len(),
        ridges = diagram.ridges().len(),
        finite_ridges = finite,
        "built Voronoi diagram"
    );
    for table in voronoi_lattice::io::export::Table::ALL {
        tracing::info!(path = %paths.get(table).display(), "wrote {}", table.stem());
    }
    Ok(())
}
