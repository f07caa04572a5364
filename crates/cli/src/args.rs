use std::path::PathBuf;

use brainmesh::{SamplerConfig, SurfaceSampling};
use brainmesh_mesh::Axis;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum AxisArg {
    X,
    Y,
    Z,
}

impl From<AxisArg> for Axis {
    fn from(value: AxisArg) -> Self {
        match value {
            AxisArg::X => Axis::X,
            AxisArg::Y => Axis::Y,
            AxisArg::Z => Axis::Z,
        }
    }
}

/// Tunables shared by the sampling commands.
#[derive(clap::Args, Debug)]
pub struct SamplingArgs {
    /// Desired distance between neighboring points.
    #[arg(long, default_value_t = 15.0)]
    pub spacing: f64,

    /// Candidates evaluated for every generated point.
    #[arg(long, default_value_t = 100)]
    pub batch_size: usize,

    /// Seed for reproducible output.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Sample surface points uniformly over triangle area instead of at vertices.
    #[arg(long)]
    pub triangle_sampling: bool,

    /// Axis of the probe that moves surface points inside a region. The volume
    /// command probes along the surface normal instead.
    #[arg(long, value_enum, default_value_t = AxisArg::Z)]
    pub probe_axis: AxisArg,
}

impl SamplingArgs {
    pub fn config(&self) -> SamplerConfig {
        SamplerConfig {
            desired_spacing: self.spacing,
            batch_size: self.batch_size,
            seed: self.seed,
            surface_sampling: if self.triangle_sampling {
                SurfaceSampling::Triangle
            } else {
                SurfaceSampling::Vertex
            },
            probe_axis: self.probe_axis.into(),
            ..SamplerConfig::default()
        }
    }
}

fn parse_region(s: &str) -> Result<(String, PathBuf), String> {
    match s.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected NAME=PATH, got `{s}`")),
    }
}

#[derive(clap::Args, Debug)]
pub struct ScatterArgs {
    /// A brain region mesh as NAME=PATH to a binary STL file. Repeatable.
    #[arg(long = "region", value_name = "NAME=PATH", value_parser = parse_region)]
    pub regions: Vec<(String, PathBuf)>,

    /// Points to generate as NAME[:SIDE]:COUNT. SIDE is `left`, `right`, `mirrored`
    /// or omitted for the whole region. Repeatable.
    #[arg(long = "request", value_name = "NAME[:SIDE]:COUNT", required = true)]
    pub requests: Vec<String>,

    /// Axis along which regions are split into left and right halves.
    #[arg(long, value_enum, default_value_t = AxisArg::X)]
    pub axis: AxisArg,

    #[command(flatten)]
    pub sampling: SamplingArgs,

    /// Output path for the CSV file. Defaults to stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct VolumeArgs {
    pub stl_path: PathBuf,

    /// Number of points to generate.
    #[arg(short = 'n', long, default_value_t = 100)]
    pub count: usize,

    #[command(flatten)]
    pub sampling: SamplingArgs,

    /// Output path for the CSV file. Defaults to stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ComponentsArgs {
    pub stl_path: PathBuf,

    /// Axis used to order two components into lower and higher halves.
    #[arg(long, value_enum, default_value_t = AxisArg::X)]
    pub axis: AxisArg,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate spaced points inside named brain regions.
    Scatter(ScatterArgs),
    /// Generate independent random points inside a single mesh.
    Volume(VolumeArgs),
    /// List the connected components of a mesh.
    Components(ComponentsArgs),
}
