use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use journey::{JourneyConfig, LineOutput};

#[derive(Parser, Debug)]
#[command(author, version, about = "Split journey lines at the antimeridian")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split every line feature and write the rewrapped GeoJSON
    Split {
        /// Input GeoJSON FeatureCollection (or collection document with --collection)
        input: PathBuf,

        /// Output path
        output: PathBuf,

        /// Treat the input as a multi-dataset collection document
        #[arg(long)]
        collection: bool,

        /// How segments are written back (default: features, or multi with --collection)
        #[arg(long, value_enum)]
        output_mode: Option<OutputMode>,

        /// Per-line timeout in milliseconds (0 disables)
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Spherical engine sampling step in kilometers
        #[arg(long)]
        step_km: Option<f64>,

        /// Max segment length handed to densify, in meters
        #[arg(long)]
        max_segment_m: Option<f64>,
    },

    /// List vertex pairs flagged by the coarse crossing test
    Crossings {
        input: PathBuf,

        #[arg(long)]
        collection: bool,
    },
}

#[derive(ValueEnum, Debug, Copy, Clone, PartialEq, Eq)]
pub enum OutputMode {
    Features,
    Multi,
}

impl From<OutputMode> for LineOutput {
    fn from(mode: OutputMode) -> Self {
        match mode {
            OutputMode::Features => LineOutput::Features,
            OutputMode::Multi => LineOutput::MultiLineString,
        }
    }
}

/// Flags override the environment-derived `base`.
pub struct Overrides {
    pub collection: bool,
    pub output_mode: Option<OutputMode>,
    pub timeout_ms: Option<u64>,
    pub step_km: Option<f64>,
    pub max_segment_m: Option<f64>,
}

impl Overrides {
    pub fn apply(&self, mut base: JourneyConfig) -> JourneyConfig {
        if let Some(mode) = self.output_mode {
            base.line_output = mode.into();
        } else if self.collection {
            base.line_output = LineOutput::MultiLineString;
        }
        if let Some(ms) = self.timeout_ms {
            base.timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(km) = self.step_km {
            base.densify_step_m = km * 1000.0;
        }
        if let Some(m) = self.max_segment_m {
            base.densify_max_segment_m = m;
        }
        base
    }
}
