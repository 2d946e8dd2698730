use std::env;
use std::str::FromStr;
use std::time::Duration;

use dateline::{DEFAULT_DENSIFY_MAX_SEGMENT_M, DEFAULT_DENSIFY_STEP_M};
use serde::{Deserialize, Serialize};

pub const ENV_MAX_SEGMENT_LENGTH: &str = "DATELINE_MAX_SEGMENT_LENGTH";
pub const ENV_DENSIFY_STEP_KM: &str = "DATELINE_DENSIFY_STEP_KM";
pub const ENV_TIMEOUT_MS: &str = "DATELINE_TIMEOUT_MS";
pub const ENV_LINE_OUTPUT: &str = "DATELINE_LINE_OUTPUT";

/// How split segments are written back.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineOutput {
    /// One `LineString` feature per segment (single-dataset journey view).
    #[default]
    Features,
    /// One `MultiLineString` feature per source line (collection view).
    MultiLineString,
}

impl FromStr for LineOutput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "features" | "linestring" => Ok(LineOutput::Features),
            "multi" | "multilinestring" | "multi_line_string" => Ok(LineOutput::MultiLineString),
            other => Err(format!("unknown line output: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JourneyConfig {
    /// Max segment length passed to the engine's densify call (meters).
    pub densify_max_segment_m: f64,
    /// Sampling step of the built-in spherical engine (meters).
    pub densify_step_m: f64,
    /// Per-line limit on engine work. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub line_output: LineOutput,
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            densify_max_segment_m: DEFAULT_DENSIFY_MAX_SEGMENT_M,
            densify_step_m: DEFAULT_DENSIFY_STEP_M,
            timeout: None,
            line_output: LineOutput::Features,
        }
    }
}

impl JourneyConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from a key lookup; missing or unparsable values keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let timeout_ms: u64 = parse_or(&lookup, ENV_TIMEOUT_MS, 0);
        Self {
            densify_max_segment_m: parse_or(
                &lookup,
                ENV_MAX_SEGMENT_LENGTH,
                defaults.densify_max_segment_m,
            ),
            densify_step_m: parse_or(
                &lookup,
                ENV_DENSIFY_STEP_KM,
                defaults.densify_step_m / 1000.0,
            ) * 1000.0,
            timeout: (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms)),
            line_output: parse_or(&lookup, ENV_LINE_OUTPUT, defaults.line_output),
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
