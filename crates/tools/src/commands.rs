use std::path::Path;

use dateline::{SphericalEngine, coarse_crossings};
use formats::{CollectionDocument, FeatureCollection, Geometry};
use journey::{JourneyConfig, JourneyProcessor, ProcessReport};
use serde::Serialize;
use tracing::info;

use crate::cli::{Args, Command, Overrides};

pub async fn run(args: Args) -> Result<(), String> {
    match args.command {
        Command::Split {
            input,
            output,
            collection,
            output_mode,
            timeout_ms,
            step_km,
            max_segment_m,
        } => {
            let config = Overrides {
                collection,
                output_mode,
                timeout_ms,
                step_km,
                max_segment_m,
            }
            .apply(JourneyConfig::from_env());
            let report = cmd_split(&input, &output, collection, config).await?;
            eprintln!(
                "wrote {} ({} lines, {} crossings, {} failures)",
                output.display(),
                report.lines,
                report.crossings,
                report.failures
            );
            Ok(())
        }
        Command::Crossings { input, collection } => {
            let entries = cmd_crossings(&input, collection).await?;
            let payload =
                serde_json::to_string_pretty(&entries).map_err(|e| format!("json: {e}"))?;
            println!("{payload}");
            Ok(())
        }
    }
}

pub async fn cmd_split(
    input: &Path,
    output: &Path,
    collection: bool,
    config: JourneyConfig,
) -> Result<ProcessReport, String> {
    let text = tokio::fs::read_to_string(input)
        .await
        .map_err(|e| format!("read {input:?}: {e}"))?;

    let engine = SphericalEngine::new(config.densify_step_m)
        .map_err(|e| format!("invalid densify step: {e}"))?;
    info!(?config, "splitting {}", input.display());
    let processor = JourneyProcessor::new(engine, config);

    let (payload, report) = if collection {
        let doc = CollectionDocument::from_json_str(&text)
            .map_err(|e| format!("decode collection: {e}"))?;
        let (out, report) = processor.process_datasets(&doc).await;
        let payload = out
            .to_json_string_pretty()
            .map_err(|e| format!("json: {e}"))?;
        (payload, report)
    } else {
        let fc = FeatureCollection::from_geojson_str(&text)
            .map_err(|e| format!("decode geojson: {e}"))?;
        let (out, report) = processor.process_collection(&fc).await;
        let payload = out
            .to_geojson_string_pretty()
            .map_err(|e| format!("json: {e}"))?;
        (payload, report)
    };

    tokio::fs::write(output, payload)
        .await
        .map_err(|e| format!("write {output:?}: {e}"))?;
    Ok(report)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossingEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    pub feature_index: usize,
    pub feature: String,
    /// Index of the line inside a MultiLineString; 0 for a LineString.
    pub line: usize,
    /// Second vertex of each flagged pair.
    pub vertices: Vec<usize>,
}

pub async fn cmd_crossings(input: &Path, collection: bool) -> Result<Vec<CrossingEntry>, String> {
    let text = tokio::fs::read_to_string(input)
        .await
        .map_err(|e| format!("read {input:?}: {e}"))?;

    if collection {
        let doc = CollectionDocument::from_json_str(&text)
            .map_err(|e| format!("decode collection: {e}"))?;
        Ok(doc
            .datasets
            .iter()
            .flat_map(|ds| find_coarse_crossings(&ds.data, Some(&ds.name)))
            .collect())
    } else {
        let fc = FeatureCollection::from_geojson_str(&text)
            .map_err(|e| format!("decode geojson: {e}"))?;
        Ok(find_coarse_crossings(&fc, None))
    }
}

pub fn find_coarse_crossings(fc: &FeatureCollection, dataset: Option<&str>) -> Vec<CrossingEntry> {
    let mut out = Vec::new();
    for (feature_index, feature) in fc.features.iter().enumerate() {
        let lines: Vec<&[foundation::math::LonLat]> = match &feature.geometry {
            Geometry::LineString(line) => vec![line.as_slice()],
            Geometry::MultiLineString(lines) => lines.iter().map(Vec::as_slice).collect(),
            _ => continue,
        };
        for (line, coords) in lines.into_iter().enumerate() {
            let vertices = coarse_crossings(coords);
            if vertices.is_empty() {
                continue;
            }
            out.push(CrossingEntry {
                dataset: dataset.map(str::to_string),
                feature_index,
                feature: feature.label(),
                line,
                vertices,
            });
        }
    }
    out
}
