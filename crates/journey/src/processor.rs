use dateline::{GeometryEngine, Path, Splitter};
use formats::{CollectionDocument, Dataset, Feature, FeatureCollection, Geometry};
use foundation::math::LonLat;
use futures_util::future::join_all;
use tracing::{debug, error, info};

use crate::config::{JourneyConfig, LineOutput};
use crate::error::JourneyError;
use crate::report::ProcessReport;

/// Splits the line features of journey datasets at the antimeridian.
///
/// Lines are processed concurrently on the calling task; each line's own
/// crossings are still resolved strictly in order by the splitter. A
/// configured timeout needs a Tokio runtime with the time driver enabled.
#[derive(Debug, Clone)]
pub struct JourneyProcessor<E> {
    splitter: Splitter<E>,
    config: JourneyConfig,
}

impl<E: GeometryEngine> JourneyProcessor<E> {
    pub fn new(engine: E, config: JourneyConfig) -> Self {
        let splitter = Splitter::new(engine).with_densify_max_segment(config.densify_max_segment_m);
        Self { splitter, config }
    }

    pub fn config(&self) -> &JourneyConfig {
        &self.config
    }

    pub async fn split_line(&self, line: &[LonLat]) -> Result<Vec<Path>, JourneyError> {
        let split = self.splitter.split_at_antimeridian(line);
        match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, split)
                .await
                .map_err(|_| JourneyError::Timeout(limit))?
                .map_err(JourneyError::from),
            None => split.await.map_err(JourneyError::from),
        }
    }

    /// Segments for a `LineString` or `MultiLineString` feature, in line order.
    pub async fn split_feature(&self, feature: &Feature) -> Result<Vec<Path>, JourneyError> {
        match &feature.geometry {
            Geometry::LineString(line) => self.split_line(line).await,
            Geometry::MultiLineString(lines) => {
                let mut out = Vec::new();
                for line in lines {
                    out.extend(self.split_line(line).await?);
                }
                Ok(out)
            }
            other => Err(JourneyError::NotALine(other.kind())),
        }
    }

    /// Split every line feature of `fc`. Other features pass through; a line
    /// that cannot be split is logged and kept as it was.
    pub async fn process_collection(
        &self,
        fc: &FeatureCollection,
    ) -> (FeatureCollection, ProcessReport) {
        let mut report = ProcessReport {
            features: fc.features.len(),
            ..ProcessReport::default()
        };

        let jobs = fc
            .features
            .iter()
            .filter(|f| f.geometry.kind().is_line())
            .map(|f| self.split_feature(f));
        let mut results = join_all(jobs).await.into_iter();

        let mut features = Vec::with_capacity(fc.features.len());
        for (index, feature) in fc.features.iter().enumerate() {
            if !feature.geometry.kind().is_line() {
                features.push(feature.clone());
                continue;
            }
            report.lines += 1;

            let Some(result) = results.next() else {
                break;
            };
            match result {
                Ok(segments) => {
                    report.record_split(source_line_count(&feature.geometry), segments.len());
                    debug!(
                        index,
                        feature = %feature.label(),
                        segments = segments.len(),
                        "split journey line"
                    );
                    features.extend(rewrap(feature, segments, self.config.line_output));
                }
                Err(err) => {
                    report.failures += 1;
                    error!(
                        index,
                        feature = %feature.label(),
                        error = %err,
                        "failed to split journey line; keeping it unsplit"
                    );
                    features.push(feature.clone());
                }
            }
        }

        info!(
            features = report.features,
            lines = report.lines,
            crossings = report.crossings,
            failures = report.failures,
            "processed journey collection"
        );

        (
            FeatureCollection {
                metadata: fc.metadata.clone(),
                features,
            },
            report,
        )
    }

    /// Apply [`Self::process_collection`] to every dataset of a collection.
    pub async fn process_datasets(
        &self,
        doc: &CollectionDocument,
    ) -> (CollectionDocument, ProcessReport) {
        let processed = join_all(doc.datasets.iter().map(|ds| async move {
            let (data, report) = self.process_collection(&ds.data).await;
            info!(dataset = %ds.name, crossings = report.crossings, "processed dataset");
            (
                Dataset {
                    id: ds.id.clone(),
                    name: ds.name.clone(),
                    data,
                    extra: ds.extra.clone(),
                },
                report,
            )
        }))
        .await;

        let mut total = ProcessReport::default();
        let mut datasets = Vec::with_capacity(processed.len());
        for (ds, report) in processed {
            total += report;
            datasets.push(ds);
        }

        (
            CollectionDocument {
                name: doc.name.clone(),
                metadata: doc.metadata.clone(),
                datasets,
            },
            total,
        )
    }
}

fn source_line_count(geometry: &Geometry) -> usize {
    match geometry {
        Geometry::MultiLineString(lines) => lines.len(),
        _ => 1,
    }
}

fn rewrap(feature: &Feature, segments: Vec<Path>, output: LineOutput) -> Vec<Feature> {
    match output {
        LineOutput::Features => segments
            .into_iter()
            .map(|segment| feature.with_geometry(Geometry::LineString(segment)))
            .collect(),
        LineOutput::MultiLineString => {
            vec![feature.with_geometry(Geometry::MultiLineString(segments))]
        }
    }
}
