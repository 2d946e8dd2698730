use foundation::math::LonLat;
use tracing::debug;

use crate::Path;
use crate::crossing::{CrossingPair, find_crossing, is_crossing};
use crate::engine::GeometryEngine;

/// Max segment length handed to the engine when densifying a crossing pair.
/// Effectively unbounded: the engine's own sampling decides the spacing.
pub const DEFAULT_DENSIFY_MAX_SEGMENT_M: f64 = 1e10;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug)]
pub enum SplitError {
    /// Densifying the pair ending at `index` failed.
    Densify { index: usize, source: BoxError },
    /// Normalizing the pair ending at `index` failed.
    Normalize { index: usize, source: BoxError },
}

impl std::fmt::Display for SplitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SplitError::Densify { index, source } => {
                write!(f, "densify failed at vertex {index}: {source}")
            }
            SplitError::Normalize { index, source } => {
                write!(f, "normalize failed at vertex {index}: {source}")
            }
        }
    }
}

impl std::error::Error for SplitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SplitError::Densify { source, .. } | SplitError::Normalize { source, .. } => {
                Some(source.as_ref())
            }
        }
    }
}

/// Accumulator threaded through the left-to-right walk: closed segments plus
/// the one still being built.
#[derive(Debug, Default)]
struct SegmentBuilder {
    segments: Vec<Path>,
    current: Path,
}

impl SegmentBuilder {
    fn push(&mut self, p: LonLat) {
        self.current.push(p);
    }

    fn split(&mut self, pair: CrossingPair, prev_lon_deg: f64) {
        let (closing, opening) = pair.oriented_from(prev_lon_deg);
        self.current.push(closing);
        self.segments.push(std::mem::take(&mut self.current));
        self.current.push(opening);
    }

    fn finish(mut self) -> Vec<Path> {
        self.segments.push(self.current);
        self.segments
    }
}

/// Splits paths at the antimeridian.
///
/// Stateless between calls; one `Splitter` can serve any number of paths,
/// including concurrently.
#[derive(Debug, Clone)]
pub struct Splitter<E> {
    engine: E,
    densify_max_segment_m: f64,
}

impl<E: GeometryEngine> Splitter<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            densify_max_segment_m: DEFAULT_DENSIFY_MAX_SEGMENT_M,
        }
    }

    pub fn with_densify_max_segment(mut self, meters: f64) -> Self {
        self.densify_max_segment_m = meters;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Split `path` into segments that each stay on one side of ±180°.
    ///
    /// Paths with fewer than two points come back verbatim. Each coarse
    /// crossing is resolved through the engine before the next pair is
    /// looked at; a crossing the engine cannot place leaves the pair joined.
    pub async fn split_at_antimeridian(&self, path: &[LonLat]) -> Result<Vec<Path>, SplitError> {
        if path.len() <= 1 {
            return Ok(vec![path.to_vec()]);
        }

        let mut builder = SegmentBuilder::default();
        builder.push(path[0]);

        for i in 1..path.len() {
            let (prev, cur) = (path[i - 1], path[i]);
            if is_crossing(prev.lon_deg, cur.lon_deg) {
                match self.resolve_crossing(i, prev, cur).await? {
                    Some(pair) => builder.split(pair, prev.lon_deg),
                    None => debug!(index = i, "coarse crossing not confirmed; keeping pair joined"),
                }
            }
            builder.push(cur);
        }

        Ok(builder.finish())
    }

    async fn resolve_crossing(
        &self,
        index: usize,
        prev: LonLat,
        cur: LonLat,
    ) -> Result<Option<CrossingPair>, SplitError> {
        let densified = self
            .engine
            .geodesic_densify(&[prev, cur], self.densify_max_segment_m)
            .map_err(|e| SplitError::Densify {
                index,
                source: Box::new(e),
            })?;
        let normalized = self
            .engine
            .normalize_central_meridian(&densified)
            .await
            .map_err(|e| SplitError::Normalize {
                index,
                source: Box::new(e),
            })?;
        Ok(find_crossing(&normalized))
    }
}

/// One-shot convenience over [`Splitter::split_at_antimeridian`].
pub async fn split_at_antimeridian<E: GeometryEngine>(
    engine: E,
    path: &[LonLat],
) -> Result<Vec<Path>, SplitError> {
    Splitter::new(engine).split_at_antimeridian(path).await
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    use super::{SplitError, Splitter, split_at_antimeridian};
    use crate::crossing::{EAST_BOUNDARY_LON, WEST_BOUNDARY_LON, is_crossing};
    use crate::engine::GeometryEngine;
    use crate::{Path, SphericalEngine};
    use foundation::math::LonLat;
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct MockError(&'static str);

    impl std::fmt::Display for MockError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.0)
        }
    }

    impl std::error::Error for MockError {}

    /// Replays canned normalization results, one per call, and counts calls.
    #[derive(Default)]
    struct ScriptedEngine {
        normalized: RefCell<VecDeque<Result<Vec<Path>, MockError>>>,
        densify_calls: Cell<usize>,
        fail_densify: bool,
    }

    impl ScriptedEngine {
        fn with(results: Vec<Result<Vec<Path>, MockError>>) -> Self {
            Self {
                normalized: RefCell::new(results.into()),
                ..Self::default()
            }
        }
    }

    impl GeometryEngine for ScriptedEngine {
        type Error = MockError;

        fn geodesic_densify(&self, path: &[LonLat], _max: f64) -> Result<Path, MockError> {
            self.densify_calls.set(self.densify_calls.get() + 1);
            if self.fail_densify {
                return Err(MockError("densify unavailable"));
            }
            Ok(path.to_vec())
        }

        async fn normalize_central_meridian(&self, _path: &[LonLat]) -> Result<Vec<Path>, MockError> {
            self.normalized
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(MockError("unexpected normalize call")))
        }
    }

    fn path(coords: &[[f64; 2]]) -> Path {
        coords.iter().copied().map(LonLat::from).collect()
    }

    fn wrapped_at(lat: f64) -> Result<Vec<Path>, MockError> {
        Ok(vec![
            path(&[[170.0, lat], [180.0, lat]]),
            path(&[[-180.0, lat], [-170.0, lat]]),
        ])
    }

    fn east(lat: f64) -> LonLat {
        LonLat::new(EAST_BOUNDARY_LON, lat)
    }

    fn west(lat: f64) -> LonLat {
        LonLat::new(WEST_BOUNDARY_LON, lat)
    }

    /// Drop the synthetic boundary vertices and join the segments back up.
    fn reconstruct(segments: &[Path]) -> Path {
        segments
            .iter()
            .flatten()
            .copied()
            .filter(|p| p.lon_deg != EAST_BOUNDARY_LON && p.lon_deg != WEST_BOUNDARY_LON)
            .collect()
    }

    #[tokio::test]
    async fn short_paths_are_returned_verbatim() {
        let engine = ScriptedEngine::default();
        let splitter = Splitter::new(&engine);

        assert_eq!(splitter.split_at_antimeridian(&[]).await.expect("empty"), vec![Vec::new()]);
        let single = path(&[[179.0, 3.0]]);
        assert_eq!(
            splitter.split_at_antimeridian(&single).await.expect("single"),
            vec![single.clone()]
        );
        assert_eq!(engine.densify_calls.get(), 0);
    }

    #[tokio::test]
    async fn non_crossing_path_is_one_segment() {
        let engine = ScriptedEngine::default();
        let input = path(&[[10.0, 0.0], [100.0, 5.0], [-60.0, 10.0], [-170.0, 12.0]]);
        let out = split_at_antimeridian(&engine, &input).await.expect("split");
        assert_eq!(out, vec![input]);
        assert_eq!(engine.densify_calls.get(), 0);
    }

    #[tokio::test]
    async fn single_crossing_eastward() {
        let engine = ScriptedEngine::with(vec![wrapped_at(10.0)]);
        let input = path(&[[170.0, 10.0], [-170.0, 10.0]]);
        let out = split_at_antimeridian(&engine, &input).await.expect("split");
        assert_eq!(
            out,
            vec![
                vec![LonLat::new(170.0, 10.0), east(10.0)],
                vec![west(10.0), LonLat::new(-170.0, 10.0)],
            ]
        );
    }

    #[tokio::test]
    async fn westward_crossing_closes_on_the_west_end() {
        let engine = ScriptedEngine::with(vec![wrapped_at(-4.0)]);
        let input = path(&[[-175.0, -4.0], [175.0, -4.0]]);
        let out = split_at_antimeridian(&engine, &input).await.expect("split");
        assert_eq!(
            out,
            vec![
                vec![LonLat::new(-175.0, -4.0), west(-4.0)],
                vec![east(-4.0), LonLat::new(175.0, -4.0)],
            ]
        );
    }

    #[tokio::test]
    async fn crossing_only_on_first_pair() {
        let engine = ScriptedEngine::with(vec![wrapped_at(0.0)]);
        let input = path(&[[179.0, 0.0], [-179.0, 0.0], [-178.0, 0.0]]);
        let out = split_at_antimeridian(&engine, &input).await.expect("split");
        assert_eq!(
            out,
            vec![
                vec![LonLat::new(179.0, 0.0), east(0.0)],
                vec![west(0.0), LonLat::new(-179.0, 0.0), LonLat::new(-178.0, 0.0)],
            ]
        );
        assert_eq!(engine.densify_calls.get(), 1);
    }

    #[tokio::test]
    async fn double_crossing_gives_three_segments_in_order() {
        let engine = ScriptedEngine::with(vec![wrapped_at(1.0), wrapped_at(2.0)]);
        let input = path(&[[175.0, 1.0], [-175.0, 1.5], [176.0, 2.5]]);
        let out = split_at_antimeridian(&engine, &input).await.expect("split");

        assert_eq!(out.len(), 3);
        assert_eq!(out[0], vec![LonLat::new(175.0, 1.0), east(1.0)]);
        assert_eq!(out[1], vec![west(1.0), LonLat::new(-175.0, 1.5), west(2.0)]);
        assert_eq!(out[2], vec![east(2.0), LonLat::new(176.0, 2.5)]);

        for segment in &out {
            for w in segment.windows(2) {
                assert!(!is_crossing(w[0].lon_deg, w[1].lon_deg), "{segment:?}");
            }
        }
        assert_eq!(reconstruct(&out), input);
    }

    #[tokio::test]
    async fn unresolved_crossing_keeps_pair_joined() {
        let engine = ScriptedEngine::with(vec![Ok(vec![path(&[[170.0, 10.0], [190.0, 10.0]])])]);
        let input = path(&[[170.0, 10.0], [-170.0, 10.0], [-160.0, 10.0]]);
        let out = split_at_antimeridian(&engine, &input).await.expect("split");
        assert_eq!(out, vec![input]);
    }

    #[tokio::test]
    async fn collaborator_failures_propagate() {
        let engine = ScriptedEngine::with(vec![Err(MockError("service down"))]);
        let input = path(&[[0.0, 0.0], [170.0, 10.0], [-170.0, 10.0]]);
        let err = split_at_antimeridian(&engine, &input)
            .await
            .expect_err("normalize failure");
        assert!(matches!(err, SplitError::Normalize { index: 2, .. }));
        assert_eq!(err.to_string(), "normalize failed at vertex 2: service down");

        let engine = ScriptedEngine {
            fail_densify: true,
            ..ScriptedEngine::default()
        };
        let err = split_at_antimeridian(&engine, &input)
            .await
            .expect_err("densify failure");
        assert!(matches!(err, SplitError::Densify { index: 2, .. }));
    }

    #[tokio::test]
    async fn spherical_engine_splits_along_the_equator() {
        let input = path(&[[179.0, 0.0], [-179.0, 0.0], [-178.0, 0.0]]);
        let out = split_at_antimeridian(SphericalEngine::default(), &input)
            .await
            .expect("split");

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].len(), 2);
        assert_eq!(out[0][0], LonLat::new(179.0, 0.0));
        assert_eq!(out[0][1].lon_deg, EAST_BOUNDARY_LON);
        assert!(out[0][1].lat_deg.abs() < 1e-9);
        assert_eq!(out[1][0].lon_deg, WEST_BOUNDARY_LON);
        assert_eq!(&out[1][1..], &input[1..]);
        assert_eq!(reconstruct(&out), input);
    }

    #[tokio::test]
    async fn spherical_engine_crossing_latitude_bulges_poleward() {
        let input = path(&[[170.0, 10.0], [-170.0, 10.0]]);
        let out = split_at_antimeridian(SphericalEngine::default(), &input)
            .await
            .expect("split");
        assert_eq!(out.len(), 2);
        let lat = out[0][1].lat_deg;
        assert!(lat > 10.0 && lat < 10.5, "crossing latitude {lat}");
        assert_eq!(out[1][0].lat_deg, lat);
    }
}
