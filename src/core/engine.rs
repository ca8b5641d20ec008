//! Clustering engine - memoized point/cluster partition for the render loop
//!
//! The host feeds points, viewport and zoom, then calls `update` once per
//! frame with its projection. Work only happens when something marked the
//! engine dirty; otherwise the previous partition is returned as-is.
//!
//! The engine cannot see the camera. A host whose camera moved without any
//! of the tracked inputs changing must call `invalidate` itself, or `update`
//! keeps returning the partition computed for the old view.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace, warn};

use super::cache::DistanceCache;
use super::cluster::{form_clusters, Cluster, ClusterDetails, ClusterId};
use super::config::ClusterConfig;
use super::error::ClusterError;
use super::geometry::Viewport;
use super::parser::{parse_points, parse_points_json};
use super::point::{Point, PointInput};
use super::projection::Projection;
use crate::time::now_ms;

/// Zoom before the host reports one
const DEFAULT_ZOOM: f64 = 1.0;

/// Points to draw individually and clusters to draw as aggregate markers.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct ClusterResult<'a> {
    pub points: &'a [Point],
    pub clusters: &'a [Cluster],
}

impl<'a> ClusterResult<'a> {
    const EMPTY: Self = ClusterResult {
        points: &[],
        clusters: &[],
    };

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.clusters.is_empty()
    }

    /// Points represented, individually or inside a cluster
    pub fn total_points(&self) -> usize {
        self.points.len() + self.clusters.iter().map(|c| c.count).sum::<usize>()
    }
}

/// Counters for diagnostics overlays and tests
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStats {
    /// Completed recomputations
    pub computations: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_clears: u64,
    pub cache_size: usize,
    pub last_visible: usize,
    pub last_clusters: usize,
    pub last_compute_ms: f64,
}

pub struct ClusterEngine {
    config: ClusterConfig,
    all_points: Vec<Point>,
    viewport: Viewport,
    current_zoom: f64,
    is_dirty: bool,
    distance_cache: DistanceCache,
    /// Memoized partition
    clusters: Vec<Cluster>,
    visible_points: Vec<Point>,
    /// Bumped on every recomputation; stamps cluster ids
    generation: u64,
    computations: u64,
    last_compute_ms: f64,
}

impl Default for ClusterEngine {
    fn default() -> Self {
        Self::new(ClusterConfig::default())
    }
}

impl ClusterEngine {
    pub fn new(config: ClusterConfig) -> Self {
        Self {
            config: config.normalized(),
            all_points: Vec::new(),
            viewport: Viewport::default(),
            current_zoom: DEFAULT_ZOOM,
            is_dirty: true,
            distance_cache: DistanceCache::default(),
            clusters: Vec::new(),
            visible_points: Vec::new(),
            generation: 0,
            computations: 0,
            last_compute_ms: 0.0,
        }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Inputs
    // ------------------------------------------------------------------------

    /// Replace the whole point set
    pub fn set_points<I>(&mut self, points: I)
    where
        I: IntoIterator<Item = PointInput>,
    {
        let config = &self.config;
        self.all_points = points
            .into_iter()
            .enumerate()
            .map(|(idx, input)| {
                let priority = config.priority_of(&input.category);
                Point::from_input(input, idx, priority)
            })
            .collect();
        self.is_dirty = true;

        debug!(count = self.all_points.len(), "Point set replaced");
    }

    /// Replace the point set from a JSON document.
    ///
    /// Returns the number of points loaded, or None if the input was
    /// rejected; a rejected input is logged and the previous points stay.
    pub fn set_points_json(&mut self, msg: &str) -> Option<usize> {
        self.apply_parsed(parse_points_json(msg))
    }

    /// Like `set_points_json`, for an already-decoded value
    pub fn set_points_value(&mut self, json: &Value) -> Option<usize> {
        self.apply_parsed(parse_points(json))
    }

    fn apply_parsed(
        &mut self,
        parsed: Result<Vec<PointInput>, ClusterError>,
    ) -> Option<usize> {
        let inputs = parsed
            .map_err(|e| {
                warn!(error = %e, kept = self.all_points.len(), "Rejected point list");
            })
            .ok()?;
        let count = inputs.len();
        self.set_points(inputs);
        Some(count)
    }

    /// Viewport size in pixels. Unchanged values do not dirty the engine.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        let viewport = Viewport::new(width, height);
        if viewport != self.viewport {
            trace!(width, height, "Viewport changed");
            self.viewport = viewport;
            self.is_dirty = true;
        }
    }

    /// Current zoom level. Unchanged values do not dirty the engine.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom != self.current_zoom {
            trace!(prev = self.current_zoom, zoom, "Zoom changed");
            self.current_zoom = zoom;
            self.is_dirty = true;
        }
    }

    /// Mark results stale without changing any input, e.g. after a camera move
    pub fn invalidate(&mut self) {
        self.is_dirty = true;
    }

    // ------------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------------

    /// Current partition, recomputed only if the engine is dirty.
    ///
    /// - No points or an empty viewport: empty result, memo untouched.
    /// - Zoom at or past `max_zoom_level`: every point, no clusters. This
    ///   passthrough is not memoized.
    /// - Otherwise the memoized partition, refreshed first when dirty.
    pub fn update<P: Projection + ?Sized>(&mut self, projection: &P) -> ClusterResult<'_> {
        if self.all_points.is_empty() || self.viewport.is_empty() {
            return ClusterResult::EMPTY;
        }

        if self.current_zoom >= self.config.max_zoom_level {
            trace!(zoom = self.current_zoom, "Clustering bypassed at this zoom");
            return ClusterResult {
                points: &self.all_points,
                clusters: &[],
            };
        }

        if self.is_dirty {
            self.recompute(projection);
        } else {
            trace!(generation = self.generation, "Partition up to date");
        }

        self.last_result()
    }

    /// `invalidate` followed by `update`
    pub fn force_update<P: Projection + ?Sized>(&mut self, projection: &P) -> ClusterResult<'_> {
        self.invalidate();
        self.update(projection)
    }

    /// Last memoized partition, without recomputing
    pub fn last_result(&self) -> ClusterResult<'_> {
        ClusterResult {
            points: &self.visible_points,
            clusters: &self.clusters,
        }
    }

    fn recompute<P: Projection + ?Sized>(&mut self, projection: &P) {
        let started = now_ms();

        for point in &mut self.all_points {
            point.screen_position = Some(projection.project(&point.position));
            point.distance_to_camera = Some(projection.distance_to_camera(&point.position));
        }

        let margin = self.config.viewport_margin();
        let viewport = self.viewport;
        let candidates: Vec<usize> = self
            .all_points
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                p.screen_position
                    .is_some_and(|s| viewport.contains_with_margin(s, margin))
            })
            .map(|(idx, _)| idx)
            .collect();

        self.generation += 1;
        let (clusters, absorbed) = form_clusters(
            &self.all_points,
            &candidates,
            &self.config,
            self.current_zoom,
            &mut self.distance_cache,
            self.generation,
        );

        self.visible_points = candidates
            .iter()
            .filter(|&&idx| !absorbed[idx])
            .map(|&idx| self.all_points[idx].clone())
            .collect();
        self.clusters = clusters;
        self.is_dirty = false;
        self.computations += 1;
        self.last_compute_ms = now_ms() - started;

        debug!(
            generation = self.generation,
            total = self.all_points.len(),
            in_view = candidates.len(),
            visible = self.visible_points.len(),
            clusters = self.clusters.len(),
            cache_size = self.distance_cache.len(),
            elapsed_ms = self.last_compute_ms,
            "Clusters recomputed"
        );
    }

    // ------------------------------------------------------------------------
    // Queries against the memoized partition
    // ------------------------------------------------------------------------

    /// Members of a cluster from the current generation, highest priority
    /// first and capped at `max_points_per_cluster`. None for unknown or
    /// stale ids.
    pub fn cluster_details(&self, id: ClusterId) -> Option<ClusterDetails<'_>> {
        if id.generation() != self.generation {
            return None;
        }
        self.clusters
            .get(id.index())
            .map(|c| c.details(self.config.max_points_per_cluster))
    }

    /// Resolve a `cluster_<n>` name within the current generation
    pub fn find_cluster(&self, name: &str) -> Option<&Cluster> {
        let index: usize = name.strip_prefix("cluster_")?.parse().ok()?;
        self.clusters.get(index)
    }

    /// Whether the point is drawn individually in the last partition
    pub fn is_point_visible(&self, point_id: &str) -> bool {
        self.visible_points.iter().any(|p| p.id.as_str() == point_id)
    }

    /// Cluster that absorbed the point in the last partition
    pub fn cluster_for_point(&self, point_id: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.contains(point_id))
    }

    // ------------------------------------------------------------------------
    // State accessors
    // ------------------------------------------------------------------------

    pub fn points(&self) -> &[Point] {
        &self.all_points
    }

    pub fn visible_points(&self) -> &[Point] {
        &self.visible_points
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn zoom(&self) -> f64 {
        self.current_zoom
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            computations: self.computations,
            cache_hits: self.distance_cache.hits(),
            cache_misses: self.distance_cache.misses(),
            cache_clears: self.distance_cache.clears(),
            cache_size: self.distance_cache.len(),
            last_visible: self.visible_points.len(),
            last_clusters: self.clusters.len(),
            last_compute_ms: self.last_compute_ms,
        }
    }
}
