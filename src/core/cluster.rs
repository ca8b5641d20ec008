//! Cluster types and the greedy screen-space clustering pass
//!
//! Clusters are rebuilt from scratch every recomputation. Their ids carry
//! the generation that produced them and are meaningless afterwards.

use std::fmt;

use serde::{Serialize, Serializer};

use super::cache::DistanceCache;
use super::config::ClusterConfig;
use super::geometry::{ScreenPos, WorldPos};
use super::point::{Point, PointCategory};

// ============================================================================
// ClusterId - ephemeral, per-generation identity
// ============================================================================

/// Identity of a cluster within one recomputation.
///
/// Do not keep these across `update` calls that recompute: the engine
/// rejects ids from an older generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClusterId {
    generation: u64,
    index: usize,
}

impl ClusterId {
    pub(crate) fn new(generation: u64, index: usize) -> Self {
        Self { generation, index }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Position in the cluster list of its generation
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cluster_{}", self.index)
    }
}

impl Serialize for ClusterId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// Cluster
// ============================================================================

/// Aggregate marker standing in for several nearby points.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: ClusterId,
    /// Priority-weighted centroid in world space
    pub position: WorldPos,
    /// Priority-weighted centroid in screen space
    pub screen_position: ScreenPos,
    pub count: usize,
    /// Members, highest priority first
    pub points: Vec<Point>,
    pub main_type: PointCategory,
    /// Visual radius in pixels
    pub radius: f64,
}

impl Cluster {
    pub fn contains(&self, point_id: &str) -> bool {
        self.points.iter().any(|p| p.id.as_str() == point_id)
    }

    /// Members by descending priority, cut to `max_points`
    pub fn details(&self, max_points: usize) -> ClusterDetails<'_> {
        let mut points: Vec<&Point> = self.points.iter().collect();
        points.sort_by(|a, b| b.priority.cmp(&a.priority));
        let total_count = points.len();
        points.truncate(max_points);
        ClusterDetails {
            hidden_count: total_count - points.len(),
            total_count,
            points,
        }
    }
}

/// Detail view of one cluster, as shown when a marker is expanded.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDetails<'a> {
    pub points: Vec<&'a Point>,
    /// Members left out by the truncation
    pub hidden_count: usize,
    pub total_count: usize,
}

// ============================================================================
// Clustering pass
// ============================================================================

/// Group `candidates` (indices into `points`, all already projected) into clusters.
///
/// Seeds are visited in descending priority, ties in input order. A seed
/// that gathers too few neighbours stays unclustered but may still be
/// absorbed by a later seed.
///
/// Returns the clusters and a mask over `points` marking every absorbed point.
pub(crate) fn form_clusters(
    points: &[Point],
    candidates: &[usize],
    config: &ClusterConfig,
    zoom: f64,
    cache: &mut DistanceCache,
    generation: u64,
) -> (Vec<Cluster>, Vec<bool>) {
    let mut order = candidates.to_vec();
    order.sort_by(|&a, &b| points[b].priority.cmp(&points[a].priority));

    let radius = config.adjusted_radius(zoom);
    let min_neighbors = config.cluster_threshold.saturating_sub(1);
    let mut processed = vec![false; points.len()];
    let mut clusters = Vec::new();

    for &seed in &order {
        if processed[seed] {
            continue;
        }
        let seed_point = &points[seed];
        let seed_screen = screen_of(seed_point);

        let mut neighbors = Vec::new();
        for &other in &order {
            if other == seed || processed[other] {
                continue;
            }
            let other_point = &points[other];
            let distance = cache.distance(
                (&seed_point.id, seed_screen),
                (&other_point.id, screen_of(other_point)),
            );
            if distance <= radius {
                neighbors.push(other);
            }
        }

        if neighbors.len() < min_neighbors {
            continue;
        }

        processed[seed] = true;
        for &n in &neighbors {
            processed[n] = true;
        }

        let mut members: Vec<Point> = std::iter::once(seed)
            .chain(neighbors)
            .map(|i| points[i].clone())
            .collect();
        members.sort_by(|a, b| b.priority.cmp(&a.priority));

        let id = ClusterId::new(generation, clusters.len());
        clusters.push(build_cluster(id, members, config));
    }

    (clusters, processed)
}

fn screen_of(point: &Point) -> ScreenPos {
    point.screen_position.unwrap_or(ScreenPos::OFFSCREEN)
}

fn build_cluster(id: ClusterId, members: Vec<Point>, config: &ClusterConfig) -> Cluster {
    let (position, screen_position) = weighted_centroid(&members);
    let main_type = dominant_type(&members, &config.priority_types);
    let count = members.len();
    Cluster {
        id,
        position,
        screen_position,
        count,
        points: members,
        main_type,
        radius: config.visual_radius(count),
    }
}

/// Priority-weighted mean of member positions, world and screen space
pub(crate) fn weighted_centroid(members: &[Point]) -> (WorldPos, ScreenPos) {
    let mut world = WorldPos::ZERO;
    let mut screen = ScreenPos::default();
    let mut total = 0.0;

    for point in members {
        let weight = point.priority as f64;
        let s = screen_of(point);
        world = world.add(point.position.scale(weight));
        screen.x += s.x * weight;
        screen.y += s.y * weight;
        total += weight;
    }

    let divisor = if total == 0.0 { 1.0 } else { total };
    (
        world.scale(1.0 / divisor),
        ScreenPos::new(screen.x / divisor, screen.y / divisor),
    )
}

/// First member in a priority type wins outright; otherwise the most
/// frequent category, earliest seen on ties.
pub(crate) fn dominant_type(members: &[Point], priority_types: &[PointCategory]) -> PointCategory {
    if let Some(point) = members.iter().find(|p| priority_types.contains(&p.category)) {
        return point.category.clone();
    }

    let mut counts: Vec<(&PointCategory, usize)> = Vec::new();
    for point in members {
        match counts.iter_mut().find(|(c, _)| *c == &point.category) {
            Some((_, n)) => *n += 1,
            None => counts.push((&point.category, 1)),
        }
    }

    let mut best: Option<(&PointCategory, usize)> = None;
    for (category, n) in counts {
        if best.map_or(true, |(_, max)| n > max) {
            best = Some((category, n));
        }
    }
    best.map_or(PointCategory::Info, |(category, _)| category.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::point::PointInput;

    fn point(idx: usize, x: f64, y: f64, category: &str, config: &ClusterConfig) -> Point {
        let input = PointInput::new(WorldPos::new(x, y, 0.0), category);
        let priority = config.priority_of(&input.category);
        let mut p = Point::from_input(input, idx, priority);
        p.screen_position = Some(ScreenPos::new(x, y));
        p
    }

    #[test]
    fn test_dominant_type_priority_short_circuit() {
        let config = ClusterConfig::default();
        let members = vec![
            point(0, 0.0, 0.0, "food", &config),
            point(1, 0.0, 0.0, "food", &config),
            point(2, 0.0, 0.0, "danger", &config),
        ];
        assert_eq!(
            dominant_type(&members, &config.priority_types),
            PointCategory::Danger
        );
    }

    #[test]
    fn test_dominant_type_mode_and_ties() {
        let config = ClusterConfig::default();
        let members = vec![
            point(0, 0.0, 0.0, "water", &config),
            point(1, 0.0, 0.0, "food", &config),
            point(2, 0.0, 0.0, "food", &config),
        ];
        assert_eq!(dominant_type(&members, &config.priority_types), PointCategory::Food);

        // Tie: earliest seen wins
        let members = vec![
            point(0, 0.0, 0.0, "water", &config),
            point(1, 0.0, 0.0, "food", &config),
        ];
        assert_eq!(dominant_type(&members, &config.priority_types), PointCategory::Water);

        assert_eq!(dominant_type(&[], &config.priority_types), PointCategory::Info);
    }

    #[test]
    fn test_weighted_centroid_pulls_toward_priority() {
        let config = ClusterConfig::default();
        let members = vec![
            point(0, 0.0, 0.0, "danger", &config),
            point(1, 10.0, 0.0, "info", &config),
        ];
        let (world, screen) = weighted_centroid(&members);
        // danger weight 11, info weight 1
        assert!((world.x - 10.0 / 12.0).abs() < 1e-9);
        assert!((screen.x - 10.0 / 12.0).abs() < 1e-9);
        assert!(world.x < 5.0);
    }

    #[test]
    fn test_weighted_centroid_zero_weight() {
        let config = ClusterConfig::default();
        let mut members = vec![point(0, 4.0, 2.0, "info", &config)];
        members[0].priority = 0;
        let (world, _) = weighted_centroid(&members);
        assert_eq!(world, WorldPos::ZERO);
    }

    #[test]
    fn test_form_clusters_greedy() {
        let config = ClusterConfig::default();
        let points = vec![
            point(0, 0.0, 0.0, "info", &config),
            point(1, 10.0, 0.0, "info", &config),
            point(2, 20.0, 0.0, "info", &config),
            point(3, 500.0, 500.0, "info", &config),
        ];
        let mut cache = DistanceCache::default();
        let (clusters, absorbed) = form_clusters(&points, &[0, 1, 2, 3], &config, 1.0, &mut cache, 7);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].count, 3);
        assert_eq!(clusters[0].id.to_string(), "cluster_0");
        assert_eq!(clusters[0].id.generation(), 7);
        assert!(!clusters[0].contains("point_3"));
        assert_eq!(absorbed, vec![true, true, true, false]);
    }

    #[test]
    fn test_failed_seed_can_join_later_cluster() {
        // Danger point at the edge sorts first but only sees one neighbour;
        // the info point in the middle then gathers it.
        let config = ClusterConfig::default();
        let points = vec![
            point(0, 0.0, 0.0, "danger", &config),
            point(1, 40.0, 0.0, "info", &config),
            point(2, 80.0, 0.0, "info", &config),
        ];
        let mut cache = DistanceCache::default();
        let (clusters, _) = form_clusters(&points, &[0, 1, 2], &config, 1.0, &mut cache, 0);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].count, 3);
        assert_eq!(clusters[0].points[0].id.as_str(), "point_0");
        assert_eq!(clusters[0].main_type, PointCategory::Danger);
    }

    #[test]
    fn test_details_truncation() {
        let config = ClusterConfig::default();
        let members: Vec<Point> = (0..20)
            .map(|i| point(i, 0.0, 0.0, if i == 19 { "danger" } else { "info" }, &config))
            .collect();
        let cluster = build_cluster(ClusterId::new(0, 0), members, &config);

        let details = cluster.details(15);
        assert_eq!(details.points.len(), 15);
        assert_eq!(details.total_count, 20);
        assert_eq!(details.hidden_count, 5);
        assert_eq!(details.points[0].id.as_str(), "point_19");

        let details = cluster.details(50);
        assert_eq!(details.hidden_count, 0);
    }
}
