//! Clustering configuration
//!
//! Deserializes from the camelCase JSON shape hosts already use
//! (`{"clusterRadius": 40}`); unspecified fields keep their defaults.

use serde::{Deserialize, Serialize};

use super::error::ClusterError;
use super::point::PointCategory;

/// Priority floor for configured priority types; always above every base priority
pub const PRIORITY_TYPE_BASE: u32 = 10;

/// Engine configuration, fixed for the lifetime of a `ClusterEngine`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterConfig {
    /// Proximity threshold in pixels, before zoom adjustment
    pub cluster_radius: f64,
    /// Minimum members (seed included) for a cluster to form
    pub cluster_threshold: usize,
    /// Grow the visual radius with member count
    pub cluster_scaling: bool,
    /// Zoom at or above which clustering is bypassed entirely
    pub max_zoom_level: f64,
    /// Highest-priority categories, most important first
    pub priority_types: Vec<PointCategory>,
    /// Cap on members returned by a cluster detail view
    pub max_points_per_cluster: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            cluster_radius: 50.0,
            cluster_threshold: 3,
            cluster_scaling: true,
            max_zoom_level: 15.0,
            priority_types: vec![PointCategory::Danger],
            max_points_per_cluster: 15,
        }
    }
}

impl ClusterConfig {
    /// Parse from JSON, taking defaults for missing fields
    pub fn from_json(json: &str) -> Result<Self, ClusterError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ClusterError::invalid_input(format!("invalid cluster config: {e}")))?;
        Ok(config.normalized())
    }

    /// Drop repeated priority types, keeping first occurrence order
    pub fn normalized(mut self) -> Self {
        let mut seen: Vec<PointCategory> = Vec::with_capacity(self.priority_types.len());
        self.priority_types.retain(|category| {
            if seen.contains(category) {
                false
            } else {
                seen.push(category.clone());
                true
            }
        });
        self
    }

    /// Numeric priority of a category. Earlier priority types rank higher.
    pub fn priority_of(&self, category: &PointCategory) -> u32 {
        match self.priority_types.iter().position(|c| c == category) {
            Some(idx) => PRIORITY_TYPE_BASE + (self.priority_types.len() - idx) as u32,
            None => category.base_priority(),
        }
    }

    /// Margin around the viewport within which points are still considered
    pub fn viewport_margin(&self) -> f64 {
        self.cluster_radius * 2.0
    }

    /// Clustering radius at the given zoom; zoom is floored at 0.3
    pub fn adjusted_radius(&self, zoom: f64) -> f64 {
        self.cluster_radius / zoom.max(0.3)
    }

    /// Visual radius of a cluster with `count` members
    pub fn visual_radius(&self, count: usize) -> f64 {
        if !self.cluster_scaling {
            return self.cluster_radius;
        }
        let ratio = count as f64 / self.cluster_threshold.max(1) as f64;
        self.cluster_radius * (1.0 + ratio.max(1.0).log10())
    }
}
