//! Platform-agnostic clustering core - shared between the wasm binding and the CLI

pub mod cache;
pub mod cluster;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod parser;
pub mod point;
pub mod projection;

pub use cache::{DistanceCache, DISTANCE_CACHE_CAPACITY};
pub use cluster::{Cluster, ClusterDetails, ClusterId};
pub use config::ClusterConfig;
pub use engine::{ClusterEngine, ClusterResult, EngineStats};
pub use error::ClusterError;
pub use geometry::{ScreenPos, Viewport, WorldPos};
pub use parser::{parse_points, parse_points_json};
pub use point::{Point, PointCategory, PointId, PointInput};
pub use projection::{FnProjection, Projection};
