//! POI clustering - screen-space point clustering for dense 3D/map scenes
//!
//! Decides, each time the view or the point set changes, which points of
//! interest are drawn individually and which are merged into cluster markers.
//!
//! - `core`: the engine, platform-agnostic, no camera math
//! - `orbit`: a host-side perspective camera implementing `Projection`
//! - `wasm`: browser binding (feature `wasm`)

pub mod core;
pub mod orbit;
mod time;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use crate::core::{
    Cluster, ClusterConfig, ClusterDetails, ClusterEngine, ClusterError, ClusterId, ClusterResult,
    EngineStats, Point, PointCategory, PointInput, Projection, ScreenPos, WorldPos,
};
