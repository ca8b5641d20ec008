//! Projection capability supplied by the host renderer
//!
//! The engine never does camera math itself. Each `update` call receives
//! something that can place a world position on screen and measure its
//! distance from the camera.

use super::geometry::{ScreenPos, WorldPos};

/// World-to-screen mapping owned by the rendering collaborator.
///
/// The engine only recomputes when marked dirty, so a host whose camera
/// moved must call `ClusterEngine::invalidate` before the next `update`.
pub trait Projection {
    /// Screen position in pixels. Non-finite coordinates mean "not on screen".
    fn project(&self, world: &WorldPos) -> ScreenPos;

    /// Distance from the camera to `world`, in world units
    fn distance_to_camera(&self, world: &WorldPos) -> f64;
}

/// Adapts a pair of closures into a `Projection`.
pub struct FnProjection<P, D> {
    project: P,
    distance: D,
}

impl<P, D> FnProjection<P, D>
where
    P: Fn(&WorldPos) -> ScreenPos,
    D: Fn(&WorldPos) -> f64,
{
    pub fn new(project: P, distance: D) -> Self {
        Self { project, distance }
    }
}

impl<P, D> Projection for FnProjection<P, D>
where
    P: Fn(&WorldPos) -> ScreenPos,
    D: Fn(&WorldPos) -> f64,
{
    fn project(&self, world: &WorldPos) -> ScreenPos {
        (self.project)(world)
    }

    fn distance_to_camera(&self, world: &WorldPos) -> f64 {
        (self.distance)(world)
    }
}
