//! Orbiting perspective camera
//!
//! Host-side projection used by the CLI render loop and by tests. The
//! clustering core never depends on it; it only sees the `Projection` impl.

use crate::core::{Projection, ScreenPos, Viewport, WorldPos};

const NEAR_PLANE: f64 = 0.1;
/// Keep pitch just short of the poles so the basis never degenerates
const MAX_PITCH: f64 = 1.5;
const WORLD_UP: WorldPos = WorldPos::new(0.0, 1.0, 0.0);

/// Perspective camera circling a target point.
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    pub target: WorldPos,
    pub distance: f64,
    /// Radians around the world Y axis
    pub yaw: f64,
    /// Radians above the horizon
    pub pitch: f64,
    /// Vertical field of view in radians
    pub fov_y: f64,
    pub viewport: Viewport,
    /// Camera distance at which `zoom()` reads 1.0
    pub reference_distance: f64,
}

impl OrbitCamera {
    pub fn new(target: WorldPos, distance: f64, viewport: Viewport) -> Self {
        Self {
            target,
            distance,
            yaw: 0.0,
            pitch: 0.6,
            fov_y: 60f64.to_radians(),
            viewport,
            reference_distance: distance,
        }
    }

    pub fn eye(&self) -> WorldPos {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let offset = WorldPos::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw);
        self.target.add(offset.scale(self.distance))
    }

    pub fn orbit(&mut self, d_yaw: f64, d_pitch: f64) {
        self.yaw += d_yaw;
        self.pitch = (self.pitch + d_pitch).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Scale the camera distance; values below 1.0 move closer
    pub fn dolly(&mut self, factor: f64) {
        self.distance = (self.distance * factor).max(NEAR_PLANE * 10.0);
    }

    /// Map-style zoom level: 2.0 when twice as close as the reference distance
    pub fn zoom(&self) -> f64 {
        self.reference_distance / self.distance
    }

    /// (eye, forward, right, up)
    fn basis(&self) -> (WorldPos, WorldPos, WorldPos, WorldPos) {
        let eye = self.eye();
        let forward = self.target.sub(eye).normalize();
        let right = forward.cross(WORLD_UP).normalize();
        let up = right.cross(forward);
        (eye, forward, right, up)
    }
}

impl Projection for OrbitCamera {
    fn project(&self, world: &WorldPos) -> ScreenPos {
        let (eye, forward, right, up) = self.basis();
        let rel = world.sub(eye);

        let depth = rel.dot(forward);
        if depth <= NEAR_PLANE {
            return ScreenPos::OFFSCREEN;
        }

        let half_height = (self.fov_y * 0.5).tan();
        let ndc_x = rel.dot(right) / (depth * half_height * self.viewport.aspect_ratio());
        let ndc_y = rel.dot(up) / (depth * half_height);

        ScreenPos::new(
            (ndc_x + 1.0) * 0.5 * self.viewport.width,
            (1.0 - ndc_y) * 0.5 * self.viewport.height,
        )
    }

    fn distance_to_camera(&self, world: &WorldPos) -> f64 {
        world.distance(self.eye())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level_camera() -> OrbitCamera {
        let mut camera = OrbitCamera::new(WorldPos::ZERO, 100.0, Viewport::new(800.0, 600.0));
        camera.pitch = 0.0;
        camera
    }

    #[test]
    fn test_target_projects_to_center() {
        let camera = level_camera();
        let center = camera.project(&WorldPos::ZERO);
        assert!((center.x - 400.0).abs() < 1e-9);
        assert!((center.y - 300.0).abs() < 1e-9);
        assert!((camera.distance_to_camera(&WorldPos::ZERO) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_screen_axes() {
        let camera = level_camera();
        let right = camera.project(&WorldPos::new(10.0, 0.0, 0.0));
        let above = camera.project(&WorldPos::new(0.0, 10.0, 0.0));
        assert!(right.x > 400.0);
        assert!(above.y < 300.0);
    }

    #[test]
    fn test_behind_camera_is_offscreen() {
        let camera = level_camera();
        let behind = camera.project(&WorldPos::new(0.0, 0.0, 200.0));
        assert!(!behind.is_finite());
    }

    #[test]
    fn test_zoom_follows_distance() {
        let mut camera = level_camera();
        assert_eq!(camera.zoom(), 1.0);
        camera.dolly(0.5);
        assert_eq!(camera.zoom(), 2.0);
        camera.dolly(1e-9);
        assert_eq!(camera.distance, 1.0);
    }

    #[test]
    fn test_orbit_clamps_pitch() {
        let mut camera = level_camera();
        camera.orbit(0.3, 10.0);
        assert_eq!(camera.pitch, MAX_PITCH);
        assert_eq!(camera.yaw, 0.3);
    }
}
