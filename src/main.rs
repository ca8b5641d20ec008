//! Standalone CLI driving the clustering engine from a simulated render loop
//!
//! Run with: cargo run --features cli --bin cluster-cli
//!
//! Environment:
//! - CLUSTER_POINTS: JSON file with the point list (demo field otherwise)
//! - CLUSTER_CONFIG: JSON file with the engine configuration
//! - CLUSTER_VIEWPORT: WIDTHxHEIGHT, default 1280x720
//! - CLUSTER_FRAMES: frames to render, default 600

#[cfg(not(target_arch = "wasm32"))]
use poi_clusters::core::{PointInput, Viewport, WorldPos};

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use poi_clusters::core::{ClusterConfig, ClusterEngine};
    use poi_clusters::orbit::OrbitCamera;
    use std::time::Duration;
    use tracing::{info, warn};
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,poi_clusters=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let config = match std::env::var("CLUSTER_CONFIG") {
        Ok(path) => ClusterConfig::from_json(&tokio::fs::read_to_string(&path).await?)?,
        Err(_) => ClusterConfig::default(),
    };
    let viewport = std::env::var("CLUSTER_VIEWPORT")
        .ok()
        .and_then(|v| parse_viewport(&v))
        .unwrap_or(Viewport::new(1280.0, 720.0));
    let frames: u64 = std::env::var("CLUSTER_FRAMES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(600);

    let mut engine = ClusterEngine::new(config);
    match std::env::var("CLUSTER_POINTS") {
        Ok(path) => {
            let text = tokio::fs::read_to_string(&path).await?;
            let count = engine
                .set_points_json(&text)
                .ok_or("point file is not a valid point list")?;
            info!(path = %path, count, "Loaded points");
        }
        Err(_) => {
            let points = demo_points();
            info!(count = points.len(), "Using demo point field");
            engine.set_points(points);
        }
    }
    engine.set_viewport(viewport.width, viewport.height);

    let mut camera = OrbitCamera::new(WorldPos::ZERO, 400.0, viewport);
    let mut frame_interval = tokio::time::interval(Duration::from_millis(16));
    let mut stats_interval = tokio::time::interval(Duration::from_secs(1));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut rendered = 0u64;
    let (mut drawn_points, mut drawn_clusters) = (0usize, 0usize);

    info!(frames, width = viewport.width, height = viewport.height, "Starting render loop");

    loop {
        tokio::select! {
            _ = frame_interval.tick() => {
                // Orbit while zooming between 1x and 20x, crossing the clustering cutoff
                let t = rendered as f64 / 60.0;
                let zoom = 1.0 + 19.0 * (0.5 - 0.5 * (t * 0.4).cos());
                camera.orbit(0.01, 0.0);
                camera.distance = camera.reference_distance / zoom;

                engine.set_zoom(camera.zoom());
                // The camera moved; the engine cannot see that on its own
                engine.invalidate();
                let result = engine.update(&camera);
                drawn_points = result.points.len();
                drawn_clusters = result.clusters.len();

                rendered += 1;
                if rendered >= frames {
                    break;
                }
            }
            _ = stats_interval.tick() => {
                let stats = engine.stats();
                info!(
                    frame = rendered,
                    zoom = format!("{:.2}", engine.zoom()),
                    points = drawn_points,
                    clusters = drawn_clusters,
                    computations = stats.computations,
                    cache_size = stats.cache_size,
                    cache_hits = stats.cache_hits,
                    compute_ms = format!("{:.2}", stats.last_compute_ms),
                    "stats"
                );
            }
            _ = &mut ctrl_c => {
                warn!("Interrupted");
                break;
            }
        }
    }

    info!(frames = rendered, computations = engine.stats().computations, "Render loop finished");
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}

/// Parse `WIDTHxHEIGHT`
#[cfg(not(target_arch = "wasm32"))]
fn parse_viewport(value: &str) -> Option<Viewport> {
    let (w, h) = value.split_once('x')?;
    let viewport = Viewport::new(w.trim().parse().ok()?, h.trim().parse().ok()?);
    (!viewport.is_empty()).then_some(viewport)
}

/// Deterministic field of trail sites on the ground plane, 1-9 POIs each
#[cfg(not(target_arch = "wasm32"))]
fn demo_points() -> Vec<PointInput> {
    const CATEGORIES: [&str; 8] = [
        "info", "water", "food", "shelter", "viewpoint", "parking", "warning", "danger",
    ];

    let mut points = Vec::new();
    for site in 0..24usize {
        let angle = site as f64 * 0.9;
        let radius = 20.0 + site as f64 * 7.5;
        let (cx, cz) = (radius * angle.cos(), radius * angle.sin());

        for i in 0..1 + (site * 7) % 9 {
            let a = i as f64 * 2.4;
            let r = 1.5 * (i as f64).sqrt();
            let category = CATEGORIES[(site * 3 + i) % CATEGORIES.len()];
            points.push(
                PointInput::new(WorldPos::new(cx + r * a.cos(), 0.0, cz + r * a.sin()), category)
                    .with_id(format!("site{site}_{i}")),
            );
        }
    }
    points
}
