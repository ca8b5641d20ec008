//! Browser binding - lets a JS render loop drive the clustering engine
//!
//! Projection stays on the JS side: `update` takes two callbacks,
//! `project(x, y, z) -> {x, y}` and `distance(x, y, z) -> number`.
//! Results cross the boundary as plain JSON-shaped objects.

use js_sys::{Function, Reflect, JSON};
use serde::Serialize;
use tracing::warn;
use wasm_bindgen::prelude::*;

use crate::core::{ClusterConfig, ClusterEngine, Projection, ScreenPos, WorldPos};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    // Initialize tracing for browser console
    tracing_wasm::set_as_global_default();
}

/// Projection backed by host callbacks
struct JsProjection<'a> {
    project: &'a Function,
    distance: &'a Function,
}

impl Projection for JsProjection<'_> {
    fn project(&self, world: &WorldPos) -> ScreenPos {
        match call_with_position(self.project, world) {
            Ok(value) => ScreenPos::new(read_number(&value, "x"), read_number(&value, "y")),
            Err(e) => {
                warn!(error = ?e, "Projection callback failed");
                ScreenPos::OFFSCREEN
            }
        }
    }

    fn distance_to_camera(&self, world: &WorldPos) -> f64 {
        call_with_position(self.distance, world)
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(f64::INFINITY)
    }
}

fn call_with_position(f: &Function, world: &WorldPos) -> Result<JsValue, JsValue> {
    f.call3(
        &JsValue::NULL,
        &JsValue::from_f64(world.x),
        &JsValue::from_f64(world.y),
        &JsValue::from_f64(world.z),
    )
}

fn read_number(value: &JsValue, key: &str) -> f64 {
    Reflect::get(value, &JsValue::from_str(key))
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(f64::NAN)
}

fn stringify(value: &JsValue) -> Option<String> {
    JSON::stringify(value).ok().and_then(|s| s.as_string())
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    match serde_json::to_string(value) {
        Ok(json) => JSON::parse(&json).unwrap_or(JsValue::NULL),
        Err(e) => {
            warn!(error = %e, "Failed to serialize result");
            JsValue::NULL
        }
    }
}

#[wasm_bindgen]
pub struct WasmClusterEngine {
    engine: ClusterEngine,
}

#[wasm_bindgen]
impl WasmClusterEngine {
    /// `config` is an optional camelCase config object; bad configs fall back to defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> WasmClusterEngine {
        let config = if config.is_undefined() || config.is_null() {
            ClusterConfig::default()
        } else {
            stringify(&config)
                .and_then(|json| {
                    ClusterConfig::from_json(&json)
                        .map_err(|e| warn!(error = %e, "Using default cluster config"))
                        .ok()
                })
                .unwrap_or_default()
        };
        Self {
            engine: ClusterEngine::new(config),
        }
    }

    /// Returns false (and keeps the previous points) when `points` is not a valid point array
    #[wasm_bindgen(js_name = setPoints)]
    pub fn set_points(&mut self, points: JsValue) -> bool {
        let json = stringify(&points).unwrap_or_else(|| "null".to_string());
        self.engine.set_points_json(&json).is_some()
    }

    #[wasm_bindgen(js_name = setViewport)]
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.engine.set_viewport(width, height);
    }

    #[wasm_bindgen(js_name = setZoom)]
    pub fn set_zoom(&mut self, zoom: f64) {
        self.engine.set_zoom(zoom);
    }

    /// `{points, clusters}` for this frame
    pub fn update(&mut self, project: &Function, distance: &Function) -> JsValue {
        let projection = JsProjection { project, distance };
        to_js(&self.engine.update(&projection))
    }

    pub fn invalidate(&mut self) {
        self.engine.invalidate();
    }

    #[wasm_bindgen(js_name = forceUpdate)]
    pub fn force_update(&mut self, project: &Function, distance: &Function) -> JsValue {
        let projection = JsProjection { project, distance };
        to_js(&self.engine.force_update(&projection))
    }

    /// `{points, hiddenCount, totalCount}`, or null for an unknown id
    #[wasm_bindgen(js_name = getClusterDetails)]
    pub fn get_cluster_details(&self, cluster_id: &str) -> JsValue {
        self.engine
            .find_cluster(cluster_id)
            .and_then(|cluster| self.engine.cluster_details(cluster.id))
            .map_or(JsValue::NULL, |details| to_js(&details))
    }

    #[wasm_bindgen(js_name = isPointVisible)]
    pub fn is_point_visible(&self, point_id: &str) -> bool {
        self.engine.is_point_visible(point_id)
    }

    #[wasm_bindgen(js_name = getClusterForPoint)]
    pub fn get_cluster_for_point(&self, point_id: &str) -> JsValue {
        self.engine
            .cluster_for_point(point_id)
            .map_or(JsValue::NULL, to_js)
    }

    pub fn stats(&self) -> JsValue {
        to_js(&self.engine.stats())
    }
}
