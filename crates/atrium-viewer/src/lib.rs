//! Atrium Viewer - Browser-based 3D building monitoring frontend
//!
//! This crate provides the 3D building view and telemetry dashboard using
//! Bevy and WebGPU.

mod app;
mod camera;
mod inspector;
mod network;
mod rooms;
mod scene;
mod ui;

use wasm_bindgen::prelude::*;

/// Entry point for WASM module
#[wasm_bindgen(start)]
pub fn main() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging with filtering to reduce wgpu noise
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::WARN)
            .build(),
    );

    // Run the Bevy app
    app::run();
}
