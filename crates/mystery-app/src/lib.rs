//! Mystery chat — WASM entry point.
//!
//! This crate is the composition root (DI wiring layer).
//! It assembles the platform adapters around a session controller and
//! exposes the result to the page as [`ChatHandle`].

mod app;
mod settings;

#[cfg(test)]
mod tests;

use wasm_bindgen::prelude::*;

pub use app::ChatHandle;
pub use settings::{load_config, save_config};

/// WASM entry point, runs when the module is instantiated
#[wasm_bindgen(start)]
pub fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Mystery chat WASM starting...");
}
