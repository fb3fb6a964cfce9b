//! Browser implementations of the mystery-core ports.
//!
//! HTTP goes through `fetch()` via gloo-net; background work is spawned with
//! `wasm_bindgen_futures::spawn_local`.

pub mod llm;
pub mod storage;
pub mod hook;

#[cfg(test)]
mod tests;
