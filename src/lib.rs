//! Neural Field - behavior scripts for a static portfolio page
//!
//! On the page (wasm32, `wasm` feature) this attaches:
//! - Theme toggle with a persisted light/dark preference
//! - Mobile menu and scroll-driven active navbar link
//! - Expandable project cards
//! - Animated particle-network background, paused while off screen
//!
//! The particle field, palette and navigation state are platform-agnostic and
//! also drive the `field-cli` headless runner.

pub mod core;
pub mod nav;
pub mod theme;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
mod web;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
use wasm_bindgen::prelude::*;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();

    // Initialize tracing for browser console
    tracing_wasm::set_as_global_default();

    web::start();
}
