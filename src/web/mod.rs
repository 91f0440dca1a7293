//! Browser glue: attaches every page behavior to the live DOM

mod canvas;
mod page;

use tracing::{error, info};
use wasm_bindgen::JsValue;

fn report(behavior: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        error!(behavior, error = ?e, "Failed to attach page behavior");
    }
}

/// Attach all behaviors. Each one is independent: a failure is logged and
/// the rest still attach.
pub fn start() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    // Theme first so the page never flashes the wrong colors
    report("theme", page::apply_initial_theme(&window, &document));
    report("theme toggle", page::attach_theme_toggle(&window, &document));
    report("mobile menu", page::attach_mobile_menu(&document));
    report("active links", page::attach_active_links(&document));
    report("project cards", page::attach_project_cards(&document));
    report("neural background", canvas::attach(&window, &document));

    info!("Page behaviors attached");
}
