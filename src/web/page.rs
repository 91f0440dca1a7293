//! Page wiring: theme toggle, mobile menu, active link on scroll, project cards

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    Storage, Window,
};

use crate::nav::{
    active_flags, CardState, MenuState, ACTIVE_CLASS, EXPANDED_CLASS, OPEN_CLASS,
    SECTION_ROOT_MARGIN,
};
use crate::theme::{Theme, STORAGE_KEY, THEME_ATTR};

const DARK_QUERY: &str = "(prefers-color-scheme: dark)";

/// All elements matching `selector`, in document order
fn elements(root: &Document, selector: &str) -> Result<Vec<Element>, JsValue> {
    let list = root.query_selector_all(selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

fn root_element(document: &Document) -> Result<Element, JsValue> {
    document
        .document_element()
        .ok_or_else(|| JsValue::from_str("no document element"))
}

// ============================================================================
// Theme
// ============================================================================

fn set_theme(root: &Element, storage: Option<&Storage>, theme: Theme) -> Result<(), JsValue> {
    root.set_attribute(THEME_ATTR, theme.as_str())?;
    if let Some(storage) = storage {
        // Private browsing may refuse writes; the attribute still applies
        if let Err(e) = storage.set_item(STORAGE_KEY, theme.as_str()) {
            warn!(?e, "Failed to persist theme");
        }
    }
    Ok(())
}

/// Apply the stored / OS-preferred theme before anything draws
pub fn apply_initial_theme(window: &Window, document: &Document) -> Result<(), JsValue> {
    let root = root_element(document)?;
    let storage = window.local_storage().ok().flatten();
    let stored = storage
        .as_ref()
        .and_then(|s| s.get_item(STORAGE_KEY).ok().flatten());
    let prefers_dark = window
        .match_media(DARK_QUERY)
        .ok()
        .flatten()
        .is_some_and(|mq| mq.matches());

    let theme = Theme::resolve(stored.as_deref(), prefers_dark);
    debug!(theme = theme.as_str(), stored = ?stored, prefers_dark, "Initial theme");
    set_theme(&root, storage.as_ref(), theme)
}

pub fn attach_theme_toggle(window: &Window, document: &Document) -> Result<(), JsValue> {
    let Some(button) = document.get_element_by_id("themeToggle") else {
        debug!("No #themeToggle, theme toggle disabled");
        return Ok(());
    };
    let root = root_element(document)?;
    let storage = window.local_storage().ok().flatten();

    let on_click = Closure::wrap(Box::new(move |_: web_sys::Event| {
        let current = root
            .get_attribute(THEME_ATTR)
            .map(|v| Theme::from_attr(&v))
            .unwrap_or_default();
        let next = current.toggled();
        match set_theme(&root, storage.as_ref(), next) {
            Ok(()) => debug!(theme = next.as_str(), "Theme toggled"),
            Err(e) => warn!(?e, "Failed to apply theme"),
        }
    }) as Box<dyn FnMut(web_sys::Event)>);
    button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();
    Ok(())
}

// ============================================================================
// Mobile menu
// ============================================================================

fn show_menu(hamburger: &Element, nav_links: &Element, open: bool) {
    for el in [hamburger, nav_links] {
        if let Err(e) = el.class_list().toggle_with_force(OPEN_CLASS, open) {
            warn!(?e, "Failed to toggle menu class");
        }
    }
}

pub fn attach_mobile_menu(document: &Document) -> Result<(), JsValue> {
    let (Some(hamburger), Some(nav_links)) = (
        document.get_element_by_id("hamburger"),
        document.get_element_by_id("navLinks"),
    ) else {
        debug!("No #hamburger/#navLinks, mobile menu disabled");
        return Ok(());
    };
    let menu = Rc::new(Cell::new(MenuState::default()));

    let (state, h, n) = (menu.clone(), hamburger.clone(), nav_links.clone());
    let on_toggle = Closure::wrap(Box::new(move |_: web_sys::Event| {
        let mut m = state.get();
        let open = m.toggle();
        state.set(m);
        show_menu(&h, &n, open);
    }) as Box<dyn FnMut(web_sys::Event)>);
    hamburger.add_event_listener_with_callback("click", on_toggle.as_ref().unchecked_ref())?;
    on_toggle.forget();

    // Following a link closes the menu
    let links = elements(document, ".navbar__link")?;
    for link in &links {
        let (state, h, n) = (menu.clone(), hamburger.clone(), nav_links.clone());
        let on_link = Closure::wrap(Box::new(move |_: web_sys::Event| {
            let mut m = state.get();
            m.close();
            state.set(m);
            show_menu(&h, &n, false);
        }) as Box<dyn FnMut(web_sys::Event)>);
        link.add_event_listener_with_callback("click", on_link.as_ref().unchecked_ref())?;
        on_link.forget();
    }

    debug!(links = links.len(), "Mobile menu attached");
    Ok(())
}

// ============================================================================
// Active link on scroll
// ============================================================================

fn highlight_section(links: &[Element], section_id: &str) {
    let hrefs: Vec<Option<String>> = links.iter().map(|l| l.get_attribute("href")).collect();
    let flags = active_flags(hrefs.iter().map(Option::as_deref), section_id);
    for (link, active) in links.iter().zip(flags) {
        if let Err(e) = link.class_list().toggle_with_force(ACTIVE_CLASS, active) {
            warn!(?e, "Failed to toggle active class");
        }
    }
}

pub fn attach_active_links(document: &Document) -> Result<(), JsValue> {
    let sections = elements(document, "section[id]")?;
    let links = elements(document, ".navbar__link")?;
    if sections.is_empty() || links.is_empty() {
        debug!(sections = sections.len(), links = links.len(), "Active link tracking disabled");
        return Ok(());
    }

    let on_intersect = Closure::wrap(Box::new(move |entries: js_sys::Array| {
        for entry in entries.iter() {
            let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                continue;
            };
            if !entry.is_intersecting() {
                continue;
            }
            if let Some(id) = entry.target().get_attribute("id") {
                highlight_section(&links, &id);
            }
        }
    }) as Box<dyn FnMut(js_sys::Array)>);

    let options = IntersectionObserverInit::new();
    options.set_root_margin(SECTION_ROOT_MARGIN);
    options.set_threshold(&JsValue::from_f64(0.0));
    let observer =
        IntersectionObserver::new_with_options(on_intersect.as_ref().unchecked_ref(), &options)?;
    for section in &sections {
        observer.observe(section);
    }
    on_intersect.forget();

    debug!(sections = sections.len(), "Active link tracking attached");
    Ok(())
}

// ============================================================================
// Project cards
// ============================================================================

pub fn attach_project_cards(document: &Document) -> Result<(), JsValue> {
    let cards = elements(document, ".project-card")?;
    let mut attached = 0usize;

    for card in cards {
        let Some(button) = card.query_selector(".project-card__toggle")? else {
            continue;
        };
        let toggle = button.clone();
        let on_click = Closure::wrap(Box::new(move |_: web_sys::Event| {
            let classes = card.class_list();
            let mut state = CardState::from_class_present(classes.contains(EXPANDED_CLASS));
            let expanded = state.toggle();
            if let Err(e) = classes.toggle_with_force(EXPANDED_CLASS, expanded) {
                warn!(?e, "Failed to toggle card");
                return;
            }
            if let Err(e) = toggle.set_attribute("aria-expanded", state.aria_expanded()) {
                warn!(?e, "Failed to set aria-expanded");
            }
        }) as Box<dyn FnMut(web_sys::Event)>);
        button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
        attached += 1;
    }

    debug!(cards = attached, "Project cards attached");
    Ok(())
}
