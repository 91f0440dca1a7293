//! Neural-network background on `#neuralCanvas`
//!
//! Wires a [`ParticleField`] to the canvas 2D context, `requestAnimationFrame`,
//! pointer events on the canvas's container, window resizes and an
//! `IntersectionObserver` that pauses the loop while the container is off screen.

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use tracing::{debug, info, trace, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, MouseEvent, Window,
};

use crate::core::{Animator, FieldConfig, FrameScheduler, ParticleField, Point, Rgba, Surface};
use crate::theme::{Theme, THEME_ATTR};

const CANVAS_ID: &str = "neuralCanvas";
/// Optional JSON overrides for [`FieldConfig`] on the canvas element
const CONFIG_ATTR: &str = "data-field-config";

/// Shared slot for the frame closure; filled once the animator exists
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

// ============================================================================
// CanvasSurface
// ============================================================================

pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl Surface for CanvasSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Rgba, width: f64) {
        self.ctx.set_stroke_style_str(&color.to_string());
        self.ctx.set_line_width(width);
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        self.ctx.begin_path();
        if let Err(e) = self.ctx.arc(center.x, center.y, radius, 0.0, TAU) {
            trace!(?e, radius, "arc rejected");
            return;
        }
        self.ctx.set_fill_style_str(&color.to_string());
        self.ctx.fill();
    }
}

// ============================================================================
// RafScheduler
// ============================================================================

/// `requestAnimationFrame` / `cancelAnimationFrame`
pub struct RafScheduler {
    window: Window,
    callback: FrameCallback,
}

impl FrameScheduler for RafScheduler {
    type Handle = i32;

    fn request_frame(&mut self) -> Option<i32> {
        let callback = self.callback.borrow();
        let callback = callback.as_ref()?;
        match self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(?e, "requestAnimationFrame failed");
                None
            }
        }
    }

    fn cancel_frame(&mut self, handle: i32) {
        if let Err(e) = self.window.cancel_animation_frame(handle) {
            warn!(?e, handle, "cancelAnimationFrame failed");
        }
    }
}

// ============================================================================
// NeuralCanvas
// ============================================================================

struct NeuralCanvas {
    animator: Animator<RafScheduler>,
    surface: CanvasSurface,
    canvas: HtmlCanvasElement,
    container: Element,
    /// `<html>`, carrier of the live theme attribute
    root: Element,
}

impl NeuralCanvas {
    /// Match the canvas to its container's layout box and regenerate nodes
    fn fit_to_container(&mut self) {
        let rect = self.container.get_bounding_client_rect();
        let (width, height) = (rect.width(), rect.height());
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);
        self.animator.resize(width, height);
    }

    fn pointer_at(&mut self, event: &MouseEvent) {
        let rect = self.canvas.get_bounding_client_rect();
        let x = f64::from(event.client_x()) - rect.left();
        let y = f64::from(event.client_y()) - rect.top();
        self.animator.pointer_move(x, y);
    }

    fn current_theme(&self) -> Theme {
        self.root
            .get_attribute(THEME_ATTR)
            .map(|v| Theme::from_attr(&v))
            .unwrap_or_default()
    }

    fn frame(&mut self) {
        let theme = self.current_theme();
        self.animator.on_frame(&mut self.surface, theme);
    }
}

fn read_config(canvas: &HtmlCanvasElement) -> FieldConfig {
    let Some(json) = canvas.get_attribute(CONFIG_ATTR) else {
        return FieldConfig::default();
    };
    match FieldConfig::from_json(&json) {
        Ok(config) => {
            debug!(?config, "Field config from canvas attribute");
            config
        }
        Err(e) => {
            warn!(error = %e, "Invalid field config, using defaults");
            FieldConfig::default()
        }
    }
}

/// Attach the particle background. A page without the canvas (or without
/// a 2D context) gets no background and no error.
pub fn attach(window: &Window, document: &Document) -> Result<(), JsValue> {
    let Some(canvas) = document.get_element_by_id(CANVAS_ID) else {
        debug!("No #{CANVAS_ID} element, background disabled");
        return Ok(());
    };
    let canvas: HtmlCanvasElement = canvas.dyn_into()?;
    let Some(container) = canvas.parent_element() else {
        debug!("Canvas has no container, background disabled");
        return Ok(());
    };
    let Some(ctx) = canvas.get_context("2d")? else {
        debug!("No 2d context, background disabled");
        return Ok(());
    };
    let ctx: CanvasRenderingContext2d = ctx.dyn_into()?;
    let root = document
        .document_element()
        .ok_or_else(|| JsValue::from_str("no document element"))?;

    let config = read_config(&canvas);
    let threshold = config.visibility_threshold;

    let callback: FrameCallback = Rc::new(RefCell::new(None));
    let scheduler = RafScheduler {
        window: window.clone(),
        callback: callback.clone(),
    };
    let neural = Rc::new(RefCell::new(NeuralCanvas {
        animator: Animator::new(ParticleField::new(config), scheduler),
        surface: CanvasSurface { ctx },
        canvas,
        container: container.clone(),
        root,
    }));

    // Frame callback - lives for the page lifetime inside the shared slot
    let target = neural.clone();
    *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
        target.borrow_mut().frame();
    }) as Box<dyn FnMut(f64)>));

    // Pointer tracking relative to the canvas
    let target = neural.clone();
    let on_move = Closure::wrap(Box::new(move |e: MouseEvent| {
        target.borrow_mut().pointer_at(&e);
    }) as Box<dyn FnMut(MouseEvent)>);
    container.add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref())?;
    on_move.forget();

    let target = neural.clone();
    let on_leave = Closure::wrap(Box::new(move |_: MouseEvent| {
        target.borrow_mut().animator.pointer_leave();
    }) as Box<dyn FnMut(MouseEvent)>);
    container.add_event_listener_with_callback("mouseleave", on_leave.as_ref().unchecked_ref())?;
    on_leave.forget();

    // Resize regenerates the whole field
    let target = neural.clone();
    let on_resize = Closure::wrap(Box::new(move |_: web_sys::Event| {
        target.borrow_mut().fit_to_container();
    }) as Box<dyn FnMut(web_sys::Event)>);
    window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
    on_resize.forget();

    // Only animate while the container is on screen
    let target = neural.clone();
    let on_visibility = Closure::wrap(Box::new(move |entries: js_sys::Array| {
        for entry in entries.iter() {
            let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                continue;
            };
            target.borrow_mut().animator.set_visible(entry.is_intersecting());
        }
    }) as Box<dyn FnMut(js_sys::Array)>);
    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(threshold));
    let observer =
        IntersectionObserver::new_with_options(on_visibility.as_ref().unchecked_ref(), &options)?;
    observer.observe(&container);
    on_visibility.forget();

    // Size now; the observer's first report starts the loop
    neural.borrow_mut().fit_to_container();

    let (width, height) = neural.borrow().animator.field().dimensions();
    info!(width, height, threshold, "Neural background attached");
    Ok(())
}
