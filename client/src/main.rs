mod api;
mod app;
mod config;
mod facts;
mod leaflet;
mod logging;
mod markers;
mod normalize;
mod projection;
mod status;
mod sync;
mod time_format;
mod viewport;

use leptos::mount::mount_to;
use std::any::Any;
use std::cell::RefCell;
use wasm_bindgen::JsCast;

use crate::config::APP_ELEMENT_ID;

thread_local! {
    static APP_MOUNT_HANDLE: RefCell<Option<Box<dyn Any>>> = RefCell::new(None);
}

fn main() {
    console_error_panic_hook::set_once();
    logging::init();
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };
    // Mount only inside the dedicated container, never on <body>.
    let Some(target) = document
        .get_element_by_id(APP_ELEMENT_ID)
        .and_then(|node| node.dyn_into::<web_sys::HtmlElement>().ok())
    else {
        tracing::warn!(element = APP_ELEMENT_ID, "no app container on this page; staying idle");
        return;
    };

    APP_MOUNT_HANDLE.with(move |slot| {
        // Drop an earlier mount if main() runs again so its effects stop.
        let _old = slot.borrow_mut().take();
        let handle = mount_to(target, app::App);
        *slot.borrow_mut() = Some(Box::new(handle));
    });
}
