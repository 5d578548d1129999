//! `window` scroll binding for the browser build.

use gloo_events::EventListener;
use web_sys::Window;

use super::controller::{ScrollSource, Subscription};

/// [`ScrollSource`] backed by `window.scrollY` and the `scroll` event.
pub struct WindowScroll {
    window: Window,
}

impl WindowScroll {
    /// `None` outside a browsing context (e.g. a worker).
    #[must_use]
    pub fn new() -> Option<Self> {
        web_sys::window().map(|window| Self { window })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn read_scroll(window: &Window) -> f32 {
    match window.scroll_y() {
        Ok(y) => y as f32,
        Err(err) => {
            log::warn!("viewer: scrollY unavailable: {err:?}");
            0.0
        }
    }
}

impl ScrollSource for WindowScroll {
    fn scroll_y(&self) -> f32 {
        read_scroll(&self.window)
    }

    fn subscribe(&self, mut on_scroll: Box<dyn FnMut(f32)>) -> Subscription {
        let window = self.window.clone();
        let listener = EventListener::new(&self.window, "scroll", move |_event| {
            on_scroll(read_scroll(&window));
        });
        Subscription::new(move || drop(listener))
    }
}
