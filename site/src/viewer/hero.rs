//! JS-facing handle for the hero model.
//!
//! ```js
//! const hero = new HeroViewer(0);
//! loader.load(url, (gltf) => {
//!   const action = mixer.clipAction(gltf.animations[0]);
//!   hero.loaded(box.min.toArray(), box.max.toArray(), action.getClip().duration, (t) => { action.time = t; });
//!   object.matrix.fromArray(hero.matrix());
//! }, undefined, (err) => hero.failed(String(err)));
//! renderer.setAnimationLoop(() => { hero.frame(); renderer.render(scene, camera); });
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use wasm_bindgen::prelude::*;

use super::browser::WindowScroll;
use super::controller::{AnimationMixer, LoadError, LoadedModel, ScrubController, Subscription};
use super::model::Aabb;
use super::scrub::ScrubConfig;

/// Forwards clip time to a JS callback.
struct JsMixer {
    set_time: Function,
}

impl AnimationMixer for JsMixer {
    fn set_time(&mut self, secs: f32) {
        if let Err(err) = self.set_time.call1(&JsValue::NULL, &JsValue::from_f64(f64::from(secs))) {
            log::warn!("viewer: set_time callback threw: {err:?}");
        }
    }
}

#[wasm_bindgen]
pub struct HeroViewer {
    controller: Rc<RefCell<ScrubController<JsMixer>>>,
    // Held for its Drop: removes the scroll listener with the viewer.
    _scroll: Option<Subscription>,
}

#[wasm_bindgen]
impl HeroViewer {
    /// Follow `window` scroll from now on. `max_scroll <= 0` keeps the
    /// default rewind distance.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new(max_scroll: f32) -> HeroViewer {
        let mut config = ScrubConfig::default();
        if max_scroll > 0.0 {
            config.max_scroll = max_scroll;
        }
        let controller = Rc::new(RefCell::new(ScrubController::new(config)));
        let scroll = match WindowScroll::new() {
            Some(source) => Some(ScrubController::attach(&controller, &source)),
            None => {
                log::warn!("viewer: no window, scroll scrubbing disabled");
                None
            }
        };
        HeroViewer { controller, _scroll: scroll }
    }

    /// The renderer parsed the model: bounds as `[x, y, z]` corners, the clip
    /// length in seconds, and a callback that sets the clip time.
    pub fn loaded(&self, min: &[f32], max: &[f32], clip_duration: f32, set_time: Function) {
        let loaded = Aabb::from_slices(min, max)
            .ok_or(LoadError::DegenerateBounds)
            .map(|bounds| LoadedModel { bounds, clip_duration, mixer: JsMixer { set_time } });
        self.with_controller(|controller| controller.on_loaded(loaded));
    }

    /// The fetch or decode failed. The viewer stays hidden.
    pub fn failed(&self, message: String) {
        self.with_controller(|controller| controller.on_loaded(Err(LoadError::Fetch(message))));
    }

    /// Call once per animation frame.
    pub fn frame(&self) {
        self.with_controller(ScrubController::on_frame);
    }

    #[must_use]
    pub fn visible(&self) -> bool {
        match self.controller.try_borrow() {
            Ok(controller) => controller.is_visible(),
            Err(_) => false,
        }
    }

    /// Column-major model matrix for the placement, `undefined` until ready.
    #[must_use]
    pub fn matrix(&self) -> Option<Vec<f32>> {
        match self.controller.try_borrow() {
            Ok(controller) => controller.placement().map(|p| p.to_matrix().to_cols_array().to_vec()),
            Err(_) => None,
        }
    }
}

impl HeroViewer {
    fn with_controller(&self, f: impl FnOnce(&mut ScrubController<JsMixer>)) {
        match self.controller.try_borrow_mut() {
            Ok(mut controller) => f(&mut controller),
            Err(_) => log::warn!("viewer: controller busy, call dropped"),
        }
    }
}
