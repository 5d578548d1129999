//! Viewer lifecycle: load, place, scrub.

use std::cell::RefCell;
use std::rc::Rc;

use super::model::{Aabb, DEFAULT_TARGET_SIZE, Placement};
use super::scrub::ScrubConfig;

// =============================================================================
// SEAMS
// =============================================================================

/// Vertical scroll position of the page, plus change notifications.
pub trait ScrollSource {
    /// Current offset in CSS px.
    fn scroll_y(&self) -> f32;

    /// Call `on_scroll` with the new offset on every scroll event until the
    /// returned subscription is dropped.
    fn subscribe(&self, on_scroll: Box<dyn FnMut(f32)>) -> Subscription;
}

/// Live listener registration. Dropping it removes the listener.
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self { teardown: Some(Box::new(teardown)) }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("live", &self.teardown.is_some()).finish()
    }
}

/// The renderer's animation mixer for the model's single clip.
pub trait AnimationMixer {
    /// Jump the clip to `secs`. Never advances on its own.
    fn set_time(&mut self, secs: f32);
}

/// What the asset loader hands over once the model is parsed.
#[derive(Debug)]
pub struct LoadedModel<M> {
    pub bounds: Aabb,
    pub clip_duration: f32,
    pub mixer: M,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("model fetch failed: {0}")]
    Fetch(String),
    #[error("model decode failed: {0}")]
    Decode(String),
    #[error("model has no animation clip")]
    NoAnimation,
    #[error("model bounds are empty or not finite")]
    DegenerateBounds,
}

// =============================================================================
// CONTROLLER
// =============================================================================

#[derive(Debug)]
pub enum ViewerState<M> {
    Loading,
    Ready { mixer: M, placement: Placement, clip_duration: f32 },
    /// Terminal. The viewer stays hidden; there is no retry.
    Failed(LoadError),
}

/// Drives a loaded model's clip from scroll position.
#[derive(Debug)]
pub struct ScrubController<M> {
    config: ScrubConfig,
    target_size: f32,
    scroll_y: f32,
    state: ViewerState<M>,
}

impl<M: AnimationMixer> ScrubController<M> {
    #[must_use]
    pub fn new(config: ScrubConfig) -> Self {
        Self { config, target_size: DEFAULT_TARGET_SIZE, scroll_y: 0.0, state: ViewerState::Loading }
    }

    #[must_use]
    pub fn with_target_size(mut self, target_size: f32) -> Self {
        self.target_size = target_size;
        self
    }

    /// Finish loading. Placement is computed here, then the clip is scrubbed
    /// to the current scroll position before anything renders.
    pub fn on_loaded(&mut self, loaded: Result<LoadedModel<M>, LoadError>) {
        if !matches!(self.state, ViewerState::Loading) {
            log::warn!("viewer: ignoring load result after the viewer settled");
            return;
        }
        let ready = loaded.and_then(|model| {
            if !(model.clip_duration.is_finite() && model.clip_duration >= 0.0) {
                return Err(LoadError::NoAnimation);
            }
            let placement = Placement::normalize(&model.bounds, self.target_size)?;
            Ok((model, placement))
        });
        match ready {
            Ok((model, placement)) => {
                self.state = ViewerState::Ready { mixer: model.mixer, placement, clip_duration: model.clip_duration };
                self.scrub();
            }
            Err(err) => {
                log::error!("viewer: {err}");
                self.state = ViewerState::Failed(err);
            }
        }
    }

    /// Scroll event: remember the offset and scrub immediately.
    pub fn on_scroll(&mut self, scroll_y: f32) {
        self.scroll_y = scroll_y;
        self.scrub();
    }

    /// Render frame: re-apply the time for the last known offset.
    pub fn on_frame(&mut self) {
        self.scrub();
    }

    fn scrub(&mut self) {
        if let ViewerState::Ready { mixer, clip_duration, .. } = &mut self.state {
            mixer.set_time(self.config.time_at(self.scroll_y, *clip_duration));
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        matches!(self.state, ViewerState::Ready { .. })
    }

    #[must_use]
    pub fn placement(&self) -> Option<Placement> {
        match &self.state {
            ViewerState::Ready { placement, .. } => Some(*placement),
            _ => None,
        }
    }

    /// Clip time for the current offset, if a model is ready.
    #[must_use]
    pub fn current_time(&self) -> Option<f32> {
        match &self.state {
            ViewerState::Ready { clip_duration, .. } => Some(self.config.time_at(self.scroll_y, *clip_duration)),
            _ => None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &ViewerState<M> {
        &self.state
    }
}

impl<M: AnimationMixer + 'static> ScrubController<M> {
    /// Feed `source` into a shared controller. Reads the current offset once,
    /// then follows scroll events for as long as the subscription lives.
    pub fn attach(controller: &Rc<RefCell<Self>>, source: &dyn ScrollSource) -> Subscription {
        match controller.try_borrow_mut() {
            Ok(mut this) => this.on_scroll(source.scroll_y()),
            Err(_) => log::warn!("viewer: controller busy during attach"),
        }
        let shared = Rc::clone(controller);
        source.subscribe(Box::new(move |scroll_y| match shared.try_borrow_mut() {
            Ok(mut this) => this.on_scroll(scroll_y),
            Err(_) => log::warn!("viewer: dropped re-entrant scroll event"),
        }))
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
