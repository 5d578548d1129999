//! Scroll-bound model viewer.
//!
//! DESIGN
//! ======
//! The hero model carries one baked animation clip. Its playback time is a
//! pure function of the page's vertical scroll offset ([`scrub::scrub_time`]);
//! nothing advances it by wall-clock time. Scroll position comes from an
//! injected [`controller::ScrollSource`] so the mapping and the controller
//! are testable without a DOM.
//!
//! In the browser build, [`hero::HeroViewer`] is the handle the page script
//! holds: it attaches `window` scroll to the controller and receives the
//! loaded model from the JS renderer.
//!
//! At the top of the page the clip sits one frame before its end (laptop
//! open); scrolling down rewinds it to 0 (laptop closed).

#[cfg(feature = "browser")]
pub mod browser;
pub mod controller;
#[cfg(feature = "browser")]
pub mod hero;
pub mod model;
pub mod scrub;
