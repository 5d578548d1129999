//! Client-side logic for the agency website and its admin area.
//!
//! Everything here is plain Rust so it can be unit tested on the host; the
//! `browser` feature adds the `window` bindings used when compiled to
//! WebAssembly.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`viewer`] | Scroll-scrubbed 3D model viewer: time mapping, model placement, controller |
//! | [`state`] | Admin panel state machines, toasts, and page navigation |

pub mod state;
pub mod viewer;
