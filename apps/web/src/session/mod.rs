//! Per-tab session state.
//!
//! A [`TabRegistry`] owns one [`Tab`] per browser tab (keyed by cookie); each
//! tab owns a [`store::SessionStore`], its pending toasts, the last search draft and
//! the single-flight guards for upload and search.

pub mod handlers;
pub mod registry;
pub mod store;

pub use registry::{CurrentTab, Flight, Tab, TabRegistry, TabState};
#[cfg(test)]
pub use store::SessionPhase;
