//! Storyboard: per-page illustration of assistant storyboard messages.
//!
//! ARCHITECTURE
//! ============
//! - `illustration`: client-side page illustration manager (state machine,
//!   auto-trigger, editing, version history, view projection).
//! - `imagegen`: image provider adapter used by the backend.
//! - `routes` / `state`: the `/generate_image` HTTP backend.
//! - `wire`: JSON shapes shared by both sides of `/generate_image`.

pub mod illustration;
pub mod imagegen;
pub mod routes;
pub mod state;
pub mod wire;
