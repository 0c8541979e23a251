//! # Ordenes client
//!
//! Terminal client for the ordenes API. Three views — register, login,
//! pedidos — with the logged-in customer and an optional API base
//! override persisted as JSON under the user's config directory
//! (`ORDENES_SESSION_FILE` overrides the location).
pub mod api;
pub mod session;
pub mod views;
