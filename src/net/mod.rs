//! Networking modules for the preparedness REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` wraps the HTTP endpoints the client calls and `types` defines the
//! wire schema shared with the backend.

pub mod api;
pub mod types;
