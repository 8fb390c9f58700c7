//! Client-side state containers.
//!
//! DESIGN
//! ======
//! Each store has a single writer (its own methods) and is passed explicitly
//! to whoever reads it. Nothing here is a global.

pub mod household;
pub mod session;
