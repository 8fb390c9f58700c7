//! # preparedness
//!
//! Client core for the crisis-preparedness application: session and household
//! state, the REST client, the route table and the navigation guard that
//! decides whether a route change proceeds, redirects, or is blocked.
//!
//! The view layer is not part of this crate. Anything that renders pages
//! drives navigation through [`router::Router`] and reads state from the
//! stores it owns.

pub mod config;
pub mod net;
pub mod role;
pub mod router;
pub mod state;
pub mod storage;
pub mod token;
