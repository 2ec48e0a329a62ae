//! Request extractors.
//!
//! - [`actor::Actor`] -- the calling user, from the gateway-set `x-actor-id` header.

pub mod actor;
