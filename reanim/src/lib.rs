//! Data-driven 2D part ("reanimation") animation runtime.
//!
//! Sparse per-track keyframes are compiled into dense frames once per definition; every tick the
//! engine advances any number of named animations per entity and resolves them into an ordered
//! list of image placements. Rasterization, asset decoding and entity storage stay outside and are
//! reached through [`AssetSource`] and [`ComponentStore`].

#![forbid(unsafe_code)]

mod assets;
mod config;
mod diagnostics;
mod error;
mod ids;
mod model;
mod render;
mod runtime;
mod store;

#[cfg(feature = "json")]
pub mod json;

pub use assets::*;
pub use config::*;
pub use diagnostics::*;
pub use error::*;
pub use ids::{CommandId, EntityId, TrackId};
pub use model::*;
pub use render::*;
pub use runtime::*;
pub use store::*;

#[cfg(test)]
mod test_support;
