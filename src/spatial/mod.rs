//! Spatial collaborator: bodies, region bounds and enter/exit sensing
//!
//! The tracking core only sees [`RegionSignal`]s and the [`SpatialResolver`]
//! trait. Everything else here is one concrete way to produce them.

pub mod region;
pub mod resolver;
pub mod scene;
pub mod sensor;
pub mod sparse_hash;

pub use region::{Region, RegionShape, RegionSignal};
pub use resolver::SpatialResolver;
pub use scene::{Body, Scene};
pub use sensor::ProximitySensor;
pub use sparse_hash::SparseHashGrid;
