//! Resolve "is this channel live, and which URL should playback use" against
//! a set of live-streaming platforms with heterogeneous payload shapes.
//!
//! Callers hand a platform's already-fetched JSON payload plus a requested
//! quality to [`Resolver::resolve`] (or to the per-platform functions under
//! [`resolver::platforms`]) and get back a canonical [`StreamResult`].

pub mod media;
pub mod resolver;

pub use media::StreamResult;
pub use resolver::error::ResolverError;
pub use resolver::{Platform, Resolver};
