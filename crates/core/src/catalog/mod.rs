//! Client for the remote catalog/playback service.
//!
//! The service is an external collaborator: this module only defines the
//! domain types, the [`CatalogClient`] seam the pipeline consumes, and a
//! web API implementation with an explicit bearer session.

mod error;
mod session;
mod traits;
mod types;
mod web;

pub use error::CatalogError;
pub use session::{Credentials, Session};
pub use traits::CatalogClient;
pub use types::{Album, Artist, Device, Image, Page, PlaybackState, PlaylistItem, Track};
pub use web::{CatalogConfig, WebCatalogClient};
