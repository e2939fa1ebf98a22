//! Studio member directory: faceted browsing, safe bio rendering, and
//! guarded outbound link dispatch.
//!
//! The library core is synchronous and event-driven; the optional `web`
//! feature serves the directory over HTTP and the `cli` feature exposes it
//! on the command line.

pub mod bio;
pub mod config;
pub mod error;
pub mod filter;
pub mod links;
pub mod model;

#[cfg(feature = "web")]
pub mod web;

pub use config::{AppConfig, SiteConfig, UiText, Whitelist};
pub use error::{Result, RosterError};
pub use filter::{Facet, FacetSelection, visible_members};
pub use links::{DispatchState, HostContext, LinkDispatcher, is_trusted};
pub use model::{Member, Roster, Taxonomy};
