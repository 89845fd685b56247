// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Site/deploy IDs and site-relative destination paths.

mod id;
mod site_path;

pub use id::{DeployId, DeployResource, Id, Resource, SiteId, SiteResource};
pub use site_path::{SitePath, SitePathError, clean_path};
