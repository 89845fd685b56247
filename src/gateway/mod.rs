// ABOUTME: Hosting service gateway: the contract and its Netlify REST implementation.
// ABOUTME: Exports HostingGateway, NetlifyGateway, and the shared data and error types.

mod error;
mod netlify;
mod traits;
mod types;

pub use error::{GatewayError, TransportError};
pub use netlify::{DEFAULT_API_URL, NetlifyGateway};
pub use traits::HostingGateway;
pub use types::{Deploy, DeployState, FileRecord, Site};
