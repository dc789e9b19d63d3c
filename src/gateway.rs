pub mod client;
pub mod credentials;
pub mod resource;

pub use client::{GatewayClient, GatewayClientRequest};
pub use credentials::{CredentialSource, StaticCredentials};
pub use resource::{HttpRoute, RouteSpecPatch};
