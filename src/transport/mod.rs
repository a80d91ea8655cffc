pub mod upstream_client;

pub use upstream_client::{sanitize_upstream_error, UpstreamClient, UpstreamStream};
