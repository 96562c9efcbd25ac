mod connection_uri;
mod pagination;
mod pool_settings;
mod secret;

pub use connection_uri::ConnectionUri;
pub use pagination::PaginationSettings;
pub use pool_settings::PoolSettings;
pub use secret::Secret;
