mod catalog_client;
mod credentials;
mod logger;

pub use catalog_client::*;
pub use credentials::*;
pub use logger::*;
