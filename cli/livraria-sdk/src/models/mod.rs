pub mod browser;
pub mod credentials;
pub mod favorites;
pub mod search;
pub mod session;
