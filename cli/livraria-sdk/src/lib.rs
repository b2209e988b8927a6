pub mod livraria;
pub mod models;
pub mod providers;
pub mod utils;

pub use livraria_catalog as catalog;
