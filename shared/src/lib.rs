pub mod countries;
pub mod models;
pub mod utils;

pub use countries::COUNTRIES;
pub use models::{Country, Product, Step, Strategy};
