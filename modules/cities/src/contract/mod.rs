pub mod client;
pub mod error;
pub mod model;

pub use client::CitiesApi;
pub use error::CitiesError;
pub use model::{City, CityFilter, CityUpdate};
