pub mod local;

pub use local::CitiesLocalClient;
