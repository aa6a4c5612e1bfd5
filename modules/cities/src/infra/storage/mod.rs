pub mod filter;
pub mod queries;
pub mod schema;

pub use schema::ensure_schema;
