pub mod schema;
pub mod summary;
pub mod variant;
