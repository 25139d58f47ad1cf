pub mod courses;
pub mod schema;
pub mod sessions;
pub mod study_types;
pub mod summary;

pub use courses::*;
pub use schema::*;
pub use sessions::*;
pub use study_types::*;
pub use summary::*;
