pub mod utils;

mod courses;
