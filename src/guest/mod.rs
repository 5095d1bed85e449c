pub mod application;
pub mod infrastructure;
