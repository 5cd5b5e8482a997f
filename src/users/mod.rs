mod model;
pub mod repo;

pub use model::{Role, User};
