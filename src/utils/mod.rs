pub mod join_code;
pub mod jwt;
pub mod password;

pub use join_code::{generate_unique_join_code, validate_join_code};
pub use jwt::*;
pub use password::*;
