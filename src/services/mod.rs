pub mod auth_service;
pub mod draw_service;
pub mod giveaway_service;

pub use auth_service::*;
pub use draw_service::*;
pub use giveaway_service::*;
