pub mod auth;
pub mod giveaway;

pub use auth::auth_config;
pub use giveaway::giveaway_config;
