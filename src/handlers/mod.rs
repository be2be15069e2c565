pub mod admin;
pub mod auth;
pub mod booking;
pub mod user;

pub use admin::admin_config;
pub use auth::auth_config;
pub use booking::{bookings_config, dates_config};
pub use user::user_config;
