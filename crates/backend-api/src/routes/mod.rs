pub mod auth;
pub mod health;
pub mod messages;
pub mod notifications;
pub mod profile;
pub mod servers;
pub mod stream;
pub mod themes;
pub mod users;
