pub mod auth;
pub mod contacts;
pub mod health;
pub mod projects;
pub mod uploads;
