pub mod auth_handlers;
pub mod email;
