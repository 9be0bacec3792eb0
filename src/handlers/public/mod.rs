// handlers/public - endpoints that need no token

pub mod auth;
pub mod content;
pub mod health;
pub mod subscribe;
