//! # Users Module
//!
//! Profile lookup and the paginated user listing. Every user leaving this
//! module has its password hash cleared.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

#[cfg(test)]
mod tests;

pub use models::User;
pub use routes::users_routes;
