//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Registration and login with email and password
//! - JWT session token issuance and validation
//! - Forgot/reset password with emailed single-use tokens
//! - AuthedUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod models;
pub mod password;
pub mod routes;
pub mod services;
pub mod validators;


pub use extractors::AuthedUser;
pub use routes::auth_routes;
