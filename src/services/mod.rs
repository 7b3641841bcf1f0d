// src/services/mod.rs
//
// Shared services that sit outside any single feature module

pub mod email;

pub use email::{EmailService, LogMailer, Mailer, SmtpMailer};
