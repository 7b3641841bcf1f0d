// src/auth/validators.rs

use super::models::*;
use crate::common::{is_valid_email, ValidationResult, Validator};

pub const MIN_NAME_LENGTH: usize = 2;
pub const MIN_PASSWORD_LENGTH: usize = 6;

// ============================================================================
// Authentication Request Validators
// ============================================================================

pub struct RegisterValidator;

impl Validator<RegisterRequest> for RegisterValidator {
    fn validate(&self, data: &RegisterRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        let name_len = data.name.trim().chars().count();
        if name_len == 0 {
            result.add_error("name", "Name is required");
        } else if name_len < MIN_NAME_LENGTH {
            result.add_error("name", "Name must be at least 2 characters");
        } else if data.name.len() > 255 {
            result.add_error("name", "Name must be less than 255 characters");
        }

        validate_email(&mut result, &data.email);
        validate_new_password(&mut result, &data.password);

        result
    }
}

pub struct LoginValidator;

impl Validator<LoginRequest> for LoginValidator {
    fn validate(&self, data: &LoginRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        validate_email(&mut result, &data.email);

        if data.password.is_empty() {
            result.add_error("password", "Password is required");
        }

        result
    }
}

pub struct ForgotPasswordValidator;

impl Validator<ForgotPasswordRequest> for ForgotPasswordValidator {
    fn validate(&self, data: &ForgotPasswordRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        validate_email(&mut result, &data.email);
        result
    }
}

pub struct ResetPasswordValidator;

impl Validator<ResetPasswordRequest> for ResetPasswordValidator {
    fn validate(&self, data: &ResetPasswordRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.token.trim().is_empty() {
            result.add_error("token", "Token is required");
        }

        validate_new_password(&mut result, &data.password);

        if data.confirm_password.is_empty() {
            result.add_error("confirm_password", "Password confirmation is required");
        } else if data.confirm_password != data.password {
            result.add_error("confirm_password", "Passwords do not match");
        }

        result
    }
}

fn validate_email(result: &mut ValidationResult, email: &str) {
    if email.trim().is_empty() {
        result.add_error("email", "Email is required");
    } else if !is_valid_email(email) {
        result.add_error("email", "Email must be a valid email address");
    }
}

fn validate_new_password(result: &mut ValidationResult, password: &str) {
    if password.is_empty() {
        result.add_error("password", "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LENGTH {
        result.add_error("password", "Password must be at least 6 characters");
    }
}
