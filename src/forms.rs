//! Form payloads and their validation rules.
//!
//! Each form deserializes from an urlencoded body with serde and exposes
//! `validate()`, returning per-field messages that the page template renders
//! next to the form. Handlers only touch the database once validation passes.

use serde::Deserialize;

pub const GENDER_CHOICES: &[&str] = &["male", "female"];

pub const AGE_BRACKET_CHOICES: &[&str] = &[
    "below 19",
    "between 19 to 28",
    "between 28 to 38",
    "more than 38",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub gender: String,
    pub age: String,
    pub profession: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        }
        let email = self.email.trim();
        if email.is_empty() {
            errors.push(FieldError::new("email", "Email is required"));
        } else if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            errors.push(FieldError::new("email", "Enter a valid email address"));
        }
        if !GENDER_CHOICES.contains(&self.gender.as_str()) {
            errors.push(FieldError::new("gender", "Select a gender"));
        }
        if !AGE_BRACKET_CHOICES.contains(&self.age.as_str()) {
            errors.push(FieldError::new("age", "Select an age bracket"));
        }
        if self.profession.trim().is_empty() {
            errors.push(FieldError::new("profession", "Profession is required"));
        }
        if self.password.is_empty() {
            errors.push(FieldError::new("password", "Password is required"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.email.trim().is_empty() {
            errors.push(FieldError::new("email", "Email is required"));
        }
        if self.password.is_empty() {
            errors.push(FieldError::new("password", "Password is required"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// The non-file part of the admin upload form. Files arrive as multipart
/// parts and are validated by the upload handler.
#[derive(Debug, Clone, Default)]
pub struct NewPostForm {
    pub question: String,
}

impl NewPostForm {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        if self.question.trim().is_empty() {
            Err(vec![FieldError::new("question", "Question is required")])
        } else {
            Ok(())
        }
    }
}
