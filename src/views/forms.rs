//! Signup and login forms.
//!
//! Only superficial checks run here: required fields, e-mail shape, CPF digit
//! count and password confirmation. The backend stays the authority.

use crate::models::{RegisterRequest, Role, User};
use crate::navigation::{Navigator, Route};
use crate::services::UserService;
use crate::session::SessionManager;
use crate::types::{AppError, AppResult};
use rust_decimal::Decimal;
use std::borrow::Cow;
use tracing::info;
use validator::{Validate, ValidationError, ValidationErrors};

const CPF_DIGITS: usize = 11;

#[derive(Debug, Clone, Validate)]
pub struct SignupForm {
    #[validate(length(min = 1, message = "Informe seu nome."))]
    pub name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(custom(function = "validate_cpf"))]
    pub cpf: String,
    pub phone: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
}

impl SignupForm {
    /// Copy with surrounding whitespace removed from the text fields. Passwords
    /// are kept as typed.
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            cpf: self.cpf.trim().to_string(),
            phone: self.phone.trim().to_string(),
            ..self.clone()
        }
    }

    pub fn check(&self) -> AppResult<()> {
        let mut messages = match self.trimmed().validate() {
            Ok(()) => Vec::new(),
            Err(errors) => error_messages(&errors, None),
        };
        if self.password != self.confirm_password {
            messages.push("As senhas não conferem.".to_string());
        }

        if messages.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(messages.join(" ")))
        }
    }

    pub fn to_request(&self) -> AppResult<RegisterRequest> {
        self.check()?;
        let form = self.trimmed();
        Ok(RegisterRequest {
            name: form.name,
            email: form.email,
            cpf: form.cpf,
            phone: form.phone,
            password: form.password,
            confirm_password: form.confirm_password,
            role: form.role,
        })
    }

    /// Registers the account and sends the user to the login page.
    pub async fn submit(&self, users: &UserService, navigator: &dyn Navigator) -> AppResult<()> {
        let request = self.to_request()?;
        users.register(&request).await?;
        info!(role = %self.role, "Signup completed");
        navigator.navigate(Route::Login);
        Ok(())
    }
}

#[derive(Debug, Clone, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Informe seu CPF."))]
    pub cpf: String,
    #[validate(length(min = 1, message = "Informe sua senha."))]
    pub password: String,
}

impl LoginForm {
    pub fn check(&self) -> AppResult<()> {
        let form = LoginForm {
            cpf: self.cpf.trim().to_string(),
            password: self.password.clone(),
        };
        form.validate()
            .map_err(|errors| AppError::Validation(error_messages(&errors, None).join(" ")))
    }

    pub async fn submit(&self, sessions: &SessionManager) -> AppResult<User> {
        self.check()?;
        sessions.login(self.cpf.trim(), &self.password).await
    }
}

pub(crate) fn digits(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn validate_cpf(value: &str) -> Result<(), ValidationError> {
    if digits(value).len() == CPF_DIGITS {
        Ok(())
    } else {
        Err(ValidationError::new("cpf")
            .with_message(Cow::Borrowed("O CPF deve ter 11 dígitos.")))
    }
}

pub(crate) fn positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value > Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::new("positive")
            .with_message(Cow::Borrowed("O valor deve ser maior que zero.")))
    }
}

/// Flattens field errors into sorted messages, optionally only for `fields`.
pub(crate) fn error_messages(errors: &ValidationErrors, fields: Option<&[&str]>) -> Vec<String> {
    let mut messages = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        let name: &str = &field;
        if fields.is_some_and(|wanted| !wanted.contains(&name)) {
            continue;
        }
        for error in field_errors.iter() {
            messages.push(match &error.message {
                Some(message) => message.to_string(),
                None => format!("Campo inválido: {}", name),
            });
        }
    }
    messages.sort();
    messages
}
