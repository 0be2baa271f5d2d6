//! User-facing error text.
//!
//! Every screen and CLI command turns an [`AppError`] into Portuguese through
//! [`user_message`], so wording stays in one place.

use crate::types::{AppError, FailureKind};

const INVALID_DATA: &str = "Dados inválidos. Verifique as informações e tente novamente.";
const INVALID_CREDENTIALS: &str = "CPF ou senha incorretos.";
const SESSION_EXPIRED: &str = "Sua sessão expirou. Faça login novamente.";
const NOT_LOGGED_IN: &str = "Você precisa estar logado para acessar esta página.";
const NOT_FOUND: &str = "Recurso não encontrado.";
const DUPLICATE_USER: &str = "Usuário já cadastrado com este CPF ou e-mail.";
const SERVER_ERROR: &str = "Erro interno do servidor. Tente novamente mais tarde.";
const TIMEOUT: &str = "O servidor demorou demais para responder. Tente novamente.";
const CONNECTIVITY: &str =
    "Não foi possível conectar ao servidor. Verifique sua conexão ou se o servidor permite requisições (CORS).";
const CLIENT_ERROR: &str = "Erro ao preparar a requisição. Tente novamente.";

/// Translates `error` into a message for the user. `action` completes the
/// generic fallback, e.g. `"carregar o saldo"` gives
/// "Erro ao carregar o saldo (código 418)."
pub fn user_message(error: &AppError, action: &str) -> String {
    match error {
        AppError::Validation(message) if !message.trim().is_empty() => {
            format!("{} {}", INVALID_DATA, message)
        }
        AppError::Validation(_) => INVALID_DATA.to_string(),
        AppError::InvalidCredentials => INVALID_CREDENTIALS.to_string(),
        AppError::Unauthorized => SESSION_EXPIRED.to_string(),
        AppError::Unauthenticated => NOT_LOGGED_IN.to_string(),
        AppError::NotFound(_) => NOT_FOUND.to_string(),
        AppError::DuplicateUser => DUPLICATE_USER.to_string(),
        AppError::Payment(message) => format!("Falha no pagamento: {}", message),
        AppError::Timeout => TIMEOUT.to_string(),
        AppError::Http { status, message } => status_message(*status, message.as_deref(), action),
        AppError::Decode(_) => format!("Resposta inesperada do servidor ao {}.", action),
        AppError::Session(_) => format!("Não foi possível acessar a sessão local ao {}.", action),
        other => match other.kind() {
            FailureKind::NoResponse => CONNECTIVITY.to_string(),
            _ => CLIENT_ERROR.to_string(),
        },
    }
}

fn status_message(status: u16, message: Option<&str>, action: &str) -> String {
    match status {
        400 => INVALID_DATA.to_string(),
        401 => INVALID_CREDENTIALS.to_string(),
        404 => NOT_FOUND.to_string(),
        409 => DUPLICATE_USER.to_string(),
        500 => SERVER_ERROR.to_string(),
        _ => match message {
            Some(m) if !m.trim().is_empty() => m.to_string(),
            _ => format!("Erro ao {} (código {}).", action, status),
        },
    }
}
