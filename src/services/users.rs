use crate::http::ApiClient;
use crate::models::{LoginRequest, LoginResponse, RegisterRequest, User, UserUpdate};
use crate::types::{AppError, AppResult};
use tracing::info;

#[derive(Clone)]
pub struct UserService {
    client: ApiClient,
}

impl UserService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn authenticate(&self, cpf: &str, password: &str) -> AppResult<LoginResponse> {
        let request = LoginRequest {
            cpf: cpf.to_string(),
            password: password.to_string(),
        };

        let response: LoginResponse = self
            .client
            .post("/api/auth/login", &request)
            .await
            .map_err(|e| match e {
                AppError::Unauthorized => AppError::InvalidCredentials,
                other => other.remap(|status, _| (status == 404).then_some(AppError::InvalidCredentials)),
            })?;

        info!(user_id = response.user.id, role = %response.user.role, "Authenticated");
        Ok(response)
    }

    pub async fn register(&self, request: &RegisterRequest) -> AppResult<()> {
        self.client
            .post_unit("/api/usuarios", request)
            .await
            .map_err(|e| {
                e.remap(|status, message| match status {
                    400 => Some(AppError::Validation(
                        message.unwrap_or_else(|| "invalid signup data".to_string()),
                    )),
                    409 => Some(AppError::DuplicateUser),
                    _ => None,
                })
            })?;

        info!(role = %request.role, "Registered new user");
        Ok(())
    }

    pub async fn fetch_user_by_id(&self, id: i64) -> AppResult<User> {
        self.client
            .get(&format!("/api/usuarios/{}", id))
            .await
            .map_err(|e| not_found(e, format!("user {}", id)))
    }

    /// Looks a user up by CPF through the `/usuarios/cpf/:cpf` rewrite.
    pub async fn fetch_user_by_document(&self, cpf: &str) -> AppResult<User> {
        let digits: String = cpf.chars().filter(|c| c.is_ascii_digit()).collect();
        self.client
            .get(&format!("/usuarios/cpf/{}", digits))
            .await
            .map_err(|e| not_found(e, format!("user with CPF {}", cpf)))
    }

    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> AppResult<User> {
        if update.is_empty() {
            return Err(AppError::Validation("nothing to update".to_string()));
        }

        self.client
            .put(&format!("/api/usuarios/{}", id), update)
            .await
            .map_err(|e| {
                e.remap(|status, message| match status {
                    400 => Some(AppError::Validation(
                        message.unwrap_or_else(|| "invalid profile data".to_string()),
                    )),
                    404 => Some(AppError::NotFound(format!("user {}", id))),
                    _ => None,
                })
            })
    }
}

pub(crate) fn not_found(error: AppError, what: String) -> AppError {
    error.remap(|status, _| (status == 404).then(|| AppError::NotFound(what)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::client::testing::*;
    use crate::models::Role;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_authenticate_sends_cpf_and_senha() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/auth/login")
            .match_body(Matcher::Json(json!({ "cpf": "123.456.789-00", "senha": "s3gr3do" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "token": "abc",
                    "usuario": {
                        "id": 1, "nome": "Maria", "email": "m@example.com",
                        "cpf": "123.456.789-00", "tipo": "TOMADOR"
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let h = harness(&server.url());
        let users = UserService::new(h.client);
        let response = users.authenticate("123.456.789-00", "s3gr3do").await.unwrap();

        assert_eq!(response.token, "abc");
        assert_eq!(response.user.role, Role::Borrower);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_authenticate_maps_401_and_404_to_invalid_credentials() {
        for status in [401, 404] {
            let mut server = mockito::Server::new_async().await;
            server
                .mock("POST", "/api/auth/login")
                .with_status(status)
                .create_async()
                .await;

            let h = harness(&server.url());
            let result = UserService::new(h.client).authenticate("1", "x").await;
            assert!(matches!(result, Err(AppError::InvalidCredentials)), "status {}", status);
        }
    }

    #[tokio::test]
    async fn test_authenticate_keeps_server_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/auth/login")
            .with_status(500)
            .create_async()
            .await;

        let h = harness(&server.url());
        let result = UserService::new(h.client).authenticate("1", "x").await;
        assert!(matches!(result, Err(AppError::Http { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_register_maps_conflict_and_validation() {
        let request = RegisterRequest {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            cpf: "111.222.333-44".into(),
            phone: "11911112222".into(),
            password: "segredo".into(),
            confirm_password: "segredo".into(),
            role: Role::Investor,
        };

        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/usuarios")
            .match_body(Matcher::PartialJson(json!({ "tipo": "INVESTIDOR", "confirmarSenha": "segredo" })))
            .with_status(409)
            .create_async()
            .await;
        let h = harness(&server.url());
        let result = UserService::new(h.client).register(&request).await;
        assert!(matches!(result, Err(AppError::DuplicateUser)));

        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/usuarios")
            .with_status(400)
            .with_body(r#"{"message": "email inválido"}"#)
            .create_async()
            .await;
        let h = harness(&server.url());
        let result = UserService::new(h.client).register(&request).await;
        match result {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "email inválido"),
            other => panic!("unexpected: {:?}", other),
        }

        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/usuarios")
            .with_status(201)
            .create_async()
            .await;
        let h = harness(&server.url());
        UserService::new(h.client).register(&request).await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_user_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/usuarios/99")
            .with_status(404)
            .create_async()
            .await;

        let h = harness(&server.url());
        let result = UserService::new(h.client).fetch_user_by_id(99).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_fetch_user_by_document_strips_punctuation() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/usuarios/cpf/12345678900")
            .with_status(200)
            .with_body(
                json!({
                    "id": 1, "nome": "Maria", "email": "m@example.com",
                    "cpf": "123.456.789-00", "tipo": "INVESTIDOR"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let h = harness(&server.url());
        let user = UserService::new(h.client)
            .fetch_user_by_document("123.456.789-00")
            .await
            .unwrap();
        assert_eq!(user.role, Role::Investor);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_user_puts_only_given_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/usuarios/1")
            .match_body(Matcher::Json(json!({ "nome": "Maria S." })))
            .with_status(200)
            .with_body(
                json!({
                    "id": 1, "nome": "Maria S.", "email": "m@example.com",
                    "cpf": "123.456.789-00", "tipo": "TOMADOR"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let h = harness(&server.url());
        let users = UserService::new(h.client);
        let update = UserUpdate {
            name: Some("Maria S.".into()),
            ..Default::default()
        };
        let user = users.update_user(1, &update).await.unwrap();
        assert_eq!(user.name, "Maria S.");
        mock.assert_async().await;

        let empty = users.update_user(1, &UserUpdate::default()).await;
        assert!(matches!(empty, Err(AppError::Validation(_))));
    }
}
