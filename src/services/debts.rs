use super::users::not_found;
use crate::http::ApiClient;
use crate::models::Debt;
use crate::types::AppResult;

#[derive(Clone)]
pub struct DebtService {
    client: ApiClient,
}

impl DebtService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn fetch_debt(&self, id: i64) -> AppResult<Debt> {
        self.client
            .get(&format!("/api/dividas/{}", id))
            .await
            .map_err(|e| not_found(e, format!("debt {}", id)))
    }

    pub async fn list_debts_by_borrower(&self, borrower_id: i64) -> AppResult<Vec<Debt>> {
        self.client
            .get(&format!("/api/dividas/tomador/{}", borrower_id))
            .await
    }
}
