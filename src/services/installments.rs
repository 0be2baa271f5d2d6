use super::users::not_found;
use crate::http::ApiClient;
use crate::models::{Document, Installment, PayInstallment};
use crate::types::{AppError, AppResult};
use tracing::info;

#[derive(Clone)]
pub struct InstallmentService {
    client: ApiClient,
}

impl InstallmentService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list_installments_by_debt(&self, debt_id: i64) -> AppResult<Vec<Installment>> {
        self.client
            .get(&format!("/api/parcelas/divida/{}", debt_id))
            .await
    }

    /// Requests payment of one installment and returns the backend's confirmation.
    pub async fn pay_installment(&self, installment_id: i64, payer_id: i64) -> AppResult<String> {
        let confirmation = self
            .client
            .put_text(
                &format!("/api/parcelas/{}/pagar", installment_id),
                &PayInstallment { payer_id },
            )
            .await
            .map_err(|e| match e {
                AppError::Http { status, message } => AppError::Payment(
                    message.unwrap_or_else(|| format!("payment rejected with status {}", status)),
                ),
                other => other,
            })?;

        info!(installment_id, payer_id, "Installment paid");
        Ok(confirmation)
    }

    pub async fn generate_boleto(&self, installment_id: i64) -> AppResult<Document> {
        self.client
            .get_document(
                &format!("/api/parcelas/{}/boleto", installment_id),
                &format!("boleto-parcela-{}.pdf", installment_id),
            )
            .await
            .map_err(|e| not_found(e, format!("boleto for installment {}", installment_id)))
    }
}
