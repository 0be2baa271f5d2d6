use crate::models::{Document, Installment, InstallmentStatus};
use crate::services::InstallmentService;
use crate::types::{AppError, AppResult};
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};

/// Installments of one debt, paid by `payer_id`.
///
/// The debt id is always supplied by the caller.
pub struct PaymentsView {
    service: InstallmentService,
    debt_id: i64,
    payer_id: i64,
    installments: Vec<Installment>,
}

impl PaymentsView {
    pub async fn load(service: InstallmentService, debt_id: i64, payer_id: i64) -> AppResult<Self> {
        let installments = service.list_installments_by_debt(debt_id).await?;
        Ok(Self {
            service,
            debt_id,
            payer_id,
            installments,
        })
    }

    pub fn debt_id(&self) -> i64 {
        self.debt_id
    }

    pub fn installments(&self) -> &[Installment] {
        &self.installments
    }

    /// Earliest installment still owed.
    pub fn next_due(&self) -> Option<&Installment> {
        self.installments
            .iter()
            .filter(|i| i.status.is_outstanding())
            .min_by_key(|i| (i.due_date, i.number))
    }

    pub fn total_paid(&self) -> Decimal {
        self.sum_where(|status| !status.is_outstanding())
    }

    pub fn total_outstanding(&self) -> Decimal {
        self.sum_where(|status| status.is_outstanding())
    }

    fn sum_where(&self, keep: impl Fn(InstallmentStatus) -> bool) -> Decimal {
        self.installments
            .iter()
            .filter(|i| keep(i.status))
            .map(|i| i.amount)
            .sum()
    }

    /// Pays one installment, then re-reads the list so the view shows the
    /// backend's state.
    ///
    /// Once the backend accepts the payment the confirmation is returned even if
    /// the re-read fails; the row is then marked paid locally.
    pub async fn pay(&mut self, installment_id: i64) -> AppResult<String> {
        let installment = self
            .installments
            .iter()
            .find(|i| i.id == installment_id)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "installment {} in debt {}",
                    installment_id, self.debt_id
                ))
            })?;
        if !installment.status.is_outstanding() {
            return Err(AppError::Validation(format!(
                "A parcela {} já está paga.",
                installment.number
            )));
        }

        let confirmation = self
            .service
            .pay_installment(installment_id, self.payer_id)
            .await?;
        match self.reload().await {
            Ok(()) => {
                info!(debt_id = self.debt_id, installment_id, "Payments view refreshed after payment")
            }
            Err(e) => {
                warn!(
                    debt_id = self.debt_id,
                    installment_id,
                    error = %e,
                    "Payment accepted but installments could not be reloaded"
                );
                self.mark_paid(installment_id);
            }
        }

        Ok(confirmation)
    }

    fn mark_paid(&mut self, installment_id: i64) {
        if let Some(row) = self.installments.iter_mut().find(|i| i.id == installment_id) {
            row.status = InstallmentStatus::Paid;
            row.paid_at = Some(Utc::now().date_naive());
        }
    }

    pub async fn reload(&mut self) -> AppResult<()> {
        self.installments = self.service.list_installments_by_debt(self.debt_id).await?;
        Ok(())
    }

    pub async fn boleto(&self, installment_id: i64) -> AppResult<Document> {
        self.service.generate_boleto(installment_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::client::testing::*;
    use crate::models::Role;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn installment(id: i64, due: &str, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "dividaId": 4,
            "numero": id,
            "valor": 1000,
            "dataVencimento": due,
            "status": status
        })
    }

    #[tokio::test]
    async fn test_next_due_and_totals() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/parcelas/divida/4")
            .with_status(200)
            .with_body(
                json!([
                    installment(1, "2025-01-10", "PAID"),
                    installment(3, "2025-03-10", "PENDING"),
                    installment(2, "2025-02-10", "OVERDUE")
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let h = logged_in(&server.url(), "abc", Role::Borrower);
        let view = PaymentsView::load(InstallmentService::new(h.client), 4, 1)
            .await
            .unwrap();

        let next = view.next_due().unwrap();
        assert_eq!(next.id, 2);
        assert_eq!(next.due_date, NaiveDate::from_ymd_opt(2025, 2, 10).unwrap());
        assert_eq!(view.total_paid(), dec!(1000));
        assert_eq!(view.total_outstanding(), dec!(2000));
    }

    #[tokio::test]
    async fn test_pay_rereads_installments() {
        let mut server = mockito::Server::new_async().await;
        let list = server
            .mock("GET", "/api/parcelas/divida/4")
            .with_status(200)
            .with_body(json!([installment(1, "2025-01-10", "PENDING")]).to_string())
            .expect(2)
            .create_async()
            .await;
        let pay = server
            .mock("PUT", "/api/parcelas/1/pagar")
            .with_status(200)
            .with_body("Parcela paga com sucesso")
            .create_async()
            .await;

        let h = logged_in(&server.url(), "abc", Role::Borrower);
        let mut view = PaymentsView::load(InstallmentService::new(h.client), 4, 1)
            .await
            .unwrap();

        let confirmation = view.pay(1).await.unwrap();
        assert_eq!(confirmation, "Parcela paga com sucesso");
        pay.assert_async().await;
        list.assert_async().await;
    }

    #[tokio::test]
    async fn test_accepted_payment_survives_failed_reload() {
        let mut server = mockito::Server::new_async().await;
        let pay = server
            .mock("PUT", "/api/parcelas/1/pagar")
            .with_status(200)
            .with_body("Parcela paga com sucesso")
            .create_async()
            .await;
        server
            .mock("GET", "/api/parcelas/divida/4")
            .with_status(503)
            .create_async()
            .await;

        let h = logged_in(&server.url(), "abc", Role::Borrower);
        let pending: Installment =
            serde_json::from_value(installment(1, "2025-01-10", "PENDING")).unwrap();
        let mut view = PaymentsView {
            service: InstallmentService::new(h.client),
            debt_id: 4,
            payer_id: 1,
            installments: vec![pending],
        };

        let confirmation = view.pay(1).await.unwrap();
        assert_eq!(confirmation, "Parcela paga com sucesso");
        assert_eq!(view.installments()[0].status, InstallmentStatus::Paid);
        assert!(view.installments()[0].paid_at.is_some());
        assert!(view.next_due().is_none());
        pay.assert_async().await;
    }

    #[tokio::test]
    async fn test_pay_rejects_unknown_and_paid() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/parcelas/divida/4")
            .with_status(200)
            .with_body(json!([installment(1, "2025-01-10", "PAID")]).to_string())
            .create_async()
            .await;

        let h = logged_in(&server.url(), "abc", Role::Borrower);
        let mut view = PaymentsView::load(InstallmentService::new(h.client), 4, 1)
            .await
            .unwrap();

        assert!(view.next_due().is_none());
        assert!(matches!(view.pay(9).await, Err(AppError::NotFound(_))));
        assert!(matches!(view.pay(1).await, Err(AppError::Validation(_))));
    }
}
