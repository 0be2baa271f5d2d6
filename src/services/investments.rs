use crate::http::ApiClient;
use crate::models::{Investment, NewInvestment};
use crate::types::{AppError, AppResult};
use rust_decimal::Decimal;
use tracing::info;

#[derive(Clone)]
pub struct InvestmentService {
    client: ApiClient,
}

impl InvestmentService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list_investments_by_investor(&self, investor_id: i64) -> AppResult<Vec<Investment>> {
        self.client
            .get(&format!("/api/investimentos/investidor/{}", investor_id))
            .await
    }

    /// Commits funds to a proposal.
    pub async fn invest(&self, investment: &NewInvestment) -> AppResult<Investment> {
        if investment.amount <= Decimal::ZERO {
            return Err(AppError::Validation("amount must be positive".to_string()));
        }

        let created: Investment = self
            .client
            .post("/api/investimentos", investment)
            .await
            .map_err(|e| {
                e.remap(|status, message| {
                    (status == 400).then(|| {
                        AppError::Validation(
                            message.unwrap_or_else(|| "investment rejected".to_string()),
                        )
                    })
                })
            })?;

        info!(
            investment_id = created.id,
            proposal_id = created.proposal_id,
            amount = %created.amount,
            "Investment created"
        );
        Ok(created)
    }
}
