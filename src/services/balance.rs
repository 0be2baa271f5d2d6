use super::users::not_found;
use crate::http::ApiClient;
use crate::models::{Balance, Withdrawal};
use crate::types::{AppError, AppResult};
use rust_decimal::Decimal;
use tracing::info;

#[derive(Clone)]
pub struct BalanceService {
    client: ApiClient,
}

impl BalanceService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fails with `NotFound` when the backend has no balance record for the user yet.
    pub async fn fetch_balance(&self, user_id: i64) -> AppResult<Balance> {
        self.client
            .get(&format!("/api/saldos/usuario/{}", user_id))
            .await
            .map_err(|e| not_found(e, format!("balance of user {}", user_id)))
    }

    /// Asks the backend to withdraw; the backend decides whether funds allow it.
    pub async fn withdraw(&self, user_id: i64, amount: Decimal) -> AppResult<Balance> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation("amount must be positive".to_string()));
        }

        let balance: Balance = self
            .client
            .post(
                &format!("/api/saldos/usuario/{}/saque", user_id),
                &Withdrawal { amount },
            )
            .await
            .map_err(|e| {
                e.remap(|status, message| match status {
                    400 => Some(AppError::Validation(
                        message.unwrap_or_else(|| "withdrawal rejected".to_string()),
                    )),
                    404 => Some(AppError::NotFound(format!("balance of user {}", user_id))),
                    _ => None,
                })
            })?;

        info!(user_id, amount = %amount, remaining = %balance.amount, "Withdrawal completed");
        Ok(balance)
    }
}
