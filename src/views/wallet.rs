use super::format_brl;
use crate::models::Balance;
use crate::services::BalanceService;
use crate::types::{AppError, AppResult};
use rust_decimal::Decimal;
use tracing::{info, warn};

/// What the backend knows about a user's balance.
///
/// A missing record is not the same as a zero balance: new accounts have no
/// balance row until the first credit.
#[derive(Debug, Clone, PartialEq)]
pub enum BalanceState {
    Provisioned(Balance),
    NotProvisioned,
}

impl BalanceState {
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            BalanceState::Provisioned(balance) => Some(balance.amount),
            BalanceState::NotProvisioned => None,
        }
    }

    pub fn display(&self) -> String {
        match self {
            BalanceState::Provisioned(balance) => format_brl(balance.amount),
            BalanceState::NotProvisioned => "Saldo não disponível".to_string(),
        }
    }
}

/// Loads the balance, folding a 404 into [`BalanceState::NotProvisioned`].
pub(crate) async fn load_balance_state(
    service: &BalanceService,
    user_id: i64,
) -> AppResult<BalanceState> {
    match service.fetch_balance(user_id).await {
        Ok(balance) => Ok(BalanceState::Provisioned(balance)),
        Err(e) if e.is_not_found() => {
            warn!(user_id, "No balance record for user");
            Ok(BalanceState::NotProvisioned)
        }
        Err(e) => Err(e),
    }
}

pub struct WalletView {
    service: BalanceService,
    user_id: i64,
    state: BalanceState,
}

impl WalletView {
    pub async fn load(service: BalanceService, user_id: i64) -> AppResult<Self> {
        let state = load_balance_state(&service, user_id).await?;
        Ok(Self {
            service,
            user_id,
            state,
        })
    }

    pub fn state(&self) -> &BalanceState {
        &self.state
    }

    /// Withdrawal is offered only for a provisioned, positive balance.
    pub fn can_withdraw(&self) -> bool {
        self.state.amount().is_some_and(|amount| amount > Decimal::ZERO)
    }

    pub async fn withdraw(&mut self, amount: Decimal) -> AppResult<&BalanceState> {
        let available = self.state.amount().ok_or_else(|| {
            AppError::Validation("Saldo ainda não disponível para saque.".to_string())
        })?;
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "O valor do saque deve ser maior que zero.".to_string(),
            ));
        }
        if amount > available {
            return Err(AppError::Validation(format!(
                "Saldo insuficiente: disponível {}.",
                format_brl(available)
            )));
        }

        let balance = self.service.withdraw(self.user_id, amount).await?;
        info!(user_id = self.user_id, amount = %amount, "Wallet withdrawal done");
        self.state = BalanceState::Provisioned(balance);
        Ok(&self.state)
    }

    pub async fn refresh(&mut self) -> AppResult<&BalanceState> {
        self.state = load_balance_state(&self.service, self.user_id).await?;
        Ok(&self.state)
    }
}
