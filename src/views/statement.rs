use crate::models::Investment;
use crate::services::InvestmentService;
use crate::types::AppResult;
use rust_decimal::Decimal;

/// Investor statement: every investment with running totals.
#[derive(Debug, Clone)]
pub struct InvestorStatement {
    pub investments: Vec<Investment>,
}

impl InvestorStatement {
    pub async fn load(service: &InvestmentService, investor_id: i64) -> AppResult<Self> {
        let investments = service.list_investments_by_investor(investor_id).await?;
        Ok(Self { investments })
    }

    pub fn total_invested(&self) -> Decimal {
        self.investments.iter().map(|i| i.amount).sum()
    }

    pub fn total_expected_yield(&self) -> Decimal {
        self.investments.iter().map(|i| i.expected_yield).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.investments.is_empty()
    }
}
