use super::progress_percent;
use super::wallet::{load_balance_state, BalanceState};
use crate::models::Proposal;
use crate::services::Api;
use crate::types::AppResult;
use rust_decimal::Decimal;
use tracing::debug;

/// One proposal row with its funding progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposalProgress {
    pub proposal: Proposal,
    pub percent: Decimal,
}

impl From<Proposal> for ProposalProgress {
    fn from(proposal: Proposal) -> Self {
        let percent = progress_percent(proposal.funded_amount, proposal.requested_amount);
        Self { proposal, percent }
    }
}

/// Borrower home page: own proposals plus balance.
#[derive(Debug, Clone)]
pub struct BorrowerDashboard {
    pub proposals: Vec<ProposalProgress>,
    pub balance: BalanceState,
}

impl BorrowerDashboard {
    /// Proposals and balance are independent, so both requests go out together.
    pub async fn load(api: &Api, user_id: i64) -> AppResult<Self> {
        let (proposals, balance) = futures::join!(
            api.proposals.list_proposals_by_user(user_id),
            load_balance_state(&api.balance, user_id),
        );

        let proposals: Vec<ProposalProgress> =
            proposals?.into_iter().map(ProposalProgress::from).collect();
        debug!(user_id, count = proposals.len(), "Dashboard loaded");

        Ok(Self {
            proposals,
            balance: balance?,
        })
    }

    pub fn total_requested(&self) -> Decimal {
        self.proposals
            .iter()
            .map(|p| p.proposal.requested_amount)
            .sum()
    }

    pub fn total_funded(&self) -> Decimal {
        self.proposals.iter().map(|p| p.proposal.funded_amount).sum()
    }
}
