// Resource services: one typed wrapper per backend endpoint

pub mod balance;
pub mod debts;
pub mod installments;
pub mod investments;
pub mod proposals;
pub mod users;

pub use balance::BalanceService;
pub use debts::DebtService;
pub use installments::InstallmentService;
pub use investments::InvestmentService;
pub use proposals::ProposalService;
pub use users::UserService;

use crate::http::ApiClient;

/// All resource services over one shared client.
#[derive(Clone)]
pub struct Api {
    pub users: UserService,
    pub proposals: ProposalService,
    pub debts: DebtService,
    pub installments: InstallmentService,
    pub investments: InvestmentService,
    pub balance: BalanceService,
}

impl Api {
    pub fn new(client: ApiClient) -> Self {
        Self {
            users: UserService::new(client.clone()),
            proposals: ProposalService::new(client.clone()),
            debts: DebtService::new(client.clone()),
            installments: InstallmentService::new(client.clone()),
            investments: InvestmentService::new(client.clone()),
            balance: BalanceService::new(client),
        }
    }
}
