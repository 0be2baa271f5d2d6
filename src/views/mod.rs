//! Views Module
//!
//! Headless page state. Each view loads what its page shows through the
//! resource services and exposes the derived numbers the page renders, so the
//! CLI and tests drive the same logic.

pub mod dashboard;
pub mod forms;
pub mod loan_request;
pub mod payments;
pub mod statement;
pub mod wallet;

pub use dashboard::{BorrowerDashboard, ProposalProgress};
pub use forms::{LoginForm, SignupForm};
pub use loan_request::{LoanRequestDraft, LoanRequestWizard, WizardStep};
pub use payments::PaymentsView;
pub use statement::InvestorStatement;
pub use wallet::{BalanceState, WalletView};

use rust_decimal::Decimal;

/// Formats an amount as Brazilian reais, e.g. `R$ 1.234,56`.
pub fn format_brl(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let text = format!("{:.2}", rounded.abs());
    let (units, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, digit) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{}R$ {},{}", sign, grouped, cents)
}

/// Share of `requested` already funded, in percent, clamped to `0..=100`.
pub fn progress_percent(funded: Decimal, requested: Decimal) -> Decimal {
    if requested <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (funded / requested * Decimal::ONE_HUNDRED)
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
        .round_dp(2)
}
