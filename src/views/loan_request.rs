//! Three-step loan request: business data, financing terms, review.

use super::forms::{error_messages, positive_amount};
use crate::models::{NewProposal, Proposal};
use crate::services::ProposalService;
use crate::types::{AppError, AppResult};
use rust_decimal::Decimal;
use tracing::info;
use validator::Validate;

pub const MAX_TERM_MONTHS: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Business,
    Financing,
    Review,
}

impl WizardStep {
    fn fields(&self) -> &'static [&'static str] {
        match self {
            WizardStep::Business => &["business_name", "category", "description"],
            WizardStep::Financing => &["amount", "term_months"],
            WizardStep::Review => &[],
        }
    }

    fn next(&self) -> Self {
        match self {
            WizardStep::Business => WizardStep::Financing,
            WizardStep::Financing | WizardStep::Review => WizardStep::Review,
        }
    }

    fn previous(&self) -> Self {
        match self {
            WizardStep::Business | WizardStep::Financing => WizardStep::Business,
            WizardStep::Review => WizardStep::Financing,
        }
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct LoanRequestDraft {
    #[validate(length(min = 1, message = "Informe o nome da empresa."))]
    pub business_name: String,
    #[validate(length(min = 1, message = "Informe a categoria do negócio."))]
    pub category: String,
    #[validate(length(min = 1, message = "Descreva o uso do empréstimo."))]
    pub description: String,
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    #[validate(range(min = 1, max = 120, message = "O prazo deve ser entre 1 e 120 meses."))]
    pub term_months: u32,
}

impl LoanRequestDraft {
    /// Copy with surrounding whitespace removed from the text fields.
    pub fn trimmed(&self) -> Self {
        Self {
            business_name: self.business_name.trim().to_string(),
            category: self.category.trim().to_string(),
            description: self.description.trim().to_string(),
            ..self.clone()
        }
    }
}

pub struct LoanRequestWizard {
    step: WizardStep,
    pub draft: LoanRequestDraft,
}

impl Default for LoanRequestWizard {
    fn default() -> Self {
        Self::new(LoanRequestDraft::default())
    }
}

impl LoanRequestWizard {
    pub fn new(draft: LoanRequestDraft) -> Self {
        Self {
            step: WizardStep::Business,
            draft,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Validates the fields of the current step and advances on success.
    pub fn next(&mut self) -> AppResult<WizardStep> {
        self.check(Some(self.step.fields()))?;
        self.step = self.step.next();
        Ok(self.step)
    }

    pub fn back(&mut self) -> WizardStep {
        self.step = self.step.previous();
        self.step
    }

    fn check(&self, fields: Option<&[&str]>) -> AppResult<()> {
        let Err(errors) = self.draft.trimmed().validate() else {
            return Ok(());
        };
        let messages = error_messages(&errors, fields);
        if messages.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(messages.join(" ")))
        }
    }

    /// Submits from the review step after a final full validation.
    pub async fn submit(&self, proposals: &ProposalService, user_id: i64) -> AppResult<Proposal> {
        if self.step != WizardStep::Review {
            return Err(AppError::Validation(
                "Revise a solicitação antes de enviar.".to_string(),
            ));
        }
        self.check(None)?;

        let draft = self.draft.trimmed();
        let proposal = proposals
            .create_proposal(&NewProposal {
                user_id,
                business_name: draft.business_name,
                category: draft.category,
                description: draft.description,
                requested_amount: draft.amount,
                term_months: draft.term_months,
            })
            .await?;

        info!(proposal_id = proposal.id, "Loan request submitted");
        Ok(proposal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::client::testing::*;
    use crate::models::{ProposalStatus, Role};
    use mockito::Matcher;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn filled() -> LoanRequestDraft {
        LoanRequestDraft {
            business_name: "Padaria Pão Quente".into(),
            category: "Alimentação".into(),
            description: "Forno novo".into(),
            amount: dec!(15000),
            term_months: 12,
        }
    }

    #[test]
    fn test_steps_validate_only_their_fields() {
        let mut wizard = LoanRequestWizard::new(LoanRequestDraft {
            amount: dec!(0),
            term_months: 0,
            ..filled()
        });

        // Financing fields are wrong but the business step passes.
        assert_eq!(wizard.next().unwrap(), WizardStep::Financing);

        match wizard.next() {
            Err(AppError::Validation(msg)) => {
                assert!(msg.contains("maior que zero"));
                assert!(msg.contains("entre 1 e 120"));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(wizard.step(), WizardStep::Financing);

        wizard.draft.amount = dec!(5000);
        wizard.draft.term_months = MAX_TERM_MONTHS + 1;
        assert!(wizard.next().is_err());
        wizard.draft.term_months = MAX_TERM_MONTHS;
        assert_eq!(wizard.next().unwrap(), WizardStep::Review);
        assert_eq!(wizard.back(), WizardStep::Financing);
    }

    #[test]
    fn test_business_step_requires_fields() {
        let mut wizard = LoanRequestWizard::default();
        assert!(matches!(wizard.next(), Err(AppError::Validation(_))));
        assert_eq!(wizard.step(), WizardStep::Business);
    }

    #[test]
    fn test_blank_business_fields_are_rejected() {
        let mut wizard = LoanRequestWizard::new(LoanRequestDraft {
            business_name: "   ".into(),
            description: "\n".into(),
            ..filled()
        });

        match wizard.next() {
            Err(AppError::Validation(msg)) => {
                assert!(msg.contains("nome da empresa"));
                assert!(msg.contains("Descreva"));
                assert!(!msg.contains("categoria"));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(wizard.step(), WizardStep::Business);
    }

    #[tokio::test]
    async fn test_submit_from_review() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/propostas")
            .match_body(Matcher::PartialJson(json!({
                "usuarioId": 1,
                "nomeEmpresa": "Padaria Pão Quente",
                "prazoMeses": 12
            })))
            .with_status(201)
            .with_body(
                json!({
                    "id": 10, "nomeEmpresa": "Padaria Pão Quente", "categoria": "Alimentação",
                    "descricao": "Forno novo", "valorSolicitado": 15000, "prazoMeses": 12,
                    "status": "UNDER_REVIEW", "usuarioId": 1
                })
                .to_string(),
            )
            .create_async()
            .await;

        let h = logged_in(&server.url(), "abc", Role::Borrower);
        let proposals = ProposalService::new(h.client);
        let mut wizard = LoanRequestWizard::new(filled());

        assert!(wizard.submit(&proposals, 1).await.is_err());

        wizard.next().unwrap();
        wizard.next().unwrap();
        let proposal = wizard.submit(&proposals, 1).await.unwrap();
        assert_eq!(proposal.status, ProposalStatus::UnderReview);
        mock.assert_async().await;
    }
}
