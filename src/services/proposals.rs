use super::users::not_found;
use crate::http::ApiClient;
use crate::models::{NewProposal, Proposal, ProposalStatus, StatusUpdate};
use crate::types::{AppError, AppResult};
use tracing::info;

#[derive(Clone)]
pub struct ProposalService {
    client: ApiClient,
}

impl ProposalService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Proposals owned by a borrower, in backend order.
    pub async fn list_proposals_by_user(&self, user_id: i64) -> AppResult<Vec<Proposal>> {
        self.client
            .get(&format!("/api/propostas/usuario/{}", user_id))
            .await
    }

    /// Proposals investors can still fund.
    pub async fn list_open_proposals(&self) -> AppResult<Vec<Proposal>> {
        self.client
            .get(&format!("/api/propostas?status={}", ProposalStatus::Open.as_wire()))
            .await
    }

    pub async fn fetch_proposal(&self, id: i64) -> AppResult<Proposal> {
        self.client
            .get(&format!("/api/propostas/{}", id))
            .await
            .map_err(|e| not_found(e, format!("proposal {}", id)))
    }

    pub async fn create_proposal(&self, proposal: &NewProposal) -> AppResult<Proposal> {
        let created: Proposal = self
            .client
            .post("/api/propostas", proposal)
            .await
            .map_err(|e| {
                e.remap(|status, message| {
                    (status == 400).then(|| {
                        AppError::Validation(
                            message.unwrap_or_else(|| "invalid proposal".to_string()),
                        )
                    })
                })
            })?;

        info!(proposal_id = created.id, user_id = created.user_id, "Proposal created");
        Ok(created)
    }

    /// Asks the backend for a status transition; the backend decides if it is allowed.
    pub async fn update_proposal_status(
        &self,
        id: i64,
        status: ProposalStatus,
    ) -> AppResult<Proposal> {
        let updated: Proposal = self
            .client
            .put(&format!("/api/propostas/{}/status", id), &StatusUpdate { status })
            .await
            .map_err(|e| not_found(e, format!("proposal {}", id)))?;

        info!(proposal_id = id, status = updated.status.as_wire(), "Proposal status updated");
        Ok(updated)
    }
}
