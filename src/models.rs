// Wire models exchanged with the Finexus backend.
// Field names follow the backend's JSON (Portuguese camelCase).

use bytes::Bytes;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Marketplace role of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// MEI asking for credit.
    #[serde(rename = "TOMADOR", alias = "BORROWER")]
    Borrower,
    #[serde(rename = "INVESTIDOR", alias = "INVESTOR")]
    Investor,
}

impl Role {
    pub fn as_wire(&self) -> &'static str {
        match self {
            Role::Borrower => "TOMADOR",
            Role::Investor => "INVESTIDOR",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "TOMADOR" | "BORROWER" => Some(Role::Borrower),
            "INVESTIDOR" | "INVESTOR" => Some(Role::Investor),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_wire())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    /// CPF, as typed by the user (punctuation is kept).
    #[serde(rename = "cpf")]
    pub document: String,
    #[serde(rename = "telefone", default)]
    pub phone: Option<String>,
    #[serde(rename = "tipo")]
    pub role: Role,
}

/// Partial profile edit; absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(rename = "nome", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "telefone", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub cpf: String,
    #[serde(rename = "senha")]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "usuario")]
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    pub cpf: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    #[serde(rename = "senha")]
    pub password: String,
    #[serde(rename = "confirmarSenha")]
    pub confirm_password: String,
    #[serde(rename = "tipo")]
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalStatus {
    #[serde(alias = "ABERTA")]
    Open,
    #[serde(alias = "EM_ANALISE")]
    UnderReview,
    #[serde(alias = "APROVADA")]
    Approved,
    #[serde(alias = "FINANCIADA")]
    Funded,
    #[serde(alias = "EM_PAGAMENTO")]
    InRepayment,
    #[serde(alias = "FINALIZADA")]
    Finished,
    #[serde(alias = "REJEITADA")]
    Rejected,
}

impl ProposalStatus {
    pub const ALL: [ProposalStatus; 7] = [
        ProposalStatus::Open,
        ProposalStatus::UnderReview,
        ProposalStatus::Approved,
        ProposalStatus::Funded,
        ProposalStatus::InRepayment,
        ProposalStatus::Finished,
        ProposalStatus::Rejected,
    ];

    pub fn as_wire(&self) -> &'static str {
        match self {
            ProposalStatus::Open => "OPEN",
            ProposalStatus::UnderReview => "UNDER_REVIEW",
            ProposalStatus::Approved => "APPROVED",
            ProposalStatus::Funded => "FUNDED",
            ProposalStatus::InRepayment => "IN_REPAYMENT",
            ProposalStatus::Finished => "FINISHED",
            ProposalStatus::Rejected => "REJECTED",
        }
    }

    /// Portuguese name the backend also accepts on input.
    pub fn alias(&self) -> &'static str {
        match self {
            ProposalStatus::Open => "ABERTA",
            ProposalStatus::UnderReview => "EM_ANALISE",
            ProposalStatus::Approved => "APROVADA",
            ProposalStatus::Funded => "FINANCIADA",
            ProposalStatus::InRepayment => "EM_PAGAMENTO",
            ProposalStatus::Finished => "FINALIZADA",
            ProposalStatus::Rejected => "REJEITADA",
        }
    }

    /// Parses either the English wire name or its Portuguese alias,
    /// ignoring case and accepting `-` or spaces for `_`.
    pub fn from_wire(value: &str) -> Option<Self> {
        let name = value.trim().to_uppercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|s| s.as_wire() == name || s.alias() == name)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProposalStatus::Open => "Aberta",
            ProposalStatus::UnderReview => "Em análise",
            ProposalStatus::Approved => "Aprovada",
            ProposalStatus::Funded => "Financiada",
            ProposalStatus::InRepayment => "Em pagamento",
            ProposalStatus::Finished => "Finalizada",
            ProposalStatus::Rejected => "Rejeitada",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: i64,
    #[serde(rename = "nomeEmpresa")]
    pub business_name: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    #[serde(rename = "valorSolicitado")]
    pub requested_amount: Decimal,
    #[serde(rename = "valorArrecadado", default)]
    pub funded_amount: Decimal,
    #[serde(rename = "prazoMeses")]
    pub term_months: u32,
    #[serde(rename = "taxaJuros", default)]
    pub interest_rate: Decimal,
    pub status: ProposalStatus,
    #[serde(rename = "dataCriacao", default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(rename = "usuarioId")]
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewProposal {
    #[serde(rename = "usuarioId")]
    pub user_id: i64,
    #[serde(rename = "nomeEmpresa")]
    pub business_name: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "valorSolicitado")]
    pub requested_amount: Decimal,
    #[serde(rename = "prazoMeses")]
    pub term_months: u32,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StatusUpdate {
    pub status: ProposalStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    pub id: i64,
    #[serde(rename = "investidorId")]
    pub investor_id: i64,
    #[serde(rename = "propostaId")]
    pub proposal_id: i64,
    #[serde(rename = "valorInvestido")]
    pub amount: Decimal,
    #[serde(rename = "rendimentoEsperado", default)]
    pub expected_yield: Decimal,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "dataCriacao", default)]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewInvestment {
    #[serde(rename = "investidorId")]
    pub investor_id: i64,
    #[serde(rename = "propostaId")]
    pub proposal_id: i64,
    #[serde(rename = "valor")]
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub id: i64,
    #[serde(rename = "propostaId")]
    pub proposal_id: i64,
    #[serde(rename = "tomadorId")]
    pub borrower_id: i64,
    #[serde(rename = "valorTotal")]
    pub total_amount: Decimal,
    #[serde(rename = "quantidadeParcelas")]
    pub installment_count: u32,
    #[serde(rename = "valorParcela")]
    pub installment_amount: Decimal,
    #[serde(rename = "investidores", default)]
    pub investor_ids: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallmentStatus {
    #[serde(alias = "PENDENTE")]
    Pending,
    #[serde(alias = "ABERTA")]
    Open,
    #[serde(alias = "PAGA")]
    Paid,
    #[serde(alias = "ATRASADA")]
    Overdue,
}

impl InstallmentStatus {
    /// Still owed by the borrower.
    pub fn is_outstanding(&self) -> bool {
        !matches!(self, InstallmentStatus::Paid)
    }

    pub fn label(&self) -> &'static str {
        match self {
            InstallmentStatus::Pending => "Pendente",
            InstallmentStatus::Open => "Em aberto",
            InstallmentStatus::Paid => "Paga",
            InstallmentStatus::Overdue => "Atrasada",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub id: i64,
    #[serde(rename = "dividaId")]
    pub debt_id: i64,
    #[serde(rename = "numero")]
    pub number: u32,
    #[serde(rename = "valor")]
    pub amount: Decimal,
    #[serde(rename = "dataVencimento")]
    pub due_date: NaiveDate,
    pub status: InstallmentStatus,
    #[serde(rename = "dataPagamento", default)]
    pub paid_at: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PayInstallment {
    #[serde(rename = "pagadorId")]
    pub payer_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "usuarioId", default)]
    pub user_id: Option<i64>,
    #[serde(rename = "valor")]
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Withdrawal {
    #[serde(rename = "valor")]
    pub amount: Decimal,
}

/// Binary payload such as a boleto PDF.
#[derive(Debug, Clone)]
pub struct Document {
    pub bytes: Bytes,
    pub content_type: Option<mime::Mime>,
    pub file_name: String,
}

impl Document {
    pub fn is_pdf(&self) -> bool {
        self.content_type
            .as_ref()
            .map(|m| m.type_() == mime::APPLICATION && m.subtype() == mime::PDF)
            .unwrap_or_else(|| self.bytes.starts_with(b"%PDF"))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_login_response_with_portuguese_fields() {
        let body = json!({
            "token": "abc",
            "usuario": {
                "id": 1,
                "nome": "Maria",
                "email": "maria@example.com",
                "cpf": "123.456.789-00",
                "tipo": "TOMADOR"
            }
        });
        let response: LoginResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.token, "abc");
        assert_eq!(response.user.role, Role::Borrower);
        assert_eq!(response.user.phone, None);
    }

    #[test]
    fn test_bare_balance_deserializes() {
        let balance: Balance = serde_json::from_value(json!({ "valor": 0 })).unwrap();
        assert_eq!(balance.amount, dec!(0));
        assert_eq!(balance.id, None);

        let balance: Balance =
            serde_json::from_value(json!({ "id": 3, "usuarioId": 9, "valor": 1250.75 })).unwrap();
        assert_eq!(balance.amount, dec!(1250.75));
        assert_eq!(balance.user_id, Some(9));
    }

    #[test]
    fn test_status_aliases() {
        let status: InstallmentStatus = serde_json::from_value(json!("PAGA")).unwrap();
        assert_eq!(status, InstallmentStatus::Paid);
        let status: ProposalStatus = serde_json::from_value(json!("UNDER_REVIEW")).unwrap();
        assert_eq!(status, ProposalStatus::UnderReview);
        assert_eq!(
            serde_json::to_value(ProposalStatus::InRepayment).unwrap(),
            json!("IN_REPAYMENT")
        );
        assert_eq!(ProposalStatus::from_wire("funded"), Some(ProposalStatus::Funded));
        assert_eq!(Role::from_wire("investidor"), Some(Role::Investor));
    }

    #[test]
    fn test_status_from_portuguese_input() {
        assert_eq!(ProposalStatus::from_wire("aprovada"), Some(ProposalStatus::Approved));
        assert_eq!(ProposalStatus::from_wire("em análise"), None);
        assert_eq!(ProposalStatus::from_wire("em analise"), Some(ProposalStatus::UnderReview));
        assert_eq!(ProposalStatus::from_wire("EM_PAGAMENTO"), Some(ProposalStatus::InRepayment));
        assert_eq!(ProposalStatus::from_wire("in-repayment"), Some(ProposalStatus::InRepayment));
        assert_eq!(ProposalStatus::from_wire("cancelada"), None);

        // Every alias parses the same way through serde and from_wire.
        for status in ProposalStatus::ALL {
            let parsed: ProposalStatus = serde_json::from_value(json!(status.alias())).unwrap();
            assert_eq!(parsed, status);
            assert_eq!(ProposalStatus::from_wire(status.alias()), Some(status));
        }
    }

    #[test]
    fn test_user_update_skips_absent_fields() {
        let update = UserUpdate {
            phone: Some("11999990000".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "telefone": "11999990000" })
        );
        assert!(UserUpdate::default().is_empty());
    }

    #[test]
    fn test_proposal_defaults() {
        let proposal: Proposal = serde_json::from_value(json!({
            "id": 7,
            "nomeEmpresa": "Doces da Ana",
            "categoria": "Alimentação",
            "valorSolicitado": 5000,
            "prazoMeses": 12,
            "status": "OPEN",
            "usuarioId": 1
        }))
        .unwrap();
        assert_eq!(proposal.funded_amount, dec!(0));
        assert_eq!(proposal.created_at, None);
        assert_eq!(proposal.description, "");
    }

    #[test]
    fn test_document_pdf_sniffing() {
        let doc = Document {
            bytes: Bytes::from_static(b"%PDF-1.4 ..."),
            content_type: None,
            file_name: "boleto.pdf".into(),
        };
        assert!(doc.is_pdf());
        assert_eq!(doc.len(), 12);
    }
}
