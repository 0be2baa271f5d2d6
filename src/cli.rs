//! Finexus CLI
//!
//! Each subcommand stands in for one page of the marketplace: it loads the
//! page's view through the services and renders it as plain text.

use crate::http::ApiClient;
use crate::models::{NewInvestment, ProposalStatus, Role, User, UserUpdate};
use crate::navigation::{home_route, Navigator, Route};
use crate::services::Api;
use crate::session::SessionManager;
use crate::types::{AppError, AppResult};
use crate::views::{
    format_brl, BorrowerDashboard, InvestorStatement, LoanRequestDraft, LoanRequestWizard,
    LoginForm, PaymentsView, ProposalProgress, SignupForm, WalletView,
};
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "finexus")]
#[command(about = "Finexus lending marketplace client")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend origin, overrides FINEXUS_API_URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    /// Small-business borrower (TOMADOR)
    Tomador,
    /// Individual investor (INVESTIDOR)
    Investidor,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Tomador => Role::Borrower,
            RoleArg::Investidor => Role::Investor,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with CPF and password
    Login {
        #[arg(long)]
        cpf: String,
        #[arg(long, env = "FINEXUS_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        cpf: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long, value_enum)]
        role: RoleArg,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Update name, e-mail or phone
    ProfileUpdate {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },

    /// Open the home page for the user's role
    Home,

    /// Loan proposals
    Proposals {
        #[command(subcommand)]
        command: ProposalCommands,
    },

    /// Invest in an open proposal
    Invest {
        #[arg(long)]
        proposal: i64,
        #[arg(long)]
        amount: Decimal,
    },

    /// Investor statement
    Statement,

    /// Debts of the logged-in borrower
    Debts,

    /// Installments of a debt
    Installments {
        #[arg(long)]
        debt: i64,
    },

    /// Pay one installment of a debt
    Pay {
        #[arg(long)]
        debt: i64,
        #[arg(long)]
        installment: i64,
    },

    /// Download the boleto of an installment
    Boleto {
        #[arg(long)]
        installment: i64,
        /// Output file (defaults to the server-suggested name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Wallet balance
    Balance,

    /// Withdraw from the wallet
    Withdraw {
        #[arg(long)]
        amount: Decimal,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProposalCommands {
    /// Proposals of the logged-in borrower
    Mine,
    /// Proposals open for investment
    Open,
    /// One proposal
    Show { id: i64 },
    /// Request a loan
    Create {
        #[arg(long)]
        business_name: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        term: u32,
    },
    /// Change the status of a proposal
    Status {
        id: i64,
        /// OPEN, UNDER_REVIEW, APPROVED, FUNDED, IN_REPAYMENT, FINISHED or REJECTED
        /// (Portuguese names such as APROVADA also work)
        status: String,
    },
}

impl Commands {
    /// Completes the generic error message, "Erro ao <action>".
    pub fn action(&self) -> &'static str {
        match self {
            Commands::Login { .. } => "entrar",
            Commands::Signup { .. } => "cadastrar",
            Commands::Logout => "sair",
            Commands::Whoami => "carregar o usuário",
            Commands::ProfileUpdate { .. } => "atualizar o perfil",
            Commands::Home => "carregar a página inicial",
            Commands::Proposals { .. } => "carregar as propostas",
            Commands::Invest { .. } => "investir",
            Commands::Statement => "carregar o extrato",
            Commands::Debts => "carregar as dívidas",
            Commands::Installments { .. } => "carregar as parcelas",
            Commands::Pay { .. } => "pagar a parcela",
            Commands::Boleto { .. } => "gerar o boleto",
            Commands::Balance => "carregar o saldo",
            Commands::Withdraw { .. } => "sacar",
        }
    }
}

/// Services plus session handling, wired over one client.
pub struct App {
    pub api: Api,
    pub sessions: SessionManager,
    pub navigator: Arc<dyn Navigator>,
}

impl App {
    pub fn new(client: ApiClient) -> Self {
        let api = Api::new(client.clone());
        let sessions = SessionManager::new(
            api.users.clone(),
            client.session().clone(),
            client.navigator().clone(),
        );
        Self {
            api,
            sessions,
            navigator: client.navigator().clone(),
        }
    }

    /// Runs one command and returns the text to print.
    pub async fn run(&self, command: Commands) -> AppResult<String> {
        match command {
            Commands::Login { cpf, password } => {
                let user = LoginForm { cpf, password }.submit(&self.sessions).await?;
                Ok(format!(
                    "Bem-vindo, {}! Página inicial: {}",
                    user.name,
                    home_route(user.role)
                ))
            }
            Commands::Signup {
                name,
                email,
                cpf,
                phone,
                password,
                confirm_password,
                role,
            } => {
                let form = SignupForm {
                    name,
                    email,
                    cpf,
                    phone,
                    password,
                    confirm_password,
                    role: role.into(),
                };
                form.submit(&self.api.users, self.navigator.as_ref()).await?;
                Ok("Cadastro realizado. Faça login para continuar.".to_string())
            }
            Commands::Logout => {
                self.sessions.logout().await?;
                Ok("Sessão encerrada.".to_string())
            }
            Commands::Whoami => {
                let user = self.sessions.require_user().await?;
                Ok(render_user(&user))
            }
            Commands::ProfileUpdate { name, email, phone } => {
                let user = self.sessions.require_user().await?;
                let update = UserUpdate { name, email, phone };
                self.api.users.update_user(user.id, &update).await?;
                let refreshed = self.sessions.require_user().await?;
                Ok(render_user(&refreshed))
            }
            Commands::Home => self.home().await,
            Commands::Proposals { command } => self.proposals(command).await,
            Commands::Invest { proposal, amount } => {
                let user = self.sessions.require_user().await?;
                let investment = self
                    .api
                    .investments
                    .invest(&NewInvestment {
                        investor_id: user.id,
                        proposal_id: proposal,
                        amount,
                    })
                    .await?;
                Ok(format!(
                    "Investimento #{} de {} na proposta #{} (rendimento esperado {}).",
                    investment.id,
                    format_brl(investment.amount),
                    investment.proposal_id,
                    format_brl(investment.expected_yield)
                ))
            }
            Commands::Statement => {
                let user = self.sessions.require_user().await?;
                let statement = InvestorStatement::load(&self.api.investments, user.id).await?;
                self.navigator.navigate(Route::Statement);
                Ok(render_statement(&statement))
            }
            Commands::Debts => {
                let user = self.sessions.require_user().await?;
                let debts = self.api.debts.list_debts_by_borrower(user.id).await?;
                if debts.is_empty() {
                    return Ok("Nenhuma dívida encontrada.".to_string());
                }
                Ok(debts
                    .iter()
                    .map(|d| {
                        format!(
                            "#{}  proposta #{}  total {}  {}x {}",
                            d.id,
                            d.proposal_id,
                            format_brl(d.total_amount),
                            d.installment_count,
                            format_brl(d.installment_amount)
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            Commands::Installments { debt } => {
                let user = self.sessions.require_user().await?;
                let view = PaymentsView::load(self.api.installments.clone(), debt, user.id).await?;
                self.navigator.navigate(Route::Payments);
                Ok(render_payments(&view))
            }
            Commands::Pay { debt, installment } => {
                let user = self.sessions.require_user().await?;
                let mut view =
                    PaymentsView::load(self.api.installments.clone(), debt, user.id).await?;
                let confirmation = view.pay(installment).await?;
                Ok(format!("{}\n\n{}", confirmation, render_payments(&view)))
            }
            Commands::Boleto {
                installment,
                output,
            } => {
                self.sessions.require_user().await?;
                let document = self.api.installments.generate_boleto(installment).await?;
                let path = output.unwrap_or_else(|| PathBuf::from(&document.file_name));
                tokio::fs::write(&path, &document.bytes).await.map_err(|e| {
                    AppError::Client(format!("failed to write {}: {}", path.display(), e))
                })?;
                info!(installment, path = %path.display(), bytes = document.len(), "Boleto saved");
                Ok(format!("Boleto salvo em {}", path.display()))
            }
            Commands::Balance => {
                let user = self.sessions.require_user().await?;
                let wallet = WalletView::load(self.api.balance.clone(), user.id).await?;
                self.navigator.navigate(Route::Wallet);
                Ok(render_wallet(&wallet))
            }
            Commands::Withdraw { amount } => {
                let user = self.sessions.require_user().await?;
                let mut wallet = WalletView::load(self.api.balance.clone(), user.id).await?;
                wallet.withdraw(amount).await?;
                Ok(format!("Saque de {} realizado.\n{}", format_brl(amount), render_wallet(&wallet)))
            }
        }
    }

    async fn home(&self) -> AppResult<String> {
        let user = self.sessions.require_user().await?;
        self.navigator.navigate(home_route(user.role));

        match user.role {
            Role::Borrower => {
                let dashboard = BorrowerDashboard::load(&self.api, user.id).await?;
                let mut lines = vec![
                    format!("Saldo: {}", dashboard.balance.display()),
                    format!(
                        "Solicitado: {}  Arrecadado: {}",
                        format_brl(dashboard.total_requested()),
                        format_brl(dashboard.total_funded())
                    ),
                ];
                lines.extend(dashboard.proposals.iter().map(render_progress));
                Ok(lines.join("\n"))
            }
            Role::Investor => {
                let wallet = WalletView::load(self.api.balance.clone(), user.id).await?;
                Ok(render_wallet(&wallet))
            }
        }
    }

    async fn proposals(&self, command: ProposalCommands) -> AppResult<String> {
        match command {
            ProposalCommands::Mine => {
                let user = self.sessions.require_user().await?;
                let proposals = self.api.proposals.list_proposals_by_user(user.id).await?;
                Ok(render_proposals(proposals))
            }
            ProposalCommands::Open => {
                self.sessions.require_user().await?;
                let proposals = self.api.proposals.list_open_proposals().await?;
                self.navigator.navigate(Route::Proposals);
                Ok(render_proposals(proposals))
            }
            ProposalCommands::Show { id } => {
                self.sessions.require_user().await?;
                let proposal = self.api.proposals.fetch_proposal(id).await?;
                let mut lines = vec![render_progress(&ProposalProgress::from(proposal.clone()))];
                lines.push(format!("Categoria: {}", proposal.category));
                lines.push(format!("Prazo: {} meses  Juros: {}%", proposal.term_months, proposal.interest_rate));
                if !proposal.description.is_empty() {
                    lines.push(proposal.description);
                }
                Ok(lines.join("\n"))
            }
            ProposalCommands::Create {
                business_name,
                category,
                description,
                amount,
                term,
            } => {
                let user = self.sessions.require_user().await?;
                let mut wizard = LoanRequestWizard::new(LoanRequestDraft {
                    business_name,
                    category,
                    description,
                    amount,
                    term_months: term,
                });
                wizard.next()?;
                wizard.next()?;
                let proposal = wizard.submit(&self.api.proposals, user.id).await?;
                self.navigator.navigate(Route::Dashboard);
                Ok(format!(
                    "Proposta #{} enviada ({}).",
                    proposal.id,
                    proposal.status.label()
                ))
            }
            ProposalCommands::Status { id, status } => {
                self.sessions.require_user().await?;
                let status = ProposalStatus::from_wire(&status)
                    .ok_or_else(|| AppError::Validation(format!("Status desconhecido: {}", status)))?;
                let proposal = self.api.proposals.update_proposal_status(id, status).await?;
                Ok(format!(
                    "Proposta #{} agora está {}.",
                    proposal.id,
                    proposal.status.label()
                ))
            }
        }
    }
}

fn render_user(user: &User) -> String {
    format!(
        "#{} {} <{}>\nCPF: {}\nPerfil: {}",
        user.id, user.name, user.email, user.document, user.role
    )
}

fn render_progress(row: &ProposalProgress) -> String {
    let p = &row.proposal;
    format!(
        "#{}  {}  {}  {} de {} ({}%)",
        p.id,
        p.business_name,
        p.status.label(),
        format_brl(p.funded_amount),
        format_brl(p.requested_amount),
        row.percent
    )
}

fn render_proposals(proposals: Vec<crate::models::Proposal>) -> String {
    if proposals.is_empty() {
        return "Nenhuma proposta encontrada.".to_string();
    }
    proposals
        .into_iter()
        .map(|p| render_progress(&ProposalProgress::from(p)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_statement(statement: &InvestorStatement) -> String {
    let mut lines: Vec<String> = statement
        .investments
        .iter()
        .map(|i| {
            format!(
                "#{}  proposta #{}  {}  rendimento {}  {}",
                i.id,
                i.proposal_id,
                format_brl(i.amount),
                format_brl(i.expected_yield),
                i.status
            )
        })
        .collect();
    lines.push(format!(
        "Total investido: {}  Rendimento esperado: {}",
        format_brl(statement.total_invested()),
        format_brl(statement.total_expected_yield())
    ));
    lines.join("\n")
}

fn render_payments(view: &PaymentsView) -> String {
    let mut lines: Vec<String> = view
        .installments()
        .iter()
        .map(|i| {
            format!(
                "#{}  parcela {}  {}  vence {}  {}",
                i.id,
                i.number,
                format_brl(i.amount),
                i.due_date.format("%d/%m/%Y"),
                i.status.label()
            )
        })
        .collect();
    if let Some(next) = view.next_due() {
        lines.push(format!(
            "Próxima parcela: {} em {}",
            format_brl(next.amount),
            next.due_date.format("%d/%m/%Y")
        ));
    }
    lines.push(format!(
        "Pago: {}  Em aberto: {}",
        format_brl(view.total_paid()),
        format_brl(view.total_outstanding())
    ));
    lines.join("\n")
}

fn render_wallet(wallet: &WalletView) -> String {
    let mut text = format!("Saldo: {}", wallet.state().display());
    if !wallet.can_withdraw() {
        text.push_str("\nSaque indisponível.");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::client::testing::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from([
            "finexus", "invest", "--proposal", "3", "--amount", "250.50",
        ])
        .unwrap();
        match cli.command {
            Commands::Invest { proposal, amount } => {
                assert_eq!(proposal, 3);
                assert_eq!(amount, dec!(250.50));
            }
            other => panic!("unexpected: {:?}", other),
        }

        let cli = Cli::try_parse_from(["finexus", "proposals", "status", "7", "approved"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Proposals {
                command: ProposalCommands::Status { id: 7, .. }
            }
        ));

        assert!(Cli::try_parse_from(["finexus", "pay", "--installment", "1"]).is_err());
    }

    #[tokio::test]
    async fn test_login_command() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/auth/login")
            .with_status(200)
            .with_body(
                json!({
                    "token": "abc",
                    "usuario": {
                        "id": 1, "nome": "Maria", "email": "maria@example.com",
                        "cpf": "123.456.789-00", "tipo": "TOMADOR"
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let h = harness(&server.url());
        let app = App::new(h.client.clone());
        let out = app
            .run(Commands::Login {
                cpf: "123.456.789-00".into(),
                password: "senha123".into(),
            })
            .await
            .unwrap();

        assert_eq!(out, "Bem-vindo, Maria! Página inicial: /dashboard");
        assert_eq!(h.navigator.current(), Some(Route::Dashboard));
    }

    #[tokio::test]
    async fn test_investor_home_shows_wallet() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/usuarios/1")
            .with_status(200)
            .with_body(serde_json::to_string(&sample_user(1, Role::Investor)).unwrap())
            .create_async()
            .await;
        server
            .mock("GET", "/api/saldos/usuario/1")
            .with_status(200)
            .with_body(r#"{"valor": 0}"#)
            .create_async()
            .await;

        let h = logged_in(&server.url(), "abc", Role::Investor);
        let out = App::new(h.client.clone()).run(Commands::Home).await.unwrap();

        assert_eq!(out, "Saldo: R$ 0,00\nSaque indisponível.");
        assert_eq!(h.navigator.current(), Some(Route::Wallet));
    }

    #[tokio::test]
    async fn test_commands_require_login() {
        let h = harness("http://127.0.0.1:1");
        let result = App::new(h.client.clone()).run(Commands::Balance).await;
        assert!(matches!(result, Err(AppError::Unauthenticated)));
        assert_eq!(h.navigator.current(), Some(Route::Login));
    }

    #[test]
    fn test_unknown_status_is_rejected_locally() {
        assert!(ProposalStatus::from_wire("whatever").is_none());
        assert_eq!(Commands::Balance.action(), "carregar o saldo");
    }
}
