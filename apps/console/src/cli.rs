use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use client_core::Route;
use shared::domain::{ClientId, PaymentFrequency, PaymentStatus, PolicyId};

#[derive(Parser, Debug)]
#[command(name = "broker-console", about = "Insurance broker console")]
pub struct Cli {
    /// Flat TOML settings file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Overrides the API base URL from config and environment.
    #[arg(long, global = true)]
    pub api_url: Option<String>,
    /// Print records as JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Login {
        email: String,
        /// Prompted on stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    Logout,
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Ask the backend to email a password reset link.
    ForgotPassword { email: String },
    /// Set a new password using the link from the reset email.
    ResetPassword {
        link: String,
        /// Defaults to the email carried by the link.
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    Whoami,
    Profile(ProfileArgs),
    /// Search clients and policies together.
    Search {
        term: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    #[command(subcommand)]
    Clients(ClientsCommand),
    #[command(subcommand)]
    Policies(PoliciesCommand),
    #[command(subcommand)]
    Payments(PaymentsCommand),
    /// Interactive paginated view with live search.
    Browse {
        #[arg(value_enum)]
        view: BrowseView,
        /// Required for client-policies.
        #[arg(long)]
        client: Option<i64>,
        /// Required for policy-payments.
        #[arg(long)]
        policy: Option<i64>,
    },
}

#[derive(Args, Debug)]
pub struct ProfileArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub picture: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ClientFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub emergency_contact: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub birth_date: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
pub enum ClientsCommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        search: Option<String>,
    },
    Show { id: i64 },
    Add(ClientFields),
    Edit {
        id: i64,
        #[command(flatten)]
        fields: ClientFields,
    },
    /// Download every client as an Excel workbook.
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    Notes { id: i64 },
    AddNote { id: i64, content: String },
    Policies {
        id: i64,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Payments { id: i64 },
}

#[derive(Args, Debug, Clone, Default)]
pub struct PolicyFields {
    #[arg(long)]
    pub insurance_type: Option<String>,
    #[arg(long)]
    pub premium: Option<String>,
    #[arg(long)]
    pub insured: Option<String>,
    /// Coverage start, YYYY-MM-DD. The end date is derived from it.
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// mensual or anual
    #[arg(long)]
    pub frequency: Option<PaymentFrequency>,
}

#[derive(Subcommand, Debug)]
pub enum PoliciesCommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        search: Option<String>,
    },
    Show { id: i64 },
    Add {
        #[arg(long)]
        client: i64,
        #[command(flatten)]
        fields: PolicyFields,
        #[arg(long)]
        pdf: Option<PathBuf>,
    },
    Edit {
        id: i64,
        #[arg(long)]
        client: i64,
        #[command(flatten)]
        fields: PolicyFields,
    },
    Delete {
        id: i64,
        #[arg(long)]
        client: i64,
    },
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Upload PDFs as documents of a policy.
    Upload {
        id: i64,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum PaymentsCommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    ForPolicy {
        id: i64,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Create {
        policy: i64,
        /// YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        amount: String,
        /// pagado, pendiente or completado
        #[arg(long, default_value = "completado")]
        status: PaymentStatus,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseView {
    Clients,
    Policies,
    Payments,
    ClientPolicies,
    PolicyPayments,
}

impl Command {
    /// The view each command stands in for, checked against the session
    /// before anything runs.
    pub fn route(&self) -> Route {
        match self {
            Self::Login { .. } | Self::Logout => Route::Login,
            Self::Register { .. } => Route::Register,
            Self::ForgotPassword { .. } => Route::PasswordReset,
            Self::ResetPassword { .. } => Route::NewPassword,
            Self::Whoami | Self::Profile(_) => Route::Profile,
            Self::Search { .. } => Route::Home,
            Self::Clients(command) => match command {
                ClientsCommand::Show { id }
                | ClientsCommand::Edit { id, .. }
                | ClientsCommand::Notes { id }
                | ClientsCommand::AddNote { id, .. }
                | ClientsCommand::Payments { id } => Route::ClientDetails(ClientId(*id)),
                ClientsCommand::Policies { id, .. } => Route::ClientPolicies(ClientId(*id)),
                _ => Route::Clients,
            },
            Self::Policies(command) => match command {
                PoliciesCommand::Show { id }
                | PoliciesCommand::Edit { id, .. }
                | PoliciesCommand::Delete { id, .. }
                | PoliciesCommand::Upload { id, .. } => Route::PolicyDetails(PolicyId(*id)),
                PoliciesCommand::Add { client, .. } => Route::ClientPolicies(ClientId(*client)),
                _ => Route::Policies,
            },
            Self::Payments(command) => match command {
                PaymentsCommand::ForPolicy { id, .. } => Route::PolicyPayments(PolicyId(*id)),
                PaymentsCommand::Create { policy, .. } => Route::PolicyPayments(PolicyId(*policy)),
                PaymentsCommand::List { .. } => Route::Payments,
            },
            Self::Browse { view, .. } => match view {
                BrowseView::Clients => Route::Clients,
                BrowseView::Policies => Route::Policies,
                BrowseView::Payments => Route::Payments,
                BrowseView::ClientPolicies => Route::Clients,
                BrowseView::PolicyPayments => Route::Payments,
            },
        }
    }
}
