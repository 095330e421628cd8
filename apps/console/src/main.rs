use anyhow::{bail, Result};
use clap::Parser;
use client_core::{
    listing::{
        ClientPoliciesSource, ClientsSource, PaymentsSource, PoliciesSource, PolicyPaymentsSource,
    },
    load_settings, Access, ClientError, Console, ListController,
};
use shared::domain::{ClientId, PolicyId};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod browse;
mod cli;
mod commands;
mod render;

use cli::{BrowseView, Cli, Command};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()).await {
        match err.downcast_ref::<ClientError>() {
            Some(client_err) => {
                eprintln!("error: {}", client_err.user_message());
                if client_err.requires_reauth() {
                    eprintln!("run `broker-console login <email>` to sign in again");
                }
            }
            None => eprintln!("error: {err:#}"),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = load_settings(cli.config.as_deref());
    if let Some(api_url) = &cli.api_url {
        settings.api_url = api_url.trim_end_matches('/').to_string();
    }
    debug!(api_url = %settings.api_url, "settings loaded");

    let console = Console::new(settings);
    console.initialize().await;

    let route = cli.command.route();
    match console.authorize(route) {
        Access::Granted => {}
        Access::Pending => bail!("session is still loading"),
        Access::RedirectToLogin => {
            bail!("{route} requires a signed-in user; run `broker-console login <email>` first")
        }
    }

    let json = cli.json;
    match cli.command {
        Command::Login { email, password } => commands::login(&console, &email, password).await,
        Command::Logout => commands::logout(&console).await,
        Command::Register {
            name,
            last_name,
            email,
            password,
        } => commands::register(&console, name, last_name, email, password).await,
        Command::ForgotPassword { email } => commands::forgot_password(&console, &email).await,
        Command::ResetPassword {
            link,
            email,
            password,
        } => commands::reset_password(&console, &link, email, password).await,
        Command::Whoami => commands::whoami(&console, json),
        Command::Profile(args) => commands::profile(&console, args).await,
        Command::Search { term, page } => commands::home_search(&console, &term, page, json).await,
        Command::Clients(command) => commands::clients(&console, command, json).await,
        Command::Policies(command) => commands::policies(&console, command, json).await,
        Command::Payments(command) => commands::payments(&console, command, json).await,
        Command::Browse {
            view,
            client,
            policy,
        } => browse(&console, view, client, policy).await,
    }
}

async fn browse(
    console: &Console,
    view: BrowseView,
    client: Option<i64>,
    policy: Option<i64>,
) -> Result<()> {
    let options = console.list_options();
    match view {
        BrowseView::Clients => {
            let source = ClientsSource(console.clients.clone());
            browse::run(ListController::new(source, options)).await
        }
        BrowseView::Policies => {
            let source = PoliciesSource(console.policies.clone());
            browse::run(ListController::new(source, options)).await
        }
        BrowseView::Payments => {
            let source = PaymentsSource(console.payments.clone());
            browse::run(ListController::new(source, options)).await
        }
        BrowseView::ClientPolicies => {
            let Some(client_id) = client else {
                bail!("client-policies needs --client <id>");
            };
            let source = ClientPoliciesSource {
                service: console.policies.clone(),
                client_id: ClientId(client_id),
            };
            browse::run(ListController::new(source, options)).await
        }
        BrowseView::PolicyPayments => {
            let Some(policy_id) = policy else {
                bail!("policy-payments needs --policy <id>");
            };
            let source = PolicyPaymentsSource {
                service: console.payments.clone(),
                policy_id: PolicyId(policy_id),
            };
            browse::run(ListController::new(source, options)).await
        }
    }
}
