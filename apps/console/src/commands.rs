use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use client_core::{
    attachment::Document,
    export::{save_export, ExportKind},
    forms::{ClientForm, NewPasswordForm, PaymentForm, PolicyForm, ProfileForm, RegisterForm},
    upload::{PolicyDocumentUploader, UploadQueue, UploadStatus},
    Console, ResetLink,
};
use shared::domain::{ClientId, PolicyId};

use crate::{
    cli::{
        ClientFields, ClientsCommand, PaymentsCommand, PoliciesCommand, PolicyFields, ProfileArgs,
    },
    render::{print_json, print_page, print_rows, table},
};

fn prompt_secret(label: &str) -> Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => prompt_secret("password"),
    }
}

/// Password plus confirmation, prompting for whatever is missing.
fn new_password(password: Option<String>) -> Result<(String, String)> {
    match password {
        Some(password) => Ok((password.clone(), password)),
        None => Ok((prompt_secret("password")?, prompt_secret("confirm password")?)),
    }
}

pub async fn login(console: &Console, email: &str, password: Option<String>) -> Result<()> {
    let password = password_or_prompt(password)?;
    let user = console.auth.login(email, &password).await?;
    println!("signed in as {} <{}>", user.display_name(), user.email);
    Ok(())
}

pub async fn logout(console: &Console) -> Result<()> {
    console.auth.logout().await?;
    println!("signed out");
    Ok(())
}

pub async fn register(
    console: &Console,
    name: String,
    last_name: String,
    email: String,
    password: Option<String>,
) -> Result<()> {
    let (password, password_confirmation) = new_password(password)?;
    let form = RegisterForm {
        name,
        last_name,
        email,
        password,
        password_confirmation,
    };
    console.auth.register(&form).await?;
    println!("account created; sign in with `broker-console login {}`", form.email.trim());
    Ok(())
}

pub async fn forgot_password(console: &Console, email: &str) -> Result<()> {
    let message = console.auth.request_password_reset(email).await?;
    if message.is_empty() {
        println!("reset link sent to {email}");
    } else {
        println!("{message}");
    }
    Ok(())
}

pub async fn reset_password(
    console: &Console,
    link: &str,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let link = ResetLink::parse(link)?;
    let Some(email) = email.or_else(|| link.email.clone()) else {
        bail!("the reset link carries no email; pass --email");
    };
    let (password, password_confirmation) = new_password(password)?;
    let form = NewPasswordForm {
        email,
        password,
        password_confirmation,
    };
    let message = console.auth.reset_password(&link, &form).await?;
    if message.is_empty() {
        println!("password updated");
    } else {
        println!("{message}");
    }
    Ok(())
}

pub fn whoami(console: &Console, json: bool) -> Result<()> {
    let user = console.session().require_user()?;
    if json {
        return print_json(&user);
    }
    println!("{} <{}> (id {})", user.display_name(), user.email, user.id);
    if let Some(picture) = &user.profile_picture {
        println!("picture: {picture}");
    }
    Ok(())
}

pub async fn profile(console: &Console, args: ProfileArgs) -> Result<()> {
    let current = console.session().require_user()?;
    let picture = match &args.picture {
        Some(path) => Some(Document::from_path(path).await?),
        None => None,
    };
    let form = ProfileForm {
        name: args.name.unwrap_or(current.name),
        last_name: args.last_name.unwrap_or(current.last_name),
        email: args.email.unwrap_or(current.email),
        picture,
    };
    let user = console.auth.update_profile(&form).await?;
    println!("profile updated: {} <{}>", user.display_name(), user.email);
    Ok(())
}

pub async fn home_search(console: &Console, term: &str, page: u32, json: bool) -> Result<()> {
    let limit = console.settings().page_size;
    let results = console.clients.home_search(term, page, limit).await?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "clients": results.clients,
                "policies": results.policies,
            }))?
        );
        return Ok(());
    }
    println!("clients");
    print_page(&results.clients, false)?;
    println!();
    println!("policies");
    print_page(&results.policies, false)
}

fn export_dir(console: &Console, out: Option<PathBuf>) -> PathBuf {
    out.unwrap_or_else(|| console.settings().export_dir.clone())
}

async fn write_export(console: &Console, kind: ExportKind, dir: &Path, bytes: &[u8]) -> Result<()> {
    let user_id = console.session().require_user_id()?;
    let path = save_export(dir, kind, user_id, Utc::now(), bytes).await?;
    println!("saved {}", path.display());
    Ok(())
}

fn apply_client_fields(form: &mut ClientForm, fields: ClientFields) {
    if let Some(name) = fields.name {
        form.name = name;
    }
    if let Some(last_name) = fields.last_name {
        form.last_name = last_name;
    }
    if let Some(phone) = fields.phone {
        form.phone = phone;
    }
    if let Some(contact) = fields.emergency_contact {
        form.emergency_contact = contact;
    }
    if let Some(email) = fields.email {
        form.email = email;
    }
    if fields.birth_date.is_some() {
        form.birth_date = fields.birth_date;
    }
}

pub async fn clients(console: &Console, command: ClientsCommand, json: bool) -> Result<()> {
    let limit = console.settings().page_size;
    let service = &console.clients;
    match command {
        ClientsCommand::List { page, search } => {
            let page = match search.as_deref().map(str::trim) {
                Some(term) if !term.is_empty() => service.search(term, page, limit).await?,
                _ => service.list(page, limit).await?,
            };
            print_page(&page, json)?;
        }
        ClientsCommand::Show { id } => {
            let client = service.get(ClientId(id)).await?;
            if json {
                return print_json(&client);
            }
            let details = &client.details;
            println!("{} (id {})", client.full_name(), client.id);
            println!("phone:             {}", details.phone);
            println!("email:             {}", details.email);
            println!("emergency contact: {}", details.emergency_contact);
            if let Some(birth_date) = details.birth_date {
                println!("birth date:        {birth_date}");
            }
            if let Some(age) = client.age {
                println!("age:               {age}");
            }
        }
        ClientsCommand::Add(fields) => {
            let mut form = ClientForm::default();
            apply_client_fields(&mut form, fields);
            let input = form.validate()?;
            match service.add(&input).await? {
                Some(client) => println!("client {} added", client.id),
                None => println!("client added"),
            }
        }
        ClientsCommand::Edit { id, fields } => {
            let existing = service.get(ClientId(id)).await?;
            let mut form = ClientForm::from_client(&existing);
            apply_client_fields(&mut form, fields);
            let input = form.validate()?;
            service.update(ClientId(id), &input).await?;
            println!("client {id} updated");
        }
        ClientsCommand::Export { out } => {
            let bytes = service.export_excel().await?;
            write_export(console, ExportKind::Clients, &export_dir(console, out), &bytes).await?;
        }
        ClientsCommand::Notes { id } => {
            let notes = service.notes(ClientId(id)).await?;
            print_rows(&notes, json)?;
        }
        ClientsCommand::AddNote { id, content } => {
            service.add_note(ClientId(id), &content).await?;
            println!("note added to client {id}");
        }
        ClientsCommand::Policies { id, page } => {
            let page = console.policies.for_client(ClientId(id), page, limit).await?;
            print_page(&page, json)?;
        }
        ClientsCommand::Payments { id } => {
            let payments = service.payments(ClientId(id)).await?;
            print_rows(&payments, json)?;
        }
    }
    Ok(())
}

fn apply_policy_fields(form: &mut PolicyForm, fields: PolicyFields) {
    if let Some(insurance_type) = fields.insurance_type {
        form.insurance_type = insurance_type;
    }
    if let Some(premium) = fields.premium {
        form.net_premium = premium;
    }
    if let Some(insured) = fields.insured {
        form.insured = insured;
    }
    if fields.start.is_some() {
        form.valid_from = fields.start;
    }
    if let Some(frequency) = fields.frequency {
        form.payment_frequency = frequency;
    }
}

pub async fn policies(console: &Console, command: PoliciesCommand, json: bool) -> Result<()> {
    let limit = console.settings().page_size;
    let service = &console.policies;
    match command {
        PoliciesCommand::List { page, search } => {
            let page = match search.as_deref().map(str::trim) {
                Some(term) if !term.is_empty() => service.search(term, page, limit).await?,
                _ => service.list(page, limit).await?,
            };
            print_page(&page, json)?;
        }
        PoliciesCommand::Show { id } => {
            let policy = service.get(PolicyId(id)).await?;
            if json {
                return print_json(&policy);
            }
            println!("{}", table(std::slice::from_ref(&policy)));
            if let Some(insurer) = &policy.insurer {
                println!("insurer:  {insurer}");
            }
            if let Some(attachment) = &policy.attachment {
                println!("document: {attachment}");
            }
        }
        PoliciesCommand::Add {
            client,
            fields,
            pdf,
        } => {
            let mut form = PolicyForm::default();
            apply_policy_fields(&mut form, fields);
            if let Some(path) = &pdf {
                form.attachment = Some(Document::from_path(path).await?);
            }
            if let Some(valid_to) = form.valid_to() {
                println!("coverage ends {valid_to}");
            }
            let submission = form.validate()?;
            match service.create_for_client(ClientId(client), &submission).await? {
                Some(policy) => println!("policy {} created", policy.id),
                None => println!("policy created"),
            }
        }
        PoliciesCommand::Edit { id, client, fields } => {
            let existing = service.get(PolicyId(id)).await?;
            let mut form = PolicyForm::from_policy(&existing);
            apply_policy_fields(&mut form, fields);
            let submission = form.validate()?;
            service
                .update(ClientId(client), PolicyId(id), &submission.terms)
                .await?;
            println!("policy {id} updated");
        }
        PoliciesCommand::Delete { id, client } => {
            service.delete(ClientId(client), PolicyId(id)).await?;
            println!("policy {id} deleted");
        }
        PoliciesCommand::Export { out } => {
            let bytes = service.export_excel().await?;
            write_export(console, ExportKind::Policies, &export_dir(console, out), &bytes).await?;
        }
        PoliciesCommand::Upload { id, files } => upload(console, PolicyId(id), &files).await?,
    }
    Ok(())
}

async fn upload(console: &Console, policy_id: PolicyId, files: &[PathBuf]) -> Result<()> {
    let mut documents = Vec::with_capacity(files.len());
    for path in files {
        documents.push(
            Document::from_path(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?,
        );
    }

    let mut queue = UploadQueue::new(console.settings().upload_linger());
    queue.add(documents);
    if let Some(error) = queue.error() {
        eprintln!("{error}");
    }
    if queue.files().is_empty() {
        bail!("nothing to upload");
    }

    let uploader = PolicyDocumentUploader::new(console.policies.clone(), policy_id);
    let summary = queue.upload_all(&uploader).await;
    for file in queue.files() {
        match &file.status {
            UploadStatus::Uploaded => println!("uploaded  {}", file.document.filename),
            UploadStatus::Failed(reason) => {
                println!("failed    {} ({reason})", file.document.filename)
            }
            UploadStatus::Pending => println!("pending   {}", file.document.filename),
        }
    }
    queue.finish_batch().await;

    if summary.failed > 0 {
        bail!("{} of {} uploads failed", summary.failed, summary.failed + summary.uploaded);
    }
    Ok(())
}

pub async fn payments(console: &Console, command: PaymentsCommand, json: bool) -> Result<()> {
    let limit = console.settings().page_size;
    let service = &console.payments;
    match command {
        PaymentsCommand::List { page } => {
            print_page(&service.list(page, limit).await?, json)?;
        }
        PaymentsCommand::ForPolicy { id, page } => {
            if !json {
                let holder = service.policy_holder(PolicyId(id)).await?;
                let terms = &holder.policy.terms;
                print!(
                    "policy {} {} for {}",
                    holder.policy.id, terms.insurance_type, terms.insured
                );
                match holder.client {
                    Some(client) => println!(" (client {})", client.full_name()),
                    None => println!(),
                }
            }
            print_page(&service.for_policy(PolicyId(id), page, limit).await?, json)?;
        }
        PaymentsCommand::Create {
            policy,
            date,
            amount,
            status,
        } => {
            let input = PaymentForm {
                payment_date: Some(date),
                status,
                amount,
            }
            .validate()?;
            service.create(PolicyId(policy), &input).await?;
            println!("payment recorded for policy {policy}");
        }
    }
    Ok(())
}
