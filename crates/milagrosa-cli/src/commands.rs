//! Command implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result, anyhow, bail};
use chrono::NaiveDate;
use milagrosa_auth::navigation::{CUSTOMER_SECTIONS, STAFF_SECTIONS};
use milagrosa_auth::{Navigator, SessionStore};
use milagrosa_client::{
    ApiConnection, FileStorage, HttpAuthApi, ReportKind, Resource, ResourceClient,
};
use milagrosa_core::models::order::{OrderKind, OrderRequest};
use milagrosa_core::models::role::Role;
use milagrosa_core::models::user::{Credentials, RegistrationRequest};
use serde_json::Value;

use crate::config::CliConfig;

type Store = SessionStore<HttpAuthApi, FileStorage>;

/// Session store and resource client for one invocation.
pub struct App {
    store: Arc<Store>,
    client: ResourceClient<HttpAuthApi, FileStorage>,
}

impl App {
    pub fn new(config: &CliConfig, session_path: PathBuf) -> Result<Self> {
        let conn = ApiConnection::new(&config.client_config())?;
        let store = Arc::new(SessionStore::new(
            HttpAuthApi::new(conn.clone()),
            FileStorage::new(session_path),
            config.auth_config(),
        ));
        store.init();
        let client = ResourceClient::new(conn, store.clone());
        Ok(Self { store, client })
    }
}

// -- session ----------------------------------------------------------------

pub async fn login(app: &App, email: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => rpassword::prompt_password("Password: ")?,
    };
    let session = app.store.login(Credentials::new(email, password)).await?;
    println!("Logged in as {} ({}).", session.identity, session.role);
    print_sections(session.role);
    Ok(())
}

pub fn logout(app: &App) {
    match app.store.current() {
        Some(session) => {
            app.store.logout();
            println!("Logged out {}.", session.identity);
        }
        None => println!("Not logged in."),
    }
}

pub fn whoami(app: &App) {
    let Some(session) = app.store.current() else {
        println!("Not logged in.");
        return;
    };
    println!("{} ({})", session.identity, session.role);
    if let Some(expires_at) = session.expires_at {
        println!("Session expires at {}.", expires_at.to_rfc3339());
    }
}

pub fn sections(app: &App) -> Result<()> {
    let role = app.store.role().ok_or_else(|| anyhow!("Not logged in."))?;
    print_sections(role);
    Ok(())
}

/// Check that the current role may open `name`.
pub fn open(app: &App, name: &str) -> Result<()> {
    let role = app.store.role().ok_or_else(|| anyhow!("Not logged in."))?;
    let section = STAFF_SECTIONS
        .iter()
        .chain(CUSTOMER_SECTIONS.iter())
        .copied()
        .find(|s| s.id() == name)
        .ok_or_else(|| anyhow!("Unknown section \"{name}\"."))?;
    let mut navigator = Navigator::new(role);
    let active = navigator.navigate(section)?;
    println!("{} ({})", active.label(), active.id());
    Ok(())
}

fn print_sections(role: Role) {
    let navigator = Navigator::new(role);
    for section in navigator.sections() {
        let marker = if *section == navigator.active() { "*" } else { " " };
        println!("{marker} {:<14} {}", section.id(), section.label());
    }
}

pub async fn register(app: &App, name: String, email: String, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => {
            let pw = rpassword::prompt_password("Password: ")?;
            let confirm = rpassword::prompt_password("Confirm password: ")?;
            if pw != confirm {
                bail!("Passwords do not match.");
            }
            pw
        }
    };
    let created = app
        .store
        .register(RegistrationRequest {
            name,
            email: email.clone(),
            password,
        })
        .await?;
    if !created {
        bail!("The server refused to register {email}.");
    }
    println!("Registered {email}. Run `milagrosa login {email}` to sign in.");
    Ok(())
}

// -- resources --------------------------------------------------------------

fn resource(name: &str) -> Result<Resource> {
    Resource::from_name(name).ok_or_else(|| {
        let known: Vec<_> = Resource::ALL.iter().map(|r| r.name()).collect();
        anyhow!("Unknown resource \"{name}\". Expected one of: {}", known.join(", "))
    })
}

/// Body from `--json` or `--file`.
fn read_body(json: Option<String>, file: Option<String>) -> Result<Value> {
    let raw = match (json, file) {
        (Some(s), None) => s,
        (None, Some(path)) => std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?,
        (Some(_), Some(_)) => bail!("Use either --json or --file, not both."),
        (None, None) => bail!("A body is required (--json or --file)."),
    };
    serde_json::from_str(&raw).context("body is not valid JSON")
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn get(app: &App, name: &str, id: Option<i64>) -> Result<()> {
    let resource = resource(name)?;
    match id {
        Some(id) => print_json(&app.client.get(resource, id).await?),
        None => print_json(&app.client.list(resource).await?),
    }
}

pub async fn create(app: &App, name: &str, json: Option<String>, file: Option<String>) -> Result<()> {
    let resource = resource(name)?;
    let body = read_body(json, file)?;
    print_json(&app.client.create(resource, body).await?)
}

pub async fn update(app: &App, name: &str, id: i64, json: Option<String>, file: Option<String>) -> Result<()> {
    let resource = resource(name)?;
    let body = read_body(json, file)?;
    print_json(&app.client.update(resource, id, body).await?)
}

pub async fn delete(app: &App, name: &str, id: i64) -> Result<()> {
    let resource = resource(name)?;
    app.client.delete(resource, id).await?;
    println!("Deleted {} {id}.", resource.name());
    Ok(())
}

pub async fn make_admin(app: &App, id: i64) -> Result<()> {
    let account = app
        .client
        .list_users()
        .await?
        .into_iter()
        .find(|u| u.id == id)
        .ok_or_else(|| anyhow!("No user with id {id}."))?;
    let promoted = app.client.make_admin(&account).await?;
    println!("{} is now an administrator.", promoted.email);
    Ok(())
}

pub async fn orders(app: &App, kind: OrderKind) -> Result<()> {
    print_json(&app.client.list_orders(kind).await?)
}

pub async fn place_order(app: &App, kind: OrderKind, json: Option<String>, file: Option<String>) -> Result<()> {
    let request: OrderRequest = serde_json::from_value(read_body(json, file)?)
        .context("body is not a valid order")?;
    print_json(&app.client.place_order(kind, request).await?)
}

pub async fn approve(app: &App, kind: OrderKind, number: i64) -> Result<()> {
    app.client.approve_order(kind, number).await?;
    println!("Approved {} order {number}.", kind.path_segment());
    Ok(())
}

pub async fn report(
    app: &App,
    kind: Option<ReportKind>,
    from: NaiveDate,
    to: NaiveDate,
    out: Option<&Path>,
) -> Result<()> {
    if from > to {
        bail!("--from must not be after --to.");
    }
    let Some(kind) = kind else {
        return print_json(&app.client.report_summary(from, to).await?);
    };
    let pdf = app.client.report_pdf(kind, from, to).await?;
    let default_name = match kind {
        ReportKind::Sales => format!("ventas_{from}_{to}.pdf"),
        ReportKind::Purchases => format!("compras_{from}_{to}.pdf"),
    };
    let path = out.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(default_name));
    std::fs::write(&path, &pdf).with_context(|| format!("writing {}", path.display()))?;
    println!("Saved {} bytes to {}.", pdf.len(), path.display());
    Ok(())
}
