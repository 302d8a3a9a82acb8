//! `milagrosa`, the command-line client for the La Milagrosa shop backend.
//!
//! Signs in, keeps the session between runs and drives the back-office
//! and storefront APIs with the signed-in role's permissions.

mod commands;
mod config;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use milagrosa_client::ReportKind;
use milagrosa_core::models::order::OrderKind;
use tracing_subscriber::EnvFilter;

use crate::commands::App;
use crate::config::CliConfig;

#[derive(Parser, Debug)]
#[command(name = "milagrosa", about = "La Milagrosa shop client", version)]
struct Cli {
    /// Path to config file (default: ~/.milagrosa/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the API root for this run.
    #[arg(long, global = true)]
    server: Option<String>,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in; the session is kept until logout or expiry.
    Login {
        email: String,
        /// Password (prompted if omitted).
        #[arg(long)]
        password: Option<String>,
    },
    /// End the current session.
    Logout,
    /// Show the signed-in identity and role.
    Whoami,
    /// List the sections the current role may open.
    Sections,
    /// Open a section by id.
    Open { section: String },
    /// Create a customer account.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// List a resource, or fetch one item by id.
    Get { resource: String, id: Option<i64> },
    /// Create a resource item.
    Create {
        resource: String,
        #[arg(long = "json")]
        json_body: Option<String>,
        #[arg(short = 'f', long = "file")]
        file: Option<String>,
    },
    /// Replace a resource item.
    Update {
        resource: String,
        id: i64,
        #[arg(long = "json")]
        json_body: Option<String>,
        #[arg(short = 'f', long = "file")]
        file: Option<String>,
    },
    /// Delete a resource item.
    Delete { resource: String, id: i64 },
    /// Grant the administrator role to a user.
    MakeAdmin { id: i64 },
    /// List orders.
    Orders {
        #[arg(value_enum)]
        kind: KindArg,
    },
    /// Place an order under the signed-in account.
    Order {
        #[arg(value_enum)]
        kind: KindArg,
        #[arg(long = "json")]
        json_body: Option<String>,
        #[arg(short = 'f', long = "file")]
        file: Option<String>,
    },
    /// Approve an order.
    Approve {
        #[arg(value_enum)]
        kind: KindArg,
        number: i64,
    },
    /// Download a report, or print the summary.
    Report {
        #[arg(value_enum)]
        kind: ReportArg,
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
        /// Output file for PDF reports.
        #[arg(short = 'o', long)]
        out: Option<PathBuf>,
    },
    /// Save the API root to the config file.
    SetServer { url: String },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Customer,
    Purchase,
}

impl From<KindArg> for OrderKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Customer => OrderKind::Customer,
            KindArg::Purchase => OrderKind::Purchase,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReportArg {
    Sales,
    Purchases,
    Summary,
}

impl ReportArg {
    fn pdf_kind(self) -> Option<ReportKind> {
        match self {
            ReportArg::Sales => Some(ReportKind::Sales),
            ReportArg::Purchases => Some(ReportKind::Purchases),
            ReportArg::Summary => None,
        }
    }
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("milagrosa=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config_path = cli.config.unwrap_or_else(CliConfig::default_path);
    let mut config = CliConfig::load(&config_path)?;
    tracing::debug!(path = %config_path.display(), server = %config.server, "config loaded");

    if let Commands::SetServer { url } = &cli.command {
        config.server = url.trim_end_matches('/').to_string();
        config.save(&config_path)?;
        println!("Server set to {}.", config.server);
        return Ok(());
    }
    if let Some(server) = cli.server {
        config.server = server;
    }

    let app = App::new(&config, config.session_path(&config_path))?;

    match cli.command {
        Commands::Login { email, password } => commands::login(&app, &email, password).await,
        Commands::Logout => {
            commands::logout(&app);
            Ok(())
        }
        Commands::Whoami => {
            commands::whoami(&app);
            Ok(())
        }
        Commands::Sections => commands::sections(&app),
        Commands::Open { section } => commands::open(&app, &section),
        Commands::Register {
            name,
            email,
            password,
        } => commands::register(&app, name, email, password).await,
        Commands::Get { resource, id } => commands::get(&app, &resource, id).await,
        Commands::Create {
            resource,
            json_body,
            file,
        } => commands::create(&app, &resource, json_body, file).await,
        Commands::Update {
            resource,
            id,
            json_body,
            file,
        } => commands::update(&app, &resource, id, json_body, file).await,
        Commands::Delete { resource, id } => commands::delete(&app, &resource, id).await,
        Commands::MakeAdmin { id } => commands::make_admin(&app, id).await,
        Commands::Orders { kind } => commands::orders(&app, kind.into()).await,
        Commands::Order {
            kind,
            json_body,
            file,
        } => commands::place_order(&app, kind.into(), json_body, file).await,
        Commands::Approve { kind, number } => commands::approve(&app, kind.into(), number).await,
        Commands::Report {
            kind,
            from,
            to,
            out,
        } => commands::report(&app, kind.pdf_kind(), from, to, out.as_deref()).await,
        Commands::SetServer { .. } => Ok(()),
    }
}
