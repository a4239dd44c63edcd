//! `epaket`: the e-Paket command-line front end.
//!
//! Manages contexts and the signed-in session, and drives the parcel,
//! category and dashboard views against the hosted backend.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use commands::parcel::{parse_status, ListArgs, ParcelFields};
use commands::App;
use epaket_core::{Route, Tuning};

/// e-Paket CLI tool.
#[derive(Parser, Debug)]
#[command(name = "epaket", about = "e-Paket parcel tracking CLI")]
struct Cli {
    /// Path to client config file (default: ~/.epaket/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: String,

    /// Rows per listing page (default: 10).
    #[arg(long = "page-size", global = true)]
    page_size: Option<usize>,

    /// Fee per picked-up parcel, used for dashboard revenue (default: 2000).
    #[arg(long = "pickup-fee", global = true)]
    pickup_fee: Option<u64>,

    /// Change polling interval in seconds for `dashboard --watch` (default: 5).
    #[arg(long = "poll-secs", global = true)]
    poll_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage backend contexts.
    #[command(name = "context")]
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },

    /// Switch the current context.
    #[command(name = "use")]
    Use {
        #[command(subcommand)]
        what: UseWhat,
    },

    /// Sign in to the current context.
    Login {
        #[arg(long)]
        email: Option<String>,
        /// Password (not recommended; use the interactive prompt).
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out and clear the token from the current context.
    Logout,

    /// Show the signed-in user and their menu.
    Whoami,

    /// Parcel records.
    Parcel {
        #[command(subcommand)]
        action: ParcelAction,
    },

    /// Category master table.
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Totals, revenue, per-category counts and recent parcels.
    Dashboard {
        /// Keep running and refresh on every change until Ctrl-C.
        #[arg(long)]
        watch: bool,
    },

    /// Open an app page by path (e.g. /dashboard/data).
    Open { path: String },

    /// List app pages.
    Routes,

    /// Show version.
    Version,
}

#[derive(Subcommand, Debug)]
enum ContextAction {
    /// Create a new context.
    Create {
        name: String,
        #[arg(long)]
        server: String,
        #[arg(long = "anon-key")]
        anon_key: String,
    },
    /// List all contexts.
    List,
    /// Set properties on a context.
    Set {
        name: String,
        #[arg(long)]
        server: Option<String>,
        #[arg(long = "anon-key")]
        anon_key: Option<String>,
    },
    /// Delete a context.
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
enum UseWhat {
    /// Switch to a context.
    Context { name: String },
}

#[derive(clap::Args, Debug, Default)]
struct FieldArgs {
    /// Category code (one letter).
    #[arg(long)]
    category: Option<String>,
    /// Item name.
    #[arg(long)]
    item: Option<String>,
    /// Owner / recipient.
    #[arg(long)]
    owner: Option<String>,
    /// Arrival date, YYYY-MM-DD (default: today).
    #[arg(long)]
    date: Option<String>,
    /// belum_diambil or sudah_diambil.
    #[arg(long)]
    status: Option<String>,
}

impl FieldArgs {
    fn into_fields(self) -> anyhow::Result<ParcelFields> {
        Ok(ParcelFields {
            category: self.category,
            item: self.item,
            owner: self.owner,
            date: self.date,
            status: self.status.as_deref().map(parse_status).transpose()?,
        })
    }
}

#[derive(Subcommand, Debug)]
enum ParcelAction {
    /// Register an arrived parcel. The tracking code is generated.
    Add {
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Edit a parcel.
    Edit {
        id: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Show one parcel.
    Get { id: String },
    /// List parcels with filters.
    List {
        /// Matches code, item name or owner.
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        status: Option<String>,
        /// Date prefix, e.g. 2024-05 or 2024-05-01.
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long = "per-page")]
        per_page: Option<usize>,
    },
    /// Search by item name.
    Search {
        text: String,
        #[arg(long)]
        category: Option<String>,
        /// Date prefix, e.g. 2024-05 or 2024-05-01.
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Set the pickup status.
    Status { id: String, status: String },
    /// Delete a parcel.
    Delete {
        id: String,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum CategoryAction {
    /// List category codes.
    List,
    /// Add a category code.
    Add {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        /// Billing category label (e.g. Kecil, Sedang, Besar).
        #[arg(long)]
        billing: String,
    },
    /// Update a category.
    Update {
        id: String,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        billing: Option<String>,
    },
    /// Delete a category.
    Delete {
        id: String,
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(std::path::PathBuf::from)
        .unwrap_or_else(config::ClientConfig::default_path);
    let json_output = cli.output == "json";
    let tuning = Tuning {
        page_size: cli.page_size,
        pickup_fee: cli.pickup_fee,
        poll_secs: cli.poll_secs,
    };

    match cli.command {
        Commands::Context { action } => match action {
            ContextAction::Create { name, server, anon_key } => {
                commands::context::create(&name, &server, &anon_key, &config_path)?;
            }
            ContextAction::List => {
                commands::context::list(&config_path)?;
            }
            ContextAction::Set { name, server, anon_key } => {
                commands::context::set(&name, server.as_deref(), anon_key.as_deref(), &config_path)?;
            }
            ContextAction::Delete { name } => {
                commands::context::delete(&name, &config_path)?;
            }
        },

        Commands::Use { what } => match what {
            UseWhat::Context { name } => {
                commands::context::use_context(&name, &config_path)?;
            }
        },

        Commands::Login { email, password } => {
            let email = match email {
                Some(e) => e,
                None => {
                    eprint!("Email: ");
                    let mut s = String::new();
                    std::io::stdin().read_line(&mut s)?;
                    s.trim().to_string()
                }
            };
            let password = match password {
                Some(p) => p,
                None => rpassword::prompt_password("Password: ")?,
            };
            commands::login::login(&email, &password, &config_path).await?;
        }

        Commands::Logout => {
            commands::login::logout(&config_path).await?;
        }

        Commands::Routes => {
            for path in [
                Route::Landing,
                Route::Login,
                Route::Dashboard,
                Route::ParcelForm { id: None },
                Route::Listing,
                Route::Search,
                Route::CategoryMaster,
            ] {
                println!("{}", path);
            }
        }

        Commands::Version => {
            println!("epaket cli v{}", env!("CARGO_PKG_VERSION"));
        }

        command => {
            let app = App::connect(&config_path, json_output, &tuning)?;
            let result = run(&app, command).await;
            app.backend.shutdown();
            result?;
        }
    }

    Ok(())
}

/// Commands that talk to the backend.
async fn run(app: &App, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Whoami => commands::login::whoami(app).await,

        Commands::Parcel { action } => match action {
            ParcelAction::Add { fields } => commands::parcel::add(app, fields.into_fields()?).await,
            ParcelAction::Edit { id, fields } => {
                commands::parcel::edit(app, &id, fields.into_fields()?).await
            }
            ParcelAction::Get { id } => commands::parcel::get(app, &id).await,
            ParcelAction::List {
                text,
                category,
                status,
                date,
                page,
                per_page,
            } => {
                let args = ListArgs {
                    text,
                    category,
                    status: status.as_deref().map(parse_status).transpose()?,
                    date,
                    page,
                    per_page,
                };
                commands::parcel::list(app, args).await
            }
            ParcelAction::Search {
                text,
                category,
                date,
                page,
            } => {
                let args = ListArgs {
                    text: Some(text),
                    category,
                    date,
                    page,
                    ..Default::default()
                };
                commands::parcel::search(app, args).await
            }
            ParcelAction::Status { id, status } => {
                commands::parcel::set_status(app, &id, parse_status(&status)?).await
            }
            ParcelAction::Delete { id, yes } => commands::parcel::delete(app, &id, yes).await,
        },

        Commands::Category { action } => match action {
            CategoryAction::List => commands::category::list(app).await,
            CategoryAction::Add { code, name, billing } => {
                commands::category::add(app, &code, &name, &billing).await
            }
            CategoryAction::Update {
                id,
                code,
                name,
                billing,
            } => commands::category::update(app, &id, code, name, billing).await,
            CategoryAction::Delete { id, yes } => commands::category::delete(app, &id, yes).await,
        },

        Commands::Dashboard { watch } => commands::dashboard::show(app, watch).await,

        Commands::Open { path } => commands::open::open(app, &path).await,

        other => anyhow::bail!("{:?} does not need a backend", other),
    }
}

