pub mod category;
pub mod context;
pub mod dashboard;
pub mod login;
pub mod open;
pub mod parcel;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use epaket_client::{Backend, SessionToken};
use epaket_core::{AlwaysConfirm, Confirm, Notice, NoticeKind, Notifier, Tuning};
use ::parcel::{CategoryEntry, Parcel, ParcelService};

use crate::config::ClientConfig;

/// Everything a command needs: the backend of the current context and the
/// terminal implementations of the view seams.
pub struct App {
    pub backend: Backend,
    pub notifier: Arc<dyn Notifier>,
    pub json: bool,
}

impl App {
    /// Connect using the current context, restoring its saved token.
    /// `tuning` comes from the global command-line flags.
    pub fn connect(client_config_path: &Path, json: bool, tuning: &Tuning) -> Result<Self> {
        let config = ClientConfig::load(client_config_path)?;
        let token = match config.current() {
            Some(ctx) if !ctx.token.is_empty() => SessionToken::restored(&ctx.token),
            _ => SessionToken::new(),
        };
        let backend = Backend::remote_with_token(config.backend_config().with_tuning(tuning), Arc::new(token))
            .map_err(|e| {
                anyhow::anyhow!(
                    "{}. Run `epaket context create <name> --server <url> --anon-key <key>` or set EPAKET_URL / EPAKET_ANON_KEY.",
                    e
                )
            })?;
        Ok(Self {
            backend,
            notifier: Arc::new(StderrNotifier),
            json,
        })
    }

    pub fn service(&self) -> ParcelService {
        ParcelService::from_backend(&self.backend)
    }

    pub fn page_size(&self) -> usize {
        self.backend.config.page_size
    }
}

/// `--yes` skips the prompt.
pub fn confirmer(yes: bool) -> Arc<dyn Confirm> {
    if yes {
        Arc::new(AlwaysConfirm)
    } else {
        Arc::new(StdinConfirm)
    }
}

/// Asks on stderr, reads the answer from stdin. Only `y` confirms.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        eprint!("{} [y/N]: ", prompt);
        let _ = std::io::stderr().flush();
        let mut s = String::new();
        if std::io::stdin().read_line(&mut s).is_err() {
            return false;
        }
        let yes = s.trim().eq_ignore_ascii_case("y");
        if !yes {
            println!("Cancelled.");
        }
        yes
    }
}

/// Prints notices to stderr so stdout stays clean for `-o json`.
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notice: Notice) {
        let tag = match notice.kind {
            NoticeKind::Success => "ok",
            NoticeKind::Error => "error",
            NoticeKind::Info => "info",
        };
        eprintln!("[{}] {}", tag, notice.message);
    }
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_parcels(parcels: &[&Parcel]) {
    if parcels.is_empty() {
        println!("No parcels.");
        return;
    }
    println!(
        "{:38} {:10} {:12} {:24} {:16} {:14} {:10}",
        "ID", "CODE", "DATE", "ITEM", "OWNER", "CATEGORY", "STATUS"
    );
    for p in parcels {
        println!(
            "{:38} {:10} {:12} {:24} {:16} {:14} {:10}",
            p.id,
            p.code,
            epaket_core::date_part(&p.created_at),
            p.item_name,
            p.owner_or_dash(),
            p.group_label(),
            p.status.label()
        );
    }
}

pub fn print_parcel(p: &Parcel) {
    println!("ID:        {}", p.id);
    println!("Code:      {}", p.code);
    println!("Date:      {}", epaket_core::date_part(&p.created_at));
    println!("Item:      {}", p.item_name);
    println!("Owner:     {}", p.owner_or_dash());
    println!("Category:  {} ({})", p.category, p.group_label());
    println!("Status:    {}", p.status.label());
}

pub fn print_categories(entries: &[CategoryEntry]) {
    if entries.is_empty() {
        println!("No categories.");
        return;
    }
    println!("{:38} {:6} {:24} {:16}", "ID", "CODE", "NAME", "BILLING");
    for e in entries {
        println!("{:38} {:6} {:24} {:16}", e.id, e.code, e.name, e.billing_category);
    }
}

/// Turn field errors into one command error.
pub fn invalid(errors: &epaket_core::FieldErrors) -> anyhow::Error {
    let lines: Vec<String> = errors.iter().map(|(field, msg)| format!("  {}: {}", field, msg)).collect();
    anyhow::anyhow!("Invalid input:\n{}", lines.join("\n"))
}
