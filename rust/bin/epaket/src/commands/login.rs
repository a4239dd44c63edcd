//! Login / logout / whoami commands.

use std::path::Path;

use anyhow::Result;
use auth::{LoginForm, SessionGate, UserSession};
use epaket_core::Tuning;

use super::App;
use crate::config::ClientConfig;

/// Sign in against the current context and save the session token.
pub async fn login(email: &str, password: &str, client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;
    let ctx_name = config
        .current()
        .ok_or_else(|| anyhow::anyhow!("No current context. Run `epaket use context <name>`."))?
        .name
        .clone();

    let app = App::connect(client_config_path, false, &Tuning::default())?;
    let gate = SessionGate::from_backend(&app.backend);

    let mut form = LoginForm::new();
    form.set_email(email.trim());
    form.set_password(password);
    let landing = form.submit(&gate).await;

    if !form.errors.is_empty() {
        return Err(super::invalid(&form.errors));
    }
    let Some(landing) = landing else {
        anyhow::bail!("Login failed: {}", form.login_error.unwrap_or_default());
    };

    let token = app
        .backend
        .token
        .get()
        .await
        .ok_or_else(|| anyhow::anyhow!("No access token after sign in"))?;

    let ctx = config
        .get_mut(&ctx_name)
        .ok_or_else(|| anyhow::anyhow!("Context disappeared"))?;
    ctx.token = token;
    ctx.email = form.email.clone();
    config.save(client_config_path)?;

    match gate.resolve().await? {
        Some(session) => println!("Logged in as {} ({}).", session.display_name, session.role),
        None => println!("Logged in as {}.", form.email),
    }
    println!("Token saved to context \"{}\".", ctx_name);
    println!("Start at: epaket open {}", landing);
    Ok(())
}

/// Sign out remotely and clear the token from the current context.
pub async fn logout(client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    let current_name = config.current_context.clone();
    if current_name.is_empty() {
        anyhow::bail!("No current context.");
    }

    if let Ok(app) = App::connect(client_config_path, false, &Tuning::default()) {
        SessionGate::from_backend(&app.backend).sign_out().await;
    }

    let ctx = config
        .current_mut()
        .ok_or_else(|| anyhow::anyhow!("Current context not found."))?;
    ctx.token = String::new();
    ctx.email = String::new();
    config.save(client_config_path)?;
    println!("Logged out from context \"{}\".", current_name);
    Ok(())
}

/// Show the signed-in user, role and menu.
pub async fn whoami(app: &App) -> Result<()> {
    let gate = SessionGate::from_backend(&app.backend);
    let Some(session) = gate.resolve().await? else {
        println!("Not signed in. Run `epaket login`.");
        return Ok(());
    };
    print_session(&session);
    Ok(())
}

pub fn print_session(session: &UserSession) {
    println!("Name:   {}", session.display_name);
    println!("Email:  {}", session.identity.email.as_deref().unwrap_or("-"));
    println!("Role:   {}", session.role);
    println!("Menu:");
    for item in session.menu() {
        println!("  {:16} {}", item.title, item.route);
    }
}
