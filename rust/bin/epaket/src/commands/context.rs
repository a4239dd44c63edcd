//! Context management commands.

use std::path::Path;

use anyhow::Result;

use crate::config::{ClientConfig, Context};

/// Register a hosted backend under a name. The first context becomes current.
pub fn create(name: &str, server: &str, anon_key: &str, client_config_path: &Path) -> Result<()> {
    if server.is_empty() {
        anyhow::bail!("Server URL cannot be empty.");
    }
    if anon_key.is_empty() {
        anyhow::bail!("Anon key cannot be empty.");
    }

    let ctx = Context {
        name: name.to_string(),
        server: server.trim_end_matches('/').to_string(),
        anon_key: anon_key.to_string(),
        ..Default::default()
    };
    ctx.backend_config().validate()?;

    let mut config = ClientConfig::load(client_config_path)?;
    config.upsert_context(ctx);
    if config.current_context.is_empty() {
        config.current_context = name.to_string();
    }
    config.save(client_config_path)?;

    println!("Context \"{}\" created.", name);
    println!("  Server: {}", server);
    Ok(())
}

/// Print contexts, marking the current one and who is signed in.
pub fn list(client_config_path: &Path) -> Result<()> {
    let config = ClientConfig::load(client_config_path)?;

    if config.contexts.is_empty() {
        println!("No contexts configured.");
        println!("Run: epaket context create <name> --server <url> --anon-key <key>");
        return Ok(());
    }

    println!("{:2} {:20} {:40} {:24}", "", "NAME", "SERVER", "USER");
    for ctx in &config.contexts {
        let marker = if ctx.name == config.current_context { "*" } else { " " };
        let server = if ctx.server.is_empty() { "-" } else { &ctx.server };
        let user = if ctx.token.is_empty() {
            "-"
        } else if ctx.email.is_empty() {
            "(signed in)"
        } else {
            &ctx.email
        };
        println!("{:2} {:20} {:40} {:24}", marker, ctx.name, server, user);
    }

    Ok(())
}

/// Make `name` the current context.
pub fn use_context(name: &str, client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    if !config.contexts.iter().any(|c| c.name == name) {
        anyhow::bail!("Context \"{}\" not found. Run `epaket context list` to see available contexts.", name);
    }

    config.current_context = name.to_string();
    config.save(client_config_path)?;
    println!("Switched to context \"{}\".", name);
    Ok(())
}

/// Set properties on a context. Changing the server drops the saved session.
pub fn set(name: &str, server: Option<&str>, anon_key: Option<&str>, client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    let ctx = config
        .get_mut(name)
        .ok_or_else(|| anyhow::anyhow!("Context \"{}\" not found.", name))?;

    if let Some(s) = server {
        let s = s.trim_end_matches('/');
        if s != ctx.server {
            ctx.token = String::new();
            ctx.email = String::new();
        }
        ctx.server = s.to_string();
    }
    if let Some(k) = anon_key {
        ctx.anon_key = k.to_string();
    }
    ctx.backend_config().validate()?;

    config.save(client_config_path)?;
    println!("Context \"{}\" updated.", name);
    Ok(())
}

/// Forget a context and its saved session.
pub fn delete(name: &str, client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    if !config.remove_context(name) {
        anyhow::bail!("Context \"{}\" not found.", name);
    }

    config.save(client_config_path)?;
    println!("Context \"{}\" deleted.", name);
    Ok(())
}
