//! Category master commands.

use anyhow::Result;
use ::parcel::views::CategoryMasterView;

use super::{confirmer, print_categories, print_json, App};

fn view(app: &App, yes: bool) -> CategoryMasterView {
    CategoryMasterView::new(app.service(), app.notifier.clone(), confirmer(yes))
}

pub async fn list(app: &App) -> Result<()> {
    let mut view = view(app, true);
    view.load().await?;
    if app.json {
        print_json(&view.entries)
    } else {
        print_categories(&view.entries);
        Ok(())
    }
}

pub async fn add(app: &App, code: &str, name: &str, billing: &str) -> Result<()> {
    let mut view = view(app, true);
    view.load().await?;
    view.form.code = code.to_string();
    view.form.name = name.to_string();
    view.form.billing_category = billing.to_string();
    save(&mut view).await
}

pub async fn update(
    app: &App,
    id: &str,
    code: Option<String>,
    name: Option<String>,
    billing: Option<String>,
) -> Result<()> {
    let mut view = view(app, true);
    view.load().await?;
    if !view.start_edit(id) {
        anyhow::bail!("Category {} not found.", id);
    }
    if let Some(code) = code {
        view.form.code = code;
    }
    if let Some(name) = name {
        view.form.name = name;
    }
    if let Some(billing) = billing {
        view.form.billing_category = billing;
    }
    save(&mut view).await
}

async fn save(view: &mut CategoryMasterView) -> Result<()> {
    if view.save().await {
        return Ok(());
    }
    if !view.errors.is_empty() {
        return Err(super::invalid(&view.errors));
    }
    anyhow::bail!("Category was not saved.")
}

pub async fn delete(app: &App, id: &str, yes: bool) -> Result<()> {
    let mut view = view(app, yes);
    view.load().await?;
    if !view.entries.iter().any(|e| e.id == id) {
        anyhow::bail!("Category {} not found.", id);
    }
    view.delete(id).await;
    Ok(())
}
