//! `epaket open <path>`: resolve an app route and show its view.

use anyhow::Result;
use auth::SessionGate;
use epaket_core::Route;
use ::parcel::views::ParcelForm;

use super::{category, dashboard, parcel, App};

pub async fn open(app: &App, path: &str) -> Result<()> {
    let route = Route::parse(path).ok_or_else(|| anyhow::anyhow!("No such page: {}", path))?;
    let gate = SessionGate::from_backend(&app.backend);
    let target = gate.guard(route.clone()).await?;
    if target != route {
        println!("{} requires a session; redirected to {}.", route, target);
    }

    match target {
        Route::Landing => {
            println!("e-Paket: parcel tracking for the dorm.");
            println!("Sign in with `epaket login`, then `epaket open /dashboard`.");
        }
        Route::Login => {
            println!("Run `epaket login --email <email>` to sign in.");
        }
        Route::Dashboard => dashboard::show(app, false).await?,
        Route::ParcelForm { .. } => {
            let Some(mut form) = ParcelForm::for_route(app.service(), app.notifier.clone(), &target) else {
                anyhow::bail!("No form for {}", target);
            };
            form.load().await?;
            if form.is_edit() {
                println!("Editing parcel:");
                println!("Date:      {}", form.date);
                println!("Code:      {}", form.code);
                println!("Item:      {}", form.item_name);
                println!("Owner:     {}", if form.owner.is_empty() { "-" } else { &form.owner });
                println!("Category:  {} ({})", form.category, form.category_label);
                println!("Status:    {}", form.status.label());
                println!("Change it with `epaket parcel edit <id> ...`.");
            } else {
                println!("Categories: {}", form.catalog.codes().join(", "));
                println!("Add one with `epaket parcel add --category <code> --item <name>`.");
            }
        }
        Route::Listing => {
            parcel::list(
                app,
                parcel::ListArgs {
                    page: 1,
                    ..Default::default()
                },
            )
            .await?
        }
        Route::Search => {
            let mut view = ::parcel::views::SearchView::new(app.service(), app.notifier.clone(), app.page_size());
            view.load().await?;
            parcel::show_page(app, &view.listing)?;
        }
        Route::CategoryMaster => category::list(app).await?,
    }
    Ok(())
}
