//! Parcel commands: add, edit, get, list, search, status, delete.

use anyhow::Result;
use ::parcel::views::{DataView, ParcelForm, SearchView, SubmitOutcome};
use ::parcel::{Listing, PickupStatus};

use super::{confirmer, print_json, print_parcel, print_parcels, App};

/// Fields accepted by `parcel add` / `parcel edit`.
#[derive(Debug, Default)]
pub struct ParcelFields {
    pub category: Option<String>,
    pub item: Option<String>,
    pub owner: Option<String>,
    pub date: Option<String>,
    pub status: Option<PickupStatus>,
}

/// Filters accepted by `parcel list` and `parcel search`.
#[derive(Debug, Default)]
pub struct ListArgs {
    pub text: Option<String>,
    pub category: Option<String>,
    pub status: Option<PickupStatus>,
    pub date: Option<String>,
    pub page: usize,
    pub per_page: Option<usize>,
}

pub fn parse_status(s: &str) -> Result<PickupStatus> {
    s.parse::<PickupStatus>()
        .map_err(|_| anyhow::anyhow!("Unknown status \"{}\". Use belum_diambil or sudah_diambil.", s))
}

/// Create a parcel. The code is generated from the category.
pub async fn add(app: &App, fields: ParcelFields) -> Result<()> {
    let mut form = ParcelForm::create(app.service(), app.notifier.clone());
    form.load().await?;
    apply(&mut form, fields).await;

    match form.submit().await {
        SubmitOutcome::Created(parcel) => {
            if app.json {
                print_json(&parcel)?;
            } else {
                print_parcel(&parcel);
            }
            Ok(())
        }
        SubmitOutcome::Invalid => Err(super::invalid(&form.errors)),
        _ => anyhow::bail!("Parcel was not saved."),
    }
}

/// Edit a parcel. Only the given fields change; a new category gets a new code.
pub async fn edit(app: &App, id: &str, fields: ParcelFields) -> Result<()> {
    let mut form = ParcelForm::edit(app.service(), app.notifier.clone(), id);
    form.load().await?;
    apply(&mut form, fields).await;

    match form.submit().await {
        SubmitOutcome::Updated { next } => {
            println!("Parcel {} updated.", form.code);
            println!("Next: epaket open {}", next);
            Ok(())
        }
        SubmitOutcome::Invalid => Err(super::invalid(&form.errors)),
        _ => anyhow::bail!("Parcel was not saved."),
    }
}

async fn apply(form: &mut ParcelForm, fields: ParcelFields) {
    if let Some(category) = fields.category {
        if !category.eq_ignore_ascii_case(&form.category) {
            // Selecting a category clears the item name, so it goes first.
            let item = form.item_name.clone();
            form.select_category(&category).await;
            if fields.item.is_none() {
                form.set_item_name(item);
            }
        }
    }
    if let Some(item) = fields.item {
        form.set_item_name(item);
    }
    if let Some(owner) = fields.owner {
        form.set_owner(owner);
    }
    if let Some(date) = fields.date {
        form.set_date(date);
    }
    if let Some(status) = fields.status {
        form.set_status(status);
    }
}

pub async fn get(app: &App, id: &str) -> Result<()> {
    let parcel = app.service().get_parcel(id).await?;
    if app.json {
        print_json(&parcel)
    } else {
        print_parcel(&parcel);
        Ok(())
    }
}

/// The admin listing: free text over code, item name and owner.
pub async fn list(app: &App, args: ListArgs) -> Result<()> {
    let mut view = DataView::new(app.service(), app.notifier.clone(), confirmer(true), app.page_size());
    view.load().await?;
    apply_filters(&mut view.listing, args);
    show_page(app, &view.listing)
}

/// The resident search: text matches the item name only; category and
/// date prefix narrow it further.
pub async fn search(app: &App, args: ListArgs) -> Result<()> {
    let mut view = SearchView::new(app.service(), app.notifier.clone(), app.page_size());
    view.load().await?;
    apply_filters(&mut view.listing, args);
    show_page(app, &view.listing)
}

/// Set every given filter, then jump to the requested page.
fn apply_filters(listing: &mut Listing, args: ListArgs) {
    if let Some(n) = args.per_page {
        listing.set_per_page(n);
    }
    if let Some(text) = args.text {
        listing.set_text(text);
    }
    listing.set_category(args.category.map(|c| c.to_ascii_uppercase()));
    listing.set_status(args.status);
    if let Some(date) = args.date {
        listing.set_date_prefix(date);
    }
    listing.go_to(args.page);
}

pub fn show_page(app: &App, listing: &Listing) -> Result<()> {
    let items = listing.page_items();
    if app.json {
        return print_json(&items);
    }
    print_parcels(&items);
    if listing.total_pages() > 0 {
        println!(
            "Page {}/{} ({} parcels)",
            listing.page(),
            listing.total_pages(),
            listing.filtered_count()
        );
    }
    Ok(())
}

pub async fn set_status(app: &App, id: &str, status: PickupStatus) -> Result<()> {
    let mut view = DataView::new(app.service(), app.notifier.clone(), confirmer(true), app.page_size());
    if !view.update_status(id, status).await {
        anyhow::bail!("Status not changed.");
    }
    println!("Parcel {} marked {}.", id, status.label());
    Ok(())
}

pub async fn delete(app: &App, id: &str, yes: bool) -> Result<()> {
    let mut view = DataView::new(app.service(), app.notifier.clone(), confirmer(yes), app.page_size());
    // Load so the success notice can name the parcel code.
    view.load().await?;
    if view.listing.get(id).is_none() {
        anyhow::bail!("Parcel {} not found.", id);
    }
    if view.delete(id).await {
        Ok(())
    } else if yes {
        anyhow::bail!("Parcel was not deleted.")
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::parcel::SearchScope;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("sudah_diambil").unwrap(), PickupStatus::PickedUp);
        assert_eq!(parse_status("belum_diambil").unwrap(), PickupStatus::NotPickedUp);
        assert!(parse_status("lost").is_err());
    }

    fn row(id: &str, code: &str, item: &str, owner: &str, created_at: &str) -> ::parcel::Parcel {
        ::parcel::Parcel {
            id: id.into(),
            category: code[..1].into(),
            code: code.into(),
            item_name: item.into(),
            category_label: "Kecil".into(),
            owner: Some(owner.into()),
            status: PickupStatus::NotPickedUp,
            created_at: created_at.into(),
        }
    }

    fn sample() -> Vec<::parcel::Parcel> {
        vec![
            row("p1", "A-001", "Buku", "Rina", "2025-03-01T08:00:00+00:00"),
            row("p2", "B-001", "Buku Tulis", "Budi", "2025-04-02T08:00:00+00:00"),
            row("p3", "A-002", "Tas", "Rina", "2025-04-03T08:00:00+00:00"),
        ]
    }

    #[test]
    fn test_search_filters_by_category_and_date() {
        let mut listing = Listing::new(10, SearchScope::ItemName);
        listing.set_parcels(sample());
        apply_filters(
            &mut listing,
            ListArgs {
                text: Some("buku".into()),
                category: Some("b".into()),
                date: Some("2025-04".into()),
                page: 1,
                ..Default::default()
            },
        );
        let ids: Vec<&str> = listing.filtered().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p2"]);
    }

    #[test]
    fn test_list_text_ignores_category_label() {
        let mut listing = Listing::new(10, SearchScope::All);
        listing.set_parcels(sample());
        apply_filters(
            &mut listing,
            ListArgs {
                text: Some("kecil".into()),
                page: 1,
                ..Default::default()
            },
        );
        assert_eq!(listing.filtered_count(), 0);

        listing.set_text("rina");
        assert_eq!(listing.filtered_count(), 2);
    }
}
