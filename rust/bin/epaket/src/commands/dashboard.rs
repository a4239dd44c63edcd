//! Dashboard command, with an optional live mode.

use anyhow::Result;
use ::parcel::views::DashboardView;
use ::parcel::DashboardStats;
use tracing::info;

use super::{print_json, print_parcels, App};

pub async fn show(app: &App, watch: bool) -> Result<()> {
    let mut view = DashboardView::new(app.service(), app.notifier.clone(), app.backend.config.pickup_fee);

    if !watch {
        view.refresh().await?;
        return render(app, &view.stats);
    }

    let cancel = app.backend.shutdown_token();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted, stopping dashboard watch");
            on_signal.cancel();
        }
    });

    let json = app.json;
    view.watch(app.backend.feed.as_ref(), cancel, |v| {
        if !json {
            // Clear screen and home the cursor.
            print!("\x1b[2J\x1b[H");
        }
        let _ = render(app, &v.stats);
        if let Some(err) = &v.error {
            eprintln!("(showing last good numbers: {})", err);
        }
    })
    .await;
    Ok(())
}

fn render(app: &App, stats: &DashboardStats) -> Result<()> {
    if app.json {
        return print_json(stats);
    }
    println!("Total parcels:     {}", stats.total);
    println!("Picked up:         {}", stats.picked_up);
    println!("Not picked up:     {}", stats.not_picked_up);
    println!("Revenue:           Rp {}", format_rupiah(stats.revenue));
    println!();
    println!("Per category:");
    if stats.per_category.is_empty() {
        println!("  -");
    }
    let widest = stats.per_category.iter().map(|c| c.count).max().unwrap_or(0);
    for c in &stats.per_category {
        println!("  {:16} {:>5} {}", c.label, c.count, bar(c.count, widest));
    }
    println!();
    println!("Recent:");
    let recent: Vec<_> = stats.recent.iter().collect();
    print_parcels(&recent);
    Ok(())
}

fn bar(count: usize, widest: usize) -> String {
    const WIDTH: usize = 30;
    if widest == 0 {
        return String::new();
    }
    "#".repeat((count * WIDTH).div_ceil(widest))
}

/// Thousands separated with dots: 12000 -> "12.000".
fn format_rupiah(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rupiah() {
        assert_eq!(format_rupiah(0), "0");
        assert_eq!(format_rupiah(2000), "2.000");
        assert_eq!(format_rupiah(1234567), "1.234.567");
        assert_eq!(format_rupiah(100), "100");
    }

    #[test]
    fn test_bar_scales_to_widest() {
        assert_eq!(bar(0, 0), "");
        assert_eq!(bar(10, 10).len(), 30);
        assert_eq!(bar(1, 10).len(), 3);
    }
}
