/// End-to-end view flows over the in-memory backend.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use epaket_client::{Backend, DataStore, MemoryStore};
use epaket_core::{Confirm, NeverConfirm, NoticeKind, NoticeLog, Route};
use parcel::views::{CategoryMasterView, DashboardView, DataView, ParcelForm, SearchView, SubmitOutcome};
use parcel::{ParcelService, PickupStatus};
use serde_json::json;
use tokio_util::sync::CancellationToken;

struct CountingConfirm {
    answer: bool,
    asked: AtomicUsize,
}

impl CountingConfirm {
    fn new(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            asked: AtomicUsize::new(0),
        })
    }

    fn asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

impl Confirm for CountingConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

fn parcel_row(id: &str, code: &str, name: &str, owner: Option<&str>, status: &str, created_at: &str) -> serde_json::Value {
    let category = &code[..1];
    json!({
        "id": id,
        "kode": code,
        "kode_barang": category,
        "nama_barang": name,
        "kategori": category,
        "pemilik": owner,
        "status": status,
        "created_at": created_at,
    })
}

fn setup() -> (ParcelService, Arc<MemoryStore>) {
    let (backend, store, _auth) = Backend::in_memory();
    store.seed(
        "master_kode_kategori",
        vec![
            json!({"id": "c1", "kode": "A", "nama_kode": "Buku & dokumen", "kategori": "Kecil"}),
            json!({"id": "c2", "kode": "B", "nama_kode": "Pakaian", "kategori": "Sedang"}),
        ],
    );
    store.seed(
        "pakages",
        vec![
            parcel_row("p1", "A-001", "Buku Tulis", Some("Rina"), "belum_diambil", "2025-03-01T00:00:00+00:00"),
            parcel_row("p2", "A-002", "Dokumen", None, "sudah_diambil", "2025-03-02T00:00:00+00:00"),
            parcel_row("p3", "A-005", "Jam Dinding", Some("Budi"), "belum_diambil", "2025-03-03T00:00:00+00:00"),
            parcel_row("p4", "B-001", "Tas", Some("Rina"), "belum_diambil", "2025-03-04T00:00:00+00:00"),
        ],
    );
    (ParcelService::from_backend(&backend), store)
}

#[tokio::test]
async fn test_generator_max_suffix_plus_one() {
    let (svc, _store) = setup();
    let mut form = ParcelForm::create(svc, Arc::new(NoticeLog::new()));
    form.load().await.unwrap();

    form.select_category("A").await;
    assert_eq!(form.code, "A-006");
    assert_eq!(form.category_label, "Kecil");
}

#[tokio::test]
async fn test_generator_empty_category_starts_at_001() {
    let (svc, _store) = setup();
    assert_eq!(svc.generate_code("B").await, "B-002");
    assert_eq!(svc.generate_code("C").await, "C-001");
}

#[tokio::test]
async fn test_listing_filters_and_pages() {
    let (svc, _store) = setup();
    let mut view = DataView::new(svc, Arc::new(NoticeLog::new()), CountingConfirm::new(true), 2);
    view.load().await.unwrap();

    let ids: Vec<&str> = view.listing.parcels().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p4", "p3", "p2", "p1"]);
    assert_eq!(view.listing.total_pages(), 2);

    view.listing.next_page();
    assert_eq!(view.listing.page(), 2);
    view.listing.set_text("rina");
    assert_eq!(view.listing.page(), 1);

    let first: Vec<String> = view.listing.filtered().iter().map(|p| p.id.clone()).collect();
    let second: Vec<String> = view.listing.filtered().iter().map(|p| p.id.clone()).collect();
    assert_eq!(first, vec!["p4", "p1"]);
    assert_eq!(first, second);

    view.listing.set_status(Some(PickupStatus::NotPickedUp));
    view.listing.set_category(Some("A".into()));
    view.listing.set_date_prefix("2025-03-01");
    let ids: Vec<&str> = view.listing.filtered().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p1"]);
    assert_eq!(view.listing.categories(), vec!["A", "B"]);
}

#[tokio::test]
async fn test_search_matches_item_name_only() {
    let (svc, _store) = setup();
    let mut view = SearchView::new(svc, Arc::new(NoticeLog::new()), 10);
    view.load().await.unwrap();

    view.listing.set_text("rina");
    assert_eq!(view.listing.filtered_count(), 0);
    view.listing.set_text("JAM");
    assert_eq!(view.listing.filtered_count(), 1);
}

#[tokio::test]
async fn test_delete_confirms_once_and_removes_one_row() {
    let (svc, store) = setup();
    let confirm = CountingConfirm::new(true);
    let notices = Arc::new(NoticeLog::new());
    let mut view = DataView::new(svc, notices.clone(), confirm.clone(), 10);
    view.load().await.unwrap();

    assert!(view.delete("p2").await);
    assert_eq!(confirm.asked(), 1);
    assert_eq!(view.listing.parcels().len(), 3);
    assert!(view.listing.get("p2").is_none());
    assert_eq!(store.rows("pakages").len(), 3);
    assert_eq!(notices.count(NoticeKind::Error), 0);
}

#[tokio::test]
async fn test_declined_delete_issues_no_call() {
    let (svc, store) = setup();
    let confirm = CountingConfirm::new(false);
    let notices = Arc::new(NoticeLog::new());
    let mut view = DataView::new(svc, notices.clone(), confirm.clone(), 10);
    view.load().await.unwrap();

    // A write would fail loudly if it were attempted.
    store.set_fail_writes(true);
    assert!(!view.delete("p2").await);
    assert_eq!(confirm.asked(), 1);
    assert_eq!(view.listing.parcels().len(), 4);
    assert!(notices.notices().is_empty());
}

#[tokio::test]
async fn test_declined_category_delete_keeps_entry() {
    let (svc, store) = setup();
    let notices = Arc::new(NoticeLog::new());
    let mut view = CategoryMasterView::new(svc, notices.clone(), Arc::new(NeverConfirm));
    view.load().await.unwrap();

    store.set_fail_writes(true);
    assert!(!view.delete("c1").await);
    assert_eq!(view.entries.len(), 2);
    assert_eq!(store.rows("master_kode_kategori").len(), 2);
    assert!(notices.notices().is_empty());
}

#[tokio::test]
async fn test_row_with_null_status_still_lists() {
    let (svc, store) = setup();
    let mut rows = store.rows("pakages");
    rows.push(json!({
        "id": "p5",
        "kode": "B-002",
        "kode_barang": "B",
        "nama_barang": "Sepatu",
        "status": null,
        "created_at": "2025-03-05T00:00:00+00:00",
    }));
    store.seed("pakages", rows);

    let parcels = svc.list_parcels().await.unwrap();
    assert_eq!(parcels.len(), 5);
    let p5 = svc.get_parcel("p5").await.unwrap();
    assert_eq!(p5.status, PickupStatus::NotPickedUp);

    let mut view = DataView::new(svc, Arc::new(NoticeLog::new()), CountingConfirm::new(true), 10);
    view.load().await.unwrap();
    view.listing.set_status(Some(PickupStatus::NotPickedUp));
    assert_eq!(view.listing.filtered_count(), 4);
}

#[tokio::test]
async fn test_failed_delete_keeps_row() {
    let (svc, store) = setup();
    let notices = Arc::new(NoticeLog::new());
    let mut view = DataView::new(svc, notices.clone(), CountingConfirm::new(true), 10);
    view.load().await.unwrap();

    store.set_fail_writes(true);
    assert!(!view.delete("p2").await);
    assert_eq!(view.listing.parcels().len(), 4);
    assert_eq!(notices.count(NoticeKind::Error), 1);
}

#[tokio::test]
async fn test_failed_status_update_leaves_state() {
    let (svc, store) = setup();
    let notices = Arc::new(NoticeLog::new());
    let mut view = DataView::new(svc, notices.clone(), CountingConfirm::new(true), 10);
    view.load().await.unwrap();

    store.set_fail_writes(true);
    assert!(!view.update_status("p1", PickupStatus::PickedUp).await);
    assert_eq!(view.listing.get("p1").unwrap().status, PickupStatus::NotPickedUp);
    assert_eq!(notices.count(NoticeKind::Error), 1);
    assert_eq!(notices.notices().len(), 1);
    assert!(view.updating_id().is_none());

    store.set_fail_writes(false);
    assert!(view.update_status("p1", PickupStatus::PickedUp).await);
    assert_eq!(view.listing.get("p1").unwrap().status, PickupStatus::PickedUp);
}

#[tokio::test]
async fn test_failed_reload_keeps_previous_rows() {
    let (svc, store) = setup();
    let notices = Arc::new(NoticeLog::new());
    let mut view = DataView::new(svc, notices.clone(), CountingConfirm::new(true), 10);
    view.load().await.unwrap();

    store.set_fail_reads(true);
    assert!(view.load().await.is_err());
    assert_eq!(view.listing.parcels().len(), 4);
    assert!(view.error.is_some());
    assert!(!view.loading);
}

#[tokio::test]
async fn test_create_form_flow() {
    let (svc, store) = setup();
    let notices = Arc::new(NoticeLog::new());
    let mut form = ParcelForm::create(svc, notices.clone());
    form.load().await.unwrap();

    form.select_category("b").await;
    assert_eq!(form.category, "B");
    assert_eq!(form.code, "B-002");
    form.set_item_name("Hijab");
    form.set_owner("Sari");
    form.set_date("2025-04-10");

    let outcome = form.submit().await;
    let created = match outcome {
        SubmitOutcome::Created(p) => p,
        other => panic!("unexpected outcome: {other:?}"),
    };
    assert_eq!(created.code, "B-002");
    assert_eq!(created.category_label, "Sedang");
    assert_eq!(created.created_at, "2025-04-10T00:00:00+00:00");
    assert_eq!(created.owner.as_deref(), Some("Sari"));

    assert_eq!(form.code, "B-003");
    assert!(form.item_name.is_empty());
    assert!(form.owner.is_empty());
    assert_eq!(form.category, "B");
    assert_eq!(store.rows("pakages").len(), 5);
    assert_eq!(notices.count(NoticeKind::Success), 1);
}

#[tokio::test]
async fn test_create_form_validation() {
    let (svc, store) = setup();
    let mut form = ParcelForm::create(svc, Arc::new(NoticeLog::new()));
    form.load().await.unwrap();

    assert_eq!(form.submit().await, SubmitOutcome::Invalid);
    assert!(form.errors.get("category").is_some());
    assert!(form.errors.get("item_name").is_some());

    form.select_category("Z").await;
    form.set_item_name("Sepatu");
    form.set_date("10/04/2025");
    assert_eq!(form.submit().await, SubmitOutcome::Invalid);
    assert_eq!(form.errors.get("category"), Some("unknown category Z"));
    assert_eq!(form.errors.get("date"), Some("date must be YYYY-MM-DD"));
    assert_eq!(store.rows("pakages").len(), 4);
}

#[tokio::test]
async fn test_create_form_remote_failure_keeps_fields() {
    let (svc, store) = setup();
    let notices = Arc::new(NoticeLog::new());
    let mut form = ParcelForm::create(svc, notices.clone());
    form.load().await.unwrap();
    form.select_category("A").await;
    form.set_item_name("Buku");

    store.set_fail_writes(true);
    assert_eq!(form.submit().await, SubmitOutcome::Failed);
    assert_eq!(form.item_name, "Buku");
    assert_eq!(form.code, "A-006");
    assert!(!form.busy);
    assert_eq!(notices.count(NoticeKind::Error), 1);
}

#[tokio::test]
async fn test_edit_form_flow() {
    let (svc, store) = setup();
    let route = Route::parse("/dashboard/input/p3").unwrap();
    let mut form = ParcelForm::for_route(svc, Arc::new(NoticeLog::new()), &route).unwrap();
    assert!(form.is_edit());
    form.load().await.unwrap();

    assert_eq!(form.code, "A-005");
    assert_eq!(form.date, "2025-03-03");
    assert_eq!(form.owner, "Budi");

    form.set_status(PickupStatus::PickedUp);
    form.set_item_name("Jam Weker");
    assert_eq!(form.submit().await, SubmitOutcome::Updated { next: Route::Listing });

    let row = store.rows("pakages").into_iter().find(|r| r["id"] == "p3").unwrap();
    assert_eq!(row["status"], "sudah_diambil");
    assert_eq!(row["nama_barang"], "Jam Weker");
    assert_eq!(row["kode"], "A-005");
}

#[tokio::test]
async fn test_edit_form_missing_record() {
    let (svc, _store) = setup();
    let notices = Arc::new(NoticeLog::new());
    let mut form = ParcelForm::edit(svc, notices.clone(), "nope");
    assert!(form.load().await.is_err());
    assert_eq!(notices.count(NoticeKind::Error), 1);
}

#[tokio::test]
async fn test_category_master_flow() {
    let (svc, store) = setup();
    let confirm = CountingConfirm::new(true);
    let notices = Arc::new(NoticeLog::new());
    let mut view = CategoryMasterView::new(svc, notices.clone(), confirm.clone());
    view.load().await.unwrap();
    assert_eq!(view.entries.len(), 2);

    view.form.code = "ab".into();
    view.form.name = "Mixed".into();
    assert!(!view.save().await);
    assert_eq!(view.errors.get("code"), Some("code must be a single letter A-Z"));
    assert_eq!(view.errors.get("billing_category"), Some("billing category is required"));

    view.form.code = "a".into();
    view.form.billing_category = "Kecil".into();
    assert!(!view.save().await);
    assert_eq!(view.errors.get("code"), Some("category A already exists"));

    view.form.code = "c".into();
    assert!(view.save().await);
    let codes: Vec<&str> = view.entries.iter().map(|e| e.code.as_str()).collect();
    assert_eq!(codes, vec!["A", "B", "C"]);
    assert_eq!(view.form.code, "");

    assert!(view.start_edit("c2"));
    view.form.name = "Pakaian & tas".into();
    assert!(view.save().await);
    assert_eq!(view.entries[1].name, "Pakaian & tas");

    assert!(view.delete("c1").await);
    assert_eq!(confirm.asked(), 1);
    assert_eq!(view.entries.len(), 2);
    assert_eq!(store.rows("master_kode_kategori").len(), 2);
    assert_eq!(notices.count(NoticeKind::Success), 3);
}

#[tokio::test]
async fn test_dashboard_stats() {
    let (svc, _store) = setup();
    let mut view = DashboardView::new(svc, Arc::new(NoticeLog::new()), 2000);
    view.refresh().await.unwrap();

    assert_eq!(view.stats.total, 4);
    assert_eq!(view.stats.picked_up, 1);
    assert_eq!(view.stats.not_picked_up, 3);
    assert_eq!(view.stats.revenue, 2000);
    assert_eq!(view.stats.recent[0].id, "p4");
    let labels: Vec<(&str, usize)> = view
        .stats
        .per_category
        .iter()
        .map(|c| (c.label.as_str(), c.count))
        .collect();
    assert_eq!(labels, vec![("A", 3), ("B", 1)]);
}

#[tokio::test]
async fn test_dashboard_watch_refetches_on_change() {
    let (svc, store) = setup();
    let view = DashboardView::new(svc, Arc::new(NoticeLog::new()), 2000);
    let cancel = CancellationToken::new();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let feed = store.clone();
    let stop = cancel.clone();
    let handle = tokio::spawn(async move {
        let mut view = view;
        view.watch(feed.as_ref(), stop, |v| {
            let _ = tx.send(v.stats.total);
        })
        .await;
    });

    let first = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
    assert_eq!(first, Some(4));

    store
        .insert("pakages", &parcel_row("p5", "B-002", "Baju", None, "belum_diambil", "2025-03-05T00:00:00+00:00"))
        .await
        .unwrap();
    let next = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
    assert_eq!(next, Some(5));

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
}
