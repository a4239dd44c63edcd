//! In-process implementations of the remote collaborators.
//!
//! Same contracts as the HTTP clients, no network. Used by tests and by
//! offline demos of the CLI.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::RwLock;

use epaket_core::{merge_patch, new_id, now_rfc3339};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use crate::{
    ApiError, AuthProvider, ChangeEvent, ChangeFeed, ChangeKind, DataStore, Identity, Query, Session,
    SessionToken, Subscription,
};

const EVENT_BUFFER: usize = 64;

/// Tables held in memory, with change broadcast and failure injection.
pub struct MemoryStore {
    tables: RwLock<BTreeMap<String, Vec<Value>>>,
    events: broadcast::Sender<ChangeEvent>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    shutdown: CancellationToken,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            tables: RwLock::new(BTreeMap::new()),
            events,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
        }
    }

    /// Parent of every subscription token; cancelling it ends all feeds.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Replace the contents of a table. Does not emit change events.
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        tables.insert(table.to_string(), rows);
    }

    /// Snapshot of a table in insertion order.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        tables.get(table).cloned().unwrap_or_default()
    }

    /// Make every read fail with a 503 until switched off.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, AtomicOrdering::SeqCst);
    }

    /// Make every write fail with a 503 until switched off.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, AtomicOrdering::SeqCst);
    }

    fn check_reads(&self) -> Result<(), ApiError> {
        if self.fail_reads.load(AtomicOrdering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }

    fn check_writes(&self) -> Result<(), ApiError> {
        if self.fail_writes.load(AtomicOrdering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }

    fn emit(&self, table: &str, kind: ChangeKind) {
        // No receivers is fine.
        let _ = self.events.send(ChangeEvent {
            table: table.to_string(),
            kind,
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn unavailable() -> ApiError {
    ApiError::Server {
        status: 503,
        message: "service unavailable".to_string(),
    }
}

/// String form used for equality filters, matching how values appear in a URL.
fn filter_repr(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

fn row_id(row: &Value) -> Option<String> {
    row.get("id").map(filter_repr)
}

#[async_trait::async_trait]
impl DataStore for MemoryStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, ApiError> {
        self.check_reads()?;
        let mut rows: Vec<Value> = {
            let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
            tables
                .get(table)
                .map(|rows| {
                    rows.iter()
                        .filter(|row| {
                            query.filters.iter().all(|(col, val)| {
                                row.get(col).map(filter_repr).as_deref() == Some(val.as_str())
                            })
                        })
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        };

        if let Some(order) = &query.order {
            let null = Value::Null;
            rows.sort_by(|a, b| {
                let ord = compare_values(
                    a.get(&order.column).unwrap_or(&null),
                    b.get(&order.column).unwrap_or(&null),
                );
                if order.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        if let Some(columns) = &query.columns {
            rows = rows
                .into_iter()
                .map(|row| {
                    let mut projected = serde_json::Map::new();
                    for col in columns {
                        if let Some(v) = row.get(col) {
                            projected.insert(col.clone(), v.clone());
                        }
                    }
                    Value::Object(projected)
                })
                .collect();
        }

        Ok(rows)
    }

    async fn insert(&self, table: &str, row: &Value) -> Result<Value, ApiError> {
        self.check_writes()?;
        let Some(obj) = row.as_object() else {
            return Err(ApiError::Server {
                status: 400,
                message: "row must be a JSON object".to_string(),
            });
        };
        let mut obj = obj.clone();
        obj.entry("id").or_insert_with(|| Value::String(new_id()));
        obj.entry("created_at").or_insert_with(|| Value::String(now_rfc3339()));
        let stored = Value::Object(obj);
        let id = row_id(&stored);

        {
            let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
            let rows = tables.entry(table.to_string()).or_default();
            if rows.iter().any(|r| row_id(r) == id) {
                return Err(ApiError::Server {
                    status: 409,
                    message: format!("duplicate key value violates unique constraint \"{}_pkey\"", table),
                });
            }
            rows.push(stored.clone());
        }

        self.emit(table, ChangeKind::Insert);
        Ok(stored)
    }

    async fn update(&self, table: &str, id: &str, patch: &Value) -> Result<Value, ApiError> {
        self.check_writes()?;
        let mut patch = patch.clone();
        if let Some(obj) = patch.as_object_mut() {
            obj.remove("id");
        }

        let updated = {
            let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
            let row = tables
                .get_mut(table)
                .and_then(|rows| rows.iter_mut().find(|r| row_id(r).as_deref() == Some(id)))
                .ok_or_else(|| ApiError::NotFound(format!("{}/{}", table, id)))?;
            merge_patch(row, &patch);
            row.clone()
        };

        self.emit(table, ChangeKind::Update);
        Ok(updated)
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), ApiError> {
        self.check_writes()?;
        {
            let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
            let rows = tables
                .get_mut(table)
                .ok_or_else(|| ApiError::NotFound(format!("{}/{}", table, id)))?;
            let before = rows.len();
            rows.retain(|r| row_id(r).as_deref() != Some(id));
            if rows.len() == before {
                return Err(ApiError::NotFound(format!("{}/{}", table, id)));
            }
        }

        self.emit(table, ChangeKind::Delete);
        Ok(())
    }
}

impl ChangeFeed for MemoryStore {
    fn subscribe(&self, table: &str) -> Subscription {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let cancel = self.shutdown.child_token();
        let mut events = self.events.subscribe();
        let table = table.to_string();
        let stop = cancel.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    received = events.recv() => match received {
                        Ok(event) if event.table == table => {
                            if tx.send(event).await.is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(broadcast::error::RecvError::Lagged(_)) => {
                            let event = ChangeEvent { table: table.clone(), kind: ChangeKind::Changed };
                            if tx.send(event).await.is_err() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });

        Subscription::new(rx, cancel)
    }
}

struct Account {
    password: String,
    identity: Identity,
}

/// Credential table held in memory.
pub struct MemoryAuth {
    accounts: RwLock<BTreeMap<String, Account>>,
    token: std::sync::Arc<SessionToken>,
    sessions: RwLock<BTreeMap<String, Identity>>,
}

impl MemoryAuth {
    pub fn new(token: std::sync::Arc<SessionToken>) -> Self {
        Self {
            accounts: RwLock::new(BTreeMap::new()),
            token,
            sessions: RwLock::new(BTreeMap::new()),
        }
    }

    /// Register an account that can sign in.
    pub fn add_user(&self, id: &str, email: &str, password: &str) {
        let mut accounts = self.accounts.write().unwrap_or_else(|e| e.into_inner());
        accounts.insert(
            email.to_lowercase(),
            Account {
                password: password.to_string(),
                identity: Identity {
                    id: id.to_string(),
                    email: Some(email.to_string()),
                },
            },
        );
    }
}

#[async_trait::async_trait]
impl AuthProvider for MemoryAuth {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let identity = {
            let accounts = self.accounts.read().unwrap_or_else(|e| e.into_inner());
            match accounts.get(&email.to_lowercase()) {
                Some(acc) if acc.password == password => acc.identity.clone(),
                _ => return Err(ApiError::Auth("Invalid login credentials".to_string())),
            }
        };

        let access_token = new_id();
        {
            let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
            sessions.insert(access_token.clone(), identity.clone());
        }
        self.token.set(access_token.clone()).await;

        Ok(Session {
            access_token,
            expires_at: chrono::Utc::now().timestamp() + 3600,
            identity,
        })
    }

    async fn sign_out(&self) -> Result<(), ApiError> {
        if let Some(token) = self.token.get().await {
            let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
            sessions.remove(&token);
        }
        self.token.clear().await;
        Ok(())
    }

    async fn current_identity(&self) -> Result<Option<Identity>, ApiError> {
        let Some(token) = self.token.get().await else {
            return Ok(None);
        };
        let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
        Ok(sessions.get(&token).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.seed(
            "pakages",
            vec![
                json!({"id": "1", "kode": "A-001", "kode_barang": "A", "created_at": "2025-01-01T09:00:00+00:00"}),
                json!({"id": "2", "kode": "B-001", "kode_barang": "B", "created_at": "2025-01-03T09:00:00+00:00"}),
                json!({"id": "3", "kode": "A-002", "kode_barang": "A", "created_at": "2025-01-02T09:00:00+00:00"}),
            ],
        );
        store
    }

    #[tokio::test]
    async fn select_filters_orders_and_limits() {
        let store = seeded();
        let q = Query::new().eq("kode_barang", "A").order("kode", false).limit(1);
        let rows = store.select("pakages", &q).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["kode"], "A-002");

        let all = store
            .select("pakages", &Query::new().order("created_at", false))
            .await
            .unwrap();
        let ids: Vec<&str> = all.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
    }

    #[tokio::test]
    async fn select_projects_columns() {
        let store = seeded();
        let rows = store
            .select("pakages", &Query::new().select(&["kode"]).eq("id", "2"))
            .await
            .unwrap();
        assert_eq!(rows, vec![json!({"kode": "B-001"})]);
    }

    #[tokio::test]
    async fn unknown_table_is_empty() {
        let store = MemoryStore::new();
        assert!(store.select("nothing", &Query::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_fills_generated_columns() {
        let store = MemoryStore::new();
        let row = store.insert("pakages", &json!({"kode": "C-001"})).await.unwrap();
        assert!(row["id"].as_str().is_some());
        assert!(row["created_at"].as_str().unwrap().contains('T'));

        let dup = store.insert("pakages", &json!({"id": row["id"], "kode": "C-002"})).await;
        assert!(matches!(dup, Err(ApiError::Server { status: 409, .. })));
    }

    #[tokio::test]
    async fn update_and_delete_by_id() {
        let store = seeded();
        let row = store
            .update("pakages", "1", &json!({"status": "sudah_diambil", "id": "other"}))
            .await
            .unwrap();
        assert_eq!(row["id"], "1");
        assert_eq!(row["status"], "sudah_diambil");

        assert!(matches!(
            store.update("pakages", "99", &json!({})).await,
            Err(ApiError::NotFound(_))
        ));

        store.delete("pakages", "1").await.unwrap();
        assert_eq!(store.rows("pakages").len(), 2);
        assert!(matches!(store.delete("pakages", "1").await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn injected_failures() {
        let store = seeded();
        store.set_fail_reads(true);
        assert!(store.select("pakages", &Query::new()).await.is_err());
        store.set_fail_reads(false);
        store.set_fail_writes(true);
        assert!(store.delete("pakages", "1").await.is_err());
        assert_eq!(store.rows("pakages").len(), 3);
    }

    #[tokio::test]
    async fn feed_delivers_events_for_table() {
        let store = seeded();
        let mut sub = store.subscribe("pakages");

        store.insert("other", &json!({"x": 1})).await.unwrap();
        store.update("pakages", "2", &json!({"status": "sudah_diambil"})).await.unwrap();

        let event = sub.next().await.unwrap();
        assert_eq!(event.table, "pakages");
        assert_eq!(event.kind, ChangeKind::Update);
    }

    #[tokio::test]
    async fn feed_stops_on_cancel() {
        let store = seeded();
        let mut sub = store.subscribe("pakages");
        sub.cancel_token().cancel();
        assert!(sub.next().await.is_none());
    }

    #[tokio::test]
    async fn auth_sign_in_and_out() {
        let token = Arc::new(SessionToken::new());
        let auth = MemoryAuth::new(token.clone());
        auth.add_user("u1", "Admin@Example.com", "secret");

        assert!(auth.sign_in_with_password("admin@example.com", "wrong").await.is_err());
        assert!(auth.current_identity().await.unwrap().is_none());

        let session = auth.sign_in_with_password("admin@example.com", "secret").await.unwrap();
        assert_eq!(session.identity.id, "u1");
        assert_eq!(token.get().await, Some(session.access_token.clone()));
        assert_eq!(auth.current_identity().await.unwrap().unwrap().id, "u1");

        auth.sign_out().await.unwrap();
        assert!(auth.current_identity().await.unwrap().is_none());
    }
}
