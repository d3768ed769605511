#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::extract::ConnectInfo;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tiny_site::application::services::ImageSettings;
use tiny_site::deps::Deps;
use tiny_site::domain::entities::{File, FilePatch, NewFile, NewZone, Zone, ZonePatch};
use tiny_site::domain::query::{Direction, Selection, project};
use tiny_site::domain::repositories::{FileQuery, FileRepository, ZoneRepository};
use tiny_site::error::AppError;
use tiny_site::infrastructure::clock::FixedClock;
use tiny_site::infrastructure::kv::{KvResult, KvStore};
use tiny_site::infrastructure::optimizer::{
    ImageOptimizer, OptimError, OptimOutput, OptimRequest,
};
use tiny_site::routes::api_router;
use tiny_site::state::AppState;
use tower::Layer;

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2019, 5, 1, 8, 0, 0).unwrap()
}

// ── In-memory zone repository ───────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryZones {
    zones: Mutex<Vec<Zone>>,
    down: AtomicBool,
}

impl MemoryZones {
    /// Makes `list` fail as if the database were unreachable.
    pub fn go_down(&self) {
        self.down.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ZoneRepository for MemoryZones {
    async fn create(&self, new_zone: NewZone) -> Result<Zone, AppError> {
        let mut zones = self.zones.lock().unwrap();
        let zone = Zone {
            id: zones.iter().map(|z| z.id).max().unwrap_or(0) + 1,
            name: new_zone.name,
            owner: new_zone.owner,
            description: new_zone.description,
            created_at: new_zone.created_at,
            updated_at: new_zone.created_at,
        };
        zones.push(zone.clone());
        Ok(zone)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Zone>, AppError> {
        Ok(self.zones.lock().unwrap().iter().find(|z| z.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Zone>, AppError> {
        Ok(self
            .zones
            .lock()
            .unwrap()
            .iter()
            .find(|z| z.name == name)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Zone>, AppError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(AppError::internal("Database error", serde_json::json!({})));
        }
        Ok(self.zones.lock().unwrap().clone())
    }

    async fn update(
        &self,
        id: i64,
        patch: ZonePatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Zone>, AppError> {
        let mut zones = self.zones.lock().unwrap();
        let Some(zone) = zones.iter_mut().find(|z| z.id == id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            zone.name = name;
        }
        if let Some(owner) = patch.owner {
            zone.owner = owner;
        }
        if let Some(description) = patch.description {
            zone.description = Some(description);
        }
        zone.updated_at = updated_at;
        Ok(Some(zone.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut zones = self.zones.lock().unwrap();
        let before = zones.len();
        zones.retain(|z| z.id != id);
        Ok(zones.len() < before)
    }
}

// ── In-memory file repository ───────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryFiles {
    files: Mutex<Vec<File>>,
}

fn compare_field(a: &File, b: &File, name: &str) -> CmpOrdering {
    match name {
        "id" => a.id.cmp(&b.id),
        "createdAt" => a.created_at.cmp(&b.created_at),
        "updatedAt" => a.updated_at.cmp(&b.updated_at),
        "name" => a.name.cmp(&b.name),
        "maxAge" => a.max_age.cmp(&b.max_age),
        "zone" => a.zone.cmp(&b.zone),
        "type" => a.file_type.cmp(&b.file_type),
        "size" => a.size.cmp(&b.size),
        "width" => a.width.cmp(&b.width),
        "height" => a.height.cmp(&b.height),
        "description" => a.description.cmp(&b.description),
        "creator" => a.creator.cmp(&b.creator),
        _ => CmpOrdering::Equal,
    }
}

#[async_trait]
impl FileRepository for MemoryFiles {
    async fn create(&self, new_file: NewFile) -> Result<File, AppError> {
        let mut files = self.files.lock().unwrap();
        if files.iter().any(|f| f.name == new_file.name) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                serde_json::json!({ "constraint": "files_name_key" }),
            ));
        }
        let file = File {
            id: files.iter().map(|f| f.id).max().unwrap_or(0) + 1,
            created_at: new_file.created_at,
            updated_at: new_file.created_at,
            name: new_file.name,
            max_age: new_file.max_age,
            zone: new_file.zone,
            file_type: new_file.file_type.to_string(),
            size: new_file.data.len() as i32,
            width: new_file.width,
            height: new_file.height,
            description: new_file.description,
            creator: new_file.creator,
            thumbnail: new_file.thumbnail,
            data: new_file.data,
        };
        files.push(file.clone());
        Ok(file)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<File>, AppError> {
        Ok(self.files.lock().unwrap().iter().find(|f| f.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<File>, AppError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.name == name)
            .cloned())
    }

    async fn select(
        &self,
        id: i64,
        selection: Selection,
    ) -> Result<Option<Map<String, Value>>, AppError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.id == id)
            .map(|f| project(f, &selection)))
    }

    async fn list(&self, query: FileQuery) -> Result<Vec<Map<String, Value>>, AppError> {
        let mut files: Vec<File> = self
            .files
            .lock()
            .unwrap()
            .iter()
            .filter(|f| query.zone.is_none_or(|z| f.zone == z))
            .cloned()
            .collect();

        files.sort_by(|a, b| {
            query
                .ordering
                .keys()
                .iter()
                .map(|(field, dir)| {
                    let ord = compare_field(a, b, field.name);
                    match dir {
                        Direction::Asc => ord,
                        Direction::Desc => ord.reverse(),
                    }
                })
                .find(|o| *o != CmpOrdering::Equal)
                .unwrap_or(CmpOrdering::Equal)
        });

        Ok(files
            .iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .map(|f| project(f, &query.selection))
            .collect())
    }

    async fn count(&self, zone: Option<i64>) -> Result<i64, AppError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .filter(|f| zone.is_none_or(|z| f.zone == z))
            .count() as i64)
    }

    async fn update(
        &self,
        id: i64,
        patch: FilePatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<File>, AppError> {
        let mut files = self.files.lock().unwrap();
        let Some(file) = files.iter_mut().find(|f| f.id == id) else {
            return Ok(None);
        };
        if let Some(description) = patch.description {
            file.description = Some(description);
        }
        if let Some(max_age) = patch.max_age {
            file.max_age = max_age;
        }
        if let Some(zone) = patch.zone {
            file.zone = zone;
        }
        file.updated_at = updated_at;
        Ok(Some(file.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut files = self.files.lock().unwrap();
        let before = files.len();
        files.retain(|f| f.id != id);
        Ok(files.len() < before)
    }
}

// ── Key-value store and optimizer fakes ─────────────────────────────────────

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Vec<u8>>>,
    down: AtomicBool,
}

impl MemoryStore {
    /// Makes `health_check` report the store as unreachable.
    pub fn go_down(&self) {
        self.down.store(true, Ordering::SeqCst);
    }

    pub fn keys(&self) -> Vec<String> {
        self.values.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> KvResult<Option<Vec<u8>>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8], _ttl: Option<Duration>) -> KvResult<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn del(&self, key: &str) -> KvResult<bool> {
        Ok(self.values.lock().unwrap().remove(key).is_some())
    }

    async fn lock(&self, key: &str, _ttl: Duration) -> KvResult<bool> {
        let mut values = self.values.lock().unwrap();
        if values.contains_key(key) {
            return Ok(false);
        }
        values.insert(key.to_string(), b"1".to_vec());
        Ok(true)
    }

    async fn health_check(&self) -> bool {
        !self.down.load(Ordering::SeqCst)
    }
}

/// Optimizer that answers every request with a fixed payload of the
/// requested type and counts how often it was called.
#[derive(Default)]
pub struct StubOptimizer {
    pub calls: AtomicUsize,
}

impl StubOptimizer {
    pub const OUTPUT: &'static [u8] = b"optimized-bytes";

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageOptimizer for StubOptimizer {
    async fn optimize(&self, request: OptimRequest) -> Result<OptimOutput, OptimError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(OptimOutput {
            data: Self::OUTPUT.to_vec(),
            image_type: request.output,
            width: if request.width == 0 { 320 } else { request.width },
            height: if request.height == 0 { 240 } else { request.height },
        })
    }

    fn is_configured(&self) -> bool {
        true
    }
}

// ── Test harness ────────────────────────────────────────────────────────────

/// Handles to the fakes behind a test application.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub zones: Arc<MemoryZones>,
    pub files: Arc<MemoryFiles>,
    pub kv: Arc<MemoryStore>,
    pub optimizer: Arc<StubOptimizer>,
    pub clock: Arc<FixedClock>,
}

pub fn create_test_app() -> TestApp {
    create_test_app_with_optimizer(Arc::new(StubOptimizer::default()))
}

pub fn create_test_app_with_optimizer(optimizer: Arc<StubOptimizer>) -> TestApp {
    let zones = Arc::new(MemoryZones::default());
    let files = Arc::new(MemoryFiles::default());
    let kv = Arc::new(MemoryStore::default());
    let clock = Arc::new(FixedClock::new(epoch()));

    let deps = Deps {
        kv: kv.clone(),
        files: files.clone(),
        zones: zones.clone(),
        optimizer: optimizer.clone(),
        clock: clock.clone(),
    };

    let state = AppState::from_deps(
        deps,
        ImageSettings {
            public_base_url: "https://img.example.com".to_string(),
            cache_ttl: Duration::from_secs(60),
        },
    );

    TestApp {
        router: api_router(state.clone()).layer(MockConnectInfoLayer),
        state,
        zones,
        files,
        kv,
        optimizer,
        clock,
    }
}

// ── Image fixtures ──────────────────────────────────────────────────────────

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(&13u32.to_be_bytes());
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[8, 6, 0, 0, 0]);
    data
}

pub fn jpeg(width: u16, height: u16) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x11, 0x08];
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&[0x03, 0x01, 0x22, 0x00]);
    data
}

// ── Connect info for the per-IP rate limiter ────────────────────────────────

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
