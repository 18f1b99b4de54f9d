use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::Router;
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use jobboard::config::AppConfig;
use jobboard::models::{Job, JobApplication, JobStatus};
use jobboard::routes;
use jobboard::state::AppState;
use jobboard::storage::{
    load, save, MemoryStore, RecordStore, Snapshot, StoreError, StoreResult, Version,
    APPLICATIONS_COLLECTION, JOBS_COLLECTION,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tower::util::ServiceExt;

/// Store whose every read and write fails, standing in for an unreadable disk.
#[allow(dead_code)]
pub struct UnavailableStore;

#[async_trait]
impl RecordStore for UnavailableStore {
    async fn read(&self, _collection: &str) -> StoreResult<Snapshot> {
        Err(offline())
    }

    async fn write(
        &self,
        _collection: &str,
        _expected: Version,
        _records: Vec<Value>,
    ) -> StoreResult<Version> {
        Err(offline())
    }
}

/// Wraps a `MemoryStore`, failing reads or writes of one collection and
/// rejecting the next `contend(n)` writes as concurrent modifications.
#[allow(dead_code)]
#[derive(Default)]
pub struct FaultyStore {
    pub inner: MemoryStore,
    unreadable: Option<&'static str>,
    unwritable: Option<&'static str>,
    conflicts: AtomicUsize,
}

#[allow(dead_code)]
impl FaultyStore {
    pub fn unreadable(collection: &'static str) -> Self {
        Self {
            unreadable: Some(collection),
            ..Self::default()
        }
    }

    pub fn unwritable(collection: &'static str) -> Self {
        Self {
            unwritable: Some(collection),
            ..Self::default()
        }
    }

    pub fn contend(&self, conflicts: usize) {
        self.conflicts.store(conflicts, Ordering::SeqCst);
    }
}

fn offline() -> StoreError {
    StoreError::Io(io::Error::new(
        io::ErrorKind::PermissionDenied,
        "storage offline",
    ))
}

#[async_trait]
impl RecordStore for FaultyStore {
    async fn read(&self, collection: &str) -> StoreResult<Snapshot> {
        if self.unreadable == Some(collection) {
            return Err(offline());
        }
        self.inner.read(collection).await
    }

    async fn write(
        &self,
        collection: &str,
        expected: Version,
        records: Vec<Value>,
    ) -> StoreResult<Version> {
        if self.unwritable == Some(collection) {
            return Err(offline());
        }
        let contended = self
            .conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if contended {
            return Err(StoreError::Conflict {
                collection: collection.to_string(),
            });
        }
        self.inner.write(collection, expected, records).await
    }
}

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    pub fn with_store(store: Arc<dyn RecordStore>) -> Self {
        let config = AppConfig {
            server_port: 0,
            ping_message: "pong".to_string(),
            ..AppConfig::default()
        };
        let state = AppState::new(config, store);
        let router = routes::create_router(state.clone());
        Self { state, router }
    }

    #[allow(dead_code)]
    pub async fn seed_jobs(&self, jobs: &[Job]) -> Result<()> {
        let current = self.state.store.read(JOBS_COLLECTION).await?.version;
        save(self.state.store(), JOBS_COLLECTION, current, jobs).await?;
        Ok(())
    }

    #[allow(dead_code)]
    pub async fn seed_raw(&self, collection: &str, records: Vec<Value>) -> Result<()> {
        let current = self.state.store.read(collection).await?.version;
        self.state.store.write(collection, current, records).await?;
        Ok(())
    }

    #[allow(dead_code)]
    pub async fn stored_jobs(&self) -> Result<Vec<Job>> {
        Ok(load::<Job>(self.state.store(), JOBS_COLLECTION).await?.1)
    }

    #[allow(dead_code)]
    pub async fn stored_job(&self, id: i64) -> Result<Job> {
        self.stored_jobs()
            .await?
            .into_iter()
            .find(|job| job.id == id)
            .ok_or_else(|| anyhow!("job {id} missing from store"))
    }

    #[allow(dead_code)]
    pub async fn stored_applications(&self) -> Result<Vec<JobApplication>> {
        Ok(load::<JobApplication>(self.state.store(), APPLICATIONS_COLLECTION)
            .await?
            .1)
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        self.send_json(Method::POST, path, payload).await
    }

    #[allow(dead_code)]
    pub async fn patch_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        self.send_json(Method::PATCH, path, payload).await
    }

    pub async fn get(&self, path: &str) -> Result<hyper::Response<Body>> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    #[allow(dead_code)]
    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        self.send_json(Method::PUT, path, payload).await
    }

    #[allow(dead_code)]
    pub async fn post_empty(&self, path: &str) -> Result<hyper::Response<Body>> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .body(Body::empty())?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    #[allow(dead_code)]
    pub async fn delete(&self, path: &str) -> Result<hyper::Response<Body>> {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(path)
            .body(Body::empty())?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    async fn send_json<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        let body = serde_json::to_vec(payload)?;
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body))?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }
}

#[allow(dead_code)]
pub fn sample_job(id: i64, posted_at: DateTime<Utc>) -> Job {
    Job {
        id,
        title: "Senior Frontend Developer".to_string(),
        company: "Acme Corp".to_string(),
        location: "San Francisco, CA".to_string(),
        job_type: "Full-time".to_string(),
        salary_min: Some("100000".to_string()),
        salary_max: Some("150000".to_string()),
        description: "Build the dashboard.".to_string(),
        requirements: "5+ years".to_string(),
        benefits: "Remote friendly".to_string(),
        skills: vec!["React".to_string(), "Node".to_string()],
        posted_at,
        status: JobStatus::Active,
        applicants: 0,
        views: 0,
        interested: 0,
    }
}

pub async fn body_to_vec(body: Body) -> Result<Vec<u8>> {
    let collected = body
        .collect()
        .await
        .map_err(|err| anyhow!("failed to read response body: {err}"))?;
    Ok(collected.to_bytes().to_vec())
}

pub async fn read_json<T: DeserializeOwned>(response: hyper::Response<Body>) -> Result<T> {
    let body = body_to_vec(response.into_body()).await?;
    Ok(serde_json::from_slice(&body)?)
}
