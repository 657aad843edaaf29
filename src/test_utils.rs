// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses and cluster state.

use crate::error::{OperatorError, Result};
use crate::store::{ManagedObject, MutationApplier, StateReader};
use http::{Request, Response};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use k8s_openapi::chrono::Utc;
use kube::client::Body;
use kube::error::ErrorResponse;
use kube::Client;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// Requests seen by a [`MockService`], as (method, path)
pub type RequestLog = Arc<Mutex<Vec<(String, String)>>>;

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: RequestLog,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    /// Shared log of every request this service (or its clones) receives
    pub fn requests(&self) -> RequestLog {
        self.requests.clone()
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        self.responses
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

type MockResult<T> = std::result::Result<T, tower::BoxError>;

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<Box<dyn Future<Output = MockResult<Self::Response>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        self.requests
            .lock()
            .unwrap()
            .push((method.clone(), path.clone()));
        let (status, body) = self
            .find_response(&method, &path)
            .unwrap_or_else(|| (404, not_found_json("object", &path)));

        Box::pin(async move {
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a mock Deployment JSON response
pub fn deployment_json(namespace: &str, name: &str) -> String {
    serde_json::json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": "test-uid",
            "resourceVersion": "1"
        }
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// Build the error the API server would return
pub fn api_error(code: u16, reason: &str, message: impl Into<String>) -> OperatorError {
    OperatorError::KubeError(kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: message.into(),
        reason: reason.to_string(),
        code,
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Create,
    Update,
    Delete,
}

/// A mutation applied to a [`FakeStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub verb: Verb,
    pub kind: String,
    pub name: String,
}

impl Mutation {
    pub fn new(verb: Verb, kind: &str, name: &str) -> Self {
        Self {
            verb,
            kind: kind.to_string(),
            name: name.to_string(),
        }
    }
}

type ObjectKey = (String, String, String);

struct InjectedFailure {
    verb: Verb,
    kind: String,
    code: u16,
    reason: String,
}

#[derive(Default)]
struct FakeState {
    objects: BTreeMap<ObjectKey, serde_json::Value>,
    next_resource_version: u64,
    failures: Vec<InjectedFailure>,
    mutations: Vec<Mutation>,
}

/// In-memory cluster state with the API server's finalizer and
/// resourceVersion semantics. Clones share the same state.
#[derive(Clone, Default)]
pub struct FakeStore {
    state: Arc<Mutex<FakeState>>,
}

fn key<K: ManagedObject>(namespace: &str, name: &str) -> ObjectKey {
    (K::kind(&()).to_string(), namespace.to_string(), name.to_string())
}

fn key_of<K: ManagedObject>(obj: &K) -> ObjectKey {
    let meta = obj.meta();
    key::<K>(
        meta.namespace.as_deref().unwrap_or_default(),
        meta.name.as_deref().unwrap_or_default(),
    )
}

fn to_value<K: ManagedObject>(obj: &K) -> serde_json::Value {
    serde_json::to_value(obj).expect("object serializes")
}

fn from_value<K: ManagedObject>(value: &serde_json::Value) -> K {
    serde_json::from_value(value.clone()).expect("stored object deserializes")
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object directly, bypassing failure injection and the mutation log
    pub fn insert<K: ManagedObject>(&self, obj: K) {
        let mut state = self.state.lock().unwrap();
        let obj = Self::stamp(&mut state, obj);
        state.objects.insert(key_of(&obj), to_value(&obj));
    }

    /// Read an object directly, bypassing failure injection
    pub fn object<K: ManagedObject>(&self, namespace: &str, name: &str) -> Option<K> {
        self.state
            .lock()
            .unwrap()
            .objects
            .get(&key::<K>(namespace, name))
            .map(from_value)
    }

    /// Delete the way a user would: objects holding finalizers only get a deletion timestamp
    pub fn request_deletion<K: ManagedObject>(&self, namespace: &str, name: &str) {
        let mut state = self.state.lock().unwrap();
        Self::apply_delete::<K>(&mut state, &key::<K>(namespace, name));
    }

    /// Make the next matching call fail with the given API status
    pub fn fail_next(&self, verb: Verb, kind: &str, code: u16, reason: &str) {
        self.state.lock().unwrap().failures.push(InjectedFailure {
            verb,
            kind: kind.to_string(),
            code,
            reason: reason.to_string(),
        });
    }

    pub fn mutations(&self) -> Vec<Mutation> {
        self.state.lock().unwrap().mutations.clone()
    }

    pub fn clear_mutations(&self) {
        self.state.lock().unwrap().mutations.clear();
    }

    fn stamp<K: ManagedObject>(state: &mut FakeState, mut obj: K) -> K {
        state.next_resource_version += 1;
        obj.meta_mut().resource_version = Some(state.next_resource_version.to_string());
        obj
    }

    fn take_failure(state: &mut FakeState, verb: Verb, kind: &str) -> Result<()> {
        let position = state
            .failures
            .iter()
            .position(|f| f.verb == verb && f.kind == kind);
        match position {
            Some(index) => {
                let failure = state.failures.remove(index);
                Err(api_error(
                    failure.code,
                    &failure.reason,
                    format!("injected {:?} failure for {}", verb, kind),
                ))
            }
            None => Ok(()),
        }
    }

    fn apply_delete<K: ManagedObject>(state: &mut FakeState, key: &ObjectKey) -> bool {
        let Some(value) = state.objects.get(key) else {
            return false;
        };
        let mut obj: K = from_value(value);
        let has_finalizers = obj.meta().finalizers.as_ref().is_some_and(|f| !f.is_empty());

        if has_finalizers {
            if obj.meta().deletion_timestamp.is_none() {
                obj.meta_mut().deletion_timestamp = Some(Time(Utc::now()));
                let obj = Self::stamp(state, obj);
                state.objects.insert(key.clone(), to_value(&obj));
            }
        } else {
            state.objects.remove(key);
        }
        true
    }

    fn get_sync<K: ManagedObject>(&self, namespace: &str, name: &str) -> Result<Option<K>> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state, Verb::Get, &K::kind(&()))?;
        Ok(state.objects.get(&key::<K>(namespace, name)).map(from_value))
    }

    fn create_sync<K: ManagedObject>(&self, obj: &K) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let key = key_of(obj);
        Self::take_failure(&mut state, Verb::Create, &key.0)?;

        if state.objects.contains_key(&key) {
            return Err(api_error(
                409,
                "AlreadyExists",
                format!("{} \"{}\" already exists", key.0, key.2),
            ));
        }

        let obj = Self::stamp(&mut state, obj.clone());
        state.objects.insert(key.clone(), to_value(&obj));
        state.mutations.push(Mutation::new(Verb::Create, &key.0, &key.2));
        Ok(())
    }

    fn update_sync<K: ManagedObject>(&self, obj: &K) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let key = key_of(obj);
        Self::take_failure(&mut state, Verb::Update, &key.0)?;

        let Some(current) = state.objects.get(&key) else {
            return Err(api_error(
                404,
                "NotFound",
                format!("{} \"{}\" not found", key.0, key.2),
            ));
        };
        let current: K = from_value(current);
        if obj.meta().resource_version.is_some()
            && obj.meta().resource_version != current.meta().resource_version
        {
            return Err(api_error(
                409,
                "Conflict",
                format!("the object {} has been modified", key.2),
            ));
        }

        let mut updated = obj.clone();
        // deletionTimestamp is owned by the server
        updated.meta_mut().deletion_timestamp = current.meta().deletion_timestamp.clone();
        let released = updated.meta().deletion_timestamp.is_some()
            && updated.meta().finalizers.as_ref().map_or(true, |f| f.is_empty());

        if released {
            state.objects.remove(&key);
        } else {
            let updated = Self::stamp(&mut state, updated);
            state.objects.insert(key.clone(), to_value(&updated));
        }
        state.mutations.push(Mutation::new(Verb::Update, &key.0, &key.2));
        Ok(())
    }

    fn delete_sync<K: ManagedObject>(&self, obj: &K) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let key = key_of(obj);
        Self::take_failure(&mut state, Verb::Delete, &key.0)?;

        if !Self::apply_delete::<K>(&mut state, &key) {
            return Err(api_error(
                404,
                "NotFound",
                format!("{} \"{}\" not found", key.0, key.2),
            ));
        }
        state.mutations.push(Mutation::new(Verb::Delete, &key.0, &key.2));
        Ok(())
    }
}

impl StateReader for FakeStore {
    async fn get<K: ManagedObject>(&self, namespace: &str, name: &str) -> Result<Option<K>> {
        self.get_sync(namespace, name)
    }
}

impl MutationApplier for FakeStore {
    async fn create<K: ManagedObject>(&self, obj: &K) -> Result<()> {
        self.create_sync(obj)
    }

    async fn update<K: ManagedObject>(&self, obj: &K) -> Result<()> {
        self.update_sync(obj)
    }

    async fn delete<K: ManagedObject>(&self, obj: &K) -> Result<()> {
        self.delete_sync(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FINALIZER;
    use k8s_openapi::api::core::v1::ConfigMap;
    use kube::api::ObjectMeta;

    fn config_map(name: &str, finalizers: Option<Vec<String>>) -> ConfigMap {
        ConfigMap {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some("ns".to_string()),
                finalizers,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates() {
        let store = FakeStore::new();
        store.create(&config_map("cm", None)).await.unwrap();

        let err = store.create(&config_map("cm", None)).await.unwrap_err();

        assert!(err.is_already_exists());
        assert_eq!(store.mutations().len(), 1);
    }

    #[tokio::test]
    async fn test_update_with_stale_resource_version_conflicts() {
        let store = FakeStore::new();
        store.insert(config_map("cm", None));
        let stale: ConfigMap = store.get("ns", "cm").await.unwrap().unwrap();
        store.update(&stale).await.unwrap();

        let err = store.update(&stale).await.unwrap_err();

        assert!(matches!(err, OperatorError::KubeError(kube::Error::Api(ref e)) if e.code == 409));
    }

    #[tokio::test]
    async fn test_deletion_waits_for_finalizers() {
        let store = FakeStore::new();
        store.insert(config_map("cm", Some(vec![FINALIZER.to_string()])));

        store.request_deletion::<ConfigMap>("ns", "cm");
        let mut pending: ConfigMap = store.get("ns", "cm").await.unwrap().unwrap();
        assert!(pending.metadata.deletion_timestamp.is_some());

        pending.metadata.finalizers = Some(vec![]);
        store.update(&pending).await.unwrap();

        assert!(store.object::<ConfigMap>("ns", "cm").is_none());
    }

    #[tokio::test]
    async fn test_injected_failure_fires_once() {
        let store = FakeStore::new();
        store.insert(config_map("cm", None));
        store.fail_next(Verb::Get, "ConfigMap", 500, "InternalError");

        assert!(store.get::<ConfigMap>("ns", "cm").await.is_err());
        assert!(store.get::<ConfigMap>("ns", "cm").await.unwrap().is_some());
    }
}
