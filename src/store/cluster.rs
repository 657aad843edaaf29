// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Store backed by the Kubernetes API server

use super::{ManagedObject, MutationApplier, StateReader};
use crate::error::{OperatorError, Result};
use kube::api::{DeleteParams, PostParams};
use kube::{Api, Client, ResourceExt};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct KubeStore {
    client: Client,
    timeout: Duration,
}

impl KubeStore {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    fn api<K: ManagedObject>(&self, namespace: &str) -> Api<K> {
        Api::namespaced(self.client.clone(), namespace)
    }

    /// Bound a single API call by the configured timeout
    async fn call<T>(&self, fut: impl Future<Output = kube::Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(OperatorError::Timeout(self.timeout)),
        }
    }
}

/// Namespace and name of an object about to be written
fn location<K: ManagedObject>(obj: &K) -> Result<(String, String)> {
    let kind = K::kind(&());
    let namespace = obj
        .namespace()
        .ok_or_else(|| OperatorError::MissingMetadata(format!("{} without namespace", kind)))?;
    let name = obj
        .meta()
        .name
        .clone()
        .ok_or_else(|| OperatorError::MissingMetadata(format!("{} without name", kind)))?;
    Ok((namespace, name))
}

impl StateReader for KubeStore {
    #[instrument(skip(self), fields(kind = %K::kind(&())))]
    async fn get<K: ManagedObject>(&self, namespace: &str, name: &str) -> Result<Option<K>> {
        let found = self.call(self.api::<K>(namespace).get_opt(name)).await?;
        debug!("{} {}/{} found: {}", K::kind(&()), namespace, name, found.is_some());
        Ok(found)
    }
}

impl MutationApplier for KubeStore {
    #[instrument(skip(self, obj), fields(kind = %K::kind(&()), name = %obj.name_any()))]
    async fn create<K: ManagedObject>(&self, obj: &K) -> Result<()> {
        let (namespace, _) = location(obj)?;
        self.call(self.api::<K>(&namespace).create(&PostParams::default(), obj))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, obj), fields(kind = %K::kind(&()), name = %obj.name_any()))]
    async fn update<K: ManagedObject>(&self, obj: &K) -> Result<()> {
        let (namespace, name) = location(obj)?;
        self.call(self.api::<K>(&namespace).replace(&name, &PostParams::default(), obj))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, obj), fields(kind = %K::kind(&()), name = %obj.name_any()))]
    async fn delete<K: ManagedObject>(&self, obj: &K) -> Result<()> {
        let (namespace, name) = location(obj)?;
        self.call(self.api::<K>(&namespace).delete(&name, &DeleteParams::default()))
            .await?;
        Ok(())
    }
}
