// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Read and write access to cluster state, injected into the reconciler.

pub mod cluster;

pub use cluster::KubeStore;

use crate::error::Result;
use k8s_openapi::NamespaceResourceScope;
use kube::Resource;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::future::Future;

/// Namespaced objects the store can read and write
pub trait ManagedObject:
    Resource<Scope = NamespaceResourceScope, DynamicType = ()>
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
}

impl<K> ManagedObject for K where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static
{
}

/// Fetches current state. A missing object is `Ok(None)`, never an error.
pub trait StateReader: Send + Sync {
    fn get<K: ManagedObject>(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<Option<K>>> + Send;
}

/// Applies single-object mutations. Each call is one API operation.
pub trait MutationApplier: Send + Sync {
    fn create<K: ManagedObject>(&self, obj: &K) -> impl Future<Output = Result<()>> + Send;

    /// Full replace, carrying the object's resourceVersion
    fn update<K: ManagedObject>(&self, obj: &K) -> impl Future<Output = Result<()>> + Send;

    fn delete<K: ManagedObject>(&self, obj: &K) -> impl Future<Output = Result<()>> + Send;
}
