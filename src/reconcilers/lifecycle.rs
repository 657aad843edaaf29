// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Finalizer-gated lifecycle of a QuarkusOperator and its children.
//!
//! Each call reads the custom resource fresh and performs a single step:
//! add the finalizer, tear the children down, or create them. Nothing is
//! remembered between calls.

use crate::config::{Config, ExistingChildPolicy};
use crate::error::{OperatorError, Result};
use crate::render::Renderer;
use crate::store::{ManagedObject, MutationApplier, StateReader};
use crate::types::{AppIdentity, QuarkusOperator};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use kube::ResourceExt;
use tracing::{debug, error, info, instrument};

/// The step a reconciliation performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// No custom resource with this identity
    NotFound,
    FinalizerAdded,
    /// Being deleted without our finalizer, nothing of ours to clean up
    NotOwned,
    /// Children removed (false when already absent) and finalizer released
    CleanedUp {
        deployment_deleted: bool,
        service_deleted: bool,
    },
    /// Children created (false when an existing object was adopted)
    Deployed {
        deployment_created: bool,
        service_created: bool,
    },
}

/// How the caller should treat a reconciliation result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing further until the next trigger
    Done,
    /// Transient failure, re-invoke after backoff
    Retry,
    /// Will keep failing until the custom resource changes
    Fatal,
}

impl Outcome {
    pub fn classify<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Outcome::Done,
            Err(e) => Outcome::of_error(e),
        }
    }

    pub fn of_error(error: &OperatorError) -> Self {
        if error.is_transient() {
            Outcome::Retry
        } else {
            Outcome::Fatal
        }
    }
}

pub struct Lifecycle<R, M> {
    reader: R,
    applier: M,
    renderer: Renderer,
    existing_child_policy: ExistingChildPolicy,
}

impl<R: StateReader, M: MutationApplier> Lifecycle<R, M> {
    pub fn new(reader: R, applier: M, config: &Config) -> Self {
        Self {
            reader,
            applier,
            renderer: Renderer::new(config),
            existing_child_policy: config.existing_child_policy,
        }
    }

    #[instrument(skip(self), fields(app = %identity))]
    pub async fn reconcile(&self, identity: &AppIdentity) -> Result<Transition> {
        let app = match self
            .reader
            .get::<QuarkusOperator>(&identity.namespace, &identity.name)
            .await
        {
            Ok(Some(app)) => app,
            Ok(None) => {
                info!("No QuarkusOperator {} found, nothing to do", identity);
                return Ok(Transition::NotFound);
            }
            Err(e) => {
                error!("Failed to get QuarkusOperator {}: {}", identity, e);
                return Err(e);
            }
        };

        if !app.has_finalizer() {
            if app.is_being_deleted() {
                debug!("QuarkusOperator {} is being deleted without our finalizer", identity);
                return Ok(Transition::NotOwned);
            }
            return self.add_finalizer(app).await;
        }

        if app.is_being_deleted() {
            return self.clean_up(identity, app).await;
        }

        self.deploy(&app).await
    }

    /// Creation waits for the next trigger once the finalizer is persisted
    async fn add_finalizer(&self, mut app: QuarkusOperator) -> Result<Transition> {
        app.add_finalizer();
        if let Err(e) = self.applier.update(&app).await {
            error!("Failed to add finalizer to {}: {}", app.name_any(), e);
            return Err(e);
        }
        info!("Added finalizer to QuarkusOperator {}", app.name_any());
        Ok(Transition::FinalizerAdded)
    }

    async fn clean_up(
        &self,
        identity: &AppIdentity,
        mut app: QuarkusOperator,
    ) -> Result<Transition> {
        info!("Undeploying Quarkus application {}", identity);
        let names = self.renderer.child_names(&identity.name);

        let deployment_deleted = self
            .delete_child::<Deployment>(&identity.namespace, &names.deployment)
            .await?;
        let service_deleted = self
            .delete_child::<Service>(&identity.namespace, &names.service)
            .await?;

        // Only released once every child is gone
        app.remove_finalizer();
        if let Err(e) = self.applier.update(&app).await {
            error!("Failed to remove finalizer from {}: {}", identity, e);
            return Err(e);
        }
        info!("Removed finalizer from QuarkusOperator {}", identity);

        Ok(Transition::CleanedUp {
            deployment_deleted,
            service_deleted,
        })
    }

    /// Delete a child if present, returns whether anything was deleted
    async fn delete_child<K: ManagedObject>(&self, namespace: &str, name: &str) -> Result<bool> {
        let kind = K::kind(&());
        let child = match self.reader.get::<K>(namespace, name).await {
            Ok(Some(child)) => child,
            Ok(None) => {
                debug!("{} {}/{} already absent", kind, namespace, name);
                return Ok(false);
            }
            Err(e) => {
                error!("Failed to get {} {}/{}: {}", kind, namespace, name, e);
                return Err(e);
            }
        };

        match self.applier.delete(&child).await {
            Ok(()) => {
                info!("Deleted {} {}/{}", kind, namespace, name);
                Ok(true)
            }
            Err(e) if e.is_not_found() => {
                debug!("{} {}/{} disappeared before deletion", kind, namespace, name);
                Ok(false)
            }
            Err(e) => {
                error!("Failed to delete {} {}/{}: {}", kind, namespace, name, e);
                Err(e)
            }
        }
    }

    async fn deploy(&self, app: &QuarkusOperator) -> Result<Transition> {
        let deployment = self.renderer.deployment(app)?;
        let service = self.renderer.service(app)?;

        info!(
            "Deploying Quarkus application {} on port {} in namespace {}",
            app.spec.image_version,
            app.spec.port,
            app.namespace().unwrap_or_default()
        );

        let deployment_created = self.create_child(&deployment).await?;
        let service_created = self.create_child(&service).await?;

        Ok(Transition::Deployed {
            deployment_created,
            service_created,
        })
    }

    /// Create a child, returns false when an existing object was adopted
    async fn create_child<K: ManagedObject>(&self, child: &K) -> Result<bool> {
        let kind = K::kind(&());
        let adopt = self.existing_child_policy == ExistingChildPolicy::Adopt;
        match self.applier.create(child).await {
            Ok(()) => {
                info!("Created {} {}", kind, child.name_any());
                Ok(true)
            }
            Err(e) if adopt && e.is_already_exists() => {
                debug!("{} {} already exists, adopting it", kind, child.name_any());
                Ok(false)
            }
            Err(e) => {
                error!("Failed to create {} {}: {}", kind, child.name_any(), e);
                Err(e)
            }
        }
    }
}
