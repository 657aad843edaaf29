// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! QuarkusOperator reconciler - watches the custom resource and drives its lifecycle.

use crate::config::Config;
use crate::error::{OperatorError, Result};
use crate::reconcilers::lifecycle::{Lifecycle, Outcome};
use crate::store::KubeStore;
use crate::types::{AppIdentity, QuarkusOperator};
use futures::StreamExt;
use kube::{
    runtime::{controller::Action, Controller},
    Api, Client, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct QuarkusReconciler {
    client: Client,
    config: Config,
    lifecycle: Lifecycle<KubeStore, KubeStore>,
}

impl QuarkusReconciler {
    pub fn new(client: Client, config: Config) -> Self {
        let store = KubeStore::new(client.clone(), config.api_timeout);
        let lifecycle = Lifecycle::new(store.clone(), store, &config);
        Self {
            client,
            config,
            lifecycle,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let apps: Api<QuarkusOperator> = match &self.config.watch_namespace {
            Some(namespace) => Api::namespaced(self.client.clone(), namespace),
            None => Api::all(self.client.clone()),
        };
        let context = Arc::new(self);

        Controller::new(apps, WatcherConfig::default())
            .shutdown_on_signal()
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled QuarkusOperator: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        info!("QuarkusOperator controller stopped");
        Ok(())
    }
}

/// The watched object only names the app, the lifecycle re-reads it
async fn reconcile(app: Arc<QuarkusOperator>, ctx: Arc<QuarkusReconciler>) -> Result<Action> {
    let identity = AppIdentity::of(&app)?;
    let transition = ctx.lifecycle.reconcile(&identity).await?;
    debug!("QuarkusOperator {} reconciled: {:?}", identity, transition);

    Ok(Action::await_change())
}

fn error_policy(
    app: Arc<QuarkusOperator>,
    error: &OperatorError,
    ctx: Arc<QuarkusReconciler>,
) -> Action {
    requeue_action(&app, error, &ctx.config)
}

fn requeue_action(app: &QuarkusOperator, error: &OperatorError, config: &Config) -> Action {
    match Outcome::of_error(error) {
        Outcome::Fatal => {
            error!(
                "Reconciliation of {} failed permanently, waiting for a change: {}",
                app.name_any(),
                error
            );
            Action::await_change()
        }
        _ => {
            error!(
                "Reconciliation of {} failed, retrying in {:?}: {}",
                app.name_any(),
                config.requeue_after,
                error
            );
            Action::requeue(config.requeue_after)
        }
    }
}
