// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::FINALIZER;
use crate::error::{OperatorError, Result};
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[kube(group = "wilda.fr", version = "v1", kind = "QuarkusOperator")]
#[kube(namespaced)]
#[kube(status = "QuarkusOperatorStatus")]
#[serde(rename_all = "camelCase")]
pub struct QuarkusOperatorSpec {
    /// Tag appended to the configured image base
    #[serde(default)]
    pub image_version: String,
    /// Node port the application is exposed on
    pub port: i32,
}

/// Reserved for observed state, nothing is reported yet
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct QuarkusOperatorStatus {}

impl QuarkusOperator {
    pub fn has_finalizer(&self) -> bool {
        self.finalizers().iter().any(|f| f == FINALIZER)
    }

    pub fn is_being_deleted(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    /// Add the operator finalizer, returns false if it was already present
    pub fn add_finalizer(&mut self) -> bool {
        if self.has_finalizer() {
            return false;
        }
        self.finalizers_mut().push(FINALIZER.to_string());
        true
    }

    /// Remove the operator finalizer, leaving any foreign finalizers in place
    pub fn remove_finalizer(&mut self) -> bool {
        let before = self.finalizers().len();
        self.finalizers_mut().retain(|f| f != FINALIZER);
        before != self.finalizers().len()
    }
}

/// Namespace and name of a QuarkusOperator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppIdentity {
    pub namespace: String,
    pub name: String,
}

impl AppIdentity {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Identity of an object delivered by the watcher
    pub fn of(app: &QuarkusOperator) -> Result<Self> {
        let namespace = app.namespace().ok_or_else(|| {
            OperatorError::MissingMetadata(format!(
                "QuarkusOperator {} has no namespace",
                app.name_any()
            ))
        })?;
        Ok(Self::new(namespace, app.name_any()))
    }
}

impl fmt::Display for AppIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
