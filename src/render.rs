// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Desired child objects for a QuarkusOperator. Pure functions, no I/O.

use crate::config::{ChildNaming, Config};
use crate::constants::children;
use crate::error::{OperatorError, Result};
use crate::types::QuarkusOperator;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, PodSpec, PodTemplateSpec, Service, ServicePort, ServiceSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::api::ObjectMeta;
use kube::ResourceExt;
use std::collections::BTreeMap;

/// Names of the objects owned by one custom resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildNames {
    pub deployment: String,
    pub service: String,
}

/// Renders desired children using the operator-wide settings
#[derive(Debug, Clone)]
pub struct Renderer {
    image_base: String,
    naming: ChildNaming,
}

impl Renderer {
    pub fn new(config: &Config) -> Self {
        Self {
            image_base: config.image_base.clone(),
            naming: config.child_naming,
        }
    }

    pub fn child_names(&self, app_name: &str) -> ChildNames {
        match self.naming {
            ChildNaming::Fixed => ChildNames {
                deployment: children::DEPLOYMENT_NAME.to_string(),
                service: children::SERVICE_NAME.to_string(),
            },
            ChildNaming::Prefixed => ChildNames {
                deployment: format!("{}-{}", app_name, children::DEPLOYMENT_SUFFIX),
                service: format!("{}-{}", app_name, children::SERVICE_SUFFIX),
            },
        }
    }

    pub fn image(&self, app: &QuarkusOperator) -> String {
        format!("{}:{}", self.image_base, app.spec.image_version)
    }

    /// Labels shared by the pod template and both selectors
    fn selector_labels(&self, app: &QuarkusOperator) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::from([(
            children::APP_LABEL_KEY.to_string(),
            children::APP_LABEL_VALUE.to_string(),
        )]);
        if self.naming == ChildNaming::Prefixed {
            labels.insert(children::INSTANCE_LABEL_KEY.to_string(), app.name_any());
        }
        labels
    }

    pub fn deployment(&self, app: &QuarkusOperator) -> Result<Deployment> {
        let namespace = namespace_of(app)?;
        let labels = self.selector_labels(app);

        Ok(Deployment {
            metadata: ObjectMeta {
                name: Some(self.child_names(&app.name_any()).deployment),
                namespace: Some(namespace),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                selector: LabelSelector {
                    match_labels: Some(labels.clone()),
                    ..Default::default()
                },
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(labels),
                        ..Default::default()
                    }),
                    spec: Some(PodSpec {
                        containers: vec![Container {
                            name: children::CONTAINER_NAME.to_string(),
                            image: Some(self.image(app)),
                            ports: Some(vec![ContainerPort {
                                name: Some(children::PORT_NAME.to_string()),
                                container_port: children::CONTAINER_PORT,
                                protocol: Some("TCP".to_string()),
                                ..Default::default()
                            }]),
                            ..Default::default()
                        }],
                        ..Default::default()
                    }),
                },
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    pub fn service(&self, app: &QuarkusOperator) -> Result<Service> {
        let namespace = namespace_of(app)?;

        Ok(Service {
            metadata: ObjectMeta {
                name: Some(self.child_names(&app.name_any()).service),
                namespace: Some(namespace),
                ..Default::default()
            },
            spec: Some(ServiceSpec {
                type_: Some("NodePort".to_string()),
                selector: Some(self.selector_labels(app)),
                ports: Some(vec![ServicePort {
                    name: Some(children::PORT_NAME.to_string()),
                    port: children::SERVICE_PORT,
                    node_port: Some(app.spec.port),
                    target_port: Some(IntOrString::Int(children::CONTAINER_PORT)),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        })
    }
}

fn namespace_of(app: &QuarkusOperator) -> Result<String> {
    app.namespace().ok_or_else(|| {
        OperatorError::RenderError(format!("QuarkusOperator {} has no namespace", app.name_any()))
    })
}
