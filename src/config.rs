// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::defaults;
use anyhow::{bail, Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// How child object names are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildNaming {
    /// `quarkus-deployment` / `quarkus-service`, one application per namespace
    #[default]
    Fixed,
    /// `<cr-name>-deployment` / `<cr-name>-service`
    Prefixed,
}

impl FromStr for ChildNaming {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fixed" => Ok(ChildNaming::Fixed),
            "prefixed" => Ok(ChildNaming::Prefixed),
            other => bail!("unknown child naming '{}', expected 'fixed' or 'prefixed'", other),
        }
    }
}

/// What to do when creating a child that already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExistingChildPolicy {
    /// Surface "already exists" as a retryable error
    #[default]
    Retry,
    /// Treat the existing object as the desired one
    Adopt,
}

impl FromStr for ExistingChildPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "retry" => Ok(ExistingChildPolicy::Retry),
            "adopt" => Ok(ExistingChildPolicy::Adopt),
            other => bail!(
                "unknown existing child policy '{}', expected 'retry' or 'adopt'",
                other
            ),
        }
    }
}

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Only watch this namespace; all namespaces when unset
    pub watch_namespace: Option<String>,
    /// Image reference without tag, the CR's imageVersion is appended
    pub image_base: String,
    pub api_timeout: Duration,
    /// Delay before a failed reconciliation is retried
    pub requeue_after: Duration,
    pub child_naming: ChildNaming,
    pub existing_child_policy: ExistingChildPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            watch_namespace: None,
            image_base: defaults::IMAGE_BASE.to_string(),
            api_timeout: Duration::from_secs(defaults::API_TIMEOUT_SECS),
            requeue_after: Duration::from_secs(defaults::REQUEUE_SECS),
            child_naming: ChildNaming::default(),
            existing_child_policy: ExistingChildPolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let watch_namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.is_empty());
        let image_base = lookup("IMAGE_BASE").unwrap_or_else(|| defaults::IMAGE_BASE.to_string());

        let api_timeout_secs: u64 =
            parse_or(&lookup, "API_TIMEOUT_SECS", defaults::API_TIMEOUT_SECS)?;
        let requeue_secs: u64 = parse_or(&lookup, "REQUEUE_SECS", defaults::REQUEUE_SECS)?;
        let child_naming = parse_or(&lookup, "CHILD_NAMING", ChildNaming::default())?;
        let existing_child_policy =
            parse_or(&lookup, "ON_EXISTING_CHILD", ExistingChildPolicy::default())?;

        Ok(Config {
            watch_namespace,
            image_base,
            api_timeout: Duration::from_secs(api_timeout_secs),
            requeue_after: Duration::from_secs(requeue_secs),
            child_naming,
            existing_child_policy,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| anyhow::anyhow!("{}", e))
            .with_context(|| format!("invalid value '{}' for {}", raw, key)),
        None => Ok(default),
    }
}
