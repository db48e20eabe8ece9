use crate::inventory::VarMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Project resource as returned by `projects/` endpoints. Unknown fields are
/// ignored.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Project {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub local_path: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub related: serde_json::Map<String, serde_json::Value>,
}

impl Project {
    /// The control plane only links `current_update` while an SCM update runs.
    pub fn update_in_progress(&self) -> bool {
        self.related
            .get("current_update")
            .is_some_and(|v| !v.is_null())
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub inventory: InventorySection,
}

#[derive(Debug, Deserialize, Default)]
pub struct ApiSection {
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub oauth_token: Option<String>,
    pub verify_ssl: Option<bool>,
    pub api_version: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct InventorySection {
    pub projects_base_path: Option<PathBuf>,
    pub update_wait_retries: Option<u32>,
    pub update_wait_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiSettings {
    pub host: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub oauth_token: Option<String>,
    pub verify_ssl: bool,
    pub api_version: String,
    pub timeout: Duration,
}

/// Bounded polling for a running project update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitPolicy {
    pub retries: u32,
    pub interval: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api: ApiSettings,
    pub projects_base_path: PathBuf,
    pub wait: WaitPolicy,
}

/// `--list` output: one entry per group plus `_meta.hostvars`.
#[derive(Debug, Serialize, Default)]
pub struct InventoryDocument {
    #[serde(flatten)]
    pub groups: IndexMap<String, GroupDocument>,
    #[serde(rename = "_meta")]
    pub meta: MetaDocument,
}

#[derive(Debug, Serialize, Default, Clone, PartialEq)]
pub struct GroupDocument {
    pub children: Vec<String>,
    pub hosts: Vec<String>,
    pub vars: VarMap,
}

#[derive(Debug, Serialize, Default)]
pub struct MetaDocument {
    pub hostvars: IndexMap<String, VarMap>,
}
