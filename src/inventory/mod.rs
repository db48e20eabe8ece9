//! In-memory inventory model and file loaders.
//!
//! ## Files
//! - `ini.rs` — INI-style inventory parser (`[group]`, `[group:vars]`, `[group:children]`).
//! - `yaml.rs` — YAML/JSON inventory parser (`all: {hosts, vars, children}`).
//! - `hostrange.rs` — `web[01:10]` style host pattern expansion and `:port` suffixes.
//! - `vars.rs` — value decoding, merging, and `group_vars/` / `host_vars/` overlays.
//!
//! ## Model rules
//! - `all` and `ungrouped` always exist.
//! - `ungrouped` is recomputed by [`Inventory::reconcile`]: it holds every host
//!   that has no group besides `all`/`ungrouped`.
//! - Child relations must stay acyclic.

pub mod hostrange;
pub mod ini;
pub mod vars;
pub mod yaml;

use indexmap::{IndexMap, IndexSet};
use std::path::{Path, PathBuf};

pub use vars::VarMap;

pub const ALL: &str = "all";
pub const UNGROUPED: &str = "ungrouped";
pub const RESERVED_META: &str = "_meta";

#[derive(thiserror::Error, Debug)]
pub enum InventoryError {
    #[error("inventory file {0} does not exist")]
    NotFound(PathBuf),
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}:{line}: {message}")]
    Syntax {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("{path}: invalid YAML")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{path}: {message}")]
    Structure { path: PathBuf, message: String },
    #[error("inventory {0} defines no hosts or groups")]
    Empty(PathBuf),
    #[error("group name '{0}' is reserved")]
    ReservedGroup(String),
    #[error("group '{child}' cannot be a child of '{parent}'")]
    InvalidChild { parent: String, child: String },
    #[error("group '{0}' is part of a child cycle")]
    GroupCycle(String),
    #[error("invalid host pattern '{pattern}': {reason}")]
    HostPattern { pattern: String, reason: String },
    #[error("project has no synced directory")]
    ProjectPathUnavailable,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub name: String,
    pub children: Vec<String>,
    pub parents: Vec<String>,
    pub hosts: Vec<String>,
    pub vars: VarMap,
}

impl Group {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Host {
    pub name: String,
    pub vars: VarMap,
}

/// Supported on-disk inventory formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryFormat {
    Ini,
    Yaml,
}

impl InventoryFormat {
    pub fn detect(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("yml" | "yaml" | "json") => InventoryFormat::Yaml,
            _ => InventoryFormat::Ini,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Inventory {
    source: PathBuf,
    groups: IndexMap<String, Group>,
    hosts: IndexMap<String, Host>,
}

impl Inventory {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        let mut groups = IndexMap::new();
        groups.insert(ALL.to_string(), Group::new(ALL));
        groups.insert(UNGROUPED.to_string(), Group::new(UNGROUPED));
        Self {
            source: source.into(),
            groups,
            hosts: IndexMap::new(),
        }
    }

    /// Reads and parses `path`, overlays variable files found beside it, and
    /// reconciles the implicit groups.
    pub fn load(path: &Path) -> Result<Self, InventoryError> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                InventoryError::NotFound(path.to_path_buf())
            } else {
                InventoryError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let mut inventory = Inventory::new(path);
        let format = InventoryFormat::detect(path);
        tracing::debug!(path = %path.display(), ?format, "parsing inventory");
        match format {
            InventoryFormat::Ini => ini::parse(&mut inventory, path, &text)?,
            InventoryFormat::Yaml => yaml::parse(&mut inventory, path, &text)?,
        }
        if inventory.is_empty() {
            return Err(InventoryError::Empty(path.to_path_buf()));
        }

        if let Some(dir) = path.parent() {
            vars::apply_var_files(&mut inventory, dir)?;
        }
        inventory.reconcile()?;

        tracing::debug!(
            groups = inventory.groups.len(),
            hosts = inventory.hosts.len(),
            "inventory loaded"
        );
        Ok(inventory)
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn hosts(&self) -> impl Iterator<Item = &Host> {
        self.hosts.values()
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    pub fn host(&self, name: &str) -> Option<&Host> {
        self.hosts.get(name)
    }

    pub fn group_names(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    pub fn host_names(&self) -> Vec<String> {
        self.hosts.keys().cloned().collect()
    }

    /// True when nothing beyond the implicit groups was declared.
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty() && self.groups.len() == 2
    }

    pub fn ensure_group(&mut self, name: &str) -> Result<&mut Group, InventoryError> {
        if name == RESERVED_META {
            return Err(InventoryError::ReservedGroup(name.to_string()));
        }
        Ok(self
            .groups
            .entry(name.to_string())
            .or_insert_with(|| Group::new(name)))
    }

    /// Adds `host` to `group`, creating both as needed. Inline variables are
    /// merged into whatever the host already carries.
    pub fn add_host_to_group(
        &mut self,
        group: &str,
        host: &str,
        vars: VarMap,
    ) -> Result<(), InventoryError> {
        let entry = self.ensure_group(group)?;
        if !entry.hosts.iter().any(|h| h == host) {
            entry.hosts.push(host.to_string());
        }
        let host_entry = self
            .hosts
            .entry(host.to_string())
            .or_insert_with(|| Host {
                name: host.to_string(),
                vars: VarMap::new(),
            });
        vars::merge_vars(&mut host_entry.vars, vars);
        Ok(())
    }

    pub fn add_child(&mut self, parent: &str, child: &str) -> Result<(), InventoryError> {
        if child == parent || child == ALL {
            return Err(InventoryError::InvalidChild {
                parent: parent.to_string(),
                child: child.to_string(),
            });
        }
        let parent_group = self.ensure_group(parent)?;
        if !parent_group.children.iter().any(|c| c == child) {
            parent_group.children.push(child.to_string());
        }
        let child_group = self.ensure_group(child)?;
        if !child_group.parents.iter().any(|p| p == parent) {
            child_group.parents.push(parent.to_string());
        }
        Ok(())
    }

    pub fn merge_group_vars(&mut self, group: &str, vars: VarMap) -> Result<(), InventoryError> {
        let entry = self.ensure_group(group)?;
        vars::merge_vars(&mut entry.vars, vars);
        Ok(())
    }

    pub fn merge_host_vars(&mut self, host: &str, vars: VarMap) {
        if let Some(entry) = self.hosts.get_mut(host) {
            vars::merge_vars(&mut entry.vars, vars);
        }
    }

    /// Rejects child cycles, then recomputes `all` children and `ungrouped`
    /// membership.
    pub fn reconcile(&mut self) -> Result<(), InventoryError> {
        self.check_cycles()?;

        let top_level: Vec<String> = self
            .groups
            .values()
            .filter(|g| g.name != ALL && g.parents.iter().all(|p| p == ALL))
            .map(|g| g.name.clone())
            .collect();
        for name in &top_level {
            if let Some(group) = self.groups.get_mut(name) {
                if !group.parents.iter().any(|p| p == ALL) {
                    group.parents.push(ALL.to_string());
                }
            }
        }
        if let Some(all) = self.groups.get_mut(ALL) {
            all.children = top_level;
        }

        let grouped: IndexSet<&str> = self
            .groups
            .values()
            .filter(|g| g.name != ALL && g.name != UNGROUPED)
            .flat_map(|g| g.hosts.iter().map(String::as_str))
            .collect();
        let ungrouped: Vec<String> = self
            .hosts
            .keys()
            .filter(|h| !grouped.contains(h.as_str()))
            .cloned()
            .collect();
        if let Some(group) = self.groups.get_mut(UNGROUPED) {
            group.hosts = ungrouped;
        }
        Ok(())
    }

    fn check_cycles(&self) -> Result<(), InventoryError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit<'a>(
            inventory: &'a Inventory,
            name: &'a str,
            marks: &mut IndexMap<&'a str, Mark>,
        ) -> Result<(), InventoryError> {
            match marks.get(name) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => return Err(InventoryError::GroupCycle(name.to_string())),
                None => {}
            }
            marks.insert(name, Mark::Visiting);
            if let Some(group) = inventory.groups.get(name) {
                for child in &group.children {
                    visit(inventory, child, marks)?;
                }
            }
            marks.insert(name, Mark::Done);
            Ok(())
        }

        let mut marks = IndexMap::new();
        for name in self.groups.keys() {
            visit(self, name, &mut marks)?;
        }
        Ok(())
    }
}
