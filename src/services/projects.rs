use crate::api::{ApiError, ProjectApi};
use crate::domain::models::WaitPolicy;
use crate::error::AdapterError;
use std::path::{Path, PathBuf};

pub fn find_project_id(api: &impl ProjectApi, name: &str) -> Result<u64, AdapterError> {
    match api.find_project(name)? {
        Some(project) => {
            tracing::debug!(project = name, id = project.id, "resolved project");
            Ok(project.id)
        }
        None => Err(AdapterError::ProjectNotFound(name.to_string())),
    }
}

/// Polls the project until no SCM update is linked, at most `policy.retries`
/// times. Running out of attempts is an error rather than a silent pass.
pub fn wait_for_project_update(
    api: &impl ProjectApi,
    id: u64,
    name: &str,
    policy: &WaitPolicy,
) -> Result<(), AdapterError> {
    if policy.retries == 0 {
        tracing::debug!(project = name, "update wait disabled");
        return Ok(());
    }

    for attempt in 1..=policy.retries {
        let Some(project) = api.project(id)? else {
            tracing::warn!(project = name, id, "project disappeared while waiting for update");
            return Ok(());
        };
        if !project.update_in_progress() {
            tracing::debug!(project = name, attempt, "no update in progress");
            return Ok(());
        }
        tracing::debug!(
            project = name,
            attempt,
            retries = policy.retries,
            status = project.status.as_deref().unwrap_or("unknown"),
            "project update still running"
        );
        if attempt < policy.retries {
            std::thread::sleep(policy.interval);
        }
    }

    Err(AdapterError::UpdateTimeout {
        project: name.to_string(),
        attempts: policy.retries,
    })
}

/// Directory holding the synced checkout: `base` joined with the
/// server-reported `local_path`. `None` when the project or its path is gone.
pub fn project_path(
    api: &impl ProjectApi,
    id: u64,
    base: &Path,
) -> Result<Option<PathBuf>, ApiError> {
    let Some(project) = api.project(id)? else {
        return Ok(None);
    };
    // local_path is always relative to the projects root, even with a leading slash.
    let path = project
        .local_path
        .as_deref()
        .map(|p| p.trim_start_matches('/'))
        .filter(|p| !p.is_empty())
        .map(|p| base.join(p));
    tracing::debug!(id, path = ?path, "resolved project path");
    Ok(path)
}
