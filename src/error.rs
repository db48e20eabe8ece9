use crate::api::ApiError;
use crate::inventory::InventoryError;
use crate::services::settings::SettingsError;

/// Failures surfaced by `--list`. Each renders as a one-line diagnostic.
#[derive(thiserror::Error, Debug)]
pub enum AdapterError {
    #[error("Could not find project '{0}'")]
    ProjectNotFound(String),
    #[error("Timed out waiting for update of project '{project}' after {attempts} attempts")]
    UpdateTimeout { project: String, attempts: u32 },
    #[error("Parse of inventory file '{file}' in project '{project}' failed")]
    InventoryParse {
        file: String,
        project: String,
        #[source]
        source: InventoryError,
    },
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("invalid configuration")]
    Settings(#[from] SettingsError),
}
