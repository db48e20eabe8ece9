use crate::api::{ApiClient, ProjectApi};
use crate::cli::Cli;
use crate::domain::models::{InventoryDocument, Settings};
use crate::error::AdapterError;
use crate::inventory::{Inventory, InventoryError};
use crate::services::export::to_document;
use crate::services::output::print_json;
use crate::services::projects::{find_project_id, project_path, wait_for_project_update};
use crate::services::settings::load_settings;

pub fn handle_list(cli: &Cli) -> anyhow::Result<()> {
    let settings = load_settings(cli.config.as_deref()).map_err(AdapterError::from)?;
    let api = ApiClient::new(&settings.api).map_err(AdapterError::from)?;
    tracing::debug!(root = api.root(), project = %cli.project, "listing inventory");
    let document = build_document(&api, &settings, &cli.project, &cli.inventory_file)?;
    print_json(&document, cli.pretty)
}

/// Lookup, update wait, path resolution, parse, reshape.
pub fn build_document(
    api: &impl ProjectApi,
    settings: &Settings,
    project: &str,
    inventory_file: &str,
) -> Result<InventoryDocument, AdapterError> {
    let project_id = find_project_id(api, project)?;
    wait_for_project_update(api, project_id, project, &settings.wait)?;

    let parse_failure = |source: InventoryError| AdapterError::InventoryParse {
        file: inventory_file.to_string(),
        project: project.to_string(),
        source,
    };
    let project_dir = project_path(api, project_id, &settings.projects_base_path)?
        .ok_or_else(|| parse_failure(InventoryError::ProjectPathUnavailable))?;
    let inventory = Inventory::load(&project_dir.join(inventory_file)).map_err(parse_failure)?;
    tracing::debug!(source = %inventory.source().display(), "reshaping inventory");

    Ok(to_document(&inventory))
}
