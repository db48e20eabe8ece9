use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_PROJECT_NAME: &str = "Test project";
pub const DEFAULT_INVENTORY_FILE: &str = "inventory";

#[derive(Parser, Debug)]
#[command(
    name = "scm-inventory",
    version,
    about = "Dynamic inventory read from a control-plane SCM project"
)]
pub struct Cli {
    #[arg(long, help = "Print every group and host as dynamic-inventory JSON")]
    pub list: bool,
    #[arg(
        long,
        env = "PROJECT_NAME",
        default_value = DEFAULT_PROJECT_NAME,
        help = "Name of the project holding the inventory file"
    )]
    pub project: String,
    #[arg(
        long,
        env = "INVENTORY_FILE",
        default_value = DEFAULT_INVENTORY_FILE,
        help = "Inventory file path, relative to the project checkout"
    )]
    pub inventory_file: String,
    #[arg(
        long,
        env = "SCM_INVENTORY_CONFIG",
        help = "Config file (default: ~/.config/scm-inventory/config.toml)"
    )]
    pub config: Option<PathBuf>,
    #[arg(long, help = "Indent JSON output")]
    pub pretty: bool,
}
