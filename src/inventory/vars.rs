use super::{Inventory, InventoryError};
use serde_json::{Number, Value};
use std::path::{Path, PathBuf};

/// Order-preserving variable mapping.
pub type VarMap = serde_json::Map<String, Value>;

const VAR_FILE_EXTENSIONS: [&str; 4] = ["", ".yml", ".yaml", ".json"];

/// Shallow merge; keys from `source` replace keys already in `target`.
pub fn merge_vars(target: &mut VarMap, source: VarMap) {
    for (key, value) in source {
        target.insert(key, value);
    }
}

/// Decodes an INI value into a typed JSON value.
///
/// Quoted text loses its quotes, integers and floats become numbers,
/// `True`/`False`/`None` map to booleans and null, and `[`/`{` literals that
/// parse as JSON become arrays or objects. Anything else stays a string.
pub fn parse_value(raw: &str) -> Value {
    let raw = raw.trim();
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return Value::String(raw[1..raw.len() - 1].to_string());
        }
    }

    match raw {
        "True" => return Value::Bool(true),
        "False" => return Value::Bool(false),
        "None" => return Value::Null,
        _ => {}
    }

    if is_integer_literal(raw) {
        if let Ok(n) = raw.parse::<i64>() {
            return Value::Number(n.into());
        }
    }
    if is_float_literal(raw) {
        if let Some(n) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    }
    if raw.starts_with('[') || raw.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<Value>(raw) {
            return value;
        }
    }
    Value::String(raw.to_string())
}

fn is_integer_literal(raw: &str) -> bool {
    let digits = raw.strip_prefix(&['-', '+'][..]).unwrap_or(raw);
    !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
        && !(digits.len() > 1 && digits.starts_with('0'))
}

fn is_float_literal(raw: &str) -> bool {
    raw.chars().any(|c| c.is_ascii_digit())
        && raw.contains(['.', 'e', 'E'])
        && raw
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
}

/// Converts a YAML mapping (or null) into variables.
pub fn yaml_to_vars(value: &serde_yaml::Value) -> Result<VarMap, String> {
    match value {
        serde_yaml::Value::Null => Ok(VarMap::new()),
        serde_yaml::Value::Mapping(_) => match serde_json::to_value(value) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err("expected a mapping of variables".to_string()),
            Err(e) => Err(format!("variables are not representable as JSON: {e}")),
        },
        _ => Err("expected a mapping of variables".to_string()),
    }
}

fn read_vars_file(path: &Path) -> Result<VarMap, InventoryError> {
    let text = std::fs::read_to_string(path).map_err(|source| InventoryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if text.trim().is_empty() {
        return Ok(VarMap::new());
    }
    let doc: serde_yaml::Value =
        serde_yaml::from_str(&text).map_err(|source| InventoryError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
    yaml_to_vars(&doc).map_err(|message| InventoryError::Structure {
        path: path.to_path_buf(),
        message,
    })
}

/// Files holding variables for `name` under `dir`, in load order.
fn var_files(dir: &Path, name: &str) -> Result<Vec<PathBuf>, InventoryError> {
    let mut files = Vec::new();
    for ext in VAR_FILE_EXTENSIONS {
        let candidate = dir.join(format!("{name}{ext}"));
        if candidate.is_file() {
            files.push(candidate);
        }
    }

    let nested = dir.join(name);
    if nested.is_dir() {
        let read_err = |source| InventoryError::Io {
            path: nested.clone(),
            source,
        };
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&nested).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            if entry.file_type().map_err(read_err)?.is_file() {
                entries.push(entry.path());
            }
        }
        entries.sort();
        files.extend(entries);
    }
    Ok(files)
}

fn collect_vars(dir: &Path, name: &str) -> Result<Option<VarMap>, InventoryError> {
    if !dir.is_dir() {
        return Ok(None);
    }
    let files = var_files(dir, name)?;
    if files.is_empty() {
        return Ok(None);
    }
    let mut vars = VarMap::new();
    for file in files {
        tracing::debug!(path = %file.display(), "loading variable file");
        merge_vars(&mut vars, read_vars_file(&file)?);
    }
    Ok(Some(vars))
}

/// Overlays `group_vars/` and `host_vars/` found in `base` onto the
/// inventory. File values win over inline values.
pub fn apply_var_files(inventory: &mut Inventory, base: &Path) -> Result<(), InventoryError> {
    let group_dir = base.join("group_vars");
    for group in inventory.group_names() {
        if let Some(vars) = collect_vars(&group_dir, &group)? {
            inventory.merge_group_vars(&group, vars)?;
        }
    }

    let host_dir = base.join("host_vars");
    for host in inventory.host_names() {
        if let Some(vars) = collect_vars(&host_dir, &host)? {
            inventory.merge_host_vars(&host, vars);
        }
    }
    Ok(())
}
