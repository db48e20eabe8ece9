use super::{hostrange, vars, Inventory, InventoryError};
use serde_yaml::Value;
use std::path::Path;

pub fn parse(inventory: &mut Inventory, path: &Path, text: &str) -> Result<(), InventoryError> {
    if text.trim().is_empty() {
        return Ok(());
    }
    let doc: Value = serde_yaml::from_str(text).map_err(|source| InventoryError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    let structure = |message: String| InventoryError::Structure {
        path: path.to_path_buf(),
        message,
    };

    match doc {
        Value::Null => Ok(()),
        Value::Mapping(groups) => {
            for (key, body) in &groups {
                let name = key_str(key).map_err(structure)?;
                load_group(inventory, path, &name, body, None)?;
            }
            Ok(())
        }
        _ => Err(structure(
            "top level must be a mapping of group names".to_string(),
        )),
    }
}

/// Names come from mapping keys; numeric and boolean scalars are spelled out.
fn key_str(key: &Value) -> Result<String, String> {
    match key {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(format!("expected a scalar key, got {key:?}")),
    }
}

fn load_group(
    inventory: &mut Inventory,
    path: &Path,
    name: &str,
    body: &Value,
    parent: Option<&str>,
) -> Result<(), InventoryError> {
    let structure = |message: String| InventoryError::Structure {
        path: path.to_path_buf(),
        message,
    };

    inventory.ensure_group(name)?;
    if let Some(parent) = parent {
        inventory.add_child(parent, name)?;
    }

    let body = match body {
        Value::Null => return Ok(()),
        Value::Mapping(body) => body,
        _ => return Err(structure(format!("group '{name}' must be a mapping"))),
    };

    for (key, value) in body {
        match key_str(key).map_err(structure)?.as_str() {
            "vars" => {
                let group_vars = vars::yaml_to_vars(value)
                    .map_err(|m| structure(format!("vars of group '{name}': {m}")))?;
                inventory.merge_group_vars(name, group_vars)?;
            }
            "hosts" => match value {
                Value::Null => {}
                Value::Mapping(hosts) => {
                    for (host_key, host_body) in hosts {
                        let pattern = key_str(host_key).map_err(structure)?;
                        let mut host_vars = vars::yaml_to_vars(host_body)
                            .map_err(|m| structure(format!("host '{pattern}': {m}")))?;
                        let (pattern, port) = hostrange::split_port(&pattern)?;
                        if let Some(port) = port {
                            host_vars
                                .entry("ansible_port")
                                .or_insert_with(|| port.into());
                        }
                        for host in hostrange::expand(pattern)? {
                            inventory.add_host_to_group(name, &host, host_vars.clone())?;
                        }
                    }
                }
                _ => return Err(structure(format!("hosts of group '{name}' must be a mapping"))),
            },
            "children" => match value {
                Value::Null => {}
                Value::Mapping(children) => {
                    for (child_key, child_body) in children {
                        let child = key_str(child_key).map_err(structure)?;
                        load_group(inventory, path, &child, child_body, Some(name))?;
                    }
                }
                _ => {
                    return Err(structure(format!(
                        "children of group '{name}' must be a mapping"
                    )))
                }
            },
            other => {
                return Err(structure(format!(
                    "unexpected key '{other}' in group '{name}'"
                )))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{ALL, UNGROUPED};
    use serde_json::json;

    fn parse_str(text: &str) -> Result<Inventory, InventoryError> {
        let mut inv = Inventory::new("hosts.yml");
        parse(&mut inv, Path::new("hosts.yml"), text)?;
        inv.reconcile()?;
        Ok(inv)
    }

    #[test]
    fn nested_groups_hosts_and_vars() {
        let inv = parse_str(
            r#"
all:
  hosts:
    bastion.example.com:
  vars:
    ansible_user: ops
  children:
    web:
      hosts:
        web[1:2].example.com:
          http_port: 8080
          tags: [edge, tls]
      vars:
        tier: front
    db:
      hosts:
        db.example.com:5433:
"#,
        )
        .unwrap();

        let web = inv.group("web").unwrap();
        assert_eq!(web.hosts, vec!["web1.example.com", "web2.example.com"]);
        assert_eq!(serde_json::Value::Object(web.vars.clone()), json!({"tier": "front"}));
        assert_eq!(web.parents, vec![ALL]);
        assert_eq!(
            serde_json::Value::Object(inv.host("web1.example.com").unwrap().vars.clone()),
            json!({"http_port": 8080, "tags": ["edge", "tls"]})
        );
        assert_eq!(
            serde_json::Value::Object(inv.host("db.example.com").unwrap().vars.clone()),
            json!({"ansible_port": 5433})
        );
        assert_eq!(
            serde_json::Value::Object(inv.group(ALL).unwrap().vars.clone()),
            json!({"ansible_user": "ops"})
        );
        assert_eq!(inv.group(UNGROUPED).unwrap().hosts, vec!["bastion.example.com"]);
    }

    #[test]
    fn json_documents_parse_as_yaml() {
        let inv = parse_str(r#"{"web": {"hosts": {"h1": {"a": 1}}}}"#).unwrap();
        assert_eq!(inv.group("web").unwrap().hosts, vec!["h1"]);
    }

    #[test]
    fn unexpected_group_keys_are_rejected() {
        let err = parse_str("all:\n  host:\n    h1:\n").unwrap_err();
        assert!(err.to_string().contains("unexpected key 'host'"));
    }

    #[test]
    fn non_mapping_documents_are_rejected() {
        assert!(matches!(
            parse_str("- web\n- db\n"),
            Err(InventoryError::Structure { .. })
        ));
        assert!(matches!(
            parse_str("all: [h1]\n"),
            Err(InventoryError::Structure { .. })
        ));
        assert!(matches!(
            parse_str("all:\n  hosts: [h1]\n"),
            Err(InventoryError::Structure { .. })
        ));
    }

    #[test]
    fn invalid_yaml_is_reported() {
        assert!(matches!(
            parse_str("all:\n  hosts: {h1\n"),
            Err(InventoryError::Yaml { .. })
        ));
    }

    #[test]
    fn numeric_host_and_group_keys_are_names() {
        let inv = parse_str("all:\n  children:\n    2024:\n      hosts:\n        42:\n          a: 1\n").unwrap();
        assert_eq!(inv.group("2024").unwrap().hosts, vec!["42"]);
        assert_eq!(
            serde_json::Value::Object(inv.host("42").unwrap().vars.clone()),
            json!({"a": 1})
        );
    }

    #[test]
    fn non_scalar_keys_are_rejected() {
        assert!(matches!(
            parse_str("all:\n  hosts:\n    [a, b]: {}\n"),
            Err(InventoryError::Structure { .. })
        ));
    }

    #[test]
    fn empty_document_defines_nothing() {
        let inv = parse_str("").unwrap();
        assert!(inv.is_empty());
    }
}
