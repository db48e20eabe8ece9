//! INI-style inventory parser.
//!
//! ```text
//! loose.example.com
//!
//! [web]
//! web[01:03].example.com http_port=80
//! db.example.com:2222 ansible_user=admin
//!
//! [web:vars]
//! ntp_server=ntp.example.com
//!
//! [prod:children]
//! web
//! ```

use super::{hostrange, vars, Inventory, InventoryError, VarMap, UNGROUPED};
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
enum Section {
    Hosts(String),
    Vars(String),
    Children(String),
}

pub fn parse(inventory: &mut Inventory, path: &Path, text: &str) -> Result<(), InventoryError> {
    let syntax = |line: usize, message: String| InventoryError::Syntax {
        path: path.to_path_buf(),
        line,
        message,
    };

    let mut section = Section::Hosts(UNGROUPED.to_string());
    for (idx, raw) in text.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if line.starts_with('[') {
            section = parse_header(line).map_err(|m| syntax(lineno, m))?;
            let name = match &section {
                Section::Hosts(n) | Section::Vars(n) | Section::Children(n) => n,
            };
            inventory.ensure_group(name)?;
            continue;
        }

        match &section {
            Section::Hosts(group) => {
                let tokens = split_tokens(line).map_err(|m| syntax(lineno, m))?;
                let Some((pattern, rest)) = tokens.split_first() else {
                    continue;
                };
                let (pattern, port) = hostrange::split_port(&pattern.text)?;
                let mut host_vars = VarMap::new();
                if let Some(port) = port {
                    host_vars.insert("ansible_port".to_string(), port.into());
                }
                for token in rest {
                    let (key, value) = token
                        .text
                        .split_once('=')
                        .filter(|(k, _)| !k.is_empty())
                        .ok_or_else(|| {
                            syntax(
                                lineno,
                                format!("expected key=value host variable, got '{}'", token.text),
                            )
                        })?;
                    let value = if token.quoted_value {
                        Value::String(value.to_string())
                    } else {
                        vars::parse_value(value)
                    };
                    host_vars.insert(key.to_string(), value);
                }
                for host in hostrange::expand(pattern)? {
                    inventory.add_host_to_group(group, &host, host_vars.clone())?;
                }
            }
            Section::Vars(group) => {
                let (key, value) = line
                    .split_once('=')
                    .map(|(k, v)| (k.trim(), v.trim()))
                    .filter(|(k, _)| !k.is_empty())
                    .ok_or_else(|| {
                        syntax(lineno, format!("expected key=value variable, got '{line}'"))
                    })?;
                let mut group_vars = VarMap::new();
                group_vars.insert(key.to_string(), vars::parse_value(value));
                inventory.merge_group_vars(group, group_vars)?;
            }
            Section::Children(group) => {
                let tokens = split_tokens(line).map_err(|m| syntax(lineno, m))?;
                if let Some(child) = tokens.first() {
                    inventory.add_child(group, &child.text)?;
                }
            }
        }
    }
    Ok(())
}

fn parse_header(line: &str) -> Result<Section, String> {
    let close = line
        .find(']')
        .ok_or_else(|| format!("unterminated section header '{line}'"))?;
    let trailing = line[close + 1..].trim();
    if !(trailing.is_empty() || trailing.starts_with('#') || trailing.starts_with(';')) {
        return Err(format!("unexpected text after section header '{line}'"));
    }

    let header = line[1..close].trim();
    let (name, kind) = match header.split_once(':') {
        Some((name, kind)) => (name.trim(), Some(kind.trim())),
        None => (header, None),
    };
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(format!("invalid group name '{name}'"));
    }
    match kind {
        None => Ok(Section::Hosts(name.to_string())),
        Some("vars") => Ok(Section::Vars(name.to_string())),
        Some("children") => Ok(Section::Children(name.to_string())),
        Some(other) => Err(format!("unknown section type '{other}' for group '{name}'")),
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    text: String,
    /// The text after the first `=` opened with a quote, so it is never
    /// decoded as a number, boolean or literal.
    quoted_value: bool,
}

/// Shell-like word splitting: quotes group words, backslash escapes outside
/// single quotes, and `#` at the start of a word ends the line.
fn split_tokens(line: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted_value = false;
    let mut in_token = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        if matches!(c, '\'' | '"') && current.ends_with('=') && current.matches('=').count() == 1 {
            quoted_value = true;
        }
        match c {
            '#' if !in_token => break,
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(Token {
                        text: std::mem::take(&mut current),
                        quoted_value: std::mem::take(&mut quoted_value),
                    });
                    in_token = false;
                }
            }
            '\'' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => current.push(ch),
                        None => return Err("unterminated single quote".to_string()),
                    }
                }
            }
            '"' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(ch @ ('"' | '\\')) => current.push(ch),
                            Some(ch) => {
                                current.push('\\');
                                current.push(ch);
                            }
                            None => return Err("unterminated double quote".to_string()),
                        },
                        Some(ch) => current.push(ch),
                        None => return Err("unterminated double quote".to_string()),
                    }
                }
            }
            '\\' => {
                in_token = true;
                if let Some(ch) = chars.next() {
                    current.push(ch);
                }
            }
            c => {
                in_token = true;
                current.push(c);
            }
        }
    }
    if in_token {
        tokens.push(Token {
            text: current,
            quoted_value,
        });
    }
    Ok(tokens)
}
