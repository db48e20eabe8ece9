use super::InventoryError;

fn pattern_error(pattern: &str, reason: impl Into<String>) -> InventoryError {
    InventoryError::HostPattern {
        pattern: pattern.to_string(),
        reason: reason.into(),
    }
}

/// Splits a trailing `:port` off a host pattern.
///
/// Colons inside range brackets never count, and a bare IPv6 address
/// (several colons, no brackets) is returned untouched.
pub fn split_port(pattern: &str) -> Result<(&str, Option<u16>), InventoryError> {
    let Some(idx) = pattern.rfind(':') else {
        return Ok((pattern, None));
    };
    let (head, tail) = (&pattern[..idx], &pattern[idx + 1..]);
    let balanced = head.matches('[').count() == head.matches(']').count();
    if !balanced || tail.is_empty() || !tail.chars().all(|c| c.is_ascii_digit()) {
        return Ok((pattern, None));
    }
    if head.contains(':') && !head.contains('[') {
        return Ok((pattern, None));
    }
    let port = tail
        .parse::<u16>()
        .map_err(|_| pattern_error(pattern, format!("port {tail} is out of range")))?;
    Ok((head, Some(port)))
}

/// Expands every `[start:end]` / `[start:end:stride]` range in `pattern`,
/// left to right. Patterns without ranges expand to themselves.
pub fn expand(pattern: &str) -> Result<Vec<String>, InventoryError> {
    let Some(open) = pattern.find('[') else {
        return Ok(vec![pattern.to_string()]);
    };
    let Some(close_rel) = pattern[open..].find(']') else {
        return Err(pattern_error(pattern, "unclosed '['"));
    };
    let close = open + close_rel;
    let inner = &pattern[open + 1..close];
    if !inner.contains(':') {
        return Ok(vec![pattern.to_string()]);
    }

    let head = &pattern[..open];
    let tail = &pattern[close + 1..];
    let values = range_values(pattern, inner)?;
    let tails = expand(tail)?;

    let mut out = Vec::with_capacity(values.len() * tails.len());
    for value in &values {
        for rest in &tails {
            out.push(format!("{head}{value}{rest}"));
        }
    }
    Ok(out)
}

fn range_values(pattern: &str, inner: &str) -> Result<Vec<String>, InventoryError> {
    let parts: Vec<&str> = inner.split(':').collect();
    let (beg, end, stride) = match parts.as_slice() {
        [beg, end] => (*beg, *end, 1usize),
        [beg, end, stride] => {
            let stride = stride
                .parse::<usize>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| pattern_error(pattern, format!("invalid stride '{stride}'")))?;
            (*beg, *end, stride)
        }
        _ => return Err(pattern_error(pattern, "range must be [start:end] or [start:end:stride]")),
    };
    let beg = if beg.is_empty() { "0" } else { beg };
    if end.is_empty() {
        return Err(pattern_error(pattern, "range end is missing"));
    }

    let numeric = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if numeric(beg) && numeric(end) {
        let width = if beg.len() > 1 && beg.starts_with('0') {
            if beg.len() != end.len() {
                return Err(pattern_error(
                    pattern,
                    "padded range bounds must have the same width",
                ));
            }
            beg.len()
        } else {
            0
        };
        let start: u64 = beg
            .parse()
            .map_err(|_| pattern_error(pattern, format!("invalid range start '{beg}'")))?;
        let stop: u64 = end
            .parse()
            .map_err(|_| pattern_error(pattern, format!("invalid range end '{end}'")))?;
        if start > stop {
            return Err(pattern_error(pattern, "range start is greater than end"));
        }
        return Ok((start..=stop)
            .step_by(stride)
            .map(|n| format!("{n:0width$}"))
            .collect());
    }

    let letter = |s: &str| {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => Some(c),
            _ => None,
        }
    };
    match (letter(beg), letter(end)) {
        (Some(a), Some(b)) if a <= b => Ok((a..=b).step_by(stride).map(String::from).collect()),
        (Some(_), Some(_)) => Err(pattern_error(pattern, "range start is greater than end")),
        _ => Err(pattern_error(
            pattern,
            "range bounds must both be numbers or single letters",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_pass_through() {
        assert_eq!(expand("db.example.com").unwrap(), vec!["db.example.com"]);
    }

    #[test]
    fn zero_padded_numeric_range_keeps_width() {
        assert_eq!(
            expand("web[08:11].example.com").unwrap(),
            vec![
                "web08.example.com",
                "web09.example.com",
                "web10.example.com",
                "web11.example.com"
            ]
        );
    }

    #[test]
    fn stride_and_empty_start() {
        assert_eq!(expand("n[:6:3]").unwrap(), vec!["n0", "n3", "n6"]);
    }

    #[test]
    fn letter_ranges_and_products() {
        assert_eq!(
            expand("rack[a:b]-[1:2]").unwrap(),
            vec!["racka-1", "racka-2", "rackb-1", "rackb-2"]
        );
    }

    #[test]
    fn malformed_ranges_are_errors() {
        assert!(expand("web[01:3]").is_err());
        assert!(expand("web[5:1]").is_err());
        assert!(expand("web[1:]").is_err());
        assert!(expand("web[a:3]").is_err());
        assert!(expand("web[1:3:0]").is_err());
        assert!(expand("web[1:3").is_err());
    }

    #[test]
    fn port_suffix_is_split_outside_brackets() {
        assert_eq!(split_port("db:2222").unwrap(), ("db", Some(2222)));
        assert_eq!(split_port("web[1:3]:22").unwrap(), ("web[1:3]", Some(22)));
        assert_eq!(split_port("web[1:3]").unwrap(), ("web[1:3]", None));
        assert_eq!(split_port("fe80::1").unwrap(), ("fe80::1", None));
        assert!(split_port("db:70000").is_err());
    }
}
