use regex::Regex;

use crate::models::AttributeMap;

/// Parse the `key="value"` attribute list of an `#EXTINF` line prefix.
///
/// Total: malformed input yields partial or empty results, never an
/// error. A character-scan state machine rather than a single regex so
/// that unquoted fallback values and the comma-terminates-scan rule work:
///   - `"` toggles quoted mode (quoted values may contain spaces/commas)
///   - `=` outside quotes ends the key token and starts the value
///   - whitespace outside quotes commits a pending pair
///   - `,` outside quotes ends attribute scanning (title follows)
///
/// The leading duration token (`-1`, `0`, ...) carries no `=` and is
/// discarded by the whitespace rule, so the whole prefix before the
/// title comma can be fed in as-is. Duplicate keys: last write wins.
pub fn parse_attributes(input: &str) -> AttributeMap {
    let mut attrs = AttributeMap::new();
    let mut key = String::new();
    let mut value = String::new();
    let mut in_value = false;
    let mut in_quotes = false;

    let mut commit = |key: &mut String, value: &mut String| {
        let k = key.trim().to_string();
        let v = strip_quotes(value.trim()).to_string();
        if !k.is_empty() && !v.is_empty() {
            attrs.insert(k, v);
        }
        key.clear();
        value.clear();
    };

    for c in input.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if in_quotes {
            if in_value {
                value.push(c);
            } else {
                key.push(c);
            }
            continue;
        }

        match c {
            ',' => break,
            '=' if !in_value => in_value = true,
            c if c.is_whitespace() => {
                if in_value && !value.trim().is_empty() {
                    commit(&mut key, &mut value);
                    in_value = false;
                } else if !in_value {
                    // bare token with no '=' (e.g. the duration), discard
                    key.clear();
                }
            }
            c => {
                if in_value {
                    value.push(c);
                } else {
                    key.push(c);
                }
            }
        }
    }

    if in_value {
        commit(&mut key, &mut value);
    }

    attrs
}

/// Extract a single parameter from the post-`|` URL suffix
/// (`key=value&key2=value2` form). Case-insensitive key match; value
/// runs to the next `&`.
pub fn get_url_parameter(suffix: &str, key: &str) -> Option<String> {
    let pattern = format!(r"(?i)(?:^|[&|]){}=([^&]*)", regex::escape(key));
    let re = Regex::new(&pattern).ok()?;
    re.captures(suffix)
        .and_then(|caps| caps.get(1))
        .map(|m| strip_quotes(m.as_str().trim()).to_string())
        .filter(|v| !v.is_empty())
}

/// Extract a single value from a tag line such as
/// `#EXTVLCOPT:http-user-agent=...`. Case-insensitive key match; value
/// runs to end of line, quotes stripped.
pub fn get_tag_value(line: &str, key: &str) -> Option<String> {
    let pattern = format!(r"(?i){}=(.*)$", regex::escape(key));
    let re = Regex::new(&pattern).ok()?;
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| strip_quotes(m.as_str().trim()).to_string())
        .filter(|v| !v.is_empty())
}

/// Strip one pair of surrounding quotes, if present.
pub fn strip_quotes(value: &str) -> &str {
    let v = value.trim();
    if v.len() >= 2 && v.starts_with('"') && v.ends_with('"') {
        &v[1..v.len() - 1]
    } else {
        v
    }
}
