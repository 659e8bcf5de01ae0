use serde_json::Value;

const MAX_COL_WIDTH: usize = 40;

/// Render a list payload as an ASCII table.
///
/// Accepts a top-level array of objects, or a page object carrying the array under
/// `items`. `columns` picks and orders the columns; without it the union of keys is used,
/// sorted. Returns `None` when the payload is not a list of rows (callers fall back to
/// JSON) and a one-line message for an empty list.
pub fn render_table(val: &Value, columns: Option<&[&str]>) -> Option<String> {
    let arr = rows_of(val)?;
    if arr.is_empty() {
        return Some("(no rows)".to_string());
    }

    let cols: Vec<String> = match columns {
        Some(c) if !c.is_empty() => c.iter().map(|s| s.to_string()).collect(),
        _ => union_of_keys(arr)?,
    };
    let rows: Vec<Vec<String>> = arr
        .iter()
        .map(|el| match el {
            Value::Object(map) => cols.iter().map(|k| to_cell_string(map.get(k).unwrap_or(&Value::Null))).collect(),
            scalar => vec![to_cell_string(scalar)],
        })
        .collect();

    let mut widths: Vec<usize> = cols.iter().map(|s| display_len(s).min(MAX_COL_WIDTH)).collect();
    for r in &rows {
        for (i, cell) in r.iter().enumerate().take(cols.len()) {
            let w = display_len(cell);
            if w > widths[i] {
                widths[i] = w.min(MAX_COL_WIDTH);
            }
        }
    }

    let sep = build_separator(&widths);
    let mut out = Vec::with_capacity(rows.len() + 5);
    out.push(sep.clone());
    out.push(build_row(&cols, &widths));
    out.push(sep.clone());
    for r in &rows {
        out.push(build_row(r, &widths));
    }
    out.push(sep);
    let mut summary = format!("rows: {}", rows.len());
    if let Some(total) = val.get("totalCount").and_then(Value::as_u64) {
        if total as usize != rows.len() {
            summary.push_str(&format!(" of {}", total));
        }
    }
    out.push(summary);
    Some(out.join("\n"))
}

fn rows_of(val: &Value) -> Option<&Vec<Value>> {
    match val {
        Value::Array(arr) => Some(arr),
        Value::Object(map) => map.get("items").and_then(Value::as_array),
        _ => None,
    }
}

fn union_of_keys(arr: &[Value]) -> Option<Vec<String>> {
    let mut keys: Vec<String> = Vec::new();
    for el in arr {
        let Value::Object(map) = el else { return Some(vec!["value".to_string()]) };
        for k in map.keys() {
            if !keys.contains(k) {
                keys.push(k.clone());
            }
        }
    }
    if keys.is_empty() {
        return None;
    }
    keys.sort();
    Some(keys)
}

fn to_cell_string(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        // keep nested values compact
        other => other.to_string(),
    }
}

fn display_len(s: &str) -> usize { s.chars().count() }

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::from("+");
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::from("|");
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let text = truncate(cell, *w);
        let pad = " ".repeat(w.saturating_sub(display_len(&text)));
        s.push(' ');
        if is_numeric_like(cell) {
            s.push_str(&pad);
            s.push_str(&text);
        } else {
            s.push_str(&text);
            s.push_str(&pad);
        }
        s.push_str(" |");
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= 1 {
        return "…".to_string();
    }
    s.chars().take(max - 1).collect::<String>() + "…"
}

// crude detection for right-aligning numbers
fn is_numeric_like(s: &str) -> bool {
    let st = s.trim();
    if st.is_empty() {
        return false;
    }
    let mut has_digit = false;
    for ch in st.chars() {
        if ch.is_ascii_digit() {
            has_digit = true;
            continue;
        }
        if ".-+eE,_".contains(ch) {
            continue;
        }
        return false;
    }
    has_digit
}
