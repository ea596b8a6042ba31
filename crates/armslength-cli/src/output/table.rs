use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Columns shown for each comparable in a benchmark result.
const COMPARABLE_COLUMNS: [&str; 4] = [
    "original_margin",
    "total_adjustment",
    "adjusted_margin",
    "adjustments_applied",
];

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(value);
            }
        }
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    if let Some(Value::Array(adjusted)) = result
        .get("analysis")
        .and_then(|a| a.get("adjusted_comparables"))
    {
        print_comparables(adjusted);
        println!();
    }

    // Scalars and one level of nested objects; lists of entities are skipped
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    if let Value::Object(res_map) = result {
        push_flattened(&mut builder, "", res_map);
    }
    println!("{}", Table::from(builder));

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn push_flattened(builder: &mut Builder, prefix: &str, map: &Map<String, Value>) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => {
                if prefix.is_empty() || inner.values().all(|v| !v.is_object()) {
                    push_flattened(builder, &name, inner);
                }
            }
            Value::Array(items) if items.iter().any(Value::is_object) => {}
            _ => builder.push_record([name.as_str(), &format_value(val)]),
        }
    }
}

fn print_comparables(adjusted: &[Value]) {
    let mut builder = Builder::default();
    let mut header = vec!["comparable".to_string()];
    header.extend(COMPARABLE_COLUMNS.iter().map(|c| c.to_string()));
    builder.push_record(header);

    for item in adjusted {
        let name = item
            .get("entity")
            .and_then(|e| e.get("name"))
            .map(format_value)
            .unwrap_or_default();
        let applied = item
            .get("adjustments")
            .and_then(Value::as_array)
            .map(|adjs| {
                adjs.iter()
                    .filter(|a| a.get("applied").and_then(Value::as_bool) == Some(true))
                    .filter_map(|a| a.get("adjustment_type").map(format_value))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        let mut row = vec![name];
        for col in &COMPARABLE_COLUMNS[..3] {
            row.push(item.get(*col).map(format_value).unwrap_or_default());
        }
        row.push(applied);
        builder.push_record(row);
    }

    println!("{}", Table::from(builder));
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
