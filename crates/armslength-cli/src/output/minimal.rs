use serde_json::Value;

/// Print just the key answer from the output.
///
/// Benchmark and compliance results print the range position and the
/// adjustment required; adjustment results print the net adjustment; range
/// results print the quartiles. Anything else falls back to its first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let compliance = result_obj.get("compliance").unwrap_or(result_obj);
    if let (Some(position), Some(required)) = (
        compliance.get("position"),
        compliance.get("adjustment_required"),
    ) {
        println!("{} {}", format_minimal(position), format_minimal(required));
        return;
    }

    if let Some(range) = result_obj.get("range") {
        let quartiles: Vec<String> = ["q1", "median", "q3"]
            .iter()
            .map(|k| range.get(*k).map(format_minimal).unwrap_or_default())
            .collect();
        println!("{}", quartiles.join(" "));
        return;
    }

    // Priority list of key output fields
    let priority_keys = ["net_adjustment", "adjusted_margin", "median"];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
