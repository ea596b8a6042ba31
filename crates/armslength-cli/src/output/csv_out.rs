use serde_json::Value;
use std::io;

/// Write output as CSV to stdout.
///
/// A benchmark result becomes one row per comparable; any other result is
/// written as two-column field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(Value::Array(adjusted)) = result
        .get("analysis")
        .and_then(|a| a.get("adjusted_comparables"))
    {
        write_comparables(&mut wtr, adjusted);
    } else if let Value::Object(map) = result {
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in map {
            match val {
                Value::Object(inner) => {
                    for (sub, v) in inner {
                        let _ = wtr.write_record([format!("{key}.{sub}"), format_csv_value(v)]);
                    }
                }
                _ => {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            }
        }
    } else {
        let _ = wtr.write_record([&format_csv_value(result)]);
    }

    let _ = wtr.flush();
}

fn write_comparables(wtr: &mut csv::Writer<io::StdoutLock<'_>>, adjusted: &[Value]) {
    let _ = wtr.write_record([
        "name",
        "fiscal_year",
        "original_margin",
        "total_adjustment",
        "adjusted_margin",
    ]);
    for item in adjusted {
        let entity = item.get("entity");
        let field = |v: Option<&Value>| v.map(format_csv_value).unwrap_or_default();
        let _ = wtr.write_record([
            field(entity.and_then(|e| e.get("name"))),
            field(entity.and_then(|e| e.get("fiscal_year"))),
            field(item.get("original_margin")),
            field(item.get("total_adjustment")),
            field(item.get("adjusted_margin")),
        ]);
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
