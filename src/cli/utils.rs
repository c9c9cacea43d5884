use std::io::Read;

use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(Value::Object(extra)) = data {
                if let Some(object) = response.as_object_mut() {
                    object.extend(extra);
                }
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str, error_code: Option<&str>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Print a server response: raw JSON, or one text line per record via `line`
pub fn output_records(
    output_format: &OutputFormat,
    body: &Value,
    key: &str,
    empty_message: &str,
    line: impl Fn(&Value) -> String,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(body)?),
        OutputFormat::Text => {
            let records = body.get(key).and_then(Value::as_array).cloned().unwrap_or_default();
            if records.is_empty() {
                println!("{}", empty_message);
            }
            for record in &records {
                println!("{}", line(record));
            }
        }
    }
    Ok(())
}

/// Print one record: raw JSON, or `key: value` lines for its scalar fields
pub fn output_record(output_format: &OutputFormat, body: &Value, key: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(body)?),
        OutputFormat::Text => {
            if let Some(Value::Object(fields)) = body.get(key) {
                for (name, value) in fields {
                    println!("{:>12}: {}", name, text_value(value));
                }
            }
        }
    }
    Ok(())
}

fn text_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

pub fn str_field<'a>(record: &'a Value, field: &str) -> &'a str {
    record.get(field).and_then(Value::as_str).unwrap_or("")
}

/// Read a JSON document from stdin
pub fn read_json_stdin() -> anyhow::Result<Value> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    if input.trim().is_empty() {
        return Err(anyhow::anyhow!("Expected a JSON object on stdin"));
    }
    let value: Value = serde_json::from_str(&input)?;
    if !value.is_object() {
        return Err(anyhow::anyhow!("Expected a JSON object on stdin"));
    }
    Ok(value)
}

/// Overlay `Some` flag values onto a JSON body
pub fn merge_fields(mut body: Value, fields: Vec<(&str, Option<Value>)>) -> Value {
    if let Some(object) = body.as_object_mut() {
        for (name, value) in fields {
            if let Some(value) = value {
                object.insert(name.to_string(), value);
            }
        }
    }
    body
}
