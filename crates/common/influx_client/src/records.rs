use crate::InfluxError;
use serde_json::Map;
use serde_json::Value;

/// A single time-series record: a measurement name plus named field values.
///
/// Field values are kept as decoded from JSON, without coercion. Values the
/// line protocol cannot carry (null, arrays, objects) are only rejected when
/// the record is encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRecord {
    measurement: String,
    fields: Map<String, Value>,
}

impl WriteRecord {
    pub fn new(measurement: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            measurement: measurement.into(),
            fields,
        }
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Encode this record as one line of InfluxDB line protocol,
    /// without a timestamp (the store assigns the write time).
    pub fn to_line_protocol(&self) -> Result<String, InfluxError> {
        if self.fields.is_empty() {
            return Err(InfluxError::EmptyRecord);
        }

        let mut line = escape_name(&self.measurement);
        let mut separator = ' ';
        for (key, value) in &self.fields {
            line.push(separator);
            separator = ',';
            line.push_str(&escape_key(key));
            line.push('=');
            line.push_str(&encode_field_value(key, value)?);
        }

        Ok(line)
    }
}

fn encode_field_value(key: &str, value: &Value) -> Result<String, InfluxError> {
    match value {
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                Ok(format!("{int}i"))
            } else if let Some(uint) = number.as_u64() {
                Ok(format!("{uint}u"))
            } else if let Some(float) = number.as_f64() {
                Ok(float.to_string())
            } else {
                Err(unsupported(key, value))
            }
        }
        Value::String(text) => Ok(format!(
            "\"{}\"",
            text.replace('\\', "\\\\").replace('"', "\\\"")
        )),
        Value::Null | Value::Array(_) | Value::Object(_) => Err(unsupported(key, value)),
    }
}

fn unsupported(key: &str, value: &Value) -> InfluxError {
    InfluxError::UnsupportedFieldValue {
        field: key.to_string(),
        value: value.clone(),
    }
}

/// Measurement names escape commas and spaces.
fn escape_name(name: &str) -> String {
    name.replace(',', "\\,").replace(' ', "\\ ")
}

/// Field keys additionally escape the key/value separator.
fn escape_key(key: &str) -> String {
    escape_name(key).replace('=', "\\=")
}
