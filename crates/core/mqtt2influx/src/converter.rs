use influx_client::WriteRecord;
use mqtt_source::Message;
use serde_json::Value;

/// Topic namespace the devices publish their readings under.
pub const TELEMETRY_ROOT: &str = "zigbee2mqtt";

/// Sub-namespace reserved for the gateway's own status messages.
/// Nothing under it is ever a device reading.
const ADMIN_MARKER: &str = "bridge";

/// Where a message goes after classification.
///
/// The classification is purely structural: only the shape of the topic
/// path decides, never the payload content.
#[derive(Debug)]
pub enum Route {
    /// An administrative gateway message, dropped silently.
    Ignored,

    /// A device reading, to be forwarded to the store as one record.
    Reading(WriteRecord),

    /// A topic shape the routing rule does not cover.
    Unrouted,
}

/// A device message that could not be decoded into a reading
#[derive(thiserror::Error, Debug)]
pub enum RouteError {
    #[error("Non UTF-8 payload on topic {topic}")]
    NonUtf8Payload { topic: String },

    #[error("Error parsing message on topic {topic}: {source}")]
    InvalidJsonPayload {
        topic: String,
        source: serde_json::Error,
    },

    #[error("Payload on topic {topic} is valid JSON but not an object")]
    NotAnObject { topic: String },
}

/// Classify one inbound message.
///
/// A two-segment `<root>/<deviceId>` topic is a device reading: the trimmed
/// device id names the measurement and the JSON object payload provides the
/// fields. Administrative `<root>/bridge...` topics are ignored whatever
/// their depth, and everything else is left unrouted.
pub fn route(message: &Message) -> Result<Route, RouteError> {
    let topic = message.topic.name.as_str();
    let segments: Vec<&str> = topic.split('/').collect();

    match segments.as_slice() {
        [TELEMETRY_ROOT, ADMIN_MARKER, ..] => Ok(Route::Ignored),
        [TELEMETRY_ROOT, device] => Ok(Route::Reading(parse_reading(
            topic,
            device,
            message.payload_bytes(),
        )?)),
        _ => Ok(Route::Unrouted),
    }
}

fn parse_reading(topic: &str, device: &str, payload: &[u8]) -> Result<WriteRecord, RouteError> {
    let measurement = device.trim();

    let payload = std::str::from_utf8(payload).map_err(|_| RouteError::NonUtf8Payload {
        topic: topic.to_string(),
    })?;

    let json: Value =
        serde_json::from_str(payload).map_err(|err| RouteError::InvalidJsonPayload {
            topic: topic.to_string(),
            source: err,
        })?;

    match json {
        Value::Object(fields) => Ok(WriteRecord::new(measurement, fields)),
        // A bare number, string or array parses as JSON but carries no
        // field mapping: reported as a decode error, not guessed around.
        _ => Err(RouteError::NotAnObject {
            topic: topic.to_string(),
        }),
    }
}
