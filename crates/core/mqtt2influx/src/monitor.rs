use crate::config::BridgeConfig;
use crate::converter;
use crate::converter::Route;
use influx_client::InfluxClient;
use mqtt_source::Connection;
use mqtt_source::Message;
use mqtt_source::MqttError;
use mqtt_source::QoS;
use mqtt_source::StreamExt;
use mqtt_source::TopicFilter;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::instrument;

const MQTT_CLIENT_ID: &str = "mqtt2influx";

/// The bridge run loop: subscribes to the device topics and forwards
/// each reading to InfluxDB, one message at a time, in delivery order.
#[derive(Debug)]
pub struct BridgeMonitor {
    config: BridgeConfig,
}

impl BridgeMonitor {
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    #[instrument(skip(self), name = "monitor")]
    pub async fn run(&self) -> Result<(), MqttError> {
        let source_topic = TopicFilter::new(&format!("{}/#", converter::TELEMETRY_ROOT))?
            .with_qos(QoS::AtMostOnce);

        let mqtt_config = mqtt_source::Config::new(&self.config.mqtt_host, self.config.mqtt_port)
            .with_session_name(MQTT_CLIENT_ID)
            .with_subscriptions(source_topic);

        let mqtt_client = Connection::connect(&mqtt_config).await?;
        info!(
            "Connected to the MQTT broker {}:{}",
            self.config.mqtt_host, self.config.mqtt_port
        );

        let influx_client = InfluxClient::new(self.config.influx_config());

        let mut mqtt_errors = mqtt_client.errors;
        let error_join_handle = tokio::spawn(async move {
            while let Some(error) = mqtt_errors.next().await {
                error!("MQTT error: {}", error);
            }
        });

        // The single consumer: readings are forwarded inline, so a slow
        // store stalls the subsequent messages rather than reordering them.
        let mut messages = mqtt_client.received;
        while let Some(message) = messages.next().await {
            Self::process_message(&influx_client, &message).await;
        }

        // The MQTT connection has been closed by the process itself.
        info!("Bridge stopped");
        let _ = error_join_handle.await;

        Ok(())
    }

    /// Handle one message: every error is logged and contained here,
    /// whatever happens the caller goes on with the next message.
    async fn process_message(influx_client: &InfluxClient, message: &Message) {
        match converter::route(message) {
            Ok(Route::Ignored) => {}

            Ok(Route::Reading(record)) => {
                debug!(
                    "Received a reading from {}: {:?}",
                    record.measurement(),
                    record.fields()
                );
                if let Err(err) = influx_client.write(&record).await {
                    error!("Error sending a record to InfluxDB: {}: {:?}", err, record);
                }
            }

            Ok(Route::Unrouted) => {
                debug!(
                    "Unrouted message on topic {}: {:?}",
                    message.topic.name,
                    String::from_utf8_lossy(message.payload_bytes())
                );
            }

            Err(err) => {
                error!("Error decoding a device message: {}", err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use influx_client::InfluxConfig;
    use mockito::Matcher;
    use mqtt_source::Topic;

    fn test_client(server: &mockito::ServerGuard) -> InfluxClient {
        InfluxClient::new(InfluxConfig::new(server.url(), "token", "home", "telemetry"))
    }

    fn message(topic: &str, payload: &str) -> Message {
        Message::new(&Topic::new_unchecked(topic), payload)
    }

    #[tokio::test]
    async fn each_device_reading_is_written_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v2/write")
            .match_query(Matcher::UrlEncoded("precision".into(), "s".into()))
            .match_body("sensor1 humidity=60i,temperature=21.5")
            .with_status(204)
            .create_async()
            .await;

        let influx_client = test_client(&server);
        let reading = message(
            "zigbee2mqtt/sensor1",
            r#"{"temperature": 21.5, "humidity": 60}"#,
        );

        BridgeMonitor::process_message(&influx_client, &reading).await;

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn replayed_readings_are_written_again() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v2/write")
            .match_query(Matcher::Any)
            .match_body("sensor1 temperature=21.5")
            .with_status(204)
            .expect(2)
            .create_async()
            .await;

        let influx_client = test_client(&server);
        let reading = message("zigbee2mqtt/sensor1", r#"{"temperature": 21.5}"#);

        // No deduplication: the identical message is forwarded twice
        BridgeMonitor::process_message(&influx_client, &reading).await;
        BridgeMonitor::process_message(&influx_client, &reading).await;

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn nothing_is_written_for_other_messages() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v2/write")
            .match_query(Matcher::Any)
            .with_status(204)
            .expect(0)
            .create_async()
            .await;

        let influx_client = test_client(&server);

        for (topic, payload) in [
            // administrative
            ("zigbee2mqtt/bridge/state", "online"),
            // unrouted shapes
            ("zigbee2mqtt/a/b/c", "anything"),
            ("zigbee2mqtt", "anything"),
            // decode errors
            ("zigbee2mqtt/sensor1", "not-json"),
            ("zigbee2mqtt/sensor1", "21.5"),
        ] {
            BridgeMonitor::process_message(&influx_client, &message(topic, payload)).await;
        }

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn a_failed_write_is_contained() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v2/write")
            .match_query(Matcher::Any)
            .with_status(500)
            .expect(2)
            .create_async()
            .await;

        let influx_client = test_client(&server);
        let reading = message("zigbee2mqtt/sensor1", r#"{"temperature": 21.5}"#);

        // The error is logged and dropped: the next message is still processed
        BridgeMonitor::process_message(&influx_client, &reading).await;
        BridgeMonitor::process_message(&influx_client, &reading).await;

        mock.assert_async().await;
    }
}
