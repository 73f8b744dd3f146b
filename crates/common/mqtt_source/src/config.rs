use crate::TopicFilter;
use std::time::Duration;

/// Configuration of an MQTT subscription
#[derive(Debug, Clone)]
pub struct Config {
    /// MQTT host to connect to
    ///
    /// Default: "localhost"
    pub host: String,

    /// MQTT port to connect to
    ///
    /// Default: 1883
    pub port: u16,

    /// The session name to be used on connect
    ///
    /// Default: "mqtt_source"
    pub session_name: String,

    /// The list of topics to subscribe to on connect
    ///
    /// The subscriptions are re-issued on each reconnect,
    /// the broker session being always clean.
    ///
    /// Default: An empty topic list
    pub subscriptions: TopicFilter,

    /// Keep-alive interval of the connection
    ///
    /// Default: 60 seconds
    pub keep_alive: Duration,

    /// Capacity of the internal request queue
    ///
    /// Default: `1024`.
    pub queue_capacity: usize,

    /// Maximum size for a message payload
    ///
    /// Default: `1024 * 1024`.
    pub max_packet_size: usize,
}

/// By default a client connects the local MQTT broker.
impl Default for Config {
    fn default() -> Self {
        Config {
            host: String::from("localhost"),
            port: 1883,
            session_name: String::from("mqtt_source"),
            subscriptions: TopicFilter {
                patterns: vec![],
                qos: rumqttc::QoS::AtLeastOnce,
            },
            keep_alive: Duration::from_secs(60),
            queue_capacity: 1024,
            max_packet_size: 1024 * 1024,
        }
    }
}

impl Config {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Config::default()
        }
    }

    /// Set the session name
    pub fn with_session_name(self, name: impl Into<String>) -> Self {
        Self {
            session_name: name.into(),
            ..self
        }
    }

    /// Add a list of topics to subscribe to on connect
    ///
    /// Can be called several times to subscribe to many topics.
    pub fn with_subscriptions(mut self, topics: TopicFilter) -> Self {
        for pattern in topics.patterns {
            self.subscriptions.patterns.push(pattern);
        }
        self.subscriptions.qos = topics.qos;
        self
    }

    /// Set the keep-alive interval
    pub fn with_keep_alive(self, keep_alive: Duration) -> Self {
        Self { keep_alive, ..self }
    }

    /// Wrap this config into an internal set of options for `rumqttc`.
    pub(crate) fn mqtt_options(&self) -> rumqttc::MqttOptions {
        let mut mqtt_options =
            rumqttc::MqttOptions::new(&self.session_name, &self.host, self.port);

        // A subscriber with no session state: the subscriptions are
        // re-issued on each reconnect.
        mqtt_options.set_clean_session(true);
        mqtt_options.set_keep_alive(self.keep_alive);
        mqtt_options.set_max_packet_size(self.max_packet_size, self.max_packet_size);

        mqtt_options
    }
}
