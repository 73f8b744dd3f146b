use crate::errors::MqttError;
use crate::Message;
use rumqttc::QoS;
use rumqttc::SubscribeFilter;

/// An MQTT topic
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Topic {
    pub name: String,
}

impl Topic {
    /// Check if the topic name is valid and build a new topic.
    pub fn new(name: &str) -> Result<Topic, MqttError> {
        let name = String::from(name);
        if rumqttc::valid_topic(&name) {
            Ok(Topic { name })
        } else {
            Err(MqttError::InvalidTopic { name })
        }
    }

    /// Build a new topic, assuming the name is valid
    pub fn new_unchecked(name: &str) -> Topic {
        let name = String::from(name);
        Topic { name }
    }
}

/// An MQTT topic filter, as subscribed to on connect
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TopicFilter {
    pub patterns: Vec<String>,
    pub qos: QoS,
}

impl TopicFilter {
    /// Check if the pattern is valid and build a new topic filter.
    pub fn new(pattern: &str) -> Result<TopicFilter, MqttError> {
        let pattern = String::from(pattern);
        if rumqttc::valid_filter(&pattern) {
            Ok(TopicFilter {
                patterns: vec![pattern],
                qos: QoS::AtLeastOnce,
            })
        } else {
            Err(MqttError::InvalidFilter { pattern })
        }
    }

    /// Build a new topic filter, assuming the pattern is valid.
    pub fn new_unchecked(pattern: &str) -> TopicFilter {
        TopicFilter {
            patterns: vec![String::from(pattern)],
            qos: QoS::AtLeastOnce,
        }
    }

    /// Check if the pattern is valid and add it to this topic filter.
    pub fn add(&mut self, pattern: &str) -> Result<(), MqttError> {
        let pattern = String::from(pattern);
        if rumqttc::valid_filter(&pattern) {
            self.patterns.push(pattern);
            Ok(())
        } else {
            Err(MqttError::InvalidFilter { pattern })
        }
    }

    /// Check if the given topic matches this filter pattern.
    pub fn accept_topic(&self, topic: &Topic) -> bool {
        self.patterns
            .iter()
            .any(|pattern| rumqttc::matches(&topic.name, pattern))
    }

    /// Check if the given message matches this filter pattern.
    pub fn accept(&self, msg: &Message) -> bool {
        self.accept_topic(&msg.topic)
    }

    /// A clone of this topic filter with the given QoS
    pub fn with_qos(self, qos: QoS) -> Self {
        Self { qos, ..self }
    }

    /// The list of `SubscribeFilter` expected by `rumqttc`
    pub(crate) fn filters(&self) -> Vec<SubscribeFilter> {
        let qos = self.qos;
        self.patterns
            .iter()
            .map(|path| SubscribeFilter {
                path: path.clone(),
                qos,
            })
            .collect()
    }
}

impl TryFrom<&str> for Topic {
    type Error = MqttError;

    fn try_from(name: &str) -> Result<Topic, Self::Error> {
        Topic::new(name)
    }
}

impl TryFrom<&str> for TopicFilter {
    type Error = MqttError;

    fn try_from(pattern: &str) -> Result<TopicFilter, Self::Error> {
        TopicFilter::new(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_valid_topic() {
        assert!(Topic::new("temp").is_ok());
        assert!(Topic::new("temp/device-12").is_ok());
    }

    #[test]
    fn check_invalid_topic() {
        assert!(Topic::new("/temp/+").is_err());
        assert!(Topic::new("/temp/#").is_err());
    }

    #[test]
    fn check_valid_topic_filter() {
        assert!(TopicFilter::new("a/b/c").is_ok());
        assert!(TopicFilter::new("a/b/#").is_ok());
        assert!(TopicFilter::new("a/b/+").is_ok());
        assert!(TopicFilter::new("a/+/b").is_ok());
    }

    #[test]
    fn check_invalid_topic_filter() {
        assert!(TopicFilter::new("").is_err());
        assert!(TopicFilter::new("/a/#/b").is_err());
        assert!(TopicFilter::new("/a/#/+").is_err());
    }

    #[test]
    fn filter_matches_wildcard_subtopics() {
        let filter = TopicFilter::new("telemetry/#").unwrap();

        assert!(filter.accept_topic(&Topic::new_unchecked("telemetry/device1")));
        assert!(filter.accept_topic(&Topic::new_unchecked("telemetry/a/b/c")));
        assert!(!filter.accept_topic(&Topic::new_unchecked("other/device1")));
    }
}
