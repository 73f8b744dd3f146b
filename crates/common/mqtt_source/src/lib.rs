//! A library to subscribe to the topics of an MQTT bus.
//!
//! ```no_run
//! use mqtt_source::{Config, Connection, MqttError, StreamExt, TopicFilter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), MqttError> {
//!     // A client subscribes to its topics on connect
//!     let config = Config::new("localhost", 1883)
//!         .with_session_name("watcher")
//!         .with_subscriptions(TopicFilter::new("test/input/#")?);
//!     let mut con = Connection::connect(&config).await?;
//!
//!     // Messages are received from the subscriptions on the received channel
//!     while let Some(message) = con.received.next().await {
//!         println!("{}", message.payload_str()?);
//!     }
//!
//!     // The connection is closed on drop
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

mod config;
mod connection;
mod errors;
mod messages;
mod topics;

pub use config::*;
pub use connection::*;
pub use errors::*;
pub use messages::*;
pub use topics::*;

pub use futures::channel::mpsc::UnboundedReceiver;
pub use futures::Stream;
pub use futures::StreamExt;

pub use rumqttc::QoS;
