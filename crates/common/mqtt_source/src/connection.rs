use crate::Config;
use crate::Message;
use crate::MqttError;
use crate::TopicFilter;
use futures::channel::mpsc;
use futures::SinkExt;
use rumqttc::AsyncClient;
use rumqttc::ConnectionError;
use rumqttc::Event;
use rumqttc::EventLoop;
use rumqttc::Outgoing;
use rumqttc::Packet;
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

/// A connection to some MQTT server, from which messages are only received.
///
/// The connection is kept open until the receiver channel is dropped:
/// on link loss the event loop transparently reconnects and re-issues
/// the configured subscriptions.
pub struct Connection {
    /// The channel of the messages received on the subscribed topics.
    pub received: mpsc::UnboundedReceiver<Message>,

    /// The channel of the transport errors raised while the connection is up.
    ///
    /// These errors are recoverable: each one is followed by a reconnect attempt.
    pub errors: mpsc::UnboundedReceiver<MqttError>,
}

impl Connection {
    /// Open the connection and issue the configured subscriptions.
    ///
    /// Fails if the broker is unreachable or rejects the session.
    /// Once established, the connection is maintained across link losses
    /// and all subsequent errors are reported on the `errors` channel.
    pub async fn connect(config: &Config) -> Result<Connection, MqttError> {
        let (received_sender, received_receiver) = mpsc::unbounded();
        let (error_sender, error_receiver) = mpsc::unbounded();

        let (mqtt_client, event_loop) =
            Connection::open(config, received_sender.clone()).await?;
        tokio::spawn(Connection::receiver_loop(
            mqtt_client,
            config.subscriptions.clone(),
            event_loop,
            received_sender,
            error_sender,
        ));

        Ok(Connection {
            received: received_receiver,
            errors: error_receiver,
        })
    }

    async fn open(
        config: &Config,
        mut message_sender: mpsc::UnboundedSender<Message>,
    ) -> Result<(AsyncClient, EventLoop), MqttError> {
        let mqtt_options = config.mqtt_options();
        let (mqtt_client, mut event_loop) = AsyncClient::new(mqtt_options, config.queue_capacity);

        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    info!("Connected to the MQTT broker: {:?}", ack.code);
                    if config.subscriptions.patterns.is_empty() {
                        break;
                    }
                    mqtt_client
                        .subscribe_many(config.subscriptions.filters())
                        .await?;
                }

                Ok(Event::Incoming(Packet::SubAck(_))) => {
                    break;
                }

                Ok(Event::Incoming(Packet::Publish(msg))) => {
                    // Messages can be received before the sub ack
                    let _ = message_sender.send(msg.into()).await;
                }

                // At connect time an unreachable broker or a rejected
                // session is reported to the caller.
                Err(err) => return Err(err.into()),

                _ => (),
            }
        }

        Ok((mqtt_client, event_loop))
    }

    async fn receiver_loop(
        mqtt_client: AsyncClient,
        subscriptions: TopicFilter,
        mut event_loop: EventLoop,
        mut message_sender: mpsc::UnboundedSender<Message>,
        mut error_sender: mpsc::UnboundedSender<MqttError>,
    ) {
        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    // The broker session is not assumed to survive a reconnect:
                    // the subscriptions are re-issued on each ConnAck.
                    info!("Connected to the MQTT broker: {:?}", ack.code);
                    if !subscriptions.patterns.is_empty() {
                        if let Err(err) = mqtt_client.subscribe_many(subscriptions.filters()).await
                        {
                            let _ = error_sender.send(err.into()).await;
                        }
                    }
                }

                Ok(Event::Incoming(Packet::Publish(msg))) => {
                    let _ = message_sender.send(msg.into()).await;
                }

                Ok(Event::Incoming(Packet::Disconnect))
                | Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                    // The connection has been closed
                    break;
                }

                Err(err) => {
                    let pause = Connection::pause_on_error(&err);
                    let _ = error_sender.send(err.into()).await;
                    if pause {
                        sleep(Duration::from_secs(1)).await;
                    }
                }

                _ => (),
            }
        }

        // No more messages will be forwarded to the client
        let _ = message_sender.close().await;
        let _ = error_sender.close().await;
    }

    /// Whether the next reconnect attempt has to be delayed, so a flaky
    /// or unreachable broker is not hammered in a tight loop.
    fn pause_on_error(err: &ConnectionError) -> bool {
        matches!(
            &err,
            ConnectionError::Io(_)
                | ConnectionError::MqttState(_)
                | ConnectionError::NetworkTimeout
                | ConnectionError::FlushTimeout
        )
    }
}
