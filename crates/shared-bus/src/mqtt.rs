//! # MQTT Publisher
//!
//! Broker-backed [`EventPublisher`]. Each publish opens a fresh connection,
//! waits for the broker to acknowledge the message and disconnects again.
//! The kiosk publishes a handful of messages per hour, so a long-lived
//! connection buys nothing but reconnect bookkeeping.
//!
//! ```text
//! publish() ─→ AsyncClient::publish (queued)
//!           ─→ poll EventLoop ──┬─ ConnAck         → reset backoff
//!                               ├─ PubAck/PubComp  → done
//!                               └─ error           → sleep(backoff), retry
//!           ─→ disconnect
//! ```
//!
//! The whole exchange is bounded by `publish_timeout_secs`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, MqttOptions, Outgoing, Packet, QoS};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::backoff::ReconnectBackoff;
use crate::error::{PublishError, PublishResult};
use crate::events::DisposalEvent;
use crate::publisher::EventPublisher;
use crate::DEFAULT_TOPIC;

/// Budget for the DISCONNECT after a successful publish.
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Broker connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub topic: String,
    /// 0, 1 or 2. Anything else is treated as 1.
    pub qos: u8,
    pub keep_alive_secs: u64,
    pub publish_timeout_secs: u64,
    pub reconnect_min_secs: u64,
    pub reconnect_max_secs: u64,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "notouch-kiosk".to_string(),
            topic: DEFAULT_TOPIC.to_string(),
            qos: 1,
            keep_alive_secs: 5,
            publish_timeout_secs: 10,
            reconnect_min_secs: 1,
            reconnect_max_secs: 60,
            username: None,
            password: None,
        }
    }
}

impl MqttConfig {
    #[must_use]
    pub fn qos(&self) -> QoS {
        match self.qos {
            0 => QoS::AtMostOnce,
            2 => QoS::ExactlyOnce,
            _ => QoS::AtLeastOnce,
        }
    }

    #[must_use]
    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_secs)
    }

    #[must_use]
    pub fn backoff(&self) -> ReconnectBackoff {
        ReconnectBackoff::new(
            Duration::from_secs(self.reconnect_min_secs),
            Duration::from_secs(self.reconnect_max_secs),
        )
    }

    fn options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.client_id, &self.host, self.port);
        options.set_keep_alive(Duration::from_secs(self.keep_alive_secs.max(5)));
        if let (Some(user), Some(pass)) = (&self.username, &self.password) {
            options.set_credentials(user, pass);
        }
        options
    }
}

/// Publishes disposal events to an MQTT broker.
pub struct MqttEventPublisher {
    config: MqttConfig,
    events_published: AtomicU64,
}

impl MqttEventPublisher {
    #[must_use]
    pub fn new(config: MqttConfig) -> Self {
        Self {
            config,
            events_published: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn config(&self) -> &MqttConfig {
        &self.config
    }
}

fn is_delivery_ack(event: &Event, qos: QoS) -> bool {
    match (qos, event) {
        (QoS::AtMostOnce, Event::Outgoing(Outgoing::Publish(_))) => true,
        (QoS::AtLeastOnce, Event::Incoming(Packet::PubAck(_))) => true,
        (QoS::ExactlyOnce, Event::Incoming(Packet::PubComp(_))) => true,
        _ => false,
    }
}

#[async_trait]
impl EventPublisher for MqttEventPublisher {
    async fn publish(&self, event: &DisposalEvent) -> PublishResult<()> {
        let payload = event.to_payload()?;
        let qos = self.config.qos();
        let budget = self.config.publish_timeout();

        let (client, mut eventloop) = AsyncClient::new(self.config.options(), 10);
        client
            .publish(&self.config.topic, qos, false, payload)
            .await
            .map_err(|e| PublishError::Client(e.to_string()))?;

        let mut backoff = self.config.backoff();
        let mut last_error = String::from("no response from broker");

        let delivery = tokio::time::timeout(budget, async {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        debug!(host = %self.config.host, "Connected to broker");
                        backoff.reset();
                    }
                    Ok(ev) if is_delivery_ack(&ev, qos) => return,
                    Ok(_) => {}
                    Err(e) => {
                        let delay = backoff.next_delay();
                        warn!(error = %e, retry_in = ?delay, "Broker connection failed");
                        last_error = e.to_string();
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        })
        .await;

        if delivery.is_err() {
            return Err(PublishError::Timeout {
                after: budget,
                last_error,
            });
        }

        // Drive the DISCONNECT out; failures here do not affect delivery.
        let _ = tokio::time::timeout(DISCONNECT_TIMEOUT, async {
            if client.disconnect().await.is_ok() {
                while let Ok(ev) = eventloop.poll().await {
                    if matches!(ev, Event::Outgoing(Outgoing::Disconnect)) {
                        break;
                    }
                }
            }
        })
        .await;

        self.events_published.fetch_add(1, Ordering::Relaxed);
        info!(
            topic = %self.config.topic,
            records = event.records.len(),
            "Disposal event delivered"
        );
        Ok(())
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
