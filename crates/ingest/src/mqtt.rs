//! MQTT subscriber loop.
//!
//! Subscribes to `<namespace>/+/telemetry` and hands every publish packet
//! to the [`IngestPipeline`] on its own task. At most
//! `max_in_flight` messages are processed at once; when all permits are
//! taken the loop stops polling the broker until one frees up.
//!
//! A broken connection is logged and retried after `reconnect_delay`,
//! forever, until the cancellation token fires.

use std::sync::Arc;
use std::time::Duration;

use guardian_core::topics::telemetry_filter;
use rumqttc::{AsyncClient, ClientError, ConnectionError, Event, MqttOptions, Packet, QoS};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info_span, Instrument, Span};

use crate::config::IngestConfig;
use crate::pipeline::IngestPipeline;
use crate::ports::IngestStores;

/// Keep-alive interval negotiated with the broker.
const KEEP_ALIVE: Duration = Duration::from_secs(30);

/// Capacity of the client request channel.
const CLIENT_CHANNEL_CAPACITY: usize = 100;

/// How long shutdown waits for in-flight messages.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a broker session ended.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    #[error("Failed to subscribe: {0}")]
    Subscribe(#[from] ClientError),

    #[error("MQTT event loop error: {0}")]
    Connection(#[from] ConnectionError),
}

/// Run the subscriber until `cancel` fires.
///
/// In-flight messages are given [`DRAIN_TIMEOUT`] to finish before this
/// returns.
pub async fn run_subscriber<S>(
    config: IngestConfig,
    pipeline: Arc<IngestPipeline<S>>,
    cancel: CancellationToken,
) where
    S: IngestStores + 'static,
{
    tracing::info!(
        broker = %config.broker_host,
        port = config.broker_port,
        filter = %telemetry_filter(&config.topic_namespace),
        max_in_flight = config.max_in_flight,
        "Starting MQTT subscriber",
    );

    let permits = Arc::new(Semaphore::new(config.max_in_flight));
    let tracker = TaskTracker::new();
    let mut attempt: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            break;
        }

        match run_session(&config, &pipeline, &permits, &tracker, &cancel).await {
            Ok(()) => break,
            Err(e) => {
                attempt += 1;
                tracing::error!(
                    attempt,
                    error = %e,
                    retry_in_secs = config.reconnect_delay.as_secs(),
                    "MQTT connection lost",
                );
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(config.reconnect_delay) => {}
                }
            }
        }
    }

    tracker.close();
    if tokio::time::timeout(DRAIN_TIMEOUT, tracker.wait())
        .await
        .is_err()
    {
        tracing::warn!(
            in_flight = tracker.len(),
            "MQTT subscriber stopped with messages still in flight",
        );
    }
    tracing::info!("MQTT subscriber stopped");
}

/// Run one broker session. Returns `Ok` only on cancellation.
async fn run_session<S>(
    config: &IngestConfig,
    pipeline: &Arc<IngestPipeline<S>>,
    permits: &Arc<Semaphore>,
    tracker: &TaskTracker,
    cancel: &CancellationToken,
) -> Result<(), MqttError>
where
    S: IngestStores + 'static,
{
    let mut options = MqttOptions::new(&config.client_id, &config.broker_host, config.broker_port);
    options.set_keep_alive(KEEP_ALIVE);
    options.set_clean_session(true);

    let (client, mut eventloop) = AsyncClient::new(options, CLIENT_CHANNEL_CAPACITY);

    let filter = telemetry_filter(&config.topic_namespace);
    client.subscribe(&filter, QoS::AtLeastOnce).await?;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("Shutdown signal received, disconnecting from broker");
                let _ = client.disconnect().await;
                return Ok(());
            }
            event = eventloop.poll() => {
                match event? {
                    Event::Incoming(Packet::Publish(publish)) => {
                        let permit = tokio::select! {
                            _ = cancel.cancelled() => return Ok(()),
                            permit = Arc::clone(permits).acquire_owned() => match permit {
                                Ok(permit) => permit,
                                Err(_) => return Ok(()),
                            },
                        };

                        let pipeline = Arc::clone(pipeline);
                        let span = info_span!(
                            parent: Span::none(),
                            "mqtt_message",
                            topic = %publish.topic,
                            payload_size = publish.payload.len(),
                            device_id = tracing::field::Empty,
                        );
                        tracker.spawn(
                            async move {
                                let _ = pipeline
                                    .handle_message(&publish.topic, &publish.payload)
                                    .await;
                                drop(permit);
                            }
                            .instrument(span),
                        );
                    }
                    Event::Incoming(Packet::ConnAck(_)) => {
                        tracing::info!(broker = %config.broker_host, "Connected to MQTT broker");
                    }
                    Event::Incoming(Packet::SubAck(_)) => {
                        tracing::info!(filter = %filter, "Subscribed to telemetry topics");
                    }
                    _ => {}
                }
            }
        }
    }
}
