//! Periodic `getChannel1Status` publisher.
//!
//! Every tick builds a fresh [`StatusPoll`], hands it to the MQTT client
//! without waiting for the broker, then sleeps for whatever is left of the
//! interval. A poll that cannot be queued is logged and dropped.

use crate::config::PollerConfig;
use crate::errors::Result;
use crate::metrics::{POLL_ATTEMPTS_TOTAL, POLL_FAILURES_TOTAL, POLL_TICK_SECONDS};
use crate::model::StatusPoll;
use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

// One poll in flight at most; a full queue means the broker is not keeping up.
const REQUEST_CAPACITY: usize = 1;
const KEEP_ALIVE: Duration = Duration::from_secs(30);
const EVENT_LOOP_PAUSE: Duration = Duration::from_secs(1);

pub fn status_topic(prefix: &str, guid: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), guid)
}

pub fn mqtt_options(config: &PollerConfig) -> MqttOptions {
    let mut mqtt_options = MqttOptions::new(
        config.client_id.clone(),
        config.broker_host.clone(),
        config.broker_port,
    );
    mqtt_options.set_keep_alive(KEEP_ALIVE);
    mqtt_options.set_clean_session(true);
    if let Some(credentials) = &config.credentials {
        mqtt_options.set_credentials(credentials.username.clone(), credentials.password.clone());
    }
    mqtt_options
}

/// Time left to sleep before the next tick, or `None` when the tick overran.
pub fn next_delay(interval: Duration, elapsed: Duration) -> Option<Duration> {
    interval.checked_sub(elapsed).filter(|d| !d.is_zero())
}

/// Queues one status poll without waiting for the broker.
pub fn publish_status(client: &AsyncClient, topic: &str, poll: &StatusPoll) -> Result<()> {
    let payload = serde_json::to_vec(poll)?;
    client.try_publish(topic, QoS::AtMostOnce, false, payload)?;
    Ok(())
}

pub async fn run_poller(config: PollerConfig) {
    info!(
        "Connecting status poller to MQTT broker at {}:{}",
        config.broker_host, config.broker_port
    );

    let (client, eventloop) = AsyncClient::new(mqtt_options(&config), REQUEST_CAPACITY);
    tokio::spawn(drive_event_loop(eventloop));

    poll_loop(client, config).await;
}

/// Keeps the connection alive. rumqttc reconnects on the next poll after an
/// error, so failures are only logged.
async fn drive_event_loop(mut eventloop: EventLoop) {
    loop {
        match eventloop.poll().await {
            Ok(event) => debug!(?event, "MQTT event"),
            Err(e) => {
                warn!("MQTT connection error: {}", e);
                tokio::time::sleep(EVENT_LOOP_PAUSE).await;
            }
        }
    }
}

pub async fn poll_loop(client: AsyncClient, config: PollerConfig) {
    let topic = config.topic();
    info!(
        "Publishing {} to {} every {:?}",
        crate::model::STATUS_POLL_COMMAND,
        topic,
        config.interval
    );

    loop {
        let tick_start = Instant::now();

        poll_once(&client, &topic, &config.device_guid);

        let elapsed = tick_start.elapsed();
        POLL_TICK_SECONDS.observe(elapsed.as_secs_f64());

        match next_delay(config.interval, elapsed) {
            Some(delay) => tokio::time::sleep(delay).await,
            None => {
                warn!(
                    "Status poll took {:?}, interval is {:?}; starting next tick now",
                    elapsed, config.interval
                );
                tokio::task::yield_now().await;
            }
        }
    }
}

fn poll_once(client: &AsyncClient, topic: &str, guid: &str) {
    POLL_ATTEMPTS_TOTAL.inc();

    let poll = StatusPoll::for_device(guid);
    match publish_status(client, topic, &poll) {
        Ok(()) => debug!(topic, "Status poll queued"),
        Err(e) if e.is_ignorable() => {
            POLL_FAILURES_TOTAL.inc();
            warn!(topic, "Status poll dropped: {}", e);
        }
        Err(e) => {
            POLL_FAILURES_TOTAL.inc();
            error!(topic, "Status poll failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    fn unreachable_config() -> PollerConfig {
        let mut config = PollerConfig::new("127.0.0.1", "test-guid");
        config.broker_port = 1;
        config.interval = Duration::from_millis(20);
        config
    }

    #[test]
    fn test_status_topic() {
        assert_eq!(status_topic("enno/out/json", "abc"), "enno/out/json/abc");
        assert_eq!(status_topic("enno/out/json/", "abc"), "enno/out/json/abc");
    }

    #[test]
    fn test_next_delay_subtracts_elapsed() {
        let delay = next_delay(Duration::from_secs(60), Duration::from_millis(250));
        assert_eq!(delay, Some(Duration::from_millis(59_750)));
    }

    #[test]
    fn test_next_delay_never_negative() {
        assert_eq!(next_delay(Duration::from_secs(1), Duration::from_secs(5)), None);
        assert_eq!(next_delay(Duration::from_secs(1), Duration::from_secs(1)), None);
    }

    #[test]
    fn test_mqtt_options_from_config() {
        let options = mqtt_options(&unreachable_config());

        assert_eq!(options.broker_address(), ("127.0.0.1".to_string(), 1));
        assert_eq!(options.keep_alive(), KEEP_ALIVE);
        assert!(options.clean_session());
    }

    #[test]
    fn test_publish_fails_softly_when_queue_is_full() {
        let config = unreachable_config();
        let (client, _eventloop) = AsyncClient::new(mqtt_options(&config), 1);
        let poll = StatusPoll::for_device(&config.device_guid);

        assert!(publish_status(&client, &config.topic(), &poll).is_ok());

        let err = publish_status(&client, &config.topic(), &poll).unwrap_err();
        assert!(matches!(err, Error::Mqtt(_)));
        assert!(err.is_ignorable());
    }

    #[test]
    fn test_publish_fails_softly_without_event_loop() {
        let config = unreachable_config();
        let (client, eventloop) = AsyncClient::new(mqtt_options(&config), 1);
        drop(eventloop);

        let poll = StatusPoll::for_device(&config.device_guid);
        let err = publish_status(&client, &config.topic(), &poll).unwrap_err();
        assert!(err.is_ignorable());
    }

    #[test]
    fn test_poll_once_does_not_panic_on_failure() {
        let config = unreachable_config();
        let (client, eventloop) = AsyncClient::new(mqtt_options(&config), 1);
        drop(eventloop);

        poll_once(&client, &config.topic(), &config.device_guid);
        poll_once(&client, &config.topic(), &config.device_guid);
    }

    #[test]
    fn test_poller_keeps_running_with_unreachable_broker() {
        tokio_test::block_on(async {
            let outcome = tokio::time::timeout(
                Duration::from_millis(200),
                run_poller(unreachable_config()),
            )
            .await;

            // The loop never returns on its own.
            assert!(outcome.is_err());
        });
    }
}
