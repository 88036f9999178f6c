//! Runtime configuration.
//!
//! [`Cli`] is parsed once in `main` and turned into a [`ServerConfig`] and an
//! optional [`PollerConfig`]. Both are plain structs handed to the server and
//! poller constructors; nothing reads the environment after startup.

use crate::clock::DEFAULT_OFFSET_SUFFIX;
use crate::errors::{Error, Result};
use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_HTTP_PORT: u16 = 50007;
pub const DEFAULT_MQTT_PORT: u16 = 1883;
pub const DEFAULT_TOPIC_PREFIX: &str = "enno/out/json";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Parser)]
#[command(
    name = "timeserver",
    about = "Clock sync endpoints and status poller for the WMR500 weather station",
    version
)]
pub struct Cli {
    /// IP address the HTTP server binds to.
    #[arg(long, default_value = "0.0.0.0", env = "WMR500_BIND")]
    pub bind: IpAddr,

    #[arg(long, default_value_t = DEFAULT_HTTP_PORT, env = "WMR500_PORT")]
    pub port: u16,

    /// Serve HTTPS with a self-signed certificate generated at startup.
    #[arg(long, env = "WMR500_TLS")]
    pub tls: bool,

    /// Subject alternative names for the generated certificate.
    #[arg(long = "tls-name", default_value = "localhost", env = "WMR500_TLS_NAME", value_delimiter = ',')]
    pub tls_names: Vec<String>,

    /// Literal appended to the ISO time, e.g. `+0` or `+2`.
    #[arg(long, default_value = DEFAULT_OFFSET_SUFFIX, env = "WMR500_OFFSET_SUFFIX", allow_hyphen_values = true)]
    pub offset_suffix: String,

    /// Log every incoming request at debug level.
    #[arg(long, env = "WMR500_LOG_REQUESTS")]
    pub log_requests: bool,

    /// MQTT broker host. The status poller only runs when this is set.
    #[arg(long, env = "MQTT_BROKER")]
    pub mqtt_host: Option<String>,

    #[arg(long, default_value_t = DEFAULT_MQTT_PORT, env = "MQTT_PORT")]
    pub mqtt_port: u16,

    #[arg(long, env = "MQTT_USERNAME")]
    pub mqtt_username: Option<String>,

    #[arg(long, env = "MQTT_PASSWORD", hide_env_values = true)]
    pub mqtt_password: Option<String>,

    /// Gateway GUID used in the poll topic and payload.
    #[arg(long, env = "WMR500_GUID")]
    pub device_guid: Option<String>,

    #[arg(long, default_value = DEFAULT_TOPIC_PREFIX, env = "MQTT_TOPIC_PREFIX")]
    pub topic_prefix: String,

    /// Seconds between two status polls.
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_SECS, env = "POLL_INTERVAL_SECS")]
    pub poll_interval: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TlsConfig {
    pub subject_alt_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub tls: Option<TlsConfig>,
    pub offset_suffix: String,
    pub log_requests: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_HTTP_PORT),
            tls: None,
            offset_suffix: DEFAULT_OFFSET_SUFFIX.to_string(),
            log_requests: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Clone, PartialEq)]
pub struct PollerConfig {
    pub broker_host: String,
    pub broker_port: u16,
    pub credentials: Option<Credentials>,
    pub client_id: String,
    pub device_guid: String,
    pub topic_prefix: String,
    pub interval: Duration,
}

impl PollerConfig {
    pub fn new(broker_host: impl Into<String>, device_guid: impl Into<String>) -> Self {
        Self {
            broker_host: broker_host.into(),
            broker_port: DEFAULT_MQTT_PORT,
            credentials: None,
            client_id: format!("wmr500-{}", uuid::Uuid::new_v4()),
            device_guid: device_guid.into(),
            topic_prefix: DEFAULT_TOPIC_PREFIX.to_string(),
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }

    pub fn topic(&self) -> String {
        crate::poller::status_topic(&self.topic_prefix, &self.device_guid)
    }
}

// Hand-written so the password never reaches the logs.
impl std::fmt::Debug for PollerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollerConfig")
            .field("broker_host", &self.broker_host)
            .field("broker_port", &self.broker_port)
            .field(
                "username",
                &self.credentials.as_ref().map(|c| c.username.as_str()),
            )
            .field("client_id", &self.client_id)
            .field("device_guid", &self.device_guid)
            .field("topic_prefix", &self.topic_prefix)
            .field("interval", &self.interval)
            .finish()
    }
}

impl Cli {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: SocketAddr::new(self.bind, self.port),
            tls: self.tls.then(|| TlsConfig {
                subject_alt_names: self.tls_names.clone(),
            }),
            offset_suffix: self.offset_suffix.clone(),
            log_requests: self.log_requests,
        }
    }

    /// Returns `None` when no broker is configured.
    ///
    /// # Errors
    ///
    /// A broker without a device GUID, a username without a password (or the
    /// reverse) and a zero poll interval are rejected.
    pub fn poller_config(&self) -> Result<Option<PollerConfig>> {
        let Some(host) = &self.mqtt_host else {
            return Ok(None);
        };

        let guid = self
            .device_guid
            .as_deref()
            .filter(|g| !g.trim().is_empty())
            .ok_or_else(|| Error::Config("--device-guid is required with --mqtt-host".to_string()))?;

        if self.poll_interval == 0 {
            return Err(Error::Config("--poll-interval must be at least 1 second".to_string()));
        }

        let credentials = match (&self.mqtt_username, &self.mqtt_password) {
            (Some(username), Some(password)) => Some(Credentials {
                username: username.clone(),
                password: password.clone(),
            }),
            (None, None) => None,
            _ => {
                return Err(Error::Config(
                    "--mqtt-username and --mqtt-password must be given together".to_string(),
                ))
            }
        };

        let mut config = PollerConfig::new(host.clone(), guid);
        config.broker_port = self.mqtt_port;
        config.credentials = credentials;
        config.topic_prefix = self.topic_prefix.clone();
        config.interval = Duration::from_secs(self.poll_interval);
        Ok(Some(config))
    }
}
