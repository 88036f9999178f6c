use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    #[error("TLS certificate error: {0}")]
    Certificate(#[from] rcgen::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Failures caused by the broker or the network rather than by this
    /// process. The poll loop logs these and carries on.
    pub fn is_ignorable(&self) -> bool {
        match self {
            Error::Mqtt(_) => true,
            Error::Io(_) => true,

            Error::Certificate(_) => false,
            Error::Config(_) => false,
            Error::Json(_) => false,
            Error::Metrics(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broker_errors_are_ignorable() {
        let err = Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        assert!(err.is_ignorable());
    }

    #[test]
    fn test_programming_errors_are_not_ignorable() {
        assert!(!Error::Config("missing guid".to_string()).is_ignorable());

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!Error::Json(json_err).is_ignorable());
    }
}
