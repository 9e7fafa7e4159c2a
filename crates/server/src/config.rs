use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use readaloud_core::FetchConfig;

/// Serve the readaloud extraction API over HTTP
#[derive(Parser, Debug, Clone)]
#[command(name = "readaloud-server")]
#[command(version)]
#[command(about = "Serve the readaloud extraction API over HTTP", long_about = None)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "READALOUD_ADDR", default_value = "127.0.0.1:3000", value_name = "ADDR")]
    pub addr: SocketAddr,

    /// Deadline for fetching a page, in seconds
    #[arg(long, env = "READALOUD_FETCH_TIMEOUT", default_value_t = 30, value_name = "SECS")]
    pub fetch_timeout: u64,

    /// Deadline for a whole API request, in seconds
    #[arg(long, env = "READALOUD_REQUEST_TIMEOUT", default_value_t = 60, value_name = "SECS")]
    pub request_timeout: u64,

    /// User-Agent sent with outgoing fetches
    #[arg(long, env = "READALOUD_USER_AGENT", value_name = "UA")]
    pub user_agent: Option<String>,
}

impl ServerConfig {
    pub fn fetch_config(&self) -> FetchConfig {
        let defaults = FetchConfig::default();
        FetchConfig {
            timeout: self.fetch_timeout,
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::try_parse_from(["readaloud-server"]).unwrap();

        assert_eq!(config.addr, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.fetch_timeout, 30);
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.fetch_config().user_agent, FetchConfig::default().user_agent);
    }

    #[test]
    fn test_flags_override() {
        let config = ServerConfig::try_parse_from([
            "readaloud-server",
            "--addr",
            "0.0.0.0:8080",
            "--fetch-timeout",
            "5",
            "--user-agent",
            "test-agent/1.0",
        ])
        .unwrap();

        let fetch = config.fetch_config();
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(fetch.timeout, 5);
        assert_eq!(fetch.user_agent, "test-agent/1.0");
    }

    #[test]
    fn test_rejects_bad_address() {
        assert!(ServerConfig::try_parse_from(["readaloud-server", "--addr", "localhost"]).is_err());
    }
}
