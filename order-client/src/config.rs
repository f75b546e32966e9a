//! Client configuration

use std::time::Duration;

/// Client configuration for connecting to the order server
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:3000")
    pub base_url: String,

    /// WebSocket endpoint, derived from `base_url` unless set
    pub ws_url: Option<String>,

    /// JWT token for authentication (guests have none)
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// First reconnect delay of the live subscription
    pub reconnect_delay: Duration,

    /// Upper bound for the reconnect backoff
    pub max_reconnect_delay: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ws_url: None,
            token: None,
            timeout: 30,
            reconnect_delay: Duration::from_millis(500), // 首次重连 500ms
            max_reconnect_delay: Duration::from_secs(30), // 最长 30 秒退避
        }
    }

    /// Set the JWT token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set an explicit WebSocket URL
    pub fn with_ws_url(mut self, url: impl Into<String>) -> Self {
        self.ws_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the reconnect backoff bounds
    pub fn with_reconnect(mut self, initial: Duration, max: Duration) -> Self {
        self.reconnect_delay = initial;
        self.max_reconnect_delay = max.max(initial);
        self
    }

    /// WebSocket URL including the token query parameter
    ///
    /// `http://host` becomes `ws://host/ws`, `https://` becomes `wss://`.
    pub fn live_url(&self) -> String {
        let base = match &self.ws_url {
            Some(url) => url.clone(),
            None => {
                let base = self.base_url.trim_end_matches('/');
                let base = if let Some(rest) = base.strip_prefix("https://") {
                    format!("wss://{}", rest)
                } else if let Some(rest) = base.strip_prefix("http://") {
                    format!("ws://{}", rest)
                } else {
                    base.to_string()
                };
                format!("{}/ws", base)
            }
        };

        match &self.token {
            Some(token) => format!("{}?token={}", base, token),
            None => base,
        }
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> crate::ClientResult<crate::HttpClient> {
        crate::HttpClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_url_is_derived_from_base_url() {
        assert_eq!(
            ClientConfig::new("http://pos.local:3000/").live_url(),
            "ws://pos.local:3000/ws"
        );
        assert_eq!(
            ClientConfig::new("https://orders.example.com")
                .with_token("abc")
                .live_url(),
            "wss://orders.example.com/ws?token=abc"
        );
        assert_eq!(
            ClientConfig::default().with_ws_url("ws://other/ws").live_url(),
            "ws://other/ws"
        );
    }

    #[test]
    fn test_backoff_cap_never_below_initial() {
        let config = ClientConfig::default()
            .with_reconnect(Duration::from_secs(5), Duration::from_secs(1));
        assert_eq!(config.max_reconnect_delay, Duration::from_secs(5));
    }
}
