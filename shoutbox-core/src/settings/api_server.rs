use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

use std::fmt;
use std::net::IpAddr;

use super::rate_limiting::RateLimitingConfig;
use super::trusted_proxy::TrustedProxy;

/// A user known to the API, looked up by bearer token.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[allow(unused)]
#[readonly::make]
pub struct ApiUser {
    pub user_id: i64,
    pub name: String,
    /// Editors bypass flood control and may manage module settings.
    #[serde(default)]
    pub editor: bool,
}

#[derive(Deserialize, Clone)]
#[allow(unused)]
#[readonly::make]
pub struct ApiServer {
    pub bind_address: String,
    #[serde(deserialize_with = "deserialize_bytes")]
    pub max_body_size: usize,
    /// Bearer token to user mapping.
    #[serde(default)]
    pub users: HashMap<String, ApiUser>,
    #[serde(default)]
    pub rate_limiting: RateLimitingConfig,
    /// Peers whose `X-Forwarded-For` and `X-Real-IP` headers are honored.
    #[serde(default)]
    pub trusted_proxies: Vec<TrustedProxy>,
}

impl fmt::Debug for ApiServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let users: Vec<&ApiUser> = self.users.values().collect();
        f.debug_struct("ApiServer")
            .field("bind_address", &self.bind_address)
            .field("max_body_size", &self.max_body_size)
            .field("users", &users)
            .field("rate_limiting", &self.rate_limiting)
            .field("trusted_proxies", &self.trusted_proxies)
            .finish()
    }
}

impl Default for ApiServer {
    fn default() -> Self {
        ApiServer {
            bind_address: "0.0.0.0:21380".to_string(),
            max_body_size: 64 * 1024,
            users: HashMap::new(),
            rate_limiting: RateLimitingConfig::default(),
            trusted_proxies: Vec::new(),
        }
    }
}

impl ApiServer {
    pub fn user_for_token(&self, token: &str) -> Option<&ApiUser> {
        self.users.get(token)
    }

    pub fn is_trusted_proxy(&self, peer: IpAddr) -> bool {
        self.trusted_proxies
            .iter()
            .any(|proxy| proxy.contains(peer))
    }
}

fn deserialize_bytes<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_bytes(&s).map_err(serde::de::Error::custom)
}

fn parse_bytes(s: &str) -> Result<usize, std::num::ParseIntError> {
    let s = s.trim().to_uppercase();

    let (num_part, suffix) = s.split_at(s.len().saturating_sub(1));
    let (num_part, multiplier) = match suffix {
        "G" => (num_part, 1_024 * 1_024 * 1_024),
        "M" => (num_part, 1_024 * 1_024),
        "K" => (num_part, 1_024),
        _ => (s.as_str(), 1),
    };

    let num: usize = num_part.parse()?;
    Ok(num * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bytes() {
        assert_eq!(parse_bytes("512").unwrap(), 512);
        assert_eq!(parse_bytes("64K").unwrap(), 64 * 1024);
        assert_eq!(parse_bytes(" 2m ").unwrap(), 2 * 1024 * 1024);
        assert_eq!(parse_bytes("1G").unwrap(), 1024 * 1024 * 1024);
        assert!(parse_bytes("lots").is_err());
    }

    #[test]
    fn test_user_lookup() {
        let mut server = ApiServer::default();
        server.users.insert(
            "secret".to_string(),
            ApiUser {
                user_id: 7,
                name: "Editor".to_string(),
                editor: true,
            },
        );

        let user = server.user_for_token("secret").unwrap();
        assert_eq!(user.user_id, 7);
        assert!(user.editor);
        assert!(server.user_for_token("other").is_none());
    }

    #[test]
    fn test_debug_hides_tokens() {
        let mut server = ApiServer::default();
        server.users.insert(
            "super-secret-token".to_string(),
            ApiUser {
                user_id: 7,
                name: "Editor".to_string(),
                editor: true,
            },
        );

        let output = format!("{server:#?}");
        assert!(output.contains("Editor"));
        assert!(!output.contains("super-secret-token"));
    }

    #[test]
    fn test_trusted_proxies() {
        let mut server = ApiServer::default();
        assert!(!server.is_trusted_proxy("10.0.0.1".parse().unwrap()));

        server.trusted_proxies = vec!["10.0.0.0/8".parse().unwrap()];
        assert!(server.is_trusted_proxy("10.0.0.1".parse().unwrap()));
        assert!(!server.is_trusted_proxy("192.0.2.1".parse().unwrap()));
    }
}
