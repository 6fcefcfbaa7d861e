use std::fmt;
use std::net::IpAddr;

use serde::Serialize;

/// Coarse exposure rating for an open port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        };
        f.write_str(label)
    }
}

/// An open port on a live host, with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortFinding {
    pub port: u16,
    pub service_label: String,
    pub banner_text: Option<String>,
    pub risk_tier: RiskTier,
}

/// A username/password pair tried by the weak-credential probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.username, self.password)
    }
}

/// A login that was accepted with a default credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialFinding {
    pub host: IpAddr,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl CredentialFinding {
    pub fn new(host: IpAddr, port: u16, credential: &Credential) -> Self {
        Self {
            host,
            port,
            username: credential.username.clone(),
            password: credential.password.clone(),
        }
    }
}
