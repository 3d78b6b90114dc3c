//! Small value types shared across resources.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Idempotency token for create-style operations.
///
/// Repeating a call with the same token and arguments is safe: the provider
/// returns the original result instead of creating a duplicate resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientToken(String);

impl ClientToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Fresh random token. Keep it and pass it again when retrying.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Disk storage class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageType {
    #[serde(rename = "std1")]
    Std1,
    #[serde(rename = "hp1")]
    Hp1,
    #[serde(rename = "cloud_hp1")]
    CloudHp1,
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "sata")]
    Sata,
    #[serde(rename = "ssd")]
    Ssd,
    #[serde(rename = "hdd")]
    Hdd,
    #[serde(rename = "HDD_Throughput")]
    HddThroughput,
    #[serde(rename = "enhanced_ssd_pl1")]
    EnhancedSsdPl1,
}

/// Instance family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstanceType {
    N1,
    N2,
    N3,
    N4,
    N5,
    C1,
    C2,
    S1,
    G1,
    F1,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagModel {
    pub tag_key: String,
    #[serde(default)]
    pub tag_value: String,
}

impl TagModel {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            tag_key: key.to_string(),
            tag_value: value.to_string(),
        }
    }
}

/// `"on"` / `"off"` switch used by snapshot retention flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Switch {
    On,
    Off,
}
