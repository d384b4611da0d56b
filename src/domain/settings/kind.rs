use std::fmt;

use serde::{Deserialize, Serialize};

/// Which backend implementation is active for a plugin instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    DirectApi,
    #[serde(rename = "azure")]
    ManagedDeployment,
    #[serde(rename = "anthropic")]
    SecondVendor,
    #[serde(rename = "managed-gateway")]
    ManagedGateway,
    #[serde(rename = "test")]
    TestDouble,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectApi => "openai",
            Self::ManagedDeployment => "azure",
            Self::SecondVendor => "anthropic",
            Self::ManagedGateway => "managed-gateway",
            Self::TestDouble => "test",
        }
    }

    /// Parse a settings value; unknown names yield `None`
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(Self::DirectApi),
            "azure" => Some(Self::ManagedDeployment),
            "anthropic" => Some(Self::SecondVendor),
            "managed-gateway" => Some(Self::ManagedGateway),
            "test" => Some(Self::TestDouble),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_names() {
        for kind in [
            ProviderKind::DirectApi,
            ProviderKind::ManagedDeployment,
            ProviderKind::SecondVendor,
            ProviderKind::ManagedGateway,
            ProviderKind::TestDouble,
        ] {
            assert_eq!(ProviderKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(ProviderKind::parse("pulze"), None);
        assert_eq!(ProviderKind::parse(""), None);
        assert_eq!(ProviderKind::parse(" OpenAI "), Some(ProviderKind::DirectApi));
    }
}
