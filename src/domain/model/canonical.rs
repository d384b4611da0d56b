use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::DomainError;

/// Vendor-neutral capability tier exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalModel {
    Base,
    Large,
}

/// Legacy vendor model-name prefixes, checked in order.
///
/// `gpt-4o-mini` must be matched before the broader `gpt-4` family.
const LEGACY_PREFIXES: &[(&str, CanonicalModel)] = &[
    ("gpt-3.5-turbo", CanonicalModel::Base),
    ("gpt-35-turbo", CanonicalModel::Base),
    ("gpt-4o-mini", CanonicalModel::Base),
    ("gpt-4", CanonicalModel::Large),
];

impl CanonicalModel {
    pub const ALL: [CanonicalModel; 2] = [CanonicalModel::Base, CanonicalModel::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Large => "large",
        }
    }
}

/// Parse a canonical name or a legacy vendor model name
pub fn parse_model(raw: &str) -> Result<CanonicalModel, DomainError> {
    let normalized = raw.trim().to_ascii_lowercase();

    match normalized.as_str() {
        "base" => return Ok(CanonicalModel::Base),
        "large" => return Ok(CanonicalModel::Large),
        _ => {}
    }

    LEGACY_PREFIXES
        .iter()
        .find(|(prefix, _)| normalized.starts_with(prefix))
        .map(|(_, model)| *model)
        .ok_or_else(|| DomainError::bad_request(format!("Unknown model '{}'", raw)))
}

impl FromStr for CanonicalModel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_model(s)
    }
}

impl fmt::Display for CanonicalModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CanonicalModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CanonicalModel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_model(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_names() {
        assert_eq!(parse_model("base").unwrap(), CanonicalModel::Base);
        assert_eq!(parse_model("large").unwrap(), CanonicalModel::Large);
        assert_eq!(parse_model("  LARGE ").unwrap(), CanonicalModel::Large);
    }

    #[test]
    fn test_parse_legacy_prefixes() {
        assert_eq!(parse_model("gpt-3.5-turbo").unwrap(), CanonicalModel::Base);
        assert_eq!(parse_model("gpt-3.5-turbo-0125").unwrap(), CanonicalModel::Base);
        assert_eq!(parse_model("gpt-35-turbo").unwrap(), CanonicalModel::Base);
        assert_eq!(parse_model("gpt-4o-mini").unwrap(), CanonicalModel::Base);
        assert_eq!(parse_model("gpt-4").unwrap(), CanonicalModel::Large);
        assert_eq!(parse_model("gpt-4o").unwrap(), CanonicalModel::Large);
        assert_eq!(parse_model("gpt-4-turbo-preview").unwrap(), CanonicalModel::Large);
    }

    #[test]
    fn test_parse_unknown_is_error() {
        for raw in ["", "medium", "claude-3-opus", "gpt-5", "gpt"] {
            let err = parse_model(raw).unwrap_err();
            assert!(matches!(err, DomainError::BadRequest { .. }), "{raw}");
        }
    }

    #[test]
    fn test_parse_is_idempotent() {
        let inputs = [
            "base",
            "large",
            "Base",
            "gpt-3.5-turbo-16k",
            "gpt-35-turbo",
            "gpt-4o-mini-2024-07-18",
            "gpt-4-32k",
        ];

        for raw in inputs {
            let parsed = parse_model(raw).unwrap();
            let reparsed = parse_model(&parsed.to_string()).unwrap();
            assert_eq!(parsed, reparsed, "{raw}");
        }
    }

    #[test]
    fn test_serde_uses_canonical_name() {
        let json = serde_json::to_string(&CanonicalModel::Large).unwrap();
        assert_eq!(json, "\"large\"");

        let parsed: CanonicalModel = serde_json::from_str("\"gpt-4\"").unwrap();
        assert_eq!(parsed, CanonicalModel::Large);

        assert!(serde_json::from_str::<CanonicalModel>("\"nope\"").is_err());
    }
}
