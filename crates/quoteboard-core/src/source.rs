use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Upstream market-data providers the service can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Alphavantage,
    Yahoo,
}

impl ProviderId {
    pub const ALL: [Self; 2] = [Self::Alphavantage, Self::Yahoo];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alphavantage => "alphavantage",
            Self::Yahoo => "yahoo",
        }
    }

    /// Whether requests to this provider must carry an API key.
    pub const fn requires_credential(self) -> bool {
        match self {
            Self::Alphavantage => true,
            Self::Yahoo => false,
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "alphavantage" | "alpha_vantage" | "alpha-vantage" => Ok(Self::Alphavantage),
            "yahoo" => Ok(Self::Yahoo),
            other => Err(ValidationError::InvalidProvider {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_names() {
        assert_eq!(ProviderId::from_str(" Yahoo ").expect("valid"), ProviderId::Yahoo);
        assert_eq!(
            ProviderId::from_str("alpha-vantage").expect("valid"),
            ProviderId::Alphavantage
        );
        assert!(matches!(
            ProviderId::from_str("polygon"),
            Err(ValidationError::InvalidProvider { .. })
        ));
    }
}
