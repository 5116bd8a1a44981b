use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An isolated configuration namespace: its own active endpoint, mode and events.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Local,
    Sandbox,
    Staging,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEnvironment(pub String);

impl Environment {
    pub const ALL: [Environment; 3] = [
        Environment::Local,
        Environment::Sandbox,
        Environment::Staging,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Sandbox => "sandbox",
            Environment::Staging => "staging",
        }
    }

    /// Parse an exact, lowercase environment name.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|env| env.as_str() == value)
    }
}

impl FromStr for Environment {
    type Err = InvalidEnvironment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| InvalidEnvironment(s.to_string()))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_known_names_when_parsed_should_round_trip() {
        for env in Environment::ALL {
            assert_eq!(Environment::parse(env.as_str()), Some(env));
        }
    }

    #[test]
    fn given_unknown_or_mixed_case_name_when_parsed_should_reject() {
        assert_eq!(Environment::parse("production"), None);
        assert_eq!(Environment::parse("Sandbox"), None);
        assert_eq!(Environment::parse(""), None);
        assert_eq!(
            "prod".parse::<Environment>(),
            Err(InvalidEnvironment("prod".to_string()))
        );
    }
}
