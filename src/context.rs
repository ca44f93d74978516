//! Execution context the process is running in.
//!
//! The context is resolved once from configuration at startup and never
//! changes afterwards. It decides pool sizing, whether the pool is cached
//! across development reloads, and whether the platform suspension hook
//! is registered.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Where this process is running.
///
/// This is a closed set: every decision that depends on the context is an
/// exhaustive `match`, so adding a variant forces each of them to be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionContext {
    /// Local dev server; initialization may re-run on every reload.
    Development,
    /// Automated test run; each worker owns its pool and tears it down itself.
    Test,
    /// Deployed instance that the host may suspend between bursts of traffic.
    Production,
}

impl ExecutionContext {
    /// Lowercase name, as accepted in `APP_ENV`.
    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionContext::Development => "development",
            ExecutionContext::Test => "test",
            ExecutionContext::Production => "production",
        }
    }

    /// Whether the pool is kept in the process-wide cache between reloads.
    pub fn caches_pool(self) -> bool {
        match self {
            ExecutionContext::Development => true,
            ExecutionContext::Test | ExecutionContext::Production => false,
        }
    }

    /// Whether the platform suspension hook must be registered for the pool.
    pub fn attaches_suspension_hook(self) -> bool {
        match self {
            ExecutionContext::Production => true,
            ExecutionContext::Development | ExecutionContext::Test => false,
        }
    }
}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a context name is not one of the supported values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized execution context `{0}` (expected development, test or production)")]
pub struct UnknownContext(pub String);

impl FromStr for ExecutionContext {
    type Err = UnknownContext;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(ExecutionContext::Development),
            "test" => Ok(ExecutionContext::Test),
            "production" => Ok(ExecutionContext::Production),
            _ => Err(UnknownContext(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_contexts_case_insensitively() {
        assert_eq!(
            "development".parse::<ExecutionContext>(),
            Ok(ExecutionContext::Development)
        );
        assert_eq!(" Test ".parse::<ExecutionContext>(), Ok(ExecutionContext::Test));
        assert_eq!(
            "PRODUCTION".parse::<ExecutionContext>(),
            Ok(ExecutionContext::Production)
        );
    }

    #[test]
    fn rejects_unknown_context() {
        let err = "staging".parse::<ExecutionContext>().unwrap_err();
        assert_eq!(err, UnknownContext("staging".to_string()));
        assert!("".parse::<ExecutionContext>().is_err());
    }

    #[test]
    fn only_development_caches_and_only_production_attaches() {
        assert!(ExecutionContext::Development.caches_pool());
        assert!(!ExecutionContext::Test.caches_pool());
        assert!(!ExecutionContext::Production.caches_pool());

        assert!(ExecutionContext::Production.attaches_suspension_hook());
        assert!(!ExecutionContext::Development.attaches_suspension_hook());
        assert!(!ExecutionContext::Test.attaches_suspension_hook());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for ctx in [
            ExecutionContext::Development,
            ExecutionContext::Test,
            ExecutionContext::Production,
        ] {
            assert_eq!(ctx.to_string().parse::<ExecutionContext>(), Ok(ctx));
        }
    }
}
