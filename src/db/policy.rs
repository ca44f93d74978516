//! Pool sizing per execution context.

use std::time::Duration;

use serde::Serialize;

use crate::context::ExecutionContext;

/// How many physical connections a pool may hold and how long idle ones live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolSizingParams {
    pub max_connections: u32,
    pub idle_timeout_ms: u64,
}

impl PoolSizingParams {
    /// Sizing for a context. Pure and total over [`ExecutionContext`].
    ///
    /// - Production: 10 connections so one instance can serve concurrent requests,
    ///   5s idle timeout so the suspension hook finds little left to drain.
    /// - Development and Test: 5 connections, 1s idle timeout so restarts and
    ///   reloads do not accumulate connections.
    pub const fn for_context(context: ExecutionContext) -> Self {
        match context {
            ExecutionContext::Production => Self {
                max_connections: 10,
                idle_timeout_ms: 5_000,
            },
            ExecutionContext::Development | ExecutionContext::Test => Self {
                max_connections: 5,
                idle_timeout_ms: 1_000,
            },
        }
    }

    pub const fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_sizing() {
        let sizing = PoolSizingParams::for_context(ExecutionContext::Production);
        assert_eq!(
            sizing,
            PoolSizingParams {
                max_connections: 10,
                idle_timeout_ms: 5000,
            }
        );
        assert_eq!(sizing.idle_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn development_and_test_share_sizing() {
        let expected = PoolSizingParams {
            max_connections: 5,
            idle_timeout_ms: 1000,
        };
        assert_eq!(
            PoolSizingParams::for_context(ExecutionContext::Development),
            expected
        );
        assert_eq!(PoolSizingParams::for_context(ExecutionContext::Test), expected);
        assert_eq!(expected.idle_timeout(), Duration::from_secs(1));
    }
}
