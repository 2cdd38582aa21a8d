//! Health report types for the liveness endpoint.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// The service is reported healthy while at least this fraction of its
/// components pass their checks.
const HEALTHY_SCORE_THRESHOLD: f64 = 0.8;

/// Health of one checked component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component identifier, e.g. "database" or "status_sweep".
    pub name: String,
    pub is_healthy: bool,
    /// Failure description; absent while healthy.
    pub message: Option<String>,
}

impl ComponentHealth {
    pub fn healthy(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: true, message: None }
    }

    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: false, message: Some(message.into()) }
    }
}

/// Aggregated health report.
///
/// # Example
/// ```no_run
/// use convene_api::utils::health::{ComponentHealth, HealthStatus};
///
/// let status = HealthStatus::from_components(vec![
///     ComponentHealth::healthy("database"),
///     ComponentHealth::unhealthy("status_sweep", "task exited"),
/// ]);
///
/// assert_eq!(status.score, 0.5);
/// assert!(!status.is_healthy);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub is_healthy: bool,
    /// Fraction of components that passed, 0.0 to 1.0.
    pub score: f64,
    pub message: Option<String>,
    pub components: Vec<ComponentHealth>,
    /// Unix timestamp of the check.
    pub timestamp: i64,
}

impl HealthStatus {
    /// Aggregate component results into one report.
    ///
    /// An empty component list counts as fully healthy; that only happens
    /// before any checks are wired up.
    pub fn from_components(components: Vec<ComponentHealth>) -> Self {
        let score = if components.is_empty() {
            1.0
        } else {
            let passing = components.iter().filter(|c| c.is_healthy).count();
            passing as f64 / components.len() as f64
        };

        Self {
            is_healthy: score >= HEALTHY_SCORE_THRESHOLD,
            score,
            message: None,
            components,
            timestamp: unix_timestamp(),
        }
    }
}

fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|dur| dur.as_secs() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_components_counts_as_healthy() {
        let status = HealthStatus::from_components(Vec::new());
        assert!(status.is_healthy);
        assert_eq!(status.score, 1.0);
    }

    #[test]
    fn all_passing_scores_one() {
        let status = HealthStatus::from_components(vec![
            ComponentHealth::healthy("database"),
            ComponentHealth::healthy("status_sweep"),
        ]);
        assert_eq!(status.score, 1.0);
        assert!(status.is_healthy);
    }

    #[test]
    fn one_failing_component_drops_below_threshold() {
        let status = HealthStatus::from_components(vec![
            ComponentHealth::healthy("a"),
            ComponentHealth::healthy("b"),
            ComponentHealth::healthy("c"),
            ComponentHealth::unhealthy("d", "task exited"),
        ]);
        assert_eq!(status.score, 0.75);
        assert!(!status.is_healthy);
    }

    #[test]
    fn unhealthy_component_carries_its_message() {
        let component = ComponentHealth::unhealthy("database", "connection refused");
        assert!(!component.is_healthy);
        assert_eq!(component.message.as_deref(), Some("connection refused"));

        let component = ComponentHealth::healthy("database");
        assert!(component.is_healthy);
        assert!(component.message.is_none());
    }
}
