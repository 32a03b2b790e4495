//! Policy configuration for the task lifecycle engine.
//!
//! Limits that are business choices rather than storage constraints live
//! here so deployments can tune them without touching domain code. Field
//! length limits are fixed by the persisted schema and stay in the domain.

use serde::Deserialize;

/// Tunable limits consulted by task services.
///
/// Every field has a default, so a partial document deserializes into a
/// complete configuration.
///
/// # Examples
///
/// ```
/// use taskboard::config::TaskPolicyConfig;
///
/// let config = TaskPolicyConfig::default();
/// assert_eq!(config.max_page_size, 100);
/// assert_eq!(config.clamp_page_size(150), 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TaskPolicyConfig {
    /// Furthest a due date may be set into the future, in days.
    pub max_due_horizon_days: u32,
    /// Page size used when a list request does not name one.
    pub default_page_size: u32,
    /// Largest page size served; larger requests are clamped to it.
    pub max_page_size: u32,
    /// Number of recent tasks shown on the admin dashboard.
    pub dashboard_recent_limit: u32,
    /// Number of upcoming tasks shown on a regular user's dashboard.
    pub dashboard_upcoming_limit: u32,
    /// Number of recently completed tasks shown on a regular user's dashboard.
    pub dashboard_completed_limit: u32,
}

impl Default for TaskPolicyConfig {
    fn default() -> Self {
        Self {
            max_due_horizon_days: 365 * 2,
            default_page_size: 20,
            max_page_size: 100,
            dashboard_recent_limit: 5,
            dashboard_upcoming_limit: 5,
            dashboard_completed_limit: 3,
        }
    }
}

impl TaskPolicyConfig {
    /// Creates a configuration with a shorter due-date horizon and smaller
    /// pages.
    ///
    /// Useful for small deployments and for exercising limits in tests.
    #[must_use]
    pub const fn compact() -> Self {
        Self {
            max_due_horizon_days: 90,
            default_page_size: 10,
            max_page_size: 25,
            dashboard_recent_limit: 3,
            dashboard_upcoming_limit: 3,
            dashboard_completed_limit: 3,
        }
    }

    /// Clamps a requested page size to [`Self::max_page_size`].
    #[must_use]
    pub fn clamp_page_size(&self, requested: u32) -> u32 {
        requested.min(self.max_page_size)
    }
}
