// Health model types

use std::fmt;

/// Cluster state as reported by the `sys/health` status code
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClusterState {
    /// 200: initialized and unsealed
    Initialized,
    /// 429: unsealed and in standby mode
    Standby,
    /// 501: not initialized
    Uninitialized,
    /// Any other status code
    Unknown(u16),
}

impl ClusterState {
    pub fn from_status(status: u16) -> Self {
        match status {
            200 => ClusterState::Initialized,
            429 => ClusterState::Standby,
            501 => ClusterState::Uninitialized,
            code => ClusterState::Unknown(code),
        }
    }

    pub fn needs_init(&self) -> bool {
        matches!(self, ClusterState::Uninitialized)
    }
}

impl fmt::Display for ClusterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterState::Initialized => write!(f, "initialized and unsealed"),
            ClusterState::Standby => write!(f, "unsealed and in standby mode"),
            ClusterState::Uninitialized => write!(f, "not initialized"),
            ClusterState::Unknown(code) => write!(f, "unknown (status code {})", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert_eq!(ClusterState::from_status(200), ClusterState::Initialized);
        assert_eq!(ClusterState::from_status(429), ClusterState::Standby);
        assert_eq!(ClusterState::from_status(501), ClusterState::Uninitialized);
        assert_eq!(ClusterState::from_status(503), ClusterState::Unknown(503));
        assert_eq!(ClusterState::from_status(472), ClusterState::Unknown(472));
    }

    #[test]
    fn test_only_uninitialized_needs_init() {
        assert!(ClusterState::Uninitialized.needs_init());
        assert!(!ClusterState::Initialized.needs_init());
        assert!(!ClusterState::Standby.needs_init());
        assert!(!ClusterState::Unknown(500).needs_init());
    }

    #[test]
    fn test_display() {
        assert_eq!(ClusterState::Standby.to_string(), "unsealed and in standby mode");
        assert_eq!(
            ClusterState::Unknown(503).to_string(),
            "unknown (status code 503)"
        );
    }
}
