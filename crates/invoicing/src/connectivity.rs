//! Connectivity tracking driven by gateway outcomes.

use serde::{Deserialize, Serialize};

/// Connectivity state of the remote store, as last observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityState {
    /// The last gateway call succeeded.
    #[default]
    Online,
    /// The last gateway call failed; intents are being committed locally only.
    Offline,
}

/// Connectivity plus a running count of local-only commits.
///
/// Never blocks an intent; it only records what the gateway did.
#[derive(Debug, Clone, Default)]
pub struct Connectivity {
    state: ConnectivityState,
    local_only_commits: u64,
}

impl Connectivity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    pub fn is_offline(&self) -> bool {
        self.state == ConnectivityState::Offline
    }

    /// Number of mutations committed without a successful remote mirror.
    pub fn local_only_commits(&self) -> u64 {
        self.local_only_commits
    }

    /// Mark the remote store as reachable.
    pub fn set_online(&mut self) {
        self.state = ConnectivityState::Online;
    }

    /// Mark the remote store as unreachable.
    pub fn set_offline(&mut self) {
        self.state = ConnectivityState::Offline;
    }

    /// Record a mutation that was committed despite a remote failure.
    pub fn record_fallback(&mut self) {
        self.set_offline();
        self.local_only_commits += 1;
    }
}
