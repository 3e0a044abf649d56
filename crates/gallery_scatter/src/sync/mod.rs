//! Session roles, context, and host/peer synchronization.
//!
//! - [`message`]: the tagged message kinds exchanged between peers
//! - [`transport`]: the outbound transport seam and inbound delivery queue
//! - [`session`]: the role state machine driving seed/settings propagation
use std::time::Duration;

use rand::RngCore;
use tracing::{info, warn};

pub mod message;
pub mod session;
pub mod transport;

pub use message::{SwapMessage, SyncKind};
pub use session::SessionSync;
pub use transport::{Inbound, InboundSender, PeerId, Transport};

use crate::catalog::DisplayMode;
use crate::error::{Error, Result};
use crate::swap::RoundSettings;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);
pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_millis(1000);

/// Session role governing who is authoritative for seed and settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Role {
    #[default]
    SinglePlayer,
    Client,
    Host,
}

/// The three user-facing toggles steering a round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Toggles {
    pub separated_pools: bool,
    pub rugs_and_banners: bool,
    pub chaos: bool,
}

impl Toggles {
    /// Resolve the single active display mode. Strict priority list:
    /// chaos beats rugs-and-banners beats normal.
    pub fn active_mode(&self) -> DisplayMode {
        if self.chaos {
            DisplayMode::CHAOS
        } else if self.rugs_and_banners {
            DisplayMode::RUGS_AND_BANNERS
        } else {
            DisplayMode::NORMAL
        }
    }
}

/// Static configuration for a session.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct SwapConfig {
    /// Local toggle values; authoritative for hosts and single players.
    pub toggles: Toggles,
    /// Whether clients defer to host-sent settings.
    pub host_control: bool,
    /// Interval between polls while waiting on a seed or sync response.
    pub poll_interval: Duration,
    /// Total time budget for such a wait before proceeding regardless.
    pub sync_timeout: Duration,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            toggles: Toggles::default(),
            host_control: true,
            poll_interval: DEFAULT_POLL_INTERVAL,
            sync_timeout: DEFAULT_SYNC_TIMEOUT,
        }
    }
}

impl SwapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_toggles(mut self, toggles: Toggles) -> Self {
        self.toggles = toggles;
        self
    }

    pub fn with_host_control(mut self, host_control: bool) -> Self {
        self.host_control = host_control;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_sync_timeout(mut self, sync_timeout: Duration) -> Self {
        self.sync_timeout = sync_timeout;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::InvalidConfig("poll_interval must be > 0".into()));
        }
        if self.sync_timeout < self.poll_interval {
            return Err(Error::InvalidConfig(
                "sync_timeout must be >= poll_interval".into(),
            ));
        }
        Ok(())
    }

    /// Number of bounded polls a wait is allowed before timing out.
    pub fn max_polls(&self) -> u32 {
        (self.sync_timeout.as_millis() / self.poll_interval.as_millis()).max(1) as u32
    }
}

/// The one explicitly owned session state object, created once per process
/// and mutated only by role transitions and sync events. Round-scoped
/// fields (seed, active mode) are re-resolved at the start of every round.
#[derive(Debug, Clone)]
pub struct SessionContext {
    role: Role,
    local: Toggles,
    received: Toggles,
    host_control: bool,
    /// Seed applied to the most recent round.
    seed: u64,
    /// Seed generated by this peer while hosting.
    host_seed: u64,
    received_seed: Option<u64>,
    synced_to_host: bool,
}

impl SessionContext {
    pub fn new(config: &SwapConfig) -> Self {
        Self {
            role: Role::SinglePlayer,
            local: config.toggles,
            received: Toggles::default(),
            host_control: config.host_control,
            seed: 0,
            host_seed: 0,
            received_seed: None,
            synced_to_host: false,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub(crate) fn set_role(&mut self, role: Role) {
        self.role = role;
        info!(?role, "session role changed");
    }

    pub fn host_control(&self) -> bool {
        self.host_control
    }

    pub fn set_host_control(&mut self, host_control: bool) {
        self.host_control = host_control;
    }

    pub fn local_toggles(&self) -> Toggles {
        self.local
    }

    pub fn set_local_toggles(&mut self, toggles: Toggles) {
        self.local = toggles;
    }

    pub fn received_toggles(&self) -> Toggles {
        self.received
    }

    pub(crate) fn set_received_toggles(&mut self, toggles: Toggles) {
        self.received = toggles;
    }

    pub fn synced_to_host(&self) -> bool {
        self.synced_to_host
    }

    pub(crate) fn set_synced_to_host(&mut self, synced: bool) {
        self.synced_to_host = synced;
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn received_seed(&self) -> Option<u64> {
        self.received_seed
    }

    pub(crate) fn set_received_seed(&mut self, seed: u64) {
        self.received_seed = Some(seed);
    }

    pub(crate) fn set_host_seed(&mut self, seed: u64) {
        self.host_seed = seed;
    }

    pub fn host_seed(&self) -> u64 {
        self.host_seed
    }

    /// Toggle values effective for this peer. Hosts and single players read
    /// their local toggles; clients read host-sent values while host
    /// control is on, and fall back to local toggles when it is off.
    pub fn effective_toggles(&self) -> Toggles {
        match self.role {
            Role::SinglePlayer | Role::Host => self.local,
            Role::Client => {
                if self.host_control {
                    self.received
                } else {
                    self.local
                }
            }
        }
    }

    /// Resolve the seed for the next round per role and record it.
    ///
    /// Single players draw fresh randomness; hosts use the seed generated
    /// when the round was announced; clients consume the most recently
    /// received seed, reusing the last applied one with a warning when no
    /// fresh seed has arrived.
    pub fn resolve_seed<R: RngCore>(&mut self, rng: &mut R) -> u64 {
        match self.role {
            Role::SinglePlayer => {
                self.seed = rng.next_u64();
                info!(seed = self.seed, "generated single-player round seed");
            }
            Role::Host => {
                self.seed = self.host_seed;
            }
            Role::Client => match self.received_seed.take() {
                Some(seed) => self.seed = seed,
                None => {
                    warn!(
                        seed = self.seed,
                        "no fresh seed received from host, reusing last applied seed"
                    );
                }
            },
        }
        self.seed
    }

    /// Resolve everything a round needs: seed, active mode, pool layout.
    pub fn round_settings<R: RngCore>(&mut self, rng: &mut R) -> RoundSettings {
        let toggles = self.effective_toggles();
        RoundSettings::new(
            self.resolve_seed(rng),
            toggles.active_mode(),
            toggles.separated_pools,
        )
    }

    /// Drop every piece of multiplayer-derived state. Called when leaving
    /// a room so stale host data cannot leak into single-player rounds.
    pub(crate) fn reset_multiplayer_state(&mut self) {
        self.received = Toggles::default();
        self.received_seed = None;
        self.synced_to_host = false;
    }
}
