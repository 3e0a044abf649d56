//! Role state machine and per-tick synchronization driver.
//!
//! `SessionSync` owns the session context, the outbound transport, and the
//! inbound queue. A cooperative update loop calls [`SessionSync::tick`]
//! once per frame: it drains delivered messages, runs edge-triggered
//! host-control checks, and advances bounded waits. Waiting is polling
//! with a fixed budget, never blocking; leaving a session cancels every
//! outstanding wait and discards undrained messages so stale seeds or
//! snapshots are never applied afterwards.
use rand::RngCore;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::error::Result;
use crate::swap::{DistributionEngine, PlacementTarget, RoundResult, UsedSnapshot};
use crate::sync::message::{SwapMessage, SyncKind};
use crate::sync::transport::{inbound_channel, Inbound, InboundSender, Transport};
use crate::sync::{Role, SessionContext, SwapConfig, Toggles};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WaitKind {
    Seed,
    Sync,
}

/// A bounded, cancellable wait advanced once per tick.
#[derive(Debug, Clone, Copy)]
struct Wait {
    kind: WaitKind,
    polls_left: u32,
}

pub struct SessionSync<T: Transport> {
    transport: T,
    config: SwapConfig,
    context: SessionContext,
    inbox: std::sync::mpsc::Receiver<Inbound>,
    sender: InboundSender,
    waits: Vec<Wait>,
    prev_host_control: bool,
}

impl<T: Transport> SessionSync<T> {
    pub fn new(transport: T, config: SwapConfig) -> Result<Self> {
        config.validate()?;
        let (sender, inbox) = inbound_channel();
        let context = SessionContext::new(&config);
        let prev_host_control = config.host_control;
        Ok(Self {
            transport,
            config,
            context,
            inbox,
            sender,
            waits: Vec::new(),
            prev_host_control,
        })
    }

    /// Handle for the delivery context to enqueue inbound messages.
    pub fn inbound_sender(&self) -> InboundSender {
        self.sender.clone()
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn set_local_toggles(&mut self, toggles: Toggles) {
        self.context.set_local_toggles(toggles);
    }

    pub fn set_host_control(&mut self, host_control: bool) {
        self.context.set_host_control(host_control);
    }

    /// Joining a room makes this peer a client unless it is already the
    /// host. Under host control the new client immediately asks for the
    /// previous round's state.
    pub fn on_room_joined(&mut self) {
        if self.context.role() == Role::Host {
            return;
        }
        self.context.set_role(Role::Client);
        if self.context.host_control() {
            self.request_sync(SyncKind::LateJoin);
        }
    }

    /// Becoming the hosting peer.
    pub fn on_become_host(&mut self) {
        self.context.set_role(Role::Host);
    }

    /// Leaving a room returns to single player: pools and multiplayer
    /// state reset, outstanding waits abort, and anything still queued in
    /// the inbox is discarded rather than applied late.
    pub fn on_room_left(&mut self, engine: &mut DistributionEngine) {
        self.context.set_role(Role::SinglePlayer);
        self.context.reset_multiplayer_state();
        engine.reset_pools();
        self.waits.clear();
        let mut discarded = 0;
        while self.inbox.try_recv().is_ok() {
            discarded += 1;
        }
        if discarded > 0 {
            info!(discarded, "discarded undelivered messages on room exit");
        }
    }

    /// Ask the host for pool state and start a bounded wait for the reply.
    pub fn request_sync(&mut self, kind: SyncKind) {
        info!(?kind, "requesting host sync");
        self.context.set_synced_to_host(false);
        self.transport
            .send_to_host(SwapMessage::SyncRequest { kind });
        self.arm_wait(WaitKind::Sync);
    }

    /// Start a bounded wait for the next host seed announcement.
    pub fn await_seed(&mut self) {
        self.arm_wait(WaitKind::Seed);
    }

    pub fn sync_wait_pending(&self) -> bool {
        self.waits.iter().any(|wait| wait.kind == WaitKind::Sync)
    }

    pub fn seed_wait_pending(&self) -> bool {
        self.waits.iter().any(|wait| wait.kind == WaitKind::Seed)
    }

    /// Run one distribution round under this session's current state.
    ///
    /// Hosts generate and broadcast a fresh seed plus their settings
    /// before drawing; clients consume the last received seed; single
    /// players draw fresh local randomness. `rng` only feeds seed
    /// generation, never the draws themselves.
    pub fn begin_round<R: RngCore>(
        &mut self,
        rng: &mut R,
        engine: &mut DistributionEngine,
        targets: &[PlacementTarget],
        catalog: &Catalog,
    ) -> Result<RoundResult> {
        if self.context.role() == Role::Host {
            let seed = rng.next_u64();
            self.context.set_host_seed(seed);
            info!(seed, "announcing host round seed");
            self.transport.broadcast_cached(SwapMessage::Seed { seed });

            let toggles = self.context.local_toggles();
            self.transport.broadcast_cached(SwapMessage::Settings {
                separated_pools: toggles.separated_pools,
                rugs_and_banners: toggles.rugs_and_banners,
                chaos: toggles.chaos,
            });
        }

        let settings = self.context.round_settings(rng);
        engine.run_round(&settings, targets, catalog)
    }

    /// One cooperative update step: drain the inbound queue, run the
    /// edge-triggered host-control check, advance bounded waits.
    pub fn tick(&mut self, engine: &mut DistributionEngine) {
        while let Ok(inbound) = self.inbox.try_recv() {
            self.handle(inbound, engine);
        }

        let host_control = self.context.host_control();
        if !self.prev_host_control && host_control && self.context.role() == Role::Client {
            self.request_sync(SyncKind::Current);
        }
        self.prev_host_control = host_control;

        self.advance_waits();
    }

    fn handle(&mut self, inbound: Inbound, engine: &mut DistributionEngine) {
        match inbound.message {
            SwapMessage::Seed { seed } => {
                info!(seed, from = %inbound.from, "received round seed");
                self.context.set_received_seed(seed);
            }
            SwapMessage::Settings {
                separated_pools,
                rugs_and_banners,
                chaos,
            } => {
                info!(
                    separated_pools,
                    rugs_and_banners, chaos, "received host settings"
                );
                self.context.set_received_toggles(Toggles {
                    separated_pools,
                    rugs_and_banners,
                    chaos,
                });
            }
            SwapMessage::SyncRequest { kind } => {
                if self.context.role() != Role::Host {
                    return;
                }
                let snapshot = match kind {
                    SyncKind::Current => engine.used_snapshot(),
                    SyncKind::LateJoin => engine.prev_round_snapshot(),
                };
                info!(peer = %inbound.from, ?kind, "answering sync request");
                self.transport
                    .send_to_peer(inbound.from, SwapMessage::sync_response(&snapshot));
            }
            SwapMessage::SyncResponse {
                all_used,
                portrait_used,
                square_used,
                landscape_used,
            } => {
                if self.context.role() == Role::Host {
                    return;
                }
                engine.apply_snapshot(&UsedSnapshot {
                    all: all_used,
                    portrait: portrait_used,
                    square: square_used,
                    landscape: landscape_used,
                });
                self.context.set_synced_to_host(true);
                info!("sync to host completed");
            }
        }
    }

    fn arm_wait(&mut self, kind: WaitKind) {
        self.waits.retain(|wait| wait.kind != kind);
        self.waits.push(Wait {
            kind,
            polls_left: self.config.max_polls(),
        });
    }

    fn advance_waits(&mut self) {
        let context = &self.context;
        self.waits.retain_mut(|wait| {
            let ready = match wait.kind {
                WaitKind::Seed => context.received_seed().is_some(),
                WaitKind::Sync => context.synced_to_host(),
            };
            if ready {
                return false;
            }
            wait.polls_left -= 1;
            if wait.polls_left == 0 {
                match wait.kind {
                    WaitKind::Seed => warn!(
                        "did not receive a seed from the host in time, proceeding with last known state"
                    ),
                    WaitKind::Sync => warn!("failed to sync to the host, proceeding unsynced"),
                }
                return false;
            }
            true
        });
    }
}
