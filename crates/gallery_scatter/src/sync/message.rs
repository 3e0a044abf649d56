//! Message kinds exchanged between peers.
//!
//! Wire encoding is the transport collaborator's concern; this module only
//! fixes the tagged payload shapes. `Seed` and `Settings` are broadcast and
//! cached for late joiners, `SyncRequest`/`SyncResponse` are unicast.
use crate::swap::UsedSnapshot;

/// Which round's used-index state a sync request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SyncKind {
    /// The in-progress round's state.
    Current,
    /// The previous completed round's state, for peers that joined
    /// mid-round and must reconcile against what already happened.
    LateJoin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SwapMessage {
    /// Round seed announced by the host.
    Seed { seed: u64 },
    /// Host toggle values, last write wins on the receiving side.
    Settings {
        separated_pools: bool,
        rugs_and_banners: bool,
        chaos: bool,
    },
    /// Client-to-host request for pool state.
    SyncRequest { kind: SyncKind },
    /// Host-to-client used-index lists per category.
    SyncResponse {
        all_used: Vec<usize>,
        portrait_used: Vec<usize>,
        square_used: Vec<usize>,
        landscape_used: Vec<usize>,
    },
}

impl SwapMessage {
    pub fn sync_response(snapshot: &UsedSnapshot) -> Self {
        SwapMessage::SyncResponse {
            all_used: snapshot.all.clone(),
            portrait_used: snapshot.portrait.clone(),
            square_used: snapshot.square.clone(),
            landscape_used: snapshot.landscape.clone(),
        }
    }
}
