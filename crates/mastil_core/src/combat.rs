//! Arrival resolution.
//!
//! When a transfer lands, its units either reinforce the target (same
//! owner) or fight the garrison one-for-one. There is no randomness and
//! neither level nor element enters the math.
//!
//! | situation | result |
//! |---|---|
//! | attacker owns target | reinforce, clamp at capacity |
//! | target shielded | attackers lost, target unchanged |
//! | attackers > garrison | conquest, survivors garrison the building |
//! | attackers == garrison | target becomes neutral and empty |
//! | attackers < garrison | repelled, garrison reduced |

use serde::{Deserialize, Serialize};

use crate::building::{find_mut, Building, BuildingId, Owner};

/// What happened when a transfer arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arrival {
    /// Same owner; garrison grew to `units`.
    Reinforced {
        /// Garrison after reinforcement.
        units: u32,
    },
    /// Attackers won and hold the building with `units`.
    Conquered {
        /// Owner before the conquest.
        previous_owner: Owner,
        /// Surviving attackers (clamped to capacity).
        units: u32,
    },
    /// Both sides wiped out; the building is neutral and empty.
    Neutralized {
        /// Owner before the exchange.
        previous_owner: Owner,
    },
    /// Defenders held with `units` remaining.
    Repelled {
        /// Garrison left.
        units: u32,
    },
    /// The target is invulnerable; attackers are lost.
    Shielded,
}

/// Result of applying one arrival to the building list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrivalReport {
    /// Building that received the transfer.
    pub target: BuildingId,
    /// Side that sent the units.
    pub attacker: Owner,
    /// Units that arrived.
    pub incoming: u32,
    /// Outcome.
    pub outcome: Arrival,
}

impl ArrivalReport {
    /// Whether the target changed hands.
    #[must_use]
    pub const fn changed_owner(&self) -> bool {
        matches!(
            self.outcome,
            Arrival::Conquered { .. } | Arrival::Neutralized { .. }
        )
    }

    /// The side that lost the building, if any.
    #[must_use]
    pub const fn loser(&self) -> Option<Owner> {
        match self.outcome {
            Arrival::Conquered { previous_owner, .. }
            | Arrival::Neutralized { previous_owner } => Some(previous_owner),
            _ => None,
        }
    }
}

/// Decide the outcome of `incoming` units from `attacker` reaching `target`.
#[must_use]
pub fn arrival_outcome(target: &Building, incoming: u32, attacker: Owner) -> Arrival {
    if attacker == target.owner {
        return Arrival::Reinforced {
            units: target.units.saturating_add(incoming).min(target.max_units),
        };
    }

    if target.is_invulnerable {
        return Arrival::Shielded;
    }

    match incoming.cmp(&target.units) {
        std::cmp::Ordering::Greater => Arrival::Conquered {
            previous_owner: target.owner,
            units: (incoming - target.units).min(target.max_units),
        },
        std::cmp::Ordering::Equal => Arrival::Neutralized {
            previous_owner: target.owner,
        },
        std::cmp::Ordering::Less => Arrival::Repelled {
            units: target.units - incoming,
        },
    }
}

/// Apply an outcome to the target building.
pub fn apply_arrival(target: &mut Building, outcome: Arrival, attacker: Owner) {
    match outcome {
        Arrival::Reinforced { units } | Arrival::Repelled { units } => target.units = units,
        Arrival::Conquered { units, .. } => {
            target.owner = attacker;
            target.units = units;
        }
        Arrival::Neutralized { .. } => {
            target.owner = Owner::Neutral;
            target.units = 0;
        }
        Arrival::Shielded => {}
    }
}

/// Resolve an arrival against the live building list.
///
/// Returns `None` (and logs) when the target no longer exists.
pub fn resolve_arrival(
    buildings: &mut [Building],
    target_id: &BuildingId,
    incoming: u32,
    attacker: Owner,
) -> Option<ArrivalReport> {
    let Some(target) = find_mut(buildings, target_id) else {
        tracing::warn!(target = %target_id, "transfer arrived at unknown building");
        return None;
    };

    let outcome = arrival_outcome(target, incoming, attacker);
    apply_arrival(target, outcome, attacker);

    tracing::debug!(target = %target_id, ?attacker, incoming, ?outcome, "arrival resolved");

    Some(ArrivalReport {
        target: target_id.clone(),
        attacker,
        incoming,
        outcome,
    })
}
