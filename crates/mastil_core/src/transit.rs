//! Units in transit between buildings.
//!
//! A transfer is immutable once dispatched. It resolves exactly once, on
//! the first frame at or after its due time. Transfers resolve in
//! `(due time, id)` order, so a short hop dispatched later can land before
//! a long one dispatched earlier.

use serde::{Deserialize, Serialize};

use crate::building::{Building, BuildingId, Owner};
use crate::config::{GameConfig, TransitTiming};
use crate::math::{fixed_serde, floor_u32, Fixed};

/// Monotonic transfer identifier, never reused within a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransferId(pub u64);

/// Units travelling from one building to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transfer {
    /// Identifier.
    pub id: TransferId,
    /// Building the units left.
    pub source: BuildingId,
    /// Building the units are heading to.
    pub target: BuildingId,
    /// Units in flight, always positive.
    pub units: u32,
    /// Owner of the units, frozen at dispatch.
    pub owner: Owner,
    /// Dispatch time.
    pub start_ms: u64,
    /// Travel time.
    pub duration_ms: u64,
}

impl Transfer {
    /// Time at which the transfer lands.
    #[must_use]
    pub const fn due_ms(&self) -> u64 {
        self.start_ms.saturating_add(self.duration_ms)
    }

    /// Whether the transfer has landed by `now_ms`.
    #[must_use]
    pub const fn is_complete(&self, now_ms: u64) -> bool {
        now_ms >= self.due_ms()
    }

    /// Travel progress in `[0, 1]`.
    #[must_use]
    pub fn progress(&self, now_ms: u64) -> Fixed {
        if self.duration_ms == 0 || self.is_complete(now_ms) {
            return Fixed::ONE;
        }
        let elapsed = now_ms.saturating_sub(self.start_ms);
        Fixed::from_num(elapsed) / Fixed::from_num(self.duration_ms)
    }
}

/// Read-only view of a transfer for renderers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferView {
    /// Identifier.
    pub id: TransferId,
    /// Origin.
    pub source: BuildingId,
    /// Destination.
    pub target: BuildingId,
    /// Units in flight.
    pub units: u32,
    /// Owner of the units.
    pub owner: Owner,
    /// Travel progress in `[0, 1]`.
    #[serde(with = "fixed_serde")]
    pub progress: Fixed,
}

/// Travel time between two buildings under `config`.
#[must_use]
pub fn transit_duration(from: &Building, to: &Building, config: &GameConfig) -> u64 {
    match config.transit {
        TransitTiming::Arrow { duration_ms } => duration_ms,
        TransitTiming::Travel => {
            let pixels = from
                .position
                .distance(to.position)
                .saturating_mul(Fixed::from_num(config.map_extent_px));
            let millis = pixels.saturating_mul(Fixed::from_num(1000))
                / Fixed::from_num(config.unit_speed.max(1));
            u64::from(floor_u32(millis)).max(config.min_transit_ms)
        }
    }
}

/// Owns every transfer in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitCoordinator {
    in_flight: Vec<Transfer>,
    next_id: u64,
}

impl TransitCoordinator {
    /// Empty coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `units` from `source` on the road to `target`.
    pub fn dispatch(
        &mut self,
        source: &Building,
        target: &Building,
        units: u32,
        owner: Owner,
        now_ms: u64,
        config: &GameConfig,
    ) -> TransferId {
        let id = TransferId(self.next_id);
        self.next_id += 1;

        let duration_ms = transit_duration(source, target, config);
        tracing::debug!(
            id = id.0,
            source = %source.id,
            target = %target.id,
            units,
            ?owner,
            duration_ms,
            "transfer dispatched"
        );

        self.in_flight.push(Transfer {
            id,
            source: source.id.clone(),
            target: target.id.clone(),
            units,
            owner,
            start_ms: now_ms,
            duration_ms,
        });
        id
    }

    /// Remove and return every transfer landed by `now_ms`, in
    /// `(due time, id)` order.
    pub fn take_completed(&mut self, now_ms: u64) -> Vec<Transfer> {
        let (mut done, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.in_flight)
            .into_iter()
            .partition(|t| t.is_complete(now_ms));
        self.in_flight = pending;
        done.sort_by_key(|t| (t.due_ms(), t.id));
        done
    }

    /// Drop every transfer without resolving it.
    pub fn clear(&mut self) {
        self.in_flight.clear();
    }

    /// Transfers in flight, in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = &Transfer> {
        self.in_flight.iter()
    }

    /// Number of transfers in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    /// Whether nothing is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Units in flight per owner.
    #[must_use]
    pub fn units_in_flight(&self, owner: Owner) -> u64 {
        self.in_flight
            .iter()
            .filter(|t| t.owner == owner)
            .map(|t| u64::from(t.units))
            .sum()
    }

    /// Renderer views at `now_ms`.
    #[must_use]
    pub fn views(&self, now_ms: u64) -> Vec<TransferView> {
        self.in_flight
            .iter()
            .map(|t| TransferView {
                id: t.id,
                source: t.source.clone(),
                target: t.target.clone(),
                units: t.units,
                owner: t.owner,
                progress: t.progress(now_ms),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2Fixed;

    fn building(id: &str, x: f64, y: f64) -> Building {
        Building {
            id: BuildingId::from(id),
            owner: Owner::Player,
            units: 20,
            max_units: 100,
            level: 1,
            position: Vec2Fixed::from_layout(x, y),
            element: None,
            variation: None,
            is_invulnerable: false,
        }
    }

    #[test]
    fn test_travel_duration_scales_with_distance() {
        let config = GameConfig::default();
        let a = building("a", 0.1, 0.5);
        let b = building("b", 0.4, 0.9);
        // 0.5 * 1000px / 100px/s = 5s
        let duration = transit_duration(&a, &b, &config);
        assert!((4_999..=5_000).contains(&duration), "got {duration}");
    }

    #[test]
    fn test_travel_duration_floor() {
        let config = GameConfig::default();
        let a = building("a", 0.5, 0.5);
        let b = building("b", 0.51, 0.5);
        assert_eq!(transit_duration(&a, &b, &config), 250);
    }

    #[test]
    fn test_arrow_duration_is_fixed() {
        let config = GameConfig {
            transit: TransitTiming::Arrow { duration_ms: 1500 },
            ..GameConfig::default()
        };
        let a = building("a", 0.0, 0.0);
        let b = building("b", 1.0, 1.0);
        assert_eq!(transit_duration(&a, &b, &config), 1500);
    }

    #[test]
    fn test_progress() {
        let transfer = Transfer {
            id: TransferId(0),
            source: BuildingId::from("a"),
            target: BuildingId::from("b"),
            units: 5,
            owner: Owner::Player,
            start_ms: 1_000,
            duration_ms: 2_000,
        };
        assert_eq!(transfer.progress(1_000), Fixed::ZERO);
        assert_eq!(transfer.progress(2_000), Fixed::from_num(0.5));
        assert_eq!(transfer.progress(9_000), Fixed::ONE);
        assert!(!transfer.is_complete(2_999));
        assert!(transfer.is_complete(3_000));
    }

    #[test]
    fn test_completion_order_is_due_time_then_id() {
        let config = GameConfig::default();
        let near_a = building("a", 0.1, 0.5);
        let near_b = building("b", 0.2, 0.5);
        let far = building("c", 0.9, 0.5);

        let mut transit = TransitCoordinator::new();
        let long = transit.dispatch(&near_a, &far, 5, Owner::Player, 0, &config);
        let short = transit.dispatch(&near_a, &near_b, 5, Owner::Player, 100, &config);
        let twin = transit.dispatch(&near_a, &near_b, 5, Owner::Enemy, 100, &config);
        assert_eq!(transit.len(), 3);

        let done = transit.take_completed(100_000);
        let ids: Vec<TransferId> = done.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![short, twin, long]);
        assert!(transit.is_empty());
    }

    #[test]
    fn test_take_completed_leaves_pending() {
        let config = GameConfig {
            transit: TransitTiming::Arrow { duration_ms: 1500 },
            ..GameConfig::default()
        };
        let a = building("a", 0.1, 0.5);
        let b = building("b", 0.2, 0.5);
        let mut transit = TransitCoordinator::new();
        transit.dispatch(&a, &b, 7, Owner::Enemy, 0, &config);
        assert!(transit.take_completed(1_499).is_empty());
        assert_eq!(transit.units_in_flight(Owner::Enemy), 7);
        assert_eq!(transit.take_completed(1_500).len(), 1);
    }

    #[test]
    fn test_ids_survive_clear() {
        let config = GameConfig::default();
        let a = building("a", 0.1, 0.5);
        let b = building("b", 0.2, 0.5);
        let mut transit = TransitCoordinator::new();
        let first = transit.dispatch(&a, &b, 1, Owner::Player, 0, &config);
        transit.clear();
        let second = transit.dispatch(&a, &b, 1, Owner::Player, 0, &config);
        assert!(second > first);
    }
}
