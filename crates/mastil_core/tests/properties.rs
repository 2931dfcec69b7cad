//! Invariants that hold across arbitrary command scripts.

use mastil_core::combat::{arrival_outcome, Arrival};
use mastil_core::prelude::*;
use mastil_test_utils::determinism::strategies::{arb_building, arb_command_script, arb_owner};
use mastil_test_utils::determinism::run_script;
use mastil_test_utils::fixtures::{arrow_config, entry, started_game, started_simulation};
use mastil_test_utils::proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_buildings_stay_consistent(
        seed in any::<u64>(),
        script in arb_command_script(40),
    ) {
        let mut sim = started_simulation(seed);
        run_script(&mut sim, &script);

        let config = sim.game().config().clone();
        for building in sim.game().buildings() {
            prop_assert!(building.is_consistent(), "{building:?}");
            prop_assert!(building.level <= config.max_building_level);
            prop_assert_eq!(
                building.max_units,
                Building::capacity_for_level(config.max_units_per_building, building.level)
            );
        }
    }

    #[test]
    fn prop_finished_games_have_one_side_left(
        seed in any::<u64>(),
        script in arb_command_script(40),
    ) {
        let mut sim = started_simulation(seed);
        run_script(&mut sim, &script);
        let snapshot = sim.snapshot();

        match snapshot.phase {
            Phase::Victory => prop_assert_eq!(snapshot.enemy_building_count, 0),
            Phase::Defeat => prop_assert_eq!(snapshot.player_building_count, 0),
            Phase::Playing => {
                prop_assert!(snapshot.player_building_count + snapshot.enemy_building_count > 0);
            }
            Phase::AwaitingSetup => prop_assert!(false, "setup was already done"),
        }
    }

    #[test]
    fn prop_send_moves_half_of_the_garrison(units in 2u32..=100) {
        let layout = Layout {
            buildings: vec![
                entry("p", Owner::Player, units, 0.1, 0.5),
                entry("e", Owner::Enemy, 10, 0.9, 0.5),
            ],
        };
        let mut game = started_game(arrow_config(1_000), layout, 1);
        game.send_units(&BuildingId::from("p"), &BuildingId::from("e"), 0).unwrap();

        let left = game.building(&BuildingId::from("p")).unwrap().units;
        let sent: u32 = game.transit().iter().map(|t| t.units).sum();
        prop_assert_eq!(sent, units / 2);
        prop_assert_eq!(left + sent, units);
        prop_assert!(left >= 1);
    }

    #[test]
    fn prop_arrival_owner_follows_remainder(
        target in arb_building(),
        attacker in arb_owner(),
        incoming in 0u32..300,
    ) {
        let outcome = arrival_outcome(&target, incoming, attacker);
        match outcome {
            Arrival::Reinforced { units } => {
                prop_assert_eq!(attacker, target.owner);
                prop_assert_eq!(units, (target.units + incoming).min(target.max_units));
            }
            Arrival::Conquered { units, .. } => {
                prop_assert!(incoming > target.units);
                prop_assert!(units >= 1 && units <= target.max_units);
            }
            Arrival::Neutralized { .. } => prop_assert_eq!(incoming, target.units),
            Arrival::Repelled { units } => prop_assert_eq!(units + incoming, target.units),
            Arrival::Shielded => prop_assert!(false, "arb_building is never invulnerable"),
        }
    }

    #[test]
    fn prop_snapshot_progress_is_normalized(
        seed in any::<u64>(),
        script in arb_command_script(30),
    ) {
        let mut sim = started_simulation(seed);
        run_script(&mut sim, &script);

        for view in sim.snapshot().transfers {
            prop_assert!(view.progress >= Fixed::ZERO && view.progress <= Fixed::ONE);
            prop_assert!(view.units >= 1);
        }
    }

    #[test]
    fn prop_owner_changes_are_real(seed in any::<u64>()) {
        let mut sim = started_simulation(seed);
        sim.advance(90_000);

        for event in sim.drain_events() {
            if let GameEvent::OwnerChanged { from, to, .. } = event {
                prop_assert_ne!(from, to);
            }
        }
    }
}
