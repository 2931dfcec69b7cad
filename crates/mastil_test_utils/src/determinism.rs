//! Determinism test harness.
//!
//! A game driven by [`Simulation`] is a pure function of its config, layout,
//! seed and command script. These helpers run the same setup several times
//! and compare state hashes.

use std::thread;

use mastil_core::building::BuildingId;
use mastil_core::simulation::Simulation;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps simulated.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `steps` - Number of steps to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one step
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Run `setup` twice, advancing `step_ms` of virtual time per step, and
/// compare final hashes.
pub fn verify_simulation_determinism<F>(setup_fn: F, steps: u64, step_ms: u64) -> bool
where
    F: Fn() -> Simulation,
{
    verify_determinism(
        2,
        steps,
        &setup_fn,
        |sim| sim.advance(step_ms),
        Simulation::state_hash,
    )
    .is_deterministic
}

/// Run `num_sims` copies on scoped threads and collect the final hashes.
///
/// # Panics
///
/// Panics if a simulation thread panics.
pub fn run_parallel_simulations<F>(setup_fn: F, num_sims: usize, duration_ms: u64) -> Vec<u64>
where
    F: Fn() -> Simulation + Sync,
{
    thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    sim.advance(duration_ms);
                    sim.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    })
}

/// Compare two runs step by step, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs agree, `Some(step)` for the first step whose hashes
/// differ (0 means the initial states differ).
pub fn find_first_divergence<F>(setup_fn: F, steps: u64, step_ms: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for step in 1..=steps {
        sim1.advance(step_ms);
        sim2.advance(step_ms);

        if sim1.state_hash() != sim2.state_hash() {
            tracing::warn!(step, "simulations diverged");
            return Some(step);
        }
    }

    None
}

/// One player input in a scripted run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedCommand {
    /// Let virtual time pass.
    Wait(u64),
    /// Send half of `source` to `target`.
    Send {
        /// Source building.
        source: BuildingId,
        /// Target building.
        target: BuildingId,
    },
    /// Upgrade a building.
    Upgrade(BuildingId),
    /// Click a building.
    Click(BuildingId),
    /// Pause or resume.
    Pause(bool),
}

/// Feed `script` into `sim`. Rejected commands are ignored, as a player's
/// invalid clicks would be.
pub fn run_script(sim: &mut Simulation, script: &[ScriptedCommand]) {
    for command in script {
        match command {
            ScriptedCommand::Wait(ms) => sim.advance(*ms),
            ScriptedCommand::Send { source, target } => {
                let _ = sim.send_units(source, target);
            }
            ScriptedCommand::Upgrade(id) => {
                let _ = sim.upgrade_building(id);
            }
            ScriptedCommand::Click(id) => {
                let _ = sim.select_building(id);
            }
            ScriptedCommand::Pause(paused) => sim.set_paused(*paused),
        }
    }
}

/// Proptest strategies for determinism and invariant testing.
///
/// Ids are drawn from the standard map so most commands hit a building.
pub mod strategies {
    use proptest::prelude::*;

    use super::ScriptedCommand;
    use mastil_core::building::{Building, BuildingId, Owner};
    use mastil_core::math::Vec2Fixed;

    /// Ids of the standard map, plus one that does not exist.
    pub const STANDARD_IDS: [&str; 17] = [
        "b1", "b2", "b3", "b4", "b5", "b6", "n1", "n2", "n3", "n4", "n5", "n6", "h1", "h2", "h3",
        "h4", "zz",
    ];

    /// Generate any owner.
    pub fn arb_owner() -> impl Strategy<Value = Owner> {
        prop_oneof![Just(Owner::Player), Just(Owner::Enemy), Just(Owner::Neutral)]
    }

    /// Generate a building id from the standard map.
    pub fn arb_building_id() -> impl Strategy<Value = BuildingId> {
        proptest::sample::select(STANDARD_IDS.to_vec()).prop_map(BuildingId::from)
    }

    /// Generate a consistent building of level 1 to 5.
    pub fn arb_building() -> impl Strategy<Value = Building> {
        (arb_owner(), 1u32..=5)
            .prop_flat_map(|(owner, level)| {
                let max_units = Building::capacity_for_level(100, level);
                (Just(owner), Just(level), 0..=max_units)
            })
            .prop_map(|(owner, level, units)| Building {
                id: BuildingId::from("t"),
                owner,
                units,
                max_units: Building::capacity_for_level(100, level),
                level,
                position: Vec2Fixed::ZERO,
                element: None,
                variation: None,
                is_invulnerable: false,
            })
    }

    /// Generate one scripted command.
    pub fn arb_command() -> impl Strategy<Value = ScriptedCommand> {
        prop_oneof![
            3 => (1u64..20_000).prop_map(ScriptedCommand::Wait),
            3 => (arb_building_id(), arb_building_id())
                .prop_map(|(source, target)| ScriptedCommand::Send { source, target }),
            1 => arb_building_id().prop_map(ScriptedCommand::Upgrade),
            1 => arb_building_id().prop_map(ScriptedCommand::Click),
            1 => any::<bool>().prop_map(ScriptedCommand::Pause),
        ]
    }

    /// Generate a script of up to `max_len` commands.
    pub fn arb_command_script(max_len: usize) -> impl Strategy<Value = Vec<ScriptedCommand>> {
        proptest::collection::vec(arb_command(), 0..max_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::started_simulation;
    use proptest::prelude::*;

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
    }

    #[test]
    #[should_panic(expected = "non-deterministic")]
    fn test_assert_deterministic_reports_divergence() {
        let result = DeterminismResult {
            is_deterministic: false,
            hashes: vec![1, 2],
            steps: 1,
        };
        result.assert_deterministic();
    }

    #[test]
    fn test_standard_game_is_deterministic() {
        assert!(verify_simulation_determinism(|| started_simulation(42), 60, 5_000));
    }

    #[test]
    fn test_no_divergence_across_ten_minutes() {
        assert_eq!(find_first_divergence(|| started_simulation(7), 120, 5_000), None);
    }

    #[test]
    fn test_parallel_runs_agree() {
        let hashes = run_parallel_simulations(|| started_simulation(3), 4, 120_000);
        assert_eq!(hashes.len(), 4);
        assert!(hashes.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = started_simulation(1);
        let mut b = started_simulation(2);
        a.advance(120_000);
        b.advance(120_000);
        assert_ne!(a.state_hash(), b.state_hash());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_scripts_replay_identically(
            seed in any::<u64>(),
            script in strategies::arb_command_script(30),
        ) {
            let replay = || {
                let mut sim = started_simulation(seed);
                run_script(&mut sim, &script);
                sim.state_hash()
            };
            prop_assert_eq!(replay(), replay());
        }
    }
}
