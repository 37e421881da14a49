//! Tournament driver - the elimination state machine
//!
//! Level 1 - Orchestration
//!
//! ```text
//!   Idle --start--> InProgress --step (1 survivor left)--> Complete
//!     ^                 |  ^                                  |
//!     |                 |  +--step (more survivors)           |
//!     +------reset------+-------------------------------------+
//! ```
//!
//! A step can be split into [`Tournament::begin_round`] and
//! [`Tournament::commit_round`] so the oracle-bound part runs without holding
//! whatever lock guards the tournament. Pausing only gates `begin_round`; a
//! round already in flight still commits.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use bracket_core::{find_duplicate_name, BracketError, EliminationTree, Item, Result};

use crate::config::{RoundConfig, TournamentConfig};
use crate::oracle::Oracle;
use crate::round::{run_round, RoundOutcome};

/// Lifecycle phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    InProgress,
    Complete,
}

impl Phase {
    /// Same spelling as the serialized form
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::InProgress => "in_progress",
            Phase::Complete => "complete",
        }
    }

    /// Wording used in transition errors
    fn label(self) -> &'static str {
        match self {
            Phase::InProgress => "in progress",
            other => other.as_str(),
        }
    }
}

/// Observable tournament state
#[derive(Clone, Debug, Serialize)]
pub struct TournamentState {
    pub phase: Phase,
    /// Number of the next round to run (1-based, 0 while idle)
    pub current_round: usize,
    pub survivors: Vec<Item>,
    pub elimination_tree: EliminationTree,
    pub is_complete: bool,
    pub champion: Option<Item>,
    pub paused: bool,
    /// A round has been handed out and not yet committed
    pub round_in_flight: bool,
}

impl TournamentState {
    fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            current_round: 0,
            survivors: Vec::new(),
            elimination_tree: EliminationTree::new(),
            is_complete: false,
            champion: None,
            paused: false,
            round_in_flight: false,
        }
    }
}

/// What a step did
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// A round completed and more remain
    Advanced { round: usize, survivors: usize },
    /// The final round completed
    Complete { champion: Item },
    /// The gate is closed; nothing ran
    Paused,
}

/// Champion plus full history
#[derive(Clone, Debug, Serialize)]
pub struct TournamentResult {
    pub champion: Item,
    pub elimination_tree: EliminationTree,
}

/// A round handed out by [`Tournament::begin_round`]
#[derive(Clone, Debug)]
pub struct PendingRound {
    pub round_number: usize,
    pub survivors: Vec<Item>,
    pub config: RoundConfig,
    seed: u64,
    epoch: u64,
}

impl PendingRound {
    /// Run the round. Blocks on the oracle.
    pub fn run<O>(&self, oracle: &O) -> Result<RoundOutcome>
    where
        O: Oracle + ?Sized,
    {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        run_round(&self.survivors, self.round_number, &self.config, oracle, &mut rng)
    }
}

/// Single-elimination tournament over a list of items
#[derive(Debug)]
pub struct Tournament {
    config: TournamentConfig,
    state: TournamentState,
    rng: ChaCha8Rng,
    /// Bumped by reset so stale in-flight rounds cannot commit
    epoch: u64,
}

impl Tournament {
    /// Create an idle tournament
    pub fn new(config: TournamentConfig) -> Result<Self> {
        config.validate()?;
        let rng = create_rng(config.seed);
        Ok(Self {
            config,
            state: TournamentState::idle(),
            rng,
            epoch: 0,
        })
    }

    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    pub fn state(&self) -> &TournamentState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Champion and history once complete
    pub fn result(&self) -> Option<TournamentResult> {
        self.state.champion.as_ref().map(|champion| TournamentResult {
            champion: champion.clone(),
            elimination_tree: self.state.elimination_tree.clone(),
        })
    }

    /// Replace the configuration; only while idle
    pub fn reconfigure(&mut self, config: TournamentConfig) -> Result<()> {
        self.expect_phase(Phase::Idle, "reconfigure")?;
        config.validate()?;
        self.rng = create_rng(config.seed);
        self.config = config;
        Ok(())
    }

    /// Idle -> InProgress
    pub fn start(&mut self, mut items: Vec<Item>) -> Result<()> {
        self.expect_phase(Phase::Idle, "start")?;

        if items.is_empty() {
            return Err(BracketError::EmptyInput);
        }
        if items.len() % 2 != 0 {
            return Err(BracketError::OddInputCount(items.len()));
        }
        if let Some(name) = find_duplicate_name(&items) {
            return Err(BracketError::DuplicateItem(name.to_string()));
        }

        if self.config.shuffle {
            items.shuffle(&mut self.rng);
        }

        tracing::info!("Tournament started with {} items", items.len());

        self.state = TournamentState {
            phase: Phase::InProgress,
            current_round: 1,
            survivors: items,
            ..TournamentState::idle()
        };
        Ok(())
    }

    /// Run the next round, unless paused
    pub fn step<O>(&mut self, oracle: &O) -> Result<StepOutcome>
    where
        O: Oracle + ?Sized,
    {
        let Some(pending) = self.begin_round()? else {
            return Ok(StepOutcome::Paused);
        };

        match pending.run(oracle) {
            Ok(outcome) => self.commit_round(&pending, outcome),
            Err(e) => {
                self.abort_round(&pending);
                Err(e)
            }
        }
    }

    /// Hand out the next round. `None` while paused.
    pub fn begin_round(&mut self) -> Result<Option<PendingRound>> {
        self.expect_phase(Phase::InProgress, "run a round")?;
        if self.state.round_in_flight {
            return Err(BracketError::InvalidTransition {
                phase: "running a round",
                action: "start another round",
            });
        }
        if self.state.paused {
            return Ok(None);
        }

        self.state.round_in_flight = true;
        Ok(Some(PendingRound {
            round_number: self.state.current_round,
            survivors: self.state.survivors.clone(),
            config: self.config.round.clone(),
            seed: self.rng.gen(),
            epoch: self.epoch,
        }))
    }

    /// Fold a finished round into the state
    pub fn commit_round(&mut self, pending: &PendingRound, outcome: RoundOutcome) -> Result<StepOutcome> {
        self.expect_current(pending, "commit a round")?;

        if outcome.round.round != pending.round_number {
            return Err(BracketError::InternalInconsistency(format!(
                "round {} committed as round {}",
                pending.round_number, outcome.round.round
            )));
        }

        let round_number = pending.round_number;
        self.state.elimination_tree.push(outcome.round);
        self.state.survivors = outcome.winners;
        self.state.current_round += 1;
        self.state.round_in_flight = false;

        if self.state.survivors.len() == 1 {
            let champion = self.state.survivors[0].clone();
            tracing::info!(
                "Tournament complete after {} rounds: champion {}",
                self.state.elimination_tree.len(),
                champion.name
            );
            self.state.phase = Phase::Complete;
            self.state.is_complete = true;
            self.state.champion = Some(champion.clone());
            return Ok(StepOutcome::Complete { champion });
        }

        Ok(StepOutcome::Advanced {
            round: round_number,
            survivors: self.state.survivors.len(),
        })
    }

    /// Release an in-flight round that failed; state stays as it was
    pub fn abort_round(&mut self, pending: &PendingRound) {
        if self.expect_current(pending, "abort a round").is_ok() {
            tracing::warn!("Round {} failed; state left unchanged", pending.round_number);
            self.state.round_in_flight = false;
        }
    }

    /// Close the gate before the next round
    pub fn pause(&mut self) -> Result<()> {
        self.expect_phase(Phase::InProgress, "pause")?;
        self.state.paused = true;
        Ok(())
    }

    /// Reopen the gate
    pub fn resume(&mut self) -> Result<()> {
        self.expect_phase(Phase::InProgress, "resume")?;
        self.state.paused = false;
        Ok(())
    }

    /// Any phase -> Idle. The RNG restarts from the configured seed.
    pub fn reset(&mut self) {
        self.state = TournamentState::idle();
        self.rng = create_rng(self.config.seed);
        self.epoch += 1;
    }

    /// Step until complete
    pub fn run_to_completion<O>(&mut self, oracle: &O) -> Result<TournamentResult>
    where
        O: Oracle + ?Sized,
    {
        loop {
            match self.step(oracle)? {
                StepOutcome::Advanced { .. } => continue,
                StepOutcome::Complete { champion } => {
                    return Ok(TournamentResult {
                        champion,
                        elimination_tree: self.state.elimination_tree.clone(),
                    })
                }
                StepOutcome::Paused => {
                    return Err(BracketError::InvalidTransition {
                        phase: "paused",
                        action: "run to completion",
                    })
                }
            }
        }
    }

    fn expect_phase(&self, phase: Phase, action: &'static str) -> Result<()> {
        if self.state.phase != phase {
            return Err(BracketError::InvalidTransition {
                phase: self.state.phase.label(),
                action,
            });
        }
        Ok(())
    }

    fn expect_current(&self, pending: &PendingRound, action: &'static str) -> Result<()> {
        if pending.epoch != self.epoch
            || !self.state.round_in_flight
            || pending.round_number != self.state.current_round
        {
            return Err(BracketError::InvalidTransition {
                phase: "no longer running that round",
                action,
            });
        }
        Ok(())
    }
}

/// Run a whole tournament (Level 1 orchestration)
///
/// This function reads like a table of contents:
/// 1. Start the state machine with the items
/// 2. Step rounds until one survivor remains
pub fn run_tournament<O>(items: Vec<Item>, config: &TournamentConfig, oracle: &O) -> Result<TournamentResult>
where
    O: Oracle + ?Sized,
{
    let mut tournament = Tournament::new(config.clone())?;
    tournament.start(items)?;
    tournament.run_to_completion(oracle)
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{BatchRequest, OracleError};

    fn items(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| Item::new(format!("c{i}"), format!("candidate {i}")))
            .collect()
    }

    fn first_wins(request: &BatchRequest) -> std::result::Result<String, OracleError> {
        Ok(format!("[{}]", vec!["1"; request.pairs.len()].join(",")))
    }

    fn garbage(_: &BatchRequest) -> std::result::Result<String, OracleError> {
        Err(OracleError::Timeout(std::time::Duration::from_secs(30)))
    }

    fn unshuffled(batch_size: usize) -> TournamentConfig {
        TournamentConfig::new(RoundConfig::default().with_batch_size(batch_size))
            .with_shuffle(false)
            .with_seed(7)
    }

    #[test]
    fn test_eight_items_first_wins() {
        let initial = items(8);
        let mut tournament = Tournament::new(unshuffled(4)).unwrap();
        tournament.start(initial.clone()).unwrap();

        let step = tournament.step(&first_wins).unwrap();
        assert_eq!(step, StepOutcome::Advanced { round: 1, survivors: 4 });
        let names: Vec<&str> = tournament.state().survivors.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["c0", "c2", "c4", "c6"]);

        let step = tournament.step(&first_wins).unwrap();
        assert_eq!(step, StepOutcome::Advanced { round: 2, survivors: 2 });

        let step = tournament.step(&first_wins).unwrap();
        assert_eq!(step, StepOutcome::Complete { champion: initial[0].clone() });

        let state = tournament.state();
        assert_eq!(state.phase, Phase::Complete);
        assert!(state.is_complete);
        assert_eq!(state.champion.as_ref(), Some(&initial[0]));
        assert_eq!(state.current_round, 4);
        let totals: Vec<usize> = state
            .elimination_tree
            .rounds()
            .iter()
            .map(|r| r.total_batches)
            .collect();
        assert_eq!(totals, vec![1, 1, 1]);
    }

    #[test]
    fn test_power_of_two_round_counts() {
        for k in 1..=6 {
            let n = 1usize << k;
            let result = run_tournament(items(n), &unshuffled(2).with_shuffle(true), &garbage).unwrap();

            assert_eq!(result.elimination_tree.len(), k);
            for (i, round) in result.elimination_tree.rounds().iter().enumerate() {
                assert_eq!(round.round, i + 1);
                assert_eq!(round.matches.len(), n >> (i + 1));
            }
            assert!(items(n).contains(&result.champion));
        }
    }

    #[test]
    fn test_shuffle_is_seeded() {
        let config = TournamentConfig::default().with_seed(123);
        let mut a = Tournament::new(config.clone()).unwrap();
        let mut b = Tournament::new(config).unwrap();
        a.start(items(16)).unwrap();
        b.start(items(16)).unwrap();

        assert_eq!(a.state().survivors, b.state().survivors);
        let mut sorted = a.state().survivors.clone();
        sorted.sort_by(|x, y| x.name.cmp(&y.name));
        let mut expected = items(16);
        expected.sort_by(|x, y| x.name.cmp(&y.name));
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_seeded_tournament_is_reproducible() {
        let config = TournamentConfig::default().with_seed(55);
        let a = run_tournament(items(32), &config, &garbage).unwrap();
        let b = run_tournament(items(32), &config, &garbage).unwrap();
        assert_eq!(a.champion, b.champion);
        assert_eq!(a.elimination_tree, b.elimination_tree);
    }

    #[test]
    fn test_start_validation() {
        let mut tournament = Tournament::new(unshuffled(2)).unwrap();
        assert_eq!(tournament.start(Vec::new()), Err(BracketError::EmptyInput));
        assert_eq!(tournament.start(items(5)), Err(BracketError::OddInputCount(5)));

        let mut dupes = items(3);
        dupes.push(Item::new("c1", "again"));
        assert_eq!(
            tournament.start(dupes),
            Err(BracketError::DuplicateItem("c1".to_string()))
        );
        assert_eq!(tournament.phase(), Phase::Idle);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TournamentConfig::new(RoundConfig::default().with_batch_size(5));
        assert!(matches!(
            Tournament::new(config),
            Err(BracketError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_step_before_start() {
        let mut tournament = Tournament::new(unshuffled(2)).unwrap();
        assert!(matches!(
            tournament.step(&first_wins),
            Err(BracketError::InvalidTransition { phase: "idle", .. })
        ));
    }

    #[test]
    fn test_complete_is_terminal() {
        let mut tournament = Tournament::new(unshuffled(2)).unwrap();
        tournament.start(items(2)).unwrap();
        tournament.step(&first_wins).unwrap();
        assert_eq!(tournament.phase(), Phase::Complete);

        assert!(matches!(
            tournament.step(&first_wins),
            Err(BracketError::InvalidTransition { phase: "complete", .. })
        ));
        assert!(tournament.start(items(2)).is_err());
        assert!(tournament.pause().is_err());
        assert!(tournament.result().is_some());

        tournament.reset();
        assert_eq!(tournament.phase(), Phase::Idle);
        assert!(tournament.result().is_none());
        assert!(tournament.start(items(2)).is_ok());
    }

    #[test]
    fn test_pause_and_resume() {
        let mut tournament = Tournament::new(unshuffled(2)).unwrap();
        tournament.start(items(8)).unwrap();
        tournament.step(&first_wins).unwrap();

        tournament.pause().unwrap();
        let before = tournament.state().clone();
        assert_eq!(tournament.step(&first_wins).unwrap(), StepOutcome::Paused);
        assert_eq!(tournament.state().survivors, before.survivors);
        assert_eq!(tournament.state().elimination_tree, before.elimination_tree);
        assert_eq!(tournament.state().current_round, before.current_round);
        assert!(tournament.run_to_completion(&first_wins).is_err());

        tournament.resume().unwrap();
        let result = tournament.run_to_completion(&first_wins).unwrap();
        assert_eq!(result.champion.name, "c0");
        assert_eq!(result.elimination_tree.len(), 3);
    }

    #[test]
    fn test_failed_round_leaves_tree_intact() {
        // Six items halve to three, which cannot be paired
        let mut tournament = Tournament::new(unshuffled(2)).unwrap();
        tournament.start(items(6)).unwrap();
        tournament.step(&first_wins).unwrap();

        let tree_before = tournament.state().elimination_tree.clone();
        let survivors_before = tournament.state().survivors.clone();

        assert_eq!(
            tournament.step(&first_wins),
            Err(BracketError::OddInputCount(3))
        );
        assert_eq!(tournament.state().elimination_tree, tree_before);
        assert_eq!(tournament.state().survivors, survivors_before);
        assert_eq!(tournament.state().current_round, 2);
        assert!(!tournament.state().round_in_flight);
        assert_eq!(tournament.phase(), Phase::InProgress);
    }

    #[test]
    fn test_begin_commit_split() {
        let mut tournament = Tournament::new(unshuffled(2)).unwrap();
        tournament.start(items(4)).unwrap();

        let pending = tournament.begin_round().unwrap().unwrap();
        assert_eq!(pending.round_number, 1);
        assert!(tournament.begin_round().is_err());

        // Pausing mid-round does not stop the commit
        tournament.pause().unwrap();
        let outcome = pending.run(&first_wins).unwrap();
        let step = tournament.commit_round(&pending, outcome).unwrap();
        assert_eq!(step, StepOutcome::Advanced { round: 1, survivors: 2 });
        assert_eq!(tournament.begin_round().unwrap().map(|p| p.round_number), None);
    }

    #[test]
    fn test_stale_round_cannot_commit_after_reset() {
        let mut tournament = Tournament::new(unshuffled(2)).unwrap();
        tournament.start(items(4)).unwrap();
        let pending = tournament.begin_round().unwrap().unwrap();
        let outcome = pending.run(&first_wins).unwrap();

        tournament.reset();
        tournament.start(items(4)).unwrap();

        assert!(matches!(
            tournament.commit_round(&pending, outcome),
            Err(BracketError::InvalidTransition { .. })
        ));
        assert!(tournament.state().elimination_tree.is_empty());
    }

    #[test]
    fn test_reconfigure_only_while_idle() {
        let mut tournament = Tournament::new(unshuffled(2)).unwrap();
        tournament.reconfigure(unshuffled(4)).unwrap();
        assert_eq!(tournament.config().round.batch_size, 4);

        assert!(matches!(
            tournament.reconfigure(unshuffled(3)),
            Err(BracketError::InvalidConfiguration(_))
        ));

        tournament.start(items(4)).unwrap();
        assert!(matches!(
            tournament.reconfigure(unshuffled(2)),
            Err(BracketError::InvalidTransition { phase: "in progress", .. })
        ));
    }

    #[test]
    fn test_phase_as_str_matches_serde() {
        for phase in [Phase::Idle, Phase::InProgress, Phase::Complete] {
            assert_eq!(serde_json::to_value(phase).unwrap(), phase.as_str());
        }
        assert_eq!(Phase::InProgress.label(), "in progress");
    }

    #[test]
    fn test_step_outcome_serializes() {
        let json = serde_json::to_value(StepOutcome::Advanced { round: 2, survivors: 4 }).unwrap();
        assert_eq!(json["outcome"], "advanced");
        assert_eq!(json["survivors"], 4);
    }

    #[test]
    fn test_state_serializes() {
        let mut tournament = Tournament::new(unshuffled(2)).unwrap();
        tournament.start(items(4)).unwrap();
        let json = serde_json::to_value(tournament.state()).unwrap();

        assert_eq!(json["phase"], "in_progress");
        assert_eq!(json["current_round"], 1);
        assert_eq!(json["survivors"].as_array().map(|a| a.len()), Some(4));
        assert_eq!(json["paused"], false);
    }
}
