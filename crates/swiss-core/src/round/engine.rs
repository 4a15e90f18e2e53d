use rand::Rng;
use rand::seq::{IteratorRandom, SliceRandom};
use serde::{Deserialize, Serialize};
use tracing::{Level, event};

use crate::model::player::PlayerId;
use crate::model::standings::Standings;
use crate::pairing::{
    FilterStats, PairingError, TieBreak, filter_bye, filter_repeats, normalize,
    padded_matchings, select_best,
};
use crate::round::{RoundPairing, TournamentRoundContext};

const DEFAULT_MAX_PLAYERS: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Largest field the engine will enumerate; 14 players is 135,135
    /// combinations, 16 is just over two million.
    #[serde(default = "default_max_players")]
    pub max_players: usize,
    #[serde(default)]
    pub tie_break: TieBreak,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_players: DEFAULT_MAX_PLAYERS,
            tie_break: TieBreak::default(),
        }
    }
}

fn default_max_players() -> usize {
    DEFAULT_MAX_PLAYERS
}

/// Pairs one round at a time from a [`TournamentRoundContext`].
///
/// All randomness (first-round bye, first-round combination) comes from the
/// injected generator, so a seeded generator reproduces a run exactly.
#[derive(Debug, Clone)]
pub struct PairingEngine<R> {
    config: EngineConfig,
    rng: R,
}

impl<R: Rng> PairingEngine<R> {
    pub fn new(config: EngineConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pair_round(
        &mut self,
        ctx: &TournamentRoundContext,
    ) -> Result<RoundPairing, PairingError> {
        let round = ctx.phase().round_number().ok_or_else(|| {
            PairingError::invalid(format!("no round to pair in phase {:?}", ctx.phase()))
        })?;

        let players = ctx.players();
        if players.is_empty() {
            return Err(PairingError::invalid(format!(
                "round {round} has no registered players"
            )));
        }
        if players.len() > self.config.max_players {
            return Err(PairingError::FieldTooLarge {
                players: players.len(),
                limit: self.config.max_players,
            });
        }

        let bye = if players.len() % 2 == 0 {
            None
        } else if round == 1 {
            players.choose(&mut self.rng).copied()
        } else {
            Some(ranked_bye(ctx)?)
        };

        let pairing = if round == 1 {
            self.pair_first_round(players, bye)?
        } else {
            self.pair_ranked_round(ctx, round, bye)?
        };

        event!(
            target: "swiss_core::round",
            Level::INFO,
            round,
            players = players.len() as u32,
            bye = ?pairing.bye,
            matches = pairing.pairs.len() as u32,
            score = ?pairing.score,
            generated = pairing.stats.generated,
            after_bye = pairing.stats.after_bye,
            after_repeat = pairing.stats.after_repeat
        );

        Ok(pairing)
    }

    fn pair_first_round(
        &mut self,
        players: &[PlayerId],
        bye: Option<PlayerId>,
    ) -> Result<RoundPairing, PairingError> {
        let mut generated = 0u64;
        let mut after_bye = 0u64;
        let chosen = filter_bye(padded_matchings(players)?.inspect(|_| generated += 1), bye)
            .inspect(|_| after_bye += 1)
            .choose(&mut self.rng);

        let stats = FilterStats {
            generated,
            after_bye,
            after_repeat: after_bye,
        };
        let combination = chosen.ok_or_else(|| PairingError::PairingExhausted {
            round: 1,
            players: players.to_vec(),
            bye,
            stats,
        })?;

        Ok(RoundPairing {
            round: 1,
            pairs: combination.into_pairs(),
            bye,
            score: None,
            stats,
        })
    }

    fn pair_ranked_round(
        &mut self,
        ctx: &TournamentRoundContext,
        round: u32,
        bye: Option<PlayerId>,
    ) -> Result<RoundPairing, PairingError> {
        let played = ctx.played_pairs();
        let standings = ctx.standings();

        let mut generated = 0u64;
        let mut after_bye = 0u64;
        let mut after_repeat = 0u64;
        let without_bye =
            filter_bye(padded_matchings(ctx.players())?.inspect(|_| generated += 1), bye)
                .inspect(|_| after_bye += 1);
        let candidates = filter_repeats(without_bye, played).inspect(|_| after_repeat += 1);
        let best = select_best(candidates, standings, self.config.tie_break);

        let stats = FilterStats {
            generated,
            after_bye,
            after_repeat,
        };
        let Some(best) = best else {
            event!(
                target: "swiss_core::round",
                Level::ERROR,
                round,
                players = ?ctx.players(),
                bye = ?bye,
                played_pairs = played.len() as u32,
                generated,
                after_bye,
                after_repeat,
                "pairing exhausted"
            );
            return Err(PairingError::PairingExhausted {
                round,
                players: ctx.players().to_vec(),
                bye,
                stats,
            });
        };

        let ordered = normalize(&best.combination, standings);
        Ok(RoundPairing {
            round,
            pairs: ordered.into_pairs(),
            bye,
            score: Some(best.score),
            stats,
        })
    }
}

/// Bye for rounds after the first: best-ranked registered player who has not
/// had one yet.
fn ranked_bye(ctx: &TournamentRoundContext) -> Result<PlayerId, PairingError> {
    let registered = Standings::new(
        ctx.standings()
            .entries()
            .iter()
            .filter(|entry| ctx.players().contains(&entry.id))
            .copied(),
    );
    registered
        .bye_candidate(ctx.bye_history())
        .ok_or_else(|| PairingError::invalid("no ranked player is available for the bye"))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::model::player::{Pair, PlayerRef};
    use crate::round::RoundPhase;

    fn id(raw: u32) -> PlayerId {
        PlayerId::new(raw)
    }

    fn engine(seed: u64) -> PairingEngine<StdRng> {
        PairingEngine::new(EngineConfig::default(), StdRng::seed_from_u64(seed))
    }

    fn started(count: u32, rounds: u32) -> TournamentRoundContext {
        TournamentRoundContext::new((1..=count).map(PlayerId::new).collect(), rounds)
            .begin()
            .unwrap()
    }

    #[test]
    fn not_started_context_is_rejected() {
        let ctx = TournamentRoundContext::new(vec![id(1), id(2)], 1);
        assert!(matches!(
            engine(1).pair_round(&ctx),
            Err(PairingError::InvalidInput { .. })
        ));
    }

    #[test]
    fn empty_roster_is_rejected() {
        let ctx = TournamentRoundContext::new(Vec::new(), 1).begin().unwrap();
        assert!(matches!(
            engine(1).pair_round(&ctx),
            Err(PairingError::InvalidInput { .. })
        ));
    }

    #[test]
    fn oversized_field_is_rejected_before_generation() {
        let config = EngineConfig {
            max_players: 4,
            ..EngineConfig::default()
        };
        let mut engine = PairingEngine::new(config, StdRng::seed_from_u64(3));
        let err = engine.pair_round(&started(6, 1)).unwrap_err();
        assert_eq!(err, PairingError::FieldTooLarge { players: 6, limit: 4 });
    }

    #[test]
    fn first_round_is_reproducible_with_same_seed() {
        let ctx = started(7, 3);
        let first = engine(99).pair_round(&ctx).unwrap();
        let second = engine(99).pair_round(&ctx).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.pairs.len(), 3);
        assert!(first.bye.is_some());
        assert_eq!(first.stats.generated, 105);
        assert_eq!(first.stats.after_bye, 15);
        assert_eq!(first.score, None);
    }

    #[test]
    fn single_player_gets_a_bye_and_no_matches() {
        let pairing = engine(5).pair_round(&started(1, 1)).unwrap();
        assert_eq!(pairing.bye, Some(id(1)));
        assert!(pairing.pairs.is_empty());
    }

    #[test]
    fn later_round_bye_goes_to_top_player_without_one() {
        let ctx = started(5, 3)
            .record_round(&RoundPairing {
                round: 1,
                pairs: vec![Pair::new(id(1), id(2)), Pair::new(id(3), id(4))],
                bye: Some(id(5)),
                score: None,
                stats: FilterStats::default(),
            })
            .unwrap()
            .with_standings(Standings::from_order(&[id(5), id(1), id(3), id(2), id(4)]));

        let pairing = engine(1).pair_round(&ctx).unwrap();
        assert_eq!(pairing.round, 2);
        assert_eq!(pairing.bye, Some(id(1)));
        assert_eq!(
            pairing.pairs,
            vec![Pair::new(id(5), id(3)), Pair::new(id(2), id(4))]
        );
    }

    #[test]
    fn stage_counts_match_the_filter_adapters() {
        let ctx = started(7, 3)
            .record_round(&RoundPairing {
                round: 1,
                pairs: vec![
                    Pair::new(id(1), id(2)),
                    Pair::new(id(3), id(4)),
                    Pair::new(id(5), id(6)),
                ],
                bye: Some(id(7)),
                score: None,
                stats: FilterStats::default(),
            })
            .unwrap()
            .with_standings(Standings::from_order(&[
                id(7),
                id(1),
                id(3),
                id(5),
                id(2),
                id(4),
                id(6),
            ]));

        let pairing = engine(3).pair_round(&ctx).unwrap();
        let bye = pairing.bye;
        assert_eq!(bye, Some(id(1)));

        let ids = ctx.players();
        let after_bye = filter_bye(padded_matchings(ids).unwrap(), bye).count() as u64;
        let after_repeat = filter_repeats(
            filter_bye(padded_matchings(ids).unwrap(), bye),
            ctx.played_pairs(),
        )
        .count() as u64;

        assert_eq!(pairing.stats.generated, 105);
        assert_eq!(pairing.stats.after_bye, after_bye);
        assert_eq!(pairing.stats.after_repeat, after_repeat);
        assert!(after_repeat < after_bye);
        assert!(
            pairing
                .pairs
                .iter()
                .all(|pair| !ctx.played_pairs().contains_pair(*pair))
        );
    }

    #[test]
    fn exhausted_round_reports_context() {
        let ctx = started(2, 2)
            .record_round(&RoundPairing {
                round: 1,
                pairs: vec![Pair::new(id(1), id(2))],
                bye: None,
                score: None,
                stats: FilterStats::default(),
            })
            .unwrap()
            .with_standings(Standings::from_order(&[id(1), id(2)]));
        assert_eq!(ctx.phase(), RoundPhase::SubsequentRound(2));

        let err = engine(1).pair_round(&ctx).unwrap_err();
        assert_eq!(
            err,
            PairingError::PairingExhausted {
                round: 2,
                players: vec![id(1), id(2)],
                bye: None,
                stats: FilterStats {
                    generated: 1,
                    after_bye: 1,
                    after_repeat: 0,
                },
            }
        );
    }

    #[test]
    fn bye_requires_ranked_players() {
        let ctx = started(3, 2)
            .record_round(&RoundPairing {
                round: 1,
                pairs: vec![Pair::new(id(1), id(2))],
                bye: Some(id(3)),
                score: None,
                stats: FilterStats::default(),
            })
            .unwrap()
            .with_standings(Standings::new([PlayerRef::new(id(42), 1)]));
        assert!(matches!(
            engine(1).pair_round(&ctx),
            Err(PairingError::InvalidInput { .. })
        ));
    }
}
