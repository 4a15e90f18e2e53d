use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use swiss_core::{PairingEngine, PairingError, RoundPairing, TournamentRoundContext};
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{ResolvedOutputs, SimulationConfig};
use crate::ledger::{Ledger, LedgerError};
use crate::match_play::{MatchOutcome, MatchRecord};
use crate::report::{self, ReportError};
use crate::standings::{self, StandingRow};

/// Rounds needed for the standings to settle the qualifying places:
/// `ceil((players + 7 * qualified_places) / 5)`.
pub fn total_round_count(players: usize, qualified_places: u32) -> u32 {
    let weighted = players as u64 + 7 * u64::from(qualified_places);
    weighted.div_ceil(5) as u32
}

/// Primary entry point for simulating a tournament.
pub struct TournamentRunner {
    config: SimulationConfig,
    outputs: ResolvedOutputs,
    roster: Ledger,
    total_rounds: u32,
    console: bool,
    logging_enabled: bool,
}

/// Summary details returned after a run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub players: usize,
    pub total_rounds: u32,
    pub rounds_played: u32,
    pub matches_played: usize,
    pub byes: usize,
    /// Round that could not be paired when the run stopped early.
    pub exhausted_round: Option<u32>,
    pub rows_written: usize,
    pub final_standings: Vec<StandingRow>,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub context_path: PathBuf,
    pub plot_path: Option<PathBuf>,
    pub telemetry_path: Option<PathBuf>,
}

/// One JSONL row per played match.
#[derive(Debug, Serialize)]
struct MatchLogRow<'a> {
    run_id: &'a str,
    tournament: &'a str,
    round: u32,
    match_number: u32,
    player1_id: u32,
    player1: &'a str,
    player2_id: u32,
    player2: &'a str,
    outcome: MatchOutcome,
    winner: Option<&'a str>,
}

impl TournamentRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: SimulationConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let roster = Ledger::with_players(
            config.tournament.name.clone(),
            config.players.iter().cloned(),
        )?;

        if roster.players().len() > config.pairing.max_players {
            return Err(RunnerError::Pairing(PairingError::FieldTooLarge {
                players: roster.players().len(),
                limit: config.pairing.max_players,
            }));
        }

        Ok(Self {
            total_rounds: config.total_rounds(),
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
            roster,
            console: false,
        })
    }

    /// Echo each round and the standings after it to stdout.
    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    /// Play every round, streaming JSONL rows to disk, then write the
    /// summary, chart and final round context.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;
        ensure_parent(self.outputs.context_json.parent())?;
        if !self.outputs.plots_dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.outputs.plots_dir)?;
        }

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);

        // Pairing and outcomes draw from separate streams so one never
        // shifts the other.
        let mut seeder = StdRng::seed_from_u64(self.config.tournament.seed.unwrap_or(0));
        let mut engine = PairingEngine::new(
            self.config.pairing,
            StdRng::seed_from_u64(seeder.next_u64()),
        );
        let mut outcome_rng = StdRng::seed_from_u64(seeder.next_u64());

        let mut ledger = self.roster.clone();
        ledger.start();
        if self.console {
            println!("{}", ledger.name());
        }

        let mut ctx =
            TournamentRoundContext::new(ledger.player_ids(), self.total_rounds).begin()?;
        let mut rows_written = 0usize;
        let mut exhausted_round = None;

        while let Some(round) = ctx.phase().round_number() {
            let pairing = match engine.pair_round(&ctx) {
                Ok(pairing) => pairing,
                Err(err @ PairingError::PairingExhausted { .. })
                    if self.config.tournament.stop_when_exhausted =>
                {
                    event!(
                        target: "swiss_sim::round",
                        Level::WARN,
                        run_id = %self.config.run_id,
                        round,
                        error = %err,
                        "stopping early: round cannot be paired"
                    );
                    exhausted_round = Some(round);
                    break;
                }
                Err(err) => return Err(err.into()),
            };

            rows_written += self.play_round(
                &mut writer,
                &mut ledger,
                &ctx,
                &pairing,
                &mut outcome_rng,
            )?;

            let rows = standings::compute(&ledger, &self.config.scoring);
            ctx = ctx
                .record_round(&pairing)?
                .with_standings(standings::to_engine_standings(&rows));

            if self.console {
                print!("{}", report::format_round(&ledger, round, self.total_rounds)?);
                print!("{}", report::format_standings(&rows));
            }

            if self.logging_enabled && tracing::enabled!(Level::INFO) {
                let leader = rows.first().map(|row| row.name.as_str()).unwrap_or("");
                event!(
                    target: "swiss_sim::standings",
                    Level::INFO,
                    run_id = %self.config.run_id,
                    round,
                    leader,
                    leader_points = rows.first().map_or(0, |row| row.points)
                );
            }

            ledger.record_standings(round, rows);
        }

        writer.flush()?;

        let final_standings = match ledger.latest_standings() {
            Some(snapshot) => snapshot.rows.clone(),
            None => standings::compute(&ledger, &self.config.scoring),
        };

        report::write_markdown(
            &self.outputs.summary_md,
            &self.config.run_id,
            &ledger,
            &final_standings,
            self.total_rounds,
        )?;
        let plot_path = match report::render_points_plot(
            &self.outputs.plots_dir,
            &final_standings,
            self.config.tournament.qualified_places,
        ) {
            Ok(path) => Some(path),
            Err(err) => {
                eprintln!("WARN: {}", err);
                None
            }
        };

        fs::write(&self.outputs.context_json, ctx.to_json()?)?;

        let telemetry_path = if self.logging_enabled {
            self.outputs
                .summary_md
                .parent()
                .map(|dir| dir.join("telemetry.jsonl"))
        } else {
            None
        };

        Ok(RunSummary {
            players: ledger.players().len(),
            total_rounds: self.total_rounds,
            rounds_played: ledger.history().len() as u32,
            matches_played: ledger.matches().len(),
            byes: ledger.byes().len(),
            exhausted_round,
            rows_written,
            final_standings,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            context_path: self.outputs.context_json.clone(),
            plot_path,
            telemetry_path,
        })
    }

    fn play_round(
        &self,
        writer: &mut BufWriter<File>,
        ledger: &mut Ledger,
        ctx: &TournamentRoundContext,
        pairing: &RoundPairing,
        rng: &mut StdRng,
    ) -> Result<usize, RunnerError> {
        let round = pairing.round;
        if let Some(bye) = pairing.bye {
            ledger.record_bye(round, bye, ctx.standings().rank(bye))?;
        }

        let mut rows_written = 0usize;
        for (index, pair) in pairing.pairs.iter().enumerate() {
            let record = MatchRecord::play(
                round,
                index as u32 + 1,
                *pair,
                rng,
                &self.config.outcomes,
            );
            ledger.record_match(record)?;

            let winner = record
                .winner()
                .map(|player| ledger.player_name(player))
                .transpose()?;
            let row = MatchLogRow {
                run_id: &self.config.run_id,
                tournament: ledger.name(),
                round,
                match_number: record.number,
                player1_id: record.player1.get(),
                player1: ledger.player_name(record.player1)?,
                player2_id: record.player2.get(),
                player2: ledger.player_name(record.player2)?,
                outcome: record.outcome,
                winner,
            };

            serde_json::to_writer(&mut *writer, &row)?;
            writer.write_all(b"\n")?;
            rows_written += 1;
        }

        Ok(rows_written)
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("pairing failed: {0}")]
    Pairing(#[from] PairingError),
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("report error: {0}")]
    Report(#[from] ReportError),
}
