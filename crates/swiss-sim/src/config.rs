use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use swiss_core::EngineConfig;
use thiserror::Error;
use tracing::Level;

use crate::tournament::total_round_count;

const DEFAULT_QUALIFIED_PLACES: u32 = 3;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root simulation configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SimulationConfig {
    pub run_id: String,
    pub tournament: TournamentConfig,
    pub players: Vec<String>,
    #[serde(default)]
    pub pairing: EngineConfig,
    #[serde(default)]
    pub outcomes: OutcomeConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: SimulationConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.tournament.validate()?;
        validate_players(&mut self.players)?;
        validate_pairing(&self.pairing, self.players.len())?;
        self.outcomes.validate()?;
        self.scoring.validate()?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        Ok(())
    }

    /// Rounds to play: the explicit override, or the policy derived from
    /// field size and qualified places.
    pub fn total_rounds(&self) -> u32 {
        self.tournament.rounds.unwrap_or_else(|| {
            total_round_count(self.players.len(), self.tournament.qualified_places)
        })
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        let summary_md = resolve_template(&self.run_id, &self.outputs.summary_md);
        let context_json = summary_md
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
            .join("context.json");
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md,
            plots_dir: resolve_template(&self.run_id, &self.outputs.plots_dir),
            context_json,
        }
    }
}

/// Tournament identity and round policy.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TournamentConfig {
    pub name: String,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_qualified_places")]
    pub qualified_places: u32,
    #[serde(default)]
    pub rounds: Option<u32>,
    /// End the event early instead of failing when a round cannot be paired.
    #[serde(default)]
    pub stop_when_exhausted: bool,
}

impl TournamentConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "tournament.name".to_string(),
                message: "tournament name must not be empty".to_string(),
            });
        }

        if self.rounds == Some(0) {
            return Err(ValidationError::InvalidField {
                field: "tournament.rounds".to_string(),
                message: "round override must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

fn default_qualified_places() -> u32 {
    DEFAULT_QUALIFIED_PLACES
}

/// Probabilities of the match outcome draw; a tie takes the remainder.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct OutcomeConfig {
    #[serde(default = "default_side_win")]
    pub player1_win: f64,
    #[serde(default = "default_side_win")]
    pub player2_win: f64,
}

impl Default for OutcomeConfig {
    fn default() -> Self {
        Self {
            player1_win: default_side_win(),
            player2_win: default_side_win(),
        }
    }
}

impl OutcomeConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outcomes.player1_win", self.player1_win),
            ("outcomes.player2_win", self.player2_win),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: format!("probability {value} must lie in [0, 1]"),
                });
            }
        }

        if self.player1_win + self.player2_win > 1.0 {
            return Err(ValidationError::InvalidField {
                field: "outcomes".to_string(),
                message: "win probabilities must not sum to more than 1".to_string(),
            });
        }

        Ok(())
    }
}

fn default_side_win() -> f64 {
    0.45
}

/// Points credited per match result.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct ScoringConfig {
    #[serde(default = "default_win_points")]
    pub win: u32,
    #[serde(default = "default_tie_points")]
    pub tie: u32,
    #[serde(default)]
    pub loss: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            win: default_win_points(),
            tie: default_tie_points(),
            loss: 0,
        }
    }
}

impl ScoringConfig {
    /// Largest number of points a single match may award.
    pub const MAX_POINTS: u32 = 1_000;

    fn validate(&self) -> Result<(), ValidationError> {
        if self.win > Self::MAX_POINTS {
            return Err(ValidationError::InvalidField {
                field: "scoring.win".to_string(),
                message: format!(
                    "{} points per match exceeds the limit of {}",
                    self.win,
                    Self::MAX_POINTS
                ),
            });
        }
        if !(self.win >= self.tie && self.tie >= self.loss) || self.win == self.loss {
            return Err(ValidationError::InvalidField {
                field: "scoring".to_string(),
                message: format!(
                    "expected win > loss and win >= tie >= loss, got {}/{}/{}",
                    self.win, self.tie, self.loss
                ),
            });
        }
        Ok(())
    }
}

fn default_win_points() -> u32 {
    3
}

fn default_tie_points() -> u32 {
    1
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
    pub plots_dir: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
            ("outputs.plots_dir", &self.plots_dir),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn validate_players(players: &mut [String]) -> Result<(), ValidationError> {
    if players.is_empty() {
        return Err(ValidationError::InvalidField {
            field: "players".to_string(),
            message: "at least one player must be registered".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for (index, player) in players.iter_mut().enumerate() {
        let trimmed = player.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidField {
                field: format!("players[{index}]"),
                message: "player name must not be empty".to_string(),
            });
        }
        if trimmed.len() != player.len() {
            *player = trimmed.to_string();
        }

        if !seen.insert(player.clone()) {
            return Err(ValidationError::InvalidField {
                field: "players".to_string(),
                message: format!("player '{player}' registered more than once"),
            });
        }
    }

    Ok(())
}

fn validate_pairing(pairing: &EngineConfig, players: usize) -> Result<(), ValidationError> {
    if pairing.max_players == 0 {
        return Err(ValidationError::InvalidField {
            field: "pairing.max_players".to_string(),
            message: "max_players must be at least 1".to_string(),
        });
    }

    if players > pairing.max_players {
        return Err(ValidationError::InvalidField {
            field: "players".to_string(),
            message: format!(
                "{players} players exceeds pairing.max_players ({})",
                pairing.max_players
            ),
        });
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
    pub plots_dir: PathBuf,
    /// Final round context, written next to the summary.
    pub context_json: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
