use std::collections::HashSet;
use std::fs;
use std::path::Path;

use swiss_core::{PairingError, TournamentRoundContext};
use swiss_sim::config::SimulationConfig;
use swiss_sim::tournament::{RunnerError, TournamentRunner};
use tempfile::tempdir;

fn load_config(output_dir: &Path, players: &[&str], extra: &str) -> SimulationConfig {
    let roster = players
        .iter()
        .map(|name| format!("  - \"{name}\"\n"))
        .collect::<String>();
    let yaml = format!(
        r#"
run_id: "test_smoke"
tournament:
  name: "Smoke Open"
  seed: 4242
{extra}players:
{roster}outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
  plots_dir: "{plots}"
logging:
  enable_structured: false
"#,
        jsonl = output_dir.join("matches.jsonl").display(),
        summary = output_dir.join("summary.md").display(),
        plots = output_dir.join("plots").display()
    );

    let mut cfg: SimulationConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

const SEVEN: [&str; 7] = [
    "Ross S", "Hill L", "Marc V", "Ross B", "Andy R", "Peter R", "Dave G",
];

#[test]
fn odd_field_plays_every_round_without_rematches() {
    let dir = tempdir().expect("temp dir");
    let config = load_config(dir.path(), &SEVEN, "  rounds: 3\n");
    let outputs = config.resolved_outputs();

    let runner = TournamentRunner::new(config, outputs).expect("runner created");
    assert_eq!(runner.total_rounds(), 3);
    let summary = runner.run().expect("tournament completes");

    assert_eq!(summary.players, 7);
    assert_eq!(summary.rounds_played, 3);
    assert_eq!(summary.matches_played, 9);
    assert_eq!(summary.byes, 3);
    assert_eq!(summary.rows_written, 9);
    assert_eq!(summary.exhausted_round, None);
    assert_eq!(summary.final_standings.len(), 7);

    let jsonl = fs::read_to_string(&summary.jsonl_path).expect("jsonl readable");
    assert_eq!(jsonl.lines().count(), summary.matches_played);

    let mut seen = HashSet::new();
    for line in jsonl.lines() {
        let row: serde_json::Value = serde_json::from_str(line).expect("row decodes to JSON");
        assert_eq!(row["run_id"], "test_smoke");
        let a = row["player1_id"].as_u64().expect("player1 id");
        let b = row["player2_id"].as_u64().expect("player2 id");
        assert_ne!(a, b);
        assert!(seen.insert((a.min(b), a.max(b))), "rematch between {a} and {b}");
    }

    let context = fs::read_to_string(&summary.context_path).expect("context written");
    let ctx = TournamentRoundContext::from_json(&context).expect("context decodes");
    assert!(ctx.is_done());
    assert_eq!(ctx.played_pairs().len(), 9);
    let byes: HashSet<_> = ctx.bye_history().iter().copied().collect();
    assert_eq!(byes.len(), 3, "a player received a second bye");

    assert!(summary.summary_path.exists(), "summary markdown missing");
    let markdown = fs::read_to_string(&summary.summary_path).expect("summary readable");
    assert!(markdown.contains("3 of 3 rounds played, 9 matches"));
    // Plot rendering is optional; ensure any failure surfaces explicitly
    if let Some(plot_path) = summary.plot_path {
        assert!(plot_path.exists(), "plot path reported but missing on disk");
    }
}

#[test]
fn fixed_seed_reproduces_output() {
    let first_dir = tempdir().expect("temp dir");
    let second_dir = tempdir().expect("temp dir");

    let run = |dir: &Path| {
        let config = load_config(dir, &SEVEN, "  rounds: 3\n");
        let outputs = config.resolved_outputs();
        let summary = TournamentRunner::new(config, outputs)
            .expect("runner created")
            .run()
            .expect("tournament completes");
        fs::read_to_string(summary.jsonl_path).expect("jsonl readable")
    };

    assert_eq!(run(first_dir.path()), run(second_dir.path()));
}

#[test]
fn exhausted_field_stops_early_when_allowed() {
    let dir = tempdir().expect("temp dir");
    let config = load_config(
        dir.path(),
        &["A", "B", "C", "D"],
        "  rounds: 5\n  stop_when_exhausted: true\n",
    );
    let outputs = config.resolved_outputs();

    let summary = TournamentRunner::new(config, outputs)
        .expect("runner created")
        .run()
        .expect("stops cleanly");

    // Four players have exactly three disjoint pairings.
    assert_eq!(summary.rounds_played, 3);
    assert_eq!(summary.matches_played, 6);
    assert_eq!(summary.exhausted_round, Some(4));
    assert!(summary.summary_path.exists());
}

#[test]
fn exhausted_field_fails_by_default() {
    let dir = tempdir().expect("temp dir");
    let config = load_config(dir.path(), &["A", "B", "C", "D"], "  rounds: 5\n");
    let outputs = config.resolved_outputs();

    let err = TournamentRunner::new(config, outputs)
        .expect("runner created")
        .run()
        .expect_err("fourth round cannot be paired");
    match err {
        RunnerError::Pairing(PairingError::PairingExhausted { round, players, .. }) => {
            assert_eq!(round, 4);
            let ids: Vec<u32> = players.iter().map(|player| player.get()).collect();
            assert_eq!(ids, vec![1, 2, 3, 4]);
        }
        other => panic!("unexpected error: {other}"),
    }
}
