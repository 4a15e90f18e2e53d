use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use thiserror::Error;

use crate::ledger::{Ledger, LedgerError};
use crate::standings::StandingRow;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render plot: {0}")]
    Plot(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Console block for one round: header, bye, pairings, then results.
pub fn format_round(
    ledger: &Ledger,
    round: u32,
    total_rounds: u32,
) -> Result<String, ReportError> {
    let mut out = String::new();
    let _ = writeln!(out, "\nRound {round} of {total_rounds}:\n");

    if let Some(bye) = ledger.round_bye(round) {
        let _ = writeln!(out, "Bye Player: {}\n", ledger.player_name(bye.player)?);
    }

    for record in ledger.round_matches(round) {
        let _ = writeln!(
            out,
            "Match {}: {} vs. {}",
            record.number,
            ledger.player_name(record.player1)?,
            ledger.player_name(record.player2)?
        );
    }
    out.push('\n');

    for record in ledger.round_matches(round) {
        match record.winner() {
            Some(winner) => {
                let _ = writeln!(
                    out,
                    "Match {}: {} wins",
                    record.number,
                    ledger.player_name(winner)?
                );
            }
            None => {
                let _ = writeln!(out, "Match {}: Tie", record.number);
            }
        }
    }

    Ok(out)
}

/// Tab-separated standings table, shared rank first.
pub fn format_standings(rows: &[StandingRow]) -> String {
    let mut out = String::from("\nRank\tPID\tName\tW\tL\tT\tPoints\tOMP\n");
    for row in rows {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            row.actual_rank,
            row.id.get(),
            row.name,
            row.wins,
            row.losses,
            row.ties,
            row.points,
            row.opponent_points
        );
    }
    out
}

/// Markdown summary: final standings followed by every round's pairings.
pub fn write_markdown(
    path: impl AsRef<Path>,
    run_id: &str,
    ledger: &Ledger,
    rows: &[StandingRow],
    total_rounds: u32,
) -> Result<(), ReportError> {
    let rounds_played = ledger.history().last().map_or(0, |snapshot| snapshot.round);

    let mut doc = String::new();
    doc.push_str(&format!("# {}\n\n", ledger.name()));
    doc.push_str(&format!(
        "Run `{run_id}`: {} players, {rounds_played} of {total_rounds} rounds played, {} matches.\n\n",
        ledger.players().len(),
        ledger.matches().len()
    ));

    doc.push_str("## Final Standings\n\n");
    doc.push_str("| Rank | Player | W | L | T | Points | OMP |\n");
    doc.push_str("|------|--------|---|---|---|--------|-----|\n");
    for row in rows {
        doc.push_str(&format!(
            "| {rank} | {name} | {w} | {l} | {t} | {points} | {omp} |\n",
            rank = row.actual_rank,
            name = row.name,
            w = row.wins,
            l = row.losses,
            t = row.ties,
            points = row.points,
            omp = row.opponent_points,
        ));
    }

    for round in 1..=rounds_played {
        doc.push_str(&format!("\n## Round {round}\n\n"));
        if let Some(bye) = ledger.round_bye(round) {
            doc.push_str(&format!("Bye: {}\n\n", ledger.player_name(bye.player)?));
        }
        doc.push_str("| Match | Player 1 | Player 2 | Result |\n");
        doc.push_str("|-------|----------|----------|--------|\n");
        for record in ledger.round_matches(round) {
            let result = match record.winner() {
                Some(winner) => format!("{} wins", ledger.player_name(winner)?),
                None => "Tie".to_string(),
            };
            doc.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                record.number,
                ledger.player_name(record.player1)?,
                ledger.player_name(record.player2)?,
                result
            ));
        }
    }

    fs::write(path.as_ref(), doc).map_err(|e| ReportError::Io {
        context: "writing summary markdown",
        source: e,
    })?;
    Ok(())
}

/// Bar chart of final points in standings order; the qualifying places are
/// drawn in green.
pub fn render_points_plot(
    dir: impl AsRef<Path>,
    rows: &[StandingRow],
    qualified_places: u32,
) -> Result<PathBuf, ReportError> {
    let dir = dir.as_ref();
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir).map_err(|e| ReportError::Io {
            context: "creating plots directory",
            source: e,
        })?;
    }

    let output_path = dir.join("final_points.png");
    let rows_snapshot = rows.to_vec();

    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(|_| {}));

    let plot_attempt = std::panic::catch_unwind(move || {
        let root = BitMapBackend::new(&output_path, (800, 480)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| ReportError::Plot(e.to_string()))?;

        let rows = rows_snapshot;
        let y_max = rows
            .iter()
            .map(|row| f64::from(row.points))
            .fold(0.0f64, f64::max);
        let margin = (y_max * 0.1).max(1.0);

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .caption("Final points by standing", ("sans-serif", 22))
            .set_label_area_size(LabelAreaPosition::Left, 50)
            .set_label_area_size(LabelAreaPosition::Bottom, 60)
            .build_cartesian_2d(0..rows.len(), 0.0..(y_max + margin))
            .map_err(|e| ReportError::Plot(e.to_string()))?;

        chart
            .configure_mesh()
            .disable_mesh()
            .y_desc("Points")
            .x_desc("Player")
            .x_label_formatter(&|idx| {
                rows.get(*idx)
                    .map(|row| row.name.clone())
                    .unwrap_or_default()
            })
            .draw()
            .map_err(|e| ReportError::Plot(e.to_string()))?;

        chart
            .draw_series(rows.iter().enumerate().map(|(idx, row)| {
                let color = if row.rank <= qualified_places {
                    &GREEN
                } else {
                    &BLUE
                };
                Rectangle::new(
                    [(idx, 0.0), (idx + 1, f64::from(row.points))],
                    color.filled(),
                )
            }))
            .map_err(|e| ReportError::Plot(e.to_string()))?;

        drop(chart);

        root.present()
            .map_err(|e| ReportError::Plot(e.to_string()))?;

        drop(root);

        Ok(output_path)
    });

    std::panic::set_hook(prev_hook);

    match plot_attempt {
        Ok(result) => result,
        Err(_) => Err(ReportError::Plot(
            "plotters panicked while rendering (missing font support?)".into(),
        )),
    }
}
