//! コンソールへの進捗表示

use colored::Colorize;
use snapshare_cloud::{RunReport, ShareRequest, Stage, StageObserver, StageOutcome};

/// 各段階の開始・終了を標準出力に表示する
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }

    /// 実行結果のまとめを表示
    pub fn print_summary(&self, request: &ShareRequest, report: &RunReport) {
        println!();
        for line in summary_lines(request, report) {
            println!("{}", line);
        }
    }
}

impl StageObserver for ConsoleReporter {
    fn stage_started(&self, _stage: Stage, detail: &str) {
        println!("{} {}", "▶".cyan(), detail);
    }

    fn waiting_for(&self, _stage: Stage, snapshot_id: &str) {
        println!(
            "  {} Waiting for snapshot {} to be available",
            "…".dimmed(),
            snapshot_id.bold()
        );
    }

    fn stage_finished(&self, stage: Stage, outcome: &StageOutcome) {
        if let Some(line) = finish_line(stage, outcome) {
            println!("{}", line);
        }
    }
}

pub(crate) fn finish_line(stage: Stage, outcome: &StageOutcome) -> Option<String> {
    let line = match outcome {
        StageOutcome::NotAttempted => return None,
        StageOutcome::Completed { id, elapsed } => format!(
            "{} {} {} ({:.2} s)",
            "✓".green(),
            stage,
            id,
            elapsed.as_secs_f64()
        ),
        StageOutcome::Failed { error, elapsed } => format!(
            "{} {} failed after {:.2} s: {}",
            "✗".red(),
            stage,
            elapsed.as_secs_f64(),
            error
        ),
        StageOutcome::TimedOut { attempts, elapsed } => format!(
            "{} {} timed out after {} attempts ({:.2} s)",
            "✗".red(),
            stage,
            attempts,
            elapsed.as_secs_f64()
        ),
    };
    Some(line)
}

pub(crate) fn summary_lines(request: &ShareRequest, report: &RunReport) -> Vec<String> {
    let mut lines = Vec::new();

    if report.is_aborted() {
        let failed = [Stage::Create, Stage::Copy]
            .into_iter()
            .find(|stage| !report.outcome(*stage).is_completed())
            .unwrap_or(Stage::Create);
        lines.push(format!(
            "{} {} did not complete; nothing was shared",
            "Aborted:".red().bold(),
            failed
        ));
        for snapshot_id in &report.left_in_place {
            lines.push(format!("  snapshot {} was left in place", snapshot_id));
        }
        return lines;
    }

    match (&report.share, report.copy.id()) {
        (StageOutcome::Completed { id, .. }, _) => lines.push(format!(
            "{} Snapshot {} shared to {}",
            "Done:".green().bold(),
            id,
            request.destination_account_id
        )),
        (_, Some(copy_id)) => lines.push(format!(
            "{} Snapshot {} was created but sharing to {} failed",
            "Done with warnings:".yellow().bold(),
            copy_id,
            request.destination_account_id
        )),
        (_, None) => {}
    }
    lines
}
