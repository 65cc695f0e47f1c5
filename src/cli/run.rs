use super::ui;
use crate::core::config::AppConfig;
use crate::pipeline::{self, PipelineReport, RunOptions, Stage, StageObserver};
use anyhow::Result;
use comfy_table::Cell;
use indicatif::ProgressBar;
use std::sync::Mutex;

/// Drives one progress bar per fan out stage.
#[derive(Default)]
struct ProgressObserver {
    bar: Mutex<Option<ProgressBar>>,
}

impl StageObserver for ProgressObserver {
    fn stage_started(&self, stage: Stage, total: usize) {
        let pb = ui::new_progress_bar(total as u64, true);
        pb.set_message(match stage {
            Stage::Profiles => "Fetching profiles...",
            Stage::Rewrites => "Rewriting descriptions...",
        });
        if let Ok(mut bar) = self.bar.lock() {
            *bar = Some(pb);
        }
    }

    fn item_done(&self) {
        if let Ok(bar) = self.bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            pb.inc(1);
        }
    }

    fn stage_finished(&self, _stage: Stage) {
        if let Ok(mut bar) = self.bar.lock()
            && let Some(pb) = bar.take()
        {
            pb.finish_and_clear();
        }
    }
}

impl PipelineReport {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Stage"), ui::header_cell("Count")]);

        let rows = [
            ("Listed instruments", self.listed, false),
            ("Candidates", self.candidates, false),
            ("Profiles merged", self.enrich.enriched, false),
            ("Profiles missing", self.enrich.missing, true),
            ("Profile failures", self.enrich.failed, true),
            ("Descriptions rewritten", self.rewrite.rewritten, false),
            ("Rewrite failures", self.rewrite.failed, true),
            ("Without description", self.rewrite.skipped, false),
        ];
        for (label, count, is_failure) in rows {
            table.add_row(vec![Cell::new(label), ui::count_cell(count, is_failure)]);
        }

        let mut output = format!(
            "Enrichment run ({})\n\n",
            ui::style_text(&self.backend.to_string(), ui::StyleType::Title)
        );
        output.push_str(&table.to_string());

        let failures = self.enrich.failed + self.rewrite.failed;
        let status = if failures == 0 {
            ui::style_text("all requests succeeded", ui::StyleType::Success)
        } else {
            ui::style_text(
                &format!("{failures} requests failed, see logs for details"),
                ui::StyleType::Error,
            )
        };
        output.push_str(&format!(
            "\n\n{}: {}\n{}",
            ui::style_text("Output", ui::StyleType::TotalLabel),
            self.output_path.display(),
            ui::style_text(&status, ui::StyleType::Subtle)
        ));
        output
    }
}

pub async fn run(config: &AppConfig, options: RunOptions) -> Result<()> {
    let observer = ProgressObserver::default();
    let report = pipeline::run(config, options, &observer).await?;
    println!("{}", report.display_as_table());
    Ok(())
}
