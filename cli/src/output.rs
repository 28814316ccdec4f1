//! File sink: one JSON report and two CSV tables per source, plus a pooled
//! summary when several sources are analysed together.

use anyhow::{Context, Result};
use rdi_core::linker::FrameReport;
use rdi_core::metrics::{RunSummary, TransitRecord};
use rdi_core::pipeline::AnalysisOutput;
use rdi_core::sink::{sheet_label, ResultSink};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// File stem of the pooled report.
const POOLED_LABEL: &str = "summary";

#[derive(Serialize)]
struct SourceReport<'a> {
    source: &'a str,
    label: &'a str,
    summary: &'a RunSummary,
    records: &'a [TransitRecord],
    frame_reports: &'a [FrameReport],
}

#[derive(Serialize)]
struct PooledReport<'a> {
    sources: Vec<LabelledSummary<'a>>,
    combined: RunSummary,
}

#[derive(Serialize)]
struct LabelledSummary<'a> {
    label: &'a str,
    #[serde(flatten)]
    summary: &'a RunSummary,
}

/// Writes `<label>.json`, `<label>_records.csv` and
/// `<label>_trajectories.csv` into `dir`.
pub struct JsonDirSink {
    dir: PathBuf,
    pooled: bool,
    labels: HashSet<String>,
    summaries: Vec<(String, RunSummary)>,
    records: Vec<TransitRecord>,
}

impl JsonDirSink {
    /// With `pooled`, [`ResultSink::finish`] also writes `summary.json`
    /// covering every source; no source is then labelled `summary`.
    pub fn create(dir: &Path, pooled: bool) -> Result<Self> {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let mut labels = HashSet::new();
        if pooled {
            labels.insert(POOLED_LABEL.to_string());
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            pooled,
            labels,
            summaries: Vec::new(),
            records: Vec::new(),
        })
    }

    /// Truncated label, suffixed when two sources truncate alike.
    fn unique_label(&mut self, source: &str) -> String {
        let base = sheet_label(source);
        let mut label = base.clone();
        let mut n = 1;
        while self.labels.contains(&label) {
            label = format!("{base}_{n}");
            n += 1;
        }
        self.labels.insert(label.clone());
        label
    }
}

impl ResultSink for JsonDirSink {
    type Error = anyhow::Error;

    fn write(&mut self, source: &str, output: &AnalysisOutput) -> Result<()> {
        let label = self.unique_label(source);

        let report = SourceReport {
            source,
            label: &label,
            summary: &output.summary,
            records: &output.records,
            frame_reports: &output.frame_reports,
        };
        let json_path = self.dir.join(format!("{label}.json"));
        std::fs::write(&json_path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("writing {}", json_path.display()))?;

        write_csv(&self.dir.join(format!("{label}_records.csv")), &output.records)?;
        write_csv(
            &self.dir.join(format!("{label}_trajectories.csv")),
            &output.accepted_rows(),
        )?;

        self.summaries.push((label, output.summary.clone()));
        self.records.extend(output.records.iter().cloned());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if !self.pooled {
            return Ok(());
        }
        let summaries: Vec<RunSummary> = self.summaries.iter().map(|(_, s)| s.clone()).collect();
        let report = PooledReport {
            sources: self
                .summaries
                .iter()
                .map(|(label, summary)| LabelledSummary { label, summary })
                .collect(),
            combined: RunSummary::combine(&summaries, &self.records),
        };
        let path = self.dir.join(format!("{POOLED_LABEL}.json"));
        std::fs::write(&path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

/// One header row, then one row per item.
fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
