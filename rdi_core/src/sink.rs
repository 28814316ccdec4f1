//! Result sinks: the boundary between the core and reporting.
//!
//! A sink receives the finished [`AnalysisOutput`] of one source (one video's
//! detection log). Persistence, plotting and frame labelling live in sink
//! implementations outside the core.

use crate::pipeline::AnalysisOutput;
use std::convert::Infallible;

/// Longest label kept from a source name (spreadsheet sheet-name limit).
pub const MAX_LABEL_LEN: usize = 20;

/// Short label for a source: file stem without extension, truncated to
/// [`MAX_LABEL_LEN`] characters.
pub fn sheet_label(source: &str) -> String {
    let name = source.rsplit(['/', '\\']).next().unwrap_or(source);
    let stem = match name.split_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    };
    stem.chars().take(MAX_LABEL_LEN).collect()
}

/// Consumer of analysis results.
pub trait ResultSink {
    type Error;

    /// Receive the results for `source`.
    fn write(&mut self, source: &str, output: &AnalysisOutput) -> Result<(), Self::Error>;

    /// Called once after the last source.
    fn finish(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Keeps every output in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub outputs: Vec<(String, AnalysisOutput)>,
}

impl MemorySink {
    pub fn get(&self, source: &str) -> Option<&AnalysisOutput> {
        self.outputs
            .iter()
            .find(|(s, _)| s == source)
            .map(|(_, out)| out)
    }
}

impl ResultSink for MemorySink {
    type Error = Infallible;

    fn write(&mut self, source: &str, output: &AnalysisOutput) -> Result<(), Self::Error> {
        self.outputs.push((source.to_string(), output.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_strips_directory_and_extension() {
        assert_eq!(sheet_label("runs/day1/sample_a.json"), "sample_a");
        assert_eq!(sheet_label("C:\\data\\b.avi"), "b");
        assert_eq!(sheet_label("plain"), "plain");
    }

    #[test]
    fn label_truncates_long_names() {
        let label = sheet_label("patient_0042_channel_3_run_7_cropped.json");
        assert_eq!(label.chars().count(), MAX_LABEL_LEN);
        assert_eq!(label, "patient_0042_channel");
    }

    #[test]
    fn memory_sink_collects_by_source() {
        let mut sink = MemorySink::default();
        sink.write("a", &AnalysisOutput::default()).unwrap();
        sink.write("b", &AnalysisOutput::default()).unwrap();
        sink.finish().unwrap();
        assert_eq!(sink.outputs.len(), 2);
        assert!(sink.get("b").is_some());
        assert!(sink.get("c").is_none());
    }
}
