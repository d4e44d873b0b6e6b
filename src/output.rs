//! CLI output formatting.
//!
//! Turns pipeline events and reports into printed lines. Pure string
//! functions so formatting is unit testable; `main` owns the actual
//! printing.

use crate::pipeline::{BatchEvent, BatchReport, CropReport};

/// Human-readable byte count, binary units.
pub fn format_bytes(bytes: usize) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// One line per interesting batch event; `Started` stays quiet so parallel
/// output doesn't interleave noise.
pub fn format_batch_event(event: &BatchEvent) -> Option<String> {
    match event {
        BatchEvent::Started { .. } => None,
        BatchEvent::Finished(report) => Some(format!(
            "  {} → {} ({}, q{:.1}{})",
            report.source,
            report.output,
            format_bytes(report.bytes),
            report.quality,
            if report.within_budget {
                ""
            } else {
                ", over budget"
            }
        )),
        BatchEvent::Failed { source, message } => {
            Some(format!("  {} FAILED: {}", source.display(), message))
        }
    }
}

/// Summary lines for a single `crop` invocation.
pub fn format_crop_summary(report: &CropReport) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Cropped {}x{} → {}x{} {}",
            report.natural.0, report.natural.1, report.viewport, report.viewport, report.output
        ),
        format!(
            "Encoded {} at quality {:.1} ({})",
            format_bytes(report.bytes),
            report.quality,
            report.mime_type
        ),
    ];
    if !report.within_budget {
        lines.push("Warning: budget unreachable even at the quality floor".to_string());
    }
    lines
}

/// Summary lines after a batch run.
pub fn format_batch_summary(report: &BatchReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Batch complete: {} cropped, {} failed",
        report.crops.len(),
        report.failures.len()
    )];
    let over_budget = report.crops.iter().filter(|c| !c.within_budget).count();
    if over_budget > 0 {
        lines.push(format!("{over_budget} output(s) exceeded the byte budget"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn report(bytes: usize, within_budget: bool) -> CropReport {
        CropReport {
            source: "in/art.png".to_string(),
            output: "out/art-cover.jpg".to_string(),
            natural: (800, 600),
            viewport: 400,
            mime_type: "image/jpeg".to_string(),
            quality: 0.8,
            bytes,
            within_budget,
        }
    }

    #[test]
    fn bytes_formatting() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KiB");
        assert_eq!(format_bytes(1024 * 1024 + 512 * 1024), "1.5 MiB");
    }

    #[test]
    fn started_events_are_silent() {
        let event = BatchEvent::Started {
            source: PathBuf::from("a.png"),
        };
        assert!(format_batch_event(&event).is_none());
    }

    #[test]
    fn finished_event_mentions_quality_and_size() {
        let line = format_batch_event(&BatchEvent::Finished(report(2048, true))).unwrap();
        assert!(line.contains("2.0 KiB"));
        assert!(line.contains("q0.8"));
        assert!(!line.contains("over budget"));
    }

    #[test]
    fn over_budget_is_flagged() {
        let line = format_batch_event(&BatchEvent::Finished(report(2048, false))).unwrap();
        assert!(line.contains("over budget"));

        let summary = format_crop_summary(&report(2048, false));
        assert!(summary.iter().any(|l| l.contains("budget unreachable")));
    }

    #[test]
    fn batch_summary_counts() {
        let batch = BatchReport {
            crops: vec![report(100, true), report(200, false)],
            failures: vec![],
        };
        let lines = format_batch_summary(&batch);
        assert!(lines[0].contains("2 cropped, 0 failed"));
        assert!(lines[1].contains("1 output(s)"));
    }
}
