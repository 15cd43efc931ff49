//! CSV output for per-stop reports.
//!
//! One file, `stop_reports.csv`, one row per completed stop.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use pax_stop::StopReport;

pub const REPORT_FILE: &str = "stop_reports.csv";

const HEADER: [&str; 14] = [
    "stop_index",
    "arrived_at",
    "departed_at",
    "dwell_secs",
    "spawned",
    "alight_selected",
    "alight_completed",
    "alight_abandoned",
    "board_target",
    "board_completed",
    "board_abandoned",
    "forced_closes",
    "queue_len",
    "inside_count",
];

pub struct CsvReportWriter {
    out:      Writer<File>,
    rows:     usize,
    finished: bool,
}

impl CsvReportWriter {
    /// Create `stop_reports.csv` in `dir` and write the header row.
    pub fn new(dir: &Path) -> csv::Result<Self> {
        let mut out = Writer::from_path(dir.join(REPORT_FILE))?;
        out.write_record(HEADER)?;
        Ok(Self { out, rows: 0, finished: false })
    }

    pub fn write(&mut self, r: &StopReport) -> csv::Result<()> {
        self.out.write_record(&[
            r.stop_index.to_string(),
            format!("{:.2}", r.arrived_at),
            format!("{:.2}", r.departed_at),
            format!("{:.2}", r.dwell_secs()),
            r.spawned.to_string(),
            r.alight_selected.to_string(),
            r.alight_completed.to_string(),
            r.alight_abandoned.to_string(),
            r.board_target.to_string(),
            r.board_completed.to_string(),
            r.board_abandoned.to_string(),
            r.forced_closes.to_string(),
            r.queue_len.to_string(),
            r.inside_count.to_string(),
        ])?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush the file.  Idempotent.
    pub fn finish(&mut self) -> csv::Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.out.flush()?;
        Ok(())
    }
}
