//! `ReportObserver`: writes each stop's report and tallies passenger flow.

use pax_agent::AgentState;
use pax_core::{AgentId, GateId};
use pax_gate::GateEvent;
use pax_stop::{Phase, StopObserver, StopReport};

use crate::report_csv::CsvReportWriter;

/// A [`StopObserver`] that appends every [`StopReport`] to a CSV file.
///
/// Observer hooks cannot fail, so the first write error is kept and handed
/// back by [`take_error`][Self::take_error] once the run is over.
pub struct ReportObserver {
    writer:     CsvReportWriter,
    last_error: Option<csv::Error>,

    pub boarded:       u64,
    pub alighted:      u64,
    pub recycled:      u64,
    pub forced_closes: u64,
}

impl ReportObserver {
    pub fn new(writer: CsvReportWriter) -> Self {
        Self {
            writer,
            last_error: None,
            boarded: 0,
            alighted: 0,
            recycled: 0,
            forced_closes: 0,
        }
    }

    pub fn take_error(&mut self) -> Option<csv::Error> {
        self.last_error.take()
    }

    pub fn rows_written(&self) -> usize {
        self.writer.rows()
    }

    pub fn finish(&mut self) {
        let result = self.writer.finish();
        self.store_err(result);
    }

    fn store_err(&mut self, result: csv::Result<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl StopObserver for ReportObserver {
    fn on_phase(&mut self, stop_index: u32, phase: Phase) {
        tracing::trace!(stop = stop_index, %phase, "phase");
    }

    fn on_agent_state(&mut self, _agent: AgentId, state: AgentState) {
        match state {
            AgentState::Riding => self.boarded += 1,
            AgentState::Alighting => self.alighted += 1,
            _ => {}
        }
    }

    fn on_agent_removed(&mut self, _agent: AgentId) {
        self.recycled += 1;
    }

    fn on_gate_event(&mut self, gate: GateId, event: GateEvent) {
        if event == GateEvent::ForceClosed {
            self.forced_closes += 1;
        }
        tracing::trace!(%gate, ?event, "door");
    }

    fn on_stop_complete(&mut self, report: &StopReport) {
        let result = self.writer.write(report);
        self.store_err(result);
    }
}
