//! Tests for the shuttle demo.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use pax_stop::StopReport;

    use crate::report_csv::{CsvReportWriter, REPORT_FILE};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn report(stop_index: u32) -> StopReport {
        StopReport {
            stop_index,
            arrived_at: 10.0,
            departed_at: 22.5,
            spawned: 3,
            alight_selected: 2,
            alight_completed: 1,
            alight_abandoned: 1,
            board_target: 4,
            board_completed: 4,
            forced_closes: 1,
            queue_len: 5,
            inside_count: 9,
            ..StopReport::default()
        }
    }

    #[test]
    fn header_written_on_create() {
        let dir = tmp();
        let mut w = CsvReportWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join(REPORT_FILE)).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers.len(), 14);
        assert_eq!(headers[0], "stop_index");
        assert_eq!(headers[3], "dwell_secs");
        assert_eq!(headers[13], "inside_count");
        assert_eq!(rdr.records().count(), 0);
    }

    #[test]
    fn one_row_per_report() {
        let dir = tmp();
        let mut w = CsvReportWriter::new(dir.path()).unwrap();
        w.write(&report(1)).unwrap();
        w.write(&report(2)).unwrap();
        w.finish().unwrap();
        assert_eq!(w.rows(), 2);

        let mut rdr = csv::Reader::from_path(dir.path().join(REPORT_FILE)).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "1");
        assert_eq!(&rows[1][0], "2");
        assert_eq!(&rows[0][3], "12.50"); // dwell
        assert_eq!(&rows[0][7], "1"); // alight_abandoned
        assert_eq!(&rows[0][11], "1"); // forced_closes
        assert_eq!(&rows[0][13], "9"); // inside_count
    }

    #[test]
    fn finish_is_idempotent() {
        let dir = tmp();
        let mut w = CsvReportWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }
}

#[cfg(test)]
mod config_tests {
    use crate::config::ShuttleConfig;

    #[test]
    fn empty_object_is_all_defaults() {
        let c = ShuttleConfig::from_json("{}").unwrap();
        assert_eq!(c.stops, 10);
        assert_eq!(c.stop.capacity, 40);
        assert_eq!(c.sim.tick_duration_ms, 50);
        assert!(c.layout.is_none());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let c = ShuttleConfig::from_json(
            r#"{ "stops": 3, "stop": { "capacity": 12, "board_per_stop": { "min": 2, "max": 2 } }, "sim": { "seed": 9 } }"#,
        )
        .unwrap();
        assert_eq!(c.stops, 3);
        assert_eq!(c.stop.capacity, 12);
        assert_eq!(c.stop.board_per_stop.min, 2);
        assert_eq!(c.stop.alight_window_secs, 6.0);
        assert_eq!(c.sim.seed, 9);
        assert_eq!(c.sim.tick_duration_ms, 50);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(ShuttleConfig::from_json("{ stops: }").is_err());
    }

    #[test]
    fn config_round_trips_through_json() {
        let c = ShuttleConfig::default();
        let text = serde_json::to_string(&c).unwrap();
        let back = ShuttleConfig::from_json(&text).unwrap();
        assert_eq!(back.stop, c.stop);
        assert_eq!(back.agent, c.agent);
    }
}

#[cfg(test)]
mod run_tests {
    use pax_core::SimConfig;
    use pax_stop::{StopLayout, StopSchedulerBuilder};
    use pax_world::KinematicWorld;

    use crate::observer::ReportObserver;
    use crate::report_csv::{CsvReportWriter, REPORT_FILE};

    #[test]
    fn observer_writes_a_row_per_stop() {
        let dir = tempfile::tempdir().unwrap();
        let world = KinematicWorld::new().with_areas(StopLayout::city_bus_areas());
        let mut stop = StopSchedulerBuilder::new(SimConfig::default(), StopLayout::city_bus(), world)
            .build()
            .unwrap();
        let mut observer = ReportObserver::new(CsvReportWriter::new(dir.path()).unwrap());

        let done = stop.run_stops(3, &mut observer);
        observer.finish();
        assert!(observer.take_error().is_none());
        assert_eq!(done, 3);
        assert_eq!(observer.rows_written(), 3);

        let boarded: u32 = stop.reports().iter().map(|r| r.board_completed).sum();
        assert_eq!(observer.boarded, boarded as u64);

        let mut rdr = csv::Reader::from_path(dir.path().join(REPORT_FILE)).unwrap();
        assert_eq!(rdr.records().count(), 3);
    }
}
