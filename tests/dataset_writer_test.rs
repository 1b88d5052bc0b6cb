use std::collections::HashSet;
use std::fs;
use std::io::BufReader;

use chrono::NaiveDate;
use eisy::io::{
    find_records, read_metadata, read_record, DatasetWriter, RecordQuery, SimulationFileName,
    WriterConfig,
};
use eisy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 14).expect("valid date")
}

fn rc_parallel_record(alteration: Option<AlterationRequest>) -> SimulationRecord {
    let sweep = freq_gen(1.0e6, 1.0e-2, 10).expect("valid range");
    let spec = CircuitSpec::new(
        Topology::RcParallel,
        CircuitElements::from_pairs([("R", 100.0), ("C", 1e-5)]),
    )
    .expect("valid spec");
    let mut rng = StdRng::seed_from_u64(17);
    simulate(&sweep, &spec, alteration.as_ref(), &SimulationOptions::default(), &mut rng)
        .expect("simulates")
}

fn file_names(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir.path())
        .expect("readable dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn consecutive_writes_take_consecutive_serials() {
    let dir = TempDir::new().expect("temp dir");
    let writer = DatasetWriter::new(WriterConfig::new(dir.path()));
    let record = rc_parallel_record(None);

    let first = writer.write(&record, date()).expect("first write");
    let second = writer.write(&record, date()).expect("second write");

    assert_eq!(first.path, dir.path().join("260114-0001_sim_one.csv"));
    assert_eq!(second.path, dir.path().join("260114-0002_sim_one.csv"));
    assert_eq!(
        file_names(&dir),
        ["260114-0001_sim_one.csv", "260114-0002_sim_one.csv"]
    );
}

#[test]
fn serials_are_shared_across_topologies_and_scoped_by_date() {
    let dir = TempDir::new().expect("temp dir");
    let writer = DatasetWriter::new(WriterConfig::new(dir.path()));
    let clean = rc_parallel_record(None);
    let noisy = rc_parallel_record(Some(AlterationRequest::new(Alteration::ComplexNoise, 0.3)));

    writer.write(&clean, date()).expect("clean write");
    let altered = writer.write(&noisy, date()).expect("noisy write");
    assert_eq!(altered.name.to_string(), "260114-0002_sim_one-complexnoise");

    let next_day = NaiveDate::from_ymd_opt(2026, 1, 15).expect("valid date");
    let fresh = writer.write(&clean, next_day).expect("next day write");
    assert_eq!(fresh.name.serial_id(), "260115-0001");
}

#[test]
fn written_file_round_trips_its_labels() {
    let dir = TempDir::new().expect("temp dir");
    let writer = DatasetWriter::new(WriterConfig::new(dir.path().join("nested/out")));
    let record = rc_parallel_record(Some(AlterationRequest::new(Alteration::Outliers, 0.1)));
    let written = writer.write(&record, date()).expect("write");

    let text = fs::read_to_string(&written.path).expect("readable");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Serial number:, 260114-0001");
    assert_eq!(lines[2], "Circuit type:, -RC_parallel-");
    assert_eq!(lines[3], "Circuit elements:, [R=100 ohm C=0.00001 F]");
    assert_eq!(lines[4], "Alteration :, outliers");
    assert_eq!(lines[5], "---");
    assert_eq!(lines.len(), 6 + 1 + record.len());

    let meta = read_metadata(BufReader::new(fs::File::open(&written.path).expect("open")))
        .expect("well formed header");
    assert_eq!(meta.topology, Topology::RcParallel);
    assert_eq!(meta.alteration, Some(Alteration::Outliers));

    let name = SimulationFileName::parse(&written.path).expect("parsable name");
    assert_eq!(name.shape, Topology::RcParallel.file_tag());
    assert_eq!(name.alteration(), Some(Alteration::Outliers));
}

#[test]
fn exhausted_serial_space_is_an_error_and_leaves_no_partial_file() {
    let dir = TempDir::new().expect("temp dir");
    let mut config = WriterConfig::new(dir.path());
    config.max_serial = 2;
    let writer = DatasetWriter::new(config);
    let record = rc_parallel_record(None);

    writer.write(&record, date()).expect("serial 1");
    writer.write(&record, date()).expect("serial 2");
    let err = writer.write(&record, date()).unwrap_err();
    assert!(matches!(err, EisError::FileCollisionExhausted { ref date, .. } if date == "260114"));
    assert!(file_names(&dir).iter().all(|n| !n.ends_with(".partial")));
}

#[test]
fn serials_are_shared_with_other_sources_and_ignore_unrelated_files() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("260114-0001_exp_one.csv"), "measured").expect("seed file");
    fs::write(dir.path().join("README.txt"), "notes").expect("seed file");
    let writer = DatasetWriter::new(WriterConfig::new(dir.path()));
    let written = writer.write(&rc_parallel_record(None), date()).expect("write");
    assert_eq!(written.name.serial, 2);
}

#[test]
fn concurrent_writers_never_share_a_serial() {
    let dir = TempDir::new().expect("temp dir");
    let record = rc_parallel_record(None);
    let serials: Vec<u32> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let writer = DatasetWriter::new(WriterConfig::new(dir.path()));
                let record = &record;
                scope.spawn(move || writer.write(record, date()).expect("write").name.serial)
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("writer thread"))
            .collect()
    });
    let unique: HashSet<u32> = serials.iter().copied().collect();
    assert_eq!(unique.len(), 8);
    assert_eq!(unique, (1..=8).collect::<HashSet<u32>>());
    assert_eq!(file_names(&dir).len(), 8);
}

#[test]
fn written_record_reads_back_unchanged() {
    let dir = TempDir::new().expect("temp dir");
    let mut config = WriterConfig::new(dir.path());
    config.delimiter = ';';
    let writer = DatasetWriter::new(config);
    let record = rc_parallel_record(Some(AlterationRequest::new(Alteration::FreqNoise, 0.2)));
    let written = writer.write(&record, date()).expect("write");

    let file = fs::File::open(&written.path).expect("open");
    let stored = read_record(BufReader::new(file), ';').expect("well formed record");
    assert_eq!(stored.metadata.serial_id, written.name.serial_id());
    assert_eq!(stored.metadata.elements, record.metadata().elements);
    assert_eq!(stored.metadata.alteration, Some(Alteration::FreqNoise));
    assert_eq!(stored.body.headers(), record.column_headers().as_slice());
    assert_eq!(stored.body.rows(), record.len());
    assert_eq!(
        stored.body.complex("complex_Z [ohm]"),
        Some(record.response().complex.as_slice())
    );
    for header in record.column_headers().iter().skip(3) {
        assert_eq!(stored.body.real(header), record.column(header), "{header}");
    }
    assert_eq!(stored.body.real("freq [Hz]"), Some(record.sweep().frequency()));
}

#[test]
fn records_are_selected_by_name_tags() {
    let dir = TempDir::new().expect("temp dir");
    let writer = DatasetWriter::new(WriterConfig::new(dir.path()));
    let clean = rc_parallel_record(None);
    let noisy = rc_parallel_record(Some(AlterationRequest::new(Alteration::Outliers, 0.1)));
    writer.write(&clean, date()).expect("serial 1");
    writer.write(&noisy, date()).expect("serial 2");
    writer.write(&clean, date()).expect("serial 3");
    fs::write(dir.path().join("260114-0004_exp_one.csv"), "measured").expect("seed file");

    let all_sim = find_records(dir.path(), &RecordQuery::default()).expect("readable dir");
    assert_eq!(all_sim.len(), 3);

    let picked = RecordQuery::default().with_any("-0001").with_any("-0002");
    let names: Vec<String> = find_records(dir.path(), &picked)
        .expect("readable dir")
        .iter()
        .map(|p| p.file_name().expect("file").to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["260114-0001_sim_one.csv", "260114-0002_sim_one-outliers.csv"]);

    let outliers = RecordQuery::default().with_all("outliers");
    assert_eq!(find_records(dir.path(), &outliers).expect("readable dir").len(), 1);
    assert!(find_records(dir.path().join("missing"), &RecordQuery::default()).is_err());
}
