//! End-to-end runs of convert and the two plot layouts on temporary directories

use std::fs;
use std::path::Path;

use chillplus_plot::config::PlotConfig;
use chillplus_plot::frames::FrameTable;
use chillplus_plot::pipeline;
use chillplus_plot::properties::PropertyReader;
use chillplus_plot::ChillError;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

const HEADER: &str = "\"ChillPlus.counts.CUBIC_ICE\" \"ChillPlus.counts.HEXAGONAL_ICE\" \
\"ChillPlus.counts.HYDRATE\" \"ChillPlus.counts.INTERFACIAL_HYDRATE\" \
\"ChillPlus.counts.INTERFACIAL_ICE\" \"ChillPlus.counts.OTHER\"";

fn write_frame(dir: &Path, frame: u64, values: &[i64]) {
    let data: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    let text = format!(
        "{}\n# Modifier output\n  {}\n",
        HEADER,
        data.join(" ")
    );
    fs::write(dir.join(format!("{}.txt", frame)), text).unwrap();
}

/// Small config so rendering stays fast
fn small_config() -> PlotConfig {
    let props = PropertyReader::from_overrides(&["figure.dpi=20"]).unwrap();
    PlotConfig::from_properties(&props).unwrap()
}

fn assert_png(path: &Path) {
    let bytes = fs::read(path).unwrap();
    assert!(bytes.len() > PNG_SIGNATURE.len(), "{} is empty", path.display());
    assert_eq!(bytes[..8], PNG_SIGNATURE, "{} is not a PNG", path.display());
}

/// Frames 0..=40 step 10, hydrate peaking at frame 20
fn frame_dir(root: &Path) -> std::path::PathBuf {
    let dir = root.join("CHILL+");
    fs::create_dir(&dir).unwrap();
    write_frame(&dir, 0, &[0, 1, 2, 3, 4, 5]);
    write_frame(&dir, 10, &[1, 2, 8, 4, 5, 6]);
    write_frame(&dir, 20, &[2, 3, 9, 5, 6, 7]);
    write_frame(&dir, 30, &[3, 4, 9, 6, 7, 8]);
    write_frame(&dir, 40, &[4, 5, 7, 7, 8, 9]);
    dir
}

#[test]
fn test_rows_follow_numeric_frame_order() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("frames");
    fs::create_dir(&dir).unwrap();
    // Created out of numeric order; "10" sorts before "2" as text
    write_frame(&dir, 10, &[1, 1, 1, 1, 1, 1]);
    write_frame(&dir, 2, &[2, 2, 2, 2, 2, 2]);
    write_frame(&dir, 1, &[3, 3, 3, 3, 3, 3]);

    let out = tmp.path().join("out.csv");
    let table = pipeline::convert(&dir, &out, b',').unwrap();

    let frames: Vec<i64> = table.rows().iter().map(|r| r[0]).collect();
    assert_eq!(frames, vec![1, 2, 10]);

    let text = fs::read_to_string(&out).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Frame,ChillPlus.counts.CUBIC_ICE,ChillPlus.counts.HEXAGONAL_ICE,\
ChillPlus.counts.HYDRATE,ChillPlus.counts.INTERFACIAL_HYDRATE,\
ChillPlus.counts.INTERFACIAL_ICE,ChillPlus.counts.OTHER"
    );
    assert_eq!(lines.next().unwrap(), "1,3,3,3,3,3,3");
    assert_eq!(lines.next().unwrap(), "2,2,2,2,2,2,2");
    assert_eq!(lines.next().unwrap(), "10,1,1,1,1,1,1");
    assert!(lines.next().is_none());
}

#[test]
fn test_row_count_matches_frames_with_data() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("frames");
    fs::create_dir(&dir).unwrap();
    write_frame(&dir, 0, &[1, 2, 3, 4, 5, 6]);
    fs::write(dir.join("1.txt"), format!("{}\n# no data yet\n", HEADER)).unwrap();
    write_frame(&dir, 2, &[1, 2, 3, 4, 5, 6]);
    fs::write(dir.join("notes.md"), "ignored").unwrap();
    fs::write(dir.join("backup.txt"), "ignored").unwrap();

    let out = tmp.path().join("out.csv");
    let table = pipeline::convert(&dir, &out, b',').unwrap();

    assert_eq!(table.len(), 2);
    assert!(table.rows().iter().all(|r| r.len() == table.columns().len()));
    assert_eq!(fs::read_to_string(&out).unwrap().lines().count(), 3);
}

#[test]
fn test_table_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = frame_dir(tmp.path());
    let out = tmp.path().join("out.tsv");

    let written = pipeline::convert(&dir, &out, b'\t').unwrap();
    let read = FrameTable::read_csv(&out, b'\t').unwrap();

    assert_eq!(read, written);
}

#[test]
fn test_large_counts_survive_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("frames");
    fs::create_dir(&dir).unwrap();
    let big = 9_007_199_254_740_993i64; // not representable as f64
    write_frame(&dir, 0, &[big, 0, 0, 0, 0, -1]);

    let out = tmp.path().join("out.csv");
    pipeline::convert(&dir, &out, b',').unwrap();
    let read = FrameTable::read_csv(&out, b',').unwrap();

    assert_eq!(read.rows()[0], vec![0, big, 0, 0, 0, 0, -1]);
}

#[test]
fn test_malformed_frame_aborts_before_output() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("frames");
    fs::create_dir(&dir).unwrap();
    write_frame(&dir, 0, &[1, 2, 3, 4, 5, 6]);
    fs::write(
        dir.join("5.txt"),
        format!("{}\n1 2 x 4 5 6\n", HEADER),
    )
    .unwrap();

    let out = tmp.path().join("out.csv");
    let err = pipeline::convert(&dir, &out, b',').unwrap_err();

    assert!(matches!(err, ChillError::MalformedRecord { .. }));
    assert!(!out.exists());
}

#[test]
fn test_header_with_own_frame_column_still_plots() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("frames");
    fs::create_dir(&dir).unwrap();
    for (frame, hydrate) in [(0i64, 1i64), (10, 5), (20, 2)] {
        let text = format!(
            "# \"Frame\" {}\n{} 0 1 {} 3 4 5\n",
            HEADER, frame, hydrate
        );
        fs::write(dir.join(format!("{}.txt", frame)), text).unwrap();
    }

    let csv = tmp.path().join("results.csv");
    let table = pipeline::convert(&dir, &csv, b',').unwrap();
    assert_eq!(table.columns().len(), 7);
    assert_eq!(table.rows()[1], vec![10, 0, 1, 5, 3, 4, 5]);

    let config = small_config();
    assert_png(&pipeline::plot_grid(&csv, &tmp.path().join("grid.png"), &config).unwrap());
    let prefix = tmp.path().join("run").to_string_lossy().into_owned();
    assert_eq!(
        pipeline::plot_columns(&csv, &prefix, 0.5, &config).unwrap().len(),
        6
    );
}

#[test]
fn test_missing_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let err = pipeline::convert(&tmp.path().join("nope"), &tmp.path().join("out.csv"), b',')
        .unwrap_err();
    assert!(matches!(err, ChillError::DirectoryNotFound(_)));
}

#[test]
fn test_grid_renders_one_png() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = frame_dir(tmp.path());
    let csv = tmp.path().join("results.csv");
    pipeline::convert(&dir, &csv, b',').unwrap();

    let config = small_config();
    let path = pipeline::plot_grid(&csv, &tmp.path().join("grid.png"), &config).unwrap();

    assert_eq!(path, tmp.path().join("grid.png"));
    assert_png(&path);
}

#[test]
fn test_grid_without_reference_column() {
    let tmp = tempfile::tempdir().unwrap();
    let csv = tmp.path().join("results.csv");
    fs::write(&csv, "Frame,ChillPlus.counts.OTHER\n0,1\n10,2\n").unwrap();

    let err = pipeline::plot_grid(&csv, &tmp.path().join("grid.png"), &small_config())
        .unwrap_err();

    assert!(matches!(err, ChillError::NoDataForColumn(c) if c == "ChillPlus.counts.HYDRATE"));
    assert!(!tmp.path().join("grid.png").exists());
}

#[test]
fn test_columns_render_every_eligible_column_once() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = frame_dir(tmp.path());
    let csv = tmp.path().join("results.csv");
    let table = pipeline::convert(&dir, &csv, b',').unwrap();

    let prefix = tmp.path().join("run").to_string_lossy().into_owned();
    let written = pipeline::plot_columns(&csv, &prefix, 0.5, &small_config()).unwrap();

    let expected: Vec<_> = table
        .columns()
        .iter()
        .filter(|c| c.as_str() != "Frame")
        .map(|c| tmp.path().join(format!("run_{}.png", c)))
        .collect();
    assert_eq!(written, expected);
    for path in &written {
        assert_png(path);
    }
    assert!(!tmp.path().join("run_Frame.png").exists());
    assert!(!tmp.path().join("run_time.png").exists());
}

#[test]
fn test_columns_reject_non_positive_interval() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = frame_dir(tmp.path());
    let csv = tmp.path().join("results.csv");
    pipeline::convert(&dir, &csv, b',').unwrap();

    let prefix = tmp.path().join("run").to_string_lossy().into_owned();
    for interval in [0.0, -0.5] {
        let err = pipeline::plot_columns(&csv, &prefix, interval, &small_config()).unwrap_err();
        assert!(matches!(err, ChillError::InvalidInterval(_)));
    }
    assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 2);
}
