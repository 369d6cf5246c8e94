#![cfg(unix)]

use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use adstats::{
    encode_block, AdBlock, AdError, DictionaryMode, Experiment, ExperimentConfig, RandomInputs,
};
use flate2::write::GzEncoder;
use flate2::Compression;

/// Write a stand-in for the external compressor. `AD` copies a prepared
/// dictionary, `COM` copies its input and a stream dictionary, `DECOM` runs
/// `decom_action` (by default a plain copy).
fn fake_tool(dir: &Path, decom_action: &str, ad_exit: i32) -> PathBuf {
    let summary = dir.join("fixture.summary.ad");
    let header = AdBlock {
        key_size_class: 2,
        counts: [1, 2, 0, 0, 0, 0],
        keys: None,
    };
    fs::write(&summary, encode_block(&header, None).unwrap()).unwrap();

    let stream = dir.join("fixture.stream.ad");
    let mut bytes = Vec::new();
    for keys in [vec![4u32, 60], vec![11]] {
        let block = AdBlock {
            key_size_class: 1,
            counts: [keys.len() as u32, 0, 0, 0, 0, 0],
            keys: Some(keys),
        };
        bytes.extend(encode_block(&block, Some(8)).unwrap());
    }
    fs::write(&stream, bytes).unwrap();

    let script = format!(
        "#!/bin/sh
while [ $# -gt 0 ]; do
  case \"$1\" in
    -m) mode=\"$2\" ;;
    -a) ;;
    -i) in=\"$2\" ;;
    -o) out=\"$2\" ;;
    -d) dict=\"$2\" ;;
    *) exit 2 ;;
  esac
  shift 2
done
case \"$mode\" in
  AD) cp '{summary}' \"$dict\"; exit {ad_exit} ;;
  COM) cp \"$in\" \"$out\"; if [ ! -f \"$dict\" ]; then cp '{stream}' \"$dict\"; fi ;;
  DECOM) {decom_action} ;;
esac
",
        summary = summary.display(),
        stream = stream.display(),
    );
    let tool = dir.join("mawcd");
    fs::write(&tool, script).unwrap();
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();
    tool
}

fn gz(path: &Path, text: &str) {
    let mut enc = GzEncoder::new(fs::File::create(path).unwrap(), Compression::default());
    enc.write_all(text.as_bytes()).unwrap();
    enc.finish().unwrap();
}

fn setup(decom_action: &str, ad_exit: i32) -> (tempfile::TempDir, ExperimentConfig) {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    gz(&data.join("b.fa.gz"), ">b\nacgt\nac\n");
    gz(&data.join("a.fa.gz"), ">a\nggxx\n");
    fs::write(data.join("notes.txt"), "ignored").unwrap();
    let tool = fake_tool(dir.path(), decom_action, ad_exit);
    let config = ExperimentConfig {
        data_dir: data,
        result_dir: dir.path().join("result"),
        tool,
        rng_seed: Some(1),
        ..ExperimentConfig::default()
    };
    (dir, config)
}

#[test]
fn shared_dictionary_run() {
    let (_dir, config) = setup("cp \"$in\" \"$out\"", 0);
    let mut exp = Experiment::new(config.clone(), DictionaryMode::Shared).unwrap();
    let summary = exp.run().unwrap();
    assert_eq!(summary.files, vec!["a.fa".to_string(), "b.fa".to_string()]);
    assert_eq!(summary.verified, 2);
    assert!(summary.failed.is_none());

    assert_eq!(fs::read_to_string(config.cured_file("a.fa")).unwrap(), "GGAA");
    assert_eq!(fs::read_to_string(config.merged_file()).unwrap(), "GGAAACGTAC");

    let stats = fs::read_to_string(config.stats_file()).unwrap();
    let lines: Vec<&str> = stats.lines().collect();
    assert_eq!(lines[0], "file_name\tcomp_time\tdecom_time\tcomp_size\tgz_size");
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("a.fa\t"));
    assert!(lines[2].contains("\t6\t"));

    let ad_stats = fs::read_to_string(config.ad_stats_file()).unwrap();
    assert!(ad_stats.contains("# AD key-size :2"));
    assert!(ad_stats.contains("# AD num-keys :3"));

    let log = fs::read_to_string(config.log_file()).unwrap();
    assert!(log.contains("Number of files: 2"));
    assert!(log.contains("Invalid character 'x' in a.fa"));
    assert!(log.contains("File Compression Valid."));
}

#[test]
fn per_file_dictionary_rows() {
    let (_dir, config) = setup("cp \"$in\" \"$out\"", 0);
    let mut exp = Experiment::new(config.clone(), DictionaryMode::PerFile).unwrap();
    let summary = exp.run().unwrap();
    assert_eq!(summary.verified, 2);

    let stats = fs::read_to_string(config.stats_file()).unwrap();
    let rows: Vec<Vec<&str>> = stats.lines().map(|l| l.split('\t').collect()).collect();
    assert_eq!(rows[0].len(), 14);
    let b = &rows[2];
    assert_eq!(b[0], "b.fa");
    // shortest and longest cured sequence line of b.fa
    assert_eq!((b[1], b[2]), ("2", "4"));
    assert_eq!(&b[8..], &["1", "2", "1", "1", "4", "60"]);
}

#[test]
fn mismatch_stops_run() {
    let (_dir, config) = setup("echo BROKEN > \"$out\"", 0);
    let mut exp = Experiment::new(config.clone(), DictionaryMode::Shared).unwrap();
    let summary = exp.run().unwrap();
    assert_eq!(summary.verified, 0);
    assert_eq!(summary.failed.as_deref(), Some("a.fa"));
    let log = fs::read_to_string(config.log_file()).unwrap();
    assert!(log.contains("COMPRESSION WRONG"));
    assert!(!log.contains("== b.fa =="));
}

#[test]
fn failing_tool_is_an_error() {
    let (_dir, config) = setup("cp \"$in\" \"$out\"", 3);
    let mut exp = Experiment::new(config, DictionaryMode::Shared).unwrap();
    assert!(matches!(exp.run(), Err(AdError::Tool { .. })));
}

#[test]
fn generated_inputs_per_file_rows() {
    let (_dir, mut config) = setup("cp \"$in\" \"$out\"", 0);
    config.random = RandomInputs {
        num_files: 3,
        seqs_per_file: 2,
        min_seq_len: 5,
        max_seq_len: 40,
    };
    let mut exp = Experiment::new(config.clone(), DictionaryMode::PerFile).unwrap();
    let summary = exp.run_generated().unwrap();
    assert_eq!(summary.files, vec!["random.0.fa", "random.1.fa", "random.2.fa"]);
    assert_eq!(summary.verified, 3);

    let stats = fs::read_to_string(config.stats_file()).unwrap();
    let rows: Vec<Vec<&str>> = stats.lines().skip(1).map(|l| l.split('\t').collect()).collect();
    assert_eq!(rows.len(), 3);
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row[0], format!("random.{i}.fa"));
        let text = fs::read_to_string(config.generated_file(i)).unwrap();
        let lens: Vec<usize> = text
            .lines()
            .filter(|l| !l.is_empty() && !l.starts_with('>'))
            .map(str::len)
            .collect();
        assert_eq!(lens.len(), 2);
        let min = lens.iter().min().unwrap().to_string();
        let max = lens.iter().max().unwrap().to_string();
        assert_eq!((row[1], row[2]), (min.as_str(), max.as_str()));
    }
}
