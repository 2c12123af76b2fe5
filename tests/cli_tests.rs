//! End-to-end tests driving the `merge-eval` binary on small fixture files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use flate2::write::GzEncoder;
use flate2::Compression;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_plain(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn write_gzip(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut encoder = GzEncoder::new(fs::File::create(&path).unwrap(), Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap();
    path
}

fn merge_eval() -> Command {
    Command::cargo_bin("merge-eval").unwrap()
}

/// Rows of a CSV file as header-keyed maps
fn read_rows(path: &Path) -> Vec<std::collections::HashMap<String, String>> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers = reader.headers().unwrap().clone();
    reader
        .records()
        .map(|record| {
            let record = record.unwrap();
            headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect()
        })
        .collect()
}

const TEMPLATES: &str = ">t1\nACGTACGT\n>t2\nGGGGCCCC\n";

#[test]
fn test_accuracy_exact_reconstruction() {
    let dir = TempDir::new().unwrap();
    let templates = write_plain(&dir, "templates.fa", TEMPLATES);
    let merged = write_plain(&dir, "merged.fq", "@M_t1-1\nACGTACGT\n+\nIIIIIIII\n");
    let out = dir.path().join("accuracy.csv");

    merge_eval()
        .arg("accuracy")
        .arg(&templates)
        .arg(&merged)
        .args(["--tool", "AdapterRemoval", "--nfrags", "2", "--fraglen", "8", "--out"])
        .arg(&out)
        .assert()
        .success();

    let rows = read_rows(&out);
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row["program"], "AdapterRemoval");
    assert_eq!(row["filename"], "merged.fq");
    assert_eq!(row["total_sequences"], "2");
    assert_eq!(row["total_reads"], "1");
    assert_eq!(row["dropped_reads"], "1");
    assert_eq!(row["avg_divergence_per_nt"], "0.0");
    assert_eq!(row["edit_distances"], "0:1");
}

#[test]
fn test_accuracy_single_substitution() {
    let dir = TempDir::new().unwrap();
    let templates = write_plain(&dir, "templates.fa", TEMPLATES);
    let merged = write_plain(&dir, "merged.fq", "@t1-1\nACGAACGT\n+\nIIIIIIII\n");

    merge_eval()
        .args(["--format", "csv", "accuracy"])
        .arg(&templates)
        .arg(&merged)
        .args(["--tool", "fastp", "--nfrags", "2", "--fraglen", "8"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fastp,merged.fq,2,8,2,1,1,12.5,1:1"));
}

#[test]
fn test_accuracy_reads_gzip_by_magic_number() {
    let dir = TempDir::new().unwrap();
    // Extensions deliberately say nothing about compression
    let templates = write_gzip(&dir, "templates.txt", TEMPLATES);
    let merged = write_gzip(
        &dir,
        "merged.txt",
        "@t1-1\nACGTACGT\n+\nIIIIIIII\n@t2-1\nGGGGCCCC\n+\nIIIIIIII\n",
    );

    merge_eval()
        .args(["--format", "csv", "accuracy"])
        .arg(&templates)
        .arg(&merged)
        .args(["--tool", "leeHom", "--nfrags", "2", "--fraglen", "8"])
        .assert()
        .success()
        .stdout(predicate::str::contains(",2,0,0.0,0:2"));
}

#[test]
fn test_accuracy_discards_unmerged_reads() {
    let dir = TempDir::new().unwrap();
    let templates = write_plain(&dir, "templates.fa", TEMPLATES);
    let merged = write_plain(
        &dir,
        "merged.fq",
        "@F_t1-extra\nACGT\n+\nIIII\n@R_t1-extra\nACGT\n+\nIIII\n",
    );
    let out = dir.path().join("accuracy.csv");

    merge_eval()
        .arg("accuracy")
        .arg(&templates)
        .arg(&merged)
        .args(["--tool", "AdapterRemoval", "--nfrags", "2", "--fraglen", "8", "--out"])
        .arg(&out)
        .assert()
        .success();

    let row = &read_rows(&out)[0];
    assert_eq!(row["total_reads"], "0");
    assert_eq!(row["dropped_reads"], "2");
    assert_eq!(row["avg_divergence_per_nt"], "NA");
    assert_eq!(row["edit_distances"], "");
}

const SHORT_QUALITY_READS: &str = "@t1-1\nACGTACGT\n+\nIIIIIII\n@t2-1\nGGGGCCCC\n+\nIIIIIIII\n";

#[test]
fn test_accuracy_scores_read_with_short_quality_string() {
    let dir = TempDir::new().unwrap();
    let templates = write_plain(&dir, "templates.fa", TEMPLATES);
    let merged = write_plain(&dir, "merged.fq", SHORT_QUALITY_READS);
    let out = dir.path().join("accuracy.csv");

    merge_eval()
        .arg("accuracy")
        .arg(&templates)
        .arg(&merged)
        .args(["--tool", "bbmerge", "--nfrags", "2", "--fraglen", "8", "--out"])
        .arg(&out)
        .assert()
        .success();

    let row = &read_rows(&out)[0];
    assert_eq!(row["total_reads"], "2");
    assert_eq!(row["dropped_reads"], "0");
    assert_eq!(row["edit_distances"], "0:2");
}

#[test]
fn test_calibrate_skips_read_with_short_quality_string() {
    let dir = TempDir::new().unwrap();
    let templates = write_plain(&dir, "templates.fa", TEMPLATES);
    let merged = write_plain(&dir, "merged.fq", SHORT_QUALITY_READS);
    let out = dir.path().join("calibration.csv");

    merge_eval()
        .arg("calibrate")
        .arg(&templates)
        .arg(&merged)
        .args(["--tool", "bbmerge", "--nfrags", "2", "--fraglen", "8", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("were not tallied"));

    let rows = read_rows(&out);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["predicted_phred"], "40");
    assert_eq!(rows[0]["n_matches"], "8");
}

#[test]
fn test_accuracy_distribution_mode() {
    let dir = TempDir::new().unwrap();
    let templates = write_plain(&dir, "templates.fa", TEMPLATES);
    let merged = write_plain(&dir, "merged.fq", "@t2\nGGGGCCCA\n+\nIIIIIIII\n");
    let out = dir.path().join("accuracy.csv");

    merge_eval()
        .arg("accuracy")
        .arg(&templates)
        .arg(&merged)
        .args([
            "--tool",
            "SeqPrep",
            "--nfrags",
            "2",
            "--fraglen-distribution",
            "lognormal",
            "--quality-shift",
            "-10",
            "--out",
        ])
        .arg(&out)
        .assert()
        .success();

    let row = &read_rows(&out)[0];
    assert_eq!(row["fraglen_distribution"], "lognormal");
    assert_eq!(row["quality_shift"], "-10");
    assert_eq!(row["edit_distances"], "1:1");
    assert!(!row.contains_key("avg_divergence_per_nt"));
}

#[test]
fn test_unrecognized_header_aborts() {
    let dir = TempDir::new().unwrap();
    let templates = write_plain(&dir, "templates.fa", TEMPLATES);
    let merged = write_plain(&dir, "merged.fq", "t1-1\nACGTACGT\n+\nIIIIIIII\n");

    merge_eval()
        .arg("accuracy")
        .arg(&templates)
        .arg(&merged)
        .args(["--tool", "fastp", "--nfrags", "2", "--fraglen", "8"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not start with a known prefix"));
}

#[test]
fn test_missing_input_reports_path() {
    let dir = TempDir::new().unwrap();
    let merged = write_plain(&dir, "merged.fq", "@t1\nACGT\n+\nIIII\n");

    merge_eval()
        .arg("accuracy")
        .arg(dir.path().join("absent.fa"))
        .arg(&merged)
        .args(["--tool", "fastp", "--nfrags", "1", "--fraglen", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.fa"));
}

#[test]
fn test_calibrate_exact_read_reaches_cap() {
    let dir = TempDir::new().unwrap();
    let templates = write_plain(&dir, "templates.fa", TEMPLATES);
    let merged = write_plain(&dir, "merged.fq", "@t1-1\nACGTACGT\n+\nIIIIIIII\n");
    let out = dir.path().join("calibration.csv");

    merge_eval()
        .arg("calibrate")
        .arg(&templates)
        .arg(&merged)
        .args(["--tool", "leeHom", "--nfrags", "2", "--fraglen", "8", "--out"])
        .arg(&out)
        .assert()
        .success();

    let rows = read_rows(&out);
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row["program"], "leeHom");
    assert_eq!(row["alpha"], "0.01");
    assert_eq!(row["predicted_phred"], "40");
    assert_eq!(row["n_matches"], "8");
    assert_eq!(row["n_mismatches"], "0");
    assert_eq!(row["p_mismatch"], "0.0");
    assert_eq!(row["p_mismatch_lower"], "0.0");
    assert_eq!(row["observed_phred"], "100.0");
    assert_eq!(row["observed_phred_upper"], "100.0");
}

#[test]
fn test_calibrate_substitution_counted_in_its_bucket() {
    let dir = TempDir::new().unwrap();
    let templates = write_plain(&dir, "templates.fa", TEMPLATES);
    let merged = write_plain(&dir, "merged.fq", "@t1-1\nACGAACGT\n+\nIII5IIII\n");
    let out = dir.path().join("calibration.csv");

    merge_eval()
        .arg("calibrate")
        .arg(&templates)
        .arg(&merged)
        .args(["--tool", "fastp", "--nfrags", "2", "--fraglen", "8", "--out"])
        .arg(&out)
        .assert()
        .success();

    let rows = read_rows(&out);
    let phreds: Vec<&str> = rows.iter().map(|r| r["predicted_phred"].as_str()).collect();
    assert_eq!(phreds, vec!["20", "40"]);
    assert_eq!(rows[0]["n_mismatches"], "1");
    assert_eq!(rows[0]["n_matches"], "0");
    assert_eq!(rows[0]["observed_phred"], "0.0");
    assert_eq!(rows[1]["n_matches"], "7");
    assert_eq!(rows[1]["n_mismatches"], "0");
}

#[test]
fn test_calibrate_rejects_invalid_alpha() {
    let dir = TempDir::new().unwrap();
    let templates = write_plain(&dir, "templates.fa", TEMPLATES);
    let merged = write_plain(&dir, "merged.fq", "@t1\nACGTACGT\n+\nIIIIIIII\n");

    merge_eval()
        .arg("calibrate")
        .arg(&templates)
        .arg(&merged)
        .args(["--tool", "fastp", "--nfrags", "2", "--fraglen", "8", "--alpha", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("strictly between 0 and 1"));
}

// Fragment ACGTA; the reverse read is sequenced from the other strand
const FORWARD: &str = "@f1/1\nACGTAGG\n+\nIIIII##\n@f2/1\nACGTA\n+\nIIIII\n";
const REVERSE: &str = "@f1/2\nTACGTCC\n+\n55555##\n@f2/2\nTAAGT\n+\nIIIII\n";

#[test]
fn test_per_base_matching_and_mismatching_calls() {
    let dir = TempDir::new().unwrap();
    let forward = write_plain(&dir, "s1.fq", FORWARD);
    let reverse = write_plain(&dir, "s2.fq", REVERSE);
    let merged = write_plain(
        &dir,
        "merged.fq",
        "@M_f1/1\nACGTA\n+\nIIIII\n@M_f2\nACGTA\n+\nII#II\n@F_f3/1\nAAAAA\n+\nIIIII\n",
    );
    let out = dir.path().join("per_base.csv");

    merge_eval()
        .arg("per-base")
        .arg(&forward)
        .arg(&reverse)
        .arg(&merged)
        .args(["--tool", "AdapterRemoval", "--fragment-length", "5", "--position", "2", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("matching count: 1"))
        .stdout(predicate::str::contains("mismatching count: 1"));

    let rows = read_rows(&out);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "f1");
    assert_eq!(rows[0]["type"], "match");
    assert_eq!(rows[0]["nt1"], "G");
    assert_eq!(rows[0]["nt2"], "G");
    assert_eq!(rows[0]["qs1"], "40");
    assert_eq!(rows[0]["qs2"], "20");
    assert_eq!(rows[1]["name"], "f2");
    assert_eq!(rows[1]["type"], "mismatch");
    assert_eq!(rows[1]["nt2"], "T");
    assert_eq!(rows[1]["new_qs"], "2");
}

#[test]
fn test_per_base_length_anomaly_fails_after_writing() {
    let dir = TempDir::new().unwrap();
    let forward = write_plain(&dir, "s1.fq", FORWARD);
    let reverse = write_plain(&dir, "s2.fq", REVERSE);
    let merged = write_plain(
        &dir,
        "merged.fq",
        "@f1\nACGTA\n+\nIIIII\n@f2\nACGTAA\n+\nIIIIII\n",
    );
    let out = dir.path().join("per_base.csv");

    merge_eval()
        .arg("per-base")
        .arg(&forward)
        .arg(&reverse)
        .arg(&merged)
        .args(["--tool", "fastp", "--fragment-length", "5", "--position", "2", "--out"])
        .arg(&out)
        .assert()
        .failure()
        .stdout(predicate::str::contains("incorrect length count: 1"))
        .stderr(predicate::str::contains("deviate from the expected fragment length"));

    assert_eq!(read_rows(&out).len(), 1);
}

#[test]
fn test_per_base_rejects_position_outside_fragment() {
    let dir = TempDir::new().unwrap();
    let forward = write_plain(&dir, "s1.fq", FORWARD);
    let reverse = write_plain(&dir, "s2.fq", REVERSE);
    let merged = write_plain(&dir, "merged.fq", "@f1\nACGTA\n+\nIIIII\n");

    merge_eval()
        .arg("per-base")
        .arg(&forward)
        .arg(&reverse)
        .arg(&merged)
        .args(["--tool", "fastp", "--fragment-length", "5", "--position", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside a fragment"));
}

#[test]
fn test_qualities_counts_full_range() {
    let dir = TempDir::new().unwrap();
    let reads = write_gzip(&dir, "reads.fq.gz", "@r1\nACGT\n+\nII5!\n@r2\nAC\n+\nI#\n");
    let out = dir.path().join("qualities.csv");

    merge_eval()
        .arg("qualities")
        .arg(&reads)
        .args(["--quality-shift", "-20", "--read", "s1", "--out"])
        .arg(&out)
        .assert()
        .success();

    let rows = read_rows(&out);
    assert_eq!(rows.len(), 42);
    assert!(rows.iter().all(|r| r["quality_shift"] == "-20" && r["read"] == "s1"));
    assert_eq!(rows[40]["quality_score"], "40");
    assert_eq!(rows[40]["count"], "3");
    assert_eq!(rows[20]["count"], "1");
    assert_eq!(rows[1]["count"], "0");
}

#[test]
fn test_json_output_includes_reconciliation() {
    let dir = TempDir::new().unwrap();
    let templates = write_plain(&dir, "templates.fa", TEMPLATES);
    let merged = write_plain(
        &dir,
        "merged.fq",
        "@t1-1\nACGTACGT\n+\nIIIIIIII\n@t9-1\nACGT\n+\nIIII\n",
    );

    let output = merge_eval()
        .args(["--format", "json", "accuracy"])
        .arg(&templates)
        .arg(&merged)
        .args(["--tool", "bbmerge", "--nfrags", "2", "--fraglen", "8"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["reconciliation"]["candidates"], 2);
    assert_eq!(json["reconciliation"]["reconciled"], 1);
    assert_eq!(json["reconciliation"]["unassigned"], 1);
    assert_eq!(json["result"]["edit_distances"], "0:1");
}
