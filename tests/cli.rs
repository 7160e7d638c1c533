use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SAMPLE: &str = "ଆମେ ଭାରତ ବାସୀ";

fn temp_workspace() -> TempDir {
    tempfile::tempdir().expect("create tempdir")
}

fn odia_bpe() -> Command {
    Command::cargo_bin("odia-bpe").expect("binary exists")
}

fn file_arg(path: &Path) -> &str {
    path.file_name()
        .and_then(|name| name.to_str())
        .expect("utf-8 file name")
}

fn train_model(workspace: &TempDir) -> std::path::PathBuf {
    let input_path = workspace.path().join("corpus.txt");
    let output_path = workspace.path().join("tokenizer.json");
    let corpus = format!("{SAMPLE}\n").repeat(50);
    fs::write(&input_path, corpus).expect("write corpus");

    odia_bpe()
        .current_dir(workspace.path())
        .args([
            "--quiet",
            "train",
            file_arg(&input_path),
            "--vocab-size",
            "120",
            "--min-frequency",
            "2",
            "--no-progress",
            "-o",
            file_arg(&output_path),
        ])
        .assert()
        .success();
    assert!(output_path.exists(), "tokenizer.json was created");
    output_path
}

#[test]
fn train_encode_decode_round_trip() {
    let workspace = temp_workspace();
    let model_path = train_model(&workspace);

    let encode_output = odia_bpe()
        .current_dir(workspace.path())
        .args(["--quiet", "encode", "-m", file_arg(&model_path), SAMPLE, "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let encoded: Value =
        serde_json::from_slice(&encode_output).expect("encoded output is valid JSON");
    let ids = encoded["ids"]
        .as_array()
        .expect("ids array")
        .iter()
        .map(|v| v.as_u64().expect("u64 id"))
        .collect::<Vec<_>>();
    assert!(!ids.is_empty(), "some ids produced");
    assert!(
        ids.len() < SAMPLE.chars().count(),
        "merges shorten the encoding"
    );
    assert!(encoded["compression_ratio"].as_f64().expect("ratio") > 1.0);

    let mut args = vec![
        "--quiet".to_string(),
        "decode".to_string(),
        "-m".to_string(),
        file_arg(&model_path).to_string(),
    ];
    args.extend(ids.iter().map(|id| id.to_string()));

    let decoded = odia_bpe()
        .current_dir(workspace.path())
        .args(&args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(String::from_utf8(decoded).expect("utf-8"), SAMPLE);
}

#[test]
fn decode_reads_ids_from_file() {
    let workspace = temp_workspace();
    let model_path = train_model(&workspace);
    let ids_path = workspace.path().join("ids.txt");
    let decoded_path = workspace.path().join("decoded.txt");

    let ids = odia_bpe()
        .current_dir(workspace.path())
        .args(["--quiet", "encode", "-m", file_arg(&model_path), SAMPLE])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    fs::write(&ids_path, ids).expect("write ids");

    odia_bpe()
        .current_dir(workspace.path())
        .args([
            "--quiet",
            "decode",
            "-m",
            file_arg(&model_path),
            "--input",
            file_arg(&ids_path),
            "--output",
            file_arg(&decoded_path),
        ])
        .assert()
        .success();
    assert_eq!(fs::read_to_string(&decoded_path).expect("read"), SAMPLE);
}

#[test]
fn info_reports_vocabulary() {
    let workspace = temp_workspace();
    let model_path = train_model(&workspace);

    let output = odia_bpe()
        .current_dir(workspace.path())
        .args(["--quiet", "info", "-m", file_arg(&model_path)])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).expect("utf-8");
    assert!(stdout.contains("Vocab size"));
    assert!(stdout.contains("<UNK>=1"));

    let output = odia_bpe()
        .current_dir(workspace.path())
        .args(["--quiet", "info", "-m", file_arg(&model_path), "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let summary: Value = serde_json::from_slice(&output).expect("info JSON");
    assert_eq!(summary["target_vocab_size"], 120);
    assert!(summary["merges"].as_u64().expect("merges") > 0);
}

#[test]
fn encode_without_model_fails_unless_fallback_requested() {
    let workspace = temp_workspace();

    odia_bpe()
        .current_dir(workspace.path())
        .args(["--quiet", "encode", "-m", "absent.json", "ଆମେ"])
        .assert()
        .failure();

    let output = odia_bpe()
        .current_dir(workspace.path())
        .args([
            "--quiet",
            "encode",
            "-m",
            "absent.json",
            "--fallback-untrained",
            "ଆମେ",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(String::from_utf8(output).expect("utf-8"), "1 1 1\n");
}

fn train_stderr(workspace: &TempDir, verbosity: &[&str]) -> String {
    let input_path = workspace.path().join("corpus.txt");
    fs::write(&input_path, format!("{SAMPLE}\n").repeat(10)).expect("write corpus");
    let mut args = verbosity.to_vec();
    args.extend(["train", "corpus.txt", "--vocab-size", "90", "-o", "tokenizer.json"]);
    let output = odia_bpe()
        .current_dir(workspace.path())
        .args(&args)
        .assert()
        .success()
        .get_output()
        .stderr
        .clone();
    String::from_utf8(output).expect("utf-8 stderr")
}

#[test]
fn iteration_logs_only_replace_the_spinner_when_verbose() {
    let workspace = temp_workspace();
    let stderr = train_stderr(&workspace, &[]);
    assert!(stderr.contains("loaded"), "summary logs still shown: {stderr}");
    assert!(!stderr.contains("iter "), "no per-iteration lines: {stderr}");

    let stderr = train_stderr(&workspace, &["-v"]);
    assert!(stderr.contains("iter "), "per-iteration lines with -v: {stderr}");
}

#[test]
fn train_rejects_missing_input() {
    let workspace = temp_workspace();
    odia_bpe()
        .current_dir(workspace.path())
        .args(["--quiet", "train", "missing.txt", "--no-progress"])
        .assert()
        .failure();
}
