use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn draftmark() -> Command {
    Command::cargo_bin("draftmark").unwrap()
}

#[test]
fn coerce_reads_stdin_writes_stdout() {
    draftmark()
        .args(["coerce", "-"])
        .write_stdin("Program Updates\n\nWe helped many children.")
        .assert()
        .success()
        .stdout("<h3>Program Updates</h3>\n<p>We helped many children.</p>");
}

#[test]
fn render_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("post.txt");
    let output = dir.path().join("post.html");
    fs::write(&input, "- Learned 10 new words\n- Practiced speaking aloud").unwrap();

    draftmark()
        .arg("render")
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stdout("");

    let html = fs::read_to_string(&output).unwrap();
    assert!(html.starts_with("<ul class=\""));
    assert_eq!(html.matches("<li class=\"").count(), 2);
}

#[test]
fn annotate_honours_class_map_file() {
    let dir = tempfile::tempdir().unwrap();
    let map = dir.path().join("classes.json");
    fs::write(&map, r#"{"p": "prose"}"#).unwrap();

    draftmark()
        .args(["annotate", "--class-map"])
        .arg(&map)
        .arg("-")
        .write_stdin("<p class=\"lead\">Hi</p><div>x</div>")
        .assert()
        .success()
        .stdout("<p class=\"lead prose\">Hi</p><div>x</div>");
}

#[test]
fn draft_emits_response_json() {
    let model = "Here you go:\n```json\n{\"title\": \"Reading Corner\", \"bodyText\": \"Kids read daily.\", \"category\": \"student stories\", \"tags\": [\"reading\"], \"readingMinutes\": 4}\n```";
    let out = draftmark()
        .args(["draft", "-"])
        .write_stdin(model)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["succeeded"], true);
    assert_eq!(json["record"]["category"], "Student Stories");
    assert_eq!(json["record"]["readingMinutes"], 4);
    let body_html = json["record"]["bodyHtml"].as_str().unwrap();
    assert!(body_html.starts_with("<p class=\""));
    assert!(body_html.ends_with(">Kids read daily.</p>"));
}

#[test]
fn draft_reports_unusable_output_in_band() {
    draftmark()
        .args(["draft", "-"])
        .write_stdin("Sorry, I cannot help with that.")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"succeeded\": false"))
        .stdout(predicate::str::contains("no JSON object"));
}

#[test]
fn missing_input_fails() {
    draftmark()
        .args(["coerce", "/definitely/not/here.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("draftmark: i/o error"));
}

#[test]
fn bad_class_map_fails() {
    let dir = tempfile::tempdir().unwrap();
    let map = dir.path().join("classes.json");
    fs::write(&map, "[1, 2]").unwrap();

    draftmark()
        .args(["render", "--class-map"])
        .arg(&map)
        .arg("-")
        .write_stdin("text")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid class map"));
}
