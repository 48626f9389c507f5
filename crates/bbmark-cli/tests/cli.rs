use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin_path() -> PathBuf {
    if let Some(path) = env::var_os("CARGO_BIN_EXE_bbmark") {
        return PathBuf::from(path);
    }
    let exe = env::current_exe().expect("current exe");
    let mut debug_dir = exe.as_path();
    while let Some(parent) = debug_dir.parent() {
        if parent.file_name().and_then(|name| name.to_str()) == Some("debug") {
            let candidate = parent.join("bbmark");
            if candidate.exists() {
                return candidate;
            }
        }
        debug_dir = parent;
    }
    panic!("binary path missing");
}

fn temp_file(name: &str, ext: &str, contents: &str) -> PathBuf {
    let mut path = env::temp_dir();
    let now = SystemTime::now().duration_since(UNIX_EPOCH).expect("time");
    let file_name = format!(
        "bbmark_cli_{}_{}_{}.{}",
        name,
        now.as_secs(),
        now.subsec_nanos(),
        ext
    );
    path.push(file_name);
    fs::write(&path, contents).expect("write temp file");
    path
}

#[test]
fn renders_a_file_to_a_fragment() {
    let input = temp_file("fragment", "bb", "[b]bold[/b] text");
    let output = Command::new(bin_path())
        .arg(input.to_str().expect("path"))
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "<strong>bold</strong> text");
}

#[test]
fn reads_stdin_when_no_input_is_given() {
    let mut child = Command::new(bin_path())
        .args(["--dialect", "plain"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"[b]<x>[/b]")
        .expect("write stdin");
    let output = child.wait_with_output().expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "[b]&lt;x&gt;[/b]");
}

#[test]
fn standalone_wraps_html_with_assets() {
    let input = temp_file("standalone", "bb", "Paragraph.");
    let output = Command::new(bin_path())
        .args(["--standalone", "--theme", "dark", input.to_str().expect("path")])
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<!DOCTYPE html>"), "expected HTML wrapper");
    assert!(stdout.contains("<style>"), "expected inline CSS");
    assert!(stdout.contains("--bbmark-bg: #0e1116;"), "expected dark palette");
    assert!(stdout.contains("Paragraph."));
    assert!(!stdout.contains("<script"), "no spoilers, no script");
}

#[test]
fn standalone_can_link_generated_assets() {
    let input = temp_file("linked", "bb", "[spoiler]boo[/spoiler]");
    let dir = env::temp_dir().join(format!("bbmark_cli_assets_{}", std::process::id()));
    let output = Command::new(bin_path())
        .args([
            "--standalone",
            "--assets",
            dir.to_str().expect("path"),
            input.to_str().expect("path"),
        ])
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("href=\"bbmark.css\""));
    assert!(stdout.contains("src=\"bbmark.js\""));
    assert!(!stdout.contains("<style>"));
    assert!(dir.join("bbmark.css").exists());
    assert!(dir.join("bbmark.js").exists());
}

#[test]
fn flags_override_render_options() {
    let input = temp_file("flags", "bb", "a -- b\n\nhttp://x.com [img]http://x.com/a.png[/img]");
    let output = Command::new(bin_path())
        .args([
            "--paragraphs",
            "--no-autolink",
            "--no-cosmetic",
            "--exclude",
            "img",
            input.to_str().expect("path"),
        ])
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "<p>a -- b</p><p>http://x.com http://x.com/a.png</p>");
}

#[test]
fn strict_mode_reports_position_and_exit_code() {
    let input = temp_file("strict", "bb", "ok\n[url=javascript:x]y[/url]");
    let output = Command::new(bin_path())
        .args(["--strict", input.to_str().expect("path")])
        .output()
        .expect("run");

    assert!(!output.status.success(), "expected error exit code");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("2:1: error: [url]"), "unexpected stderr: {stderr}");
    assert!(stderr.contains("javascript"));
}

#[test]
fn sections_are_printed_as_json() {
    let input = temp_file(
        "sections",
        "bb",
        "[b]x[/b][section=Side Bar]one[/section][section=side bar]two[/section]",
    );
    let output = Command::new(bin_path())
        .args(["--sections", input.to_str().expect("path")])
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "<strong>x</strong>");
    let stderr = String::from_utf8_lossy(&output.stderr);
    let sections: serde_json::Value = serde_json::from_str(stderr.trim()).expect("json");
    assert_eq!(sections, serde_json::json!({ "side_bar": ["one", "two"] }));
}

#[test]
fn section_tags_are_dropped_without_sections() {
    let input = temp_file("no_sections", "bb", "a[section=x]b[/section]");
    let output = Command::new(bin_path())
        .arg(input.to_str().expect("path"))
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "ab");
}

#[test]
fn config_file_adds_emoticons_and_mentions() {
    let config = temp_file(
        "config",
        "toml",
        "[render]\ncosmetic_replace = false\n\n[emoticons]\nstatic_url = \"/s/\"\n\n[mentions]\nusers = [{ id = 1, username = \"alice\" }]\n",
    );
    let input = temp_file("config_input", "bb", "@alice :-)");
    let output = Command::new(bin_path())
        .args([
            "--config",
            config.to_str().expect("path"),
            input.to_str().expect("path"),
        ])
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout,
        "<u class=\"user-tag\">@alice</u> <img class=\"smiley\" src=\"/s/img/smileys/special-smile.gif\"/>"
    );
}

#[test]
fn bad_config_is_a_usage_error() {
    let config = temp_file("bad_config", "toml", "dialect = \"markdown\"\n");
    let input = temp_file("bad_config_input", "bb", "x");
    let output = Command::new(bin_path())
        .args([
            "--config",
            config.to_str().expect("path"),
            input.to_str().expect("path"),
        ])
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid config"));
}
