#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const FIRST_RECORD: &str = r#"{"response":{"usage":{"input_token_details":{"audio_tokens":100,"text_tokens":10,"cached_tokens_details":{"audio_tokens":40,"text_tokens":0}},"output_token_details":{"audio_tokens":20,"text_tokens":5}}}}"#;
pub const SECOND_RECORD: &str = r#"{"response":{"usage":{"input_token_details":{"audio_tokens":50,"text_tokens":0,"cached_tokens_details":{"audio_tokens":0,"text_tokens":0}},"output_token_details":{"audio_tokens":10,"text_tokens":0}}}}"#;

pub fn write_log(dir: &Path, filename: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(filename);
    let mut file = File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    path
}

/// A realistic agent log: session chatter, usage events, the occasional truncated line.
pub fn realistic_lines(num_events: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for i in 0..num_events {
        lines.push(format!(r#"{{"type":"session.updated","event_id":"evt_{}"}}"#, i));
        lines.push(format!(
            r#"{{"type":"response.done","response":{{"id":"resp_{i}","usage":{{"total_tokens":{},"input_token_details":{{"audio_tokens":{},"text_tokens":{},"cached_tokens_details":{{"audio_tokens":{},"text_tokens":{}}}}},"output_token_details":{{"audio_tokens":{},"text_tokens":{}}}}}}}}}"#,
            i * 7,
            100 + i,
            20 + i % 5,
            i % 3 * 10,
            i % 2,
            40 + i,
            i % 7
        ));
        if i % 10 == 5 {
            lines.push(concat!(
                r#"{"type":"response.done","#,
                r#""response":{"usage":{"input_token_details":{"audio_tokens":12"#
            )
            .to_string());
        }
        if i % 4 == 0 {
            lines.push(String::new());
        }
    }
    lines
}

pub fn setup_test_dir() -> TempDir {
    TempDir::new().unwrap()
}
