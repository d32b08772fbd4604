//! Tests for loading configuration from files and flags.

use std::io::Write;
use strictly_gomoku_server::{Cli, ServerConfig};
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_file() {
    let file = config_file(
        r#"
host = "0.0.0.0"
port = 7000
grid_size = 15
winning_length = 5
queue_capacity = 8
idle_timeout_secs = 30
send_rejections = true
"#,
    );

    let config = ServerConfig::from_file(file.path()).unwrap();
    assert_eq!(config.listen_addr(), "0.0.0.0:7000");
    assert_eq!(*config.grid_size(), 15);
    assert_eq!(*config.queue_capacity(), 8);
    assert_eq!(*config.idle_timeout_secs(), Some(30));
    assert!(*config.send_rejections());
    assert!(!*config.enforce_turns());
    assert!(config.validate().is_ok());
}

#[test]
fn test_malformed_file_is_error() {
    let file = config_file("port = \"not a number\"\n");
    let err = ServerConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("parse"));
}

#[test]
fn test_flags_override_file() {
    let file = config_file("port = 7000\nqueue_capacity = 8\n");
    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        port: Some(7100),
        ..Cli::default()
    };

    let config = cli.into_config().unwrap();
    assert_eq!(*config.port(), 7100);
    assert_eq!(*config.queue_capacity(), 8);
}

#[test]
fn test_invalid_file_values_rejected_by_cli() {
    let file = config_file("grid_size = 3\nwinning_length = 5\n");
    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        ..Cli::default()
    };
    assert!(cli.into_config().is_err());
}
