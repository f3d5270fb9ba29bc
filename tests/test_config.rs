use clap::Parser;
use hearth::config::{Cli, Config, DEFAULT_LISTEN_ADDR};
use std::io::Write;
use std::path::PathBuf;

#[test]
fn test_config_defaults() {
    let cfg = Config::load(&Cli::default()).unwrap();

    assert_eq!(cfg.listen_addr, DEFAULT_LISTEN_ADDR);
    assert_eq!(cfg.listen_addr, "127.0.0.1:4221");
    assert_eq!(cfg.directory, PathBuf::from("."));
    assert_eq!(cfg.max_connections, None);
}

#[test]
fn test_cli_directory_flag() {
    let cli = Cli::try_parse_from(["hearth", "--directory", "/tmp/files"]).unwrap();
    let cfg = Config::load(&cli).unwrap();

    assert_eq!(cfg.directory, PathBuf::from("/tmp/files"));
    assert_eq!(cfg.listen_addr, "127.0.0.1:4221");
}

#[test]
fn test_cli_rejects_unknown_flag() {
    assert!(Cli::try_parse_from(["hearth", "--verbose-mode"]).is_err());
}

#[test]
fn test_yaml_partial_config_uses_defaults() {
    let cfg = Config::from_yaml_str("max_connections: 64\n").unwrap();

    assert_eq!(cfg.max_connections, Some(64));
    assert_eq!(cfg.listen_addr, "127.0.0.1:4221");
}

#[test]
fn test_yaml_invalid_is_error() {
    assert!(Config::from_yaml_str("max_connections: lots\n").is_err());
}

#[test]
fn test_cli_overrides_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "listen_addr: \"0.0.0.0:5000\"\ndirectory: /srv/a\nmax_connections: 8").unwrap();

    let cli = Cli {
        directory: Some(PathBuf::from("/srv/b")),
        config: Some(file.path().to_path_buf()),
        ..Cli::default()
    };
    let cfg = Config::load(&cli).unwrap();

    assert_eq!(cfg.listen_addr, "0.0.0.0:5000");
    assert_eq!(cfg.directory, PathBuf::from("/srv/b"));
    assert_eq!(cfg.max_connections, Some(8));
}

#[test]
fn test_missing_config_file_is_error() {
    let cli = Cli {
        config: Some(PathBuf::from("/definitely/not/here.yaml")),
        ..Cli::default()
    };

    assert!(Config::load(&cli).is_err());
}

#[test]
fn test_zero_max_connections_rejected() {
    let cli = Cli {
        max_connections: Some(0),
        ..Cli::default()
    };

    assert!(Config::load(&cli).is_err());
}
