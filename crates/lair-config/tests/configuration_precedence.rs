//! Layering tests for the shared configuration loader.
//!
//! Each test builds an explicit argument list so the process environment and
//! real command line never leak into the result.

use std::ffi::OsString;
use std::fs;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use lair_config::{Config, LogFormat, SocketEndpoint, default_server_endpoint};

static LOADER_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct Harness {
    temp_dir: TempDir,
    args: Vec<OsString>,
    _guard: MutexGuard<'static, ()>,
}

impl Harness {
    fn new() -> Self {
        let guard = LOADER_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let temp_dir = TempDir::new().expect("create temp dir");
        Self {
            temp_dir,
            args: vec![OsString::from("lair")],
            _guard: guard,
        }
    }

    fn with_file(mut self, contents: &str) -> Self {
        let path = self.temp_dir.path().join("lair.toml");
        fs::write(&path, contents).expect("write configuration file");
        self.args.push(OsString::from("--config-path"));
        self.args.push(path.into_os_string());
        self
    }

    fn with_flag(mut self, flag: &str, value: &str) -> Self {
        self.args.push(OsString::from(flag));
        self.args.push(OsString::from(value));
        self
    }

    fn load(self) -> Config {
        Config::load_from_args(self.args.clone()).expect("configuration should load")
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[rstest]
fn defaults_apply_without_sources(harness: Harness) {
    let config = harness.load();
    assert_eq!(config.server(), &default_server_endpoint());
    assert_eq!(config.log_format(), LogFormat::Compact);
}

#[rstest]
fn file_overrides_defaults(harness: Harness) {
    let config = harness
        .with_file("server = { transport = \"tcp\", host = \"10.0.0.5\", port = 9100 }\n")
        .load();
    assert_eq!(config.server(), &SocketEndpoint::tcp("10.0.0.5", 9100));
}

#[rstest]
fn cli_flags_override_file(harness: Harness) {
    let config = harness
        .with_file("server = { transport = \"tcp\", host = \"10.0.0.5\", port = 9100 }\nlog_format = \"json\"\n")
        .with_flag("--server", "tcp://127.0.0.1:9200")
        .with_flag("--log-format", "compact")
        .load();
    assert_eq!(config.server(), &SocketEndpoint::tcp("127.0.0.1", 9200));
    assert_eq!(config.log_format(), LogFormat::Compact);
}

#[rstest]
fn invalid_server_flag_is_rejected(harness: Harness) {
    let args = harness.with_flag("--server", "ftp://nowhere").args.clone();
    assert!(Config::load_from_args(args).is_err());
}
