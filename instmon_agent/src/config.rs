//! Agent configuration: CLI flags, then environment, then defaults.

use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STREAM_PORT: u16 = 3001;
pub const DEFAULT_DB: &str = "./data.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Production,
}

impl RunMode {
    pub fn from_env_value(v: Option<&str>) -> Self {
        match v.map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "production" || s == "prod" => RunMode::Production,
            _ => RunMode::Development,
        }
    }

    /// Filter used when RUST_LOG is unset.
    pub fn default_log_filter(self) -> &'static str {
        match self {
            RunMode::Development => "instmon_agent=debug,info",
            RunMode::Production => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub port: u16,
    pub stream_port: u16,
    pub db_path: PathBuf,
    pub mode: RunMode,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            stream_port: DEFAULT_STREAM_PORT,
            db_path: PathBuf::from(DEFAULT_DB),
            mode: RunMode::Development,
        }
    }
}

fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--port PORT|-p PORT] [--stream-port PORT|-s PORT] [--db PATH]\n\
         Environment: INSTMON_ENV=development|production, INSTMON_PORT, INSTMON_STREAM_PORT, INSTMON_DB, RUST_LOG"
    )
}

fn parse_port(flag: &str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort {
        flag: flag.to_string(),
        value: value.to_string(),
    })
}

impl AgentConfig {
    /// `env` is a lookup so tests can feed a fixed environment.
    pub fn from_args_and_env<I, F>(args: I, env: F) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = AgentConfig {
            mode: RunMode::from_env_value(env("INSTMON_ENV").as_deref()),
            ..AgentConfig::default()
        };
        if let Some(v) = env("INSTMON_PORT") {
            cfg.port = parse_port("INSTMON_PORT", &v)?;
        }
        if let Some(v) = env("INSTMON_STREAM_PORT") {
            cfg.stream_port = parse_port("INSTMON_STREAM_PORT", &v)?;
        }
        if let Some(v) = env("INSTMON_DB").filter(|v| !v.is_empty()) {
            cfg.db_path = PathBuf::from(v);
        }

        let mut it = args.into_iter();
        let prog = it.next().unwrap_or_else(|| "instmon_agent".into());
        while let Some(a) = it.next() {
            let (flag, inline) = match a.split_once('=') {
                Some((f, v)) if f.starts_with("--") => (f.to_string(), Some(v.to_string())),
                _ => (a.clone(), None),
            };
            let mut value = |name: &str| {
                inline
                    .clone()
                    .or_else(|| it.next())
                    .ok_or_else(|| ConfigError::MissingValue(name.to_string()))
            };
            match flag.as_str() {
                "-h" | "--help" => return Err(ConfigError::Help(usage(&prog))),
                "--port" | "-p" => cfg.port = parse_port(&flag, &value(&flag)?)?,
                "--stream-port" | "-s" => cfg.stream_port = parse_port(&flag, &value(&flag)?)?,
                "--db" => cfg.db_path = PathBuf::from(value(&flag)?),
                _ => return Err(ConfigError::Unexpected(a)),
            }
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn args(v: &[&str]) -> Vec<String> {
        std::iter::once("agent")
            .chain(v.iter().copied())
            .map(String::from)
            .collect()
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let m: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| m.get(k).cloned()
    }

    #[test]
    fn defaults() {
        let cfg = AgentConfig::from_args_and_env(args(&[]), env_of(&[])).unwrap();
        assert_eq!(cfg, AgentConfig::default());
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.stream_port, 3001);
    }

    #[test]
    fn port_long_short_and_assign() {
        let cfg = AgentConfig::from_args_and_env(args(&["--port", "9001"]), env_of(&[])).unwrap();
        assert_eq!(cfg.port, 9001);
        let cfg = AgentConfig::from_args_and_env(args(&["-p", "9002", "-s", "9003"]), env_of(&[]))
            .unwrap();
        assert_eq!((cfg.port, cfg.stream_port), (9002, 9003));
        let cfg =
            AgentConfig::from_args_and_env(args(&["--stream-port=9004"]), env_of(&[])).unwrap();
        assert_eq!(cfg.stream_port, 9004);
    }

    #[test]
    fn flags_beat_env() {
        let env = env_of(&[
            ("INSTMON_PORT", "7000"),
            ("INSTMON_DB", "/tmp/x.db"),
            ("INSTMON_ENV", "production"),
        ]);
        let cfg = AgentConfig::from_args_and_env(args(&["-p", "7001"]), env).unwrap();
        assert_eq!(cfg.port, 7001);
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(cfg.mode, RunMode::Production);
    }

    #[test]
    fn bad_input() {
        assert!(matches!(
            AgentConfig::from_args_and_env(args(&["-p", "nope"]), env_of(&[])),
            Err(ConfigError::InvalidPort { .. })
        ));
        assert!(matches!(
            AgentConfig::from_args_and_env(args(&["--port"]), env_of(&[])),
            Err(ConfigError::MissingValue(_))
        ));
        assert!(matches!(
            AgentConfig::from_args_and_env(args(&["--bogus"]), env_of(&[])),
            Err(ConfigError::Unexpected(_))
        ));
        assert!(matches!(
            AgentConfig::from_args_and_env(args(&["--help"]), env_of(&[])),
            Err(ConfigError::Help(_))
        ));
    }

    #[test]
    fn run_mode_parsing() {
        assert_eq!(RunMode::from_env_value(None), RunMode::Development);
        assert_eq!(RunMode::from_env_value(Some("PRODUCTION")), RunMode::Production);
        assert_eq!(RunMode::from_env_value(Some("dev")), RunMode::Development);
    }
}
