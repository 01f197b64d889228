use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use clap::{Arg, ArgMatches, Command};
use serde::{Deserialize, Serialize};

use crate::{
    auth::Page,
    error::{Error, Result},
    store::STORAGE_KEY,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub storage_key: String,
    /// Delay before a status change lands, in milliseconds.
    pub transition_ms: u64,
    pub log_file: Option<PathBuf>,
    pub log_level: String,
    pub start_page: Page,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            storage_key: STORAGE_KEY.to_string(),
            transition_ms: 120,
            log_file: None,
            log_level: "info".to_string(),
            start_page: Page::Signup,
        }
    }
}

impl Config {
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(Error::Config(format!("{}: {err}", path.display()))),
        };
        serde_json::from_str(&data)
            .map_err(|err| Error::Config(format!("{}: {err}", path.display())))
    }

    /// Config file named by `--config`, then the remaining flags on top.
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let mut config = match matches.get_one::<String>("config") {
            Some(path) => Self::load(Path::new(path))?,
            None => Self::default(),
        };
        if let Some(dir) = matches.get_one::<String>("data-dir") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(level) = matches.get_one::<String>("log-level") {
            config.log_level = level.clone();
        }
        if let Some(page) = matches.get_one::<String>("page") {
            config.start_page =
                Page::parse(page).ok_or_else(|| Error::Config(format!("unknown page: {page}")))?;
        }
        Ok(config)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("taskflow.log"))
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }
}

pub fn command() -> Command {
    Command::new("taskflow")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Terminal task board with todo, in-progress and completed lanes")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("JSON config file"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("Directory holding the task store and log"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log filter used when RUST_LOG is unset"),
        )
        .arg(
            Arg::new("page")
                .long("page")
                .value_name("PAGE")
                .value_parser(["signup", "login", "dashboard"])
                .help("Screen to start on"),
        )
}
