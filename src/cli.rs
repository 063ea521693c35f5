use std::path::PathBuf;
use std::time::Duration;

use clap::{Arg, ArgMatches, Command};

use crate::core::monitor::{RankingConfig, MAX_TOP_K};
use crate::core::scheduler::DEFAULT_INTERVAL;

const MIN_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub interval: Duration,
    pub ranking: RankingConfig,
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            ranking: RankingConfig::default(),
            log_file: None,
        }
    }
}

fn command() -> Command {
    Command::new("cputop")
        .version("0.1.0")
        .about("Floating overlay of the processes using the most CPU")
        .arg(
            Arg::new("interval")
                .short('i')
                .long("interval")
                .help("Refresh interval in milliseconds")
                .value_name("MS")
                .num_args(1)
        )
        .arg(
            Arg::new("top")
                .short('k')
                .long("top")
                .help("Number of processes to show")
                .value_name("K")
                .num_args(1)
        )
        .arg(
            Arg::new("threshold")
                .short('t')
                .long("threshold")
                .help("Hide processes at or below this CPU percentage")
                .value_name("PCT")
                .num_args(1)
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Write logs to this file (filter with RUST_LOG)")
                .value_name("PATH")
                .num_args(1)
        )
}

pub fn parse_args() -> Settings {
    settings_from(&command().get_matches())
}

#[cfg(test)]
pub fn parse_from<I, T>(args: I) -> Result<Settings, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    command().try_get_matches_from(args).map(|matches| settings_from(&matches))
}

fn settings_from(matches: &ArgMatches) -> Settings {
    let mut settings = Settings::default();

    if let Some(interval_str) = matches.get_one::<String>("interval") {
        match interval_str.parse::<u64>() {
            Ok(ms) if ms >= MIN_INTERVAL_MS => settings.interval = Duration::from_millis(ms),
            _ => eprintln!(
                "Warning: Invalid interval '{}' (minimum {} ms), using default",
                interval_str, MIN_INTERVAL_MS
            ),
        }
    }

    if let Some(top_str) = matches.get_one::<String>("top") {
        match top_str.parse::<usize>() {
            Ok(top_k) if (1..=MAX_TOP_K).contains(&top_k) => settings.ranking.top_k = top_k,
            _ => eprintln!(
                "Warning: Invalid count '{}' (1 to {}), using default",
                top_str, MAX_TOP_K
            ),
        }
    }

    if let Some(threshold_str) = matches.get_one::<String>("threshold") {
        match threshold_str.parse::<f64>() {
            Ok(threshold) if threshold.is_finite() && (0.0..100.0).contains(&threshold) => {
                settings.ranking.threshold = threshold
            }
            _ => eprintln!("Warning: Invalid threshold '{}', using default", threshold_str),
        }
    }

    if let Some(path) = matches.get_one::<String>("log-file") {
        settings.log_file = Some(PathBuf::from(path));
    }

    settings
}
