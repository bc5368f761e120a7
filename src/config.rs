//! Provides the CLI option parser
//!
//! Used to parse the argv/config file into a struct that the host driver can
//! consume and use as configuration data.

use backends::ElasticConfig;
use clap::{App, Arg};
use error::Error;
use std::fs::File;
use std::io::Read;
use toml;

const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");

fn default_version() -> String {
    VERSION.unwrap_or("unknown").to_string()
}

/// Configuration for the statsd-elastic executable
///
/// Please see documentation on `parse_args` in this module for more details.
#[derive(Debug)]
pub struct Args {
    /// The verbosity setting. The higher the value the more chatty the
    /// backend gets.
    pub verbose: u64,
    /// Version string. This is set automatically.
    pub version: String,
    /// See `backends::Elastic` for more.
    pub elastic: ElasticConfig,
}

impl Default for Args {
    fn default() -> Self {
        Args {
            verbose: 0,
            version: default_version(),
            elastic: ElasticConfig::default(),
        }
    }
}

/// Parse the command line arguments
///
/// Reads argv and, when `--config` is given, the TOML file it names. Without
/// a config file every option takes its default.
pub fn parse_args() -> Result<Args, Error> {
    let args = App::new("statsd-elastic")
        .version(VERSION.unwrap_or("unknown"))
        .about("ships statsd flushes into elasticsearch")
        .arg(
            Arg::with_name("config-file")
                .long("config")
                .short("C")
                .value_name("config")
                .help("The config file to feed in.")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Turn on verbose output."),
        )
        .get_matches();

    let verb = args.occurrences_of("verbose");

    match args.value_of("config-file") {
        Some(filename) => {
            let mut fp = File::open(filename)?;
            let mut buffer = String::new();
            fp.read_to_string(&mut buffer)?;
            parse_config_file(&buffer, verb)
        }
        None => {
            let mut args = Args::default();
            args.verbose = verb;
            Ok(args)
        }
    }
}

fn string_opt(tbl: &toml::Value, key: &str, default: String) -> Result<String, Error> {
    match tbl.get(key) {
        Some(v) => v.as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::Config(format!("{} must be a string", key))),
        None => Ok(default),
    }
}

fn bool_opt(tbl: &toml::Value, key: &str, default: bool) -> Result<bool, Error> {
    match tbl.get(key) {
        Some(v) => v.as_bool()
            .ok_or_else(|| Error::Config(format!("{} must be a boolean", key))),
        None => Ok(default),
    }
}

fn int_opt(tbl: &toml::Value, key: &str, min: i64, max: i64) -> Result<Option<i64>, Error> {
    match tbl.get(key) {
        Some(v) => match v.as_integer() {
            Some(i) if i >= min && i <= max => Ok(Some(i)),
            Some(i) => Err(Error::Config(format!(
                "{} must be between {} and {}, got {}",
                key, min, max, i
            ))),
            None => Err(Error::Config(format!("{} must be an integer", key))),
        },
        None => Ok(None),
    }
}

/// Parse the configuration file.
///
/// `debug` lives at the top level, everything else in an `[elasticsearch]`
/// table:
///
/// ```toml
/// debug = false
///
/// [elasticsearch]
/// host = "localhost"
/// port = 9200
/// path = "/"
/// indexPrefix = "statsd"
/// countType = "counter"
/// timerType = "timer"
/// timerDataType = "timer_stats"
/// exportTimers = false
/// maxInFlight = 8
/// timeout = 30
/// ```
pub fn parse_config_file(buffer: &str, verbosity: u64) -> Result<Args, Error> {
    let mut args = Args::default();
    let value: toml::Value = toml::from_str(buffer)?;

    args.verbose = verbosity;

    let mut res = ElasticConfig::default();
    res.debug = bool_opt(&value, "debug", res.debug)?;

    if let Some(snk) = value.get("elasticsearch") {
        if !snk.is_table() {
            return Err(Error::Config("elasticsearch must be a table".to_string()));
        }
        res.host = string_opt(snk, "host", res.host)?;
        res.port = int_opt(snk, "port", 1, i64::from(u16::max_value()))?
            .map(|p| p as u16)
            .unwrap_or(res.port);
        res.path = string_opt(snk, "path", res.path)?;
        res.index_prefix = string_opt(snk, "indexPrefix", res.index_prefix)?;
        res.types.counter = string_opt(snk, "countType", res.types.counter)?;
        res.types.timer = string_opt(snk, "timerType", res.types.timer)?;
        res.types.timer_data = string_opt(snk, "timerDataType", res.types.timer_data)?;
        res.export_timers = bool_opt(snk, "exportTimers", res.export_timers)?;
        res.max_in_flight = int_opt(snk, "maxInFlight", 1, i64::from(u16::max_value()))?
            .map(|m| m as usize)
            .unwrap_or(res.max_in_flight);
        res.timeout = match int_opt(snk, "timeout", 1, i64::from(u32::max_value()))? {
            Some(t) => Some(t as u64),
            None => res.timeout,
        };
    }

    args.elastic = res;
    Ok(args)
}
