use std::env;
use std::net::SocketAddr;
use std::process;

use chrono_tz::Tz;
use getopts::Options;
use tokio::time::Duration;

const ADDRESS_ENV: &str = "EVENT_PROXY_ADDR";
const UPSTREAM_ENV: &str = "EVENT_PROXY_UPSTREAM";
const API_KEY_ENV: &str = "EVENT_PROXY_API_KEY";
const TIME_ZONE_ENV: &str = "EVENT_PROXY_TIME_ZONE";

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub address: SocketAddr,
    pub upstream: String,
    pub api_key: Option<String>,
    pub zone: Tz,
    pub enable_cache: bool,
    pub cache_ttl: Duration,
}

#[derive(Debug)]
enum Parsed {
    Help(String),
    Run(Args),
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "a",
        "address",
        "Socket address (IP and port) to listen on [Env: EVENT_PROXY_ADDR] [Default: 127.0.0.1:8080]",
        "SOCKET_ADDRESS",
    );
    opts.optopt(
        "u",
        "upstream",
        "GraphQL endpoint of the event API [Env: EVENT_PROXY_UPSTREAM]",
        "URL",
    );
    opts.optopt(
        "k",
        "api-key",
        "API key sent to the event API [Env: EVENT_PROXY_API_KEY]",
        "KEY",
    );
    opts.optopt(
        "z",
        "time-zone",
        "IANA zone event times are entered in [Env: EVENT_PROXY_TIME_ZONE] [Default: UTC]",
        "ZONE",
    );
    opts.optflag(
        "c",
        "enable-cache",
        "Enable caching of fetched events [Default: false]",
    );
    opts.optopt(
        "t",
        "cache-ttl",
        "Time-to-live for cached events [Default: 3600]",
        "SECONDS",
    );
    opts
}

fn try_parse<F>(args: Vec<String>, env_var: F) -> Result<Parsed, String>
where
    F: Fn(&str) -> Option<String>,
{
    let opts = opts();
    let matches = opts.parse(args.iter().skip(1)).map_err(|fail| fail.to_string())?;

    if matches.opt_present("help") {
        return Ok(Parsed::Help(
            opts.usage(&opts.short_usage(env!("CARGO_PKG_NAME"))),
        ));
    }

    let lookup = |name: &str, var: &str| matches.opt_str(name).or_else(|| env_var(var));

    let address = match lookup("address", ADDRESS_ENV) {
        Some(value) => value
            .parse::<SocketAddr>()
            .map_err(|err| format!("Provided value for option 'address' is invalid: {err}"))?,
        None => SocketAddr::from(([127, 0, 0, 1], 8080)),
    };

    let upstream = lookup("upstream", UPSTREAM_ENV)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| format!("Missing option 'upstream' (or `{UPSTREAM_ENV}`)"))?;

    let api_key = lookup("api-key", API_KEY_ENV).filter(|value| !value.is_empty());

    let zone = match lookup("time-zone", TIME_ZONE_ENV) {
        Some(value) => value
            .parse::<Tz>()
            .map_err(|err| format!("Provided value for option 'time-zone' is invalid: {err}"))?,
        None => Tz::UTC,
    };

    let enable_cache = matches.opt_present("enable-cache");

    let cache_ttl = matches
        .opt_get_default("cache-ttl", 3600)
        .map(Duration::from_secs)
        .map_err(|err| format!("Provided value for option 'cache-ttl' is invalid: {err}"))?;

    Ok(Parsed::Run(Args {
        address,
        upstream,
        api_key,
        zone,
        enable_cache,
        cache_ttl,
    }))
}

pub fn parse(args: Vec<String>) -> Args {
    match try_parse(args, |var| env::var(var).ok()) {
        Ok(Parsed::Run(args)) => args,
        Ok(Parsed::Help(usage)) => {
            println!("{usage}");
            process::exit(0);
        }
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn run(args: &[&str], env: &[(&str, &str)]) -> Result<Args, String> {
        let args = std::iter::once("event-proxy")
            .chain(args.iter().copied())
            .map(String::from)
            .collect();
        let env = env
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();

        match try_parse(args, |var| env.get(var).cloned())? {
            Parsed::Run(args) => Ok(args),
            Parsed::Help(_) => Err("help".into()),
        }
    }

    #[test]
    fn defaults() {
        let args = run(&["-u", "https://api.example.test/graphql"], &[]).unwrap();

        assert_eq!(args.address, SocketAddr::from(([127, 0, 0, 1], 8080)));
        assert_eq!(args.upstream, "https://api.example.test/graphql");
        assert_eq!(args.api_key, None);
        assert_eq!(args.zone, Tz::UTC);
        assert!(!args.enable_cache);
        assert_eq!(args.cache_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn environment_fills_missing_flags() {
        let args = run(
            &["--enable-cache", "--cache-ttl", "60"],
            &[
                (UPSTREAM_ENV, "https://api.example.test/graphql"),
                (API_KEY_ENV, "da2-key"),
                (ADDRESS_ENV, "0.0.0.0:9000"),
                (TIME_ZONE_ENV, "Pacific/Honolulu"),
            ],
        )
        .unwrap();

        assert_eq!(args.address, SocketAddr::from(([0, 0, 0, 0], 9000)));
        assert_eq!(args.api_key.as_deref(), Some("da2-key"));
        assert_eq!(args.zone, chrono_tz::Pacific::Honolulu);
        assert!(args.enable_cache);
        assert_eq!(args.cache_ttl, Duration::from_secs(60));
    }

    #[test]
    fn flags_win_over_environment() {
        let args = run(
            &["-u", "https://flag.example.test/graphql", "-a", "127.0.0.1:3000"],
            &[
                (UPSTREAM_ENV, "https://env.example.test/graphql"),
                (ADDRESS_ENV, "0.0.0.0:9000"),
            ],
        )
        .unwrap();

        assert_eq!(args.upstream, "https://flag.example.test/graphql");
        assert_eq!(args.address.port(), 3000);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(run(&[], &[]).is_err());
        assert!(run(&["-u", "x", "-a", "localhost"], &[]).is_err());
        assert!(run(&["-u", "x", "-z", "Mars/Olympus"], &[]).is_err());
        assert!(run(&["-u", "x", "-t", "soon"], &[]).is_err());
    }

    #[test]
    fn help_flag() {
        assert_eq!(run(&["-h"], &[]), Err("help".to_string()));
    }
}
