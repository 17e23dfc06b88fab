use clap::{Arg, ArgMatches, Command};

pub const SUBCOMMAND: &str = "server";

pub const ARG_PORT: &str = "port";
pub const ARG_BACKEND_URL: &str = "backend-url";
pub const ARG_BACKEND_TIMEOUT_SECONDS: &str = "backend-timeout-seconds";
pub const ARG_REMEMBER_ME_MAX_AGE: &str = "remember-me-max-age";

#[derive(Debug, Clone)]
pub struct Options {
    pub port: u16,
    pub backend_url: Option<String>,
    pub backend_timeout_seconds: u64,
    pub remember_me_max_age: u64,
}

impl Options {
    /// Parse the `server` arguments.
    ///
    /// # Errors
    /// Returns an error if a defaulted argument is missing.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let read_u64 = |id: &str| -> anyhow::Result<u64> {
            matches
                .get_one::<u64>(id)
                .copied()
                .ok_or_else(|| anyhow::anyhow!("missing required argument: --{id}"))
        };

        Ok(Self {
            port: matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080),
            backend_url: matches
                .get_one::<String>(ARG_BACKEND_URL)
                .cloned()
                .filter(|v| !v.trim().is_empty()),
            backend_timeout_seconds: read_u64(ARG_BACKEND_TIMEOUT_SECONDS)?,
            remember_me_max_age: read_u64(ARG_REMEMBER_ME_MAX_AGE)?,
        })
    }
}

#[must_use]
pub fn subcommand() -> Command {
    Command::new(SUBCOMMAND)
        .about("Run the authentication proxy")
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8080")
                .env("AUTHGATE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_BACKEND_URL)
                .long(ARG_BACKEND_URL)
                .help("Base URL of the authentication backend, example: https://api.tld")
                .long_help(
                    "Base URL of the authentication backend. Without it every proxy route answers with a server configuration error.",
                )
                .env("AUTHGATE_BACKEND_URL"),
        )
        .arg(
            Arg::new(ARG_BACKEND_TIMEOUT_SECONDS)
                .long(ARG_BACKEND_TIMEOUT_SECONDS)
                .help("Timeout for backend requests in seconds")
                .env("AUTHGATE_BACKEND_TIMEOUT_SECONDS")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_REMEMBER_ME_MAX_AGE)
                .long(ARG_REMEMBER_ME_MAX_AGE)
                .help("Max-Age in seconds of the rememberMe cookie")
                .env("AUTHGATE_REMEMBER_ME_MAX_AGE")
                .default_value("3600")
                .value_parser(clap::value_parser!(u64)),
        )
}
