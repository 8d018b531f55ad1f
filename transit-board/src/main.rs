use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser as _, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use transit_board::board::{self, CancelFlag, Planned, StationReport};
use transit_board::config::{
    DEFAULT_BART_API_URL, DEFAULT_BART_KEY, DEFAULT_BART_WEB_URL, DEFAULT_CALTRAIN_URL, FeedConfig,
};
use transit_board::directory::{AliasBook, AliasConfig, DEFAULT_HOME, DEFAULT_WORK, Directory};
use transit_board::feed::{FeedClient, Fetcher, Parser, RawPayload, StationContext, bart};
use transit_board::render::{self, OutputFormat};

#[derive(clap::Parser, Debug)]
#[command(author, version, about = "Real-time Caltrain and BART departures", long_about = None)]
struct Cli {
    #[command(flatten)]
    feeds: FeedArgs,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct FeedArgs {
    /// Caltrain website base URL
    #[arg(long, global = true, env = "CALT_URL", default_value = DEFAULT_CALTRAIN_URL)]
    caltrain_url: String,

    /// BART API base URL
    #[arg(long, global = true, env = "BART_URL", default_value = DEFAULT_BART_API_URL)]
    bart_url: String,

    /// BART website base URL (fleet pages)
    #[arg(long, global = true, env = "BART_WEB_URL", default_value = DEFAULT_BART_WEB_URL)]
    bart_web_url: String,

    /// BART API key
    #[arg(long, global = true, env = "BART_KEY", default_value = DEFAULT_BART_KEY)]
    bart_key: String,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 10)]
    timeout: u64,

    /// Maximum requests in flight
    #[arg(long, global = true, default_value_t = 4)]
    max_concurrent: usize,
}

impl FeedArgs {
    fn config(&self) -> FeedConfig {
        FeedConfig::new()
            .with_caltrain_url(&self.caltrain_url)
            .with_bart_api_url(&self.bart_url)
            .with_bart_web_url(&self.bart_web_url)
            .with_bart_key(&self.bart_key)
            .with_timeout(self.timeout)
            .with_max_concurrent(self.max_concurrent)
    }
}

#[derive(Args, Debug)]
struct AliasArgs {
    /// Station used for "home"
    #[arg(long, env = "CALT_HOME", default_value = DEFAULT_HOME)]
    home: String,

    /// Station used for "work"
    #[arg(long, env = "CALT_WORK", default_value = DEFAULT_WORK)]
    work: String,

    /// Stations used for "hubs"
    #[arg(long, env = "CALT_HUB", value_delimiter = ',')]
    hubs: Vec<String>,

    /// Stations used for "mine"
    #[arg(long, env = "CALT_MINE", value_delimiter = ',')]
    mine: Vec<String>,
}

impl AliasArgs {
    fn book(&self) -> AliasBook {
        let mut config = AliasConfig::default()
            .with_home(&self.home)
            .with_work(&self.work);
        if !self.hubs.is_empty() {
            config = config.with_hubs(self.hubs.clone());
        }
        if !self.mine.is_empty() {
            config = config.with_mine(self.mine.clone());
        }
        AliasBook::new(&config)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Caltrain departures for stations or named groups
    Caltrain {
        /// Station names, slugs or groups (home, work, both, hubs, mine, ...)
        #[arg(env = "CALT_END", value_delimiter = ',')]
        stations: Vec<String>,

        /// Every station on the line
        #[arg(long)]
        all: bool,

        /// Use the form-based site instead of station pages
        #[arg(long)]
        form: bool,

        #[arg(long, env = "CALT_FMT", default_value = "text", value_parser = loose_format)]
        format: OutputFormat,

        #[command(flatten)]
        aliases: AliasArgs,
    },
    /// BART departures from the real-time API
    Bart {
        /// Station abbreviations, or ALL
        #[arg(env = "BART_END", value_delimiter = ',', default_value = bart::ALL_STATIONS)]
        stations: Vec<String>,

        #[arg(long, env = "BART_FMT", default_value = "text", value_parser = loose_format)]
        format: OutputFormat,
    },
    /// New-fleet BART trains from the website
    Fleet {
        /// Station abbreviations; every station when empty
        #[arg(env = "BART_END", value_delimiter = ',')]
        stations: Vec<String>,

        #[arg(long, env = "BART_FMT", default_value = "text", value_parser = loose_format)]
        format: OutputFormat,
    },
    /// List Caltrain stations
    Stations {
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Caltrain stations in a fare zone
    Zone {
        zone: u8,
    },
    /// Direction of travel between two Caltrain stations
    Bearing {
        from: String,
        to: String,
    },
    /// Parse a saved payload without fetching
    Parse {
        /// bart, caltrain or fleet
        kind: Parser,

        file: PathBuf,

        /// Station key or abbreviation the payload belongs to
        #[arg(long, default_value = "?")]
        station: String,

        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
}

fn loose_format(value: &str) -> Result<OutputFormat, Infallible> {
    Ok(OutputFormat::from_setting(value))
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.feeds.config();
    debug!(?config, "feed configuration");

    match cli.cmd {
        Command::Caltrain {
            stations,
            all,
            form,
            format,
            aliases,
        } => {
            let directory = Directory::caltrain(&config.caltrain_url);
            let mut plan = if all {
                board::plan_caltrain_all(&directory)
            } else if stations.is_empty() {
                board::plan_caltrain(&directory, &aliases.book(), &["both"])
            } else {
                board::plan_caltrain(&directory, &aliases.book(), stations.as_slice())
            };
            if form {
                plan = plan
                    .into_iter()
                    .map(|planned| match planned {
                        Planned::Fetch(job) => Planned::Fetch(job.via_form(&config)),
                        other => other,
                    })
                    .collect();
            }
            fetch_and_print(&config, plan, Parser::CaltrainHtml, format).await
        }
        Command::Bart { stations, format } => {
            let plan = board::plan_bart(&config, stations.as_slice());
            fetch_and_print(&config, plan, Parser::BartJson, format).await
        }
        Command::Fleet { stations, format } => {
            let stations = if stations.is_empty() {
                match all_bart_stations(&config).await {
                    Ok(stations) => stations,
                    Err(code) => return code,
                }
            } else {
                stations
            };
            let plan = board::plan_fleet(&config, stations.as_slice());
            fetch_and_print(&config, plan, Parser::FleetHtml, format).await
        }
        Command::Stations { format } => {
            let directory = Directory::caltrain(&config.caltrain_url);
            for station in directory.iter() {
                match render::render_station(station, format) {
                    Ok(line) => println!("{line}"),
                    Err(e) => {
                        error!(error = %e, "could not render station");
                        return ExitCode::FAILURE;
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Command::Zone { zone } => {
            let directory = Directory::caltrain(&config.caltrain_url);
            let mut stations: Vec<_> = directory.zone_stations(zone).into_values().collect();
            if stations.is_empty() {
                let known: Vec<String> = directory.zones().map(|z| z.to_string()).collect();
                eprintln!("no stations in zone {zone}; zones are {}", known.join(", "));
                return ExitCode::FAILURE;
            }
            stations.sort_by_key(|station| station.index);
            for station in stations {
                println!("{station}");
            }
            ExitCode::SUCCESS
        }
        Command::Bearing { from, to } => {
            let directory = Directory::caltrain(&config.caltrain_url);
            println!("{}", directory.bearing(&from, &to));
            ExitCode::SUCCESS
        }
        Command::Parse {
            kind,
            file,
            station,
            format,
        } => parse_file(kind, &file, &station, format),
    }
}

/// Station abbreviations from the BART API, for fleet lookups.
async fn all_bart_stations(config: &FeedConfig) -> Result<Vec<String>, ExitCode> {
    let client = FeedClient::new(config).map_err(|e| {
        error!(error = %e, "could not create HTTP client");
        ExitCode::FAILURE
    })?;
    let payload = client
        .fetch(&bart::stations_request(config))
        .await
        .map_err(|e| {
            eprintln!("{e}");
            ExitCode::FAILURE
        })?;
    bart::parse_station_list(&payload.body).map_err(|e| {
        eprintln!("BART station list: {e}");
        ExitCode::FAILURE
    })
}

async fn fetch_and_print(
    config: &FeedConfig,
    plan: Vec<Planned>,
    parser: Parser,
    format: OutputFormat,
) -> ExitCode {
    let client = match FeedClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "could not create HTTP client");
            return ExitCode::FAILURE;
        }
    };
    debug!(timeout = ?client.timeout(), "HTTP client ready");

    let cancel = CancelFlag::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let reports = board::run(&client, plan, config.max_concurrent, &cancel).await;
    print_reports(&reports, parser, format)
}

fn print_reports(reports: &[StationReport], parser: Parser, format: OutputFormat) -> ExitCode {
    let lines = match render::render_reports(reports, format) {
        Ok(lines) => lines,
        Err(e) => {
            error!(error = %e, "could not render departures");
            return ExitCode::FAILURE;
        }
    };
    for line in lines {
        println!("{line}");
    }

    let service_start = bart::minutes_until_service_start(chrono::Local::now().naive_local());
    for report in reports {
        for warning in render::warnings(report, parser, service_start) {
            eprintln!("{warning}");
        }
    }
    ExitCode::SUCCESS
}

fn parse_file(kind: Parser, file: &Path, station: &str, format: OutputFormat) -> ExitCode {
    let payload = match RawPayload::read_from(file) {
        Ok(payload) => payload,
        Err(e) => {
            eprintln!("{}: {e}", file.display());
            return ExitCode::FAILURE;
        }
    };

    let ctx = StationContext::current(station, station);
    match kind.parse_payload(&payload, &ctx) {
        Ok(records) => {
            for record in &records {
                match render::render_departure(record, format) {
                    Ok(line) => println!("{line}"),
                    Err(e) => {
                        error!(error = %e, "could not render departure");
                        return ExitCode::FAILURE;
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Err(failure) => {
            eprintln!("{failure}");
            ExitCode::FAILURE
        }
    }
}
