//! Command-line interface for the `ridejournal` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// ridejournal - serve a day-by-day bike touring journal
#[derive(Debug, Parser)]
#[command(name = "ridejournal")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP service
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory holding route.json, journal.json and photos.json (overrides DATA_DIR)
        #[arg(short, long, value_name = "DIR")]
        data_dir: Option<PathBuf>,
    },

    /// Place raw photos on the journey and write web-sized copies plus the manifest
    ProcessPhotos {
        #[arg(short, long, value_name = "DIR")]
        input: PathBuf,

        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        manifest: PathBuf,

        /// Public URL prefix of the output directory
        #[arg(long, default_value = crate::pipeline::manifest::DEFAULT_URL_PREFIX)]
        url_prefix: String,
    },

    /// Build the route file from per-day GPX recordings (day-<N>.gpx)
    ImportRoute {
        #[arg(short, long, value_name = "DIR")]
        input: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Existing route file whose weather is carried over
        #[arg(long, value_name = "FILE")]
        merge_weather: Option<PathBuf>,
    },
}

impl Cli {
    /// Default log filter for the chosen verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "ridejournal=info,tower_http=debug",
            1 => "ridejournal=debug,tower_http=debug",
            _ => "ridejournal=trace,tower_http=trace",
        }
    }
}
