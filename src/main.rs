//! Lease gateway CLI.
//!
//! Operator client for a remote provider gateway: provider, lease, and
//! service status queries plus live service log streaming.
//!
//! Usage:
//!   gateway status --endpoint http://provider:8443
//!   gateway lease-status --owner akash1... --dseq 140 --provider akash1...
//!   gateway service-logs --owner akash1... --dseq 140 --provider akash1... \
//!       --service web --follow --tail 100

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use gateway_client::{Client, StreamEnd};
use gateway_protocol::LeaseId;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gateway", about = "Lease gateway client")]
struct Cli {
    /// Gateway endpoint, e.g. http://provider.example.com:8443
    #[arg(long, global = true, default_value = "http://127.0.0.1:8443")]
    endpoint: String,

    /// Enable verbose logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Lease addressed by the standard five flags.
#[derive(Args, Debug)]
struct LeaseFlags {
    /// Deployment owner address
    #[arg(long)]
    owner: String,

    /// Deployment sequence
    #[arg(long)]
    dseq: u64,

    /// Group sequence
    #[arg(long, default_value_t = 1)]
    gseq: u32,

    /// Order sequence
    #[arg(long, default_value_t = 1)]
    oseq: u32,

    /// Provider address
    #[arg(long)]
    provider: String,
}

impl LeaseFlags {
    fn lease_id(&self) -> LeaseId {
        LeaseId {
            owner: self.owner.clone(),
            dseq: self.dseq,
            gseq: self.gseq,
            oseq: self.oseq,
            provider: self.provider.clone(),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Get provider status
    Status,

    /// Get the status of every service under a lease
    LeaseStatus {
        #[command(flatten)]
        lease: LeaseFlags,
    },

    /// Get the status of one service under a lease
    ServiceStatus {
        #[command(flatten)]
        lease: LeaseFlags,

        /// Service name
        #[arg(long)]
        service: String,
    },

    /// Stream service logs
    ServiceLogs {
        #[command(flatten)]
        lease: LeaseFlags,

        /// Service name
        #[arg(long)]
        service: String,

        /// Keep streaming as new lines are produced. Defaults to false
        #[arg(long, short = 'f')]
        follow: bool,

        /// Number of lines from the end of the logs to show
        #[arg(long, short = 't')]
        tail: Option<u32>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let client = Client::new();

    match cli.command {
        Command::Status => {
            let status = client
                .status(&cli.endpoint)
                .await
                .context("couldn't fetch provider status")?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::LeaseStatus { lease } => {
            let status = client
                .lease_status(&cli.endpoint, &lease.lease_id())
                .await
                .context("couldn't fetch lease status")?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::ServiceStatus { lease, service } => {
            let status = client
                .service_status(&cli.endpoint, &lease.lease_id(), &service)
                .await
                .context("couldn't fetch service status")?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::ServiceLogs {
            lease,
            service,
            follow,
            tail,
            format,
        } => {
            let mut stream = client
                .service_logs(&cli.endpoint, &lease.lease_id(), &service, follow, tail)
                .await
                .context("couldn't open log stream")?;

            while let Some(line) = stream.recv().await {
                match format {
                    OutputFormat::Text => println!("[{}] {}", line.name, line.message),
                    OutputFormat::Json => println!("{}", serde_json::to_string(&line)?),
                }
            }

            // An application close code carries the reason the server
            // refused or abandoned the stream; surface it.
            match stream.close_reason() {
                Some(StreamEnd::Closed { code, reason }) if code >= 4000 => bail!("{reason}"),
                Some(StreamEnd::Dropped) => warn!("log stream dropped before a close frame"),
                _ => {}
            }
        }
    }

    Ok(())
}
