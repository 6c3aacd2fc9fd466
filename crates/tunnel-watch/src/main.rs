use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tunnel_watch_core::{
    ClientConfig, SnapshotFetcher, SystemClock, TflClient, TunnelState, TunnelStatusService,
    TunnelStatusSnapshot, DEFAULT_BASE_URL, DEFAULT_TUNNEL_NAME,
};

/// Exit code for any failure (usage errors from clap also exit 2).
const EXIT_ERROR: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "tunnel-watch",
    version,
    about = "Report whether the Rotherhithe Tunnel is open or closed (TfL).",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Cmd>,

    /// Used when no subcommand is given.
    #[command(flatten)]
    status: StatusArgs,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Check tunnel status via TfL road disruptions.
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
struct StatusArgs {
    /// Tunnel name to match in TfL disruptions (case-insensitive substring match)
    #[arg(long, default_value = DEFAULT_TUNNEL_NAME)]
    tunnel_name: String,

    /// Output JSON to stdout
    #[arg(long)]
    json: bool,

    /// Print only OPEN/CLOSED/UNKNOWN (stdout)
    #[arg(long)]
    quiet: bool,

    /// TfL API base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// TfL app id
    #[arg(long, env = "TFL_APP_ID", default_value = "", hide_env_values = true)]
    app_id: String,

    /// TfL app key
    #[arg(long, env = "TFL_APP_KEY", default_value = "", hide_env_values = true)]
    app_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Quiet,
    Json,
}

impl StatusArgs {
    fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.quiet {
            OutputFormat::Quiet
        } else {
            OutputFormat::Text
        }
    }

    fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.base_url)
            .with_credentials(Some(self.app_id.clone()), Some(self.app_key.clone()))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let args = match cli.cmd {
        Some(Cmd::Status(args)) => args,
        None => cli.status,
    };

    match run_status(&args).await {
        Ok(state) => ExitCode::from(state.exit_code()),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn run_status(args: &StatusArgs) -> anyhow::Result<TunnelState> {
    // Credentials stay out of the log; only whether they are set.
    debug!(
        tunnel = %args.tunnel_name,
        base_url = %args.base_url,
        format = ?args.format(),
        app_id_set = !args.app_id.is_empty(),
        app_key_set = !args.app_key.is_empty(),
        "checking tunnel status"
    );
    let client = TflClient::new(args.client_config())?;
    let fetcher = SnapshotFetcher::new(TunnelStatusService::new(client), SystemClock);

    let snap = fetcher.fetch_snapshot(&args.tunnel_name).await?;
    println!("{}", render(&snap, args.format())?);
    Ok(snap.state)
}

fn render(snap: &TunnelStatusSnapshot, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(snap).context("encode snapshot")?,
        OutputFormat::Quiet => snap.state.label().to_string(),
        OutputFormat::Text => format!(
            "{}: {} — {}",
            snap.tunnel_name,
            snap.state.label(),
            snap.severity_description
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tunnel_watch_core::snapshot;

    fn sample() -> TunnelStatusSnapshot {
        snapshot("Rotherhithe Tunnel", TunnelState::Closed, "Rotherhithe Tunnel closed", 10)
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn status_is_the_default_subcommand() {
        let cli =
            Cli::try_parse_from(["tunnel-watch", "--quiet", "--tunnel-name", "Blackwall"])
                .unwrap();
        assert!(cli.cmd.is_none());
        assert_eq!(cli.status.tunnel_name, "Blackwall");
        assert_eq!(cli.status.format(), OutputFormat::Quiet);

        let cli = Cli::try_parse_from(["tunnel-watch", "status", "--json"]).unwrap();
        let Some(Cmd::Status(args)) = cli.cmd else {
            panic!("expected status subcommand");
        };
        assert_eq!(args.tunnel_name, DEFAULT_TUNNEL_NAME);
        assert_eq!(args.base_url, DEFAULT_BASE_URL);
        assert_eq!(args.format(), OutputFormat::Json);
    }

    #[test]
    fn json_wins_over_quiet() {
        let cli = Cli::try_parse_from(["tunnel-watch", "--json", "--quiet"]).unwrap();
        assert_eq!(cli.status.format(), OutputFormat::Json);
    }

    #[test]
    fn blank_credentials_are_not_sent() {
        let cli = Cli::try_parse_from(["tunnel-watch", "--app-id", "", "--app-key", "k"]).unwrap();
        let config = cli.status.client_config();
        assert_eq!(config.app_id, None);
        assert_eq!(config.app_key.as_deref(), Some("k"));
    }

    #[test]
    fn renders_text_and_quiet() {
        assert_eq!(
            render(&sample(), OutputFormat::Text).unwrap(),
            "Rotherhithe Tunnel: CLOSED — Rotherhithe Tunnel closed"
        );
        assert_eq!(render(&sample(), OutputFormat::Quiet).unwrap(), "CLOSED");
    }

    #[test]
    fn renders_json() {
        let out = render(&sample(), OutputFormat::Json).unwrap();
        let decoded: TunnelStatusSnapshot = serde_json::from_str(&out).unwrap();
        assert_eq!(decoded, sample());
        assert!(out.contains("\"state\": \"closed\""));
    }
}
