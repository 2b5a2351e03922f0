//! tg-send: send a message through the Bot API from the command line
//!
//! Usage:
//!   tg-send send <message> [options]  - Send one message
//!   tg-send --help                    - Show help

mod cli;
mod settings;

use std::io::Write;
use std::process::ExitCode;

use tg_client::MessageClient;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, SendArgs};
use crate::settings::Settings;

/// Exit status for a failed send
const EXIT_FAILURE: u8 = 1;
/// Exit status for unusable arguments
const EXIT_USAGE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout only ever carries the result
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let code = run(
        std::env::args().skip(1),
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    )
    .await;

    ExitCode::from(code)
}

/// Run one invocation, writing the result to `out` and failures to `err`
///
/// Returns the process exit status.
async fn run<I>(args: I, out: &mut impl Write, err: &mut impl Write) -> u8
where
    I: IntoIterator<Item = String>,
{
    let command = match cli::parse_args(args) {
        Ok(command) => command,
        Err(e) => {
            writeln!(err, "{:#}", e).ok();
            writeln!(err, "Run 'tg-send --help' for usage.").ok();
            return EXIT_USAGE;
        }
    };

    let args = match command {
        Command::Help => {
            cli::write_help(out).ok();
            return 0;
        }
        Command::Version => {
            writeln!(out, "tg-send {}", env!("CARGO_PKG_VERSION")).ok();
            return 0;
        }
        Command::Send(args) => args,
    };

    match run_send(&args).await {
        Ok(()) => {
            writeln!(out, "sent").ok();
            0
        }
        Err(e) => {
            writeln!(err, "{:#}", e).ok();
            EXIT_FAILURE
        }
    }
}

/// Resolve settings, build the client and send the message
async fn run_send(args: &SendArgs) -> anyhow::Result<()> {
    let settings = Settings::resolve(args)?;
    let options = settings.send_options(args)?;
    let client = MessageClient::new(settings.client_config()?)?;

    let result = client.send(&args.message, options).await?;
    tracing::info!(
        "Delivered message {} at {}",
        result.message_id,
        result.unix_date
    );

    Ok(())
}
