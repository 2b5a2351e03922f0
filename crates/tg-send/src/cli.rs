//! Command line parsing
//!
//! Arguments are parsed by hand: one subcommand and a handful of flags.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};

/// Parsed invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show usage
    Help,
    /// Show version
    Version,
    /// Send one message
    Send(SendArgs),
}

/// Arguments of the `send` command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendArgs {
    pub message: String,
    pub token: Option<String>,
    pub chat_id: Option<String>,
    pub base_url: Option<String>,
    pub parse_mode: Option<String>,
    pub silent: bool,
    pub protect: bool,
    pub no_preview: bool,
    pub reply_to: Option<i64>,
    pub thread: Option<i64>,
    pub timeout_ms: Option<u64>,
    pub config_path: Option<PathBuf>,
}

/// Parse arguments (without the program name)
pub fn parse_args<I>(args: I) -> anyhow::Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();

    if args.is_empty() {
        return Ok(Command::Help);
    }
    for arg in &args {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-V" => return Ok(Command::Version),
            _ => {}
        }
    }

    let mut iter = args.into_iter();
    match iter.next().as_deref() {
        Some("send") => {}
        Some(other) => bail!("unknown command: {}", other),
        None => return Ok(Command::Help),
    }

    let mut send = SendArgs::default();
    let mut words: Vec<String> = Vec::new();

    while let Some(arg) = iter.next() {
        // --flag=value and --flag value are both accepted
        let (flag, mut inline) = match arg.split_once('=') {
            Some((flag, value)) if arg.starts_with("--") => {
                (flag.to_string(), Some(value.to_string()))
            }
            _ => (arg.clone(), None),
        };

        match flag.as_str() {
            "--token" => {
                send.token = Some(take_value(inline.take(), &mut iter, "--token")?);
            }
            "--chat-id" => {
                send.chat_id = Some(take_value(inline.take(), &mut iter, "--chat-id")?);
            }
            "--base-url" => {
                send.base_url = Some(take_value(inline.take(), &mut iter, "--base-url")?);
            }
            "--parse-mode" => {
                send.parse_mode = Some(take_value(inline.take(), &mut iter, "--parse-mode")?);
            }
            "--timeout" => {
                let raw = take_value(inline.take(), &mut iter, "--timeout")?;
                send.timeout_ms = Some(
                    raw.parse()
                        .with_context(|| format!("invalid --timeout value: {}", raw))?,
                );
            }
            "--reply-to" => {
                let raw = take_value(inline.take(), &mut iter, "--reply-to")?;
                send.reply_to = Some(
                    raw.parse()
                        .with_context(|| format!("invalid --reply-to value: {}", raw))?,
                );
            }
            "--thread" => {
                let raw = take_value(inline.take(), &mut iter, "--thread")?;
                send.thread = Some(
                    raw.parse()
                        .with_context(|| format!("invalid --thread value: {}", raw))?,
                );
            }
            "--config" => {
                let raw = take_value(inline.take(), &mut iter, "--config")?;
                send.config_path = Some(PathBuf::from(raw));
            }
            "--silent" => send.silent = true,
            "--protect" => send.protect = true,
            "--no-preview" => send.no_preview = true,
            "--" => words.extend(iter.by_ref()),
            f if f.starts_with("--") => bail!("unknown option: {}", f),
            _ => words.push(arg),
        }
    }

    if words.is_empty() {
        bail!("send requires a message");
    }
    send.message = words.join(" ");

    Ok(Command::Send(send))
}

fn take_value(
    inline: Option<String>,
    rest: &mut impl Iterator<Item = String>,
    name: &str,
) -> anyhow::Result<String> {
    match inline {
        Some(value) => Ok(value),
        None => rest.next().ok_or_else(|| anyhow!("{} requires a value", name)),
    }
}

/// Write the usage text
pub fn write_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "tg-send - send a message to a chat through the Bot API")?;
    writeln!(out)?;
    writeln!(out, "Usage:")?;
    writeln!(out, "  tg-send send <message> [options]")?;
    writeln!(out, "  tg-send --help       Show this help message")?;
    writeln!(out, "  tg-send --version    Show version")?;
    writeln!(out)?;
    writeln!(out, "Options:")?;
    writeln!(out, "  --token <token>        Bot token")?;
    writeln!(out, "  --chat-id <id>         Target chat id or @username")?;
    writeln!(out, "  --parse-mode <mode>    plain, markdown, markdownv2 or html")?;
    writeln!(out, "  --silent               Send without notification")?;
    writeln!(out, "  --protect              Protect content from forwarding and saving")?;
    writeln!(out, "  --no-preview           Disable link previews")?;
    writeln!(out, "  --reply-to <id>        Reply to a message id")?;
    writeln!(out, "  --thread <id>          Forum topic thread id")?;
    writeln!(out, "  --timeout <ms>         Request timeout in milliseconds")?;
    writeln!(out, "  --base-url <url>       API endpoint (default: https://api.telegram.org)")?;
    writeln!(out, "  --config <path>        Settings file (default: ./tg-send.toml if present)")?;
    writeln!(out)?;
    writeln!(out, "Environment Variables:")?;
    writeln!(out, "  TELEGRAM_BOT_TOKEN     Bot token, used when --token is absent")?;
    writeln!(out, "  TELEGRAM_CHAT_ID       Chat id, used when --chat-id is absent")?;
    writeln!(out, "  TELEGRAM_API_BASE_URL  API endpoint override")?;
    writeln!(out, "  RUST_LOG               Log filter (default: warn)")?;
    Ok(())
}
