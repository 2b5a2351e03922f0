//! Settings resolution
//!
//! Settings are layered, later sources winning:
//! 1. `tg-send.toml` (or the file given with `--config`)
//! 2. Environment variables
//! 3. Command line flags
//!
//! String values in the settings file may reference environment variables
//! as `${VAR_NAME}`.

use std::path::Path;

use anyhow::{anyhow, bail, Context};
use serde::Deserialize;
use tg_client::{ChatTarget, ClientConfig, ParseMode, SendOptions};

use crate::cli::SendArgs;

/// Settings file looked up in the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "tg-send.toml";

pub const ENV_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
pub const ENV_BASE_URL: &str = "TELEGRAM_API_BASE_URL";

/// Resolved settings for one invocation
///
/// `--reply-to` and `--thread` name a specific message or topic, so they are
/// flag-only and go straight from [`SendArgs`] into the options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub token: Option<String>,
    pub chat_id: Option<ChatTarget>,
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub parse_mode: Option<String>,
    pub silent: Option<bool>,
    pub protect_content: Option<bool>,
    pub disable_web_page_preview: Option<bool>,
}

/// Settings file layout
#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    telegram: Settings,
}

impl Settings {
    /// Load settings for a `send` invocation from every layer
    pub fn resolve(args: &SendArgs) -> anyhow::Result<Self> {
        let mut settings = Self::load(args.config_path.as_deref())?;
        settings.apply_overrides(|key| std::env::var(key).ok());
        settings.apply_args(args);
        Ok(settings)
    }

    /// Read the settings file, if any
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_toml_file(path),
            None if Path::new(DEFAULT_SETTINGS_FILE).exists() => {
                Self::from_toml_file(DEFAULT_SETTINGS_FILE)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;

        Self::from_toml_str(&content, |key| std::env::var(key).ok())
            .with_context(|| format!("failed to parse settings file {}", path.display()))
    }

    fn from_toml_str<F>(content: &str, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let expanded = expand_env_vars(content, lookup);
        let file: SettingsFile = toml::from_str(&expanded)?;
        Ok(file.telegram.normalized())
    }

    /// Apply environment overrides; empty values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(token) = get(ENV_TOKEN) {
            self.token = Some(token);
        }
        if let Some(chat_id) = get(ENV_CHAT_ID) {
            self.chat_id = Some(parse_target(&chat_id));
        }
        if let Some(base_url) = get(ENV_BASE_URL) {
            self.base_url = Some(base_url);
        }
    }

    /// Apply command line flags, which take precedence over everything else
    pub fn apply_args(&mut self, args: &SendArgs) {
        if let Some(token) = &args.token {
            self.token = Some(token.clone());
        }
        if let Some(chat_id) = &args.chat_id {
            self.chat_id = Some(parse_target(chat_id));
        }
        if let Some(base_url) = &args.base_url {
            self.base_url = Some(base_url.clone());
        }
        if let Some(timeout_ms) = args.timeout_ms {
            self.timeout_ms = Some(timeout_ms);
        }
        if let Some(parse_mode) = &args.parse_mode {
            self.parse_mode = Some(parse_mode.clone());
        }
        if args.silent {
            self.silent = Some(true);
        }
        if args.protect {
            self.protect_content = Some(true);
        }
        if args.no_preview {
            self.disable_web_page_preview = Some(true);
        }
    }

    /// Build the client configuration
    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let token = self
            .token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| anyhow!("missing bot token: pass --token or set {}", ENV_TOKEN))?;
        let chat_id = self
            .chat_id
            .clone()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| anyhow!("missing chat id: pass --chat-id or set {}", ENV_CHAT_ID))?;

        let mut config = ClientConfig::new(token, chat_id);
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.clone());
        }
        Ok(config)
    }

    /// Build per-call options; only settings that were actually given are set
    ///
    /// Reply and thread ids are taken from `args` only.
    pub fn send_options(&self, args: &SendArgs) -> anyhow::Result<SendOptions> {
        let mut options = SendOptions::new();

        if let Some(mode) = &self.parse_mode {
            options.parse_mode = parse_mode_arg(mode)?;
        }
        options.disable_notification = self.silent;
        options.protect_content = self.protect_content;
        options.disable_web_page_preview = self.disable_web_page_preview;
        options.reply_to_message_id = args.reply_to;
        options.message_thread_id = args.thread;
        options.timeout_ms = self.timeout_ms;

        Ok(options)
    }

    /// String chat ids from the file are re-read so `"-100"` becomes numeric
    fn normalized(mut self) -> Self {
        self.chat_id = self.chat_id.map(|target| match target {
            ChatTarget::Username(name) => parse_target(&name),
            id => id,
        });
        self
    }
}

fn parse_target(raw: &str) -> ChatTarget {
    match raw.parse::<ChatTarget>() {
        Ok(target) => target,
        Err(never) => match never {},
    }
}

/// `plain` selects the API default and leaves `parse_mode` unset
pub fn parse_mode_arg(raw: &str) -> anyhow::Result<Option<ParseMode>> {
    if raw.eq_ignore_ascii_case("plain") {
        return Ok(None);
    }
    match raw.parse::<ParseMode>() {
        Ok(mode) => Ok(Some(mode)),
        Err(e) => bail!("{} (expected plain, markdown, markdownv2 or html)", e),
    }
}

/// Replace `${VAR_NAME}` with the variable's value; unknown variables expand to ""
fn expand_env_vars<F>(value: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                if let Some(v) = lookup(name) {
                    result.push_str(&v);
                }
                rest = &after[end + 1..];
            }
            None => {
                // unterminated, keep verbatim
                result.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    result.push_str(rest);

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_expand_env_vars() {
        let lookup = env(&[("TOKEN", "123:abc")]);
        assert_eq!(expand_env_vars("token = \"${TOKEN}\"", &lookup), "token = \"123:abc\"");
        assert_eq!(expand_env_vars("${MISSING}x", &lookup), "x");
        assert_eq!(expand_env_vars("no vars", &lookup), "no vars");
        assert_eq!(expand_env_vars("broken ${TOKEN", &lookup), "broken ${TOKEN");
    }

    #[test]
    fn test_from_toml_str() {
        let content = r#"
            [telegram]
            token = "${BOT_TOKEN}"
            chat_id = "-1001"
            timeout_ms = 3000
            parse_mode = "html"
            silent = false
        "#;
        let settings = Settings::from_toml_str(content, env(&[("BOT_TOKEN", "t0k")])).unwrap();

        assert_eq!(settings.token.as_deref(), Some("t0k"));
        assert_eq!(settings.chat_id, Some(ChatTarget::Id(-1001)));
        assert_eq!(settings.timeout_ms, Some(3000));
        assert_eq!(settings.silent, Some(false));
        assert_eq!(settings.base_url, None);
    }

    #[test]
    fn test_from_toml_str_integer_and_username_targets() {
        let settings = Settings::from_toml_str("[telegram]\nchat_id = 0\n", env(&[])).unwrap();
        assert_eq!(settings.chat_id, Some(ChatTarget::Id(0)));

        let settings =
            Settings::from_toml_str("[telegram]\nchat_id = \"@news\"\n", env(&[])).unwrap();
        assert_eq!(settings.chat_id, Some(ChatTarget::Username("@news".to_string())));
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[telegram]\ntoken = \"abc\"\nchat_id = 5").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.token.as_deref(), Some("abc"));
        assert_eq!(settings.chat_id, Some(ChatTarget::Id(5)));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(dir.path().join("absent.toml").as_path())).is_err());
    }

    #[test]
    fn test_precedence_file_env_flags() {
        let mut settings = Settings {
            token: Some("from-file".to_string()),
            chat_id: Some(ChatTarget::Id(1)),
            ..Default::default()
        };

        settings.apply_overrides(env(&[
            (ENV_TOKEN, "from-env"),
            (ENV_CHAT_ID, "@env_chat"),
            (ENV_BASE_URL, ""),
        ]));
        assert_eq!(settings.token.as_deref(), Some("from-env"));
        assert_eq!(settings.chat_id, Some(ChatTarget::from("@env_chat")));
        assert_eq!(settings.base_url, None);

        let args = SendArgs {
            message: "hi".to_string(),
            token: Some("from-flag".to_string()),
            ..Default::default()
        };
        settings.apply_args(&args);
        assert_eq!(settings.token.as_deref(), Some("from-flag"));
        assert_eq!(settings.chat_id, Some(ChatTarget::from("@env_chat")));
    }

    #[test]
    fn test_client_config_requires_token_and_chat() {
        let err = Settings::default().client_config().unwrap_err();
        assert!(err.to_string().contains(ENV_TOKEN));

        let settings = Settings {
            token: Some("t".to_string()),
            ..Default::default()
        };
        let err = settings.client_config().unwrap_err();
        assert!(err.to_string().contains(ENV_CHAT_ID));

        let settings = Settings {
            token: Some("t".to_string()),
            chat_id: Some(ChatTarget::Id(9)),
            base_url: Some("http://localhost:8081/".to_string()),
            ..Default::default()
        };
        let config = settings.client_config().unwrap();
        assert_eq!(config.target, ChatTarget::Id(9));
        assert_eq!(config.resolved_base_url(), "http://localhost:8081");
    }

    #[test]
    fn test_send_options_leave_unset_flags_absent() {
        let args = SendArgs {
            message: "hi".to_string(),
            ..Default::default()
        };
        let options = Settings::default().send_options(&args).unwrap();
        assert_eq!(options, SendOptions::default());

        let mut settings = Settings::default();
        let args = SendArgs {
            message: "hi".to_string(),
            silent: true,
            parse_mode: Some("MarkdownV2".to_string()),
            thread: Some(4),
            timeout_ms: Some(100),
            ..Default::default()
        };
        settings.apply_args(&args);
        let options = settings.send_options(&args).unwrap();
        assert_eq!(options.disable_notification, Some(true));
        assert_eq!(options.parse_mode, Some(ParseMode::MarkdownV2));
        assert_eq!(options.message_thread_id, Some(4));
        assert_eq!(options.timeout_ms, Some(100));
        assert_eq!(options.protect_content, None);
    }

    #[test]
    fn test_reply_and_thread_come_from_flags_only() {
        let content = "[telegram]\nsilent = true\nreply_to = 5\nthread = 6\n";
        let settings = Settings::from_toml_str(content, env(&[])).unwrap();

        let args = SendArgs {
            message: "hi".to_string(),
            ..Default::default()
        };
        let options = settings.send_options(&args).unwrap();
        assert_eq!(options.disable_notification, Some(true));
        assert_eq!(options.reply_to_message_id, None);
        assert_eq!(options.message_thread_id, None);

        let args = SendArgs {
            message: "hi".to_string(),
            reply_to: Some(11),
            thread: Some(12),
            ..Default::default()
        };
        let options = settings.send_options(&args).unwrap();
        assert_eq!(options.reply_to_message_id, Some(11));
        assert_eq!(options.message_thread_id, Some(12));
    }

    #[test]
    fn test_parse_mode_arg() {
        assert_eq!(parse_mode_arg("plain").unwrap(), None);
        assert_eq!(parse_mode_arg("PLAIN").unwrap(), None);
        assert_eq!(parse_mode_arg("html").unwrap(), Some(ParseMode::Html));
        assert!(parse_mode_arg("rtf").is_err());
    }
}
