//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{net::SocketAddr, num::NonZeroU64, path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

pub use cli::{
    ChatArgs, CliArgs, Command, ContentOverride, PostsArgs, ServeArgs, ServeOverrides,
    SubmissionsArgs,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "yalors";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CONTACT_LOG_PATH: &str = "contact-submissions.json";
const DEFAULT_CONTACT_SENDER: &str = "\"Yalors Website\" <contact@yalors.tn>";
const DEFAULT_CONTACT_RECIPIENT: &str = "contact@yalors.tn";
const DEFAULT_RELAY_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CHAT_WEBHOOK_URL: &str = "http://127.0.0.1:5678/webhook/chat";
const DEFAULT_CHAT_TIMEOUT_SECS: u64 = 30;

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub content: ContentSettings,
    pub contact: ContactSettings,
    pub chat: ChatSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone, Default)]
pub struct ContentSettings {
    /// When unset the builtin catalog is served.
    pub posts_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ContactSettings {
    pub log_path: PathBuf,
    pub relay_url: Option<Url>,
    pub relay_timeout: Duration,
    pub sender: String,
    pub recipient: String,
    pub strict_validation: bool,
}

#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub webhook_url: Url,
    pub timeout: Duration,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("YALORS").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Posts(args)) => raw.apply_content_override(&args.content),
        Some(Command::Submissions(args)) => raw.apply_submissions_overrides(args),
        Some(Command::Chat(args)) => raw.apply_chat_overrides(args),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    content: RawContentSettings,
    contact: RawContactSettings,
    chat: RawChatSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(path) = overrides.contact_log_path.as_ref() {
            self.contact.log_path = Some(path.clone());
        }
        if let Some(url) = overrides.contact_relay_url.as_ref() {
            self.contact.relay_url = Some(url.clone());
        }
        if let Some(strict) = overrides.contact_strict_validation {
            self.contact.strict_validation = Some(strict);
        }
        if let Some(url) = overrides.chat_webhook_url.as_ref() {
            self.chat.webhook_url = Some(url.clone());
        }

        self.apply_content_override(&overrides.content);
    }

    fn apply_content_override(&mut self, overrides: &ContentOverride) {
        if let Some(path) = overrides.posts_file.as_ref() {
            self.content.posts_file = Some(path.clone());
        }
    }

    fn apply_submissions_overrides(&mut self, args: &SubmissionsArgs) {
        if let Some(path) = args.contact_log_path.as_ref() {
            self.contact.log_path = Some(path.clone());
        }
    }

    fn apply_chat_overrides(&mut self, args: &ChatArgs) {
        if let Some(url) = args.chat_webhook_url.as_ref() {
            self.chat.webhook_url = Some(url.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            content,
            contact,
            chat,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            content: build_content_settings(content)?,
            contact: build_contact_settings(contact)?,
            chat: build_chat_settings(chat)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr =
        parse_socket_addr(&host, port).map_err(|reason| LoadError::invalid("server.addr", reason))?;

    Ok(ServerSettings { addr })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_content_settings(content: RawContentSettings) -> Result<ContentSettings, LoadError> {
    let posts_file = content
        .posts_file
        .filter(|path| !path.as_os_str().is_empty());
    Ok(ContentSettings { posts_file })
}

fn build_contact_settings(contact: RawContactSettings) -> Result<ContactSettings, LoadError> {
    let log_path = contact
        .log_path
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTACT_LOG_PATH));
    if log_path.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "contact.log_path",
            "path must not be empty",
        ));
    }

    let relay_url = match contact.relay_url.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) => Some(parse_http_url(value, "contact.relay_url")?),
    };

    let timeout_secs = non_zero_u64(
        contact
            .relay_timeout_seconds
            .unwrap_or(DEFAULT_RELAY_TIMEOUT_SECS),
        "contact.relay_timeout_seconds",
    )?;

    let sender = non_blank(contact.sender, DEFAULT_CONTACT_SENDER, "contact.sender")?;
    let recipient = non_blank(
        contact.recipient,
        DEFAULT_CONTACT_RECIPIENT,
        "contact.recipient",
    )?;

    Ok(ContactSettings {
        log_path,
        relay_url,
        relay_timeout: Duration::from_secs(timeout_secs.get()),
        sender,
        recipient,
        strict_validation: contact.strict_validation.unwrap_or(false),
    })
}

fn build_chat_settings(chat: RawChatSettings) -> Result<ChatSettings, LoadError> {
    let webhook_url = parse_http_url(
        chat.webhook_url
            .as_deref()
            .unwrap_or(DEFAULT_CHAT_WEBHOOK_URL),
        "chat.webhook_url",
    )?;

    let timeout_secs = non_zero_u64(
        chat.timeout_seconds.unwrap_or(DEFAULT_CHAT_TIMEOUT_SECS),
        "chat.timeout_seconds",
    )?;

    Ok(ChatSettings {
        webhook_url,
        timeout: Duration::from_secs(timeout_secs.get()),
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentSettings {
    posts_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContactSettings {
    log_path: Option<PathBuf>,
    relay_url: Option<String>,
    relay_timeout_seconds: Option<u64>,
    sender: Option<String>,
    recipient: Option<String>,
    strict_validation: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawChatSettings {
    webhook_url: Option<String>,
    timeout_seconds: Option<u64>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn parse_http_url(value: &str, key: &'static str) -> Result<Url, LoadError> {
    let url = Url::parse(value)
        .map_err(|err| LoadError::invalid(key, format!("invalid URL `{value}`: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(LoadError::invalid(
            key,
            format!("unsupported scheme `{other}`"),
        )),
    }
}

fn non_zero_u64(value: u64, key: &'static str) -> Result<NonZeroU64, LoadError> {
    NonZeroU64::new(value).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

fn non_blank(
    value: Option<String>,
    default: &str,
    key: &'static str,
) -> Result<String, LoadError> {
    let value = value.unwrap_or_else(|| default.to_string());
    if value.trim().is_empty() {
        return Err(LoadError::invalid(key, "must not be blank"));
    }
    Ok(value)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
