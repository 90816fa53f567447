use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the Yalors binary.
#[derive(Debug, Parser)]
#[command(name = "yalors", version, about = "Yalors site backend")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "YALORS_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP service.
    Serve(Box<ServeArgs>),
    /// List blog posts, optionally filtered by category and search term.
    Posts(PostsArgs),
    /// Print logged contact form submissions.
    Submissions(SubmissionsArgs),
    /// Send one message through the chat webhook and print the reply.
    Chat(ChatArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ContentOverride {
    /// Override the TOML file the post catalog is loaded from.
    #[arg(long = "content-posts-file", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub posts_file: Option<PathBuf>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub content: ContentOverride,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the contact submission log file.
    #[arg(long = "contact-log-path", value_name = "PATH")]
    pub contact_log_path: Option<PathBuf>,

    /// Override the email relay endpoint used for contact notifications.
    #[arg(long = "contact-relay-url", value_name = "URL")]
    pub contact_relay_url: Option<String>,

    /// Toggle the stricter contact form field rules.
    #[arg(
        long = "contact-strict-validation",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub contact_strict_validation: Option<bool>,

    /// Override the chat workflow webhook URL.
    #[arg(long = "chat-webhook-url", value_name = "URL")]
    pub chat_webhook_url: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct PostsArgs {
    #[command(flatten)]
    pub content: ContentOverride,

    /// Only list posts in this category (`all` lists every category).
    #[arg(long, value_name = "CATEGORY")]
    pub category: Option<String>,

    /// Case-insensitive search over title, excerpt, content and tags.
    #[arg(long, value_name = "TERM")]
    pub search: Option<String>,

    /// Only list featured posts.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub featured: bool,
}

#[derive(Debug, Args, Default, Clone)]
pub struct SubmissionsArgs {
    /// Override the contact submission log file.
    #[arg(long = "contact-log-path", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub contact_log_path: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ChatArgs {
    /// Message text to send.
    #[arg(value_name = "MESSAGE")]
    pub message: String,

    /// Reuse an existing conversation session id.
    #[arg(long, value_name = "ID")]
    pub session: Option<String>,

    /// Override the chat workflow webhook URL.
    #[arg(long = "chat-webhook-url", value_name = "URL")]
    pub chat_webhook_url: Option<String>,
}
