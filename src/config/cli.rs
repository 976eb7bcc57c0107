use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, builder::BoolishValueParser};

use crate::domain::types::FeedKind;

/// Command-line arguments for the tidings binary.
#[derive(Debug, Parser)]
#[command(name = "tidings", version, about = "Tidings feed engine")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "TIDINGS_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Apply pending database migrations.
    Migrate(MigrateArgs),
    /// Print one feed page as JSON.
    Feed(Box<FeedArgs>),
}

#[derive(Debug, Args, Default, Clone)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub overrides: SettingsOverrides,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum FeedKindArg {
    #[default]
    #[value(alias = "index")]
    Global,
    Group,
    Profile,
    #[value(alias = "subscription")]
    Follow,
}

impl From<FeedKindArg> for FeedKind {
    fn from(kind: FeedKindArg) -> Self {
        match kind {
            FeedKindArg::Global => FeedKind::Global,
            FeedKindArg::Group => FeedKind::Group,
            FeedKindArg::Profile => FeedKind::Profile,
            FeedKindArg::Follow => FeedKind::Subscription,
        }
    }
}

#[derive(Debug, Args, Default, Clone)]
pub struct FeedArgs {
    #[command(flatten)]
    pub overrides: SettingsOverrides,

    /// Which feed to render.
    #[arg(long, value_enum, default_value_t = FeedKindArg::Global)]
    pub kind: FeedKindArg,

    /// Group slug for the group feed.
    #[arg(long, value_name = "SLUG")]
    pub group: Option<String>,

    /// Author username for the profile feed.
    #[arg(long, value_name = "USERNAME")]
    pub author: Option<String>,

    /// Username to render the feed for; anonymous when absent.
    #[arg(long, value_name = "USERNAME")]
    pub viewer: Option<String>,

    /// Page number; anything that is not a positive integer selects page 1.
    #[arg(long, value_name = "N")]
    pub page: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct SettingsOverrides {
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

    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Override the number of posts per feed page.
    #[arg(long = "page-size", value_name = "COUNT")]
    pub page_size: Option<u32>,

    /// Toggle the global feed page cache.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_enabled: Option<bool>,

    /// Override the page cache time-to-live.
    #[arg(long = "cache-ttl-seconds", value_name = "SECONDS")]
    pub cache_ttl_seconds: Option<u64>,
}
