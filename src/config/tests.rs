use serial_test::serial;

use super::*;

#[test]
fn defaults_match_documented_values() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.feed.page_size.get(), 10);
    assert!(settings.cache.enabled);
    assert_eq!(settings.cache.ttl, Duration::from_secs(20));
    assert_eq!(settings.database.max_connections.get(), 8);
    assert!(settings.database.url.is_none());
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.feed.page_size = Some(25);
    raw.logging.level = Some("info".to_string());

    let overrides = SettingsOverrides {
        page_size: Some(5),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.feed.page_size.get(), 5);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn zero_page_size_is_rejected_with_its_key() {
    let mut raw = RawSettings::default();
    raw.feed.page_size = Some(0);

    match Settings::from_raw(raw) {
        Err(LoadError::Invalid { key, .. }) => assert_eq!(key, "feed.page_size"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn unknown_log_level_is_rejected() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());

    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "logging.level",
            ..
        })
    ));
}

#[test]
fn blank_database_url_counts_as_absent() {
    let mut raw = RawSettings::default();
    raw.database.url = Some("   ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.database.url.is_none());
}

#[test]
fn cache_can_be_disabled_via_cli() {
    let args = CliArgs::parse_from([
        "tidings",
        "feed",
        "--cache-enabled=false",
        "--cache-ttl-seconds",
        "60",
    ]);

    let mut raw = RawSettings::default();
    match args.command.expect("feed command") {
        Command::Feed(feed) => raw.apply_overrides(&feed.overrides),
        _ => panic!("wrong command parsed"),
    }
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(!settings.cache.enabled);
    assert_eq!(settings.cache.ttl, Duration::from_secs(60));
}

#[test]
fn parse_feed_arguments() {
    let args = CliArgs::parse_from([
        "tidings",
        "feed",
        "--kind",
        "profile",
        "--author",
        "leo",
        "--viewer",
        "reader",
        "--page",
        "3",
    ]);

    match args.command.expect("feed command") {
        Command::Feed(feed) => {
            assert_eq!(feed.kind, FeedKindArg::Profile);
            assert_eq!(feed.author.as_deref(), Some("leo"));
            assert_eq!(feed.viewer.as_deref(), Some("reader"));
            assert_eq!(feed.page.as_deref(), Some("3"));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn feed_kind_accepts_aliases() {
    let args = CliArgs::parse_from(["tidings", "feed", "--kind", "index"]);
    match args.command.expect("feed command") {
        Command::Feed(feed) => assert_eq!(feed.kind, FeedKindArg::Global),
        _ => panic!("wrong command parsed"),
    }

    let args = CliArgs::parse_from(["tidings", "feed", "--kind", "subscription"]);
    match args.command.expect("feed command") {
        Command::Feed(feed) => assert_eq!(feed.kind, FeedKindArg::Follow),
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_migrate_arguments() {
    let args = CliArgs::parse_from([
        "tidings",
        "migrate",
        "--database-url",
        "postgres://example",
    ]);

    match args.command.expect("migrate command") {
        Command::Migrate(migrate) => assert_eq!(
            migrate.overrides.database_url.as_deref(),
            Some("postgres://example")
        ),
        _ => panic!("wrong command parsed"),
    }
}

#[test]
#[serial]
fn environment_is_overridden_by_cli() {
    // SAFETY: serialized with every other test that touches the process environment.
    unsafe {
        std::env::set_var("TIDINGS__DATABASE__URL", "postgres://from-env");
        std::env::set_var("TIDINGS__LOGGING__LEVEL", "warn");
    }

    let from_env = load(&CliArgs::parse_from(["tidings", "migrate"]));
    let from_cli = load(&CliArgs::parse_from([
        "tidings",
        "migrate",
        "--database-url",
        "postgres://from-cli",
    ]));

    unsafe {
        std::env::remove_var("TIDINGS__DATABASE__URL");
        std::env::remove_var("TIDINGS__LOGGING__LEVEL");
    }

    let from_env = from_env.expect("settings from env");
    assert_eq!(from_env.database.url.as_deref(), Some("postgres://from-env"));
    assert_eq!(from_env.logging.level, LevelFilter::WARN);

    let from_cli = from_cli.expect("settings from cli");
    assert_eq!(from_cli.database.url.as_deref(), Some("postgres://from-cli"));
}
