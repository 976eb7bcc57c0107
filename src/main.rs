use std::{io::Write, process, sync::Arc};

use tidings::{
    application::{
        error::{AppError, ErrorReport},
        feed::{FeedRequest, FeedService},
        pagination::{Paginator, parse_page_number},
        repos::AuthorsRepo,
    },
    cache::{CacheConfig, PageCache},
    config,
    domain::types::{FeedKind, Viewer},
    infra::{db::PostgresRepositories, error::InfraError, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let report = ErrorReport::from_error("tidings", error);
    let chain = report.summary();

    if dispatcher::has_been_set() {
        error!(source = report.source, kind = error.kind(), error = %chain, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(source = report.source, kind = error.kind(), error = %chain, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Feed(Box::<config::FeedArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Migrate(_) => run_migrate(&settings).await,
        config::Command::Feed(args) => run_feed(&settings, &args).await,
    }
}

async fn connect(settings: &config::Settings) -> Result<PostgresRepositories, AppError> {
    let url = settings.database.url.as_deref().ok_or_else(|| {
        InfraError::configuration("database.url must be set (TIDINGS__DATABASE__URL)")
    })?;

    let pool = PostgresRepositories::connect(url, settings.database.max_connections.get())
        .await
        .map_err(|err| InfraError::database(err.to_string()))?;

    Ok(PostgresRepositories::new(pool))
}

async fn run_migrate(settings: &config::Settings) -> Result<(), AppError> {
    let repositories = connect(settings).await?;
    PostgresRepositories::run_migrations(repositories.pool())
        .await
        .map_err(|err| InfraError::migration(err.to_string()))?;
    info!("database migrations applied");
    Ok(())
}

async fn run_feed(settings: &config::Settings, args: &config::FeedArgs) -> Result<(), AppError> {
    let repositories = Arc::new(connect(settings).await?);
    repositories
        .health_check()
        .await
        .map_err(|err| InfraError::database(err.to_string()))?;

    let cache_config = CacheConfig::from(&settings.cache);
    let cache = cache_config
        .is_enabled()
        .then(|| Arc::new(PageCache::new(&cache_config)));

    let feeds = FeedService::new(
        repositories.clone(),
        repositories.clone(),
        repositories.clone(),
        repositories.clone(),
        repositories.clone(),
        Paginator::new(settings.feed.page_size),
    )
    .with_cache_opt(cache);

    let viewer = match args.viewer.as_deref() {
        Some(username) => {
            let author = repositories
                .find_by_username(username)
                .await?
                .ok_or_else(|| AppError::not_found(format!("viewer `{username}` not found")))?;
            Viewer::Authenticated(author.id)
        }
        None => Viewer::Anonymous,
    };

    let kind: FeedKind = args.kind.into();
    let filter = match kind {
        FeedKind::Group => args.group.clone(),
        FeedKind::Profile => args.author.clone(),
        FeedKind::Global | FeedKind::Subscription => None,
    };

    let request = FeedRequest {
        kind,
        filter,
        page: parse_page_number(args.page.as_deref()),
        viewer,
    };

    let page = feeds.load(&request).await?;
    info!(
        kind = page.kind.as_str(),
        page = page.page.number,
        total_pages = page.page.total_pages,
        items = page.items.len(),
        "feed page rendered"
    );

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &page).map_err(InfraError::from)?;
    writeln!(stdout).map_err(InfraError::from)?;
    Ok(())
}
