//! Command handlers. Each prints its result to standard output.

use crate::app::App;
use crate::cli::{Command, DefaultCommand, FilterCommand, Location, ReadArgs};
use crate::error::{ErrorKind, Result};
use crate::render;
use dibari_filter::RegexFilter;
use dibari_model::resolve_series_from_url;
use dibari_store::error::ErrorKind as StoreErrorKind;
use dibari_store::{Database, DefaultSeries};
use dibari_token::{DebugPage, InteractionType, State, interaction_type};
use exn::OptionExt;
use tracing::{info, instrument, warn};

pub async fn run(app: &App, command: Command) -> Result<()> {
    match command {
        Command::Read(args) => read(app, args).await,
        Command::Press { token, location } => press(app, &token, location).await,
        Command::Search { query, page } => {
            let page = page.checked_sub(1).ok_or_raise(|| ErrorKind::InvalidArgument("pages start at 1".to_string()))?;
            search(app, &query.join(" "), page).await
        },
        Command::Decode { token } => {
            let state = app.codec().decode(&token).map_err(ErrorKind::token)?;
            println!("{}", render::state(&state));
            Ok(())
        },
        Command::Filter(command) => {
            let db = app.database().await?;
            let result = filter(&db, command).await;
            db.close().await;
            result
        },
        Command::Default(command) => {
            let db = app.database().await?;
            let result = default(&db, command).await;
            db.close().await;
            result
        },
        Command::Platforms => {
            for tag in app.registry().platforms() {
                println!("{tag}");
            }
            Ok(())
        },
    }
}

async fn read(app: &App, args: ReadArgs) -> Result<()> {
    let db = app.database().await?;
    let result = app
        .reader(&db)
        .open(args.location.guild, args.location.channel, args.url.as_deref(), &args.chapter, args.page)
        .await;
    db.close().await;
    let page = result.map_err(ErrorKind::reader)?;
    print!("{}", render::reader_page(&page, app.codec()));
    Ok(())
}

async fn search(app: &App, query: &str, page: u32) -> Result<()> {
    let results = app.searcher().search(query, page).await.map_err(ErrorKind::reader)?;
    print!("{}", render::search_page(&results, app.codec()));
    Ok(())
}

/// Handles a token the way the chat front end handles a button press.
#[instrument(skip(app))]
async fn press(app: &App, token: &str, location: Location) -> Result<()> {
    match interaction_type(token).map_err(ErrorKind::token)? {
        InteractionType::Close => {
            println!("closed");
            return Ok(());
        },
        InteractionType::DebugClearCache => {
            app.cache().clear();
            info!("cache cleared");
            print!("{}", render::cache_stats(&app.cache().namespaces()));
            return Ok(());
        },
        _ => {},
    }
    match app.codec().decode(token).map_err(ErrorKind::token)? {
        State::Navigate(state) => {
            let db = app.database().await?;
            let result = app.reader(&db).read(location.guild, location.channel, &state).await;
            db.close().await;
            let page = result.map_err(ErrorKind::reader)?;
            print!("{}", render::reader_page(&page, app.codec()));
        },
        State::Search(state) => {
            let results = app.searcher().resume(&state).await.map_err(ErrorKind::reader)?;
            print!("{}", render::search_page(&results, app.codec()));
        },
        State::SelectManga { manga_id } => {
            let db = app.database().await?;
            let result = app.reader(&db).select_manga(location.guild, location.channel, &manga_id).await;
            db.close().await;
            let page = result.map_err(ErrorKind::reader)?;
            print!("{}", render::reader_page(&page, app.codec()));
        },
        State::DebugSwitch(DebugPage::Main) => {
            println!("platforms: {}", app.registry().platforms().collect::<Vec<_>>().join(", "));
            println!("cache namespaces: {}", app.cache().namespaces().len());
            println!("token limit: {} characters", app.codec().max_length());
        },
        State::DebugSwitch(DebugPage::Cache) => print!("{}", render::cache_stats(&app.cache().namespaces())),
    }
    Ok(())
}

fn warn_unknown_fields(filter: &RegexFilter) {
    for field in filter.unknown_fields() {
        warn!(%field, "unknown template field will be matched verbatim");
    }
}

async fn filter(db: &Database, command: FilterCommand) -> Result<()> {
    let repo = db.repository();
    match command {
        FilterCommand::Add { guild, filter_type, template, pattern, scope, channels } => {
            let filter =
                RegexFilter::new(guild, filter_type.into(), template, pattern).with_scope(scope.into(), channels);
            filter.validate().map_err(ErrorKind::filter)?;
            warn_unknown_fields(&filter);
            let id = repo.upsert_filter(&filter).await.map_err(ErrorKind::store)?;
            println!("added filter #{id}");
        },
        FilterCommand::Edit { id, guild, filter_type, template, pattern, scope, channels, no_channels } => {
            let mut filter = repo
                .get_filter(id, guild)
                .await
                .map_err(ErrorKind::store)?
                .ok_or_raise(|| ErrorKind::Store(StoreErrorKind::FilterNotFound(id)))?;
            if let Some(filter_type) = filter_type {
                filter.filter_type = filter_type.into();
            }
            if let Some(template) = template {
                filter.template = template;
            }
            if let Some(pattern) = pattern {
                filter.pattern = pattern;
            }
            if let Some(scope) = scope {
                filter.channel_scope = scope.into();
            }
            if let Some(channels) = channels {
                filter.channels = channels.into_iter().collect();
            } else if no_channels {
                filter.channels.clear();
            }
            filter.validate().map_err(ErrorKind::filter)?;
            warn_unknown_fields(&filter);
            repo.upsert_filter(&filter).await.map_err(ErrorKind::store)?;
            println!("{}", render::filter(&filter));
        },
        FilterCommand::List { guild, channel } => {
            let filters = match channel {
                Some(channel) => repo.list_filters_for_channel(guild, channel).await,
                None => repo.list_filters(guild).await,
            }
            .map_err(ErrorKind::store)?;
            if filters.is_empty() {
                println!("no filters");
            }
            for filter in &filters {
                println!("{}", render::filter(filter));
            }
        },
        FilterCommand::Remove { id, guild } => {
            if !repo.delete_filter(id, guild).await.map_err(ErrorKind::store)? {
                exn::bail!(ErrorKind::Store(StoreErrorKind::FilterNotFound(id)));
            }
            println!("removed filter #{id}");
        },
    }
    Ok(())
}

async fn default(db: &Database, command: DefaultCommand) -> Result<()> {
    let repo = db.repository();
    match command {
        DefaultCommand::Set { url, location } => {
            if resolve_series_from_url(&url).is_unresolved() {
                exn::bail!(ErrorKind::InvalidArgument(format!("unsupported or invalid URL: {url}")));
            }
            let default = DefaultSeries { guild_id: location.guild, channel_id: location.channel, url };
            repo.set_default_series(&default).await.map_err(ErrorKind::store)?;
            println!("{}", render::default_series(&default));
        },
        DefaultCommand::Get { location } => {
            match repo.default_series(location.guild, location.channel).await.map_err(ErrorKind::store)? {
                Some(default) => println!("{}", render::default_series(&default)),
                None => println!("no default series"),
            }
        },
        DefaultCommand::Remove { location } => {
            if repo.remove_default_series(location.guild, location.channel).await.map_err(ErrorKind::store)? {
                println!("removed");
            } else {
                println!("no default series was set");
            }
        },
        DefaultCommand::List { guild } => {
            let defaults = repo.list_default_series(guild).await.map_err(ErrorKind::store)?;
            if defaults.is_empty() {
                println!("no default series");
            }
            for default in &defaults {
                println!("{}", render::default_series(default));
            }
        },
    }
    Ok(())
}
