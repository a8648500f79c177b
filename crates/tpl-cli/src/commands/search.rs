//! Search command - run one search generation and print the ranked designs

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use tpl_catalog::{ClientOptions, HttpCatalogClient, QueryContext};
use tpl_config::Config;
use tpl_core::VisibilityFilter;
use tpl_engine::{
    ChannelObserver, EngineSettings, PageOutcome, SearchCoordinator, SearchEvent, SearchOutcome,
    SessionSnapshot, SkipReason,
};
use tracing::{info, warn};

use crate::cli::SearchArgs;

#[derive(Serialize)]
struct SearchOutput {
    keywords: Vec<String>,
    outcome: SearchOutcome,
    pages: Vec<PageOutcome>,
    snapshot: SessionSnapshot,
}

pub async fn handle(args: SearchArgs, config: &Config) -> Result<()> {
    let client = HttpCatalogClient::new(&config.catalog.base_url, client_options(config))?;

    let mut context = query_context(config);
    if let Some(builder) = args.builder {
        context.page_builder = builder;
    }
    if let Some(name) = args.business_name {
        context.business_name = name;
    }

    let input = if args.keywords.is_empty() {
        context.initial_keyword()
    } else {
        args.keywords.join(",")
    };

    let (observer, mut events) = ChannelObserver::new();
    let observer = Arc::new(observer);
    let coordinator = SearchCoordinator::builder(Arc::new(client))
        .settings(engine_settings(config))
        .context(context)
        .display(observer.clone())
        .notifier(observer)
        .build();

    let Some(handle) = coordinator.search(&input).await else {
        println!("No keywords to search.");
        return Ok(());
    };
    let keywords = handle.keywords().to_vec();

    let progress = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            log_event(&event);
        }
    });

    let outcome = handle.wait().await;

    let mut pages = Vec::new();
    for _ in 0..args.more {
        let page = coordinator.load_more().await;
        let exhausted = matches!(
            page,
            PageOutcome::Skipped {
                reason: SkipReason::Exhausted
            }
        );
        pages.push(page);
        if exhausted {
            break;
        }
    }

    let snapshot = coordinator.snapshot().await;
    progress.abort();

    match args.format.as_str() {
        "json" => {
            let output = SearchOutput {
                keywords,
                outcome,
                pages,
                snapshot,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => print_text(&keywords, &outcome, &snapshot),
    }

    Ok(())
}

fn client_options(config: &Config) -> ClientOptions {
    ClientOptions {
        search_path: config.catalog.search_path.clone(),
        pages_path: config.catalog.pages_path.clone(),
        timeout: Duration::from_secs(config.catalog.timeout_secs),
        user_agent: config.catalog.user_agent.clone(),
    }
}

fn query_context(config: &Config) -> QueryContext {
    QueryContext {
        business_name: config.context.business_name.clone(),
        business_type: config.context.business_type.clone(),
        keywords: config.context.keywords.clone(),
        page_builder: config.context.page_builder.clone(),
    }
}

fn engine_settings(config: &Config) -> EngineSettings {
    EngineSettings {
        filter: VisibilityFilter::new(
            config.visibility.hide_premium_templates,
            config.visibility.hide_features.iter().cloned(),
        ),
        page_size: config.search.page_size,
        min_results_before_top_up: config.search.min_results_before_top_up,
    }
}

fn log_event(event: &SearchEvent) {
    match event {
        SearchEvent::AggregateUpdated { flat, .. } => info!(designs = flat.len(), "results updated"),
        SearchEvent::KeywordFailed { keyword, message } => {
            warn!(keyword = %keyword, "no results for keyword: {}", message)
        }
        SearchEvent::Error { message } => warn!("{}", message),
        SearchEvent::LoadingChanged { .. } | SearchEvent::PaginationChanged { .. } => {}
    }
}

fn print_text(keywords: &[String], outcome: &SearchOutcome, snapshot: &SessionSnapshot) {
    println!("Results for: {}", keywords.join(", "));

    if let SearchOutcome::Settled(report) = outcome {
        for failure in &report.failures {
            println!("  ! {}: {}", failure.keyword, failure.message);
        }
    }
    println!();

    if snapshot.composed.is_empty() {
        println!("No templates found.");
        return;
    }

    for ranked in &snapshot.composed.ranked {
        let title = ranked.design.title().unwrap_or("(untitled)");
        let premium = if ranked.design.is_premium { " [premium]" } else { "" };
        println!(
            "{:>3}. {} ({}){} - {}",
            ranked.position, title, ranked.design.id, premium, ranked.category
        );
    }

    println!();
    println!("{} template(s)", snapshot.composed.len());
    if snapshot.pagination.has_more_pages {
        println!("  More available: rerun with --more <N>");
    }
}
