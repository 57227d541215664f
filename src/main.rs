//! menunav - Browse daily dining hall menus from the terminal
//!
//! Prints the meals for a date along with the selection token for each; pass
//! a token back with `menunav select` to drill into courses and dishes.

use std::process::ExitCode;

use clap::Parser;
use futures::future::join_all;
use tracing_subscriber::EnvFilter;

use menunav::cli::{Cli, Request};
use menunav::config::Config;
use menunav::navigation::{self, NavigationToken};
use menunav::render::render_view;
use menunav::{DateKey, MenuResolver};

/// Installs the log subscriber; `RUST_LOG` overrides the default level
fn init_logging() {
    let default_level = "warn";
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Prints a message for the user and logs the underlying error
fn report(user_message: &str, error: &dyn std::error::Error) -> ExitCode {
    tracing::debug!(%error, "request failed");
    eprintln!("{}", user_message);
    eprintln!("  ({})", error);
    ExitCode::FAILURE
}

/// Resolves consecutive days concurrently and prints one line per day
async fn print_week(resolver: &MenuResolver, start: DateKey, days: u32) {
    let dates: Vec<DateKey> = std::iter::successors(Some(start), DateKey::succ)
        .take(days as usize)
        .collect();

    let results = join_all(dates.iter().map(|date| resolver.resolve(*date))).await;

    for (date, result) in dates.iter().zip(results) {
        match result {
            Ok(menu) if menu.is_empty() => println!("{}  (no menu)", date),
            Ok(menu) => println!("{}  {}", date, menu.meal_labels().collect::<Vec<_>>().join(", ")),
            Err(e) => println!("{}  {}", date, e.user_message()),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let cli = Cli::parse();

    // Arguments are validated before config is read or anything is fetched
    let request = match Request::from_cli(&cli, DateKey::today()) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return report("The menu service is not configured.", &e),
    };
    cli.apply_overrides(&mut config);

    let resolver = match MenuResolver::from_config(&config) {
        Ok(resolver) => resolver,
        Err(e) => return report(e.user_message(), &e),
    };

    match request {
        Request::Menu(date) => match NavigationToken::Root(date).decode(&resolver).await {
            Ok(view) => print!("{}", render_view(&view)),
            Err(e) => return report(e.user_message(), &e),
        },
        Request::Select(token) => match navigation::decode(&token, &resolver).await {
            Ok(view) => print!("{}", render_view(&view)),
            Err(e) => return report(e.user_message(), &e),
        },
        Request::Week { start, days } => print_week(&resolver, start, days).await,
    }

    ExitCode::SUCCESS
}
