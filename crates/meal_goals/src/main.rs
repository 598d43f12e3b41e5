use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use meal_history_client::config::Config;
use meal_history_client::http_client::ReqwestMealHistoryClient;

use meal_goals::cli::{self, Cli, Commands, OutputFormat};
use meal_goals::{ComparisonService, ReportError};

fn init_tracing() {
    // `MEAL_GOALS_LOG_LEVEL`, then `RUST_LOG`, default `info`.
    let log_env = std::env::var("MEAL_GOALS_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());

    let combined_filter = format!("{},reqwest=warn,hyper=warn", log_env);
    let env_filter = tracing_subscriber::EnvFilter::try_new(combined_filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,reqwest=warn,hyper=warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    tracing::debug!("meal-goals: log filter: {}", log_env);
}

async fn run(args: Cli) -> anyhow::Result<()> {
    let config = Config::from_env().map_err(ReportError::from)?;
    let client = Arc::new(ReqwestMealHistoryClient::from_config(&config));

    match args.command {
        Commands::Compare {
            user_id,
            selection,
            goals_collection,
            limit,
            format,
        } => {
            let goals_collection =
                goals_collection.unwrap_or_else(|| config.goals_collection.clone());
            let selection = selection.into_selection(&config, Some(user_id.clone()), limit);
            let service = ComparisonService::new(client, goals_collection);
            let report = service.compare(&user_id, &selection).await?;
            tracing::info!(
                user_id = %report.user_id,
                start = %report.start,
                end = %report.end,
                days = report.days.len(),
                "comparison complete"
            );
            match format {
                OutputFormat::Text => println!("{}", report.render_text()),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&report).map_err(ReportError::from)?
                ),
            }
        }
        Commands::Fetch {
            user_id,
            selection,
            limit,
            pretty,
        } => {
            let selection = selection.into_selection(&config, user_id, limit);
            let service = ComparisonService::new(client, config.goals_collection.clone());
            let (_, docs) = service.fetch_meals(&selection).await?;
            let out = if pretty {
                serde_json::to_string_pretty(&docs)
            } else {
                serde_json::to_string(&docs)
            }
            .map_err(ReportError::from)?;
            println!("{out}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = cli::exit_code(&err);
            eprintln!("ERROR: {err}");
            ExitCode::from(code)
        }
    }
}
