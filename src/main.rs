use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

mod catalog;
mod client;
mod detail;
mod error;
mod generation;
mod models;
mod render;
#[cfg(test)]
mod testing;
mod traits;
mod travel_tales;

use catalog::ActiveFilter;
use generation::GenerationConfig;
use models::{GenerationRequest, GenerationResult, ItineraryRoute, TRIP_TYPES};
use traits::ClientConfig;
use travel_tales::{CatalogQuery, TravelTales};

#[derive(Parser)]
#[command(
    name = "traveltales",
    version,
    about = "Plan trips with the TravelTales itinerary service"
)]
struct Cli {
    /// Base URL of the itinerary service
    #[arg(long, env = "API_BASE_URL", global = true)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a new itinerary
    Generate {
        /// Where to go
        #[arg(short, long)]
        destination: String,
        /// Number of days
        #[arg(short = 'n', long, default_value_t = 7)]
        days: u32,
        /// Type of travel, repeatable (defaults to the first trip type)
        #[arg(short, long = "interest")]
        interests: Vec<String>,
        /// Show the itinerary once it is ready
        #[arg(long)]
        open: bool,
    },
    /// Search and browse generated itineraries
    List {
        /// Match against the destination
        #[arg(short, long)]
        search: Option<String>,
        /// "All" or a trip type
        #[arg(short, long, default_value = "All")]
        filter: ActiveFilter,
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        /// Cap on the rows fetched from the service
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one itinerary, e.g. `/itinerary/london/3-days/42`
    Show { route: String },
    /// The three most recent itineraries
    Latest,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let client_config = cli
        .api_base
        .map_or_else(ClientConfig::from_env, ClientConfig::new);
    let app = TravelTales::new(client_config, GenerationConfig::from_env())?;

    info!("Using itinerary service at {}", app.base_url());

    match cli.command {
        Command::Generate {
            destination,
            days,
            mut interests,
            open,
        } => {
            if interests.is_empty() {
                interests.push(TRIP_TYPES[0].to_string());
            }
            let request = GenerationRequest::new(destination, days, interests);
            generate(&app, &request, open).await
        }
        Command::List {
            search,
            filter,
            page,
            limit,
        } => {
            let catalog = app
                .browse(&CatalogQuery {
                    search,
                    filter,
                    page,
                    limit,
                })
                .await;
            println!("{}", render::catalog(&catalog.current_page(), catalog.state()));
            Ok(ExitCode::SUCCESS)
        }
        Command::Show { route } => {
            let route = ItineraryRoute::parse(&route)
                .with_context(|| format!("'{route}' is not an itinerary path"))?;
            show(&app, &route).await
        }
        Command::Latest => {
            println!("{}", render::latest(&app.latest().await));
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn generate(app: &TravelTales, request: &GenerationRequest, open: bool) -> Result<ExitCode> {
    let mut progress = app.progress();
    let generation = app.generate(request);
    tokio::pin!(generation);

    let result = loop {
        tokio::select! {
            result = &mut generation => break result,
            Ok(()) = progress.changed() => {
                let status = *progress.borrow_and_update();
                print!("\r{}", render::progress_line(status));
                std::io::stdout().flush()?;
            }
        }
    };

    let status = *progress.borrow();
    if status.is_terminal() {
        print!("\r{}", render::progress_line(status));
    }
    println!();

    match result {
        Err(e) => {
            println!("Cannot submit: {e}");
            Ok(ExitCode::FAILURE)
        }
        Ok(GenerationResult::Failure(reason)) => {
            println!("{reason}");
            Ok(ExitCode::FAILURE)
        }
        Ok(GenerationResult::Success(route)) => {
            println!("Your itinerary is ready: {route}");
            if open {
                show(app, &route).await
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

async fn show(app: &TravelTales, route: &ItineraryRoute) -> Result<ExitCode> {
    match app.show(route).await {
        Ok(view) => {
            println!("{}", render::detail(&view));
            Ok(ExitCode::SUCCESS)
        }
        Err(_) => {
            println!("{}", render::not_found());
            Ok(ExitCode::FAILURE)
        }
    }
}
