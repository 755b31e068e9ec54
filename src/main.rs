use anyhow::Result;
use clap::Parser;
use shorts_strategist::app::App;
use shorts_strategist::models::Config;
use tokio::io::BufReader;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "shorts-strategist")]
#[command(about = "Generate YouTube Shorts strategies and AI thumbnails with Gemini")]
struct CliArgs {
    /// Generate once for this topic, print the strategies and exit.
    #[arg(short, long, value_name = "TEXT")]
    topic: Option<String>,

    /// With --topic, print the strategies as JSON.
    #[arg(long, requires = "topic")]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the rendered view.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shorts_strategist=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    let mut app = App::new(&config);
    let mut stdout = std::io::stdout();

    match args.topic {
        Some(topic) => {
            if let Err(e) = app.run_once(&topic, args.json, &mut stdout).await {
                error!("Generation failed: {}", e);
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            app.run_interactive(BufReader::new(tokio::io::stdin()), &mut stdout)
                .await?;
        }
    }

    Ok(())
}
