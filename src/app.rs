//! Application shell: runs view effects against the generation services.

use crate::ai::gemini::GeminiHttpClient;
use crate::ai::{GeminiStrategyClient, GeminiThumbnailClient, StrategyService, ThumbnailService};
use crate::command::{self, Command};
use crate::models::{Config, Strategy};
use crate::view::{self, Card, Effect, ImageState, Message, Session};
use crate::{Error, Result};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Owns the session and executes its effects, one spawned task per remote call.
pub struct App {
    strategies: Arc<dyn StrategyService>,
    thumbnails: Arc<dyn ThumbnailService>,
    session: Session,
    tx: mpsc::UnboundedSender<Message>,
    rx: mpsc::UnboundedReceiver<Message>,
    in_flight: usize,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub strategies: Arc<dyn StrategyService>,
    pub thumbnails: Arc<dyn ThumbnailService>,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            strategies: services.strategies,
            thumbnails: services.thumbnails,
            session: Session::new(),
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Construct the Gemini-backed app from configuration.
    pub fn new(config: &Config) -> Self {
        // Reuse one HTTP connection pool across both clients.
        let http_client = reqwest::Client::new();
        let http = |model: &str| {
            GeminiHttpClient::new_with_client(
                config.gemini_api_key.clone(),
                model.to_string(),
                http_client.clone(),
            )
            .with_base_url(config.gemini_base_url.clone())
            .with_timeout(config.request_timeout)
        };

        info!("Strategy model: {}", config.strategy_model);
        info!("Thumbnail model: {}", config.thumbnail_model);

        Self::with_services(AppServices {
            strategies: Arc::new(GeminiStrategyClient::from_http(http(
                &config.strategy_model,
            ))),
            thumbnails: Arc::new(GeminiThumbnailClient::from_http(http(
                &config.thumbnail_model,
            ))),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Number of remote calls whose completion has not been processed yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Applies a message and starts whatever work it asks for.
    pub fn dispatch(&mut self, message: Message) {
        if let Some(effect) = self.session.update(message) {
            self.spawn(effect);
        }
    }

    fn spawn(&mut self, effect: Effect) {
        let tx = self.tx.clone();
        self.in_flight += 1;

        match effect {
            Effect::GenerateStrategies { request, topic } => {
                let service = Arc::clone(&self.strategies);
                tokio::spawn(async move {
                    info!("Generating strategies for '{}'", topic);
                    let result = service.generate_strategies(&topic).await;
                    match &result {
                        Ok(strategies) => info!("Received {} strategies", strategies.len()),
                        Err(e) => error!("Strategy generation failed: {}", e),
                    }
                    let _ = tx.send(Message::StrategiesLoaded { request, result });
                });
            }
            Effect::GenerateThumbnail {
                batch,
                id,
                concept,
                topic,
            } => {
                let service = Arc::clone(&self.thumbnails);
                tokio::spawn(async move {
                    info!("Generating thumbnail for strategy {}", id);
                    let result = service.generate_thumbnail(&concept, &topic).await;
                    if let Err(e) = &result {
                        error!("Thumbnail generation for strategy {} failed: {}", id, e);
                    }
                    let _ = tx.send(Message::ThumbnailLoaded { batch, id, result });
                });
            }
        }
    }

    fn complete(&mut self, message: Message) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.dispatch(message);
    }

    /// Waits for the next completion and applies it. Returns `false` when
    /// nothing is in flight.
    pub async fn process_next(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.rx.recv().await {
            Some(message) => {
                self.complete(message);
                true
            }
            None => false,
        }
    }

    /// Processes completions until nothing is in flight.
    pub async fn settle(&mut self) {
        while self.process_next().await {}
    }

    /// Generates once for `topic` and prints the result, expanded, or as JSON.
    pub async fn run_once<W: Write>(&self, topic: &str, json: bool, out: &mut W) -> Result<()> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(Error::Config("topic must not be empty".to_string()));
        }

        let strategies = self.strategies.generate_strategies(topic).await?;

        if json {
            serde_json::to_writer_pretty(&mut *out, &strategies)?;
            writeln!(out)?;
        } else {
            write!(out, "{}", render_strategies(&strategies))?;
        }
        Ok(())
    }

    /// Runs the interactive session until `quit` or end of input.
    ///
    /// Input and completions are multiplexed, so commands keep working while
    /// requests are outstanding. At end of input the outstanding requests are
    /// awaited before returning. Lines that are not valid UTF-8 are decoded
    /// lossily rather than ending the session.
    pub async fn run_interactive<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.split(b'\n');
        let mut input_open = true;

        writeln!(out, "{}", command::help())?;
        write!(out, "{}", view::render(&self.session))?;

        loop {
            if !input_open && self.in_flight == 0 {
                break;
            }

            tokio::select! {
                segment = lines.next_segment(), if input_open => match segment? {
                    Some(bytes) => {
                        let line = decode_line(&bytes);
                        match Command::parse(&line) {
                            Ok(Some(command)) => {
                                if !self.handle_command(command, out).await? {
                                    break;
                                }
                            }
                            Ok(None) => {}
                            Err(e) => write!(out, "{}", e)?,
                        }
                    }
                    None => input_open = false,
                },
                Some(message) = self.rx.recv(), if self.in_flight > 0 => {
                    self.complete(message);
                    write!(out, "{}", view::render(&self.session))?;
                }
            }
        }

        out.flush()?;
        Ok(())
    }

    /// Returns `false` when the session should end.
    async fn handle_command<W: Write>(&mut self, command: Command, out: &mut W) -> Result<bool> {
        match command {
            Command::Topic { words } => {
                self.dispatch(Message::TopicChanged(Command::text(&words)))
            }
            Command::Generate { words } => {
                if !words.is_empty() {
                    self.dispatch(Message::TopicChanged(Command::text(&words)));
                }
                self.dispatch(Message::Submit);
            }
            Command::Open { n } => match self.session.card_id_at(n) {
                Some(id) => self.dispatch(Message::ToggleCard(id)),
                None => return no_such_card(out, n),
            },
            Command::Image { n } => match self.session.card_id_at(n) {
                Some(id) => self.dispatch(Message::GenerateThumbnail(id)),
                None => return no_such_card(out, n),
            },
            Command::Retry { n } => match self.session.card_id_at(n) {
                Some(id) => self.dispatch(Message::RetryThumbnail(id)),
                None => return no_such_card(out, n),
            },
            Command::Save { n, path } => {
                self.save_thumbnail(n, &Command::path(&path), out).await?;
                return Ok(true);
            }
            Command::Show => {}
            Command::Reset => self.dispatch(Message::Reset),
            Command::Help => {
                writeln!(out, "{}", command::help())?;
                return Ok(true);
            }
            Command::Quit => return Ok(false),
        }

        write!(out, "{}", view::render(&self.session))?;
        Ok(true)
    }

    async fn save_thumbnail<W: Write>(
        &self,
        position: usize,
        path: &Path,
        out: &mut W,
    ) -> Result<()> {
        let image = match self
            .session
            .card_id_at(position)
            .and_then(|id| self.session.card(id))
        {
            Some(Card {
                image: ImageState::Ready(image),
                ..
            }) => image,
            Some(_) => {
                writeln!(
                    out,
                    "Short #{} has no thumbnail yet; run `image {}` first",
                    position, position
                )?;
                return Ok(());
            }
            None => {
                writeln!(out, "No Short #{}", position)?;
                return Ok(());
            }
        };

        let written = match image.decode() {
            Ok(bytes) => tokio::fs::write(path, bytes).await.map_err(Error::from),
            Err(e) => Err(e),
        };

        match written {
            Ok(()) => writeln!(out, "Saved Short #{} thumbnail to {}", position, path.display())?,
            Err(e) => {
                error!("Failed to save thumbnail to {}: {}", path.display(), e);
                writeln!(out, "Could not save thumbnail: {}", e)?;
            }
        }
        Ok(())
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let line = String::from_utf8_lossy(bytes);
    if matches!(line, std::borrow::Cow::Owned(_)) {
        warn!("Input line was not valid UTF-8; invalid bytes were replaced");
    }
    line.trim_end_matches('\r').to_string()
}

fn no_such_card<W: Write>(out: &mut W, position: usize) -> Result<bool> {
    writeln!(out, "No Short #{}", position)?;
    Ok(true)
}

/// Renders strategies as expanded cards.
pub fn render_strategies(strategies: &[Strategy]) -> String {
    let mut out = String::new();
    for (index, strategy) in strategies.iter().enumerate() {
        let card = Card {
            expanded: true,
            ..Card::new(strategy.clone())
        };
        view::render::render_card(&mut out, index + 1, &card);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{decode_line, App, AppServices};
    use crate::ai::mock::{sample_strategies, MockStrategyClient, MockThumbnailClient};
    use crate::view::{ImageState, Message};
    use crate::Error;
    use std::sync::Arc;

    fn build_test_app(strategies: MockStrategyClient, thumbnails: MockThumbnailClient) -> App {
        App::with_services(AppServices {
            strategies: Arc::new(strategies),
            thumbnails: Arc::new(thumbnails),
        })
    }

    async fn loaded_app(thumbnails: MockThumbnailClient) -> App {
        let mut app = build_test_app(MockStrategyClient::new(), thumbnails);
        app.dispatch(Message::TopicChanged("Personal Finance for Beginners".to_string()));
        app.dispatch(Message::Submit);
        app.settle().await;
        app
    }

    #[tokio::test]
    async fn test_submit_generates_once_while_pending() {
        let strategies = MockStrategyClient::new();
        let probe = strategies.clone();
        let mut app = build_test_app(strategies, MockThumbnailClient::new());

        app.dispatch(Message::TopicChanged("Personal Finance for Beginners".to_string()));
        app.dispatch(Message::Submit);
        app.dispatch(Message::Submit);
        assert!(app.session().is_generating());
        assert_eq!(app.in_flight(), 1);

        app.settle().await;
        assert_eq!(probe.get_call_count(), 1);
        assert_eq!(app.session().cards().len(), 5);
        assert!(!app.session().is_generating());
    }

    #[tokio::test]
    async fn test_blank_topic_issues_no_request() {
        let strategies = MockStrategyClient::new();
        let probe = strategies.clone();
        let mut app = build_test_app(strategies, MockThumbnailClient::new());

        app.dispatch(Message::TopicChanged("   ".to_string()));
        app.dispatch(Message::Submit);

        assert_eq!(app.in_flight(), 0);
        assert!(!app.session().is_generating());
        app.settle().await;
        assert_eq!(probe.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_thumbnails_for_different_cards_run_concurrently() {
        let thumbnails = MockThumbnailClient::new();
        let probe = thumbnails.clone();
        let mut app = loaded_app(thumbnails).await;

        app.dispatch(Message::GenerateThumbnail(1));
        app.dispatch(Message::GenerateThumbnail(2));
        app.dispatch(Message::GenerateThumbnail(1));
        assert_eq!(app.in_flight(), 2);
        assert_eq!(app.session().card(1).unwrap().image, ImageState::Generating);
        assert_eq!(app.session().card(2).unwrap().image, ImageState::Generating);
        assert_eq!(app.session().card(3).unwrap().image, ImageState::Empty);

        app.settle().await;
        assert_eq!(probe.get_call_count(), 2);
        assert!(matches!(
            app.session().card(1).unwrap().image,
            ImageState::Ready(_)
        ));
        assert!(matches!(
            app.session().card(2).unwrap().image,
            ImageState::Ready(_)
        ));
    }

    #[tokio::test]
    async fn test_cached_thumbnail_is_not_requested_again() {
        let thumbnails = MockThumbnailClient::new();
        let probe = thumbnails.clone();
        let mut app = loaded_app(thumbnails).await;

        app.dispatch(Message::GenerateThumbnail(1));
        app.settle().await;
        let cached = app.session().card(1).unwrap().image.clone();

        app.dispatch(Message::GenerateThumbnail(1));
        app.settle().await;

        assert_eq!(probe.get_call_count(), 1);
        assert_eq!(app.session().card(1).unwrap().image, cached);
    }

    #[tokio::test]
    async fn test_retry_after_failure_issues_exactly_one_request() {
        let thumbnails = MockThumbnailClient::new().with_missing_image();
        let probe = thumbnails.clone();
        let mut app = loaded_app(thumbnails).await;

        app.dispatch(Message::GenerateThumbnail(3));
        app.settle().await;
        assert_eq!(
            app.session().card(3).unwrap().image,
            ImageState::Failed("Failed to generate image".to_string())
        );

        app.dispatch(Message::RetryThumbnail(3));
        app.dispatch(Message::RetryThumbnail(3));
        app.settle().await;

        assert_eq!(probe.get_call_count(), 2);
        assert!(matches!(
            app.session().card(3).unwrap().image,
            ImageState::Ready(_)
        ));
    }

    #[tokio::test]
    async fn test_thumbnail_uses_results_topic() {
        let thumbnails = MockThumbnailClient::new();
        let probe = thumbnails.clone();
        let mut app = loaded_app(thumbnails).await;

        app.dispatch(Message::TopicChanged("Something else".to_string()));
        app.dispatch(Message::GenerateThumbnail(2));
        app.settle().await;

        let calls = probe.calls();
        assert_eq!(calls[0].0, sample_strategies(5)[1].thumbnail);
        assert_eq!(calls[0].1, "Personal Finance for Beginners");
    }

    #[test]
    fn test_decode_line_replaces_invalid_bytes() {
        assert_eq!(decode_line(b"topic caf\xe9"), "topic caf\u{FFFD}");
        assert_eq!(decode_line(b"show\r"), "show");
    }

    #[tokio::test]
    async fn test_run_once_rejects_blank_topic() {
        let strategies = MockStrategyClient::new();
        let probe = strategies.clone();
        let app = build_test_app(strategies, MockThumbnailClient::new());

        let mut out = Vec::new();
        let err = app.run_once("  ", false, &mut out).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(probe.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_run_once_json_round_trips() {
        let app = build_test_app(
            MockStrategyClient::new().with_strategies(sample_strategies(5)),
            MockThumbnailClient::new(),
        );

        let mut out = Vec::new();
        app.run_once("topic", true, &mut out).await.unwrap();

        let parsed: Vec<crate::models::Strategy> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, sample_strategies(5));
    }

    #[tokio::test]
    async fn test_run_once_propagates_failure() {
        let app = build_test_app(
            MockStrategyClient::new().with_failure(Error::Parse("bad".to_string())),
            MockThumbnailClient::new(),
        );

        let mut out = Vec::new();
        let err = app.run_once("topic", false, &mut out).await.unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert!(out.is_empty());
    }
}
