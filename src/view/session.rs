use crate::models::{Strategy, ThumbnailConcept, ThumbnailImage};
use crate::Result;

/// Cards are keyed by their 1-based position in the current result list.
///
/// Strategy ids are not trusted to be unique, so they never address a card.
pub type CardId = usize;

#[derive(Debug, Clone, PartialEq)]
pub enum ImageState {
    Empty,
    Generating,
    Ready(ThumbnailImage),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct Card {
    pub strategy: Strategy,
    pub expanded: bool,
    pub image: ImageState,
}

impl Card {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            expanded: false,
            image: ImageState::Empty,
        }
    }

    /// Starts a thumbnail request unless one is in flight or already cached.
    fn begin_thumbnail(&mut self) -> bool {
        match self.image {
            ImageState::Empty | ImageState::Failed(_) => {
                self.image = ImageState::Generating;
                true
            }
            ImageState::Generating | ImageState::Ready(_) => false,
        }
    }
}

#[derive(Debug)]
pub enum Message {
    TopicChanged(String),
    Submit,
    StrategiesLoaded {
        request: u64,
        result: Result<Vec<Strategy>>,
    },
    ToggleCard(CardId),
    GenerateThumbnail(CardId),
    /// Only acts on a card whose last thumbnail request failed.
    RetryThumbnail(CardId),
    ThumbnailLoaded {
        batch: u64,
        id: CardId,
        result: Result<ThumbnailImage>,
    },
    Reset,
}

/// Work the shell must perform; the outcome comes back as a [`Message`].
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    GenerateStrategies {
        request: u64,
        topic: String,
    },
    GenerateThumbnail {
        batch: u64,
        id: CardId,
        concept: ThumbnailConcept,
        topic: String,
    },
}

#[derive(Debug, Default)]
pub struct Session {
    topic: String,
    cards: Vec<Card>,
    error: Option<String>,
    /// Topic the current cards were generated for.
    results_topic: String,
    /// Outstanding strategies request id and the topic it was sent with.
    pending: Option<(u64, String)>,
    requests: u64,
    /// Bumped whenever the card list is replaced or reset.
    batch: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn is_generating(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        id.checked_sub(1).and_then(|index| self.cards.get(index))
    }

    /// Maps the position shown as `Short #n` to a card id, if such a card exists.
    pub fn card_id_at(&self, position: usize) -> Option<CardId> {
        self.card(position).map(|_| position)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn results_topic(&self) -> &str {
        &self.results_topic
    }

    pub fn batch(&self) -> u64 {
        self.batch
    }

    fn card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        id.checked_sub(1).and_then(|index| self.cards.get_mut(index))
    }

    pub fn update(&mut self, message: Message) -> Option<Effect> {
        match message {
            Message::TopicChanged(topic) => {
                self.topic = topic;
                None
            }
            Message::Submit => {
                let topic = self.topic.trim();
                if self.pending.is_some() || topic.is_empty() {
                    return None;
                }

                let topic = topic.to_string();
                self.requests += 1;
                self.pending = Some((self.requests, topic.clone()));
                self.error = None;

                Some(Effect::GenerateStrategies {
                    request: self.requests,
                    topic,
                })
            }
            Message::StrategiesLoaded { request, result } => {
                let topic = match self.pending.take() {
                    Some((pending, topic)) if pending == request => topic,
                    other => {
                        tracing::debug!("Dropping stale strategies response #{}", request);
                        self.pending = other;
                        return None;
                    }
                };

                match result {
                    Ok(strategies) => {
                        self.cards = strategies.into_iter().map(Card::new).collect();
                        self.results_topic = topic;
                        self.batch += 1;
                    }
                    // Previous cards stay on screen next to the error.
                    Err(e) => {
                        let message = e.to_string();
                        self.error = Some(if message.is_empty() {
                            "Failed to generate strategies".to_string()
                        } else {
                            message
                        });
                    }
                }
                None
            }
            Message::ToggleCard(id) => {
                if let Some(card) = self.card_mut(id) {
                    card.expanded = !card.expanded;
                }
                None
            }
            Message::GenerateThumbnail(id) => self.start_thumbnail(id, false),
            Message::RetryThumbnail(id) => self.start_thumbnail(id, true),
            Message::ThumbnailLoaded { batch, id, result } => {
                if batch != self.batch {
                    tracing::debug!("Dropping thumbnail for card {} from old batch {}", id, batch);
                    return None;
                }

                if let Some(card) = self.card_mut(id) {
                    if card.image == ImageState::Generating {
                        card.image = match result {
                            Ok(image) => ImageState::Ready(image),
                            Err(e) => {
                                let message = e.to_string();
                                ImageState::Failed(if message.is_empty() {
                                    "Failed to generate image".to_string()
                                } else {
                                    message
                                })
                            }
                        };
                    }
                }
                None
            }
            Message::Reset => {
                *self = Session {
                    requests: self.requests,
                    batch: self.batch + 1,
                    ..Session::default()
                };
                None
            }
        }
    }

    fn start_thumbnail(&mut self, id: CardId, retry_only: bool) -> Option<Effect> {
        let batch = self.batch;
        let topic = self.results_topic.clone();
        let card = self.card_mut(id)?;

        if retry_only && !matches!(card.image, ImageState::Failed(_)) {
            return None;
        }
        if !card.begin_thumbnail() {
            return None;
        }

        Some(Effect::GenerateThumbnail {
            batch,
            id,
            concept: card.strategy.thumbnail.clone(),
            topic,
        })
    }
}
