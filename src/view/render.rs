use super::session::{Card, ImageState, Session};
use std::fmt::Write;

const RULE: &str = "------------------------------------------------------------";

/// Renders the whole session as plain text.
pub fn render(session: &Session) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Shorts Strategist");
    let _ = writeln!(out, "{}", RULE);
    if session.topic().is_empty() {
        let _ = writeln!(
            out,
            "Topic: (e.g. Personal Finance for Beginners, Fitness at Home...)"
        );
    } else {
        let _ = writeln!(out, "Topic: {}", session.topic());
    }
    if session.is_generating() {
        let _ = writeln!(out, "Generating strategies...");
    }
    if let Some(error) = session.error() {
        let _ = writeln!(out, "Error: {}", error);
    }

    for (index, card) in session.cards().iter().enumerate() {
        let _ = writeln!(out, "{}", RULE);
        render_card(&mut out, index + 1, card);
    }

    out
}

/// Renders one card; `position` is the 1-based `Short #n` label.
pub fn render_card(out: &mut String, position: usize, card: &Card) {
    let strategy = &card.strategy;
    let marker = if card.expanded { "[-]" } else { "[+]" };

    let _ = writeln!(
        out,
        "{} Short #{}  {}",
        marker, position, strategy.seo.title
    );
    let _ = writeln!(out, "    Problem: {}", strategy.problem);
    let _ = writeln!(out, "    Image: {}", image_summary(&card.image));

    if !card.expanded {
        return;
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "  CINEMATIC SCRIPT");
    let _ = writeln!(out, "    Hook (0-2s): \"{}\"", strategy.hook);
    write_block(out, "Voiceover", &strategy.script.voiceover);
    write_block(out, "Visuals / Scenes", &strategy.script.scenes);

    let _ = writeln!(out);
    let _ = writeln!(out, "  SEO METADATA");
    write_block(out, "Description", &strategy.seo.description);
    let _ = writeln!(out, "    Keywords: {}", strategy.seo.keywords.join(", "));
    let tags: Vec<String> = strategy
        .seo
        .tags
        .iter()
        .map(|tag| format!("#{}", tag.trim_start_matches('#')))
        .collect();
    let _ = writeln!(out, "    Tags: {}", tags.join(" "));

    let _ = writeln!(out);
    let _ = writeln!(out, "  THUMBNAIL CONCEPT");
    let _ = writeln!(out, "    Text Overlay: {}", strategy.thumbnail.text);
    let _ = writeln!(out, "    Visual Idea: {}", strategy.thumbnail.image_idea);
    let _ = writeln!(out, "    Emotion: {}", strategy.thumbnail.emotion);

    let _ = writeln!(out);
    let _ = writeln!(out, "  AI GENERATION");
    match &card.image {
        ImageState::Empty => {
            let _ = writeln!(
                out,
                "    Run `image {}` to create an AI thumbnail from this concept",
                position
            );
        }
        ImageState::Generating => {
            let _ = writeln!(out, "    Generating cinematic thumbnail...");
        }
        ImageState::Ready(image) => {
            let _ = writeln!(
                out,
                "    Thumbnail ready ({} byte data URI), overlay \"{}\"",
                image.as_uri().len(),
                strategy.thumbnail.text.to_uppercase()
            );
            let _ = writeln!(out, "    Run `save {} <path>` to write the image", position);
        }
        ImageState::Failed(error) => {
            let _ = writeln!(out, "    {}", error);
            let _ = writeln!(out, "    Try again: `retry {}`", position);
        }
    }
}

fn image_summary(state: &ImageState) -> &'static str {
    match state {
        ImageState::Empty => "not generated",
        ImageState::Generating => "generating...",
        ImageState::Ready(_) => "ready",
        ImageState::Failed(_) => "failed",
    }
}

/// Writes a labelled multi-line field, indenting every line.
fn write_block(out: &mut String, label: &str, text: &str) {
    let _ = writeln!(out, "    {}:", label);
    for line in text.lines() {
        let _ = writeln!(out, "      {}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mock::sample_strategies;
    use crate::models::ThumbnailImage;
    use crate::view::{Effect, Message};
    use crate::Error;
    use pretty_assertions::assert_eq;

    fn loaded(count: usize) -> Session {
        let mut session = Session::new();
        session.update(Message::TopicChanged("Personal Finance for Beginners".to_string()));
        let request = match session.update(Message::Submit) {
            Some(Effect::GenerateStrategies { request, .. }) => request,
            other => panic!("unexpected {other:?}"),
        };
        session.update(Message::StrategiesLoaded {
            request,
            result: Ok(sample_strategies(count)),
        });
        session
    }

    #[test]
    fn test_render_empty_session() {
        let text = render(&Session::new());
        assert!(text.starts_with("Shorts Strategist\n"));
        assert!(text.contains("Topic: (e.g. Personal Finance"));
        assert!(!text.contains("Short #"));
    }

    #[test]
    fn test_render_generating_and_error() {
        let mut session = Session::new();
        session.update(Message::TopicChanged("topic".to_string()));
        session.update(Message::Submit);
        assert!(render(&session).contains("Generating strategies..."));

        session.update(Message::StrategiesLoaded {
            request: 1,
            result: Err(Error::Generation("No response from Gemini".to_string())),
        });
        let text = render(&session);
        assert!(!text.contains("Generating strategies..."));
        assert!(text.contains("Error: No response from Gemini"));
    }

    #[test]
    fn test_collapsed_card() {
        let session = loaded(1);
        let mut out = String::new();
        render_card(&mut out, 1, &session.cards()[0]);

        assert_eq!(
            out,
            "[+] Short #1  Short 1 title\n    \
             Problem: Problem 1: money runs out before the month ends\n    \
             Image: not generated\n"
        );
    }

    #[test]
    fn test_expanded_card_shows_script_unmodified() {
        let mut session = loaded(5);
        session.update(Message::ToggleCard(1));
        let text = render(&session);

        assert!(text.contains("[-] Short #1  Short 1 title"));
        assert!(text.contains("      Voiceover for short 1.\n"));
        assert!(text.contains("      Scene directions for short 1.\n"));
        assert!(text.contains("    Tags: #money #finance\n"));
        assert!(text.contains("Run `image 1`"));
        assert!(text.contains("[+] Short #2  Short 2 title"));
        assert!(!text.contains("Voiceover for short 2."));
    }

    #[test]
    fn test_image_states_render() {
        let mut session = loaded(2);
        session.update(Message::ToggleCard(1));
        session.update(Message::ToggleCard(2));
        let batch = session.batch();

        session.update(Message::GenerateThumbnail(1));
        session.update(Message::GenerateThumbnail(2));
        assert!(render(&session).contains("Generating cinematic thumbnail..."));

        session.update(Message::ThumbnailLoaded {
            batch,
            id: 1,
            result: Ok(ThumbnailImage::from_base64_png("AAAA")),
        });
        session.update(Message::ThumbnailLoaded {
            batch,
            id: 2,
            result: Err(Error::ImageGeneration("Failed to generate image".to_string())),
        });

        let text = render(&session);
        assert!(text.contains("Thumbnail ready (26 byte data URI), overlay \"BROKE AGAIN?\""));
        assert!(text.contains("Run `save 1 <path>`"));
        assert!(text.contains("    Failed to generate image\n    Try again: `retry 2`"));
    }
}
