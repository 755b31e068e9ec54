pub const STRATEGY: &str = include_str!("../data/prompts/strategy.txt");
pub const THUMBNAIL: &str = include_str!("../data/prompts/thumbnail.txt");

/// Replace `{{key}}` placeholders in a template string.
///
/// Substituted values are copied verbatim and never scanned for placeholders.
/// Unknown placeholders are left as they are.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];

        let Some(end) = after_open.find("}}") else {
            result.push_str(&rest[start..]);
            return result;
        };

        let key = &after_open[..end];
        match vars.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => result.push_str(value),
            None => result.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after_open[end + 2..];
    }

    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_var() {
        assert_eq!(
            render("Hello {{name}}!", &[("name", "world")]),
            "Hello world!"
        );
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        assert_eq!(render("{{a}} and {{b}}", &[("a", "cats")]), "cats and {{b}}");
    }

    #[test]
    fn test_render_does_not_expand_substituted_values() {
        assert_eq!(
            render(
                "Topic: {{topic}} / Emotion: {{emotion}}",
                &[("topic", "Why {{emotion}} matters"), ("emotion", "shock")]
            ),
            "Topic: Why {{emotion}} matters / Emotion: shock"
        );
    }

    #[test]
    fn test_render_keeps_unclosed_braces() {
        assert_eq!(render("{{a}} then {{ oops", &[("a", "x")]), "x then {{ oops");
    }

    #[test]
    fn test_strategy_has_topic_placeholder() {
        assert!(STRATEGY.contains("{{topic}}"));
        assert!(STRATEGY.contains("India"));
        assert!(STRATEGY.contains("problem -> realization -> solution -> motivation"));
    }

    #[test]
    fn test_thumbnail_has_placeholders() {
        assert!(THUMBNAIL.contains("{{topic}}"));
        assert!(THUMBNAIL.contains("{{image_idea}}"));
        assert!(THUMBNAIL.contains("{{emotion}}"));
        assert!(THUMBNAIL.contains("bold 3-word text"));
    }
}
