//! Placeholder substitution for stage bodies.
//!
//! Bodies use single-brace fields: `{title}` is replaced by the supplied
//! value, `{{` and `}}` produce literal braces. Every field must have a value;
//! an unresolved field is an error, never passed through to the backend.

use inkpipe_core::{AppError, AppResult};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{|\}\}|\{([^{}]*)\}|[{}]").expect("Invalid placeholder regex")
});

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Field(&'a str),
}

fn segments(body: &str) -> AppResult<Vec<Segment<'_>>> {
    let mut out = Vec::new();
    let mut last = 0;

    for caps in TOKEN.captures_iter(body) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            out.push(Segment::Text(&body[last..whole.start()]));
        }
        last = whole.end();

        match (whole.as_str(), caps.get(1)) {
            ("{{", _) => out.push(Segment::Text("{")),
            ("}}", _) => out.push(Segment::Text("}")),
            (_, Some(name)) => {
                let name = name.as_str();
                if !is_identifier(name) {
                    return Err(AppError::Template(format!(
                        "Malformed placeholder '{{{}}}' at byte {}",
                        name,
                        whole.start()
                    )));
                }
                out.push(Segment::Field(name));
            }
            (brace, None) => {
                return Err(AppError::Template(format!(
                    "Unmatched '{}' at byte {}",
                    brace,
                    whole.start()
                )));
            }
        }
    }

    if last < body.len() {
        out.push(Segment::Text(&body[last..]));
    }
    Ok(out)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// Names of the fields a body references, in first-use order.
pub fn placeholders(body: &str) -> AppResult<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    for segment in segments(body)? {
        if let Segment::Field(name) = segment {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

/// Substitute every field in `body` with its value.
///
/// # Errors
/// `AppError::Template` for a field without a value, a malformed field, or
/// an unmatched brace.
pub fn render(body: &str, values: &HashMap<String, String>) -> AppResult<String> {
    let mut rendered = String::with_capacity(body.len());

    for segment in segments(body)? {
        match segment {
            Segment::Text(text) => rendered.push_str(text),
            Segment::Field(name) => {
                let value = values.get(name).ok_or_else(|| {
                    AppError::Template(format!("No value supplied for placeholder '{{{}}}'", name))
                })?;
                rendered.push_str(value);
            }
        }
    }

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_simple() {
        let rendered = render(
            "Title: {title}\nAngle: {angle}",
            &values(&[("title", "聚光灯效应"), ("angle", "social")]),
        )
        .unwrap();
        assert_eq!(rendered, "Title: 聚光灯效应\nAngle: social");
    }

    #[test]
    fn test_missing_value_is_error() {
        let result = render("Outline for {title}", &values(&[]));
        match result {
            Err(AppError::Template(msg)) => assert!(msg.contains("{title}")),
            other => panic!("expected template error, got {:?}", other),
        }
    }

    #[test]
    fn test_escaped_braces() {
        let rendered = render(
            "Return JSON like {{\"title\": \"{title}\"}}",
            &values(&[("title", "x")]),
        )
        .unwrap();
        assert_eq!(rendered, "Return JSON like {\"title\": \"x\"}");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let rendered = render("{content}", &values(&[("content", "{outline} stays")])).unwrap();
        assert_eq!(rendered, "{outline} stays");
    }

    #[test]
    fn test_unmatched_brace_is_error() {
        assert!(matches!(
            render("a } b", &values(&[])),
            Err(AppError::Template(_))
        ));
        assert!(matches!(
            render("a { b", &values(&[])),
            Err(AppError::Template(_))
        ));
    }

    #[test]
    fn test_malformed_field_is_error() {
        assert!(matches!(
            render("{ title }", &values(&[("title", "x")])),
            Err(AppError::Template(_))
        ));
        assert!(matches!(render("{}", &values(&[])), Err(AppError::Template(_))));
    }

    #[test]
    fn test_placeholders_unique_in_order() {
        let names = placeholders("{title} and {angle}, again {title}; {{literal}}").unwrap();
        assert_eq!(names, vec!["title", "angle"]);
    }

    #[test]
    fn test_rendered_output_has_no_unresolved_fields() {
        let bodies = [
            "Topic is {topic}",
            "Outline \"{title}\" from {angle}.\n\n{title} again",
            "{outline}",
            "Polish:\n\n{content}\n",
        ];
        let supplied = values(&[
            ("topic", "habits"),
            ("title", "Small steps"),
            ("angle", "identity"),
            ("outline", "1. intro"),
            ("content", "draft text"),
        ]);

        for body in bodies {
            let rendered = render(body, &supplied).unwrap();
            assert!(placeholders(&rendered).unwrap().is_empty(), "{}", rendered);
        }
    }

    #[test]
    fn test_unicode_identifier() {
        let rendered = render("{主题}", &values(&[("主题", "心理学")])).unwrap();
        assert_eq!(rendered, "心理学");
    }
}
