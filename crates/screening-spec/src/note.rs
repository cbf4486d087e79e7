use std::sync::LazyLock;

use regex::Regex;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid note placeholder regex"));

/// Href used once the link list runs out.
pub const DEAD_LINK: &str = "#";

/// One piece of an explanatory note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteSegment {
    Text(String),
    Link { label: String, href: String },
}

/// Explanatory note with `<placeholder>` spans already paired with their links.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Note {
    pub segments: Vec<NoteSegment>,
}

impl Note {
    /// Placeholders consume `links` in order; extra placeholders point at [`DEAD_LINK`].
    pub fn parse(text: &str, links: &[String]) -> Self {
        let mut segments = Vec::new();
        let mut links = links.iter();
        let mut cursor = 0;

        for found in PLACEHOLDER.find_iter(text) {
            if found.start() > cursor {
                segments.push(NoteSegment::Text(text[cursor..found.start()].to_string()));
            }
            let placeholder = found.as_str();
            segments.push(NoteSegment::Link {
                label: placeholder[1..placeholder.len() - 1].to_string(),
                href: links
                    .next()
                    .filter(|href| !href.is_empty())
                    .cloned()
                    .unwrap_or_else(|| DEAD_LINK.to_string()),
            });
            cursor = found.end();
        }
        if cursor < text.len() {
            segments.push(NoteSegment::Text(text[cursor..].to_string()));
        }

        Self { segments }
    }

    /// Note as plain text, links shown as `label (href)`.
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                NoteSegment::Text(text) => text.clone(),
                NoteSegment::Link { label, href } if href == DEAD_LINK => label.clone(),
                NoteSegment::Link { label, href } => format!("{} ({})", label, href),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_pair_with_links_in_order() {
        let links = vec!["https://a.example".to_string()];
        let note = Note::parse("See <statute> and <form> for details.", &links);
        assert_eq!(
            note.segments,
            vec![
                NoteSegment::Text("See ".into()),
                NoteSegment::Link {
                    label: "statute".into(),
                    href: "https://a.example".into()
                },
                NoteSegment::Text(" and ".into()),
                NoteSegment::Link {
                    label: "form".into(),
                    href: DEAD_LINK.into()
                },
                NoteSegment::Text(" for details.".into()),
            ]
        );
    }

    #[test]
    fn note_without_placeholders_is_one_text_segment() {
        let note = Note::parse("Plain note", &[]);
        assert_eq!(note.segments, vec![NoteSegment::Text("Plain note".into())]);
        assert_eq!(note.plain_text(), "Plain note");
    }

    #[test]
    fn plain_text_inlines_hrefs() {
        let links = vec!["https://oscn.net".to_string()];
        let note = Note::parse("<OSCN>", &links);
        assert_eq!(note.plain_text(), "OSCN (https://oscn.net)");
    }
}
