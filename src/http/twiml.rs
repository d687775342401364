//! Minimal TwiML builder for the voice menu.
//!
//! Covers the three verbs the call center uses: `Say`, `Play` and `Gather`.

use std::fmt::Write;

/// Voice used for every `Say`.
const VOICE: &str = "man";

/// Language used for every `Say`.
const LANGUAGE: &str = "en";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Verb {
    Say(String),
    Play(String),
    Gather {
        action: String,
        finish_on_key: String,
        children: Vec<Verb>,
    },
}

/// A `<Response>` document under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Twiml {
    verbs: Vec<Verb>,
}

impl Twiml {
    /// Starts an empty response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Speaks `text`.
    #[must_use]
    pub fn say(mut self, text: impl Into<String>) -> Self {
        self.verbs.push(Verb::Say(text.into()));
        self
    }

    /// Plays the audio file at `url`.
    #[must_use]
    pub fn play(mut self, url: impl Into<String>) -> Self {
        self.verbs.push(Verb::Play(url.into()));
        self
    }

    /// Collects keypresses and posts them to `action`. `nested` builds the
    /// prompts spoken while waiting.
    #[must_use]
    pub fn gather(
        mut self,
        action: impl Into<String>,
        finish_on_key: impl Into<String>,
        nested: impl FnOnce(Self) -> Self,
    ) -> Self {
        self.verbs.push(Verb::Gather {
            action: action.into(),
            finish_on_key: finish_on_key.into(),
            children: nested(Self::new()).verbs,
        });
        self
    }

    /// Serializes the document.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><Response>"#);
        for verb in &self.verbs {
            render_verb(&mut out, verb);
        }
        out.push_str("</Response>");
        out
    }
}

fn render_verb(out: &mut String, verb: &Verb) {
    // Writing to a String cannot fail
    let _ = match verb {
        Verb::Say(text) => write!(
            out,
            r#"<Say voice="{VOICE}" language="{LANGUAGE}">{}</Say>"#,
            escape(text)
        ),
        Verb::Play(url) => write!(out, "<Play>{}</Play>", escape(url)),
        Verb::Gather {
            action,
            finish_on_key,
            children,
        } => {
            let _ = write!(
                out,
                r#"<Gather action="{}" finishOnKey="{}">"#,
                escape(action),
                escape(finish_on_key)
            );
            for child in children {
                render_verb(out, child);
            }
            out.write_str("</Gather>")
        }
    };
}

/// Escapes text for XML content and attribute values.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
