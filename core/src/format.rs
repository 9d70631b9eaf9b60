//! Presentation of resolved definitions.
//!
//! Two renderings exist. `commentary` is the fixed markdown-flavoured line
//! stored on every `ResolvedDefinition::formatted`. `render` targets one of
//! four markups through a per-format template table; an unknown format name
//! is a configuration error.

use crate::error::{Error, Result};
use crate::model::ResolvedDefinition;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Latex,
    #[default]
    Markdown,
    Html,
    Text,
}

/// Markup pieces for one output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub headword_open: &'static str,
    pub headword_close: &'static str,
    /// Between the headword block and the senses.
    pub definition_separator: &'static str,
    /// Between whole entries in `render_all`.
    pub entry_separator: &'static str,
}

const LATEX: Template = Template {
    headword_open: "\\textbf{",
    headword_close: "}",
    definition_separator: " - ",
    entry_separator: "\n\n",
};

const MARKDOWN: Template = Template {
    headword_open: "**",
    headword_close: "**",
    definition_separator: " - ",
    entry_separator: "\n\n",
};

const HTML: Template = Template {
    headword_open: "<strong>",
    headword_close: "</strong>",
    definition_separator: " - ",
    entry_separator: "<br><br>",
};

const TEXT: Template = Template {
    headword_open: "",
    headword_close: "",
    definition_separator: " - ",
    entry_separator: "\n\n",
};

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Latex,
        OutputFormat::Markdown,
        OutputFormat::Html,
        OutputFormat::Text,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Latex => "latex",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Html => "html",
            OutputFormat::Text => "text",
        }
    }

    pub fn template(&self) -> &'static Template {
        match self {
            OutputFormat::Latex => &LATEX,
            OutputFormat::Markdown => &MARKDOWN,
            OutputFormat::Html => &HTML,
            OutputFormat::Text => &TEXT,
        }
    }

    /// Escape text for this markup.
    pub fn escape(&self, text: &str) -> String {
        match self {
            OutputFormat::Latex => escape_latex(text),
            OutputFormat::Html => escape_html(text),
            OutputFormat::Markdown | OutputFormat::Text => text.to_string(),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == name)
            .ok_or_else(|| Error::UnknownFormat(s.to_string()))
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            _ => out.push(c),
        }
    }
    out
}

/// `key: value` pairs in grammar order, empty values skipped.
fn grammar_summary(def: &ResolvedDefinition) -> Option<String> {
    let parts: Vec<String> = def
        .grammar
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

/// Commentary line: `**lemma** (pos) [k: v, ...]: sense; sense` with an
/// indented synonym line when synonyms are present.
pub fn commentary(def: &ResolvedDefinition) -> String {
    let mut out = format!("**{}**", def.lemma);
    if !def.part_of_speech.is_unknown() {
        out.push_str(&format!(" ({})", def.part_of_speech));
    }
    if let Some(summary) = grammar_summary(def) {
        out.push_str(&format!(" [{}]", summary));
    }
    if !def.senses.is_empty() {
        out.push_str(": ");
        out.push_str(&def.senses.join("; "));
    }
    if let Some(synonyms) = def.synonyms.as_ref().filter(|s| !s.is_empty()) {
        out.push_str("\n  Synonyms: ");
        out.push_str(&synonyms.join(", "));
    }
    out
}

/// Render one entry in `format`.
pub fn render_entry(def: &ResolvedDefinition, format: OutputFormat) -> String {
    let t = format.template();
    let mut out = format!(
        "{}{}{}",
        t.headword_open,
        format.escape(&def.lemma),
        t.headword_close
    );
    if !def.part_of_speech.is_unknown() {
        out.push_str(&format!(" ({})", def.part_of_speech));
    }
    if let Some(summary) = grammar_summary(def) {
        out.push_str(&format!(" [{}]", format.escape(&summary)));
    }
    if !def.senses.is_empty() {
        out.push_str(t.definition_separator);
        out.push_str(&format.escape(&def.senses.join("; ")));
    }
    if let Some(synonyms) = def.synonyms.as_ref().filter(|s| !s.is_empty()) {
        out.push_str(t.definition_separator);
        out.push_str("syn. ");
        out.push_str(&format.escape(&synonyms.join(", ")));
    }
    out
}

/// Render one entry by format name.
pub fn render(def: &ResolvedDefinition, format: &str) -> Result<String> {
    let format: OutputFormat = format.parse()?;
    Ok(render_entry(def, format))
}

/// Render entries joined by the format's entry separator.
pub fn render_all<'a, I>(defs: I, format: OutputFormat) -> String
where
    I: IntoIterator<Item = &'a ResolvedDefinition>,
{
    defs.into_iter()
        .map(|d| render_entry(d, format))
        .collect::<Vec<_>>()
        .join(format.template().entry_separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarKey;
    use crate::pos::PartOfSpeech;

    fn puella() -> ResolvedDefinition {
        let mut def = ResolvedDefinition::new("puella");
        def.part_of_speech = PartOfSpeech::Noun;
        def.grammar.insert(GrammarKey::Gender, "feminine");
        def.push_sense("girl");
        def
    }

    #[test]
    fn markdown_entry() {
        let out = render(&puella(), "markdown").unwrap();
        assert_eq!(out, "**puella** (noun) [gender: feminine] - girl");
    }

    #[test]
    fn commentary_line() {
        let mut def = puella();
        def.push_sense("maiden");
        def.synonyms = Some(vec!["virgo".into()]);
        assert_eq!(
            commentary(&def),
            "**puella** (noun) [gender: feminine]: girl; maiden\n  Synonyms: virgo"
        );
    }

    #[test]
    fn commentary_skips_unknown_pos_and_empty_values() {
        let mut def = ResolvedDefinition::new("et");
        def.grammar.insert(GrammarKey::Case, "");
        assert_eq!(commentary(&def), "**et**");
    }

    #[test]
    fn unknown_format_is_an_error() {
        let err = render(&puella(), "rtf").unwrap_err();
        assert!(matches!(err, Error::UnknownFormat(ref f) if f == "rtf"));
    }

    #[test]
    fn format_names_are_case_insensitive() {
        assert_eq!("LaTeX".parse::<OutputFormat>().unwrap(), OutputFormat::Latex);
    }

    #[test]
    fn html_and_latex_are_escaped() {
        let mut def = ResolvedDefinition::new("a&b");
        def.push_sense("50% <off>");
        assert_eq!(
            render_entry(&def, OutputFormat::Html),
            "<strong>a&amp;b</strong> - 50% &lt;off&gt;"
        );
        assert_eq!(
            render_entry(&def, OutputFormat::Latex),
            "\\textbf{a\\&b} - 50\\% <off>"
        );
    }

    #[test]
    fn render_all_uses_entry_separator() {
        let defs = vec![puella(), ResolvedDefinition::new("et")];
        let html = render_all(&defs, OutputFormat::Html);
        assert_eq!(html.matches("<br><br>").count(), 1);
        let text = render_all(&defs, OutputFormat::Text);
        assert!(text.ends_with("\n\net"));
    }
}
