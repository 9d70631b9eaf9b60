//! Middle Liddell loader.
//!
//! The lexicon is TEI-style XML with one `<entry key="...">` per headword,
//! keys and headwords written in Beta code. Entries are streamed with
//! quick-xml; each one is collected into a small element tree and then
//! mined for its headword (`orth`), paradigm note (`note type="alt"`) and
//! senses.
//!
//! Without a Beta code transliterator nothing can be keyed, so the loader
//! yields an empty lexicon.

use crate::betacode::{default_transliterator, Transliterator};
use crate::{LexiconLoader, LoadError};
use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;
use regex::Regex;
use scholia_core::{Gender, Lexicon, LexiconEntry, PartOfSpeech};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

const MAX_SENSES: usize = 5;

const VERB_ENDINGS: [&str; 4] = ["w", "mi", "mai", "omai"];
const VERB_SENSE_MARKERS: [&str; 7] = ["to ", "pass.", "act.", "mid.", "aor.", "fut.", "perf."];

/// Article as written after the headword in a note, and its gender.
const ARTICLES: [(&str, Gender); 3] = [
    ("o(", Gender::Masculine),
    ("h(", Gender::Feminine),
    ("to/", Gender::Neuter),
];

static GENITIVE_FORM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z)(/=\\|+]+$").expect("static pattern"));
static FEMININE_ENDING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[hao]+[/=]?$").expect("static pattern"));
static NEUTER_ENDING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[aoe]+[/n=]+$").expect("static pattern"));
static TWO_ENDING_NEUTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[oe]+[/n]+$").expect("static pattern"));
static NOUN_FORM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(os|on|h|a[|]?|hs|is|us|wn|ws|wr|hr)$").expect("static pattern")
});

/// Evidence a part-of-speech rule looks at.
enum Cue {
    /// Pattern found anywhere in the paradigm note.
    Note(Regex),
    /// Headword has a verb ending and the first sense reads like a verb gloss.
    VerbForm,
    /// First sense mentions one of these labels.
    SenseLabel(&'static [&'static str]),
    /// Note names an article.
    Article,
    /// First sense opens with a noun gloss.
    SenseStart(Regex),
    /// Headword has a nominal ending and no verb ending.
    NounForm,
}

/// First match wins; no match leaves the entry `Unknown`.
static POS_RULES: Lazy<Vec<(Cue, PartOfSpeech)>> = Lazy::new(|| {
    let re = |p: &str| Regex::new(p).expect("static pattern");
    vec![
        (Cue::Note(re(r",\s*[aheoi]+,\s*[ao]n")), PartOfSpeech::Adjective),
        (Cue::Note(re(r",\s*on\s*[,.]")), PartOfSpeech::Adjective),
        (Cue::VerbForm, PartOfSpeech::Verb),
        (Cue::SenseLabel(&["prep.", "preposition"]), PartOfSpeech::Preposition),
        (Cue::SenseLabel(&["conj.", "conjunction"]), PartOfSpeech::Conjunction),
        (Cue::SenseLabel(&["adv.", "adverb"]), PartOfSpeech::Adverb),
        (Cue::SenseLabel(&["particle"]), PartOfSpeech::Particle),
        (Cue::Article, PartOfSpeech::Noun),
        (Cue::SenseStart(re(r"^(a |an |the |one who )")), PartOfSpeech::Noun),
        (Cue::NounForm, PartOfSpeech::Noun),
    ]
});

/// One XML element with ElementTree-style text placement: `text` is what
/// precedes the first child, `tail` what follows this element's end tag.
#[derive(Debug, Default)]
struct Node {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    tail: String,
    children: Vec<Node>,
}

impl Node {
    fn open(e: &BytesStart<'_>) -> Self {
        let attrs = e
            .attributes()
            .flatten()
            .map(|a| {
                let key = String::from_utf8_lossy(a.key.local_name().as_ref()).into_owned();
                let value = a.unescape_value().map(Cow::into_owned).unwrap_or_default();
                (key, value)
            })
            .collect();
        Node {
            tag: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
            attrs,
            ..Node::default()
        }
    }

    fn append_text(&mut self, s: &str) {
        match self.children.last_mut() {
            Some(child) => child.tail.push_str(s),
            None => self.text.push_str(s),
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Descendants in document order, excluding `self`.
    fn descendants(&self) -> Vec<&Node> {
        fn walk<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
            for child in &node.children {
                out.push(child);
                walk(child, out);
            }
        }
        let mut out = Vec::new();
        walk(self, &mut out);
        out
    }

    fn direct_text(&self) -> Option<&str> {
        Some(self.text.trim()).filter(|t| !t.is_empty())
    }
}

fn text_of(e: &BytesText<'_>) -> String {
    e.unescape()
        .map(Cow::into_owned)
        .unwrap_or_else(|_| String::from_utf8_lossy(e).into_owned())
}

pub struct LiddellLoader {
    transliterator: Option<Box<dyn Transliterator>>,
}

impl Default for LiddellLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl LiddellLoader {
    /// Uses the Beta code converter compiled into this build, if any.
    pub fn new() -> Self {
        Self {
            transliterator: default_transliterator(),
        }
    }

    pub fn with_transliterator(transliterator: Option<Box<dyn Transliterator>>) -> Self {
        Self { transliterator }
    }

    /// Stream entries from `reader`; `origin` only labels errors.
    ///
    /// Malformed XML ends the scan with a warning and keeps the entries
    /// already read. A read failure is an error.
    pub fn from_reader<R: BufRead>(&self, reader: R, origin: &Path) -> Result<Lexicon, LoadError> {
        let mut lexicon = Lexicon::new();
        let Some(translit) = self.transliterator.as_deref() else {
            warn!("no Beta code transliterator, historical lexicon left empty");
            return Ok(lexicon);
        };

        let mut xml = Reader::from_reader(reader);
        let mut buf = Vec::new();
        let mut open: Vec<Node> = Vec::new();
        let mut scanned = 0usize;

        loop {
            match xml.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    if !open.is_empty() || e.local_name().as_ref() == b"entry" {
                        open.push(Node::open(e));
                    }
                }
                Ok(Event::Empty(ref e)) => {
                    if let Some(parent) = open.last_mut() {
                        parent.children.push(Node::open(e));
                    }
                }
                Ok(Event::Text(ref e)) => {
                    if let Some(node) = open.last_mut() {
                        node.append_text(&text_of(e));
                    }
                }
                Ok(Event::CData(ref e)) => {
                    if let Some(node) = open.last_mut() {
                        node.append_text(&String::from_utf8_lossy(e));
                    }
                }
                Ok(Event::End(_)) => {
                    if let Some(node) = open.pop() {
                        match open.last_mut() {
                            Some(parent) => parent.children.push(node),
                            None => {
                                scanned += 1;
                                if let Some(entry) = build_entry(&node, translit) {
                                    lexicon.insert(entry);
                                }
                            }
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(quick_xml::Error::Io(e)) => {
                    return Err(LoadError::io(origin, io::Error::new(e.kind(), e.to_string())));
                }
                Err(e) => {
                    warn!(position = xml.buffer_position(), error = %e, "stopping at malformed XML");
                    break;
                }
                _ => {}
            }
            buf.clear();
        }

        info!(path = %origin.display(), entries = scanned, keys = lexicon.len(), "loaded historical lexicon");
        Ok(lexicon)
    }
}

impl LexiconLoader for LiddellLoader {
    fn load(&self, path: &Path) -> Result<Lexicon, LoadError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "historical lexicon not found, using empty lexicon");
                return Ok(Lexicon::new());
            }
            Err(e) => return Err(LoadError::io(path, e)),
        };
        self.from_reader(BufReader::new(file), path)
    }
}

fn to_greek(translit: &dyn Transliterator, text: &str) -> String {
    translit
        .to_unicode(text)
        .unwrap_or_else(|| text.to_string())
}

fn build_entry(node: &Node, translit: &dyn Transliterator) -> Option<LexiconEntry> {
    let key = node.attr("key").filter(|k| !k.is_empty())?;
    let descendants = node.descendants();

    let orth = descendants
        .iter()
        .find(|n| n.tag == "orth")
        .and_then(|n| n.direct_text())
        .unwrap_or("");
    let lemma = if orth.is_empty() {
        to_greek(translit, key)
    } else {
        to_greek(translit, orth)
    };
    if lemma.is_empty() {
        return None;
    }

    let note = descendants
        .iter()
        .find(|n| n.tag == "note" && n.attr("type") == Some("alt"))
        .and_then(|n| n.direct_text());
    let sense_nodes: Vec<&Node> = descendants
        .iter()
        .copied()
        .filter(|n| n.tag == "sense")
        .collect();

    let senses = clean_senses(sense_nodes.iter().map(|n| sense_text(n)));
    if senses.is_empty() {
        debug!(key, "entry has no usable senses");
        return None;
    }

    let first_sense = sense_nodes.first().map(|n| sense_text(n).to_lowercase());
    let paradigm = note.and_then(|n| adjective_paradigm(n, translit));

    let mut entry = LexiconEntry::new(lemma, PartOfSpeech::Unknown);
    entry.senses = senses;
    match paradigm {
        Some(p) => {
            entry.part_of_speech = PartOfSpeech::Adjective;
            entry.genitive = Some(p);
        }
        None => {
            entry.part_of_speech = infer_pos(note, orth, first_sense.as_deref());
            if let Some(n) = note {
                entry.gender = article_gender(n);
                entry.genitive = genitive(n, translit);
            }
        }
    }
    Some(entry)
}

fn has_verb_ending(orth: &str) -> bool {
    VERB_ENDINGS.iter().any(|e| orth.ends_with(e))
}

fn infer_pos(note: Option<&str>, orth: &str, first_sense: Option<&str>) -> PartOfSpeech {
    POS_RULES
        .iter()
        .find(|(cue, _)| match cue {
            Cue::Note(re) => note.is_some_and(|n| re.is_match(n)),
            Cue::VerbForm => {
                has_verb_ending(orth)
                    && first_sense.is_some_and(|s| VERB_SENSE_MARKERS.iter().any(|m| s.contains(m)))
            }
            Cue::SenseLabel(labels) => first_sense.is_some_and(|s| labels.iter().any(|l| s.contains(l))),
            Cue::Article => note.and_then(article_gender).is_some(),
            Cue::SenseStart(re) => first_sense.is_some_and(|s| re.is_match(s)),
            Cue::NounForm => NOUN_FORM.is_match(orth) && !has_verb_ending(orth),
        })
        .map(|(_, pos)| *pos)
        .unwrap_or(PartOfSpeech::Unknown)
}

/// Gender from an article after the headword ("lo/gos, o(, lo/gou").
fn article_gender(note: &str) -> Option<Gender> {
    let listed = ARTICLES.iter().find(|(a, _)| {
        note.contains(&format!(", {},", a))
            || note.contains(&format!(", {}.", a))
            || note.ends_with(&format!(", {}", a))
    });
    let loose = || {
        ARTICLES
            .iter()
            .find(|(a, _)| note.contains(&format!(" {} ", a)) || note.starts_with(&format!("{} ", a)))
    };
    listed.or_else(loose).map(|(_, g)| *g)
}

/// Third comma field of a noun note, when it is a bare Beta code form.
fn genitive(note: &str, translit: &dyn Transliterator) -> Option<String> {
    let form = note.split(',').nth(2)?.trim();
    (!form.is_empty() && GENITIVE_FORM.is_match(form)).then(|| to_greek(translit, form))
}

/// Feminine and neuter endings of an adjective note, rendered "-ή, -όν"
/// (three endings) or "-ον" (two endings).
fn adjective_paradigm(note: &str, translit: &dyn Transliterator) -> Option<String> {
    let parts: Vec<&str> = note.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [_, fem, neut] => {
            let article_like = fem.ends_with('(') || neut.ends_with('(');
            let matches = !fem.is_empty()
                && !neut.is_empty()
                && !article_like
                && FEMININE_ENDING.is_match(fem)
                && NEUTER_ENDING.is_match(neut);
            matches.then(|| {
                format!(
                    "-{}, -{}",
                    to_greek(translit, fem),
                    to_greek(translit, neut)
                )
            })
        }
        [_, neut] => TWO_ENDING_NEUTER
            .is_match(neut)
            .then(|| format!("-{}", to_greek(translit, neut))),
        _ => None,
    }
}

/// Gloss text of a sense: its own text, translations, Latin equivalents
/// and running prose between them. Greek citations are left out.
fn sense_text(sense: &Node) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(t) = sense.direct_text() {
        parts.push(t.to_string());
    }
    for child in &sense.children {
        match child.tag.as_str() {
            "trans" => parts.extend(
                child
                    .children
                    .iter()
                    .filter(|c| c.tag == "tr")
                    .filter_map(|c| c.direct_text())
                    .map(str::to_string),
            ),
            "tr" => parts.extend(child.direct_text().map(str::to_string)),
            "foreign" if child.attr("lang") == Some("la") => {
                parts.extend(child.direct_text().map(|t| format!("Lat. {}", t)))
            }
            _ => {}
        }
        let tail = child.tail.trim();
        if !tail.is_empty() && !tail.starts_with([',', ';', '.', ':']) {
            parts.push(tail.to_string());
        }
    }
    parts.join(" ")
}

fn clean_sense(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches([' ', ',', ';', ':', '.'])
        .replace("Lat. Lat.", "Lat.")
}

/// Clean, drop one-character leftovers, dedupe ignoring case, keep the
/// first five.
fn clean_senses<I: IntoIterator<Item = String>>(raw: I) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|s| clean_sense(&s))
        .filter(|s| s.chars().count() > 1)
        .filter(|s| seen.insert(s.to_lowercase()))
        .take(MAX_SENSES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Leaves Beta code untouched so rules can be checked without a
    /// converter.
    struct Verbatim;

    impl Transliterator for Verbatim {
        fn to_unicode(&self, text: &str) -> Option<String> {
            Some(text.to_string())
        }
    }

    fn load(xml: &str) -> Lexicon {
        LiddellLoader::with_transliterator(Some(Box::new(Verbatim)))
            .from_reader(xml.as_bytes(), Path::new("test.xml"))
            .unwrap()
    }

    #[test]
    fn three_ending_adjective() {
        assert_eq!(
            adjective_paradigm("kalo/s, h/, o/n", &Verbatim).as_deref(),
            Some("-h/, -o/n")
        );
        assert_eq!(
            adjective_paradigm("i)/fqimos, h, on", &Verbatim).as_deref(),
            Some("-h, -on")
        );
    }

    #[test]
    fn two_ending_adjective() {
        assert_eq!(
            adjective_paradigm("a)/peiros, on", &Verbatim).as_deref(),
            Some("-on")
        );
    }

    #[test]
    fn noun_note_is_not_a_paradigm() {
        assert_eq!(adjective_paradigm("lo/gos, o(, lo/gou", &Verbatim), None);
        assert_eq!(adjective_paradigm("qea/, h(", &Verbatim), None);
    }

    #[test]
    fn article_genders() {
        assert_eq!(article_gender("lo/gos, o(, lo/gou"), Some(Gender::Masculine));
        assert_eq!(article_gender("qea/, h("), Some(Gender::Feminine));
        assert_eq!(article_gender("e)/rgon, to/, e)/rgou"), Some(Gender::Neuter));
        assert_eq!(article_gender("o( kai\\ h( pai=s"), Some(Gender::Masculine));
        assert_eq!(article_gender("kalo/s, h/, o/n"), None);
    }

    #[test]
    fn genitive_is_third_field() {
        assert_eq!(
            genitive("lo/gos, o(, lo/gou", &Verbatim).as_deref(),
            Some("lo/gou")
        );
        assert_eq!(genitive("lo/gos, o(", &Verbatim), None);
        assert_eq!(genitive("lo/gos, o(, gen. lo/gou", &Verbatim), None);
    }

    #[test]
    fn pos_rule_order() {
        let pos = infer_pos;
        assert_eq!(pos(Some("a, b, h, on"), "x", None), PartOfSpeech::Adjective);
        assert_eq!(pos(Some("a)/peiros, on, gen."), "x", None), PartOfSpeech::Adjective);
        assert_eq!(pos(None, "lu/w", Some("to loose")), PartOfSpeech::Verb);
        assert_eq!(pos(None, "lu/w", Some("loosing")), PartOfSpeech::Unknown);
        assert_eq!(pos(None, "e)n", Some("prep. with dat., in")), PartOfSpeech::Preposition);
        assert_eq!(pos(None, "kai/", Some("conj., and")), PartOfSpeech::Conjunction);
        assert_eq!(pos(None, "nu=n", Some("adv. now")), PartOfSpeech::Adverb);
        assert_eq!(pos(None, "ge", Some("enclitic particle")), PartOfSpeech::Particle);
        assert_eq!(pos(Some("qea/, h("), "qea/", Some("goddess")), PartOfSpeech::Noun);
        assert_eq!(pos(None, "x", Some("one who leads")), PartOfSpeech::Noun);
        assert_eq!(pos(None, "lo/gos", Some("word")), PartOfSpeech::Noun);
        assert_eq!(pos(None, "xyz", Some("word")), PartOfSpeech::Unknown);
    }

    #[test]
    fn sense_cleanup() {
        let senses = clean_senses(
            [
                "  a word,  speech ;".to_string(),
                "A WORD, SPEECH".to_string(),
                ".".to_string(),
                "x".to_string(),
                "Lat. Lat. verbum".to_string(),
            ]
            .into_iter(),
        );
        assert_eq!(senses, vec!["a word, speech", "Lat. verbum"]);
    }

    #[test]
    fn senses_capped_at_five() {
        let senses = clean_senses((0..8).map(|i| format!("sense {}", i)));
        assert_eq!(senses.len(), MAX_SENSES);
        assert_eq!(senses[4], "sense 4");
    }

    #[test]
    fn entry_from_xml() {
        let lex = load(
            r#"<TEI><text><body>
            <entry key="lo/gos"><form><orth>lo/gos</orth></form>
              <note type="alt">lo/gos, o(, lo/gou</note>
              <sense n="1"><trans><tr>the word</tr></trans> by which thought is expressed, <foreign lang="la">verbum</foreign>; <foreign lang="greek">e)/pos</foreign></sense>
              <sense n="2"><tr>speech</tr></sense>
            </entry>
            </body></text></TEI>"#,
        );
        let e = lex.get("lo/gos").unwrap();
        assert_eq!(e.part_of_speech, PartOfSpeech::Noun);
        assert_eq!(e.gender, Some(Gender::Masculine));
        assert_eq!(e.genitive.as_deref(), Some("lo/gou"));
        assert_eq!(
            e.senses,
            vec!["the word by which thought is expressed, Lat. verbum", "speech"]
        );
    }

    #[test]
    fn adjective_entry_has_paradigm_not_gender() {
        let lex = load(
            r#"<entry key="kalo/s"><orth>kalo/s</orth><note type="alt">kalo/s, h/, o/n</note>
               <sense><tr>beautiful</tr></sense></entry>"#,
        );
        let e = lex.get("kalo/s").unwrap();
        assert_eq!(e.part_of_speech, PartOfSpeech::Adjective);
        assert_eq!(e.genitive.as_deref(), Some("-h/, -o/n"));
        assert_eq!(e.gender, None);
    }

    #[test]
    fn entries_without_senses_or_key_are_skipped() {
        let lex = load(
            r#"<body><entry key="a)/"><orth>a)/</orth></entry>
               <entry><orth>b</orth><sense><tr>bee</tr></sense></entry></body>"#,
        );
        assert!(lex.is_empty());
    }

    #[test]
    fn no_transliterator_gives_empty() {
        let lex = LiddellLoader::with_transliterator(None)
            .from_reader(
                r#"<entry key="a"><sense><tr>aa</tr></sense></entry>"#.as_bytes(),
                Path::new("test.xml"),
            )
            .unwrap();
        assert!(lex.is_empty());
    }

    #[test]
    fn malformed_xml_keeps_earlier_entries() {
        let lex = load(
            r#"<body><entry key="nu=n"><sense>adv. now</sense></entry>
               <entry key="x"><sense>broken</entry></body>"#,
        );
        assert!(lex.contains("nu=n"));
        assert!(!lex.contains("x"));
    }
}
