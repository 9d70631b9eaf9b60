// greek/src/betacode.rs
//
// Beta code → Unicode Greek.
//
// Beta code writes Greek in 7-bit ASCII: one Latin letter per Greek letter,
// diacritics as trailing punctuation (`)` smooth, `(` rough, `/` acute,
// `\` grave, `=` circumflex, `+` diaeresis, `|` iota subscript) and `*` in
// front of a capital, with the capital's diacritics between `*` and the
// letter. Output is NFC.
//
// The transliterator sits behind the `betacode` feature. Callers go through
// `default_transliterator()`, which is `None` when the feature is off.

/// Converts a transliterated form to native script.
pub trait Transliterator: Send + Sync {
    /// `None` when `text` is not something this scheme can convert.
    fn to_unicode(&self, text: &str) -> Option<String>;
}

/// The transliterator compiled into this build, if any.
pub fn default_transliterator() -> Option<Box<dyn Transliterator>> {
    #[cfg(feature = "betacode")]
    {
        Some(Box::new(BetaCode))
    }
    #[cfg(not(feature = "betacode"))]
    {
        None
    }
}

#[cfg(feature = "betacode")]
pub use self::table::BetaCode;

#[cfg(feature = "betacode")]
mod table {
    use super::Transliterator;
    use once_cell::sync::Lazy;
    use std::collections::HashMap;
    use unicode_normalization::UnicodeNormalization;

    static LETTERS: Lazy<HashMap<char, char>> = Lazy::new(|| {
        let mut m = HashMap::new();
        for (b, g) in [
            ('a', 'α'),
            ('b', 'β'),
            ('g', 'γ'),
            ('d', 'δ'),
            ('e', 'ε'),
            ('v', 'ϝ'),
            ('z', 'ζ'),
            ('h', 'η'),
            ('q', 'θ'),
            ('i', 'ι'),
            ('k', 'κ'),
            ('l', 'λ'),
            ('m', 'μ'),
            ('n', 'ν'),
            ('c', 'ξ'),
            ('o', 'ο'),
            ('p', 'π'),
            ('r', 'ρ'),
            ('s', 'σ'),
            ('t', 'τ'),
            ('u', 'υ'),
            ('f', 'φ'),
            ('x', 'χ'),
            ('y', 'ψ'),
            ('w', 'ω'),
        ] {
            m.insert(b, g);
        }
        m
    });

    static DIACRITICS: Lazy<HashMap<char, char>> = Lazy::new(|| {
        let mut m = HashMap::new();
        m.insert(')', '\u{0313}');
        m.insert('(', '\u{0314}');
        m.insert('/', '\u{0301}');
        m.insert('\\', '\u{0300}');
        m.insert('=', '\u{0342}');
        m.insert('+', '\u{0308}');
        m.insert('|', '\u{0345}');
        m
    });

    static PUNCTUATION: Lazy<HashMap<char, char>> = Lazy::new(|| {
        let mut m = HashMap::new();
        m.insert(':', '\u{00B7}');
        m.insert('\'', '\u{2019}');
        m
    });

    /// Standard (TLG-style) Beta code.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct BetaCode;

    impl BetaCode {
        /// Plausibly Beta code: ASCII with at least one letter.
        pub fn detect(text: &str) -> bool {
            text.is_ascii() && text.chars().any(|c| c.is_ascii_alphabetic())
        }

        pub fn convert(&self, text: &str) -> String {
            let chars: Vec<char> = text.chars().collect();
            let mut out = String::with_capacity(text.len() * 2);
            let mut i = 0;

            while i < chars.len() {
                let c = chars[i];

                if c == '*' {
                    i += 1;
                    let mut marks = String::new();
                    while let Some(m) = chars.get(i).and_then(|c| DIACRITICS.get(c)) {
                        marks.push(*m);
                        i += 1;
                    }
                    let letter = chars
                        .get(i)
                        .and_then(|c| LETTERS.get(&c.to_ascii_lowercase()));
                    if let Some(g) = letter {
                        out.extend(g.to_uppercase());
                        i += 1;
                    }
                    out.push_str(&marks);
                    continue;
                }

                let lower = c.to_ascii_lowercase();
                if lower == 's' {
                    let next = chars.get(i + 1).copied();
                    let sigma = match next {
                        Some('1') => Some('σ'),
                        Some('2') => Some('ς'),
                        Some('3') => Some('ϲ'),
                        _ => None,
                    };
                    match sigma {
                        Some(s) => {
                            out.push(s);
                            i += 2;
                        }
                        None => {
                            let medial = next.is_some_and(|n| n.is_ascii_alphabetic());
                            out.push(if medial { 'σ' } else { 'ς' });
                            i += 1;
                        }
                    }
                    continue;
                }

                if let Some(g) = LETTERS.get(&lower) {
                    out.push(*g);
                } else if let Some(m) = DIACRITICS.get(&c) {
                    out.push(*m);
                } else if let Some(p) = PUNCTUATION.get(&c) {
                    out.push(*p);
                } else {
                    out.push(c);
                }
                i += 1;
            }

            out.nfc().collect()
        }
    }

    impl Transliterator for BetaCode {
        fn to_unicode(&self, text: &str) -> Option<String> {
            Self::detect(text).then(|| self.convert(text))
        }
    }

}
