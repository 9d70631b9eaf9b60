//! Language profiles: remote service parameters and dictionary links.

use crate::model::Reference;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Latin,
    Greek,
}

/// An external dictionary URL with a `{lemma}` placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceTemplate {
    pub name: &'static str,
    pub url: &'static str,
}

impl ReferenceTemplate {
    /// Fill in the URL-encoded lemma.
    pub fn render(&self, lemma: &str) -> Reference {
        Reference {
            name: self.name.to_string(),
            url: self.url.replace("{lemma}", &urlencoding::encode(lemma)),
        }
    }
}

const LATIN_REFERENCES: [ReferenceTemplate; 2] = [
    ReferenceTemplate {
        name: "lewis_short",
        url: "http://www.perseus.tufts.edu/hopper/text?doc=Perseus:text:1999.04.0059:entry={lemma}",
    },
    ReferenceTemplate {
        name: "elementary_lewis",
        url: "http://www.perseus.tufts.edu/hopper/text?doc=Perseus:text:1999.04.0060:entry={lemma}",
    },
];

const GREEK_REFERENCES: [ReferenceTemplate; 2] = [
    ReferenceTemplate {
        name: "perseus_lsj",
        url: "http://www.perseus.tufts.edu/hopper/text?doc=Perseus:text:1999.04.0057:entry={lemma}",
    },
    ReferenceTemplate {
        name: "logeion",
        url: "https://logeion.uchicago.edu/{lemma}",
    },
];

impl Language {
    /// Language code sent to the morphology service.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Latin => "lat",
            Language::Greek => "grc",
        }
    }

    /// Analysis engine name sent to the morphology service.
    pub fn engine(&self) -> &'static str {
        match self {
            Language::Latin => "morpheuslat",
            Language::Greek => "morpheusgrc",
        }
    }

    pub fn reference_templates(&self) -> &'static [ReferenceTemplate] {
        match self {
            Language::Latin => &LATIN_REFERENCES,
            Language::Greek => &GREEK_REFERENCES,
        }
    }

    /// Dictionary links for `lemma`, in template order.
    pub fn references(&self, lemma: &str) -> Vec<Reference> {
        self.reference_templates()
            .iter()
            .map(|t| t.render(lemma))
            .collect()
    }
}
