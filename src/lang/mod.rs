//! Language tags, script/clue-word detection, and romanized-text normalization.

mod detect;
mod normalize;

pub use detect::detect;
pub use normalize::Normalizer;

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three fully supported languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    En,
    Hi,
    Te,
}

impl Lang {
    pub const ALL: [Lang; 3] = [Lang::En, Lang::Hi, Lang::Te];

    /// ISO 639-1 code, also the marker the pivot model expects.
    pub fn code(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Hi => "hi",
            Lang::Te => "te",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Lang::En => "English",
            Lang::Hi => "Hindi",
            Lang::Te => "Telugu",
        }
    }

    /// Looks up a request-supplied code. Surrounding whitespace and case are ignored.
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_lowercase();
        Lang::ALL.into_iter().find(|l| l.code() == code)
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Detection outcome. The romanized variants never leave the pipeline's
/// normalization step; see [`Detected::canonical`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detected {
    Native(Lang),
    RomanizedHindi,
    RomanizedTelugu,
}

impl Detected {
    pub fn canonical(self) -> Lang {
        match self {
            Detected::Native(lang) => lang,
            Detected::RomanizedHindi => Lang::Hi,
            Detected::RomanizedTelugu => Lang::Te,
        }
    }

    pub fn is_romanized(self) -> bool {
        !matches!(self, Detected::Native(_))
    }
}
