//! # Scene Heading Classifier
//!
//! Splits a slug line such as `INT. KITCHEN - DAY` into its interior/exterior
//! designation, location and time of day. Classification never fails: a
//! heading without a recognizable prefix or time token yields `UNKNOWN`
//! fields and an empty location.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;
use crate::types::{IntExt, Scene, TimeOfDay};

const DASHES: &[char] = &['—', '–', '-'];

/// `INT`, `EXT`, or one of each joined by a slash in either order.
const PREFIX: &str = r"(?:INT\.?(?:\s*/\s*EXT\.?)?|EXT\.?(?:\s*/\s*INT\.?)?)";

const TIMES: &str = "DAY|NIGHT|DAWN|DUSK|EVENING|MORNING|CONTINUOUS|LATER|SAME";

static DEFAULT: LazyLock<SlugClassifier> = LazyLock::new(|| SlugClassifier::new().unwrap());

/// The parts of a classified slug line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugInfo {
    pub int_ext: IntExt,
    pub location: String,
    pub location_normalized: String,
    pub time_of_day: TimeOfDay,
    pub time_of_day_normalized: TimeOfDay,
}

/// Scene heading classifier with pre-compiled patterns.
#[derive(Debug, Clone)]
pub struct SlugClassifier {
    re_int_ext: Regex,
    re_time: Regex,
    re_location: Regex,
}

impl SlugClassifier {
    /// Compiles the heading patterns.
    ///
    /// # Errors
    ///
    /// Returns `SluglineError::RegexError` if a pattern fails to compile
    /// (should never happen with the static patterns defined here).
    pub fn new() -> Result<Self> {
        Ok(Self {
            re_int_ext: Regex::new(&format!(r"(?i)^({PREFIX})\s+"))?,
            re_time: Regex::new(&format!(r"(?i)[—–-]\s*({TIMES})\b"))?,
            re_location: Regex::new(&format!(r"(?i)^{PREFIX}\s+(.+?)\s*[—–-]\s*(?:{TIMES})\b"))?,
        })
    }

    /// Returns `true` if the line opens with an int/ext prefix followed by
    /// whitespace, i.e. it is a scene heading.
    #[must_use]
    pub fn is_heading(&self, line: &str) -> bool {
        self.re_int_ext.is_match(line)
    }

    /// Classifies a slug line. Never fails: unrecognized parts come back as
    /// `UNKNOWN` or an empty location.
    #[must_use]
    pub fn classify(&self, slug: &str) -> SlugInfo {
        let slug = slug.trim();
        let int_ext = self.extract_int_ext(slug);
        let time_of_day = self.extract_time(slug);
        let location = self.extract_location(slug);

        SlugInfo {
            int_ext,
            location_normalized: location.to_uppercase(),
            location,
            time_of_day,
            time_of_day_normalized: time_of_day.normalized(),
        }
    }

    fn extract_int_ext(&self, slug: &str) -> IntExt {
        let Some(caps) = self.re_int_ext.captures(slug) else {
            return IntExt::Unknown;
        };
        let prefix = caps[1].to_uppercase();
        let prefix = prefix.trim_end_matches('.');

        if prefix.contains('/') {
            IntExt::IntExt
        } else if prefix.starts_with("INT") {
            IntExt::Int
        } else {
            IntExt::Ext
        }
    }

    fn extract_time(&self, slug: &str) -> TimeOfDay {
        self.re_time
            .captures(slug)
            .map(|c| TimeOfDay::from_token(&c[1]))
            .unwrap_or(TimeOfDay::Unknown)
    }

    fn extract_location(&self, slug: &str) -> String {
        if let Some(caps) = self.re_location.captures(slug) {
            return caps[1].trim().to_string();
        }

        // No prefix/time pair: take everything before the first dash.
        match slug.find(DASHES) {
            Some(pos) => self.re_int_ext.replace(&slug[..pos], "").trim().to_string(),
            None => String::new(),
        }
    }
}

/// Classifies a slug line with the shared default classifier.
///
/// # Examples
///
/// ```
/// use slugline_core::slug::classify;
/// use slugline_core::{IntExt, TimeOfDay};
///
/// let info = classify("INT. KITCHEN - DAY");
/// assert_eq!(info.int_ext, IntExt::Int);
/// assert_eq!(info.location, "KITCHEN");
/// assert_eq!(info.time_of_day, TimeOfDay::Day);
/// ```
#[must_use]
pub fn classify(slug: &str) -> SlugInfo {
    DEFAULT.classify(slug)
}

/// See [`SlugClassifier::is_heading`].
#[must_use]
pub fn is_heading(line: &str) -> bool {
    DEFAULT.is_heading(line)
}

impl Scene {
    /// Opens an empty scene from its slug line.
    #[must_use]
    pub fn from_slug(scene_number: u32, slug: &str, classifier: &SlugClassifier) -> Self {
        let info = classifier.classify(slug);
        Self {
            scene_number,
            slug_line: slug.trim().to_string(),
            int_ext: info.int_ext,
            location: info.location,
            location_normalized: info.location_normalized,
            time_of_day: info.time_of_day,
            time_of_day_normalized: info.time_of_day_normalized,
            characters: Vec::new(),
            line_count: 0,
        }
    }
}
