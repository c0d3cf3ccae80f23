//! Plain-language command interpreter.
//!
//! Short instructions are classified by a literal prefix and then mined with
//! keyword rules. Portuguese and English keywords are both accepted:
//!
//! - `adicionar o novo carro da Nissan lançado ontem é nota 9`
//! - `consultar quais os 10 melhores carros da Nissan lançados entre 2010 e hoje`
//! - `add the new car of Nissan launched today with score 4`
//! - `query the 5 best cars of Honda between 2015 and 2020`

use carlens_core::{DEFAULT_LIMIT, DateRange, FilterSpec, NewCar};
use chrono::{Local, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Brand used by add commands that name none.
pub const UNKNOWN_BRAND: &str = "Unknown";

/// Model assigned to cars added by text; the instruction format has no model.
pub const NEW_MODEL: &str = "New Model";

/// Price assigned to cars added by text; the instruction format has no price.
pub const NEW_PRICE: f64 = 50_000.0;

/// Rating used by add commands that give none.
pub const DEFAULT_ADD_RATING: f64 = 5.0;

static BRAND: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)\b(?:da|of)\s+(\w+)"));
static RATING: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)\b(?:nota|score)[:\s]*([0-9]+)"));
static YESTERDAY: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)\b(?:ontem|yesterday)\b"));
static TODAY: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)\b(?:hoje|today)\b"));
static YEAR: LazyLock<Regex> = LazyLock::new(|| regex(r"([0-9]{4})"));
static LIMIT: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)\b([0-9]+)\s+(?:melhores|best)\b"));
static BETWEEN: LazyLock<Regex> = LazyLock::new(|| {
    regex(r"(?i)\b(?:entre|between)\s+([0-9]{4})\s+(?:e|and)\s+(\w+)")
});

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

/// Command prefixes, matched case-insensitively at the start of the input.
const PREFIXES: &[(&str, IntentKind)] = &[
    ("adicionar ", IntentKind::Add),
    ("add ", IntentKind::Add),
    ("consultar ", IntentKind::Query),
    ("query ", IntentKind::Query),
];

/// Which way an instruction was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    Add,
    Query,
}

/// A classified and parsed instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Add(NewCar),
    Query(FilterSpec),
}

/// Split `input` into its intent and the prompt after the prefix.
///
/// Returns `None` when the input starts with no known prefix.
#[must_use]
pub fn classify(input: &str) -> Option<(IntentKind, &str)> {
    let input = input.trim_start();

    PREFIXES.iter().find_map(|(prefix, kind)| {
        let head = input.get(..prefix.len())?;
        head.eq_ignore_ascii_case(prefix)
            .then(|| (*kind, input[prefix.len()..].trim()))
    })
}

/// Interpreter for add and query instructions.
#[derive(Debug, Clone)]
pub struct CommandInterpreter {
    /// Limit used when a query names none
    default_limit: i64,
    /// Fixed "today", for reproducible relative dates
    today: Option<NaiveDate>,
}

impl CommandInterpreter {
    /// Create an interpreter with the given default query limit.
    #[must_use]
    pub fn new(default_limit: i64) -> Self {
        Self {
            default_limit,
            today: None,
        }
    }

    /// Resolve "today"/"yesterday" against `today` instead of the local clock.
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Classify and parse a full instruction, prefix included.
    #[must_use]
    pub fn interpret(&self, input: &str) -> Option<Intent> {
        let (kind, prompt) = classify(input)?;
        debug!("Interpreting {:?} command: {}", kind, prompt);

        Some(match kind {
            IntentKind::Add => Intent::Add(self.parse_add(prompt)),
            IntentKind::Query => Intent::Query(self.parse_query(prompt)),
        })
    }

    /// Build a car from an add instruction.
    ///
    /// The rating is taken as written, without clamping; validation happens
    /// when the car is persisted.
    #[must_use]
    pub fn parse_add(&self, prompt: &str) -> NewCar {
        let brand = capture(&BRAND, prompt).unwrap_or(UNKNOWN_BRAND).to_string();

        let rating = capture(&RATING, prompt)
            .and_then(|n| n.parse::<f64>().ok())
            .unwrap_or(DEFAULT_ADD_RATING);

        let launch_date = if YESTERDAY.is_match(prompt) {
            self.today().pred_opt()
        } else if TODAY.is_match(prompt) {
            Some(self.today())
        } else {
            capture(&YEAR, prompt)
                .and_then(|y| y.parse().ok())
                .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
        };

        NewCar {
            brand,
            model: NEW_MODEL.to_string(),
            price: NEW_PRICE,
            rating,
            launch_date,
        }
    }

    /// Build a filter from a query instruction.
    ///
    /// `between <year> and <word>` starts on January 1st of the year. The
    /// range ends today when the word is "today"/"hoje", on December 31st
    /// when the word is a year, and is left open otherwise.
    #[must_use]
    pub fn parse_query(&self, prompt: &str) -> FilterSpec {
        let brand = capture(&BRAND, prompt).map(str::to_string);

        // A digit run only fails to parse on overflow
        let limit = capture(&LIMIT, prompt)
            .map_or(self.default_limit, |n| n.parse().unwrap_or(i64::MAX));

        let date_range = BETWEEN.captures(prompt).map(|caps| {
            let start = caps[1]
                .parse()
                .ok()
                .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1));
            let end = self.range_end(&caps[2]);
            DateRange { start, end }
        });

        FilterSpec {
            brand,
            date_range,
            min_rating: None,
            limit,
        }
    }

    fn range_end(&self, word: &str) -> Option<NaiveDate> {
        if TODAY.is_match(word) {
            return Some(self.today());
        }
        if word.len() == 4 && word.bytes().all(|b| b.is_ascii_digit()) {
            return word
                .parse()
                .ok()
                .and_then(|y| NaiveDate::from_ymd_opt(y, 12, 31));
        }
        debug!("Range end {:?} is neither a year nor today, leaving it open", word);
        None
    }
}

impl Default for CommandInterpreter {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

fn capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str())
}
