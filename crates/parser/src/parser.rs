/// Winnow-based parser for the sectioned input file.
///
/// Grammar (line oriented):
/// ```text
/// file         = line*
/// line         = comment | blank | schedule | declaration | other
/// comment      = "#" REST_OF_LINE
/// schedule     = "E_" schedule_id ("-" operations)?
/// declaration  = item ("," item)* ";" REST_OF_LINE
/// item         = [^,;]*            -- whitespace inside is removed
/// timestamp    = ("+" | "-")? DIGIT+
/// ```
///
/// The first three declarations are, in order, the objects, the transaction
/// ids and their timestamps. Transaction ids are lower-cased. Any other line
/// is ignored.
use core::fmt::{Display, Formatter};

use derive_more::From;
use tscop_core::schedule::Schedule;
use tscop_core::timestamp::{TableError, Timestamp, TimestampTable};
use winnow::ascii::dec_int;
use winnow::combinator::{opt, preceded, separated};
use winnow::prelude::*;
use winnow::token::{rest, take_till};
use winnow::ModalResult;

use crate::lexer::tokenize;

// ---------------------------------------------------------------------------
// Policies and errors
// ---------------------------------------------------------------------------

/// What to do with schedule text that matches no operation.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Unmatched {
    /// Drop it silently.
    #[default]
    Skip,
    /// Fail the schedule line, unless the text is only whitespace, `,` or `;`.
    Reject,
}

/// A schedule line that could not be turned into a [`Schedule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Text matching no operation, under [`Unmatched::Reject`].
    Unmatched {
        /// Byte offset of the text within the line.
        offset: usize,
        text: String,
    },
}

impl Display for ScheduleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unmatched { offset, text } => write!(
                f,
                "unrecognised schedule text `{text}` at column {}",
                offset + 1
            ),
        }
    }
}

impl std::error::Error for ScheduleError {}

/// The three declaration lines, in file order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Section {
    Objects,
    Transactions,
    Timestamps,
}

impl Display for Section {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Objects => f.write_str("objects"),
            Self::Transactions => f.write_str("transactions"),
            Self::Timestamps => f.write_str("timestamps"),
        }
    }
}

/// Error loading an input file. Every variant is fatal for the run.
#[derive(Debug, Clone, PartialEq, Eq, From)]
pub enum ConfigError {
    /// Fewer than three declaration lines.
    MissingSection { section: Section },
    /// A timestamp item is not a decimal integer.
    InvalidTimestamp { line: usize, token: String },
    /// Transactions and timestamps do not pair up.
    #[from]
    Table(TableError),
    /// A schedule line was rejected.
    Schedule { line: usize, source: ScheduleError },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingSection { section } => {
                write!(f, "missing {section} declaration (a line ending in `;`)")
            }
            Self::InvalidTimestamp { line, token } => {
                write!(f, "line {line}: invalid timestamp `{token}`")
            }
            Self::Table(e) => write!(f, "{e}"),
            Self::Schedule { line, source } => write!(f, "line {line}: {source}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Table(e) => Some(e),
            Self::Schedule { source, .. } => Some(source),
            Self::MissingSection { .. } | Self::InvalidTimestamp { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Everything an input file declares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workload {
    /// Declared objects, in order.
    pub objects: Vec<String>,
    pub transactions: TimestampTable,
    /// Schedules in file order.
    pub schedules: Vec<Schedule>,
}

/// Parse a whole input file.
///
/// # Errors
///
/// Returns a [`ConfigError`] when a declaration is missing, a timestamp is
/// malformed, transactions and timestamps do not pair up, or a schedule line
/// is rejected under `unmatched`.
pub fn parse_workload(input: &str, unmatched: Unmatched) -> Result<Workload, ConfigError> {
    let mut declarations: Vec<(usize, Vec<String>)> = Vec::with_capacity(3);
    let mut schedules = Vec::new();

    for (line_no, line) in (1..).zip(input.lines()) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with("E_") {
            let schedule = parse_schedule_line(line, unmatched)
                .map_err(|source| ConfigError::Schedule {
                    line: line_no,
                    source,
                })?;
            schedules.push(schedule);
            continue;
        }
        if declarations.len() < 3 {
            if let Ok(items) = declaration.parse(line) {
                declarations.push((line_no, items));
                continue;
            }
        }
        tracing::trace!(line = line_no, "ignoring line");
    }

    let mut sections = declarations.into_iter();
    let (_, objects) = sections.next().ok_or(ConfigError::MissingSection {
        section: Section::Objects,
    })?;
    let (_, transaction_ids) = sections.next().ok_or(ConfigError::MissingSection {
        section: Section::Transactions,
    })?;
    let (timestamp_line, timestamp_items) = sections.next().ok_or(ConfigError::MissingSection {
        section: Section::Timestamps,
    })?;

    let objects = non_empty(objects);
    let transaction_ids: Vec<String> = non_empty(transaction_ids)
        .into_iter()
        .map(|id| id.to_lowercase())
        .collect();
    let timestamps = timestamp_items
        .into_iter()
        .map(|token| {
            let parsed = timestamp.parse(token.as_str()).ok();
            parsed.ok_or_else(|| ConfigError::InvalidTimestamp {
                line: timestamp_line,
                token,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let transactions = TimestampTable::from_declarations(transaction_ids, &timestamps)?;

    tracing::debug!(
        objects = objects.len(),
        transactions = transactions.len(),
        schedules = schedules.len(),
        "workload loaded"
    );

    Ok(Workload {
        objects,
        transactions,
        schedules,
    })
}

/// Parse one `<id>-<operations>` schedule line.
///
/// The id is everything before the first `-`. A line without `-` is used
/// whole, as both the id and the operation text.
///
/// # Errors
///
/// Returns [`ScheduleError::Unmatched`] for stray text under
/// [`Unmatched::Reject`].
pub fn parse_schedule_line(line: &str, unmatched: Unmatched) -> Result<Schedule, ScheduleError> {
    let mut stream = line;
    let (id, operations) = schedule_line
        .parse_next(&mut stream)
        .unwrap_or((line, None));
    let (offset, text) = match operations {
        Some(text) => (id.len() + 1, text),
        None => (0, line),
    };

    let scanned = tokenize(text);
    if unmatched == Unmatched::Reject {
        if let Some(span) = scanned
            .unmatched
            .iter()
            .find(|span| !text[(*span).clone()].chars().all(is_separator))
        {
            return Err(ScheduleError::Unmatched {
                offset: offset + span.start,
                text: text[span.clone()].to_string(),
            });
        }
    } else if !scanned.unmatched.is_empty() {
        tracing::trace!(
            schedule = id,
            fragments = scanned.unmatched.len(),
            "skipping unmatched schedule text"
        );
    }

    Ok(Schedule::from_actions(
        id.to_string(),
        scanned.tokens.iter().map(|token| token.action(text)),
    ))
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ',' || c == ';'
}

// ---------------------------------------------------------------------------
// Line parsers
// ---------------------------------------------------------------------------

/// `item ("," item)* ";" REST_OF_LINE`, whitespace removed.
///
/// A trailing empty item (`a, b,;` or a bare `;`) is not an item. Other empty
/// items are kept, so callers decide whether they are an error.
fn declaration(input: &mut &str) -> ModalResult<Vec<String>> {
    let mut items: Vec<&str> =
        separated(0.., take_till(0.., [',', ';']), ',').parse_next(input)?;
    ';'.parse_next(input)?;
    rest.void().parse_next(input)?;
    if items.last().is_some_and(|item| item.is_empty()) {
        items.pop();
    }
    Ok(items
        .into_iter()
        .map(|item| item.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .collect())
}

fn non_empty(items: Vec<String>) -> Vec<String> {
    items.into_iter().filter(|item| !item.is_empty()).collect()
}

/// A signed decimal timestamp.
fn timestamp(input: &mut &str) -> ModalResult<Timestamp> {
    dec_int.parse_next(input)
}

/// `schedule_id ("-" operations)?`
fn schedule_line<'s>(input: &mut &'s str) -> ModalResult<(&'s str, Option<&'s str>)> {
    let id = take_till(0.., '-').parse_next(input)?;
    let operations = opt(preceded('-', rest)).parse_next(input)?;
    Ok((id, operations))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
