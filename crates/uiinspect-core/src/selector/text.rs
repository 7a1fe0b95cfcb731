//! Line-per-level selector text.
//!
//! Each backend has its own grammar, generated from its [`Dialect`] table:
//!
//! ```text
//! <Window name='Calc' depth=3>
//! <Pane cls='Keypad' depth=2>
//! <Button name='7' idx=2 depth=1>
//! ```
//!
//! ```text
//! <java role='frame' name='Editor' depth=2>
//! <java role='push button' name='OK' states='enabled,visible' depth=1>
//! ```
//!
//! `depth` counts tree levels from the line down to the target, so the
//! outermost line carries the largest value and each line's relative depth
//! is the difference to the next one.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use uiinspect_protocols::dialect::{ACCESS_BRIDGE, WINDOW_MANAGER};
use uiinspect_protocols::{Attribute, BackendKind, Dialect, SelectorError, TagForm};

use super::level::{Selector, SelectorLevel};

static WINDOW_MANAGER_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| grammar(&WINDOW_MANAGER));
static ACCESS_BRIDGE_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| grammar(&ACCESS_BRIDGE));

fn grammar(dialect: &Dialect) -> Regex {
    let mut pattern = String::from("^<");
    match dialect.tag_form {
        TagForm::Bare => pattern.push_str(r"(?P<tag>[^\s'<>=]+)"),
        TagForm::Keyword {
            keyword, display, ..
        } => pattern.push_str(&format!(
            r"{} {}='(?P<tag>[^'\r\n]+)'",
            regex::escape(keyword),
            regex::escape(display)
        )),
    }
    for (_, display) in dialect.display_names {
        pattern.push_str(&format!(r"(?: {0}='(?P<{0}>[^'\r\n]*)')?", display));
    }
    pattern.push_str(r"(?: idx=(?P<idx>\d+))? depth=(?P<depth>\d+)>$");
    Regex::new(&pattern).expect("selector grammar is a valid pattern")
}

fn grammar_for(kind: BackendKind) -> &'static Regex {
    match kind {
        BackendKind::WindowManager => &WINDOW_MANAGER_GRAMMAR,
        BackendKind::AccessBridge => &ACCESS_BRIDGE_GRAMMAR,
    }
}

/// One parsed line: a level whose depth is still counted from the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorLine {
    pub tag: String,
    pub attributes: BTreeMap<Attribute, String>,
    pub occurrence_index: u32,
    pub depth: u32,
}

impl SelectorLine {
    pub fn into_level(self, relative_depth: u32) -> SelectorLevel {
        SelectorLevel {
            tag: self.tag,
            attributes: self.attributes,
            occurrence_index: self.occurrence_index,
            relative_depth,
        }
    }
}

fn check_value(attribute: Attribute, value: &str) -> Result<(), SelectorError> {
    if value.contains(['\'', '\n', '\r']) {
        return Err(SelectorError::InvalidValue {
            attribute,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Write one level as a line of text.
///
/// `depth` is the level's distance to the target; `outermost` suppresses
/// the occurrence index.
pub fn serialize_line(
    level: &SelectorLevel,
    depth: u32,
    outermost: bool,
    dialect: &Dialect,
) -> Result<String, SelectorError> {
    let tag_attribute = dialect.tag_attribute();
    for attribute in level.attributes.keys() {
        if Some(*attribute) != tag_attribute && dialect.display_name(*attribute).is_none() {
            return Err(SelectorError::NotSerializable {
                attribute: *attribute,
                backend: dialect.kind,
            });
        }
    }

    let mut line = String::from("<");
    match dialect.tag_form {
        TagForm::Bare => {
            let malformed = level.tag.is_empty()
                || level
                    .tag
                    .chars()
                    .any(|c| c.is_whitespace() || matches!(c, '\'' | '<' | '>' | '='));
            if malformed {
                return Err(SelectorError::InvalidValue {
                    attribute: Attribute::Role,
                    value: level.tag.clone(),
                });
            }
            line.push_str(&level.tag);
        }
        TagForm::Keyword {
            keyword,
            attribute,
            display,
        } => {
            check_value(attribute, &level.tag)?;
            if level.tag.is_empty() {
                return Err(SelectorError::InvalidValue {
                    attribute,
                    value: String::new(),
                });
            }
            line.push_str(&format!("{} {}='{}'", keyword, display, level.tag));
        }
    }

    for (attribute, display) in dialect.display_names {
        if let Some(value) = level.attributes.get(attribute) {
            check_value(*attribute, value)?;
            line.push_str(&format!(" {}='{}'", display, value));
        }
    }
    if level.occurrence_index > 1 && !outermost {
        line.push_str(&format!(" idx={}", level.occurrence_index));
    }
    line.push_str(&format!(" depth={}>", depth));
    Ok(line)
}

/// Parse one line. `line_number` is 1-based and only used in errors.
pub fn parse_line(
    line: &str,
    line_number: usize,
    dialect: &Dialect,
) -> Result<SelectorLine, SelectorError> {
    let text = line.trim();
    let syntax = || SelectorError::syntax(line_number, text);
    let captures = grammar_for(dialect.kind).captures(text).ok_or_else(syntax)?;

    let tag = captures.name("tag").ok_or_else(syntax)?.as_str().to_string();
    let mut attributes = BTreeMap::new();
    if let Some(attribute) = dialect.tag_attribute() {
        attributes.insert(attribute, tag.clone());
    }
    for (attribute, display) in dialect.display_names {
        if let Some(value) = captures.name(display) {
            attributes.insert(*attribute, value.as_str().to_string());
        }
    }

    let occurrence_index = match captures.name("idx") {
        Some(idx) => idx
            .as_str()
            .parse::<u32>()
            .ok()
            .filter(|index| *index >= 1)
            .ok_or_else(syntax)?,
        None => 1,
    };
    let depth = captures
        .name("depth")
        .and_then(|depth| depth.as_str().parse::<u32>().ok())
        .ok_or_else(syntax)?;

    Ok(SelectorLine {
        tag,
        attributes,
        occurrence_index,
        depth,
    })
}

impl Selector {
    /// One line per level, outermost first.
    pub fn to_lines(&self, dialect: &Dialect) -> Result<Vec<String>, SelectorError> {
        let mut remaining = self.total_depth();
        let mut lines = Vec::with_capacity(self.len());
        for (position, level) in self.levels().iter().enumerate() {
            lines.push(serialize_line(level, remaining, position == 0, dialect)?);
            remaining -= level.relative_depth;
        }
        Ok(lines)
    }

    pub fn to_text(&self, dialect: &Dialect) -> Result<String, SelectorError> {
        Ok(self.to_lines(dialect)?.join("\n"))
    }

    /// Parse selector text. Blank lines are ignored.
    pub fn parse(text: &str, dialect: &Dialect) -> Result<Self, SelectorError> {
        let mut lines: Vec<SelectorLine> = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            if raw.trim().is_empty() {
                continue;
            }
            let line = parse_line(raw, index + 1, dialect)?;
            if let Some(previous) = lines.last() {
                if line.depth > previous.depth {
                    return Err(SelectorError::DepthOrder {
                        line: index + 1,
                        depth: line.depth,
                        previous: previous.depth,
                    });
                }
            }
            lines.push(line);
        }

        let depths: Vec<u32> = lines.iter().map(|line| line.depth).collect();
        let levels = lines
            .into_iter()
            .enumerate()
            .map(|(position, line)| {
                let next = depths.get(position + 1).copied().unwrap_or(0);
                let relative_depth = line.depth - next;
                line.into_level(relative_depth)
            })
            .collect();
        Self::new(levels)
    }
}

#[cfg(test)]
#[path = "text_tests.rs"]
mod tests;
