//! Line classifier: maps one trimmed source line to a typed [`LineEvent`].
//!
//! Productions are tried in a fixed precedence order and the first match
//! wins. Keywords are case-insensitive; ids and text keep their case.

use super::ast::NotePosition;
use super::color::Rgb;

/// A recognized diagram construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent<'a> {
    Participant { id: &'a str, display_name: Option<&'a str> },
    /// `clamped` is set when a channel was outside `0..=255`.
    Rect { fill: Rgb, clamped: bool },
    Open { kind: ConditionalKind, condition: &'a str },
    Note { position: NotePosition, participant_ids: Vec<&'a str>, text: &'a str },
    Else { condition: Option<&'a str> },
    End,
    Message { from: &'a str, to: &'a str, text: &'a str, is_async: bool },
}

/// Blocks that carry conditional sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalKind {
    Alt,
    Opt,
}

type Production = for<'a> fn(&'a str) -> Option<LineEvent<'a>>;

/// Precedence order of the grammar.
const PRODUCTIONS: &[Production] =
    &[participant, rect, open_conditional, note, else_section, end, message];

/// Classify a single line. Returns `None` for anything the grammar does not
/// recognize, including blank lines, comments and the diagram header.
#[must_use]
pub fn classify(line: &str) -> Option<LineEvent<'_>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("%%") || line.eq_ignore_ascii_case("sequenceDiagram") {
        return None;
    }
    PRODUCTIONS.iter().find_map(|production| production(line))
}

fn participant(line: &str) -> Option<LineEvent<'_>> {
    let rest = strip_keyword(line, "participant").or_else(|| strip_keyword(line, "actor"))?;
    if rest.is_empty() {
        return None;
    }
    let (id, display_name) = match split_keyword(rest, "as") {
        Some((id, name)) if !name.is_empty() => (id, Some(name)),
        Some((id, _)) => (id, None),
        None => (rest, None),
    };
    if id.is_empty() || id.contains(char::is_whitespace) {
        return None;
    }
    Some(LineEvent::Participant { id, display_name })
}

fn rect(line: &str) -> Option<LineEvent<'_>> {
    let rest = strip_keyword(line, "rect")?;
    let args = strip_prefix_ignore_case(rest, "rgb")?.trim_start();
    let inner = args.strip_prefix('(')?.strip_suffix(')')?;
    let mut channels = inner.split(',').map(|c| c.trim().parse::<i64>());
    let (Some(Ok(r)), Some(Ok(g)), Some(Ok(b)), None) =
        (channels.next(), channels.next(), channels.next(), channels.next())
    else {
        return None;
    };
    let clamped = [r, g, b].iter().any(|c| !(0..=255).contains(c));
    let channel = |c: i64| u8::try_from(c.clamp(0, 255)).unwrap_or(u8::MAX);
    Some(LineEvent::Rect { fill: Rgb::new(channel(r), channel(g), channel(b)), clamped })
}

fn open_conditional(line: &str) -> Option<LineEvent<'_>> {
    if let Some(condition) = strip_keyword(line, "alt") {
        return Some(LineEvent::Open { kind: ConditionalKind::Alt, condition });
    }
    strip_keyword(line, "opt").map(|condition| LineEvent::Open { kind: ConditionalKind::Opt, condition })
}

fn note(line: &str) -> Option<LineEvent<'_>> {
    let rest = strip_keyword(line, "note")?;
    let (position, rest) = if let Some(r) = strip_keyword(rest, "over") {
        (NotePosition::Over, r)
    } else if let Some(r) = strip_keyword(rest, "left").and_then(|r| strip_keyword(r, "of")) {
        (NotePosition::LeftOf, r)
    } else if let Some(r) = strip_keyword(rest, "right").and_then(|r| strip_keyword(r, "of")) {
        (NotePosition::RightOf, r)
    } else {
        return None;
    };
    let (ids, text) = rest.split_once(':')?;
    let participant_ids: Vec<&str> = ids.split(',').map(str::trim).filter(|id| !id.is_empty()).collect();
    if participant_ids.is_empty() {
        return None;
    }
    Some(LineEvent::Note { position, participant_ids, text: text.trim() })
}

fn else_section(line: &str) -> Option<LineEvent<'_>> {
    let rest = strip_keyword(line, "else")?;
    Some(LineEvent::Else { condition: Some(rest).filter(|c| !c.is_empty()) })
}

fn end(line: &str) -> Option<LineEvent<'_>> {
    line.eq_ignore_ascii_case("end").then_some(LineEvent::End)
}

fn message(line: &str) -> Option<LineEvent<'_>> {
    let (head, text) = line.split_once(':')?;
    let arrow = head.find("->>")?;
    let (from, is_async) = match head[..arrow].strip_suffix('-') {
        Some(from) => (from, true),
        None => (&head[..arrow], false),
    };
    let from = from.trim();
    let to = head[arrow + 3..].trim();
    if !is_token(from) || !is_token(to) {
        return None;
    }
    Some(LineEvent::Message { from, to, text: text.trim(), is_async })
}

/// Ids are single non-empty tokens without arrow characters.
fn is_token(s: &str) -> bool {
    !s.is_empty() && !s.contains(char::is_whitespace) && !s.contains("->")
}

/// Strip a leading keyword (case-insensitive) that is followed by whitespace
/// or end of line, returning the trimmed remainder.
fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = strip_prefix_ignore_case(line, keyword)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

/// Split `"<left> <keyword> <right>"` on the first standalone keyword.
fn split_keyword<'a>(s: &'a str, keyword: &str) -> Option<(&'a str, &'a str)> {
    let mut offset = 0;
    for word in s.split_whitespace() {
        let start = offset + s[offset..].find(word)?;
        offset = start + word.len();
        if start > 0 && word.eq_ignore_ascii_case(keyword) {
            return Some((s[..start].trim(), s[offset..].trim()));
        }
    }
    None
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod tests;
