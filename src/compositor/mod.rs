//! Segment compositor
//!
//! Splits lyric text into lines of colored runs according to the voice
//! segments laid over it. Pure and deterministic: the same
//! `(lyrics, voices, segments)` always gives the same lines.
//!
//! Policy:
//! - segments are applied in `start_pos` order (stable, so equal starts
//!   keep creation order); on overlap the later one owns the characters
//! - offsets are clamped to the text, inverted ranges cover nothing
//! - a segment whose voice does not exist renders in the default color
//!   but is still its own run, separate from neighbouring uncovered text
//! - runs never cross a line break; an empty line yields one placeholder
//!   run so it still takes up a row

use crate::song::{Voice, VoiceId, VoiceSegment, DEFAULT_COLOR};
use std::collections::HashMap;

/// Stands in for the text of an empty line.
pub const EMPTY_LINE_PLACEHOLDER: &str = "\u{00a0}";

/// A maximal span of one line sharing one color and owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub color: String,
    /// The voice singing this run; `None` for uncovered text and for
    /// segments pointing at a missing voice.
    pub voice_id: Option<VoiceId>,
    /// Set only on the stand-in run of an empty line, never on lyric text.
    placeholder: bool,
}

impl Run {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: DEFAULT_COLOR.to_string(),
            voice_id: None,
            placeholder: false,
        }
    }

    fn empty_line() -> Self {
        Self {
            placeholder: true,
            ..Self::plain(EMPTY_LINE_PLACEHOLDER)
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

pub type ColoredLine = Vec<Run>;

/// id → voice, built once per composition. First definition wins on
/// duplicate ids.
struct VoiceIndex<'a> {
    by_id: HashMap<&'a str, (usize, &'a Voice)>,
}

impl<'a> VoiceIndex<'a> {
    fn new(voices: &'a [Voice]) -> Self {
        let mut by_id = HashMap::with_capacity(voices.len());
        for (i, v) in voices.iter().enumerate() {
            by_id.entry(v.id.as_str()).or_insert((i, v));
        }
        Self { by_id }
    }

    fn get(&self, id: &VoiceId) -> Option<(usize, &'a Voice)> {
        self.by_id.get(id.as_str()).copied()
    }
}

/// Who a character belongs to. Run boundaries fall wherever this changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Owner {
    Uncovered,
    /// Index into the voice list.
    Voice(usize),
    /// Index into the sorted segment list of a segment with no voice.
    Dangling(usize),
}

pub fn compose_colored_lines(
    lyrics: &str,
    voices: &[Voice],
    segments: &[VoiceSegment],
) -> Vec<ColoredLine> {
    if segments.is_empty() {
        return lyrics
            .split('\n')
            .map(|line| {
                if line.is_empty() {
                    vec![Run::empty_line()]
                } else {
                    vec![Run::plain(line)]
                }
            })
            .collect();
    }

    let chars: Vec<char> = lyrics.chars().collect();
    let index = VoiceIndex::new(voices);

    let mut sorted: Vec<&VoiceSegment> = segments.iter().collect();
    sorted.sort_by_key(|s| s.start_pos);

    let mut owners = vec![Owner::Uncovered; chars.len()];
    for (k, seg) in sorted.iter().enumerate() {
        let owner = match index.get(&seg.voice_id) {
            Some((vi, _)) => Owner::Voice(vi),
            None => Owner::Dangling(k),
        };
        for slot in &mut owners[seg.clamped_range(chars.len())] {
            *slot = owner;
        }
    }

    let run_for = |owner: Owner, text: String| match owner {
        Owner::Voice(vi) => Run {
            text,
            color: voices[vi].color.clone(),
            voice_id: Some(voices[vi].id.clone()),
            placeholder: false,
        },
        Owner::Uncovered | Owner::Dangling(_) => Run::plain(text),
    };

    let mut lines: Vec<ColoredLine> = Vec::new();
    let mut line: ColoredLine = Vec::new();
    let mut current: Option<(Owner, String)> = None;

    for (ch, owner) in chars.iter().copied().zip(owners) {
        if ch == '\n' {
            if let Some((o, text)) = current.take() {
                line.push(run_for(o, text));
            }
            lines.push(finish_line(std::mem::take(&mut line)));
            continue;
        }

        if let Some((o, text)) = current.as_mut()
            && *o == owner
        {
            text.push(ch);
            continue;
        }
        if let Some((o, text)) = current.replace((owner, ch.to_string())) {
            line.push(run_for(o, text));
        }
    }

    if let Some((o, text)) = current.take() {
        line.push(run_for(o, text));
    }
    lines.push(finish_line(line));

    lines
}

fn finish_line(line: ColoredLine) -> ColoredLine {
    if line.is_empty() {
        vec![Run::empty_line()]
    } else {
        line
    }
}

/// Inverse of composition: rebuilds the lyric text from composed lines.
pub fn lines_to_text(lines: &[ColoredLine]) -> String {
    lines
        .iter()
        .map(|line| {
            line.iter()
                .filter(|r| !r.is_placeholder())
                .map(|r| r.text.as_str())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
