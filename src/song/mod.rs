//! Song data model
//!
//! A song is a block of lyric text plus the voices (singers/parts) that
//! sing it and the segments assigning character ranges of the text to
//! those voices. Segment offsets count characters of the raw lyrics,
//! newlines included.

pub mod color;

use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub use color::{is_hex_color, parse_hex_color, DEFAULT_COLOR};

pub const MAIN_VOICE_NAME: &str = "Voz Principal";
pub const MAIN_VOICE_COLOR: &str = "#FFFFFF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(pub i64);

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceId(pub String);

impl VoiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentId(pub String);

impl SegmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A singer or part, shown in its own color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub id: VoiceId,
    pub name: String,
    pub color: String,
}

impl Voice {
    pub fn new(id: VoiceId, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
        }
    }
}

/// A character range `[start_pos, end_pos)` of the lyrics sung by one voice.
///
/// Offsets are signed so malformed input survives deserialization; the
/// compositor clamps them instead of rejecting the song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSegment {
    pub id: SegmentId,
    pub start_pos: i64,
    pub end_pos: i64,
    pub voice_id: VoiceId,
}

impl VoiceSegment {
    /// The range clamped to `0..=len`. Empty when the segment is inverted
    /// or lies entirely outside the text.
    pub fn clamped_range(&self, len: usize) -> std::ops::Range<usize> {
        let clamp = |v: i64| v.clamp(0, len as i64) as usize;
        let start = clamp(self.start_pos);
        let end = clamp(self.end_pos).max(start);
        start..end
    }
}

/// Something wrong with a segment. Never fatal: the compositor degrades
/// around it, these are reported so an editor can show them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentIssue {
    EmptyRange {
        segment: SegmentId,
        start: i64,
        end: i64,
    },
    OutOfBounds {
        segment: SegmentId,
        start: i64,
        end: i64,
        len: usize,
    },
    UnknownVoice {
        segment: SegmentId,
        voice: VoiceId,
    },
}

impl fmt::Display for SegmentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentIssue::EmptyRange { segment, start, end } => {
                write!(f, "segment {segment}: empty range {start}..{end}")
            }
            SegmentIssue::OutOfBounds {
                segment,
                start,
                end,
                len,
            } => write!(
                f,
                "segment {segment}: range {start}..{end} exceeds lyrics length {len}"
            ),
            SegmentIssue::UnknownVoice { segment, voice } => {
                write!(f, "segment {segment}: unknown voice {voice}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// `None` until the song has been saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SongId>,
    pub title: String,
    #[serde(default)]
    pub lyrics: String,
    #[serde(default)]
    pub voices: Vec<Voice>,
    #[serde(default)]
    pub segments: Vec<VoiceSegment>,
}

impl Song {
    /// A new unsaved song carrying only the main voice.
    pub fn new(title: impl Into<String>, lyrics: impl Into<String>) -> Self {
        let mut song = Self {
            id: None,
            title: title.into(),
            lyrics: lyrics.into(),
            voices: Vec::new(),
            segments: Vec::new(),
        };
        song.ensure_main_voice();
        song
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let mut song: Song = serde_json::from_str(raw).context("parse song json")?;
        song.ensure_main_voice();
        Ok(song)
    }

    /// Like [`Song::from_json`] for files whose offsets count UTF-16 code
    /// units, as browser text selections do. Offsets are rebased onto chars;
    /// one pointing inside a surrogate pair moves past that char.
    pub fn from_json_utf16(raw: &str) -> anyhow::Result<Self> {
        let mut song = Self::from_json(raw)?;
        let starts: Vec<i64> = song
            .lyrics
            .chars()
            .scan(0i64, |units, ch| {
                let start = *units;
                *units += ch.len_utf16() as i64;
                Some(start)
            })
            .collect();
        let total_units = song.lyrics.encode_utf16().count() as i64;

        let to_chars = |offset: i64| {
            if offset <= 0 {
                offset
            } else if offset > total_units {
                // Keep out-of-range offsets out of range.
                starts.len() as i64 + (offset - total_units)
            } else {
                starts.partition_point(|&u| u < offset) as i64
            }
        };
        for seg in &mut song.segments {
            seg.start_pos = to_chars(seg.start_pos);
            seg.end_pos = to_chars(seg.end_pos);
        }
        Ok(song)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("serialize song json")
    }

    /// Every song has at least one voice.
    pub fn ensure_main_voice(&mut self) {
        if self.voices.is_empty() {
            self.voices.push(Voice::new(
                VoiceId::new("v0"),
                MAIN_VOICE_NAME,
                MAIN_VOICE_COLOR,
            ));
        }
    }

    /// Length of the lyrics in segment offset units.
    pub fn char_len(&self) -> usize {
        self.lyrics.chars().count()
    }

    pub fn line_count(&self) -> usize {
        self.lyrics.split('\n').count()
    }

    pub fn voice(&self, id: &VoiceId) -> Option<&Voice> {
        self.voices.iter().find(|v| &v.id == id)
    }

    pub fn add_voice(
        &mut self,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> anyhow::Result<VoiceId> {
        let name = name.into();
        let color = color.into();
        ensure!(!name.trim().is_empty(), "voice name must not be empty");
        ensure!(is_hex_color(&color), "invalid voice color {color:?}");

        let id = VoiceId::new(next_id("v", self.voices.iter().map(|v| v.id.as_str())));
        self.voices.push(Voice::new(id.clone(), name.trim(), color));
        Ok(id)
    }

    /// Remove a voice. The first (main) voice stays; segments that
    /// pointed at the removed voice are kept and render uncolored.
    pub fn remove_voice(&mut self, id: &VoiceId) -> anyhow::Result<Voice> {
        let Some(idx) = self.voices.iter().position(|v| &v.id == id) else {
            bail!("no voice {id}");
        };
        ensure!(idx != 0, "the main voice cannot be removed");
        Ok(self.voices.remove(idx))
    }

    /// Assign `[start, end)` of the lyrics to a voice.
    pub fn assign(&mut self, voice_id: &VoiceId, start: i64, end: i64) -> anyhow::Result<SegmentId> {
        ensure!(self.voice(voice_id).is_some(), "no voice {voice_id}");
        ensure!(start < end, "empty selection {start}..{end}");
        let len = self.char_len();
        ensure!(
            start >= 0 && end <= len as i64,
            "selection {start}..{end} exceeds lyrics length {len}"
        );

        let id = SegmentId::new(next_id("s", self.segments.iter().map(|s| s.id.as_str())));
        self.segments.push(VoiceSegment {
            id: id.clone(),
            start_pos: start,
            end_pos: end,
            voice_id: voice_id.clone(),
        });
        Ok(id)
    }

    pub fn unassign(&mut self, id: &SegmentId) -> Option<VoiceSegment> {
        let idx = self.segments.iter().position(|s| &s.id == id)?;
        Some(self.segments.remove(idx))
    }

    /// Problems with the segment list, in segment order.
    pub fn issues(&self) -> Vec<SegmentIssue> {
        let len = self.char_len();
        let voices: HashSet<&VoiceId> = self.voices.iter().map(|v| &v.id).collect();
        let mut issues = Vec::new();

        for seg in &self.segments {
            if seg.start_pos >= seg.end_pos {
                issues.push(SegmentIssue::EmptyRange {
                    segment: seg.id.clone(),
                    start: seg.start_pos,
                    end: seg.end_pos,
                });
            } else if seg.start_pos < 0 || seg.end_pos > len as i64 {
                issues.push(SegmentIssue::OutOfBounds {
                    segment: seg.id.clone(),
                    start: seg.start_pos,
                    end: seg.end_pos,
                    len,
                });
            }
            if !voices.contains(&seg.voice_id) {
                issues.push(SegmentIssue::UnknownVoice {
                    segment: seg.id.clone(),
                    voice: seg.voice_id.clone(),
                });
            }
        }

        issues
    }

    /// Checks that gate saving. Segment issues are not among them.
    pub fn validate_for_save(&self) -> anyhow::Result<()> {
        ensure!(!self.title.trim().is_empty(), "song title must not be empty");
        ensure!(!self.voices.is_empty(), "song has no voices");

        let mut seen = HashSet::new();
        for voice in &self.voices {
            ensure!(seen.insert(&voice.id), "duplicate voice id {}", voice.id);
            ensure!(
                is_hex_color(&voice.color),
                "voice {:?} has invalid color {:?}",
                voice.name,
                voice.color
            );
        }
        Ok(())
    }
}

/// `prefix` followed by one more than the largest numeric suffix in use.
fn next_id<'a>(prefix: &str, existing: impl Iterator<Item = &'a str>) -> String {
    let max = existing
        .filter_map(|id| id.strip_prefix(prefix)?.parse::<u64>().ok())
        .max();
    let n = max.map_or(1, |m| m + 1);
    format!("{prefix}{n}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_song_has_main_voice() {
        let song = Song::new("Cielito Lindo", "De la sierra morena");
        assert_eq!(song.voices.len(), 1);
        assert_eq!(song.voices[0].name, MAIN_VOICE_NAME);
        assert_eq!(song.voices[0].color, MAIN_VOICE_COLOR);
        assert!(song.id.is_none());
    }

    #[test]
    fn test_add_voice_ids_are_unique() {
        let mut song = Song::new("t", "abc");
        let a = song.add_voice("Coro", "#ff0000").unwrap();
        let b = song.add_voice("Bajo", "#00f").unwrap();
        assert_eq!(a.as_str(), "v1");
        assert_eq!(b.as_str(), "v2");

        song.remove_voice(&a).unwrap();
        let c = song.add_voice("Alto", "#00ff00").unwrap();
        assert_eq!(c.as_str(), "v3");
    }

    #[test]
    fn test_add_voice_rejects_bad_color() {
        let mut song = Song::new("t", "abc");
        assert!(song.add_voice("Coro", "red").is_err());
        assert!(song.add_voice("  ", "#fff").is_err());
        assert_eq!(song.voices.len(), 1);
    }

    #[test]
    fn test_main_voice_cannot_be_removed() {
        let mut song = Song::new("t", "abc");
        let main = song.voices[0].id.clone();
        assert!(song.remove_voice(&main).is_err());
        assert!(song.remove_voice(&VoiceId::new("nope")).is_err());
    }

    #[test]
    fn test_removing_voice_keeps_its_segments() {
        let mut song = Song::new("t", "hello world");
        let coro = song.add_voice("Coro", "#ff0000").unwrap();
        song.assign(&coro, 0, 5).unwrap();

        song.remove_voice(&coro).unwrap();
        assert_eq!(song.segments.len(), 1);
        assert_eq!(
            song.issues(),
            vec![SegmentIssue::UnknownVoice {
                segment: SegmentId::new("s1"),
                voice: coro,
            }]
        );
    }

    #[test]
    fn test_assign_and_unassign() {
        let mut song = Song::new("t", "hello world");
        let main = song.voices[0].id.clone();
        let s1 = song.assign(&main, 0, 5).unwrap();
        let s2 = song.assign(&main, 6, 11).unwrap();
        assert_eq!(s1.as_str(), "s1");
        assert_eq!(s2.as_str(), "s2");

        assert!(song.assign(&main, 3, 3).is_err());
        assert!(song.assign(&VoiceId::new("ghost"), 0, 1).is_err());
        assert!(song.assign(&main, -4, 3).is_err());
        assert!(song.assign(&main, 6, 12).is_err());
        assert!(song.assign(&main, -4, 9999).is_err());
        assert_eq!(song.segments.len(), 2);
        assert!(song.issues().is_empty());
        let whole = song.assign(&main, 0, 11).unwrap();
        song.unassign(&whole).unwrap();

        let removed = song.unassign(&s1).unwrap();
        assert_eq!(removed.end_pos, 5);
        assert!(song.unassign(&s1).is_none());
        assert_eq!(song.segments.len(), 1);
    }

    #[test]
    fn test_issues_reports_bad_ranges() {
        let mut song = Song::new("t", "abc");
        let main = song.voices[0].id.clone();
        song.segments.push(VoiceSegment {
            id: SegmentId::new("a"),
            start_pos: 2,
            end_pos: 1,
            voice_id: main.clone(),
        });
        song.segments.push(VoiceSegment {
            id: SegmentId::new("b"),
            start_pos: -1,
            end_pos: 10,
            voice_id: main,
        });

        let issues = song.issues();
        assert_eq!(issues.len(), 2);
        assert!(matches!(issues[0], SegmentIssue::EmptyRange { .. }));
        assert!(matches!(issues[1], SegmentIssue::OutOfBounds { len: 3, .. }));
        assert_eq!(
            issues[1].to_string(),
            "segment b: range -1..10 exceeds lyrics length 3"
        );
    }

    #[test]
    fn test_clamped_range() {
        let seg = |start, end| VoiceSegment {
            id: SegmentId::new("s"),
            start_pos: start,
            end_pos: end,
            voice_id: VoiceId::new("v0"),
        };
        assert_eq!(seg(0, 5).clamped_range(10), 0..5);
        assert_eq!(seg(-3, 50).clamped_range(10), 0..10);
        assert_eq!(seg(7, 2).clamped_range(10), 7..7);
        assert_eq!(seg(20, 30).clamped_range(10), 10..10);
    }

    #[test]
    fn test_line_and_char_counts_include_newlines() {
        let song = Song::new("t", "año\n\nfin\n");
        assert_eq!(song.char_len(), 9);
        assert_eq!(song.line_count(), 4);
    }

    #[test]
    fn test_validate_for_save() {
        let mut song = Song::new("t", "abc");
        assert!(song.validate_for_save().is_ok());

        song.title = "   ".into();
        assert!(song.validate_for_save().is_err());

        song.title = "ok".into();
        song.voices[0].color = "white".into();
        assert!(song.validate_for_save().is_err());
    }

    #[test]
    fn test_json_uses_camel_case_segments() {
        let raw = r##"{
            "title": "Hola",
            "lyrics": "Hello\nWorld",
            "voices": [{"id": "V1", "name": "Lead", "color": "#ff0000"}],
            "segments": [{"id": "s1", "startPos": 0, "endPos": 5, "voiceId": "V1"}]
        }"##;
        let song = Song::from_json(raw).unwrap();
        assert_eq!(song.segments[0].end_pos, 5);
        assert_eq!(song.segments[0].voice_id.as_str(), "V1");

        let out = song.to_json().unwrap();
        assert!(out.contains("\"startPos\": 0"));
        assert!(!out.contains("\"id\": null"));
    }

    #[test]
    fn test_json_without_voices_gets_main_voice() {
        let song = Song::from_json(r#"{"title": "Solo"}"#).unwrap();
        assert_eq!(song.voices.len(), 1);
        assert_eq!(song.lyrics, "");
    }

    #[test]
    fn test_utf16_offsets_are_rebased_onto_chars() {
        // The microphone emoji is two UTF-16 units, so "hola" sits at
        // units 3..7 but chars 2..6.
        let raw = r##"{
            "title": "Mic",
            "lyrics": "🎤 hola\nsi",
            "voices": [{"id": "v0", "name": "Voz Principal", "color": "#FFFFFF"}],
            "segments": [
                {"id": "s1", "startPos": 3, "endPos": 7, "voiceId": "v0"},
                {"id": "s2", "startPos": 8, "endPos": 10, "voiceId": "v0"},
                {"id": "s3", "startPos": 1, "endPos": 12, "voiceId": "v0"}
            ]
        }"##;
        let song = Song::from_json_utf16(raw).unwrap();
        assert_eq!(song.char_len(), 9);

        let ranges: Vec<(i64, i64)> = song
            .segments
            .iter()
            .map(|s| (s.start_pos, s.end_pos))
            .collect();
        assert_eq!(ranges, vec![(2, 6), (7, 9), (1, 11)]);

        let picked: String = song.lyrics.chars().skip(2).take(4).collect();
        assert_eq!(picked, "hola");
        assert_eq!(song.issues().len(), 1);

        // Plain import keeps offsets as they are.
        let plain = Song::from_json(raw).unwrap();
        assert_eq!(plain.segments[0].start_pos, 3);
    }
}
