use crate::song::{SegmentId, Song, SongId, Voice, VoiceId, VoiceSegment};
use anyhow::{bail, Context};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;
use tracing::{debug, info};

pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }

        let conn = Connection::open(path).with_context(|| format!("open {}", path.display()))?;
        let s = Self { conn };
        s.init_schema()?;
        debug!(path = %path.display(), "song store opened");
        Ok(s)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory db")?;
        let s = Self { conn };
        s.init_schema()?;
        Ok(s)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        self.conn
            .execute_batch(
                r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS songs (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  title TEXT NOT NULL,
  lyrics TEXT NOT NULL,
  created_at INTEGER NOT NULL,
  updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS voices (
  song_id INTEGER NOT NULL REFERENCES songs(id) ON DELETE CASCADE,
  voice_id TEXT NOT NULL,
  position INTEGER NOT NULL,
  name TEXT NOT NULL,
  color TEXT NOT NULL,
  PRIMARY KEY (song_id, voice_id)
);

CREATE TABLE IF NOT EXISTS voice_segments (
  song_id INTEGER NOT NULL REFERENCES songs(id) ON DELETE CASCADE,
  segment_id TEXT NOT NULL,
  position INTEGER NOT NULL,
  voice_id TEXT NOT NULL,
  start_pos INTEGER NOT NULL,
  end_pos INTEGER NOT NULL,
  PRIMARY KEY (song_id, segment_id)
);

CREATE INDEX IF NOT EXISTS idx_voices_song ON voices(song_id, position);
CREATE INDEX IF NOT EXISTS idx_segments_song ON voice_segments(song_id, position);
"#,
            )
            .context("init schema")?;
        Ok(())
    }

    /// Insert a new song with its voices and segments. Any `id` on the
    /// song is ignored; the store assigns one.
    pub fn save_song(&mut self, song: &Song) -> anyhow::Result<SongId> {
        song.validate_for_save()?;
        let now = now_unix();

        let tx = self.conn.transaction().context("begin save")?;
        tx.execute(
            "INSERT INTO songs(title, lyrics, created_at, updated_at) VALUES(?1, ?2, ?3, ?3)",
            params![song.title, song.lyrics, now],
        )
        .context("insert song")?;
        let id = SongId(tx.last_insert_rowid());

        insert_children(&tx, id, song)?;
        tx.commit().context("commit save")?;

        info!(song = %id, title = %song.title, "song saved");
        Ok(id)
    }

    /// Replace a stored song wholesale: title, lyrics, voices and segments.
    pub fn update_song(&mut self, song: &Song) -> anyhow::Result<()> {
        let Some(id) = song.id else {
            bail!("song {:?} has not been saved yet", song.title);
        };
        song.validate_for_save()?;

        let tx = self.conn.transaction().context("begin update")?;
        let changed = tx
            .execute(
                "UPDATE songs SET title=?2, lyrics=?3, updated_at=?4 WHERE id=?1",
                params![id.0, song.title, song.lyrics, now_unix()],
            )
            .context("update song")?;
        if changed == 0 {
            bail!("no song {id}");
        }

        tx.execute("DELETE FROM voices WHERE song_id=?1", params![id.0])
            .context("clear voices")?;
        tx.execute("DELETE FROM voice_segments WHERE song_id=?1", params![id.0])
            .context("clear segments")?;
        insert_children(&tx, id, song)?;
        tx.commit().context("commit update")?;

        info!(song = %id, "song updated");
        Ok(())
    }

    pub fn get_song(&self, id: SongId) -> anyhow::Result<Option<Song>> {
        let row = self
            .conn
            .query_row(
                "SELECT title, lyrics FROM songs WHERE id=?1",
                params![id.0],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()
            .context("query song")?;

        let Some((title, lyrics)) = row else {
            return Ok(None);
        };

        Ok(Some(Song {
            id: Some(id),
            title,
            lyrics,
            voices: self.voices_for(id)?,
            segments: self.segments_for(id)?,
        }))
    }

    /// All songs, newest first.
    pub fn list_songs(&self) -> anyhow::Result<Vec<Song>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, lyrics FROM songs ORDER BY id DESC")
            .context("prepare list songs")?;

        let heads = stmt
            .query_map([], |row| {
                Ok((
                    SongId(row.get(0)?),
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .context("list songs")?
            .collect::<Result<Vec<_>, _>>()
            .context("read song row")?;

        heads
            .into_iter()
            .map(|(id, title, lyrics)| {
                Ok(Song {
                    id: Some(id),
                    title,
                    lyrics,
                    voices: self.voices_for(id)?,
                    segments: self.segments_for(id)?,
                })
            })
            .collect()
    }

    /// Returns false when there was no such song.
    pub fn delete_song(&mut self, id: SongId) -> anyhow::Result<bool> {
        let tx = self.conn.transaction().context("begin delete")?;
        tx.execute("DELETE FROM voice_segments WHERE song_id=?1", params![id.0])
            .context("delete segments")?;
        tx.execute("DELETE FROM voices WHERE song_id=?1", params![id.0])
            .context("delete voices")?;
        let removed = tx
            .execute("DELETE FROM songs WHERE id=?1", params![id.0])
            .context("delete song")?;
        tx.commit().context("commit delete")?;

        if removed > 0 {
            info!(song = %id, "song deleted");
        }
        Ok(removed > 0)
    }

    fn voices_for(&self, id: SongId) -> anyhow::Result<Vec<Voice>> {
        let mut stmt = self.conn.prepare(
            "SELECT voice_id, name, color FROM voices WHERE song_id=?1 ORDER BY position",
        )?;
        let voices = stmt
            .query_map(params![id.0], |row| {
                Ok(Voice {
                    id: VoiceId(row.get(0)?),
                    name: row.get(1)?,
                    color: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("read voices")?;
        Ok(voices)
    }

    fn segments_for(&self, id: SongId) -> anyhow::Result<Vec<VoiceSegment>> {
        let mut stmt = self.conn.prepare(
            r#"
SELECT segment_id, start_pos, end_pos, voice_id
FROM voice_segments
WHERE song_id=?1
ORDER BY position
"#,
        )?;
        let segments = stmt
            .query_map(params![id.0], |row| {
                Ok(VoiceSegment {
                    id: SegmentId(row.get(0)?),
                    start_pos: row.get(1)?,
                    end_pos: row.get(2)?,
                    voice_id: VoiceId(row.get(3)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("read segments")?;
        Ok(segments)
    }
}

fn insert_children(tx: &Transaction<'_>, id: SongId, song: &Song) -> anyhow::Result<()> {
    for (pos, voice) in song.voices.iter().enumerate() {
        tx.execute(
            r#"
INSERT INTO voices(song_id, voice_id, position, name, color)
VALUES(?1, ?2, ?3, ?4, ?5)
"#,
            params![id.0, voice.id.as_str(), pos as i64, voice.name, voice.color],
        )
        .with_context(|| format!("insert voice {}", voice.id))?;
    }

    // Segments keep their voice id even when it dangles.
    for (pos, seg) in song.segments.iter().enumerate() {
        tx.execute(
            r#"
INSERT INTO voice_segments(song_id, segment_id, position, voice_id, start_pos, end_pos)
VALUES(?1, ?2, ?3, ?4, ?5, ?6)
"#,
            params![
                id.0,
                seg.id.as_str(),
                pos as i64,
                seg.voice_id.as_str(),
                seg.start_pos,
                seg.end_pos
            ],
        )
        .with_context(|| format!("insert segment {}", seg.id))?;
    }
    Ok(())
}

fn now_unix() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Song {
        let mut song = Song::new("Bésame Mucho", "Bésame\nbésame mucho\n\ncomo si fuera");
        let coro = song.add_voice("Coro", "#ff00aa").unwrap();
        let main = song.voices[0].id.clone();
        song.assign(&coro, 7, 20).unwrap();
        song.assign(&main, 0, 6).unwrap();
        song
    }

    #[test]
    fn test_save_and_get_round_trip() {
        let mut store = Storage::open_in_memory().unwrap();
        let song = sample();
        let id = store.save_song(&song).unwrap();

        let loaded = store.get_song(id).unwrap().unwrap();
        assert_eq!(loaded.id, Some(id));
        assert_eq!(loaded.title, song.title);
        assert_eq!(loaded.lyrics, song.lyrics);
        assert_eq!(loaded.voices, song.voices);
        assert_eq!(loaded.segments, song.segments);
    }

    #[test]
    fn test_get_missing_song() {
        let store = Storage::open_in_memory().unwrap();
        assert!(store.get_song(SongId(42)).unwrap().is_none());
    }

    #[test]
    fn test_list_is_newest_first() {
        let mut store = Storage::open_in_memory().unwrap();
        let a = store.save_song(&Song::new("A", "a")).unwrap();
        let b = store.save_song(&Song::new("B", "b")).unwrap();

        let songs = store.list_songs().unwrap();
        let ids: Vec<_> = songs.iter().map(|s| s.id.unwrap()).collect();
        assert_eq!(ids, vec![b, a]);
        assert_eq!(songs[1].voices.len(), 1);
    }

    #[test]
    fn test_dangling_voice_survives_storage() {
        let mut store = Storage::open_in_memory().unwrap();
        let mut song = sample();
        let coro = song.voices[1].id.clone();
        song.remove_voice(&coro).unwrap();

        let id = store.save_song(&song).unwrap();
        let loaded = store.get_song(id).unwrap().unwrap();
        assert_eq!(loaded.segments[0].voice_id, coro);
        assert_eq!(loaded.issues().len(), 1);
    }

    #[test]
    fn test_update_replaces_everything() {
        let mut store = Storage::open_in_memory().unwrap();
        let id = store.save_song(&sample()).unwrap();

        let mut song = store.get_song(id).unwrap().unwrap();
        song.title = "Bésame".into();
        song.lyrics = "uno\ndos".into();
        song.segments.clear();
        let alto = song.add_voice("Alto", "#00ff00").unwrap();
        song.assign(&alto, 0, 3).unwrap();
        store.update_song(&song).unwrap();

        let loaded = store.get_song(id).unwrap().unwrap();
        assert_eq!(loaded, song);
        assert_eq!(loaded.segments.len(), 1);
        assert_eq!(loaded.voices.len(), 3);
    }

    #[test]
    fn test_update_unsaved_or_missing_song_fails() {
        let mut store = Storage::open_in_memory().unwrap();
        assert!(store.update_song(&Song::new("x", "y")).is_err());

        let mut ghost = Song::new("x", "y");
        ghost.id = Some(SongId(99));
        assert!(store.update_song(&ghost).is_err());
    }

    #[test]
    fn test_save_rejects_invalid_song() {
        let mut store = Storage::open_in_memory().unwrap();
        let mut song = Song::new("", "lyrics");
        assert!(store.save_song(&song).is_err());

        song.title = "ok".into();
        song.voices[0].color = "blanco".into();
        assert!(store.save_song(&song).is_err());
        assert!(store.list_songs().unwrap().is_empty());
    }

    #[test]
    fn test_delete_song() {
        let mut store = Storage::open_in_memory().unwrap();
        let id = store.save_song(&sample()).unwrap();

        assert!(store.delete_song(id).unwrap());
        assert!(!store.delete_song(id).unwrap());
        assert!(store.get_song(id).unwrap().is_none());
        assert!(store.voices_for(id).unwrap().is_empty());
        assert!(store.segments_for(id).unwrap().is_empty());
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("songs.sqlite3");
        let mut store = Storage::open(&path).unwrap();
        store.save_song(&Song::new("t", "l")).unwrap();
        assert!(path.exists());
    }
}
