use crate::model::artifact::DatabaseEngine;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const PREFIX: &str = "backup_";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TIMESTAMP_LENGTH: usize = 15;
const COMPRESSED_SUFFIX: &str = ".gz";

/// Parsed form of `backup_<id>_<YYYYMMDD_HHMMSS>[-<seq>].<ext>[.gz]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactName {
    pub schedule_id: Uuid,
    pub timestamp: NaiveDateTime,
    pub seq: u32,
    pub engine: DatabaseEngine,
    pub compressed: bool,
}

impl ArtifactName {
    /// Ordering key for retention: newer timestamps first, then higher
    /// sequence numbers within the same second.
    pub fn recency(&self) -> (NaiveDateTime, u32) {
        (self.timestamp, self.seq)
    }
}

pub struct ArtifactNamer;

impl ArtifactNamer {
    pub fn name(
        schedule_id: Uuid,
        engine: DatabaseEngine,
        timestamp: DateTime<Utc>,
        compressed: bool,
    ) -> String {
        Self::name_with_seq(schedule_id, engine, timestamp, 0, compressed)
    }

    fn name_with_seq(
        schedule_id: Uuid,
        engine: DatabaseEngine,
        timestamp: DateTime<Utc>,
        seq: u32,
        compressed: bool,
    ) -> String {
        let mut name = format!(
            "{PREFIX}{}_{}",
            schedule_id.simple(),
            timestamp.format(TIMESTAMP_FORMAT)
        );
        if seq > 0 {
            name.push_str(&format!("-{seq}"));
        }
        name.push('.');
        name.push_str(engine.extension());
        if compressed {
            name.push_str(COMPRESSED_SUFFIX);
        }
        name
    }

    /// Raw artifact path inside `directory` whose name, raw or compressed, is
    /// not taken yet. A sequence number is only added on collision.
    pub fn available_path(
        directory: &Path,
        schedule_id: Uuid,
        engine: DatabaseEngine,
        timestamp: DateTime<Utc>,
    ) -> PathBuf {
        let mut seq = 0;
        loop {
            let raw = directory.join(Self::name_with_seq(schedule_id, engine, timestamp, seq, false));
            let compressed =
                directory.join(Self::name_with_seq(schedule_id, engine, timestamp, seq, true));
            if !raw.exists() && !compressed.exists() {
                return raw;
            }
            seq += 1;
        }
    }

    pub fn compressed_path(raw: &Path) -> PathBuf {
        let mut name = raw.as_os_str().to_os_string();
        name.push(COMPRESSED_SUFFIX);
        PathBuf::from(name)
    }

    pub fn parse(file_name: &str) -> Option<ArtifactName> {
        let rest = file_name.strip_prefix(PREFIX)?;
        let (id, rest) = rest.split_once('_')?;
        let schedule_id = Uuid::try_parse(id).ok()?;
        if id.len() != 32 {
            return None;
        }

        let timestamp_text = rest.get(..TIMESTAMP_LENGTH)?;
        let timestamp = NaiveDateTime::parse_from_str(timestamp_text, TIMESTAMP_FORMAT).ok()?;
        let rest = &rest[TIMESTAMP_LENGTH..];

        let (seq, rest) = match rest.strip_prefix('-') {
            Some(rest) => {
                let (digits, rest) = rest.split_once('.')?;
                let seq = digits.parse::<u32>().ok().filter(|seq| *seq > 0)?;
                (seq, rest)
            }
            None => (0, rest.strip_prefix('.')?),
        };

        let (extension, compressed) = match rest.strip_suffix(COMPRESSED_SUFFIX) {
            Some(extension) => (extension, true),
            None => (rest, false),
        };
        let engine = DatabaseEngine::ALL
            .into_iter()
            .find(|engine| engine.extension() == extension)?;

        Some(ArtifactName {
            schedule_id,
            timestamp,
            seq,
            engine,
            compressed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    fn fixed_id() -> Uuid {
        Uuid::parse_str("0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0").unwrap()
    }

    #[test]
    fn name_embeds_id_timestamp_and_extension() {
        let timestamp = Utc.with_ymd_and_hms(2024, 7, 4, 9, 5, 3).unwrap();
        assert_eq!(
            ArtifactNamer::name(fixed_id(), DatabaseEngine::Postgres, timestamp, true),
            "backup_0f1e2d3c4b5a69788796a5b4c3d2e1f0_20240704_090503.sql.gz"
        );
        assert_eq!(
            ArtifactNamer::name(fixed_id(), DatabaseEngine::Sqlite, timestamp, false),
            "backup_0f1e2d3c4b5a69788796a5b4c3d2e1f0_20240704_090503.sqlite3"
        );
    }

    #[test]
    fn lexicographic_order_is_chronological() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 9, 23, 59, 59).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let a = ArtifactNamer::name(fixed_id(), DatabaseEngine::Sqlite, earlier, false);
        let b = ArtifactNamer::name(fixed_id(), DatabaseEngine::Sqlite, later, false);
        assert!(a < b);
    }

    #[test]
    fn parse_reads_back_every_variant() {
        let parsed = ArtifactNamer::parse(
            "backup_0f1e2d3c4b5a69788796a5b4c3d2e1f0_20240704_090503-2.sqlite3.gz",
        )
        .unwrap();
        assert_eq!(parsed.schedule_id, fixed_id());
        assert_eq!(parsed.seq, 2);
        assert_eq!(parsed.engine, DatabaseEngine::Sqlite);
        assert!(parsed.compressed);

        let parsed =
            ArtifactNamer::parse("backup_0f1e2d3c4b5a69788796a5b4c3d2e1f0_20240704_090503.sql")
                .unwrap();
        assert_eq!(parsed.seq, 0);
        assert_eq!(parsed.engine, DatabaseEngine::Postgres);
        assert!(!parsed.compressed);
    }

    #[test]
    fn parse_rejects_foreign_files() {
        for name in [
            "notes.txt",
            "backup_nothex_20240704_090503.sql",
            "backup_0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0_20240704_090503.sql",
            "backup_0f1e2d3c4b5a69788796a5b4c3d2e1f0_20241304_090503.sql",
            "backup_0f1e2d3c4b5a69788796a5b4c3d2e1f0_20240704_090503.sql.bz2",
            "backup_0f1e2d3c4b5a69788796a5b4c3d2e1f0_20240704_090503-x.sql",
            "backup_0f1e2d3c4b5a69788796a5b4c3d2e1f0_20240704_090503.sql.gz.partial",
        ] {
            assert!(ArtifactNamer::parse(name).is_none(), "{name}");
        }
    }

    #[test]
    fn collisions_get_a_sequence_number() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let timestamp = Utc.with_ymd_and_hms(2024, 7, 4, 9, 5, 3).unwrap();

        let first =
            ArtifactNamer::available_path(dir.path(), fixed_id(), DatabaseEngine::Postgres, timestamp);
        assert_eq!(ArtifactNamer::parse(&file_name(&first)).unwrap().seq, 0);
        fs::write(ArtifactNamer::compressed_path(&first), b"x")?;

        let second =
            ArtifactNamer::available_path(dir.path(), fixed_id(), DatabaseEngine::Postgres, timestamp);
        assert_eq!(ArtifactNamer::parse(&file_name(&second)).unwrap().seq, 1);
        fs::write(&second, b"x")?;

        let third =
            ArtifactNamer::available_path(dir.path(), fixed_id(), DatabaseEngine::Postgres, timestamp);
        assert_eq!(ArtifactNamer::parse(&file_name(&third)).unwrap().seq, 2);
        Ok(())
    }

    fn file_name(path: &Path) -> String {
        path.file_name().unwrap().to_string_lossy().to_string()
    }
}
