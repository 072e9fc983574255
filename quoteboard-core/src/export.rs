//! Snapshot export — JSON serialization and file persistence.

use crate::board::Board;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to parse snapshot: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error("failed to write snapshot to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Serialize a `Board` to pretty JSON.
pub fn export_json(board: &Board) -> Result<String, SnapshotError> {
    serde_json::to_string_pretty(board).map_err(SnapshotError::Serialize)
}

/// Deserialize a `Board` from JSON.
pub fn import_json(json: &str) -> Result<Board, SnapshotError> {
    serde_json::from_str(json).map_err(SnapshotError::Deserialize)
}

/// Write the snapshot to `path`, replacing any prior contents.
pub fn write_snapshot(path: &Path, board: &Board) -> Result<(), SnapshotError> {
    let json = export_json(board)?;
    std::fs::write(path, json).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::Quote;
    use chrono::Utc;

    fn sample_board() -> Board {
        let mut board = Board::new();
        board.insert(
            "crypto_currencies",
            Quote {
                symbol: "BTC-USD".to_string(),
                name: "Bitcoin".to_string(),
                value: 43000.12,
                percent_change: 1.25,
                captured_at: Utc::now(),
            },
        );
        board.insert(
            "gainers_title",
            Quote {
                symbol: "NVDA".to_string(),
                name: "NVIDIA Corporation".to_string(),
                value: 880.10,
                percent_change: 4.20,
                captured_at: Utc::now(),
            },
        );
        board
    }

    #[test]
    fn json_round_trip_is_structurally_equal() {
        let board = sample_board();
        let json = export_json(&board).unwrap();
        let restored = import_json(&json).unwrap();
        assert_eq!(restored, board);
    }

    #[test]
    fn snapshot_is_a_nested_object_keyed_by_table_then_symbol() {
        let json = export_json(&sample_board()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let quote = &value["crypto_currencies"]["BTC-USD"];
        assert_eq!(quote["symbol"], "BTC-USD");
        assert_eq!(quote["name"], "Bitcoin");
        assert_eq!(quote["value"], 43000.12);
        assert_eq!(quote["percentChange"], 1.25);
        assert!(quote["capturedAt"].is_string());
    }

    #[test]
    fn write_replaces_prior_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.json");
        std::fs::write(&path, "stale contents from a previous run").unwrap();

        let board = sample_board();
        write_snapshot(&path, &board).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(import_json(&written).unwrap(), board);
    }

    #[test]
    fn unwritable_path_is_an_io_error() {
        let board = sample_board();
        let err = write_snapshot(Path::new("/nonexistent-dir/output.json"), &board).unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
    }
}
