//! Property tests for chunk splitting and chunked canvas storage

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use storyvault::backend::storage::sheets::chunked::{deletion_ranges, split_chunks};
use storyvault::backend::storage::sheets::{MemorySheets, SpreadsheetDocumentStore, CHUNK_SIZE};
use storyvault::shared::config::SheetsConfig;

fn store() -> (Arc<MemorySheets>, SpreadsheetDocumentStore) {
    let sheets = Arc::new(MemorySheets::new());
    let config = SheetsConfig::builder().spreadsheet_id("prop").build().unwrap();
    (sheets.clone(), SpreadsheetDocumentStore::new(sheets, config))
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().build().unwrap()
}

proptest! {
    #[test]
    fn split_then_concat_is_identity(text in "\\PC{0,300}", size in 1usize..50) {
        let chunks = split_chunks(&text, size);
        prop_assert_eq!(chunks.concat(), text.clone());
        prop_assert!(chunks.iter().all(|c| c.chars().count() <= size));
        prop_assert_eq!(chunks.len(), text.chars().count().div_ceil(size).max(1));
    }

    #[test]
    fn deletion_ranges_cover_indices_bottom_up(indices in proptest::collection::vec(0usize..200, 0..60)) {
        let ranges = deletion_ranges(indices.clone());
        let mut covered: Vec<usize> = ranges.iter().flat_map(|r| r.clone()).collect();
        covered.sort_unstable();
        let mut expected = indices;
        expected.sort_unstable();
        expected.dedup();
        prop_assert_eq!(covered, expected);
        prop_assert!(ranges.windows(2).all(|w| w[0].start > w[1].end));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn chunked_round_trip(extra in 0usize..(2 * CHUNK_SIZE), fill in "[a-z{}\\[\\]\":,]", secs in 0i64..4_000_000_000) {
        let json = fill.repeat(CHUNK_SIZE / 2 + extra);
        let stamp = Utc.timestamp_opt(secs, 0).unwrap();
        let (_, store) = store();

        let doc = runtime().block_on(async {
            store.save_chunked(42, 7, &json, stamp).await.unwrap();
            store.read_chunked(42, 7).await.unwrap()
        });
        let doc = doc.unwrap();
        prop_assert_eq!(doc.last_modified(), Some(stamp));
        prop_assert_eq!(&doc.json, &json);
    }

    #[test]
    fn resave_leaves_exactly_new_chunk_count(first in 1usize..(3 * CHUNK_SIZE), second in 1usize..(3 * CHUNK_SIZE)) {
        let (sheets, store) = store();
        let rows = runtime().block_on(async {
            store.save_chunked(1, 1, &"a".repeat(first), Utc::now()).await.unwrap();
            store.save_chunked(1, 1, &"b".repeat(second), Utc::now()).await.unwrap();
            sheets.rows("Canvas").await
        });
        prop_assert_eq!(rows.len(), second.div_ceil(CHUNK_SIZE));
    }
}
