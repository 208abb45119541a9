//! Loads the reference corpus file into a `ReferenceIndex` at startup.

use crate::error::ServerError;
use quran_track_core::{ReferenceIndex, VerseInput};
use std::path::Path;

pub fn load_reference_index(path: impl AsRef<Path>) -> Result<ReferenceIndex, ServerError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ServerError::Internal(format!("failed to read reference corpus {:?}: {e}", path))
    })?;
    let verses: Vec<VerseInput> = serde_json::from_str(&raw).map_err(|e| {
        ServerError::Internal(format!(
            "failed to parse reference corpus {:?}: {e}",
            path
        ))
    })?;
    ReferenceIndex::build(&verses)
        .map_err(|e| ServerError::Internal(format!("invalid reference corpus: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_a_minimal_corpus_file() {
        let path = std::env::temp_dir().join(format!(
            "quran_track_test_{}_{}.json",
            std::process::id(),
            "loads_a_minimal_corpus_file"
        ));
        let mut file = std::fs::File::create(&path).expect("create temp file");
        writeln!(
            file,
            r#"[{{"id":1,"sura_no":1,"page":1,"jozz":1,"words":["بسم","الله"]}}]"#
        )
        .unwrap();
        drop(file);

        let idx = load_reference_index(&path).unwrap();
        assert_eq!(idx.len(), 2);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file_is_an_internal_error() {
        let err = load_reference_index("/nonexistent/path/quran.json").unwrap_err();
        assert!(matches!(err, ServerError::Internal(_)));
    }
}
