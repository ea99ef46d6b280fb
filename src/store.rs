use crate::error::RelayError;
use crate::model::StoredMessage;
use chrono::Utc;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

type CodeMap = BTreeMap<String, Vec<StoredMessage>>;

/// File-backed mapping from code to its ordered message list.
///
/// The whole document lives behind a single mutex that is held across the
/// read-modify-write cycle and the file write, so concurrent workers
/// cannot lose an append. Cloning shares the same state.
#[derive(Clone)]
pub struct MessageStore {
    path: PathBuf,
    state: Arc<Mutex<CodeMap>>,
}

/// Codes are stored uppercase; lookups accept any casing.
fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}

impl MessageStore {
    /// Opens the store at `path`, loading any existing document.
    ///
    /// A missing file starts empty; an unreadable or corrupt file also
    /// starts empty with a warning rather than refusing to serve.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<CodeMap>(&bytes) {
                Ok(map) => {
                    info!(codes = map.len(), path = %path.display(), "loaded message store");
                    map
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "store file unparseable, starting empty");
                    CodeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CodeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "store file unreadable, starting empty");
                CodeMap::new()
            }
        };

        Self {
            path,
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub async fn code_exists(&self, code: &str) -> bool {
        self.state.lock().await.contains_key(&normalize(code))
    }

    /// Registers a freshly issued code with an empty message list.
    pub async fn create_code(&self, code: &str) -> Result<(), RelayError> {
        let mut state = self.state.lock().await;
        state.entry(normalize(code)).or_default();
        self.persist(&state).await
    }

    /// Appends one message to `code`'s list and persists synchronously.
    ///
    /// Precondition failures (`InvalidCode`, `EmptyMessage`) leave the
    /// store untouched.
    pub async fn append_message(
        &self,
        code: &str,
        text: &str,
        sensitivity: &str,
        delivery: &str,
    ) -> Result<StoredMessage, RelayError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RelayError::EmptyMessage);
        }

        let code = normalize(code);
        let mut state = self.state.lock().await;
        let messages = state.get_mut(&code).ok_or(RelayError::InvalidCode)?;

        let entry = StoredMessage {
            message: text.to_owned(),
            sensitivity: sensitivity.to_owned(),
            delivery: delivery.to_owned(),
            timestamp_utc: Utc::now(),
        };
        messages.push(entry.clone());
        self.persist(&state).await?;

        info!(code = %code, "message appended");
        Ok(entry)
    }

    /// Snapshot of every code with its messages in insertion order.
    pub async fn all_messages_grouped(&self) -> CodeMap {
        self.state.lock().await.clone()
    }

    /// Writes the whole document via temp-file rename. Caller holds the
    /// state lock, which serializes writers.
    async fn persist(&self, state: &CodeMap) -> Result<(), RelayError> {
        let bytes = serde_json::to_vec_pretty(state)
            .map_err(|e| RelayError::StoreUnavailable(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| RelayError::StoreUnavailable(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| RelayError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::generate_unique_code;

    fn temp_store_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("messages.json")
    }

    #[tokio::test]
    async fn unknown_code_rejected_without_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let store = MessageStore::open(temp_store_path(&dir)).await;

        let result = store.append_message("ZZZZ", "hello", "low", "immediate").await;
        assert!(matches!(result, Err(RelayError::InvalidCode)));
        assert!(store.all_messages_grouped().await.is_empty());
        assert!(!temp_store_path(&dir).exists());
    }

    #[tokio::test]
    async fn empty_text_rejected_without_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let store = MessageStore::open(temp_store_path(&dir)).await;
        store.create_code("AB12").await.unwrap();

        let result = store.append_message("AB12", "   ", "low", "immediate").await;
        assert!(matches!(result, Err(RelayError::EmptyMessage)));
        assert!(store.all_messages_grouped().await["AB12"].is_empty());
    }

    #[tokio::test]
    async fn append_records_message_with_utc_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = MessageStore::open(temp_store_path(&dir)).await;
        store.create_code("AB12").await.unwrap();

        let before = Utc::now();
        store
            .append_message("AB12", "hello", "low", "immediate")
            .await
            .unwrap();

        let grouped = store.all_messages_grouped().await;
        let messages = &grouped["AB12"];
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message, "hello");
        assert_eq!(messages[0].sensitivity, "low");
        assert_eq!(messages[0].delivery, "immediate");
        assert!(messages[0].timestamp_utc >= before);
        assert!(messages[0].timestamp_utc <= Utc::now());
    }

    #[tokio::test]
    async fn lookups_are_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let store = MessageStore::open(temp_store_path(&dir)).await;
        store.create_code("AB12").await.unwrap();

        assert!(store.code_exists("ab12").await);
        store
            .append_message("ab12", "hi", "normal", "team")
            .await
            .unwrap();
        assert_eq!(store.all_messages_grouped().await["AB12"].len(), 1);
    }

    #[tokio::test]
    async fn reload_reproduces_identical_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_store_path(&dir);

        let store = MessageStore::open(&path).await;
        let code = generate_unique_code(&store).await.unwrap();
        store.create_code(&code).await.unwrap();
        store
            .append_message(&code, "first", "low", "immediate")
            .await
            .unwrap();
        store
            .append_message(&code, "second", "high", "private")
            .await
            .unwrap();
        let before = store.all_messages_grouped().await;

        let reloaded = MessageStore::open(&path).await;
        assert_eq!(reloaded.all_messages_grouped().await, before);
        let messages = &reloaded.all_messages_grouped().await[&code];
        assert_eq!(messages[0].message, "first");
        assert_eq!(messages[1].message, "second");
    }

    #[tokio::test]
    async fn corrupt_store_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_store_path(&dir);
        std::fs::write(&path, b"not json at all").unwrap();

        let store = MessageStore::open(&path).await;
        assert!(store.all_messages_grouped().await.is_empty());

        // The store stays writable after degrading.
        store.create_code("AB12").await.unwrap();
        assert!(store.code_exists("AB12").await);
    }

    #[tokio::test]
    async fn generated_codes_are_unique_against_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = MessageStore::open(temp_store_path(&dir)).await;

        let mut seen = std::collections::HashSet::new();
        for _ in 0..50 {
            let code = generate_unique_code(&store).await.unwrap();
            store.create_code(&code).await.unwrap();
            assert!(seen.insert(code));
        }
    }
}
