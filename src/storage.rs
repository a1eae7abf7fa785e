#[cfg(test)]
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::models::{StoredItem, TodoList};

/// 默认存储键
pub const DEFAULT_STORAGE_KEY: &str = "todos";

/// 存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("读写存储失败: {0}")]
    Io(#[from] io::Error),
    #[error("存储键 `{key}` 中的数据已损坏: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("序列化失败: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// 键值存储（单个键对应一段序列化文本）
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// 基于目录的存储：每个键一个 `<key>.json` 文件
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// 内存存储
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// 从存储加载列表；键不存在或值为空时返回空列表，数据损坏时报错
pub fn load_todos(store: &dyn KeyValueStore, key: &str) -> Result<TodoList, StorageError> {
    let Some(content) = store.get(key)? else {
        return Ok(TodoList::new());
    };
    if content.trim().is_empty() {
        return Ok(TodoList::new());
    }

    let stored: Vec<StoredItem> =
        serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
            key: key.to_string(),
            source,
        })?;

    Ok(TodoList::from_stored(stored))
}

/// 序列化整个列表并覆盖写入
pub fn save_todos(
    store: &mut dyn KeyValueStore,
    key: &str,
    list: &TodoList,
) -> Result<(), StorageError> {
    let content = serde_json::to_string(&list.to_stored()).map_err(StorageError::Serialize)?;
    store.set(key, &content)?;
    debug!(key, items = list.len(), "列表已保存");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_missing_key_is_empty() {
        let store = MemoryStore::new();
        assert!(load_todos(&store, "todos").unwrap().is_empty());
    }

    #[test]
    fn test_blank_value_is_empty() {
        let mut store = MemoryStore::new();
        store.set("todos", "  ").unwrap();
        assert!(load_todos(&store, "todos").unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_value_is_error() {
        let mut store = MemoryStore::new();
        store.set("todos", "[{\"text\": 1").unwrap();
        assert!(matches!(
            load_todos(&store, "todos"),
            Err(StorageError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_persisted_shape() {
        let mut store = MemoryStore::new();
        let mut list = TodoList::new();
        list.append("buy milk".to_string());
        save_todos(&mut store, "todos", &list).unwrap();
        assert_eq!(
            store.get("todos").unwrap().unwrap(),
            r#"[{"text":"buy milk","completed":false}]"#
        );
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("data")).unwrap();
        assert!(store.get("todos").unwrap().is_none());

        let mut list = TodoList::new();
        list.append("a".to_string());
        list.append("b".to_string());
        list.toggle(1).unwrap();
        save_todos(&mut store, "todos", &list).unwrap();

        assert!(store.path_for("todos").exists());
        let loaded = load_todos(&store, "todos").unwrap();
        assert_eq!(loaded.to_stored(), list.to_stored());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Append(String),
        Toggle(prop::sample::Index),
        Remove(prop::sample::Index),
        ClearCompleted,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            "[a-z ]{1,10}".prop_map(Op::Append),
            any::<prop::sample::Index>().prop_map(Op::Toggle),
            any::<prop::sample::Index>().prop_map(Op::Remove),
            Just(Op::ClearCompleted),
        ]
    }

    proptest! {
        #[test]
        fn reload_matches_memory_after_every_op(ops in prop::collection::vec(op_strategy(), 1..40)) {
            let mut store = MemoryStore::new();
            let mut list = TodoList::new();
            for op in ops {
                match op {
                    Op::Append(text) => {
                        list.append(text);
                    }
                    Op::Toggle(i) if !list.is_empty() => {
                        list.toggle(i.index(list.len())).unwrap();
                    }
                    Op::Remove(i) if !list.is_empty() => {
                        list.remove_at(i.index(list.len())).unwrap();
                    }
                    Op::ClearCompleted => {
                        list.remove_completed();
                    }
                    _ => {}
                }
                save_todos(&mut store, "todos", &list).unwrap();
                let reloaded = load_todos(&store, "todos").unwrap();
                prop_assert_eq!(reloaded.to_stored(), list.to_stored());
            }
        }
    }
}
