use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// 条目的运行时标识（不持久化，加载时重新分配）
pub type ItemId = Uuid;

/// 列表操作错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListError {
    #[error("索引 {index} 越界（列表长度 {len}）")]
    IndexOutOfRange { index: usize, len: usize },
}

/// 待办条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub text: String,
    pub completed: bool,
}

impl Item {
    pub fn new(text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            completed: false,
        }
    }
}

/// 持久化格式：`{ "text": ..., "completed": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredItem {
    pub text: String,
    pub completed: bool,
}

/// 计数器（由列表派生，不存储）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

/// 有序待办列表：插入顺序 = 显示顺序 = 持久化顺序
#[derive(Debug, Clone, Default)]
pub struct TodoList {
    items: Vec<Item>,
}

impl TodoList {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn from_stored(stored: Vec<StoredItem>) -> Self {
        let items = stored
            .into_iter()
            .map(|s| Item {
                id: Uuid::new_v4(),
                text: s.text,
                completed: s.completed,
            })
            .collect();
        Self { items }
    }

    pub fn to_stored(&self) -> Vec<StoredItem> {
        self.items
            .iter()
            .map(|item| StoredItem {
                text: item.text.clone(),
                completed: item.completed,
            })
            .collect()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// 追加条目（调用方负责裁剪并拒绝空输入）
    pub fn append(&mut self, text: String) -> ItemId {
        let item = Item::new(text);
        let id = item.id;
        self.items.push(item);
        id
    }

    /// 切换完成状态，返回新的状态
    pub fn toggle(&mut self, index: usize) -> Result<bool, ListError> {
        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(ListError::IndexOutOfRange { index, len })?;
        item.completed = !item.completed;
        Ok(item.completed)
    }

    /// 删除指定位置的条目，后续条目前移
    pub fn remove_at(&mut self, index: usize) -> Result<Item, ListError> {
        if index >= self.items.len() {
            return Err(ListError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    /// 删除所有已完成条目，保持剩余条目的相对顺序
    pub fn remove_completed(&mut self) -> Vec<ItemId> {
        let mut removed = Vec::new();
        self.items.retain(|item| {
            if item.completed {
                removed.push(item.id);
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn position_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    pub fn counters(&self) -> Counters {
        let total = self.items.len();
        let completed = self.items.iter().filter(|item| item.completed).count();
        Counters {
            total,
            completed,
            pending: total - completed,
        }
    }

    /// 统计文本完全相等的条目数量
    pub fn count_text(&self, text: &str) -> usize {
        self.items.iter().filter(|item| item.text == text).count()
    }
}
