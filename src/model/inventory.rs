use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: String,
    pub count: u32,
}

/// Ordered item list. Entries never hold a zero count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    items: Vec<InventoryItem>,
}

impl Inventory {
    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[cfg(test)]
    pub fn count_of(&self, name: &str) -> u32 {
        self.items
            .iter()
            .find(|i| i.name == name)
            .map(|i| i.count)
            .unwrap_or(0)
    }

    pub fn apply_update(&mut self, name: &str, quantity_change: i32) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }

        match self.items.iter().position(|i| i.name == name) {
            Some(idx) => {
                let next = i64::from(self.items[idx].count) + i64::from(quantity_change);
                if next <= 0 {
                    self.items.remove(idx);
                } else {
                    self.items[idx].count = u32::try_from(next).unwrap_or(u32::MAX);
                }
            }
            None if quantity_change > 0 => {
                self.items.push(InventoryItem {
                    name: name.to_string(),
                    count: quantity_change as u32,
                });
            }
            None => {
                tracing::debug!(item = name, quantity_change, "ignoring removal of unknown item");
            }
        }
    }

    /// `咖啡 x2, 笔记本 x1`
    pub fn summary(&self) -> String {
        self.items
            .iter()
            .map(|i| format!("{} x{}", i.name, i.count))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
