use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    CustomerName,
    Phone,
    DishName,
    Comments,
}

impl FieldKey {
    /// Schema order. `SlotSchema` is indexed by this ordering.
    pub const ALL: [FieldKey; 4] =
        [FieldKey::CustomerName, FieldKey::Phone, FieldKey::DishName, FieldKey::Comments];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomerName => "customer_name",
            Self::Phone => "phone",
            Self::DishName => "dish_name",
            Self::Comments => "comments",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::CustomerName => 0,
            Self::Phone => 1,
            Self::DishName => 2,
            Self::Comments => 3,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub i64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Answers accepted so far, one slot per schema field.
///
/// `None` means the field has not been collected yet. An optional field the
/// user skipped is stored as `Some("")` so it is not asked again.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CollectedRecord {
    customer_name: Option<String>,
    phone: Option<String>,
    dish_name: Option<String>,
    comments: Option<String>,
}

impl CollectedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.slot(key).as_deref()
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.slot(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        FieldKey::ALL.iter().all(|key| !self.contains(*key))
    }

    pub fn is_complete(&self) -> bool {
        FieldKey::ALL.iter().all(|key| self.contains(*key))
    }

    /// Collected `(key, value)` pairs in schema order.
    pub fn entries(&self) -> Vec<(FieldKey, &str)> {
        FieldKey::ALL.iter().filter_map(|key| self.get(*key).map(|value| (*key, value))).collect()
    }

    pub fn missing(&self) -> Vec<FieldKey> {
        FieldKey::ALL.iter().copied().filter(|key| !self.contains(*key)).collect()
    }

    pub(crate) fn set(&mut self, key: FieldKey, value: String) {
        *self.slot_mut(key) = Some(value);
    }

    pub fn to_completed(&self) -> Result<CompletedOrder, DomainError> {
        match (&self.customer_name, &self.phone, &self.dish_name, &self.comments) {
            (Some(customer_name), Some(phone), Some(dish_name), Some(comments)) => {
                Ok(CompletedOrder {
                    customer_name: customer_name.clone(),
                    phone: phone.clone(),
                    dish_name: dish_name.clone(),
                    comments: comments.clone(),
                })
            }
            _ => Err(DomainError::IncompleteRecord { missing: self.missing() }),
        }
    }

    fn slot(&self, key: FieldKey) -> &Option<String> {
        match key {
            FieldKey::CustomerName => &self.customer_name,
            FieldKey::Phone => &self.phone,
            FieldKey::DishName => &self.dish_name,
            FieldKey::Comments => &self.comments,
        }
    }

    fn slot_mut(&mut self, key: FieldKey) -> &mut Option<String> {
        match key {
            FieldKey::CustomerName => &mut self.customer_name,
            FieldKey::Phone => &mut self.phone,
            FieldKey::DishName => &mut self.dish_name,
            FieldKey::Comments => &mut self.comments,
        }
    }
}

/// A record with every slot filled. Only this type reaches the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedOrder {
    pub customer_name: String,
    pub phone: String,
    pub dish_name: String,
    pub comments: String,
}

impl CompletedOrder {
    pub fn value(&self, key: FieldKey) -> &str {
        match key {
            FieldKey::CustomerName => &self.customer_name,
            FieldKey::Phone => &self.phone,
            FieldKey::DishName => &self.dish_name,
            FieldKey::Comments => &self.comments,
        }
    }

    pub fn has_comments(&self) -> bool {
        !self.comments.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedOrder {
    pub id: OrderId,
    pub order: CompletedOrder,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::{CollectedRecord, FieldKey};
    use crate::errors::DomainError;

    #[test]
    fn explicit_empty_value_counts_as_collected() {
        let mut record = CollectedRecord::new();
        record.set(FieldKey::Comments, String::new());

        assert!(record.contains(FieldKey::Comments));
        assert_eq!(record.get(FieldKey::Comments), Some(""));
        assert!(!record.contains(FieldKey::CustomerName));
        assert!(!record.is_empty());
    }

    #[test]
    fn incomplete_record_reports_missing_fields_in_schema_order() {
        let mut record = CollectedRecord::new();
        record.set(FieldKey::CustomerName, "Ana".to_string());

        let error = record.to_completed().expect_err("record is incomplete");
        assert_eq!(
            error,
            DomainError::IncompleteRecord {
                missing: vec![FieldKey::Phone, FieldKey::DishName, FieldKey::Comments]
            }
        );
    }

    #[test]
    fn complete_record_converts_to_order() {
        let mut record = CollectedRecord::new();
        record.set(FieldKey::CustomerName, "Ana".to_string());
        record.set(FieldKey::Phone, "5551234".to_string());
        record.set(FieldKey::DishName, "Paella".to_string());
        record.set(FieldKey::Comments, String::new());

        let order = record.to_completed().expect("record is complete");
        assert_eq!(order.value(FieldKey::DishName), "Paella");
        assert!(!order.has_comments());
        assert_eq!(
            record.entries().iter().map(|(key, _)| key.as_str()).collect::<Vec<_>>(),
            vec!["customer_name", "phone", "dish_name", "comments"]
        );
    }

    #[test]
    fn field_index_matches_schema_order() {
        for (position, key) in FieldKey::ALL.iter().enumerate() {
            assert_eq!(key.index(), position);
        }
    }
}
