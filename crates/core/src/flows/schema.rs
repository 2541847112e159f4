use serde::Serialize;

use crate::domain::order::{CollectedRecord, FieldKey};
use crate::flows::validation::{has_min_length, is_valid_phone};

pub const MIN_TEXT_LENGTH: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Validator {
    MinLength(usize),
    Phone,
    Always,
}

impl Validator {
    pub fn check(&self, value: &str) -> bool {
        match self {
            Self::MinLength(min) => has_min_length(value, *min),
            Self::Phone => is_valid_phone(value),
            Self::Always => true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub key: FieldKey,
    pub label: &'static str,
    pub validator: Validator,
    pub optional: bool,
}

impl FieldSpec {
    pub fn validate(&self, value: &str) -> bool {
        self.validator.check(value)
    }
}

static ORDER_FIELDS: [FieldSpec; 4] = [
    FieldSpec {
        key: FieldKey::CustomerName,
        label: "name",
        validator: Validator::MinLength(MIN_TEXT_LENGTH),
        optional: false,
    },
    FieldSpec { key: FieldKey::Phone, label: "phone", validator: Validator::Phone, optional: false },
    FieldSpec {
        key: FieldKey::DishName,
        label: "dish",
        validator: Validator::MinLength(MIN_TEXT_LENGTH),
        optional: false,
    },
    FieldSpec {
        key: FieldKey::Comments,
        label: "comments",
        validator: Validator::Always,
        optional: true,
    },
];

/// The fixed, ordered list of fields collected for an order.
#[derive(Clone, Copy, Debug, Default)]
pub struct SlotSchema;

impl SlotSchema {
    pub fn new() -> Self {
        Self
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        &ORDER_FIELDS
    }

    pub fn field(&self, key: FieldKey) -> &'static FieldSpec {
        &ORDER_FIELDS[key.index()]
    }

    /// First field in schema order that the record does not hold yet.
    pub fn first_missing(&self, record: &CollectedRecord) -> Option<&'static FieldSpec> {
        ORDER_FIELDS.iter().find(|field| !record.contains(field.key))
    }
}
