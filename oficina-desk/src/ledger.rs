//! Service-item ledger
//!
//! Ordered list of [`ServiceItem`]s plus a single entry row ([`ItemDraft`])
//! shared by "add" and "edit". When an edit target is set, committing the
//! draft replaces that item instead of appending.
//!
//! Item totals are always recomputed from their inputs; a total carried in
//! from the server is never trusted while the ledger owns the item.

use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::ServiceItem;
use thiserror::Error;

use crate::validation::{
    FieldErrors, MAX_ITEM_QUANTITY, MAX_SHORT_TEXT_LEN, check_amount, check_required_text,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("item index {index} out of range (ledger has {len} items)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Entry row for adding or editing one item
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    pub description: String,
    pub quantity: i32,
    pub value: Decimal,
    pub discount: Decimal,
    pub addition: Decimal,
}

impl Default for ItemDraft {
    fn default() -> Self {
        Self {
            description: String::new(),
            quantity: 1,
            value: Decimal::ZERO,
            discount: Decimal::ZERO,
            addition: Decimal::ZERO,
        }
    }
}

impl ItemDraft {
    /// Check the draft; an empty result means it can be committed
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_required_text(&mut errors, "description", &self.description, MAX_SHORT_TEXT_LEN);
        if self.quantity < 1 {
            errors.add("quantity", "must be at least 1");
        } else if self.quantity > MAX_ITEM_QUANTITY {
            errors.add("quantity", format!("must be at most {MAX_ITEM_QUANTITY}"));
        }
        check_amount(&mut errors, "value", self.value);
        check_amount(&mut errors, "discount", self.discount);
        check_amount(&mut errors, "addition", self.addition);
        errors
    }

    /// Total this draft would produce once committed
    pub fn preview_total(&self) -> Decimal {
        self.to_item().total
    }

    fn to_item(&self) -> ServiceItem {
        ServiceItem::new(
            self.description.trim(),
            self.quantity,
            self.value,
            self.discount,
            self.addition,
        )
    }
}

impl From<&ServiceItem> for ItemDraft {
    fn from(item: &ServiceItem) -> Self {
        Self {
            description: item.description.clone(),
            quantity: item.quantity,
            value: item.value,
            discount: item.discount,
            addition: item.addition,
        }
    }
}

/// Aggregated sums over the ledger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTotals {
    /// Sum of item totals
    pub services_sum: Decimal,
    /// Sum of flat item discounts
    pub total_discount: Decimal,
    /// Sum of flat item additions
    pub total_addition: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceItemLedger {
    items: Vec<ServiceItem>,
    /// Entry row
    pub draft: ItemDraft,
    edit_index: Option<usize>,
}

impl ServiceItemLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrate from persisted items, recomputing every total
    pub fn from_items(items: impl IntoIterator<Item = ServiceItem>) -> Self {
        let items = items
            .into_iter()
            .map(|mut item| {
                item.total = item.compute_total();
                item
            })
            .collect();
        Self {
            items,
            draft: ItemDraft::default(),
            edit_index: None,
        }
    }

    pub fn items(&self) -> &[ServiceItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ServiceItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the item currently loaded in the draft
    pub fn edit_index(&self) -> Option<usize> {
        self.edit_index
    }

    pub fn is_editing(&self) -> bool {
        self.edit_index.is_some()
    }

    /// Commit the draft.
    ///
    /// Replaces the edit target or appends, then resets the entry row.
    /// On validation failure nothing changes and the field errors are
    /// returned. Returns the index of the stored item.
    pub fn add_or_update(&mut self) -> Result<usize, FieldErrors> {
        self.draft.validate().into_result()?;

        let item = self.draft.to_item();
        let index = match self.edit_index {
            Some(index) if index < self.items.len() => {
                self.items[index] = item;
                index
            }
            _ => {
                self.items.push(item);
                self.items.len() - 1
            }
        };

        tracing::debug!(index, items = self.items.len(), "service item committed");
        self.reset_draft();
        Ok(index)
    }

    /// Load item `index` into the draft and mark it as the edit target
    pub fn begin_edit(&mut self, index: usize) -> Result<(), LedgerError> {
        let item = self.items.get(index).ok_or(LedgerError::IndexOutOfRange {
            index,
            len: self.items.len(),
        })?;
        self.draft = ItemDraft::from(item);
        self.edit_index = Some(index);
        Ok(())
    }

    /// Drop the draft and the edit target
    pub fn cancel_edit(&mut self) {
        self.reset_draft();
    }

    /// Remove item `index`, keeping the edit target pointed at the same item
    pub fn remove(&mut self, index: usize) -> Result<ServiceItem, LedgerError> {
        if index >= self.items.len() {
            return Err(LedgerError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        let removed = self.items.remove(index);

        match self.edit_index {
            Some(editing) if editing == index => self.reset_draft(),
            Some(editing) if editing > index => self.edit_index = Some(editing - 1),
            _ => {}
        }
        Ok(removed)
    }

    pub fn totals(&self) -> LedgerTotals {
        self.items
            .iter()
            .fold(LedgerTotals::default(), |mut acc, item| {
                acc.services_sum = acc.services_sum.saturating_add(item.total);
                acc.total_discount = acc.total_discount.saturating_add(item.discount);
                acc.total_addition = acc.total_addition.saturating_add(item.addition);
                acc
            })
    }

    fn reset_draft(&mut self) {
        self.draft = ItemDraft::default();
        self.edit_index = None;
    }
}
