//! Ingredient list reconciliation.
//!
//! Given the persisted ingredient rows of a recipe and a client-submitted
//! list, [`plan_ingredients`] computes which rows to mutate in place, which
//! to insert and which to delete. The plan is pure; applying it is the job
//! of the caller's transaction.
//!
//! Rules:
//! - an entry whose id matches a persisted row of this recipe updates that
//!   row, keeping its id;
//! - any other entry (no id, or an id not owned by this recipe) is new;
//! - persisted rows not claimed by an entry are deleted;
//! - when several entries carry the same persisted id, the first one wins
//!   and the rest are ignored;
//! - every surviving row takes the submitted index as its position.

use std::collections::HashSet;

use crate::models::recipe::{IngredientInput, IngredientRow};

/// In-place mutation of an existing ingredient row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientUpdate {
    pub id: i64,
    pub name: String,
    pub quantity: String,
    pub position: i32,
}

/// Ingredient row to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIngredient {
    pub name: String,
    pub quantity: String,
    pub position: i32,
}

/// Outcome of reconciling a submitted list against persisted rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientPlan {
    pub updates: Vec<IngredientUpdate>,
    pub inserts: Vec<NewIngredient>,
    pub deletes: Vec<i64>,
    /// Ids that appeared more than once; only the first entry was used.
    pub ignored_duplicates: Vec<i64>,
}

impl IngredientPlan {
    /// Plan for a recipe with no persisted ingredients.
    pub fn all_new(submitted: &[IngredientInput]) -> Self {
        plan_ingredients(&[], submitted)
    }
}

/// Compute the reconciliation plan for `submitted` against `existing`.
pub fn plan_ingredients(existing: &[IngredientRow], submitted: &[IngredientInput]) -> IngredientPlan {
    let owned: HashSet<i64> = existing.iter().map(|row| row.id).collect();
    let mut claimed: HashSet<i64> = HashSet::with_capacity(submitted.len());
    let mut plan = IngredientPlan::default();

    for (index, entry) in submitted.iter().enumerate() {
        let position = i32::try_from(index).unwrap_or(i32::MAX);
        match entry.id {
            Some(id) if owned.contains(&id) => {
                if !claimed.insert(id) {
                    plan.ignored_duplicates.push(id);
                    continue;
                }
                plan.updates.push(IngredientUpdate {
                    id,
                    name: entry.name.clone(),
                    quantity: entry.quantity.clone(),
                    position,
                });
            }
            _ => plan.inserts.push(NewIngredient {
                name: entry.name.clone(),
                quantity: entry.quantity.clone(),
                position,
            }),
        }
    }

    plan.deletes = existing
        .iter()
        .map(|row| row.id)
        .filter(|id| !claimed.contains(id))
        .collect();

    plan
}
