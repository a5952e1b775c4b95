//! The drink record store
//!
//! An in-memory collaborator guarded by the authorization core. Records live
//! for the process lifetime; ids are assigned monotonically and never
//! reused. The store is cheap to clone and safe to share across requests.

use std::{collections::BTreeMap, sync::Arc};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The requested drink does not exist
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[error("drink not found")]
pub struct DrinkNotFound;

/// One component of a drink's recipe
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// What the ingredient is
    pub name: String,
    /// Display color for the ingredient
    pub color: String,
    /// Relative proportion of this ingredient
    pub parts: u32,
}

/// A drink record, in its long (full-recipe) representation
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Drink {
    /// The store-assigned identifier
    pub id: i64,
    /// The drink's display name
    pub title: String,
    /// The full recipe
    pub recipe: Vec<Ingredient>,
}

/// The abbreviated recipe component shown to unauthenticated callers
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ShortIngredient {
    /// Display color for the ingredient
    pub color: String,
    /// Relative proportion of this ingredient
    pub parts: u32,
}

/// The public (short) representation of a drink
///
/// Hides ingredient names; the full recipe requires the
/// `get:drinks-detail` permission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ShortDrink {
    /// The store-assigned identifier
    pub id: i64,
    /// The drink's display name
    pub title: String,
    /// The recipe with ingredient names removed
    pub recipe: Vec<ShortIngredient>,
}

impl Drink {
    /// The short data representation of this drink
    #[must_use]
    pub fn short(&self) -> ShortDrink {
        ShortDrink {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .iter()
                .map(|ingredient| ShortIngredient {
                    color: ingredient.color.clone(),
                    parts: ingredient.parts,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    drinks: BTreeMap<i64, Drink>,
}

/// A shared, in-memory collection of drink records
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct DrinkStore {
    inner: Arc<RwLock<Inner>>,
}

impl DrinkStore {
    /// Constructs an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a store seeded with one starter drink
    pub fn with_seed_data() -> Self {
        let store = Self::new();
        store.create(
            "water".to_owned(),
            vec![Ingredient {
                name: "water".to_owned(),
                color: "blue".to_owned(),
                parts: 1,
            }],
        );
        store
    }

    /// All drinks, in id order
    #[must_use]
    pub fn list(&self) -> Vec<Drink> {
        self.inner.read().drinks.values().cloned().collect()
    }

    /// Looks up a single drink by id
    ///
    /// # Errors
    ///
    /// Returns [`DrinkNotFound`] if no drink has the given id.
    pub fn get(&self, id: i64) -> Result<Drink, DrinkNotFound> {
        self.inner.read().drinks.get(&id).cloned().ok_or(DrinkNotFound)
    }

    /// Creates a new drink and returns it with its assigned id
    pub fn create(&self, title: String, recipe: Vec<Ingredient>) -> Drink {
        let mut inner = self.inner.write();
        inner.next_id += 1;
        let drink = Drink {
            id: inner.next_id,
            title,
            recipe,
        };
        inner.drinks.insert(drink.id, drink.clone());
        drink
    }

    /// Applies a partial update to an existing drink
    ///
    /// # Errors
    ///
    /// Returns [`DrinkNotFound`] if no drink has the given id.
    pub fn update(
        &self,
        id: i64,
        title: Option<String>,
        recipe: Option<Vec<Ingredient>>,
    ) -> Result<Drink, DrinkNotFound> {
        let mut inner = self.inner.write();
        let drink = inner.drinks.get_mut(&id).ok_or(DrinkNotFound)?;

        if let Some(title) = title {
            drink.title = title;
        }
        if let Some(recipe) = recipe {
            drink.recipe = recipe;
        }

        Ok(drink.clone())
    }

    /// Deletes a drink by id
    ///
    /// # Errors
    ///
    /// Returns [`DrinkNotFound`] if no drink has the given id.
    pub fn delete(&self, id: i64) -> Result<(), DrinkNotFound> {
        self.inner
            .write()
            .drinks
            .remove(&id)
            .map(|_| ())
            .ok_or(DrinkNotFound)
    }
}
