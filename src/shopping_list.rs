//! Shopping list aggregation.
//!
//! Sums ingredient amounts across every recipe in a user's cart, keyed on the
//! exact (name, unit) pair, and renders the result as a plain-text file.

use std::collections::BTreeMap;

/// Download file name.
pub const FILENAME: &str = "shopping_list.txt";

/// Content type of the rendered list.
pub const CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// One ingredient line of one recipe in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub name: String,
    pub unit: String,
    pub amount: i64,
}

/// Totals per (name, unit), ordered by name then unit.
#[derive(Debug, Default)]
pub struct ShoppingList {
    totals: BTreeMap<(String, String), i64>,
}

impl ShoppingList {
    pub fn aggregate(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut list = Self::default();
        for line in lines {
            list.add(line);
        }
        list
    }

    pub fn add(&mut self, line: CartLine) {
        *self.totals.entry((line.name, line.unit)).or_insert(0) += line.amount;
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn total(&self, name: &str, unit: &str) -> Option<i64> {
        self.totals
            .get(&(name.to_string(), unit.to_string()))
            .copied()
    }

    /// One `name (unit) — total` line per pair, newline separated.
    pub fn render(&self) -> String {
        self.totals
            .iter()
            .map(|((name, unit), total)| format!("{} ({}) — {}", name, unit, total))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, unit: &str, amount: i64) -> CartLine {
        CartLine {
            name: name.to_string(),
            unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn test_sums_across_recipes() {
        let list = ShoppingList::aggregate(vec![
            line("flour", "g", 200),
            line("milk", "ml", 250),
            line("flour", "g", 300),
        ]);

        assert_eq!(list.len(), 2);
        assert_eq!(list.total("flour", "g"), Some(500));
        assert_eq!(list.render(), "flour (g) — 500\nmilk (ml) — 250");
    }

    #[test]
    fn test_units_are_kept_apart() {
        let list = ShoppingList::aggregate(vec![line("sugar", "g", 50), line("sugar", "tbsp", 2)]);

        assert_eq!(list.total("sugar", "g"), Some(50));
        assert_eq!(list.total("sugar", "tbsp"), Some(2));
        assert_eq!(list.render(), "sugar (g) — 50\nsugar (tbsp) — 2");
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let list = ShoppingList::aggregate(vec![line("Salt", "g", 1), line("salt", "g", 2)]);
        assert_eq!(list.len(), 2);
        assert_eq!(list.total("salt", "g"), Some(2));
    }

    #[test]
    fn test_empty_cart_renders_nothing() {
        let list = ShoppingList::aggregate(Vec::new());
        assert!(list.is_empty());
        assert_eq!(list.render(), "");
        assert_eq!(list.total("flour", "g"), None);
    }
}
