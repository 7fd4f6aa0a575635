//! Dependency ordering over the touched tables.

use crate::error::{CoreError, CoreResult};
use crate::persist::EntitySchema;
use std::collections::HashMap;

/// Which way foreign-key dependencies point for the operation at hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OrderDirection {
    /// Create/Insert/Update: referenced tables come before their
    /// referencers.
    Construct,
    /// Delete: direction is derived per foreign key from its declared
    /// delete behavior. A blocking key (`Restrict`) orders the referencing
    /// table first; a non-blocking key (`Cascade`/`SetNull`) mirrors the
    /// construct order.
    Demolish,
}

/// Computes one execution order over every table the given schemas
/// declare.
///
/// The order is a topological sort of the foreign-key graph; ties are
/// broken by schema declaration order (principal before its relation
/// tables, registration order across entities), so command order is
/// deterministic.
pub(crate) fn table_order<'a>(
    schemas: impl Iterator<Item = &'a EntitySchema>,
    direction: OrderDirection,
) -> CoreResult<Vec<String>> {
    // Collect tables in declaration order.
    let mut names: Vec<String> = Vec::new();
    let mut fks: Vec<(String, String, bool)> = Vec::new(); // (referencer, referenced, blocking)
    for schema in schemas {
        for table in schema.tables() {
            names.push(table.name.clone());
            for fk in table.foreign_keys() {
                fks.push((
                    table.name.clone(),
                    fk.table.clone(),
                    fk.on_delete.is_blocking(),
                ));
            }
        }
    }

    let index: HashMap<&str, usize> = names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    // edges[a] contains b  <=>  a must execute before b
    let mut edges: Vec<Vec<usize>> = vec![Vec::new(); names.len()];
    let mut in_degree = vec![0usize; names.len()];
    for (referencer, referenced, blocking) in &fks {
        let (Some(&from), Some(&to)) = (index.get(referencer.as_str()), index.get(referenced.as_str()))
        else {
            // A foreign key may point at a table outside the registry
            // (managed elsewhere); it cannot constrain the order.
            continue;
        };
        let (before, after) = match direction {
            OrderDirection::Construct => (to, from),
            OrderDirection::Demolish if *blocking => (from, to),
            OrderDirection::Demolish => (to, from),
        };
        edges[before].push(after);
        in_degree[after] += 1;
    }

    // Kahn's algorithm, always taking the lowest-index ready node so the
    // declaration order is the tie-break.
    let mut ready: Vec<usize> = (0..names.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(names.len());
    while let Some(position) = ready.iter().enumerate().min_by_key(|(_, &i)| i).map(|(p, _)| p) {
        let node = ready.swap_remove(position);
        order.push(names[node].clone());
        for &next in &edges[node] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push(next);
            }
        }
    }

    if order.len() != names.len() {
        let stuck = (0..names.len())
            .find(|&i| in_degree[i] > 0)
            .map_or_else(String::new, |i| names[i].clone());
        return Err(CoreError::CyclicReference { table: stuck });
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::{RelationKind, RelationTable};
    use relstore_model::{ColumnSchema, DeleteBehavior, TableSchema, ValueType};

    fn authors() -> EntitySchema {
        let principal = TableSchema::new(
            "authors",
            vec![
                ColumnSchema::new("id", ValueType::Uuid),
                ColumnSchema::new("name", ValueType::Text),
            ],
            1,
        );
        let aliases = TableSchema::new(
            "author_aliases",
            vec![
                ColumnSchema::new("author_id", ValueType::Uuid)
                    .references("authors", DeleteBehavior::Restrict),
                ColumnSchema::new("alias", ValueType::Text),
            ],
            2,
        );
        EntitySchema::new(
            "Author",
            principal,
            vec![RelationTable::new(aliases, RelationKind::Set)],
        )
    }

    fn books() -> EntitySchema {
        let principal = TableSchema::new(
            "books",
            vec![
                ColumnSchema::new("id", ValueType::Uuid),
                ColumnSchema::new("title", ValueType::Text),
                ColumnSchema::new("author_id", ValueType::Uuid)
                    .references("authors", DeleteBehavior::Cascade),
            ],
            1,
        );
        let tags = TableSchema::new(
            "book_tags",
            vec![
                ColumnSchema::new("book_id", ValueType::Uuid)
                    .references("books", DeleteBehavior::Restrict),
                ColumnSchema::new("tag", ValueType::Text),
            ],
            2,
        );
        EntitySchema::new(
            "Book",
            principal,
            vec![RelationTable::new(tags, RelationKind::List)],
        )
    }

    #[test]
    fn construct_orders_referenced_first() {
        // Register books before authors to prove the FK wins over
        // declaration order.
        let schemas = [books(), authors()];
        let order = table_order(schemas.iter(), OrderDirection::Construct).unwrap();
        let pos = |name: &str| order.iter().position(|n| n == name).unwrap();
        assert!(pos("authors") < pos("books"));
        assert!(pos("books") < pos("book_tags"));
        assert!(pos("authors") < pos("author_aliases"));
    }

    #[test]
    fn demolish_orders_blocking_children_first() {
        let schemas = [authors(), books()];
        let order = table_order(schemas.iter(), OrderDirection::Demolish).unwrap();
        let pos = |name: &str| order.iter().position(|n| n == name).unwrap();
        // Relation tables (Restrict) go before their principals.
        assert!(pos("book_tags") < pos("books"));
        assert!(pos("author_aliases") < pos("authors"));
        // The Cascade entity reference mirrors the construct order.
        assert!(pos("authors") < pos("books"));
    }

    #[test]
    fn declaration_order_breaks_ties() {
        let schemas = [authors(), books()];
        let order = table_order(schemas.iter(), OrderDirection::Construct).unwrap();
        assert_eq!(order[0], "authors");
    }

    #[test]
    fn cycle_is_detected() {
        let a = EntitySchema::new(
            "A",
            TableSchema::new(
                "a",
                vec![ColumnSchema::new("id", ValueType::Integer)
                    .references("b", DeleteBehavior::Restrict)],
                1,
            ),
            Vec::new(),
        );
        let b = EntitySchema::new(
            "B",
            TableSchema::new(
                "b",
                vec![ColumnSchema::new("id", ValueType::Integer)
                    .references("a", DeleteBehavior::Restrict)],
                1,
            ),
            Vec::new(),
        );
        let schemas = [a, b];
        let result = table_order(schemas.iter(), OrderDirection::Construct);
        assert!(matches!(result, Err(CoreError::CyclicReference { .. })));
    }

    #[test]
    fn external_references_are_ignored() {
        let schemas = [books()];
        // books references authors, which is not registered here.
        let order = table_order(schemas.iter(), OrderDirection::Construct).unwrap();
        assert_eq!(order, vec!["books".to_owned(), "book_tags".to_owned()]);
    }
}
