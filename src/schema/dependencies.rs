use super::types::TableDef;
use crate::error::{Result, SchemaError, Violation};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// Foreign key graph over a set of tables, keyed by position in the input
struct DependencyGraph<'a> {
    tables: &'a [TableDef],
    /// Table index -> tables it still depends on
    deps: Vec<HashSet<usize>>,
    /// Table index -> tables that depend on it, in input order
    reverse_deps: Vec<BTreeSet<usize>>,
}

impl<'a> DependencyGraph<'a> {
    fn build(tables: &'a [TableDef], ignore_refs: &HashSet<String>) -> Result<Self> {
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(tables.len());
        for (i, table) in tables.iter().enumerate() {
            if index.insert(table.name.as_str(), i).is_some() {
                return Err(SchemaError::DuplicateTable {
                    name: table.name.clone(),
                });
            }
        }

        let mut deps = vec![HashSet::new(); tables.len()];
        let mut reverse_deps = vec![BTreeSet::new(); tables.len()];
        let mut missing: Vec<(usize, BTreeSet<String>)> = Vec::new();

        for (i, table) in tables.iter().enumerate() {
            for (col, raw) in table.foreign_keys() {
                let fk = table.foreign_key_ref(col, raw)?;

                let ignored = ignore_refs.contains(raw);

                match index.get(fk.table) {
                    // An ignored self-reference orders nothing
                    Some(&target) if ignored && target == i => {}
                    Some(&target) => {
                        deps[i].insert(target);
                        reverse_deps[target].insert(i);
                    }
                    None if ignored => {}
                    None => match missing.last_mut() {
                        Some((last, names)) if *last == i => {
                            names.insert(fk.table.to_string());
                        }
                        _ => missing.push((i, BTreeSet::from([fk.table.to_string()]))),
                    },
                }
            }
        }

        if !missing.is_empty() {
            return Err(SchemaError::MissingReferences(
                missing
                    .into_iter()
                    .map(|(i, names)| Violation {
                        table: tables[i].name.clone(),
                        details: names.into_iter().collect(),
                    })
                    .collect(),
            ));
        }

        Ok(Self {
            tables,
            deps,
            reverse_deps,
        })
    }

    /// Kahn's algorithm; ties are released in input order
    fn sort(mut self) -> Result<Vec<&'a TableDef>> {
        let tables = self.tables;
        let mut result = Vec::with_capacity(tables.len());
        let mut ready: VecDeque<usize> = (0..tables.len())
            .filter(|&i| self.deps[i].is_empty())
            .collect();

        while let Some(i) = ready.pop_front() {
            result.push(&tables[i]);

            for &dependent in &self.reverse_deps[i] {
                let pending = &mut self.deps[dependent];
                if pending.remove(&i) && pending.is_empty() {
                    ready.push_back(dependent);
                }
            }
        }

        if result.len() < tables.len() {
            let stuck = self
                .deps
                .iter()
                .enumerate()
                .filter(|(_, pending)| !pending.is_empty())
                .map(|(i, pending)| {
                    let names: BTreeSet<&str> = pending
                        .iter()
                        .map(|&d| tables[d].name.as_str())
                        .collect();
                    Violation {
                        table: tables[i].name.clone(),
                        details: names.into_iter().map(String::from).collect(),
                    }
                })
                .collect();
            return Err(SchemaError::Cycle(stuck));
        }

        Ok(result)
    }
}

/// Order tables so every table comes after the tables it references.
///
/// References listed in `ignore_refs` (exact `"table.column"`) never count as
/// missing. When the listed table is present they still order it first, except
/// for a table referencing itself, which is how hierarchies are admitted.
/// Fails on malformed foreign keys, duplicate table names, references to
/// absent tables, and cycles (unlisted self-references included).
pub fn sort_tables_by_dependency<'a>(
    tables: &'a [TableDef],
    ignore_refs: &HashSet<String>,
) -> Result<Vec<&'a TableDef>> {
    DependencyGraph::build(tables, ignore_refs)?.sort()
}
