// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Table and JSON rendering for CLI results.

use std::collections::BTreeSet;

use anyhow::Result;
use comfy_table::Table;
use maskperm_core::{Catalogue, GroupId, Overview, ReconcileReport};
use serde::Serialize;

#[derive(Serialize)]
struct GroupStatusJson {
    group: GroupId,
    needs_update: bool,
}

#[derive(Serialize)]
struct SelectionRow<'a> {
    identifier: &'a str,
    label: &'a str,
    selected: bool,
}

#[derive(Serialize)]
struct SelectionJson<'a> {
    group: GroupId,
    elements: Vec<SelectionRow<'a>>,
}

fn mark(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Chooses between human tables and JSON.
pub(crate) struct Output {
    json: bool,
}

impl Output {
    pub(crate) fn new(json: bool) -> Self {
        Self { json }
    }

    fn emit_json<T: Serialize>(value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    pub(crate) fn group_status(&self, group: GroupId, needs_update: bool) -> Result<()> {
        if self.json {
            return Self::emit_json(&GroupStatusJson {
                group,
                needs_update,
            });
        }
        if needs_update {
            println!("Group {group} needs an update.");
        } else {
            println!("Group {group} is up to date.");
        }
        Ok(())
    }

    pub(crate) fn overview(&self, overview: &Overview) -> Result<()> {
        if self.json {
            return Self::emit_json(overview);
        }
        let mut table = Table::new();
        table.set_header(vec!["Group", "Title", "Needs update"]);
        for status in &overview.groups {
            table.add_row(vec![
                status.id.to_string(),
                status.title.clone(),
                mark(status.needs_update).to_owned(),
            ]);
        }
        println!("{table}");
        if overview.can_update_all {
            println!("Update all: available");
        } else {
            println!("Update all: nothing to do");
        }
        Ok(())
    }

    pub(crate) fn report(&self, report: &ReconcileReport, ok: &str, failed: &str) -> Result<()> {
        if self.json {
            return Self::emit_json(report);
        }
        if report.is_success() {
            println!("{ok}");
        } else {
            eprintln!("{failed}");
            for failure in &report.failed {
                eprintln!("  group {}: {}", failure.group, failure.reason);
            }
        }
        Ok(())
    }

    pub(crate) fn selection(
        &self,
        group: GroupId,
        types: &Catalogue,
        selected: &BTreeSet<String>,
    ) -> Result<()> {
        let mut rows: Vec<SelectionRow<'_>> = types
            .entries()
            .iter()
            .map(|e| SelectionRow {
                identifier: &e.identifier,
                label: &e.label,
                selected: selected.contains(&e.identifier),
            })
            .collect();
        // Enabled elements that have since left the catalogue.
        let known: BTreeSet<&str> = types.identifiers().collect();
        rows.extend(
            selected
                .iter()
                .filter(|id| !known.contains(id.as_str()))
                .map(|id| SelectionRow {
                    identifier: id,
                    label: "(not in catalogue)",
                    selected: true,
                }),
        );
        if self.json {
            return Self::emit_json(&SelectionJson {
                group,
                elements: rows,
            });
        }
        let mut table = Table::new();
        table.set_header(vec!["Element", "Label", "Enabled"]);
        for row in &rows {
            table.add_row(vec![row.identifier, row.label, mark(row.selected)]);
        }
        println!("{table}");
        Ok(())
    }

    pub(crate) fn types(&self, types: &Catalogue) -> Result<()> {
        if self.json {
            return Self::emit_json(&types.entries());
        }
        let mut table = Table::new();
        table.set_header(vec!["Element", "Label"]);
        for entry in types.entries() {
            table.add_row(vec![entry.identifier.as_str(), entry.label.as_str()]);
        }
        println!("{table}");
        Ok(())
    }
}
