// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::schema::FieldSpec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnState {
    pub name: &'static str,
    pub alias: Option<&'static str>,
    pub visible: bool,
}

/// Which fields of one entity are shown. The field set and its order are
/// fixed at construction; only visibility changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnVisibilityModel {
    columns: Vec<ColumnState>,
}

impl ColumnVisibilityModel {
    pub fn new(fields: &[FieldSpec]) -> Self {
        Self {
            columns: fields
                .iter()
                .map(|field| ColumnState {
                    name: field.name,
                    alias: field.alias,
                    visible: field.default_visible,
                })
                .collect(),
        }
    }

    /// Flips one column and returns its new visibility, or `None` when the
    /// field is not part of this model.
    pub fn toggle(&mut self, field: &str) -> Option<bool> {
        let column = self.columns.iter_mut().find(|column| column.name == field)?;
        column.visible = !column.visible;
        Some(column.visible)
    }

    pub fn is_visible(&self, field: &str) -> bool {
        self.columns
            .iter()
            .any(|column| column.name == field && column.visible)
    }

    pub fn visible_fields(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|column| column.visible)
            .map(|column| column.name)
            .collect()
    }

    pub fn label<'a>(&self, field: &'a str) -> &'a str {
        self.columns
            .iter()
            .find(|column| column.name == field)
            .and_then(|column| column.alias)
            .unwrap_or(field)
    }

    pub fn columns(&self) -> &[ColumnState] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
