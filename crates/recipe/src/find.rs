// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recipe file discovery

use crate::model::Recipe;
use crate::parser::{parse_recipe_file, Format};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from recipe directory scanning
#[derive(Debug, Error)]
pub enum FindError {
    #[error("recipe `{0}` defined in multiple files; rename one")]
    Duplicate(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Recursively collect recipe files (`.yaml`, `.yml`, `.toml`, `.json`)
/// under `dir`.
pub fn collect_recipe_files(dir: &Path) -> Result<Vec<(PathBuf, Format)>, std::io::Error> {
    let mut files = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in std::fs::read_dir(&current)?.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if let Some(format) = Format::for_path(&path) {
                files.push((path, format));
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Find the recipe whose `name` field (not filename) equals `name`.
///
/// Returns the recipe and its source path. Unparseable files are skipped
/// with a warning; defining the same name twice is an error.
pub fn find_recipe_by_name(
    recipe_dir: &Path,
    name: &str,
) -> Result<Option<(Recipe, PathBuf)>, FindError> {
    if !recipe_dir.exists() {
        return Ok(None);
    }
    let mut found: Option<(Recipe, PathBuf)> = None;
    for (path, _format) in collect_recipe_files(recipe_dir)? {
        let recipe = match parse_recipe_file(&path) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping invalid recipe");
                continue;
            }
        };
        if recipe.name == name {
            if found.is_some() {
                return Err(FindError::Duplicate(name.to_string()));
            }
            found = Some((recipe, path));
        }
    }
    Ok(found)
}

/// Collect every parseable recipe under `recipe_dir`, sorted by name.
///
/// Unparseable files are skipped with a warning so one broken recipe
/// doesn't hide the rest.
pub fn collect_all_recipes(recipe_dir: &Path) -> Result<Vec<(Recipe, PathBuf)>, FindError> {
    if !recipe_dir.exists() {
        return Ok(Vec::new());
    }
    let mut recipes = Vec::new();
    for (path, _format) in collect_recipe_files(recipe_dir)? {
        match parse_recipe_file(&path) {
            Ok(recipe) => recipes.push((recipe, path)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping invalid recipe");
            }
        }
    }
    recipes.sort_by(|a, b| a.0.name.cmp(&b.0.name));
    Ok(recipes)
}

#[cfg(test)]
#[path = "find_tests.rs"]
mod tests;
