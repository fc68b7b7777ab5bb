//! Snapshot loading and migration file output.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use automigrate_core::{MigrationResult, Snapshot};

/// Reads a JSON snapshot (an array of table descriptors).
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))?;
    debug!(path = %path.display(), tables = snapshot.tables().len(), "snapshot loaded");
    Ok(snapshot)
}

/// Renders statements as a SQL script: one per line, terminated by `;`.
/// Comment lines are left unterminated.
pub fn render_sql(statements: &[String]) -> String {
    let mut out = String::new();
    for statement in statements {
        out.push_str(statement);
        if !statement.starts_with("--") {
            out.push(';');
        }
        out.push('\n');
    }
    out
}

/// Normalizes a migration name into a file-name slug.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}

/// Builds the `.up.sql` and `.down.sql` paths for a migration.
pub fn migration_paths(dir: &Path, slug: &str, at: DateTime<Utc>) -> (PathBuf, PathBuf) {
    let stem = format!("{}_{slug}", at.format("%Y%m%d%H%M%S"));
    (
        dir.join(format!("{stem}.up.sql")),
        dir.join(format!("{stem}.down.sql")),
    )
}

/// Writes the up/down scripts of `result` into `dir`.
///
/// Returns `None` without touching the filesystem when there are no
/// changes. Existing files are never overwritten.
pub fn write_migration(
    dir: &Path,
    name: &str,
    result: &MigrationResult,
    at: DateTime<Utc>,
) -> Result<Option<(PathBuf, PathBuf)>> {
    if !result.has_changes {
        info!("No changes detected, nothing written.");
        return Ok(None);
    }

    let slug = slugify(name);
    if slug.is_empty() {
        bail!("migration name {name:?} has no usable characters");
    }

    let (up_path, down_path) = migration_paths(dir, &slug, at);
    for path in [&up_path, &down_path] {
        if path.exists() {
            bail!("refusing to overwrite existing file {}", path.display());
        }
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create migrations directory {}", dir.display()))?;
    fs::write(&up_path, render_sql(&result.up_statements))
        .with_context(|| format!("failed to write {}", up_path.display()))?;
    fs::write(&down_path, render_sql(&result.down_statements))
        .with_context(|| format!("failed to write {}", down_path.display()))?;

    info!("Created migration: {}", up_path.display());
    info!("Created migration: {}", down_path.display());
    Ok(Some((up_path, down_path)))
}
