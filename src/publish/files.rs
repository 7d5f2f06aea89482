use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use walkdir::{DirEntry, WalkDir};

fn is_dotfile(entry: &DirEntry) -> bool {
    entry.file_name().as_encoded_bytes().starts_with(b".")
}

fn is_git_dir(entry: &DirEntry) -> bool {
    entry.file_name() == ".git"
}

pub fn collect(source: &Path, dotfiles: bool) -> Result<Vec<PathBuf>> {
    if !source.is_dir() {
        bail!("Source directory {:?} does not exist", source);
    }

    let mut files = vec![];
    let walker = WalkDir::new(source)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !(is_git_dir(e) || (!dotfiles && is_dotfile(e))));

    for entry in walker {
        let entry = entry.with_context(|| format!("Walking {:?}", source))?;
        if !entry.file_type().is_file() {
            continue;
        }

        files.push(entry.path().strip_prefix(source)?.to_path_buf());
    }

    if files.is_empty() {
        bail!("No files to publish in {:?}", source);
    }

    Ok(files)
}

pub fn copy(source: &Path, target: &Path, files: &[PathBuf]) -> Result<()> {
    for file in files {
        let to = target.join(file);
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(source.join(file), &to)
            .with_context(|| format!("Copying {:?} to {:?}", file, to))?;
    }

    Ok(())
}

// Leaves the repository's own `.git` in place.
pub fn clear(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name() == ".git" {
            continue;
        }

        let path = entry.path();
        if entry.file_type()?.is_dir() {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        }
        .with_context(|| format!("Removing {:?}", path))?;
    }

    Ok(())
}
