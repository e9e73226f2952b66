//! Everything one export run needs: input, both output paths and the
//! validated filter/report settings.

use std::fs;
use std::path::{Component, Path, PathBuf};

use super::filter::FilterConfig;
use crate::error::{FilterError, Result};
use crate::report::OutputConfig;

/// Suffix appended to the table's file stem when no alignment path is given.
pub const ALIGNMENT_SUFFIX: &str = "ali.txt";

#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub input: PathBuf,
    pub table_out: PathBuf,
    pub alignment_out: PathBuf,
    pub filter: FilterConfig,
    pub output: OutputConfig,
}

impl ExportRequest {
    /// Build a request, deriving the alignment path from the table path when
    /// `alignment_out` is `None`.
    ///
    /// The three paths must name distinct files: writing both reports into one
    /// file, or over the input, is rejected here before anything is opened.
    /// Paths are compared after [`resolve_path`], so `a/../out.csv`, an absolute
    /// spelling or a symlink to an existing file count as the same file.
    pub fn new(
        input: PathBuf,
        table_out: PathBuf,
        alignment_out: Option<PathBuf>,
        filter: FilterConfig,
        output: OutputConfig,
    ) -> Result<Self> {
        let alignment_out = match alignment_out {
            Some(path) => path,
            None => default_alignment_path(&table_out)?,
        };

        let input_file = resolve_path(&input)?;
        let table_file = resolve_path(&table_out)?;
        let alignment_file = resolve_path(&alignment_out)?;

        if table_file == alignment_file {
            return Err(FilterError::config(format!(
                "table and alignment outputs are the same file: {}",
                table_out.display()
            )));
        }
        for out in [&table_file, &alignment_file] {
            if *out == input_file {
                return Err(FilterError::config(format!(
                    "output would overwrite the input file: {}",
                    input.display()
                )));
            }
        }
        output.validate()?;

        Ok(Self {
            input,
            table_out,
            alignment_out,
            filter,
            output,
        })
    }
}

/// `hits.csv` -> `hits.ali.txt`, next to the table.
///
/// Up to two extensions are dropped, so `hits.filtered.csv` also becomes
/// `hits.ali.txt`.
pub fn default_alignment_path(table_out: &Path) -> Result<PathBuf> {
    let stem = table_out.file_stem().ok_or_else(|| {
        FilterError::config(format!(
            "cannot derive an alignment file name from {}",
            table_out.display()
        ))
    })?;
    let stem = Path::new(stem).file_stem().unwrap_or(stem);
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(ALIGNMENT_SUFFIX);
    Ok(table_out.with_file_name(name))
}

/// The file `path` refers to, as an absolute path.
///
/// Existing files are canonicalized. For a file that does not exist yet the
/// parent directory is canonicalized and the file name appended; when even the
/// parent is missing, `.` and `..` are folded lexically.
pub fn resolve_path(path: &Path) -> Result<PathBuf> {
    if let Ok(file) = fs::canonicalize(path) {
        return Ok(file);
    }
    if let Some(file) = canonical_parent_join(path) {
        return Ok(file);
    }

    let absolute = normalize_lexically(&std::env::current_dir()?.join(path));
    if let Ok(file) = fs::canonicalize(&absolute) {
        return Ok(file);
    }
    Ok(canonical_parent_join(&absolute).unwrap_or(absolute))
}

fn canonical_parent_join(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::canonicalize(parent).ok().map(|dir| dir.join(name))
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
