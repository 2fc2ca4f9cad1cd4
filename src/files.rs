use camino::{Utf8Path, Utf8PathBuf};
use color_eyre::eyre::{bail, Result};

/// Given a list of files and directories, traverse every directory
/// to obtain just a list of files, sorted within each directory.
/// Produces Err if any paths are invalid.
pub fn discover_input_files(paths: &[Utf8PathBuf]) -> Result<Vec<Utf8PathBuf>> {
    let mut all_files = Vec::new();
    for path in paths {
        all_files.append(&mut files_under(path)?);
    }
    Ok(all_files)
}

/// Get all files under a path, whether the given path is a file or directory.
fn files_under(path: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        bail!("File not found: {:?}", path);
    }

    let mut entries = fs_err::read_dir(path)?
        .map(|entry| {
            let entry = entry?;
            Utf8PathBuf::from_path_buf(entry.path())
                .map_err(|p| color_eyre::eyre::eyre!("Path is not valid UTF-8: {:?}", p))
        })
        .collect::<Result<Vec<_>>>()?;
    entries.sort();

    let mut sub_files = Vec::new();
    for sub_path in entries {
        if sub_path.is_file() {
            sub_files.push(sub_path)
        } else if sub_path.is_dir() {
            sub_files.append(&mut files_under(&sub_path)?);
        }
    }
    Ok(sub_files)
}
