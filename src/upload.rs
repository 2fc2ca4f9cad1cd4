use crate::files::discover_input_files;
use camino::Utf8PathBuf;
use color_eyre::eyre::{Context, Result};
use ip2api::{Session, UploadOptions};

/// Upload local files and directories to an experiment.
pub fn upload(
    session: &Session,
    project: &str,
    experiment: &str,
    files: &[Utf8PathBuf],
    convert: bool,
    monoisotopic: bool,
) -> Result<()> {
    let all_files = discover_input_files(files)?;
    let experiment = session.get_project(project)?.get_experiment(experiment)?;
    let options = UploadOptions {
        convert,
        monoisotopic,
    };
    for file in all_files {
        experiment
            .upload_file(&file, options)
            .wrap_err_with(|| format!("Failed to upload {}", file))?;
        println!("{}", file);
    }
    Ok(())
}
