use crate::files::discover_input_files;
use camino::Utf8PathBuf;
use color_eyre::eyre::Result;
use ip2api::errors::Ip2Error;
use ip2api::{JobStatus, SearchParams, Session, UploadOptions};

/// Upload spectra to a new experiment of the default project and search them.
pub fn search(
    session: &Session,
    name: String,
    database: &str,
    params: Vec<(String, String)>,
    options: UploadOptions,
    files: &[Utf8PathBuf],
) -> Result<()> {
    let all_files = discover_input_files(files)?;
    let database = session.get_database(database)?;
    let params: SearchParams = params.into_iter().collect();
    let (experiment, mut job) = session.search(name, &all_files, options, params, &database)?;
    println!("{}", experiment.link()?);
    print_status(just_submitted(job.update())?);
    Ok(())
}

/// Ask IP2 once about the search job of an experiment in the default project.
pub fn status(session: &Session, experiment: &str) -> Result<()> {
    let experiment = session.default_project()?.get_experiment(experiment)?;
    let mut job = experiment.job();
    print_status(job.update()?);
    Ok(())
}

pub fn dtaselect(session: &Session, project: &str, experiment: &str) -> Result<()> {
    let experiment = session.get_project(project)?.get_experiment(experiment)?;
    print!("{}", experiment.dtaselect()?);
    Ok(())
}

/// A job the job monitor does not list yet is still pending.
fn just_submitted(status: Result<JobStatus, Ip2Error>) -> Result<JobStatus, Ip2Error> {
    match status {
        Err(Ip2Error::NotFound { .. }) => Ok(JobStatus::Pending),
        other => other,
    }
}

fn print_status(status: JobStatus) {
    match status {
        JobStatus::Pending => println!("pending"),
        JobStatus::Running { progress } => println!("running ({:.1}%)", progress),
        JobStatus::Finished { progress } => println!("finished ({:.1}%)", progress),
    }
}

/// Parse a `key=value` search form field.
pub fn parse_param(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got \"{}\"", arg)),
    }
}
