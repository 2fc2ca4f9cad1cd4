use color_eyre::eyre::{bail, Result};
use ip2api::Session;

/// Walk through the basic operations of IP2, printing what is found.
pub fn check(session: &Session) -> Result<()> {
    if !session.is_logged_in()? {
        bail!("Logged in, but IP2 does not consider this session to be logged in.");
    }
    println!("Logged into {} as \"{}\"", session.url(), session.username());

    let project = session.default_project()?;
    println!("Default project: {} (ID {})", project.name, project.id.0);
    let experiment = session.helper_experiment()?;
    println!("Helper experiment: {} (ID {})", experiment.name, experiment.id.0);
    println!("    path: {}", experiment.path()?);
    println!("    link: {}", experiment.link()?);

    println!("Instruments: {}", session.instruments()?.len());
    println!("Organisms: {}", session.organisms()?.len());

    Ok(())
}
