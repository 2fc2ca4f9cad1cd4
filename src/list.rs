//! Listings and creation of things on IP2.

use color_eyre::eyre::Result;
use ip2api::{NewExperiment, Session};

pub fn projects(session: &Session) -> Result<()> {
    for project in session.projects()? {
        println!("{}\t{}", project.id.0, project.name);
    }
    Ok(())
}

pub fn experiments(session: &Session, project: &str) -> Result<()> {
    for experiment in session.get_project(project)?.experiments()? {
        println!("{}\t{}", experiment.id.0, experiment.name);
    }
    Ok(())
}

pub fn databases(session: &Session) -> Result<()> {
    for database in session.databases()? {
        println!(
            "{}\t{}\t{}\t{}",
            database.id.0, database.username, database.organism, database.file
        );
    }
    Ok(())
}

pub fn instruments(session: &Session) -> Result<()> {
    for instrument in session.instruments()? {
        println!("{}\t{}", instrument.id.0, instrument.name);
    }
    Ok(())
}

pub fn organisms(session: &Session) -> Result<()> {
    for organism in session.organisms()? {
        println!("{}", organism.name);
    }
    Ok(())
}

pub fn create_project(session: &Session, name: &str, description: &str) -> Result<()> {
    let project = session.create_project(name, description)?;
    println!("{}\t{}", project.id.0, project.name);
    Ok(())
}

pub fn create_experiment(session: &Session, project: &str, name: &str, description: String) -> Result<()> {
    let new = NewExperiment::new(name).description(description);
    let experiment = session.get_project(project)?.add_experiment(new)?;
    println!("{}\t{}", experiment.id.0, experiment.link()?);
    Ok(())
}
