use crate::constants::endpoints;
use crate::errors::Ip2Error;
use crate::html;
use crate::models::NewExperiment;
use crate::transport::{HttpTransport, Transport};
use crate::types::*;
use crate::{Experiment, Session};
use log::{info, warn};
use std::fmt;

/// A project on IP2, which contains experiments.
pub struct Project<'s, T: Transport = HttpTransport> {
    session: &'s Session<T>,
    pub id: ProjectId,
    pub name: ProjectName,
}

impl<'s, T: Transport> Project<'s, T> {
    pub(crate) fn new(session: &'s Session<T>, id: ProjectId, name: ProjectName) -> Self {
        Self { session, id, name }
    }

    pub fn session(&self) -> &'s Session<T> {
        self.session
    }

    /// List the experiments of this project.
    pub fn experiments(&self) -> Result<Vec<Experiment<'s, T>>, Ip2Error> {
        let query = [
            ("pid", self.id.0.to_string()),
            ("projectName", self.name.to_string()),
        ];
        let page = self.session.get(endpoints::EXPERIMENT_LIST, &query)?;
        let experiments = html::experiments(&page)?
            .into_iter()
            .map(|(id, name)| Experiment::new(self.clone(), id, name))
            .collect();
        Ok(experiments)
    }

    /// Get an experiment of this project by name. If several experiments
    /// have the same name, the one listed last is returned.
    pub fn get_experiment(&self, name: &str) -> Result<Experiment<'s, T>, Ip2Error> {
        let mut found: Vec<_> = self
            .experiments()?
            .into_iter()
            .filter(|e| e.name.as_str() == name)
            .collect();
        if found.len() > 1 {
            warn!(
                "Multiple experiments found with the name \"{}\" in project \"{}\"",
                name, self.name
            );
        }
        found.pop().ok_or_else(|| Ip2Error::not_found("experiment", name))
    }

    /// Create an experiment in this project. Experiment names must be unique
    /// within a project.
    pub fn add_experiment(&self, experiment: NewExperiment) -> Result<Experiment<'s, T>, Ip2Error> {
        let name = experiment.name.as_str();
        if self.experiments()?.iter().any(|e| e.name.as_str() == name) {
            return Err(Ip2Error::AlreadyExists {
                kind: "experiment",
                name: name.to_string(),
                parent: format!("project \"{}\"", self.name),
            });
        }
        let date = experiment.date;
        let form = [
            ("pid", self.id.0.to_string()),
            ("projectName", self.name.to_string()),
            ("sampleName", name.to_string()),
            ("sampleDescription", experiment.sample_description.clone()),
            ("instrumentId", experiment.instrument.0.to_string()),
            ("month", u8::from(date.month()).to_string()),
            ("date", date.day().to_string()),
            ("year", date.year().to_string()),
            ("description", experiment.description.clone()),
        ];
        self.session.post(endpoints::ADD_EXPERIMENT, &form)?;
        info!("Created experiment \"{}\" in project \"{}\"", name, self.name);
        self.get_experiment(name)
    }

    /// Delete this project and everything in it.
    pub fn delete(self) -> Result<(), Ip2Error> {
        let form = [("pid", self.id.0.to_string()), ("delete", "true".to_string())];
        self.session.post(endpoints::DELETE_PROJECT, &form)?;
        info!("Deleted project \"{}\"", self.name);
        Ok(())
    }
}

impl<T: Transport> Clone for Project<'_, T> {
    fn clone(&self) -> Self {
        Self {
            session: self.session,
            id: self.id,
            name: self.name.clone(),
        }
    }
}

impl<T: Transport> fmt::Debug for Project<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}
