use crate::constants::endpoints;
use crate::dwr::{self, DwrCall, DwrObject};
use crate::errors::Ip2Error;
use crate::transport::{HttpTransport, Transport};
use crate::types::*;
use crate::Session;
use log::debug;
use std::collections::BTreeMap;
use std::fmt;

/// State of a search job, as last seen by [Job::update].
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum JobStatus {
    /// Submitted, but not looked at since.
    Pending,
    Running { progress: f64 },
    Finished { progress: f64 },
}

/// A search job of an experiment.
///
/// IP2 does not say when a job changes, so its status is only ever as recent
/// as the last call to [Job::update].
pub struct Job<'s, T: Transport = HttpTransport> {
    session: &'s Session<T>,
    dataset: ExperimentName,
    id: Option<JobId>,
    status: JobStatus,
    info: BTreeMap<String, String>,
}

impl<'s, T: Transport> Job<'s, T> {
    pub(crate) fn new(session: &'s Session<T>, dataset: ExperimentName) -> Self {
        Self {
            session,
            dataset,
            id: None,
            status: JobStatus::Pending,
            info: Default::default(),
        }
    }

    /// Name of the experiment which is being searched.
    pub fn dataset(&self) -> &ExperimentName {
        &self.dataset
    }

    /// Job ID, known after the first successful [Job::update].
    pub fn id(&self) -> Option<JobId> {
        self.id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, JobStatus::Finished { .. })
    }

    /// Everything the job monitor said about this job the last time.
    pub fn info(&self) -> &BTreeMap<String, String> {
        &self.info
    }

    /// Ask the IP2 job monitor about this job.
    pub fn update(&mut self) -> Result<JobStatus, Ip2Error> {
        let call = DwrCall {
            endpoint: endpoints::JOB_STATUS,
            page: endpoints::JOB_STATUS_PAGE.to_string(),
            script: "JobMonitor",
            method: "getSearchJobStatus",
            args: vec![],
        };
        let page = self.session.dwr(&call)?;
        let object = dwr::objects(&page.text)
            .into_iter()
            .find(|o| o.get("sampleName") == Some(self.dataset.as_str()))
            .ok_or_else(|| Ip2Error::not_found("search job", &self.dataset))?;
        let status = read_status(&object).ok_or_else(|| Ip2Error::malformed("job status", &page.url))?;
        if self.id.is_none() {
            self.id = object.get("jobId").and_then(|id| id.parse().ok()).map(JobId);
        }
        self.status = status;
        self.info = object.fields;
        debug!("{:?}", self);
        Ok(status)
    }
}

fn read_status(object: &DwrObject) -> Option<JobStatus> {
    let finished = parse_bool(object.get("finished")?)?;
    let progress = object.get("progress")?.trim().parse().ok()?;
    let status = if finished {
        JobStatus::Finished { progress }
    } else {
        JobStatus::Running { progress }
    };
    Some(status)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Some(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl<T: Transport> fmt::Debug for Job<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("dataset", &self.dataset)
            .field("id", &self.id)
            .field("status", &self.status)
            .finish()
    }
}
