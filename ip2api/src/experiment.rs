use crate::constants::endpoints;
use crate::dwr::{self, DwrArg, DwrCall};
use crate::errors::{FileIOError, Ip2Error};
use crate::html;
use crate::models::{Database, SearchParams, UploadOptions};
use crate::transport::{HttpTransport, Page, Transport};
use crate::types::*;
use crate::{Job, Project};
use camino::Utf8Path;
use log::info;
use std::fmt;
use std::io;

/// An experiment on IP2. Spectra files are uploaded to experiments,
/// and searches are run on them.
pub struct Experiment<'s, T: Transport = HttpTransport> {
    project: Project<'s, T>,
    pub id: ExperimentId,
    pub name: ExperimentName,
}

impl<'s, T: Transport> Experiment<'s, T> {
    pub(crate) fn new(project: Project<'s, T>, id: ExperimentId, name: ExperimentName) -> Self {
        Self { project, id, name }
    }

    /// The project this experiment belongs to.
    pub fn project(&self) -> &Project<'s, T> {
        &self.project
    }

    /// Server-side directory of this experiment's files.
    pub fn path(&self) -> Result<ExperimentPath, Ip2Error> {
        html::experiment_path(&self.page()?)
    }

    /// Address of the web page of this experiment.
    pub fn link(&self) -> Result<url::Url, Ip2Error> {
        let mut link = self
            .project
            .session()
            .url()
            .join(endpoints::EXPERIMENT)
            .map_err(|_| Ip2Error::malformed("a valid link", endpoints::EXPERIMENT))?;
        link.query_pairs_mut()
            .append_pair("pid", &self.project.id.0.to_string())
            .append_pair("projectName", self.project.name.as_str())
            .append_pair("experimentId", &self.id.0.to_string());
        Ok(link)
    }

    /// Names of the spectra files of this experiment.
    pub fn files(&self) -> Result<Vec<String>, Ip2Error> {
        Ok(html::spectra_files(&self.page()?))
    }

    // ==================================================
    //                 FILES UPLOAD
    // ==================================================

    /// Upload a spectra file.
    pub fn upload_file(&self, file: impl AsRef<Utf8Path>, options: UploadOptions) -> Result<(), FileIOError> {
        let path = self.path()?;
        self.upload_to(&path, file.as_ref(), options)
    }

    /// Upload spectra files in order, stopping at the first failure.
    pub fn upload_files<P: AsRef<Utf8Path>>(&self, files: &[P], options: UploadOptions) -> Result<(), FileIOError> {
        let path = self.path()?;
        for file in files {
            self.upload_to(&path, file.as_ref(), options)?;
        }
        Ok(())
    }

    fn upload_to(&self, path: &ExperimentPath, file: &Utf8Path, options: UploadOptions) -> Result<(), FileIOError> {
        self.project
            .session()
            .upload_to(path.as_str(), file, "spectra", &options.flags())?;
        info!("Uploaded {} to experiment \"{}\"", file, self.name);
        Ok(())
    }

    /// Whether the copy of a local file on IP2 is intact, i.e. IP2 knows a file
    /// of the same name and MD5 hash in this experiment.
    pub fn check_file_md5(&self, file: impl AsRef<Utf8Path>) -> Result<bool, FileIOError> {
        let file = file.as_ref();
        let filename = file
            .file_name()
            .ok_or_else(|| FileIOError::PathError(file.to_string()))?;
        let md5 = file_md5(file)?;
        let call = DwrCall {
            endpoint: endpoints::SERVER_MD5,
            page: self.link()?.to_string(),
            script: "FileUploadAction",
            method: "getMd5ServerMd5Value",
            args: vec![
                DwrArg::Str(self.path()?.to_string()),
                DwrArg::Str(md5.clone()),
                DwrArg::Str(filename.to_string()),
            ],
        };
        let page = self.project.session().dwr(&call)?;
        Ok(page.text.contains(&md5))
    }

    /// Whether IP2 is done converting an uploaded `.raw` file.
    pub fn conversion_finished(&self, filename: &str) -> Result<bool, Ip2Error> {
        let call = DwrCall {
            endpoint: endpoints::CONVERTOR_STATUS,
            page: self.link()?.to_string(),
            script: "FileUploadAction",
            method: "checkRawConvertorStatus",
            args: vec![
                DwrArg::Str(filename.to_string()),
                DwrArg::Str(self.path()?.to_string()),
                DwrArg::Number(0),
                DwrArg::Str("ok".to_string()),
            ],
        };
        let page = self.project.session().dwr(&call)?;
        Ok(dwr::callback_value(&page.text).is_some_and(|status| status.contains("DONE")))
    }

    // ==================================================
    //                 SEARCH
    // ==================================================

    /// Start a ProLuCID search of this experiment's spectra against a database.
    pub fn prolucid_search(&self, params: SearchParams, database: &Database) -> Result<Job<'s, T>, Ip2Error> {
        let mut form: Vec<(&str, String)> = params
            .iter()
            .map(|(k, v)| (k, v.to_string()))
            .filter(|(k, _)| !SEARCH_IDENTITY.contains(k))
            .collect();
        form.extend([
            ("expId", self.id.0.to_string()),
            ("expPath", self.path()?.to_string()),
            ("sampleName", self.name.to_string()),
            ("pid", self.project.id.0.to_string()),
            ("projectName", self.project.name.to_string()),
            ("sp.proteinUserId", database.user_id.0.to_string()),
            ("sp.proteinDbId", database.id.0.to_string()),
        ]);
        self.project.session().post(endpoints::PROLUCID_SEARCH, &form)?;
        info!(
            "Submitted ProLuCID search of \"{}\" against \"{}\"",
            self.name, database.file
        );
        Ok(self.job())
    }

    /// Handle to the search job of this experiment, e.g. one submitted
    /// earlier. Its status is [crate::JobStatus::Pending] until [Job::update].
    pub fn job(&self) -> Job<'s, T> {
        Job::new(self.project.session(), self.name.clone())
    }

    /// ID of the search run on this experiment.
    pub fn search_id(&self) -> Result<SearchId, Ip2Error> {
        html::search_id(&self.page()?).ok_or_else(|| Ip2Error::SearchNotRun(self.name.to_string()))
    }

    /// Address of the DTASelect-filter file produced by this experiment's search.
    pub fn dtaselect_link(&self) -> Result<url::Url, Ip2Error> {
        let page = self.page()?;
        let search = html::search_id(&page).ok_or_else(|| Ip2Error::SearchNotRun(self.name.to_string()))?;
        let view = html::resolve(&page, &html::search_view_link(&page, search)?)?;
        let results = self.project.session().get(view.as_str(), &[])?;
        let href = html::link_containing(&results, "DTASelect-filter")?;
        html::resolve(&results, &href)
    }

    /// Contents of the DTASelect-filter file produced by this experiment's search.
    pub fn dtaselect(&self) -> Result<String, Ip2Error> {
        let link = self.dtaselect_link()?;
        Ok(self.project.session().get(link.as_str(), &[])?.text)
    }

    /// Delete this experiment and its files.
    pub fn delete(self) -> Result<(), Ip2Error> {
        let form = [
            ("pid", self.project.id.0.to_string()),
            ("projectName", self.project.name.to_string()),
            ("expId", self.id.0.to_string()),
            ("delete", "true".to_string()),
        ];
        self.project.session().post(endpoints::DELETE_EXPERIMENT, &form)?;
        info!("Deleted experiment \"{}\"", self.name);
        Ok(())
    }

    // ==================================================
    //                 HELPER METHODS
    // ==================================================

    fn page(&self) -> Result<Page, Ip2Error> {
        let query = [
            ("experimentId", self.id.0.to_string()),
            ("projectName", self.project.name.to_string()),
            ("pid", self.project.id.0.to_string()),
        ];
        self.project.session().get(endpoints::EXPERIMENT, &query)
    }

    pub(crate) fn prolucid_form(&self) -> Result<Page, Ip2Error> {
        let query = [
            ("expId", self.id.0.to_string()),
            ("expPath", self.path()?.to_string()),
            ("pid", self.project.id.0.to_string()),
            ("projectName", self.project.name.to_string()),
            ("sampleName", self.name.to_string()),
        ];
        self.project.session().get(endpoints::PROLUCID_FORM, &query)
    }
}

/// Form fields of a search which are always taken from the experiment and database.
const SEARCH_IDENTITY: [&str; 7] = [
    "expId",
    "expPath",
    "sampleName",
    "pid",
    "projectName",
    "sp.proteinUserId",
    "sp.proteinDbId",
];

fn file_md5(file: &Utf8Path) -> io::Result<String> {
    let mut reader = fs_err::File::open(file)?;
    let mut context = md5::Context::new();
    io::copy(&mut reader, &mut context)?;
    Ok(format!("{:x}", context.compute()))
}

impl<T: Transport> fmt::Debug for Experiment<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Experiment")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("project", &self.project)
            .finish()
    }
}
