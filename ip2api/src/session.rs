use crate::constants::{endpoints, DEFAULT_HELPER_EXPERIMENT, DEFAULT_PROJECT};
use crate::dwr::{self, DwrArg, DwrCall};
use crate::errors::{FileIOError, Ip2Error};
use crate::html;
use crate::models::*;
use crate::transport::{HttpTransport, Page, Params, Transport};
use crate::types::*;
use crate::{Experiment, Job, Project};
use camino::Utf8Path;
use log::{info, warn};
use std::cell::OnceCell;

/// Options for a [Session], which is created by logging in.
pub struct SessionBuilder<T: Transport> {
    transport: T,
    default_project: ProjectName,
    helper_experiment: ExperimentName,
}

impl<T: Transport> SessionBuilder<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            default_project: ProjectName::from(DEFAULT_PROJECT),
            helper_experiment: ExperimentName::from(DEFAULT_HELPER_EXPERIMENT),
        }
    }

    /// Name of the project used by [Session::default_project].
    pub fn default_project(self, name: impl Into<ProjectName>) -> Self {
        Self {
            default_project: name.into(),
            ..self
        }
    }

    /// Name of the experiment used by [Session::helper_experiment].
    pub fn helper_experiment(self, name: impl Into<ExperimentName>) -> Self {
        Self {
            helper_experiment: name.into(),
            ..self
        }
    }

    /// Log in using a username and password.
    pub fn login(self, username: Username, password: &str) -> Result<Session<T>, Ip2Error> {
        let form = [
            ("j_username", username.to_string()),
            ("j_password", password.to_string()),
            ("rememberMe", "remember-me".to_string()),
        ];
        let page = self.transport.post_form(endpoints::LOGIN, &form)?;
        // a rejected login is redirected to the login page with an error
        if page.url.contains("error") {
            return Err(Ip2Error::Authentication(username));
        }
        info!("Logged into {} as {}", self.transport.base_url(), username);
        Ok(self.into_session(username))
    }

    /// Resume a session from the cookie of an earlier login, e.g. `JSESSIONID=...`.
    pub fn cookie_login(self, username: Username, cookie: &str) -> Result<Session<T>, Ip2Error> {
        self.transport.add_cookie(cookie);
        let session = self.into_session(username);
        if session.is_logged_in()? {
            Ok(session)
        } else {
            Err(Ip2Error::Authentication(session.username))
        }
    }

    fn into_session(self, username: Username) -> Session<T> {
        Session {
            transport: self.transport,
            username,
            default_project: self.default_project,
            helper_experiment: self.helper_experiment,
            script_session_id: OnceCell::new(),
        }
    }
}

/// An authenticated IP2 user.
///
/// Every [Project], [Experiment] and [Job] refers back to the session
/// it was obtained from. [Session::logout] ends the session.
pub struct Session<T: Transport = HttpTransport> {
    transport: T,
    username: Username,
    default_project: ProjectName,
    helper_experiment: ExperimentName,
    script_session_id: OnceCell<String>,
}

impl Session<HttpTransport> {
    /// Create a session builder for the IP2 instance at `url`.
    pub fn build(url: Ip2Url) -> Result<SessionBuilder<HttpTransport>, reqwest::Error> {
        Ok(SessionBuilder::new(HttpTransport::new(url)?))
    }

    /// Log into the IP2 instance at `url` with default options.
    pub fn login(url: Ip2Url, username: Username, password: &str) -> Result<Self, Ip2Error> {
        Self::build(url)?.login(username, password)
    }
}

impl<T: Transport> Session<T> {
    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn url(&self) -> &Ip2UrlRef {
        self.transport.base_url()
    }

    /// Whether IP2 still considers this session logged in.
    /// Sessions expire on the server after some time.
    pub fn is_logged_in(&self) -> Result<bool, Ip2Error> {
        let page = self.get(endpoints::PROJECT_LIST, &[])?;
        Ok(!page.url.contains("login"))
    }

    /// Log out of IP2.
    pub fn logout(self) -> Result<(), Ip2Error> {
        self.get(endpoints::LOGOUT, &[])?;
        info!("Logged out {}", self.username);
        Ok(())
    }

    // ==================================================
    //                 PROJECTS
    // ==================================================

    /// List the projects of this user.
    pub fn projects(&self) -> Result<Vec<Project<'_, T>>, Ip2Error> {
        let page = self.get(endpoints::PROJECT_LIST, &[])?;
        let projects = html::projects(&page)?
            .into_iter()
            .map(|(id, name)| Project::new(self, id, name))
            .collect();
        Ok(projects)
    }

    /// Get a project by name. If several projects have the same name,
    /// the one listed last is returned.
    pub fn get_project(&self, name: &str) -> Result<Project<'_, T>, Ip2Error> {
        let mut found: Vec<_> = self
            .projects()?
            .into_iter()
            .filter(|p| p.name.as_str() == name)
            .collect();
        if found.len() > 1 {
            warn!("Multiple projects found with the name \"{}\"", name);
        }
        found.pop().ok_or_else(|| Ip2Error::not_found("project", name))
    }

    /// Create a project. Project names must be unique.
    pub fn create_project(&self, name: &str, description: &str) -> Result<Project<'_, T>, Ip2Error> {
        if self.projects()?.iter().any(|p| p.name.as_str() == name) {
            return Err(Ip2Error::AlreadyExists {
                kind: "project",
                name: name.to_string(),
                parent: format!("the projects of {}", self.username),
            });
        }
        let form = [
            ("projectName", name.to_string()),
            ("desc", description.to_string()),
        ];
        self.post(endpoints::ADD_PROJECT, &form)?;
        info!("Created project \"{}\"", name);
        self.get_project(name)
    }

    /// Get the project named by [SessionBuilder::default_project],
    /// creating it if necessary.
    pub fn default_project(&self) -> Result<Project<'_, T>, Ip2Error> {
        match self.get_project(self.default_project.as_str()) {
            Err(Ip2Error::NotFound { .. }) => self.create_project(self.default_project.as_str(), ""),
            result => result,
        }
    }

    /// Get the experiment named by [SessionBuilder::helper_experiment]
    /// inside of the [Session::default_project], creating either if necessary.
    pub fn helper_experiment(&self) -> Result<Experiment<'_, T>, Ip2Error> {
        let project = self.default_project()?;
        match project.get_experiment(self.helper_experiment.as_str()) {
            Err(Ip2Error::NotFound { .. }) => {
                project.add_experiment(NewExperiment::new(self.helper_experiment.clone()))
            }
            result => result,
        }
    }

    // ==================================================
    //                 DATABASES
    // ==================================================

    /// List the protein databases this user can search against,
    /// including those of other users.
    pub fn databases(&self) -> Result<Vec<Database>, Ip2Error> {
        let form = self.helper_experiment()?.prolucid_form()?;
        let users = html::select_options(&form, r#"select[name="sp.proteinUserId"]"#, "database owners")?;
        let mut databases = Vec::new();
        for user in users {
            let user_id = match user.value.as_deref().map(str::parse) {
                Some(Ok(id)) => UserId(id),
                _ => continue,
            };
            let username = Username::new(user.text);
            databases.extend(self.databases_of(user_id, &username)?);
        }
        Ok(databases)
    }

    fn databases_of(&self, user_id: UserId, username: &Username) -> Result<Vec<Database>, Ip2Error> {
        let call = DwrCall {
            endpoint: endpoints::DATABASES_FOR_USER,
            page: format!("/{}", endpoints::PROLUCID_FORM),
            script: "SearchProlucidAction",
            method: "getProteinDbForUser",
            args: vec![DwrArg::Str(user_id.0.to_string())],
        };
        let page = self.dwr(&call)?;
        let databases = dwr::objects(&page.text)
            .iter()
            .filter_map(|o| Database::from_dwr(o, user_id, username))
            .collect();
        Ok(databases)
    }

    /// Get a database by its file name.
    pub fn get_database(&self, file: &str) -> Result<Database, Ip2Error> {
        self.databases()?
            .into_iter()
            .find(|d| d.file.as_str() == file)
            .ok_or_else(|| Ip2Error::not_found("database", file))
    }

    /// Delete a database from IP2.
    pub fn delete_database(&self, database: Database) -> Result<(), Ip2Error> {
        let form = [("dbId", database.id.0.to_string()), ("delete", "true".to_string())];
        self.post(endpoints::DELETE_DATABASE, &form)?;
        info!("Deleted database \"{}\"", database.file);
        Ok(())
    }

    /// Sources which databases can be labeled with, e.g. `UniProt`.
    pub fn database_sources(&self) -> Result<Vec<String>, Ip2Error> {
        let page = self.get(endpoints::ADD_DATABASE, &[])?;
        let sources = html::select_options(&page, r#"select[name="dbSource"]"#, "database sources")?
            .into_iter()
            .map(|o| o.text)
            .collect();
        Ok(sources)
    }

    /// Create a database source, unless one of the same name exists.
    pub fn create_database_source(&self, name: &str) -> Result<(), Ip2Error> {
        if self.database_sources()?.iter().any(|s| s == name) {
            return Ok(());
        }
        let form = [("upload_file_name", String::new()), ("dbSource", name.to_string())];
        self.post(endpoints::ADD_DATABASE_SOURCE, &form)?;
        info!("Created database source \"{}\"", name);
        Ok(())
    }

    /// Upload a FASTA file as a new protein database of this user.
    ///
    /// Its source and organism are created first if IP2 does not know them.
    pub fn upload_database(
        &self,
        file: impl AsRef<Utf8Path>,
        database: NewDatabase,
    ) -> Result<Database, FileIOError> {
        let file = file.as_ref();
        let filename = file
            .file_name()
            .ok_or_else(|| FileIOError::PathError(file.to_string()))?;
        let dir = self.database_dir();
        self.upload_to(&dir, file, "db", &[("flag", "non".to_string())])?;
        self.create_database_source(&database.source)?;
        self.create_organism(&database.organism)?;

        let yes_no = |b: bool| if b { "yes" } else { "no" }.to_string();
        let date = database.date;
        let form = [
            ("upload_file_name", String::new()),
            ("dbFilePath", dir),
            ("dbSource", database.source),
            ("organism", database.organism),
            ("month", u8::from(date.month()).to_string()),
            ("date", date.day().to_string()),
            ("year", date.year().to_string()),
            ("version", database.version),
            ("desc", database.description),
            ("reverse", yes_no(database.reverse)),
            ("contaminant", yes_no(database.contaminant)),
            ("uploader_0_name", filename.to_string()),
            ("upload_0_status", "done".to_string()),
            ("uploader_count", "1".to_string()),
        ];
        self.post(endpoints::UPLOAD_DATABASE, &form)?;
        info!("Uploaded database {}", file);

        let uploaded = self
            .databases()?
            .into_iter()
            .filter(|d| d.username == self.username && d.file.as_str() == filename)
            .last()
            .ok_or_else(|| Ip2Error::not_found("database", filename))?;
        Ok(uploaded)
    }

    /// Server-side directory of this user's database files.
    fn database_dir(&self) -> String {
        format!("/ip2_data/{}/database", self.username)
    }

    // ==================================================
    //                 ORGANISMS AND INSTRUMENTS
    // ==================================================

    /// List the organisms which databases can be labeled with.
    pub fn organisms(&self) -> Result<Vec<Organism>, Ip2Error> {
        let page = self.get(endpoints::ADD_DATABASE, &[])?;
        let organisms = html::select_options(&page, "select#organism", "organisms")?
            .into_iter()
            .map(|o| Organism { name: o.text })
            .collect();
        Ok(organisms)
    }

    /// Create an organism, unless one of the same name exists.
    pub fn create_organism(&self, name: &str) -> Result<Organism, Ip2Error> {
        let organism = Organism {
            name: name.to_string(),
        };
        if self.organisms()?.contains(&organism) {
            return Ok(organism);
        }
        let form = [("upload_file_name", String::new()), ("organism", name.to_string())];
        self.post(endpoints::ADD_ORGANISM, &form)?;
        info!("Created organism \"{}\"", name);
        Ok(organism)
    }

    /// List the instruments which experiments can be labeled with.
    pub fn instruments(&self) -> Result<Vec<Instrument>, Ip2Error> {
        let page = self.get(endpoints::ADD_EXPERIMENT, &[])?;
        let mut instruments = Vec::new();
        for option in html::select_options(&page, r#"select[name="instrumentId"]"#, "instruments")? {
            let id = option
                .value
                .as_deref()
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| Ip2Error::malformed("instrument ID", &page.url))?;
            instruments.push(Instrument {
                id: InstrumentId(id),
                name: option.text,
            });
        }
        Ok(instruments)
    }

    /// Create an instrument, unless one of the same name exists.
    pub fn create_instrument(&self, name: &str) -> Result<Instrument, Ip2Error> {
        if let Some(existing) = self.find_instrument(name)? {
            return Ok(existing);
        }
        // instruments do not belong to projects, but IP2 wants one anyways
        let project = self.default_project()?;
        let form = [
            ("pid", project.id.0.to_string()),
            ("projectName", project.name.to_string()),
            ("instrumentName", name.to_string()),
        ];
        self.post(endpoints::ADD_INSTRUMENT, &form)?;
        info!("Created instrument \"{}\"", name);
        self.find_instrument(name)?
            .ok_or_else(|| Ip2Error::not_found("instrument", name))
    }

    fn find_instrument(&self, name: &str) -> Result<Option<Instrument>, Ip2Error> {
        Ok(self.instruments()?.into_iter().find(|i| i.name == name))
    }

    // ==================================================
    //                 SEARCH
    // ==================================================

    /// Create an experiment in the default project, upload spectra to it,
    /// and start a ProLuCID search.
    pub fn search<P: AsRef<Utf8Path>>(
        &self,
        name: impl Into<ExperimentName>,
        files: &[P],
        options: UploadOptions,
        params: SearchParams,
        database: &Database,
    ) -> Result<(Experiment<'_, T>, Job<'_, T>), FileIOError> {
        let project = self.default_project()?;
        let experiment = project.add_experiment(NewExperiment::new(name))?;
        experiment.upload_files(files, options)?;
        let job = experiment.prolucid_search(params, database)?;
        Ok((experiment, job))
    }

    // ==================================================
    //                 HELPER METHODS
    // ==================================================

    /// Upload a file into a server-side directory, then have IP2 process it.
    /// `extra` goes along with the request to process the file.
    pub(crate) fn upload_to(
        &self,
        dir: &str,
        file: &Utf8Path,
        kind: &str,
        extra: &Params,
    ) -> Result<(), FileIOError> {
        let filename = file
            .file_name()
            .ok_or_else(|| FileIOError::PathError(file.to_string()))?;
        let query = [("filePath", dir.to_string())];
        let fields = [
            ("name", filename.to_string()),
            ("chunk", "0".to_string()),
            ("chunks", "1".to_string()),
        ];
        self.transport.upload(endpoints::FILE_UPLOAD, &query, &fields, file)?;

        // tell IP2 the transfer is complete, then to process the file
        let mut form = vec![
            ("fileFileName", filename.to_string()),
            ("filePath", dir.to_string()),
            ("startProcess", "completed".to_string()),
            ("type", kind.to_string()),
        ];
        self.post(endpoints::FILE_UPLOAD, &form)?;
        form[2].1 = "post".to_string();
        form.extend(extra.iter().cloned());
        self.post(endpoints::FILE_UPLOAD, &form)?;
        Ok(())
    }

    pub(crate) fn get(&self, endpoint: &str, query: &Params) -> Result<Page, Ip2Error> {
        self.transport.get(endpoint, query)
    }

    pub(crate) fn post(&self, endpoint: &str, form: &Params) -> Result<Page, Ip2Error> {
        self.transport.post_form(endpoint, form)
    }

    pub(crate) fn dwr(&self, call: &DwrCall) -> Result<Page, Ip2Error> {
        let script_session_id = match self.script_session_id.get() {
            Some(id) => id,
            None => {
                let id = dwr::script_session_id(&self.transport)?;
                self.script_session_id.get_or_init(|| id)
            }
        };
        call.send(&self.transport, script_session_id)
    }
}
