//! An in-memory stand-in for an IP2 server.
//!
//! [FakeIp2] answers the requests of the client library the way IP2 does,
//! rendering just enough HTML and DWR script for the library to work with.
//! [FakeServer] is a second handle onto the same state, for tests to look
//! at or change what the "server" knows.

#![allow(dead_code)]

use camino::Utf8Path;
use ip2api::errors::{FileIOError, Ip2Error};
use ip2api::types::{Ip2Url, Ip2UrlRef, Username};
use ip2api::{Page, Params, Session, SessionBuilder, Transport};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub const BASE_URL: &str = "http://ip2.test";
pub const USERNAME: &str = "radu";
pub const PASSWORD: &str = "hunter2";
pub const COOKIE: &str = "JSESSIONID=F00DCAFE";
pub const SCRIPT_SESSION_ID: &str = "A1B2C3D4E5";

pub type AnyResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Debug, Clone)]
pub struct Request {
    pub method: &'static str,
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl Request {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct FakeExperiment {
    pub id: u32,
    pub name: String,
    pub path: String,
    pub files: Vec<String>,
    pub search_id: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct FakeProject {
    pub id: u32,
    pub name: String,
    pub experiments: Vec<FakeExperiment>,
}

#[derive(Debug, Clone)]
pub struct FakeJob {
    pub job_id: u32,
    pub sample_name: String,
    pub finished: bool,
    pub progress: f64,
}

#[derive(Debug, Clone)]
pub struct FakeDatabase {
    pub id: u32,
    pub user_id: u32,
    pub file: String,
    pub source: String,
    pub organism: String,
}

#[derive(Debug, Default)]
pub struct State {
    pub logged_in: bool,
    pub next_id: u32,
    pub projects: Vec<FakeProject>,
    pub jobs: Vec<FakeJob>,
    /// (user ID, username)
    pub users: Vec<(u32, String)>,
    pub databases: Vec<FakeDatabase>,
    pub organisms: Vec<String>,
    pub sources: Vec<String>,
    pub instruments: Vec<(u32, String)>,
    /// files received by multipart upload, by experiment path
    pub received: HashMap<String, Vec<String>>,
    pub requests: Vec<Request>,
}

impl State {
    fn id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn experiment_mut(&mut self, id: u32) -> Option<&mut FakeExperiment> {
        self.projects
            .iter_mut()
            .flat_map(|p| p.experiments.iter_mut())
            .find(|e| e.id == id)
    }

    fn experiment_by_path(&mut self, path: &str) -> Option<&mut FakeExperiment> {
        self.projects
            .iter_mut()
            .flat_map(|p| p.experiments.iter_mut())
            .find(|e| e.path == path)
    }
}

/// Handle onto the state of a [FakeIp2].
#[derive(Clone)]
pub struct FakeServer(Rc<RefCell<State>>);

impl FakeServer {
    pub fn state(&self) -> std::cell::RefMut<'_, State> {
        self.0.borrow_mut()
    }

    pub fn add_project(&self, name: &str) -> u32 {
        let mut state = self.state();
        let id = state.id();
        state.projects.push(FakeProject {
            id,
            name: name.to_string(),
            experiments: vec![],
        });
        id
    }

    pub fn add_experiment(&self, project: u32, name: &str) -> u32 {
        let mut state = self.state();
        let id = state.id();
        let project = state.projects.iter_mut().find(|p| p.id == project).unwrap();
        let path = format!("/ip2_data/{}/{}/{}_{}", USERNAME, project.name, name, id);
        project.experiments.push(FakeExperiment {
            id,
            name: name.to_string(),
            path,
            files: vec![],
            search_id: None,
        });
        id
    }

    pub fn add_database(&self, user_id: u32, file: &str) -> u32 {
        let mut state = self.state();
        let id = state.id();
        state.databases.push(FakeDatabase {
            id,
            user_id,
            file: file.to_string(),
            source: "UniProt".to_string(),
            organism: "Human".to_string(),
        });
        id
    }

    pub fn set_job(&self, sample_name: &str, progress: f64, finished: bool) {
        let mut state = self.state();
        let job = state
            .jobs
            .iter_mut()
            .find(|j| j.sample_name == sample_name)
            .unwrap();
        job.progress = progress;
        job.finished = finished;
    }

    pub fn requests_to(&self, path: &str) -> Vec<Request> {
        self.state()
            .requests
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }
}

pub struct FakeIp2 {
    url: Ip2Url,
    state: Rc<RefCell<State>>,
}

impl FakeIp2 {
    pub fn new() -> (Self, FakeServer) {
        let state = State {
            users: vec![(1, "admin".to_string()), (4, USERNAME.to_string())],
            organisms: vec!["Human".to_string(), "Mouse".to_string()],
            sources: vec!["UniProt".to_string()],
            instruments: vec![(65, "LTQ".to_string()), (70, "Orbitrap Velos".to_string())],
            next_id: 100,
            ..Default::default()
        };
        let state = Rc::new(RefCell::new(state));
        let fake = FakeIp2 {
            url: Ip2Url::try_from(BASE_URL).unwrap(),
            state: Rc::clone(&state),
        };
        (fake, FakeServer(state))
    }

    fn page(&self, path: &str, text: String) -> Page {
        Page {
            url: format!("{}/{}", BASE_URL, path),
            text,
        }
    }

    fn handle(&self, method: &'static str, endpoint: &str, params: &Params) -> Result<Page, Ip2Error> {
        let url = self.url.join(endpoint).unwrap();
        let path = url.path().trim_start_matches('/').to_string();
        let mut all_params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        all_params.extend(params.iter().map(|(k, v)| (k.to_string(), v.clone())));
        let request = Request {
            method,
            path: path.clone(),
            params: all_params,
        };
        let mut state = self.state.borrow_mut();
        state.requests.push(request.clone());

        if path == "ip2/j_security_check" {
            let ok = request.param("j_username") == Some(USERNAME)
                && request.param("j_password") == Some(PASSWORD);
            state.logged_in = ok;
            let landing = if ok { "ip2/index.jsp" } else { "ip2/login.jsp?error=true" };
            return Ok(self.page(landing, String::new()));
        }
        if !state.logged_in && path != "ip2/dwr/engine.js" {
            return Ok(self.page("ip2/login.jsp", "<form action=\"j_security_check\"></form>".to_string()));
        }

        let text = match path.as_str() {
            "ip2/logout.jsp" => {
                state.logged_in = false;
                String::new()
            }
            "ip2/dwr/engine.js" => format!(
                "dwr.engine._origScriptSessionId = \"{}\";",
                SCRIPT_SESSION_ID
            ),
            "ip2/viewProject.html" => render_projects(&state.projects),
            "ip2/addProject.html" => {
                let id = state.id();
                state.projects.push(FakeProject {
                    id,
                    name: request.param("projectName").unwrap().to_string(),
                    experiments: vec![],
                });
                String::new()
            }
            "ip2/deleteProject.html" => {
                let pid = int(&request, "pid");
                state.projects.retain(|p| p.id != pid);
                String::new()
            }
            "ip2/viewExperiment.html" => {
                let pid = int(&request, "pid");
                let project = state.projects.iter().find(|p| p.id == pid);
                render_experiments(project.map(|p| p.experiments.as_slice()).unwrap_or_default())
            }
            "ip2/saveExperiment.html" if method == "GET" => render_select(
                "select name=\"instrumentId\"",
                state.instruments.iter().map(|(id, n)| (id.to_string(), n.clone())),
            ),
            "ip2/saveExperiment.html" => {
                let pid = int(&request, "pid");
                let id = state.id();
                let project = state.projects.iter_mut().find(|p| p.id == pid).unwrap();
                let name = request.param("sampleName").unwrap().to_string();
                let path = format!("/ip2_data/{}/{}/{}_{}", USERNAME, project.name, name, id);
                project.experiments.push(FakeExperiment {
                    id,
                    name,
                    path,
                    files: vec![],
                    search_id: None,
                });
                String::new()
            }
            "ip2/deleteExperiment.html" => {
                let id = int(&request, "expId");
                for project in state.projects.iter_mut() {
                    project.experiments.retain(|e| e.id != id);
                }
                String::new()
            }
            "ip2/eachExperiment.html" => {
                let id = int(&request, "experimentId");
                let experiment = state.experiment_mut(id).unwrap();
                render_experiment(experiment)
            }
            "ip2/fileUploadAction.html" if method == "UPLOAD" => String::new(),
            "ip2/fileUploadAction.html" => {
                let path = request.param("filePath").unwrap().to_string();
                let name = request.param("fileFileName").unwrap().to_string();
                let received = state.received.get(&path).is_some_and(|r| r.contains(&name));
                if request.param("startProcess") == Some("post") && received {
                    if let Some(experiment) = state.experiment_by_path(&path) {
                        experiment.files.push(name);
                    }
                }
                String::new()
            }
            "ip2/prolucidProteinForm.html" => render_select(
                "select name=\"sp.proteinUserId\"",
                state.users.iter().map(|(id, n)| (id.to_string(), n.clone())),
            ),
            "ip2/prolucidProteinId.html" => {
                let exp_id = int(&request, "expId");
                let search_id = state.id();
                let job_id = state.id();
                state.experiment_mut(exp_id).unwrap().search_id = Some(search_id);
                state.jobs.push(FakeJob {
                    job_id,
                    sample_name: request.param("sampleName").unwrap().to_string(),
                    finished: false,
                    progress: 0.0,
                });
                String::new()
            }
            "ip2/viewSearch.html" => format!(
                "<a href=\"results/{0}/DTASelect.txt\">DTASelect.txt</a>\
                 <a href=\"results/{0}/DTASelect-filter.txt\">DTASelect-filter.txt</a>",
                int(&request, "sid")
            ),
            p if p.starts_with("ip2/results/") => format!("DTASelect v2.0\n{}\n", p),
            "ip2/dwr/call/plaincall/JobMonitor.getSearchJobStatus.dwr" => render_jobs(&state.jobs),
            "ip2/dwr/call/plaincall/SearchProlucidAction.getProteinDbForUser.dwr" => {
                let user_id: u32 = request
                    .param("c0-param0")
                    .and_then(|p| p.strip_prefix("string:"))
                    .unwrap()
                    .parse()
                    .unwrap();
                render_databases(state.databases.iter().filter(|d| d.user_id == user_id))
            }
            "ip2/dwr/call/plaincall/FileUploadAction.getMd5ServerMd5Value.dwr" => {
                // this server believes every file it is asked about
                let md5 = request.param("c0-param1").unwrap().trim_start_matches("string:");
                format!("dwr.engine._remoteHandleCallback('1','0',\"{}\");", md5)
            }
            "ip2/dwr/call/plaincall/FileUploadAction.checkRawConvertorStatus.dwr" => {
                "dwr.engine._remoteHandleCallback('1','0',\"DONE\");".to_string()
            }
            "ip2/addDatabase.html" => {
                let organisms = render_select(
                    "select id=\"organism\"",
                    state.organisms.iter().map(|o| (o.clone(), o.clone())),
                );
                let sources = render_select(
                    "select name=\"dbSource\"",
                    state.sources.iter().map(|s| (s.clone(), s.clone())),
                );
                organisms + &sources
            }
            "ip2/newDbSource.html" => {
                state.sources.push(request.param("dbSource").unwrap().to_string());
                String::new()
            }
            "ip2/addDatabaseAction.html" => {
                let dir = request.param("dbFilePath").unwrap().to_string();
                let file = request.param("uploader_0_name").unwrap().to_string();
                let received = state.received.get(&dir).is_some_and(|r| r.contains(&file));
                let source = request.param("dbSource").unwrap().to_string();
                let organism = request.param("organism").unwrap().to_string();
                let known = state.sources.contains(&source) && state.organisms.contains(&organism);
                if received && known {
                    let id = state.id();
                    let user_id = state.users.iter().find(|(_, n)| n == USERNAME).unwrap().0;
                    state.databases.push(FakeDatabase {
                        id,
                        user_id,
                        file,
                        source,
                        organism,
                    });
                }
                String::new()
            }
            "ip2/newOrganism.html" => {
                state.organisms.push(request.param("organism").unwrap().to_string());
                String::new()
            }
            "ip2/newInstrument.html" => {
                let id = state.id();
                let name = request.param("instrumentName").unwrap().to_string();
                state.instruments.push((id, name));
                String::new()
            }
            "ip2/deleteDatabase.html" => {
                let id = int(&request, "dbId");
                state.databases.retain(|d| d.id != id);
                String::new()
            }
            _ => panic!("the fake IP2 does not know about {}", path),
        };
        Ok(self.page(&path, text))
    }
}

impl Transport for FakeIp2 {
    fn base_url(&self) -> &Ip2UrlRef {
        &self.url
    }

    fn get(&self, endpoint: &str, query: &Params) -> Result<Page, Ip2Error> {
        self.handle("GET", endpoint, query)
    }

    fn post_form(&self, endpoint: &str, form: &Params) -> Result<Page, Ip2Error> {
        self.handle("POST", endpoint, form)
    }

    fn post_dwr(&self, endpoint: &str, form: &Params) -> Result<Page, Ip2Error> {
        self.handle("DWR", endpoint, form)
    }

    fn upload(
        &self,
        endpoint: &str,
        query: &Params,
        fields: &Params,
        file: &Utf8Path,
    ) -> Result<Page, FileIOError> {
        fs_err::metadata(file)?;
        let path = query
            .iter()
            .find(|(k, _)| *k == "filePath")
            .map(|(_, v)| v.clone())
            .unwrap();
        let name = file.file_name().unwrap().to_string();
        self.state
            .borrow_mut()
            .received
            .entry(path)
            .or_default()
            .push(name);
        let params: Vec<(&str, String)> = query.iter().chain(fields).cloned().collect();
        Ok(self.handle("UPLOAD", endpoint, &params)?)
    }

    fn add_cookie(&self, cookie: &str) {
        if cookie == COOKIE {
            self.state.borrow_mut().logged_in = true;
        }
    }
}

// ========================================
//            SESSION FIXTURES
// ========================================

pub fn login() -> (Session<FakeIp2>, FakeServer) {
    let (fake, server) = FakeIp2::new();
    let session = SessionBuilder::new(fake)
        .login(Username::from(USERNAME), PASSWORD)
        .unwrap();
    (session, server)
}

// ========================================
//            RENDERING
// ========================================

fn int(request: &Request, key: &str) -> u32 {
    request.param(key).unwrap().parse().unwrap()
}

fn render_projects(projects: &[FakeProject]) -> String {
    let rows: String = projects
        .iter()
        .map(|p| {
            format!(
                "<tr><td><a href=\"viewExperiment.html?pid={0}\">{1}</a>\
                 <input type=\"hidden\" name=\"pid\" value=\"{0}\">\
                 <input type=\"hidden\" name=\"projectName\" value=\"{1}\"></td></tr>",
                p.id, p.name
            )
        })
        .collect();
    format!("<table><thead><tr><th>Name</th></tr></thead><tbody>{}</tbody></table>", rows)
}

fn render_experiments(experiments: &[FakeExperiment]) -> String {
    let rows: String = experiments
        .iter()
        .map(|e| {
            format!(
                "<tr><td><input type=\"hidden\" name=\"expId\" value=\"{}\">\
                 <input type=\"hidden\" name=\"sampleName\" value=\"{}\"></td></tr>",
                e.id, e.name
            )
        })
        .collect();
    format!("<table><tbody>{}</tbody></table>", rows)
}

fn render_experiment(experiment: &FakeExperiment) -> String {
    let path: String = url::form_urlencoded::byte_serialize(experiment.path.as_bytes()).collect();
    let files: String = experiment
        .files
        .iter()
        .map(|f| format!("<tr><td>{}</td><td>1 MB</td></tr>", f))
        .collect();
    let search = match experiment.search_id {
        Some(id) => format!(
            "<tr><td>ProLuCID</td><td>{0}</td><td><a href=\"viewSearch.html?sid={0}\">View</a></td></tr>",
            id
        ),
        None => "<tr><td>-</td><td>no search yet</td><td></td></tr>".to_string(),
    };
    format!(
        "<div class=\"add_quality_check_details\">\
         <a href=\"viewExperiment.html\">Back</a>\
         <a href=\"qualityCheck.html?expPath={}\">Quality check</a></div>\
         <table id=\"spectra\"><tbody>{}</tbody></table>\
         <table id=\"search\"><tbody>{}</tbody></table>",
        path, files, search
    )
}

fn render_select(open_tag: &str, options: impl Iterator<Item = (String, String)>) -> String {
    let options: String = options
        .map(|(value, text)| format!("<option value=\"{}\">{}</option>", value, text))
        .collect();
    format!("<form><{}>{}</select></form>", open_tag, options)
}

fn render_jobs(jobs: &[FakeJob]) -> String {
    let mut text = String::from("//#DWR-REPLY\n");
    for (i, job) in jobs.iter().enumerate() {
        text.push_str(&format!(
            "var s{0}={{}};s{0}.finished={1};s{0}.jobId={2};s{0}.progress={3:.1};s{0}.sampleName=\"{4}\";\n",
            i, job.finished, job.job_id, job.progress, job.sample_name
        ));
    }
    text.push_str("dwr.engine._remoteHandleCallback('0','0',[]);\n");
    text
}

fn render_databases<'a>(databases: impl Iterator<Item = &'a FakeDatabase>) -> String {
    let mut text = String::from("//#DWR-REPLY\n");
    for (i, db) in databases.enumerate() {
        text.push_str(&format!(
            "var s{0}={{}};s{0}.dbSource=\"{1}\";s{0}.description=\"\";s{0}.fileName=\"{2}\";s{0}.id={3};s{0}.organism=\"{4}\";\n",
            i, db.source, db.file, db.id, db.organism
        ));
    }
    text.push_str("dwr.engine._remoteHandleCallback('0','0',[]);\n");
    text
}
