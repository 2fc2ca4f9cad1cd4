/// Name of the project used when none is given.
pub const DEFAULT_PROJECT: &str = "ip2_api";

/// Name of the experiment some lookups (e.g. databases) are made through.
pub const DEFAULT_HELPER_EXPERIMENT: &str = "ip2_api_helper";

/// Instrument assigned to new experiments when none is given.
pub const DEFAULT_INSTRUMENT_ID: u32 = 65;

pub(crate) mod endpoints {
    pub const LOGIN: &str = "ip2/j_security_check";
    pub const LOGOUT: &str = "ip2/logout.jsp";
    pub const EXPERIMENT: &str = "ip2/eachExperiment.html";
    pub const ADD_EXPERIMENT: &str = "ip2/saveExperiment.html";
    pub const DELETE_EXPERIMENT: &str = "ip2/deleteExperiment.html";
    pub const EXPERIMENT_LIST: &str = "ip2/viewExperiment.html";
    pub const ADD_PROJECT: &str = "ip2/addProject.html";
    pub const DELETE_PROJECT: &str = "ip2/deleteProject.html";
    pub const PROJECT_LIST: &str = "ip2/viewProject.html";
    pub const FILE_UPLOAD: &str = "ip2/fileUploadAction.html";
    pub const CONVERTOR_STATUS: &str =
        "ip2/dwr/call/plaincall/FileUploadAction.checkRawConvertorStatus.dwr";
    pub const SERVER_MD5: &str =
        "ip2/dwr/call/plaincall/FileUploadAction.getMd5ServerMd5Value.dwr";
    pub const JOB_STATUS: &str = "ip2/dwr/call/plaincall/JobMonitor.getSearchJobStatus.dwr";
    pub const PROLUCID_FORM: &str = "ip2/prolucidProteinForm.html";
    pub const PROLUCID_SEARCH: &str = "ip2/prolucidProteinId.html";
    pub const ADD_DATABASE: &str = "ip2/addDatabase.html";
    pub const UPLOAD_DATABASE: &str = "ip2/addDatabaseAction.html";
    pub const ADD_DATABASE_SOURCE: &str = "ip2/newDbSource.html";
    pub const DELETE_DATABASE: &str = "ip2/deleteDatabase.html";
    pub const DATABASES_FOR_USER: &str =
        "ip2/dwr/call/plaincall/SearchProlucidAction.getProteinDbForUser.dwr";
    pub const ADD_ORGANISM: &str = "ip2/newOrganism.html";
    pub const ADD_INSTRUMENT: &str = "ip2/newInstrument.html";
    pub const DWR_ENGINE: &str = "ip2/dwr/engine.js";

    /// DWR "page" of the job monitor.
    pub const JOB_STATUS_PAGE: &str = "/ip2/jobstatus.html";
}
