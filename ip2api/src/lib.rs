//! Client library for the IP2 proteomics web service.
//!
//! Everything starts from a [Session], which is obtained by logging in:
//!
//! ```no_run
//! use ip2api::{Session, types::{Ip2Url, Username}};
//!
//! # fn main() -> Result<(), ip2api::errors::Ip2Error> {
//! let url = Ip2Url::try_from("http://goldfish.scripps.edu").unwrap();
//! let session = Session::login(url, Username::from("me"), "secret")?;
//! let project = session.get_project("my_project")?;
//! for experiment in project.experiments()? {
//!     println!("{} {}", experiment.id.0, experiment.name);
//! }
//! session.logout()?;
//! # Ok(())
//! # }
//! ```
//!
//! All network I/O goes through the [Transport] trait, so the whole API can
//! run against a substitute server.

mod constants;
pub(crate) mod dwr;
pub mod errors;
mod experiment;
pub(crate) mod html;
mod job;
pub mod models;
mod project;
mod session;
mod transport;
pub mod types;

pub use constants::{DEFAULT_HELPER_EXPERIMENT, DEFAULT_INSTRUMENT_ID, DEFAULT_PROJECT};
pub use experiment::Experiment;
pub use job::{Job, JobStatus};
pub use models::{Database, Instrument, NewDatabase, NewExperiment, Organism, SearchParams, UploadOptions};
pub use project::Project;
pub use session::{Session, SessionBuilder};
pub use transport::{HttpTransport, Page, Params, Transport};
