use serde::{Deserialize, Serialize};
use shrinkwraprs::Shrinkwrap;

/// IP2 user ID, e.g. the owner of a protein database
#[derive(Copy, Clone, Shrinkwrap, Serialize, Deserialize, Debug, Hash, Eq, PartialEq)]
pub struct UserId(pub u32);

/// Project ID
#[derive(Copy, Clone, Shrinkwrap, Serialize, Deserialize, Debug, Hash, Eq, PartialEq)]
pub struct ProjectId(pub u32);

/// Experiment ID
#[derive(Copy, Clone, Shrinkwrap, Serialize, Deserialize, Debug, Hash, Eq, PartialEq)]
pub struct ExperimentId(pub u32);

/// Protein database ID
#[derive(Copy, Clone, Shrinkwrap, Serialize, Deserialize, Debug, Hash, Eq, PartialEq)]
pub struct DatabaseId(pub u32);

/// Mass spectrometer ID
#[derive(Copy, Clone, Shrinkwrap, Serialize, Deserialize, Debug, Hash, Eq, PartialEq)]
pub struct InstrumentId(pub u32);

/// ID of a search job, as reported by the job monitor
#[derive(Copy, Clone, Shrinkwrap, Serialize, Deserialize, Debug, Hash, Eq, PartialEq)]
pub struct JobId(pub u32);

/// ID of a search, as listed on the experiment page
#[derive(Copy, Clone, Shrinkwrap, Serialize, Deserialize, Debug, Hash, Eq, PartialEq)]
pub struct SearchId(pub u32);
