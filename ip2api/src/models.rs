//! Plain values describing things on IP2, and the options of requests
//! which create things on IP2.

use crate::constants::DEFAULT_INSTRUMENT_ID;
use crate::dwr::DwrObject;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::{Date, OffsetDateTime};

/// A protein database (FASTA file) which searches can be run against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    pub id: DatabaseId,
    /// Owner of the database.
    pub user_id: UserId,
    pub username: Username,
    pub source: String,
    pub description: String,
    pub organism: String,
    pub file: DatabaseFile,
}

impl Database {
    /// Read a database from a `getProteinDbForUser` DWR object.
    /// Objects without a file name or ID are not databases.
    pub(crate) fn from_dwr(object: &DwrObject, user_id: UserId, username: &Username) -> Option<Self> {
        let file = object.get("fileName").filter(|f| !f.is_empty())?;
        let id = object.get("id")?.parse().ok()?;
        let text = |field: &str| object.get(field).unwrap_or_default().to_string();
        Some(Self {
            id: DatabaseId(id),
            user_id,
            username: username.clone(),
            source: text("dbSource"),
            description: text("description"),
            organism: text("organism"),
            file: DatabaseFile::from(file),
        })
    }

    /// Location of the FASTA file, relative to the address of IP2.
    pub fn remote_path(&self) -> String {
        format!("ip2/ip2_data/{}/database/{}", self.username, self.file)
    }
}

/// An organism which protein databases can be labeled with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Organism {
    pub name: String,
}

/// A mass spectrometer which experiments can be labeled with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: InstrumentId,
    pub name: String,
}

/// Details of an experiment to create.
#[derive(Debug, Clone)]
pub struct NewExperiment {
    pub name: ExperimentName,
    pub instrument: InstrumentId,
    pub sample_description: String,
    pub description: String,
    pub date: Date,
}

impl NewExperiment {
    /// An experiment of the default instrument, dated today.
    pub fn new(name: impl Into<ExperimentName>) -> Self {
        Self {
            name: name.into(),
            instrument: InstrumentId(DEFAULT_INSTRUMENT_ID),
            sample_description: String::new(),
            description: String::new(),
            date: today(),
        }
    }

    pub fn instrument(self, instrument: InstrumentId) -> Self {
        Self { instrument, ..self }
    }

    pub fn description(self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self
        }
    }

    pub fn sample_description(self, sample_description: impl Into<String>) -> Self {
        Self {
            sample_description: sample_description.into(),
            ..self
        }
    }

    pub fn date(self, date: Date) -> Self {
        Self { date, ..self }
    }
}

/// Details of a protein database to upload.
#[derive(Debug, Clone)]
pub struct NewDatabase {
    /// Where the sequences come from, e.g. `UniProt`. Created if IP2 does not know it.
    pub source: String,
    /// Created if IP2 does not know it.
    pub organism: String,
    pub version: String,
    pub description: String,
    pub date: Date,
    /// Ask IP2 to append reversed (decoy) sequences.
    pub reverse: bool,
    /// Ask IP2 to append common contaminants.
    pub contaminant: bool,
}

impl NewDatabase {
    /// A database dated today, with decoys and contaminants added.
    pub fn new(source: impl Into<String>, organism: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            organism: organism.into(),
            version: String::new(),
            description: String::new(),
            date: today(),
            reverse: true,
            contaminant: true,
        }
    }

    pub fn version(self, version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..self
        }
    }

    pub fn description(self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self
        }
    }

    pub fn date(self, date: Date) -> Self {
        Self { date, ..self }
    }

    pub fn reverse(self, reverse: bool) -> Self {
        Self { reverse, ..self }
    }

    pub fn contaminant(self, contaminant: bool) -> Self {
        Self { contaminant, ..self }
    }
}

/// Today's date where this program runs. The UTC date if the local
/// offset cannot be determined.
pub(crate) fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

/// What IP2 should do with spectra files after they are uploaded.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Convert `.raw` files on the server.
    pub convert: bool,
    /// Monoisotopic precursor mass correction during conversion.
    pub monoisotopic: bool,
}

impl UploadOptions {
    pub(crate) fn flags(&self) -> [(&'static str, String); 2] {
        let ok_ko = |b: bool| if b { "ok" } else { "ko" }.to_string();
        [("flag", ok_ko(self.convert)), ("monoIso", ok_ko(self.monoisotopic))]
    }
}

/// Form fields of a ProLuCID search, e.g. `sp.minPeptideLength`.
///
/// The fields identifying the experiment and database are added by
/// [crate::Experiment::prolucid_search] and override these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams(BTreeMap<String, String>);

impl SearchParams {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl ToString) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl ToString) {
        self.0.insert(field.into(), value.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for SearchParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = SearchParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}
