use aliri_braid::braid;

/// *IP2* user's username.
#[braid(serde)]
pub struct Username;

/// Name of a project.
#[braid(serde)]
pub struct ProjectName;

/// Name of an experiment, which IP2 calls the "sample name".
#[braid(serde)]
pub struct ExperimentName;

/// Server-side directory of an experiment's files.
///
/// # Examples
///
/// - `/ip2_data/me/my_project/my_experiment_2024_01_31_12_345`
#[braid(serde)]
pub struct ExperimentPath;

/// File name of a protein database, e.g. `UniProt_Human_01-01-2024_reversed.fasta`
#[braid(serde)]
pub struct DatabaseFile;
