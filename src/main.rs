mod check;
mod files;
mod list;
mod search;
mod upload;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use tracing_subscriber::EnvFilter;

use ip2api::types::{Ip2Url, Username};
use ip2api::{Session, UploadOptions, DEFAULT_HELPER_EXPERIMENT, DEFAULT_PROJECT};

#[derive(Parser)]
#[clap(
    author, version, about, long_about = None,
    propagate_version = false, disable_help_subcommand = true
)]
struct Cli {
    /// IP2 address
    #[clap(short, long, env = "IP2_ADDRESS", default_value = "http://goldfish.scripps.edu")]
    address: String,

    /// account username
    #[clap(env = "IP2_USERNAME")]
    username: String,

    /// account password
    #[clap(env = "IP2_PASSWORD", hide_env_values = true)]
    password: String,

    /// project used for searches and lookups
    #[clap(long, env = "IP2_PROJECT", default_value = DEFAULT_PROJECT)]
    project: String,

    /// experiment used for lookups which IP2 only answers on an experiment page
    #[clap(long, env = "IP2_HELPER_EXPERIMENT", default_value = DEFAULT_HELPER_EXPERIMENT)]
    helper_experiment: String,

    #[clap(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Try out logging in, the default project and listings (default)
    Check,

    /// List my projects
    Projects,

    /// List the experiments of a project
    Experiments {
        /// project name
        project: String,
    },

    /// List the protein databases I can search against
    Databases,

    /// List instruments
    Instruments,

    /// List organisms
    Organisms,

    /// Create a project
    CreateProject {
        /// project name
        name: String,

        /// project description
        #[clap(short, long, default_value_t = String::new())]
        description: String,
    },

    /// Create an experiment in a project
    CreateExperiment {
        /// project name
        project: String,

        /// experiment name
        name: String,

        /// experiment description
        #[clap(short, long, default_value_t = String::new())]
        description: String,
    },

    /// Upload spectra files to an experiment
    Upload {
        /// project name
        project: String,

        /// experiment name
        experiment: String,

        /// Files and directories to upload
        #[clap(required = true)]
        files: Vec<Utf8PathBuf>,

        /// convert .raw files after upload
        #[clap(long)]
        convert: bool,

        /// monoisotopic precursor mass correction during conversion
        #[clap(long)]
        monoisotopic: bool,
    },

    /// Upload spectra to a new experiment and search them with ProLuCID
    Search {
        /// name of the experiment to create
        name: String,

        /// file name of the protein database
        #[clap(short, long)]
        database: String,

        /// search form field, e.g. sp.minPeptideLength=6
        #[clap(short, long = "param", value_parser = search::parse_param)]
        params: Vec<(String, String)>,

        /// convert .raw files after upload
        #[clap(long)]
        convert: bool,

        /// monoisotopic precursor mass correction during conversion
        #[clap(long)]
        monoisotopic: bool,

        /// Files and directories to upload
        #[clap(required = true)]
        files: Vec<Utf8PathBuf>,
    },

    /// Show the status of the search job of an experiment in the default project
    Status {
        /// experiment name
        experiment: String,
    },

    /// Print the DTASelect-filter results of an experiment's search
    Dtaselect {
        /// project name
        project: String,

        /// experiment name
        experiment: String,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Cli = Cli::parse();
    let address = Ip2Url::try_from(args.address)?;
    let session = Session::build(address)?
        .default_project(args.project)
        .helper_experiment(args.helper_experiment)
        .login(Username::new(args.username), &args.password)?;

    // log out also when the command failed
    let result = run(&session, args.command.unwrap_or(Commands::Check));
    let logout = session.logout();
    result?;
    logout?;
    Ok(())
}

fn run(session: &Session, command: Commands) -> Result<()> {
    match command {
        Commands::Check => check::check(session)?,
        Commands::Projects => list::projects(session)?,
        Commands::Experiments { project } => list::experiments(session, &project)?,
        Commands::Databases => list::databases(session)?,
        Commands::Instruments => list::instruments(session)?,
        Commands::Organisms => list::organisms(session)?,
        Commands::CreateProject { name, description } => {
            list::create_project(session, &name, &description)?
        }
        Commands::CreateExperiment {
            project,
            name,
            description,
        } => list::create_experiment(session, &project, &name, description)?,
        Commands::Upload {
            project,
            experiment,
            files,
            convert,
            monoisotopic,
        } => upload::upload(session, &project, &experiment, &files, convert, monoisotopic)?,
        Commands::Search {
            name,
            database,
            params,
            convert,
            monoisotopic,
            files,
        } => {
            let options = UploadOptions {
                convert,
                monoisotopic,
            };
            search::search(session, name, &database, params, options, &files)?
        }
        Commands::Status { experiment } => search::status(session, &experiment)?,
        Commands::Dtaselect {
            project,
            experiment,
        } => search::dtaselect(session, &project, &experiment)?,
    };
    Ok(())
}
