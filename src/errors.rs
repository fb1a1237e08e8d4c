use std::error::Error;
use std::fmt::Display;

pub(crate) use clap::error::Error as ArgumentError;

#[derive(Debug)]
pub(crate) enum CommandError {
    NotInGrassSession,
    MissingGisEnv(&'static str),
    ToolkitSpawn(String,String),
    ToolkitFailed(String,Option<i32>),
    ToolkitOutput(String,String),
    MissingColumn(String,String),
    MissingAttributeTable(String),
    InvalidColumnListing(String),
    InvalidDatabaseLink(String),
    InvalidCategory(String),
    InvalidPartnerId(String),
    RemoveTemporaryLocation(String,String),
    DocsWrite(String),
}

impl Error for CommandError {

}

impl Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotInGrassSession => write!(f,"This command must be run from within a GRASS GIS session (GISRC is not set)."),
            Self::MissingGisEnv(a) => write!(f,"GRASS environment variable {a} is not set."),
            Self::ToolkitSpawn(command, err) => write!(f,"Could not start <{command}>: {err}"),
            Self::ToolkitFailed(command, Some(code)) => write!(f,"<{command}> failed with exit code {code}"),
            Self::ToolkitFailed(command, None) => write!(f,"<{command}> was terminated by a signal"),
            Self::ToolkitOutput(command, err) => write!(f,"Could not exchange data with <{command}>: {err}"),
            Self::MissingColumn(column, input) => write!(f,"Column <{column}> not found in input <{input}>"),
            Self::MissingAttributeTable(map) => write!(f,"Vector map <{map}> has no attribute table linked to layer 1."),
            Self::InvalidColumnListing(a) => write!(f,"Invalid column description ('{a}') in column listing."),
            Self::InvalidDatabaseLink(a) => write!(f,"Invalid database connection ('{a}') in vector map."),
            Self::InvalidCategory(a) => write!(f,"Invalid value ('{a}') for category."),
            Self::InvalidPartnerId(a) => write!(f,"Invalid value ('{a}') for partner ID, expected integers."),
            Self::RemoveTemporaryLocation(path, err) => write!(f,"Could not remove temporary location <{path}>: {err}"),
            Self::DocsWrite(a) => write!(f,"Error writing documentation: {a}"),
        }
    }
}

#[derive(Debug)]
pub(crate) enum ProgramError {
    ArgumentError(ArgumentError),
    CommandError(CommandError)
}

impl Error for ProgramError {

}

impl Display for ProgramError {

    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ArgumentError(a) => write!(f,"{a}"),
            Self::CommandError(a) => write!(f,"ERROR: {a}"),
        }
    }
}

impl From<ArgumentError> for ProgramError {

    fn from(value: ArgumentError) -> Self {
        Self::ArgumentError(value)
    }
}

impl From<CommandError> for ProgramError {

    fn from(value: CommandError) -> Self {
        Self::CommandError(value)
    }
}
