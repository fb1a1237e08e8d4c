use std::path::PathBuf;
use std::path::Path;
use std::fs::File;
use std::io::Write;

use clap::Args;
use clap_markdown::help_markdown;

use crate::commands::EcmwfRegions;
use crate::commands::Task;
use crate::errors::CommandError;
use crate::subcommand_def;
use crate::progress::ProgressObserver;

fn write_command_help(target: &Path) -> Result<(),CommandError> {
    let mut file = File::create(target).map_err(|e| CommandError::DocsWrite(format!("{}: {e}",target.display())))?;
    write!(&mut file,"{}",help_markdown::<EcmwfRegions>()).map_err(|e| CommandError::DocsWrite(format!("{}: {e}",target.display())))
}

subcommand_def!{
    /// Writes the command line help as markdown to a folder.
    #[command(hide=true)]
    pub(crate) struct Docs {

        #[arg(long)]
        /// The folder to output the generated documentation to
        docs: PathBuf,

    }
}

impl Task for Docs {
    fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {
        let command_help = self.docs.join("Commands.md");
        write_command_help(&command_help)?;
        progress.announce(&format!("Wrote {}",command_help.display()));
        Ok(())
    }
}

#[cfg(test)]
mod test {

    use super::write_command_help;

    #[test]
    fn test_command_help_lists_commands() {
        let folder = tempfile::tempdir().unwrap();
        let target = folder.path().join("Commands.md");
        write_command_help(&target).unwrap();
        let written = std::fs::read_to_string(&target).unwrap();
        assert!(written.contains("add-region"));
        assert!(written.contains("river-basins"));
        assert!(written.contains("--partner-regions"));
    }

}
