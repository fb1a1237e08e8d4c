use std::env;
use std::fmt::Display;
use std::io::Write;
use std::process::Command;
use std::process::ExitStatus;
use std::process::Stdio;

use crate::errors::CommandError;

/**
A single invocation of a GRASS module, such as `v.overlay ainput=... binput=... operator=or`.

Options keep the order they were added in, flags are collected into one `-abc` argument.
*/
#[derive(Clone,Debug,PartialEq,Eq)]
pub(crate) struct GrassCommand {
    module: &'static str,
    options: Vec<(&'static str,String)>,
    flags: String,
    quiet: bool
}

impl GrassCommand {

    pub(crate) fn new(module: &'static str) -> Self {
        Self {
            module,
            options: Vec::new(),
            flags: String::new(),
            quiet: false
        }
    }

    #[must_use]
    pub(crate) fn option<Value: Into<String>>(mut self, key: &'static str, value: Value) -> Self {
        self.options.push((key,value.into()));
        self
    }

    /// Adds the option only if a value was given, for optional pass-through arguments like layer names.
    #[must_use]
    pub(crate) fn optional(self, key: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.option(key, value),
            None => self
        }
    }

    #[must_use]
    pub(crate) fn flags(mut self, flags: &str) -> Self {
        self.flags.push_str(flags);
        self
    }

    #[must_use]
    pub(crate) fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    pub(crate) const fn module(&self) -> &'static str {
        self.module
    }

    #[cfg(test)]
    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.options.iter().find(|(option,_)| *option == key).map(|(_,value)| value.as_str())
    }

    #[cfg(test)]
    pub(crate) fn has_flag(&self, flag: char) -> bool {
        self.flags.contains(flag)
    }

    pub(crate) fn arguments(&self) -> Vec<String> {
        let mut result: Vec<String> = self.options.iter().map(|(key,value)| format!("{key}={value}")).collect();
        if !self.flags.is_empty() {
            result.push(format!("-{}",self.flags));
        }
        if self.quiet {
            result.push("--quiet".to_owned());
        }
        result
    }

}

impl Display for GrassCommand {

    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f,"{}",self.module)?;
        for argument in self.arguments() {
            if argument.contains(' ') {
                // quote only the value, so it reads like it would be typed in a shell
                match argument.split_once('=') {
                    Some((key,value)) => write!(f," {key}=\"{value}\"")?,
                    None => write!(f," \"{argument}\"")?
                }
            } else {
                write!(f," {argument}")?;
            }
        }
        Ok(())
    }
}

/**
The vector toolkit that does the actual GIS work. The pipelines only ever talk to it through this trait, which
lets them be run against a recording fake in tests.
*/
pub(crate) trait Toolkit {

    /// Runs the command, passing its output through to the terminal.
    fn run(&mut self, command: &GrassCommand) -> Result<(),CommandError>;

    /// Runs the command and returns what it wrote to stdout.
    fn read(&mut self, command: &GrassCommand) -> Result<String,CommandError>;

    /// Runs the command, feeding it the input on stdin.
    fn write(&mut self, command: &GrassCommand, input: &str) -> Result<(),CommandError>;

}

/// Runs GRASS modules as child processes of the current GRASS session.
pub(crate) struct GrassSession;

impl GrassSession {

    pub(crate) fn connect() -> Result<Self,CommandError> {
        match env::var_os("GISRC") {
            Some(gisrc) if !gisrc.is_empty() => Ok(Self),
            _ => Err(CommandError::NotInGrassSession)
        }
    }

    fn process(command: &GrassCommand) -> Command {
        let mut process = Command::new(command.module());
        _ = process.args(command.arguments());
        process
    }

    fn check(command: &GrassCommand, status: ExitStatus) -> Result<(),CommandError> {
        if status.success() {
            Ok(())
        } else {
            Err(CommandError::ToolkitFailed(command.to_string(), status.code()))
        }
    }

}

impl Toolkit for GrassSession {

    fn run(&mut self, command: &GrassCommand) -> Result<(),CommandError> {
        let status = Self::process(command).status().map_err(|e| CommandError::ToolkitSpawn(command.to_string(), e.to_string()))?;
        Self::check(command, status)
    }

    fn read(&mut self, command: &GrassCommand) -> Result<String,CommandError> {
        let output = Self::process(command)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| CommandError::ToolkitSpawn(command.to_string(), e.to_string()))?;
        Self::check(command, output.status)?;
        String::from_utf8(output.stdout).map_err(|e| CommandError::ToolkitOutput(command.to_string(), e.to_string()))
    }

    fn write(&mut self, command: &GrassCommand, input: &str) -> Result<(),CommandError> {
        let mut child = Self::process(command)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| CommandError::ToolkitSpawn(command.to_string(), e.to_string()))?;
        let written = match child.stdin.take() {
            // stdin is dropped at the end of this arm, so the module sees the end of input
            Some(mut stdin) => stdin.write_all(input.as_bytes()),
            None => Ok(())
        };
        // waited for even if the write failed, a module that quit early is reported by its exit status.
        let status = child.wait().map_err(|e| CommandError::ToolkitOutput(command.to_string(), e.to_string()))?;
        Self::check(command, status)?;
        written.map_err(|e| CommandError::ToolkitOutput(command.to_string(), e.to_string()))
    }

}

#[cfg(test)]
mod test {

    use super::GrassCommand;
    use super::GrassSession;
    use super::Toolkit;
    use crate::errors::CommandError;

    #[test]
    fn test_command_arguments() {
        let command = GrassCommand::new("v.clean")
            .option("input", "partner_master_new_1")
            .option("tool", "rmarea")
            .flags("c")
            .quiet();
        assert_eq!(command.arguments(),vec!["input=partner_master_new_1","tool=rmarea","-c","--quiet"]);
        assert_eq!(command.get("tool"),Some("rmarea"));
        assert_eq!(command.get("output"),None);
        assert!(command.has_flag('c'));
    }

    #[test]
    fn test_command_optional() {
        let command = GrassCommand::new("v.import")
            .option("input", "regions.gpkg")
            .optional("layer", None);
        assert_eq!(command.arguments(),vec!["input=regions.gpkg"]);
        let command = command.optional("layer", Some("partners"));
        assert_eq!(command.get("layer"),Some("partners"));
    }

    #[test]
    fn test_command_display() {
        let command = GrassCommand::new("v.db.update")
            .option("map", "basins")
            .option("where", "cat = 3")
            .flags("ms");
        assert_eq!(command.to_string(),"v.db.update map=basins where=\"cat = 3\" -ms")
    }

    #[cfg(unix)]
    #[test]
    fn test_write_reports_exit_status_over_broken_pipe() {
        // `false` exits without reading its input, so the write runs into a closed pipe.
        let input = "UPDATE basins SET MOUids_all = NULL;\n".repeat(100_000);
        let err = GrassSession.write(&GrassCommand::new("false"), &input).unwrap_err();
        assert!(matches!(err,CommandError::ToolkitFailed(command,Some(1)) if command == "false"));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_reports_broken_pipe_after_success() {
        let input = "UPDATE basins SET MOUids_all = NULL;\n".repeat(100_000);
        let err = GrassSession.write(&GrassCommand::new("true"), &input).unwrap_err();
        assert!(matches!(err,CommandError::ToolkitOutput(command,_) if command == "true"));
    }

}
