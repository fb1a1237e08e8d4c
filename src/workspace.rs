use std::fs;
use std::path::PathBuf;
use std::process;

use crate::errors::CommandError;
use crate::progress::ProgressObserver;
use crate::toolkit::GrassCommand;
use crate::toolkit::Toolkit;

pub(crate) const TEMPORARY_LOCATION_PREFIX: &str = "ECMWF_temp_location_";
pub(crate) const TEMPORARY_MAPSET: &str = "PERMANENT";

/// The parts of the GRASS environment needed to come back to where the user started.
#[derive(Clone,Debug,PartialEq,Eq)]
pub(crate) struct GisEnv {
    pub(crate) gisdbase: PathBuf,
    pub(crate) location: String,
    pub(crate) mapset: String
}

impl GisEnv {

    pub(crate) fn read<Grass: Toolkit>(grass: &mut Grass) -> Result<Self,CommandError> {
        let text = grass.read(&GrassCommand::new("g.gisenv").flags("n"))?;
        Self::parse(&text)
    }

    /// Parses `KEY=value` lines. Values may also be in the shell form `KEY='value';`.
    pub(crate) fn parse(text: &str) -> Result<Self,CommandError> {
        let mut gisdbase = None;
        let mut location = None;
        let mut mapset = None;
        for line in text.lines() {
            if let Some((key,value)) = line.split_once('=') {
                let value = value.trim().trim_end_matches(';').trim_matches('\'').to_owned();
                match key.trim() {
                    "GISDBASE" => gisdbase = Some(value),
                    "LOCATION_NAME" => location = Some(value),
                    "MAPSET" => mapset = Some(value),
                    _ => ()
                }
            }
        }
        Ok(Self {
            gisdbase: gisdbase.map(PathBuf::from).ok_or(CommandError::MissingGisEnv("GISDBASE"))?,
            location: location.ok_or(CommandError::MissingGisEnv("LOCATION_NAME"))?,
            mapset: mapset.ok_or(CommandError::MissingGisEnv("MAPSET"))?
        })
    }
}

/**
A throw-away GRASS location that holds every intermediate map of a run.

The location itself is created by the first import (which is given [`Self::name`] as its target location). Once the
import has succeeded, [`Self::switch_to`] makes it the current location. Releasing switches back to the user's original
location and mapset (only if the switch happened) and removes the location directory. Release happens once, either
through [`Self::release`] or when the guard is dropped. A failed release on drop is reported as a warning to the
progress observer the location was prepared with.
*/
pub(crate) struct TemporaryLocation<'session,Grass: Toolkit,Progress: ProgressObserver> {
    grass: &'session mut Grass,
    progress: &'session mut Progress,
    original: GisEnv,
    name: String,
    switched: bool,
    released: bool
}

impl<'session,Grass: Toolkit,Progress: ProgressObserver> TemporaryLocation<'session,Grass,Progress> {

    pub(crate) fn prepare(grass: &'session mut Grass, progress: &'session mut Progress) -> Result<Self,CommandError> {
        let original = GisEnv::read(grass)?;
        let name = format!("{TEMPORARY_LOCATION_PREFIX}{}",process::id());
        Ok(Self {
            grass,
            progress,
            original,
            name,
            switched: false,
            released: false
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn path(&self) -> PathBuf {
        self.original.gisdbase.join(&self.name)
    }

    pub(crate) fn grass(&mut self) -> &mut Grass {
        &mut *self.grass
    }

    pub(crate) fn progress(&mut self) -> &mut Progress {
        &mut *self.progress
    }

    /// Both collaborators at once, for pipeline steps that report progress while running commands.
    pub(crate) fn session(&mut self) -> (&mut Grass,&mut Progress) {
        (&mut *self.grass,&mut *self.progress)
    }

    pub(crate) fn switch_to(&mut self) -> Result<(),CommandError> {
        self.grass.run(&GrassCommand::new("g.mapset")
            .option("location", self.name.as_str())
            .option("mapset", TEMPORARY_MAPSET))?;
        self.switched = true;
        Ok(())
    }

    pub(crate) fn release(mut self) -> Result<(),CommandError> {
        self.cleanup()
    }

    fn cleanup(&mut self) -> Result<(),CommandError> {
        if self.released {
            return Ok(())
        }
        self.released = true;

        // both steps are attempted even if the first fails, the first error is reported.
        let switched_back = if self.switched {
            self.grass.run(&GrassCommand::new("g.mapset")
                .option("location", self.original.location.as_str())
                .option("mapset", self.original.mapset.as_str()))
        } else {
            Ok(())
        };

        let path = self.path();
        let removed = if path.exists() {
            fs::remove_dir_all(&path).map_err(|e| CommandError::RemoveTemporaryLocation(path.display().to_string(), e.to_string()))
        } else {
            Ok(())
        };

        switched_back.and(removed)
    }

}

impl<Grass: Toolkit,Progress: ProgressObserver> Drop for TemporaryLocation<'_,Grass,Progress> {

    fn drop(&mut self) {
        if let Err(err) = self.cleanup() {
            self.progress.warning(|| err.to_string())
        }
    }
}

/**
Runs the callback inside a new temporary location. The location is released no matter how the callback ends. If the
callback failed, its error is returned even if releasing failed as well.
*/
pub(crate) fn with_temporary_location<Grass: Toolkit, Progress: ProgressObserver, Callback: FnOnce(&mut TemporaryLocation<'_,Grass,Progress>) -> Result<(),CommandError>>(grass: &mut Grass, progress: &mut Progress, callback: Callback) -> Result<(),CommandError> {
    let mut location = TemporaryLocation::prepare(grass, progress)?;
    let result = callback(&mut location);
    let released = location.release();
    result.and(released)
}
