use clap::Args;
use clap::Parser;
use clap::Subcommand;

use crate::errors::CommandError;
use crate::progress::ProgressObserver;
use crate::toolkit::GrassCommand;

mod add_region;
mod river_basins;
mod docs;

pub(crate) use add_region::AddRegion;
pub(crate) use river_basins::RiverBasins;
use docs::Docs;

pub(crate) const DEFAULT_OUTPUT_FORMAT: &str = "ESRI_Shapefile";

pub(crate) trait Task {

    fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError>;

}

#[macro_export]
macro_rules! command_def {
    ($struct_name: ident {$($command_name: ident),*}) => {

        #[derive(Subcommand)]
        pub(crate) enum $struct_name {
            $(
                $command_name($command_name)
            ),*
        }

        impl Task for $struct_name {

            fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {
                match self {
                    $(Self::$command_name(a) => a.run(progress)),*
                }
            }

        }
    };
}

#[macro_export]
macro_rules! subcommand_def {
    ($(#[$attr: meta])* $visibility: vis struct $name: ident $body: tt) => {
        #[derive(Args)]
        $(#[$attr])*
        $visibility struct $name $body
    };
}

command_def!{
    MainCommand {
        AddRegion,
        RiverBasins,
        Docs
    }
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Merges partner regions and tags river basins with partner region IDs. Must be run from within a GRASS GIS session.
pub(crate) struct EcmwfRegions {
    #[command(subcommand)]
    pub(crate) command: MainCommand
}

impl EcmwfRegions {

    pub(crate) fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {
        self.command.run(progress)
    }
}

subcommand_def!{
    pub(crate) struct PartnerRegionsArg {

        #[arg(long)]
        /// Name of OGR datasource with partner regions
        pub(crate) partner_regions: String,

        #[arg(long)]
        /// OGR layer name for partner regions. If not given, all available layers are used
        pub(crate) partner_regions_layer: Option<String>,

    }
}

subcommand_def!{
    pub(crate) struct OutputArg {

        #[arg(long)]
        /// Name of output OGR datasource, for example ESRI Shapefile filename or directory for storage
        pub(crate) output: String,

        #[arg(long)]
        /// Name for output OGR layer, for example the shapefile name without suffix
        pub(crate) output_layer: Option<String>,

        #[arg(long,default_value=DEFAULT_OUTPUT_FORMAT)]
        /// Data format to write, e.g. ESRI_Shapefile, GPKG (see v.out.ogr)
        pub(crate) format: String,

    }
}

impl OutputArg {

    /// Exports the areas of the map with `v.out.ogr`.
    pub(crate) fn export_command(&self, map: &str) -> GrassCommand {
        GrassCommand::new("v.out.ogr")
            .option("input", map)
            .option("output", self.output.as_str())
            .optional("output_layer", self.output_layer.as_deref())
            .option("type", "area")
            .option("format", self.format.as_str())
            .flags("ms")
    }
}
