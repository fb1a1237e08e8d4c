use clap::Args;

use super::Task;
use super::OutputArg;
use super::PartnerRegionsArg;
use crate::errors::CommandError;
use crate::subcommand_def;
use crate::progress::ProgressObserver;
use crate::toolkit::GrassCommand;
use crate::toolkit::GrassSession;
use crate::toolkit::Toolkit;
use crate::workspace::with_temporary_location;
use crate::workspace::TemporaryLocation;
use crate::attributes::columns::ColumnListing;
use crate::attributes::reconcile::reconciliation_plan;

pub(crate) const MASTER_MAP: &str = "partner_master";
pub(crate) const NEW_PARTNER_MAP: &str = "partner_new";
pub(crate) const OVERLAY_MAP: &str = "partner_master_new_1";
pub(crate) const CLEANED_MAP: &str = "partner_master_new_2";
pub(crate) const DISSOLVED_MAP: &str = "partner_master_new_3";

const MASTER_SNAP: &str = "0.1";
// v.import with snap=-1 leaves the new partner unsnapped, its units aren't known until it's reprojected.
const NEW_PARTNER_SNAP: &str = "-1";
const OVERLAY_SNAP: &str = "0.01";
const MIN_AREA: &str = "50000000";

subcommand_def!{
    /// Adds a new partner region to existing partner regions, merging the dissemination center codes and dissolving by them.
    pub(crate) struct AddRegion {

        #[clap(flatten)]
        pub(crate) partner: PartnerRegionsArg,

        #[arg(long)]
        /// Name of OGR datasource with new partner
        pub(crate) new_partner: String,

        #[arg(long)]
        /// OGR layer name for new partner. If not given, all available layers are used
        pub(crate) new_partner_layer: Option<String>,

        #[arg(long,default_value="DISS_CENTR")]
        /// Name of the column with dissemination center code
        pub(crate) column: String,

        #[clap(flatten)]
        pub(crate) output: OutputArg,

    }
}

impl Task for AddRegion {

    fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {
        let mut grass = GrassSession::connect()?;
        self.run_with_toolkit(&mut grass, progress)
    }
}

impl AddRegion {

    pub(crate) fn run_with_toolkit<Grass: Toolkit, Progress: ProgressObserver>(&self, grass: &mut Grass, progress: &mut Progress) -> Result<(),CommandError> {
        with_temporary_location(grass, progress, |location| self.run_in_location(location))
    }

    fn run_in_location<Grass: Toolkit, Progress: ProgressObserver>(&self, location: &mut TemporaryLocation<'_,Grass,Progress>) -> Result<(),CommandError> {

        location.progress().announce("Importing partner regions");
        let import = GrassCommand::new("v.in.ogr")
            .option("input", self.partner.partner_regions.as_str())
            .optional("layer", self.partner.partner_regions_layer.as_deref())
            .option("output", MASTER_MAP)
            .option("location", location.name())
            .option("snap", MASTER_SNAP);
        location.grass().run(&import)?;

        location.switch_to()?;
        let (grass,progress) = location.session();

        ColumnListing::read(grass, MASTER_MAP)?.require(&self.column, &self.partner.partner_regions)?;

        progress.announce("Importing new partner");
        grass.run(&GrassCommand::new("v.import")
            .option("input", self.new_partner.as_str())
            .optional("layer", self.new_partner_layer.as_deref())
            .option("output", NEW_PARTNER_MAP)
            .option("snap", NEW_PARTNER_SNAP))?;

        ColumnListing::read(grass, NEW_PARTNER_MAP)?.require(&self.column, &self.new_partner)?;

        progress.announce("Combining partner regions");
        grass.run(&GrassCommand::new("v.overlay")
            .option("ainput", MASTER_MAP)
            .option("atype", "area")
            .option("binput", NEW_PARTNER_MAP)
            .option("btype", "area")
            .option("operator", "or")
            .option("output", OVERLAY_MAP)
            .option("olayer", "1,0,0")
            .option("snap", OVERLAY_SNAP))?;

        progress.announce("Merging dissemination center codes");
        grass.run(&GrassCommand::new("v.db.addcolumn")
            .option("map", OVERLAY_MAP)
            .option("columns", format!("{} varchar(254)",self.column)))?;

        for update in reconciliation_plan(&self.column) {
            grass.run(&update.to_command(OVERLAY_MAP))?;
        }

        progress.announce("Removing small gaps and overlaps");
        grass.run(&GrassCommand::new("v.clean")
            .option("input", OVERLAY_MAP)
            .option("output", CLEANED_MAP)
            .option("tool", "rmarea")
            .option("threshold", MIN_AREA)
            .flags("c"))?;

        progress.announce("Dissolving by dissemination center code");
        grass.run(&GrassCommand::new("v.dissolve")
            .option("input", CLEANED_MAP)
            .option("output", DISSOLVED_MAP)
            .option("column", self.column.as_str()))?;

        progress.announce("Exporting merged partner regions");
        grass.run(&self.output.export_command(DISSOLVED_MAP))

    }

}
