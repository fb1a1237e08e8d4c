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
use crate::attributes::database::ensure_attribute_table;
use crate::attributes::database::clear_column;
use crate::attributes::aggregate::BasinTagging;

pub(crate) const BASINS_MAP: &str = "basins";
pub(crate) const PARTNERS_MAP: &str = "partner_regions_1";
pub(crate) const CLEANED_PARTNERS_MAP: &str = "partner_regions_2";
pub(crate) const OVERLAY_MAP: &str = "basins_partners";

// the snapping distances assume the data is in meters.
const BASINS_SNAP: &str = "10";
const PARTNERS_SNAP: &str = "0.01";
const OVERLAY_SNAP: &str = "0.01";
const MIN_GAP_SIZE: &str = "10000000";

subcommand_def!{
    /// Updates river basins with the IDs of all partner regions overlapping them.
    pub(crate) struct RiverBasins {

        #[clap(flatten)]
        pub(crate) partner: PartnerRegionsArg,

        #[arg(long,default_value="MOU_IDS")]
        /// Name of the column with partner ID
        pub(crate) partner_id: String,

        #[arg(long)]
        /// Name of OGR datasource with basins
        pub(crate) basins: String,

        #[arg(long)]
        /// OGR layer name for basins. If not given, all available layers are used
        pub(crate) basins_layer: Option<String>,

        #[arg(long,default_value="MOUids_all")]
        /// Name of the column with all partner IDs for basins
        pub(crate) all_partner_id: String,

        #[clap(flatten)]
        pub(crate) output: OutputArg,

    }
}

impl Task for RiverBasins {

    fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {
        let mut grass = GrassSession::connect()?;
        self.run_with_toolkit(&mut grass, progress)
    }
}

impl RiverBasins {

    pub(crate) fn run_with_toolkit<Grass: Toolkit, Progress: ProgressObserver>(&self, grass: &mut Grass, progress: &mut Progress) -> Result<(),CommandError> {
        with_temporary_location(grass, progress, |location| self.run_in_location(location))
    }

    fn run_in_location<Grass: Toolkit, Progress: ProgressObserver>(&self, location: &mut TemporaryLocation<'_,Grass,Progress>) -> Result<(),CommandError> {

        location.progress().announce("Importing basins");
        let import = GrassCommand::new("v.in.ogr")
            .option("input", self.basins.as_str())
            .optional("layer", self.basins_layer.as_deref())
            .option("output", BASINS_MAP)
            .option("location", location.name())
            .option("snap", BASINS_SNAP);
        location.grass().run(&import)?;

        location.switch_to()?;
        let (grass,progress) = location.session();

        self.prepare_target_column(grass, progress)?;

        progress.announce("Importing partner regions");
        grass.run(&GrassCommand::new("v.import")
            .option("input", self.partner.partner_regions.as_str())
            .optional("layer", self.partner.partner_regions_layer.as_deref())
            .option("output", PARTNERS_MAP)
            .option("snap", PARTNERS_SNAP))?;

        ColumnListing::read(grass, PARTNERS_MAP)?.require(&self.partner_id, &self.partner.partner_regions)?;

        progress.announce("Removing small gaps and overlaps from partner regions");
        grass.run(&GrassCommand::new("v.clean")
            .option("input", PARTNERS_MAP)
            .option("output", CLEANED_PARTNERS_MAP)
            .option("tool", "rmarea")
            .option("threshold", MIN_GAP_SIZE)
            .flags("c"))?;

        progress.announce("Intersecting basins with partner regions");
        grass.run(&GrassCommand::new("v.overlay")
            .option("ainput", BASINS_MAP)
            .option("atype", "area")
            .option("binput", CLEANED_PARTNERS_MAP)
            .option("btype", "area")
            .option("operator", "and")
            .option("output", OVERLAY_MAP)
            .option("olayer", "1,0,0")
            .option("snap", OVERLAY_SNAP))?;

        progress.announce("Collecting partner IDs per basin");
        let tagged = BasinTagging {
            basins: BASINS_MAP,
            overlay: OVERLAY_MAP,
            partner_id_column: &self.partner_id,
            all_partner_id_column: &self.all_partner_id
        }.run(grass, progress)?;
        progress.announce(&format!("{tagged} basins overlap partner regions"));

        progress.announce("Exporting basins");
        grass.run(&self.output.export_command(BASINS_MAP))

    }

    /// The basins need an attribute table with an empty column for the partner ID lists.
    fn prepare_target_column<Grass: Toolkit, Progress: ProgressObserver>(&self, grass: &mut Grass, progress: &Progress) -> Result<(),CommandError> {
        let link = ensure_attribute_table(grass, BASINS_MAP)?;

        if ColumnListing::read(grass, BASINS_MAP)?.contains(&self.all_partner_id) {
            progress.warning(|| format!("Existing values in column <{}> of <{}> will be replaced.",self.all_partner_id,self.basins));
            clear_column(grass, &link, &self.all_partner_id)
        } else {
            grass.run(&GrassCommand::new("v.db.addcolumn")
                .option("map", BASINS_MAP)
                .option("columns", format!("{} varchar(255)",self.all_partner_id)))
        }
    }

}
