use std::collections::BTreeSet;

use crate::errors::CommandError;
use crate::progress::ProgressObserver;
use crate::progress::WatchableIterator;
use crate::toolkit::GrassCommand;
use crate::toolkit::Toolkit;

/// Category numbers, one per row, returned sorted and without duplicates.
pub(crate) fn parse_categories(text: &str) -> Result<Vec<i64>,CommandError> {
    let mut categories = BTreeSet::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        _ = categories.insert(line.parse::<i64>().map_err(|_| CommandError::InvalidCategory(line.to_owned()))?);
    }
    Ok(categories.into_iter().collect())
}

/**
Merges partner ID values into one comma-separated list, sorted in ascending numeric order without duplicates.

Each value may itself already be a list such as `1,2`. Empty components are NULL values and are skipped. Returns
`None` if there was nothing to merge, so the caller can leave the target NULL instead of writing an empty string.
*/
pub(crate) fn aggregate_partner_ids<'rows, Rows: IntoIterator<Item = &'rows str>>(rows: Rows) -> Result<Option<String>,CommandError> {
    let mut ids = BTreeSet::new();
    for row in rows {
        for component in row.split(',') {
            let component = component.trim();
            if component.is_empty() {
                continue;
            }
            _ = ids.insert(component.parse::<i64>().map_err(|_| CommandError::InvalidPartnerId(component.to_owned()))?);
        }
    }
    if ids.is_empty() {
        Ok(None)
    } else {
        Ok(Some(ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")))
    }
}

/// Where the per-basin partner IDs come from, and where they go.
pub(crate) struct BasinTagging<'names> {
    pub(crate) basins: &'names str,
    pub(crate) overlay: &'names str,
    pub(crate) partner_id_column: &'names str,
    pub(crate) all_partner_id_column: &'names str
}

impl BasinTagging<'_> {

    /// Returns the number of basins that overlapped at least one partner region.
    pub(crate) fn run<Grass: Toolkit, Progress: ProgressObserver>(&self, grass: &mut Grass, progress: &mut Progress) -> Result<usize,CommandError> {

        let categories = parse_categories(&grass.read(&GrassCommand::new("v.db.select")
            .option("map", self.basins)
            .option("column", "cat")
            .flags("c"))?)?;

        let query_column = format!("b_{}",self.partner_id_column);
        let mut tagged = 0;

        let start = format!("Updating {} basins with partner region IDs, this can take some time..",categories.len());
        for category in categories.into_iter().watch(progress, start, "Basins updated.") {

            let partner_ids = grass.read(&GrassCommand::new("v.db.select")
                .option("map", self.overlay)
                .option("column", query_column.as_str())
                .option("where", format!("a_cat = {category}"))
                .flags("c"))?;

            if let Some(list) = aggregate_partner_ids(partner_ids.lines())? {
                grass.run(&GrassCommand::new("v.db.update")
                    .option("map", self.basins)
                    .option("column", self.all_partner_id_column)
                    .option("value", list)
                    .option("where", format!("cat = {category}"))
                    .quiet())?;
                tagged += 1;
            }
        }

        Ok(tagged)
    }
}
