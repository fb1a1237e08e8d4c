use crate::errors::CommandError;
use crate::toolkit::GrassCommand;
use crate::toolkit::Toolkit;

/// One attribute table connection of a vector map, from `v.db.connect -g`.
#[derive(Clone,Debug,PartialEq,Eq)]
pub(crate) struct DatabaseLink {
    pub(crate) layer: u32,
    pub(crate) table: String,
    pub(crate) key: String,
    pub(crate) database: String,
    pub(crate) driver: String
}

impl DatabaseLink {

    /// Parses rows of the form `layer|table|key|database|driver`. The layer may carry a name, as in `1/basins`.
    pub(crate) fn parse(text: &str) -> Result<Vec<Self>,CommandError> {
        let mut result = Vec::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('|').collect();
            let [layer, table, key, database, driver] = fields.as_slice() else {
                return Err(CommandError::InvalidDatabaseLink(line.to_owned()))
            };
            let layer = layer.split('/').next().unwrap_or_default();
            let layer = layer.trim().parse::<u32>().map_err(|_| CommandError::InvalidDatabaseLink(line.to_owned()))?;
            result.push(Self {
                layer,
                table: (*table).to_owned(),
                key: (*key).to_owned(),
                database: (*database).to_owned(),
                driver: (*driver).to_owned()
            })
        }
        Ok(result)
    }

    pub(crate) fn read<Grass: Toolkit>(grass: &mut Grass, map: &str) -> Result<Vec<Self>,CommandError> {
        let text = grass.read(&GrassCommand::new("v.db.connect")
            .option("map", map)
            .option("separator", "pipe")
            .flags("g"))?;
        Self::parse(&text)
    }

    pub(crate) fn find_layer(links: Vec<Self>, layer: u32) -> Option<Self> {
        links.into_iter().find(|link| link.layer == layer)
    }

}

/// Makes sure the map has an attribute table on layer 1, adding one if necessary.
pub(crate) fn ensure_attribute_table<Grass: Toolkit>(grass: &mut Grass, map: &str) -> Result<DatabaseLink,CommandError> {
    if let Some(link) = DatabaseLink::find_layer(DatabaseLink::read(grass, map)?, 1) {
        return Ok(link)
    }
    grass.run(&GrassCommand::new("v.db.addtable").option("map", map))?;
    DatabaseLink::find_layer(DatabaseLink::read(grass, map)?, 1).ok_or_else(|| CommandError::MissingAttributeTable(map.to_owned()))
}

/// Sets every value of the column to NULL with a raw SQL statement.
pub(crate) fn clear_column<Grass: Toolkit>(grass: &mut Grass, link: &DatabaseLink, column: &str) -> Result<(),CommandError> {
    let statement = format!("UPDATE {} SET {column} = NULL",link.table);
    grass.write(&GrassCommand::new("db.execute")
        .option("input", "-")
        .option("database", link.database.as_str())
        .option("driver", link.driver.as_str()), &statement)
}

#[cfg(test)]
mod test {

    use super::DatabaseLink;

    #[test]
    fn test_parse_links() {
        let links = DatabaseLink::parse("1/basins|basins|cat|/grassdata/tmp/PERMANENT/sqlite/sqlite.db|sqlite\n2|basins_2|cat|/grassdata/tmp/PERMANENT/sqlite/sqlite.db|sqlite\n").unwrap();
        assert_eq!(links.len(),2);
        assert_eq!(links[0].layer,1);
        assert_eq!(links[0].table,"basins");
        assert_eq!(links[1].layer,2);
        assert_eq!(links[1].driver,"sqlite");
        let layer_one = DatabaseLink::find_layer(links, 1).unwrap();
        assert_eq!(layer_one.key,"cat");
    }

    #[test]
    fn test_parse_no_links() {
        let links = DatabaseLink::parse("").unwrap();
        assert!(DatabaseLink::find_layer(links, 1).is_none());
    }

    #[test]
    fn test_parse_invalid_link() {
        assert!(DatabaseLink::parse("1|basins|cat").is_err());
        assert!(DatabaseLink::parse("one|basins|cat|db|sqlite").is_err());
    }

}
