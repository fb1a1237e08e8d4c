use indexmap::IndexMap;

use crate::errors::CommandError;
use crate::toolkit::GrassCommand;
use crate::toolkit::Toolkit;

/**
The attribute columns of a vector map, as listed by `v.info -c`.

Each row of the listing is a `|` separated descriptor whose second field is the column name, for example
`INTEGER|cat`. The leading field is kept alongside the name.
*/
#[derive(Debug,Default,PartialEq,Eq)]
pub(crate) struct ColumnListing {
    columns: IndexMap<String,String>
}

impl ColumnListing {

    pub(crate) fn read<Grass: Toolkit>(grass: &mut Grass, map: &str) -> Result<Self,CommandError> {
        let text = grass.read(&GrassCommand::new("v.info").option("map", map).flags("c"))?;
        Self::parse(&text)
    }

    pub(crate) fn parse(text: &str) -> Result<Self,CommandError> {
        let mut columns = IndexMap::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.split('|');
            let descriptor = fields.next().unwrap_or_default();
            let Some(name) = fields.next() else {
                return Err(CommandError::InvalidColumnListing(line.to_owned()))
            };
            _ = columns.insert(name.to_owned(), descriptor.to_owned());
        }
        Ok(Self {
            columns
        })
    }

    /// Exact, case-sensitive match on the column name.
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Fails with a message naming both the column and the datasource it was expected in.
    pub(crate) fn require(&self, name: &str, input: &str) -> Result<(),CommandError> {
        if self.contains(name) {
            Ok(())
        } else {
            Err(CommandError::MissingColumn(name.to_owned(), input.to_owned()))
        }
    }

    #[cfg(test)]
    pub(crate) fn names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

}
