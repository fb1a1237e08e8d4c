#[cfg(test)] use indexmap::IndexMap;

use crate::attributes::sql_string;
use crate::toolkit::GrassCommand;

/// Marks a merged value that neither overlay input has filled in yet.
pub(crate) const UNSET_SENTINEL: &str = "-1";

/// An attribute row as seen by the update conditions, NULL values are `None`.
#[cfg(test)]
pub(crate) type AttributeRow = IndexMap<String,Option<String>>;

#[derive(Clone,Debug,PartialEq,Eq)]
pub(crate) enum UpdateSource {
    Value(String),
    Column(String)
}

#[derive(Clone,Debug,PartialEq,Eq)]
pub(crate) enum UpdateCondition {
    Always,
    IsNotNull(String),
    Equals(String,String),
    All(Vec<UpdateCondition>)
}

impl UpdateCondition {

    pub(crate) fn to_sql(&self) -> Option<String> {
        match self {
            Self::Always => None,
            Self::IsNotNull(column) => Some(format!("{column} is not null")),
            Self::Equals(column, value) => Some(format!("{column} = {}",sql_string(value))),
            Self::All(conditions) => {
                let parts: Vec<String> = conditions.iter().filter_map(Self::to_sql).collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join(" and "))
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn matches(&self, row: &AttributeRow) -> bool {
        let value = |column: &str| row.get(column).and_then(Option::as_deref);
        match self {
            Self::Always => true,
            Self::IsNotNull(column) => value(column).is_some(),
            Self::Equals(column, expected) => value(column) == Some(expected.as_str()),
            Self::All(conditions) => conditions.iter().all(|condition| condition.matches(row))
        }
    }
}

/// A bulk `v.db.update` of one column, from a constant or another column, on the rows matching a condition.
#[derive(Clone,Debug,PartialEq,Eq)]
pub(crate) struct AttributeUpdate {
    pub(crate) column: String,
    pub(crate) source: UpdateSource,
    pub(crate) condition: UpdateCondition
}

impl AttributeUpdate {

    pub(crate) fn to_command(&self, map: &str) -> GrassCommand {
        let command = GrassCommand::new("v.db.update")
            .option("map", map)
            .option("column", self.column.as_str());
        let command = match &self.source {
            UpdateSource::Value(value) => command.option("value", value.as_str()),
            UpdateSource::Column(column) => command.option("query_column", column.as_str())
        };
        command.optional("where", self.condition.to_sql().as_deref())
    }

    #[cfg(test)]
    pub(crate) fn apply(&self, row: &mut AttributeRow) {
        if self.condition.matches(row) {
            let value = match &self.source {
                UpdateSource::Value(value) => Some(value.clone()),
                UpdateSource::Column(column) => row.get(column).cloned().flatten()
            };
            _ = row.insert(self.column.clone(), value);
        }
    }
}

/**
The updates that merge `a_<column>` and `b_<column>` of an overlay into `<column>`.

Every row is first reset to the sentinel. The first input's value then overwrites it wherever present, and the second
input's value only fills rows still holding the sentinel. The order is fixed: the first input always wins.
*/
pub(crate) fn reconciliation_plan(column: &str) -> Vec<AttributeUpdate> {
    let first = format!("a_{column}");
    let second = format!("b_{column}");
    vec![
        AttributeUpdate {
            column: column.to_owned(),
            source: UpdateSource::Value(UNSET_SENTINEL.to_owned()),
            condition: UpdateCondition::Always
        },
        AttributeUpdate {
            column: column.to_owned(),
            source: UpdateSource::Column(first.clone()),
            condition: UpdateCondition::IsNotNull(first)
        },
        AttributeUpdate {
            column: column.to_owned(),
            source: UpdateSource::Column(second.clone()),
            condition: UpdateCondition::All(vec![
                UpdateCondition::IsNotNull(second),
                UpdateCondition::Equals(column.to_owned(), UNSET_SENTINEL.to_owned())
            ])
        }
    ]
}
