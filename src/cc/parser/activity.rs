//! UCM activity output parsers (lsactivity, mkact)

use super::super::constants::formats::{ACTIVITY_SEPARATOR, DELIM};

use super::Parser;

impl Parser {
    /// Parse `lsactivity -fmt "%[headline]p|%n@@@"` into (headline, activity) pairs
    pub fn parse_activity_list(output: &str) -> Vec<(String, String)> {
        output
            .split(ACTIVITY_SEPARATOR)
            .map(str::trim)
            .filter(|record| !record.is_empty())
            .filter_map(|record| {
                let (headline, name) = record.rsplit_once(DELIM)?;
                Some((headline.to_string(), name.to_string()))
            })
            .collect()
    }

    /// Extract the activity name from `mkact` output
    ///
    /// Format: `Created activity "name".`
    pub fn parse_created_activity(output: &str) -> Option<String> {
        let first = output.lines().next()?;
        let start = first.find('"')?;
        let end = first.rfind('"')?;
        (end > start + 1).then(|| first[start + 1..end].to_string())
    }
}
