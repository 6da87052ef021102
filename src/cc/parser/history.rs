//! History output parser (cleartool lshistory)

use tracing::error;

use super::super::constants::formats::DELIM;
use crate::branch::BranchFilter;
use crate::error::{Error, Result};
use crate::model::{ChangeKind, ChangeRecord};

use super::Parser;

/// Fields of a history record that starts a new entry: tag, date, user, element, version, comment
const MIN_FIELDS: usize = 6;

/// Index of the first comment field
const COMMENT_FIELD: usize = 5;

impl Parser {
    /// Parse `cleartool lshistory` output into change records, newest first
    ///
    /// Comments are free text: a line that splits into fewer than six
    /// fields continues the comment of the record before it. Operations
    /// other than file and directory check-ins are dropped, as are versions
    /// on branches `filter` does not admit.
    pub fn parse_history(output: &str, filter: &BranchFilter) -> Result<Vec<ChangeRecord>> {
        let mut records = Vec::new();
        let mut pending: Option<(Vec<&str>, String)> = None;

        for line in output.lines() {
            let fields: Vec<&str> = line.split(DELIM).collect();

            if fields.len() < MIN_FIELDS
                && let Some((_, comment)) = pending.as_mut()
            {
                comment.push('\n');
                comment.push_str(line);
                continue;
            }

            if let Some((fields, comment)) = pending.take() {
                Self::push_record(&mut records, &fields, comment, filter)?;
            }
            let comment = fields
                .get(COMMENT_FIELD..)
                .map(|rest| rest.join(DELIM.to_string().as_str()))
                .unwrap_or_default();
            pending = Some((fields, comment));
        }

        if let Some((fields, comment)) = pending {
            Self::push_record(&mut records, &fields, comment, filter)?;
        }

        Ok(records)
    }

    fn push_record(
        records: &mut Vec<ChangeRecord>,
        fields: &[&str],
        comment: String,
        filter: &BranchFilter,
    ) -> Result<()> {
        let Some(kind) = fields.first().and_then(|tag| ChangeKind::from_tag(tag)) else {
            return Ok(());
        };

        if fields.len() < COMMENT_FIELD {
            error!("Bad line {:?} {:?}", fields, comment);
            return Err(Error::Parse(format!(
                "Expected at least {} fields, got {}: {:?}",
                COMMENT_FIELD,
                fields.len(),
                fields
            )));
        }

        let record = ChangeRecord {
            kind,
            date: fields[1].to_string(),
            user: fields[2].to_string(),
            file: fields[3].to_string(),
            version: fields[4].to_string(),
            comment,
        };

        match filter.matches(&record.version, false) {
            Ok(true) => records.push(record),
            Ok(false) => {}
            Err(e) => {
                error!("Bad line {:?} {:?}", fields, record.comment);
                return Err(e);
            }
        }
        Ok(())
    }
}
