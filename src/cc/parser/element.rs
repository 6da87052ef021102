//! Single-element history parser (cleartool lshistory -fmt "%o%m|%Nd|%Vn\n" <element>)

use super::super::constants::formats::DELIM;
use crate::model::ChangeKind;

use super::Parser;

/// One version from an element's history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementVersion {
    /// `%o%m` operation tag
    pub tag: String,
    /// `%Nd` timestamp
    pub date: String,
    pub version: String,
}

impl ElementVersion {
    pub fn is_checkin(&self) -> bool {
        self.tag == ChangeKind::DIRECT_TAG
    }
}

impl Parser {
    /// Parse an element history, preserving cleartool's newest-first order
    ///
    /// Lines without the three expected fields are skipped.
    pub fn parse_element_history(output: &str) -> Vec<ElementVersion> {
        output
            .lines()
            .filter(|line| !line.is_empty())
            .filter_map(|line| {
                let mut fields = line.splitn(3, DELIM);
                Some(ElementVersion {
                    tag: fields.next()?.to_string(),
                    date: fields.next()?.to_string(),
                    version: fields.next()?.trim().to_string(),
                })
            })
            .collect()
    }
}
