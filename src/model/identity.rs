//! Commit identity derived from a ClearCase user and timestamp

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::error::{Error, Result};

/// `<local@domain>` part of a mapped user
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<.*@.*>").expect("Invalid email regex"));

/// ClearCase `%Nd` format
const CC_DATE_FORMAT: &str = "%Y%m%d.%H%M%S";

/// Date format accepted by `GIT_AUTHOR_DATE`
const GIT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Author and committer of a replayed change group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    /// Address including angle brackets, as Git prints it
    pub email: String,
    /// `YYYY-MM-DD HH:MM:SS`
    pub date: String,
}

impl Identity {
    /// Resolve `user` through the user map, synthesizing an address when none is configured
    pub fn resolve(
        user: &str,
        cc_date: &str,
        users: &BTreeMap<String, String>,
        mail_suffix: &str,
    ) -> Result<Self> {
        let mapped = users.get(user).map(String::as_str).unwrap_or(user);
        let name = mapped.split(" <").next().unwrap_or(mapped).to_string();
        let email = match EMAIL_REGEX.find(mapped) {
            Some(m) => m.as_str().to_string(),
            None => format!(
                "<{}@{}>",
                mapped.to_lowercase().replace(' ', ".").replace('\'', ""),
                mail_suffix
            ),
        };

        Ok(Self {
            name,
            email,
            date: commit_date(cc_date)?,
        })
    }

    /// `GIT_AUTHOR_*` and `GIT_COMMITTER_*` variables for `git commit`
    pub fn env(&self) -> Vec<(String, String)> {
        let mut env = Vec::with_capacity(6);
        for role in ["AUTHOR", "COMMITTER"] {
            env.push((format!("GIT_{}_NAME", role), self.name.clone()));
            env.push((format!("GIT_{}_EMAIL", role), self.email.clone()));
            env.push((format!("GIT_{}_DATE", role), self.date.clone()));
        }
        env
    }
}

/// Convert a `%Nd` timestamp into a Git commit date
pub fn commit_date(cc_date: &str) -> Result<String> {
    NaiveDateTime::parse_from_str(cc_date.trim(), CC_DATE_FORMAT)
        .map(|d| d.format(GIT_DATE_FORMAT).to_string())
        .map_err(|e| Error::Parse(format!("bad ClearCase date {:?}: {}", cc_date, e)))
}
