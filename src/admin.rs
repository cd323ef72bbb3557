//! Administrative statements
//!
//! Stateless builders for database, retention policy and schema exploration
//! statements. Only the identifier arguments are quoted.

use crate::query::quote::{quote, quote_if_needed};

/// Retention policy definition for [`create_retention_policy`]
#[derive(Debug, Clone, PartialEq)]
pub struct RetentionPolicy {
    pub name: String,
    pub database: String,
    pub duration: String,
    pub replication: u32,
    pub shard_duration: Option<String>,
    pub default: bool,
}

impl RetentionPolicy {
    /// Create a policy with replication 1
    pub fn new(
        name: impl Into<String>,
        database: impl Into<String>,
        duration: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            database: database.into(),
            duration: duration.into(),
            replication: 1,
            shard_duration: None,
            default: false,
        }
    }

    /// Set the replication factor
    pub fn replication(mut self, n: u32) -> Self {
        self.replication = n;
        self
    }

    /// Set the shard group duration
    pub fn shard_duration(mut self, duration: impl Into<String>) -> Self {
        self.shard_duration = Some(duration.into());
        self
    }

    /// Make this the database's default policy
    pub fn default_policy(mut self, default: bool) -> Self {
        self.default = default;
        self
    }
}

/// Changes applied by [`alter_retention_policy`]; unset parts are left alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetentionPolicyUpdate {
    pub name: String,
    pub database: String,
    pub duration: Option<String>,
    pub replication: Option<u32>,
    pub shard_duration: Option<String>,
    pub default: bool,
}

impl RetentionPolicyUpdate {
    /// Start an update of policy `name` on `database`
    pub fn new(name: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            database: database.into(),
            ..Self::default()
        }
    }

    /// Change the retention duration
    pub fn duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    /// Set the replication factor
    pub fn replication(mut self, n: u32) -> Self {
        self.replication = Some(n);
        self
    }

    /// Set the shard group duration
    pub fn shard_duration(mut self, duration: impl Into<String>) -> Self {
        self.shard_duration = Some(duration.into());
        self
    }

    /// Make this the database's default policy
    pub fn default_policy(mut self, default: bool) -> Self {
        self.default = default;
        self
    }
}

/// `create database <name>`
pub fn create_database(name: &str) -> String {
    format!("create database {}", quote_if_needed(name))
}

/// `create database if not exists <name>`
pub fn create_database_if_not_exists(name: &str) -> String {
    format!("create database if not exists {}", quote_if_needed(name))
}

/// `drop database <name>`
pub fn drop_database(name: &str) -> String {
    format!("drop database {}", quote_if_needed(name))
}

/// `show databases`
pub fn show_databases() -> String {
    "show databases".to_string()
}

/// `show retention policies on <database>`
pub fn show_retention_policies(database: &str) -> String {
    format!("show retention policies on {}", quote_if_needed(database))
}

/// `show measurements`
pub fn show_measurements() -> String {
    "show measurements".to_string()
}

/// `show tag keys [from <measurement>]`
pub fn show_tag_keys(measurement: Option<&str>) -> String {
    with_from("show tag keys", measurement)
}

/// `show field keys [from <measurement>]`
pub fn show_field_keys(measurement: Option<&str>) -> String {
    with_from("show field keys", measurement)
}

/// `show series [from <measurement>]`
pub fn show_series(measurement: Option<&str>) -> String {
    with_from("show series", measurement)
}

/// `show continuous queries`
pub fn show_continuous_queries() -> String {
    "show continuous queries".to_string()
}

/// `drop continuous query <name> on <database>`
pub fn drop_continuous_query(name: &str, database: &str) -> String {
    format!("drop continuous query {} on {}", quote(name), quote(database))
}

fn with_from(statement: &str, measurement: Option<&str>) -> String {
    match measurement {
        Some(m) => format!("{} from {}", statement, quote(m)),
        None => statement.to_string(),
    }
}

/// `create retention policy ... on ... duration ... replication ...`
pub fn create_retention_policy(policy: &RetentionPolicy) -> String {
    let mut sql = format!(
        "create retention policy {} on {} duration {} replication {}",
        quote(&policy.name),
        quote(&policy.database),
        policy.duration,
        policy.replication
    );
    if let Some(shard) = &policy.shard_duration {
        sql.push_str(&format!(" shard duration {}", shard));
    }
    if policy.default {
        sql.push_str(" default");
    }
    sql
}

/// `drop retention policy <name> on <database>`
pub fn drop_retention_policy(name: &str, database: &str) -> String {
    format!("drop retention policy {} on {}", quote(name), quote(database))
}

/// `alter retention policy`, with only the changed parts
pub fn alter_retention_policy(update: &RetentionPolicyUpdate) -> String {
    let mut sql = format!(
        "alter retention policy {} on {}",
        quote(&update.name),
        quote(&update.database)
    );
    if let Some(duration) = &update.duration {
        sql.push_str(&format!(" duration {}", duration));
    }
    if let Some(n) = update.replication {
        sql.push_str(&format!(" replication {}", n));
    }
    if let Some(shard) = &update.shard_duration {
        sql.push_str(&format!(" shard duration {}", shard));
    }
    if update.default {
        sql.push_str(" default");
    }
    sql
}
