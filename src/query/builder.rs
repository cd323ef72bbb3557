//! Mutable query state
//!
//! A [`Query`] accumulates measurements, fields, functions, groups and
//! conditions through any sequence of calls and renders on demand (see
//! `render.rs`). Rendering never changes the state.

use std::collections::BTreeMap;

use super::condition::{Conditions, Relation, Where};
use super::function::FunctionCall;
use super::time::{Fill, Order, TimeBound};

/// How the current statement relates to previously built ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Plain select
    #[default]
    Select,
    /// Selecting from a nested select built earlier
    SubQuery,
    /// Emitted after earlier statements, separated by `;`
    MultiQuery,
}

/// Target of the `into` clause
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntoTarget {
    pub measurement: Option<String>,
    pub database: Option<String>,
    pub retention_policy: Option<String>,
}

/// Continuous query metadata used by [`Query::to_cq`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContinuousQuery {
    pub name: Option<String>,
    pub every: Option<String>,
    pub for_duration: Option<String>,
}

/// A select statement under construction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub(super) database: Option<String>,
    pub(super) retention_policy: Option<String>,
    pub(super) measurements: Vec<String>,
    pub(super) fields: BTreeMap<String, Option<String>>,
    pub(super) functions: Vec<FunctionCall>,
    pub(super) groups: Vec<String>,
    pub(super) conditions: Conditions,
    pub(super) relation: Relation,
    pub(super) start: Option<TimeBound>,
    pub(super) end: Option<TimeBound>,
    pub(super) limit: Option<u64>,
    pub(super) slimit: Option<u64>,
    pub(super) offset: Option<u64>,
    pub(super) soffset: Option<u64>,
    pub(super) fill: Option<Fill>,
    pub(super) order: Option<Order>,
    pub(super) into: IntoTarget,
    pub(super) cq: ContinuousQuery,
    pub(super) mode: Mode,
    /// Statements finished by [`Query::multi_query`]
    pub(super) statements: Vec<String>,
}

impl Query {
    /// Create an empty query without a database
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty query against `database`
    pub fn with_database(database: impl Into<String>) -> Self {
        Self {
            database: Some(database.into()),
            ..Self::default()
        }
    }

    /// Database the measurements are read from
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// Set the database used to address measurements
    pub fn set_database(&mut self, database: impl Into<String>) -> &mut Self {
        self.database = Some(database.into());
        self
    }

    /// Forget the database
    pub fn clear_database(&mut self) -> &mut Self {
        self.database = None;
        self
    }

    /// Retention policy used to address measurements
    pub fn retention_policy(&self) -> Option<&str> {
        self.retention_policy.as_deref()
    }

    /// Set the retention policy used to address measurements
    pub fn set_retention_policy(&mut self, rp: impl Into<String>) -> &mut Self {
        self.retention_policy = Some(rp.into());
        self
    }

    /// Forget the retention policy
    pub fn clear_retention_policy(&mut self) -> &mut Self {
        self.retention_policy = None;
        self
    }

    /// Measurements in the `from` clause, in insertion order
    pub fn measurements(&self) -> &[String] {
        &self.measurements
    }

    /// Replace all measurements with a single one
    pub fn set_measurement(&mut self, measurement: impl Into<String>) -> &mut Self {
        self.measurements = vec![measurement.into()];
        self
    }

    /// Append a measurement; repeats are kept
    pub fn add_measurement(&mut self, measurement: impl Into<String>) -> &mut Self {
        self.measurements.push(measurement.into());
        self
    }

    /// Remove every occurrence of `measurement`
    pub fn remove_measurement(&mut self, measurement: &str) -> &mut Self {
        self.measurements.retain(|m| m != measurement);
        self
    }

    /// Remove all measurements
    pub fn empty_measurements(&mut self) -> &mut Self {
        self.measurements.clear();
        self
    }

    /// Selected fields and their aliases, in rendering order
    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&str>)> + '_ {
        self.fields
            .iter()
            .map(|(name, alias)| (name.as_str(), alias.as_deref()))
    }

    /// Select `field` without an alias
    pub fn add_field(&mut self, field: impl Into<String>) -> &mut Self {
        self.fields.insert(field.into(), None);
        self
    }

    /// Select several fields without aliases
    pub fn add_fields<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            self.add_field(field);
        }
        self
    }

    /// Select `field` under the column name `alias`
    pub fn add_field_as(&mut self, field: impl Into<String>, alias: impl Into<String>) -> &mut Self {
        self.fields.insert(field.into(), Some(alias.into()));
        self
    }

    /// Select several fields, each with its alias
    pub fn add_fields_as<I, K, V>(&mut self, aliases: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (field, alias) in aliases {
            self.add_field_as(field, alias);
        }
        self
    }

    /// Stop selecting `field`
    pub fn remove_field(&mut self, field: &str) -> &mut Self {
        self.fields.remove(field);
        self
    }

    /// Stop selecting each of `fields`
    pub fn remove_fields<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for field in fields {
            self.fields.remove(field.as_ref());
        }
        self
    }

    /// Remove all fields
    pub fn empty_fields(&mut self) -> &mut Self {
        self.fields.clear();
        self
    }

    /// Selected function calls, in insertion order
    pub fn functions(&self) -> &[FunctionCall] {
        &self.functions
    }

    /// Add a function call to the select list
    pub fn add_function(&mut self, function: impl Into<FunctionCall>) -> &mut Self {
        self.functions.push(function.into());
        self
    }

    /// Remove every function with the same call text, whatever its alias
    pub fn remove_function(&mut self, function: impl Into<FunctionCall>) -> &mut Self {
        let call = function.into().call_text();
        self.functions.retain(|f| f.call_text() != call);
        self
    }

    /// Remove all function calls
    pub fn empty_functions(&mut self) -> &mut Self {
        self.functions.clear();
        self
    }

    /// Group by entries, in insertion order
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Append a tag or `time(...)` group; repeats are kept
    pub fn add_group(&mut self, group: impl Into<String>) -> &mut Self {
        self.groups.push(group.into());
        self
    }

    /// Append several groups
    pub fn add_groups<I, S>(&mut self, groups: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for group in groups {
            self.add_group(group);
        }
        self
    }

    /// Remove every occurrence of `group`
    pub fn remove_group(&mut self, group: &str) -> &mut Self {
        self.groups.retain(|g| g != group);
        self
    }

    /// Remove every occurrence of each of `groups`
    pub fn remove_groups<I, S>(&mut self, groups: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for group in groups {
            self.remove_group(group.as_ref());
        }
        self
    }

    /// Remove all groups
    pub fn empty_groups(&mut self) -> &mut Self {
        self.groups.clear();
        self
    }

    /// Add one `where` call
    pub fn add_condition(&mut self, condition: impl Into<Where>) -> &mut Self {
        self.conditions.push(condition.into());
        self
    }

    /// Conditions added so far
    pub fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    /// Drop all conditions
    pub fn empty_conditions(&mut self) -> &mut Self {
        self.conditions.clear();
        self
    }

    /// Relation joining top-level conditions
    pub fn relation(&self) -> Relation {
        self.relation
    }

    /// Relation joining top-level conditions, including ones already added
    pub fn set_relation(&mut self, relation: Relation) -> &mut Self {
        self.relation = relation;
        self
    }

    /// Lower time bound
    pub fn start(&self) -> Option<&TimeBound> {
        self.start.as_ref()
    }

    /// Set the lower time bound (`time >= ...`)
    pub fn set_start(&mut self, bound: impl Into<TimeBound>) -> &mut Self {
        self.start = Some(bound.into());
        self
    }

    /// Remove the lower time bound
    pub fn clear_start(&mut self) -> &mut Self {
        self.start = None;
        self
    }

    /// Upper time bound
    pub fn end(&self) -> Option<&TimeBound> {
        self.end.as_ref()
    }

    /// Set the upper time bound (`time <= ...`)
    pub fn set_end(&mut self, bound: impl Into<TimeBound>) -> &mut Self {
        self.end = Some(bound.into());
        self
    }

    /// Remove the upper time bound
    pub fn clear_end(&mut self) -> &mut Self {
        self.end = None;
        self
    }

    /// Maximum points per series
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Set `limit`
    pub fn set_limit(&mut self, n: u64) -> &mut Self {
        self.limit = Some(n);
        self
    }

    /// Remove `limit`
    pub fn clear_limit(&mut self) -> &mut Self {
        self.limit = None;
        self
    }

    /// Maximum number of series
    pub fn slimit(&self) -> Option<u64> {
        self.slimit
    }

    /// Set `slimit`
    pub fn set_slimit(&mut self, n: u64) -> &mut Self {
        self.slimit = Some(n);
        self
    }

    /// Remove `slimit`
    pub fn clear_slimit(&mut self) -> &mut Self {
        self.slimit = None;
        self
    }

    /// Points skipped per series
    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    /// Set `offset`
    pub fn set_offset(&mut self, n: u64) -> &mut Self {
        self.offset = Some(n);
        self
    }

    /// Remove `offset`
    pub fn clear_offset(&mut self) -> &mut Self {
        self.offset = None;
        self
    }

    /// Series skipped
    pub fn soffset(&self) -> Option<u64> {
        self.soffset
    }

    /// Set `soffset`
    pub fn set_soffset(&mut self, n: u64) -> &mut Self {
        self.soffset = Some(n);
        self
    }

    /// Remove `soffset`
    pub fn clear_soffset(&mut self) -> &mut Self {
        self.soffset = None;
        self
    }

    /// Fill policy for empty group by intervals
    pub fn fill(&self) -> Option<Fill> {
        self.fill
    }

    /// Set the fill policy; only rendered with a group by
    pub fn set_fill(&mut self, fill: impl Into<Fill>) -> &mut Self {
        self.fill = Some(fill.into());
        self
    }

    /// Remove the fill policy
    pub fn clear_fill(&mut self) -> &mut Self {
        self.fill = None;
        self
    }

    /// Ordering by time
    pub fn order(&self) -> Option<Order> {
        self.order
    }

    /// Set `order by time`
    pub fn set_order(&mut self, order: Order) -> &mut Self {
        self.order = Some(order);
        self
    }

    /// Remove the time ordering
    pub fn clear_order(&mut self) -> &mut Self {
        self.order = None;
        self
    }

    /// Full `into` target
    pub fn into_target(&self) -> &IntoTarget {
        &self.into
    }

    /// Measurement written by `select ... into`
    pub fn into_measurement(&self) -> Option<&str> {
        self.into.measurement.as_deref()
    }

    /// Write results into `measurement`
    pub fn set_into(&mut self, measurement: impl Into<String>) -> &mut Self {
        self.into.measurement = Some(measurement.into());
        self
    }

    /// Remove the `into` clause entirely
    pub fn clear_into(&mut self) -> &mut Self {
        self.into = IntoTarget::default();
        self
    }

    /// Database of the `into` target
    pub fn into_database(&self) -> Option<&str> {
        self.into.database.as_deref()
    }

    /// Set the database of the `into` target
    pub fn set_into_database(&mut self, database: impl Into<String>) -> &mut Self {
        self.into.database = Some(database.into());
        self
    }

    /// Retention policy of the `into` target
    pub fn into_retention_policy(&self) -> Option<&str> {
        self.into.retention_policy.as_deref()
    }

    /// Set the retention policy of the `into` target
    pub fn set_into_retention_policy(&mut self, rp: impl Into<String>) -> &mut Self {
        self.into.retention_policy = Some(rp.into());
        self
    }

    /// Continuous query name
    pub fn cq_name(&self) -> Option<&str> {
        self.cq.name.as_deref()
    }

    /// Set the continuous query name
    pub fn set_cq_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.cq.name = Some(name.into());
        self
    }

    /// Continuous query `resample every` interval
    pub fn cq_every(&self) -> Option<&str> {
        self.cq.every.as_deref()
    }

    /// Set the `resample every` interval
    pub fn set_cq_every(&mut self, every: impl Into<String>) -> &mut Self {
        self.cq.every = Some(every.into());
        self
    }

    /// Continuous query `resample for` window
    pub fn cq_for(&self) -> Option<&str> {
        self.cq.for_duration.as_deref()
    }

    /// Set the `resample for` window
    pub fn set_cq_for(&mut self, duration: impl Into<String>) -> &mut Self {
        self.cq.for_duration = Some(duration.into());
        self
    }

    /// Current statement mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Reset everything except database, retention policy and measurements
    ///
    /// After [`Query::sub_query`] the only measurement is the nested
    /// `(select ...)`, so a cleaned query keeps selecting from it. Use
    /// [`Query::set_measurement`] to read from a plain measurement again.
    pub fn clean(&mut self) -> &mut Self {
        self.reset_clauses();
        self.statements.clear();
        self.mode = Mode::Select;
        self
    }

    /// Freeze the current statement and select from it as a nested query
    pub fn sub_query(&mut self) -> &mut Self {
        let inner = self.render_statement();
        tracing::debug!(inner = %inner, "Nesting current select as subquery");

        self.reset_clauses();
        self.measurements = vec![format!("({})", inner)];
        self.mode = Mode::SubQuery;
        self
    }

    /// Freeze the current statement and start another one after it
    pub fn multi_query(&mut self) -> &mut Self {
        let statement = self.render_statement();
        tracing::debug!(statement = %statement, "Starting next statement");

        self.statements.push(statement);
        self.reset_clauses();
        self.mode = Mode::MultiQuery;
        self
    }

    fn reset_clauses(&mut self) {
        let database = self.database.take();
        let retention_policy = self.retention_policy.take();
        let measurements = std::mem::take(&mut self.measurements);
        let statements = std::mem::take(&mut self.statements);
        let mode = self.mode;

        *self = Self {
            database,
            retention_policy,
            measurements,
            statements,
            mode,
            ..Self::default()
        };
    }
}
