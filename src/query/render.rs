//! Clause serializer
//!
//! Renders a [`Query`] into InfluxQL text. Clauses are always emitted in the
//! same order and skipped when their state is empty:
//!
//! ```text
//! select <fields,functions> [into <target>] from <measurements>
//! [where <conditions> [and time <= end] [and time >= start]]
//! [group by <tags,time(...)> [fill(<fill>)]]
//! [order by time <asc|desc>] [limit n] [slimit n] [offset n] [soffset n]
//! ```

use super::builder::Query;
use super::quote::{address, is_bare, quote};

impl Query {
    /// Render the query, including statements finished by `multi_query`
    pub fn to_select(&self) -> String {
        let current = self.render_statement();
        let sql = if self.statements.is_empty() {
            current
        } else {
            let mut all = self.statements.clone();
            all.push(current);
            all.join(";")
        };
        tracing::trace!(sql = %sql, "Rendered select");
        sql
    }

    /// Wrap the select into a `create continuous query` statement
    ///
    /// The select is expected to have an `into` target; without one the
    /// statement is rendered anyway.
    pub fn to_cq(&self) -> String {
        let mut sql = format!(
            "create continuous query {} on {}",
            quote(self.cq.name.as_deref().unwrap_or_default()),
            quote(self.database.as_deref().unwrap_or_default()),
        );

        if self.cq.every.is_some() || self.cq.for_duration.is_some() {
            sql.push_str(" resample");
            if let Some(every) = &self.cq.every {
                sql.push_str(&format!(" every {}", every));
            }
            if let Some(duration) = &self.cq.for_duration {
                sql.push_str(&format!(" for {}", duration));
            }
        }

        sql.push_str(&format!(" begin {} end", self.to_select()));
        tracing::trace!(sql = %sql, "Rendered continuous query");
        sql
    }

    /// Render only the statement currently being built
    pub(super) fn render_statement(&self) -> String {
        let mut sql = format!("select {}", self.select_list());

        if let Some(target) = self.into_clause() {
            sql.push_str(&format!(" into {}", target));
        }
        if let Some(from) = self.from_clause() {
            sql.push_str(&format!(" from {}", from));
        }
        if let Some(conditions) = self.where_clause() {
            sql.push_str(&format!(" where {}", conditions));
        }
        if !self.groups.is_empty() {
            sql.push_str(&format!(" group by {}", self.group_list()));
            if let Some(fill) = self.fill {
                sql.push_str(&format!(" fill({})", fill));
            }
        }
        if let Some(order) = self.order {
            sql.push_str(&format!(" order by time {}", order));
        }

        let pagination = [
            ("limit", self.limit),
            ("slimit", self.slimit),
            ("offset", self.offset),
            ("soffset", self.soffset),
        ];
        for (keyword, value) in pagination {
            if let Some(n) = value {
                sql.push_str(&format!(" {} {}", keyword, n));
            }
        }

        sql
    }

    fn select_list(&self) -> String {
        if self.fields.is_empty() && self.functions.is_empty() {
            return "*".to_string();
        }

        // BTreeMap iteration is already sorted by field name
        let fields = self.fields.iter().map(|(field, alias)| match alias {
            Some(alias) => format!("{} as {}", quote(field), quote(alias)),
            None => quote(field),
        });

        let mut functions: Vec<_> = self.functions.iter().collect();
        functions.sort_by_key(|f| f.call_text());
        let functions = functions.into_iter().map(|f| f.to_select_item());

        fields.chain(functions).collect::<Vec<_>>().join(",")
    }

    fn into_clause(&self) -> Option<String> {
        let measurement = self.into.measurement.as_deref()?;
        Some(address(
            self.into.database.as_deref(),
            self.into.retention_policy.as_deref(),
            measurement,
        ))
    }

    fn from_clause(&self) -> Option<String> {
        if self.measurements.is_empty() {
            return self.database.as_deref().map(quote);
        }

        let database = self.database.as_deref();
        let retention_policy = self.retention_policy.as_deref();
        let sources: Vec<String> = self
            .measurements
            .iter()
            .map(|m| {
                if is_bare(m) {
                    m.clone()
                } else {
                    address(database, retention_policy, m)
                }
            })
            .collect();
        Some(sources.join(","))
    }

    fn where_clause(&self) -> Option<String> {
        let parts: Vec<String> = [
            self.conditions.render(self.relation),
            self.end.as_ref().map(|end| format!("time <= {}", end.to_literal())),
            self.start
                .as_ref()
                .map(|start| format!("time >= {}", start.to_literal())),
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" and "))
        }
    }

    fn group_list(&self) -> String {
        let (mut tags, times): (Vec<&String>, Vec<&String>) =
            self.groups.iter().partition(|g| !is_time_group(g));
        tags.sort();

        tags.into_iter()
            .chain(times)
            .map(|g| quote(g))
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn is_time_group(group: &str) -> bool {
    group.trim_start().to_lowercase().starts_with("time(")
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_select())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{FunctionCall, Operator, Order, Relation, Value, Where};

    fn http(database: Option<&str>) -> Query {
        let mut q = match database {
            Some(db) => Query::with_database(db),
            None => Query::new(),
        };
        q.add_measurement("http");
        q
    }

    #[test]
    fn test_basic_query() {
        let mut q = http(Some("mydb"));
        q.set_retention_policy("default")
            .add_fields(["status", "spdy", "fetch time"])
            .add_group("spdy")
            .set_start("2018-01-27T05:38:56.145Z")
            .set_end("-3h")
            .set_limit(10)
            .set_slimit(5)
            .set_order(Order::Desc)
            .set_offset(10)
            .set_soffset(5)
            .add_condition(Where::eq("code", 400))
            .add_condition("\"use\" <= 30")
            .set_fill(0);

        assert_eq!(
            q.to_select(),
            "select \"fetch time\",\"spdy\",\"status\" from \"mydb\".\"default\".\"http\" \
             where \"code\" = 400 and \"use\" <= 30 and time <= now() - 3h \
             and time >= '2018-01-27T05:38:56.145Z' group by \"spdy\" fill(0) \
             order by time desc limit 10 slimit 5 offset 10 soffset 5"
        );
    }

    #[test]
    fn test_select_star_and_fields() {
        let mut q = http(None);
        assert_eq!(q.to_select(), "select * from \"http\"");

        q.add_field("status");
        assert_eq!(q.to_select(), "select \"status\" from \"http\"");

        q.remove_field("status");
        assert_eq!(q.to_select(), "select * from \"http\"");

        q.add_field("ajax status");
        assert_eq!(q.to_select(), "select \"ajax status\" from \"http\"");

        q.empty_fields().add_fields(["status", "code"]);
        assert_eq!(q.to_select(), "select \"code\",\"status\" from \"http\"");
    }

    #[test]
    fn test_field_alias() {
        let mut q = http(Some("mydb"));
        q.add_fields_as([("fetch time", "ft")]);
        assert_eq!(q.to_select(), "select \"fetch time\" as \"ft\" from \"mydb\"..\"http\"");

        q.remove_field("fetch time");
        assert_eq!(q.to_select(), "select * from \"mydb\"..\"http\"");
    }

    #[test]
    fn test_where_shapes() {
        let mut q = http(Some("mydb"));
        q.add_condition(Where::eq("spdy", "1"));
        assert_eq!(q.to_select(), "select * from \"mydb\"..\"http\" where \"spdy\" = '1'");

        q.empty_conditions().add_condition(Where::any_of("spdy", ["1", "2"]));
        assert_eq!(
            q.to_select(),
            "select * from \"mydb\"..\"http\" where (\"spdy\" = '1' or \"spdy\" = '2')"
        );

        q.empty_conditions()
            .add_condition(Where::compare("use", Operator::Gte, 300));
        assert_eq!(q.to_select(), "select * from \"mydb\"..\"http\" where \"use\" >= 300");

        q.empty_conditions()
            .add_condition(Where::all([("spdy", "1"), ("method", "GET")]));
        assert_eq!(
            q.to_select(),
            "select * from \"mydb\"..\"http\" where (\"spdy\" = '1' and \"method\" = 'GET')"
        );

        q.empty_conditions()
            .add_condition("spdy = '1' and method = 'GET'");
        assert_eq!(
            q.to_select(),
            "select * from \"mydb\"..\"http\" where (spdy = '1' and method = 'GET')"
        );
    }

    #[test]
    fn test_where_regex_values() {
        let mut q = http(Some("mydb"));
        q.add_condition(Where::all([("spdy", "/1|2/")]));
        q.add_condition(Where::all([("method", Value::regex("GET"))]));
        assert_eq!(
            q.to_select(),
            "select * from \"mydb\"..\"http\" where \"method\" = /GET/ and \"spdy\" = /1|2/"
        );

        q.empty_conditions().add_condition(Where::all([("path", "/")]));
        assert_eq!(q.to_select(), "select * from \"mydb\"..\"http\" where \"path\" = '/'");
    }

    #[test]
    fn test_empty_map_is_noop() {
        let mut q = http(Some("mydb"));
        q.add_condition(Where::all(Vec::<(String, Value)>::new()));
        assert_eq!(q.to_select(), "select * from \"mydb\"..\"http\"");
    }

    #[test]
    fn test_relation_is_retroactive() {
        let mut q = http(Some("mydb"));
        q.add_condition(Where::eq("spdy", "1"))
            .add_condition(Where::eq("method", "GET"));
        assert_eq!(
            q.to_select(),
            "select * from \"mydb\"..\"http\" where \"method\" = 'GET' and \"spdy\" = '1'"
        );

        q.set_relation(Relation::Or);
        assert_eq!(
            q.to_select(),
            "select * from \"mydb\"..\"http\" where \"method\" = 'GET' or \"spdy\" = '1'"
        );

        q.empty_conditions();
        assert_eq!(q.to_select(), "select * from \"mydb\"..\"http\"");
    }

    #[test]
    fn test_mixed_conditions() {
        let mut q = http(None);
        q.add_condition(Where::all([("code", Value::from(500)), ("spdy", Value::from("1"))]));
        assert_eq!(
            q.to_select(),
            "select * from \"http\" where (\"code\" = 500 and \"spdy\" = '1')"
        );

        q.add_condition(Where::eq("code", 404)).set_relation(Relation::Or);
        assert_eq!(
            q.to_select(),
            "select * from \"http\" where \"code\" = 404 or (\"code\" = 500 and \"spdy\" = '1')"
        );

        q.empty_conditions().add_condition(Where::eq("http spdy", "slow"));
        assert_eq!(q.to_select(), "select * from \"http\" where \"http spdy\" = 'slow'");
    }

    #[test]
    fn test_measurement_addressing() {
        let mut q = Query::with_database("mydb");
        q.set_retention_policy("test")
            .add_measurement("http")
            .add_measurement("https");
        assert_eq!(
            q.to_select(),
            "select * from \"mydb\".\"test\".\"http\",\"mydb\".\"test\".\"https\""
        );

        q.clear_retention_policy().remove_measurement("http");
        assert_eq!(q.to_select(), "select * from \"mydb\"..\"https\"");

        q.empty_measurements();
        assert_eq!(q.to_select(), "select * from \"mydb\"");

        let mut q = Query::new();
        q.add_measurement("http").add_measurement("https");
        assert_eq!(q.to_select(), "select * from \"http\",\"https\"");
    }

    #[test]
    fn test_functions() {
        let mut q = http(None);
        q.add_function(FunctionCall::new("mean").arg("use"));
        assert_eq!(q.to_select(), "select mean(\"use\") from \"http\"");

        q.add_function(FunctionCall::new("count").arg("use"));
        assert_eq!(q.to_select(), "select count(\"use\"),mean(\"use\") from \"http\"");

        q.remove_function(FunctionCall::new("count").arg("use"));
        assert_eq!(q.to_select(), "select mean(\"use\") from \"http\"");

        q.empty_functions();
        assert_eq!(q.to_select(), "select * from \"http\"");
    }

    #[test]
    fn test_functions_with_fields_and_alias() {
        let mut q = http(Some("mydb"));
        q.add_function(FunctionCall::new("bottom").arg("use").arg(3).alias("bot3Use"))
            .add_field("spdy");
        assert_eq!(
            q.to_select(),
            "select \"spdy\",bottom(\"use\",3) as \"bot3Use\" from \"mydb\"..\"http\""
        );

        q.remove_function("bottom(\"use\",3)");
        assert_eq!(q.to_select(), "select \"spdy\" from \"mydb\"..\"http\"");
    }

    #[test]
    fn test_groups() {
        let mut q = http(None);
        q.add_group("spdy").add_function(FunctionCall::new("mean").arg("use"));
        assert_eq!(q.to_select(), "select mean(\"use\") from \"http\" group by \"spdy\"");

        q.add_groups(["status", "time(6h)"]);
        assert_eq!(
            q.to_select(),
            "select mean(\"use\") from \"http\" group by \"spdy\",\"status\",time(6h)"
        );

        q.remove_groups(["status", "time(6h)", "spdy"]).add_group("ajax status");
        assert_eq!(q.to_select(), "select mean(\"use\") from \"http\" group by \"ajax status\"");

        q.add_groups(["time(6h, 10m)", "spdy"]);
        assert_eq!(
            q.to_select(),
            "select mean(\"use\") from \"http\" group by \"ajax status\",\"spdy\",time(6h, 10m)"
        );

        q.empty_groups();
        assert_eq!(q.to_select(), "select mean(\"use\") from \"http\"");
    }

    #[test]
    fn test_time_range() {
        let mut q = http(None);
        q.set_start("2016-03-01 23:32:01.232").set_end("2016-03-02");
        assert_eq!(
            q.to_select(),
            "select * from \"http\" where time <= '2016-03-02' and time >= '2016-03-01 23:32:01.232'"
        );

        q.set_end("-3h");
        assert_eq!(
            q.to_select(),
            "select * from \"http\" where time <= now() - 3h and time >= '2016-03-01 23:32:01.232'"
        );

        q.set_end("1388534400s");
        assert_eq!(
            q.to_select(),
            "select * from \"http\" where time <= 1388534400s and time >= '2016-03-01 23:32:01.232'"
        );
    }

    #[test]
    fn test_time_range_ignores_relation() {
        let mut q = http(None);
        q.add_condition(Where::eq("spdy", "slow"))
            .add_condition(Where::eq("method", "GET"))
            .set_relation(Relation::Or)
            .set_start("-7d");
        assert_eq!(
            q.to_select(),
            "select * from \"http\" where \"method\" = 'GET' or \"spdy\" = 'slow' and time >= now() - 7d"
        );
    }

    #[test]
    fn test_pagination() {
        let mut q = http(None);
        q.set_limit(10);
        assert_eq!(q.to_select(), "select * from \"http\" limit 10");

        let mut q = http(None);
        q.add_group("*").set_slimit(10);
        assert_eq!(q.to_select(), "select * from \"http\" group by * slimit 10");

        q.set_limit(5);
        assert_eq!(q.to_select(), "select * from \"http\" group by * limit 5 slimit 10");

        let mut q = http(None);
        q.set_offset(10);
        assert_eq!(q.to_select(), "select * from \"http\" offset 10");
    }

    #[test]
    fn test_fill_and_order() {
        let mut q = http(None);
        q.add_function(FunctionCall::new("mean").arg("use"))
            .add_group("spdy")
            .set_fill(100);
        assert_eq!(
            q.to_select(),
            "select mean(\"use\") from \"http\" group by \"spdy\" fill(100)"
        );

        q.set_fill(crate::query::Fill::None);
        assert_eq!(
            q.to_select(),
            "select mean(\"use\") from \"http\" group by \"spdy\" fill(none)"
        );

        q.empty_groups();
        assert_eq!(q.to_select(), "select mean(\"use\") from \"http\"");

        let mut q = http(None);
        q.set_order(Order::Desc);
        assert_eq!(q.to_select(), "select * from \"http\" order by time desc");
    }

    #[test]
    fn test_into() {
        let mut q = http(None);
        q.set_into("http copy");
        assert_eq!(q.to_select(), "select * into \"http copy\" from \"http\"");

        q.add_function(FunctionCall::new("mean").arg("use"))
            .add_condition(Where::eq("spdy", "slow"))
            .set_start("2015-08-18T00:00:00Z")
            .set_end("2015-08-18T00:30:00Z")
            .add_group("time(10m)");
        assert_eq!(
            q.to_select(),
            "select mean(\"use\") into \"http copy\" from \"http\" where \"spdy\" = 'slow' \
             and time <= '2015-08-18T00:30:00Z' and time >= '2015-08-18T00:00:00Z' group by time(10m)"
        );
    }

    #[test]
    fn test_into_with_database_and_retention_policy() {
        let mut q = http(None);
        q.set_database("mydb").set_into("http copy");
        assert_eq!(q.to_select(), "select * into \"http copy\" from \"mydb\"..\"http\"");

        q.set_into_database("mydb").set_into_retention_policy("my-rp");
        assert_eq!(
            q.to_select(),
            "select * into \"mydb\".\"my-rp\".\"http copy\" from \"mydb\"..\"http\""
        );
    }

    #[test]
    fn test_into_and_from_share_addressing() {
        let mut q = http(None);
        q.set_retention_policy("autogen")
            .set_into("copy")
            .set_into_retention_policy("autogen");
        assert_eq!(
            q.to_select(),
            "select * into .\"autogen\".\"copy\" from .\"autogen\".\"http\""
        );
    }

    #[test]
    fn test_placeholder_and_regex_measurements() {
        let mut q = Query::new();
        q.set_measurement("/temperature/")
            .add_function(FunctionCall::new("mean").arg("degrees"))
            .set_into(":MEASUREMENT")
            .set_into_database("where_else")
            .set_into_retention_policy("autogen")
            .add_group("time(12m)");
        assert_eq!(
            q.to_select(),
            "select mean(\"degrees\") into \"where_else\".\"autogen\".:MEASUREMENT \
             from /temperature/ group by time(12m)"
        );

        q.set_database("mydb");
        assert!(q.to_select().contains("from /temperature/ "));
    }

    #[test]
    fn test_repeated_groups_render_each_time() {
        let mut q = Query::new();
        q.add_measurement("h2o_feet")
            .add_group("time(12m)")
            .add_group("time(12m)");
        assert_eq!(
            q.to_select(),
            "select * from \"h2o_feet\" group by time(12m),time(12m)"
        );
    }

    #[test]
    fn test_clean() {
        let mut q = http(Some("mydb"));
        q.add_field("fetch time").add_group("spdy");
        assert_eq!(
            q.to_select(),
            "select \"fetch time\" from \"mydb\"..\"http\" group by \"spdy\""
        );

        q.clean();
        assert_eq!(q.to_select(), "select * from \"mydb\"..\"http\"");
    }

    #[test]
    fn test_sub_query() {
        let mut q = http(Some("mydb"));
        q.add_function(FunctionCall::new("max").arg("fetch time"))
            .add_group("spdy");
        let inner = q.to_select();

        q.sub_query().add_function(FunctionCall::new("sum").arg("max"));
        assert_eq!(
            q.to_select(),
            "select sum(\"max\") from (select max(\"fetch time\") from \"mydb\"..\"http\" group by \"spdy\")"
        );
        assert_eq!(q.to_select(), format!("select sum(\"max\") from ({})", inner));
    }

    #[test]
    fn test_multi_query() {
        let mut q = http(Some("mydb"));
        q.add_function(FunctionCall::new("max").arg("fetch time"))
            .add_group("spdy");
        q.multi_query().add_function(FunctionCall::new("sum").arg("max"));
        assert_eq!(
            q.to_select(),
            "select max(\"fetch time\") from \"mydb\"..\"http\" group by \"spdy\";\
             select sum(\"max\") from \"mydb\"..\"http\""
        );
    }

    #[test]
    fn test_continuous_query() {
        let mut q = http(None);
        q.set_database("mydb")
            .set_into_database("mydb")
            .set_into("http copy")
            .set_cq_name("combine-http")
            .set_cq_every("2m")
            .set_cq_for("1m")
            .add_function(FunctionCall::new("count").arg("use"))
            .add_group("time(5m)");

        assert_eq!(
            q.to_cq(),
            "create continuous query \"combine-http\" on \"mydb\" resample every 2m for 1m \
             begin select count(\"use\") into \"mydb\"..\"http copy\" from \"mydb\"..\"http\" \
             group by time(5m) end"
        );
    }

    #[test]
    fn test_continuous_query_without_resample() {
        let mut q = http(Some("mydb"));
        q.set_cq_name("cq").set_into("copy");
        assert_eq!(
            q.to_cq(),
            "create continuous query \"cq\" on \"mydb\" begin select * into \"copy\" from \"mydb\"..\"http\" end"
        );
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let mut q = http(Some("mydb"));
        q.add_condition(Where::eq("spdy", "1")).set_limit(3);
        let first = q.to_select();
        assert_eq!(q.to_select(), first);
        assert_eq!(q.to_string(), first);
        q.to_cq();
        assert_eq!(q.to_select(), first);
    }
}
