use chorm_core::{
    op, record, table, Client, Config, ExecResult, Executor, Mapper, QueryBuilder, ResultSet,
    Result, Row, Value,
};

#[derive(Debug, Default)]
struct PageView {
    id: u64,
    user_id: u64,
    path: String,
    duration_ms: u32,
}

record! {
    #[table = "page_views"]
    #[engine = "MergeTree"]
    #[option("index_granularity" = "8192")]
    impl Record for PageView {
        id: [primary_key],
        user_id,
        path,
        duration_ms,
    }
}

/// Prints statements instead of sending them anywhere
struct EchoExecutor;

impl Executor for EchoExecutor {
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecResult> {
        println!("EXECUTE {} {:?}", sql, params);
        Ok(ExecResult::default())
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<ResultSet> {
        println!("QUERY   {} {:?}", sql, params);
        Ok(ResultSet::new(
            vec!["count".to_string()],
            vec![vec![Value::U64(3)]],
        ))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // SELECT with comparison, list, and raw predicates
    let query = table("page_views")
        .select(("user_id", "path"))
        .where_(("duration_ms", op::GT, 500))
        .where_(("path", op::IN, vec!["/", "/pricing"]))
        .where_raw("toDate(ts) = ?", ["2024-06-01"])
        .order_by_desc("duration_ms")
        .limit(10);
    println!("SELECT SQL: {}", query.to_sql()?);
    println!("Arguments: {:?}", query.parameters()?);

    // Aggregates get fixed aliases
    let stats = table("page_views")
        .group_by("path")
        .aggregate()
        .count("*")
        .uniq("user_id")
        .quantile(0.95, "duration_ms")
        .into_query()?;
    println!("AGGREGATE SQL: {}", stats.to_sql()?);

    // Window functions append a projection
    let ranked = table("page_views")
        .select(("user_id", "path"))
        .window()
        .row_number()
        .over("user_id", "duration_ms DESC")
        .alias("rank")
        .add_to_query();
    println!("WINDOW SQL: {}", ranked.to_sql()?);

    // Schema derived from the record
    let mapper = Mapper::new();
    println!("DDL: {}", mapper.create_table_sql::<PageView>()?);

    // Terminal operations through a client
    let client = Client::new(EchoExecutor, Config::default());
    client.create_table::<PageView>().await?;
    client
        .insert(&PageView {
            id: 1,
            user_id: 42,
            path: "/".to_string(),
            ..PageView::default()
        })
        .await?;

    let totals: Row = table("page_views")
        .aggregate()
        .count("*")
        .fetch_one(&client)
        .await?;
    println!("count = {:?}", totals.get_u64("count"));

    table("page_views")
        .where_(("user_id", 42))
        .update(&client, vec![("path", "/home")])
        .await?;
    table("page_views")
        .where_(("duration_ms", op::LT, 10))
        .delete(&client)
        .await?;

    Ok(())
}
