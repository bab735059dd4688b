#[cfg(test)]
mod tests {
    use async_stream::stream;
    use cask::{
        CancellationToken, Executor, Prepared, Query, QueryResult, Result, RowLabeled,
        RowsAffected, SelectQuery, SerialConnection, Table, Value, col, lit,
        stream::{Stream, TryStreamExt},
    };
    use std::{
        fmt::{self, Display},
        sync::Arc,
    };

    struct MemoryPrepared(String);

    impl Display for MemoryPrepared {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl Prepared for MemoryPrepared {
        fn bind(&mut self, _value: impl cask::AsValue) -> Result<&mut Self> {
            Ok(self)
        }
        fn bind_index(&mut self, _value: impl cask::AsValue, _index: u64) -> Result<&mut Self> {
            Ok(self)
        }
        fn clear_bindings(&mut self) -> Result<&mut Self> {
            Ok(self)
        }
    }

    /// Executor stub replaying canned rows and recording the statements it ran.
    struct MemoryExecutor {
        rows: Vec<RowLabeled>,
        statements: Vec<String>,
    }

    impl MemoryExecutor {
        fn new(rows: Vec<RowLabeled>) -> Self {
            Self {
                rows,
                statements: Vec::new(),
            }
        }
    }

    impl Executor for MemoryExecutor {
        type Prepared = MemoryPrepared;

        async fn prepare(&mut self, query: String) -> Result<Query<MemoryPrepared>> {
            Ok(Query::Prepared(MemoryPrepared(query)))
        }

        fn run(
            &mut self,
            query: Query<MemoryPrepared>,
        ) -> impl Stream<Item = Result<QueryResult>> + Send {
            self.statements.push(query.to_string());
            let rows = self.rows.clone();
            stream! {
                let count = rows.len() as u64;
                for row in rows {
                    yield Ok(QueryResult::RowLabeled(row));
                }
                yield Ok(QueryResult::Affected(RowsAffected {
                    rows_affected: count,
                    last_affected_id: None,
                }));
            }
        }
    }

    struct Person;

    impl Table for Person {
        fn table_name() -> &'static str {
            "people"
        }
        fn resolve_column(member: &str) -> Result<String> {
            Ok(member.to_owned())
        }
    }

    fn person_rows() -> Vec<RowLabeled> {
        let labels: Arc<[String]> = Arc::from(vec!["name".to_owned(), "age".to_owned()]);
        vec![
            RowLabeled::new(
                labels.clone(),
                Box::new([Value::Text("Ada".into()), Value::Integer(36)]),
            ),
            RowLabeled::new(
                labels,
                Box::new([Value::Text("Grace".into()), Value::Integer(45)]),
            ),
        ]
    }

    #[tokio::test]
    async fn queued_fetch_returns_the_rows() {
        let connection = SerialConnection::new(MemoryExecutor::new(person_rows()));
        let sql = SelectQuery::<Person>::new()
            .filter(col("age").gt(lit(18)))
            .to_sql()
            .unwrap();
        let handle = connection
            .enqueue(
                move |mut executor| async move {
                    executor.fetch(sql.into()).try_collect::<Vec<_>>().await
                },
                CancellationToken::new(),
            )
            .unwrap();
        let rows = handle.await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get_column("name"), Some(&Value::Text("Ada".into())));
        assert_eq!(rows[1].get_column("age"), Some(&Value::Integer(45)));
    }

    #[tokio::test]
    async fn queued_execute_folds_the_affected_rows() {
        let connection = SerialConnection::new(MemoryExecutor::new(person_rows()));
        let handle = connection
            .enqueue(
                |mut executor| async move {
                    executor
                        .execute("DELETE FROM \"people\"".into())
                        .await
                        .map(|affected| affected.rows_affected)
                },
                CancellationToken::new(),
            )
            .unwrap();
        assert_eq!(handle.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn operations_against_one_connection_are_serialized() {
        let connection = SerialConnection::new(MemoryExecutor::new(person_rows()));
        let mut handles = Vec::new();
        for i in 0..4 {
            let handle = connection
                .enqueue(
                    move |mut executor| async move {
                        executor.statements.push(format!("-- operation {}", i));
                        Ok(i)
                    },
                    CancellationToken::new(),
                )
                .unwrap();
            handles.push(handle);
        }
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.unwrap(), i);
        }
        let trace = connection
            .enqueue(
                |executor| async move { Ok(executor.statements.clone()) },
                CancellationToken::new(),
            )
            .unwrap()
            .await
            .unwrap();
        assert_eq!(
            trace,
            vec![
                "-- operation 0".to_owned(),
                "-- operation 1".to_owned(),
                "-- operation 2".to_owned(),
                "-- operation 3".to_owned(),
            ]
        );
    }

    #[tokio::test]
    async fn shutdown_closes_the_connection_queue() {
        let connection = SerialConnection::new(MemoryExecutor::new(Vec::new()));
        let pending = connection
            .enqueue(|_executor| async move { Ok(()) }, CancellationToken::new())
            .unwrap();
        connection.shutdown().await;
        assert!(connection.is_shutdown());
        pending.await.expect("drained before shutdown settled");
        assert!(
            connection
                .enqueue(|_executor| async move { Ok(()) }, CancellationToken::new())
                .is_err()
        );
    }
}
