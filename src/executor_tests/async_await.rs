//! Interchangeability of ready and pending resolvers, ordering guarantees
//! under out-of-order settlement, and serial mutation execution.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{
    Field, ObjectMeta, Resolved, ResolvedValue, ResolverContext, SchemaBuilder, SchemaType, Type,
    Variables,
};

fn single_field_schema(field: Field) -> SchemaType {
    SchemaBuilder::new()
        .register(ObjectMeta::new("Query", vec![field]).into_meta())
        .build("Query", None)
        .expect("valid schema")
}

async fn run(schema: &SchemaType, doc: &str) -> (serde_json::Value, usize) {
    let (result, errs) = crate::execute(doc, None, schema, &Resolved::null(), &Variables::new(), None)
        .await
        .expect("Execution failed");
    (serde_json::to_value(&result).unwrap(), errs.len())
}

#[tokio::test]
async fn ready_and_pending_resolvers_are_interchangeable() {
    let ready = single_field_schema(
        Field::new("test", Type::named("String"))
            .resolver(|_ctx: ResolverContext<'_>| Ok(ResolvedValue::ready("same"))),
    );
    let pending = single_field_schema(Field::new("test", Type::named("String")).resolver(
        |_ctx: ResolverContext<'_>| {
            Ok(ResolvedValue::pending(async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(Resolved::from("same"))
            }))
        },
    ));

    assert_eq!(run(&ready, "{ test }").await, run(&pending, "{ test }").await);
}

#[tokio::test]
async fn response_order_ignores_settlement_order() {
    let schema = SchemaBuilder::new()
        .register(
            ObjectMeta::new(
                "Query",
                vec![
                    Field::new("slow", Type::named("String")).resolver(
                        |_ctx: ResolverContext<'_>| {
                            Ok(ResolvedValue::pending(async {
                                tokio::time::sleep(Duration::from_millis(40)).await;
                                Ok(Resolved::from("slow"))
                            }))
                        },
                    ),
                    Field::new("fast", Type::named("String")).resolver(
                        |_ctx: ResolverContext<'_>| Ok(ResolvedValue::ready("fast")),
                    ),
                ],
            )
            .into_meta(),
        )
        .build("Query", None)
        .expect("valid schema");

    let (result, errs) = crate::execute(
        "{ slow, fast }",
        None,
        &schema,
        &Resolved::null(),
        &Variables::new(),
        None,
    )
    .await
    .expect("Execution failed");

    assert_eq!(errs, []);
    // The serialized key order is the declared order, not completion order.
    assert_eq!(
        serde_json::to_string(&result).unwrap(),
        r#"{"slow":"slow","fast":"fast"}"#
    );
}

#[tokio::test]
async fn sibling_fields_resolve_concurrently() {
    let make_sleeper = || {
        |_ctx: ResolverContext<'_>| {
            Ok(ResolvedValue::pending(async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(Resolved::from("done"))
            }))
        }
    };

    let schema = SchemaBuilder::new()
        .register(
            ObjectMeta::new(
                "Query",
                vec![
                    Field::new("a", Type::named("String")).resolver(make_sleeper()),
                    Field::new("b", Type::named("String")).resolver(make_sleeper()),
                    Field::new("c", Type::named("String")).resolver(make_sleeper()),
                ],
            )
            .into_meta(),
        )
        .build("Query", None)
        .expect("valid schema");

    let started = Instant::now();
    let (result, err_count) = run(&schema, "{ a, b, c }").await;
    let elapsed = started.elapsed();

    assert_eq!(result, json!({"a": "done", "b": "done", "c": "done"}));
    assert_eq!(err_count, 0);
    // Three 50ms resolvers run together, not back to back.
    assert!(
        elapsed < Duration::from_millis(120),
        "expected concurrent resolution, took {:?}",
        elapsed
    );
}

#[tokio::test]
async fn mutation_root_fields_run_serially() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let recording = |tag: &'static str, delay_ms: u64, log: &Arc<Mutex<Vec<&'static str>>>| {
        let log = Arc::clone(log);
        move |_ctx: ResolverContext<'_>| {
            let log = Arc::clone(&log);
            Ok(ResolvedValue::pending(async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                log.lock().unwrap().push(tag);
                Ok(Resolved::from(tag))
            }))
        }
    };

    let schema = SchemaBuilder::new()
        .register(
            ObjectMeta::new("Query", vec![Field::new("ping", Type::named("String"))])
                .into_meta(),
        )
        .register(
            ObjectMeta::new(
                "Mutation",
                vec![
                    Field::new("first", Type::named("String"))
                        .resolver(recording("first", 40, &log)),
                    Field::new("second", Type::named("String"))
                        .resolver(recording("second", 0, &log)),
                ],
            )
            .into_meta(),
        )
        .build("Query", Some("Mutation"))
        .expect("valid schema");

    let (result, errs) = crate::execute(
        "mutation { first, second }",
        None,
        &schema,
        &Resolved::null(),
        &Variables::new(),
        None,
    )
    .await
    .expect("Execution failed");

    assert_eq!(errs, []);
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"first": "first", "second": "second"})
    );
    // Despite the first field being the slow one, it finished before the
    // second ever started.
    assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
}

#[tokio::test]
async fn query_fields_settle_out_of_declared_order() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let recording = |tag: &'static str, delay_ms: u64, log: &Arc<Mutex<Vec<&'static str>>>| {
        let log = Arc::clone(log);
        move |_ctx: ResolverContext<'_>| {
            let log = Arc::clone(&log);
            Ok(ResolvedValue::pending(async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                log.lock().unwrap().push(tag);
                Ok(Resolved::from(tag))
            }))
        }
    };

    let schema = SchemaBuilder::new()
        .register(
            ObjectMeta::new(
                "Query",
                vec![
                    Field::new("first", Type::named("String"))
                        .resolver(recording("first", 40, &log)),
                    Field::new("second", Type::named("String"))
                        .resolver(recording("second", 0, &log)),
                ],
            )
            .into_meta(),
        )
        .build("Query", None)
        .expect("valid schema");

    let (result, errs) = crate::execute(
        "{ first, second }",
        None,
        &schema,
        &Resolved::null(),
        &Variables::new(),
        None,
    )
    .await
    .expect("Execution failed");

    assert_eq!(errs, []);
    // Settlement order is second-then-first, output order stays declared.
    assert_eq!(*log.lock().unwrap(), vec!["second", "first"]);
    assert_eq!(
        serde_json::to_string(&result).unwrap(),
        r#"{"first":"first","second":"second"}"#
    );
}

#[tokio::test]
async fn pending_failure_on_nullable_field_spares_siblings() {
    let schema = SchemaBuilder::new()
        .register(
            ObjectMeta::new(
                "Query",
                vec![
                    Field::new("fails", Type::named("String")).resolver(
                        |_ctx: ResolverContext<'_>| {
                            Ok(ResolvedValue::pending(async {
                                tokio::time::sleep(Duration::from_millis(5)).await;
                                Err("async boom".into())
                            }))
                        },
                    ),
                    Field::new("works", Type::named("String")).resolver(
                        |_ctx: ResolverContext<'_>| {
                            Ok(ResolvedValue::pending(async {
                                Ok(Resolved::from("fine"))
                            }))
                        },
                    ),
                ],
            )
            .into_meta(),
        )
        .build("Query", None)
        .expect("valid schema");

    let (result, errs) = crate::execute(
        "{ fails, works }",
        None,
        &schema,
        &Resolved::null(),
        &Variables::new(),
        None,
    )
    .await
    .expect("Execution failed");

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"fails": null, "works": "fine"})
    );
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].message(), "async boom");
}
