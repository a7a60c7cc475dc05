//! Resolver dispatch behavior: the default resolver's property/member
//! access, explicit resolvers, pending results, and out-name remapping.

use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{
    Argument, Field, FieldResult, InputObjectMeta, Member, ObjectMeta, Resolved, ResolvedValue,
    ResolverContext, SchemaBuilder, SchemaType, SourceObject, Type, Variables,
};

fn test_schema(test_field: Field) -> SchemaType {
    SchemaBuilder::new()
        .register(ObjectMeta::new("Query", vec![test_field]).into_meta())
        .build("Query", None)
        .expect("valid schema")
}

async fn run(schema: &SchemaType, doc: &str, root: &Resolved) -> serde_json::Value {
    let (result, errs) = crate::execute(doc, None, schema, root, &Variables::new(), None)
        .await
        .expect("Execution failed");
    assert_eq!(errs, []);
    serde_json::to_value(&result).unwrap()
}

/// Stringifies `[source, args]` the way the resolver contract exposes them.
fn json_resolver(ctx: ResolverContext<'_>) -> FieldResult<ResolvedValue> {
    let source = match ctx.source.as_value() {
        Some(value) => serde_json::to_value(value)?,
        None => serde_json::Value::Null,
    };
    let args = serde_json::to_value(ctx.args)?;
    Ok(ResolvedValue::ready(serde_json::to_string(&(
        source, args,
    ))?))
}

#[tokio::test]
async fn default_resolver_accesses_properties() {
    let schema = test_schema(Field::new("test", Type::named("String")));

    let source = Resolved::from(json!({"test": "testValue"}));
    assert_eq!(
        run(&schema, "{ test }", &source).await,
        json!({"test": "testValue"})
    );
}

#[tokio::test]
async fn default_resolver_calls_methods() {
    struct Source {
        secret: &'static str,
    }

    impl SourceObject for Source {
        fn member(&self, name: &str) -> Member<'_> {
            match name {
                "test" => Member::Invocable(Box::new(|| Ok(ResolvedValue::ready(self.secret)))),
                _ => Member::Absent,
            }
        }
    }

    let schema = test_schema(Field::new("test", Type::named("String")));

    let source = Resolved::Object(std::sync::Arc::new(Source {
        secret: "testValue",
    }));
    assert_eq!(
        run(&schema, "{ test }", &source).await,
        json!({"test": "testValue"})
    );
}

#[tokio::test]
async fn uses_provided_resolve_function() {
    let schema = test_schema(
        Field::new("test", Type::named("String"))
            .argument(Argument::new("aStr", Type::named("String")))
            .argument(Argument::new("aInt", Type::named("Int")))
            .resolver(json_resolver),
    );

    assert_eq!(
        run(&schema, "{ test }", &Resolved::null()).await,
        json!({"test": "[null,{}]"})
    );

    let source = Resolved::from("Source!");
    assert_eq!(
        run(&schema, r#"{ test(aStr: "String!") }"#, &source).await,
        json!({"test": r#"["Source!",{"aStr":"String!"}]"#})
    );

    assert_eq!(
        run(&schema, r#"{ test(aInt: -123, aStr: "String!",) }"#, &source).await,
        json!({"test": r#"["Source!",{"aStr":"String!","aInt":-123}]"#})
    );
}

#[tokio::test]
async fn handles_pending_results() {
    let schema = test_schema(Field::new("test", Type::named("String")).resolver(
        |_ctx: ResolverContext<'_>| {
            Ok(ResolvedValue::pending(async {
                Ok(Resolved::from("foo"))
            }))
        },
    ));

    assert_eq!(
        run(&schema, "{ test }", &Resolved::null()).await,
        json!({"test": "foo"})
    );
}

#[tokio::test]
async fn maps_argument_out_names() {
    let schema = test_schema(
        Field::new("test", Type::named("String"))
            .argument(Argument::new("aStr", Type::named("String")).out_name("a_str"))
            .argument(Argument::new("aInt", Type::named("Int")).out_name("a_int"))
            .resolver(json_resolver),
    );

    assert_eq!(
        run(&schema, "{ test }", &Resolved::null()).await,
        json!({"test": "[null,{}]"})
    );

    let source = Resolved::from("Source!");
    assert_eq!(
        run(&schema, r#"{ test(aStr: "String!") }"#, &source).await,
        json!({"test": r#"["Source!",{"a_str":"String!"}]"#})
    );

    assert_eq!(
        run(&schema, r#"{ test(aInt: -123, aStr: "String!",) }"#, &source).await,
        json!({"test": r#"["Source!",{"a_str":"String!","a_int":-123}]"#})
    );
}

#[tokio::test]
async fn maps_out_names_through_recursive_input_objects() {
    let schema = SchemaBuilder::new()
        .register(
            InputObjectMeta::new(
                "TestInputObject",
                vec![
                    Argument::new("inputOne", Type::named("String")).out_name("input_one"),
                    // The input object references itself; the registry
                    // resolves the cycle by name.
                    Argument::new("inputRecursive", Type::named("TestInputObject"))
                        .out_name("input_recursive"),
                ],
            )
            .into_meta(),
        )
        .register(
            ObjectMeta::new(
                "Query",
                vec![Field::new("test", Type::named("String"))
                    .argument(
                        Argument::new("aInput", Type::named("TestInputObject"))
                            .out_name("a_input"),
                    )
                    .resolver(json_resolver)],
            )
            .into_meta(),
        )
        .build("Query", None)
        .expect("valid schema");

    assert_eq!(
        run(&schema, "{ test }", &Resolved::null()).await,
        json!({"test": "[null,{}]"})
    );

    let source = Resolved::from("Source!");
    assert_eq!(
        run(&schema, r#"{ test(aInput: {inputOne: "String!"} ) }"#, &source).await,
        json!({"test": r#"["Source!",{"a_input":{"input_one":"String!"}}]"#})
    );

    assert_eq!(
        run(
            &schema,
            r#"{ test(aInput: {inputRecursive: {inputOne: "SourceRecursive!"}} ) }"#,
            &source,
        )
        .await,
        json!({
            "test": r#"["Source!",{"a_input":{"input_recursive":{"input_one":"SourceRecursive!"}}}]"#
        })
    );
}
