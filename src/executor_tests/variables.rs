//! Variable and argument coercion behavior.

use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{
    Argument, EnumMeta, EnumValue, Field, InputObjectMeta, InputValue, ObjectMeta, Resolved,
    ResolvedValue, ResolverContext, SchemaBuilder, SchemaType, Type, Value, Variables,
};
use crate::{FieldResult, GraphQLError};

fn echo_schema(arg: Argument) -> SchemaType {
    SchemaBuilder::new()
        .register(
            ObjectMeta::new(
                "Query",
                vec![Field::new("echo", Type::named("String"))
                    .argument(arg)
                    .resolver(echo_resolver)],
            )
            .into_meta(),
        )
        .build("Query", None)
        .expect("valid schema")
}

// Serializes the argument mapping so tests can assert its exact shape.
fn echo_resolver(ctx: ResolverContext<'_>) -> FieldResult<ResolvedValue> {
    Ok(ResolvedValue::ready(serde_json::to_string(ctx.args)?))
}

fn variables(pairs: Vec<(&str, InputValue)>) -> Variables {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect()
}

fn echo(schema: &SchemaType, doc: &str, vars: &Variables) -> (serde_json::Value, usize) {
    let (result, errs) =
        crate::execute_sync(doc, None, schema, &Resolved::null(), vars, None)
            .expect("Execution failed");
    (serde_json::to_value(&result).unwrap(), errs.len())
}

#[test]
fn omitted_optional_argument_is_absent() {
    let schema = echo_schema(Argument::new("s", Type::named("String")));

    let (result, err_count) = echo(&schema, "{ echo }", &Variables::new());
    assert_eq!(result, json!({"echo": "{}"}));
    assert_eq!(err_count, 0);
}

#[test]
fn explicit_null_is_present() {
    let schema = echo_schema(Argument::new("s", Type::named("String")));

    let (result, err_count) = echo(&schema, "{ echo(s: null) }", &Variables::new());
    assert_eq!(result, json!({"echo": "{\"s\":null}"}));
    assert_eq!(err_count, 0);
}

#[test]
fn schema_default_applies_when_omitted() {
    let schema = echo_schema(
        Argument::new("s", Type::named("String")).default_value(InputValue::string("fallback")),
    );

    let (result, err_count) = echo(&schema, "{ echo }", &Variables::new());
    assert_eq!(result, json!({"echo": "{\"s\":\"fallback\"}"}));
    assert_eq!(err_count, 0);
}

#[test]
fn variable_default_applies_when_not_provided() {
    let schema = echo_schema(Argument::new("s", Type::named("String")));

    let (result, err_count) = echo(
        &schema,
        r#"query Q($s: String = "def") { echo(s: $s) }"#,
        &Variables::new(),
    );
    assert_eq!(result, json!({"echo": "{\"s\":\"def\"}"}));
    assert_eq!(err_count, 0);
}

#[test]
fn absent_variable_leaves_argument_out() {
    let schema = echo_schema(Argument::new("s", Type::named("String")));

    let (result, err_count) = echo(
        &schema,
        "query Q($s: String) { echo(s: $s) }",
        &Variables::new(),
    );
    assert_eq!(result, json!({"echo": "{}"}));
    assert_eq!(err_count, 0);
}

#[test]
fn missing_required_variable_is_fatal() {
    let schema = echo_schema(Argument::new("s", Type::named("String")));

    let result = crate::execute_sync(
        "query Q($s: String!) { echo(s: $s) }",
        None,
        &schema,
        &Resolved::null(),
        &Variables::new(),
        None,
    );

    match result {
        Err(GraphQLError::VariableCoercionError(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(
                errors[0].message(),
                "Variable \"$s\" of required type \"String!\" was not provided"
            );
        }
        other => panic!("expected variable coercion failure, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn invalid_variable_value_is_fatal() {
    let schema = echo_schema(Argument::new("s", Type::named("String")));

    let result = crate::execute_sync(
        "query Q($i: Int!) { echo(s: $i) }",
        None,
        &schema,
        &Resolved::null(),
        &variables(vec![("i", InputValue::string("not an int"))]),
        None,
    );

    match result {
        Err(GraphQLError::VariableCoercionError(errors)) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0]
                .message()
                .starts_with("Variable \"$i\" got invalid value"));
        }
        other => panic!("expected variable coercion failure, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn list_shorthand_wraps_single_values() {
    let schema = echo_schema(Argument::new("s", Type::list(Type::named("String"))));

    let (result, err_count) = echo(&schema, r#"{ echo(s: "lone") }"#, &Variables::new());
    assert_eq!(result, json!({"echo": "{\"s\":[\"lone\"]}"}));
    assert_eq!(err_count, 0);

    let (result, err_count) = echo(
        &schema,
        "query Q($s: [String]) { echo(s: $s) }",
        &variables(vec![("s", InputValue::string("lone"))]),
    );
    assert_eq!(result, json!({"echo": "{\"s\":[\"lone\"]}"}));
    assert_eq!(err_count, 0);
}

#[test]
fn null_for_nullable_list_is_not_wrapped() {
    let schema = echo_schema(Argument::new("s", Type::list(Type::named("String"))));

    let (result, err_count) = echo(&schema, "{ echo(s: null) }", &Variables::new());
    assert_eq!(result, json!({"echo": "{\"s\":null}"}));
    assert_eq!(err_count, 0);
}

#[test]
fn element_failure_fails_the_whole_list_coercion() {
    let schema = echo_schema(Argument::new("s", Type::list(Type::named("Int"))));

    let (result, err_count) = echo(&schema, r#"{ echo(s: [1, "two", 3]) }"#, &Variables::new());
    assert_eq!(result, json!({"echo": null}));
    assert_eq!(err_count, 1);
}

#[test]
fn missing_non_null_argument_is_a_field_error() {
    let schema = echo_schema(Argument::new("s", Type::non_null_named("String")));

    let (result, err_count) = echo(&schema, "{ echo }", &Variables::new());
    assert_eq!(result, json!({"echo": null}));
    assert_eq!(err_count, 1);
}

#[test]
fn enum_literals_and_variable_strings_coerce() {
    let schema = SchemaBuilder::new()
        .register(
            EnumMeta::new(
                "Color",
                &[
                    EnumValue::new("RED"),
                    EnumValue::new("GREEN"),
                    EnumValue::new("BLUE"),
                ],
            )
            .into_meta(),
        )
        .register(
            ObjectMeta::new(
                "Query",
                vec![Field::new("echo", Type::named("String"))
                    .argument(Argument::new("c", Type::named("Color")))
                    .resolver(echo_resolver)],
            )
            .into_meta(),
        )
        .build("Query", None)
        .expect("valid schema");

    let (result, err_count) = echo(&schema, "{ echo(c: RED) }", &Variables::new());
    assert_eq!(result, json!({"echo": "{\"c\":\"RED\"}"}));
    assert_eq!(err_count, 0);

    let (result, err_count) = echo(
        &schema,
        "query Q($c: Color) { echo(c: $c) }",
        &variables(vec![("c", InputValue::string("BLUE"))]),
    );
    assert_eq!(result, json!({"echo": "{\"c\":\"BLUE\"}"}));
    assert_eq!(err_count, 0);

    let (result, err_count) = echo(&schema, "{ echo(c: MAGENTA) }", &Variables::new());
    assert_eq!(result, json!({"echo": null}));
    assert_eq!(err_count, 1);
}

#[test]
fn unknown_input_object_keys_are_ignored() {
    let schema = SchemaBuilder::new()
        .register(
            InputObjectMeta::new(
                "Filter",
                vec![Argument::new("name", Type::named("String"))],
            )
            .into_meta(),
        )
        .register(
            ObjectMeta::new(
                "Query",
                vec![Field::new("echo", Type::named("String"))
                    .argument(Argument::new("f", Type::named("Filter")))
                    .resolver(echo_resolver)],
            )
            .into_meta(),
        )
        .build("Query", None)
        .expect("valid schema");

    let (result, err_count) = echo(
        &schema,
        r#"{ echo(f: {name: "x", stray: 1}) }"#,
        &Variables::new(),
    );
    assert_eq!(result, json!({"echo": "{\"f\":{\"name\":\"x\"}}"}));
    assert_eq!(err_count, 0);
}

#[test]
fn input_object_field_defaults_apply() {
    let schema = SchemaBuilder::new()
        .register(
            InputObjectMeta::new(
                "Filter",
                vec![
                    Argument::new("name", Type::named("String")),
                    Argument::new("limit", Type::named("Int"))
                        .default_value(InputValue::int(10)),
                ],
            )
            .into_meta(),
        )
        .register(
            ObjectMeta::new(
                "Query",
                vec![Field::new("echo", Type::named("String"))
                    .argument(Argument::new("f", Type::named("Filter")))
                    .resolver(echo_resolver)],
            )
            .into_meta(),
        )
        .build("Query", None)
        .expect("valid schema");

    let (result, err_count) = echo(&schema, r#"{ echo(f: {name: "x"}) }"#, &Variables::new());
    assert_eq!(
        result,
        json!({"echo": "{\"f\":{\"name\":\"x\",\"limit\":10}}"})
    );
    assert_eq!(err_count, 0);
}

#[test]
fn missing_required_input_object_field_is_a_field_error() {
    let schema = SchemaBuilder::new()
        .register(
            InputObjectMeta::new(
                "Filter",
                vec![Argument::new("name", Type::non_null_named("String"))],
            )
            .into_meta(),
        )
        .register(
            ObjectMeta::new(
                "Query",
                vec![Field::new("echo", Type::named("String"))
                    .argument(Argument::new("f", Type::named("Filter")))
                    .resolver(echo_resolver)],
            )
            .into_meta(),
        )
        .build("Query", None)
        .expect("valid schema");

    let (result, err_count) = echo(&schema, "{ echo(f: {}) }", &Variables::new());
    assert_eq!(result, json!({"echo": null}));
    assert_eq!(err_count, 1);
}

#[test]
fn int_scalar_enforces_32_bit_range() {
    let schema = echo_schema(Argument::new("i", Type::named("Int")));

    let (result, err_count) = echo(&schema, "{ echo(i: 2147483647) }", &Variables::new());
    assert_eq!(result, json!({"echo": "{\"i\":2147483647}"}));
    assert_eq!(err_count, 0);

    let (result, err_count) = echo(&schema, "{ echo(i: 2147483648) }", &Variables::new());
    assert_eq!(result, json!({"echo": null}));
    assert_eq!(err_count, 1);
}

#[test]
fn sibling_fields_survive_argument_errors() {
    let schema = SchemaBuilder::new()
        .register(
            ObjectMeta::new(
                "Query",
                vec![
                    Field::new("echo", Type::named("String"))
                        .argument(Argument::new("i", Type::named("Int")))
                        .resolver(echo_resolver),
                    Field::new("plain", Type::named("String")),
                ],
            )
            .into_meta(),
        )
        .build("Query", None)
        .expect("valid schema");

    let (result, errs) = crate::execute_sync(
        r#"{ echo(i: "nope") plain }"#,
        None,
        &schema,
        &Resolved::from(json!({"plain": "still here"})),
        &Variables::new(),
        None,
    )
    .expect("Execution failed");

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"echo": null, "plain": "still here"})
    );
    assert_eq!(errs.len(), 1);
    assert!(errs[0]
        .message()
        .starts_with("Argument \"i\" has invalid value"));
}

#[test]
fn coerced_floats_and_booleans_reach_resolvers_typed() {
    let schema = SchemaBuilder::new()
        .register(
            ObjectMeta::new(
                "Query",
                vec![Field::new("echo", Type::named("String"))
                    .argument(Argument::new("f", Type::named("Float")))
                    .argument(Argument::new("b", Type::named("Boolean")))
                    .resolver(|ctx: ResolverContext<'_>| {
                        assert_eq!(ctx.args.get("f"), Some(&Value::Float(1.0)));
                        assert_eq!(ctx.args.get("b"), Some(&Value::Boolean(true)));
                        Ok(ResolvedValue::ready("ok"))
                    })],
            )
            .into_meta(),
        )
        .build("Query", None)
        .expect("valid schema");

    let (result, err_count) = echo(&schema, "{ echo(f: 1, b: true) }", &Variables::new());
    assert_eq!(result, json!({"echo": "ok"}));
    assert_eq!(err_count, 0);
}
