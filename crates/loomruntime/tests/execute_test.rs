use loomcore::{Branches, FlowError, Task, TaskError, Value};
use loomruntime::{RunOptions, RunWorkflow};
use serde_json::json;
use std::time::{Duration, Instant};

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

fn invocation_arg(vars: &Value) -> String {
    vars.get("invocationArgs")
        .and_then(|args| args.idx(0))
        .and_then(Value::as_str)
        .unwrap_or("None")
        .to_string()
}

fn to_query_task() -> Task {
    Task::from_fn_with_id(
        |ctx, _input| async move {
            let query = invocation_arg(&ctx.vars);
            Ok(Value::from(format!("{{\"query\": \"a&b:{query}\"}}")))
        },
        "to-query",
    )
}

fn verify_query_task() -> Task {
    Task::from_fn_with_id(
        |_ctx, input: Vec<Value>| async move {
            let query = input.first().and_then(Value::as_str).unwrap_or_default();
            Ok(Value::from(if query.ends_with('?') {
                "yes".to_string()
            } else {
                "You need to end your question with a ?".to_string()
            }))
        },
        "verify-query",
    )
}

fn refine_query_task() -> Task {
    Task::from_fn_with_id(
        |ctx, _input| async move {
            let previous = ctx
                .vars
                .get("history")
                .and_then(|history| match history {
                    Value::Array(messages) => messages.last(),
                    _ => None,
                })
                .and_then(|message| message.get("content"))
                .and_then(Value::as_str)
                .unwrap_or("None")
                .to_string();
            let query = invocation_arg(&ctx.vars);
            Ok(Value::from(format!(
                "{{\"query\": \"a&b:{previous}&c:{query}\"}}"
            )))
        },
        "refine-query",
    )
}

fn control_flow_task() -> Task {
    Task::from_fn_with_id(
        |ctx, _input| async move {
            let query = invocation_arg(&ctx.vars);
            let branch = match query.len() % 3 {
                1 => "REFINE_QUERY",
                _ => "NEW_QUERY",
            };
            Ok(Value::from(branch))
        },
        "control-flow",
    )
}

fn search_flow() -> loomcore::Workflow {
    let query_construction = control_flow_task().when(
        Branches::new()
            .on("NEW_QUERY", to_query_task())
            .on("REFINE_QUERY", refine_query_task()),
    );

    verify_query_task().when(Branches::new().on("yes", query_construction))
}

fn state_for(messages: &[&str]) -> Value {
    let history: Vec<_> = messages[..messages.len() - 1]
        .iter()
        .map(|content| json!({"content": content, "role": "user"}))
        .collect();
    Value::from(json!({
        "history": history,
        "invocationArgs": [messages[messages.len() - 1]],
    }))
}

#[tokio::test]
async fn search_flow_rejects_questions_without_a_question_mark() {
    init_tracing();
    let flow = search_flow();

    let result = flow
        .run(
            state_for(&["hello"]),
            vec![Value::from("hello")],
            RunOptions::default(),
        )
        .await
        .unwrap();

    // no branch matched and no default exists, so the raw verification
    // message passes through the return connector unchanged
    assert_eq!(result, Value::from("You need to end your question with a ?"));
}

#[tokio::test]
async fn search_flow_builds_a_new_query() {
    init_tracing();
    let flow = search_flow();

    let result = flow
        .run(
            state_for(&["hello?"]),
            vec![Value::from("hello?")],
            RunOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(result, Value::from("{\"query\": \"a&b:hello?\"}"));
}

#[tokio::test]
async fn search_flow_refines_against_history() {
    init_tracing();
    let flow = search_flow();

    let result = flow
        .run(
            state_for(&["hmmm", "hey?"]),
            vec![Value::from("hey?")],
            RunOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(result, Value::from("{\"query\": \"a&b:hmmm&c:hey?\"}"));
}

#[tokio::test]
async fn then_is_equivalent_to_feeding_the_result_forward() {
    init_tracing();
    let double = Task::from_fn_with_id(
        |_ctx, input: Vec<Value>| async move {
            let n = input.first().and_then(Value::as_f64).unwrap_or(0.0);
            Ok(Value::from(n * 2.0))
        },
        "double",
    );
    let add_ten = Task::from_fn_with_id(
        |_ctx, input: Vec<Value>| async move {
            let n = input.first().and_then(Value::as_f64).unwrap_or(0.0);
            Ok(Value::from(n + 10.0))
        },
        "add-ten",
    );

    let composed = double
        .then(&add_ten)
        .run(Value::Null, vec![Value::from(3.0)], RunOptions::default())
        .await
        .unwrap();

    let intermediate = double
        .run(Value::Null, vec![Value::from(3.0)], RunOptions::default())
        .await
        .unwrap();
    let sequential = add_ten
        .run(Value::Null, vec![intermediate], RunOptions::default())
        .await
        .unwrap();

    assert_eq!(composed, Value::from(16.0));
    assert_eq!(composed, sequential);
}

#[tokio::test]
async fn when_feeds_the_source_result_to_the_matching_branch() {
    init_tracing();
    let source = Task::from_fn_with_id(
        |_ctx, _input| async { Ok::<_, TaskError>(Value::from("k")) },
        "source",
    );
    let consume = Task::from_fn_with_id(
        |_ctx, input: Vec<Value>| async move {
            let got = input.first().and_then(Value::as_str).unwrap_or_default();
            Ok(Value::from(format!("got:{got}")))
        },
        "consume",
    );

    let result = source
        .when(Branches::new().on("k", &consume))
        .run(Value::Null, vec![], RunOptions::default())
        .await
        .unwrap();

    assert_eq!(result, Value::from("got:k"));
}

#[tokio::test]
async fn when_falls_through_to_the_default_branch() {
    init_tracing();
    let source = Task::from_fn_with_id(
        |_ctx, _input| async { Ok::<_, TaskError>(Value::from("unexpected")) },
        "source",
    );
    let ignored = Task::from_fn_with_id(
        |_ctx, _input| async { Ok::<_, TaskError>(Value::from("wrong branch")) },
        "ignored",
    );
    let fallback = Task::from_fn_with_id(
        |_ctx, input: Vec<Value>| async move {
            let got = input.first().and_then(Value::as_str).unwrap_or_default();
            Ok(Value::from(format!("default:{got}")))
        },
        "fallback",
    );

    let result = source
        .when(Branches::new().on("k", &ignored).otherwise(&fallback))
        .run(Value::Null, vec![], RunOptions::default())
        .await
        .unwrap();

    assert_eq!(result, Value::from("default:unexpected"));
}

#[tokio::test]
async fn task_failure_surfaces_the_originating_node() {
    init_tracing();
    let fine = Task::from_fn_with_id(
        |_ctx, _input| async { Ok::<_, TaskError>(Value::from("ok")) },
        "fine",
    );
    let explode = Task::from_fn_with_id(
        |_ctx, _input| async { Err::<Value, _>(TaskError::msg("wires crossed")) },
        "explode",
    );

    let err = fine
        .then(&explode)
        .run(Value::Null, vec![], RunOptions::default())
        .await
        .unwrap_err();

    match err {
        FlowError::Task(failure) => {
            assert_eq!(failure.node_id, "explode");
            assert_eq!(failure.message, "wires crossed");
        }
        other => panic!("expected task failure, got {other}"),
    }
}

#[tokio::test]
async fn unresolved_task_times_out() {
    init_tracing();
    let never = Task::from_fn_with_id(
        |_ctx, _input| async { std::future::pending::<Result<Value, TaskError>>().await },
        "never",
    );

    let started = Instant::now();
    let err = never
        .run(
            Value::Null,
            vec![],
            RunOptions::with_timeout(Duration::from_millis(150)),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, FlowError::Timeout(150)));
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(150), "fired early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "fired late: {elapsed:?}");
}

#[tokio::test]
async fn timeout_cancels_the_context_token() {
    init_tracing();
    let cooperative = Task::from_fn_with_id(
        |ctx, _input| async move {
            ctx.cancellation.cancelled().await;
            Err::<Value, _>(TaskError::msg("stopped"))
        },
        "cooperative",
    );

    let err = cooperative
        .run(
            Value::Null,
            vec![],
            RunOptions::with_timeout(Duration::from_millis(100)),
        )
        .await
        .unwrap_err();

    // the timeout wins the race; the cancelled task's own error is ignored
    assert!(matches!(err, FlowError::Timeout(100)));
}
