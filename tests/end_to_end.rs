//! End-to-end tests driving the emulator over real gRPC connections.

use serde_json::json;
use tonic::Code;

use protomock::engine::PendingOverride;

mod common;

#[tokio::test]
async fn unconfigured_method_is_unimplemented() {
    let server = common::start_emulator().await;
    let method = common::method_descriptor(&server.engine, "pkg.Greeter", "SayHello");

    let channel = common::connect(server.addr).await;
    let err = common::call_unary(channel, &method, json!({"name": "Bob"}))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::Unimplemented);

    server.shutdown.trigger();
    server.server_task.await.unwrap();
}

#[tokio::test]
async fn default_response_ignores_request_content() {
    let server = common::start_emulator().await;
    server
        .engine
        .upsert_response("pkg.Greeter", "SayHello", None, json!({"message": "hi"}))
        .unwrap();
    let method = common::method_descriptor(&server.engine, "pkg.Greeter", "SayHello");
    let channel = common::connect(server.addr).await;

    for name in ["Alice", "Bob", ""] {
        let reply = common::call_unary(channel.clone(), &method, json!({"name": name}))
            .await
            .unwrap();
        assert_eq!(reply, json!({"message": "hi"}));
    }

    server.shutdown.trigger();
    server.server_task.await.unwrap();
}

#[tokio::test]
async fn pattern_rule_beats_default_for_matching_request() {
    let server = common::start_emulator().await;
    server
        .engine
        .upsert_response("pkg.Greeter", "SayHello", None, json!({"message": "hi"}))
        .unwrap();
    server
        .engine
        .upsert_response(
            "pkg.Greeter",
            "SayHello",
            Some(&json!({"name": "Alice"})),
            json!({"message": "hi Alice"}),
        )
        .unwrap();
    let method = common::method_descriptor(&server.engine, "pkg.Greeter", "SayHello");
    let channel = common::connect(server.addr).await;

    let reply = common::call_unary(channel.clone(), &method, json!({"name": "Alice"}))
        .await
        .unwrap();
    assert_eq!(reply, json!({"message": "hi Alice"}));

    let reply = common::call_unary(channel, &method, json!({"name": "Bob"}))
        .await
        .unwrap();
    assert_eq!(reply, json!({"message": "hi"}));

    server.shutdown.trigger();
    server.server_task.await.unwrap();
}

#[tokio::test]
async fn override_is_served_exactly_once() {
    let server = common::start_emulator().await;
    server
        .engine
        .upsert_response("pkg.Greeter", "SayHello", None, json!({"message": "hi"}))
        .unwrap();
    server.engine.set_override(PendingOverride {
        service: "pkg.Greeter".into(),
        method: "SayHello".into(),
        payload: json!({"message": "OVERRIDDEN"}),
    });
    let method = common::method_descriptor(&server.engine, "pkg.Greeter", "SayHello");
    let channel = common::connect(server.addr).await;

    let reply = common::call_unary(channel.clone(), &method, json!({"name": "x"}))
        .await
        .unwrap();
    assert_eq!(reply, json!({"message": "OVERRIDDEN"}));

    let reply = common::call_unary(channel, &method, json!({"name": "x"}))
        .await
        .unwrap();
    assert_eq!(reply, json!({"message": "hi"}));

    server.shutdown.trigger();
    server.server_task.await.unwrap();
}

#[tokio::test]
async fn upsert_takes_effect_without_rebinding_connections() {
    let server = common::start_emulator().await;
    server
        .engine
        .upsert_response("pkg.Greeter", "SayHello", None, json!({"message": "v1"}))
        .unwrap();
    let method = common::method_descriptor(&server.engine, "pkg.Greeter", "SayHello");
    let channel = common::connect(server.addr).await;

    let reply = common::call_unary(channel.clone(), &method, json!({}))
        .await
        .unwrap();
    assert_eq!(reply, json!({"message": "v1"}));

    // Mutate while the client connection stays open.
    server
        .engine
        .upsert_response("pkg.Greeter", "SayHello", None, json!({"message": "v2"}))
        .unwrap();
    let reply = common::call_unary(channel, &method, json!({}))
        .await
        .unwrap();
    assert_eq!(reply, json!({"message": "v2"}));

    server.shutdown.trigger();
    server.server_task.await.unwrap();
}

#[tokio::test]
async fn graceful_shutdown_stops_the_server() {
    let server = common::start_emulator().await;
    server.shutdown.trigger();
    // Drain completes even with no in-flight calls.
    tokio::time::timeout(std::time::Duration::from_secs(5), server.server_task)
        .await
        .expect("server did not stop after shutdown")
        .unwrap();
}
