use lectern_rs_tools::{ToolError, ToolOutputPolicy, builtin_tool_registry};
use lectern_rs_test_utils::{base_tool_context, temp_engine, temp_engine_with};
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn registry_exposes_every_engine_operation() {
    let registry = builtin_tool_registry();
    assert_eq!(
        registry.list(),
        vec![
            "add_document_chunk",
            "add_memory",
            "dismiss_insight",
            "generate_insights",
            "get_document_chunks",
            "get_memory_stats",
            "index_document",
            "list_insights",
            "search_documents",
            "search_memories",
        ]
    );
}

#[tokio::test]
async fn unknown_tool_is_reported() {
    let (_temp, engine) = temp_engine();
    let ctx = base_tool_context(engine);
    let err = builtin_tool_registry()
        .dispatch(&ctx, "delete_everything", json!({}))
        .await
        .expect_err("unknown");
    assert!(matches!(err, ToolError::ToolNotFound(name) if name == "delete_everything"));
}

#[tokio::test]
async fn memory_round_trip_through_dispatch() {
    let (_temp, engine) = temp_engine();
    let mut ctx = base_tool_context(engine);
    ctx.output_policy = Some(ToolOutputPolicy::default());
    let registry = builtin_tool_registry();

    let added = registry
        .dispatch(
            &ctx,
            "add_memory",
            json!({ "content": "prefers tabs over spaces", "type": "preference", "tags": ["style"] }),
        )
        .await
        .expect("add");
    assert!(added["memory"].get("vector").is_none());

    let stats = registry
        .dispatch(&ctx, "get_memory_stats", json!({}))
        .await
        .expect("stats");
    assert_eq!(stats["memories"], 1);

    let found = registry
        .dispatch(
            &ctx,
            "search_memories",
            json!({ "query": "prefers tabs over spaces", "limit": 5 }),
        )
        .await
        .expect("search");
    let memories = found["memories"].as_array().expect("array");
    assert_eq!(memories.len(), 1);
    assert_eq!(memories[0]["id"], added["memory"]["id"]);
}

#[tokio::test]
async fn insights_can_be_generated_listed_and_dismissed() {
    let (_temp, engine) = temp_engine_with(|options| {
        options.insights.memory_volume_threshold = 1;
    });
    let ctx = base_tool_context(engine);
    let registry = builtin_tool_registry();
    for content in ["first note", "second note"] {
        registry
            .dispatch(&ctx, "add_memory", json!({ "content": content, "type": "fact" }))
            .await
            .expect("add");
    }

    let generated = registry
        .dispatch(&ctx, "generate_insights", json!({}))
        .await
        .expect("generate");
    let id = generated["insights"][0]["id"].as_str().expect("id").to_string();

    let dismissed = registry
        .dispatch(&ctx, "dismiss_insight", json!({ "insightId": id }))
        .await
        .expect("dismiss");
    assert_eq!(dismissed["dismissed"], true);

    let listed = registry
        .dispatch(&ctx, "list_insights", json!(null))
        .await
        .expect("list");
    assert_eq!(listed["insights"], json!([]));

    let unknown = registry
        .dispatch(&ctx, "dismiss_insight", json!({ "id": "missing" }))
        .await
        .expect("dismiss unknown");
    assert_eq!(unknown["dismissed"], false);
}

#[tokio::test]
async fn document_tools_accept_camel_case_arguments() {
    let (_temp, engine) = temp_engine();
    let ctx = base_tool_context(engine);
    let registry = builtin_tool_registry();
    for (chunk_id, position, file_type) in [("b", 1, "md"), ("a", 0, "md"), ("c", 2, "pdf")] {
        registry
            .dispatch(
                &ctx,
                "add_document_chunk",
                json!({
                    "documentId": "guide",
                    "chunkId": chunk_id,
                    "content": format!("guide part {chunk_id}"),
                    "position": position,
                    "fileType": file_type,
                }),
            )
            .await
            .expect("add chunk");
    }

    let chunks = registry
        .dispatch(&ctx, "get_document_chunks", json!({ "documentId": "guide" }))
        .await
        .expect("chunks");
    let positions: Vec<u64> = chunks["chunks"]
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|chunk| chunk["position"].as_u64())
        .collect();
    assert_eq!(positions, vec![0, 1, 2]);

    let found = registry
        .dispatch(
            &ctx,
            "search_documents",
            json!({ "query": "guide part", "fileTypes": ["pdf"], "maxResults": 5 }),
        )
        .await
        .expect("search");
    let documents = found["documents"].as_array().expect("array");
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0]["id"], "guide:c");
}

#[tokio::test]
async fn index_document_splits_into_chunks() {
    let (_temp, engine) = temp_engine_with(|options| {
        options.documents.chunk_size = 4;
        options.documents.chunk_overlap = 1;
    });
    let ctx = base_tool_context(engine.clone());
    let output = builtin_tool_registry()
        .dispatch(
            &ctx,
            "index_document",
            json!({ "documentId": "notes", "content": "one two three four five six seven" }),
        )
        .await
        .expect("index");
    assert_eq!(output["chunks"], 2);
    assert_eq!(engine.documents().get_document_chunks("notes").await.len(), 2);
}

#[tokio::test]
async fn missing_required_argument_is_invalid() {
    let (_temp, engine) = temp_engine();
    let ctx = base_tool_context(engine);
    let err = builtin_tool_registry()
        .dispatch(&ctx, "search_memories", json!({}))
        .await
        .expect_err("missing query");
    assert!(matches!(err, ToolError::InvalidArguments(_)));
}
