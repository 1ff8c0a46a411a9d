//! Templates evaluated against the seeded in-memory hosts.

use std::sync::Arc;

use ccmd_eval::{Engine, EngineConfig, EntryType, MessageContent, QueryPolicy};
use ccmd_host::{Event, MemoryPlatform, MemoryStore, Seed};
use ccmd_value::{Context, Value};
use pretty_assertions::assert_eq;

const SEED: &str = r#"{
    "members": [
        {"id": "42", "username": "nova", "permissions": ["ManageRoles"]},
        {"id": "9", "username": "orbit", "roles": ["vip"]}
    ],
    "entries": [{"key": "visits", "type": "number", "value": 2}],
    "tables": {
        "scores": [
            {"user": "42", "points": 10, "secret": "x"},
            {"user": "9", "points": 3, "secret": "y"}
        ]
    }
}"#;

struct Harness {
    engine: Engine,
    platform: Arc<MemoryPlatform>,
    store: Arc<MemoryStore>,
}

fn harness() -> Harness {
    let (platform, store) = Seed::from_json_str(SEED)
        .and_then(Seed::into_hosts)
        .unwrap_or_else(|err| panic!("seed: {err}"));
    let platform = Arc::new(platform);
    let store = Arc::new(store);
    let config = EngineConfig {
        query: QueryPolicy::default().with_table("scores", ["user", "points"]),
        ..EngineConfig::default()
    };
    let engine = Engine::builder()
        .platform(platform.clone())
        .store(store.clone())
        .config(config)
        .build();
    Harness {
        engine,
        platform,
        store,
    }
}

fn context() -> Context {
    Context::builder()
        .field("User", "ID", "42")
        .field("User", "Username", "nova")
        .field("Channel", "ID", "7")
        .build()
}

async fn run(h: &Harness, template: &str, args: &[&str]) -> String {
    let args: Vec<String> = args.iter().map(|a| (*a).to_string()).collect();
    h.engine
        .evaluate(template, &context(), &args)
        .await
        .unwrap_or_else(|err| format!("engine error: {err}"))
}

#[tokio::test]
async fn test_visit_counter() {
    let h = harness();
    let template = r#"{{ $n := add (dbGet "visits" "number") 1 }}{{ dbSet "visits" $n "number" }}visit #{{ $n }}"#;
    assert_eq!(run(&h, template, &[]).await, "visit #3");
    assert_eq!(run(&h, template, &[]).await, "visit #4");
    assert_eq!(
        h.store.entry("visits", EntryType::Number).map(|e| e.value),
        Some(Value::Int(4))
    );
}

#[tokio::test]
async fn test_give_role_when_permitted() {
    let h = harness();
    let template = r#"{{ if (hasPermission "ManageRoles") "granted" "denied" }}{{ addRole "vip" (index .Args 0) }}"#;
    assert_eq!(run(&h, template, &["42"]).await, "granted");
    assert_eq!(
        h.platform.member("42").map(|m| m.roles),
        Some(vec!["vip".to_string()])
    );
}

#[tokio::test]
async fn test_announcement_goes_to_current_channel() {
    let h = harness();
    let out = run(&h, r#"{{ sendMessage "" (printf "hi %s" .User.Username) }}done"#, &[]).await;
    assert_eq!(out, "done");
    assert_eq!(
        h.platform.events(),
        vec![Event::Message {
            id: "1".into(),
            channel: "7".into(),
            content: MessageContent::Text("hi nova".into()),
        }]
    );
}

#[tokio::test]
async fn test_leaderboard_query_is_projected() {
    let h = harness();
    let out = run(
        &h,
        r#"{{ $rows := dbQuery "scores" (dict) 10 }}{{ len $rows }} {{ index $rows 0 "points" }} [{{ index $rows 0 "secret" }}]"#,
        &[],
    )
    .await;
    assert_eq!(out, "2 10 []");
}

#[tokio::test]
async fn test_unknown_member_is_contained() {
    let h = harness();
    let out = run(&h, r#"a{{ removeRole "vip" "1234" }}b"#, &[]).await;
    assert_eq!(out, "a[removeRole: not found: member 1234]b");
    assert!(h.platform.events().is_empty());
}

#[tokio::test]
async fn test_member_lookup() {
    let h = harness();
    let out = run(&h, r#"{{ $m := getMember "9" }}{{ $m.Username }} {{ hasRole "vip" "9" }}"#, &[]).await;
    assert_eq!(out, "orbit true");
}
