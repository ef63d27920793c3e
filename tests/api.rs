//! End-to-end tests for the task CRUD surface.

use std::net::SocketAddr;

use serde_json::Value;

mod common;

async fn add_task(client: &reqwest::Client, addr: SocketAddr, description: &str) {
    let token = common::fetch_csrf_token(client, addr).await;
    let res = client
        .post(format!("http://{}/add_task", addr))
        .form(&[("description", description), ("csrf_token", token.as_str())])
        .send()
        .await
        .expect("POST /add_task");
    assert!(res.status().is_success(), "add should land on the page");
}

async fn get_tasks(client: &reqwest::Client, addr: SocketAddr, filter: Option<&str>) -> Value {
    let url = match filter {
        Some(f) => format!("http://{}/get_tasks?filter={}", addr, f),
        None => format!("http://{}/get_tasks", addr),
    };
    client
        .get(url)
        .send()
        .await
        .expect("GET /get_tasks")
        .json()
        .await
        .expect("task listing json")
}

#[tokio::test]
async fn add_then_list_roundtrip() {
    let (addr, shutdown) = common::spawn_server(common::test_config()).await;
    let client = common::client();

    add_task(&client, addr, "Buy milk").await;

    let body = get_tasks(&client, addr, None).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["total"], 1);
    assert_eq!(body["tasks"][0]["id"], 1);
    assert_eq!(body["tasks"][0]["description"], "Buy milk");
    assert_eq!(body["tasks"][0]["completed"], false);

    shutdown.trigger();
}

#[tokio::test]
async fn script_description_is_rejected() {
    let (addr, shutdown) = common::spawn_server(common::test_config()).await;
    let client = common::client();

    add_task(&client, addr, "<script>alert(1)</script>").await;

    let body = get_tasks(&client, addr, None).await;
    assert_eq!(body["total"], 0, "store must be unchanged");

    shutdown.trigger();
}

#[tokio::test]
async fn description_length_boundary() {
    let (addr, shutdown) = common::spawn_server(common::test_config()).await;
    let client = common::client();

    add_task(&client, addr, &"a".repeat(500)).await;
    add_task(&client, addr, &"b".repeat(501)).await;

    let body = get_tasks(&client, addr, None).await;
    assert_eq!(body["total"], 1, "only the 500-char description is stored");

    shutdown.trigger();
}

#[tokio::test]
async fn markup_is_escaped_before_storage() {
    let (addr, shutdown) = common::spawn_server(common::test_config()).await;
    let client = common::client();

    add_task(&client, addr, "milk & <b>cookies</b>").await;

    let body = get_tasks(&client, addr, None).await;
    assert_eq!(
        body["tasks"][0]["description"],
        "milk &amp; &lt;b&gt;cookies&lt;/b&gt;"
    );

    // The page embeds the escaped form verbatim.
    let page = client
        .get(format!("http://{}/", addr))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("milk &amp; &lt;b&gt;cookies&lt;/b&gt;"));

    shutdown.trigger();
}

#[tokio::test]
async fn toggle_flips_and_restores() {
    let (addr, shutdown) = common::spawn_server(common::test_config()).await;
    let client = common::client();

    add_task(&client, addr, "flip me").await;

    let token = common::fetch_csrf_token(&client, addr).await;
    let body: Value = client
        .post(format!("http://{}/toggle_task/1", addr))
        .form(&[("csrf_token", &token)])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["completed"], true);
    assert_eq!(body["message"], "Task marked as completed");

    let body: Value = client
        .post(format!("http://{}/toggle_task/1", addr))
        .form(&[("csrf_token", &token)])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["completed"], false);
    assert_eq!(body["message"], "Task marked as active");

    shutdown.trigger();
}

#[tokio::test]
async fn toggle_without_csrf_token_is_rejected() {
    let (addr, shutdown) = common::spawn_server(common::test_config()).await;
    let client = common::client();

    add_task(&client, addr, "needs a token").await;

    let empty: [(&str, &str); 0] = [];
    let res = client
        .post(format!("http://{}/toggle_task/1", addr))
        .form(&empty)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "CSRF token missing");

    // The task was not touched.
    let listing = get_tasks(&client, addr, None).await;
    assert_eq!(listing["tasks"][0]["completed"], false);

    shutdown.trigger();
}

#[tokio::test]
async fn unknown_task_id_is_not_found() {
    let (addr, shutdown) = common::spawn_server(common::test_config()).await;
    let client = common::client();

    let token = common::fetch_csrf_token(&client, addr).await;
    for path in ["toggle_task", "delete_task"] {
        let res = client
            .post(format!("http://{}/{}/999999", addr, path))
            .form(&[("csrf_token", &token)])
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 404);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"], "Task not found");
    }

    shutdown.trigger();
}

#[tokio::test]
async fn out_of_range_task_id_is_invalid() {
    let (addr, shutdown) = common::spawn_server(common::test_config()).await;
    let client = common::client();

    let token = common::fetch_csrf_token(&client, addr).await;
    for id in ["0", "-3", "1000000"] {
        let res = client
            .post(format!("http://{}/toggle_task/{}", addr, id))
            .form(&[("csrf_token", &token)])
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400, "id {} must be rejected", id);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"], "Invalid Task ID");
    }

    shutdown.trigger();
}

#[tokio::test]
async fn delete_removes_exactly_one_task() {
    let (addr, shutdown) = common::spawn_server(common::test_config()).await;
    let client = common::client();

    add_task(&client, addr, "first").await;
    add_task(&client, addr, "second").await;

    let token = common::fetch_csrf_token(&client, addr).await;
    let res = client
        .post(format!("http://{}/delete_task/1", addr))
        .form(&[("csrf_token", &token)])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Task deleted successfully");

    let listing = get_tasks(&client, addr, None).await;
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["tasks"][0]["description"], "second");

    shutdown.trigger();
}

#[tokio::test]
async fn ids_stay_sequential_across_deletions() {
    let (addr, shutdown) = common::spawn_server(common::test_config()).await;
    let client = common::client();

    for desc in ["a", "b", "c"] {
        add_task(&client, addr, desc).await;
    }

    let token = common::fetch_csrf_token(&client, addr).await;
    client
        .post(format!("http://{}/delete_task/2", addr))
        .form(&[("csrf_token", &token)])
        .send()
        .await
        .unwrap();

    add_task(&client, addr, "d").await;

    let listing = get_tasks(&client, addr, None).await;
    let ids: Vec<u64> = listing["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3, 4], "deleted ids are never reused");

    shutdown.trigger();
}

#[tokio::test]
async fn filters_partition_the_listing() {
    let (addr, shutdown) = common::spawn_server(common::test_config()).await;
    let client = common::client();

    for desc in ["one", "two", "three"] {
        add_task(&client, addr, desc).await;
    }
    let token = common::fetch_csrf_token(&client, addr).await;
    client
        .post(format!("http://{}/toggle_task/2", addr))
        .form(&[("csrf_token", &token)])
        .send()
        .await
        .unwrap();

    let all = get_tasks(&client, addr, Some("all")).await;
    let active = get_tasks(&client, addr, Some("active")).await;
    let completed = get_tasks(&client, addr, Some("completed")).await;

    let ids = |v: &Value| -> Vec<u64> {
        v["tasks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_u64().unwrap())
            .collect()
    };

    let mut merged = ids(&active);
    merged.extend(ids(&completed));
    merged.sort_unstable();
    assert_eq!(merged, ids(&all), "active ∪ completed must equal all");
    assert_eq!(active["total"], 2);
    assert_eq!(completed["total"], 1);

    shutdown.trigger();
}

#[tokio::test]
async fn unknown_filter_behaves_like_all() {
    let (addr, shutdown) = common::spawn_server(common::test_config()).await;
    let client = common::client();

    add_task(&client, addr, "anything").await;

    let all = get_tasks(&client, addr, Some("all")).await;
    let bogus = get_tasks(&client, addr, Some("bogus")).await;
    assert_eq!(all["total"], bogus["total"]);
    assert_eq!(all["tasks"], bogus["tasks"]);

    shutdown.trigger();
}
