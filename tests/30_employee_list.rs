mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

use common::TestServer;

fn names(body: &Value) -> Vec<String> {
    body["employees"]
        .as_array()
        .map(|list| list.iter().filter_map(|e| e["name"].as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn pages_through_twenty_five_records() -> Result<()> {
    let (server, token) = TestServer::spawn_authenticated().await?;
    for i in 0..25 {
        server
            .create_employee(&token, &format!("Employee {:02}", i), &format!("e{}@example.com", i))
            .await?;
    }

    let (status, body) = server.get_json(&token, "/employees?limit=10&page=3").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["employees"].as_array().map(Vec::len), Some(5));
    assert_eq!(body["totalEmployees"], 25);
    assert_eq!(body["totalActiveEmployees"], 25);
    assert_eq!(body["page"], 3);
    assert_eq!(body["limit"], 10);

    // default order is createDate ascending
    assert_eq!(names(&body).first().map(String::as_str), Some("Employee 20"));

    let (_, beyond) = server.get_json(&token, "/employees?limit=10&page=9").await?;
    assert_eq!(beyond["employees"].as_array().map(Vec::len), Some(0));
    assert_eq!(beyond["totalEmployees"], 25);
    Ok(())
}

#[tokio::test]
async fn out_of_range_paging_is_clamped() -> Result<()> {
    let (server, token) = TestServer::spawn_authenticated().await?;
    for i in 0..3 {
        server.create_employee(&token, &format!("C{}", i), &format!("c{}@example.com", i)).await?;
    }

    for query in ["page=0", "page=-2", "page=abc"] {
        let (status, body) = server.get_json(&token, &format!("/employees?{}", query)).await?;
        assert_eq!(status, StatusCode::OK, "{}", query);
        assert_eq!(body["page"], 1, "{}", query);
        assert_eq!(names(&body), vec!["C0", "C1", "C2"], "{}", query);
    }

    let (_, body) = server.get_json(&token, "/employees?limit=0").await?;
    assert_eq!(body["limit"], 10);
    let (_, body) = server.get_json(&token, "/employees?limit=-4").await?;
    assert_eq!(body["limit"], 10);
    let (_, body) = server.get_json(&token, "/employees?limit=100000").await?;
    assert_eq!(body["limit"], 50);
    Ok(())
}

#[tokio::test]
async fn search_matches_any_word_ignoring_case() -> Result<()> {
    let (server, token) = TestServer::spawn_authenticated().await?;
    server.create_employee(&token, "Smith John", "sj@example.com").await?;
    server.create_employee(&token, "John Doe", "jd@example.com").await?;
    server.create_employee(&token, "Jane Roe", "jr@example.com").await?;

    let (_, body) = server.get_json(&token, "/employees?search=john%20smith").await?;
    assert_eq!(names(&body), vec!["Smith John", "John Doe"]);
    assert_eq!(body["totalEmployees"], 2);

    let (_, body) = server.get_json(&token, "/employees?search=%20%20ROE%20").await?;
    assert_eq!(names(&body), vec!["Jane Roe"]);

    let (_, body) = server.get_json(&token, "/employees?search=100%25").await?;
    assert_eq!(body["totalEmployees"], 0);

    let (_, body) = server.get_json(&token, "/employees?search=%20").await?;
    assert_eq!(body["totalEmployees"], 3);
    Ok(())
}

#[tokio::test]
async fn sorts_by_requested_field_and_direction() -> Result<()> {
    let (server, token) = TestServer::spawn_authenticated().await?;
    for (name, email) in [("Bravo", "b@example.com"), ("Alpha", "a@example.com"), ("Charlie", "c@example.com")] {
        server.create_employee(&token, name, email).await?;
    }

    let (_, body) = server.get_json(&token, "/employees?sortField=name&sortOrder=asc").await?;
    assert_eq!(names(&body), vec!["Alpha", "Bravo", "Charlie"]);

    let (_, body) = server.get_json(&token, "/employees?sortField=name&sortOrder=DESC").await?;
    assert_eq!(names(&body), vec!["Charlie", "Bravo", "Alpha"]);

    let (_, body) = server.get_json(&token, "/employees?sortField=createDate&sortOrder=desc").await?;
    assert_eq!(names(&body), vec!["Charlie", "Alpha", "Bravo"]);

    // unknown sort fields fall back to creation order
    let (status, body) = server.get_json(&token, "/employees?sortField=salary").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Bravo", "Alpha", "Charlie"]);
    Ok(())
}

#[tokio::test]
async fn active_total_tracks_toggles() -> Result<()> {
    let (server, token) = TestServer::spawn_authenticated().await?;
    let first = server.create_employee(&token, "One", "one@example.com").await?;
    server.create_employee(&token, "Two", "two@example.com").await?;

    let id = first["_id"].as_str().unwrap_or_default();
    let (status, _) = server.toggle(&token, id).await?;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = server.get_json(&token, "/employees").await?;
    assert_eq!(body["totalEmployees"], 2);
    assert_eq!(body["totalActiveEmployees"], 1);
    Ok(())
}
