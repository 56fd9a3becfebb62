//! Integration tests for the document lifecycle, `_find` queries, and
//! scoped batch sessions

use futon::{Document, Field, FutonError, Server, SortOrder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Serialize, Deserialize)]
struct Account {
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(rename = "_rev", alias = "rev", skip_serializing_if = "Option::is_none")]
    revision: Option<String>,
    name: String,
    age: u32,
}

impl Account {
    const AGE: Field<Account, u32> = Field::new("age");

    fn named(name: &str) -> Self {
        Self {
            id: None,
            revision: None,
            name: name.to_string(),
            age: 30,
        }
    }
}

impl Document for Account {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    fn set_revision(&mut self, revision: String) {
        self.revision = Some(revision);
    }

    fn validate(&self) -> futon::Result<()> {
        if self.name.is_empty() {
            return Err(FutonError::Validation("name must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Helper to bind a futon server handle to a mock server
fn connect(mock: &MockServer) -> Server {
    Server::connect(&mock.uri()).expect("mock uri is a valid base URL")
}

#[tokio::test]
async fn test_create_populates_identity_so_update_never_sees_invalid_state() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "a1", "ok": true, "rev": "1-abc"
        })))
        .mount(&mock)
        .await;
    Mock::given(method("PUT"))
        .and(path("/accounts/a1"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "a1", "ok": true, "rev": "2-def"
        })))
        .mount(&mock)
        .await;

    let server = connect(&mock);
    let db = server.database("accounts");

    let mut account = Account::named("alice");
    account.create(&db, false).await.unwrap();
    assert_eq!(account.id(), Some("a1"));
    assert_eq!(account.revision(), Some("1-abc"));

    account.update(&db, false).await.unwrap();
    assert_eq!(account.revision(), Some("2-def"));
}

#[tokio::test]
async fn test_update_without_identity_is_invalid_state() {
    let mock = MockServer::start().await;

    let server = connect(&mock);
    let db = server.database("accounts");

    let mut account = Account::named("alice");
    let err = account.update(&db, false).await.unwrap_err();
    assert!(matches!(err, FutonError::InvalidState(_)));

    assert!(mock.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failing_validate_hook_aborts_before_network() {
    let mock = MockServer::start().await;

    let server = connect(&mock);
    let db = server.database("accounts");

    let mut account = Account::named("");
    let err = account.create(&db, false).await.unwrap_err();
    assert!(matches!(err, FutonError::Validation(_)));

    assert!(mock.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_with_applies_mutation_before_sending() {
    let mock = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/accounts/a1"))
        .and(body_partial_json(json!({"age": 31})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "a1", "ok": true, "rev": "2-def"
        })))
        .expect(1)
        .mount(&mock)
        .await;

    let server = connect(&mock);
    let db = server.database("accounts");

    let mut account = Account::named("alice");
    account.set_id("a1".to_string());
    account.set_revision("1-abc".to_string());

    account
        .update_with(&db, false, |account| account.age += 1)
        .await
        .unwrap();
    assert_eq!(account.age, 31);
    assert_eq!(account.revision(), Some("2-def"));

    mock.verify().await;
}

#[tokio::test]
async fn test_find_sends_selection_and_returns_docs() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/accounts/_find"))
        .and(body_json(json!({
            "selector": {"age": {"$gt": 18, "$lt": 65}},
            "sort": [{"age": "asc"}],
            "limit": 10
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "docs": [
                {"_id": "a1", "_rev": "1-abc", "name": "alice", "age": 30},
                {"_id": "b2", "_rev": "4-xyz", "name": "bob", "age": 41}
            ],
            "bookmark": "g1AAAA"
        })))
        .mount(&mock)
        .await;

    let server = connect(&mock);
    let accounts: Vec<Account> = server
        .database("accounts")
        .find(|q| {
            q.gt(Account::AGE, 18u32)
                .lt(Account::AGE, 65u32)
                .sort(Account::AGE, SortOrder::Asc)
                .limit(10)
        })
        .await;

    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[0].name, "alice");
    assert_eq!(accounts[1].id(), Some("b2"));
}

#[tokio::test]
async fn test_find_returns_empty_when_transport_fails() {
    let server = Server::connect("http://127.0.0.1:1").unwrap();
    let accounts: Vec<Account> = server
        .database("accounts")
        .find(|q| q.gt(Account::AGE, 18u32))
        .await;
    assert!(accounts.is_empty());
}

#[tokio::test]
async fn test_find_returns_empty_on_error_status() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/accounts/_find"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "no_usable_index",
            "reason": "No index exists for this sort"
        })))
        .mount(&mock)
        .await;

    let server = connect(&mock);
    let accounts: Vec<Account> = server
        .database("accounts")
        .find(|q| q.sort(Account::AGE, SortOrder::Desc))
        .await;
    assert!(accounts.is_empty());
}

#[tokio::test]
async fn test_scoped_batch_writes_carry_batch_flag() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts"))
        .and(wiremock::matchers::query_param("batch", "ok"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "id": "a1", "ok": true, "rev": "1-abc"
        })))
        .expect(1)
        .mount(&mock)
        .await;
    Mock::given(method("POST"))
        .and(path("/accounts/_ensure_full_commit"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock)
        .await;

    let server = connect(&mock);
    let db = server.database("accounts");

    let account = db
        .scoped(true, |scope| async move {
            let mut account = Account::named("alice");
            scope.create(&mut account).await?;
            Ok::<_, FutonError>(account)
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.id(), Some("a1"));

    mock.verify().await;
}

#[tokio::test]
async fn test_scoped_batch_commits_exactly_once_even_when_an_operation_fails() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": "conflict",
            "reason": "document update conflict"
        })))
        .mount(&mock)
        .await;
    Mock::given(method("POST"))
        .and(path("/accounts/_ensure_full_commit"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock)
        .await;

    let server = connect(&mock);
    let db = server.database("accounts");

    let inner = db
        .scoped(true, |scope| async move {
            let mut account = Account::named("alice");
            scope.create(&mut account).await
        })
        .await
        .unwrap();
    assert!(inner.is_err());

    let commits = mock
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|request| request.url.path().ends_with("/_ensure_full_commit"))
        .count();
    assert_eq!(commits, 1);

    mock.verify().await;
}

#[tokio::test]
async fn test_scoped_without_batch_never_commits() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "a1", "ok": true, "rev": "1-abc"
        })))
        .mount(&mock)
        .await;
    Mock::given(method("POST"))
        .and(path("/accounts/_ensure_full_commit"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true})))
        .expect(0)
        .mount(&mock)
        .await;

    let server = connect(&mock);
    let db = server.database("accounts");

    db.scoped(false, |scope| async move {
        let mut account = Account::named("alice");
        scope.create(&mut account).await
    })
    .await
    .unwrap()
    .unwrap();

    mock.verify().await;
}
