//! API integration tests

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use chrono::{Duration, NaiveDate, Utc};
use serde_json::json;
use uuid::Uuid;

use locallibrary_server::models::{user::CAN_MARK_RETURNED, LoanStatus};

use crate::support::{app, send, send_request, token, MemorySessionStore, MemoryStore};

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn setup() -> (Arc<MemoryStore>, Arc<MemorySessionStore>, axum::Router) {
    let store = Arc::new(MemoryStore::new());
    let sessions = Arc::new(MemorySessionStore::default());
    let router = app(store.clone(), sessions.clone());
    (store, sessions, router)
}

#[tokio::test]
async fn test_health_check() {
    let (_, _, app) = setup();

    let response = send(&app, Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");

    let response = send(&app, Method::GET, "/api/v1/ready", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ready");
}

// =============================================================================
// Home page
// =============================================================================

#[tokio::test]
async fn test_home_counts_visits_per_session() {
    let (store, sessions, app) = setup();
    let author = store.add_author("Ursula", "Le Guin");
    let book = store.add_book("The Lathe of Heaven", author, &[]);
    store.add_instance(book, LoanStatus::Available, None, None);
    store.add_instance(book, LoanStatus::Maintenance, None, None);

    let first = send(&app, Method::GET, "/", None, None).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["num_visits"], 0);
    assert_eq!(first.body["num_books"], 1);
    assert_eq!(first.body["num_instances"], 2);
    assert_eq!(first.body["num_instances_available"], 1);
    assert_eq!(first.body["num_authors"], 1);
    assert_eq!(first.body["num_genres"], 0);

    let cookie = first.cookie().expect("session cookie");
    assert!(cookie.starts_with("sessionid="));

    for expected in 1..=3 {
        let request = Request::builder()
            .uri("/")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap();
        let response = send_request(&app, request).await;
        assert_eq!(response.body["num_visits"], expected);
    }

    let session_id = cookie.trim_start_matches("sessionid=");
    assert_eq!(sessions.get(session_id).unwrap().num_visits, 4);
}

#[tokio::test]
async fn test_home_unknown_session_starts_over() {
    let (_, _, app) = setup();

    let request = Request::builder()
        .uri("/")
        .header(header::COOKIE, "sessionid=expired")
        .body(Body::empty())
        .unwrap();
    let response = send_request(&app, request).await;
    assert_eq!(response.body["num_visits"], 0);
    assert_ne!(response.cookie().as_deref(), Some("sessionid=expired"));
}

// =============================================================================
// Books
// =============================================================================

#[tokio::test]
async fn test_book_detail_present_and_absent() {
    let (store, _, app) = setup();
    let author = store.add_author("Frank", "Herbert");
    let genre = store.add_genre("Science Fiction");
    let book = store.add_book("Dune", author, &[genre]);
    store.add_instance(book, LoanStatus::Available, None, None);

    let response = send(&app, Method::GET, &format!("/api/v1/books/{}", book), None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["title"], "Dune");
    assert_eq!(response.body["author"]["last_name"], "Herbert");
    assert_eq!(response.body["genres"][0]["name"], "Science Fiction");
    assert_eq!(response.body["instances"].as_array().unwrap().len(), 1);
    assert_eq!(store.lookups(), 1);

    let response = send(&app, Method::GET, "/api/v1/books/9999", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NoSuchRecord");
    assert_eq!(store.lookups(), 2);
}

#[tokio::test]
async fn test_book_listing_is_capped_with_fixed_page_size() {
    let (store, _, app) = setup();
    let author = store.add_author("Terry", "Pratchett");
    for i in 0..10 {
        store.add_book(&format!("Discworld {:02}", i), author, &[]);
    }

    let first = send(&app, Method::GET, "/api/v1/books", None, None).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["total"], 8);
    assert_eq!(first.body["num_pages"], 3);
    assert_eq!(first.body["items"].as_array().unwrap().len(), 3);
    assert_eq!(first.body["items"][0]["title"], "Discworld 00");
    assert_eq!(first.body["items"][0]["author_name"], "Pratchett, Terry");
    assert_eq!(first.body["has_next"], true);

    let second = send(&app, Method::GET, "/api/v1/books?page=2", None, None).await;
    assert_eq!(second.body["items"].as_array().unwrap().len(), 3);
    assert_eq!(second.body["items"][0]["title"], "Discworld 03");

    let last = send(&app, Method::GET, "/api/v1/books?page=3", None, None).await;
    assert_eq!(last.body["items"].as_array().unwrap().len(), 2);
    assert_eq!(last.body["items"][1]["title"], "Discworld 07");
    assert_eq!(last.body["has_next"], false);

    let beyond = send(&app, Method::GET, "/api/v1/books?page=4", None, None).await;
    assert_eq!(beyond.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_book_listing_filters_by_title() {
    let (store, _, app) = setup();
    let author = store.add_author("Leo", "Tolstoy");
    store.add_book("War and Peace", author, &[]);
    store.add_book("Anna Karenina", author, &[]);

    let response = send(&app, Method::GET, "/api/v1/books?title=WAR", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 1);
    assert_eq!(response.body["items"][0]["title"], "War and Peace");
}

#[tokio::test]
async fn test_book_title_filter_keeps_surrounding_spaces() {
    let (store, _, app) = setup();
    let author = store.add_author("H. G.", "Wells");
    store.add_book("The War of the Worlds", author, &[]);
    store.add_book("Forward", author, &[]);

    let response = send(&app, Method::GET, "/api/v1/books?title=%20war", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 1);
    assert_eq!(response.body["items"][0]["title"], "The War of the Worlds");
}

#[tokio::test]
async fn test_incomplete_author_form_is_bad_request() {
    let (store, _, app) = setup();
    let staff = token(1, true, &[]);

    let response = send(
        &app,
        Method::POST,
        "/api/v1/authors",
        Some(staff.as_str()),
        Some(json!({ "first_name": "X" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "BadValue");
    assert!(!store.has_author(1));
}

#[tokio::test]
async fn test_create_book_checks_references() {
    let (store, _, app) = setup();
    let author = store.add_author("Iain", "Banks");
    let genre = store.add_genre("Science Fiction");
    let staff = token(1, true, &[]);

    let response = send(
        &app,
        Method::POST,
        "/api/v1/books",
        Some(staff.as_str()),
        Some(json!({ "title": "Excession", "author_id": author, "genre_ids": [genre, 999] })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "InvalidForm");
    assert!(response.body["fields"]["genre_ids"].is_array());

    let response = send(
        &app,
        Method::POST,
        "/api/v1/books",
        Some(staff.as_str()),
        Some(json!({ "title": "Excession", "author_id": author, "genre_ids": [genre] })),
    )
    .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    let id = response.body["id"].as_i64().unwrap();
    assert_eq!(response.location(), Some(format!("/api/v1/books/{}", id).as_str()));
}

#[tokio::test]
async fn test_book_writes_require_staff() {
    let (store, _, app) = setup();
    let author = store.add_author("Iain", "Banks");
    let book = store.add_book("Excession", author, &[]);
    let form = json!({ "title": "Excession", "author_id": author });

    let response = send(&app, Method::POST, "/api/v1/books", None, Some(form.clone())).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let reader = token(2, false, &[]);
    let uri = format!("/api/v1/books/{}", book);
    let response = send(&app, Method::PUT, &uri, Some(reader.as_str()), Some(form)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = send(&app, Method::DELETE, &uri, Some(reader.as_str()), None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_book_with_copies_conflicts() {
    let (store, _, app) = setup();
    let author = store.add_author("Iain", "Banks");
    let kept = store.add_book("Excession", author, &[]);
    let removed = store.add_book("Feersum Endjinn", author, &[]);
    store.add_instance(kept, LoanStatus::Available, None, None);
    let staff = token(1, true, &[]);

    let response = send(&app, Method::DELETE, &format!("/api/v1/books/{}", kept), Some(staff.as_str()), None).await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = send(&app, Method::DELETE, &format!("/api/v1/books/{}", removed), Some(staff.as_str()), None).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/api/v1/books"));
}

// =============================================================================
// Authors
// =============================================================================

#[tokio::test]
async fn test_author_listing_is_ordered_by_name() {
    let (store, _, app) = setup();
    store.add_author("Neil", "Gaiman");
    store.add_author("Arthur", "Clarke");
    store.add_author("Anne", "McCaffrey");
    store.add_author("Kurt", "Vonnegut");

    let response = send(&app, Method::GET, "/api/v1/authors", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 4);
    let names: Vec<&str> = response.body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["last_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Clarke", "Gaiman", "McCaffrey"]);
}

#[tokio::test]
async fn test_author_form_defaults() {
    let (_, _, app) = setup();

    let response = send(&app, Method::GET, "/api/v1/authors/new", Some(token(1, true, &[]).as_str()), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["date_of_death"], "2016-12-10");

    let response = send(&app, Method::GET, "/api/v1/authors/new", Some(token(2, false, &[]).as_str()), None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_and_update_author() {
    let (store, _, app) = setup();
    let staff = token(1, true, &[]);

    let response = send(
        &app,
        Method::POST,
        "/api/v1/authors",
        Some(staff.as_str()),
        Some(json!({
            "first_name": "Octavia",
            "last_name": "Butler",
            "date_of_birth": "1947-06-22",
            "date_of_death": "1940-01-01"
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["fields"]["date_of_death"].is_array());

    let response = send(
        &app,
        Method::POST,
        "/api/v1/authors",
        Some(staff.as_str()),
        Some(json!({
            "first_name": "Octavia",
            "last_name": "Butler",
            "date_of_birth": "1947-06-22"
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    let id = response.body["id"].as_i64().unwrap() as i32;
    assert!(store.has_author(id));

    let response = send(
        &app,
        Method::PUT,
        &format!("/api/v1/authors/{}", id),
        Some(staff.as_str()),
        Some(json!({
            "first_name": "Octavia E.",
            "last_name": "Butler",
            "date_of_birth": "1947-06-22",
            "date_of_death": "2006-02-24"
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some(format!("/api/v1/authors/{}", id).as_str()));

    let detail = send(&app, Method::GET, &format!("/api/v1/authors/{}", id), None, None).await;
    assert_eq!(detail.body["first_name"], "Octavia E.");
    assert_eq!(detail.body["date_of_death"], "2006-02-24");
}

#[tokio::test]
async fn test_delete_referenced_author_conflicts() {
    let (store, _, app) = setup();
    let referenced = store.add_author("Isaac", "Asimov");
    let unreferenced = store.add_author("Philip", "Dick");
    store.add_book("Foundation", referenced, &[]);
    let staff = token(1, true, &[]);

    let response = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/authors/{}", referenced),
        Some(staff.as_str()),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "StillReferenced");
    assert!(store.has_author(referenced));

    let response = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/authors/{}", unreferenced),
        Some(staff.as_str()),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/api/v1/authors"));
    assert!(!store.has_author(unreferenced));

    let response = send(
        &app,
        Method::GET,
        &format!("/api/v1/authors/{}", unreferenced),
        None,
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_genres_are_listed_by_name() {
    let (store, _, app) = setup();
    store.add_genre("Poetry");
    store.add_genre("Fantasy");

    let response = send(&app, Method::GET, "/api/v1/genres", None, None).await;
    assert_eq!(response.body[0]["name"], "Fantasy");
    assert_eq!(response.body[1]["name"], "Poetry");
}

// =============================================================================
// Loans
// =============================================================================

#[tokio::test]
async fn test_my_loans_lists_own_copies_earliest_due_first() {
    let (store, _, app) = setup();
    let author = store.add_author("Jules", "Verne");
    let book = store.add_book("Around the World in Eighty Days", author, &[]);
    let later = store.add_instance(book, LoanStatus::OnLoan, Some(today() + Duration::days(10)), Some(7));
    let sooner = store.add_instance(book, LoanStatus::OnLoan, Some(today() + Duration::days(2)), Some(7));
    store.add_instance(book, LoanStatus::OnLoan, Some(today() + Duration::days(1)), Some(8));
    store.add_instance(book, LoanStatus::Reserved, Some(today()), Some(7));

    let response = send(&app, Method::GET, "/api/v1/mybooks", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = send(&app, Method::GET, "/api/v1/mybooks", Some(token(7, false, &[]).as_str()), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 2);
    assert_eq!(response.body["items"][0]["id"], sooner.to_string());
    assert_eq!(response.body["items"][1]["id"], later.to_string());
    assert_eq!(response.body["items"][0]["status"], "on_loan");
}

#[tokio::test]
async fn test_all_loans_require_permission() {
    let (store, _, app) = setup();
    let author = store.add_author("Jules", "Verne");
    let book = store.add_book("Journey to the Center of the Earth", author, &[]);
    store.add_instance(book, LoanStatus::OnLoan, Some(today()), Some(7));
    store.add_instance(book, LoanStatus::OnLoan, Some(today()), Some(8));
    store.add_instance(book, LoanStatus::Available, None, None);

    let response = send(&app, Method::GET, "/api/v1/borrowed", Some(token(7, false, &[]).as_str()), None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "PermissionDenied");

    let librarian = token(1, false, &[CAN_MARK_RETURNED]);
    let response = send(&app, Method::GET, "/api/v1/borrowed", Some(librarian.as_str()), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 2);
}

#[tokio::test]
async fn test_renewal_form_proposes_three_weeks() {
    let (store, _, app) = setup();
    let author = store.add_author("Jules", "Verne");
    let book = store.add_book("The Mysterious Island", author, &[]);
    let copy = store.add_instance(book, LoanStatus::OnLoan, Some(today()), Some(7));
    let librarian = token(1, false, &[CAN_MARK_RETURNED]);

    let uri = format!("/api/v1/bookinstances/{}/renew", copy);
    let response = send(&app, Method::GET, &uri, Some(librarian.as_str()), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["due_back"], (today() + Duration::weeks(3)).to_string());
    assert_eq!(response.body["instance"]["id"], copy.to_string());

    let uri = format!("/api/v1/bookinstances/{}/renew", Uuid::new_v4());
    let response = send(&app, Method::GET, &uri, Some(librarian.as_str()), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_renewal_in_past_is_rejected_without_change() {
    let (store, _, app) = setup();
    let author = store.add_author("Jules", "Verne");
    let book = store.add_book("Twenty Thousand Leagues Under the Seas", author, &[]);
    let due = today() + Duration::days(3);
    let copy = store.add_instance(book, LoanStatus::OnLoan, Some(due), Some(7));
    let librarian = token(1, false, &[CAN_MARK_RETURNED]);

    let response = send(
        &app,
        Method::POST,
        &format!("/api/v1/bookinstances/{}/renew", copy),
        Some(librarian.as_str()),
        Some(json!({ "due_back": (today() - Duration::days(1)).to_string() })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["fields"]["due_back"][0]["code"], "date_in_past");
    assert_eq!(store.instance(copy).due_back, Some(due));
    assert_eq!(store.due_back_writes(), 0);
}

#[tokio::test]
async fn test_valid_renewal_updates_one_copy_and_redirects() {
    let (store, _, app) = setup();
    let author = store.add_author("Jules", "Verne");
    let book = store.add_book("From the Earth to the Moon", author, &[]);
    let due = today() + Duration::days(3);
    let renewed = store.add_instance(book, LoanStatus::OnLoan, Some(due), Some(7));
    let other = store.add_instance(book, LoanStatus::OnLoan, Some(due), Some(8));
    let librarian = token(1, false, &[CAN_MARK_RETURNED]);
    let new_due = today() + Duration::weeks(2);

    let response = send(
        &app,
        Method::POST,
        &format!("/api/v1/bookinstances/{}/renew", renewed),
        Some(librarian.as_str()),
        Some(json!({ "due_back": new_due.to_string() })),
    )
    .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/api/v1/borrowed"));
    assert_eq!(store.instance(renewed).due_back, Some(new_due));
    assert_eq!(store.instance(other).due_back, Some(due));
    assert_eq!(store.due_back_writes(), 1);
}

#[tokio::test]
async fn test_renewal_too_far_ahead_is_rejected() {
    let (store, _, app) = setup();
    let author = store.add_author("Jules", "Verne");
    let book = store.add_book("Michael Strogoff", author, &[]);
    let copy = store.add_instance(book, LoanStatus::OnLoan, Some(today()), Some(7));

    let response = send(
        &app,
        Method::POST,
        &format!("/api/v1/bookinstances/{}/renew", copy),
        Some(token(1, false, &[CAN_MARK_RETURNED]).as_str()),
        Some(json!({ "due_back": (today() + Duration::weeks(5)).to_string() })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["fields"]["due_back"][0]["code"], "date_too_far");
    assert_eq!(store.due_back_writes(), 0);
}

#[tokio::test]
async fn test_renewal_requires_permission() {
    let (store, _, app) = setup();
    let author = store.add_author("Jules", "Verne");
    let book = store.add_book("Five Weeks in a Balloon", author, &[]);
    let copy = store.add_instance(book, LoanStatus::OnLoan, Some(today()), Some(7));

    let response = send(
        &app,
        Method::POST,
        &format!("/api/v1/bookinstances/{}/renew", copy),
        Some(token(7, true, &[]).as_str()),
        Some(json!({ "due_back": today().to_string() })),
    )
    .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(store.due_back_writes(), 0);
}

#[tokio::test]
async fn test_malformed_due_back_is_bad_request() {
    let (store, _, app) = setup();
    let author = store.add_author("Jules", "Verne");
    let book = store.add_book("The Mysterious Island", author, &[]);
    let copy = store.add_instance(book, LoanStatus::OnLoan, Some(today()), Some(7));

    let response = send(
        &app,
        Method::POST,
        &format!("/api/v1/bookinstances/{}/renew", copy),
        Some(token(1, false, &[CAN_MARK_RETURNED]).as_str()),
        Some(json!({ "due_back": "not-a-date" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "BadValue");
    assert!(response.body["message"].as_str().is_some());
    assert_eq!(store.instance(copy).due_back, Some(today()));
    assert_eq!(store.due_back_writes(), 0);
}

#[tokio::test]
async fn test_permission_is_checked_before_the_body() {
    let (store, _, app) = setup();
    let author = store.add_author("Jules", "Verne");
    let book = store.add_book("Robur the Conqueror", author, &[]);
    let copy = store.add_instance(book, LoanStatus::OnLoan, Some(today()), Some(7));

    let response = send(
        &app,
        Method::POST,
        &format!("/api/v1/bookinstances/{}/renew", copy),
        Some(token(7, false, &[]).as_str()),
        Some(json!({ "due_back": "not-a-date" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = send(
        &app,
        Method::POST,
        "/api/v1/authors",
        Some(token(7, false, &[]).as_str()),
        Some(json!({ "first_name": "X" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(store.due_back_writes(), 0);
}

#[tokio::test]
async fn test_renewal_of_available_copy_is_rejected() {
    let (store, _, app) = setup();
    let author = store.add_author("Jules", "Verne");
    let book = store.add_book("Around the World in Eighty Days", author, &[]);
    let copy = store.add_instance(book, LoanStatus::Available, None, None);

    let response = send(
        &app,
        Method::POST,
        &format!("/api/v1/bookinstances/{}/renew", copy),
        Some(token(1, false, &[CAN_MARK_RETURNED]).as_str()),
        Some(json!({ "due_back": today().to_string() })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["fields"]["due_back"][0]["code"], "not_on_loan");
    assert_eq!(store.instance(copy).due_back, None);
    assert_eq!(store.due_back_writes(), 0);
}
