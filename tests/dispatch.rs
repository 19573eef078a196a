//! End-to-end coverage of the Dispatch API against an in-memory fake
//! transport: query composition, insert retry, and batched fan-out, without
//! any real backend.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use corpus_search_client::{
    App, GetThreadItemsParams, InsertParams, Intent, Payload, SearchClient, SearchClientConfig,
    SearchOpts, SearchResponse, SortDirection, Transport, TransportError,
};
use serde_json::json;

fn init_tracing() {
    static ONCE: std::sync::Once = std::sync::Once::new();
    ONCE.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

#[derive(Default)]
struct FakeTransport {
    captured_payloads: Arc<Mutex<Vec<Payload>>>,
    insert_failures_before_success: Mutex<u32>,
    insert_attempts: Mutex<u32>,
}

#[async_trait]
impl Transport for FakeTransport {
    async fn search(&self, payload: Payload) -> Result<SearchResponse, TransportError> {
        self.captured_payloads.lock().unwrap().push(payload);
        Ok(SearchResponse {
            hits: vec![json!({"email": "a@example.com"}), json!({"email": "a@example.com"})],
            total_count: Some(2),
        })
    }

    async fn insert(&self, _doc: serde_json::Value, _params: InsertParams) -> Result<(), TransportError> {
        let mut attempts = self.insert_attempts.lock().unwrap();
        *attempts += 1;
        let mut remaining = self.insert_failures_before_success.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(TransportError::Throttled("429".into()));
        }
        Ok(())
    }

    async fn get_document(
        &self,
        _params: corpus_search_client::GetDocumentParams,
    ) -> Result<serde_json::Value, TransportError> {
        unimplemented!("not exercised by these tests")
    }

    async fn update_document(
        &self,
        _fields: serde_json::Value,
        _params: corpus_search_client::UpdateDocumentParams,
    ) -> Result<(), TransportError> {
        unimplemented!("not exercised by these tests")
    }

    async fn delete_document(
        &self,
        _params: corpus_search_client::DeleteDocumentParams,
    ) -> Result<(), TransportError> {
        unimplemented!("not exercised by these tests")
    }

    async fn get_documents_by_doc_ids(
        &self,
        _params: corpus_search_client::GetDocumentsByDocIdsParams,
    ) -> Result<Vec<serde_json::Value>, TransportError> {
        unimplemented!("not exercised by these tests")
    }

    async fn get_documents_by_thread_id(
        &self,
        _params: corpus_search_client::GetDocumentsByThreadIdParams,
    ) -> Result<Vec<serde_json::Value>, TransportError> {
        unimplemented!("not exercised by these tests")
    }

    async fn if_documents_exist(
        &self,
        _params: corpus_search_client::IfDocumentsExistParams,
    ) -> Result<Vec<bool>, TransportError> {
        unimplemented!("not exercised by these tests")
    }
}

fn client(transport: FakeTransport) -> SearchClient<FakeTransport> {
    init_tracing();
    let schemas = vec![
        "file".to_owned(),
        "mail".to_owned(),
        "mail_attachment".to_owned(),
        "event".to_owned(),
        "chat_message".to_owned(),
        "chat_user".to_owned(),
        "user".to_owned(),
    ];
    SearchClient::new(transport, SearchClientConfig::default(), schemas)
}

#[tokio::test]
async fn search_composes_a_union_of_every_app_and_forwards_the_payload() {
    let transport = FakeTransport::default();
    let c = client(transport);

    let (profile, response) = c
        .search("budget report", "user@example.com", None, None, &[], &SearchOpts::default())
        .await
        .expect("search should succeed against the fake transport");

    assert_eq!(profile.profile, "nativeRank");
    assert!(profile.yql.starts_with("select * from sources "));
    assert!(profile.yql.contains("owner contains 'user@example.com'"));
    assert_eq!(response.total_count, Some(2));
}

#[tokio::test]
async fn excluding_every_app_from_search_is_a_validation_error() {
    let transport = FakeTransport::default();
    let c = client(transport);

    let excluded = [
        App::GoogleDrive,
        App::Gmail,
        App::GoogleCalendar,
        App::GoogleWorkspace,
        App::Slack,
    ];
    let err = c
        .search("q", "u@x.com", None, None, &excluded, &SearchOpts::default())
        .await
        .unwrap_err();
    assert_eq!(err.error_type(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn group_search_requests_zero_hits_with_a_group_expression() {
    let transport = FakeTransport::default();
    let c = client(transport);

    let (profile, _response) = c
        .group_search("q", "u@x.com", &[], &SearchOpts::default())
        .await
        .unwrap();
    assert!(profile.yql.contains("limit 0"));
    assert!(profile.yql.contains("group(app)"));
}

#[tokio::test]
async fn autocomplete_deduplicates_hits_by_email() {
    let transport = FakeTransport::default();
    let c = client(transport);

    let (_profile, response) = c.autocomplete("ali", "u@x.com", 10).await.unwrap();
    // the fake transport always returns two hits with the same email
    assert_eq!(response.hits.len(), 1);
}

#[tokio::test]
async fn search_in_files_requires_at_least_one_file_id() {
    let transport = FakeTransport::default();
    let c = client(transport);

    let err = c
        .search_in_files("q", "u@x.com", &[], &SearchOpts::default())
        .await
        .unwrap_err();
    assert_eq!(err.error_type(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn search_collection_rag_rejects_a_blank_query() {
    let transport = FakeTransport::default();
    let c = client(transport);

    let err = c
        .search_collection_rag("   ", "u@x.com", 10, 0, "nativeRank", &Default::default())
        .await
        .unwrap_err();
    assert_eq!(err.error_type(), "VALIDATION_ERROR");
}

#[tokio::test(start_paused = true)]
async fn insert_retries_past_transient_throttling() {
    let transport = FakeTransport {
        insert_failures_before_success: Mutex::new(2),
        ..FakeTransport::default()
    };
    let c = client(transport);

    let result = c
        .insert("doc-1", "mail", json!({"subject": "hi"}))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn fetch_all_by_name_aggregates_concurrent_batches() {
    let transport = FakeTransport::default();
    let c = client(transport);

    let items: Vec<u64> = c
        .fetch_all_by_name(
            || async { Ok::<u64, TransportError>(900) },
            |offset, limit| async move {
                let end = (offset + limit).min(900);
                Ok((offset..end).collect::<Vec<u64>>())
            },
        )
        .await
        .unwrap();
    assert_eq!(items.len(), 900);
}

#[tokio::test]
async fn fetch_all_by_name_propagates_the_count_querys_failure() {
    let transport = FakeTransport::default();
    let c = client(transport);

    let result: Result<Vec<u64>, _> = c
        .fetch_all_by_name(
            || async { Err(TransportError::Network("count query down".into())) },
            |offset, _limit| async move { Ok(vec![offset]) },
        )
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn get_thread_items_combines_thread_id_intent_and_filter_query() {
    let transport = FakeTransport::default();
    let c = client(transport);

    let params = GetThreadItemsParams {
        principal: "u@x.com".to_owned(),
        app: App::Slack,
        thread_id: "T123".to_owned(),
        time_field: "updatedAt".to_owned(),
        direction: SortDirection::Desc,
        intent: Some(Intent {
            subject: vec!["invoice".into()],
            ..Intent::default()
        }),
        filter_query: Some("quarterly results".to_owned()),
        target_hits: None,
        limit: None,
        offset: None,
    };
    let (profile, _response) = c.get_thread_items(&params).await.unwrap();
    assert!(profile.yql.contains("threadId = 'T123'"));
    assert!(profile.yql.contains("subject contains 'invoice'"));
    assert!(profile.yql.contains("nearestNeighbor(text_embeddings"));
    assert!(profile.yql.contains("order by updatedAt desc"));
    assert_eq!(profile.profile, "unranked");
}

#[tokio::test]
async fn search_keys_its_branch_set_off_the_configured_schema_set() {
    // spec §8.2 scenario 1: three configured schemas (file, user, mail) yield
    // exactly three branches (default, workspace, gmail) rather than one
    // branch per known app.
    let transport = FakeTransport::default();
    let schemas = vec!["file".to_owned(), "user".to_owned(), "mail".to_owned()];
    let c = SearchClient::new(transport, SearchClientConfig::default(), schemas);

    let opts = SearchOpts {
        limit: Some(10),
        ..SearchOpts::default()
    };
    let (profile, _response) = c
        .search("alpha", "u@x.com", None, None, &[], &opts)
        .await
        .unwrap();

    // the `file` schema maps to the default hybrid profile, not Drive's.
    assert!(profile.yql.contains("nearestNeighbor(chunk_embeddings, alpha"));
    assert!(profile.yql.contains("owner contains 'u@x.com'")); // workspace ownership branch
    assert!(profile.yql.contains("owner contains '@email'")); // gmail's bound-principal branch
    assert!(!profile.yql.contains("startTime")); // calendar never ran
    assert!(!profile.yql.contains("channelId")); // slack never ran
}

#[tokio::test]
async fn search_payload_hits_tracks_the_resolved_limit_not_target_hits() {
    // spec §8.2 scenario 1 / §3.3: payload `hits` is the effective result
    // limit, not the nested-clause `targetHits` hint.
    let transport = FakeTransport::default();
    let captured = Arc::clone(&transport.captured_payloads);
    let c = client(transport);

    let opts = SearchOpts {
        target_hits: Some(999),
        limit: Some(10),
        ..SearchOpts::default()
    };
    let (profile, _response) = c
        .search("alpha", "u@x.com", None, None, &[], &opts)
        .await
        .unwrap();

    assert!(profile.yql.contains("targetHits: 999"));
    let payloads = captured.lock().unwrap();
    assert_eq!(payloads.last().unwrap().hits, Some(10));
}

#[tokio::test]
async fn search_forwards_is_intent_search_based_on_contributing_intent() {
    // spec §4.7: input.query(is_intent_search) is always bound, 1.0 only
    // when an intent filter actually contributes a clause.
    let transport = FakeTransport::default();
    let captured = Arc::clone(&transport.captured_payloads);
    let c = client(transport);

    let (_profile, _response) = c
        .search("alpha", "u@x.com", None, None, &[], &SearchOpts::default())
        .await
        .unwrap();
    assert_eq!(
        captured.lock().unwrap().last().unwrap().input_query_is_intent_search,
        Some(0.0)
    );

    let opts = SearchOpts {
        intent: Some(Intent {
            subject: vec!["invoice".into()],
            ..Intent::default()
        }),
        ..SearchOpts::default()
    };
    let (_profile, _response) = c
        .search("alpha", "u@x.com", None, None, &[], &opts)
        .await
        .unwrap();
    assert_eq!(
        captured.lock().unwrap().last().unwrap().input_query_is_intent_search,
        Some(1.0)
    );
}

#[tokio::test(start_paused = true)]
async fn insert_exhausts_retries_and_reports_the_document() {
    let config = SearchClientConfig {
        max_retry_attempts: 1,
        retry_delay: Duration::from_millis(1),
        ..SearchClientConfig::default()
    };
    let transport = FakeTransport {
        insert_failures_before_success: Mutex::new(10),
        ..FakeTransport::default()
    };
    let c = SearchClient::new(transport, config, vec!["mail".to_owned()]);

    let err = c
        .insert("doc-2", "mail", json!({"subject": "hi"}))
        .await
        .unwrap_err();
    assert_eq!(err.error_type(), "INSERT_FAILURE");
}
