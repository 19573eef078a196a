//! The Dispatch API (spec §4.7): high-level entry points that select and
//! parameterize profile builders, assemble a query via
//! [`crate::query::QueryBuilder`], and invoke the [`Transport`]
//! collaborator. Every operation here is `async` — composition is
//! synchronous, suspension happens only at the transport boundary (spec
//! §5).

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::condition::{Condition, Operator, TimeBounds};
use crate::config::SearchClientConfig;
use crate::error::{SearchClientError, SearchClientResult};
use crate::fanout;
use crate::permission::PermissionPolicy;
use crate::profiles::{self, Intent};
use crate::query::{ALL_SOURCES, QueryBuilder, QueryProfile, SortDirection};
use crate::retry;
use crate::sources::{self, App};
use crate::transport::{InsertParams, Payload, SearchResponse, Transport};

fn clamp_u32(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Which per-corpus profile builder applies to a given schema name.
///
/// `search`/`group_search` key their branch set off the configured/available
/// corpus set rather than a fixed app enumeration (spec §8.2 scenario 1: a
/// three-schema source list yields exactly three branches). A schema that
/// doesn't map to one of the app-specific corpora — including `file` — falls
/// back to the default hybrid condition (spec §4.5.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CorpusKind {
    /// No app-specific override.
    Default,
    Workspace,
    Gmail,
    Calendar,
    Slack,
}

fn corpus_kind_for_schema(schema: &str) -> CorpusKind {
    match schema {
        "mail" | "mail_attachment" => CorpusKind::Gmail,
        "event" => CorpusKind::Calendar,
        "user" => CorpusKind::Workspace,
        s if s.starts_with("chat_") => CorpusKind::Slack,
        _ => CorpusKind::Default,
    }
}

/// Resolve whether an intent filter actually contributes a condition (spec
/// §8.1 invariant 7: a name-only intent is a no-op), so `input.query(is_intent_search)`
/// reflects the *effective* presence of an intent filter, not merely whether
/// the caller passed an `Intent` value.
fn intent_is_active(intent: Option<&Intent>) -> SearchClientResult<bool> {
    match intent {
        Some(intent) => Ok(profiles::intent::intent_filter(intent)?.is_some()),
        None => Ok(false),
    }
}

/// Shared per-call overrides for [`SearchClient::search`]/[`SearchClient::group_search`].
#[derive(Debug, Clone, Default)]
pub struct SearchOpts {
    pub time_bounds: Option<TimeBounds>,
    pub excluded_ids: Vec<String>,
    pub notin_mail_labels: Vec<String>,
    pub intent: Option<Intent>,
    pub target_hits: Option<u32>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Per-call overrides for [`SearchClient::search_slack`].
#[derive(Debug, Clone, Default)]
pub struct SlackSearchOpts {
    pub channel_ids: Vec<String>,
    pub thread_id: Option<String>,
    pub user_id: Option<String>,
    pub time_bounds: Option<TimeBounds>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Per-call overrides for [`SearchClient::search_agent`].
#[derive(Debug, Clone, Default)]
pub struct AgentSearchOpts {
    pub time_bounds: Option<TimeBounds>,
    pub excluded_ids: Vec<String>,
    pub notin_mail_labels: Vec<String>,
    pub intent: Option<Intent>,
    pub data_source_ids: Vec<String>,
    pub drive_doc_ids: Vec<String>,
    pub slack_channel_ids: Vec<String>,
    pub knowledge_base: Option<profiles::datasource::KnowledgeBaseScope>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Parameters for [`SearchClient::get_items`] (filter-only retrieval, no ranking).
#[derive(Debug, Clone)]
pub struct GetItemsParams {
    pub principal: String,
    pub app: App,
    pub time_field: String,
    pub direction: SortDirection,
    pub time_bounds: Option<TimeBounds>,
    pub intent: Option<Intent>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Parameters for [`SearchClient::get_thread_items`].
#[derive(Debug, Clone)]
pub struct GetThreadItemsParams {
    pub principal: String,
    pub app: App,
    pub thread_id: String,
    pub time_field: String,
    pub direction: SortDirection,
    pub intent: Option<Intent>,
    /// An optional hybrid filter-query branch (e.g. for Slack thread search).
    /// Per spec §9 Open Question (b), this is always awaited before the
    /// result is assembled.
    pub filter_query: Option<String>,
    pub target_hits: Option<u32>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Per-call overrides for [`SearchClient::search_collection_rag`].
#[derive(Debug, Clone, Default)]
pub struct RagOpts {
    pub doc_ids: Vec<String>,
    pub parent_doc_ids: Vec<String>,
    pub alpha: Option<f64>,
}

/// The high-level client applications call. Generic over the transport
/// implementation so tests can substitute an in-memory fake.
pub struct SearchClient<T: Transport> {
    transport: Arc<T>,
    config: SearchClientConfig,
    schema_sources: Vec<String>,
}

impl<T: Transport> SearchClient<T> {
    /// Construct a client over a configured transport, config, and the full
    /// set of schemas this deployment indexes.
    pub fn new(transport: T, config: SearchClientConfig, schema_sources: Vec<String>) -> Self {
        Self {
            transport: Arc::new(transport),
            config,
            schema_sources,
        }
    }

    fn base_payload(
        &self,
        profile: &QueryProfile,
        query: &str,
        principal: &str,
        hits: u64,
        intent_active: bool,
    ) -> Payload {
        let mut payload = Payload {
            yql: Some(profile.yql.clone()),
            query: Some(query.to_owned()),
            email: Some(principal.to_owned()),
            hits: Some(hits),
            timeout: Some(self.config.request_timeout_str()),
            ranking_profile: Some(profile.profile.clone()),
            input_query_e: Some("embed(@query)".to_owned()),
            input_query_is_intent_search: Some(if intent_active { 1.0 } else { 0.0 }),
            ..Payload::default()
        };
        if self.config.is_debug_mode {
            payload.ranking_list_features = Some(true);
            payload.tracelevel = Some(4);
        }
        payload
    }

    async fn execute_search(
        &self,
        payload: Payload,
        sources: &[String],
    ) -> SearchClientResult<SearchResponse> {
        self.transport
            .search(payload)
            .await
            .map_err(|cause| SearchClientError::Search {
                sources: sources.to_vec(),
                cause,
            })
    }

    fn branch_for_kind(
        &self,
        kind: CorpusKind,
        query_ref: &str,
        hits: u32,
        principal: &str,
        opts: &SearchOpts,
        apps_ctx: &[String],
        entities_ctx: &[String],
    ) -> SearchClientResult<Condition> {
        match kind {
            CorpusKind::Default => profiles::default_hybrid(query_ref, hits, opts.time_bounds),
            CorpusKind::Gmail => profiles::gmail::gmail(
                query_ref,
                hits,
                opts.time_bounds,
                &opts.notin_mail_labels,
                opts.intent.as_ref(),
            ),
            CorpusKind::Calendar => profiles::calendar::calendar(query_ref, hits, opts.time_bounds),
            CorpusKind::Workspace => profiles::workspace::workspace(
                query_ref,
                hits,
                principal,
                opts.time_bounds,
                apps_ctx,
                entities_ctx,
            ),
            CorpusKind::Slack => profiles::slack::slack(query_ref, hits, opts.time_bounds, &[]),
        }
    }

    /// Build the `Or` of one branch per distinct corpus present in `sources`
    /// (spec §8.2 scenario 1), in first-seen order.
    fn build_root(
        &self,
        query_ref: &str,
        hits: u32,
        principal: &str,
        sources: &[String],
        opts: &SearchOpts,
        apps_ctx: &[String],
        entities_ctx: &[String],
    ) -> SearchClientResult<Condition> {
        let mut kinds = Vec::new();
        for schema in sources {
            let kind = corpus_kind_for_schema(schema);
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        let mut branches = Vec::with_capacity(kinds.len());
        for kind in kinds {
            branches.push(self.branch_for_kind(kind, query_ref, hits, principal, opts, apps_ctx, entities_ctx)?);
        }
        if branches.is_empty() {
            return Err(SearchClientError::validation(
                "no sources available to search",
            ));
        }
        Condition::or(branches)
    }

    /// General hybrid search (spec §4.7, §8.2 scenario 1).
    pub async fn search(
        &self,
        query: &str,
        principal: &str,
        app: Option<&str>,
        entity: Option<&str>,
        excluded_apps: &[App],
        opts: &SearchOpts,
    ) -> SearchClientResult<(QueryProfile, SearchResponse)> {
        info!(app = ?app, entity = ?entity, "dispatching search");
        let target_hits = opts.target_hits.unwrap_or_else(|| clamp_u32(self.config.page));
        let limit = opts.limit.unwrap_or(self.config.page);
        let sources = sources::available_sources(&self.schema_sources, excluded_apps);
        if sources.is_empty() {
            return Err(SearchClientError::validation(
                "no sources available after app exclusions",
            ));
        }
        let apps_ctx = app.map(|a| vec![a.to_owned()]).unwrap_or_default();
        let entities_ctx = entity.map(|e| vec![e.to_owned()]).unwrap_or_default();
        let root = self.build_root(query, target_hits, principal, &sources, opts, &apps_ctx, &entities_ctx)?;

        let mut builder = QueryBuilder::new().from(sources.clone()).where_(root);
        if let Some(app) = app {
            builder = builder.filter_by_app([app.to_owned()]);
        }
        if let Some(entity) = entity {
            builder = builder.filter_by_entity([entity.to_owned()]);
        }
        builder = builder.exclude_doc_ids(opts.excluded_ids.clone());
        builder = builder.limit(limit);
        if let Some(offset) = opts.offset {
            builder = builder.offset(offset);
        }

        let profile = builder.build_profile("nativeRank")?;
        debug!(yql_len = profile.yql.len(), source_count = sources.len(), "composed search query");

        let intent_active = intent_is_active(opts.intent.as_ref())?;
        let mut payload = self.base_payload(&profile, query, principal, limit, intent_active);
        payload.offset = opts.offset;
        payload.app = app.map(str::to_owned);
        payload.entity = entity.map(str::to_owned);

        let response = self.execute_search(payload, &sources).await?;
        Ok((profile, response))
    }

    /// Aggregate counts by `(app, entity)` (spec §8.2 scenario 5).
    pub async fn group_search(
        &self,
        query: &str,
        principal: &str,
        excluded_apps: &[App],
        opts: &SearchOpts,
    ) -> SearchClientResult<(QueryProfile, SearchResponse)> {
        info!("dispatching group_search");
        let target_hits = opts.target_hits.unwrap_or_else(|| clamp_u32(self.config.page));
        let sources = sources::available_sources(&self.schema_sources, excluded_apps);
        if sources.is_empty() {
            return Err(SearchClientError::validation(
                "no sources available after app exclusions",
            ));
        }
        let root = self.build_root(query, target_hits, principal, &sources, opts, &[], &[])?;

        let builder = QueryBuilder::new()
            .from(sources.clone())
            .where_(root)
            .limit(0)
            .group_by("all(group(app) each(group(entity) each(output(count()))))");
        let profile = builder.build_profile("nativeRank")?;

        let intent_active = intent_is_active(opts.intent.as_ref())?;
        let mut payload = self.base_payload(&profile, query, principal, 0, intent_active);
        payload.hits = Some(0);
        let response = self.execute_search(payload, &sources).await?;
        Ok((profile, response))
    }

    /// Fuzzy-prefix autocomplete (spec §4.7). Results are de-duplicated by
    /// email after the transport call returns.
    pub async fn autocomplete(
        &self,
        query: &str,
        principal: &str,
        limit: u64,
    ) -> SearchClientResult<(QueryProfile, SearchResponse)> {
        info!("dispatching autocomplete");
        const FUZZY_FIELDS: [&str; 5] = [
            "title_fuzzy",
            "name_fuzzy",
            "email_fuzzy",
            "subject_fuzzy",
            "query_text",
        ];
        let mut branches = Vec::with_capacity(FUZZY_FIELDS.len() + 1);
        for field in FUZZY_FIELDS {
            let fuzzy = Condition::fuzzy_contains(field, "query", 2, true)?;
            branches.push(Condition::and_with_permission(
                vec![fuzzy],
                PermissionPolicy::with_owner_permissions(principal),
            )?);
        }
        branches.push(Condition::and_with_permission(
            vec![
                Condition::fuzzy_contains("name_fuzzy", "query", 2, true)?,
                Condition::field("app", Operator::Eq, "GoogleWorkspace")?,
            ],
            PermissionPolicy::with_permissions_only(principal),
        )?);
        let root = Condition::or(branches)?;

        let sources = vec![ALL_SOURCES.to_owned()];
        let builder = QueryBuilder::new().from(sources.clone()).where_(root).limit(limit);
        let profile = builder.build_profile("autocomplete")?;

        let mut payload = self.base_payload(&profile, query, principal, limit, false);
        payload.presentation_summary = Some("autocomplete".to_owned());
        let response = self.execute_search(payload, &sources).await?;
        Ok((profile, dedupe_by_email(response)))
    }

    /// Hybrid search constrained to an explicit set of file/document ids
    /// (spec §4.7).
    pub async fn search_in_files(
        &self,
        query: &str,
        principal: &str,
        file_ids: &[String],
        opts: &SearchOpts,
    ) -> SearchClientResult<(QueryProfile, SearchResponse)> {
        info!("dispatching search_in_files");
        if file_ids.is_empty() {
            return Err(SearchClientError::validation(
                "search_in_files requires at least one file id",
            ));
        }
        let target_hits = opts.target_hits.unwrap_or_else(|| clamp_u32(self.config.page));
        let limit = opts.limit.unwrap_or(self.config.page);
        let chunk_branch = profiles::hybrid_core(query, target_hits, "chunk_embeddings")?;
        let text_branch = profiles::hybrid_core(query, target_hits, "text_embeddings")?;
        let contact_branch = Condition::user_input(query, target_hits);
        let core = Condition::or(vec![chunk_branch, text_branch, contact_branch])?;
        let scope = Condition::inclusion("docId", file_ids.to_vec())?;
        let root = Condition::and_with_permission(vec![core, scope], PermissionPolicy::bypassed())?;

        let sources = vec![ALL_SOURCES.to_owned()];
        let mut builder = QueryBuilder::new().from(sources.clone()).where_(root);
        builder = builder.limit(limit);
        if let Some(offset) = opts.offset {
            builder = builder.offset(offset);
        }
        let profile = builder.build_profile("nativeRank")?;

        let mut payload = self.base_payload(&profile, query, principal, limit, false);
        payload.offset = opts.offset;
        let response = self.execute_search(payload, &sources).await?;
        Ok((profile, response))
    }

    /// Channel/thread/user-scoped Slack search (spec §4.7).
    pub async fn search_slack(
        &self,
        query: &str,
        principal: &str,
        opts: &SlackSearchOpts,
    ) -> SearchClientResult<(QueryProfile, SearchResponse)> {
        info!("dispatching search_slack");
        let hits = clamp_u32(opts.limit.unwrap_or(self.config.page));
        let mut root = profiles::slack::slack(query, hits, opts.time_bounds, &opts.channel_ids)?;
        if let Some(thread_id) = &opts.thread_id {
            root = Condition::and(vec![
                root,
                Condition::field("threadId", Operator::Eq, thread_id.clone())?,
            ])?;
        }

        let sources = vec!["chat_message".to_owned(), "chat_user".to_owned()];
        let mut builder = QueryBuilder::new().from(sources.clone()).where_(root);
        builder = builder.limit(opts.limit.unwrap_or(self.config.page));
        if let Some(offset) = opts.offset {
            builder = builder.offset(offset);
        }
        let profile = builder.build_profile("nativeRank")?;

        let mut payload = self.base_payload(&profile, query, principal, u64::from(hits), false);
        payload.offset = opts.offset;
        payload.channel_id = opts.channel_ids.first().cloned();
        payload.user_id = opts.user_id.clone();
        let response = self.execute_search(payload, &sources).await?;
        Ok((profile, response))
    }

    /// Allow-list driven multi-corpus search (spec §4.6, §4.7): callers
    /// pass the apps they want searched rather than the apps to exclude.
    pub async fn search_agent(
        &self,
        query: &str,
        principal: &str,
        app: Option<&str>,
        entity: Option<&str>,
        allowed_apps: &[App],
        opts: &AgentSearchOpts,
    ) -> SearchClientResult<(QueryProfile, SearchResponse)> {
        info!("dispatching search_agent");
        if allowed_apps.is_empty() {
            return Err(SearchClientError::validation(
                "search_agent requires a non-empty allow-list of apps",
            ));
        }
        let hits = clamp_u32(opts.limit.unwrap_or(self.config.page));
        let sources = sources::schemas_for_apps(allowed_apps);
        let apps_ctx = app.map(|a| vec![a.to_owned()]).unwrap_or_default();
        let entities_ctx = entity.map(|e| vec![e.to_owned()]).unwrap_or_default();

        let mut branches = Vec::new();
        for candidate in allowed_apps {
            let branch = match candidate {
                App::GoogleDrive => {
                    profiles::drive::drive(query, hits, opts.time_bounds, &opts.drive_doc_ids)?
                }
                App::Gmail => profiles::gmail::gmail(
                    query,
                    hits,
                    opts.time_bounds,
                    &opts.notin_mail_labels,
                    opts.intent.as_ref(),
                )?,
                App::GoogleCalendar => profiles::calendar::calendar(query, hits, opts.time_bounds)?,
                App::GoogleWorkspace => profiles::workspace::workspace(
                    query,
                    hits,
                    principal,
                    opts.time_bounds,
                    &apps_ctx,
                    &entities_ctx,
                )?,
                App::Slack => {
                    profiles::slack::slack(query, hits, opts.time_bounds, &opts.slack_channel_ids)?
                }
            };
            branches.push(branch);
        }
        if !opts.data_source_ids.is_empty() {
            branches.push(profiles::datasource::data_source(query, hits, &opts.data_source_ids)?);
        }
        if let Some(kb) = &opts.knowledge_base {
            branches.push(profiles::datasource::knowledge_base(query, hits, kb)?);
        }
        let root = Condition::or(branches)?;

        let mut builder = QueryBuilder::new().from(sources.clone()).where_(root);
        builder = builder.exclude_doc_ids(opts.excluded_ids.clone());
        builder = builder.limit(opts.limit.unwrap_or(self.config.page));
        if let Some(offset) = opts.offset {
            builder = builder.offset(offset);
        }
        let profile = builder.build_profile("nativeRank")?;

        let intent_active = intent_is_active(opts.intent.as_ref())?;
        let mut payload = self.base_payload(&profile, query, principal, u64::from(hits), intent_active);
        payload.offset = opts.offset;
        payload.app = app.map(str::to_owned);
        payload.entity = entity.map(str::to_owned);
        let response = self.execute_search(payload, &sources).await?;
        Ok((profile, response))
    }

    /// Filter-only retrieval, no ranking (spec §4.7: `ranking.profile=unranked`).
    pub async fn get_items(
        &self,
        params: &GetItemsParams,
    ) -> SearchClientResult<(QueryProfile, SearchResponse)> {
        info!(app = ?params.app, "dispatching get_items");
        let mut children = Vec::new();
        if let Some(t) = profiles::single_time_filter(&params.time_field, params.time_bounds)? {
            children.push(t);
        }
        if let Some(intent) = &params.intent {
            if let Some(intent_cond) = profiles::intent::intent_filter(intent)? {
                children.push(intent_cond);
            }
        }
        if children.is_empty() {
            children.push(Condition::raw("true"));
        }
        let root = Condition::and_with_permission(children, PermissionPolicy::with_email_permissions())?;

        let sources = sources::schemas_for_apps(&[params.app]);
        let mut builder = QueryBuilder::new()
            .from(sources.clone())
            .where_(root)
            .order_by(&params.time_field, params.direction)?;
        builder = builder.limit(params.limit.unwrap_or(self.config.page));
        if let Some(offset) = params.offset {
            builder = builder.offset(offset);
        }
        let profile = builder.build_profile("unranked")?;

        let limit = params.limit.unwrap_or(self.config.page);
        let intent_active = intent_is_active(params.intent.as_ref())?;
        let mut payload = self.base_payload(&profile, "", &params.principal, limit, intent_active);
        payload.query = None;
        payload.input_query_e = None;
        payload.offset = params.offset;
        let response = self.execute_search(payload, &sources).await?;
        Ok((profile, response))
    }

    /// Thread-scoped retrieval, optionally combined with a hybrid
    /// filter-query branch (spec §4.7, §9 Open Question (b)).
    pub async fn get_thread_items(
        &self,
        params: &GetThreadItemsParams,
    ) -> SearchClientResult<(QueryProfile, SearchResponse)> {
        info!(app = ?params.app, thread_id = %params.thread_id, "dispatching get_thread_items");
        let mut children = vec![Condition::field(
            "threadId",
            Operator::Eq,
            params.thread_id.clone(),
        )?];
        if let Some(intent) = &params.intent {
            if let Some(intent_cond) = profiles::intent::intent_filter(intent)? {
                children.push(intent_cond);
            }
        }
        if let Some(filter_query) = &params.filter_query {
            let hits = params
                .target_hits
                .unwrap_or_else(|| clamp_u32(self.config.page));
            // Always awaited below via `execute_search` — see struct doc.
            children.push(profiles::hybrid_core(filter_query, hits, "text_embeddings")?);
        }
        let root = Condition::and_with_permission(children, PermissionPolicy::with_email_permissions())?;

        let sources = sources::schemas_for_apps(&[params.app]);
        let mut builder = QueryBuilder::new()
            .from(sources.clone())
            .where_(root)
            .order_by(&params.time_field, params.direction)?;
        builder = builder.limit(params.limit.unwrap_or(self.config.page));
        if let Some(offset) = params.offset {
            builder = builder.offset(offset);
        }
        let profile = builder.build_profile("unranked")?;

        let limit = params.limit.unwrap_or(self.config.page);
        let intent_active = intent_is_active(params.intent.as_ref())?;
        let mut payload = self.base_payload(
            &profile,
            params.filter_query.as_deref().unwrap_or(""),
            &params.principal,
            limit,
            intent_active,
        );
        payload.offset = params.offset;
        let response = self.execute_search(payload, &sources).await?;
        Ok((profile, response))
    }

    /// RAG retrieval scoped to knowledge-base items only (spec §4.7).
    ///
    /// # Errors
    /// Returns [`SearchClientError::Validation`] if `query` is empty.
    pub async fn search_collection_rag(
        &self,
        query: &str,
        principal: &str,
        limit: u64,
        offset: u64,
        rank_profile: &str,
        opts: &RagOpts,
    ) -> SearchClientResult<(QueryProfile, SearchResponse)> {
        info!("dispatching search_collection_rag");
        if query.trim().is_empty() {
            return Err(SearchClientError::validation(
                "RAG search requires a non-empty query",
            ));
        }
        let hits = clamp_u32(limit.max(1));
        let core = profiles::hybrid_core(query, hits, "chunk_embeddings")?;

        let mut scope_filters = Vec::new();
        let doc_filter = Condition::inclusion("docId", opts.doc_ids.clone())?;
        if !doc_filter.is_empty() {
            scope_filters.push(doc_filter);
        }
        let parent_filter = Condition::inclusion("clFd", opts.parent_doc_ids.clone())?;
        if !parent_filter.is_empty() {
            scope_filters.push(parent_filter);
        }

        let mut children = vec![core];
        if !scope_filters.is_empty() {
            let scope = if scope_filters.len() == 1 {
                scope_filters.into_iter().next().expect("checked len == 1")
            } else {
                Condition::or(scope_filters)?
            };
            children.push(scope);
        }
        let root = Condition::and_with_permission(children, PermissionPolicy::bypassed())?;

        let sources = vec!["knowledge_base".to_owned()];
        let builder = QueryBuilder::new()
            .from(sources.clone())
            .where_(root)
            .limit(limit)
            .offset(offset);
        let profile = builder.build_profile(rank_profile)?;

        let mut payload = self.base_payload(&profile, query, principal, limit, false);
        payload.offset = Some(offset);
        payload.input_query_alpha = opts.alpha;
        let response = self.execute_search(payload, &sources).await?;
        Ok((profile, response))
    }

    /// Create a new document, retrying on throttling with exponential
    /// backoff (spec §5, §7).
    pub async fn insert(&self, doc_id: &str, schema: &str, doc: Value) -> SearchClientResult<()> {
        let namespace = self.config.namespace.clone();
        retry::retry_insert(
            doc_id,
            schema,
            self.config.max_retry_attempts,
            self.config.retry_delay,
            || {
                let doc = doc.clone();
                let params = InsertParams {
                    namespace: namespace.clone(),
                    schema: schema.to_owned(),
                };
                let transport = Arc::clone(&self.transport);
                async move { transport.insert(doc, params).await }
            },
        )
        .await
    }

    /// Count-then-batch fan-out (spec §5): runs `count_query` once, then
    /// issues `ceil(total/batch_size)` calls to `fetch_batch` concurrently
    /// under the configured concurrency limit.
    ///
    /// # Errors
    /// Propagates the count query's failure, or the first batch failure
    /// (spec §5: batched fetch fails fast, no partial result).
    pub async fn fetch_all_by_name<Item, F, Fut, C, CFut>(
        &self,
        count_query: C,
        fetch_batch: F,
    ) -> SearchClientResult<Vec<Item>>
    where
        C: FnOnce() -> CFut,
        CFut: std::future::Future<Output = Result<u64, crate::error::TransportError>>,
        F: Fn(u64, u64) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<Vec<Item>, crate::error::TransportError>>
            + Send
            + 'static,
        Item: Send + 'static,
    {
        let total = count_query()
            .await
            .map_err(|cause| SearchClientError::Search {
                sources: Vec::new(),
                cause,
            })?;
        fanout::fetch_all_by_name(
            total,
            self.config.fetch_all_batch_size,
            self.config.fetch_all_concurrency,
            fetch_batch,
        )
        .await
    }
}

fn dedupe_by_email(mut response: SearchResponse) -> SearchResponse {
    let mut seen = std::collections::HashSet::new();
    response.hits.retain(|hit| {
        hit.get("email").and_then(Value::as_str).map_or(true, |email| {
            seen.insert(email.to_owned())
        })
    });
    response
}
