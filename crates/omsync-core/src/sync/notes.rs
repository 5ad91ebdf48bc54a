//! Paginated memo retrieval and markdown persistence.

use tracing::{debug, error, info, warn};

use crate::api::{MemoPageRequest, RemoteApi, MEMO_PAGE_SIZE};
use crate::config::SyncConfig;
use crate::error::Result;
use crate::models::Memo;
use crate::storage::FileStore;
use crate::sync::paths::note_path;
use crate::sync::report::{PhaseOutcome, PhaseReport, SyncPhase};
use crate::sync::watermark::{filter_new, Watermark};

/// When to request the next memo page.
///
/// The listing is ordered newest-first, so a page in which nothing passes the
/// watermark is taken as proof that later pages hold nothing new either.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaginationPolicy {
    /// Continue only while a page yields new memos and a next token exists.
    #[default]
    StopOnFirstEmptyPage,
    /// Continue while a next token exists, regardless of page contents.
    StopOnEmptyToken,
}

impl PaginationPolicy {
    pub const fn should_continue(self, new_on_page: usize, has_next_page: bool) -> bool {
        match self {
            Self::StopOnFirstEmptyPage => new_on_page > 0 && has_next_page,
            Self::StopOnEmptyToken => has_next_page,
        }
    }
}

/// Mirrors memos newer than the watermark into `{notes_dir}/*.md`.
pub struct NoteSyncEngine<'a> {
    api: &'a dyn RemoteApi,
    store: &'a dyn FileStore,
    config: &'a SyncConfig,
    watermark: Watermark,
    policy: PaginationPolicy,
}

impl<'a> NoteSyncEngine<'a> {
    pub fn new(
        api: &'a dyn RemoteApi,
        store: &'a dyn FileStore,
        config: &'a SyncConfig,
        watermark: Watermark,
    ) -> Self {
        Self {
            api,
            store,
            config,
            watermark,
            policy: PaginationPolicy::default(),
        }
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: PaginationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run the phase. Errors end pagination and are returned in the report.
    pub async fn sync_notes(&self) -> PhaseReport {
        let mut report = PhaseReport::new(SyncPhase::Notes);
        let result = self.fetch_pages(&mut report).await;
        if let Err(error) = &result {
            error!(
                error = %error,
                pages = report.pages,
                written = report.written,
                "Memo sync stopped"
            );
        }
        report.outcome = PhaseOutcome::from_result(result, Vec::new());
        info!(pages = report.pages, written = report.written, "Memo sync finished");
        report
    }

    async fn fetch_pages(&self, report: &mut PhaseReport) -> Result<()> {
        let mut page_token = String::new();

        loop {
            let page = self
                .api
                .list_memos(MemoPageRequest {
                    page_size: MEMO_PAGE_SIZE,
                    page_token: &page_token,
                    creator: self.config.user_id(),
                })
                .await?;
            report.pages += 1;

            let has_next_page = page.has_next_page();
            let listed = page.memos.len();
            let fresh = filter_new(page.memos, self.watermark);
            debug!(
                page = report.pages,
                listed,
                new = fresh.len(),
                "Fetched memo page"
            );

            for memo in &fresh {
                self.persist(memo).await?;
                report.written += 1;
            }

            if !self.policy.should_continue(fresh.len(), has_next_page) {
                return Ok(());
            }
            if page.next_page_token == page_token {
                warn!(token = %page_token, "Memo listing returned the same page token twice");
                return Ok(());
            }
            page_token = page.next_page_token;
        }
    }

    async fn persist(&self, memo: &Memo) -> Result<()> {
        let path = note_path(self.config.notes_dir(), &memo.name);
        self.store.create(&path, &memo.content).await?;
        debug!(memo = %memo.name, path = %path.display(), "Saved memo");
        Ok(())
    }
}
