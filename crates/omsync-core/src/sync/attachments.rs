//! Attachment download, persistence and relinking into memo files.

use tracing::{debug, error, info, warn};

use crate::api::RemoteApi;
use crate::config::SyncConfig;
use crate::error::Result;
use crate::models::Resource;
use crate::storage::FileStore;
use crate::sync::filename::resolve_attachment_file_name;
use crate::sync::paths::{embed_line, note_path};
use crate::sync::report::{PhaseOutcome, PhaseReport, SyncPhase, SyncWarning};
use crate::sync::watermark::{filter_new, Watermark};

/// Mirrors resources created after the watermark into `{attachments_dir}`.
pub struct AttachmentSyncEngine<'a> {
    api: &'a dyn RemoteApi,
    store: &'a dyn FileStore,
    config: &'a SyncConfig,
    watermark: Watermark,
}

impl<'a> AttachmentSyncEngine<'a> {
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
        }
    }

    /// Run the phase. The first download or write error stops the remaining
    /// attachments; missing memo files only produce warnings.
    pub async fn sync_attachments(&self) -> PhaseReport {
        let mut report = PhaseReport::new(SyncPhase::Attachments);
        let mut warnings = Vec::new();
        let result = self.sync_all(&mut report, &mut warnings).await;
        if let Err(error) = &result {
            error!(
                error = %error,
                written = report.written,
                "Attachment sync stopped"
            );
        }
        report.outcome = PhaseOutcome::from_result(result, warnings);
        info!(
            written = report.written,
            linked = report.linked,
            "Attachment sync finished"
        );
        report
    }

    async fn sync_all(
        &self,
        report: &mut PhaseReport,
        warnings: &mut Vec<SyncWarning>,
    ) -> Result<()> {
        let resources = self.api.list_resources().await?;
        report.pages = 1;
        let listed = resources.len();
        let fresh = filter_new(resources, self.watermark);
        debug!(listed, new = fresh.len(), "Fetched resource listing");

        for resource in &fresh {
            let file_name = self.persist(resource).await?;
            report.written += 1;

            let Some(memo) = resource.owner_memo() else {
                continue;
            };
            match self.relink(resource, memo, &file_name).await? {
                Some(warning) => warnings.push(warning),
                None => report.linked += 1,
            }
        }
        Ok(())
    }

    async fn persist(&self, resource: &Resource) -> Result<String> {
        let bytes = self.api.download_resource(resource).await?;
        let file_name = resolve_attachment_file_name(resource);
        let path = self.config.attachments_dir().join(&file_name);
        self.store.create_binary(&path, &bytes).await?;
        debug!(
            resource = %resource.name,
            path = %path.display(),
            bytes = bytes.len(),
            "Saved attachment"
        );
        Ok(file_name)
    }

    async fn relink(
        &self,
        resource: &Resource,
        memo: &str,
        file_name: &str,
    ) -> Result<Option<SyncWarning>> {
        let path = note_path(self.config.notes_dir(), memo);
        let Some(note_file) = self.store.get_file_by_path(&path).await? else {
            warn!(
                resource = %resource.name,
                memo,
                path = %path.display(),
                "Couldn't find memo file to link attachment"
            );
            return Ok(Some(SyncWarning::RelinkTargetMissing {
                attachment: resource.name.clone(),
                memo: memo.to_string(),
                path,
            }));
        };

        self.store.append(&note_file, &embed_line(file_name)).await?;
        debug!(memo, attachment = file_name, "Linked attachment");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::sync::testing::{resource, test_config, FakeRemote, MemoryStore};
    use pretty_assertions::assert_eq;
    use std::path::{Path, PathBuf};

    const OLD: &str = "1970-01-01T00:00:00.500Z";
    const PHOTO_TIME: &str = "2024-01-01T00:00:00Z";
    const LATER_TIME: &str = "2024-01-02T00:00:00Z";

    async fn run(remote: &FakeRemote, store: &MemoryStore) -> PhaseReport {
        let config = test_config();
        AttachmentSyncEngine::new(remote, store, &config, Watermark::from_millis(1_000))
            .sync_attachments()
            .await
    }

    fn note(name: &str) -> PathBuf {
        Path::new("/vault/memos").join(name)
    }

    fn attachment(name: &str) -> PathBuf {
        Path::new("/vault/attachments").join(name)
    }

    #[tokio::test]
    async fn saves_photo_and_links_it_into_owning_memo() {
        let remote = FakeRemote::new().with_resource(
            resource(
                "resources/7",
                Some("photo.jpg"),
                PHOTO_TIME,
                "image/jpeg",
                Some("memos/42"),
            ),
            &[0xFF, 0xD8],
        );
        let store = MemoryStore::new().with_file(note("memos-42.md"), "Lunch");

        let report = run(&remote, &store).await;

        assert!(matches!(report.outcome, PhaseOutcome::Success));
        assert_eq!(report.written, 1);
        assert_eq!(report.linked, 1);
        assert_eq!(
            store.bytes(attachment("photo-55507.jpg")),
            Some(vec![0xFF, 0xD8])
        );
        assert_eq!(
            store.text(note("memos-42.md")).as_deref(),
            Some("Lunch\n\n![[photo-55507.jpg]]")
        );
    }

    #[tokio::test]
    async fn missing_memo_file_keeps_attachment_and_continues() {
        let remote = FakeRemote::new()
            .with_resource(
                resource(
                    "resources/1",
                    Some("orphan.png"),
                    PHOTO_TIME,
                    "image/png",
                    Some("memos/404"),
                ),
                &[1],
            )
            .with_resource(
                resource(
                    "resources/2",
                    Some("later.png"),
                    LATER_TIME,
                    "image/png",
                    Some("memos/5"),
                ),
                &[2],
            );
        let store = MemoryStore::new().with_file(note("memos-5.md"), "five");

        let report = run(&remote, &store).await;

        assert_eq!(report.written, 2);
        assert_eq!(report.linked, 1);
        assert_eq!(store.bytes(attachment("orphan-55507.png")), Some(vec![1]));
        assert_eq!(
            store.text(note("memos-5.md")).as_deref(),
            Some("five\n\n![[later-c425b.png]]")
        );
        let PhaseOutcome::Partial(warnings) = &report.outcome else {
            panic!("expected partial outcome");
        };
        assert_eq!(
            warnings,
            &vec![SyncWarning::RelinkTargetMissing {
                attachment: "resources/1".to_string(),
                memo: "memos/404".to_string(),
                path: note("memos-404.md"),
            }]
        );
    }

    #[tokio::test]
    async fn unattached_resource_touches_no_memo_file() {
        let remote = FakeRemote::new().with_resource(
            resource("resources/3", Some("loose.pdf"), PHOTO_TIME, "application/pdf", Some("")),
            b"%PDF",
        );
        let store = MemoryStore::new().with_file(note("memos-1.md"), "one");

        let report = run(&remote, &store).await;

        assert!(matches!(report.outcome, PhaseOutcome::Success));
        assert_eq!(report.linked, 0);
        assert_eq!(store.text(note("memos-1.md")).as_deref(), Some("one"));
        assert_eq!(
            store.paths(),
            vec![attachment("loose-55507.pdf"), note("memos-1.md")]
        );
    }

    #[tokio::test]
    async fn old_resources_are_never_downloaded() {
        let remote = FakeRemote::new()
            .with_resource(
                resource("resources/old", Some("old.png"), OLD, "image/png", None),
                &[0],
            )
            .with_resource(
                resource("resources/new", Some("new.png"), PHOTO_TIME, "image/png", None),
                &[1],
            );
        let store = MemoryStore::new();

        run(&remote, &store).await;

        assert_eq!(remote.downloads(), vec!["resources/new"]);
        assert_eq!(store.paths(), vec![attachment("new-55507.png")]);
    }

    #[tokio::test]
    async fn download_failure_aborts_remaining_attachments() {
        let remote = FakeRemote::new()
            .with_resource(
                resource("resources/1", Some("first.png"), PHOTO_TIME, "image/png", None),
                &[1],
            )
            .with_broken_resource(resource(
                "resources/2",
                Some("broken.png"),
                PHOTO_TIME,
                "image/png",
                None,
            ))
            .with_resource(
                resource("resources/3", Some("third.png"), PHOTO_TIME, "image/png", None),
                &[3],
            );
        let store = MemoryStore::new();

        let report = run(&remote, &store).await;

        assert!(matches!(report.outcome, PhaseOutcome::Failed { error: Error::Api(_), .. }));
        assert_eq!(report.written, 1);
        assert_eq!(remote.downloads(), vec!["resources/1", "resources/2"]);
        assert_eq!(store.paths(), vec![attachment("first-55507.png")]);
    }

    #[tokio::test]
    async fn failure_after_relink_miss_keeps_the_warning() {
        let remote = FakeRemote::new()
            .with_resource(
                resource(
                    "resources/1",
                    Some("orphan.png"),
                    PHOTO_TIME,
                    "image/png",
                    Some("memos/404"),
                ),
                &[1],
            )
            .with_broken_resource(resource(
                "resources/2",
                Some("broken.png"),
                LATER_TIME,
                "image/png",
                None,
            ));
        let store = MemoryStore::new();

        let report = run(&remote, &store).await;

        assert!(report.outcome.is_failed());
        assert_eq!(
            report.outcome.warnings(),
            &[SyncWarning::RelinkTargetMissing {
                attachment: "resources/1".to_string(),
                memo: "memos/404".to_string(),
                path: note("memos-404.md"),
            }]
        );
    }

    #[tokio::test]
    async fn same_stem_and_create_time_collide_on_purpose() {
        let remote = FakeRemote::new()
            .with_resource(
                resource("resources/1", Some("scan.png"), PHOTO_TIME, "image/png", None),
                &[1],
            )
            .with_resource(
                resource("resources/2", Some("scan.png"), PHOTO_TIME, "image/png", None),
                &[2],
            );
        let store = MemoryStore::new();

        let report = run(&remote, &store).await;

        assert!(matches!(
            report.outcome,
            PhaseOutcome::Failed { error: Error::AlreadyExists(ref path), .. } if path == &attachment("scan-55507.png")
        ));
        assert_eq!(store.bytes(attachment("scan-55507.png")), Some(vec![1]));
    }

    #[tokio::test]
    async fn listing_failure_fails_phase_without_writes() {
        let remote = FakeRemote::new().failing_resource_listing();
        let store = MemoryStore::new();

        let report = run(&remote, &store).await;

        assert!(report.outcome.is_failed());
        assert_eq!(report.pages, 0);
        assert!(store.paths().is_empty());
    }
}
