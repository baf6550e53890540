//! Live collection watch, driven by a `CollectionBinding`.

use jobtrail_core::models::{
    Application, CompanyResearch, Goal, NetworkingContact, Payload, PrepEntry, StarStory,
};
use jobtrail_core::sync::BindingView;
use jobtrail_core::CollectionBinding;

use crate::cli::Collection;
use crate::commands::common::{short_id, CliContext};
use crate::error::CliError;

pub async fn run_watch(
    collection: Collection,
    take: Option<usize>,
    ctx: &CliContext,
) -> Result<(), CliError> {
    match collection {
        Collection::App => watch_collection::<Application>(take, ctx).await,
        Collection::Prep => watch_collection::<PrepEntry>(take, ctx).await,
        Collection::Company => watch_collection::<CompanyResearch>(take, ctx).await,
        Collection::Contact => watch_collection::<NetworkingContact>(take, ctx).await,
        Collection::Story => watch_collection::<StarStory>(take, ctx).await,
        Collection::Goal => watch_collection::<Goal>(take, ctx).await,
    }
}

async fn watch_collection<P: Payload>(
    take: Option<usize>,
    ctx: &CliContext,
) -> Result<(), CliError> {
    let owner = ctx.require_owner()?.to_string();
    let service = ctx.open_service().await?;

    let binding = CollectionBinding::<P>::connect(service.as_document_store(), Some(&owner));
    let mut view_rx = binding.watch();
    let mut printed = 0usize;

    println!("Watching {} (Ctrl-C to stop)", P::COLLECTION);

    loop {
        {
            let view = view_rx.borrow_and_update().clone();
            if !view.loading {
                print_snapshot(&view, printed)?;
                printed += 1;

                if view.error.is_some() {
                    break;
                }
                if take.is_some_and(|take| printed >= take) {
                    break;
                }
            }
        }

        tokio::select! {
            changed = view_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}

fn print_snapshot<P: Payload>(view: &BindingView<P>, sequence: usize) -> Result<(), CliError> {
    if let Some(error) = &view.error {
        println!("[{sequence}] error: {error}");
        return Ok(());
    }

    println!(
        "[{sequence}] {} records ({:?})",
        view.records.len(),
        view.source
    );
    for record in view.records.iter() {
        println!(
            "  {}  {}",
            short_id(record.id),
            serde_json::to_string(&record.payload)?
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobtrail_core::sync::SnapshotSource;
    use std::path::PathBuf;
    use std::time::Duration;

    fn test_context(db_path: PathBuf) -> CliContext {
        CliContext {
            owner: Some("u1".to_string()),
            db_path,
            sync: None,
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn watch_exits_after_take_snapshots() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = test_context(tmp.path().join("jobs.db"));

        let service = ctx.open_service().await.unwrap();
        service
            .create(
                "u1",
                Application {
                    company: "Acme".to_string(),
                    role: "Engineer".to_string(),
                    ..Application::default()
                },
            )
            .await
            .unwrap();

        // One snapshot requested; must terminate without Ctrl-C.
        tokio::time::timeout(
            Duration::from_secs(5),
            run_watch(Collection::App, Some(1), &ctx),
        )
        .await
        .expect("watch did not terminate")
        .unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn watch_requires_an_owner() {
        let tmp = tempfile::tempdir().unwrap();
        let mut ctx = test_context(tmp.path().join("jobs.db"));
        ctx.owner = None;

        let error = run_watch(Collection::App, Some(1), &ctx).await.unwrap_err();
        assert!(matches!(error, CliError::NoOwner));
    }

    #[test]
    fn print_snapshot_handles_error_views() {
        let view = BindingView::<Application> {
            records: std::sync::Arc::new(Vec::new()),
            loading: false,
            error: Some("subscription closed".to_string()),
            source: SnapshotSource::None,
        };
        print_snapshot(&view, 0).unwrap();

        let ok_view = BindingView::<Application> {
            error: None,
            source: SnapshotSource::ServerOrdered,
            ..view
        };
        print_snapshot(&ok_view, 1).unwrap();
    }
}
