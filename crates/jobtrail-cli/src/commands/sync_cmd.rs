//! Manual replica sync.

use crate::commands::common::CliContext;
use crate::error::CliError;

pub async fn run_sync(ctx: &CliContext) -> Result<(), CliError> {
    if ctx.sync.is_none() {
        return Err(CliError::SyncNotConfigured);
    }

    let service = ctx.open_service().await?;
    service.sync().await?;
    println!("Sync completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn sync_requires_configuration() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = CliContext {
            owner: Some("u1".to_string()),
            db_path: tmp.path().join("jobs.db"),
            sync: None,
        };

        let error = run_sync(&ctx).await.unwrap_err();
        assert!(matches!(error, CliError::SyncNotConfigured));
    }
}
