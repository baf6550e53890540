//! CSV import and CSV/JSON export commands.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::Utc;
use jobtrail_core::models::{
    Application, CompanyResearch, Goal, NetworkingContact, Payload, PrepEntry, Record, StarStory,
};
use jobtrail_core::transfer::{
    import_applications, import_companies, import_contacts, import_prep_entries, import_stories,
    render_export, suggested_export_file_name, ExportFormat,
};
use jobtrail_core::{Error as CoreError, StoreService};

use crate::cli::{Collection, ExportFormat as CliExportFormat};
use crate::commands::common::CliContext;
use crate::error::CliError;

pub async fn run_import(
    collection: Collection,
    file: &Path,
    ctx: &CliContext,
) -> Result<(), CliError> {
    let owner = ctx.require_owner()?.to_string();
    let service = ctx.open_service().await?;
    let reader = File::open(file)?;

    let (imported, skipped) = match collection {
        Collection::App => import_into(&service, &owner, import_applications(reader)?).await?,
        Collection::Prep => import_into(&service, &owner, import_prep_entries(reader)?).await?,
        Collection::Company => import_into(&service, &owner, import_companies(reader)?).await?,
        Collection::Contact => import_into(&service, &owner, import_contacts(reader)?).await?,
        Collection::Story => import_into(&service, &owner, import_stories(reader)?).await?,
        Collection::Goal => {
            return Err(CliError::UnsupportedCollection(
                "goals have no CSV import; add them with `jobtrail goal add`".to_string(),
            ));
        }
    };

    if skipped == 0 {
        println!("Imported {imported} records");
    } else {
        println!("Imported {imported} records ({skipped} skipped)");
    }
    Ok(())
}

/// Create each payload, skipping the ones validation rejects
async fn import_into<P: Payload>(
    service: &StoreService,
    owner: &str,
    payloads: Vec<P>,
) -> Result<(usize, usize), CliError> {
    let mut imported = 0usize;
    let mut skipped = 0usize;

    for payload in payloads {
        match service.create(owner, payload).await {
            Ok(_) => imported += 1,
            Err(CoreError::InvalidInput(reason)) => {
                tracing::warn!("Skipping invalid {} row: {reason}", P::COLLECTION);
                skipped += 1;
            }
            Err(error) => return Err(error.into()),
        }
    }

    Ok((imported, skipped))
}

pub async fn run_export(
    collection: Collection,
    format: CliExportFormat,
    output: Option<&Path>,
    ctx: &CliContext,
) -> Result<(), CliError> {
    let owner = ctx.require_owner()?.to_string();
    let service = ctx.open_service().await?;
    let format = match format {
        CliExportFormat::Json => ExportFormat::Json,
        CliExportFormat::Csv => ExportFormat::Csv,
    };

    let (rendered, collection_name) = match collection {
        Collection::App => (
            export_collection::<Application>(&service, &owner, format).await?,
            Application::COLLECTION,
        ),
        Collection::Prep => (
            export_collection::<PrepEntry>(&service, &owner, format).await?,
            PrepEntry::COLLECTION,
        ),
        Collection::Company => (
            export_collection::<CompanyResearch>(&service, &owner, format).await?,
            CompanyResearch::COLLECTION,
        ),
        Collection::Contact => (
            export_collection::<NetworkingContact>(&service, &owner, format).await?,
            NetworkingContact::COLLECTION,
        ),
        Collection::Story => (
            export_collection::<StarStory>(&service, &owner, format).await?,
            StarStory::COLLECTION,
        ),
        Collection::Goal => (
            export_collection::<Goal>(&service, &owner, format).await?,
            Goal::COLLECTION,
        ),
    };

    match output {
        Some(path) => {
            let path = resolve_output_path(path, collection_name, format);
            std::fs::write(&path, rendered)?;
            println!("{}", path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

async fn export_collection<P: Payload>(
    service: &StoreService,
    owner: &str,
    format: ExportFormat,
) -> Result<String, CliError> {
    let records: Vec<Record<P>> = service.list(owner).await?;
    Ok(render_export(&records, format)?)
}

/// A directory target gets a generated file name inside it
fn resolve_output_path(output: &Path, collection: &str, format: ExportFormat) -> PathBuf {
    if output.is_dir() {
        output.join(suggested_export_file_name(
            collection,
            format,
            Utc::now().timestamp_millis(),
        ))
    } else {
        output.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::common::default_db_path;
    use pretty_assertions::assert_eq;

    fn test_context(owner: &str, db_path: PathBuf) -> CliContext {
        CliContext {
            owner: Some(owner.to_string()),
            db_path,
            sync: None,
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn import_skips_rows_that_fail_validation() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = test_context("u1", tmp.path().join("jobs.db"));

        let csv_path = tmp.path().join("apps.csv");
        std::fs::write(
            &csv_path,
            "company,role,status\nAcme,Engineer,applied\n,Analyst,applied\n",
        )
        .unwrap();

        run_import(Collection::App, &csv_path, &ctx).await.unwrap();

        let service = ctx.open_service().await.unwrap();
        let records: Vec<Record<Application>> = service.list("u1").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].payload.company, "Acme");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn goal_import_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = test_context("u1", tmp.path().join("jobs.db"));
        let csv_path = tmp.path().join("goals.csv");
        std::fs::write(&csv_path, "title\nApply more\n").unwrap();

        let error = run_import(Collection::Goal, &csv_path, &ctx)
            .await
            .unwrap_err();
        assert!(matches!(error, CliError::UnsupportedCollection(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn export_writes_csv_file() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = test_context("u1", tmp.path().join("jobs.db"));

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

        let out = tmp.path().join("apps.csv");
        run_export(Collection::App, CliExportFormat::Csv, Some(&out), &ctx)
            .await
            .unwrap();

        let rendered = std::fs::read_to_string(&out).unwrap();
        assert!(rendered.starts_with("id,created_at,updated_at,company"));
        assert!(rendered.contains("Acme"));
    }

    #[test]
    fn directory_output_gets_generated_file_name() {
        let tmp = tempfile::tempdir().unwrap();
        let path = resolve_output_path(tmp.path(), "applications", ExportFormat::Csv);
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("jobtrail-applications-"));
        assert!(name.ends_with(".csv"));

        let explicit = resolve_output_path(&tmp.path().join("out.csv"), "applications", ExportFormat::Csv);
        assert_eq!(explicit, tmp.path().join("out.csv"));
    }

    #[test]
    fn default_db_path_is_under_app_dir() {
        let path = default_db_path();
        assert!(path.ends_with(Path::new("jobtrail").join("jobtrail.db")));
    }
}
