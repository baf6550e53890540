//! Per-collection CRUD commands.
//!
//! Add prints the new record id, update and delete echo the id back, list
//! prints aligned one-line summaries or JSON.

use chrono::Utc;
use jobtrail_core::models::{
    Application, ApplicationStatus, CompanyResearch, ContactStatus, Goal, NetworkingContact,
    Payload, PrepEntry, Record, Referral, StarStory,
};
use jobtrail_core::StoreService;

use crate::cli::{
    AppCommands, AppFieldArgs, CompanyCommands, CompanyFieldArgs, ContactCommands,
    ContactFieldArgs, GoalCommands, GoalFieldArgs, ListArgs, PrepCommands, PrepFieldArgs,
    StoryCommands, StoryFieldArgs,
};
use crate::commands::common::{format_relative_time, overlay, parse_record_id, short_id, CliContext};
use crate::error::CliError;

pub async fn run_app(command: AppCommands, ctx: &CliContext) -> Result<(), CliError> {
    let owner = ctx.require_owner()?;
    let service = ctx.open_service().await?;

    match command {
        AppCommands::Add {
            company,
            role,
            fields,
        } => {
            let mut payload = Application {
                company,
                role,
                ..Application::default()
            };
            apply_app_fields(&mut payload, fields)?;
            let record = service.create(owner, payload).await?;
            println!("{}", record.id);
        }
        AppCommands::List { list } => {
            print_list::<Application>(&service, owner, &list, |record, now| {
                format!(
                    "{:<13}  {:<24}  {:<20}  {:<10}  {}",
                    short_id(record.id),
                    clip(&record.payload.company, 24),
                    clip(&record.payload.role, 20),
                    record.payload.status,
                    format_relative_time(record.updated_at, now)
                )
            })
            .await?;
        }
        AppCommands::Update {
            id,
            company,
            role,
            fields,
        } => {
            let id = parse_record_id(&id)?;
            let record: Record<Application> = service.get(owner, id).await?;
            let mut payload = record.payload;
            overlay(&mut payload.company, company);
            overlay(&mut payload.role, role);
            apply_app_fields(&mut payload, fields)?;
            let updated = service.update(owner, id, payload).await?;
            println!("{}", updated.id);
        }
        AppCommands::Delete { id } => {
            let id = parse_record_id(&id)?;
            service.delete::<Application>(owner, id).await?;
            println!("{id}");
        }
    }

    Ok(())
}

fn apply_app_fields(payload: &mut Application, fields: AppFieldArgs) -> Result<(), CliError> {
    overlay(&mut payload.link, fields.link);
    overlay(&mut payload.date, fields.date);
    if let Some(status) = fields.status {
        payload.status = status.parse::<ApplicationStatus>()?;
    }
    overlay(&mut payload.location, fields.location);
    overlay(&mut payload.recruiter, fields.recruiter);
    if let Some(referral) = fields.referral {
        payload.referral = referral.parse::<Referral>()?;
    }
    overlay(&mut payload.next_step, fields.next_step);
    overlay(&mut payload.notes, fields.notes);
    Ok(())
}

pub async fn run_prep(command: PrepCommands, ctx: &CliContext) -> Result<(), CliError> {
    let owner = ctx.require_owner()?;
    let service = ctx.open_service().await?;

    match command {
        PrepCommands::Add { topic, fields } => {
            let mut payload = PrepEntry {
                topic,
                ..PrepEntry::default()
            };
            apply_prep_fields(&mut payload, fields);
            let record = service.create(owner, payload).await?;
            println!("{}", record.id);
        }
        PrepCommands::List { list } => {
            print_list::<PrepEntry>(&service, owner, &list, |record, now| {
                format!(
                    "{:<13}  {:<24}  {:>4}m  conf {:>2}  {}",
                    short_id(record.id),
                    clip(&record.payload.topic, 24),
                    record.payload.time_minutes,
                    record.payload.confidence,
                    format_relative_time(record.updated_at, now)
                )
            })
            .await?;
        }
        PrepCommands::Update { id, topic, fields } => {
            let id = parse_record_id(&id)?;
            let record: Record<PrepEntry> = service.get(owner, id).await?;
            let mut payload = record.payload;
            overlay(&mut payload.topic, topic);
            apply_prep_fields(&mut payload, fields);
            let updated = service.update(owner, id, payload).await?;
            println!("{}", updated.id);
        }
        PrepCommands::Delete { id } => {
            let id = parse_record_id(&id)?;
            service.delete::<PrepEntry>(owner, id).await?;
            println!("{id}");
        }
    }

    Ok(())
}

fn apply_prep_fields(payload: &mut PrepEntry, fields: PrepFieldArgs) {
    overlay(&mut payload.date, fields.date);
    overlay(&mut payload.problems, fields.problems);
    if let Some(time) = fields.time {
        payload.time_minutes = time;
    }
    if let Some(confidence) = fields.confidence {
        payload.confidence = confidence;
    }
    overlay(&mut payload.notes, fields.notes);
}

pub async fn run_company(command: CompanyCommands, ctx: &CliContext) -> Result<(), CliError> {
    let owner = ctx.require_owner()?;
    let service = ctx.open_service().await?;

    match command {
        CompanyCommands::Add { company, fields } => {
            let mut payload = CompanyResearch {
                company,
                ..CompanyResearch::default()
            };
            apply_company_fields(&mut payload, fields);
            let record = service.create(owner, payload).await?;
            println!("{}", record.id);
        }
        CompanyCommands::List { list } => {
            print_list::<CompanyResearch>(&service, owner, &list, |record, now| {
                format!(
                    "{:<13}  {:<24}  {:<40}  {}",
                    short_id(record.id),
                    clip(&record.payload.company, 24),
                    clip(&record.payload.why, 40),
                    format_relative_time(record.updated_at, now)
                )
            })
            .await?;
        }
        CompanyCommands::Update {
            id,
            company,
            fields,
        } => {
            let id = parse_record_id(&id)?;
            let record: Record<CompanyResearch> = service.get(owner, id).await?;
            let mut payload = record.payload;
            overlay(&mut payload.company, company);
            apply_company_fields(&mut payload, fields);
            let updated = service.update(owner, id, payload).await?;
            println!("{}", updated.id);
        }
        CompanyCommands::Delete { id } => {
            let id = parse_record_id(&id)?;
            service.delete::<CompanyResearch>(owner, id).await?;
            println!("{id}");
        }
    }

    Ok(())
}

fn apply_company_fields(payload: &mut CompanyResearch, fields: CompanyFieldArgs) {
    overlay(&mut payload.what_they_do, fields.what_they_do);
    overlay(&mut payload.values, fields.values);
    overlay(&mut payload.why, fields.why);
    overlay(&mut payload.questions, fields.questions);
    overlay(&mut payload.news, fields.news);
}

pub async fn run_contact(command: ContactCommands, ctx: &CliContext) -> Result<(), CliError> {
    let owner = ctx.require_owner()?;
    let service = ctx.open_service().await?;

    match command {
        ContactCommands::Add { name, fields } => {
            let mut payload = NetworkingContact {
                name,
                ..NetworkingContact::default()
            };
            apply_contact_fields(&mut payload, fields)?;
            let record = service.create(owner, payload).await?;
            println!("{}", record.id);
        }
        ContactCommands::List { list } => {
            print_list::<NetworkingContact>(&service, owner, &list, |record, now| {
                format!(
                    "{:<13}  {:<20}  {:<20}  {:<10}  {}",
                    short_id(record.id),
                    clip(&record.payload.name, 20),
                    clip(&record.payload.company, 20),
                    record.payload.status,
                    format_relative_time(record.updated_at, now)
                )
            })
            .await?;
        }
        ContactCommands::Update { id, name, fields } => {
            let id = parse_record_id(&id)?;
            let record: Record<NetworkingContact> = service.get(owner, id).await?;
            let mut payload = record.payload;
            overlay(&mut payload.name, name);
            apply_contact_fields(&mut payload, fields)?;
            let updated = service.update(owner, id, payload).await?;
            println!("{}", updated.id);
        }
        ContactCommands::Delete { id } => {
            let id = parse_record_id(&id)?;
            service.delete::<NetworkingContact>(owner, id).await?;
            println!("{id}");
        }
    }

    Ok(())
}

fn apply_contact_fields(
    payload: &mut NetworkingContact,
    fields: ContactFieldArgs,
) -> Result<(), CliError> {
    overlay(&mut payload.company, fields.company);
    overlay(&mut payload.role, fields.role);
    overlay(&mut payload.date, fields.date);
    if let Some(status) = fields.status {
        payload.status = status.parse::<ContactStatus>()?;
    }
    if let Some(referral) = fields.referral {
        payload.referral = referral.parse::<Referral>()?;
    }
    overlay(&mut payload.notes, fields.notes);
    Ok(())
}

pub async fn run_story(command: StoryCommands, ctx: &CliContext) -> Result<(), CliError> {
    let owner = ctx.require_owner()?;
    let service = ctx.open_service().await?;

    match command {
        StoryCommands::Add { title, fields } => {
            let mut payload = StarStory {
                title,
                ..StarStory::default()
            };
            apply_story_fields(&mut payload, fields);
            let record = service.create(owner, payload).await?;
            println!("{}", record.id);
        }
        StoryCommands::List { list } => {
            print_list::<StarStory>(&service, owner, &list, |record, now| {
                format!(
                    "{:<13}  {:<32}  {:<40}  {}",
                    short_id(record.id),
                    clip(&record.payload.title, 32),
                    clip(&record.payload.situation, 40),
                    format_relative_time(record.updated_at, now)
                )
            })
            .await?;
        }
        StoryCommands::Update { id, title, fields } => {
            let id = parse_record_id(&id)?;
            let record: Record<StarStory> = service.get(owner, id).await?;
            let mut payload = record.payload;
            overlay(&mut payload.title, title);
            apply_story_fields(&mut payload, fields);
            let updated = service.update(owner, id, payload).await?;
            println!("{}", updated.id);
        }
        StoryCommands::Delete { id } => {
            let id = parse_record_id(&id)?;
            service.delete::<StarStory>(owner, id).await?;
            println!("{id}");
        }
    }

    Ok(())
}

fn apply_story_fields(payload: &mut StarStory, fields: StoryFieldArgs) {
    overlay(&mut payload.situation, fields.situation);
    overlay(&mut payload.task, fields.task);
    overlay(&mut payload.action, fields.action);
    overlay(&mut payload.result, fields.result);
}

pub async fn run_goal(command: GoalCommands, ctx: &CliContext) -> Result<(), CliError> {
    let owner = ctx.require_owner()?;
    let service = ctx.open_service().await?;

    match command {
        GoalCommands::Add {
            title,
            target,
            fields,
        } => {
            let mut payload = Goal {
                title,
                target,
                ..Goal::default()
            };
            apply_goal_fields(&mut payload, fields);
            let record = service.create(owner, payload).await?;
            println!("{}", record.id);
        }
        GoalCommands::List { list } => {
            print_list::<Goal>(&service, owner, &list, |record, now| {
                let done = if record.payload.is_met() { " done" } else { "" };
                format!(
                    "{:<13}  {:<32}  {:>3}/{:<3}{done}  {}",
                    short_id(record.id),
                    clip(&record.payload.title, 32),
                    record.payload.progress,
                    record.payload.target,
                    format_relative_time(record.updated_at, now)
                )
            })
            .await?;
        }
        GoalCommands::Update {
            id,
            title,
            target,
            fields,
        } => {
            let id = parse_record_id(&id)?;
            let record: Record<Goal> = service.get(owner, id).await?;
            let mut payload = record.payload;
            overlay(&mut payload.title, title);
            if let Some(target) = target {
                payload.target = target;
            }
            apply_goal_fields(&mut payload, fields);
            let updated = service.update(owner, id, payload).await?;
            println!("{}", updated.id);
        }
        GoalCommands::Delete { id } => {
            let id = parse_record_id(&id)?;
            service.delete::<Goal>(owner, id).await?;
            println!("{id}");
        }
    }

    Ok(())
}

fn apply_goal_fields(payload: &mut Goal, fields: GoalFieldArgs) {
    if let Some(progress) = fields.progress {
        payload.progress = progress;
    }
    overlay(&mut payload.due, fields.due);
    overlay(&mut payload.notes, fields.notes);
}

async fn print_list<P: Payload>(
    service: &StoreService,
    owner: &str,
    list: &ListArgs,
    line: impl Fn(&Record<P>, i64) -> String,
) -> Result<(), CliError> {
    let mut records: Vec<Record<P>> = service.list(owner).await?;
    records.truncate(list.limit);

    if list.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        let now = Utc::now().timestamp_millis();
        for record in &records {
            println!("{}", line(record, now));
        }
    }

    Ok(())
}

fn clip(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clip_collapses_whitespace_and_truncates() {
        assert_eq!(clip("Acme  Corp", 20), "Acme Corp");
        assert_eq!(clip("A very long company name", 10), "A very ...");
    }

    #[test]
    fn apply_app_fields_parses_enums_strictly() {
        let mut payload = Application {
            company: "Acme".to_string(),
            ..Application::default()
        };
        let fields = AppFieldArgs {
            status: Some("interview".to_string()),
            referral: Some("y".to_string()),
            ..AppFieldArgs::default()
        };
        apply_app_fields(&mut payload, fields).unwrap();
        assert_eq!(payload.status, ApplicationStatus::Interview);
        assert_eq!(payload.referral, Referral::Y);

        let bad = AppFieldArgs {
            status: Some("ghosted".to_string()),
            ..AppFieldArgs::default()
        };
        assert!(apply_app_fields(&mut payload, bad).is_err());
    }

    #[test]
    fn apply_goal_fields_keeps_unset_values() {
        let mut payload = Goal {
            title: "Apply to 10 roles".to_string(),
            target: 10,
            progress: 4,
            ..Goal::default()
        };
        apply_goal_fields(&mut payload, GoalFieldArgs::default());
        assert_eq!(payload.progress, 4);

        apply_goal_fields(
            &mut payload,
            GoalFieldArgs {
                progress: Some(7),
                ..GoalFieldArgs::default()
            },
        );
        assert_eq!(payload.progress, 7);
    }
}
