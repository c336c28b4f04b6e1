use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tasknest_app::{DefaultsConfig, TaskPersistence, TaskService};
use tasknest_core::{
    Clock, DescriptionPatch, DuePatch, ImportReport, TaskDraft, TaskUpdate, ViewParams, parse_tags,
};

use crate::{Command, OutputFormat};

mod render;

/// Execute one CLI command and print its output.
pub fn run<P, C>(command: Command, service: &mut TaskService<P, C>, defaults: &DefaultsConfig) -> Result<()>
where
    P: TaskPersistence,
    C: Clock,
{
    let output = execute(command, service, defaults)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

fn execute<P, C>(command: Command, service: &mut TaskService<P, C>, defaults: &DefaultsConfig) -> Result<String>
where
    P: TaskPersistence,
    C: Clock,
{
    let output = match command {
        Command::Add {
            text,
            description,
            category,
            priority,
            due,
            tags,
        } => {
            let mut draft = TaskDraft::new(text)
                .category(category.unwrap_or(defaults.category))
                .priority(priority.unwrap_or(defaults.priority));
            if let Some(description) = description {
                draft = draft.description(description);
            }
            if let Some(due) = due {
                draft = draft.due(due);
            }
            if let Some(tags) = tags {
                draft = draft.tags(parse_tags(&tags));
            }
            let id = service.create(draft)?;
            format!("created task: {id}")
        }
        Command::Edit {
            task,
            text,
            description,
            clear_description,
            category,
            priority,
            due,
            clear_due,
            tags,
        } => {
            let id = service.resolve(&task)?;
            let update = TaskUpdate {
                text,
                description: if clear_description {
                    Some(DescriptionPatch::Clear)
                } else {
                    description.map(DescriptionPatch::Set)
                },
                category,
                priority,
                due_date: if clear_due {
                    Some(DuePatch::Clear)
                } else {
                    due.map(DuePatch::Set)
                },
                tags: tags.as_deref().map(parse_tags),
                ..TaskUpdate::default()
            };
            if update.is_empty() {
                bail!("nothing to update for task {id}");
            }
            service.update(id, update)?;
            format!("updated task: {id}")
        }
        Command::Done { task } => {
            let id = service.resolve(&task)?;
            if service.toggle_complete(id)? {
                format!("completed: {id}")
            } else {
                format!("reopened: {id}")
            }
        }
        Command::Archive { task } => {
            let id = service.resolve(&task)?;
            if service.toggle_archive(id)? {
                format!("archived: {id}")
            } else {
                format!("unarchived: {id}")
            }
        }
        Command::Rm { task } => {
            let id = service.resolve(&task)?;
            let removed = service.delete(id)?;
            format!("deleted task: {} ({})", removed.id, removed.text)
        }
        Command::ClearCompleted => {
            let removed = service.clear_completed()?;
            format!("removed {removed} completed task(s)")
        }
        Command::Ls {
            search,
            category,
            status,
            sort,
            format,
        } => {
            let params = ViewParams {
                search: search.unwrap_or_default(),
                category: category.unwrap_or_default(),
                status: status.unwrap_or(defaults.status),
                sort: sort.unwrap_or(defaults.sort),
            };
            let view = service.view(&params);
            match format {
                OutputFormat::Json => serde_json::to_string_pretty(&view)?,
                OutputFormat::Table => view.empty_message(&params).unwrap_or_else(|| {
                    let now = service.store().clock().now();
                    format!(
                        "{}\n\n{}",
                        render::task_table(&view.tasks, now),
                        render::summary_line(view.summary)
                    )
                }),
            }
        }
        Command::Stats { format } => {
            let stats = service.view(&ViewParams::default()).stats;
            match format {
                OutputFormat::Json => serde_json::to_string_pretty(&stats)?,
                OutputFormat::Table => render::stats_report(&stats),
            }
        }
        Command::Show { task } => {
            let id = service.resolve(&task)?;
            let task = service
                .get(id)
                .with_context(|| format!("task not found: {id}"))?;
            serde_json::to_string_pretty(task)?
        }
        Command::Import { file } => {
            let json = fs::read_to_string(&file).with_context(|| format!("failed to read {}", file.display()))?;
            let report = service.import_json(&json)?;
            import_summary(&report, &file)
        }
        Command::Export { output } => {
            let json = service.export_json()?;
            match output {
                Some(path) => {
                    fs::write(&path, format!("{json}\n"))
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    format!("exported {} task(s) to {}", service.store().len(), path.display())
                }
                None => json,
            }
        }
    };
    Ok(output)
}

fn import_summary(report: &ImportReport, file: &Path) -> String {
    let mut lines = vec![format!(
        "imported {} task(s) from {}",
        report.imported,
        file.display()
    )];
    for skipped in &report.skipped {
        lines.push(format!("skipped record {}: {}", skipped.index, skipped.reason));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasknest_app::MemoryPersistence;
    use tasknest_core::{Category, FixedClock, Priority, SortKey, StatusFilter};
    use tempfile::tempdir;
    use time::macros::datetime;

    fn service() -> TaskService<MemoryPersistence, FixedClock> {
        TaskService::open_with_clock(
            MemoryPersistence::new(),
            FixedClock::new(datetime!(2025-10-01 08:00 UTC)),
        )
        .unwrap_or_else(|err| panic!("open: {err}"))
    }

    fn exec(service: &mut TaskService<MemoryPersistence, FixedClock>, command: Command) -> String {
        execute(command, service, &DefaultsConfig::default()).unwrap_or_else(|err| panic!("command failed: {err:#}"))
    }

    fn add(text: &str) -> Command {
        Command::Add {
            text: text.to_owned(),
            description: None,
            category: None,
            priority: None,
            due: None,
            tags: None,
        }
    }

    fn ls(format: OutputFormat) -> Command {
        Command::Ls {
            search: None,
            category: None,
            status: None,
            sort: None,
            format,
        }
    }

    #[test]
    fn add_uses_configured_defaults() {
        let mut service = service();
        let defaults = DefaultsConfig {
            category: Category::Work,
            priority: Priority::High,
            sort: SortKey::Created,
            status: StatusFilter::All,
        };
        let command = Command::Add {
            text: "Plan sprint".into(),
            description: Some("  ".into()),
            category: None,
            priority: None,
            due: None,
            tags: Some("planning, , team".into()),
        };
        execute(command, &mut service, &defaults).unwrap_or_else(|err| panic!("add: {err:#}"));

        let task = &service.snapshot()[0];
        assert_eq!(task.category, Category::Work);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.description, None);
        assert_eq!(task.tags, vec!["planning", "team"]);
    }

    #[test]
    fn ls_prints_empty_state_then_table() {
        let mut service = service();
        assert_eq!(exec(&mut service, ls(OutputFormat::Table)), "No tasks added yet");

        exec(&mut service, add("Water plants"));
        let output = exec(&mut service, ls(OutputFormat::Table));
        assert!(output.contains("Water plants"));
        assert!(output.ends_with("Showing 1 of 1 tasks"));
    }

    #[test]
    fn ls_json_contains_view_and_stats() {
        let mut service = service();
        exec(&mut service, add("Stretch"));
        let output = exec(&mut service, ls(OutputFormat::Json));
        let value: serde_json::Value =
            serde_json::from_str(&output).unwrap_or_else(|err| panic!("json: {err}"));
        assert_eq!(value["summary"]["shown"], 1);
        assert_eq!(value["stats"]["total"], 1);
        assert_eq!(value["tasks"][0]["text"], "Stretch");
    }

    #[test]
    fn done_edit_and_rm_resolve_short_ids() {
        let mut service = service();
        exec(&mut service, add("Call mom"));
        let id = service.snapshot()[0].id;

        assert!(exec(&mut service, Command::Done { task: id.short() }).starts_with("completed"));
        assert!(exec(&mut service, Command::Done { task: id.short() }).starts_with("reopened"));

        let edit = Command::Edit {
            task: id.short(),
            text: Some("Call mum".into()),
            description: None,
            clear_description: false,
            category: Some(Category::Personal),
            priority: Some(Priority::Urgent),
            due: None,
            clear_due: true,
            tags: None,
        };
        exec(&mut service, edit);
        let task = &service.snapshot()[0];
        assert_eq!(task.text, "Call mum");
        assert_eq!(task.priority, Priority::Urgent);

        assert!(exec(&mut service, Command::Rm { task: id.to_string() }).contains("Call mum"));
        assert!(service.store().is_empty());
    }

    #[test]
    fn edit_without_changes_is_rejected() {
        let mut service = service();
        exec(&mut service, add("Untouched"));
        let before = service.snapshot();
        let id = before[0].id;

        let edit = Command::Edit {
            task: id.to_string(),
            text: None,
            description: None,
            clear_description: false,
            category: None,
            priority: None,
            due: None,
            clear_due: false,
            tags: None,
        };
        let Err(err) = execute(edit, &mut service, &DefaultsConfig::default()) else {
            panic!("empty edit must fail");
        };
        assert!(err.to_string().starts_with("nothing to update"));
        assert_eq!(service.snapshot(), before);
        assert_eq!(service.persistence().save_count(), 1);
    }

    #[test]
    fn unknown_task_reference_is_an_error() {
        let mut service = service();
        let result = execute(
            Command::Done {
                task: "deadbeef".into(),
            },
            &mut service,
            &DefaultsConfig::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn export_and_import_through_files() {
        let dir = tempdir().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let path = dir.path().join("export.json");
        let mut service = service();
        exec(&mut service, add("Portable task"));

        let message = exec(&mut service, Command::Export { output: Some(path.clone()) });
        assert!(message.starts_with("exported 1 task(s)"));

        let mut other = self::service();
        let summary = exec(&mut other, Command::Import { file: path });
        assert!(summary.starts_with("imported 1 task(s)"));
        assert_eq!(other.snapshot(), service.snapshot());
    }

    #[test]
    fn import_reports_skipped_records() {
        let dir = tempdir().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let path = dir.path().join("legacy.json");
        fs::write(&path, r#"[{ "text": "ok" }, { "text": "" }]"#).unwrap_or_else(|err| panic!("write: {err}"));

        let mut service = service();
        let summary = exec(&mut service, Command::Import { file: path });
        assert!(summary.contains("skipped record 1: task text must not be empty"));
    }

    #[test]
    fn clear_completed_reports_count() {
        let mut service = service();
        exec(&mut service, add("a"));
        exec(&mut service, add("b"));
        let id = service.snapshot()[0].id;
        exec(&mut service, Command::Done { task: id.to_string() });
        assert_eq!(exec(&mut service, Command::ClearCompleted), "removed 1 completed task(s)");
    }
}
