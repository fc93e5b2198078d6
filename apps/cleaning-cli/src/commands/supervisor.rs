use std::io::Write;

use super::{command_name, render, wrong_role, App};
use crate::cli::{Command, RecordFilters};
use crate::error::Result;
use crate::identity::Identity;
use crate::model::{InspectionQuery, NewInspection, NewTask, RecordQuery, Role, TaskQuery};

impl<W: Write> App<W> {
    pub(super) async fn run_supervisor(&mut self, me: &Identity, command: Command) -> Result<()> {
        match command {
            Command::Dashboard => {
                let summary = self.api.dashboard_summary().await?;
                self.lines(render::summary(&summary))
            }
            Command::Records(filters) => self.records(filters).await,
            Command::Record { id } => {
                let record = self.api.get_record(id).await?;
                self.lines(render::record_detail(&record))
            }
            Command::Report {
                cleaner_id,
                from,
                to,
            } => {
                let report = self
                    .api
                    .cleaner_report(cleaner_id, from.as_deref(), to.as_deref())
                    .await?;
                self.lines(render::report(&report))
            }
            Command::Inspect {
                record_id,
                result,
                comments,
            } => {
                let inspection = self
                    .api
                    .create_inspection(&NewInspection {
                        cleaning_id: record_id,
                        supervisor_id: me.id,
                        passed: result.passed(),
                        comments: comments.filter(|c| !c.trim().is_empty()),
                    })
                    .await?;
                self.line(format!("Inspection {} saved", inspection.id))
            }
            Command::Inspections {
                cleaner,
                result,
                from,
                to,
            } => {
                let rows = Self::or_empty(
                    self.api
                        .list_inspections(&InspectionQuery {
                            cleaner_id: cleaner,
                            result: result.map(|r| r.passed().to_string()),
                            start_date: from,
                            end_date: to,
                        })
                        .await,
                    "inspections",
                );
                if rows.is_empty() {
                    return self.line("No inspections");
                }
                self.lines(rows.iter().map(render::inspection_line))
            }
            Command::Assign {
                cleaner,
                content,
                title,
            } => {
                let task = self
                    .api
                    .create_task(&NewTask {
                        cleaner_id: cleaner,
                        supervisor_id: me.id,
                        content,
                        title,
                    })
                    .await?;
                self.line(format!("Task {} assigned", task.id))
            }
            Command::Tasks { status, cleaner } => {
                let tasks = Self::or_empty(
                    self.api
                        .list_tasks(&TaskQuery {
                            cleaner_id: cleaner,
                            status: status.map(|s| s.as_str().to_string()),
                            ..Default::default()
                        })
                        .await,
                    "tasks",
                );
                if tasks.is_empty() {
                    return self.line("No tasks");
                }
                self.lines(tasks.iter().map(|t| {
                    format!("{}  -> {}", render::task_line(t), t.cleaner_id)
                }))
            }
            Command::Breaks => {
                let rows = Self::or_empty(self.api.list_breaks().await, "breaks");
                if rows.is_empty() {
                    return self.line("No break assignments");
                }
                self.lines(rows.iter().map(render::break_line))
            }
            Command::SetBreak { user, time } => {
                let time = time.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
                let row = self.api.set_break(user, time.as_deref()).await?;
                match row.break_time {
                    Some(t) => self.line(format!("Break for {} set to {t}", row.user_id)),
                    None => self.line(format!("Break for {} cleared", row.user_id)),
                }
            }
            Command::Users { role } => {
                let users = Self::or_empty(self.api.list_users(role).await, "users");
                self.lines(
                    users
                        .iter()
                        .map(|u| format!("{:<20} {:<10} {}", u.name, u.role, u.id)),
                )
            }
            other => Err(wrong_role(command_name(&other), Role::Cleaner)),
        }
    }

    async fn records(&mut self, filters: RecordFilters) -> Result<()> {
        let rows = Self::or_empty(
            self.api
                .list_records(&RecordQuery {
                    user_id: filters.user,
                    terminal: filters.terminal,
                    cleaning_type: filters.cleaning_type,
                    ppu: filters.ppu,
                    start_date: filters.from,
                    end_date: filters.to,
                })
                .await,
            "records",
        );
        if rows.is_empty() {
            return self.line("No records");
        }
        self.lines(rows.iter().map(render::record_line))
    }
}
