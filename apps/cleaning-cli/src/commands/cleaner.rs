use std::io::Write;

use super::{command_name, read_photo, render, wrong_role, App};
use crate::cli::{Command, RecordFilters, RegisterArgs};
use crate::error::{ClientError, Result};
use crate::identity::Identity;
use crate::model::{RecordQuery, Registration, Role, TaskQuery};

impl<W: Write> App<W> {
    pub(super) async fn run_cleaner(&mut self, me: &Identity, command: Command) -> Result<()> {
        match command {
            Command::Records(filters) => self.own_records(me, filters).await,
            Command::Tasks { status, .. } => {
                let tasks = Self::or_empty(
                    self.api
                        .list_tasks(&TaskQuery {
                            cleaner_id: Some(me.id),
                            status: status.map(|s| s.as_str().to_string()),
                            ..Default::default()
                        })
                        .await,
                    "tasks",
                );
                let (done, pending): (Vec<_>, Vec<_>) = tasks.iter().partition(|t| t.is_done());
                self.line(format!("Pending ({})", pending.len()))?;
                self.lines(pending.iter().map(|t| format!("  {}", render::task_line(t))))?;
                self.line(format!("Done ({})", done.len()))?;
                self.lines(done.iter().map(|t| format!("  {}", render::task_line(t))))
            }
            Command::Done { task_id } => {
                let task = self.api.complete_task(task_id).await?;
                self.line(format!("Task {} marked done", task.id))
            }
            Command::Register(args) => self.register(me, args).await,
            Command::Break => {
                let assigned = self.api.get_break(me.id).await.unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "failed to load break assignment");
                    None
                });
                match assigned.and_then(|b| b.break_time) {
                    Some(time) => self.line(format!("Break: {time}")),
                    None => self.line("Break: not assigned"),
                }
            }
            other => Err(wrong_role(command_name(&other), Role::Supervisor)),
        }
    }

    async fn own_records(&mut self, me: &Identity, filters: RecordFilters) -> Result<()> {
        if filters.user.is_some_and(|u| u != me.id) {
            return Err(ClientError::Invalid(
                "cleaners can only list their own records".into(),
            ));
        }
        let rows = Self::or_empty(
            self.api
                .list_records(&RecordQuery {
                    user_id: Some(me.id),
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

    /// Uses the bus number last seen with this plate when none is given.
    async fn register(&mut self, me: &Identity, args: RegisterArgs) -> Result<()> {
        let ppu = args.ppu.trim().to_string();
        let bus_number = match args.bus_number.map(|b| b.trim().to_string()) {
            Some(b) if !b.is_empty() => b,
            _ => {
                let recent = Self::or_empty(self.api.recent_ppu(me.id).await, "recent plates");
                recent
                    .into_iter()
                    .find(|r| r.ppu.eq_ignore_ascii_case(&ppu))
                    .map(|r| r.bus_number)
                    .ok_or_else(|| {
                        ClientError::Invalid(format!(
                            "--bus-number is required: no earlier record for plate {ppu}"
                        ))
                    })?
            }
        };

        let image_front = match &args.front {
            Some(p) => Some(read_photo(p).await?),
            None => None,
        };
        let image_back = match &args.back {
            Some(p) => Some(read_photo(p).await?),
            None => None,
        };

        let record = self
            .api
            .create_record(Registration {
                user_id: me.id,
                ppu,
                bus_number,
                terminal: args.terminal,
                cleaning_type: args.cleaning_type,
                stickers_removed: args.stickers,
                graffiti_removed: args.graffiti,
                image_front,
                image_back,
            })
            .await?;
        self.line(format!(
            "Registered {} (bus {}) at {}: {}",
            record.ppu, record.bus_number, record.terminal, record.id
        ))
    }
}
