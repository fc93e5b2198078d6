use anyhow::anyhow;

use crate::contract::model::{BreakAssignment, CleaningRecord, Role, Task, TaskStatus, User};
use crate::infra::storage::entity::{break_assignment, cleaning_record, task, user};

pub fn parse_role(raw: &str) -> anyhow::Result<Role> {
    Role::parse(raw).ok_or_else(|| anyhow!("unknown role '{raw}' in users table"))
}

pub fn user_to_contract(m: user::Model) -> anyhow::Result<User> {
    Ok(User {
        id: m.id,
        role: parse_role(&m.role)?,
        name: m.name,
        created_at: m.created_at,
    })
}

pub fn record_to_contract(m: cleaning_record::Model) -> CleaningRecord {
    CleaningRecord {
        id: m.id,
        user_id: m.user_id,
        ppu: m.ppu,
        bus_number: m.bus_number,
        terminal: m.terminal,
        cleaning_type: m.cleaning_type,
        stickers_removed: m.stickers_removed,
        graffiti_removed: m.graffiti_removed,
        image_front_url: m.image_front_url,
        image_back_url: m.image_back_url,
        created_at: m.created_at,
    }
}

pub fn task_to_contract(m: task::Model) -> anyhow::Result<Task> {
    let status = TaskStatus::parse(&m.status)
        .ok_or_else(|| anyhow!("unknown status '{}' for task {}", m.status, m.id))?;
    Ok(Task {
        id: m.id,
        cleaner_id: m.cleaner_id,
        supervisor_id: m.supervisor_id,
        title: m.title,
        content: m.content,
        status,
        created_at: m.created_at,
        completed_at: m.completed_at,
    })
}

pub fn break_to_contract(m: break_assignment::Model) -> BreakAssignment {
    BreakAssignment {
        user_id: m.user_id,
        break_time: m.break_time,
        updated_at: m.updated_at,
    }
}
