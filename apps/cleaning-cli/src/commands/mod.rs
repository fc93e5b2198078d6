//! Command dispatch behind the identity gate.

use std::io::Write;
use std::path::Path;

use crate::cli::Command;
use crate::client::ApiClient;
use crate::error::{ClientError, Result};
use crate::identity::{Identity, IdentityStore};
use crate::model::{Photo, Role};

mod cleaner;
mod render;
mod supervisor;

pub struct App<W> {
    api: ApiClient,
    identity: IdentityStore,
    out: W,
}

impl<W: Write> App<W> {
    pub fn new(api: ApiClient, identity: IdentityStore, out: W) -> Self {
        Self { api, identity, out }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub async fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Login { name, role } => self.login(&name, role).await,
            Command::SwitchUser => self.switch_user(),
            Command::Whoami => {
                let me = self.identity.require()?;
                self.line(format!("{} ({}) {}", me.name, me.role, me.id))
            }
            other => {
                let me = self.identity.require()?;
                match me.role {
                    Role::Cleaner => self.run_cleaner(&me, other).await,
                    Role::Supervisor => self.run_supervisor(&me, other).await,
                }
            }
        }
    }

    async fn login(&mut self, name: &str, role: Role) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClientError::Invalid("name must not be empty".into()));
        }
        let user = self.api.create_user(name, role).await?;
        if user.role != role {
            tracing::warn!(requested = %role, actual = %user.role, "user exists with another role");
        }
        let me = Identity::from(user);
        self.identity.save(&me)?;
        tracing::info!(user_id = %me.id, path = %self.identity.path().display(), "identity cached");
        self.line(format!("Logged in as {} ({})", me.name, me.role))
    }

    fn switch_user(&mut self) -> Result<()> {
        if self.identity.clear()? {
            self.line("Logged out")
        } else {
            self.line("No cached identity")
        }
    }

    fn lines(&mut self, lines: impl IntoIterator<Item = String>) -> Result<()> {
        lines.into_iter().try_for_each(|l| self.line(l))
    }

    fn line(&mut self, text: impl AsRef<str>) -> Result<()> {
        writeln!(self.out, "{}", text.as_ref()).map_err(ClientError::Output)
    }

    /// Lists degrade to empty when the fetch fails.
    fn or_empty<T>(result: Result<Vec<T>>, what: &str) -> Vec<T> {
        result.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load {what}; showing an empty list");
            Vec::new()
        })
    }
}

fn wrong_role(command: &'static str, role: Role) -> ClientError {
    ClientError::WrongRole { command, role }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Login { .. } => "login",
        Command::SwitchUser => "switch-user",
        Command::Whoami => "whoami",
        Command::Records(_) => "records",
        Command::Record { .. } => "record",
        Command::Register(_) => "register",
        Command::Tasks { .. } => "tasks",
        Command::Done { .. } => "done",
        Command::Assign { .. } => "assign",
        Command::Break => "break",
        Command::Breaks => "breaks",
        Command::SetBreak { .. } => "set-break",
        Command::Inspect { .. } => "inspect",
        Command::Inspections { .. } => "inspections",
        Command::Dashboard => "dashboard",
        Command::Report { .. } => "report",
        Command::Users { .. } => "users",
    }
}

/// Read a photo from disk; the content type follows the extension.
async fn read_photo(path: &Path) -> Result<Photo> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ClientError::File {
            path: path.to_path_buf(),
            source,
        })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".to_string());
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let content_type = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    };
    Ok(Photo {
        file_name,
        content_type,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn photos_take_their_type_from_the_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Front.JPG");
        std::fs::write(&path, b"jpeg").unwrap();

        let photo = read_photo(&path).await.unwrap();
        assert_eq!(photo.file_name, "Front.JPG");
        assert_eq!(photo.content_type, "image/jpeg");
        assert_eq!(photo.bytes, b"jpeg");

        let missing = read_photo(&dir.path().join("nope.png")).await.unwrap_err();
        assert!(matches!(missing, ClientError::File { .. }));
    }
}
