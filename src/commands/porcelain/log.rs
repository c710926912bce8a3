use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use colored::Colorize;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    pub oneline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub oid: ObjectId,
    pub commit: Commit,
}

#[derive(Debug, Clone)]
pub struct History {
    pub entries: Vec<LogEntry>,
    options: LogOptions,
}

impl History {
    fn fmt_medium(entry: &LogEntry, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", format!("commit {}", entry.oid).yellow())?;
        writeln!(f, "Date:   {}", entry.commit.readable_timestamp())?;
        writeln!(f)?;
        for line in entry.commit.message().lines() {
            writeln!(f, "    {line}")?;
        }

        Ok(())
    }

    fn fmt_oneline(entry: &LogEntry, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} {}",
            entry.oid.to_short_oid().yellow(),
            entry.commit.short_message()
        )
    }
}

impl std::fmt::Display for History {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (position, entry) in self.entries.iter().enumerate() {
            if self.options.oneline {
                Self::fmt_oneline(entry, f)?;
            } else {
                if position > 0 {
                    writeln!(f)?;
                }
                Self::fmt_medium(entry, f)?;
            }
        }

        Ok(())
    }
}

impl Repository {
    /// Commits reachable from HEAD through first parents, newest first
    pub fn log(&self, options: LogOptions) -> Result<History> {
        let mut entries = Vec::new();
        let mut current = self.refs().resolve_head()?;

        while let Some(oid) = current {
            let commit = self.database().get_commit(&oid)?;
            current = commit.parent().cloned();
            entries.push(LogEntry { oid, commit });
        }

        Ok(History { entries, options })
    }
}
