//! Host-side collaborators backed by a static JSON roster file.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use vote_engine::prelude::*;

use crate::log::{log, LogType, CLI};

macro_rules! load {
    ( $path: expr ) => {
        match crate::hosting::load_from($path) {
            Ok(value) => value,
            Err(err) => match err.kind() {
                std::io::ErrorKind::NotFound => Default::default(),
                _ => panic!("Error loading {}: {}", $path.display(), err),
            },
        }
    };
}

pub(crate) use load;

#[derive(Serialize, Deserialize)]
pub struct HostConfig {
    pub service_identity: UserId,
    pub communities: Vec<CommunityEntry>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            service_identity: UserId(0),
            communities: Vec::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct CommunityEntry {
    pub id: CommunityId,
    pub name: String,
    #[serde(default)]
    pub protected: Vec<UserId>,
    #[serde(default)]
    pub moderators: Vec<UserId>,
    /// Members allowed to start votes. `None` opens initiation to everyone.
    #[serde(default)]
    pub eligible: Option<Vec<UserId>>,
    #[serde(default)]
    pub settings: SessionConfig,
}

pub fn save_into<T: Serialize>(value: &T, path: impl AsRef<Path>) -> std::io::Result<()> {
    let file = std::io::BufWriter::new(std::fs::File::create(path)?);
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}

pub fn load_from<T: serde::de::DeserializeOwned>(
    path: impl AsRef<Path>,
) -> std::io::Result<T> {
    let file = std::io::BufReader::new(std::fs::File::open(path)?);
    Ok(serde_json::from_reader(file)?)
}

/// Eligibility answers read off the roster file. Unknown communities
/// refuse everything.
pub struct StaticRoster {
    communities: HashMap<CommunityId, CommunityEntry>,
}

impl StaticRoster {
    pub fn new(config: &HostConfig) -> Self {
        Self {
            communities: config
                .communities
                .iter()
                .map(|entry| (entry.id, entry.clone()))
                .collect(),
        }
    }
}

#[async_trait]
impl EligibilityChecker for StaticRoster {
    async fn is_protected(&self, community: CommunityId, target: UserId) -> bool {
        self.communities
            .get(&community)
            .is_some_and(|entry| entry.protected.contains(&target))
    }

    async fn is_eligible(
        &self,
        community: CommunityId,
        initiator: UserId,
        _target: UserId,
    ) -> bool {
        match self.communities.get(&community) {
            Some(entry) => entry
                .eligible
                .as_ref()
                .map_or(true, |members| members.contains(&initiator)),
            None => false,
        }
    }

    async fn is_moderator(&self, community: CommunityId, user: UserId) -> bool {
        self.communities
            .get(&community)
            .is_some_and(|entry| entry.moderators.contains(&user))
    }
}

/// Per-community settings from the roster file; defaults for communities
/// the file does not know.
pub struct FileSettings {
    settings: HashMap<CommunityId, SessionConfig>,
}

impl FileSettings {
    pub fn new(config: &HostConfig) -> Self {
        Self {
            settings: config
                .communities
                .iter()
                .map(|entry| (entry.id, entry.settings.clone()))
                .collect(),
        }
    }
}

#[async_trait]
impl SettingsProvider for FileSettings {
    async fn get_config(&self, community: CommunityId) -> SessionConfig {
        self.settings.get(&community).cloned().unwrap_or_default()
    }
}

/// Prints the punishment instead of performing it. The console host has
/// no community platform behind it.
pub struct ConsoleActuator {
    cli: CLI,
}

impl ConsoleActuator {
    pub fn new(cli: CLI) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl PunishmentActuator for ConsoleActuator {
    async fn apply(
        &self,
        community: CommunityId,
        target: UserId,
        kind: PunishmentKind,
        reason: &str,
    ) -> Result<(), ActuatorError> {
        log(
            &self.cli,
            LogType::Action,
            &format!("{} {} in {}: {}", kind, target, community, reason),
        );
        Ok(())
    }
}

pub struct ConsoleSink {
    cli: CLI,
}

impl ConsoleSink {
    pub fn new(cli: CLI) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl NotificationSink for ConsoleSink {
    async fn publish(&self, summary: &SessionSummary) {
        let initiator = match summary.initiator {
            Some(user) => format!("started by {}", user),
            None => "anonymous".to_owned(),
        };
        let mut message = format!(
            "vote to {} {} in {} ({}): {} with {} yes / {} no / {} abstain",
            summary.punishment,
            summary.target,
            summary.community,
            initiator,
            summary.outcome,
            summary.counts.yes,
            summary.counts.no,
            summary.counts.abstain,
        );
        if let Some(ExecutionReport::Failed { error }) = &summary.execution {
            message.push_str(&format!("; action failed: {}", error));
        }
        log(&self.cli, LogType::Vote, &message);
    }
}

/// Appends one JSON line per passed vote.
pub struct JsonlAuditLog {
    file: Mutex<std::fs::File>,
}

impl JsonlAuditLog {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

#[async_trait]
impl AuditLog for JsonlAuditLog {
    async fn record_case(&self, summary: &SessionSummary, reason: &str) {
        let line = serde_json::json!({
            "case": summary,
            "detail": reason,
        });
        let mut file = self.file.lock().unwrap();
        writeln!(file, "{}", line).expect("Could not append to the audit log");
    }
}

pub fn build_engine(
    config: &HostConfig,
    cli: &CLI,
    audit: Option<Arc<dyn AuditLog>>,
) -> VoteEngine {
    VoteEngine::new(
        Arc::new(StaticRoster::new(config)),
        Arc::new(FileSettings::new(config)),
        Arc::new(ConsoleActuator::new(Arc::clone(cli))),
        Arc::new(ConsoleSink::new(Arc::clone(cli))),
        audit,
        config.service_identity,
    )
}
