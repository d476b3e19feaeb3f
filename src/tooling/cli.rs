//! CLI Tooling
//!
//! Command-line interface for menu synchronization. Pages are read from a JSON
//! export of the page tree; menus and sync state live in a workspace-scoped
//! sled database. Every command is safe to repeat.

use crate::bootstrap::{BootstrapController, BootstrapOutcome};
use crate::config::{ConfigLoader, MenuSyncConfig};
use crate::error::ApiError;
use crate::events::{EventAdapter, PageEvent};
use crate::identity::IdentityMap;
use crate::state::SyncState;
use crate::store::memory::MemoryPageSource;
use crate::store::persistence::{open_db, SledMenuStore, SledStateStore};
use crate::store::{MenuStore, StateStore};
use crate::sync::{FullSyncReport, SkipReason, SyncOutcome};
use crate::types::SourceId;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Menu Sync CLI - keep a navigation menu in step with the page tree
#[derive(Parser)]
#[command(name = "menu-sync")]
#[command(about = "Keep a navigation menu in sync with a page hierarchy")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Page lifecycle event kinds accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EventKind {
    Created,
    Updated,
    Published,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the synced menu from the published pages if it does not exist
    Bootstrap {
        /// JSON file listing all pages
        #[arg(long)]
        pages: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Apply a single page lifecycle event
    Event {
        /// Event kind
        #[arg(value_enum)]
        kind: EventKind,
        /// JSON file listing all pages
        #[arg(long)]
        pages: PathBuf,
        /// Id of the page the event is about
        #[arg(long)]
        page: SourceId,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Re-run a full sync against the existing menu
    Resync {
        /// JSON file listing all pages
        #[arg(long)]
        pages: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the page -> menu item identity map
    Map {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show the synced menu and its items
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// CLI context for managing workspace state
pub struct CliContext {
    config: MenuSyncConfig,
    db: sled::Db,
    menus: Arc<SledMenuStore>,
    state: Arc<SledStateStore>,
}

impl CliContext {
    /// Create a new CLI context
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match &config_path {
            Some(cfg_path) => ConfigLoader::load_from_file(cfg_path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        let store_path = config.storage.resolve_path(&workspace_root)?;
        Self::with_store_path(config, &store_path)
    }

    /// Create a context over an explicit store path
    pub fn with_store_path(config: MenuSyncConfig, store_path: &Path) -> Result<Self, ApiError> {
        let db = open_db(store_path)?;
        let menus = Arc::new(SledMenuStore::from_db(db.clone())?);
        let state = Arc::new(SledStateStore::from_db(&db)?);
        Ok(Self {
            config,
            db,
            menus,
            state,
        })
    }

    pub fn config(&self) -> &MenuSyncConfig {
        &self.config
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let output = match command {
            Commands::Bootstrap { pages, format } => self.handle_bootstrap(pages, format)?,
            Commands::Event {
                kind,
                pages,
                page,
                format,
            } => self.handle_event(*kind, pages, *page, format)?,
            Commands::Resync { pages, format } => self.handle_resync(pages, format)?,
            Commands::Map { format } => return self.handle_map(format),
            Commands::Status { format } => return self.handle_status(format),
        };
        self.db.flush().map_err(crate::error::StorageError::from)?;
        Ok(output)
    }

    fn load_pages(&self, path: &Path) -> Result<Arc<MemoryPageSource>, ApiError> {
        Ok(Arc::new(MemoryPageSource::from_json_file(
            path,
            self.config.source.order,
        )?))
    }

    fn controller(&self, pages: Arc<MemoryPageSource>) -> BootstrapController {
        BootstrapController::new(
            self.config.menu.name.clone(),
            self.menus.clone(),
            pages,
            self.state.clone(),
            self.config.menu.state_keys(),
        )
    }

    fn handle_bootstrap(&self, pages: &Path, format: &str) -> Result<String, ApiError> {
        let controller = self.controller(self.load_pages(pages)?);
        let outcome = controller.ensure_structure_exists()?;
        info!(structure_id = outcome.structure_id(), "Bootstrap finished");

        let (action, report) = match &outcome {
            BootstrapOutcome::AlreadyExists(_) => ("exists", None),
            BootstrapOutcome::Created { report, .. } => ("created", Some(report)),
            BootstrapOutcome::Repaired { report, .. } => ("repaired", Some(report)),
        };
        if format == "json" {
            return to_json(&json!({
                "menu": controller.menu_name(),
                "structure_id": outcome.structure_id(),
                "created": matches!(outcome, BootstrapOutcome::Created { .. }),
                "action": action,
                "report": report.map(report_json),
            }));
        }
        Ok(match report {
            None => format!(
                "Menu '{}' already exists (id {})",
                controller.menu_name(),
                outcome.structure_id()
            ),
            Some(report) => format!(
                "{} menu '{}' (id {})\n{}",
                if action == "created" { "Created" } else { "Repaired" },
                controller.menu_name(),
                outcome.structure_id(),
                format_report_text(report)
            ),
        })
    }

    fn handle_event(
        &self,
        kind: EventKind,
        pages: &Path,
        page_id: SourceId,
        format: &str,
    ) -> Result<String, ApiError> {
        let source = self.load_pages(pages)?;
        let node = source.page(page_id).ok_or(ApiError::PageNotFound(page_id))?;
        let event = match kind {
            EventKind::Created => PageEvent::Created(node),
            EventKind::Updated => PageEvent::Updated(node),
            EventKind::Published => PageEvent::Published(node),
        };

        let adapter = EventAdapter::new(
            self.menus.clone(),
            self.state.clone(),
            source,
            self.config.menu.state_keys(),
        );
        let outcome = adapter.handle(&event)?;
        if format == "json" {
            return to_json(&outcome_json(page_id, &outcome));
        }
        Ok(match outcome {
            SyncOutcome::Created { item_id, parent } => format!(
                "Page {} -> new menu item {}{}",
                page_id,
                item_id,
                format_parent(parent)
            ),
            SyncOutcome::Relinked { item_id, parent } => format!(
                "Page {} -> menu item {} relinked{}",
                page_id,
                item_id,
                format_parent(parent)
            ),
            SyncOutcome::Skipped(reason) => format!("Page {} skipped: {:?}", page_id, reason),
        })
    }

    fn handle_resync(&self, pages: &Path, format: &str) -> Result<String, ApiError> {
        let controller = self.controller(self.load_pages(pages)?);
        let Some(report) = controller.resync()? else {
            return Ok("Nothing to resync: run bootstrap first".to_string());
        };
        if format == "json" {
            to_json(&report_json(&report))
        } else {
            Ok(format_report_text(&report))
        }
    }

    fn load_state(&self) -> Result<SyncState, ApiError> {
        let keys = self.config.menu.state_keys();
        Ok(SyncState::load(self.state.as_ref() as &dyn StateStore, &keys)?)
    }

    fn handle_map(&self, format: &str) -> Result<String, ApiError> {
        let map = self.load_state()?.identity_map.unwrap_or_default();
        if format == "json" {
            let bytes = map.serialize()?;
            return Ok(String::from_utf8_lossy(&bytes).into_owned());
        }
        Ok(format_map_text(&map))
    }

    fn handle_status(&self, format: &str) -> Result<String, ApiError> {
        let loaded = self.load_state()?;
        let items = match loaded.structure_id {
            Some(id) => self.menus.items(id)?,
            None => Vec::new(),
        };
        let mapped = loaded.identity_map.as_ref().map(|m| m.len()).unwrap_or(0);
        // items no page maps to, e.g. left over from a reseeded map
        let unmapped: Vec<u64> = match &loaded.identity_map {
            Some(map) => items
                .iter()
                .filter(|item| map.reverse_lookup(item.id).is_none())
                .map(|item| item.id)
                .collect(),
            None => items.iter().map(|item| item.id).collect(),
        };

        if format == "json" {
            return to_json(&json!({
                "menu": self.config.menu.name,
                "structure_id": loaded.structure_id,
                "mapped_pages": mapped,
                "items": items,
                "unmapped_items": unmapped,
            }));
        }

        let Some(structure_id) = loaded.structure_id else {
            return Ok(format!("Menu '{}' has not been created", self.config.menu.name));
        };
        let mut lines = vec![
            format!("Menu: {} (id {})", self.config.menu.name, structure_id),
            format!("Mapped pages: {}", mapped),
            format!("Items: {}", items.len()),
        ];
        if !unmapped.is_empty() {
            let ids: Vec<String> = unmapped.iter().map(|id| id.to_string()).collect();
            lines.push(format!("Unmapped items: {}", ids.join(", ")));
        }
        for item in &items {
            lines.push(format!(
                "  #{} '{}' page={} parent={} position={}",
                item.id,
                item.title,
                item.object_ref,
                item.parent_id
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                item.position
            ));
        }
        Ok(lines.join("\n"))
    }
}

fn to_json(value: &serde_json::Value) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::StorageError(crate::error::StorageError::Codec(e.to_string())))
}

fn report_json(report: &FullSyncReport) -> serde_json::Value {
    json!({
        "created": report.created,
        "updated": report.updated,
        "skipped": report.skipped,
        "unresolved_parents": report.unresolved_parents,
        "missing_items": report.missing_items,
        "mapped_pages": report.identity_map.len(),
    })
}

fn outcome_json(page_id: SourceId, outcome: &SyncOutcome) -> serde_json::Value {
    match outcome {
        SyncOutcome::Created { item_id, parent } => json!({
            "page_id": page_id,
            "outcome": "created",
            "item_id": item_id,
            "parent": parent,
        }),
        SyncOutcome::Relinked { item_id, parent } => json!({
            "page_id": page_id,
            "outcome": "relinked",
            "item_id": item_id,
            "parent": parent,
        }),
        SyncOutcome::Skipped(reason) => {
            let item_id = match reason {
                SkipReason::MissingItem(id) => Some(*id),
                _ => None,
            };
            json!({
                "page_id": page_id,
                "outcome": "skipped",
                "reason": reason.as_str(),
                "item_id": item_id,
            })
        }
    }
}

fn format_report_text(report: &FullSyncReport) -> String {
    let mut text = format!(
        "Items created: {}\nItems updated: {}\nPages skipped: {}\nMapped pages: {}",
        report.created,
        report.updated,
        report.skipped,
        report.identity_map.len()
    );
    if !report.unresolved_parents.is_empty() {
        let ids: Vec<String> = report
            .unresolved_parents
            .iter()
            .map(|id| id.to_string())
            .collect();
        text.push_str(&format!("\nUnparented (parent not synced yet): {}", ids.join(", ")));
    }
    if !report.missing_items.is_empty() {
        let ids: Vec<String> = report.missing_items.iter().map(|id| id.to_string()).collect();
        text.push_str(&format!("\nMapped item missing: {}", ids.join(", ")));
    }
    text
}

fn format_map_text(map: &IdentityMap) -> String {
    if map.is_empty() {
        return "Identity map is empty".to_string();
    }
    map.iter()
        .map(|(page, item)| format!("page {} -> item {}", page, item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_parent(parent: Option<crate::types::DerivedId>) -> String {
    match parent {
        Some(parent) => format!(" (parent item {})", parent),
        None => " (no parent)".to_string(),
    }
}
