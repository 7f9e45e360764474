use auc_api::{ApiError, UploadPayload};
use auc_core::push_wire::PushEvent;
use auc_core::{
    ActivityEntry, CacheStats, CollectorRecord, CollectorUpdate, ContentRecord, DashboardStats,
    LogEntry,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::TableState;
use std::path::Path;
use tracing::{debug, warn};

use crate::push::{PushSignal, PushSignalKind};

pub const NOTICE_TTL_SECS: i64 = 5;
pub const LOG_LEVELS: [&str; 4] = ["ERROR", "WARN", "INFO", "DEBUG"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Dashboard,
    Collectors,
    Content,
    Cache,
    Logs,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Dashboard,
        Section::Collectors,
        Section::Content,
        Section::Cache,
        Section::Logs,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::Collectors => "Collectors",
            Section::Content => "Content",
            Section::Cache => "Cache",
            Section::Logs => "Logs",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Section::Dashboard => Section::Collectors,
            Section::Collectors => Section::Content,
            Section::Content => Section::Cache,
            Section::Cache => Section::Logs,
            Section::Logs => Section::Dashboard,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Section::Dashboard => Section::Logs,
            Section::Collectors => Section::Dashboard,
            Section::Content => Section::Collectors,
            Section::Cache => Section::Content,
            Section::Logs => Section::Cache,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

impl ConnectionState {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "online",
            ConnectionState::Closed => "offline",
        }
    }
}

/// One pull request the main loop should spawn. Loads are queued by the
/// section controller, the refresh ticker, and completed actions; the loop
/// drains the queue every iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadRequest {
    DashboardStats,
    RecentActivity,
    Collectors,
    Content,
    CacheStats,
    Logs,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AdminAction {
    RunCollector(String),
    EnableCollector(String),
    DisableCollector(String),
    ClearCache,
    Upload(UploadRequest),
}

impl AdminAction {
    pub fn owning_section(&self) -> Section {
        match self {
            AdminAction::RunCollector(_)
            | AdminAction::EnableCollector(_)
            | AdminAction::DisableCollector(_) => Section::Collectors,
            AdminAction::ClearCache => Section::Cache,
            AdminAction::Upload(_) => Section::Content,
        }
    }

    pub fn success_text(&self) -> String {
        match self {
            AdminAction::RunCollector(name) => format!("collector {name} started"),
            AdminAction::EnableCollector(name) => format!("collector {name} enabled"),
            AdminAction::DisableCollector(name) => format!("collector {name} disabled"),
            AdminAction::ClearCache => "cache cleared".to_string(),
            AdminAction::Upload(_) => "content uploaded".to_string(),
        }
    }

    pub fn failure_text(&self) -> String {
        match self {
            AdminAction::RunCollector(name) => format!("failed to start collector {name}"),
            AdminAction::EnableCollector(name) => format!("failed to enable collector {name}"),
            AdminAction::DisableCollector(name) => format!("failed to disable collector {name}"),
            AdminAction::ClearCache => "failed to clear cache".to_string(),
            AdminAction::Upload(_) => "failed to upload content".to_string(),
        }
    }
}

/// Validated upload command. The file is read by the action task, not here.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadRequest {
    pub file_path: String,
    pub content_type: String,
    pub country_code: String,
    pub region_code: Option<String>,
    pub tags: String,
    pub priority: String,
}

impl UploadRequest {
    pub fn file_name(&self) -> String {
        Path::new(&self.file_path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file_path.clone())
    }

    pub fn into_payload(self, bytes: Vec<u8>) -> UploadPayload {
        let file_name = self.file_name();
        UploadPayload {
            file_name,
            bytes,
            content_type: self.content_type,
            country_code: self.country_code,
            region_code: self.region_code,
            tags: self.tags,
            priority: self.priority,
        }
    }
}

/// Completion of a spawned request, folded back into the app on the main
/// loop. Every successful pull replaces its section's snapshot wholesale.
#[derive(Debug)]
pub enum NetOutcome {
    DashboardStats(Result<DashboardStats, ApiError>),
    RecentActivity(Result<Vec<ActivityEntry>, ApiError>),
    Collectors(Result<Vec<CollectorRecord>, ApiError>),
    Content(Result<Vec<ContentRecord>, ApiError>),
    CacheStats(Result<CacheStats, ApiError>),
    Logs(Result<Vec<LogEntry>, ApiError>),
    Action {
        action: AdminAction,
        result: Result<(), ApiError>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Clone, Debug)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub raised_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Overlay {
    None,
    Help,
    ConfirmClearCache,
    Upload(UploadForm),
}

pub const UPLOAD_FIELDS: [&str; 6] = [
    "file path",
    "content type",
    "country code",
    "region code",
    "tags",
    "priority",
];

#[derive(Clone, Debug, PartialEq)]
pub struct UploadForm {
    pub file_path: String,
    pub content_type: String,
    pub country_code: String,
    pub region_code: String,
    pub tags: String,
    pub priority: String,
    pub focus: usize,
}

impl UploadForm {
    pub fn new() -> Self {
        Self {
            file_path: String::new(),
            content_type: String::new(),
            country_code: String::new(),
            region_code: String::new(),
            tags: String::new(),
            priority: "NORMAL".to_string(),
            focus: 0,
        }
    }

    pub fn field(&self, index: usize) -> &str {
        match index {
            0 => &self.file_path,
            1 => &self.content_type,
            2 => &self.country_code,
            3 => &self.region_code,
            4 => &self.tags,
            _ => &self.priority,
        }
    }

    fn field_mut(&mut self, index: usize) -> &mut String {
        match index {
            0 => &mut self.file_path,
            1 => &mut self.content_type,
            2 => &mut self.country_code,
            3 => &mut self.region_code,
            4 => &mut self.tags,
            _ => &mut self.priority,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % UPLOAD_FIELDS.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + UPLOAD_FIELDS.len() - 1) % UPLOAD_FIELDS.len();
    }

    pub fn push_char(&mut self, c: char) {
        self.field_mut(self.focus).push(c);
    }

    pub fn pop_char(&mut self) {
        self.field_mut(self.focus).pop();
    }

    /// File path, content type, country code, and priority are required;
    /// region and tags may stay empty.
    pub fn validate(&self) -> Result<UploadRequest, String> {
        for (value, label) in [
            (&self.file_path, "file path"),
            (&self.content_type, "content type"),
            (&self.country_code, "country code"),
            (&self.priority, "priority"),
        ] {
            if value.trim().is_empty() {
                return Err(format!("missing required field: {label}"));
            }
        }
        let region = self.region_code.trim();
        Ok(UploadRequest {
            file_path: self.file_path.trim().to_string(),
            content_type: self.content_type.trim().to_string(),
            country_code: self.country_code.trim().to_string(),
            region_code: (!region.is_empty()).then(|| region.to_string()),
            tags: self.tags.trim().to_string(),
            priority: self.priority.trim().to_string(),
        })
    }
}

pub struct App {
    pub active_section: Section,
    pub connection: ConnectionState,
    push_generation: u64,
    pub stats: DashboardStats,
    pub activity: Vec<ActivityEntry>,
    pub collectors: Vec<CollectorRecord>,
    pub contents: Vec<ContentRecord>,
    pub cache: CacheStats,
    pub logs: Vec<LogEntry>,
    pub log_level: String,
    pub log_limit: usize,
    pub selected_collector: usize,
    pub selected_content: usize,
    pub collectors_table: TableState,
    pub content_table: TableState,
    pub overlay: Overlay,
    pub notices: Vec<Notice>,
    pub queued_loads: Vec<LoadRequest>,
    pub queued_actions: Vec<AdminAction>,
    pub should_quit: bool,
}

impl App {
    pub fn new(log_level: String, log_limit: usize) -> Self {
        Self {
            active_section: Section::Dashboard,
            connection: ConnectionState::Connecting,
            push_generation: 0,
            stats: DashboardStats::default(),
            activity: Vec::new(),
            collectors: Vec::new(),
            contents: Vec::new(),
            cache: CacheStats::default(),
            logs: Vec::new(),
            log_level,
            log_limit,
            selected_collector: 0,
            selected_content: 0,
            collectors_table: TableState::default(),
            content_table: TableState::default(),
            overlay: Overlay::None,
            notices: Vec::new(),
            queued_loads: Vec::new(),
            queued_actions: Vec::new(),
            should_quit: false,
        }
    }

    /// Make `section` the single active section and queue its load. Nothing
    /// in flight is cancelled; late completions still replace their own
    /// snapshot.
    pub fn activate(&mut self, section: Section) {
        self.active_section = section;
        self.queue_section_loads(section);
    }

    pub fn queue_section_loads(&mut self, section: Section) {
        match section {
            Section::Dashboard => {
                self.queued_loads.push(LoadRequest::DashboardStats);
                self.queued_loads.push(LoadRequest::RecentActivity);
            }
            Section::Collectors => self.queued_loads.push(LoadRequest::Collectors),
            Section::Content => self.queued_loads.push(LoadRequest::Content),
            Section::Cache => self.queued_loads.push(LoadRequest::CacheStats),
            Section::Logs => self.queued_loads.push(LoadRequest::Logs),
        }
    }

    /// Periodic refresh, gated to the dashboard only.
    pub fn on_refresh_tick(&mut self) {
        if self.active_section == Section::Dashboard {
            self.queue_section_loads(Section::Dashboard);
        }
    }

    pub fn take_queued_loads(&mut self) -> Vec<LoadRequest> {
        std::mem::take(&mut self.queued_loads)
    }

    pub fn take_queued_actions(&mut self) -> Vec<AdminAction> {
        std::mem::take(&mut self.queued_actions)
    }

    pub fn apply_push_signal(&mut self, signal: PushSignal) {
        if signal.generation < self.push_generation {
            // Stray callback from a superseded connection.
            debug!(
                "push_signal_stale: generation={} current={}",
                signal.generation, self.push_generation
            );
            return;
        }
        self.push_generation = signal.generation;
        match signal.kind {
            PushSignalKind::Opened => self.connection = ConnectionState::Open,
            PushSignalKind::Closed => self.connection = ConnectionState::Closed,
            PushSignalKind::Event(event) => self.apply_push_event(event),
        }
    }

    fn apply_push_event(&mut self, event: PushEvent) {
        match event {
            PushEvent::CollectorUpdate(update) => self.merge_collector_update(update),
            PushEvent::NewLog(entry) => {
                self.logs.push(entry);
                let cap = self.log_limit.max(1);
                if self.logs.len() > cap {
                    let overflow = self.logs.len() - cap;
                    self.logs.drain(..overflow);
                }
            }
            PushEvent::StatsUpdate(patch) => self.stats.merge(patch),
        }
    }

    fn merge_collector_update(&mut self, update: CollectorUpdate) {
        let Some(record) = self
            .collectors
            .iter_mut()
            .find(|record| record.name == update.collector_name)
        else {
            // Snapshot does not know this collector yet; the next pull will.
            debug!("collector_update_unknown: {}", update.collector_name);
            return;
        };
        record.status = update.status;
        if update.message.is_some() {
            record.message = update.message;
        }
    }

    pub fn apply_net_outcome(&mut self, outcome: NetOutcome) {
        match outcome {
            NetOutcome::DashboardStats(Ok(stats)) => self.stats = stats,
            NetOutcome::DashboardStats(Err(err)) => {
                // Background dashboard refreshes fail quietly.
                warn!("dashboard_stats_error: {err}");
            }
            NetOutcome::RecentActivity(Ok(activity)) => self.activity = activity,
            NetOutcome::RecentActivity(Err(err)) => {
                warn!("recent_activity_error: {err}");
            }
            NetOutcome::Collectors(Ok(collectors)) => {
                self.collectors = collectors;
                self.selected_collector = self
                    .selected_collector
                    .min(self.collectors.len().saturating_sub(1));
            }
            NetOutcome::Collectors(Err(err)) => {
                warn!("collectors_error: {err}");
                self.push_notice(NoticeKind::Error, "failed to load collectors".to_string());
            }
            NetOutcome::Content(Ok(contents)) => {
                self.contents = contents;
                self.selected_content = self
                    .selected_content
                    .min(self.contents.len().saturating_sub(1));
            }
            NetOutcome::Content(Err(err)) => {
                warn!("content_error: {err}");
                self.push_notice(NoticeKind::Error, "failed to load content".to_string());
            }
            NetOutcome::CacheStats(Ok(cache)) => self.cache = cache,
            NetOutcome::CacheStats(Err(err)) => {
                warn!("cache_stats_error: {err}");
                self.push_notice(NoticeKind::Error, "failed to load cache stats".to_string());
            }
            NetOutcome::Logs(Ok(logs)) => self.logs = logs,
            NetOutcome::Logs(Err(err)) => {
                warn!("logs_error: {err}");
                self.push_notice(NoticeKind::Error, "failed to load logs".to_string());
            }
            NetOutcome::Action { action, result } => match result {
                Ok(()) => {
                    self.push_notice(NoticeKind::Success, action.success_text());
                    self.queue_section_loads(action.owning_section());
                }
                Err(err) => {
                    warn!("action_error: {err}");
                    self.push_notice(NoticeKind::Error, action.failure_text());
                }
            },
        }
    }

    pub fn push_notice(&mut self, kind: NoticeKind, text: String) {
        self.notices.push(Notice {
            kind,
            text,
            raised_at: Utc::now(),
        });
    }

    pub fn prune_notices(&mut self, now: DateTime<Utc>) {
        let ttl = ChronoDuration::seconds(NOTICE_TTL_SECS);
        self.notices
            .retain(|notice| now.signed_duration_since(notice.raised_at) < ttl);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.overlay {
            Overlay::Help => {
                if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
                    self.overlay = Overlay::None;
                }
                return;
            }
            Overlay::ConfirmClearCache => {
                self.handle_confirm_key(key);
                return;
            }
            Overlay::Upload(_) => {
                self.handle_upload_key(key);
                return;
            }
            Overlay::None => {}
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.overlay = Overlay::Help,
            KeyCode::Char('1') => self.activate(Section::Dashboard),
            KeyCode::Char('2') => self.activate(Section::Collectors),
            KeyCode::Char('3') => self.activate(Section::Content),
            KeyCode::Char('4') => self.activate(Section::Cache),
            KeyCode::Char('5') => self.activate(Section::Logs),
            KeyCode::Tab | KeyCode::Right => self.activate(self.active_section.next()),
            KeyCode::BackTab | KeyCode::Left => self.activate(self.active_section.prev()),
            KeyCode::Char('r') => self.queue_section_loads(self.active_section),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Enter => self.run_selected_collector(),
            KeyCode::Char('e') => self.toggle_selected_collector(),
            KeyCode::Char('c') => {
                if self.active_section == Section::Cache {
                    self.overlay = Overlay::ConfirmClearCache;
                }
            }
            KeyCode::Char('u') => {
                if self.active_section == Section::Content {
                    self.overlay = Overlay::Upload(UploadForm::new());
                }
            }
            KeyCode::Char('f') => {
                if self.active_section == Section::Logs {
                    self.cycle_log_level();
                    self.queued_loads.push(LoadRequest::Logs);
                }
            }
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.queued_actions.push(AdminAction::ClearCache);
                self.overlay = Overlay::None;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                // Declined: silent no-op.
                self.overlay = Overlay::None;
            }
            _ => {}
        }
    }

    fn handle_upload_key(&mut self, key: KeyEvent) {
        let Overlay::Upload(form) = &mut self.overlay else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.overlay = Overlay::None,
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Backspace => form.pop_char(),
            KeyCode::Char(c) => form.push_char(c),
            KeyCode::Enter => match form.validate() {
                Ok(request) => {
                    self.queued_actions.push(AdminAction::Upload(request));
                    self.overlay = Overlay::None;
                }
                Err(text) => self.push_notice(NoticeKind::Error, text),
            },
            _ => {}
        }
    }

    fn move_selection(&mut self, delta: i64) {
        let (selected, len) = match self.active_section {
            Section::Collectors => (&mut self.selected_collector, self.collectors.len()),
            Section::Content => (&mut self.selected_content, self.contents.len()),
            _ => return,
        };
        if len == 0 {
            *selected = 0;
            return;
        }
        let next = (*selected as i64 + delta).clamp(0, len as i64 - 1);
        *selected = next as usize;
    }

    fn run_selected_collector(&mut self) {
        if self.active_section != Section::Collectors {
            return;
        }
        if let Some(record) = self.collectors.get(self.selected_collector) {
            self.queued_actions
                .push(AdminAction::RunCollector(record.name.clone()));
        }
    }

    fn toggle_selected_collector(&mut self) {
        if self.active_section != Section::Collectors {
            return;
        }
        if let Some(record) = self.collectors.get(self.selected_collector) {
            let action = if record.enabled {
                AdminAction::DisableCollector(record.name.clone())
            } else {
                AdminAction::EnableCollector(record.name.clone())
            };
            self.queued_actions.push(action);
        }
    }

    fn cycle_log_level(&mut self) {
        let current = LOG_LEVELS
            .iter()
            .position(|level| *level == self.log_level)
            .unwrap_or(0);
        self.log_level = LOG_LEVELS[(current + 1) % LOG_LEVELS.len()].to_string();
    }
}
