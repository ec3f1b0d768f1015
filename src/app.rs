//! Main application module for Quillpad
//!
//! Implements the eframe App trait around a single [`Document`]: menu bar,
//! raw markdown editor with an optional rendered preview, find bar, and a
//! status bar that follows the table under the cursor.

use eframe::egui;
use egui::text::{CCursor, CCursorRange};
use egui::{Key, KeyboardShortcut, Modifiers};
use log::{debug, info, warn};
use crate::preview::{self, PreviewCache};
use quillpad::config::{PreferenceStore, Settings, Theme, ViewMode};
use quillpad::editor::{Document, EditorCommand, FindState};
use quillpad::export::{
    copy_html_to_clipboard, copy_text_to_clipboard, export_document, ExportFormat, ExportOptions,
};
use quillpad::files::dialogs::{
    export_file_dialog, open_file_dialog, open_folder_dialog, save_file_dialog,
};
use quillpad::files::{default_templates_dir, discover_templates, FsFileStore, Template};
use quillpad::markdown::{first_heading, FormatCommand};
use quillpad::string_utils::char_to_line_col;
use quillpad::table::{TableContext, TableOperation};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

const APP_NAME: &str = "Quillpad";

/// Widget id of the main text editor.
const EDITOR_ID: &str = "quillpad_editor";

/// Font size step for Zoom In / Zoom Out.
const ZOOM_STEP: f32 = 1.0;

/// Everything a menu entry, shortcut, or dialog button can request.
///
/// Actions are collected while the UI is drawn and run afterwards, so the
/// handlers are free to borrow the whole app.
#[derive(Debug, Clone)]
enum AppAction {
    New,
    Open,
    OpenRecent(PathBuf),
    NewFromTemplate(usize),
    ChooseTemplatesFolder,
    Save,
    SaveAs,
    Quit,
    Undo,
    Redo,
    OpenFind { replace: bool },
    CloseFind,
    FindNext,
    FindPrev,
    ReplaceCurrent,
    ReplaceAll,
    Command(EditorCommand),
    InsertTable,
    Export(ExportFormat),
    CopyHtml,
    CopyMarkdown,
    SetTheme(Theme),
    SetViewMode(ViewMode),
    CycleViewMode,
    ToggleWordWrap,
    TogglePosition,
    Zoom(f32),
}

impl AppAction {
    /// Actions that replace or close the current document.
    fn discards_document(&self) -> bool {
        matches!(
            self,
            AppAction::New
                | AppAction::Open
                | AppAction::OpenRecent(_)
                | AppAction::NewFromTemplate(_)
                | AppAction::Quit
        )
    }
}

/// Transient status bar message.
struct Toast {
    message: String,
    expires_at: f64,
}

/// The main application struct that holds all state and implements eframe::App.
pub struct QuillpadApp {
    preferences: PreferenceStore,
    settings_dirty: bool,
    store: FsFileStore,
    document: Document,
    /// Text bound to the editor widget; mirrors the document content
    editor_text: String,
    /// Push document text and cursor into the widget on the next frame
    sync_editor: bool,
    find: FindState,
    show_find: bool,
    show_replace: bool,
    templates: Vec<Template>,
    preview: PreviewCache,
    /// Latest table context published by the document
    table_status: Rc<RefCell<Option<TableContext>>>,
    toast: Option<Toast>,
    /// Action waiting on the unsaved-changes dialog
    pending: Option<AppAction>,
    should_exit: bool,
    start_time: std::time::Instant,
}

impl QuillpadApp {
    /// Create the app around loaded preferences, starting with an empty document.
    pub fn new(_cc: &eframe::CreationContext<'_>, preferences: PreferenceStore) -> Self {
        info!("Initializing {}", APP_NAME);

        let templates = scan_templates(preferences.settings());
        let mut app = Self {
            preferences,
            settings_dirty: false,
            store: FsFileStore,
            document: Document::new(),
            editor_text: String::new(),
            sync_editor: true,
            find: FindState::new(),
            show_find: false,
            show_replace: false,
            templates,
            preview: PreviewCache::default(),
            table_status: Rc::new(RefCell::new(None)),
            toast: None,
            pending: None,
            should_exit: false,
            start_time: std::time::Instant::now(),
        };
        app.attach_document(Document::new());
        app
    }

    fn get_app_time(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    fn show_toast(&mut self, message: impl Into<String>, duration: f64) {
        self.toast = Some(Toast {
            message: message.into(),
            expires_at: self.get_app_time() + duration,
        });
    }

    fn settings(&self) -> &Settings {
        self.preferences.settings()
    }

    fn settings_mut(&mut self) -> &mut Settings {
        self.settings_dirty = true;
        self.preferences.settings_mut()
    }

    /// Make `document` current and route its table context to the status bar.
    fn attach_document(&mut self, mut document: Document) {
        let sink = Rc::clone(&self.table_status);
        document.subscribe_table_context(move |context| {
            *sink.borrow_mut() = context.clone();
        });
        *self.table_status.borrow_mut() = document.current_table();
        self.document = document;
        self.find.clear();
        self.sync_editor = true;
    }

    fn window_title(&self) -> String {
        format!("{} - {}", self.document.title(), APP_NAME)
    }

    /// Folder to start file dialogs in.
    fn initial_dir(&self) -> Option<PathBuf> {
        self.document
            .path()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .or_else(|| self.settings().recent_folders.first().cloned())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Action Dispatch
    // ─────────────────────────────────────────────────────────────────────────

    /// Run `action`, first asking about unsaved changes if it would lose them.
    fn dispatch(&mut self, action: AppAction, ctx: &egui::Context) {
        if action.discards_document() && self.document.is_modified() {
            debug!("Deferring {:?} until unsaved changes are resolved", action);
            self.pending = Some(action);
            return;
        }
        self.run(action, ctx);
    }

    fn run(&mut self, action: AppAction, ctx: &egui::Context) {
        match action {
            AppAction::New => {
                self.attach_document(Document::new());
                self.show_toast("New document", 1.5);
            }
            AppAction::Open => {
                if let Some(path) = open_file_dialog(self.initial_dir().as_deref()) {
                    self.open_path(path);
                }
            }
            AppAction::OpenRecent(path) => self.open_path(path),
            AppAction::NewFromTemplate(index) => self.handle_new_from_template(index),
            AppAction::ChooseTemplatesFolder => self.handle_choose_templates_folder(),
            AppAction::Save => {
                self.handle_save();
            }
            AppAction::SaveAs => {
                self.handle_save_as();
            }
            AppAction::Quit => self.should_exit = true,
            AppAction::Undo => self.handle_undo(),
            AppAction::Redo => self.handle_redo(),
            AppAction::OpenFind { replace } => {
                self.show_find = true;
                self.show_replace = replace;
                if !self.find.search_term.is_empty() {
                    self.document.find(&mut self.find);
                    self.sync_editor = true;
                }
            }
            AppAction::CloseFind => {
                self.show_find = false;
                self.find.clear();
            }
            AppAction::FindNext => {
                if self.find.next_match().is_some() {
                    self.document.select_match(&self.find);
                    self.sync_editor = true;
                }
            }
            AppAction::FindPrev => {
                if self.find.prev_match().is_some() {
                    self.document.select_match(&self.find);
                    self.sync_editor = true;
                }
            }
            AppAction::ReplaceCurrent => {
                if self.document.replace_current(&mut self.find) {
                    self.document.select_match(&self.find);
                    self.sync_editor = true;
                    self.show_toast("Replaced", 1.5);
                }
            }
            AppAction::ReplaceAll => {
                let count = self.document.replace_all(&mut self.find);
                self.sync_editor = true;
                self.show_toast(format!("Replaced {} occurrence(s)", count), 2.0);
            }
            AppAction::Command(command) => self.handle_command(command),
            AppAction::InsertTable => {
                let size = self.settings().default_table;
                self.handle_command(EditorCommand::Table(TableOperation::CreateTable {
                    rows: size.rows,
                    cols: size.cols,
                }));
            }
            AppAction::Export(format) => self.handle_export(format),
            AppAction::CopyHtml => self.handle_copy_as_html(),
            AppAction::CopyMarkdown => match copy_text_to_clipboard(self.document.content()) {
                Ok(()) => self.show_toast("Markdown copied to clipboard", 2.0),
                Err(e) => {
                    warn!("Failed to copy markdown to clipboard: {}", e);
                    self.show_toast(format!("Copy failed: {}", e), 3.0);
                }
            },
            AppAction::SetTheme(theme) => {
                self.settings_mut().theme = theme;
                self.apply_theme(ctx, None);
                info!("Theme set to: {:?}", theme);
            }
            AppAction::SetViewMode(mode) => self.set_view_mode(mode),
            AppAction::CycleViewMode => {
                let mode = self.settings().view_mode.next();
                self.set_view_mode(mode);
            }
            AppAction::ToggleWordWrap => {
                let settings = self.settings_mut();
                settings.word_wrap = !settings.word_wrap;
            }
            AppAction::TogglePosition => {
                let settings = self.settings_mut();
                settings.show_line_numbers = !settings.show_line_numbers;
            }
            AppAction::Zoom(delta) => {
                let settings = self.settings_mut();
                settings.font_size = (settings.font_size + delta)
                    .clamp(Settings::MIN_FONT_SIZE, Settings::MAX_FONT_SIZE);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // File Handlers
    // ─────────────────────────────────────────────────────────────────────────

    fn open_path(&mut self, path: PathBuf) {
        match Document::open(&self.store, &path) {
            Ok(document) => {
                self.settings_mut().add_recent_file(path.clone());
                self.attach_document(document);
                self.show_toast(format!("Opened {}", path.display()), 2.0);
            }
            Err(e) => {
                warn!("Failed to open {}: {}", path.display(), e);
                self.show_toast(format!("Open failed: {}", e), 3.0);
            }
        }
    }

    /// Save to the current path, or ask for one. Returns `true` when saved.
    fn handle_save(&mut self) -> bool {
        if self.document.path().is_none() {
            return self.handle_save_as();
        }
        match self.document.save(&self.store) {
            Ok(()) => {
                self.show_toast(format!("Saved: {}", self.document.title()), 2.0);
                true
            }
            Err(e) => {
                warn!("Failed to save: {}", e);
                self.show_toast(format!("Save failed: {}", e), 3.0);
                false
            }
        }
    }

    fn handle_save_as(&mut self) -> bool {
        let default_name = self.suggested_stem() + ".md";
        let Some(path) = save_file_dialog(self.initial_dir().as_deref(), Some(&default_name))
        else {
            return false;
        };
        match self.document.save_as(&self.store, &path) {
            Ok(()) => {
                self.settings_mut().add_recent_file(path.clone());
                self.show_toast(format!("Saved: {}", path.display()), 2.0);
                true
            }
            Err(e) => {
                warn!("Failed to save as {}: {}", path.display(), e);
                self.show_toast(format!("Save failed: {}", e), 3.0);
                false
            }
        }
    }

    /// File stem for dialogs: the current file name, else the first heading.
    fn suggested_stem(&self) -> String {
        self.document
            .path()
            .and_then(Path::file_stem)
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .or_else(|| first_heading(self.document.content()))
            .unwrap_or_else(|| "untitled".to_string())
    }

    fn handle_new_from_template(&mut self, index: usize) {
        let Some(template) = self.templates.get(index) else {
            return;
        };
        match template.load(&self.store) {
            Ok(content) => {
                let name = template.name.clone();
                self.attach_document(Document::from_template(content));
                self.show_toast(format!("New from template: {}", name), 2.0);
            }
            Err(e) => {
                warn!("Failed to load template {}: {}", template.name, e);
                self.show_toast(format!("Template failed: {}", e), 3.0);
            }
        }
    }

    fn handle_choose_templates_folder(&mut self) {
        let start = self.settings().templates_dir.clone().or_else(default_templates_dir);
        let Some(dir) = open_folder_dialog("Choose Templates Folder", start.as_deref()) else {
            return;
        };
        let settings = self.settings_mut();
        settings.templates_dir = Some(dir.clone());
        settings.add_recent_folder(dir);
        self.templates = scan_templates(self.settings());
        self.show_toast(format!("Found {} template(s)", self.templates.len()), 2.0);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Edit Handlers
    // ─────────────────────────────────────────────────────────────────────────

    fn handle_undo(&mut self) {
        if self.document.undo() {
            self.sync_editor = true;
        } else {
            self.show_toast("Nothing to undo", 1.5);
        }
    }

    fn handle_redo(&mut self) {
        if self.document.redo() {
            self.sync_editor = true;
        } else {
            self.show_toast("Nothing to redo", 1.5);
        }
    }

    fn handle_command(&mut self, command: EditorCommand) {
        if self.document.execute(command) {
            self.sync_editor = true;
            return;
        }
        let no_table = self.table_status.borrow().is_none();
        let message = match command {
            EditorCommand::Table(op) if op.requires_table() && no_table => {
                "No table at the cursor".to_string()
            }
            _ => format!("{} not possible here", command.label()),
        };
        self.show_toast(message, 2.0);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Export Handlers
    // ─────────────────────────────────────────────────────────────────────────

    fn handle_export(&mut self, format: ExportFormat) {
        let stem = self.suggested_stem();
        let initial_dir = self
            .initial_dir()
            .or_else(|| self.settings().export.last_directory.clone());

        let path = if format.is_supported() {
            match export_file_dialog(
                format.label(),
                format.extension(),
                initial_dir.as_deref(),
                &stem,
            ) {
                Some(path) => path,
                None => return,
            }
        } else {
            // Nothing is written for unsupported formats
            initial_dir
                .unwrap_or_default()
                .join(format!("{}.{}", stem, format.extension()))
        };

        let title = first_heading(self.document.content()).unwrap_or_else(|| stem.clone());
        let options = ExportOptions::from_defaults(title, &self.settings().export);

        match export_document(&self.store, self.document.content(), &path, format, &options) {
            Ok(path) => {
                let open_after = self.settings().export.open_after_export;
                if let Some(parent) = path.parent() {
                    self.settings_mut().export.last_directory = Some(parent.to_path_buf());
                }
                self.show_toast(format!("Exported to {}", path.display()), 2.5);
                if open_after {
                    if let Err(e) = open::that(&path) {
                        warn!("Failed to open exported file: {}", e);
                    }
                }
            }
            Err(e) => {
                warn!("Export failed: {}", e);
                self.show_toast(format!("Export failed: {}", e), 3.0);
            }
        }
    }

    fn handle_copy_as_html(&mut self) {
        match copy_html_to_clipboard(self.document.content()) {
            Ok(()) => self.show_toast("HTML copied to clipboard", 2.0),
            Err(e) => {
                warn!("Failed to copy HTML to clipboard: {}", e);
                self.show_toast(format!("Copy failed: {}", e), 3.0);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Theme / Window
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply the theme preference when the effective mode differs from what
    /// is on screen, including after eframe follows an OS theme change.
    /// `system_dark` is the OS preference, when known.
    fn apply_theme(&self, ctx: &egui::Context, system_dark: Option<bool>) {
        let dark = match self.settings().theme {
            Theme::Light => false,
            Theme::Dark => true,
            Theme::System => system_dark.unwrap_or(true),
        };
        if ctx.style().visuals.dark_mode != dark {
            ctx.set_visuals(if dark {
                egui::Visuals::dark()
            } else {
                egui::Visuals::light()
            });
            debug!("Applied {} visuals", if dark { "dark" } else { "light" });
        }
    }

    fn set_view_mode(&mut self, mode: ViewMode) {
        self.settings_mut().view_mode = mode;
        // Restore the widget cursor when the editor comes back
        self.sync_editor = mode.shows_editor();
        info!("View mode set to: {}", mode.label());
    }

    /// Remember the window size for the next launch.
    fn update_window_state(&mut self, ctx: &egui::Context) {
        let (rect, maximized) = ctx.input(|i| {
            (
                i.viewport().inner_rect,
                i.viewport().maximized.unwrap_or(false),
            )
        });
        let Some(rect) = rect else {
            return;
        };
        let current = &self.settings().window_size;
        let size_changed = !maximized
            && ((current.width - rect.width()).abs() > 1.0
                || (current.height - rect.height()).abs() > 1.0);
        if size_changed || current.maximized != maximized {
            let window = &mut self.settings_mut().window_size;
            if !maximized {
                window.width = rect.width();
                window.height = rect.height();
            }
            window.maximized = maximized;
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Keyboard Shortcuts
    // ─────────────────────────────────────────────────────────────────────────

    /// Consume application shortcuts before the editor sees them.
    ///
    /// Shifted variants are checked first: a Ctrl shortcut also matches
    /// Ctrl+Shift.
    fn handle_keyboard_shortcuts(&self, ctx: &egui::Context) -> Option<AppAction> {
        let command_shift = Modifiers::COMMAND | Modifiers::SHIFT;
        let show_find = self.show_find;
        ctx.input_mut(|i| {
            if i.consume_key(command_shift, Key::S) {
                return Some(AppAction::SaveAs);
            }
            if i.consume_key(command_shift, Key::Z) {
                return Some(AppAction::Redo);
            }
            for command in FormatCommand::all() {
                if let Some(shortcut) = format_shortcut(command) {
                    if shortcut.modifiers.shift && i.consume_shortcut(&shortcut) {
                        return Some(AppAction::Command(EditorCommand::Format(command)));
                    }
                }
            }
            if i.consume_key(Modifiers::SHIFT, Key::F3) {
                return Some(AppAction::FindPrev);
            }
            if i.consume_key(Modifiers::NONE, Key::F3) {
                return Some(AppAction::FindNext);
            }
            if show_find && i.consume_key(Modifiers::NONE, Key::Escape) {
                return Some(AppAction::CloseFind);
            }

            let plain = [
                (Key::S, AppAction::Save),
                (Key::O, AppAction::Open),
                (Key::N, AppAction::New),
                (Key::Q, AppAction::Quit),
                (Key::Z, AppAction::Undo),
                (Key::Y, AppAction::Redo),
                (Key::F, AppAction::OpenFind { replace: false }),
                (Key::H, AppAction::OpenFind { replace: true }),
                (Key::T, AppAction::InsertTable),
                (Key::E, AppAction::CycleViewMode),
                (Key::Plus, AppAction::Zoom(ZOOM_STEP)),
                (Key::Minus, AppAction::Zoom(-ZOOM_STEP)),
            ];
            for (key, action) in plain {
                if i.consume_key(Modifiers::COMMAND, key) {
                    return Some(action);
                }
            }
            for command in FormatCommand::all() {
                if let Some(shortcut) = format_shortcut(command) {
                    if i.consume_shortcut(&shortcut) {
                        return Some(AppAction::Command(EditorCommand::Format(command)));
                    }
                }
            }
            None
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // UI
    // ─────────────────────────────────────────────────────────────────────────

    fn render_menu_bar(&mut self, ctx: &egui::Context, actions: &mut Vec<AppAction>) {
        let table_present = self.table_status.borrow().is_some();
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    menu_item(ui, "New", "Ctrl+N", AppAction::New, actions);
                    menu_item(ui, "Open…", "Ctrl+O", AppAction::Open, actions);
                    ui.menu_button("Open Recent", |ui| {
                        let recent = &self.preferences.settings().recent_files;
                        if recent.is_empty() {
                            ui.label("No recent files");
                        }
                        for path in recent {
                            let label = path.display().to_string();
                            menu_item(ui, &label, "", AppAction::OpenRecent(path.clone()), actions);
                        }
                    });
                    ui.menu_button("New from Template", |ui| {
                        if self.templates.is_empty() {
                            ui.label("No templates found");
                        }
                        for (index, template) in self.templates.iter().enumerate() {
                            menu_item(ui, &template.name, "", AppAction::NewFromTemplate(index), actions);
                        }
                        ui.separator();
                        menu_item(ui, "Choose Templates Folder…", "", AppAction::ChooseTemplatesFolder, actions);
                    });
                    ui.separator();
                    menu_item(ui, "Save", "Ctrl+S", AppAction::Save, actions);
                    menu_item(ui, "Save As…", "Ctrl+Shift+S", AppAction::SaveAs, actions);
                    ui.separator();
                    menu_item(ui, "Quit", "Ctrl+Q", AppAction::Quit, actions);
                });

                ui.menu_button("Edit", |ui| {
                    ui.add_enabled_ui(self.document.can_undo(), |ui| {
                        menu_item(ui, "Undo", "Ctrl+Z", AppAction::Undo, actions);
                    });
                    ui.add_enabled_ui(self.document.can_redo(), |ui| {
                        menu_item(ui, "Redo", "Ctrl+Y", AppAction::Redo, actions);
                    });
                    ui.separator();
                    menu_item(ui, "Find…", "Ctrl+F", AppAction::OpenFind { replace: false }, actions);
                    menu_item(ui, "Find and Replace…", "Ctrl+H", AppAction::OpenFind { replace: true }, actions);
                    menu_item(ui, "Find Next", "F3", AppAction::FindNext, actions);
                    menu_item(ui, "Find Previous", "Shift+F3", AppAction::FindPrev, actions);
                });

                ui.menu_button("Format", |ui| {
                    for command in EditorCommand::format_menu() {
                        let label = command.label();
                        menu_item(ui, &label, command.shortcut_label(), AppAction::Command(command), actions);
                    }
                });

                ui.menu_button("Table", |ui| {
                    let size = self.preferences.settings().default_table;
                    let label = format!("Insert Table ({}×{})", size.cols, size.rows);
                    menu_item(ui, &label, "Ctrl+T", AppAction::InsertTable, actions);
                    ui.separator();
                    ui.add_enabled_ui(table_present, |ui| {
                        for command in EditorCommand::table_menu() {
                            let label = command.label();
                            menu_item(ui, &label, "", AppAction::Command(command), actions);
                        }
                    });
                });

                ui.menu_button("Export", |ui| {
                    for &format in ExportFormat::all() {
                        let label = format!("Export as {}…", format.label());
                        let response = ui.button(label);
                        let response = if format.is_supported() {
                            response
                        } else {
                            response.on_hover_text("Not available in this build")
                        };
                        if response.clicked() {
                            actions.push(AppAction::Export(format));
                            ui.close_menu();
                        }
                    }
                    ui.separator();
                    menu_item(ui, "Copy as HTML", "", AppAction::CopyHtml, actions);
                    menu_item(ui, "Copy as Markdown", "", AppAction::CopyMarkdown, actions);
                });

                ui.menu_button("View", |ui| {
                    let settings = self.preferences.settings();
                    for &mode in ViewMode::all() {
                        if ui.radio(settings.view_mode == mode, mode.label()).clicked() {
                            actions.push(AppAction::SetViewMode(mode));
                            ui.close_menu();
                        }
                    }
                    ui.weak("Ctrl+E cycles views");
                    ui.separator();
                    for &theme in Theme::all() {
                        if ui.radio(settings.theme == theme, theme.label()).clicked() {
                            actions.push(AppAction::SetTheme(theme));
                            ui.close_menu();
                        }
                    }
                    ui.separator();
                    let mut word_wrap = settings.word_wrap;
                    if ui.checkbox(&mut word_wrap, "Word Wrap").clicked() {
                        actions.push(AppAction::ToggleWordWrap);
                    }
                    let mut show_position = settings.show_line_numbers;
                    if ui.checkbox(&mut show_position, "Show Cursor Position").clicked() {
                        actions.push(AppAction::TogglePosition);
                    }
                    ui.separator();
                    menu_item(ui, "Zoom In", "Ctrl++", AppAction::Zoom(ZOOM_STEP), actions);
                    menu_item(ui, "Zoom Out", "Ctrl+-", AppAction::Zoom(-ZOOM_STEP), actions);
                });
            });
        });
    }

    fn render_status_bar(&mut self, ctx: &egui::Context) {
        let now = self.get_app_time();
        if self.toast.as_ref().is_some_and(|t| t.expires_at <= now) {
            self.toast = None;
        }
        if let Some(toast) = &self.toast {
            ctx.request_repaint_after(std::time::Duration::from_secs_f64(
                (toast.expires_at - now).max(0.0),
            ));
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.preferences.settings().show_line_numbers {
                    let (line, col) = char_to_line_col(self.document.content(), self.document.cursor());
                    ui.label(format!("Ln {}, Col {}", line + 1, col + 1));
                    ui.separator();
                }
                if let Some(context) = self.table_status.borrow().as_ref() {
                    ui.label(context.describe());
                    ui.separator();
                }
                if let Some(toast) = &self.toast {
                    ui.label(egui::RichText::new(&toast.message).italics());
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(self.document.title());
                });
            });
        });
    }

    fn render_find_bar(&mut self, ctx: &egui::Context, actions: &mut Vec<AppAction>) {
        if !self.show_find {
            return;
        }
        let mut changed = false;
        egui::TopBottomPanel::bottom("find_bar").show(ctx, |ui| {
            let find = &mut self.find;
            ui.horizontal(|ui| {
                ui.label("Find:");
                let response =
                    ui.add(egui::TextEdit::singleline(&mut find.search_term).desired_width(220.0));
                changed |= response.changed();
                if response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                    actions.push(AppAction::FindNext);
                }
                changed |= ui
                    .checkbox(&mut find.case_sensitive, "Aa")
                    .on_hover_text("Match case")
                    .changed();
                changed |= ui
                    .checkbox(&mut find.whole_word, "Word")
                    .on_hover_text("Whole word")
                    .changed();
                changed |= ui
                    .checkbox(&mut find.use_regex, ".*")
                    .on_hover_text("Regular expression")
                    .changed();

                if ui.button("▲").on_hover_text("Previous (Shift+F3)").clicked() {
                    actions.push(AppAction::FindPrev);
                }
                if ui.button("▼").on_hover_text("Next (F3)").clicked() {
                    actions.push(AppAction::FindNext);
                }
                match (&find.error, find.match_count()) {
                    (Some(_), _) => ui.colored_label(ui.visuals().error_fg_color, "Invalid pattern"),
                    (None, 0) if !find.search_term.is_empty() => ui.label("No matches"),
                    (None, 0) => ui.label(""),
                    (None, count) => ui.label(format!("{} of {}", find.current_match + 1, count)),
                };
                if ui.button("✕").clicked() {
                    actions.push(AppAction::CloseFind);
                }
            });
            if self.show_replace {
                ui.horizontal(|ui| {
                    ui.label("Replace:");
                    ui.add(egui::TextEdit::singleline(&mut find.replace_term).desired_width(220.0));
                    if ui.button("Replace").clicked() {
                        actions.push(AppAction::ReplaceCurrent);
                    }
                    if ui.button("Replace All").clicked() {
                        actions.push(AppAction::ReplaceAll);
                    }
                });
            }
        });

        if changed {
            let count = self.document.find(&mut self.find);
            self.sync_editor = true;
            debug!("Search changed, found {} matches", count);
        }
    }

    fn render_editor(&mut self, ctx: &egui::Context) {
        let id = egui::Id::new(EDITOR_ID);

        if self.sync_editor {
            self.editor_text = self.document.content().to_owned();
            let mut state = egui::text_edit::TextEditState::load(ctx, id).unwrap_or_default();
            let range = match self.document.selection() {
                Some((start, end)) => CCursorRange::two(CCursor::new(start), CCursor::new(end)),
                None => CCursorRange::one(CCursor::new(self.document.cursor())),
            };
            state.cursor.set_char_range(Some(range));
            state.store(ctx, id);
            ctx.memory_mut(|m| m.request_focus(id));
            self.sync_editor = false;
        }

        let font = egui::FontId::monospace(self.settings().font_size);
        let wrap = self.settings().word_wrap;
        let mut layouter = |ui: &egui::Ui, text: &str, wrap_width: f32| -> Arc<egui::Galley> {
            let width = if wrap { wrap_width } else { f32::INFINITY };
            let job = egui::text::LayoutJob::simple(
                text.to_owned(),
                font.clone(),
                ui.visuals().text_color(),
                width,
            );
            ui.fonts(|f| f.layout_job(job))
        };

        let output = egui::CentralPanel::default()
            .show(ctx, |ui| {
                egui::ScrollArea::both()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        egui::TextEdit::multiline(&mut self.editor_text)
                            .id(id)
                            .desired_width(f32::INFINITY)
                            .desired_rows(40)
                            .lock_focus(true)
                            .layouter(&mut layouter)
                            .show(ui)
                    })
                    .inner
            })
            .inner;

        let changed = output.response.changed();
        let (cursor, selection) = match output.cursor_range {
            Some(range) => {
                let primary = range.primary.ccursor.index;
                let secondary = range.secondary.ccursor.index;
                let selection = (primary != secondary)
                    .then(|| (primary.min(secondary), primary.max(secondary)));
                (primary, selection)
            }
            None => (self.document.cursor(), self.document.selection()),
        };

        if changed {
            self.document.set_content(self.editor_text.clone(), cursor);
            if self.show_find {
                self.find.find_matches(self.document.content());
            }
        } else {
            self.document.set_cursor(cursor, selection);
        }
    }

    /// Rendered preview, either beside the editor or filling the window.
    fn render_preview(&mut self, ctx: &egui::Context, mode: ViewMode) {
        let font_size = self.settings().font_size;
        let tree = self.preview.tree(self.document.content());
        if mode.shows_editor() {
            egui::SidePanel::right("preview_panel")
                .resizable(true)
                .default_width(ctx.screen_rect().width() / 2.0)
                .show(ctx, |ui| preview::show(ui, tree, font_size));
        } else {
            egui::CentralPanel::default().show(ctx, |ui| preview::show(ui, tree, font_size));
        }
    }

    /// Unsaved-changes confirmation for the pending action.
    fn render_confirm_dialog(&mut self, ctx: &egui::Context) {
        let Some(pending) = self.pending.clone() else {
            return;
        };
        let mut choice = None;
        egui::Window::new("Unsaved Changes")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!(
                    "{} has unsaved changes. Save them first?",
                    self.document.title().trim_end_matches('*')
                ));
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        choice = Some(ConfirmChoice::Save);
                    }
                    if ui.button("Discard").clicked() {
                        choice = Some(ConfirmChoice::Discard);
                    }
                    if ui.button("Cancel").clicked() {
                        choice = Some(ConfirmChoice::Cancel);
                    }
                });
            });

        match choice {
            Some(ConfirmChoice::Save) => {
                self.pending = None;
                if self.handle_save() {
                    self.run(pending, ctx);
                }
            }
            Some(ConfirmChoice::Discard) => {
                self.pending = None;
                self.run(pending, ctx);
            }
            Some(ConfirmChoice::Cancel) => self.pending = None,
            None => {}
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ConfirmChoice {
    Save,
    Discard,
    Cancel,
}

impl eframe::App for QuillpadApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        let system_dark = frame.info().system_theme.map(|t| t == eframe::Theme::Dark);
        self.apply_theme(ctx, system_dark);

        ctx.send_viewport_cmd(egui::ViewportCommand::Title(self.window_title()));
        self.update_window_state(ctx);

        if ctx.input(|i| i.viewport().close_requested())
            && !self.should_exit
            && self.document.is_modified()
        {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.pending = Some(AppAction::Quit);
        }

        let mut actions = Vec::new();
        // Shortcuts before the editor so it never sees them
        if self.pending.is_none() {
            actions.extend(self.handle_keyboard_shortcuts(ctx));
        }

        self.render_menu_bar(ctx, &mut actions);
        self.render_status_bar(ctx);
        self.render_find_bar(ctx, &mut actions);
        // Side panels claim their space before the central panel
        let mode = self.settings().view_mode;
        if mode.shows_preview() {
            self.render_preview(ctx, mode);
        }
        if mode.shows_editor() {
            self.render_editor(ctx);
        }
        self.render_confirm_dialog(ctx);

        for action in actions {
            self.dispatch(action, ctx);
        }

        if self.should_exit {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application exiting");
        self.preferences.save_silent();
    }

    fn save(&mut self, _storage: &mut dyn eframe::Storage) {
        if self.settings_dirty && self.preferences.save_silent() {
            self.settings_dirty = false;
        }
    }

    fn auto_save_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(30)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Menu button with shortcut text that queues `action` when clicked.
fn menu_item(
    ui: &mut egui::Ui,
    label: &str,
    shortcut: &str,
    action: AppAction,
    actions: &mut Vec<AppAction>,
) {
    if ui
        .add(egui::Button::new(label).shortcut_text(shortcut))
        .clicked()
    {
        actions.push(action);
        ui.close_menu();
    }
}

/// Key binding for a formatting command, matching its shortcut label.
fn format_shortcut(command: FormatCommand) -> Option<KeyboardShortcut> {
    let command_shift = Modifiers::COMMAND | Modifiers::SHIFT;
    let (modifiers, key) = match command {
        FormatCommand::Bold => (Modifiers::COMMAND, Key::B),
        FormatCommand::Italic => (Modifiers::COMMAND, Key::I),
        FormatCommand::InlineCode => (Modifiers::COMMAND, Key::Backtick),
        FormatCommand::Strikethrough => (command_shift, Key::X),
        FormatCommand::Link => (Modifiers::COMMAND, Key::K),
        FormatCommand::BulletList => (command_shift, Key::B),
        FormatCommand::NumberedList => (command_shift, Key::N),
        FormatCommand::Blockquote => (command_shift, Key::Q),
        FormatCommand::Heading(_) => return None,
    };
    Some(KeyboardShortcut::new(modifiers, key))
}

fn scan_templates(settings: &Settings) -> Vec<Template> {
    settings
        .templates_dir
        .clone()
        .or_else(default_templates_dir)
        .map(|dir| discover_templates(&dir))
        .unwrap_or_default()
}
