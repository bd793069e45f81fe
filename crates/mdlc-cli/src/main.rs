use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use mdlc_config::Config;
use mdlc_engine::{DirStore, ItemType, Platform, ROOT_ID, TreeItem, Workspace};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::{
    collections::HashSet,
    env,
    fmt::Display,
    fs::{self, OpenOptions},
    io::{Stdout, stdout},
    path::{Path, PathBuf},
    process,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewMode {
    Raw,
    Resolved,
    Html,
}

impl ViewMode {
    fn next(self) -> Self {
        match self {
            ViewMode::Raw => ViewMode::Resolved,
            ViewMode::Resolved => ViewMode::Html,
            ViewMode::Html => ViewMode::Raw,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ViewMode::Raw => "raw",
            ViewMode::Resolved => "resolved",
            ViewMode::Html => "html",
        }
    }
}

/// Name entry for a new file or folder
struct Prompt {
    item_type: ItemType,
    parent_id: String,
    buffer: String,
}

struct App {
    workspace: Workspace<DirStore>,
    expanded: HashSet<String>,
    tree_items: Vec<TreeItem>,
    list_state: ListState,
    view_mode: ViewMode,
    marked: Option<String>,
    prompt: Option<Prompt>,
    status: String,
}

impl App {
    fn new(workspace: Workspace<DirStore>) -> Self {
        let mut app = Self {
            workspace,
            expanded: HashSet::new(),
            tree_items: Vec::new(),
            list_state: ListState::default(),
            view_mode: ViewMode::Raw,
            marked: None,
            prompt: None,
            status: String::new(),
        };
        app.refresh_items();
        app.list_state.select(Some(0));
        app
    }

    fn refresh_items(&mut self) {
        self.tree_items = self.workspace.tree().visible_items(&self.expanded);
        let last = self.tree_items.len().saturating_sub(1);
        if let Some(selected) = self.list_state.selected()
            && selected > last
        {
            self.list_state.select(Some(last));
        }
    }

    fn selected_item(&self) -> Option<&TreeItem> {
        self.list_state
            .selected()
            .and_then(|index| self.tree_items.get(index))
    }

    fn select_id(&mut self, id: &str) {
        if let Some(index) = self.tree_items.iter().position(|item| item.id == id) {
            self.list_state.select(Some(index));
        }
    }

    fn next_item(&mut self) {
        let i = match self.list_state.selected() {
            Some(i) => (i + 1) % self.tree_items.len(),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    fn previous_item(&mut self) {
        let i = match self.list_state.selected() {
            Some(0) | None => self.tree_items.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    fn toggle_selected_folder(&mut self) {
        if let Some(item) = self.selected_item()
            && item.is_folder
            && item.id != ROOT_ID
        {
            let id = item.id.clone();
            if !self.expanded.remove(&id) {
                self.expanded.insert(id);
            }
            self.refresh_items();
        }
    }

    fn set_selected_expanded(&mut self, expand: bool) {
        if let Some(item) = self.selected_item()
            && item.is_folder
            && item.is_expanded != expand
        {
            let id = item.id.clone();
            if expand {
                self.expanded.insert(id);
            } else {
                self.expanded.remove(&id);
            }
            self.refresh_items();
        }
    }

    /// Folder new items go into and marked items move into
    fn target_folder(&self) -> String {
        match self.selected_item() {
            Some(item) if item.is_folder => item.id.clone(),
            Some(item) => self
                .workspace
                .tree()
                .parent_of(&item.id)
                .map(|parent| parent.id.clone())
                .unwrap_or_else(|| ROOT_ID.to_string()),
            None => ROOT_ID.to_string(),
        }
    }

    fn report<T, E: Display>(&mut self, result: Result<T, E>, success: impl Into<String>) -> Option<T> {
        match result {
            Ok(value) => {
                self.status = success.into();
                Some(value)
            }
            Err(e) => {
                log::warn!("{e}");
                self.status = format!("Error: {e}");
                None
            }
        }
    }

    fn start_prompt(&mut self, item_type: ItemType) {
        self.prompt = Some(Prompt {
            item_type,
            parent_id: self.target_folder(),
            buffer: String::new(),
        });
    }

    fn handle_prompt_key(&mut self, code: KeyCode) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        match code {
            KeyCode::Char(c) => prompt.buffer.push(c),
            KeyCode::Backspace => {
                prompt.buffer.pop();
            }
            KeyCode::Esc => self.prompt = None,
            KeyCode::Enter => {
                if let Some(prompt) = self.prompt.take() {
                    self.create_from_prompt(prompt);
                }
            }
            _ => {}
        }
    }

    fn create_from_prompt(&mut self, prompt: Prompt) {
        let name = prompt.buffer.trim();
        if name.is_empty() {
            self.status = "Cancelled: empty name".to_string();
            return;
        }

        let result = self
            .workspace
            .create_item(prompt.item_type, name, &prompt.parent_id);
        if let Some(change) = self.report(result, format!("Created {name}")) {
            self.expanded.insert(prompt.parent_id);
            self.refresh_items();
            if let Some(id) = change.subject_id() {
                self.select_id(id);
            }
        }
    }

    fn delete_selected(&mut self) {
        let Some(item) = self.selected_item() else {
            return;
        };
        let (id, name) = (item.id.clone(), item.name.clone());

        let result = self.workspace.delete_item(&id);
        if self.report(result, format!("Deleted {name}")).is_some() {
            if self.marked.as_deref() == Some(id.as_str()) {
                self.marked = None;
            }
            self.expanded.remove(&id);
            self.refresh_items();
        }
    }

    fn mark_selected(&mut self) {
        let Some((id, name)) = self
            .selected_item()
            .map(|item| (item.id.clone(), item.name.clone()))
        else {
            return;
        };
        self.status = format!("Marked {name} for moving, select a folder and press M");
        self.marked = Some(id);
    }

    fn move_marked(&mut self) {
        let Some(marked) = self.marked.clone() else {
            self.status = "Nothing marked, press m on an item first".to_string();
            return;
        };
        let target = self.target_folder();

        let result = self.workspace.move_item(&marked, &target);
        if self.report(result, "Moved").is_some() {
            self.marked = None;
            self.expanded.insert(target);
            self.refresh_items();
            self.select_id(&marked);
        }
    }

    fn content_lines(&self) -> Vec<String> {
        let Some(item) = self.selected_item() else {
            return Vec::new();
        };
        if item.is_folder {
            return vec![
                format!("📁 {}", item.name),
                String::new(),
                "Press Enter/Space to toggle, → to expand, ← to collapse".to_string(),
            ];
        }

        let Some(content) = self
            .workspace
            .tree()
            .find_node_by_id(&item.id)
            .and_then(|node| node.content())
        else {
            return vec![format!("{} has no content", item.name)];
        };

        let text = match self.view_mode {
            ViewMode::Raw => content.to_string(),
            ViewMode::Resolved => self.workspace.resolve(content),
            ViewMode::Html => self.workspace.render(content),
        };
        text.lines().map(str::to_string).collect()
    }
}

/// Send log output to `<data dir>/mdlc.log` so it does not draw over the UI
fn init_logging(data_path: &Path) -> Result<()> {
    fs::create_dir_all(data_path)
        .with_context(|| format!("Failed to create data directory {}", data_path.display()))?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_path.join("mdlc.log"))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    // Determine data path from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Usage: {} [data-folder-path]", args[0]);
            process::exit(1);
        }
    };

    let data_path = match args.len() {
        2 => PathBuf::from(&args[1]),
        1 => config.data_path.clone(),
        _ => {
            eprintln!("Usage: {} [data-folder-path]", args[0]);
            process::exit(1);
        }
    };

    init_logging(&data_path)?;
    log::info!("mdlc starting up with data in {}", data_path.display());
    log::info!("Config path: {}", config_path.display());

    let mut workspace = Workspace::open(DirStore::new(&data_path));
    if let Some(apple) = config.apple_shortcuts {
        workspace.set_platform(if apple { Platform::Apple } else { Platform::Other });
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(workspace);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("{err:?}");
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if app.prompt.is_some() {
            app.handle_prompt_key(key.code);
            continue;
        }

        match key.code {
            KeyCode::Char('q') => return Ok(()),
            KeyCode::Down | KeyCode::Char('j') => app.next_item(),
            KeyCode::Up | KeyCode::Char('k') => app.previous_item(),
            KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected_folder(),
            KeyCode::Right => app.set_selected_expanded(true),
            KeyCode::Left => app.set_selected_expanded(false),
            KeyCode::Char('v') => app.view_mode = app.view_mode.next(),
            KeyCode::Char('n') => app.start_prompt(ItemType::File),
            KeyCode::Char('N') => app.start_prompt(ItemType::Folder),
            KeyCode::Char('d') => app.delete_selected(),
            KeyCode::Char('m') => app.mark_selected(),
            KeyCode::Char('M') => app.move_marked(),
            _ => {}
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(rows[0]);

    // Tree panel
    let tree_items: Vec<ListItem> = app
        .tree_items
        .iter()
        .map(|item| {
            let indent = "  ".repeat(item.depth);
            let icon = match (item.is_folder, item.is_expanded) {
                (true, true) => "📂 ",
                (true, false) => "📁 ",
                (false, _) => "📄 ",
            };
            let mark = if app.marked.as_deref() == Some(item.id.as_str()) {
                " *"
            } else {
                ""
            };
            ListItem::new(Line::from(format!("{indent}{icon}{}{mark}", item.name)))
        })
        .collect();

    let files_list = List::new(tree_items)
        .block(Block::default().borders(Borders::ALL).title("Files"))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(files_list, chunks[0], &mut app.list_state);

    // Content panel
    let lines = app.content_lines();
    let content_text: Vec<Line> = if lines.is_empty() {
        vec![Line::from("Select a file to view its content")]
    } else {
        lines.into_iter().map(Line::from).collect()
    };

    let title = format!(
        "Content ({}) | {} blocks | {} images",
        app.view_mode.label(),
        app.workspace.blocks().len(),
        app.workspace.images().len()
    );
    let content = Paragraph::new(content_text)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(ratatui::widgets::Wrap { trim: false });

    f.render_widget(content, chunks[1]);

    // Status / prompt / help
    let bottom = if let Some(prompt) = &app.prompt {
        let kind = match prompt.item_type {
            ItemType::File => "file",
            ItemType::Folder => "folder",
        };
        Line::from(vec![
            Span::styled(format!("New {kind} name: "), Style::default().fg(Color::Cyan)),
            Span::raw(prompt.buffer.clone()),
            Span::raw("▏ (Enter: create | Esc: cancel)"),
        ])
    } else if !app.status.is_empty() {
        Line::from(app.status.clone())
    } else {
        Line::from(
            "q: Quit | j/k: Move | Enter/Space/→/←: Folders | v: View | n/N: New file/folder | d: Delete | m/M: Mark/Move",
        )
    };

    f.render_widget(Paragraph::new(vec![bottom]).block(Block::default()), rows[1]);
}
