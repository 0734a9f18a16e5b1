//! Terminal command table.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local, TimeZone};
use indoc::indoc;
use rand::Rng;
use thiserror::Error;
use unicode_width::UnicodeWidthStr;

use super::vfs::{Node, ReadError, VirtualFs};
use super::{AppKind, AppRequest, WindowCommand};

const MAX_SUGGESTIONS: usize = 3;
const MATRIX_ROWS: usize = 8;
const MATRIX_COLUMNS: usize = 20;
const MATRIX_GLYPHS: &[char] = &[
    'ア', 'イ', 'ウ', 'エ', 'オ', 'カ', 'キ', 'ク', 'ケ', 'コ', 'サ', 'シ', 'ス', 'セ', 'ソ', 'タ',
    'チ', 'ツ', 'テ', 'ト', 'ナ', 'ニ', 'ヌ', 'ネ', 'ノ', 'ハ', 'ヒ', 'フ', 'ヘ', 'ホ', 'マ', 'ミ',
];

const QUOTES: &[&str] = &[
    "Code is poetry written for machines to dance to.",
    "The best error message is the one that never shows up.",
    "First, solve the problem. Then, write the code.",
    "Programs must be written for people to read, and only incidentally for machines to execute.",
    "Walking on water and developing software from a specification are easy if both are frozen.",
    "It's not a bug; it's an undocumented feature.",
];

const JOKES: &[&str] = &[
    "Why do programmers prefer dark mode? Because light attracts bugs!",
    "How many programmers does it take to change a light bulb? None, that's a hardware problem!",
    "What's a programmer's favorite hangout place? Foo Bar!",
    "Why did the developer go broke? Because they used up all their cache!",
];

const WINDOW_USAGE: &str = indoc! {"
    Window control commands:

      window minimize  - Minimize the terminal window
      window maximize  - Maximize/restore the terminal window
      window close     - Close the terminal window

    Shortcuts: min, max for minimize/maximize
"};

const COFFEE: &str = indoc! {"
    Brewing coffee...

    [████████████████████] 100%

    Coffee ready! Perfect for coding sessions.
"};

/// Sections of the `help` listing, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CommandGroup {
    Files,
    System,
    Fun,
    Utilities,
}

impl CommandGroup {
    pub const ALL: [CommandGroup; 4] = [
        CommandGroup::Files,
        CommandGroup::System,
        CommandGroup::Fun,
        CommandGroup::Utilities,
    ];

    pub fn heading(self) -> &'static str {
        match self {
            CommandGroup::Files => "File Operations:",
            CommandGroup::System => "System Commands:",
            CommandGroup::Fun => "Fun Commands:",
            CommandGroup::Utilities => "Utilities:",
        }
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Command '{name}' not found.")]
    NotFound {
        name: String,
        suggestions: Vec<String>,
    },
    #[error("could not parse input: {0}")]
    Parse(#[from] shell_words::ParseError),
}

impl CommandError {
    /// Transcript lines describing the error.
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = vec![self.to_string(), String::new()];
        if let CommandError::NotFound { suggestions, .. } = self
            && !suggestions.is_empty()
        {
            lines.push(format!("Did you mean: {}?", suggestions.join(", ")));
            lines.push(String::new());
        }
        lines.push("Type 'help' for a list of available commands.".to_string());
        lines
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub lines: Vec<String>,
    /// Wipe the transcript instead of appending.
    pub clear: bool,
    pub request: Option<AppRequest>,
}

impl CommandOutput {
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn clear() -> Self {
        Self {
            clear: true,
            ..Self::default()
        }
    }

    pub fn with_request(mut self, request: AppRequest) -> Self {
        self.request = Some(request);
        self
    }
}

/// Host facts the system commands report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    pub user: String,
    pub host: String,
    pub os: &'static str,
}

impl SystemInfo {
    pub fn detect() -> Self {
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "guest".to_string());
        let host = hostname::get()
            .ok()
            .and_then(|s| s.into_string().ok())
            .unwrap_or_else(|| "unknown-host".to_string());
        Self {
            user,
            host,
            os: std::env::consts::OS,
        }
    }
}

pub struct CommandContext<'a> {
    pub registry: &'a CommandRegistry,
    /// Previously submitted lines, oldest first.
    pub history: &'a [String],
    pub now: SystemTime,
}

impl CommandContext<'_> {
    pub fn local_time(&self) -> DateTime<Local> {
        DateTime::from(self.now)
    }

    pub fn uptime(&self) -> Duration {
        self.now
            .duration_since(self.registry.started)
            .unwrap_or_default()
    }
}

pub type CommandFn = fn(&CommandContext<'_>, &[String]) -> CommandOutput;

#[derive(Clone, Copy)]
struct Command {
    group: CommandGroup,
    summary: &'static str,
    run: CommandFn,
}

/// Commands keyed by lower-case name.
pub struct CommandRegistry {
    commands: BTreeMap<&'static str, Command>,
    system: SystemInfo,
    fs: VirtualFs,
    started: SystemTime,
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .field("system", &self.system)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

impl CommandRegistry {
    pub fn new(system: SystemInfo) -> Self {
        Self {
            commands: BTreeMap::new(),
            system,
            fs: VirtualFs::default(),
            started: SystemTime::now(),
        }
    }

    pub fn with_defaults(system: SystemInfo) -> Self {
        use CommandGroup::*;
        let mut reg = Self::new(system);

        reg.register("ls", Files, "List files", cmd_ls);
        reg.register("cat", Files, "Display file contents", cmd_cat);
        reg.register("tree", Files, "Show directory structure", |ctx, _| {
            CommandOutput::lines(ctx.registry.fs.tree())
        });
        reg.register("find", Files, "Find files by name", cmd_find);

        reg.register("whoami", System, "Display current user", |ctx, _| {
            CommandOutput::lines([ctx.registry.system.user.clone()])
        });
        reg.register("pwd", System, "Show current directory", |ctx, _| {
            CommandOutput::lines([format!("/home/{}", ctx.registry.system.user)])
        });
        reg.register("date", System, "Show current date", |ctx, _| {
            CommandOutput::lines([format_date(&ctx.local_time())])
        });
        reg.register("time", System, "Show current time", |ctx, _| {
            CommandOutput::lines([format_time(&ctx.local_time())])
        });
        reg.register("uptime", System, "Show session uptime", |ctx, _| {
            CommandOutput::lines([format!("Session uptime: {}", format_uptime(ctx.uptime()))])
        });
        reg.register("uname", System, "Show system information", cmd_uname);
        reg.register("neofetch", System, "Display system info (fancy)", cmd_neofetch);
        reg.register("ps", System, "Show running processes", |_, _| {
            CommandOutput::lines([
                "PID     COMMAND".to_string(),
                "1       init".to_string(),
                format!("{:<8}{}", std::process::id(), env!("CARGO_PKG_NAME")),
            ])
        });

        reg.register("fortune", Fun, "Get a random programming quote", |_, _| {
            CommandOutput::lines([pick(QUOTES)])
        });
        reg.register("joke", Fun, "Get a programming joke", |_, _| {
            CommandOutput::lines([pick(JOKES)])
        });
        reg.register("coffee", Fun, "Brew some virtual coffee", |_, _| {
            CommandOutput::lines(COFFEE.lines())
        });
        reg.register("matrix", Fun, "Enter the Matrix", cmd_matrix);

        reg.register("help", Utilities, "Show this list", cmd_help);
        reg.register("clear", Utilities, "Clear the terminal", |_, _| CommandOutput::clear());
        reg.register("history", Utilities, "Show command history", cmd_history);
        reg.register("echo", Utilities, "Display text", |_, args| {
            CommandOutput::lines([args.join(" ")])
        });
        reg.register(
            "window",
            Utilities,
            "Control this window (minimize/maximize/close)",
            cmd_window,
        );
        reg.register("resume", Utilities, "Open the resume in the PDF viewer", |_, _| {
            CommandOutput::lines(["Opening resume in the PDF viewer..."])
                .with_request(AppRequest::Open(AppKind::PdfViewer))
        });
        reg.register("ai", Utilities, "Open AI Chat", |_, _| {
            CommandOutput::lines([
                "Opening AI Chat window...",
                "",
                "Type 'status' in the chat for details.",
            ])
            .with_request(AppRequest::Open(AppKind::AiChat))
        });
        reg.register("exit", Utilities, "Close the terminal", |_, _| {
            CommandOutput::lines(["Goodbye."])
                .with_request(AppRequest::Window(WindowCommand::Close))
        });
        reg
    }

    /// Pretend the session started at `started`, which `uptime` counts from.
    pub fn with_start_time(mut self, started: SystemTime) -> Self {
        self.started = started;
        self
    }

    pub fn register(
        &mut self,
        name: &'static str,
        group: CommandGroup,
        summary: &'static str,
        run: CommandFn,
    ) {
        self.commands.insert(
            name,
            Command {
                group,
                summary,
                run,
            },
        );
    }

    pub fn system(&self) -> &SystemInfo {
        &self.system
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.keys().copied()
    }

    /// Command names starting with `prefix`, alphabetically.
    pub fn completions(&self, prefix: &str) -> Vec<&'static str> {
        let prefix = prefix.to_lowercase();
        self.names().filter(|name| name.starts_with(&prefix)).collect()
    }

    /// Names that contain `name` or are contained in it.
    pub fn suggestions(&self, name: &str) -> Vec<String> {
        let name = name.to_lowercase();
        if name.is_empty() {
            return Vec::new();
        }
        self.names()
            .filter(|cmd| cmd.contains(name.as_str()) || name.contains(cmd))
            .take(MAX_SUGGESTIONS)
            .map(str::to_string)
            .collect()
    }

    /// Parse and run one input line. Blank input yields empty output.
    pub fn execute(
        &self,
        line: &str,
        history: &[String],
        now: SystemTime,
    ) -> Result<CommandOutput, CommandError> {
        let words = shell_words::split(line)?;
        let Some((name, args)) = words.split_first() else {
            return Ok(CommandOutput::default());
        };
        let key = name.to_lowercase();
        let Some(command) = self.commands.get(key.as_str()) else {
            return Err(CommandError::NotFound {
                name: name.clone(),
                suggestions: self.suggestions(&key),
            });
        };
        tracing::debug!(command = %key, args = args.len(), "running terminal command");
        let ctx = CommandContext {
            registry: self,
            history,
            now,
        };
        Ok((command.run)(&ctx, args))
    }
}

fn cmd_help(ctx: &CommandContext<'_>, _args: &[String]) -> CommandOutput {
    let mut lines = vec!["Available commands:".to_string()];
    for group in CommandGroup::ALL {
        let mut entries = ctx
            .registry
            .commands
            .iter()
            .filter(|(_, command)| command.group == group)
            .peekable();
        if entries.peek().is_none() {
            continue;
        }
        lines.push(String::new());
        lines.push(group.heading().to_string());
        for (name, command) in entries {
            lines.push(format!("  {name:<10} - {}", command.summary));
        }
    }
    lines.push(String::new());
    lines.push("Tab completes command names; Up/Down walk the history.".to_string());
    CommandOutput::lines(lines)
}

fn cmd_ls(ctx: &CommandContext<'_>, args: &[String]) -> CommandOutput {
    let fs = &ctx.registry.fs;
    let listing: Vec<(&str, &Node)> = match args.first() {
        None => fs.entries().collect(),
        Some(path) => match fs.get(path) {
            Some(Node::Dir { children, .. }) => children.iter().map(|(n, c)| (*n, c)).collect(),
            Some(node) => vec![(path.as_str(), node)],
            None => {
                return CommandOutput::lines([format!(
                    "ls: cannot access '{path}': No such file or directory"
                )]);
            }
        },
    };
    CommandOutput::lines(listing.into_iter().map(|(name, node)| {
        let name = if node.is_dir() {
            format!("{name}/")
        } else {
            name.to_string()
        };
        format!("{name:<18} - {}", node.summary())
    }))
}

fn cmd_cat(ctx: &CommandContext<'_>, args: &[String]) -> CommandOutput {
    let Some(path) = args.first() else {
        return CommandOutput::lines(["Usage: cat <filename>"]);
    };
    match ctx.registry.fs.read(path) {
        Ok(content) => CommandOutput::lines(content.lines()),
        Err(ReadError::NotFound) => {
            CommandOutput::lines([format!("cat: {path}: No such file or directory")])
        }
        Err(ReadError::IsDirectory) => CommandOutput::lines([format!("cat: {path}: Is a directory")]),
        Err(ReadError::Binary) => CommandOutput::lines([format!(
            "cat: {path}: cannot display binary file. Use 'resume' instead."
        )]),
    }
}

fn cmd_find(ctx: &CommandContext<'_>, args: &[String]) -> CommandOutput {
    let Some(term) = args.first() else {
        return CommandOutput::lines(["Usage: find <name>"]);
    };
    let term = term.to_lowercase();
    let found: Vec<String> = ctx
        .registry
        .fs
        .paths()
        .into_iter()
        .filter(|path| {
            let name = path.rsplit('/').next().unwrap_or(path.as_str());
            name.to_lowercase().contains(&term)
        })
        .collect();
    if found.is_empty() {
        return CommandOutput::lines([format!("No files found matching '{term}'")]);
    }
    CommandOutput::lines(found)
}

fn cmd_neofetch(ctx: &CommandContext<'_>, _args: &[String]) -> CommandOutput {
    let system = &ctx.registry.system;
    let title = format!("{}@{}", system.user, system.host);
    let rows = [
        ("OS", system.os.to_string()),
        ("Host", system.host.clone()),
        ("Uptime", format_uptime(ctx.uptime())),
        (
            "Terminal",
            format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        ),
        ("Commands", ctx.registry.commands.len().to_string()),
    ];
    let rows: Vec<String> = rows
        .iter()
        .map(|(label, value)| format!("{:<10}{value}", format!("{label}:")))
        .collect();
    let inner = rows
        .iter()
        .map(|row| row.width())
        .chain([title.width()])
        .max()
        .unwrap_or(0);
    let pad = |text: &str| format!("│ {text}{} │", " ".repeat(inner - text.width()));
    let rule = "─".repeat(inner + 2);

    let mut lines = vec![format!("╭{rule}╮"), pad(title.as_str()), format!("├{rule}┤")];
    lines.extend(rows.iter().map(|row| pad(row.as_str())));
    lines.push(format!("╰{rule}╯"));
    CommandOutput::lines(lines)
}

fn cmd_matrix(_ctx: &CommandContext<'_>, _args: &[String]) -> CommandOutput {
    let mut rng = rand::rng();
    let mut lines = vec!["Entering the Matrix...".to_string(), String::new()];
    for _ in 0..MATRIX_ROWS {
        lines.push(
            (0..MATRIX_COLUMNS)
                .map(|_| MATRIX_GLYPHS[rng.random_range(0..MATRIX_GLYPHS.len())])
                .collect(),
        );
    }
    lines.push(String::new());
    lines.push("Welcome to the real world.".to_string());
    CommandOutput::lines(lines)
}

fn pick(items: &[&'static str]) -> &'static str {
    if items.is_empty() {
        return "";
    }
    items[rand::rng().random_range(0..items.len())]
}

fn cmd_history(ctx: &CommandContext<'_>, _args: &[String]) -> CommandOutput {
    if ctx.history.is_empty() {
        return CommandOutput::lines(["No commands in history"]);
    }
    CommandOutput::lines(
        ctx.history
            .iter()
            .enumerate()
            .map(|(idx, cmd)| format!("{}  {}", idx + 1, cmd)),
    )
}

fn cmd_uname(ctx: &CommandContext<'_>, _args: &[String]) -> CommandOutput {
    let system = &ctx.registry.system;
    CommandOutput::lines([
        system.os.to_string(),
        format!("Host: {}", system.host),
        format!(
            "Terminal: {} {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ),
    ])
}

fn cmd_window(_ctx: &CommandContext<'_>, args: &[String]) -> CommandOutput {
    let action = args.first().map(|a| a.to_lowercase());
    let (message, command) = match action.as_deref() {
        Some("min" | "minimize") => ("Window minimized", WindowCommand::Minimize),
        Some("max" | "maximize") => ("Window maximized", WindowCommand::Maximize),
        Some("close") => ("Closing window...", WindowCommand::Close),
        _ => return CommandOutput::lines(WINDOW_USAGE.lines()),
    };
    CommandOutput::lines([message]).with_request(AppRequest::Window(command))
}

/// Long form date, e.g. `Saturday, June 1, 2024`.
pub fn format_date<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    time.format("%A, %B %-d, %Y").to_string()
}

/// Wall clock time with its UTC offset, e.g. `06:15:00 (UTC+05:45)`.
pub fn format_time<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    time.format("%H:%M:%S (UTC%:z)").to_string()
}

/// `uptime`-style duration: `H:MM`, prefixed by whole days.
pub fn format_uptime(elapsed: Duration) -> String {
    let minutes = elapsed.as_secs() / 60;
    let (days, hours, minutes) = (minutes / 1440, minutes / 60 % 24, minutes % 60);
    match days {
        0 => format!("{hours}:{minutes:02}"),
        1 => format!("1 day, {hours}:{minutes:02}"),
        days => format!("{days} days, {hours}:{minutes:02}"),
    }
}
