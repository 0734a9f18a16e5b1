use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use ratatui::layout::Rect;
use tracing::Level;

use folio_wm::apps::{AppKind, ChatEngineKind, CommandRegistry, SystemInfo};
use folio_wm::config::{ConfigError, WmConfig};
use folio_wm::constants::CLOSE_DELAY_MS;
use folio_wm::desktop::{Desktop, DesktopOptions};
use folio_wm::drivers::InputDriver;
use folio_wm::drivers::console::{ConsoleInputDriver, ConsoleSession};
use folio_wm::event_loop::{ControlFlow, EventLoop, LoopHandler};
use folio_wm::tracing_sub::{self, LogTarget};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(
    name = "folio-wm",
    version = env!("CARGO_PKG_VERSION"),
    about = "A desktop of floating windows inside your terminal"
)]
struct Cli {
    /// Length of the window close animation.
    #[arg(long = "close-delay-ms", value_name = "MS", default_value_t = CLOSE_DELAY_MS)]
    close_delay_ms: u64,

    /// Cascade offset, in cells, between instances of the same app.
    #[arg(long, value_name = "CELLS")]
    stagger: Option<i32>,

    /// Forget closed windows after this many seconds instead of keeping them.
    #[arg(long = "retain-closed-secs", value_name = "SECONDS")]
    retain_closed_secs: Option<u64>,

    /// Append logs to this file. Logs are discarded otherwise.
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[arg(long = "log-level", value_name = "LEVEL", default_value_t = Level::INFO)]
    log_level: Level,

    /// Start with an empty desktop instead of a terminal window.
    #[arg(long = "no-autostart")]
    no_autostart: bool,

    /// Document opened by the PDF viewer and attached to chat windows.
    #[arg(long, value_name = "PATH")]
    document: Option<PathBuf>,

    #[arg(long = "document-pages", value_name = "N", default_value_t = 1)]
    document_pages: usize,

    /// Engine behind AI chat windows.
    #[arg(long = "chat-engine", value_enum, default_value_t = ChatEngineKind::Local)]
    chat_engine: ChatEngineKind,

    /// Rows taken by each window's title bar.
    #[arg(long = "titlebar-height", value_name = "ROWS")]
    titlebar_height: Option<u32>,

    /// Open desktop icons with a single tap.
    #[arg(long)]
    touch: bool,
}

impl TryFrom<&Cli> for WmConfig {
    type Error = ConfigError;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        let mut config = WmConfig::terminal();
        config.close_delay = Duration::from_millis(cli.close_delay_ms);
        if let Some(stagger) = cli.stagger {
            config.stagger_offset = stagger;
        }
        config.closed_retention = cli.retain_closed_secs.map(Duration::from_secs);
        if let Some(height) = cli.titlebar_height {
            config.titlebar_height = height;
        }
        config.validate()?;
        Ok(config)
    }
}

struct App {
    session: ConsoleSession,
    desktop: Desktop,
}

impl LoopHandler<ConsoleInputDriver> for App {
    fn next_deadline(&self) -> Option<Instant> {
        self.desktop.next_deadline()
    }

    fn handle(
        &mut self,
        _driver: &mut ConsoleInputDriver,
        event: Option<crossterm::event::Event>,
        now: Instant,
    ) -> io::Result<ControlFlow> {
        match event {
            Some(event) => self.desktop.handle_event(&event, now),
            None => {
                self.desktop.tick(now);
                let desktop = &self.desktop;
                self.session
                    .terminal()
                    .draw(|frame| desktop.render(frame.buffer_mut()))?;
            }
        }
        if self.desktop.should_quit() {
            Ok(ControlFlow::Quit)
        } else {
            Ok(ControlFlow::Continue)
        }
    }
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let config = WmConfig::try_from(&cli).map_err(io::Error::other)?;
    let log_target = cli
        .log_file
        .clone()
        .map(LogTarget::File)
        .unwrap_or_default();
    tracing_sub::init(&log_target, cli.log_level)?;
    tracing::info!(?config, "starting desktop");

    let mut session = ConsoleSession::enter()?;
    let size = session.terminal().size()?;
    let options = DesktopOptions {
        document: cli.document.clone(),
        document_pages: cli.document_pages,
        chat_engine: cli.chat_engine,
        touch: cli.touch,
        ..DesktopOptions::default()
    };
    let mut desktop = Desktop::new(
        config,
        Rect::new(0, 0, size.width, size.height),
        CommandRegistry::with_defaults(SystemInfo::detect()),
        options,
    );
    if !cli.no_autostart {
        desktop.open_app(AppKind::Terminal);
    }

    let mut event_loop = EventLoop::new(ConsoleInputDriver::new(), FRAME_INTERVAL);
    event_loop.driver().set_mouse_capture(true)?;
    let mut app = App { session, desktop };
    let result = event_loop.run(&mut app);

    app.session.exit()?;
    tracing::info!("desktop closed");
    result
}
