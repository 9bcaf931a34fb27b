use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use allowance_doctor::app::{App, InputField, InputMode, StatusLevel};
use allowance_doctor::config::{self, ChainConfig, Overrides};
use allowance_doctor::infrastructure::runtime::{RuntimeBridge, WalletCommand};
use allowance_doctor::ui;

#[derive(Debug, Parser)]
#[command(
    name = "allowance-doctor",
    version,
    about = "Terminal DApp for checking and recording ERC-20 allowance hygiene"
)]
struct Args {
    /// HTTP JSON-RPC endpoint for Sepolia
    #[arg(long, env = "DOCTOR_RPC_URL")]
    rpc: Option<String>,

    /// Hygiene log contract address
    #[arg(long, env = "DOCTOR_CONTRACT_ADDRESS")]
    contract: Option<String>,

    /// Token address preloaded into the token input
    #[arg(long, env = "DOCTOR_TOKEN_ADDRESS")]
    token: Option<String>,

    /// Spender address preloaded into the spender input
    #[arg(long, env = "DOCTOR_SPENDER_ADDRESS")]
    spender: Option<String>,

    /// File containing the hex-encoded wallet private key
    /// (DOCTOR_PRIVATE_KEY takes precedence when set)
    #[arg(long, env = "DOCTOR_KEY_FILE")]
    key_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let file = config::load();
    let chain_config = ChainConfig::resolve(
        Overrides {
            rpc: args.rpc,
            contract: args.contract,
            token: args.token,
            spender: args.spender,
            key_file: args.key_file,
        },
        file,
    );

    init_tracing();

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runtime = RuntimeBridge::new(chain_config.clone())?;

    let mut app = App::new(chain_config);
    app.set_status("Press c to connect your wallet", StatusLevel::Info);

    let res = run_app(&mut terminal, app, runtime);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{err:?}");
    }

    Ok(())
}

/// Log to a file under the data dir; stdout belongs to the TUI.
fn init_tracing() {
    let Some(path) = config::log_file_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: RuntimeBridge,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, &runtime);
        terminal.draw(|f| ui::draw(f, &mut app))?;
        if app.should_quit {
            let _ = runtime.send(WalletCommand::Shutdown);
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut app, key);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }

        pump_background(&mut app, &runtime);
    }
}

fn pump_background(app: &mut App, runtime: &RuntimeBridge) {
    for event in runtime.poll_events() {
        app.apply_event(event);
    }
    for cmd in app.take_commands() {
        let _ = runtime.send(cmd);
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if app.help_open {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
            app.help_open = false;
        }
        return;
    }

    if app.confirm_open {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => app.resolve_confirm(true),
            KeyCode::Char('n') | KeyCode::Esc => app.resolve_confirm(false),
            _ => {}
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing(_) => handle_edit_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.help_open = true,
        KeyCode::Char('c') => app.request_connect(),
        KeyCode::Char('d') => app.request_disconnect(),
        KeyCode::Char('r') => app.refresh_queries(),
        KeyCode::Char('m') => app.request_mark_cleaned(),
        KeyCode::Char('y') => copy_tx_link(app),
        KeyCode::Char('t') => app.start_editing(InputField::Token),
        KeyCode::Char('s') => app.start_editing(InputField::Spender),
        KeyCode::Tab => app.cycle_focus(),
        KeyCode::Enter => app.start_editing(app.focus),
        _ => {}
    }
}

fn handle_edit_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => app.stop_editing(),
        KeyCode::Backspace => app.input_backspace(),
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            app.input_char(ch);
        }
        _ => {}
    }
}

fn copy_tx_link(app: &mut App) {
    use arboard::Clipboard;

    let Some(url) = app.explorer_tx_url() else {
        app.set_status("No transaction to copy yet", StatusLevel::Warn);
        return;
    };

    match Clipboard::new() {
        Ok(mut clipboard) => {
            if clipboard.set_text(&url).is_ok() {
                app.set_status(format!("Copied {url}"), StatusLevel::Info);
            } else {
                app.set_status("Failed to copy to clipboard", StatusLevel::Error);
            }
        }
        Err(_) => {
            app.set_status("Clipboard not available", StatusLevel::Error);
        }
    }
}
