use color_eyre::eyre::WrapErr;
use crossterm::event::EventStream;
use futures::StreamExt;
use keygate::app::{App, AppServices};
use keygate::clipboard::SystemClipboard;
use keygate::Config;
use keygate_store::{FileFlagStore, FileProviderStore};
use ratatui::crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use ratatui::crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const TICK: Duration = Duration::from_millis(50);

fn init_logging(data_dir: &Path, level: &str) -> color_eyre::Result<()> {
    let log_path = data_dir.join("keygate.log");
    let file = File::create(&log_path)
        .wrap_err_with(|| format!("creating log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let config = Config::load_or_default(&Config::default_path());
    let data_dir = config.data_dir().wrap_err("resolving data directory")?;
    init_logging(&data_dir, &config.log_level)?;
    tracing::info!(dir = %data_dir.display(), "keygate starting");

    let rt = tokio::runtime::Runtime::new()?;

    terminal::enable_raw_mode()?;
    let mut terminal = ratatui::init();
    ratatui::crossterm::execute!(io::stdout(), EnterAlternateScreen, EnableBracketedPaste)?;

    let result = rt.block_on(run(&mut terminal, config, &data_dir));

    let _ = ratatui::crossterm::execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    ratatui::restore();

    if let Err(ref e) = result {
        tracing::error!("keygate exited with error: {e:#}");
    }
    result
}

async fn run(
    terminal: &mut ratatui::DefaultTerminal,
    config: Config,
    data_dir: &Path,
) -> color_eyre::Result<()> {
    let providers = Arc::new(FileProviderStore::open(data_dir).wrap_err("opening provider store")?);
    let flags = Arc::new(FileFlagStore::open(data_dir).wrap_err("opening flag store")?);
    let services = AppServices {
        credentials: providers.clone(),
        models: providers,
        flags,
        clipboard: Arc::new(SystemClipboard),
    };

    let mut app = App::new(config, services);
    app.init();

    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(TICK);

    loop {
        terminal.draw(|frame| app.render(frame))?;

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(event)) => {
                    if app.handle_event(event).await {
                        break;
                    }
                }
                Some(Err(e)) => return Err(e).wrap_err("reading terminal events"),
                None => break,
            },
            _ = tick.tick() => {
                app.pump().await;
            }
        }

        if app.should_quit {
            break;
        }
    }

    app.shutdown();
    tracing::info!("keygate stopped");
    Ok(())
}
