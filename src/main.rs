use clap::Parser;
use color_eyre::Result;
use csvscope::logging::{init_logging, LogTarget};
use csvscope::{App, AppConfig, AppEvent, Args, CacheManager, ConfigManager, OpenOptions, Theme};
use ratatui::DefaultTerminal;
use std::sync::mpsc::channel;
use std::time::Duration;
use tracing::info;

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, args: &Args, config: AppConfig) -> Result<()> {
    let (tx, rx) = channel::<AppEvent>();
    let theme = Theme::from_config(&config.theme)?;
    let opts = OpenOptions::from_args_and_config(args, &config);
    let poll_interval = Duration::from_millis(config.performance.event_poll_interval_ms);

    let mut app = App::new_with_config(tx.clone(), theme, &config, opts);
    if args.debug {
        app.enable_debug();
    }
    render(&mut terminal, &mut app)?;
    for path in &args.paths {
        tx.send(AppEvent::Open(path.clone()))?;
    }
    if let Some(y) = &args.y {
        tx.send(AppEvent::SelectY(y.clone()))?;
    }

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.clear_cache {
        match CacheManager::new(csvscope::APP_NAME) {
            Ok(cache) => {
                if let Err(e) = cache.clear_all() {
                    eprintln!("Error clearing cache: {}", e);
                    std::process::exit(1);
                }
                println!("Cache cleared successfully");
            }
            Err(_e) => println!("No cache to clear"),
        }
        return Ok(Some(()));
    }

    if args.generate_config {
        let manager = ConfigManager::new(csvscope::APP_NAME)?;
        match manager.write_default_config(args.force) {
            Ok(path) => println!("Wrote default configuration to {}", path.display()),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(Some(()));
    }

    Ok(None)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;
    let config = AppConfig::load(csvscope::APP_NAME)?;
    let debug = args.debug || config.debug.enabled;

    if args.is_headless() {
        init_logging(&LogTarget::Stderr, debug)?;
        csvscope::run_headless(&args, &config)?;
        return Ok(());
    }

    let cache = CacheManager::new(csvscope::APP_NAME)?;
    init_logging(&LogTarget::cache_file(&cache), debug)?;
    info!(files = args.paths.len(), "starting");

    let terminal = ratatui::init();
    let result = run(terminal, &args, config);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
