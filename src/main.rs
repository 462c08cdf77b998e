use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use typecycle::app::App;
use typecycle::config::Config;
use typecycle::event::{AppEvent, EventHandler};
use typecycle::logging;
use typecycle::store::{JsonStore, LifetimeStore};
use typecycle::ui::components::stats_bar::{RunSnapshot, StatsBar};
use typecycle::ui::components::typing_area::TypingArea;
use typecycle::ui::components::weakness_panel::{WeaknessPanel, format_lifetime_entry};
use typecycle::ui::layout::{AppLayout, pack_hint_lines};
use typecycle::ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "typecycle",
    version,
    about = "Terminal typing trainer that targets your weakest bigrams"
)]
struct Cli {
    #[arg(short, long, help = "Runs per cycle")]
    runs: Option<usize>,

    #[arg(short, long, help = "Words per prompt")]
    words: Option<usize>,

    #[arg(long, help = "Use the bundled word list only")]
    offline: bool,

    #[arg(long, help = "Do not read or write saved progress")]
    no_persist: bool,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Print lifetime weak bigrams and exit")]
    stats: bool,

    #[arg(long, help = "Delete all saved progress and exit")]
    reset: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: could not load config ({e:#}), using defaults");
        Config::default()
    });
    if let Some(runs) = cli.runs {
        config.runs_per_cycle = runs;
    }
    if let Some(words) = cli.words {
        config.words_per_prompt = words;
    }
    if cli.offline {
        config.network_enabled = false;
    }
    if let Some(theme) = cli.theme.clone() {
        config.theme = theme;
    }
    config.validate();

    let _log_guard = match logging::init(&Config::data_dir(), &config.log_level) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled ({e})");
            None
        }
    };

    if cli.reset {
        let mut store = JsonStore::open_default().context("opening store")?;
        store.reset_all().context("resetting store")?;
        println!("Cleared saved progress in {}", store.base_dir().display());
        return Ok(());
    }
    if cli.stats {
        return print_stats(&config);
    }

    let theme = Theme::load(&config.theme).unwrap_or_else(|| {
        tracing::warn!(theme = %config.theme, "Unknown theme, using default");
        Theme::default()
    });
    let mut app = App::new(config, !cli.no_persist);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(50));

    let result = run_app(&mut terminal, &mut app, &theme, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = %err, "Exited with error");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn print_stats(config: &Config) -> Result<()> {
    let store = JsonStore::open_default().context("opening store")?;
    let entries = store
        .load_lifetime_weaknesses(config.lifetime_min_attempts, config.top_n)
        .context("reading lifetime stats")?;
    let runs = store.recent_runs(usize::MAX)?;

    println!("Saved runs: {}", runs.len());
    if !runs.is_empty() {
        let avg_wpm = runs.iter().map(|r| r.wpm).sum::<f64>() / runs.len() as f64;
        let avg_acc = runs.iter().map(|r| r.accuracy).sum::<f64>() / runs.len() as f64;
        println!("Average: {avg_wpm:.0} wpm, {avg_acc:.0}% accuracy");
    }
    if entries.is_empty() {
        println!(
            "No weak bigrams yet (each needs at least {} attempts).",
            config.lifetime_min_attempts
        );
    } else {
        println!("Lifetime weak bigrams:");
        for (i, entry) in entries.iter().enumerate() {
            println!("  {}", format_lifetime_entry(i + 1, entry));
        }
    }
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    theme: &Theme,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app, theme))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick | AppEvent::Resize => {}
        }
        app.tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => app.should_quit = true,
        KeyCode::Char('r') if ctrl => app.reset_data(),
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Tab => app.restart(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Char(_) if ctrl || key.modifiers.contains(KeyModifiers::ALT) => {}
        KeyCode::Char(ch) => app.type_char(ch),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App, theme: &Theme) {
    let area = frame.area();
    let colors = &theme.colors;
    let layout = AppLayout::new(area);

    let snapshot = RunSnapshot {
        wpm: app.run.wpm_at(Instant::now()),
        accuracy: app.run.accuracy(),
        run_number: app.run_number(),
        runs_per_cycle: app.config.runs_per_cycle,
        cycle: app.cycle_count,
    };
    frame.render_widget(
        StatsBar::new(snapshot, app.status.as_deref(), theme),
        layout.header,
    );

    frame.render_widget(
        TypingArea::new(&app.run, &app.weak_bigrams, app.is_transitioning(), theme),
        layout.main,
    );

    if let Some(panel_area) = layout.weakness {
        frame.render_widget(
            WeaknessPanel::new(&app.weaknesses, &app.weak_bigrams, app.coverage, theme),
            panel_area,
        );
    }

    let hints = [
        "[Esc] Quit",
        "[Tab] New prompts",
        "[Backspace] Delete",
        "[Ctrl+R] Reset progress",
    ];
    let lines: Vec<Line> = pack_hint_lines(&hints, layout.footer.width as usize)
        .into_iter()
        .map(Line::from)
        .collect();
    frame.render_widget(
        Paragraph::new(lines).style(Style::default().fg(colors.text_pending())),
        layout.footer,
    );
}
