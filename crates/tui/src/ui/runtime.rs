//! Runtime: terminal lifecycle and the single async event loop.
//!
//! - A dedicated blocking task reads `crossterm` events and forwards them over
//!   a channel, keeping `poll()` and `read()` on one OS thread.
//! - Fetch completions from every form field arrive through
//!   `HorseForm::next_outcome` and are applied on this task, so field state is
//!   only ever touched here.
//! - Ticking is fast (100 ms) while a field is loading so the throbber spins,
//!   and slow otherwise.

use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, prelude::CrosstermBackend};
use tokio::{
    signal,
    sync::mpsc,
    time::{self, MissedTickBehavior},
};
use tracing::{info, warn};

use crate::{
    app::{App, Control},
    ui::main_view,
};

type Backend = CrosstermBackend<std::io::Stdout>;

const FAST_TICK: Duration = Duration::from_millis(100);
const IDLE_TICK: Duration = Duration::from_millis(2000);

fn spawn_input_thread() -> mpsc::Receiver<Event> {
    let (sender, receiver) = mpsc::channel(256);
    tokio::task::spawn_blocking(move || {
        let poll_interval = Duration::from_millis(50);
        loop {
            match event::poll(poll_interval) {
                Ok(false) => {
                    if sender.is_closed() {
                        break;
                    }
                }
                Ok(true) => match event::read() {
                    Ok(event) => {
                        if sender.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        warn!(error = %error, "failed to read terminal event");
                        break;
                    }
                },
                Err(error) => {
                    warn!(error = %error, "failed to poll terminal events");
                    break;
                }
            }
        }
    });
    receiver
}

fn setup_terminal() -> Result<Terminal<Backend>> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("create terminal")
}

fn cleanup_terminal(terminal: &mut Terminal<Backend>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn render(terminal: &mut Terminal<Backend>, app: &App) -> Result<()> {
    terminal.draw(|frame| main_view::draw(frame, app))?;
    Ok(())
}

/// Set up the terminal, run the event loop until the user quits, and restore
/// the terminal even when the loop fails.
pub async fn run_app(mut app: App) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut app).await;
    cleanup_terminal(&mut terminal)?;
    result
}

async fn event_loop(terminal: &mut Terminal<Backend>, app: &mut App) -> Result<()> {
    let mut input_receiver = spawn_input_thread();

    let mut current_interval = IDLE_TICK;
    let mut ticker = time::interval(current_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    render(terminal, app)?;
    info!("paddock tui started");

    loop {
        let target_interval = if app.form.is_loading() { FAST_TICK } else { IDLE_TICK };
        if target_interval != current_interval {
            current_interval = target_interval;
            ticker = time::interval(current_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }

        let needs_render = tokio::select! {
            maybe_event = input_receiver.recv() => {
                let Some(event) = maybe_event else {
                    break;
                };
                match event {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if app.handle_key(key) == Control::Exit {
                            break;
                        }
                        true
                    }
                    Event::Resize(_, _) => true,
                    _ => false,
                }
            }

            outcome = app.form.next_outcome() => {
                app.apply_outcome(outcome);
                true
            }

            _ = ticker.tick() => app.tick(),

            _ = signal::ctrl_c() => break,
        };

        if needs_render {
            render(terminal, app)?;
        }
    }

    info!("paddock tui stopped");
    Ok(())
}
