use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::{event::DisableMouseCapture, event::EnableMouseCapture, execute};
use log::info;
use ratatui::layout::Rect;
use ratatui::{DefaultTerminal, Frame};

use crate::cli::Settings;
use crate::core::monitor::CpuMonitor;
use crate::core::scheduler::RefreshWorker;
use crate::core::source::SysinfoSource;
use crate::widgets::OverlayWidget;

pub struct App {
    pub overlay: OverlayWidget,
    worker: RefreshWorker,
    pub exit: bool,
    pub frame_rate: Duration,
    pub mouse_enabled: bool,
    pub screen: Rect,
}

impl App {
    /// Builds the monitor and hands it to the refresh worker. From here on the
    /// UI only sees the published snapshot.
    pub fn new(settings: &Settings) -> io::Result<Self> {
        let monitor = CpuMonitor::new(SysinfoSource::new(), settings.ranking);
        let overlay = OverlayWidget::new(monitor.snapshot_handle(), settings.ranking.top_k);
        let worker = RefreshWorker::spawn(Arc::new(Mutex::new(monitor)), settings.interval)?;

        Ok(App {
            overlay,
            worker,
            exit: false,
            frame_rate: Duration::from_millis(100),
            mouse_enabled: false,
            screen: Rect::default(),
        })
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        if let Ok(()) = execute!(std::io::stdout(), EnableMouseCapture) {
            self.mouse_enabled = true;
        }

        let result = self.run_loop(terminal);
        self.worker.shutdown();

        if self.mouse_enabled {
            let _ = execute!(std::io::stdout(), DisableMouseCapture);
        }

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        while !self.exit {
            terminal.draw(|frame| self.draw(frame))?;

            if event::poll(self.frame_rate)? {
                self.handle_events()?;
            }
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        self.screen = frame.area();
        frame.render_widget(&self.overlay, self.screen);
    }

    fn handle_events(&mut self) -> io::Result<()> {
        match event::read()? {
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                self.handle_key_event(key_event)
            }
            Event::Mouse(mouse_event) => self.handle_mouse_event(mouse_event),
            _ => {}
        };
        Ok(())
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => self.exit(),
            KeyCode::Char('r') => self.worker.request_reset(),
            _ => {}
        }
    }

    fn handle_mouse_event(&mut self, mouse_event: MouseEvent) {
        if !self.mouse_enabled {
            return;
        }

        match mouse_event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.overlay
                    .press(mouse_event.column, mouse_event.row, self.screen);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.overlay
                    .drag_to(mouse_event.column, mouse_event.row, self.screen);
            }
            MouseEventKind::Up(MouseButton::Left) => self.overlay.release(),
            MouseEventKind::Down(MouseButton::Right) | MouseEventKind::Up(MouseButton::Right) => {
                self.exit()
            }
            _ => {}
        }
    }

    fn exit(&mut self) {
        info!("exit requested");
        self.exit = true
    }
}
