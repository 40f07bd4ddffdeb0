use crate::tui::{
    inputs::{map_event, Action},
    views::{self, RightPane},
};
use crossterm::{
    event::{self},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stdout, Stdout};
use std::sync::Arc;
use studyset_core::{codec, overview, Repository, SetOverview};
use tokio::runtime::Runtime;

/// One card of the open set, definition already unpacked for display.
pub struct StudyCard {
    pub word: String,
    pub text: String,
    pub image_url: String,
}

pub struct TuiApp {
    pub repo: Arc<dyn Repository>,
    pub rt: Arc<Runtime>,
    sets: Vec<SetOverview>,
    sel: usize,
    cards: Vec<StudyCard>,
    idx: usize,
    flipped: bool,
    in_study: bool,
}

impl TuiApp {
    pub fn new(repo: Arc<dyn Repository>, rt: Arc<Runtime>) -> Self {
        Self {
            repo,
            rt,
            sets: vec![],
            sel: 0,
            cards: vec![],
            idx: 0,
            flipped: false,
            in_study: false,
        }
    }

    fn load_sets(&mut self) {
        let sets = self.rt.block_on(self.repo.list_study_sets(None)).unwrap_or_default();
        let terms = self.rt.block_on(self.repo.list_terms(None)).unwrap_or_default();
        self.sets = overview::summarize_sets(&sets, &terms);
        self.sel = self.sel.min(self.sets.len().saturating_sub(1));
    }

    fn open_study(&mut self) {
        self.cards.clear();
        self.idx = 0;
        self.flipped = false;
        if self.sets.is_empty() {
            return;
        }
        let sid = self.sets[self.sel].set.id;
        let terms = self.rt.block_on(self.repo.list_terms(Some(sid))).unwrap_or_default();
        self.cards = terms
            .into_iter()
            .map(|t| {
                let d = codec::decode(&t.definition);
                StudyCard {
                    word: t.word,
                    text: d.text,
                    image_url: d.image_url,
                }
            })
            .collect();
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        self.load_sets();

        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.mainloop(&mut terminal);

        disable_raw_mode().ok();
        let mut out: Stdout = std::io::stdout();
        execute!(out, LeaveAlternateScreen).ok();
        terminal.show_cursor().ok();

        res
    }

    fn mainloop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
        loop {
            terminal.draw(|f| {
                let right = if self.in_study {
                    if let Some(card) = self.cards.get(self.idx) {
                        RightPane::Card {
                            card,
                            flipped: self.flipped,
                            idx: self.idx,
                            total: self.cards.len(),
                        }
                    } else {
                        RightPane::Empty("No cards in this set.")
                    }
                } else {
                    RightPane::Idle
                };
                views::draw_ui(f, f.size(), &self.sets, self.sel, right);
            })?;

            if event::poll(std::time::Duration::from_millis(100))? {
                let ev = event::read()?;
                match map_event(ev) {
                    Action::Quit => break,
                    Action::Back => {
                        if self.in_study {
                            self.in_study = false;
                        } else {
                            break;
                        }
                    }
                    Action::Up => {
                        if !self.in_study {
                            self.sel = self.sel.saturating_sub(1);
                        }
                    }
                    Action::Down => {
                        if !self.in_study && self.sel + 1 < self.sets.len() {
                            self.sel += 1;
                        }
                    }
                    Action::Enter => {
                        if !self.in_study {
                            self.open_study();
                            self.in_study = true;
                        }
                    }
                    Action::Flip => {
                        if self.in_study {
                            self.flipped = !self.flipped;
                        }
                    }
                    Action::Next => {
                        if self.in_study && self.idx + 1 < self.cards.len() {
                            self.idx += 1;
                            self.flipped = false;
                        }
                    }
                    Action::Prev => {
                        if self.in_study && self.idx > 0 {
                            self.idx -= 1;
                            self.flipped = false;
                        }
                    }
                    Action::None => {}
                }
            }
        }
        Ok(())
    }
}
