use crate::tui::app::StudyCard;
use crate::tui::theme::*;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};
use studyset_core::SetOverview;

pub enum RightPane<'a> {
    Idle,
    Card {
        card: &'a StudyCard,
        flipped: bool,
        idx: usize,
        total: usize,
    },
    Empty(&'a str),
}

pub fn draw_ui(f: &mut Frame, area: Rect, sets: &[SetOverview], sel: usize, right: RightPane) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);
    draw_sets(f, chunks[0], sets, sel);
    draw_right(f, chunks[1], right);

    let foot = Paragraph::new(Line::from(vec![
        Span::raw(" ↑/k ↓/j select  "),
        Span::raw(" Enter study  "),
        Span::raw(" space flip  "),
        Span::raw(" n/p next/prev  "),
        Span::raw(" Esc back  "),
        Span::raw(" q quit "),
    ]))
    .style(footer_style())
    .block(Block::default().borders(Borders::TOP));
    let fh = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };
    f.render_widget(foot, fh);
}

fn draw_sets(f: &mut Frame, area: Rect, sets: &[SetOverview], sel: usize) {
    let items: Vec<_> = sets
        .iter()
        .enumerate()
        .map(|(i, o)| {
            let label = format!("{} ({})", o.set.title, o.term_count);
            let s = if i == sel {
                Line::from(label).style(selected_style())
            } else {
                Line::from(label)
            };
            ListItem::new(s)
        })
        .collect();

    let title = Paragraph::new(Line::from(vec![Span::raw("Study Sets").style(title_style())]));
    let th = Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height: 1,
    };
    f.render_widget(title, th);

    let list_area = Rect {
        x: area.x,
        y: area.y + 1,
        width: area.width,
        height: area.height.saturating_sub(1),
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL));
    f.render_widget(list, list_area);
}

fn draw_right(f: &mut Frame, area: Rect, pane: RightPane) {
    match pane {
        RightPane::Idle => {
            let p = Paragraph::new("Press Enter to study the selected set.")
                .wrap(Wrap { trim: true })
                .block(Block::default().title("Study").borders(Borders::ALL));
            f.render_widget(p, area);
        }
        RightPane::Empty(msg) => {
            let p = Paragraph::new(msg)
                .wrap(Wrap { trim: true })
                .block(Block::default().title("Study").borders(Borders::ALL));
            f.render_widget(p, area);
        }
        RightPane::Card {
            card,
            flipped,
            idx,
            total,
        } => {
            let title = Block::default().title("Study").borders(Borders::ALL);
            let inner = Rect {
                x: area.x + 1,
                y: area.y + 1,
                width: area.width.saturating_sub(2),
                height: area.height.saturating_sub(2),
            };
            f.render_widget(title, area);

            let progress = Paragraph::new(Line::from(format!("{} / {}", idx + 1, total)));
            f.render_widget(progress, inner);

            let body_area = Rect {
                x: inner.x,
                y: inner.y + 2,
                width: inner.width,
                height: inner.height.saturating_sub(2),
            };
            let mut text = if flipped {
                vec![Line::from(vec![
                    Span::raw("Definition: ").style(title_style()),
                    Span::raw(&card.text),
                ])]
            } else {
                vec![Line::from(vec![
                    Span::raw("Term: ").style(title_style()),
                    Span::raw(&card.word),
                ])]
            };
            if flipped && !card.image_url.is_empty() {
                text.push(Line::from(vec![
                    Span::raw("image: ").style(image_style()),
                    Span::raw(&card.image_url),
                ]));
            }
            let p = Paragraph::new(text).wrap(Wrap { trim: true });
            f.render_widget(p, body_area);
        }
    }
}
