use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use crate::card::{Flashcard, MAX_CARDS, MIN_CARDS, MIN_SOURCE_CHARS};
use crate::error::format_error_lines;
use crate::export::{ExportPaths, save_cards};
use crate::llm::{LlmClient, ensure_client};
use crate::palette::Palette;
use crate::pipeline::{GenerationError, GenerationPipeline};
use crate::tui::{Editor, Theme};

const FLASH_SECS: f64 = 2.0;
const COUNT_TYPE_CAP: u32 = 999;

const SAMPLE_TEXT: &str = "Machine Learning is a subset of Artificial Intelligence that enables \
computers to learn from data without being explicitly programmed. There are three main types: \
Supervised Learning (labeled data), Unsupervised Learning (unlabeled data), and Reinforcement \
Learning (reward-based). Common algorithms include Linear Regression, Decision Trees, Neural \
Networks, and K-Means Clustering. Applications range from image recognition to recommendation \
systems.";

pub async fn run(
    input: Option<PathBuf>,
    count: u32,
    output_dir: PathBuf,
    sample: bool,
) -> Result<()> {
    if input.is_some() || sample {
        run_plain(input, count, &output_dir).await
    } else {
        run_session(count, output_dir).await
    }
}

/// Non-interactive path: study text from a file (or the built-in sample),
/// cards to stdout, exports to disk.
async fn run_plain(input: Option<PathBuf>, count: u32, output_dir: &Path) -> Result<()> {
    let source_text = match input {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => SAMPLE_TEXT.to_string(),
    };

    let client = Arc::new(ensure_client(&key_prompt())?);
    println!(
        "{} is generating {} flashcards with {}...",
        Palette::paint(Palette::INFO, "cardsmith"),
        Palette::paint(Palette::WARNING, count),
        Palette::dim(client.model()),
    );

    let pipeline = GenerationPipeline::new(client);
    let cards = pipeline.run(&source_text, count).await?;

    println!(
        "\n{} {} flashcard{}",
        Palette::paint(Palette::SUCCESS, "Generated"),
        cards.len(),
        if cards.len() == 1 { "" } else { "s" }
    );
    for (index, card) in cards.iter().enumerate() {
        println!(
            "\n{} {}",
            Palette::paint(Palette::INFO, format!("{}.", index + 1)),
            card.question
        );
        println!("   {}", Palette::dim(&card.answer));
    }

    let paths = save_cards(output_dir, &cards, Local::now())?;
    println!(
        "\nSaved {} and {}",
        Palette::paint(Palette::SUCCESS, paths.csv.display()),
        Palette::paint(Palette::SUCCESS, paths.json.display()),
    );
    Ok(())
}

fn key_prompt() -> String {
    format!(
        "\n{} turns study notes into flashcards with an LLM.",
        Palette::paint(Palette::INFO, "cardsmith")
    )
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Focus {
    Text,
    Count,
}

struct ComposeState {
    editor: Editor,
    count: u32,
    focus: Focus,
    warning: Option<String>,
}

impl ComposeState {
    fn new(count: u32) -> Self {
        Self {
            editor: Editor::new(),
            count,
            focus: Focus::Text,
            warning: None,
        }
    }

    fn with_text(text: &str, count: u32) -> Self {
        Self {
            editor: Editor::from_content(text),
            count,
            focus: Focus::Text,
            warning: None,
        }
    }

    fn submit_error(&self) -> Option<String> {
        let chars = self.editor.char_count();
        if chars < MIN_SOURCE_CHARS {
            return Some(format!(
                "Paste at least {MIN_SOURCE_CHARS} characters of study material ({chars} so far)."
            ));
        }
        if !(MIN_CARDS..=MAX_CARDS).contains(&self.count) {
            return Some(format!(
                "Card count must be between {MIN_CARDS} and {MAX_CARDS}."
            ));
        }
        None
    }

    fn bump_count(&mut self, delta: i64) {
        let next = (self.count as i64 + delta).clamp(MIN_CARDS as i64, MAX_CARDS as i64);
        self.count = next as u32;
    }

    fn type_count_digit(&mut self, digit: u32) {
        self.count = self
            .count
            .saturating_mul(10)
            .saturating_add(digit)
            .min(COUNT_TYPE_CAP);
    }

    fn erase_count_digit(&mut self) {
        self.count /= 10;
    }
}

struct ReviewState {
    cards: Vec<Flashcard>,
    selected: usize,
    saved: Option<ExportPaths>,
    status: Option<(String, Instant)>,
}

impl ReviewState {
    fn new(cards: Vec<Flashcard>) -> Self {
        Self {
            cards,
            selected: 0,
            saved: None,
            status: None,
        }
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn select_next(&mut self) {
        if self.selected + 1 < self.cards.len() {
            self.selected += 1;
        }
    }

    fn flash(&mut self, message: String) {
        self.status = Some((message, Instant::now()));
    }
}

enum Screen {
    Compose(ComposeState),
    Working {
        source_text: String,
        count: u32,
        started: Instant,
        receiver: oneshot::Receiver<Result<Vec<Flashcard>, GenerationError>>,
    },
    Review(ReviewState),
    Failed {
        lines: Vec<String>,
        source_text: String,
        count: u32,
    },
}

fn spawn_generation(
    client: Arc<LlmClient>,
    source_text: String,
    card_count: u32,
) -> oneshot::Receiver<Result<Vec<Flashcard>, GenerationError>> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let pipeline = GenerationPipeline::new(client);
        let result = pipeline.run(&source_text, card_count).await;
        let _ = tx.send(result);
    });
    rx
}

async fn run_session(count: u32, output_dir: PathBuf) -> Result<()> {
    // Resolve the credential before the terminal goes raw; it may prompt.
    let client = Arc::new(ensure_client(&key_prompt())?);

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                | KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
        )
    )
    .context("failed to configure terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to start terminal")?;

    let loop_result = session_loop(&mut terminal, client, count, &output_dir);

    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        PopKeyboardEnhancementFlags,
        LeaveAlternateScreen
    )
    .context("failed to restore terminal")?;
    terminal.show_cursor().context("failed to show cursor")?;

    loop_result
}

fn session_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    client: Arc<LlmClient>,
    initial_count: u32,
    output_dir: &Path,
) -> Result<()> {
    let mut screen = Screen::Compose(ComposeState::new(initial_count));
    let mut view_height = 0usize;

    loop {
        // Collect a finished generation before drawing.
        if let Screen::Working {
            source_text,
            count,
            receiver,
            ..
        } = &mut screen
        {
            match receiver.try_recv() {
                Ok(Ok(cards)) => {
                    screen = Screen::Review(ReviewState::new(cards));
                }
                Ok(Err(err)) => {
                    let source_text = std::mem::take(source_text);
                    let count = *count;
                    screen = Screen::Failed {
                        lines: failure_lines(err),
                        source_text,
                        count,
                    };
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Closed) => {
                    let source_text = std::mem::take(source_text);
                    let count = *count;
                    screen = Screen::Failed {
                        lines: vec!["Generation task ended unexpectedly.".to_string()],
                        source_text,
                        count,
                    };
                }
            }
        }

        terminal
            .draw(|frame| {
                let area = frame.area();
                frame.render_widget(Theme::backdrop(), area);
                match &mut screen {
                    Screen::Compose(state) => draw_compose(frame, state, &mut view_height),
                    Screen::Working { started, count, .. } => {
                        draw_working(frame, *started, *count)
                    }
                    Screen::Review(state) => draw_review(frame, state, output_dir),
                    Screen::Failed { lines, .. } => draw_failed(frame, lines),
                }
            })
            .context("failed to render frame")?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let exit_ctrl_c =
            key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);

        match &mut screen {
            Screen::Compose(state) => {
                if key.code == KeyCode::Esc || exit_ctrl_c {
                    break;
                }
                if key.code == KeyCode::Char('g') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    match state.submit_error() {
                        Some(warning) => state.warning = Some(warning),
                        None => {
                            let source_text = state.editor.content();
                            let count = state.count;
                            let receiver =
                                spawn_generation(Arc::clone(&client), source_text.clone(), count);
                            screen = Screen::Working {
                                source_text,
                                count,
                                started: Instant::now(),
                                receiver,
                            };
                        }
                    }
                    continue;
                }
                if key.code == KeyCode::Char('e') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    state.editor = Editor::from_content(SAMPLE_TEXT);
                    state.warning = None;
                    continue;
                }
                if key.code == KeyCode::Tab {
                    state.focus = match state.focus {
                        Focus::Text => Focus::Count,
                        Focus::Count => Focus::Text,
                    };
                    continue;
                }

                state.warning = None;
                match state.focus {
                    Focus::Text => match key.code {
                        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                            state.editor.insert_char(c);
                        }
                        KeyCode::Enter => state.editor.insert_newline(),
                        KeyCode::Backspace => state.editor.backspace(),
                        KeyCode::Delete => state.editor.delete(),
                        KeyCode::Left => state.editor.move_left(),
                        KeyCode::Right => state.editor.move_right(),
                        KeyCode::Up => state.editor.move_up(),
                        KeyCode::Down => state.editor.move_down(),
                        KeyCode::Home => state.editor.move_home(),
                        KeyCode::End => state.editor.move_end(),
                        KeyCode::PageUp => {
                            for _ in 0..view_height.max(1) {
                                state.editor.move_up();
                            }
                        }
                        KeyCode::PageDown => {
                            for _ in 0..view_height.max(1) {
                                state.editor.move_down();
                            }
                        }
                        _ => {}
                    },
                    Focus::Count => match key.code {
                        KeyCode::Up | KeyCode::Char('+') => state.bump_count(1),
                        KeyCode::Down | KeyCode::Char('-') => state.bump_count(-1),
                        KeyCode::PageUp => state.bump_count(10),
                        KeyCode::PageDown => state.bump_count(-10),
                        KeyCode::Backspace => state.erase_count_digit(),
                        KeyCode::Char(c) if c.is_ascii_digit() => {
                            state.type_count_digit(c.to_digit(10).unwrap_or(0));
                        }
                        _ => {}
                    },
                }
            }
            Screen::Working { .. } => {
                // The request itself runs to completion either way; leaving
                // here abandons the session, it does not cancel the call.
                if key.code == KeyCode::Esc || exit_ctrl_c {
                    break;
                }
            }
            Screen::Review(state) => {
                if key.code == KeyCode::Esc || exit_ctrl_c {
                    break;
                }
                match key.code {
                    KeyCode::Up | KeyCode::Char('k') => state.select_prev(),
                    KeyCode::Down | KeyCode::Char('j') => state.select_next(),
                    KeyCode::Char('s')
                        if key.modifiers.contains(KeyModifiers::CONTROL) =>
                    {
                        match save_cards(output_dir, &state.cards, Local::now()) {
                            Ok(paths) => {
                                state.flash(format!(
                                    "Saved {} and {}",
                                    paths.csv.display(),
                                    paths.json.display()
                                ));
                                state.saved = Some(paths);
                            }
                            Err(err) => state.flash(format!("Unable to save: {err}")),
                        }
                    }
                    KeyCode::Char('n') | KeyCode::Char('N') => {
                        screen = Screen::Compose(ComposeState::new(initial_count));
                    }
                    _ => {}
                }
            }
            Screen::Failed {
                source_text, count, ..
            } => {
                if exit_ctrl_c {
                    break;
                }
                // Any other key returns to the form with the text intact.
                let state = ComposeState::with_text(source_text, *count);
                screen = Screen::Compose(state);
            }
        }
    }

    Ok(())
}

fn draw_compose(frame: &mut ratatui::Frame<'_>, state: &mut ComposeState, view_height: &mut usize) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(area);

    *view_height = chunks[0].height.saturating_sub(2) as usize;
    state.editor.ensure_cursor_visible((*view_height).max(1));

    let text_title = match state.focus {
        Focus::Text => Theme::title_line("Study material"),
        Focus::Count => Line::from(vec![Theme::muted_span(" Study material ")]),
    };
    let editor_widget = Paragraph::new(state.editor.content())
        .block(Theme::panel_with_line(text_title))
        .wrap(Wrap { trim: false })
        .scroll((state.editor.scroll_top() as u16, 0));
    frame.render_widget(editor_widget, chunks[0]);

    let count_style = match state.focus {
        Focus::Count => Theme::label(),
        Focus::Text => Theme::body(),
    };
    let chars = state.editor.char_count();
    let count_line = Line::from(vec![
        Theme::muted_span("Cards to generate"),
        Theme::bullet(),
        Span::styled(format!("{}", state.count), count_style),
        Theme::bullet(),
        Theme::muted_span(format!(
            "{} character{} pasted (need {} or more)",
            chars,
            if chars == 1 { "" } else { "s" },
            MIN_SOURCE_CHARS
        )),
    ]);
    frame.render_widget(
        Paragraph::new(count_line).block(Theme::panel("Settings")),
        chunks[1],
    );

    let mut help_lines = vec![Line::from(vec![
        Theme::key_chip("Ctrl+G"),
        Theme::span(" generate"),
        Theme::bullet(),
        Theme::key_chip("Tab"),
        Theme::span(" switch field"),
        Theme::bullet(),
        Theme::key_chip("Ctrl+E"),
        Theme::span(" sample text"),
        Theme::bullet(),
        Theme::key_chip("Esc"),
        Theme::span(" exit"),
    ])];
    if let Some(warning) = &state.warning {
        help_lines.push(Line::from(vec![Span::styled(
            warning.clone(),
            Theme::danger(),
        )]));
    }
    frame.render_widget(
        Paragraph::new(help_lines)
            .block(Theme::panel_with_line(Theme::section_header("Controls")))
            .wrap(Wrap { trim: true }),
        chunks[2],
    );

    if state.focus == Focus::Text {
        let (cursor_row, cursor_col) = state.editor.cursor();
        let visible_row = cursor_row.saturating_sub(state.editor.scroll_top());
        let cursor_x =
            chunks[0].x + 1 + (cursor_col as u16).min(chunks[0].width.saturating_sub(2));
        let cursor_y =
            chunks[0].y + 1 + (visible_row as u16).min(chunks[0].height.saturating_sub(2));
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}

fn draw_working(frame: &mut ratatui::Frame<'_>, started: Instant, count: u32) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(area);

    let elapsed = started.elapsed().as_secs_f64();
    let body = vec![
        Line::from(vec![
            Theme::span("The model is writing "),
            Theme::label_span(format!("{count}")),
            Theme::span(format!(" flashcards{}", working_dots(elapsed))),
        ]),
        Line::default(),
        Line::from(vec![Theme::muted_span(format!(
            "{:.0}s elapsed",
            elapsed
        ))]),
    ];
    frame.render_widget(
        Paragraph::new(body)
            .block(Theme::panel("Generating"))
            .wrap(Wrap { trim: false }),
        chunks[0],
    );

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Theme::key_chip("Esc"),
            Theme::span(" / "),
            Theme::key_chip("Ctrl+C"),
            Theme::span(" abandon session"),
        ]))
        .block(Theme::panel_with_line(Theme::section_header("Controls"))),
        chunks[1],
    );
}

fn draw_review(frame: &mut ratatui::Frame<'_>, state: &ReviewState, output_dir: &Path) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Min(5),
            Constraint::Length(4),
        ])
        .split(area);

    let list_height = chunks[0].height.saturating_sub(2) as usize;
    let window = list_window(state.selected, state.cards.len(), list_height.max(1));
    let width = chunks[0].width.saturating_sub(6) as usize;
    let list_lines: Vec<Line<'static>> = state.cards[window.clone()]
        .iter()
        .enumerate()
        .map(|(offset, card)| {
            let index = window.start + offset;
            let text = format!("{}. {}", index + 1, question_preview(&card.question, width));
            if index == state.selected {
                Line::from(vec![Span::styled(text, Theme::label())])
            } else {
                Line::from(vec![Theme::span(text)])
            }
        })
        .collect();
    let mut header_spans = vec![
        Theme::label_span(format!("{} flashcards", state.cards.len())),
        Theme::bullet(),
        Theme::span(format!("exports to {}", output_dir.display())),
    ];
    if state.saved.is_some() {
        header_spans.push(Theme::bullet());
        header_spans.push(Span::styled("saved", Theme::success()));
    }
    let header = Line::from(header_spans);
    frame.render_widget(
        Paragraph::new(list_lines).block(Theme::panel_with_line(header)),
        chunks[0],
    );

    let card = &state.cards[state.selected];
    let detail = vec![
        Line::from(vec![Theme::label_span("Q: "), Theme::span(card.question.clone())]),
        Line::default(),
        Line::from(vec![
            Span::styled("A: ", Theme::success()),
            Theme::span(card.answer.clone()),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(detail)
            .block(Theme::panel(format!("Card {}", state.selected + 1)))
            .wrap(Wrap { trim: false }),
        chunks[1],
    );

    let mut footer = vec![Line::from(vec![
        Theme::key_chip("↑/↓"),
        Theme::span(" browse"),
        Theme::bullet(),
        Theme::key_chip("Ctrl+S"),
        Theme::span(" save CSV + JSON"),
        Theme::bullet(),
        Theme::key_chip("N"),
        Theme::span(" new batch"),
        Theme::bullet(),
        Theme::key_chip("Esc"),
        Theme::span(" exit"),
    ])];
    if let Some((message, at)) = &state.status
        && at.elapsed().as_secs_f64() < FLASH_SECS
    {
        footer.push(Line::from(vec![Span::styled(
            message.clone(),
            Theme::success(),
        )]));
    }
    frame.render_widget(
        Paragraph::new(footer)
            .block(Theme::panel_with_line(Theme::section_header("Controls")))
            .wrap(Wrap { trim: true }),
        chunks[2],
    );
}

fn draw_failed(frame: &mut ratatui::Frame<'_>, lines: &[String]) {
    let area = frame.area();
    let body: Vec<Line<'static>> = lines
        .iter()
        .map(|line| Line::styled(line.clone(), Style::default().fg(Color::Red)))
        .chain(std::iter::once(Line::default()))
        .chain(std::iter::once(Line::styled(
            "Press any key to return to the form.",
            Style::default(),
        )))
        .collect();
    frame.render_widget(
        Paragraph::new(body)
            .style(Theme::body())
            .block(Theme::panel("Error"))
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn failure_lines(err: GenerationError) -> Vec<String> {
    let raw_excerpt = match &err {
        GenerationError::Decode(decode) => decode
            .raw_reply()
            .map(|raw| raw.chars().take(300).collect::<String>()),
        _ => None,
    };
    let error = anyhow::Error::new(err);
    let mut lines = format_error_lines("Generation failed.", &error);
    if let Some(excerpt) = raw_excerpt {
        lines.push(String::new());
        lines.push("Model reply began:".to_string());
        lines.extend(excerpt.lines().take(6).map(String::from));
    }
    lines
}

fn working_dots(elapsed_secs: f64) -> &'static str {
    match (elapsed_secs * 2.0) as u64 % 3 {
        0 => ".",
        1 => "..",
        _ => "...",
    }
}

/// Single-line preview of a question, truncated on a character boundary.
fn question_preview(question: &str, max_chars: usize) -> String {
    let first_line = question.lines().next().unwrap_or_default();
    if first_line.chars().count() <= max_chars {
        return first_line.to_string();
    }
    let mut preview: String = first_line
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect();
    preview.push('…');
    preview
}

/// Window of list rows to show so the selected row stays in view.
fn list_window(selected: usize, len: usize, height: usize) -> Range<usize> {
    if len <= height {
        return 0..len;
    }
    let half = height / 2;
    let start = selected.saturating_sub(half).min(len - height);
    start..start + height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_text_is_long_enough_to_submit() {
        assert!(SAMPLE_TEXT.chars().count() >= MIN_SOURCE_CHARS);
    }

    #[test]
    fn compose_rejects_short_text_and_bad_counts() {
        let mut state = ComposeState::new(10);
        assert!(state.submit_error().unwrap().contains("at least 50"));

        state.editor = Editor::from_content(SAMPLE_TEXT);
        assert!(state.submit_error().is_none());

        state.count = 0;
        assert!(state.submit_error().unwrap().contains("between 1 and 200"));
        state.count = 999;
        assert!(state.submit_error().is_some());
    }

    #[test]
    fn count_bumping_stays_in_range() {
        let mut state = ComposeState::new(10);
        state.bump_count(-20);
        assert_eq!(state.count, MIN_CARDS);
        state.bump_count(1000);
        assert_eq!(state.count, MAX_CARDS);
    }

    #[test]
    fn count_digits_append_and_erase() {
        let mut state = ComposeState::new(0);
        state.type_count_digit(2);
        state.type_count_digit(5);
        assert_eq!(state.count, 25);
        state.erase_count_digit();
        assert_eq!(state.count, 2);
        state.erase_count_digit();
        assert_eq!(state.count, 0);
    }

    #[test]
    fn review_selection_is_clamped() {
        let cards = vec![
            Flashcard {
                question: "Q1".into(),
                answer: "A1".into(),
            },
            Flashcard {
                question: "Q2".into(),
                answer: "A2".into(),
            },
        ];
        let mut state = ReviewState::new(cards);
        state.select_prev();
        assert_eq!(state.selected, 0);
        state.select_next();
        state.select_next();
        assert_eq!(state.selected, 1);
    }

    #[test]
    fn question_preview_truncates_on_char_boundary() {
        assert_eq!(question_preview("short", 10), "short");
        assert_eq!(question_preview("exactly ten", 11), "exactly ten");
        assert_eq!(question_preview("what is photosynthesis", 10), "what is p…");
        assert_eq!(question_preview("日本語の質問です", 5), "日本語の…");
        assert_eq!(question_preview("first line\nsecond", 20), "first line");
    }

    #[test]
    fn list_window_keeps_selection_visible() {
        assert_eq!(list_window(0, 3, 10), 0..3);
        assert_eq!(list_window(0, 20, 5), 0..5);
        assert_eq!(list_window(10, 20, 5), 8..13);
        assert_eq!(list_window(19, 20, 5), 15..20);
    }

    #[test]
    fn failure_lines_include_decode_detail() {
        let err = crate::decode::decode_flashcards("not json at all").unwrap_err();
        let lines = failure_lines(GenerationError::Decode(err));
        assert_eq!(lines[0], "Generation failed.");
        assert!(lines.iter().any(|l| l.contains("not valid JSON")));
        assert!(lines.iter().any(|l| l.contains("not json at all")));
    }
}
