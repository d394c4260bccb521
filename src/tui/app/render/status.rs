use crate::ollama::PullProgress;
use crate::ui::theme::{Spinners, Theme};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use std::time::Duration;

const PROGRESS_WIDTH: usize = 20;

fn format_elapsed(elapsed: Option<Duration>) -> String {
    elapsed
        .map(|d| {
            let secs = d.as_secs();
            if secs > 0 {
                format!(" {secs}s")
            } else {
                format!(" {}ms", d.as_millis())
            }
        })
        .unwrap_or_default()
}

#[allow(clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn format_pull(model: &str, progress: &PullProgress) -> String {
    match progress {
        PullProgress::Progress(fraction) => {
            let filled = (fraction * PROGRESS_WIDTH as f64).round() as usize;
            let filled = filled.min(PROGRESS_WIDTH);
            format!(
                "Pulling {model} [{}{}] {:>3.0}%",
                "█".repeat(filled),
                "░".repeat(PROGRESS_WIDTH - filled),
                fraction * 100.0
            )
        }
        PullProgress::Status(status) => format!("Pulling {model}: {status}"),
        PullProgress::Success => format!("Pulled {model}"),
        PullProgress::Failed(error) => format!("Pull of {model} failed: {error}"),
    }
}

pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    is_processing: bool,
    elapsed: Option<Duration>,
    spinner_frame: usize,
    pull: Option<&(String, PullProgress)>,
) {
    let hints = if is_processing {
        "Esc cancel | PgUp/PgDn scroll"
    } else {
        "/ commands | PgUp/PgDn scroll"
    };
    let hints_width = hints.len() as u16;

    let left_line = Line::from(vec![Span::raw(" "), Span::styled(hints, Theme::muted())]);
    frame
        .buffer_mut()
        .set_line(area.x, area.y, &left_line, hints_width + 2);

    let mut right = Vec::new();
    if let Some((model, progress)) = pull {
        right.push(Span::styled(format_pull(model, progress), Theme::secondary()));
    }
    if is_processing {
        let frames = Spinners::BRAILLE;
        let frame_char = frames[spinner_frame % frames.len()];
        if !right.is_empty() {
            right.push(Span::styled(" | ", Theme::muted()));
        }
        right.push(Span::styled(
            format!("{frame_char} Generating{}", format_elapsed(elapsed)),
            Theme::warning(),
        ));
    }

    if right.is_empty() {
        return;
    }
    right.push(Span::raw(" "));
    let right_line = Line::from(right);
    let status_len = (right_line.width() + 1) as u16;
    let status_x = area.x + area.width.saturating_sub(status_len);
    frame
        .buffer_mut()
        .set_line(status_x, area.y, &right_line, status_len);
}
