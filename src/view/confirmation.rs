use std::io::{self, Write, stdout};
use crossterm::{cursor::MoveTo, queue, style::{Color, SetBackgroundColor, SetForegroundColor, SetAttribute, Attribute, ResetColor}, terminal};

/// Full-width confirmation banner for destructive cluster actions.
pub fn render_confirmation(prompt: &str) -> io::Result<()> {
    let mut out = stdout();
    let (cols, rows) = terminal::size()?;
    let y = rows.saturating_sub(2);

    queue!(out, MoveTo(0, y))?;
    queue!(
        out,
        SetBackgroundColor(Color::DarkRed),
        SetForegroundColor(Color::White),
        SetAttribute(Attribute::Bold)
    )?;
    let banner = format!("  {prompt} — y: confirm / n: cancel  ");
    write!(out, "{:<width$}", banner, width = cols as usize)?;
    queue!(out, ResetColor, SetAttribute(Attribute::Reset))?;
    out.flush()
}
