use crate::ui::console::{Console, Tone};

pub const PAGE_BAR: &str = "N - next page | P - previous page | F - First page | L - Last page";

/// Truncate or right-pad `text` to exactly `width` characters.
pub fn fit(text: &str, width: usize) -> String {
    let mut out: String = text.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat_n(' ', width - len));
    out
}

pub fn rule(width: usize, left: char, right: char) -> String {
    let mut line = String::with_capacity(width * 3);
    line.push(left);
    line.extend(std::iter::repeat_n('─', width.saturating_sub(2)));
    line.push(right);
    line
}

/// One framed line of content.
pub fn boxed(width: usize, content: &str) -> String {
    format!("│ {} │", fit(content, width.saturating_sub(4)))
}

/// `left` and `right` on one framed line, with `right` flush against the frame.
pub fn spread(width: usize, left: &str, right: &str) -> String {
    let inner = width.saturating_sub(4);
    let right_len = right.chars().count();
    let left = fit(left, inner.saturating_sub(right_len + 1));
    boxed(width, &format!("{left} {right}"))
}

/// A rendered page of a record store, independent of any terminal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub columns: String,
    pub page_label: String,
    pub rows: Vec<String>,
}

impl Page {
    pub fn page_label(current: usize, total: usize) -> String {
        format!("{current:2}/{total:2}")
    }

    /// Frame header and body. Short pages are padded to `rows_per_page`.
    pub fn render(&self, console: &mut dyn Console, width: usize, rows_per_page: usize) {
        console.say(Tone::Header, &self.title);
        console.say(Tone::Normal, &rule(width, '┌', '┐'));
        console.say(Tone::Normal, &spread(width, &self.columns, &self.page_label));
        console.say(Tone::Normal, &rule(width, '├', '┤'));
        for row in &self.rows {
            console.say(Tone::Normal, &boxed(width, row));
        }
        for _ in self.rows.len()..rows_per_page {
            console.say(Tone::Normal, &boxed(width, ""));
        }
    }
}

pub fn footer(console: &mut dyn Console, width: usize, description: &str, page_bar: bool) {
    console.say(Tone::Normal, &rule(width, '├', '┤'));
    console.say(Tone::Normal, &boxed(width, description));
    if page_bar {
        console.say(Tone::Normal, &boxed(width, PAGE_BAR));
    }
    console.say(Tone::Normal, &rule(width, '└', '┘'));
}

/// A plain heading with an optional running score, used by quiz screens.
pub fn heading(console: &mut dyn Console, width: usize, title: &str, score: Option<String>) {
    console.clear();
    console.say(Tone::Header, title);
    if let Some(score) = score {
        console.say(Tone::Normal, &score);
    }
    console.say(Tone::Normal, &"─".repeat(width));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::console::ScriptedConsole;

    #[test]
    fn fit_pads_and_truncates_by_char() {
        assert_eq!(fit("ab", 4), "ab  ");
        assert_eq!(fit("äöüß", 2), "äö");
        assert_eq!(fit("", 0), "");
    }

    #[test]
    fn framed_lines_have_requested_width() {
        for line in [
            rule(20, '┌', '┐'),
            boxed(20, "some content that is far too long"),
            spread(20, "ID Name", " 1/ 3"),
        ] {
            assert_eq!(line.chars().count(), 20, "{line}");
        }
        assert!(spread(20, "ID", " 1/ 3").ends_with(" 1/ 3 │"));
    }

    #[test]
    fn page_render_pads_short_pages() {
        let page = Page {
            title: "Users".to_string(),
            columns: "ID Name".to_string(),
            page_label: Page::page_label(1, 1),
            rows: vec!["1. admin".to_string()],
        };
        let mut console = ScriptedConsole::default();
        page.render(&mut console, 30, 3);
        let transcript = console.transcript();
        assert_eq!(transcript.lines().count(), 1 + 3 + 3);
        assert!(console.contains("1. admin"));
    }
}
