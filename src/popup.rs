use crate::theme::BASE_STYLE;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Rect},
    text::Text,
    widgets::{Block, Clear, Paragraph, Widget},
};

/// A titled, bordered box of text drawn centered over whatever is beneath it
#[derive(Clone, Debug)]
pub(crate) struct Popup<'a> {
    title: String,
    text: Text<'a>,
}

impl<'a> Popup<'a> {
    pub(crate) fn new<T: Into<Text<'a>>>(title: &str, text: T) -> Popup<'a> {
        Popup {
            title: format!(" {title} "),
            text: text.into(),
        }
    }
}

impl Widget for Popup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title_width = u16::try_from(self.title.chars().count()).unwrap_or(u16::MAX);
        let height = u16::try_from(self.text.height())
            .unwrap_or(u16::MAX)
            .saturating_add(2)
            .min(area.height);
        let width = u16::try_from(self.text.width())
            .unwrap_or(u16::MAX)
            .max(title_width.saturating_add(2))
            .saturating_add(2)
            .min(area.width);
        let para = Paragraph::new(self.text)
            .block(
                Block::bordered()
                    .title(self.title)
                    .title_alignment(Alignment::Center),
            )
            .style(BASE_STYLE);
        let [popup_area] = Layout::horizontal([width]).flex(Flex::Center).areas(area);
        let [popup_area] = Layout::vertical([height])
            .flex(Flex::Center)
            .areas(popup_area);
        // Blank one column on either side so the border doesn't butt up
        // against the calendar
        let outer_area = Rect {
            x: popup_area.x.saturating_sub(1),
            y: popup_area.y,
            width: popup_area.width.saturating_add(2),
            height: popup_area.height,
        }
        .intersection(area);
        Clear.render(outer_area, buf);
        Block::new().style(BASE_STYLE).render(outer_area, buf);
        para.render(popup_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol())
            .collect::<String>()
    }

    #[test]
    fn test_centered_box() {
        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::with_lines(vec!["x".repeat(20); 5]);
        Popup::new("Hi", "hello").render(area, &mut buf);
        assert_eq!(row(&buf, 0), "xxxxxxxxxxxxxxxxxxxx");
        assert_eq!(row(&buf, 1), "xxxxx ┌─ Hi ─┐ xxxxx");
        assert_eq!(row(&buf, 2), "xxxxx │hello │ xxxxx");
        assert_eq!(row(&buf, 3), "xxxxx └──────┘ xxxxx");
        assert_eq!(row(&buf, 4), "xxxxxxxxxxxxxxxxxxxx");
    }

    #[test]
    fn test_clamped_to_area() {
        let area = Rect::new(0, 0, 6, 2);
        let mut buf = Buffer::empty(area);
        Popup::new("A long title", "some long text").render(area, &mut buf);
        assert_eq!(row(&buf, 0).chars().next(), Some('┌'));
    }
}
