use crossterm::style::{Attribute, Color, ContentStyle, Stylize};

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub text_style: ContentStyle,
    pub code_block_style: ContentStyle,
    pub quote_style: ContentStyle,
    pub tool_notice_style: ContentStyle,
    pub heading_styles: [ContentStyle; 3],
}

impl Theme {
    pub fn dark() -> Self {
        let bold = ContentStyle::new().attribute(Attribute::Bold);
        Self {
            name: "dark".to_string(),
            text_style: ContentStyle::new(),
            code_block_style: ContentStyle::new().with(Color::Cyan),
            quote_style: ContentStyle::new().attribute(Attribute::Dim),
            tool_notice_style: ContentStyle::new().with(Color::Yellow),
            heading_styles: [
                bold.with(Color::Cyan),
                bold.with(Color::Magenta),
                bold.with(Color::Yellow),
            ],
        }
    }

    pub fn light() -> Self {
        let bold = ContentStyle::new().attribute(Attribute::Bold);
        Self {
            name: "light".to_string(),
            text_style: ContentStyle::new(),
            code_block_style: ContentStyle::new().with(Color::DarkMagenta),
            quote_style: ContentStyle::new().attribute(Attribute::Dim),
            tool_notice_style: ContentStyle::new().with(Color::DarkYellow),
            heading_styles: [
                bold.with(Color::DarkBlue),
                bold.with(Color::DarkMagenta),
                bold.with(Color::DarkGreen),
            ],
        }
    }

    /// Unknown names fall back to dark.
    pub fn by_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn heading_style(&self, level: usize) -> ContentStyle {
        match level {
            1..=3 => self.heading_styles[level - 1],
            _ => self.text_style.attribute(Attribute::Bold),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn by_name_falls_back_to_dark() {
        assert_eq!(Theme::by_name("light").name, "light");
        assert_eq!(Theme::by_name("solarized").name, "dark");
    }
}
