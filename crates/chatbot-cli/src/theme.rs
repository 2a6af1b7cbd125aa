use ratatui::style::Color;

#[derive(Clone)]
pub struct Theme {
    pub name: &'static str,
    pub fg: Color,
    pub accent: Color,
    pub muted: Color,
    pub error: Color,
    pub user_color: Color,
    pub assistant_color: Color,
    pub border: Color,
    pub selected: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark",
            fg: Color::Rgb(220, 220, 220),
            accent: Color::Rgb(122, 162, 247),
            muted: Color::Rgb(100, 100, 100),
            error: Color::Rgb(247, 118, 142),
            user_color: Color::Cyan,
            assistant_color: Color::Green,
            border: Color::Rgb(60, 60, 60),
            selected: Color::Rgb(224, 175, 104),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light",
            fg: Color::Rgb(40, 40, 40),
            accent: Color::Rgb(33, 99, 196),
            muted: Color::Rgb(140, 140, 140),
            error: Color::Rgb(190, 30, 45),
            user_color: Color::Rgb(0, 110, 140),
            assistant_color: Color::Rgb(30, 120, 40),
            border: Color::Rgb(190, 190, 190),
            selected: Color::Rgb(160, 90, 0),
        }
    }

    pub fn mono() -> Self {
        Self {
            name: "mono",
            fg: Color::Reset,
            accent: Color::Reset,
            muted: Color::DarkGray,
            error: Color::Reset,
            user_color: Color::Reset,
            assistant_color: Color::Reset,
            border: Color::DarkGray,
            selected: Color::Reset,
        }
    }

    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "light" => Self::light(),
            "mono" | "none" => Self::mono(),
            _ => Self::dark(),
        }
    }

    pub fn all_names() -> Vec<&'static str> {
        vec!["dark", "light", "mono"]
    }
}
