use maud::{html, Markup, Render};

#[derive(Debug, Clone, PartialEq)]
pub enum BadgeColor {
    Green,
    Red,
    Gray,
}

pub struct Badge {
    pub text: String,
    pub color: BadgeColor,
    pub rounded: bool,
}

impl Badge {
    pub fn new(text: &str, color: BadgeColor) -> Self {
        Self {
            text: text.to_string(),
            color,
            rounded: false,
        }
    }

    pub fn rounded(mut self, rounded: bool) -> Self {
        self.rounded = rounded;
        self
    }

    fn get_color_classes(&self) -> &'static str {
        match self.color {
            BadgeColor::Green => "bg-green-100 text-green-800",
            BadgeColor::Red => "bg-red-100 text-red-800",
            BadgeColor::Gray => "bg-gray-100 text-gray-800",
        }
    }
}

impl Render for Badge {
    fn render(&self) -> Markup {
        let rounded = if self.rounded {
            "rounded-full"
        } else {
            "rounded"
        };

        let classes = format!(
            "{} text-xs font-medium px-2 py-1 {}",
            self.get_color_classes(),
            rounded
        );

        html! {
            span class=(classes) { (self.text) }
        }
    }
}
