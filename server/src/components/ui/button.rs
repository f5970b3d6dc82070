use maud::{html, Markup, Render};

#[derive(Debug, Clone, PartialEq)]
pub enum ButtonVariant {
    Primary,
    Secondary,
}

/// A link styled as a button, or a submit button when no `href` is set
pub struct Button {
    pub text: String,
    pub href: Option<String>,
    pub variant: ButtonVariant,
    pub full_width: bool,
}

impl Button {
    pub fn primary(text: &str) -> Self {
        Self {
            text: text.to_string(),
            href: None,
            variant: ButtonVariant::Primary,
            full_width: false,
        }
    }

    pub fn secondary(text: &str) -> Self {
        Self {
            variant: ButtonVariant::Secondary,
            ..Self::primary(text)
        }
    }

    pub fn href(mut self, href: &str) -> Self {
        self.href = Some(href.to_string());
        self
    }

    pub fn full_width(mut self, full_width: bool) -> Self {
        self.full_width = full_width;
        self
    }

    fn get_variant_classes(&self) -> &'static str {
        match self.variant {
            ButtonVariant::Primary => "bg-sky-600 hover:bg-sky-700 active:bg-sky-800 text-white focus:ring-2 focus:ring-sky-500 focus:ring-offset-2",
            ButtonVariant::Secondary => "bg-white hover:bg-gray-50 active:bg-gray-100 text-sky-700 border border-sky-300 hover:border-sky-400 focus:ring-2 focus:ring-sky-500 focus:ring-offset-2",
        }
    }
}

impl Render for Button {
    fn render(&self) -> Markup {
        let width_class = if self.full_width { "w-full" } else { "" };
        let classes = format!(
            "{} {} py-2 sm:py-2.5 px-3 sm:px-4 text-sm sm:text-base font-medium rounded-lg shadow-sm hover:shadow transition-all duration-200 flex items-center justify-center cursor-pointer",
            self.get_variant_classes(),
            width_class
        );

        match &self.href {
            Some(href) => html! {
                a href=(href) class=(classes) { (self.text) }
            },
            None => html! {
                button type="submit" class=(classes) { (self.text) }
            },
        }
    }
}
