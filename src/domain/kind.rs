//! Tag kinds: the closed classification of markup elements.

use std::fmt;
use std::hash::Hash;

/// Closed set of element kinds with a catch-all for unknown names.
///
/// Name resolution is total from the caller's point of view: a `None` from
/// [`TagKind::from_name`] is downgraded to [`TagKind::DEFAULT`] by [`TagKind::resolve`].
pub trait TagKind: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Fallback for names that map to no known kind.
    const DEFAULT: Self;

    /// Looks up the kind for an element name.
    fn from_name(name: &str) -> Option<Self>;

    /// Lowercase element name used when rendering.
    fn name(&self) -> &'static str;

    /// Like [`TagKind::from_name`] but never fails.
    fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or(Self::DEFAULT)
    }
}

macro_rules! html_tag_kinds {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Element kinds of HTML documents.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum HtmlTagKind {
            $($variant,)+
            /// Any element whose name is not listed above.
            Default,
        }

        impl HtmlTagKind {
            pub const ALL: &'static [HtmlTagKind] = &[$(HtmlTagKind::$variant,)+ HtmlTagKind::Default];
        }

        impl TagKind for HtmlTagKind {
            const DEFAULT: Self = HtmlTagKind::Default;

            fn from_name(name: &str) -> Option<Self> {
                $(
                    if name.eq_ignore_ascii_case($name) {
                        return Some(HtmlTagKind::$variant);
                    }
                )+
                None
            }

            fn name(&self) -> &'static str {
                match self {
                    $(HtmlTagKind::$variant => $name,)+
                    HtmlTagKind::Default => "default",
                }
            }
        }
    };
}

html_tag_kinds! {
    A => "a",
    Abbr => "abbr",
    Address => "address",
    Area => "area",
    Article => "article",
    Aside => "aside",
    Audio => "audio",
    B => "b",
    Base => "base",
    Blockquote => "blockquote",
    Body => "body",
    Br => "br",
    Button => "button",
    Canvas => "canvas",
    Caption => "caption",
    Code => "code",
    Col => "col",
    Dd => "dd",
    Div => "div",
    Dl => "dl",
    Dt => "dt",
    Em => "em",
    Fieldset => "fieldset",
    Figure => "figure",
    Footer => "footer",
    Form => "form",
    H1 => "h1",
    H2 => "h2",
    H3 => "h3",
    H4 => "h4",
    H5 => "h5",
    H6 => "h6",
    Head => "head",
    Header => "header",
    Hr => "hr",
    Html => "html",
    I => "i",
    Iframe => "iframe",
    Img => "img",
    Input => "input",
    Label => "label",
    Li => "li",
    Link => "link",
    Main => "main",
    Meta => "meta",
    Nav => "nav",
    Noscript => "noscript",
    Ol => "ol",
    Option => "option",
    P => "p",
    Pre => "pre",
    Script => "script",
    Section => "section",
    Select => "select",
    Small => "small",
    Span => "span",
    Strong => "strong",
    Style => "style",
    Sub => "sub",
    Sup => "sup",
    Table => "table",
    Tbody => "tbody",
    Td => "td",
    Textarea => "textarea",
    Tfoot => "tfoot",
    Th => "th",
    Thead => "thead",
    Title => "title",
    Tr => "tr",
    U => "u",
    Ul => "ul",
    Video => "video",
}

impl fmt::Display for HtmlTagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
