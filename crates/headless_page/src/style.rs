//! Inline declarations and the small slice of computed style the page models.

use smallvec::SmallVec;

/// Border width reported for `medium`, the initial value.
const MEDIUM_BORDER_WIDTH: f64 = 3.0;

/// Parse a CSS length in pixels (`"12.5px"`, `"12"`, `"0"`). Units other than
/// `px` and keywords such as `auto` are not lengths here.
pub fn parse_length(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed);
    number.trim().parse::<f64>().ok().filter(|parsed| parsed.is_finite())
}

/// Ordered inline style declarations of one element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: SmallVec<(String, String), 4>,
}

impl InlineStyle {
    /// Parse a `style` attribute (`"width: 10px; min-height: 4px"`).
    /// Malformed declarations are dropped.
    pub fn parse(text: &str) -> Self {
        let mut style = Self::default();
        for declaration in text.split(';') {
            if let Some((property, value)) = declaration.split_once(':') {
                style.set(property.trim(), value.trim());
            }
        }
        style
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    /// Set a declaration; an empty value removes it.
    pub fn set(&mut self, property: &str, value: &str) {
        let property = property.to_ascii_lowercase();
        if value.is_empty() {
            self.declarations.retain(|(name, _)| *name != property);
            return;
        }
        if let Some(slot) = self.declarations.iter_mut().find(|(name, _)| *name == property) {
            value.clone_into(&mut slot.1);
        } else {
            self.declarations.push((property, value.to_owned()));
        }
    }

    /// Serialize back to `style` attribute text.
    pub fn to_css_text(&self) -> String {
        self.declarations
            .iter()
            .map(|(name, value)| format!("{name}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn length(&self, property: &str) -> Option<f64> {
        self.get(property).and_then(parse_length)
    }
}

/// `box-sizing` as the layout sees it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum BoxSizing {
    #[default]
    ContentBox,
    BorderBox,
}

impl BoxSizing {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ContentBox => "content-box",
            Self::BorderBox => "border-box",
        }
    }
}

/// One vertical border edge.
#[derive(Clone, Debug, PartialEq)]
pub struct BorderEdge {
    pub width: f64,
    pub style: String,
}

impl BorderEdge {
    /// Width the layout actually uses; `none` and `hidden` suppress the border.
    pub fn used_width(&self) -> f64 {
        if self.style == "none" || self.style == "hidden" {
            0.0
        } else {
            self.width
        }
    }
}

/// Computed style for the properties layout and the aligner read.
#[derive(Clone, Debug, PartialEq)]
pub struct ComputedStyle {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub min_height: Option<f64>,
    pub padding_top: f64,
    pub padding_bottom: f64,
    pub border_top: BorderEdge,
    pub border_bottom: BorderEdge,
    pub box_sizing: BoxSizing,
    pub absolute: bool,
    pub relative: bool,
    pub top: f64,
}

impl ComputedStyle {
    /// Resolve from inline declarations over the initial values.
    pub fn from_inline(inline: &InlineStyle) -> Self {
        let border = |side: &str| -> BorderEdge {
            let shorthand = inline.get("border").map(parse_border_shorthand);
            let width = inline
                .length(&format!("border-{side}-width"))
                .or_else(|| shorthand.as_ref().and_then(|parts| parts.0))
                .unwrap_or(MEDIUM_BORDER_WIDTH);
            let style = inline
                .get(&format!("border-{side}-style"))
                .map(str::to_owned)
                .or_else(|| shorthand.and_then(|parts| parts.1))
                .unwrap_or_else(|| "none".to_owned());
            BorderEdge { width, style }
        };
        let position = inline.get("position").unwrap_or("static");

        Self {
            width: inline.length("width"),
            height: inline.length("height"),
            min_height: inline.length("min-height"),
            padding_top: inline.length("padding-top").unwrap_or(0.0).max(0.0),
            padding_bottom: inline.length("padding-bottom").unwrap_or(0.0).max(0.0),
            border_top: border("top"),
            border_bottom: border("bottom"),
            box_sizing: match inline.get("box-sizing") {
                Some("border-box") => BoxSizing::BorderBox,
                _ => BoxSizing::ContentBox,
            },
            absolute: position == "absolute",
            relative: position == "relative",
            top: inline.length("top").unwrap_or(0.0),
        }
    }

    /// Vertical padding plus used border widths.
    pub fn cushion(&self) -> f64 {
        self.padding_top + self.padding_bottom + self.border_top.used_width() + self.border_bottom.used_width()
    }

    /// Whether this box establishes an offset parent for its descendants.
    pub fn is_positioned(&self) -> bool {
        self.absolute || self.relative
    }

    /// Resolved values as a standards engine reports them through
    /// `getComputedStyle`, keyed by hyphenated property name.
    pub fn reported(&self, inline: &InlineStyle) -> Vec<(String, String)> {
        let px = |value: f64| format!("{value}px");
        vec![
            ("padding-top".to_owned(), px(self.padding_top)),
            ("padding-bottom".to_owned(), px(self.padding_bottom)),
            ("border-top-width".to_owned(), px(self.border_top.width)),
            ("border-bottom-width".to_owned(), px(self.border_bottom.width)),
            ("border-top-style".to_owned(), self.border_top.style.clone()),
            ("border-bottom-style".to_owned(), self.border_bottom.style.clone()),
            ("box-sizing".to_owned(), self.box_sizing.as_str().to_owned()),
            (
                "min-height".to_owned(),
                inline.get("min-height").unwrap_or("auto").to_owned(),
            ),
            (
                "position".to_owned(),
                inline.get("position").unwrap_or("static").to_owned(),
            ),
        ]
    }
}

/// `border: 2px solid red` → (width, style).
fn parse_border_shorthand(value: &str) -> (Option<f64>, Option<String>) {
    const STYLES: [&str; 10] = [
        "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
    ];
    let mut width = None;
    let mut style = None;
    for token in value.split_whitespace() {
        if let Some(length) = parse_length(token) {
            width = Some(length);
        } else if STYLES.contains(&token) {
            style = Some(token.to_owned());
        }
    }
    if style.is_some() && width.is_none() {
        width = Some(MEDIUM_BORDER_WIDTH);
    }
    (width, style)
}

/// Converts hyphenated property names to the camel-cased keys old engines
/// expose on `currentStyle` (`padding-top` → `paddingTop`,
/// `-ms-box-sizing` → `MsBoxSizing`, `float` → `styleFloat`).
pub fn current_style_key(property: &str) -> String {
    if property == "float" {
        return "styleFloat".to_owned();
    }
    let mut key = String::with_capacity(property.len());
    let mut chars = property.chars().peekable();
    while let Some(current) = chars.next() {
        match chars.peek() {
            Some(next) if current == '-' && next.is_ascii_lowercase() => {
                key.push(next.to_ascii_uppercase());
                chars.next();
            }
            _ => key.push(current),
        }
    }
    key
}

/// The `currentStyle` table of a legacy engine: camel-cased keys, and
/// `box-sizing` only under its `-ms-` prefixed name.
pub fn legacy_current_style(reported: Vec<(String, String)>) -> Vec<(String, String)> {
    reported
        .into_iter()
        .map(|(property, value)| {
            let property = if property == "box-sizing" {
                "-ms-box-sizing".to_owned()
            } else {
                property
            };
            (current_style_key(&property), value)
        })
        .collect()
}
