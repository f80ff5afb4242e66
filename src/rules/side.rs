/// Side placeholder tokens in matching precedence. `\Left` and `\left` are
/// tested before their one-letter forms because the short forms are prefixes
/// of the long ones.
const PLACEHOLDERS: [(&str, &str, &str); 4] = [
    ("\\Left", "Left", "Right"),
    ("\\left", "left", "right"),
    ("\\L", "L", "R"),
    ("\\l", "l", "r"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];
}

/// True when the text carries any side placeholder.
pub fn has_side_placeholder(text: &str) -> bool {
    text.contains("\\L") || text.contains("\\l")
}

/// Substitute every placeholder for the given side.
pub fn resolve_side(text: &str, side: Side) -> String {
    if !has_side_placeholder(text) {
        return text.to_string();
    }
    PLACEHOLDERS
        .iter()
        .fold(text.to_string(), |acc, (token, left, right)| {
            let replacement = match side {
                Side::Left => left,
                Side::Right => right,
            };
            acc.replace(token, replacement)
        })
}

/// Entries that may mention a side placeholder in any of their fields.
pub trait SideExpand: Sized {
    fn has_side(&self) -> bool;

    fn for_side(&self, side: Side) -> Self;

    /// One entry when no placeholder is present, otherwise the Left and
    /// Right variants in that order.
    fn expand(self) -> Vec<Self> {
        if self.has_side() {
            Side::BOTH.iter().map(|side| self.for_side(*side)).collect()
        } else {
            vec![self]
        }
    }
}

impl SideExpand for String {
    fn has_side(&self) -> bool {
        has_side_placeholder(self)
    }

    fn for_side(&self, side: Side) -> Self {
        resolve_side(self, side)
    }
}

/// Expand a list of names, keeping table order.
pub fn expand_all<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    names
        .into_iter()
        .flat_map(|name| name.to_string().expand())
        .collect()
}
