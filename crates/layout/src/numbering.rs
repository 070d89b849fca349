//! Page numbering registry. Groups are registered as pages are created;
//! each group start becomes one entry in the output PageLabels number tree.

use folio_style::{NumberingStyle, PageNumberOptions};

#[derive(Debug, Clone)]
pub struct NumberGroup {
    pub start_page_index: usize,
    pub style: NumberingStyle,
    pub start_number: i32,
    pub name: Option<String>,
}

#[derive(Debug, Default)]
pub struct PageNumberRegistry {
    groups: Vec<NumberGroup>,
}

impl PageNumberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the numbering in force from `page_index` onwards. Pages
    /// sharing the previous group's name (or registering nothing) continue
    /// the previous counter, so only true boundaries create entries.
    pub fn register(&mut self, page_index: usize, options: &PageNumberOptions) {
        if let Some(last) = self.groups.last() {
            let same_group = last.name == options.group
                && last.style == options.style
                && options.start.is_none();
            if same_group {
                return;
            }
        }
        let start_number = options.start.unwrap_or(1);
        self.groups.push(NumberGroup {
            start_page_index: page_index,
            style: options.style,
            start_number,
            name: options.group.clone(),
        });
    }

    pub fn entries(&self) -> &[NumberGroup] {
        &self.groups
    }

    /// The group governing a page, if any numbering was registered at or
    /// before it.
    pub fn group_for_page(&self, page_index: usize) -> Option<&NumberGroup> {
        self.groups
            .iter()
            .rev()
            .find(|g| g.start_page_index <= page_index)
    }

    /// Formats a page's visible number. Pages before any registration fall
    /// back to decimal numbering from 1.
    pub fn format_for_page(&self, page_index: usize) -> String {
        match self.group_for_page(page_index) {
            Some(group) => {
                let n = group.start_number + (page_index - group.start_page_index) as i32;
                format_number(group.style, n)
            }
            None => (page_index as i32 + 1).to_string(),
        }
    }
}

/// Shared between page labels and list markers.
pub fn format_number(style: NumberingStyle, n: i32) -> String {
    match style {
        NumberingStyle::Decimal => n.to_string(),
        NumberingStyle::UppercaseRoman => to_roman(n),
        NumberingStyle::LowercaseRoman => to_roman(n).to_lowercase(),
        NumberingStyle::UppercaseLetters => to_letters(n),
        NumberingStyle::LowercaseLetters => to_letters(n).to_lowercase(),
    }
}

fn to_roman(mut n: i32) -> String {
    if n <= 0 {
        return n.to_string();
    }
    const TABLE: [(i32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (value, digits) in TABLE {
        while n >= value {
            out.push_str(digits);
            n -= value;
        }
    }
    out
}

/// A, B, .. Z, AA, AB, .. like spreadsheet columns.
fn to_letters(n: i32) -> String {
    if n <= 0 {
        return n.to_string();
    }
    let mut n = n as u32;
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
