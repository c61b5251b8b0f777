//! Plain-text menu output.

use std::io::{self, Write};
use std::path::Path;

use crate::menu::{Dish, Menu};

/// Text shown when the menu description file is missing.
pub const MISSING_DESCRIPTION: &str = "Menu description not found.";

const RULE_WIDTH: usize = 80;

/// Read the free-form menu description, or a placeholder if it is missing.
pub fn load_description(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            log::debug!("No menu description at {}: {}", path.display(), e);
            MISSING_DESCRIPTION.to_string()
        }
    }
}

pub fn print_header<W: Write>(out: &mut W, title: &str, subtitle: Option<&str>) -> io::Result<()> {
    writeln!(out, "# {}", title)?;
    if let Some(subtitle) = subtitle.filter(|s| !s.is_empty()) {
        writeln!(out, "({})", subtitle)?;
    }
    writeln!(out)?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    writeln!(out)
}

pub fn print_section<W: Write>(out: &mut W, title: &str, subtitle: Option<&str>) -> io::Result<()> {
    match subtitle.filter(|s| !s.is_empty()) {
        Some(subtitle) => writeln!(out, "## {} ({})", title, subtitle)?,
        None => writeln!(out, "## {}", title)?,
    }
    writeln!(out)
}

pub fn print_item<W: Write>(out: &mut W, dish: &Dish) -> io::Result<()> {
    writeln!(out, "- {}", dish.name)?;
    if let Some(short) = dish.short.as_deref().filter(|s| !s.is_empty()) {
        writeln!(out, "  {}", short)?;
    }
    writeln!(out)
}

pub fn print_notes<W: Write>(out: &mut W, notes: &[String]) -> io::Result<()> {
    if notes.is_empty() {
        return Ok(());
    }
    writeln!(out, "Notes:")?;
    for note in notes {
        writeln!(out, "  - {}", note)?;
    }
    writeln!(out)
}

/// Print the whole menu.
///
/// `art` is called once per dish, in menu order; whatever it returns is
/// printed under the dish.
pub fn print_menu<W, F>(out: &mut W, menu: &Menu, mut art: F) -> io::Result<()>
where
    W: Write,
    F: FnMut(&Dish) -> Option<String>,
{
    print_header(out, &menu.title, menu.subtitle.as_deref())?;

    for section in &menu.sections {
        print_section(out, &section.title, section.subtitle.as_deref())?;
        for dish in &section.items {
            print_item(out, dish)?;
            if let Some(text) = art(dish) {
                writeln!(out, "{}", text)?;
            }
        }
    }

    print_notes(out, &menu.notes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::Section;
    use tempfile::TempDir;

    fn render<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(f: F) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_header_with_subtitle() {
        let text = render(|out| print_header(out, "Dinner", Some("Friday")));
        assert_eq!(text, format!("# Dinner\n(Friday)\n\n{}\n\n", "-".repeat(80)));
    }

    #[test]
    fn test_section_without_subtitle() {
        assert_eq!(render(|out| print_section(out, "Grill", None)), "## Grill\n\n");
        assert_eq!(
            render(|out| print_section(out, "Grill", Some("hot"))),
            "## Grill (hot)\n\n"
        );
    }

    #[test]
    fn test_item_skips_empty_short() {
        let dish = Dish::new("Soup").with_short("");
        assert_eq!(render(|out| print_item(out, &dish)), "- Soup\n\n");

        let dish = Dish::new("Soup").with_short("lentil");
        assert_eq!(render(|out| print_item(out, &dish)), "- Soup\n  lentil\n\n");
    }

    #[test]
    fn test_no_notes_prints_nothing() {
        assert_eq!(render(|out| print_notes(out, &[])), "");
    }

    #[test]
    fn test_print_menu_with_art() {
        let menu = Menu {
            title: "Dinner".to_string(),
            subtitle: None,
            sections: vec![Section {
                title: "Mezze".to_string(),
                subtitle: None,
                items: vec![Dish::new("Hummus"), Dish::new("Olives")],
            }],
            notes: vec!["BYO bread".to_string()],
        };

        let mut seen = Vec::new();
        let text = render(|out| {
            print_menu(out, &menu, |dish| {
                seen.push(dish.name.clone());
                Some(format!("[{}]", dish.name))
            })
        });

        assert_eq!(seen, vec!["Hummus", "Olives"]);
        assert!(text.contains("- Hummus\n\n[Hummus]\n"));
        assert!(text.ends_with("Notes:\n  - BYO bread\n\n"));
    }

    #[test]
    fn test_missing_description() {
        let dir = TempDir::new().unwrap();
        assert_eq!(load_description(&dir.path().join("menu.md")), MISSING_DESCRIPTION);
    }
}
