//! Terminal rendering of books and favorites.

use std::fmt::{self, Display};

use livraria_sdk::catalog::Book;

/// Shown in place of absent authors
pub const UNKNOWN_AUTHOR: &str = "Desconhecido";
/// Shown in place of an absent published date
pub const UNKNOWN_DATE: &str = "N/A";

/// Cell width assumed when the terminal does not report its pixel size
const PIXELS_PER_CELL: u32 = 8;

/// Number of favorites columns for a viewport `width` pixels wide.
pub fn grid_columns(width: u32) -> usize {
    match width {
        1024.. => 3,
        768.. => 2,
        _ => 1,
    }
}

/// The viewport width in pixels, estimated from the cell count if necessary.
pub fn viewport_width(columns: u16, width_px: u16) -> u32 {
    if width_px > 0 {
        width_px as u32
    } else {
        columns as u32 * PIXELS_PER_CELL
    }
}

pub struct DisplayAuthors<'a>(pub &'a Book);

impl Display for DisplayAuthors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.authors {
            Some(authors) if !authors.is_empty() => write!(f, "{}", authors.join(", ")),
            _ => write!(f, "{UNKNOWN_AUTHOR}"),
        }
    }
}

pub struct DisplayDate<'a>(pub &'a Book);

impl Display for DisplayDate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.published_date.as_deref() {
            Some(date) if !date.is_empty() => write!(f, "{date}"),
            _ => write!(f, "{UNKNOWN_DATE}"),
        }
    }
}

/// One line per book, used in result lists and pickers.
pub struct DisplayBookLine<'a> {
    pub book: &'a Book,
    pub is_favorite: bool,
}

impl Display for DisplayBookLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let star = if self.is_favorite { "★" } else { "☆" };
        write!(
            f,
            "{star} {} | Autor: {} | Ano: {}",
            self.book.title,
            DisplayAuthors(self.book),
            DisplayDate(self.book)
        )
    }
}

/// The detail view of a single book.
pub struct DisplayBookDetails<'a>(pub &'a Book);

impl Display for DisplayBookDetails<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let book = self.0;
        writeln!(f, "{}", book.title)?;
        writeln!(f)?;
        writeln!(f, "Autor: {}", DisplayAuthors(book))?;
        writeln!(f, "Ano: {}", DisplayDate(book))?;
        if let Some(thumbnail) = &book.thumbnail_url {
            writeln!(f, "Capa: {thumbnail}")?;
        }
        if let Some(description) = &book.description {
            writeln!(f)?;
            write!(f, "{description}")?;
        }
        Ok(())
    }
}

/// Favorites laid out in `columns` columns across `width` terminal cells.
pub struct DisplayFavoritesGrid<'a> {
    pub books: &'a [Book],
    pub columns: usize,
    pub width: usize,
}

impl Display for DisplayFavoritesGrid<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self.columns.max(1);
        let cell_width = (self.width / columns).max(12);

        for row in self.books.chunks(columns) {
            let cells = row
                .iter()
                .map(|book| {
                    [
                        format!("★ {}", book.title),
                        format!("Autor: {}", DisplayAuthors(book)),
                        format!("Ano: {}", DisplayDate(book)),
                    ]
                })
                .collect::<Vec<_>>();

            for line in 0..3 {
                let rendered = cells
                    .iter()
                    .map(|cell| pad(&cell[line], cell_width))
                    .collect::<String>();
                writeln!(f, "{}", rendered.trim_end())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Truncate or pad `text` to exactly `width` characters, keeping a gap of one.
fn pad(text: &str, width: usize) -> String {
    let max = width.saturating_sub(1);
    let count = text.chars().count();
    if count > max {
        let mut truncated = text.chars().take(max.saturating_sub(1)).collect::<String>();
        truncated.push('…');
        format!("{truncated:<width$}")
    } else {
        format!("{text:<width$}")
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn dragon_keep() -> Book {
        Book {
            authors: Some(vec!["R. Scale".to_string(), "M. Wing".to_string()]),
            published_date: Some("1999".to_string()),
            ..Book::new("B1", "Dragon Keep")
        }
    }

    #[test]
    fn columns_follow_width_breakpoints() {
        assert_eq!(grid_columns(0), 1);
        assert_eq!(grid_columns(767), 1);
        assert_eq!(grid_columns(768), 2);
        assert_eq!(grid_columns(1023), 2);
        assert_eq!(grid_columns(1024), 3);
        assert_eq!(grid_columns(2560), 3);
    }

    #[test]
    fn viewport_width_falls_back_to_cells() {
        assert_eq!(viewport_width(100, 0), 800);
        assert_eq!(viewport_width(100, 1200), 1200);
    }

    #[test]
    fn absent_fields_render_placeholders() {
        let book = Book::new("B2", "Untitled Ideas");
        assert_eq!(DisplayAuthors(&book).to_string(), "Desconhecido");
        assert_eq!(DisplayDate(&book).to_string(), "N/A");
    }

    #[test]
    fn book_line_marks_favorites() {
        let book = dragon_keep();
        assert_eq!(
            DisplayBookLine {
                book: &book,
                is_favorite: true
            }
            .to_string(),
            "★ Dragon Keep | Autor: R. Scale, M. Wing | Ano: 1999"
        );
        assert_eq!(
            DisplayBookLine {
                book: &book,
                is_favorite: false
            }
            .to_string(),
            "☆ Dragon Keep | Autor: R. Scale, M. Wing | Ano: 1999"
        );
    }

    #[test]
    fn details_include_description() {
        let book = Book {
            description: Some("A keep full of dragons.".to_string()),
            ..dragon_keep()
        };
        assert_eq!(
            DisplayBookDetails(&book).to_string(),
            indoc! {"
                Dragon Keep

                Autor: R. Scale, M. Wing
                Ano: 1999

                A keep full of dragons."}
        );
    }

    #[test]
    fn grid_wraps_rows() {
        let books = vec![
            dragon_keep(),
            Book::new("B2", "Untitled Ideas"),
            Book::new("B3", "Third"),
        ];
        let grid = DisplayFavoritesGrid {
            books: &books,
            columns: 2,
            width: 60,
        }
        .to_string();

        let expected = [
            "★ Dragon Keep                 ★ Untitled Ideas",
            "Autor: R. Scale, M. Wing      Autor: Desconhecido",
            "Ano: 1999                     Ano: N/A",
            "",
            "★ Third",
            "Autor: Desconhecido",
            "Ano: N/A",
            "",
            "",
        ]
        .join("\n");
        assert_eq!(grid, expected);
    }

    #[test]
    fn long_titles_are_truncated() {
        assert_eq!(pad("abcdefghij", 6), "abcd… ");
        assert_eq!(pad("abc", 6), "abc   ");
    }
}
