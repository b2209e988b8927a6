use indexmap::IndexMap;
use livraria_catalog::Book;

/// The books a user marked during the current session.
///
/// Membership is keyed by [Book::id].
/// Iteration follows the order in which books were first marked.
/// The set lives only as long as the session, it is never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteSet {
    books: IndexMap<String, Book>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `book` if it is a favorite, otherwise add it.
    pub fn toggle(&mut self, book: &Book) -> &Self {
        if self.books.shift_remove(&book.id).is_none() {
            self.books.insert(book.id.clone(), book.clone());
        }
        self
    }

    /// Remove the book with `id`, returning it if it was a favorite.
    pub fn remove(&mut self, id: &str) -> Option<Book> {
        self.books.shift_remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.books.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Book> {
        self.books.get(id)
    }

    /// A snapshot of the current favorites.
    ///
    /// Later changes to the set are not reflected in the returned list.
    pub fn all(&self) -> Vec<Book> {
        self.books.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
