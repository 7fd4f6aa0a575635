//! A small library domain for exercising the orchestrator.
//!
//! [`Author`] and [`Book`] cover every relation container kind between
//! them, plus an enum stored as text and a cascading entity-to-entity
//! foreign key (`books.author_id` references `authors`).

use relstore_core::{
    CoreError, CoreResult, EntitySchema, Persist, Relation, RelationKind, RelationList,
    RelationMap, RelationOrderedList, RelationSet, RelationTable, Status,
};
use relstore_model::{row, ColumnSchema, DeleteBehavior, Row, TableSchema, Value, ValueType};
use uuid::Uuid;

/// An author's shelf classification, stored as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Genre {
    /// General fiction.
    Fiction,
    /// Mystery and crime.
    Mystery,
    /// Science fiction.
    SciFi,
}

impl Genre {
    /// Returns the stored text form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fiction => "fiction",
            Self::Mystery => "mystery",
            Self::SciFi => "scifi",
        }
    }

    /// Parses the stored text form.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "fiction" => Some(Self::Fiction),
            "mystery" => Some(Self::Mystery),
            "scifi" => Some(Self::SciFi),
            _ => None,
        }
    }
}

/// An author with a set of pen names.
#[derive(Debug)]
pub struct Author {
    /// Primary key.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Shelf classification.
    pub genre: Genre,
    /// Known pen names, unique.
    pub aliases: RelationSet<String>,
}

impl Author {
    /// Creates an author; every given alias enters as `New`.
    #[must_use]
    pub fn new(name: &str, genre: Genre, aliases: &[&str]) -> Self {
        let mut set = RelationSet::new();
        for alias in aliases {
            set.insert((*alias).to_owned());
        }
        Self {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            genre,
            aliases: set,
        }
    }
}

impl Persist for Author {
    fn schema() -> EntitySchema {
        let principal = TableSchema::new(
            "authors",
            vec![
                ColumnSchema::new("id", ValueType::Uuid),
                ColumnSchema::new("name", ValueType::Text),
                ColumnSchema::new("genre", ValueType::Text),
            ],
            1,
        );
        let aliases = TableSchema::new(
            "author_aliases",
            vec![
                ColumnSchema::new("author_id", ValueType::Uuid)
                    .references("authors", DeleteBehavior::Restrict),
                ColumnSchema::new("alias", ValueType::Text),
            ],
            2,
        );
        EntitySchema::new(
            "Author",
            principal,
            vec![RelationTable::new(aliases, RelationKind::Set)],
        )
    }

    fn from_row(row: &Row) -> CoreResult<Self> {
        let genre_text = row.column(2)?.expect_str()?;
        let genre = Genre::parse(genre_text)
            .ok_or_else(|| CoreError::row_shape("authors", format!("bad genre {genre_text:?}")))?;
        Ok(Self {
            id: row.column(0)?.expect_uuid()?,
            name: row.column(1)?.expect_str()?.to_owned(),
            genre,
            aliases: RelationSet::new(),
        })
    }

    fn key(&self) -> Row {
        row![self.id]
    }

    fn principal_row(&self) -> Row {
        row![self.id, self.name.clone(), self.genre.as_str()]
    }

    fn relation_diff(&self, table: &str) -> CoreResult<Vec<(Row, Status)>> {
        match table {
            "author_aliases" => Ok(self
                .aliases
                .diff()
                .into_iter()
                .map(|(alias, status)| (row![alias], status))
                .collect()),
            other => Err(CoreError::unknown_relation_table(other)),
        }
    }

    fn repopulate_relation(&mut self, table: &str, row: &Row) -> CoreResult<()> {
        match table {
            "author_aliases" => {
                let alias = row.column(0)?.expect_str()?.to_owned();
                self.aliases.repopulate(alias)
            }
            other => Err(CoreError::unknown_relation_table(other)),
        }
    }

    fn canonicalize_relations(&mut self) {
        self.aliases.canonicalize();
    }

    fn unsaved_relation_entries(&self) -> usize {
        self.aliases.unsaved_entries()
    }
}

/// A book owned by an author, carrying one relation of each remaining
/// container kind.
#[derive(Debug)]
pub struct Book {
    /// Primary key.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Owning author.
    pub author_id: Uuid,
    /// Free-form tags, duplicates allowed.
    pub tags: RelationList<String>,
    /// Reviewer name to score.
    pub ratings: RelationMap<String, i64>,
    /// Reprint timestamps in print order.
    pub reprints: RelationOrderedList<i64>,
}

impl Book {
    /// Creates a book with empty relations.
    #[must_use]
    pub fn new(title: &str, author_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.to_owned(),
            author_id,
            tags: RelationList::new(),
            ratings: RelationMap::new(),
            reprints: RelationOrderedList::new(),
        }
    }
}

impl Persist for Book {
    fn schema() -> EntitySchema {
        let principal = TableSchema::new(
            "books",
            vec![
                ColumnSchema::new("id", ValueType::Uuid),
                ColumnSchema::new("title", ValueType::Text),
                ColumnSchema::new("author_id", ValueType::Uuid)
                    .references("authors", DeleteBehavior::Cascade),
            ],
            1,
        );
        let tags = TableSchema::new(
            "book_tags",
            vec![
                ColumnSchema::new("book_id", ValueType::Uuid)
                    .references("books", DeleteBehavior::Restrict),
                ColumnSchema::new("tag", ValueType::Text),
            ],
            2,
        );
        let ratings = TableSchema::new(
            "book_ratings",
            vec![
                ColumnSchema::new("book_id", ValueType::Uuid)
                    .references("books", DeleteBehavior::Restrict),
                ColumnSchema::new("reviewer", ValueType::Text),
                ColumnSchema::new("score", ValueType::Integer),
            ],
            2,
        );
        let reprints = TableSchema::new(
            "book_reprints",
            vec![
                ColumnSchema::new("book_id", ValueType::Uuid)
                    .references("books", DeleteBehavior::Restrict),
                ColumnSchema::new("position", ValueType::Integer),
                ColumnSchema::new("reprinted_at", ValueType::Timestamp),
            ],
            2,
        );
        EntitySchema::new(
            "Book",
            principal,
            vec![
                RelationTable::new(tags, RelationKind::List),
                RelationTable::new(ratings, RelationKind::Map),
                RelationTable::new(reprints, RelationKind::Ordered),
            ],
        )
    }

    fn from_row(row: &Row) -> CoreResult<Self> {
        Ok(Self {
            id: row.column(0)?.expect_uuid()?,
            title: row.column(1)?.expect_str()?.to_owned(),
            author_id: row.column(2)?.expect_uuid()?,
            tags: RelationList::new(),
            ratings: RelationMap::new(),
            reprints: RelationOrderedList::new(),
        })
    }

    fn key(&self) -> Row {
        row![self.id]
    }

    fn principal_row(&self) -> Row {
        row![self.id, self.title.clone(), self.author_id]
    }

    fn relation_diff(&self, table: &str) -> CoreResult<Vec<(Row, Status)>> {
        match table {
            "book_tags" => Ok(self
                .tags
                .diff()
                .into_iter()
                .map(|(tag, status)| (row![tag], status))
                .collect()),
            "book_ratings" => Ok(self
                .ratings
                .diff()
                .into_iter()
                .map(|((reviewer, score), status)| (row![reviewer, score], status))
                .collect()),
            "book_reprints" => self
                .reprints
                .diff()
                .into_iter()
                .map(|((position, at), status)| {
                    let position = i64::try_from(position)
                        .map_err(|e| CoreError::row_shape("book_reprints", e))?;
                    Ok((row![position, Value::Timestamp(at)], status))
                })
                .collect(),
            other => Err(CoreError::unknown_relation_table(other)),
        }
    }

    fn repopulate_relation(&mut self, table: &str, row: &Row) -> CoreResult<()> {
        match table {
            "book_tags" => {
                let tag = row.column(0)?.expect_str()?.to_owned();
                self.tags.repopulate(tag)
            }
            "book_ratings" => {
                let reviewer = row.column(0)?.expect_str()?.to_owned();
                let score = row.column(1)?.expect_i64()?;
                self.ratings.repopulate_entry(reviewer, score)
            }
            "book_reprints" => {
                let position = usize::try_from(row.column(0)?.expect_i64()?)
                    .map_err(|e| CoreError::row_shape("book_reprints", e))?;
                let at = row.column(1)?.expect_timestamp()?;
                self.reprints.repopulate((position, at))
            }
            other => Err(CoreError::unknown_relation_table(other)),
        }
    }

    fn canonicalize_relations(&mut self) {
        self.tags.canonicalize();
        self.ratings.canonicalize();
        self.reprints.canonicalize();
    }

    fn unsaved_relation_entries(&self) -> usize {
        self.tags.unsaved_entries()
            + self.ratings.unsaved_entries()
            + self.reprints.unsaved_entries()
    }
}
