use core::fmt;

pub const BOOK_COUNT: usize = 66;

/// Canonical book names, indexed by `book_id - 1`.
pub const BOOK_NAMES: [&str; BOOK_COUNT] = [
    "Genesis",
    "Exodus",
    "Leviticus",
    "Numbers",
    "Deuteronomy",
    "Joshua",
    "Judges",
    "Ruth",
    "1 Samuel",
    "2 Samuel",
    "1 Kings",
    "2 Kings",
    "1 Chronicles",
    "2 Chronicles",
    "Ezra",
    "Nehemiah",
    "Esther",
    "Job",
    "Psalms",
    "Proverbs",
    "Ecclesiastes",
    "Song of Solomon",
    "Isaiah",
    "Jeremiah",
    "Lamentations",
    "Ezekiel",
    "Daniel",
    "Hosea",
    "Joel",
    "Amos",
    "Obadiah",
    "Jonah",
    "Micah",
    "Nahum",
    "Habakkuk",
    "Zephaniah",
    "Haggai",
    "Zechariah",
    "Malachi",
    "Matthew",
    "Mark",
    "Luke",
    "John",
    "Acts",
    "Romans",
    "1 Corinthians",
    "2 Corinthians",
    "Galatians",
    "Ephesians",
    "Philippians",
    "Colossians",
    "1 Thessalonians",
    "2 Thessalonians",
    "1 Timothy",
    "2 Timothy",
    "Titus",
    "Philemon",
    "Hebrews",
    "James",
    "1 Peter",
    "2 Peter",
    "1 John",
    "2 John",
    "3 John",
    "Jude",
    "Revelation",
];

pub fn book_name(book_id: u16) -> Option<&'static str> {
    let index = (book_id as usize).checked_sub(1)?;
    BOOK_NAMES.get(index).copied()
}

/// Scripture reference; displays as `John 3:16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub book_id: u16,
    pub chapter: u16,
    pub verse: u16,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match book_name(self.book_id) {
            Some(name) => write!(f, "{} {}:{}", name, self.chapter, self.verse),
            None => write!(f, "Book {} {}:{}", self.book_id, self.chapter, self.verse),
        }
    }
}
