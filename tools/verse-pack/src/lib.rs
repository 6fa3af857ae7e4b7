use std::collections::HashSet;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;
use verseclock_core::books::BOOK_NAMES;
use verseclock_core::config::StorePaths;
use verseclock_core::pack::{DEFAULT_LEVEL, PackBuilder, PackError, PackFiles};
use verseclock_core::slot::{Slot, map_to_slot};
use verseclock_core::store::SLOT_COUNT;

pub const PRIMARY_PER_SLOT: usize = 10;
pub const MIN_SCORE_KEEP: f32 = 60.0;
pub const MIN_SCORE_BACKUP: f32 = 75.0;
const MIN_SCORE_NOTABLE: f32 = 50.0;

const MAX_CHAPTER: u16 = 23;
const MAX_VERSE: u16 = 59;

/// Openings of genealogies, census lists and similar non-standalone verses.
const BAD_PREFIXES: [&str; 12] = [
    "the children of",
    "and the children of",
    "the sons of",
    "and the sons of",
    "the daughters of",
    "the daughter of",
    "these are",
    "now these are",
    "the number of",
    "and the number of",
    "the names of",
    "and the names of",
];

const CONTINUATION_PREFIXES: [&str; 11] = [
    "and ",
    "but ",
    "for ",
    "therefore ",
    "wherefore ",
    "then ",
    "also ",
    "moreover ",
    "nevertheless ",
    "now ",
    "behold ",
];

const VERBS: [&str; 11] = [
    " is ", " are ", " was ", " were ", " hath ", " has ", " have ", " shall ", " will ", " said ",
    " saith ",
];

/// Well known verses seeded into the backup pool ahead of the score order.
const NOTABLE_REFS: [(&str, u16, u16); 14] = [
    ("Genesis", 1, 1),
    ("Psalms", 23, 1),
    ("Psalms", 23, 4),
    ("Psalms", 46, 10),
    ("Proverbs", 3, 5),
    ("Isaiah", 40, 31),
    ("Jeremiah", 29, 11),
    ("Micah", 6, 8),
    ("Matthew", 11, 28),
    ("John", 3, 16),
    ("John", 14, 6),
    ("Romans", 8, 28),
    ("Philippians", 4, 13),
    ("Revelation", 21, 4),
];

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: &'static str },
    #[error("pack error: {0}")]
    Pack(PackError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceVerse {
    pub book_id: u16,
    pub chapter: u16,
    pub verse: u16,
    pub text: String,
}

impl SourceVerse {
    fn key(&self) -> (u16, u16, u16) {
        (self.book_id, self.chapter, self.verse)
    }

    /// Slot this verse belongs to, if its chapter and verse read as a time.
    fn slot(&self) -> Option<Slot> {
        let in_range = (1..=MAX_CHAPTER).contains(&self.chapter) && (1..=MAX_VERSE).contains(&self.verse);
        in_range.then(|| map_to_slot(self.chapter as u8, self.verse as u8))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub per_slot: usize,
    pub level: u8,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            per_slot: PRIMARY_PER_SLOT,
            level: DEFAULT_LEVEL,
        }
    }
}

#[derive(Debug, Default)]
pub struct Selection {
    /// Chosen verses per slot, best first.
    pub slots: Vec<Vec<SourceVerse>>,
    pub candidates: usize,
    pub pool_size: usize,
    /// Slots left empty by scoring, before backfill.
    pub emptied: usize,
    pub backfilled: usize,
}

#[derive(Debug)]
pub struct Summary {
    pub scanned: usize,
    pub candidates: usize,
    pub filled: usize,
    pub backfilled: usize,
    /// `HH:MM` of every slot that has no verse.
    pub missing: Vec<String>,
    pub toc_bytes: usize,
    pub entries_bytes: usize,
    pub texts_bytes: usize,
}

pub fn normalize_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses `book_id<TAB>chapter<TAB>verse<TAB>text` lines. Blank lines and
/// lines starting with `#` are skipped.
pub fn parse_source<R: BufRead>(reader: R) -> Result<Vec<SourceVerse>, BuildError> {
    let mut verses = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.splitn(4, '\t');
        let mut number = |reason| {
            fields
                .next()
                .and_then(|f| f.trim().parse::<u16>().ok())
                .ok_or(BuildError::Parse { line: line_no, reason })
        };
        let book_id = number("bad book id")?;
        let chapter = number("bad chapter")?;
        let verse = number("bad verse")?;
        let text = fields.next().ok_or(BuildError::Parse {
            line: line_no,
            reason: "missing text",
        })?;
        verses.push(SourceVerse {
            book_id,
            chapter,
            verse,
            text: normalize_spaces(text),
        });
    }
    Ok(verses)
}

/// Rates how well a verse reads on its own, 0..=100.
pub fn standalone_score(text: &str) -> f32 {
    let text = text.trim();
    let lower = text.to_lowercase();
    let chars = text.chars().count();

    if chars < 25 || BAD_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return 0.0;
    }

    let mut score = 50.0;

    let words = text.split_whitespace().count();
    if words >= 10 {
        score += 10.0;
    }
    if words >= 14 {
        score += 6.0;
    }
    if words >= 18 {
        score += 4.0;
    }
    if words < 7 {
        score -= 25.0;
    }

    if CONTINUATION_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        score -= 12.0;
        if chars >= 90 {
            score += 6.0;
        }
    }

    let punct = text.chars().filter(|c| matches!(c, ',' | ';' | ':')).count();
    if punct >= 4 {
        score -= 10.0;
    }
    if punct >= 7 {
        score -= 10.0;
    }
    if lower.matches(" of ").count() >= 4 {
        score -= 10.0;
    }
    if text.chars().filter(char::is_ascii_digit).count() >= 4 {
        score -= 10.0;
    }

    if text.contains(['.', '!', '?', '\u{2014}']) {
        score += 6.0;
    }
    if VERBS.iter().any(|v| lower.contains(v)) {
        score += 8.0;
    }

    f32::clamp(score, 0.0, 100.0)
}

/// Stable index into a pool of `len` items for a slot.
pub fn deterministic_pick(len: usize, slot: usize) -> usize {
    let key = format!("slot:{slot}");
    crc32fast::hash(key.as_bytes()) as usize % len
}

fn book_id_by_name(name: &str) -> Option<u16> {
    BOOK_NAMES
        .iter()
        .position(|b| b.eq_ignore_ascii_case(name))
        .map(|i| i as u16 + 1)
}

fn sort_by_score(scored: &mut [(f32, &SourceVerse)]) {
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
}

fn backup_pool<'a>(by_slot: &[Vec<&'a SourceVerse>]) -> Vec<&'a SourceVerse> {
    let mut pool: Vec<(f32, &'a SourceVerse)> = Vec::new();

    for (name, chapter, verse) in NOTABLE_REFS {
        let Some(book_id) = book_id_by_name(name) else {
            continue;
        };
        let found = by_slot
            .iter()
            .flatten()
            .find(|v| v.key() == (book_id, chapter, verse));
        if let Some(v) = found {
            let score = standalone_score(&v.text);
            if score >= MIN_SCORE_NOTABLE {
                pool.push((score, *v));
            }
        }
    }
    for v in by_slot.iter().flatten() {
        let score = standalone_score(&v.text);
        if score >= MIN_SCORE_BACKUP {
            pool.push((score, *v));
        }
    }

    sort_by_score(&mut pool);
    let mut seen = HashSet::new();
    pool.into_iter()
        .filter(|(_, v)| seen.insert(v.key()))
        .map(|(_, v)| v)
        .collect()
}

/// Keeps the best `per_slot` verses of each slot and backfills empty slots
/// from the backup pool.
pub fn select(verses: &[SourceVerse], per_slot: usize) -> Selection {
    let mut by_slot: Vec<Vec<&SourceVerse>> = vec![Vec::new(); SLOT_COUNT];
    let mut candidates = 0;
    for verse in verses {
        if verse.text.is_empty() {
            continue;
        }
        if let Some(slot) = verse.slot() {
            by_slot[slot.index()].push(verse);
            candidates += 1;
        }
    }

    let pool = backup_pool(&by_slot);
    log::info!("backup pool size: {}", pool.len());

    let mut selection = Selection {
        candidates,
        pool_size: pool.len(),
        ..Selection::default()
    };
    for (index, slot_verses) in by_slot.iter().enumerate() {
        let mut scored: Vec<(f32, &SourceVerse)> =
            slot_verses.iter().map(|v| (standalone_score(&v.text), *v)).collect();
        sort_by_score(&mut scored);
        let mut kept: Vec<SourceVerse> = scored
            .into_iter()
            .filter(|(score, _)| *score >= MIN_SCORE_KEEP)
            .take(per_slot)
            .map(|(_, v)| v.clone())
            .collect();

        if kept.is_empty() {
            selection.emptied += 1;
            if !pool.is_empty() {
                kept.push(pool[deterministic_pick(pool.len(), index)].clone());
                selection.backfilled += 1;
            }
        }
        selection.slots.push(kept);
    }
    log::info!(
        "{} slots emptied by scoring, {} filled from backup",
        selection.emptied,
        selection.backfilled
    );
    selection
}

pub fn build_pack(selection: &Selection, level: u8) -> Result<PackFiles, BuildError> {
    let mut builder = PackBuilder::with_level(level);
    for (index, verses) in selection.slots.iter().enumerate() {
        let Some(slot) = Slot::new(index as u16) else {
            continue;
        };
        for v in verses {
            builder.push(slot, v.book_id, v.chapter, v.verse, &v.text);
        }
    }
    builder.try_finish().map_err(BuildError::Pack)
}

/// Writes the three pack files into `out_dir`, creating it if needed.
pub fn write_pack(files: &PackFiles, out_dir: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(out_dir)?;
    let names = StorePaths::under("");
    fs::write(out_dir.join(&names.toc), &files.toc)?;
    fs::write(out_dir.join(&names.entries), &files.entries)?;
    fs::write(out_dir.join(&names.texts), &files.texts)?;
    Ok(())
}

fn missing_times(selection: &Selection) -> Vec<String> {
    selection
        .slots
        .iter()
        .enumerate()
        .filter(|(_, verses)| verses.is_empty())
        .filter_map(|(index, _)| Slot::new(index as u16))
        .map(|slot| {
            let (hour, minute) = slot.time();
            format!("{hour:02}:{minute:02}")
        })
        .collect()
}

pub fn build(source: &Path, out_dir: &Path, options: &Options) -> Result<Summary, BuildError> {
    let reader = BufReader::new(fs::File::open(source)?);
    let verses = parse_source(reader)?;
    let selection = select(&verses, options.per_slot);
    let files = build_pack(&selection, options.level)?;
    write_pack(&files, out_dir)?;

    let summary = Summary {
        scanned: verses.len(),
        candidates: selection.candidates,
        filled: selection.slots.iter().filter(|s| !s.is_empty()).count(),
        backfilled: selection.backfilled,
        missing: missing_times(&selection),
        toc_bytes: files.toc.len(),
        entries_bytes: files.entries.len(),
        texts_bytes: files.texts.len(),
    };
    log::info!("verses scanned: {}", summary.scanned);
    log::info!("candidate matches: {}", summary.candidates);
    log::info!("times filled: {} / {}", summary.filled, SLOT_COUNT);
    if !summary.missing.is_empty() {
        let first: Vec<&str> = summary.missing.iter().take(50).map(String::as_str).collect();
        log::warn!("{} missing times, first: {}", summary.missing.len(), first.join(", "));
    }
    log::info!(
        "toc.bin {} bytes, entries.bin {} bytes, texts.bin {} bytes",
        summary.toc_bytes,
        summary.entries_bytes,
        summary.texts_bytes
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use verseclock_core::fs::MemVolume;
    use verseclock_core::store::{PassageStore, TOC_FILE_SIZE};

    const JOHN_3_16: &str = "For God so loved the world, that he gave his only begotten Son, \
        that whosoever believeth in him should not perish, but have everlasting life.";

    fn verse(book_id: u16, chapter: u16, verse: u16, text: &str) -> SourceVerse {
        SourceVerse {
            book_id,
            chapter,
            verse,
            text: text.to_string(),
        }
    }

    #[test]
    fn parses_tab_separated_lines() {
        let source = "# kjv\n43\t3\t16\tFor God  so\tloved\n\n1\t1\t1\t In the beginning \n";
        let verses = parse_source(source.as_bytes()).unwrap();
        assert_eq!(verses.len(), 2);
        assert_eq!(verses[0], verse(43, 3, 16, "For God so loved"));
        assert_eq!(verses[1].text, "In the beginning");
    }

    #[test]
    fn reports_the_bad_line() {
        let err = parse_source("1\t1\t1\tok\n1\tx\t1\ttext\n".as_bytes()).unwrap_err();
        match err {
            BuildError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
        assert!(parse_source("1\t1\t1\n".as_bytes()).is_err());
    }

    #[test]
    fn scores_standalone_verses() {
        assert_eq!(standalone_score(JOHN_3_16), 78.0);
        assert_eq!(standalone_score("Jesus wept."), 0.0);
        assert_eq!(
            standalone_score("These are the generations of the heavens and of the earth."),
            0.0
        );
        let list = "The sons of Gomer; Ashkenaz, and Riphath, and Togarmah, and more, and more.";
        assert_eq!(standalone_score(list), 0.0);
    }

    #[test]
    fn keeps_best_verses_first() {
        let weak = "And he said unto them, go, and see, and come, and tell.";
        let verses = vec![verse(1, 3, 16, weak), verse(43, 3, 16, JOHN_3_16)];
        let selection = select(&verses, PRIMARY_PER_SLOT);
        let kept = &selection.slots[map_to_slot(3, 16).index()];
        assert_eq!(kept[0].book_id, 43);
        assert!(kept.iter().all(|v| standalone_score(&v.text) >= MIN_SCORE_KEEP));
    }

    #[test]
    fn per_slot_cap_applies() {
        let verses: Vec<_> = (1..=5).map(|book| verse(book, 3, 16, JOHN_3_16)).collect();
        let selection = select(&verses, 2);
        assert_eq!(selection.slots[map_to_slot(3, 16).index()].len(), 2);
    }

    #[test]
    fn out_of_range_verses_are_ignored() {
        let verses = vec![verse(43, 24, 1, JOHN_3_16), verse(43, 3, 60, JOHN_3_16)];
        let selection = select(&verses, PRIMARY_PER_SLOT);
        assert_eq!(selection.candidates, 0);
        assert_eq!(selection.pool_size, 0);
        assert!(selection.slots.iter().all(Vec::is_empty));
    }

    #[test]
    fn empty_slots_backfill_deterministically() {
        let verses = vec![verse(43, 3, 16, JOHN_3_16)];
        let first = select(&verses, PRIMARY_PER_SLOT);
        let second = select(&verses, PRIMARY_PER_SLOT);
        assert_eq!(first.pool_size, 1);
        assert_eq!(first.emptied, SLOT_COUNT - 1);
        assert_eq!(first.backfilled, SLOT_COUNT - 1);
        assert!(first.slots.iter().all(|s| s.len() == 1));
        assert_eq!(first.slots, second.slots);
        assert_eq!(deterministic_pick(7, 42), deterministic_pick(7, 42));
    }

    #[test]
    fn backfill_pick_is_crc32_of_slot_key() {
        assert_eq!(deterministic_pick(1000, 0), 92);
        assert_eq!(deterministic_pick(1000, 1), 650);
        assert_eq!(deterministic_pick(1000, 1356), 308);
    }

    #[test]
    fn written_pack_loads_in_store() {
        let verses = vec![
            verse(43, 3, 16, JOHN_3_16),
            verse(1, 1, 1, "In the beginning God created the heaven and the earth."),
        ];
        let selection = select(&verses, PRIMARY_PER_SLOT);
        let files = build_pack(&selection, DEFAULT_LEVEL).unwrap();
        assert_eq!(files.toc.len(), TOC_FILE_SIZE);

        let dir = tempfile::tempdir().unwrap();
        write_pack(&files, dir.path()).unwrap();
        let paths = StorePaths::default();
        let mut volume = MemVolume::new();
        volume.insert(&paths.toc, fs::read(dir.path().join("toc.bin")).unwrap());
        volume.insert(&paths.entries, fs::read(dir.path().join("entries.bin")).unwrap());
        volume.insert(&paths.texts, fs::read(dir.path().join("texts.bin")).unwrap());

        let mut store = PassageStore::new(volume, paths);
        store.load().unwrap();
        let record = store.lookup(map_to_slot(3, 16)).unwrap().unwrap();
        assert_eq!(record.reference().to_string(), "John 3:16");
        assert_eq!(store.decode(&record).unwrap(), JOHN_3_16);
    }

    #[test]
    fn build_summarises_coverage() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("kjv.tsv");
        // Too short to score, so nothing qualifies for the backup pool.
        fs::write(&source, "43\t11\t35\tJesus wept.\n").unwrap();
        let out = dir.path().join("data");

        let summary = build(&source, &out, &Options::default()).unwrap();
        assert_eq!(summary.scanned, 1);
        assert_eq!(summary.candidates, 1);
        assert_eq!(summary.filled, 0);
        assert_eq!(summary.missing.len(), SLOT_COUNT);
        assert_eq!(summary.missing[0], "01:01");
        assert_eq!(summary.toc_bytes, TOC_FILE_SIZE);
        assert!(out.join("texts.bin").exists());
    }
}
