//! Word wrapping and the time/date/temperature strings.
//!
//! Everything here is pure: identical input always yields identical output.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::config::TempUnit;

pub const ELLIPSIS: &str = "...";

pub const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub trait FontMetrics {
    /// Horizontal advance of one glyph in pixels.
    fn advance(&self, ch: char) -> u32;
    fn line_height(&self) -> u32;

    fn measure(&self, text: &str) -> u32 {
        text.chars().map(|ch| self.advance(ch)).sum()
    }
}

/// Greedy word wrap into at most `max_lines` lines no wider than `max_width`.
///
/// Lines break at the last space that fits; a word longer than a whole line
/// is split where it overflows. Leading spaces of each line are skipped and
/// no line is empty. When text is left over, `...` is appended to the last
/// line if it still fits.
pub fn wrap<F: FontMetrics + ?Sized>(
    text: &str,
    max_width: u32,
    max_lines: usize,
    font: &F,
) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut lines: Vec<String> = Vec::new();
    let mut pos = 0;

    while lines.len() < max_lines {
        while pos < chars.len() && chars[pos] == ' ' {
            pos += 1;
        }
        if pos >= chars.len() {
            break;
        }

        let start = pos;
        let mut end = start;
        let mut width = 0u32;
        let mut last_space = None;
        while end < chars.len() {
            let ch = chars[end];
            let advance = font.advance(ch);
            if ch == ' ' {
                last_space = Some(end);
            }
            if width + advance > max_width {
                break;
            }
            width += advance;
            end += 1;
        }

        let (line_end, next) = if end >= chars.len() {
            (chars.len(), chars.len())
        } else {
            match last_space {
                Some(space) if space > start => (space, space + 1),
                _ => (end, end),
            }
        };
        if line_end == start {
            // Not even one glyph fits.
            break;
        }

        let line: String = chars[start..line_end].iter().collect();
        lines.push(String::from(line.trim_end_matches(' ')));
        pos = next;
    }

    let leftover = chars[pos.min(chars.len())..].iter().any(|ch| *ch != ' ');
    if leftover {
        if let Some(last) = lines.last_mut() {
            if font.measure(last) + font.measure(ELLIPSIS) <= max_width {
                last.push_str(ELLIPSIS);
            }
        }
    }
    lines
}

/// Clock string with the 12-hour marker kept separate so it can be styled
/// on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeText {
    pub digits: String,
    pub meridiem: Option<&'static str>,
}

pub fn format_time(hour24: u8, minute: u8, clock24: bool) -> TimeText {
    if clock24 {
        return TimeText {
            digits: format!("{:02}:{:02}", hour24, minute),
            meridiem: None,
        };
    }
    let hour12 = match hour24 % 12 {
        0 => 12,
        h => h,
    };
    TimeText {
        digits: format!("{}:{:02}", hour12, minute),
        meridiem: Some(if hour24 < 12 { "AM" } else { "PM" }),
    }
}

pub fn weekday_name(weekday: u8) -> &'static str {
    WEEKDAYS.get(weekday as usize).copied().unwrap_or("---")
}

pub fn month_name(month: u8) -> &'static str {
    MONTHS.get(month as usize).copied().unwrap_or("---")
}

/// `weekday` is 0 = Sunday, `month` is 0 = January.
pub fn format_date(weekday: u8, month: u8, day: u8) -> String {
    format!("{} {} {}", weekday_name(weekday), month_name(month), day)
}

pub fn format_temperature(celsius: f32, unit: TempUnit) -> String {
    let (value, suffix) = match unit {
        TempUnit::Celsius => (celsius, 'C'),
        TempUnit::Fahrenheit => (celsius * 9.0 / 5.0 + 32.0, 'F'),
    };
    format!("{}\u{b0}{}", round_half_away(value), suffix)
}

fn round_half_away(value: f32) -> i32 {
    if value >= 0.0 {
        (value + 0.5) as i32
    } else {
        (value - 0.5) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    /// Fixed-pitch metrics, `width` pixels per glyph.
    struct Mono(u32);

    impl FontMetrics for Mono {
        fn advance(&self, _: char) -> u32 {
            self.0
        }
        fn line_height(&self) -> u32 {
            10
        }
    }

    /// Narrow `i`, wide `m`, like a proportional face.
    struct Proportional;

    impl FontMetrics for Proportional {
        fn advance(&self, ch: char) -> u32 {
            match ch {
                'i' | 'l' | ' ' => 3,
                'm' | 'w' => 11,
                _ => 7,
            }
        }
        fn line_height(&self) -> u32 {
            12
        }
    }

    const VERSE: &str = "For God so loved the world, that he gave his only begotten Son, \
        that whosoever believeth in him should not perish, but have everlasting life.";

    #[test]
    fn empty_text_gives_no_lines() {
        for width in [0, 1, 50, 1000] {
            for lines in [0, 1, 6] {
                assert!(wrap("", width, lines, &Mono(10)).is_empty());
                assert!(wrap("    ", width, lines, &Proportional).is_empty());
            }
        }
    }

    #[test]
    fn breaks_at_last_space() {
        let lines = wrap("the quick brown fox", 100, 5, &Mono(10));
        assert_eq!(lines, ["the quick", "brown fox"]);
    }

    #[test]
    fn space_at_overflow_point_is_a_boundary() {
        let lines = wrap("abcde fghij", 50, 5, &Mono(10));
        assert_eq!(lines, ["abcde", "fghij"]);
    }

    #[test]
    fn long_word_is_hard_broken() {
        let lines = wrap("abcdefghijkl", 50, 5, &Mono(10));
        assert_eq!(lines, ["abcde", "fghij", "kl"]);
    }

    #[test]
    fn leading_spaces_are_skipped() {
        let lines = wrap("   one   two", 40, 5, &Mono(10));
        assert_eq!(lines, ["one", "two"]);
        assert!(lines.iter().all(|l| !l.is_empty() && !l.starts_with(' ')));
    }

    #[test]
    fn respects_width_and_line_budget() {
        for (width, max_lines) in [(120u32, 2usize), (200, 3), (330, 6), (592, 6), (45, 4)] {
            for font in [&Mono(10) as &dyn FontMetrics, &Proportional, &Mono(7)] {
                let lines = wrap(VERSE, width, max_lines, font);
                assert!(lines.len() <= max_lines);
                for line in &lines {
                    assert!(!line.is_empty());
                    assert!(font.measure(line) <= width, "{line:?} wider than {width}");
                }
            }
        }
    }

    #[test]
    fn ellipsis_added_only_when_it_fits() {
        let lines = wrap("aaa bbb ccc ddd", 100, 1, &Mono(10));
        assert_eq!(lines, ["aaa bbb..."]);

        let lines = wrap("aaaaaaaa bbb", 80, 1, &Mono(10));
        assert_eq!(lines, ["aaaaaaaa"]);
    }

    #[test]
    fn no_ellipsis_when_everything_fits() {
        let lines = wrap("aaa bbb", 80, 1, &Mono(10));
        assert_eq!(lines, ["aaa bbb"]);
        let lines = wrap("aaa bbb   ", 70, 1, &Mono(10));
        assert_eq!(lines, ["aaa bbb"]);
    }

    #[test]
    fn wrapping_is_deterministic() {
        let a = wrap(VERSE, 300, 6, &Proportional);
        let b = wrap(VERSE, 300, 6, &Proportional);
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn glyph_wider_than_budget_stops() {
        assert!(wrap("abc", 5, 3, &Mono(10)).is_empty());
    }

    #[test]
    fn clock_strings() {
        assert_eq!(
            format_time(3, 16, true),
            TimeText { digits: "03:16".to_string(), meridiem: None }
        );
        assert_eq!(format_time(0, 5, true).digits, "00:05");
        assert_eq!(
            format_time(0, 5, false),
            TimeText { digits: "12:05".to_string(), meridiem: Some("AM") }
        );
        assert_eq!(
            format_time(12, 0, false),
            TimeText { digits: "12:00".to_string(), meridiem: Some("PM") }
        );
        assert_eq!(
            format_time(16, 30, false),
            TimeText { digits: "4:30".to_string(), meridiem: Some("PM") }
        );
    }

    #[test]
    fn date_uses_zero_based_tables() {
        assert_eq!(format_date(0, 0, 1), "Sun Jan 1");
        assert_eq!(format_date(5, 9, 16), "Fri Oct 16");
        assert_eq!(format_date(9, 12, 3), "--- --- 3");
    }

    #[test]
    fn temperature_units() {
        assert_eq!(format_temperature(21.4, TempUnit::Celsius), "21\u{b0}C");
        assert_eq!(format_temperature(21.5, TempUnit::Celsius), "22\u{b0}C");
        assert_eq!(format_temperature(-3.6, TempUnit::Celsius), "-4\u{b0}C");
        assert_eq!(format_temperature(20.0, TempUnit::Fahrenheit), "68\u{b0}F");
    }
}
