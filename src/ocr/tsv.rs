//! Parser for Tesseract's TSV renderer output.
//!
//! Columns: level, page_num, block_num, par_num, line_num, word_num,
//! left, top, width, height, conf, text. Only level-5 rows (words) carry
//! text; the page text is rebuilt from them: words joined by a space,
//! one line per `line_num`, and an empty line between blocks.

/// Text and statistics rebuilt from a TSV page.
#[derive(Debug, Clone, PartialEq)]
pub struct TsvPage {
    pub text: String,
    pub word_count: usize,
    pub mean_confidence: Option<f32>,
}

const WORD_LEVEL: u32 = 5;
const COLUMNS: usize = 12;

/// Line identity: (page, block, paragraph, line).
type LineKey = (u32, u32, u32, u32);

pub fn parse_tsv(raw: &str) -> TsvPage {
    let mut text = String::new();
    let mut word_count = 0usize;
    let mut conf_sum = 0f64;
    let mut conf_count = 0usize;
    let mut current_line: Option<LineKey> = None;

    for row in raw.lines() {
        let fields: Vec<&str> = row.splitn(COLUMNS, '\t').collect();
        if fields.len() < COLUMNS {
            continue;
        }
        // Header row and anything else non-numeric.
        let Ok(level) = fields[0].parse::<u32>() else {
            continue;
        };
        if level != WORD_LEVEL {
            continue;
        }
        let word = fields[11].trim();
        if word.is_empty() {
            continue;
        }
        let key = match line_key(&fields) {
            Some(k) => k,
            None => {
                log::debug!("[OCR] Skipping malformed TSV row: {:?}", row);
                continue;
            }
        };

        match current_line {
            Some(prev) if prev == key => text.push(' '),
            Some(prev) => {
                text.push('\n');
                if (prev.0, prev.1) != (key.0, key.1) {
                    text.push('\n');
                }
            }
            None => {}
        }
        text.push_str(word);
        current_line = Some(key);
        word_count += 1;

        if let Ok(conf) = fields[10].trim().parse::<f64>() {
            if conf >= 0.0 {
                conf_sum += conf;
                conf_count += 1;
            }
        }
    }

    if current_line.is_some() {
        text.push('\n');
    }

    TsvPage {
        text,
        word_count,
        mean_confidence: (conf_count > 0).then(|| (conf_sum / conf_count as f64) as f32),
    }
}

fn line_key(fields: &[&str]) -> Option<LineKey> {
    Some((
        fields[1].parse().ok()?,
        fields[2].parse().ok()?,
        fields[3].parse().ok()?,
        fields[4].parse().ok()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn word(block: u32, par: u32, line: u32, n: u32, conf: &str, text: &str) -> String {
        format!("5\t1\t{block}\t{par}\t{line}\t{n}\t10\t10\t40\t12\t{conf}\t{text}")
    }

    #[test]
    fn rebuilds_lines_and_blocks() {
        let raw = [
            HEADER.to_string(),
            "1\t1\t0\t0\t0\t0\t0\t0\t800\t600\t-1\t".to_string(),
            "2\t1\t1\t0\t0\t0\t5\t5\t300\t60\t-1\t".to_string(),
            word(1, 1, 1, 1, "96.5", "Hello"),
            word(1, 1, 1, 2, "91.0", "world"),
            word(1, 1, 2, 1, "88.0", "second"),
            word(2, 1, 1, 1, "90.5", "Block"),
        ]
        .join("\n");

        let page = parse_tsv(&raw);
        assert_eq!(page.text, "Hello world\nsecond\n\nBlock\n");
        assert_eq!(page.word_count, 4);
        let conf = page.mean_confidence.unwrap();
        assert!((conf - 91.5).abs() < 0.01, "conf was {}", conf);
    }

    #[test]
    fn blank_page_yields_empty_text() {
        let raw = format!("{HEADER}\n1\t1\t0\t0\t0\t0\t0\t0\t800\t600\t-1\t\n");
        let page = parse_tsv(&raw);
        assert_eq!(page.text, "");
        assert_eq!(page.word_count, 0);
        assert!(page.mean_confidence.is_none());
    }

    #[test]
    fn negative_confidence_is_ignored_and_short_rows_skipped() {
        let raw = [
            HEADER.to_string(),
            "5\t1\t1".to_string(),
            word(1, 1, 1, 1, "-1", "©2020"),
            word(1, 1, 1, 2, "80", "Copyright"),
        ]
        .join("\n");
        let page = parse_tsv(&raw);
        assert_eq!(page.text, "©2020 Copyright\n");
        assert_eq!(page.mean_confidence, Some(80.0));
    }

    #[test]
    fn words_keep_inner_characters() {
        let raw = [HEADER.to_string(), word(1, 1, 1, 1, "70", "a|b")].join("\n");
        assert_eq!(parse_tsv(&raw).text, "a|b\n");
    }
}
