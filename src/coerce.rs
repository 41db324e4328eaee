// src/coerce.rs
//
// Plain text → bounded HTML vocabulary (<h3>, <p>, <ul><li>).
//
// - Input that already carries a block opener (<p, <hN, <ul, <ol, <li, <br) is returned
//   untouched. Only these openers count: a <div>/<span>-only payload is treated as text.
// - Blank input → "".
// - Remaining input is trimmed, CRLF → LF, and classified line by line:
//     • blank      : close the list, flush the paragraph
//     • "- x"/"* x": flush the paragraph, open <ul> if needed, emit <li>x</li>
//     • title-ish  : close the list, flush the paragraph, emit <h3>line</h3>
//     • otherwise  : close the list, buffer the line into the open paragraph
// - Buffered paragraph lines are joined with a single space.
// - Emitted fragments are joined with '\n'.
//
// Text is not escaped: input is trusted model or admin output.

use memchr::memchr_iter;

/// Longest line (in chars) that can still be read as a heading.
const TITLE_MAX_CHARS: usize = 80;

/// Tags (after '<') whose presence marks the input as already-HTML, besides `h<digit>`.
const BLOCK_OPENERS: &[&[u8]] = &[b"p", b"ul", b"ol", b"li", b"br"];

/* ========================== Already-HTML detection ======================= */

#[inline]
fn is_ws(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == b'\n' || b == b'\r'
}

#[inline]
fn is_tag_boundary(b: Option<&u8>) -> bool {
    match b {
        None => true,
        Some(&c) => c == b'>' || c == b'/' || is_ws(c),
    }
}

/// `rest` starts right after a '<'.
fn opens_block_tag(rest: &[u8]) -> bool {
    if rest.len() >= 2 && rest[0].eq_ignore_ascii_case(&b'h') && rest[1].is_ascii_digit() {
        return true;
    }
    BLOCK_OPENERS.iter().any(|name| {
        rest.len() >= name.len()
            && rest[..name.len()].eq_ignore_ascii_case(name)
            && is_tag_boundary(rest.get(name.len()))
    })
}

/// True when `s` contains one of the block openers the coercer itself would emit.
pub fn looks_like_html(s: &str) -> bool {
    let bytes = s.as_bytes();
    memchr_iter(b'<', bytes).any(|lt| opens_block_tag(&bytes[lt + 1..]))
}

/* ============================ Line classification ======================== */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Bullet(&'a str),
    Title(&'a str),
    Body(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    let line = line.trim();
    if line.is_empty() {
        Line::Blank
    } else if let Some(item) = bullet_item(line) {
        Line::Bullet(item)
    } else if is_title_ish(line) {
        Line::Title(line)
    } else {
        Line::Body(line)
    }
}

/// `^[-*]\s+` → the item text after the marker.
fn bullet_item(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(['-', '*'])?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim())
}

/// Minimum number of capitalized words: max(2, ceil(words * 0.6)), in integers.
fn capitalized_floor(word_count: usize) -> usize {
    (word_count * 3).div_ceil(5).max(2)
}

/// Short, unpunctuated, mostly Capitalized Words.
pub fn is_title_ish(line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() || line.chars().count() > TITLE_MAX_CHARS {
        return false;
    }
    if line.ends_with(['.', '?', '!', ':']) {
        return false;
    }
    if !line.bytes().any(|b| b.is_ascii_alphabetic()) {
        return false;
    }
    let mut words = 0usize;
    let mut capitalized = 0usize;
    for word in line.split_whitespace() {
        words += 1;
        if word.starts_with(|c: char| c.is_ascii_uppercase()) {
            capitalized += 1;
        }
    }
    capitalized >= capitalized_floor(words)
}

/* ================================ Emission =============================== */

#[derive(Default)]
struct Blocks<'a> {
    out: Vec<String>,
    para: Vec<&'a str>,
    list_open: bool,
}

impl<'a> Blocks<'a> {
    fn flush_paragraph(&mut self) {
        if self.para.is_empty() {
            return;
        }
        self.out.push(format!("<p>{}</p>", self.para.join(" ")));
        self.para.clear();
    }

    fn close_list(&mut self) {
        if self.list_open {
            self.out.push("</ul>".to_string());
            self.list_open = false;
        }
    }

    fn push(&mut self, line: Line<'a>) {
        match line {
            Line::Blank => {
                self.close_list();
                self.flush_paragraph();
            }
            Line::Bullet(item) => {
                self.flush_paragraph();
                if !self.list_open {
                    self.out.push("<ul>".to_string());
                    self.list_open = true;
                }
                self.out.push(format!("<li>{item}</li>"));
            }
            Line::Title(title) => {
                self.close_list();
                self.flush_paragraph();
                self.out.push(format!("<h3>{title}</h3>"));
            }
            Line::Body(text) => {
                self.close_list();
                self.para.push(text);
            }
        }
    }

    fn finish(mut self, trimmed: &str) -> String {
        self.close_list();
        self.flush_paragraph();
        if self.out.is_empty() {
            return format!("<p>{trimmed}</p>");
        }
        self.out.join("\n")
    }
}

/* ================================ Entry point ============================ */

/// Coerce free-form text into `<h3>`/`<p>`/`<ul><li>` HTML.
///
/// Total: never fails. Blank input yields `""`; input that already contains a block
/// opener is returned exactly as given.
pub fn coerce(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if looks_like_html(trimmed) {
        log::debug!("coerce: input already carries block markup, passing through");
        return raw.to_string();
    }

    let text = trimmed.replace("\r\n", "\n");
    let mut blocks = Blocks::default();
    let mut lines = 0usize;
    for line in text.split('\n') {
        let line = classify(line);
        log::trace!("coerce: {line:?}");
        blocks.push(line);
        lines += 1;
    }
    let html = blocks.finish(trimmed);
    log::debug!("coerce: {lines} lines → {} bytes of html", html.len());
    html
}
