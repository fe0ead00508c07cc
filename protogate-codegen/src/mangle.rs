//! Route path segments from protobuf identifiers.
//!
//! `SayHello` and `sayHello` both become `say_hello`; acronym runs stay
//! together, so `HTTPServer` becomes `http_server`.
//!
//! An identifier is split into runs. A leading stretch of characters that
//! are neither uppercase ASCII letters nor digits forms its own run. After
//! that, a run of uppercase letters and digits is an acronym, except that
//! its last character starts the next word when lowercase text follows it.
//! A word is one uppercase letter or digit plus everything up to the next
//! uppercase letter. Runs are joined with `_` and lowercased.
//!
//! Lowercase characters stranded between runs (only possible when a
//! lowercase prefix runs straight into an acronym, as in `fooHTTP`) belong
//! to no run and are dropped.

/// Convert a PascalCase or camelCase identifier into a path segment.
pub fn mangle(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let span = |from: usize, to: usize| chars[from..to].iter().collect::<String>();
    let mut runs: Vec<String> = Vec::new();
    let mut pos = 0;

    let prefix = chars.iter().take_while(|c| !is_acronym_char(**c)).count();
    if prefix == chars.len() {
        if prefix > 0 {
            runs.push(span(0, prefix));
        }
        pos = chars.len();
    } else if prefix > 0 {
        let end = word_end(&chars, prefix);
        if end > prefix + 1 {
            runs.push(span(0, prefix));
            runs.push(span(prefix, end));
            pos = end;
        }
    }

    while pos < chars.len() {
        if !is_acronym_char(chars[pos]) {
            pos += 1;
            continue;
        }
        let acronym_end = pos
            + chars[pos..]
                .iter()
                .take_while(|c| is_acronym_char(**c))
                .count();
        if acronym_end == chars.len() {
            runs.push(span(pos, acronym_end));
            break;
        }
        let word_start = acronym_end - 1;
        if word_start > pos {
            runs.push(span(pos, word_start));
        }
        let end = word_end(&chars, word_start);
        runs.push(span(word_start, end));
        pos = end;
    }

    runs.join("_").to_lowercase()
}

fn is_acronym_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit()
}

/// End of the word starting at `start`: the next uppercase letter after it.
fn word_end(chars: &[char], start: usize) -> usize {
    start
        + 1
        + chars[start + 1..]
            .iter()
            .take_while(|c| !c.is_ascii_uppercase())
            .count()
}
