/// Digit runs at least this long are treated as reference-number noise and
/// removed; shorter numeric tokens (branch codes, short counts) survive.
pub const LONG_DIGIT_RUN_LEN: usize = 4;

/// Reduces free text to its canonical matching form: lowercase, punctuation
/// replaced by spaces, long digit runs removed, whitespace collapsed.
/// Total over any input and idempotent. Non-Latin scripts pass through
/// untouched, so Hebrew merchant names keep their letters.
pub fn normalize_text(s: &str) -> String {
    let mut cleaned = String::with_capacity(s.len());
    for c in s.to_lowercase().chars() {
        if c.is_alphanumeric() {
            cleaned.push(c);
        } else {
            cleaned.push(' ');
        }
    }

    let mut stripped = String::with_capacity(cleaned.len());
    let mut run = String::new();
    for c in cleaned.chars() {
        if c.is_numeric() {
            run.push(c);
            continue;
        }
        flush_digit_run(&mut stripped, &mut run);
        stripped.push(c);
    }
    flush_digit_run(&mut stripped, &mut run);

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn flush_digit_run(out: &mut String, run: &mut String) {
    if run.is_empty() {
        return;
    }
    if run.chars().count() >= LONG_DIGIT_RUN_LEN {
        out.push(' ');
    } else {
        out.push_str(run);
    }
    run.clear();
}
