use unicode_segmentation::UnicodeSegmentation;

pub fn substr_up_to_len(s: &str, max_len: usize) -> String {
    if s.len() > max_len {
        s.graphemes(true).take(max_len).collect::<String>()
    } else {
        s.to_owned()
    }
}

/// First line of `s`, cut to at most `max_len` graphemes, for log previews.
pub fn preview(s: &str, max_len: usize) -> String {
    let mut lines = s.lines();
    let line = lines.next().unwrap_or("");
    let cut = substr_up_to_len(line, max_len);
    if cut.len() < line.len() || lines.next().is_some() {
        cut + "..."
    } else {
        cut
    }
}
