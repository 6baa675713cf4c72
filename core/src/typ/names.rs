/// Strips module paths from a `std::any::type_name` string, keeping generic structure:
/// `alloc::sync::Arc<dyn my_crate::demo::Session>` becomes `Arc<dyn Session>`.
pub fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut token_start = None;
    for (idx, ch) in full.char_indices() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            token_start.get_or_insert(idx);
            continue;
        }
        if let Some(start) = token_start.take() {
            out.push_str(last_segment(&full[start..idx]));
        }
        out.push(ch);
    }
    if let Some(start) = token_start {
        out.push_str(last_segment(&full[start..]));
    }
    out
}

fn last_segment(path: &str) -> &str {
    match path.rfind("::") {
        Some(pos) => &path[pos + 2..],
        None => path,
    }
}
