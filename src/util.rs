/// The innermost named type without its package path. Dots inside type arguments
/// (`pkg.Pair[other.A]`) are not separators.
pub fn last_segment(name: &str) -> &str {
    let mut rest = name.trim_start_matches('*');
    while let Some(inner) = element_type_name(rest).or_else(|| map_value_type_name(rest)) {
        rest = inner.trim_start_matches('*');
    }

    let head = rest.find('[').map_or(rest, |open| &rest[..open]);
    match head.rfind('.') {
        Some(dot) => &rest[dot + 1..],
        None => rest,
    }
}

/// Keeps the head and tail of an over-long text, joined by `..`.
pub fn truncate_middle(text: &str, max_len: usize) -> String {
    let len = text.chars().count();
    if max_len == 0 || len <= max_len {
        return text.to_string();
    }

    let half = (max_len / 2).saturating_sub(1);
    let head = text.chars().take(half).collect::<String>();
    let tail = text.chars().skip(len - half).collect::<String>();
    format!("{head}..{tail}")
}

pub fn display_type_name(name: &str) -> &str {
    match name {
        "interface {}" | "interface{}" => "any",
        _ => name,
    }
}

/// Element type of `[]T` or `[N]T`.
pub fn element_type_name(sequence_type: &str) -> Option<&str> {
    let rest = sequence_type.strip_prefix('[')?;
    let (_, element) = rest.split_once(']')?;
    (!element.is_empty()).then_some(element)
}

/// Value type of `map[K]V`, honouring brackets nested inside `K`.
pub fn map_value_type_name(map_type: &str) -> Option<&str> {
    let rest = map_type.strip_prefix("map[")?;
    let mut depth = 1usize;
    for (index, ch) in rest.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    let value = &rest[index + 1..];
                    return (!value.is_empty()).then_some(value);
                }
            }
            _ => {}
        }
    }
    None
}

/// Record types without a plain dotted name (`struct { A int }`, or no name at all).
pub fn is_anonymous_type(name: &str) -> bool {
    let name = name.trim_start_matches('*');
    name.is_empty() || name.starts_with("struct {") || name.starts_with("struct{")
}
