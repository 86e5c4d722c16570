//! Naming conventions used to fill in table and key names a model definition
//! leaves out: `SubItem` lives in `sub_items`, its foreign key elsewhere is
//! `sub_item_id`, and the pivot between `Item` and `Catalog` is `catalog_item`.

/// `SubItem` -> `sub_item`, `userGroups` -> `user_groups`.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower_or_digit = false;
    for ch in name.chars() {
        if ch.is_uppercase() {
            if prev_lower_or_digit {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
            prev_lower_or_digit = false;
        } else if ch == '-' || ch == ' ' {
            out.push('_');
            prev_lower_or_digit = false;
        } else {
            out.push(ch);
            prev_lower_or_digit = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }
    out
}

/// English plural of the last word; covers the regular cases only.
pub fn plural(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('y') {
        let before = stem.chars().last();
        if matches!(before, Some(c) if !"aeiou".contains(c)) {
            return format!("{stem}ies");
        }
    }
    if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        return format!("{word}es");
    }
    format!("{word}s")
}

/// Default table for a model: snake case, pluralised.
pub fn table_name(model: &str) -> String {
    plural(&snake_case(model))
}

/// Default foreign key other tables use to point at `model`.
pub fn foreign_key(model: &str, primary_key: &str) -> String {
    format!("{}_{}", snake_case(model), primary_key)
}

/// Default pivot table: both singular snake names, sorted, joined by `_`.
pub fn pivot_table(parent_model: &str, related_model: &str) -> String {
    let mut segments = [snake_case(parent_model), snake_case(related_model)];
    segments.sort();
    segments.join("_")
}
