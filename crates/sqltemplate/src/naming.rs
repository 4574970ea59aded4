//! Name conversions between entity members and SQL columns

/// Convert a member name to snake_case: `CreatedAt` -> `created_at`,
/// `UserID` -> `user_id`, `HTTPRequest` -> `http_request`.
///
/// Already snake-cased names are returned unchanged.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut result = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && prev != '_' {
                result.push('_');
            }
        }
        result.extend(c.to_lowercase());
    }

    result
}

/// Snake-case every segment of a dotted name: `Sales.OrderLines` ->
/// `sales.order_lines`
pub fn to_snake_case_qualified(name: &str) -> String {
    name.split('.').map(to_snake_case).collect::<Vec<_>>().join(".")
}
