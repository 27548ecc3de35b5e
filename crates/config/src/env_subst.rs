/// Replace `${ENV_VAR}` and `${ENV_VAR:-default}` placeholders in config
/// string values. Unresolvable variables without a default are left as-is.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

/// Placeholder substitution with a custom lookup, testable without
/// mutating the process environment.
fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let inner = &after[..end];
                let (name, default) = match inner.split_once(":-") {
                    Some((n, d)) => (n, Some(d)),
                    None => (inner, None),
                };
                match lookup(name).or_else(|| default.map(str::to_string)) {
                    Some(val) if !name.is_empty() => out.push_str(&val),
                    _ => {
                        // Unresolved or malformed: keep the literal placeholder.
                        out.push_str("${");
                        out.push_str(inner);
                        out.push('}');
                    },
                }
                rest = &after[end + 1..];
            },
            None => {
                // Unterminated placeholder, emit the remainder verbatim.
                out.push_str(&rest[start..]);
                rest = "";
            },
        }
    }
    out.push_str(rest);
    out
}
