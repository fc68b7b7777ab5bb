//! Comparison helpers for raw SQL fragments and names.

/// Folds a raw SQL type token to a canonical spelling for comparison.
///
/// Case and runs of whitespace are ignored, and common PostgreSQL aliases
/// map to one name. Length and precision arguments are kept, so
/// `varchar(255)` and `CHARACTER VARYING (255)` compare equal while
/// `VARCHAR(100)` does not.
#[must_use]
pub fn normalize_type(raw: &str) -> String {
    let upper = raw.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
    let (base, args) = match upper.find('(') {
        Some(pos) => (upper[..pos].trim_end(), upper[pos..].replace(' ', "")),
        None => (upper.as_str(), String::new()),
    };
    let canonical = match base {
        "INT" | "INT4" => "INTEGER",
        "INT8" => "BIGINT",
        "INT2" => "SMALLINT",
        "BOOL" => "BOOLEAN",
        "FLOAT8" => "DOUBLE PRECISION",
        "FLOAT4" => "REAL",
        "CHARACTER VARYING" => "VARCHAR",
        "CHARACTER" => "CHAR",
        "DECIMAL" => "NUMERIC",
        "TIMESTAMPTZ" => "TIMESTAMP WITH TIME ZONE",
        "TIMESTAMP WITHOUT TIME ZONE" => "TIMESTAMP",
        "TIMETZ" => "TIME WITH TIME ZONE",
        other => other,
    };
    format!("{canonical}{args}")
}

/// Returns `true` if two type tokens denote the same type.
#[must_use]
pub fn types_equivalent(a: &str, b: &str) -> bool {
    normalize_type(a) == normalize_type(b)
}

/// Returns `true` if two default expressions are the same.
#[must_use]
pub fn defaults_equivalent(a: Option<&str>, b: Option<&str>) -> bool {
    a.map(str::trim) == b.map(str::trim)
}

/// Computes the Levenshtein edit distance between two strings.
pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let n = b.len();
    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];
    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[n]
}

/// Normalized name similarity in `[0.0, 1.0]`, 1.0 meaning identical.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - (levenshtein(a, b) as f64 / max_len as f64)
}
