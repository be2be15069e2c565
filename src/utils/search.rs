use sea_orm::sea_query::LikeExpr;

/// `%q%` with `%`, `_` and `\` in `q` matched literally.
pub fn contains_pattern(q: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(q.len() + 2);
    pattern.push('%');
    for c in q.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    LikeExpr::new(pattern).escape('\\')
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::{Alias, Expr, ExprTrait, PostgresQueryBuilder, Query, Value};

    fn bound_pattern(q: &str) -> (String, Vec<Value>) {
        let (sql, values) = Query::select()
            .column(Alias::new("email"))
            .from(Alias::new("users"))
            .and_where(Expr::col(Alias::new("email")).like(contains_pattern(q)))
            .build(PostgresQueryBuilder);
        (sql, values.0)
    }

    #[test]
    fn test_plain_text_is_wrapped() {
        let (sql, values) = bound_pattern("aziz");
        assert!(sql.contains("ESCAPE"), "{sql}");
        assert!(values.contains(&Value::from("%aziz%")));
    }

    #[test]
    fn test_wildcards_are_literal() {
        let (_, values) = bound_pattern(r"50%_a\b");
        assert!(values.contains(&Value::from(r"%50\%\_a\\b%")));
    }

    #[test]
    fn test_lone_percent_matches_only_percent() {
        let (_, values) = bound_pattern("%");
        assert!(values.contains(&Value::from(r"%\%%")));
        assert!(!values.contains(&Value::from("%%%")));
    }
}
