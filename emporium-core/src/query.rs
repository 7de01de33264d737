//! User listing query construction
//!
//! `GET /users` accepts a single `search=<field>:<value>` directive and a single
//! `sort=<field>:<direction>` directive. This module turns those raw strings
//! into a [`SearchSpec`] and a [`SortSpec`] that repositories understand.
//!
//! Neither builder ever fails: an unknown search field means "no filter" and
//! an unknown sort directive means "ascending by email".

use std::cmp::Ordering;
use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::User;

/// The user columns that can be searched and sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    Name,
    Email,
}

impl UserField {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserField::Name => "name",
            UserField::Email => "email",
        }
    }

    fn value_of<'a>(&self, user: &'a User) -> &'a str {
        match self {
            UserField::Name => &user.name,
            UserField::Email => &user.email,
        }
    }
}

impl fmt::Display for UserField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter applied to the user listing.
#[derive(Debug, Clone, Default)]
pub enum SearchSpec {
    /// No filtering.
    #[default]
    All,
    /// Case-insensitive pattern match anywhere inside `field`.
    Matches { field: UserField, pattern: Regex },
}

impl SearchSpec {
    /// Whether `user` passes this filter.
    pub fn matches(&self, user: &User) -> bool {
        match self {
            SearchSpec::All => true,
            SearchSpec::Matches { field, pattern } => pattern.is_match(field.value_of(user)),
        }
    }

    pub fn field(&self) -> Option<UserField> {
        match self {
            SearchSpec::All => None,
            SearchSpec::Matches { field, .. } => Some(*field),
        }
    }
}

impl PartialEq for SearchSpec {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SearchSpec::All, SearchSpec::All) => true,
            (
                SearchSpec::Matches { field: a, pattern: p },
                SearchSpec::Matches { field: b, pattern: q },
            ) => a == b && p.as_str() == q.as_str(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Ordering applied to the user listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub field: UserField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: UserField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Compare two users the way a store applying this spec would.
    pub fn compare(&self, a: &User, b: &User) -> Ordering {
        let ordering = self.field.value_of(a).cmp(self.field.value_of(b));
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::new(UserField::Email, SortDirection::Ascending)
    }
}

/// Parse a `field:value` search directive.
///
/// Only `name` and `email` are searchable; any other field, a missing colon,
/// or no directive at all yields [`SearchSpec::All`].
pub fn build_search_spec(raw: Option<&str>) -> SearchSpec {
    let Some((field, value)) = raw.and_then(split_directive) else {
        return SearchSpec::All;
    };

    let field = match field {
        "name" => UserField::Name,
        "email" => UserField::Email,
        _ => return SearchSpec::All,
    };

    match compile_pattern(value) {
        Some(pattern) => SearchSpec::Matches { field, pattern },
        None => {
            tracing::warn!(%field, "Search pattern could not be compiled, ignoring filter");
            SearchSpec::All
        }
    }
}

/// Parse a `field:direction` sort directive, defaulting to ascending by email.
pub fn build_sort_spec(raw: Option<&str>) -> SortSpec {
    let parts = raw.and_then(split_directive);

    match parts {
        Some(("name", "asc")) => SortSpec::new(UserField::Name, SortDirection::Ascending),
        Some(("name", "desc")) => SortSpec::new(UserField::Name, SortDirection::Descending),
        Some(("email", "asc")) => SortSpec::new(UserField::Email, SortDirection::Ascending),
        Some(("email", "desc")) => SortSpec::new(UserField::Email, SortDirection::Descending),
        _ => SortSpec::default(),
    }
}

/// Split a directive into its first two `:`-separated segments. Anything
/// after a second `:` is dropped, so `name:desc:x` reads as `name:desc`.
fn split_directive(raw: &str) -> Option<(&str, &str)> {
    let mut parts = raw.splitn(3, ':');
    let field = parts.next()?;
    let value = parts.next()?;
    Some((field, value))
}

/// The value is used as a case-insensitive pattern; if it is not a valid
/// expression it is matched literally instead.
fn compile_pattern(value: &str) -> Option<Regex> {
    RegexBuilder::new(value)
        .case_insensitive(true)
        .build()
        .or_else(|_| {
            RegexBuilder::new(&regex::escape(value))
                .case_insensitive(true)
                .build()
        })
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, email: &str) -> User {
        User::builder()
            .name(name.to_string())
            .email(email.to_string())
            .build()
            .unwrap()
    }

    #[test]
    fn test_search_by_name_is_case_insensitive_substring() {
        let spec = build_search_spec(Some("name:ani"));
        assert_eq!(spec.field(), Some(UserField::Name));

        assert!(spec.matches(&user("Daniel", "d@x.com")));
        assert!(spec.matches(&user("ANITA", "a@x.com")));
        assert!(!spec.matches(&user("Budi", "ani@x.com")));
    }

    #[test]
    fn test_search_by_email() {
        let spec = build_search_spec(Some("email:EXAMPLE.com"));
        assert!(spec.matches(&user("Budi", "budi@example.com")));
        assert!(!spec.matches(&user("example.com", "budi@mail.id")));
    }

    #[test]
    fn test_search_value_is_a_pattern() {
        let spec = build_search_spec(Some("name:^bu"));
        assert!(spec.matches(&user("Budi", "b@x.com")));
        assert!(!spec.matches(&user("Abu", "a@x.com")));
    }

    #[test]
    fn test_invalid_pattern_is_matched_literally() {
        let spec = build_search_spec(Some("name:a(b"));
        assert!(matches!(spec, SearchSpec::Matches { .. }));
        assert!(spec.matches(&user("xa(bx", "x@x.com")));
        assert!(!spec.matches(&user("ab", "x@x.com")));
    }

    #[test]
    fn test_search_ignores_segments_after_second_colon() {
        let spec = build_search_spec(Some("name:bu:x"));
        assert_eq!(spec.field(), Some(UserField::Name));
        assert!(spec.matches(&user("Budi", "b@x.com")));
        assert!(!spec.matches(&user("Ani", "bu:x@x.com")));
    }

    #[test]
    fn test_unknown_or_missing_search_is_no_filter() {
        assert_eq!(build_search_spec(None), SearchSpec::All);
        assert_eq!(build_search_spec(Some("password:secret")), SearchSpec::All);
        assert_eq!(build_search_spec(Some("name")), SearchSpec::All);
        assert!(SearchSpec::All.matches(&user("anyone", "a@x.com")));
    }

    #[test]
    fn test_sort_recognized_directives() {
        assert_eq!(
            build_sort_spec(Some("name:desc")),
            SortSpec::new(UserField::Name, SortDirection::Descending)
        );
        assert_eq!(
            build_sort_spec(Some("name:asc")),
            SortSpec::new(UserField::Name, SortDirection::Ascending)
        );
        assert_eq!(
            build_sort_spec(Some("email:desc")),
            SortSpec::new(UserField::Email, SortDirection::Descending)
        );
        assert_eq!(
            build_sort_spec(Some("email:asc")),
            SortSpec::new(UserField::Email, SortDirection::Ascending)
        );
    }

    #[test]
    fn test_sort_falls_back_to_email_ascending() {
        let default = build_sort_spec(None);
        assert_eq!(default, SortSpec::new(UserField::Email, SortDirection::Ascending));
        assert_eq!(build_sort_spec(Some("bogus:xyz")), default);
        assert_eq!(build_sort_spec(Some("name:DESC")), default);
        assert_eq!(build_sort_spec(Some("name")), default);
    }

    #[test]
    fn test_sort_ignores_segments_after_second_colon() {
        assert_eq!(
            build_sort_spec(Some("name:desc:x")),
            SortSpec::new(UserField::Name, SortDirection::Descending)
        );
        assert_eq!(
            build_sort_spec(Some("email:asc:")),
            SortSpec::new(UserField::Email, SortDirection::Ascending)
        );
    }

    #[test]
    fn test_sort_compare() {
        let a = user("Ani", "z@x.com");
        let b = user("Budi", "a@x.com");

        let by_name_desc = build_sort_spec(Some("name:desc"));
        assert_eq!(by_name_desc.compare(&a, &b), Ordering::Greater);

        let by_email = build_sort_spec(None);
        assert_eq!(by_email.compare(&a, &b), Ordering::Greater);
        assert_eq!(by_email.compare(&b, &a), Ordering::Less);
    }
}
