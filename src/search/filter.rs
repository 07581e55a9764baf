use std::collections::HashSet;

use serde::Serialize;

use crate::models::{Application, Bookmark, CategoryWithBookmarks};

use super::query::Query;

/// Result of one search pass over the two collections.
///
/// `None` means "no active search" (the query was absent or empty), which the
/// presentation layer renders as the pinned-items default. `Some(vec![])`
/// means an active search that matched nothing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    pub apps: Option<Vec<Application>>,
    pub categories: Option<Vec<CategoryWithBookmarks>>,
}

fn app_haystack(app: &Application) -> String {
    format!("{} {} {}", app.name, app.description, app.url)
}

fn bookmark_haystack(bookmark: &Bookmark) -> String {
    format!(
        "{} {} {}",
        bookmark.name, bookmark.description, bookmark.url
    )
}

/// Applications whose name/description/url haystack satisfies the query,
/// in their original order.
pub fn filter_apps(query: &Query, apps: &[Application]) -> Vec<Application> {
    apps.iter()
        .filter(|app| query.matches(&app_haystack(app)))
        .cloned()
        .collect()
}

/// Two passes over the categories, merged without duplicates:
///
/// 1. name pass: categories whose own name matches keep their full bookmark
///    list;
/// 2. content pass: every other category is copied with only its matching
///    bookmarks and kept when that list is non-empty.
///
/// Name-pass results come first; the dedup key is the category name, so a
/// category matching both ways appears once, in full form.
pub fn filter_categories(
    query: &Query,
    categories: &[CategoryWithBookmarks],
) -> Vec<CategoryWithBookmarks> {
    let mut merged: Vec<CategoryWithBookmarks> = categories
        .iter()
        .filter(|entry| query.matches(&entry.category.name))
        .cloned()
        .collect();

    let matched_names: HashSet<String> = merged
        .iter()
        .map(|entry| entry.category.name.clone())
        .collect();

    for entry in categories {
        if matched_names.contains(&entry.category.name) {
            continue;
        }

        let bookmarks: Vec<Bookmark> = entry
            .bookmarks
            .iter()
            .filter(|bookmark| query.matches(&bookmark_haystack(bookmark)))
            .cloned()
            .collect();

        if !bookmarks.is_empty() {
            merged.push(CategoryWithBookmarks {
                category: entry.category.clone(),
                bookmarks,
            });
        }
    }

    merged
}

/// Run one search over both collections. Pure: reads the inputs, returns
/// fresh owned output, never mutates anything.
pub fn search(
    query: Option<&str>,
    apps: &[Application],
    categories: &[CategoryWithBookmarks],
) -> SearchResults {
    let parsed = match query.and_then(Query::parse) {
        Some(parsed) => parsed,
        None => return SearchResults::default(),
    };

    SearchResults {
        apps: Some(filter_apps(&parsed, apps)),
        categories: Some(filter_categories(&parsed, categories)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn app(id: i64, name: &str, description: &str, url: &str) -> Application {
        Application {
            id,
            name: name.to_string(),
            description: description.to_string(),
            url: url.to_string(),
            icon: String::new(),
            is_pinned: false,
            order_index: id,
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
            updated_at: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    fn bookmark(id: i64, category_id: i64, name: &str, description: &str, url: &str) -> Bookmark {
        Bookmark {
            id,
            name: name.to_string(),
            url: url.to_string(),
            description: description.to_string(),
            icon: String::new(),
            is_public: true,
            category_id,
            order_index: id,
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
            updated_at: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    fn category(id: i64, name: &str, bookmarks: Vec<Bookmark>) -> CategoryWithBookmarks {
        CategoryWithBookmarks {
            category: Category {
                id,
                name: name.to_string(),
                is_pinned: false,
                order_index: id,
                created_at: "2024-01-01T00:00:00+00:00".to_string(),
                updated_at: "2024-01-01T00:00:00+00:00".to_string(),
            },
            bookmarks,
        }
    }

    #[test]
    fn test_absent_or_empty_query_yields_absent_results() {
        let apps = vec![app(1, "Portainer", "Docker UI", "portainer.local")];
        let cats = vec![category(1, "Dev", vec![])];

        for query in [None, Some(""), Some("   ")] {
            let results = search(query, &apps, &cats);
            assert!(results.apps.is_none());
            assert!(results.categories.is_none());
        }
    }

    #[test]
    fn test_no_match_yields_present_but_empty_results() {
        let apps = vec![app(1, "Portainer", "Docker UI", "portainer.local")];
        let cats = vec![category(1, "Dev", vec![bookmark(1, 1, "github", "", "github.com")])];

        let results = search(Some("zzzzz"), &apps, &cats);
        assert!(results.apps.as_ref().is_some_and(|a| a.is_empty()));
        assert!(results.categories.as_ref().is_some_and(|c| c.is_empty()));
    }

    #[test]
    fn test_app_haystack_spans_name_description_and_url() {
        let apps = vec![
            app(1, "Portainer", "Docker UI", "portainer.local"),
            app(2, "Jellyfin", "Media server", "media.local"),
        ];

        let by_description = search(Some("docker"), &apps, &[]);
        assert_eq!(by_description.apps.as_ref().unwrap().len(), 1);
        assert_eq!(by_description.apps.as_ref().unwrap()[0].name, "Portainer");

        let by_url = search(Some("media.local"), &apps, &[]);
        assert_eq!(by_url.apps.as_ref().unwrap()[0].name, "Jellyfin");
    }

    #[test]
    fn test_app_order_is_preserved() {
        let apps = vec![
            app(1, "Zulip", "chat", "zulip.local"),
            app(2, "Attic", "cache chat", "attic.local"),
            app(3, "Matrix", "chat too", "matrix.local"),
        ];

        let results = search(Some("chat"), &apps, &[]);
        let names: Vec<&str> = results
            .apps
            .as_ref()
            .unwrap()
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, ["Zulip", "Attic", "Matrix"]);
    }

    #[test]
    fn test_name_matched_category_keeps_full_bookmark_list() {
        let cats = vec![category(
            1,
            "Dev",
            vec![
                bookmark(1, 1, "github", "", "github.com"),
                bookmark(2, 1, "unrelated", "", "example.com"),
            ],
        )];

        let results = search(Some("dev"), &[], &cats);
        let matched = results.categories.unwrap();
        assert_eq!(matched.len(), 1);
        // Full list, not reduced to bookmarks containing "dev"
        assert_eq!(matched[0].bookmarks.len(), 2);
    }

    #[test]
    fn test_content_only_match_filters_bookmarks() {
        let cats = vec![category(
            1,
            "Misc",
            vec![
                bookmark(1, 1, "github tools", "", "github.com"),
                bookmark(2, 1, "unrelated", "", "example.com"),
            ],
        )];

        let results = search(Some("github"), &[], &cats);
        let matched = results.categories.unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].bookmarks.len(), 1);
        assert_eq!(matched[0].bookmarks[0].name, "github tools");
    }

    #[test]
    fn test_category_matching_both_ways_appears_once_in_full_form() {
        let cats = vec![category(
            1,
            "Dev",
            vec![
                bookmark(1, 1, "devdocs", "", "devdocs.io"),
                bookmark(2, 1, "weather", "", "wttr.in"),
            ],
        )];

        let results = search(Some("dev"), &[], &cats);
        let matched = results.categories.unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].bookmarks.len(), 2);
    }

    #[test]
    fn test_name_pass_precedes_content_pass() {
        let cats = vec![
            category(1, "Misc", vec![bookmark(1, 1, "dev tools", "", "x.io")]),
            category(2, "Dev", vec![bookmark(2, 2, "weather", "", "wttr.in")]),
        ];

        let results = search(Some("dev"), &[], &cats);
        let names: Vec<&str> = results
            .categories
            .as_ref()
            .unwrap()
            .iter()
            .map(|c| c.category.name.as_str())
            .collect();
        // Name-matched "Dev" first, then the content-matched "Misc"
        assert_eq!(names, ["Dev", "Misc"]);
    }

    #[test]
    fn test_content_matched_category_with_no_hits_is_dropped() {
        let cats = vec![
            category(1, "Media", vec![bookmark(1, 1, "jellyfin", "", "jf.local")]),
            category(2, "Docs", vec![bookmark(2, 2, "wiki", "", "wiki.local")]),
        ];

        let results = search(Some("jellyfin"), &[], &cats);
        let matched = results.categories.unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].category.name, "Media");
    }

    #[test]
    fn test_bookmark_haystack_spans_name_description_and_url() {
        let cats = vec![category(
            1,
            "Misc",
            vec![
                bookmark(1, 1, "frontend", "react docs", "react.dev"),
                bookmark(2, 1, "backend", "", "api.example.com"),
            ],
        )];

        let by_description = search(Some("react"), &[], &cats);
        assert_eq!(by_description.categories.unwrap()[0].bookmarks.len(), 1);

        let by_url = search(Some("api.example"), &[], &cats);
        let matched = by_url.categories.unwrap();
        assert_eq!(matched[0].bookmarks.len(), 1);
        assert_eq!(matched[0].bookmarks[0].name, "backend");
    }

    #[test]
    fn test_multi_term_query_spans_whole_haystack() {
        let apps = vec![app(1, "Portainer", "Docker UI", "portainer.local")];

        let results = search(Some("docker%20portainer"), &apps, &[]);
        assert_eq!(results.apps.unwrap().len(), 1);

        let none = search(Some("docker%20missing"), &apps, &[]);
        assert!(none.apps.unwrap().is_empty());
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let apps = vec![app(1, "Portainer", "Docker UI", "portainer.local")];
        let cats = vec![category(
            1,
            "Dev",
            vec![bookmark(1, 1, "github", "", "github.com")],
        )];

        let apps_before = apps.clone();
        let cats_before = cats.clone();
        let _ = search(Some("git"), &apps, &cats);

        assert_eq!(apps.len(), apps_before.len());
        assert_eq!(cats[0].bookmarks.len(), cats_before[0].bookmarks.len());
        assert_eq!(cats[0].category.name, cats_before[0].category.name);
    }
}
