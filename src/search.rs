//! Client-side filtering for searchable dropdowns.
//!
//! A dropdown control hands its filter callback a bag of arguments
//! ([`FilterArgs`]) plus a few capabilities of its own ([`SelectHost`]).
//! [`IndexedFilter`] answers that callback from a pre-built [`SearchIndex`]
//! over the *full* item list, because the control is often only given a capped
//! subset of the items and could not find the rest on its own.
//! [`label_filter`] is the index-free variant that scans the supplied items.

use serde_json::{json, Map, Value};

/// Result cap used when querying the index
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// A text index over a fixed list of items
pub trait SearchIndex {
    /// Positions of matching items, most relevant first
    fn search(&self, query: &str, max_results: usize) -> Vec<usize>;
}

/// Capabilities supplied by the host dropdown control
pub trait SelectHost {
    /// Whether `option`, displayed as `label`, matches `filter_text`
    fn item_filter(&self, label: &str, filter_text: &str, option: &Value) -> bool;

    /// Turn primitive items into records
    fn convert_string_items_to_objects(&self, items: &[Value]) -> Vec<Value>;

    /// Arrange items into groups keyed by `group_by`
    fn filter_grouped_items(
        &self,
        items: Vec<Value>,
        group_by: &dyn Fn(&Value) -> String,
    ) -> Vec<Value>;
}

/// Arguments the control passes on every filter call
pub struct FilterArgs<'a> {
    /// The control loads its own options remotely
    pub load_options: bool,
    pub filter_text: &'a str,
    /// Current candidate list, possibly a truncated subset
    pub items: Option<&'a [Value]>,
    pub multiple: bool,
    /// Selected items in multi-select mode
    pub value: Option<&'a [Value]>,
    /// Record key holding an item's identity
    pub item_id: &'a str,
    pub group_by: Option<&'a dyn Fn(&Value) -> String>,
    pub filter_selected_items: bool,
    /// Record key holding an item's display label
    pub label: &'a str,
}

impl Default for FilterArgs<'_> {
    fn default() -> Self {
        Self {
            load_options: false,
            filter_text: "",
            items: None,
            multiple: false,
            value: None,
            item_id: "value",
            group_by: None,
            filter_selected_items: true,
            label: "label",
        }
    }
}

/// Filter callback backed by a search index and the original item list
pub struct IndexedFilter<'a, I: SearchIndex + ?Sized> {
    index: &'a I,
    original_items: &'a [Value],
    max_results: usize,
}

impl<'a, I: SearchIndex + ?Sized> IndexedFilter<'a, I> {
    /// `original_items` must be position-aligned with the index entries
    pub fn new(index: &'a I, original_items: &'a [Value]) -> Self {
        Self {
            index,
            original_items,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn filter(&self, args: &FilterArgs<'_>, host: &dyn SelectHost) -> Vec<Value> {
        let items = match args.items {
            Some(items) if args.load_options => return items.to_vec(),
            Some(items) => items,
            None => return Vec::new(),
        };

        let convert = is_primitive_list(items);
        let items = if convert {
            host.convert_string_items_to_objects(items)
        } else {
            items.to_vec()
        };

        let results = if args.filter_text.is_empty() {
            items
        } else {
            self.hits(args.filter_text, convert, host)
        };

        match args.group_by {
            Some(group_by) => host.filter_grouped_items(results, group_by),
            None => results,
        }
    }

    /// Original items behind the index hits, in relevance order. When the
    /// caller's items were converted, hits are converted over the original
    /// list so each record keeps its original position.
    fn hits(&self, filter_text: &str, convert: bool, host: &dyn SelectHost) -> Vec<Value> {
        let positions: Vec<usize> = self
            .index
            .search(filter_text, self.max_results)
            .into_iter()
            .filter(|&pos| {
                debug_assert!(
                    pos < self.original_items.len(),
                    "index returned position {} for {} items",
                    pos,
                    self.original_items.len()
                );
                pos < self.original_items.len()
            })
            .collect();

        if !convert {
            return positions
                .iter()
                .filter_map(|&pos| self.original_items.get(pos).cloned())
                .collect();
        }
        let Some(&last) = positions.iter().max() else {
            return Vec::new();
        };
        let converted = host.convert_string_items_to_objects(&self.original_items[..=last]);
        positions
            .iter()
            .filter_map(|&pos| converted.get(pos).cloned())
            .collect()
    }
}

/// Build a filter callback over `index` and `original_items`
pub fn create_filter<'a, I: SearchIndex + ?Sized>(
    index: &'a I,
    original_items: &'a [Value],
) -> impl Fn(&FilterArgs<'_>, &dyn SelectHost) -> Vec<Value> + 'a {
    let filter = IndexedFilter::new(index, original_items);
    move |args: &FilterArgs<'_>, host: &dyn SelectHost| filter.filter(args, host)
}

/// Index-free filter: test each supplied item's label directly.
///
/// In multi-select mode with `filter_selected_items`, items whose id is
/// already among the selected values are dropped.
pub fn label_filter(args: &FilterArgs<'_>, host: &dyn SelectHost) -> Vec<Value> {
    let items = match args.items {
        Some(items) if args.load_options => return items.to_vec(),
        Some(items) => items,
        None => return Vec::new(),
    };
    let items = as_objects(items.to_vec(), host);

    let selected: Vec<&Value> = match args.value {
        Some(value) if args.multiple && args.filter_selected_items => value
            .iter()
            .filter_map(|v| v.get(args.item_id))
            .collect(),
        _ => Vec::new(),
    };

    let results: Vec<Value> = items
        .into_iter()
        .filter(|item| {
            let already_selected = item
                .get(args.item_id)
                .is_some_and(|id| selected.contains(&id));
            if already_selected {
                return false;
            }
            if args.filter_text.is_empty() {
                return true;
            }
            let label = item.get(args.label).map(label_text).unwrap_or_default();
            host.item_filter(&label, args.filter_text, item)
        })
        .collect();

    match args.group_by {
        Some(group_by) => host.filter_grouped_items(results, group_by),
        None => results,
    }
}

// Only the first element is inspected; lists are assumed homogeneous
fn is_primitive_list(items: &[Value]) -> bool {
    items.first().is_some_and(|first| !first.is_object())
}

fn as_objects(items: Vec<Value>, host: &dyn SelectHost) -> Vec<Value> {
    if is_primitive_list(&items) {
        host.convert_string_items_to_objects(&items)
    } else {
        items
    }
}

fn label_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The stock behavior of a typical dropdown control
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHost;

impl SelectHost for DefaultHost {
    fn item_filter(&self, label: &str, filter_text: &str, _option: &Value) -> bool {
        label.to_lowercase().contains(&filter_text.to_lowercase())
    }

    fn convert_string_items_to_objects(&self, items: &[Value]) -> Vec<Value> {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                json!({
                    "index": index,
                    "value": item,
                    "label": label_text(item),
                })
            })
            .collect()
    }

    /// Emits a header record per group, in first-seen order, followed by the
    /// group's items
    fn filter_grouped_items(
        &self,
        items: Vec<Value>,
        group_by: &dyn Fn(&Value) -> String,
    ) -> Vec<Value> {
        let mut groups: Vec<(String, Vec<Value>)> = Vec::new();
        for item in items {
            let key = group_by(&item);
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(item),
                None => groups.push((key, vec![item])),
            }
        }

        let mut out = Vec::new();
        for (key, members) in groups {
            let mut header = Map::new();
            header.insert("id".to_string(), Value::String(key.clone()));
            header.insert("label".to_string(), Value::String(key));
            header.insert("groupHeader".to_string(), Value::Bool(true));
            header.insert("selectable".to_string(), Value::Bool(false));
            out.push(Value::Object(header));
            out.extend(members);
        }
        out
    }
}

/// A small prefix index over item labels.
///
/// Text is lowercased and split on non-alphanumerics. An item matches when
/// every query token is a prefix of one of its tokens. Matches rank by the
/// number of whole-token hits, then by how early the first query token
/// appears, then by position.
#[derive(Debug, Clone, Default)]
pub struct TextIndex {
    entries: Vec<Vec<String>>,
}

impl TextIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::new();
        for label in labels {
            index.add(label.as_ref());
        }
        index
    }

    /// Append an entry and return its position
    pub fn add(&mut self, text: &str) -> usize {
        self.entries.push(tokenize(text));
        self.entries.len() - 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SearchIndex for TextIndex {
    fn search(&self, query: &str, max_results: usize) -> Vec<usize> {
        let terms = tokenize(query);
        if terms.is_empty() || max_results == 0 {
            return Vec::new();
        }

        // (position, whole-token hits, token index of the first term's hit)
        let mut hits: Vec<(usize, usize, usize)> = Vec::new();
        'entries: for (pos, tokens) in self.entries.iter().enumerate() {
            let mut exact = 0;
            let mut first_hit = usize::MAX;
            for (n, term) in terms.iter().enumerate() {
                let whole = tokens.iter().enumerate().find(|(_, tok)| *tok == term);
                let Some((at, tok)) = whole.or_else(|| {
                    tokens
                        .iter()
                        .enumerate()
                        .find(|(_, tok)| tok.starts_with(term.as_str()))
                }) else {
                    continue 'entries;
                };
                if tok == term {
                    exact += 1;
                }
                if n == 0 {
                    first_hit = at;
                }
            }
            hits.push((pos, exact, first_hit));
        }

        hits.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)).then(a.0.cmp(&b.0)));
        hits.into_iter().take(max_results).map(|(pos, _, _)| pos).collect()
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orgs() -> Vec<Value> {
        vec![
            json!({"value": 1, "label": "Acme Corp"}),
            json!({"value": 2, "label": "Acme Industries"}),
            json!({"value": 3, "label": "Globex"}),
        ]
    }

    fn org_index() -> TextIndex {
        TextIndex::from_labels(["Acme Corp", "Acme Industries", "Globex"])
    }

    #[test]
    fn test_text_index_prefix_and_ranking() {
        let index = TextIndex::from_labels(["Big Acme", "Acme Corp", "Acmeton", "Globex"]);
        assert_eq!(index.search("acme", 10), vec![1, 0, 2]);
        assert_eq!(index.search("ACM", 10), vec![1, 2, 0]);
        assert_eq!(index.search("acme corp", 10), vec![1]);
        assert_eq!(index.search("acme", 1), vec![1]);
        assert!(index.search("   ", 10).is_empty());
        assert!(index.search("initech", 10).is_empty());
    }

    #[test]
    fn test_indexed_filter_maps_into_original_list() {
        let original = orgs();
        let index = org_index();
        let filter = IndexedFilter::new(&index, &original);
        let truncated = vec![json!({"value": 3, "label": "Globex"})];

        let args = FilterArgs {
            filter_text: "Acme",
            items: Some(&truncated),
            ..Default::default()
        };
        let result = filter.filter(&args, &DefaultHost);
        assert_eq!(result, vec![original[0].clone(), original[1].clone()]);
    }

    #[test]
    fn test_load_options_returns_items_unchanged() {
        let original = orgs();
        let index = org_index();
        let filter = create_filter(&index, &original);
        let items = vec![json!("x")];

        let args = FilterArgs {
            load_options: true,
            filter_text: "Acme",
            items: Some(&items),
            ..Default::default()
        };
        assert_eq!(filter(&args, &DefaultHost), vec![json!("x")]);
    }

    #[test]
    fn test_missing_items_yield_empty() {
        let original = orgs();
        let index = org_index();
        let filter = create_filter(&index, &original);

        let args = FilterArgs {
            load_options: true,
            filter_text: "Acme",
            ..Default::default()
        };
        assert!(filter(&args, &DefaultHost).is_empty());
        assert!(label_filter(&args, &DefaultHost).is_empty());
    }

    #[test]
    fn test_empty_filter_text_keeps_caller_order() {
        let original = orgs();
        let index = org_index();
        let filter = IndexedFilter::new(&index, &original);
        let items = vec![original[2].clone(), original[0].clone()];

        let args = FilterArgs {
            items: Some(&items),
            ..Default::default()
        };
        assert_eq!(filter.filter(&args, &DefaultHost), items);
    }

    #[test]
    fn test_primitive_items_are_converted() {
        let original = vec![json!("Acme Corp"), json!("Acme Industries"), json!("Globex")];
        let index = TextIndex::from_labels(["Acme Corp", "Acme Industries", "Globex"]);
        let filter = IndexedFilter::new(&index, &original);

        let args = FilterArgs {
            items: Some(&original),
            ..Default::default()
        };
        let all = filter.filter(&args, &DefaultHost);
        assert_eq!(all[2], json!({"index": 2, "value": "Globex", "label": "Globex"}));

        let args = FilterArgs {
            filter_text: "glob",
            items: Some(&original),
            ..Default::default()
        };
        let hits = filter.filter(&args, &DefaultHost);
        assert_eq!(hits, vec![all[2].clone()]);

        let args = FilterArgs {
            filter_text: "industries",
            items: Some(&original[..1]),
            ..Default::default()
        };
        assert_eq!(filter.filter(&args, &DefaultHost), vec![all[1].clone()]);
    }

    #[test]
    fn test_empty_items_are_not_converted() {
        let original = vec![json!("Acme Corp"), json!("Globex")];
        let index = TextIndex::from_labels(["Acme Corp", "Globex"]);
        let filter = IndexedFilter::new(&index, &original);
        let shown: Vec<Value> = Vec::new();

        let args = FilterArgs {
            filter_text: "glob",
            items: Some(&shown[..]),
            ..Default::default()
        };
        assert_eq!(filter.filter(&args, &DefaultHost), vec![json!("Globex")]);
    }

    #[test]
    fn test_group_by_runs_after_filtering() {
        let original = vec![
            json!({"value": 1, "label": "Acme Corp", "industry": "RETAIL"}),
            json!({"value": 2, "label": "Acme Labs", "industry": "SALES"}),
            json!({"value": 3, "label": "Acme Shops", "industry": "RETAIL"}),
        ];
        let index = TextIndex::from_labels(["Acme Corp", "Acme Labs", "Acme Shops"]);
        let filter = IndexedFilter::new(&index, &original);
        let by_industry = |v: &Value| v["industry"].as_str().unwrap_or_default().to_string();

        let args = FilterArgs {
            filter_text: "acme",
            items: Some(&original),
            group_by: Some(&by_industry),
            ..Default::default()
        };
        let grouped = filter.filter(&args, &DefaultHost);
        let labels: Vec<&str> = grouped.iter().map(|v| v["label"].as_str().unwrap()).collect();
        assert_eq!(
            labels,
            vec!["RETAIL", "Acme Corp", "Acme Shops", "SALES", "Acme Labs"]
        );
        assert_eq!(grouped[0]["groupHeader"], json!(true));
    }

    #[test]
    fn test_filter_is_idempotent() {
        let original = orgs();
        let index = org_index();
        let filter = create_filter(&index, &original);
        let args = FilterArgs {
            filter_text: "acme",
            items: Some(&original),
            ..Default::default()
        };
        assert_eq!(filter(&args, &DefaultHost), filter(&args, &DefaultHost));
    }

    #[test]
    fn test_max_results_caps_hits() {
        let original = orgs();
        let index = org_index();
        let filter = IndexedFilter::new(&index, &original).with_max_results(1);
        let args = FilterArgs {
            filter_text: "acme",
            items: Some(&original),
            ..Default::default()
        };
        assert_eq!(filter.filter(&args, &DefaultHost), vec![original[0].clone()]);
    }

    #[test]
    fn test_label_filter_matches_labels() {
        let items = orgs();
        let args = FilterArgs {
            filter_text: "dust",
            items: Some(&items),
            ..Default::default()
        };
        assert_eq!(label_filter(&args, &DefaultHost), vec![items[1].clone()]);
    }

    #[test]
    fn test_label_filter_skips_selected_in_multi_mode() {
        let items = orgs();
        let selected = vec![json!({"value": 1, "label": "Acme Corp"})];
        let args = FilterArgs {
            filter_text: "acme",
            items: Some(&items),
            multiple: true,
            value: Some(&selected),
            ..Default::default()
        };
        assert_eq!(label_filter(&args, &DefaultHost), vec![items[1].clone()]);

        let args = FilterArgs {
            filter_selected_items: false,
            ..args
        };
        assert_eq!(label_filter(&args, &DefaultHost).len(), 2);
    }

    #[test]
    fn test_label_filter_load_options_returns_items_unchanged() {
        let items = vec![json!("x"), json!("y")];
        let args = FilterArgs {
            load_options: true,
            filter_text: "zzz",
            items: Some(&items),
            ..Default::default()
        };
        assert_eq!(label_filter(&args, &DefaultHost), items);
    }

    #[test]
    fn test_label_filter_groups_matches() {
        let items = vec![
            json!({"value": 1, "label": "Acme Corp", "industry": "RETAIL"}),
            json!({"value": 2, "label": "Acme Labs", "industry": "SALES"}),
            json!({"value": 3, "label": "Globex", "industry": "RETAIL"}),
            json!({"value": 4, "label": "Acme Shops", "industry": "RETAIL"}),
        ];
        let by_industry = |v: &Value| v["industry"].as_str().unwrap_or_default().to_string();
        let args = FilterArgs {
            filter_text: "acme",
            items: Some(&items),
            group_by: Some(&by_industry),
            ..Default::default()
        };
        let grouped = label_filter(&args, &DefaultHost);
        let labels: Vec<&str> = grouped.iter().map(|v| v["label"].as_str().unwrap()).collect();
        assert_eq!(
            labels,
            vec!["RETAIL", "Acme Corp", "Acme Shops", "SALES", "Acme Labs"]
        );
        assert_eq!(grouped[3]["selectable"], json!(false));
    }
}
