use std::path::PathBuf;

use fishtable::{
    catalog::{CatalogLoader, CreatureRecord},
    criteria::{FilterCriteria, TOOL_TIERS},
    locations::{size_rank, DISPLAY_LOCATIONS, SEASONS, WEATHERS},
    pipeline::filter_and_group,
    render::{render_tables, Layout, NO_RESULTS},
};

fn catalog_loader() -> CatalogLoader {
    CatalogLoader::new(env!("CARGO_MANIFEST_DIR"))
}

fn fixture() -> Vec<CreatureRecord> {
    catalog_loader()
        .load(PathBuf::from("data/fish_data.json"))
        .expect("fixture parses")
}

fn every_criteria() -> Vec<FilterCriteria> {
    let mut all = Vec::new();
    for (tool, _) in TOOL_TIERS.iter().chain([("unknown", 0)].iter()) {
        for season in SEASONS {
            for weather in WEATHERS {
                all.push(FilterCriteria::from_labels(tool, season, weather));
            }
        }
    }
    all
}

#[test]
fn fixture_loads_every_record() {
    let records = fixture();
    assert_eq!(records.len(), 15);
    assert!(records.iter().any(|r| r.location == "Unknown Cave"));
}

#[test]
fn spring_sunny_with_base_tool() {
    let tables = filter_and_group(
        &fixture(),
        &FilterCriteria::from_labels("base", "spring", "sunny"),
    );

    let populated: Vec<_> = tables.non_empty().map(|g| g.location.as_str()).collect();
    assert_eq!(populated, ["Zephyr Town (West)", "Equestrian Park", "Bazaar"]);

    let west = tables.get("Zephyr Town (West)").unwrap();
    assert_eq!(west.entries.len(), 2);
    assert_eq!(west.entries[0].name, "Crucian Carp");
    assert_eq!(west.entries[0].weight, 40.0);
    assert_eq!(west.entries[0].share_label(), "66.7%");
    assert_eq!(west.entries[1].name, "Loach");
    assert_eq!(west.entries[1].share_label(), "33.3%");

    let bazaar = tables.get("Bazaar").unwrap();
    assert_eq!(bazaar.entries[0].name, "Goldfish");
    assert_eq!(bazaar.entries[1].name, "Old Boot");
    assert_eq!(bazaar.entries[1].share_label(), "0.0%");
}

#[test]
fn better_tool_unlocks_more_creatures() {
    let records = fixture();
    let base = filter_and_group(
        &records,
        &FilterCriteria::from_labels("base", "spring", "sunny"),
    );
    let silver = filter_and_group(
        &records,
        &FilterCriteria::from_labels("silver", "spring", "sunny"),
    );
    assert!(base.get("Mountains (Base)").unwrap().is_empty());
    assert_eq!(silver.get("Mountains (Base)").unwrap().entries[0].name, "Char");
    assert!(silver.entry_count() > base.entry_count());
}

#[test]
fn only_display_locations_are_rendered() {
    let records = fixture();
    for criteria in every_criteria() {
        let tables = filter_and_group(&records, &criteria);
        let locations: Vec<_> = tables.groups.iter().map(|g| g.location.as_str()).collect();
        assert_eq!(locations, DISPLAY_LOCATIONS);
        let html = render_tables(&tables, Layout::Compact);
        assert!(!html.contains("Unknown Cave"));
        assert!(!html.contains("Blind Cave Fish"));
    }
}

#[test]
fn groups_are_sorted_by_weight_then_size() {
    let records = fixture();
    for criteria in every_criteria() {
        let tables = filter_and_group(&records, &criteria);
        for group in &tables.groups {
            for pair in group.entries.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                assert!(a.weight >= b.weight, "{} before {}", a.name, b.name);
                if a.weight == b.weight {
                    assert!(size_rank(a.size.as_deref()) <= size_rank(b.size.as_deref()));
                }
            }
        }
    }
}

#[test]
fn shares_sum_to_one_hundred_or_zero() {
    let records = fixture();
    for criteria in every_criteria() {
        let tables = filter_and_group(&records, &criteria);
        for group in tables.non_empty() {
            let sum: f64 = group.entries.iter().map(|e| e.share).sum();
            if group.total_weight > 0.0 {
                assert!((sum - 100.0).abs() < 1e-6, "{} sums to {sum}", group.location);
            } else {
                assert_eq!(sum, 0.0);
            }
        }
    }
}

#[test]
fn rerunning_produces_identical_output() {
    let records = fixture();
    let criteria = FilterCriteria::from_labels("gold", "autumn", "sunny");
    let first = filter_and_group(&records, &criteria);
    let second = filter_and_group(&records, &criteria);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(
        render_tables(&first, Layout::Verbose),
        render_tables(&second, Layout::Verbose)
    );
}

#[test]
fn unmatched_filter_renders_notice_only() {
    let tables = filter_and_group(
        &fixture(),
        &FilterCriteria::from_labels("base", "spring", "foggy"),
    );
    let html = render_tables(&tables, Layout::Compact);
    assert!(html.contains(NO_RESULTS));
    assert!(!html.contains("<section"));
    assert!(!html.contains("<table"));
}
