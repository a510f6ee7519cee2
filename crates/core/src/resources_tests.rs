// SPDX-License-Identifier: MIT

use super::*;
use yare::parameterized;

#[test]
fn parses_comma_separated_list() {
    let resources = Resources::parse("linux, mercurial");
    assert_eq!(resources.len(), 2);
    assert!(resources.contains("linux"));
    assert!(resources.contains("mercurial"));
}

#[test]
fn drops_empty_segments() {
    let resources = Resources::parse(" linux , , ,svn,");
    assert_eq!(resources.len(), 2);
    assert!(resources.contains("linux"));
    assert!(resources.contains("svn"));
}

#[test]
fn parse_of_blank_is_empty() {
    assert!(Resources::parse("").is_empty());
    assert!(Resources::parse("  , ").is_empty());
}

#[parameterized(
    empty_matches_anything = { "", "linux", true },
    exact = { "linux", "linux", true },
    subset = { "linux", "linux, mercurial", true },
    superset = { "linux, svn", "linux", false },
    disjoint = { "windows", "linux", false },
    empty_against_empty = { "", "", true },
)]
fn subset_semantics(required: &str, advertised: &str, matches: bool) {
    let required = Resources::parse(required);
    let advertised = Resources::parse(advertised);
    assert_eq!(required.is_subset_of(&advertised), matches);
}

#[test]
fn display_is_sorted_comma_joined() {
    let resources = Resources::parse("mercurial, linux");
    assert_eq!(resources.to_string(), "linux, mercurial");
}

#[test]
fn serde_round_trip_is_transparent() {
    let resources = Resources::parse("linux, svn");
    let json = serde_json::to_string(&resources).unwrap();
    assert_eq!(json, r#"["linux","svn"]"#);
    let parsed: Resources = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, resources);
}
