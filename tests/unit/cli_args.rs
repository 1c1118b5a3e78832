use super::*;
use zcode_workspace::kernel::services::ports::MatchSpan;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn parse_args_accepts_root_query_and_flags() {
    let parsed = parse_args(args(&["/src", "fn main", "--regex", "--max", "5"])).unwrap();
    assert_eq!(
        parsed,
        ParseOutcome::Run(CliArgs {
            root: PathBuf::from("/src"),
            query: "fn main".to_string(),
            regex: true,
            case_sensitive: false,
            max_results: Some(5),
        })
    );
}

#[test]
fn parse_args_flags_may_come_first() {
    let parsed = parse_args(args(&["--case-sensitive", ".", "Foo"])).unwrap();
    let ParseOutcome::Run(cli) = parsed else {
        panic!("expected run");
    };
    assert!(cli.case_sensitive);
    assert_eq!(cli.root, PathBuf::from("."));
    assert_eq!(cli.query, "Foo");
}

#[test]
fn parse_args_rejects_bad_input() {
    assert!(parse_args(args(&["/src"])).is_err());
    assert!(parse_args(args(&["/src", "q", "extra"])).is_err());
    assert!(parse_args(args(&["/src", "q", "--max"])).is_err());
    assert!(parse_args(args(&["/src", "q", "--max", "lots"])).is_err());
    assert!(parse_args(args(&["/src", "q", "--fuzzy"])).is_err());
    assert_eq!(parse_args(args(&["--help"])), Ok(ParseOutcome::Help));
}

#[test]
fn format_result_is_relative_to_root() {
    let result = SearchResult {
        path: PathBuf::from("/src/lib/a.rs"),
        line: 3,
        spans: vec![MatchSpan::new(0, 3), MatchSpan::new(7, 10)],
    };
    assert_eq!(
        format_result(Path::new("/src"), &result),
        format!("{}:3: 0-3,7-10", Path::new("lib").join("a.rs").display())
    );
}
