use clap::Parser;

use super::*;

#[test]
fn parses_analyze_with_all_flags() {
    let cli = Cli::try_parse_from([
        "brandlens",
        "analyze",
        "--brand",
        "Acme",
        "--handle",
        "@acme",
        "--website",
        "https://acme.example",
        "--out-dir",
        "/tmp/reports",
    ])
    .expect("expected valid cli args");

    let Some(Commands::Analyze(args)) = cli.command else {
        panic!("expected analyze command");
    };
    assert_eq!(args.brand.as_deref(), Some("Acme"));
    assert_eq!(args.handle.as_deref(), Some("@acme"));
    assert_eq!(args.website.as_deref(), Some("https://acme.example"));
    assert_eq!(args.out_dir, Some(PathBuf::from("/tmp/reports")));
}

#[test]
fn parses_analyze_with_brand_only() {
    let cli = Cli::try_parse_from(["brandlens", "analyze", "--brand", "Acme"])
        .expect("expected valid cli args");

    let Some(Commands::Analyze(args)) = cli.command else {
        panic!("expected analyze command");
    };
    assert_eq!(args.brand.as_deref(), Some("Acme"));
    assert!(args.handle.is_none());
    assert!(args.website.is_none());
    assert!(args.out_dir.is_none());
}

#[test]
fn bare_invocation_has_no_subcommand() {
    let cli = Cli::try_parse_from(["brandlens"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn rejects_unknown_flags() {
    let result = Cli::try_parse_from(["brandlens", "analyze", "--bogus"]);
    assert!(result.is_err());
}
