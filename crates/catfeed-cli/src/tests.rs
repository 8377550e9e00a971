use super::*;

#[test]
fn parses_export_with_defaults() {
    let cli = Cli::try_parse_from(["catfeed", "export", "--shop", "ABC"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Export {
            ref shop,
            offset: 0,
            count: None,
        } if shop == "ABC"
    ));
}

#[test]
fn parses_export_with_window() {
    let cli = Cli::try_parse_from([
        "catfeed", "export", "--shop", "ABC", "--offset", "200", "--count", "50",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Export {
            offset: 200,
            count: Some(50),
            ..
        }
    ));
}

#[test]
fn parses_export_all() {
    let cli = Cli::try_parse_from(["catfeed", "export-all", "--shop", "ABC", "--count", "10"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::ExportAll {
            count: Some(10),
            ..
        }
    ));
}

#[test]
fn parses_debug_command() {
    let cli = Cli::try_parse_from(["catfeed", "debug", "--shop", "ABC", "--product", "p1"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Debug { ref product, .. } if product == "p1"
    ));
}

#[test]
fn export_requires_shop() {
    assert!(Cli::try_parse_from(["catfeed", "export"]).is_err());
}

#[test]
fn debug_requires_product() {
    assert!(Cli::try_parse_from(["catfeed", "debug", "--shop", "ABC"]).is_err());
}

#[test]
fn negative_offset_is_rejected() {
    assert!(Cli::try_parse_from(["catfeed", "export", "--shop", "ABC", "--offset", "-1"]).is_err());
}

#[test]
fn missing_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["catfeed"]).is_err());
}
