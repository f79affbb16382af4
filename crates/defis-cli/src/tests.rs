use super::*;

#[test]
fn parses_groups_command() {
    let cli = Cli::try_parse_from(["defis", "groups"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Groups));
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["defis"]).is_err());
}

#[test]
fn drug_defaults_to_name_key_and_option_list() {
    let cli = Cli::try_parse_from(["defis", "drug"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Drug {
            by: DrugKey::Name,
            value: None,
            export: None
        }
    ));
}

#[test]
fn drug_lookup_by_cip13_with_export() {
    let cli = Cli::try_parse_from([
        "defis",
        "drug",
        "--by",
        "cip13",
        "3400930000011",
        "--export",
        "out.xlsx",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Drug {
            by: DrugKey::Cip13,
            value: Some(ref v),
            export: Some(ref p),
        } if v == "3400930000011" && p.as_os_str() == "out.xlsx"
    ));
}

#[test]
fn rejects_unknown_drug_key() {
    assert!(Cli::try_parse_from(["defis", "drug", "--by", "atc", "X"]).is_err());
}

#[test]
fn device_lookup_by_dossier() {
    let cli = Cli::try_parse_from(["defis", "device", "--by", "dossier", "12345"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Device {
            by: DeviceKey::Dossier,
            value: Some(ref v),
            ..
        } if v == "12345"
    ));
}

#[test]
fn group_comparison_with_column() {
    let cli = Cli::try_parse_from([
        "defis",
        "group",
        "PFIZER",
        "--compare",
        "ROCHE",
        "--column",
        "asmr",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Group {
            ref group,
            compare: Some(ref other),
            column: RatingColumn::Improvement,
            export: None,
        } if group == "PFIZER" && other == "ROCHE"
    ));
}

#[test]
fn group_column_defaults_to_benefit() {
    let cli = Cli::try_parse_from(["defis", "group", "PFIZER"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Group {
            column: RatingColumn::Benefit,
            compare: None,
            ..
        }
    ));
}

#[test]
fn revenue_requires_a_lab() {
    assert!(Cli::try_parse_from(["defis", "revenue"]).is_err());
    let cli = Cli::try_parse_from(["defis", "revenue", "PFIZER"]).unwrap();
    assert!(matches!(cli.command, Commands::Revenue { ref lab, .. } if lab == "PFIZER"));
}

#[test]
fn portfolio_collects_repeated_entries() {
    let cli = Cli::try_parse_from([
        "defis",
        "portfolio",
        "--entry",
        "A=70",
        "--entry",
        "B=30",
        "--column",
        "improvement",
    ])
    .unwrap();
    let Commands::Portfolio {
        entries, column, ..
    } = cli.command
    else {
        panic!("expected portfolio command");
    };
    assert_eq!(
        entries,
        vec![PortfolioEntry::new("A", 70.0), PortfolioEntry::new("B", 30.0)]
    );
    assert_eq!(column, RatingColumn::Improvement);
}

#[test]
fn portfolio_rejects_malformed_entry() {
    assert!(Cli::try_parse_from(["defis", "portfolio", "--entry", "A:70"]).is_err());
}

#[test]
fn portfolio_accepts_equal_weight_groups() {
    let cli =
        Cli::try_parse_from(["defis", "portfolio", "--group", "A", "--group", "B"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Portfolio { ref entries, ref groups, .. }
            if entries.is_empty() && groups.len() == 2
    ));
}
